/*
    lifecycle.rs - Handle lifecycle and cross-form ordering
*/

use std::sync::mpsc;
use std::time::Duration;

use toxclient_core::test_utils::{client_with_engine, peer_address};
use toxclient_core::{Client, ClientConfig, ClientError};

fn assert_handle_invalid<T: std::fmt::Debug>(result: Result<T, ClientError>) {
    match result {
        Err(ClientError::HandleInvalid(_)) => {}
        other => panic!("expected HandleInvalid, got {:?}", other),
    }
}

#[test]
fn test_every_operation_fails_after_kill() {
    let client = Client::new(ClientConfig::default()).unwrap();
    let peer = peer_address(1);
    client.kill_sync().unwrap();

    assert!(!client.has_handle());
    assert_handle_invalid(client.check_handle_sync());
    assert_handle_invalid(client.get_address_sync());
    assert_handle_invalid(client.get_address_hex_sync());
    assert_handle_invalid(client.get_keys_sync(true));
    assert_handle_invalid(client.get_public_key_sync());
    assert_handle_invalid(client.get_public_key_hex_sync());
    assert_handle_invalid(client.get_secret_key_sync());
    assert_handle_invalid(client.get_secret_key_hex_sync());
    assert_handle_invalid(client.hash_sync("abc"));
    assert_handle_invalid(client.size_sync());
    assert_handle_invalid(client.add_friend_sync(&peer.to_vec(), "hi"));
    assert_handle_invalid(client.add_friend_norequest_sync(&peer.public_key()));
    assert_handle_invalid(client.delete_friend_sync(0));
    assert_handle_invalid(client.has_friend_sync(0));
    assert_handle_invalid(client.count_friend_list_sync());
    assert_handle_invalid(client.get_friend_list_sync());
    assert_handle_invalid(client.get_friend_public_key_sync(0));
    assert_handle_invalid(client.get_friend_number_sync(&peer.public_key()));
    assert_handle_invalid(client.send_message_sync(0, "hi"));
    assert_handle_invalid(client.send_action_sync(0, "hi"));
    assert_handle_invalid(client.set_name_sync("bob"));
    assert_handle_invalid(client.get_name_sync());
    assert_handle_invalid(client.set_status_message_sync("busy"));
    assert_handle_invalid(client.get_status_message_sync());
    assert_handle_invalid(client.add_groupchat_sync());
    assert_handle_invalid(client.delete_groupchat_sync(0));
    assert_handle_invalid(client.count_chatlist_sync());
    assert_handle_invalid(client.get_chatlist_sync());
    assert_handle_invalid(client.kill_sync());
}

#[test]
fn test_non_blocking_forms_fail_after_kill() {
    let client = Client::new(ClientConfig::default()).unwrap();
    client.kill().wait().unwrap();

    assert!(!client.has_handle());
    assert_handle_invalid(client.check_handle().wait());
    assert_handle_invalid(client.add_groupchat().wait());
    assert_handle_invalid(client.hash(b"abc").wait());
    assert_handle_invalid(client.get_friend_list().wait());
    assert_handle_invalid(client.kill().wait());
}

#[test]
fn test_bad_argument_reported_before_handle_state() {
    let client = Client::new(ClientConfig::default()).unwrap();
    client.kill_sync().unwrap();
    let err = client.add_friend_sync(&[0u8; 3], "hi").unwrap_err();
    assert!(matches!(err, ClientError::InvalidArgument(_)), "got {:?}", err);
}

#[test]
fn test_kill_destroys_engine_once() {
    let (client, engine) = client_with_engine(ClientConfig::default());
    assert!(!engine.is_destroyed());
    client.kill_sync().unwrap();
    assert!(engine.is_destroyed());
    assert_handle_invalid(client.kill().wait());
    drop(client);
    assert!(engine.is_destroyed());
}

#[test]
fn test_av_companion_is_detached_by_kill() {
    let client = Client::new(ClientConfig::default()).unwrap();
    let av = client.av().cloned().expect("av companion");
    assert!(av.is_attached());
    av.check().unwrap();

    client.kill_sync().unwrap();
    assert!(!av.is_attached());
    assert_handle_invalid(av.check());

    drop(client);
    assert_handle_invalid(av.check());
}

#[test]
fn test_no_av_companion_when_disabled() {
    let mut config = ClientConfig::default();
    config.engine.av_enabled = false;
    let client = Client::new(config).unwrap();
    assert!(client.av().is_none());
}

#[test]
fn test_deferred_then_blocking_is_ordered() {
    let client = Client::new(ClientConfig::default()).unwrap();

    let pending: Vec<_> = (0..16).map(|_| client.add_groupchat()).collect();
    // The blocking count is scheduled after every add, so it sees all of them
    assert_eq!(client.count_chatlist_sync().unwrap(), 16);

    let mut groups: Vec<u32> = pending.into_iter().map(|p| p.wait().unwrap()).collect();
    groups.sort_unstable();
    groups.dedup();
    assert_eq!(groups.len(), 16);
}

#[test]
fn test_same_resource_operations_complete_in_order() {
    let client = Client::new(ClientConfig::default()).unwrap();

    let set_first = client.set_name("first");
    let set_second = client.set_name("second");
    let read = client.get_name();

    set_first.wait().unwrap();
    set_second.wait().unwrap();
    assert_eq!(read.wait().unwrap(), "second");
}

#[test]
fn test_on_complete_callback() {
    let client = Client::new(ClientConfig::default()).unwrap();
    let (tx, rx) = mpsc::channel();

    client.hash("abc").on_complete(move |result| {
        let _ = tx.send(result.map(|h| h.to_hex()));
    });

    let hex = rx.recv_timeout(Duration::from_secs(5)).unwrap().unwrap();
    assert!(hex.starts_with("ba7816bf"));
}

#[test]
fn test_try_take_eventually_yields() {
    let client = Client::new(ClientConfig::default()).unwrap();
    let mut pending = client.size();

    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    let result = loop {
        if let Some(result) = pending.try_take() {
            break result;
        }
        assert!(std::time::Instant::now() < deadline, "operation never finished");
        std::thread::sleep(Duration::from_millis(1));
    };
    assert!(result.unwrap() > 0);
}

#[test]
fn test_clients_across_threads() {
    let client = std::sync::Arc::new(Client::new(ClientConfig::default()).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let client = client.clone();
            std::thread::spawn(move || {
                for _ in 0..10 {
                    let group = client.add_groupchat_sync().unwrap();
                    client.delete_groupchat(group).wait().unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(client.count_chatlist_sync().unwrap(), 0);
}
