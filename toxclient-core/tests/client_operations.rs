/*
    client_operations.rs - Operations in both forms against the local engine

    Every check runs the blocking form and the non-blocking form and
    expects the same outcome from each.
*/

use toxclient_core::test_utils::{
    assert_completes_within, peer_address, public_only_client, DEFAULT_TEST_TIMEOUT,
};
use toxclient_core::{Client, ClientConfig, ClientError};

const ABC_SHA256: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

fn client() -> Client {
    Client::new(ClientConfig::default()).unwrap()
}

fn is_lower_hex(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

#[test]
fn test_groupchat_add_then_delete() {
    let client = client();

    let group = client.add_groupchat_sync().unwrap();
    client.delete_groupchat_sync(group).unwrap();

    let group = client.add_groupchat().wait().unwrap();
    client.delete_groupchat(group).wait().unwrap();

    assert_eq!(client.count_chatlist_sync().unwrap(), 0);
}

#[test]
fn test_delete_unknown_groupchat_is_not_found() {
    let client = client();

    let err = client.delete_groupchat_sync(99999).unwrap_err();
    assert!(matches!(err, ClientError::NotFound(_)), "got {:?}", err);

    let err = client.delete_groupchat(99999).wait().unwrap_err();
    assert!(matches!(err, ClientError::NotFound(_)), "got {:?}", err);
}

#[test]
fn test_chatlist_tracks_groupchats() {
    let client = client();
    let a = client.add_groupchat_sync().unwrap();
    let b = client.add_groupchat().wait().unwrap();
    assert_ne!(a, b);

    let list = client.get_chatlist_sync().unwrap();
    assert_eq!(list.len() as u32, client.count_chatlist().wait().unwrap());
    assert!(list.contains(&a) && list.contains(&b));

    client.delete_groupchat_sync(a).unwrap();
    assert_eq!(client.get_chatlist().wait().unwrap(), vec![b]);
}

#[test]
fn test_hash_bytes_and_text_agree() {
    let client = client();

    let from_bytes = client.hash_sync(b"abc").unwrap();
    let from_text = client.hash_sync("abc").unwrap();
    assert_eq!(from_bytes, from_text);
    assert_eq!(from_bytes.to_hex(), ABC_SHA256);

    let deferred_bytes = client.hash(b"abc").wait().unwrap();
    let deferred_text = client.hash("abc".to_string()).wait().unwrap();
    assert_eq!(deferred_bytes, deferred_text);
    assert_eq!(deferred_text.to_hex(), ABC_SHA256);
}

#[test]
fn test_identity_hex_shapes() {
    let client = client();

    assert!(is_lower_hex(&client.get_address_hex_sync().unwrap(), 76));
    assert!(is_lower_hex(&client.get_address_hex().wait().unwrap(), 76));
    assert!(is_lower_hex(&client.get_public_key_hex_sync().unwrap(), 64));
    assert!(is_lower_hex(&client.get_public_key_hex().wait().unwrap(), 64));
    assert!(is_lower_hex(&client.get_secret_key_hex_sync().unwrap(), 64));
    assert!(is_lower_hex(&client.get_secret_key_hex().wait().unwrap(), 64));
}

#[test]
fn test_address_embeds_public_key() {
    let client = client();
    let address = client.get_address_sync().unwrap();
    assert!(address.checksum_valid());
    assert_eq!(address.public_key(), client.get_public_key().wait().unwrap());
    assert_eq!(&address.public_key(), client.cached_public_key());
}

#[test]
fn test_keys_with_and_without_secret() {
    let client = client();
    let keys = client.get_keys_sync(true).unwrap();
    assert!(keys.has_secret());
    let public = client.get_keys(false).wait().unwrap();
    assert!(!public.has_secret());
    assert_eq!(keys.public_key(), public.public_key());
}

#[test]
fn test_public_only_engine_has_no_secret() {
    let client = public_only_client();

    assert!(client.get_public_key_sync().is_ok());
    let err = client.get_secret_key_sync().unwrap_err();
    assert!(matches!(err, ClientError::KeyUnavailable(_)), "got {:?}", err);
    let err = client.get_secret_key_hex().wait().unwrap_err();
    assert!(matches!(err, ClientError::KeyUnavailable(_)), "got {:?}", err);
    let keys = client.get_keys_sync(true).unwrap();
    assert!(!keys.has_secret());
}

#[test]
fn test_size_is_positive() {
    let client = client();
    assert!(client.size_sync().unwrap() > 0);
    assert!(client.size().wait().unwrap() > 0);
}

#[test]
fn test_friend_list_starts_empty() {
    let client = client();
    assert_eq!(client.count_friend_list_sync().unwrap(), 0);
    assert_eq!(client.count_friend_list().wait().unwrap(), 0);
    assert!(client.get_friend_list_sync().unwrap().is_empty());
    assert!(client.get_friend_list().wait().unwrap().is_empty());
}

#[test]
fn test_has_friend_false_for_unknown_numbers() {
    let client = client();
    assert!(!client.has_friend_sync(0).unwrap());
    assert!(!client.has_friend(0).wait().unwrap());
    assert!(!client.has_friend_sync(u32::MAX).unwrap());
}

#[test]
fn test_count_matches_list_through_changes() {
    let client = client();

    let a = client.add_friend_sync(&peer_address(1).to_vec(), "hi").unwrap();
    let b = client
        .add_friend(&peer_address(2).to_vec(), "hello")
        .wait()
        .unwrap();
    let c = client
        .add_friend_norequest_sync(&peer_address(3).public_key())
        .unwrap();

    let list = client.get_friend_list_sync().unwrap();
    assert_eq!(client.count_friend_list_sync().unwrap() as usize, list.len());
    assert_eq!(list, vec![a, b, c]);

    client.delete_friend_sync(b).unwrap();
    let list = client.get_friend_list().wait().unwrap();
    assert_eq!(client.count_friend_list().wait().unwrap() as usize, list.len());
    assert!(!client.has_friend_sync(b).unwrap());
    assert!(client.has_friend_sync(a).unwrap());
}

#[test]
fn test_friend_lookups() {
    let client = client();
    let peer = peer_address(7);
    let friend = client.add_friend_sync(&peer.to_vec(), "hi").unwrap();

    assert_eq!(client.get_friend_public_key_sync(friend).unwrap(), peer.public_key());
    assert_eq!(
        client.get_friend_number(&peer.public_key()).wait().unwrap(),
        friend
    );

    assert!(client.get_friend_public_key_sync(42).unwrap_err().is_not_found());
    let stranger = peer_address(8).public_key();
    assert!(client.get_friend_number_sync(&stranger).unwrap_err().is_not_found());
    assert!(client.delete_friend(42).wait().unwrap_err().is_not_found());
}

#[test]
fn test_add_friend_rejects_bad_input() {
    let client = client();
    let peer = peer_address(9).to_vec();

    let short = &peer[..10];
    assert!(matches!(
        client.add_friend_sync(short, "hi").unwrap_err(),
        ClientError::InvalidArgument(_)
    ));

    let mut corrupt = peer.clone();
    corrupt[37] ^= 0xff;
    assert!(matches!(
        client.add_friend(&corrupt, "hi").wait().unwrap_err(),
        ClientError::InvalidArgument(_)
    ));

    assert!(matches!(
        client.add_friend_sync(&peer, "").unwrap_err(),
        ClientError::InvalidArgument(_)
    ));

    let own = client.get_address_sync().unwrap().to_vec();
    assert!(matches!(
        client.add_friend_sync(&own, "hi").unwrap_err(),
        ClientError::InvalidArgument(_)
    ));

    assert_eq!(client.count_friend_list_sync().unwrap(), 0);
}

#[test]
fn test_messages_and_receipts() {
    let client = client();
    let friend = client
        .add_friend_norequest_sync(&peer_address(4).public_key())
        .unwrap();

    let first = client.send_message_sync(friend, "hello").unwrap();
    let second = client.send_action(friend, "waves").wait().unwrap();
    assert!(first >= 1);
    assert!(second > first);

    assert!(client.send_message_sync(friend + 1, "hello").unwrap_err().is_not_found());
    assert!(matches!(
        client.send_action_sync(friend, "").unwrap_err(),
        ClientError::InvalidArgument(_)
    ));
}

#[test]
fn test_profile_round_trip() {
    let client = client();
    assert_eq!(client.get_name_sync().unwrap(), "");

    client.set_name_sync("alice").unwrap();
    assert_eq!(client.get_name().wait().unwrap(), "alice");

    client.set_status_message("away").wait().unwrap();
    assert_eq!(client.get_status_message_sync().unwrap(), "away");

    let too_long = "x".repeat(129);
    assert!(matches!(
        client.set_name_sync(&too_long).unwrap_err(),
        ClientError::InvalidArgument(_)
    ));
    assert_eq!(client.get_name_sync().unwrap(), "alice");

    let too_long = "x".repeat(1008);
    assert!(matches!(
        client.set_status_message(&too_long).wait().unwrap_err(),
        ClientError::InvalidArgument(_)
    ));
}

#[test]
fn test_network_driven_friend_removal() {
    let (client, engine) = toxclient_core::test_utils::client_with_engine(ClientConfig::default());
    let friend = client
        .add_friend_norequest_sync(&peer_address(5).public_key())
        .unwrap();
    assert!(client.has_friend_sync(friend).unwrap());

    engine.remove_friend_remote(friend).unwrap();

    assert!(!client.has_friend(friend).wait().unwrap());
    assert_eq!(client.count_friend_list_sync().unwrap(), 0);
    assert!(client.get_friend_public_key_sync(friend).unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_operations_await_inside_runtime() {
    let client = client();

    let group = assert_completes_within(DEFAULT_TEST_TIMEOUT, client.add_groupchat())
        .await
        .unwrap();
    assert_eq!(client.count_chatlist().await.unwrap(), 1);
    client.delete_groupchat(group).await.unwrap();
    assert!(client.delete_groupchat(group).await.unwrap_err().is_not_found());
    assert_eq!(client.hash("abc").await.unwrap().to_hex(), ABC_SHA256);
}

#[tokio::test]
async fn test_many_pending_operations_join() {
    let client = client();

    let adds = futures::future::join_all((0..8).map(|_| client.add_groupchat())).await;
    let groups: Vec<u32> = adds.into_iter().collect::<Result<_, _>>().unwrap();
    assert_eq!(groups, (0..8).collect::<Vec<u32>>());

    let deletes = futures::future::join_all(groups.iter().map(|&g| client.delete_groupchat(g))).await;
    assert!(deletes.iter().all(|r| r.is_ok()));
    assert_eq!(client.count_chatlist().await.unwrap(), 0);
}

#[test]
fn test_back_to_back_deletes_of_one_group() {
    let client = client();

    for _ in 0..20 {
        let group = client.add_groupchat().wait().unwrap();
        let first = client.delete_groupchat(group);
        let second = client.delete_groupchat(group);

        first.wait().unwrap();
        let err = second.wait().unwrap_err();
        assert!(matches!(err, ClientError::NotFound(_)), "got {:?}", err);
    }
}

#[tokio::test]
async fn test_back_to_back_deletes_awaited_together() {
    let client = client();
    let group = client.add_groupchat().await.unwrap();

    let (first, second) = assert_completes_within(
        DEFAULT_TEST_TIMEOUT,
        futures::future::join(client.delete_groupchat(group), client.delete_groupchat(group)),
    )
    .await;

    assert!(first.is_ok());
    assert!(second.unwrap_err().is_not_found());
}
