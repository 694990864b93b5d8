/*
    event_delivery.rs - Engine notifications reaching listeners and subscribers
*/

use tokio::sync::mpsc;
use toxclient_core::engine::RawNotification;
use toxclient_core::test_utils::{
    assert_times_out, client_with_engine, collect_n, recv_broadcast_timeout, recv_timeout,
    DEFAULT_TEST_TIMEOUT, SHORT_TEST_TIMEOUT,
};
use toxclient_core::{
    AvatarDataEvent, AvatarInfoEvent, ClientConfig, ConnectionStatusEvent, Event, EventKind,
    FriendMessageEvent, GroupNamelistChangeEvent, PublicKey, TypingChangeEvent,
};

#[tokio::test]
async fn test_typed_listener_receives_only_its_kind() {
    let (client, engine) = client_with_engine(ClientConfig::default());
    let (tx, mut rx) = mpsc::unbounded_channel();
    client.on::<FriendMessageEvent, _>(move |msg| {
        let _ = tx.send((msg.friend(), msg.message().to_string()));
    });

    engine.inject(RawNotification::FriendAction {
        friend: 1,
        action: "waves".into(),
    });
    engine.inject(RawNotification::FriendMessage {
        friend: 2,
        message: "hello".into(),
    });

    let (friend, message) = recv_timeout(&mut rx, DEFAULT_TEST_TIMEOUT).await.unwrap();
    assert_eq!(friend, 2);
    assert_eq!(message, "hello");
    assert!(recv_timeout(&mut rx, SHORT_TEST_TIMEOUT).await.is_err());
}

#[tokio::test]
async fn test_events_keep_engine_order() {
    let (client, engine) = client_with_engine(ClientConfig::default());
    let (tx, mut rx) = mpsc::unbounded_channel();
    client.on_any(move |event| {
        if let Event::FriendMessage(msg) = event {
            let _ = tx.send(msg.message().to_string());
        }
    });

    for i in 0..20 {
        engine.inject(RawNotification::FriendMessage {
            friend: 0,
            message: format!("m{}", i),
        });
    }

    let received = collect_n(&mut rx, 20, DEFAULT_TEST_TIMEOUT).await.unwrap();
    let expected: Vec<String> = (0..20).map(|i| format!("m{}", i)).collect();
    assert_eq!(received, expected);
}

#[tokio::test]
async fn test_subscribe_stream_sees_every_kind() {
    let (client, engine) = client_with_engine(ClientConfig::default());
    let mut events = client.subscribe();

    engine.inject(RawNotification::FriendRequest {
        public_key: PublicKey::from_bytes([3; 32]),
        data: b"let me in".to_vec(),
    });
    engine.inject(RawNotification::GroupNamelistChange {
        group: 4,
        peer: 2,
        change: 1,
    });

    let first = recv_broadcast_timeout(&mut events, DEFAULT_TEST_TIMEOUT).await.unwrap();
    assert_eq!(first.kind(), EventKind::FriendRequest);
    match first {
        Event::FriendRequest(req) => {
            assert_eq!(req.public_key_hex(), "03".repeat(32));
            assert_eq!(req.data(), b"let me in");
        }
        other => panic!("unexpected event {:?}", other),
    }

    let second = recv_broadcast_timeout(&mut events, DEFAULT_TEST_TIMEOUT).await.unwrap();
    assert_eq!(second.group(), Some(4));
    assert!(matches!(second, Event::GroupNamelistChange(_)));
}

#[tokio::test]
async fn test_typing_flag_from_numbers() {
    let (client, engine) = client_with_engine(ClientConfig::default());
    let (tx, mut rx) = mpsc::unbounded_channel();
    client.on::<TypingChangeEvent, _>(move |event| {
        let _ = tx.send(event.typing());
    });

    engine.inject(RawNotification::TypingChange { friend: 0, typing: 1 });
    engine.inject(RawNotification::TypingChange { friend: 0, typing: 0 });

    assert!(recv_timeout(&mut rx, DEFAULT_TEST_TIMEOUT).await.unwrap());
    assert!(!recv_timeout(&mut rx, DEFAULT_TEST_TIMEOUT).await.unwrap());

    assert!(TypingChangeEvent::new(0, true).typing());
    assert!(!TypingChangeEvent::new(0, false).typing());
}

#[tokio::test]
async fn test_avatar_validity_follows_format() {
    let (client, engine) = client_with_engine(ClientConfig::default());
    let (info_tx, mut info_rx) = mpsc::unbounded_channel();
    let (data_tx, mut data_rx) = mpsc::unbounded_channel();
    client.on::<AvatarInfoEvent, _>(move |event| {
        let _ = info_tx.send((event.format(), event.is_valid()));
    });
    client.on::<AvatarDataEvent, _>(move |event| {
        let _ = data_tx.send((event.format(), event.is_valid(), event.data().len()));
    });

    engine.inject(RawNotification::AvatarInfo {
        friend: 0,
        format: 0,
        hash: vec![0; 32],
    });
    engine.inject(RawNotification::AvatarInfo {
        friend: 0,
        format: 1,
        hash: vec![1; 32],
    });
    engine.inject(RawNotification::AvatarData {
        friend: 0,
        format: 1,
        hash: vec![1; 32],
        data: vec![0x89, 0x50, 0x4e, 0x47],
    });

    assert_eq!(recv_timeout(&mut info_rx, DEFAULT_TEST_TIMEOUT).await.unwrap(), (0, false));
    assert_eq!(recv_timeout(&mut info_rx, DEFAULT_TEST_TIMEOUT).await.unwrap(), (1, true));
    assert_eq!(
        recv_timeout(&mut data_rx, DEFAULT_TEST_TIMEOUT).await.unwrap(),
        (1, true, 4)
    );
}

#[tokio::test]
async fn test_panicking_listener_does_not_stop_delivery() {
    let (client, engine) = client_with_engine(ClientConfig::default());
    client.on::<ConnectionStatusEvent, _>(|_| panic!("listener bug"));
    let (tx, mut rx) = mpsc::unbounded_channel();
    client.on::<ConnectionStatusEvent, _>(move |event| {
        let _ = tx.send(event.is_connected());
    });

    engine.inject(RawNotification::ConnectionStatus { friend: 0, status: 1 });
    engine.inject(RawNotification::ConnectionStatus { friend: 0, status: 0 });

    assert!(recv_timeout(&mut rx, DEFAULT_TEST_TIMEOUT).await.unwrap());
    assert!(!recv_timeout(&mut rx, DEFAULT_TEST_TIMEOUT).await.unwrap());
}

#[tokio::test]
async fn test_removed_listener_is_not_called() {
    let (client, engine) = client_with_engine(ClientConfig::default());
    let (tx, mut rx) = mpsc::unbounded_channel();
    let id = client.on::<GroupNamelistChangeEvent, _>(move |event| {
        let _ = tx.send(event.peer());
    });
    assert!(client.remove_listener(id));
    assert!(!client.remove_listener(id));

    let mut events = client.subscribe();
    engine.inject(RawNotification::GroupNamelistChange {
        group: 0,
        peer: 9,
        change: 0,
    });

    recv_broadcast_timeout(&mut events, DEFAULT_TEST_TIMEOUT).await.unwrap();
    assert!(recv_timeout(&mut rx, SHORT_TEST_TIMEOUT).await.is_err());
}

#[tokio::test]
async fn test_no_events_after_kill() {
    let (client, engine) = client_with_engine(ClientConfig::default());
    let mut events = client.subscribe();

    client.kill().await.unwrap();

    let delivered = engine.inject(RawNotification::FriendMessage {
        friend: 0,
        message: "late".into(),
    });
    assert_eq!(delivered, 0);
    assert_times_out(SHORT_TEST_TIMEOUT, events.recv()).await;
}
