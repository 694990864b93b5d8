//! Walk through a client's life: listeners, both operation forms, kill
//!
//! Run with:
//! ```bash
//! cargo run --example client_demo
//! ```

use std::time::Duration;

use toxclient_core::engine::RawNotification;
use toxclient_core::logging::{init_logging_with_config, LogConfig, LogLevel};
use toxclient_core::test_utils::{client_with_engine, peer_address};
use toxclient_core::{ClientConfig, FriendMessageEvent, TypingChangeEvent};
use tracing::{info, warn};

fn main() {
    let config = LogConfig::new(LogLevel::Debug).with_timestamp(false);
    init_logging_with_config(config).expect("Failed to initialize logging");

    let (client, engine) = client_with_engine(ClientConfig::default());

    client.on::<FriendMessageEvent, _>(|msg| {
        info!(friend = msg.friend(), message = msg.message(), "Message received");
    });
    client.on::<TypingChangeEvent, _>(|event| {
        info!(friend = event.friend(), typing = event.typing(), "Typing changed");
    });

    info!(address = %client.get_address_hex_sync().expect("address"), "Client ready");

    let friend = client
        .add_friend(&peer_address(1).to_vec(), "hi, it's me")
        .wait()
        .expect("add friend");
    let receipt = client.send_message_sync(friend, "hello").expect("send");
    info!(friend, receipt, "Message sent");

    engine.inject(RawNotification::TypingChange { friend, typing: 1 });
    engine.inject(RawNotification::FriendMessage {
        friend,
        message: "hello back".into(),
    });
    std::thread::sleep(Duration::from_millis(100));

    client.kill_sync().expect("kill");
    if let Err(e) = client.count_friend_list_sync() {
        warn!(error = %e, "Operation after kill");
    }
}
