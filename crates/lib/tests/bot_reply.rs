//! End-to-end test: feed RTM-shaped events through a stubbed chat client, back
//! the balance lookup with a local one-shot HTTP fixture, and assert exactly
//! one formatted reply is posted to the right channel.

use async_trait::async_trait;
use lib::balance::BalanceClient;
use lib::bot::HourBankBot;
use lib::channels::{ChannelInfo, ChatClient, InboundMessage, UserInfo};
use lib::config::{BalanceServiceConfig, Environment};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::{mpsc, Mutex};

const BALANCE_BODY: &str =
    r#"[{"nome":"João Souza","devedor":false,"horas":"3H00M","data":"2024-01-15"}]"#;

/// Minimal HTTP fixture standing in for the dev balance service: accepts
/// connections and answers every request with the same JSON array body.
async fn spawn_balance_fixture() -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fixture listener");
    let port = listener.local_addr().expect("local_addr").port();
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    BALANCE_BODY.len(),
                    BALANCE_BODY
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });
    port
}

/// Chat client stub: a pre-loaded event stream, fixed rosters, and a log of
/// every posted message.
struct StubChat {
    events: Mutex<Option<mpsc::Receiver<InboundMessage>>>,
    posts: Mutex<Vec<(String, String)>>,
}

impl StubChat {
    fn new(events: mpsc::Receiver<InboundMessage>) -> Self {
        Self {
            events: Mutex::new(Some(events)),
            posts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ChatClient for StubChat {
    async fn subscribe(&self) -> Result<mpsc::Receiver<InboundMessage>, String> {
        self.events
            .lock()
            .await
            .take()
            .ok_or_else(|| "already subscribed".to_string())
    }

    async fn post_message(&self, channel_name: &str, text: &str) -> Result<(), String> {
        self.posts
            .lock()
            .await
            .push((channel_name.to_string(), text.to_string()));
        Ok(())
    }

    async fn list_channels(&self) -> Result<Vec<ChannelInfo>, String> {
        Ok(vec![ChannelInfo {
            id: "C001".to_string(),
            name: "general".to_string(),
        }])
    }

    async fn list_users(&self) -> Result<Vec<UserInfo>, String> {
        Ok(vec![UserInfo {
            id: "U000".to_string(),
            name: "time-watcher-bot".to_string(),
        }])
    }
}

fn rtm_event(json: &str) -> InboundMessage {
    serde_json::from_str(json).expect("parse event fixture")
}

#[tokio::test]
async fn qualifying_message_gets_exactly_one_reply() {
    let port = spawn_balance_fixture().await;

    let (tx, rx) = mpsc::channel(16);
    let stub = Arc::new(StubChat::new(rx));
    let balance = BalanceClient::new(
        Environment::Dev,
        &BalanceServiceConfig {
            prod_base_url: "https://unused.example.test".to_string(),
            dev_base_url: format!("http://127.0.0.1:{}/saldo", port),
        },
    );
    let mut bot = HourBankBot::new(stub.clone(), balance, "time-watcher-bot".to_string());

    // Connected transition, then a mix of non-qualifying events around one
    // qualifying message.
    let events = [
        r#"{"type":"hello"}"#,
        // Not a chat message.
        r#"{"type":"presence_change","user":"U999"}"#,
        // Direct message, not a channel conversation.
        r#"{"type":"message","text":"banco 12345","channel":"D042","user":"U999"}"#,
        // Sent by the bot itself.
        r#"{"type":"message","text":"banco 12345","channel":"C001","user":"U000"}"#,
        // Bot-name mention without the keyword: no employee id, no lookup.
        r#"{"type":"message","text":"oi time-watcher-bot","channel":"C001","user":"U999"}"#,
        // The qualifying message.
        r#"{"type":"message","text":"banco 12345","channel":"C001","user":"U999"}"#,
    ];
    for e in events {
        tx.send(rtm_event(e)).await.expect("send event");
    }
    drop(tx);

    bot.run().await.expect("bot run");
    assert_eq!(bot.self_user_id().as_deref(), Some("U000"));

    // The reply task runs detached from the dispatcher; wait for it.
    let mut posts = Vec::new();
    for _ in 0..100 {
        posts = stub.posts.lock().await.clone();
        if !posts.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(posts.len(), 1, "expected exactly one reply, got {:?}", posts);
    assert_eq!(posts[0].0, "general");
    assert_eq!(posts[0].1, "Olá João! Seu saldo é de +3H00M até 15/01/2024.");

    // Nothing else trickles in afterwards.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(stub.posts.lock().await.len(), 1);
}

#[tokio::test]
async fn unknown_channel_is_skipped_without_reply() {
    let port = spawn_balance_fixture().await;

    let (tx, rx) = mpsc::channel(4);
    let stub = Arc::new(StubChat::new(rx));
    let balance = BalanceClient::new(
        Environment::Dev,
        &BalanceServiceConfig {
            prod_base_url: "https://unused.example.test".to_string(),
            dev_base_url: format!("http://127.0.0.1:{}/saldo", port),
        },
    );
    let mut bot = HourBankBot::new(stub.clone(), balance, "time-watcher-bot".to_string());

    tx.send(rtm_event(r#"{"type":"hello"}"#)).await.expect("send hello");
    // Channel id qualifies but is not in the roster.
    tx.send(rtm_event(
        r#"{"type":"message","text":"banco 12345","channel":"C999","user":"U999"}"#,
    ))
    .await
    .expect("send message");
    drop(tx);

    bot.run().await.expect("bot run");

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(stub.posts.lock().await.is_empty());
}
