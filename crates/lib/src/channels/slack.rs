//! Slack channel connector: rtm.start handshake, websocket event loop, and
//! Web API chat.postMessage for replies.

use crate::channels::client::ChatClient;
use crate::channels::event::{ChannelInfo, InboundMessage, UserInfo};
use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::sync::{mpsc, RwLock};
use tokio_tungstenite::tungstenite::Message;

const SLACK_API_BASE: &str = "https://slack.com/api";
const INBOUND_BUFFER: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum SlackError {
    #[error("slack request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("slack api error: {0}")]
    Api(String),
    #[error("slack socket error: {0}")]
    Socket(String),
}

/// rtm.start response: websocket URL plus the channel and user rosters.
#[derive(Debug, serde::Deserialize)]
struct RtmStartResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    channels: Vec<ChannelInfo>,
    #[serde(default)]
    users: Vec<UserInfo>,
}

#[derive(Debug, serde::Deserialize)]
struct ApiAck {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Default)]
struct Rosters {
    channels: Vec<ChannelInfo>,
    users: Vec<UserInfo>,
}

/// Slack connector: holds the token, the HTTP client, and the rosters
/// captured at connect time (written once, read thereafter).
pub struct SlackConnector {
    token: String,
    client: reqwest::Client,
    rosters: RwLock<Rosters>,
}

impl SlackConnector {
    pub fn new(token: String) -> Self {
        Self {
            token,
            client: reqwest::Client::new(),
            rosters: RwLock::new(Rosters::default()),
        }
    }

    /// Call rtm.start: returns the websocket URL and the workspace rosters.
    async fn rtm_start(&self) -> Result<RtmStartResponse, SlackError> {
        let url = format!("{}/rtm.start", SLACK_API_BASE);
        let res = self
            .client
            .get(&url)
            .query(&[("token", self.token.as_str())])
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(SlackError::Api(format!("rtm.start failed: {} {}", status, body)));
        }
        let data: RtmStartResponse = res.json().await?;
        if !data.ok {
            return Err(SlackError::Api(
                data.error
                    .unwrap_or_else(|| "rtm.start returned ok: false".to_string()),
            ));
        }
        Ok(data)
    }

    /// Post a message via chat.postMessage, sent as the bot's own identity.
    async fn post_message_api(&self, channel_name: &str, text: &str) -> Result<(), SlackError> {
        let url = format!("{}/chat.postMessage", SLACK_API_BASE);
        let body = serde_json::json!({
            "channel": channel_name,
            "text": text,
            "as_user": true,
        });
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(SlackError::Api(format!(
                "chat.postMessage failed: {} {}",
                status, body
            )));
        }
        let ack: ApiAck = res.json().await?;
        if !ack.ok {
            return Err(SlackError::Api(
                ack.error
                    .unwrap_or_else(|| "chat.postMessage returned ok: false".to_string()),
            ));
        }
        Ok(())
    }

    /// rtm.start handshake: cache the rosters, spawn the socket loop, and
    /// return the inbound event stream.
    pub async fn connect(&self) -> Result<mpsc::Receiver<InboundMessage>, SlackError> {
        let start = self.rtm_start().await?;
        let url = start.url.ok_or_else(|| {
            SlackError::Socket("rtm.start returned no websocket url".to_string())
        })?;
        {
            let mut g = self.rosters.write().await;
            g.channels = start.channels;
            g.users = start.users;
        }
        let (tx, rx) = mpsc::channel(INBOUND_BUFFER);
        tokio::spawn(run_socket_loop(url, tx));
        Ok(rx)
    }
}

/// Read frames from the realtime websocket and forward parseable events.
/// Ends when the socket closes or the receiver is dropped; no reconnect.
async fn run_socket_loop(url: String, tx: mpsc::Sender<InboundMessage>) {
    let mut ws = match tokio_tungstenite::connect_async(url.as_str()).await {
        Ok((ws, _)) => ws,
        Err(e) => {
            log::error!("slack: websocket connect failed: {}", e);
            return;
        }
    };
    log::info!("slack: realtime socket connected");
    while let Some(frame) = ws.next().await {
        let frame = match frame {
            Ok(f) => f,
            Err(e) => {
                log::warn!("slack: socket read error: {}", e);
                break;
            }
        };
        let text = match frame {
            Message::Text(t) => t,
            _ => continue,
        };
        let event: InboundMessage = match serde_json::from_str(&text) {
            Ok(e) => e,
            Err(_) => {
                log::debug!("slack: skipping unparseable frame");
                continue;
            }
        };
        if tx.send(event).await.is_err() {
            log::debug!("slack: inbound channel closed, stopping loop");
            return;
        }
    }
    log::info!("slack: realtime socket closed");
}

#[async_trait]
impl ChatClient for SlackConnector {
    async fn subscribe(&self) -> Result<mpsc::Receiver<InboundMessage>, String> {
        self.connect().await.map_err(|e| e.to_string())
    }

    async fn post_message(&self, channel_name: &str, text: &str) -> Result<(), String> {
        self.post_message_api(channel_name, text)
            .await
            .map_err(|e| e.to_string())
    }

    async fn list_channels(&self) -> Result<Vec<ChannelInfo>, String> {
        let g = self.rosters.read().await;
        Ok(g.channels.clone())
    }

    async fn list_users(&self) -> Result<Vec<UserInfo>, String> {
        let g = self.rosters.read().await;
        Ok(g.users.clone())
    }
}
