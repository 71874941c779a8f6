//! Inbound platform events and roster types from the Slack realtime stream.

use serde::Deserialize;

/// One event from the realtime stream. Only the fields the bot inspects are
/// deserialized; everything else in the frame is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundMessage {
    /// Event type (e.g. "hello", "message", "presence_change").
    #[serde(rename = "type", default)]
    pub event_type: String,

    /// Message text, present only for chat messages.
    #[serde(default)]
    pub text: Option<String>,

    /// Conversation id; channel ids start with `C`, direct messages with `D`.
    #[serde(default)]
    pub channel: Option<String>,

    /// Sender user id.
    #[serde(default)]
    pub user: Option<String>,
}

/// Channel roster entry from the connect handshake.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelInfo {
    pub id: String,
    pub name: String,
}

/// User roster entry from the connect handshake.
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub name: String,
}
