//! Capability handle onto the chat platform: post messages, read rosters,
//! subscribe to the inbound event stream.

use crate::channels::event::{ChannelInfo, InboundMessage, UserInfo};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// What the bot needs from the messaging platform. Implemented by the Slack
/// connector; tests substitute their own.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Connect to the platform and return the inbound event stream. Called once.
    async fn subscribe(&self) -> Result<mpsc::Receiver<InboundMessage>, String>;

    /// Post a text message to a channel by name, as the bot's own identity.
    async fn post_message(&self, channel_name: &str, text: &str) -> Result<(), String>;

    /// Channel roster (id + name) as seen at connect time.
    async fn list_channels(&self) -> Result<Vec<ChannelInfo>, String>;

    /// User roster (id + name) as seen at connect time.
    async fn list_users(&self) -> Result<Vec<UserInfo>, String>;
}
