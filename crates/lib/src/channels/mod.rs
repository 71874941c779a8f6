//! Platform channel layer.
//!
//! The `ChatClient` trait is the bot's capability handle onto the messaging
//! platform; the Slack connector implements it over rtm.start + websocket.

mod client;
mod event;
mod slack;

pub use client::ChatClient;
pub use event::{ChannelInfo, InboundMessage, UserInfo};
pub use slack::{SlackConnector, SlackError};
