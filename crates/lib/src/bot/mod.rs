//! Hour-bank bot orchestrator: wires platform events to the classifier, the
//! balance client, and the reply formatter.

pub mod classifier;
pub mod formatter;

use crate::balance::{BalanceClient, BalanceError};
use crate::channels::{ChannelInfo, ChatClient, InboundMessage, UserInfo};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error("lookup failed: {0}")]
    Lookup(String),
    #[error(transparent)]
    Balance(#[from] BalanceError),
    #[error("post failed: {0}")]
    Post(String),
}

/// Connection state. The bot's own user id is resolved once on the `hello`
/// transition and only read afterwards; when the roster has no matching name
/// the id stays None and the self-check cannot exclude anyone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotState {
    Disconnected,
    Connected { self_user_id: Option<String> },
}

/// The bot: a chat-client handle, the balance client, and connection state.
pub struct HourBankBot {
    client: Arc<dyn ChatClient>,
    balance: BalanceClient,
    bot_name: String,
    state: BotState,
}

impl HourBankBot {
    pub fn new(client: Arc<dyn ChatClient>, balance: BalanceClient, bot_name: String) -> Self {
        Self {
            client,
            balance,
            bot_name,
            state: BotState::Disconnected,
        }
    }

    pub fn state(&self) -> &BotState {
        &self.state
    }

    /// Cached bot user id, if the Connected transition resolved one.
    pub fn self_user_id(&self) -> Option<String> {
        match &self.state {
            BotState::Connected { self_user_id } => self_user_id.clone(),
            BotState::Disconnected => None,
        }
    }

    /// Subscribe and process events strictly in delivery order until the
    /// stream closes. Balance lookups run on their own tasks, so a hung
    /// request delays only its own reply.
    pub async fn run(&mut self) -> Result<(), String> {
        let mut events = self.client.subscribe().await?;
        log::info!("{}: subscribed, waiting for events", self.bot_name);
        while let Some(event) = events.recv().await {
            self.handle_event(event).await;
        }
        log::info!("{}: event stream closed", self.bot_name);
        Ok(())
    }

    /// One inbound event: `hello` drives the Connected transition; chat
    /// messages run the classifier and may trigger one balance reply.
    pub async fn handle_event(&mut self, event: InboundMessage) {
        if event.event_type == "hello" {
            self.on_connected().await;
            return;
        }
        let self_id = self.self_user_id();
        if !classifier::should_reply(&event, self_id.as_deref(), &self.bot_name) {
            return;
        }
        let text = event.text.as_deref().unwrap_or_default();
        let Some(employee_id) = classifier::extract_employee_id(text) else {
            // Bot-name mention without the "banco " token carries no id.
            log::debug!("{}: mention without employee id, skipping", self.bot_name);
            return;
        };
        let channel_id = match event.channel.as_deref() {
            Some(id) => id,
            None => return,
        };
        let channel_name = match self.reply_channel_name(channel_id).await {
            Ok(name) => name,
            Err(e) => {
                log::warn!("{}: skipping reply: {}", self.bot_name, e);
                return;
            }
        };
        // One task per qualifying message; in-flight lookups may overlap and
        // complete in any order. Failures are logged, never re-raised into
        // the dispatcher.
        let client = Arc::clone(&self.client);
        let balance = self.balance.clone();
        tokio::spawn(async move {
            if let Err(e) = reply_with_balance(client, balance, &channel_name, &employee_id).await
            {
                log::warn!("balance reply for matricula {} failed: {}", employee_id, e);
            }
        });
    }

    /// Connected transition: resolve and cache the bot's own user id by
    /// scanning the roster for a name match. Not found => warn, no retry.
    async fn on_connected(&mut self) {
        let self_user_id = match self.resolve_user_by_name(&self.bot_name).await {
            Ok(Some(user)) => {
                log::info!("{}: resolved own user id {}", self.bot_name, user.id);
                Some(user.id)
            }
            Ok(None) => {
                log::warn!(
                    "{}: no roster user matches the bot name; self-authored messages cannot be excluded",
                    self.bot_name
                );
                None
            }
            Err(e) => {
                log::warn!("{}: user roster lookup failed: {}", self.bot_name, e);
                None
            }
        };
        self.state = BotState::Connected { self_user_id };
    }

    /// Channel roster lookup by id.
    pub async fn resolve_channel_by_id(&self, channel_id: &str) -> Result<Option<ChannelInfo>, BotError> {
        let channels = self.client.list_channels().await.map_err(BotError::Lookup)?;
        Ok(channels.into_iter().find(|c| c.id == channel_id))
    }

    /// User roster lookup by name.
    pub async fn resolve_user_by_name(&self, name: &str) -> Result<Option<UserInfo>, BotError> {
        let users = self.client.list_users().await.map_err(BotError::Lookup)?;
        Ok(users.into_iter().find(|u| u.name == name))
    }

    /// Name of the channel a reply should be posted to.
    async fn reply_channel_name(&self, channel_id: &str) -> Result<String, BotError> {
        self.resolve_channel_by_id(channel_id)
            .await?
            .map(|c| c.name)
            .ok_or_else(|| BotError::Lookup(format!("channel {} not in roster", channel_id)))
    }
}

/// Fetch one balance, format it, and post exactly one reply.
async fn reply_with_balance(
    client: Arc<dyn ChatClient>,
    balance: BalanceClient,
    channel_name: &str,
    employee_id: &str,
) -> Result<(), BotError> {
    let record = balance.fetch_balance(employee_id).await?;
    let reply = formatter::format_reply(&record);
    client
        .post_message(channel_name, &reply)
        .await
        .map_err(BotError::Post)?;
    Ok(())
}
