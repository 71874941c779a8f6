//! Message classification: the four predicates that gate a balance reply,
//! plus employee-id extraction.

use crate::channels::InboundMessage;

/// Keyword that carries the employee id ("banco <matricula>"). The trailing
/// space is part of the token so splitting on it leaves the id.
pub const KEYWORD: &str = "banco ";

/// Chat message: event type "message" with non-empty text.
pub fn is_chat_message(msg: &InboundMessage) -> bool {
    msg.event_type == "message" && msg.text.as_deref().is_some_and(|t| !t.is_empty())
}

/// Channel conversation: Slack channel ids start with `C`; direct messages do not.
pub fn is_channel_conversation(msg: &InboundMessage) -> bool {
    msg.channel.as_deref().is_some_and(|c| c.starts_with('C'))
}

/// Not authored by the bot itself. When the bot's own id was never resolved
/// at connect time this check cannot exclude anything and every sender passes.
pub fn is_not_from_self(msg: &InboundMessage, self_user_id: Option<&str>) -> bool {
    match self_user_id {
        Some(id) => msg.user.as_deref() != Some(id),
        None => true,
    }
}

/// Mentions the "banco " keyword or the bot's own name (case-folded).
pub fn mentions_keyword(msg: &InboundMessage, bot_name: &str) -> bool {
    let Some(text) = msg.text.as_deref() else {
        return false;
    };
    let lowered = text.to_lowercase();
    lowered.contains(KEYWORD) || lowered.contains(&bot_name.to_lowercase())
}

/// All four predicates; a reply is considered only when every one holds.
pub fn should_reply(msg: &InboundMessage, self_user_id: Option<&str>, bot_name: &str) -> bool {
    is_chat_message(msg)
        && is_channel_conversation(msg)
        && is_not_from_self(msg, self_user_id)
        && mentions_keyword(msg, bot_name)
}

/// Employee id from "... banco <id> ...": the first token after the literal
/// keyword. A bot-name mention without the keyword carries no id and yields
/// None, so the caller skips the message instead of issuing a malformed lookup.
pub fn extract_employee_id(text: &str) -> Option<String> {
    let (_, rest) = text.split_once(KEYWORD)?;
    rest.split_whitespace().next().map(|s| s.to_string())
}
