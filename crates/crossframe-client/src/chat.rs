//! Live chat operations.
//!
//! Detail and log lookups return JSON blobs inside the flat reply bag;
//! those operations wrap the caller's callback and parse the `result`
//! field into typed structs before handing it over. Per-chat events
//! are scoped by chat key, so two chats on one page each see only
//! their own messages.

use crossframe_core::ArgBag;
use tracing::warn;

use crate::console::versioned_args;
use crate::registry::{EventHandler, EventKind, ResponseCallback};
use crate::session::{DispatchOutcome, Session, SessionCallback};

/// Details of one chat, parsed from the host's reply.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatDetails {
    /// Whether the lookup succeeded.
    pub success: bool,
    /// Primary tab the chat lives in, when known.
    pub primary_tab_id: Option<String>,
    /// Raw detail object, absent when the host sent none or the JSON
    /// did not parse.
    pub details: Option<serde_json::Value>,
}

/// A chat transcript, parsed from the host's reply.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatLog {
    /// Whether the lookup succeeded.
    pub success: bool,
    /// Chat messages exchanged so far.
    pub messages: Option<serde_json::Value>,
    /// Custom events raised during the chat.
    pub custom_events: Option<serde_json::Value>,
}

/// Chat keys held by the agent, with the host's empty-list quirk
/// normalized away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatKeys {
    /// Whether the lookup succeeded.
    pub success: bool,
    /// The chat keys.
    pub chat_keys: Vec<String>,
}

fn parse_result_field(args: &ArgBag) -> Option<serde_json::Value> {
    let raw = args.get_str("result").filter(|r| !r.is_empty())?;
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(%err, "chat result field is not valid JSON");
            None
        }
    }
}

fn parse_details(args: &ArgBag) -> ChatDetails {
    ChatDetails {
        success: args.get_bool("success").unwrap_or(false),
        primary_tab_id: args
            .get_str("primaryTabId")
            .filter(|id| !id.is_empty())
            .map(str::to_owned),
        details: parse_result_field(args),
    }
}

/// An empty list arrives as a single empty string, an artifact of the
/// wire codec's array encoding.
fn normalize_chat_keys(args: &ArgBag) -> ChatKeys {
    let raw = args.get_list("chatKey").unwrap_or_default();
    let chat_keys = if raw.len() == 1 && raw[0].is_empty() {
        Vec::new()
    } else {
        raw.to_vec()
    };
    ChatKeys {
        success: args.get_bool("success").unwrap_or(false),
        chat_keys,
    }
}

/// Live chat operations, borrowed from a console handle.
pub struct Chat<'a> {
    session: &'a mut Session,
}

impl<'a> Chat<'a> {
    pub(crate) fn new(session: &'a mut Session) -> Self {
        Self { session }
    }

    fn call(
        &mut self,
        name: &str,
        args: ArgBag,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        self.session
            .execute(name, args, callback.map(SessionCallback::Response))
    }

    fn subscribe_plain(&mut self, name: &str, args: ArgBag, handler: EventHandler) -> DispatchOutcome {
        self.session.execute(
            name,
            args,
            Some(SessionCallback::event(EventKind::Plain, handler)),
        )
    }

    /// Scoped by chat key: one page can watch several chats without
    /// the handlers seeing each other's events.
    fn subscribe_scoped(
        &mut self,
        name: &str,
        chat_key: &str,
        event_id: &str,
        handler: EventHandler,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("chatKey", chat_key);
        args.set("event", true);
        args.set("eventId", event_id);
        self.session.execute(
            name,
            args,
            Some(SessionCallback::event(
                EventKind::Scoped {
                    scope_key: format!("{name}{event_id}"),
                },
                handler,
            )),
        )
    }

    /// Details of the chat shown in a primary tab.
    pub fn get_details_by_primary_tab_id(
        &mut self,
        primary_tab_id: &str,
        callback: impl FnOnce(ChatDetails) + 'static,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("primaryTabId", primary_tab_id);
        self.call(
            "chatGetDetailsByPrimaryTabId",
            args,
            Some(Box::new(move |reply, _ctx| callback(parse_details(reply)))),
        )
    }

    /// Details of a chat addressed by its chat key.
    pub fn get_details_by_chat_key(
        &mut self,
        chat_key: &str,
        callback: impl FnOnce(ChatDetails) + 'static,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("chatKey", chat_key);
        self.call(
            "chatGetDetailsByChatKey",
            args,
            Some(Box::new(move |reply, _ctx| callback(parse_details(reply)))),
        )
    }

    /// Transcript of a chat.
    pub fn get_chat_log(
        &mut self,
        chat_key: &str,
        callback: impl FnOnce(ChatLog) + 'static,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("chatKey", chat_key);
        self.call(
            "chatGetChatLog",
            args,
            Some(Box::new(move |reply, _ctx| {
                let result = parse_result_field(reply);
                let field = |key: &str| {
                    result
                        .as_ref()
                        .and_then(|obj| obj.get(key))
                        .cloned()
                        .filter(|v| !v.is_null())
                };
                callback(ChatLog {
                    success: reply.get_bool("success").unwrap_or(false),
                    messages: field("messages"),
                    custom_events: field("customEvents"),
                });
            })),
        )
    }

    /// Current text in the agent's input box.
    pub fn get_agent_input(&mut self, chat_key: &str, callback: ResponseCallback) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("chatKey", chat_key);
        self.call("chatGetAgentInput", args, Some(callback))
    }

    /// Replaces the text in the agent's input box.
    pub fn set_agent_input(
        &mut self,
        chat_key: &str,
        text: &str,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("chatKey", chat_key);
        args.set("text", text);
        self.call("chatSetAgentInput", args, callback)
    }

    /// Sends a chat message to the visitor.
    pub fn send_message(
        &mut self,
        chat_key: &str,
        message: &str,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("chatKey", chat_key);
        args.set("message", message);
        self.call("chatSendMessage", args, callback)
    }

    /// Fires when a new message arrives in the given chat.
    pub fn on_new_message(&mut self, chat_key: &str, handler: EventHandler) -> DispatchOutcome {
        self.subscribe_scoped("chatOnNewMessage", chat_key, chat_key, handler)
    }

    /// Fires when the agent sends a message from the chat UI.
    pub fn on_agent_send(&mut self, chat_key: &str, handler: EventHandler) -> DispatchOutcome {
        self.subscribe_scoped("chatOnAgentSend", chat_key, chat_key, handler)
    }

    /// Fires when the visitor's typing state changes.
    pub fn on_typing_update(&mut self, chat_key: &str, handler: EventHandler) -> DispatchOutcome {
        self.subscribe_scoped("chatOnTypingUpdate", chat_key, chat_key, handler)
    }

    /// Fires on a custom event of `event_type` in the given chat.
    pub fn on_custom_event(
        &mut self,
        chat_key: &str,
        event_type: &str,
        handler: EventHandler,
    ) -> DispatchOutcome {
        let event_id = format!("{chat_key}{event_type}");
        let mut args = versioned_args();
        args.set("chatKey", chat_key);
        args.set("type", event_type);
        args.set("event", true);
        args.set("eventId", event_id.as_str());
        self.session.execute(
            "chatOnCustomEvent",
            args,
            Some(SessionCallback::event(
                EventKind::Scoped {
                    scope_key: format!("chatOnCustomEvent{event_id}"),
                },
                handler,
            )),
        )
    }

    /// Sends a custom event into the given chat.
    pub fn send_custom_event(
        &mut self,
        chat_key: &str,
        event_type: &str,
        data: &str,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("chatKey", chat_key);
        args.set("type", event_type);
        args.set("data", data);
        self.call("chatSendCustomEvent", args, callback)
    }

    /// Maximum number of concurrent chats for this agent.
    pub fn get_max_capacity(&mut self, callback: ResponseCallback) -> DispatchOutcome {
        self.call("getMaxCapacity", versioned_args(), Some(callback))
    }

    /// Keys of the currently engaged chats.
    pub fn get_engaged_chats(
        &mut self,
        callback: impl FnOnce(ChatKeys) + 'static,
    ) -> DispatchOutcome {
        self.call(
            "getEngagedChats",
            versioned_args(),
            Some(Box::new(move |reply, _ctx| {
                callback(normalize_chat_keys(reply));
            })),
        )
    }

    /// Keys of the pending chat requests.
    pub fn get_chat_requests(
        &mut self,
        callback: impl FnOnce(ChatKeys) + 'static,
    ) -> DispatchOutcome {
        self.call(
            "getChatRequests",
            versioned_args(),
            Some(Box::new(move |reply, _ctx| {
                callback(normalize_chat_keys(reply));
            })),
        )
    }

    /// The agent's current state.
    pub fn get_agent_state(&mut self, callback: ResponseCallback) -> DispatchOutcome {
        self.call("getAgentState", versioned_args(), Some(callback))
    }

    /// Sets the agent's state.
    pub fn set_agent_state(
        &mut self,
        state: &str,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("state", state);
        self.call("setAgentState", args, callback)
    }

    /// Fires when the agent's state changes.
    pub fn on_agent_state_changed(&mut self, handler: EventHandler) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("event", true);
        self.subscribe_plain("onAgentStateChanged", args, handler)
    }

    /// Fires when the agent's current chat capacity changes.
    pub fn on_current_capacity_changed(&mut self, handler: EventHandler) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("event", true);
        self.subscribe_plain("onCurrentCapacityChanged", args, handler)
    }

    /// Fires when a chat is routed to the agent.
    pub fn on_chat_requested(&mut self, handler: EventHandler) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("event", true);
        self.subscribe_plain("onChatRequested", args, handler)
    }

    /// Fires when a chat starts.
    pub fn on_chat_started(&mut self, handler: EventHandler) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("event", true);
        self.subscribe_plain("onChatStarted", args, handler)
    }

    /// Fires when a chat ends.
    pub fn on_chat_ended(&mut self, handler: EventHandler) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("event", true);
        self.subscribe_plain("onChatEnded", args, handler)
    }

    /// Fires when the agent declines a chat.
    pub fn on_chat_declined(&mut self, handler: EventHandler) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("event", true);
        self.subscribe_plain("onChatDeclined", args, handler)
    }

    /// Fires when a chat is transferred away from the agent.
    pub fn on_chat_transferred_out(&mut self, handler: EventHandler) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("event", true);
        self.subscribe_plain("onChatTransferredOut", args, handler)
    }

    /// Fires when the visitor cancels a pending chat request.
    pub fn on_chat_canceled(&mut self, handler: EventHandler) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("event", true);
        self.subscribe_plain("onChatCanceled", args, handler)
    }

    /// Fires when a chat enters or leaves the critical wait state.
    pub fn on_chat_critical_wait_state(
        &mut self,
        chat_key: &str,
        handler: EventHandler,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("event", true);
        args.set("chatId", chat_key);
        self.subscribe_plain("onChatCriticalWaitState", args, handler)
    }

    /// Accepts a pending chat request.
    pub fn accept_chat(
        &mut self,
        chat_key: &str,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("chatKey", chat_key);
        args.set("eventId", chat_key);
        self.call("acceptChat", args, callback)
    }

    /// Ends an engaged chat.
    pub fn end_chat(
        &mut self,
        chat_key: &str,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("chatKey", chat_key);
        self.call("endChat", args, callback)
    }

    /// Declines a pending chat request.
    pub fn decline_chat(
        &mut self,
        chat_key: &str,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("chatKey", chat_key);
        self.call("declineChat", args, callback)
    }

    /// Offers a file transfer to the visitor.
    pub fn init_file_transfer(
        &mut self,
        chat_key: &str,
        entity_id: &str,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("chatKey", chat_key);
        args.set("entityId", entity_id);
        self.call("initFileTransfer", args, callback)
    }

    /// Cancels an offered file transfer.
    pub fn cancel_file_transfer_by_agent(
        &mut self,
        chat_key: &str,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("chatKey", chat_key);
        self.call("cancelFileTransfer", args, callback)
    }

    /// Answers once a file transfer in the given chat completes.
    pub fn on_file_transfer_completed(
        &mut self,
        chat_key: &str,
        callback: ResponseCallback,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("chatKey", chat_key);
        self.call("onFileTransferCompleted", args, Some(callback))
    }

    /// Raises the chat's assistance flag.
    pub fn raise_flag(
        &mut self,
        chat_key: &str,
        message: &str,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("chatKey", chat_key);
        args.set("message", message);
        self.call("raiseFlag", args, callback)
    }

    /// Lowers the chat's assistance flag.
    pub fn lower_flag(
        &mut self,
        chat_key: &str,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("chatKey", chat_key);
        self.call("lowerFlag", args, callback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn details_parse_result_json() {
        let mut reply = ArgBag::new();
        reply.set("success", true);
        reply.set("primaryTabId", "scc3");
        reply.set("result", r#"{"visitor":"Ada","items":2}"#);
        let details = parse_details(&reply);
        assert!(details.success);
        assert_eq!(details.primary_tab_id.as_deref(), Some("scc3"));
        assert_eq!(
            details.details.unwrap()["visitor"],
            serde_json::json!("Ada")
        );
    }

    #[test]
    fn details_tolerate_missing_and_bad_result() {
        let mut reply = ArgBag::new();
        reply.set("success", false);
        let details = parse_details(&reply);
        assert!(!details.success);
        assert_eq!(details.primary_tab_id, None);
        assert_eq!(details.details, None);

        reply.set("result", "{not json");
        assert_eq!(parse_details(&reply).details, None);
    }

    #[test]
    fn empty_chat_key_list_is_normalized() {
        let mut reply = ArgBag::new();
        reply.set("success", true);
        reply.set("chatKey", vec![String::new()]);
        let keys = normalize_chat_keys(&reply);
        assert!(keys.success);
        assert!(keys.chat_keys.is_empty());
    }

    #[test]
    fn populated_chat_key_list_passes_through() {
        let mut reply = ArgBag::new();
        reply.set("success", true);
        reply.set("chatKey", vec!["k1".to_string(), "k2".to_string()]);
        let keys = normalize_chat_keys(&reply);
        assert_eq!(keys.chat_keys, vec!["k1".to_string(), "k2".to_string()]);
    }
}
