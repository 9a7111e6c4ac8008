//! Call registry: named callbacks and event handler sets.
//!
//! The registry maps a name (an operation name for events, or
//! `name_txnId` for one-shot responses) to either a single-use response
//! callback or a set of persistent event handlers. Event sets come in
//! four shapes, chosen by the dispatcher through [`EventKind`]: plain
//! multicast, keyed by event type (global console events), keyed by a
//! caller-supplied scope (per-chat events), and the telephony end-call
//! set with its per-call-id one-shot semantics.

use std::collections::HashMap;
use std::rc::Rc;

use crossframe_core::ArgBag;

/// Context describing the host-side frame a message originated from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameContext {
    /// Identifier of the originating frame, when the host supplied one.
    pub frame_id: Option<String>,
}

/// A persistent event handler. `Rc` so a caller can hold the same
/// handle it registered and remove it by identity later.
pub type EventHandler = Rc<dyn Fn(&ArgBag, &FrameContext)>;

/// A single-use response callback.
pub type ResponseCallback = Box<dyn FnOnce(&ArgBag, &FrameContext)>;

/// The shape of an event subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// Every handler fires on every event under this name.
    Plain,
    /// Handlers are keyed by event type (global console events).
    Global {
        /// The event type this registration subscribes to.
        event_type: String,
    },
    /// Handlers are keyed by a caller-supplied scope, typically the
    /// operation name plus an instance id such as a chat key.
    Scoped {
        /// Full scope key this registration subscribes to.
        scope_key: String,
    },
    /// Telephony end-call handlers, optionally bound to one call
    /// object id. Bound handlers fire once for their id and are then
    /// removed; unbound handlers fire for every call.
    EndCall {
        /// Call object id the handler is bound to, if any.
        call_object_id: Option<String>,
    },
}

/// What the remote side must be told after removing a global handler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupFlags {
    /// This frame no longer has handlers for the removed event type.
    pub unregister_frame_for_event: bool,
    /// This frame no longer has handlers for any global event.
    pub unregister_frame_for_every_event: bool,
}

impl CleanupFlags {
    /// Returns true if the remote side needs to hear about the removal.
    pub fn any(&self) -> bool {
        self.unregister_frame_for_event || self.unregister_frame_for_every_event
    }
}

struct EndCallHandler {
    handler: EventHandler,
    call_object_id: Option<String>,
}

enum HandlerSet {
    Plain(Vec<EventHandler>),
    Global(HashMap<String, Vec<EventHandler>>),
    Scoped(HashMap<String, Vec<EventHandler>>),
    EndCall(Vec<EndCallHandler>),
}

enum Entry {
    OneShot(Option<ResponseCallback>),
    Events { name: String, set: HandlerSet },
}

/// The registry of callbacks awaiting inbound messages.
#[derive(Default)]
pub struct CallRegistry {
    entries: HashMap<String, Entry>,
}

impl CallRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a one-shot response callback under `key`,
    /// unconditionally replacing any previous entry.
    pub fn register_response(&mut self, key: impl Into<String>, callback: ResponseCallback) {
        self.entries
            .insert(key.into(), Entry::OneShot(Some(callback)));
    }

    /// Registers the first event handler for `name`, replacing any
    /// previous entry. The handler-set shape follows `kind`.
    pub fn register_event(&mut self, name: &str, kind: &EventKind, handler: EventHandler) {
        let set = match kind {
            EventKind::Plain => HandlerSet::Plain(vec![handler]),
            EventKind::Global { event_type } => {
                let mut by_type = HashMap::new();
                by_type.insert(event_type.clone(), vec![handler]);
                HandlerSet::Global(by_type)
            }
            EventKind::Scoped { scope_key } => {
                let mut by_scope = HashMap::new();
                by_scope.insert(scope_key.clone(), vec![handler]);
                HandlerSet::Scoped(by_scope)
            }
            EventKind::EndCall { call_object_id } => HandlerSet::EndCall(vec![EndCallHandler {
                handler,
                call_object_id: call_object_id.clone(),
            }]),
        };
        self.entries.insert(
            name.to_string(),
            Entry::Events {
                name: name.to_string(),
                set,
            },
        );
    }

    /// Adds a handler to an existing event entry for `name`.
    ///
    /// Returns `None` when no entry exists (the caller must register
    /// one), otherwise whether the event type / scope already had at
    /// least one handler. When it did, no remote registration call is
    /// needed, since the existing set already relays the event.
    pub fn add_event_handler(
        &mut self,
        name: &str,
        kind: &EventKind,
        handler: EventHandler,
    ) -> Option<bool> {
        let Some(Entry::Events { set, .. }) = self.entries.get_mut(name) else {
            return None;
        };
        let existing = match (set, kind) {
            (HandlerSet::Plain(handlers), EventKind::Plain) => {
                handlers.push(handler);
                true
            }
            (HandlerSet::Global(by_type), EventKind::Global { event_type }) => {
                let handlers = by_type.entry(event_type.clone()).or_default();
                let existing = !handlers.is_empty();
                handlers.push(handler);
                existing
            }
            (HandlerSet::Scoped(by_scope), EventKind::Scoped { scope_key }) => {
                let handlers = by_scope.entry(scope_key.clone()).or_default();
                let existing = !handlers.is_empty();
                handlers.push(handler);
                existing
            }
            (HandlerSet::EndCall(handlers), EventKind::EndCall { call_object_id }) => {
                handlers.push(EndCallHandler {
                    handler,
                    call_object_id: call_object_id.clone(),
                });
                true
            }
            _ => {
                tracing::warn!(name, "event kind does not match registered handler set");
                true
            }
        };
        Some(existing)
    }

    /// Adds `handler` to the event entry for `name`, creating the
    /// entry when absent. Returns true when the event type or scope
    /// already had a handler, meaning the remote side is already
    /// relaying this event here.
    pub fn subscribe(&mut self, name: &str, kind: &EventKind, handler: EventHandler) -> bool {
        match self.add_event_handler(name, kind, Rc::clone(&handler)) {
            Some(existing) => existing,
            None => {
                self.register_event(name, kind, handler);
                false
            }
        }
    }

    /// Returns true if an entry is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Removes the entry under `name`. Returns true if one existed.
    pub fn remove(&mut self, name: &str) -> bool {
        self.entries.remove(name).is_some()
    }

    /// Number of registered entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes one global event handler by identity.
    ///
    /// Returns `None` when `name` is not a global event entry.
    /// Otherwise returns the cleanup notices owed to the remote side;
    /// when the last handler of the last event type goes away, the
    /// whole entry is removed so a later registration starts fresh.
    pub fn remove_global_handler(
        &mut self,
        name: &str,
        event_type: &str,
        handler: &EventHandler,
    ) -> Option<CleanupFlags> {
        let Some(Entry::Events {
            set: HandlerSet::Global(by_type),
            ..
        }) = self.entries.get_mut(name)
        else {
            return None;
        };

        let mut flags = CleanupFlags::default();
        let Some(handlers) = by_type.get_mut(event_type) else {
            return Some(flags);
        };

        if let Some(index) = handlers.iter().position(|h| Rc::ptr_eq(h, handler)) {
            handlers.remove(index);
        }

        if handlers.is_empty() {
            // Drop the emptied type so a later registration triggers a
            // fresh remote call instead of being treated as existing.
            by_type.remove(event_type);
            flags.unregister_frame_for_event = true;
        }

        if by_type.is_empty() {
            flags.unregister_frame_for_every_event = true;
            self.entries.remove(name);
        }

        Some(flags)
    }

    /// Dispatches an inbound message to the entry under `key`.
    ///
    /// One-shot entries are consumed; event entries invoke every
    /// handler their shape selects. Returns false when no entry is
    /// registered (the message is the caller's to drop).
    pub fn dispatch(&mut self, key: &str, mut args: ArgBag, context: &FrameContext) -> bool {
        match self.entries.get_mut(key) {
            None => false,
            Some(Entry::OneShot(callback)) => {
                let callback = callback.take();
                self.entries.remove(key);
                if let Some(callback) = callback {
                    callback(&args, context);
                }
                true
            }
            Some(Entry::Events { name, set }) => {
                match set {
                    HandlerSet::Plain(handlers) => {
                        for handler in handlers.clone() {
                            handler(&args, context);
                        }
                    }
                    HandlerSet::Global(by_type) => {
                        let event_type = args
                            .remove("eventType")
                            .and_then(|v| v.as_str().map(str::to_owned))
                            .unwrap_or_default();
                        let handlers = by_type.get(&event_type).cloned().unwrap_or_default();
                        for handler in handlers {
                            handler(&args, context);
                        }
                    }
                    HandlerSet::Scoped(by_scope) => {
                        let event_id = args
                            .remove("eventId")
                            .and_then(|v| v.as_str().map(str::to_owned))
                            .unwrap_or_default();
                        let scope_key = format!("{name}{event_id}");
                        let handlers = by_scope.get(&scope_key).cloned().unwrap_or_default();
                        for handler in handlers {
                            handler(&args, context);
                        }
                    }
                    HandlerSet::EndCall(handlers) => {
                        let call_id = args.get_str("id").map(str::to_owned);
                        let mut retained = Vec::with_capacity(handlers.len());
                        for entry in handlers.drain(..) {
                            match (&entry.call_object_id, &call_id) {
                                // Bound to this call: fire once, drop.
                                (Some(bound), Some(id)) if bound == id => {
                                    (entry.handler)(&args, context);
                                }
                                // Bound to a different call: skip, keep.
                                (Some(_), _) => retained.push(entry),
                                // Unbound: fire every time, keep.
                                (None, _) => {
                                    (entry.handler)(&args, context);
                                    retained.push(entry);
                                }
                            }
                        }
                        *handlers = retained;
                    }
                }
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn counting_handler(hits: &Rc<RefCell<Vec<String>>>, label: &str) -> EventHandler {
        let hits = Rc::clone(hits);
        let label = label.to_string();
        Rc::new(move |_args, _ctx| hits.borrow_mut().push(label.clone()))
    }

    #[test]
    fn one_shot_is_consumed() {
        let hits = Rc::new(RefCell::new(Vec::new()));
        let mut registry = CallRegistry::new();
        let hits_clone = Rc::clone(&hits);
        registry.register_response(
            "openPrimaryTab_0",
            Box::new(move |args, _ctx| {
                hits_clone
                    .borrow_mut()
                    .push(args.get_str("id").unwrap_or_default().to_string());
            }),
        );

        let mut args = ArgBag::new();
        args.set("id", "scc1");
        assert!(registry.dispatch("openPrimaryTab_0", args.clone(), &FrameContext::default()));
        assert!(!registry.contains("openPrimaryTab_0"));
        // A second delivery finds nothing.
        assert!(!registry.dispatch("openPrimaryTab_0", args, &FrameContext::default()));
        assert_eq!(*hits.borrow(), vec!["scc1".to_string()]);
    }

    #[test]
    fn register_response_overwrites() {
        let mut registry = CallRegistry::new();
        registry.register_response("f", Box::new(|_args, _ctx| panic!("replaced")));
        let hits = Rc::new(RefCell::new(Vec::new()));
        let hits_clone = Rc::clone(&hits);
        registry.register_response(
            "f",
            Box::new(move |_args, _ctx| hits_clone.borrow_mut().push("kept".to_string())),
        );
        registry.dispatch("f", ArgBag::new(), &FrameContext::default());
        assert_eq!(*hits.borrow(), vec!["kept".to_string()]);
    }

    #[test]
    fn global_event_add_reports_existing_type() {
        let hits = Rc::new(RefCell::new(Vec::new()));
        let mut registry = CallRegistry::new();
        let kind = EventKind::Global {
            event_type: "SFORCE_CONSOLE:OPEN_TAB".to_string(),
        };

        assert_eq!(
            registry.add_event_handler("addEventListener", &kind, counting_handler(&hits, "a")),
            None
        );
        registry.register_event("addEventListener", &kind, counting_handler(&hits, "a"));
        // Same type again: existing.
        assert_eq!(
            registry.add_event_handler("addEventListener", &kind, counting_handler(&hits, "b")),
            Some(true)
        );
        // New type on the same entry: not existing.
        let other = EventKind::Global {
            event_type: "SFORCE_CONSOLE:CLOSE_TAB".to_string(),
        };
        assert_eq!(
            registry.add_event_handler("addEventListener", &other, counting_handler(&hits, "c")),
            Some(false)
        );
    }

    #[test]
    fn global_dispatch_routes_by_event_type_and_strips_it() {
        let hits = Rc::new(RefCell::new(Vec::new()));
        let seen_type = Rc::new(RefCell::new(None::<bool>));
        let mut registry = CallRegistry::new();
        let kind = EventKind::Global {
            event_type: "SFORCE_CONSOLE:OPEN_TAB".to_string(),
        };
        let seen = Rc::clone(&seen_type);
        let hits_clone = Rc::clone(&hits);
        registry.register_event(
            "addEventListener",
            &kind,
            Rc::new(move |args, _ctx| {
                hits_clone.borrow_mut().push("open".to_string());
                *seen.borrow_mut() = Some(args.contains("eventType"));
            }),
        );
        let close = EventKind::Global {
            event_type: "SFORCE_CONSOLE:CLOSE_TAB".to_string(),
        };
        registry.add_event_handler("addEventListener", &close, counting_handler(&hits, "close"));

        let mut args = ArgBag::new();
        args.set("eventType", "SFORCE_CONSOLE:OPEN_TAB");
        args.set("message", "hello");
        assert!(registry.dispatch("addEventListener", args, &FrameContext::default()));

        assert_eq!(*hits.borrow(), vec!["open".to_string()]);
        // The eventType key is stripped before handlers run.
        assert_eq!(*seen_type.borrow(), Some(false));
    }

    #[test]
    fn remove_global_handler_sets_cleanup_flags() {
        let hits = Rc::new(RefCell::new(Vec::new()));
        let mut registry = CallRegistry::new();
        let open = EventKind::Global {
            event_type: "OPEN".to_string(),
        };
        let close = EventKind::Global {
            event_type: "CLOSE".to_string(),
        };
        let h1 = counting_handler(&hits, "h1");
        let h2 = counting_handler(&hits, "h2");
        let h3 = counting_handler(&hits, "h3");
        registry.register_event("addEventListener", &open, Rc::clone(&h1));
        registry.add_event_handler("addEventListener", &open, Rc::clone(&h2));
        registry.add_event_handler("addEventListener", &close, Rc::clone(&h3));

        // One of two OPEN handlers: no notices owed.
        let flags = registry
            .remove_global_handler("addEventListener", "OPEN", &h1)
            .unwrap();
        assert!(!flags.any());

        // Last OPEN handler: the frame is done with that event type.
        let flags = registry
            .remove_global_handler("addEventListener", "OPEN", &h2)
            .unwrap();
        assert!(flags.unregister_frame_for_event);
        assert!(!flags.unregister_frame_for_every_event);

        // Last handler overall: the frame is done with global events
        // entirely and the entry is gone.
        let flags = registry
            .remove_global_handler("addEventListener", "CLOSE", &h3)
            .unwrap();
        assert!(flags.unregister_frame_for_event);
        assert!(flags.unregister_frame_for_every_event);
        assert!(!registry.contains("addEventListener"));
    }

    #[test]
    fn remove_global_handler_unknown_type_is_quiet() {
        let hits = Rc::new(RefCell::new(Vec::new()));
        let mut registry = CallRegistry::new();
        let kind = EventKind::Global {
            event_type: "OPEN".to_string(),
        };
        let h = counting_handler(&hits, "h");
        registry.register_event("addEventListener", &kind, Rc::clone(&h));
        let flags = registry
            .remove_global_handler("addEventListener", "NEVER_SEEN", &h)
            .unwrap();
        assert!(!flags.any());
    }

    #[test]
    fn removed_type_registers_fresh_next_time() {
        let hits = Rc::new(RefCell::new(Vec::new()));
        let mut registry = CallRegistry::new();
        let open = EventKind::Global {
            event_type: "OPEN".to_string(),
        };
        let close = EventKind::Global {
            event_type: "CLOSE".to_string(),
        };
        let h1 = counting_handler(&hits, "h1");
        registry.register_event("addEventListener", &open, Rc::clone(&h1));
        registry.add_event_handler("addEventListener", &close, counting_handler(&hits, "h2"));
        registry.remove_global_handler("addEventListener", "OPEN", &h1);

        // Re-adding OPEN must report a new type so the dispatcher
        // issues a fresh remote registration.
        assert_eq!(
            registry.add_event_handler("addEventListener", &open, counting_handler(&hits, "h3")),
            Some(false)
        );
    }

    #[test]
    fn scoped_dispatch_routes_by_scope_key() {
        let hits = Rc::new(RefCell::new(Vec::new()));
        let mut registry = CallRegistry::new();
        let chat_a = EventKind::Scoped {
            scope_key: "chatOnNewMessageCHAT_A".to_string(),
        };
        registry.register_event("chatOnNewMessage", &chat_a, counting_handler(&hits, "a"));
        let chat_b = EventKind::Scoped {
            scope_key: "chatOnNewMessageCHAT_B".to_string(),
        };
        assert_eq!(
            registry.add_event_handler("chatOnNewMessage", &chat_b, counting_handler(&hits, "b")),
            Some(false)
        );

        let mut args = ArgBag::new();
        args.set("eventId", "CHAT_B");
        args.set("content", "hi");
        registry.dispatch("chatOnNewMessage", args, &FrameContext::default());
        assert_eq!(*hits.borrow(), vec!["b".to_string()]);
    }

    #[test]
    fn end_call_bound_handler_fires_once_for_matching_id() {
        let hits = Rc::new(RefCell::new(Vec::new()));
        let mut registry = CallRegistry::new();
        let bound = EventKind::EndCall {
            call_object_id: Some("call-7".to_string()),
        };
        registry.register_event("onCallEnd", &bound, counting_handler(&hits, "bound"));
        let unbound = EventKind::EndCall {
            call_object_id: None,
        };
        assert_eq!(
            registry.add_event_handler("onCallEnd", &unbound, counting_handler(&hits, "any")),
            Some(true)
        );

        let mut other = ArgBag::new();
        other.set("id", "call-9");
        registry.dispatch("onCallEnd", other, &FrameContext::default());
        // Only the unbound handler fired.
        assert_eq!(*hits.borrow(), vec!["any".to_string()]);

        let mut matching = ArgBag::new();
        matching.set("id", "call-7");
        registry.dispatch("onCallEnd", matching.clone(), &FrameContext::default());
        assert_eq!(
            *hits.borrow(),
            vec!["any".to_string(), "bound".to_string(), "any".to_string()]
        );

        // The bound handler is gone; the unbound one persists.
        registry.dispatch("onCallEnd", matching, &FrameContext::default());
        assert_eq!(
            *hits.borrow(),
            vec![
                "any".to_string(),
                "bound".to_string(),
                "any".to_string(),
                "any".to_string()
            ]
        );
    }

    #[test]
    fn plain_event_handlers_all_fire_and_persist() {
        let hits = Rc::new(RefCell::new(Vec::new()));
        let mut registry = CallRegistry::new();
        registry.register_event("onTabSave", &EventKind::Plain, counting_handler(&hits, "x"));
        assert_eq!(
            registry.add_event_handler("onTabSave", &EventKind::Plain, counting_handler(&hits, "y")),
            Some(true)
        );

        registry.dispatch("onTabSave", ArgBag::new(), &FrameContext::default());
        registry.dispatch("onTabSave", ArgBag::new(), &FrameContext::default());
        assert_eq!(hits.borrow().len(), 4);
        assert!(registry.contains("onTabSave"));
    }
}
