//! The per-page session: outbound dispatch and inbound routing.
//!
//! A session owns the transaction counter, the call registry and the
//! selected transport. It is a single-threaded object; the page's
//! cooperative event loop serializes all access, so no interior locking
//! is involved.
//!
//! One-shot callbacks stay registered until the host answers. The
//! channel has no timeout, so a call the host never answers leaves its
//! callback resident for the lifetime of the page.

use crossframe_core::ArgBag;
use crossframe_protocol::{API_NAMESPACE, OutboundCall, WireError, parse_inbound, parse_query_string};
use tracing::{debug, warn};

use crate::canvas::CanvasClient;
use crate::environment::{DirectReply, PageEnvironment, ProxyCallContext};
use crate::loader::ToolkitModule;
use crate::registry::{
    CallRegistry, CleanupFlags, EventHandler, EventKind, FrameContext, ResponseCallback,
};
use crate::transport::Transport;

/// Marker stamped on every outbound argument bag from a canvas page.
const CANVAS_MARKER: &str = "_isCanvas";

/// What an operation wants done with the host's messages.
pub enum SessionCallback {
    /// A single answer correlated by transaction id.
    Response(ResponseCallback),
    /// A persistent event subscription.
    Event {
        /// Shape of the subscription.
        kind: EventKind,
        /// The handler to register.
        handler: EventHandler,
    },
}

impl SessionCallback {
    /// A one-shot response callback.
    pub fn response(callback: impl FnOnce(&ArgBag, &FrameContext) + 'static) -> Self {
        Self::Response(Box::new(callback))
    }

    /// A persistent event handler of the given shape.
    pub fn event(kind: EventKind, handler: EventHandler) -> Self {
        Self::Event { kind, handler }
    }
}

/// How an outbound call left the session.
#[derive(Debug, PartialEq)]
pub enum DispatchOutcome {
    /// The call went out on a cross-origin channel. Carries the
    /// transaction id when a response callback was registered.
    Sent {
        /// Transaction id correlating the eventual response.
        txn_id: Option<u64>,
    },
    /// The call ran against a same-origin host and already finished.
    /// Carries the host's immediate reply, if it produced one.
    Completed(Option<ArgBag>),
    /// The event type was already subscribed; nothing was sent.
    AlreadySubscribed,
    /// No transport is available; the call was dropped.
    Unavailable,
}

/// What became of an inbound payload.
#[derive(Debug, PartialEq)]
pub enum ReceiveOutcome {
    /// Routed to a registered callback.
    Delivered {
        /// Registry key the message was delivered under.
        name: String,
    },
    /// Sender origin did not match the trusted console origin.
    UntrustedOrigin,
    /// Payload does not carry the channel's namespace prefix.
    NotForUs,
    /// Parsed fine but nothing is registered under its name.
    Unroutable {
        /// Registry key the message targeted.
        name: String,
    },
    /// Payload failed to parse.
    Malformed(WireError),
}

/// A live connection to the enclosing console, bound to one page.
pub struct Session {
    env: PageEnvironment,
    canvas: CanvasClient,
    transport: Transport,
    registry: CallRegistry,
    txn_id: u64,
    origin_frame: Option<String>,
    direct_reply: DirectReply,
}

impl Session {
    /// Builds a session for `env`, selecting the transport once.
    pub fn new(env: PageEnvironment) -> Self {
        let canvas = CanvasClient::new(env.canvas_request.clone());
        let transport = Transport::select(&env, Some(&canvas));
        let origin_frame = Some(env.frame_chain.origin_frame_name())
            .filter(|n| !n.is_empty())
            .or_else(|| env.window_name.clone())
            .filter(|n| !n.is_empty());
        Self {
            env,
            canvas,
            transport,
            registry: CallRegistry::new(),
            txn_id: 0,
            origin_frame,
            direct_reply: DirectReply::new(),
        }
    }

    /// The transport this session selected at construction.
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Returns true when calls can actually reach the console.
    pub fn is_available(&self) -> bool {
        self.transport.is_available()
    }

    /// Returns true when the page runs in a canvas context.
    pub fn is_canvas_context(&self) -> bool {
        self.canvas.is_canvas_context()
    }

    /// Whether the page is rendered inside the console shell.
    ///
    /// An explicit `clc` query parameter decides outright; otherwise
    /// the classic `isdtp` query marker or the canvas signed request's
    /// console flag counts.
    pub fn is_in_console(&self) -> bool {
        let params = parse_query_string(&self.env.query);
        match params.get("clc").and_then(|v| v.as_deref()) {
            Some("1") => return true,
            Some("0") => return false,
            _ => {}
        }
        let qs = if self.env.query.is_empty() || self.env.query.starts_with('?') {
            self.env.query.clone()
        } else {
            format!("?{}", self.env.query)
        };
        (!qs.is_empty() && (qs.contains("?isdtp=") || qs.contains("&isdtp=")))
            || self.canvas.is_in_console()
    }

    /// Full URL of the page this session is bound to.
    pub fn page_url(&self) -> &str {
        &self.env.page_url
    }

    /// Starts loading an optional feature module. Returns false when
    /// the environment carries no loader.
    pub fn load_module(&self, module: ToolkitModule, on_loaded: Box<dyn FnOnce()>) -> bool {
        match &self.env.module_loader {
            Some(loader) => {
                loader.load(&module.script_path(), on_loaded);
                true
            }
            None => {
                debug!(module = module.name(), "no module loader available");
                false
            }
        }
    }

    /// Name of the frame this page's calls originate from, if known.
    pub fn origin_frame(&self) -> Option<&str> {
        self.origin_frame.as_deref()
    }

    /// Returns true if a callback is registered under `name`.
    pub fn has_listener(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    /// Drops the registry entry under `name`. Returns true if one
    /// existed.
    pub fn remove_listener(&mut self, name: &str) -> bool {
        self.registry.remove(name)
    }

    /// Removes one global event handler by identity; see
    /// [`CallRegistry::remove_global_handler`].
    pub fn remove_global_handler(
        &mut self,
        name: &str,
        event_type: &str,
        handler: &EventHandler,
    ) -> Option<CleanupFlags> {
        self.registry.remove_global_handler(name, event_type, handler)
    }

    /// Issues a call to the console.
    ///
    /// A response callback is registered under `name_txnId` before
    /// anything leaves the session, so a host answering immediately
    /// still finds it. The transaction counter advances only when a
    /// response callback was registered; event registrations and
    /// fire-and-forget calls reuse the current value.
    pub fn execute(
        &mut self,
        name: &str,
        mut args: ArgBag,
        callback: Option<SessionCallback>,
    ) -> DispatchOutcome {
        if !self.transport.is_available() {
            debug!(name, "no transport available, dropping call");
            return DispatchOutcome::Unavailable;
        }

        if self.canvas.is_canvas_context() {
            args.set(CANVAS_MARKER, true);
        }

        if let Transport::Direct { frame_id } = &self.transport {
            let frame_id = frame_id.clone();
            return self.execute_direct(&frame_id, name, args, callback);
        }

        let mut sent_txn = None;
        match callback {
            Some(SessionCallback::Response(callback)) => {
                let key = format!("{name}_{}", self.txn_id);
                self.registry.register_response(key, callback);
                sent_txn = Some(self.txn_id);
            }
            Some(SessionCallback::Event { kind, handler }) => {
                if self.registry.subscribe(name, &kind, handler) {
                    // The remote side already relays this event here.
                    return DispatchOutcome::AlreadySubscribed;
                }
            }
            None => {}
        }

        let origin_proxy = crate::transport::origin_proxy_path(&self.env.page_url);
        match &self.transport {
            Transport::PostMessage {
                console_origin,
                nonce,
            } => {
                let call = OutboundCall {
                    name: name.to_string(),
                    args,
                    txn_id: self.txn_id,
                    origin_frame: self.origin_frame.clone().unwrap_or_default(),
                    nonce: Some(nonce.clone()),
                    path_to_origin_proxy: Some(origin_proxy),
                    target_parent_frame: None,
                };
                if let Some(port) = &self.env.message_port {
                    port.post(&call.to_wire(), console_origin);
                }
            }
            Transport::Legacy {
                path_to_origin_proxy,
                ..
            } => {
                let call = OutboundCall {
                    name: name.to_string(),
                    args,
                    txn_id: self.txn_id,
                    origin_frame: self.origin_frame.clone().unwrap_or_default(),
                    nonce: None,
                    path_to_origin_proxy: Some(path_to_origin_proxy.clone()),
                    target_parent_frame: self.env.parent_frame_name.clone(),
                };
                let context = ProxyCallContext {
                    origin_frame: self.origin_frame.clone(),
                    path_to_origin_proxy: Some(path_to_origin_proxy.clone()),
                    target_parent_frame: self.env.parent_frame_name.clone(),
                };
                if let Some(caller) = &self.env.legacy_caller {
                    caller.call(&call.to_wire(), &context);
                }
            }
            Transport::Direct { .. } | Transport::Unavailable => unreachable!(),
        }

        if sent_txn.is_some() {
            self.txn_id += 1;
        }
        DispatchOutcome::Sent { txn_id: sent_txn }
    }

    /// Same-origin path: the host is invoked in place and its replies
    /// are dispatched after it returns, never under its stack.
    fn execute_direct(
        &mut self,
        frame_id: &str,
        name: &str,
        args: ArgBag,
        callback: Option<SessionCallback>,
    ) -> DispatchOutcome {
        let event = match callback {
            Some(SessionCallback::Event { kind, handler }) => {
                if self.registry.subscribe(name, &kind, handler) {
                    return DispatchOutcome::AlreadySubscribed;
                }
                true
            }
            Some(SessionCallback::Response(callback)) => {
                let key = format!("{name}_{}", self.txn_id);
                self.registry.register_response(key, callback);
                false
            }
            None => {
                self.invoke_host(frame_id, name, &args);
                let replies = self.drain_direct(name);
                return DispatchOutcome::Completed(replies.into_iter().next());
            }
        };

        self.invoke_host(frame_id, name, &args);
        let replies = self.drain_direct(name);
        let first = replies.first().cloned();
        let context = FrameContext {
            frame_id: Some(frame_id.to_string()),
        };
        let key = if event {
            name.to_string()
        } else {
            let key = format!("{name}_{}", self.txn_id);
            self.txn_id += 1;
            key
        };
        for reply in replies {
            self.registry.dispatch(&key, reply, &context);
        }
        DispatchOutcome::Completed(first)
    }

    fn invoke_host(&self, frame_id: &str, name: &str, args: &ArgBag) {
        if let Some(host) = &self.env.host_console {
            host.invoke(frame_id, name, args, &self.direct_reply);
        }
    }

    fn drain_direct(&self, name: &str) -> Vec<ArgBag> {
        let replies = self.direct_reply.drain();
        if replies.len() > 1 {
            debug!(name, count = replies.len(), "host produced multiple replies");
        }
        replies
    }

    /// Handles a raw payload arriving from the message channel.
    ///
    /// Only payloads from the trusted console origin with the channel
    /// namespace prefix are considered; everything else is reported
    /// and dropped without side effects.
    pub fn receive(&mut self, payload: &str, sender_origin: &str) -> ReceiveOutcome {
        if let Transport::PostMessage { console_origin, .. } = &self.transport {
            if sender_origin != console_origin {
                debug!(sender_origin, "dropping message from untrusted origin");
                return ReceiveOutcome::UntrustedOrigin;
            }
        }

        if !payload.starts_with(API_NAMESPACE) {
            return ReceiveOutcome::NotForUs;
        }

        let message = match parse_inbound(payload) {
            Ok(message) => message,
            Err(err) => {
                warn!(%err, "failed to parse inbound message");
                return ReceiveOutcome::Malformed(err);
            }
        };

        let context = FrameContext {
            frame_id: message.origin_frame,
        };
        if self.registry.dispatch(&message.name, message.args, &context) {
            ReceiveOutcome::Delivered { name: message.name }
        } else {
            debug!(name = message.name, "no callback registered for message");
            ReceiveOutcome::Unroutable { name: message.name }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clc_parameter_decides_console_detection() {
        let yes = Session::new(PageEnvironment::new("https://na1.example.com/page?clc=1"));
        assert!(yes.is_in_console());
        let no = Session::new(PageEnvironment::new(
            "https://na1.example.com/page?isdtp=vw&clc=0",
        ));
        assert!(!no.is_in_console());
    }

    #[test]
    fn isdtp_marker_means_console() {
        let session = Session::new(PageEnvironment::new("https://na1.example.com/page?isdtp=vw"));
        assert!(session.is_in_console());
        let deeper = Session::new(PageEnvironment::new(
            "https://na1.example.com/page?x=1&isdtp=vw",
        ));
        assert!(deeper.is_in_console());
        let plain = Session::new(PageEnvironment::new("https://na1.example.com/page"));
        assert!(!plain.is_in_console());
    }

    #[test]
    fn degraded_session_drops_calls_without_registering() {
        let mut session = Session::new(PageEnvironment::new("https://app.partner.com/widget"));
        assert!(!session.is_available());
        let outcome = session.execute(
            "getFocusedPrimaryTabId",
            ArgBag::new(),
            Some(SessionCallback::response(|_args, _ctx| {})),
        );
        assert_eq!(outcome, DispatchOutcome::Unavailable);
        assert!(!session.has_listener("getFocusedPrimaryTabId_0"));
    }
}
