//! Description of the page a session runs in.
//!
//! The session itself never touches a browser API. Everything it needs
//! from the surrounding page, the frame name, the query string, the
//! cross-origin message port, the legacy proxy caller, or a directly
//! reachable host console, is captured up front in a
//! [`PageEnvironment`] and handed to the session at construction.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crossframe_core::ArgBag;

use crate::canvas::CanvasRequest;
use crate::frames::FrameChain;
use crate::loader::ModuleLoader;

/// A channel that can post an opaque wire string to another origin.
pub trait MessagePort {
    /// Posts `payload` so that only `target_origin` may receive it.
    fn post(&self, payload: &str, target_origin: &str);
}

/// Extra routing fields attached to a legacy proxy call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyCallContext {
    /// Name of the frame issuing the call.
    pub origin_frame: Option<String>,
    /// Absolute URL of the origin-side proxy page.
    pub path_to_origin_proxy: Option<String>,
    /// Name of the enclosing frame, for doubly nested pages.
    pub target_parent_frame: Option<String>,
}

/// The pre-postMessage proxy-frame channel.
pub trait ProxyCaller {
    /// Relays an encoded call through the hidden proxy frame pair.
    fn call(&self, payload: &str, context: &ProxyCallContext);
}

/// Buffer for replies produced by a same-origin host while it is still
/// inside the call. Replies are drained and dispatched after the host
/// returns, so handlers never run re-entrantly under the host's stack.
#[derive(Default, Clone)]
pub struct DirectReply {
    replies: Rc<RefCell<Vec<ArgBag>>>,
}

impl DirectReply {
    /// Creates an empty reply buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues one reply from the host.
    pub fn push(&self, reply: ArgBag) {
        self.replies.borrow_mut().push(reply);
    }

    /// Takes all queued replies, oldest first.
    pub fn drain(&self) -> Vec<ArgBag> {
        self.replies.borrow_mut().drain(..).collect()
    }
}

/// A console API reachable without crossing an origin boundary.
pub trait HostConsole {
    /// Invokes the named operation, queueing any replies on `reply`.
    fn invoke(&self, frame_id: &str, name: &str, args: &ArgBag, reply: &DirectReply);
}

/// Everything the session needs to know about the page it lives in.
#[derive(Default)]
pub struct PageEnvironment {
    /// Full URL of the page, including the query string.
    pub page_url: String,
    /// Raw query string, with or without the leading `?`.
    pub query: String,
    /// The window's own name, when the page is itself a named frame.
    pub window_name: Option<String>,
    /// Name of the parent frame, for pages nested one level down.
    pub parent_frame_name: Option<String>,
    /// True when the page sits inside another frame.
    pub nested: bool,
    /// Host-assigned frame ids for embedded pages, keyed by the
    /// embedding frame's own name.
    pub embedded_page_ids: HashMap<String, String>,
    /// Ancestor frame names, nearest first, as far as they are readable.
    pub frame_chain: FrameChain,
    /// Same-origin console, when the page runs inside the host itself.
    pub host_console: Option<Rc<dyn HostConsole>>,
    /// Cross-origin channel to the console window.
    pub message_port: Option<Rc<dyn MessagePort>>,
    /// Legacy proxy-frame channel.
    pub legacy_caller: Option<Rc<dyn ProxyCaller>>,
    /// Name of the console-side proxy frame for the legacy channel.
    pub legacy_target_proxy: Option<String>,
    /// Canvas signed request, when the page is a canvas app.
    pub canvas_request: Option<CanvasRequest>,
    /// Loader for optional feature modules.
    pub module_loader: Option<Rc<dyn ModuleLoader>>,
}

impl PageEnvironment {
    /// Creates an environment for the page at `url`, deriving the
    /// query string from everything after the first `?`.
    pub fn new(url: impl Into<String>) -> Self {
        let page_url = url.into();
        let query = page_url
            .split_once('?')
            .map(|(_, q)| q.to_string())
            .unwrap_or_default();
        Self {
            page_url,
            query,
            ..Self::default()
        }
    }

    /// Overrides the query string.
    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// Sets the window's own name.
    #[must_use]
    pub fn with_window_name(mut self, name: impl Into<String>) -> Self {
        self.window_name = Some(name.into());
        self
    }

    /// Sets the parent frame name and marks the page as nested.
    #[must_use]
    pub fn with_parent_frame(mut self, name: impl Into<String>) -> Self {
        self.parent_frame_name = Some(name.into());
        self.nested = true;
        self
    }

    /// Marks the page as nested without a readable parent name.
    #[must_use]
    pub fn nested(mut self) -> Self {
        self.nested = true;
        self
    }

    /// Records the host-assigned frame id for an embedded page frame.
    #[must_use]
    pub fn with_embedded_page_id(
        mut self,
        frame_name: impl Into<String>,
        frame_id: impl Into<String>,
    ) -> Self {
        self.embedded_page_ids
            .insert(frame_name.into(), frame_id.into());
        self
    }

    /// Sets the ancestor frame chain.
    #[must_use]
    pub fn with_frame_chain(mut self, chain: FrameChain) -> Self {
        self.frame_chain = chain;
        self
    }

    /// Attaches a same-origin host console.
    #[must_use]
    pub fn with_host_console(mut self, console: Rc<dyn HostConsole>) -> Self {
        self.host_console = Some(console);
        self
    }

    /// Attaches a cross-origin message port.
    #[must_use]
    pub fn with_message_port(mut self, port: Rc<dyn MessagePort>) -> Self {
        self.message_port = Some(port);
        self
    }

    /// Attaches the legacy proxy channel and its console-side frame.
    #[must_use]
    pub fn with_legacy_caller(
        mut self,
        caller: Rc<dyn ProxyCaller>,
        target_proxy: impl Into<String>,
    ) -> Self {
        self.legacy_caller = Some(caller);
        self.legacy_target_proxy = Some(target_proxy.into());
        self
    }

    /// Attaches a canvas signed request.
    #[must_use]
    pub fn with_canvas_request(mut self, request: CanvasRequest) -> Self {
        self.canvas_request = Some(request);
        self
    }

    /// Attaches a module loader.
    #[must_use]
    pub fn with_module_loader(mut self, loader: Rc<dyn ModuleLoader>) -> Self {
        self.module_loader = Some(loader);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_derives_query_from_url() {
        let env = PageEnvironment::new(
            "https://app.example.com/page?sfdcIFrameOrigin=https%3A%2F%2Fna1.example.com&nonce=n1",
        );
        assert_eq!(
            env.query,
            "sfdcIFrameOrigin=https%3A%2F%2Fna1.example.com&nonce=n1"
        );
    }

    #[test]
    fn new_without_query_is_empty() {
        let env = PageEnvironment::new("https://app.example.com/page");
        assert!(env.query.is_empty());
        assert!(!env.nested);
    }

    #[test]
    fn with_parent_frame_marks_nested() {
        let env = PageEnvironment::new("https://x.test/").with_parent_frame("ext-comp-1001");
        assert!(env.nested);
        assert_eq!(env.parent_frame_name.as_deref(), Some("ext-comp-1001"));
    }

    #[test]
    fn direct_reply_drains_in_order() {
        let reply = DirectReply::new();
        let mut a = ArgBag::new();
        a.set("n", "1");
        let mut b = ArgBag::new();
        b.set("n", "2");
        reply.push(a);
        reply.push(b);
        let drained = reply.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].get_str("n"), Some("1"));
        assert!(reply.drain().is_empty());
    }
}
