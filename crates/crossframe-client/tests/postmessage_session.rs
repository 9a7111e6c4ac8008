//! End-to-end exercises over a captured message channel: outbound wire
//! shape, reply correlation, event idempotency and origin filtering.

use std::cell::RefCell;
use std::rc::Rc;

use crossframe_client::canvas::CanvasRequest;
use crossframe_client::environment::{MessagePort, ProxyCallContext, ProxyCaller};
use crossframe_client::{
    Console, DispatchOutcome, PageEnvironment, ReceiveOutcome, Transport, handler, response,
};
use crossframe_core::ArgBag;
use crossframe_protocol::{API_NAMESPACE, encode};

const CONSOLE_ORIGIN: &str = "https://na1.example.com";

#[derive(Default)]
struct CapturingPort {
    posts: RefCell<Vec<(String, String)>>,
}

impl MessagePort for CapturingPort {
    fn post(&self, payload: &str, target_origin: &str) {
        self.posts
            .borrow_mut()
            .push((payload.to_string(), target_origin.to_string()));
    }
}

#[derive(Default)]
struct CapturingProxy {
    calls: RefCell<Vec<(String, ProxyCallContext)>>,
}

impl ProxyCaller for CapturingProxy {
    fn call(&self, payload: &str, context: &ProxyCallContext) {
        self.calls
            .borrow_mut()
            .push((payload.to_string(), context.clone()));
    }
}

fn console_with_port() -> (Console, Rc<CapturingPort>) {
    // First caller wins; later calls fail harmlessly once a global
    // subscriber exists.
    let _ = crossframe_core::tracing::init_tracing(
        crossframe_core::tracing::TracingConfig::debug(),
    );
    let port = Rc::new(CapturingPort::default());
    let env = PageEnvironment::new(
        "https://app.partner.com/widget?sfdcIFrameOrigin=https%3A%2F%2Fna1.example.com&nonce=n42",
    )
    .with_window_name("ext-comp-1009")
    .with_message_port(Rc::clone(&port) as Rc<dyn MessagePort>);
    (Console::new(env), port)
}

/// Builds a reply the way the host shell does: outer routing bag with
/// the operation arguments nested as an encoded string.
fn host_reply(name: &str, args: &ArgBag) -> String {
    let mut outer = ArgBag::new();
    outer.set("name", name);
    outer.set("originFrame", "console-top");
    outer.set("args", encode(args));
    format!("{API_NAMESPACE}{}", encode(&outer))
}

#[test]
fn outbound_call_reaches_the_port_with_routing_context() {
    let (mut console, port) = console_with_port();
    assert!(matches!(console.transport(), Transport::PostMessage { .. }));

    let outcome = console.open_primary_tab(
        None,
        "/500",
        true,
        Some("Cases"),
        None,
        Some(response(|_reply, _ctx| {})),
    );
    assert_eq!(outcome, DispatchOutcome::Sent { txn_id: Some(0) });

    let posts = port.posts.borrow();
    assert_eq!(posts.len(), 1);
    let (payload, target) = &posts[0];
    assert_eq!(target, CONSOLE_ORIGIN);
    assert!(payload.starts_with(API_NAMESPACE));
    assert!(payload.contains("xdomain_name=s:openPrimaryTab"));
    assert!(payload.contains("xdomain_txnId=s:0"));
    assert!(payload.contains("xdomain_originFrame=s:ext-comp-1009"));
    assert!(payload.contains("nonce=s:n42"));
    assert!(payload.contains("url=s:%2F500"));
    assert!(payload.contains("activate=b:true"));
    assert!(payload.contains("label=s:Cases"));
    assert!(payload.contains("version=s:57.0"));
}

#[test]
fn replies_correlate_by_transaction_id_out_of_order() {
    let (mut console, _port) = console_with_port();
    let seen = Rc::new(RefCell::new(Vec::new()));

    for _ in 0..2 {
        let seen = Rc::clone(&seen);
        console.open_primary_tab(
            None,
            "/500",
            true,
            None,
            None,
            Some(response(move |reply, _ctx| {
                seen.borrow_mut()
                    .push(reply.get_str("id").unwrap_or_default().to_string());
            })),
        );
    }

    // Second call answered first.
    let mut late = ArgBag::new();
    late.set("success", true);
    late.set("id", "scc-second");
    let mut early = ArgBag::new();
    early.set("success", true);
    early.set("id", "scc-first");

    assert_eq!(
        console.receive(&host_reply("openPrimaryTab_1", &late), CONSOLE_ORIGIN),
        ReceiveOutcome::Delivered {
            name: "openPrimaryTab_1".to_string()
        }
    );
    assert_eq!(
        console.receive(&host_reply("openPrimaryTab_0", &early), CONSOLE_ORIGIN),
        ReceiveOutcome::Delivered {
            name: "openPrimaryTab_0".to_string()
        }
    );
    assert_eq!(
        *seen.borrow(),
        vec!["scc-second".to_string(), "scc-first".to_string()]
    );

    // Replies are one-shot; a duplicate has nowhere to go.
    assert_eq!(
        console.receive(&host_reply("openPrimaryTab_0", &early), CONSOLE_ORIGIN),
        ReceiveOutcome::Unroutable {
            name: "openPrimaryTab_0".to_string()
        }
    );
}

#[test]
fn event_calls_do_not_advance_the_transaction_counter() {
    let (mut console, port) = console_with_port();
    console
        .add_event_listener("MY_EVENT", handler(|_args, _ctx| {}), None)
        .unwrap();
    console.open_primary_tab(None, "/1", false, None, None, Some(response(|_r, _c| {})));

    let posts = port.posts.borrow();
    assert_eq!(posts.len(), 2);
    // Both calls went out with the same counter value; only the
    // one-shot consumed it.
    assert!(posts[0].0.contains("xdomain_txnId=s:0"));
    assert!(posts[1].0.contains("xdomain_txnId=s:0"));
}

#[test]
fn second_listener_for_same_event_type_stays_local() {
    let (mut console, port) = console_with_port();
    let hits = Rc::new(RefCell::new(0));

    let first = {
        let hits = Rc::clone(&hits);
        handler(move |_args, _ctx| *hits.borrow_mut() += 1)
    };
    let second = {
        let hits = Rc::clone(&hits);
        handler(move |_args, _ctx| *hits.borrow_mut() += 1)
    };

    assert!(matches!(
        console.add_event_listener("MY_EVENT", first, None).unwrap(),
        DispatchOutcome::Sent { txn_id: None }
    ));
    assert_eq!(
        console.add_event_listener("MY_EVENT", second, None).unwrap(),
        DispatchOutcome::AlreadySubscribed
    );
    // One remote registration, not two.
    assert_eq!(port.posts.borrow().len(), 1);

    // A different type on the same entry does go to the host.
    assert!(matches!(
        console
            .add_event_listener("OTHER_EVENT", handler(|_a, _c| {}), None)
            .unwrap(),
        DispatchOutcome::Sent { txn_id: None }
    ));
    assert_eq!(port.posts.borrow().len(), 2);

    let mut event = ArgBag::new();
    event.set("eventType", "MY_EVENT");
    event.set("message", "ping");
    console.receive(&host_reply("addEventListener", &event), CONSOLE_ORIGIN);
    assert_eq!(*hits.borrow(), 2);
}

#[test]
fn remove_event_listener_notifies_the_host_only_when_needed() {
    let (mut console, port) = console_with_port();
    let h1 = handler(|_args, _ctx| {});
    let h2 = handler(|_args, _ctx| {});

    console
        .add_event_listener("MY_EVENT", Rc::clone(&h1), None)
        .unwrap();
    console
        .add_event_listener("MY_EVENT", Rc::clone(&h2), None)
        .unwrap();
    assert_eq!(port.posts.borrow().len(), 1);

    // One handler of two: nothing to tell the host.
    assert_eq!(console.remove_event_listener("MY_EVENT", &h1, None), None);
    assert_eq!(port.posts.borrow().len(), 1);

    // Last handler: the host is told to stop relaying.
    let outcome = console.remove_event_listener("MY_EVENT", &h2, None);
    assert!(matches!(outcome, Some(DispatchOutcome::Sent { .. })));
    let posts = port.posts.borrow();
    let payload = &posts.last().unwrap().0;
    assert!(payload.contains("xdomain_name=s:removeEventListener"));
    assert!(payload.contains("eventType=s:MY_EVENT"));
    assert!(payload.contains("unregisterFrameForEvent=b:true"));
    assert!(payload.contains("unregisterFrameForEveryEvent=b:true"));
    drop(posts);

    // The subscription really is gone: registering again hits the host.
    console
        .add_event_listener("MY_EVENT", handler(|_a, _c| {}), None)
        .unwrap();
    assert_eq!(port.posts.borrow().len(), 3);
}

#[test]
fn tab_events_are_scoped_by_tab_id() {
    let (mut console, port) = console_with_port();
    let hits = Rc::new(RefCell::new(0));
    let hits_clone = Rc::clone(&hits);
    console
        .add_event_listener(
            "SFORCE_CONSOLE:CLOSE_TAB",
            handler(move |_args, _ctx| *hits_clone.borrow_mut() += 1),
            Some("scc7"),
        )
        .unwrap();
    assert!(
        port.posts.borrow()[0]
            .0
            .contains("eventType=s:SFORCE_CONSOLE%3ACLOSE_TAB%3Ascc7")
    );

    let mut other_tab = ArgBag::new();
    other_tab.set("eventType", "SFORCE_CONSOLE:CLOSE_TAB:scc9");
    console.receive(&host_reply("addEventListener", &other_tab), CONSOLE_ORIGIN);
    assert_eq!(*hits.borrow(), 0);

    let mut this_tab = ArgBag::new();
    this_tab.set("eventType", "SFORCE_CONSOLE:CLOSE_TAB:scc7");
    console.receive(&host_reply("addEventListener", &this_tab), CONSOLE_ORIGIN);
    assert_eq!(*hits.borrow(), 1);
}

#[test]
fn untrusted_origins_and_foreign_payloads_are_dropped() {
    let (mut console, _port) = console_with_port();
    let fired = Rc::new(RefCell::new(false));
    let fired_clone = Rc::clone(&fired);
    console.open_primary_tab(
        None,
        "/1",
        true,
        None,
        None,
        Some(response(move |_reply, _ctx| *fired_clone.borrow_mut() = true)),
    );

    let mut reply = ArgBag::new();
    reply.set("success", true);
    let payload = host_reply("openPrimaryTab_0", &reply);

    assert_eq!(
        console.receive(&payload, "https://evil.example.com"),
        ReceiveOutcome::UntrustedOrigin
    );
    assert!(!*fired.borrow());

    assert_eq!(
        console.receive("otherApi/name=s:x", CONSOLE_ORIGIN),
        ReceiveOutcome::NotForUs
    );

    assert!(matches!(
        console.receive("integrationApi/notapair", CONSOLE_ORIGIN),
        ReceiveOutcome::Malformed(_)
    ));

    // The genuine reply still lands afterwards.
    assert_eq!(
        console.receive(&payload, CONSOLE_ORIGIN),
        ReceiveOutcome::Delivered {
            name: "openPrimaryTab_0".to_string()
        }
    );
    assert!(*fired.borrow());
}

#[test]
fn bound_call_end_handler_fires_once_through_the_wire() {
    let (mut console, _port) = console_with_port();
    let hits = Rc::new(RefCell::new(0));
    let hits_clone = Rc::clone(&hits);
    console.cti().on_call_end(
        handler(move |_args, _ctx| *hits_clone.borrow_mut() += 1),
        Some("call-3"),
    );

    let mut other = ArgBag::new();
    other.set("id", "call-9");
    console.receive(&host_reply("onCallEnd", &other), CONSOLE_ORIGIN);
    assert_eq!(*hits.borrow(), 0);

    let mut matching = ArgBag::new();
    matching.set("id", "call-3");
    console.receive(&host_reply("onCallEnd", &matching), CONSOLE_ORIGIN);
    console.receive(&host_reply("onCallEnd", &matching), CONSOLE_ORIGIN);
    assert_eq!(*hits.borrow(), 1);
}

#[test]
fn chat_events_route_by_chat_key() {
    let (mut console, _port) = console_with_port();
    let seen = Rc::new(RefCell::new(Vec::new()));

    for key in ["CHAT_A", "CHAT_B"] {
        let seen = Rc::clone(&seen);
        let key = key.to_string();
        console.chat().on_new_message(
            &key.clone(),
            handler(move |args, _ctx| {
                seen.borrow_mut().push(format!(
                    "{key}:{}",
                    args.get_str("content").unwrap_or_default()
                ));
            }),
        );
    }

    let mut event = ArgBag::new();
    event.set("eventId", "CHAT_B");
    event.set("content", "hello");
    console.receive(&host_reply("chatOnNewMessage", &event), CONSOLE_ORIGIN);
    assert_eq!(*seen.borrow(), vec!["CHAT_B:hello".to_string()]);
}

#[test]
fn push_notification_listener_is_single() {
    let (mut console, port) = console_with_port();
    console
        .add_push_notification_listener(vec!["Case".to_string()], handler(|_a, _c| {}))
        .unwrap();
    assert!(port.posts.borrow()[0].0.contains("entities=a:Case"));

    assert!(
        console
            .add_push_notification_listener(vec!["Lead".to_string()], handler(|_a, _c| {}))
            .is_err()
    );
    assert_eq!(port.posts.borrow().len(), 1);

    // Removing frees the slot and issues the remote removal.
    assert!(console.remove_push_notification_listener(None).is_some());
    assert_eq!(port.posts.borrow().len(), 2);
    assert!(console.remove_push_notification_listener(None).is_none());
    assert!(
        console
            .add_push_notification_listener(vec!["Lead".to_string()], handler(|_a, _c| {}))
            .is_ok()
    );
}

#[test]
fn canvas_pages_stamp_the_canvas_marker_on_every_call() {
    let port = Rc::new(CapturingPort::default());
    let request = CanvasRequest::Raw(
        r#"{"context":{"environment":{"parameters":{
            "sfdcIframeOrigin":"https://na1.example.com","nonce":"c7"}}}}"#
            .to_string(),
    );
    let env = PageEnvironment::new("https://canvas.partner.com/app")
        .with_canvas_request(request)
        .with_message_port(Rc::clone(&port) as Rc<dyn MessagePort>);
    let mut console = Console::new(env);
    assert!(console.is_canvas_context());

    console.set_tab_title("Canvas", None);

    let posts = port.posts.borrow();
    assert_eq!(posts.len(), 1);
    assert!(posts[0].0.contains("_isCanvas=b:true"));
    assert_eq!(posts[0].1, CONSOLE_ORIGIN);
}

#[test]
fn legacy_proxy_carries_the_origin_proxy_path() {
    let proxy = Rc::new(CapturingProxy::default());
    let env = PageEnvironment::new("https://na1.example.com/apex/page")
        .with_window_name("ext-comp-1002")
        .with_legacy_caller(Rc::clone(&proxy) as Rc<dyn ProxyCaller>, "sfdc-xdomain-proxy");
    let mut console = Console::new(env);
    assert!(matches!(console.transport(), Transport::Legacy { .. }));

    console.set_tab_title("Greetings", None);

    let calls = proxy.calls.borrow();
    assert_eq!(calls.len(), 1);
    let (payload, context) = &calls[0];
    assert!(payload.contains("xdomain_name=s:setTabTitle"));
    assert!(!payload.contains("nonce"));
    assert_eq!(
        context.path_to_origin_proxy.as_deref(),
        Some("https://na1.example.com/support/console/xdomain/30.0/crossDomainProxy.html")
    );
    assert_eq!(context.origin_frame.as_deref(), Some("ext-comp-1002"));
}

#[test]
fn degraded_console_reports_unavailable_everywhere() {
    let mut console = Console::new(PageEnvironment::new("https://app.partner.com/widget"));
    assert!(matches!(console.transport(), Transport::Unavailable));
    assert_eq!(
        console.open_primary_tab(None, "/1", true, None, None, None),
        DispatchOutcome::Unavailable
    );
    assert_eq!(
        console
            .add_event_listener("MY_EVENT", handler(|_a, _c| {}), None)
            .unwrap(),
        DispatchOutcome::Unavailable
    );
    assert_eq!(
        console.chat().get_max_capacity(response(|_r, _c| {})),
        DispatchOutcome::Unavailable
    );
}
