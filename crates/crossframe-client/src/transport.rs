//! Transport selection.
//!
//! A session picks exactly one way to reach the console at
//! construction time, in a fixed order of preference: a same-origin
//! host console first, then the cross-origin message channel, then the
//! legacy hidden-proxy-frame channel. When none is available the
//! session runs degraded and every call becomes a logged no-op.

use tracing::debug;

use crate::canvas::CanvasClient;
use crate::environment::PageEnvironment;
use crossframe_protocol::parse_query_string;

/// Relative path of the origin-side proxy page used by the legacy
/// channel.
const ORIGIN_PROXY_PAGE: &str = "/support/console/xdomain/30.0/crossDomainProxy.html";

/// The channel a session uses to reach the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transport {
    /// Same-origin host console, invoked directly.
    Direct {
        /// Frame id this page is known to the host by.
        frame_id: String,
    },
    /// Cross-origin message channel.
    PostMessage {
        /// Origin the console window must present.
        console_origin: String,
        /// Nonce echoed on every message in both directions.
        nonce: String,
    },
    /// Hidden-proxy-frame channel for pre-message-channel consoles.
    Legacy {
        /// Name of the console-side proxy frame.
        target_proxy: String,
        /// Absolute URL of the origin-side proxy page.
        path_to_origin_proxy: String,
    },
    /// No channel available; calls are dropped with a diagnostic.
    Unavailable,
}

impl Transport {
    /// Picks the best available transport for `env`.
    pub fn select(env: &PageEnvironment, canvas: Option<&CanvasClient>) -> Self {
        if env.host_console.is_some() {
            if let Some(frame_id) = direct_frame_id(env) {
                debug!(frame_id, "using direct transport");
                return Self::Direct { frame_id };
            }
            debug!("host console reachable but frame id unknown");
        }

        if env.message_port.is_some() {
            if let Some((console_origin, nonce)) = post_message_auth(env, canvas) {
                debug!(console_origin, "using message channel transport");
                return Self::PostMessage {
                    console_origin,
                    nonce,
                };
            }
            debug!("message port present but origin or nonce missing");
        }

        if env.legacy_caller.is_some() {
            if let Some(target_proxy) = env.legacy_target_proxy.clone() {
                let path_to_origin_proxy =
                    format!("{}{ORIGIN_PROXY_PAGE}", origin_proxy_path(&env.page_url));
                debug!(target_proxy, "using legacy proxy transport");
                return Self::Legacy {
                    target_proxy,
                    path_to_origin_proxy,
                };
            }
        }

        debug!(page_url = env.page_url, "no transport available, running degraded");
        Self::Unavailable
    }

    /// Returns true when calls can actually leave the page.
    pub fn is_available(&self) -> bool {
        !matches!(self, Self::Unavailable)
    }
}

/// Resolves the frame id the host knows this page by.
///
/// The window's own name is the starting point. A page nested below
/// the top frame is either an embedded page, whose name maps through
/// the host's id table, or an internal iframe, which is addressed by
/// its parent's name.
fn direct_frame_id(env: &PageEnvironment) -> Option<String> {
    let own = env.window_name.clone().filter(|n| !n.is_empty());
    if env.nested {
        if let Some(mapped) = own.as_deref().and_then(|n| env.embedded_page_ids.get(n)) {
            return Some(mapped.clone());
        }
        if let Some(parent) = env.parent_frame_name.clone().filter(|n| !n.is_empty()) {
            return Some(parent);
        }
    }
    own
}

/// Extracts the console origin and nonce for the message channel.
///
/// Query parameters take precedence. Two historical spellings of the
/// origin parameter are accepted; origins from the query are lowercased
/// since frame names embed them in varying case. A canvas signed
/// request is the fallback and is taken verbatim.
fn post_message_auth(
    env: &PageEnvironment,
    canvas: Option<&CanvasClient>,
) -> Option<(String, String)> {
    let params = parse_query_string(&env.query);
    let origin = params
        .get("sfdcIFrameOrigin")
        .or_else(|| params.get("sfdcIframeOrigin"))
        .and_then(|v| v.clone());
    let nonce = params.get("nonce").and_then(|v| v.clone());
    if let (Some(origin), Some(nonce)) = (origin, nonce) {
        return Some((origin.to_lowercase(), nonce));
    }

    let auth = canvas?.auth_params();
    match (auth.iframe_origin, auth.nonce) {
        (Some(origin), Some(nonce)) => Some((origin, nonce)),
        _ => None,
    }
}

/// Origin (scheme, host, and explicit port) of `page_url`, used to
/// address the origin-side proxy page. Falls back to the input when
/// the URL does not parse.
pub fn origin_proxy_path(page_url: &str) -> String {
    match url::Url::parse(page_url) {
        Ok(parsed) => {
            let scheme = parsed.scheme();
            let host = parsed.host_str().unwrap_or_default();
            match parsed.port() {
                Some(port) => format!("{scheme}://{host}:{port}"),
                None => format!("{scheme}://{host}"),
            }
        }
        Err(_) => page_url.to_string(),
    }
}
