//! Wire codec, message assembly and parsing for the cross-frame channel.
//!
//! Every message exchanged with the host shell is a single string: a
//! fixed namespace prefix followed by `key=tag:value` pairs joined by
//! `&`:
//!
//! ```text
//! integrationApi/key1=s:value1&key2=b:true&key3=a:elem1;elem2
//! ```
//!
//! Type tags are `s` (string), `b` (boolean) and `a` (array, elements
//! joined by `;`). Keys and scalar values are percent-encoded, so no
//! unescaped delimiter (`&`, `;`, `:`, `=`) ever appears inside decoded
//! content.
//!
//! # Example
//!
//! ```rust
//! use crossframe_core::ArgBag;
//! use crossframe_protocol::{decode, encode};
//!
//! let mut bag = ArgBag::new();
//! bag.set("label", "A & B");
//! bag.set("activate", true);
//! let wire = encode(&bag);
//! assert_eq!(decode(&wire).unwrap(), bag);
//! ```

mod codec;
mod error;
mod message;
mod query;

pub use codec::{decode, encode};
pub use error::{WireError, WireResult};
pub use message::{InboundMessage, OutboundCall, parse_inbound};
pub use query::parse_query_string;

/// Namespace prefix carried by every message on the channel.
pub const API_NAMESPACE: &str = "integrationApi/";

/// API version stamped on every outbound call.
pub const API_VERSION: &str = "57.0";

/// Fixed name of the host-shell callee targeted by every call.
pub const CALLEE_NAME: &str = "sfdc-console";

/// Reserved keys of the outer message bag.
pub mod keys {
    /// Operation name of the call, or the registry key a reply targets.
    pub const NAME: &str = "xdomain_name";
    /// Fixed callee name (`sfdc-console`); identifies the target frame.
    pub const TARGET_FRAME: &str = "xdomain_targetFrame";
    /// Transaction id correlating one-shot responses.
    pub const TXN_ID: &str = "xdomain_txnId";
    /// Name of the frame the call originates from.
    pub const ORIGIN_FRAME: &str = "xdomain_originFrame";
    /// Origin-side proxy location for the legacy transport.
    pub const PATH_TO_ORIGIN_PROXY: &str = "xdomain_pathToOriginProxy";
    /// Parent frame a reply should be routed through.
    pub const TARGET_PARENT_FRAME: &str = "xdomain_targetParentFrame";
    /// Shared secret established at startup.
    pub const NONCE: &str = "nonce";
    /// Operation name field of an inbound message.
    pub const INBOUND_NAME: &str = "name";
    /// Origin frame field of an inbound message.
    pub const INBOUND_ORIGIN_FRAME: &str = "originFrame";
    /// Nested, recursively encoded argument bag of an inbound message.
    pub const INBOUND_ARGS: &str = "args";
}
