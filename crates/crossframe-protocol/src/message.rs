//! Outbound call assembly and inbound message parsing.
//!
//! Outbound calls flatten routing context and operation arguments into
//! one bag behind the namespace prefix. Inbound messages come back with
//! the operation arguments nested: the `args` field is itself an
//! encoded bag embedded as a string value, decoded recursively here.

use crossframe_core::{ArgBag, Value};

use crate::error::{WireError, WireResult};
use crate::{API_NAMESPACE, CALLEE_NAME, codec, keys};

/// A call ready to be sent to the host shell.
#[derive(Debug, Clone)]
pub struct OutboundCall {
    /// Operation name.
    pub name: String,
    /// Operation arguments.
    pub args: ArgBag,
    /// Transaction id stamped on the wire.
    pub txn_id: u64,
    /// Name of the frame this call originates from.
    pub origin_frame: String,
    /// Shared secret established at startup, absent on the legacy
    /// proxy channel.
    pub nonce: Option<String>,
    /// Origin-side proxy location, when known.
    pub path_to_origin_proxy: Option<String>,
    /// Parent frame replies should be routed through, when known.
    pub target_parent_frame: Option<String>,
}

impl OutboundCall {
    /// Serializes this call into the single-string wire form.
    ///
    /// Routing context keys go first, then the operation arguments,
    /// all in one flat bag behind [`API_NAMESPACE`].
    pub fn to_wire(&self) -> String {
        let mut context = ArgBag::new();
        context.set(keys::NAME, self.name.as_str());
        context.set(keys::TARGET_FRAME, CALLEE_NAME);
        context.set(keys::TXN_ID, self.txn_id.to_string());
        context.set_opt(keys::PATH_TO_ORIGIN_PROXY, self.path_to_origin_proxy.as_deref());
        context.set_opt(
            keys::TARGET_PARENT_FRAME,
            self.target_parent_frame.as_deref(),
        );
        context.set(keys::ORIGIN_FRAME, self.origin_frame.as_str());
        context.set_opt(keys::NONCE, self.nonce.as_deref());

        let mut wire = String::from(API_NAMESPACE);
        wire.push_str(&codec::encode(&context));
        if !self.args.is_empty() {
            wire.push('&');
            wire.push_str(&codec::encode(&self.args));
        }
        wire
    }
}

/// A message received from the host shell, decoded and routed by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Registry key this message targets: an event name, or a one-shot
    /// key of the form `name_txnId`.
    pub name: String,
    /// Name of the host-side frame the message originates from.
    pub origin_frame: Option<String>,
    /// Decoded operation arguments.
    pub args: ArgBag,
}

/// Parses a raw payload from the message channel.
///
/// The payload must carry the [`API_NAMESPACE`] prefix; the nested
/// `args` field is decoded recursively.
pub fn parse_inbound(payload: &str) -> WireResult<InboundMessage> {
    let body = payload
        .strip_prefix(API_NAMESPACE)
        .ok_or(WireError::MissingNamespace {
            expected: API_NAMESPACE,
        })?;

    let mut outer = codec::decode(body)?;
    let name = match outer.remove(keys::INBOUND_NAME) {
        Some(Value::Str(name)) => name,
        _ => {
            return Err(WireError::MissingField {
                field: keys::INBOUND_NAME,
            });
        }
    };
    let origin_frame = match outer.remove(keys::INBOUND_ORIGIN_FRAME) {
        Some(Value::Str(frame)) => Some(frame),
        _ => None,
    };
    let args = match outer.remove(keys::INBOUND_ARGS) {
        Some(Value::Str(nested)) => codec::decode(&nested)?,
        _ => {
            return Err(WireError::MissingField {
                field: keys::INBOUND_ARGS,
            });
        }
    };

    Ok(InboundMessage {
        name,
        origin_frame,
        args,
    })
}
