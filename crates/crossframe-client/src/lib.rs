//! Transport selection, call registry, dispatcher and the console API
//!
//! This crate provides the [`Console`] handle: the full console, chat,
//! telephony and presence API surface over the cross-frame channel
//! implemented in `crossframe-protocol`.

pub mod canvas;
pub mod chat;
pub mod console;
pub mod cti;
pub mod environment;
pub mod error;
pub mod events;
pub mod frames;
pub mod loader;
pub mod presence;
pub mod registry;
pub mod session;
pub mod transport;

pub use console::{Console, handler, response};
pub use environment::PageEnvironment;
pub use error::{ClientError, ClientResult};
pub use registry::{EventHandler, EventKind, FrameContext, ResponseCallback};
pub use session::{DispatchOutcome, ReceiveOutcome, Session, SessionCallback};
pub use transport::Transport;
