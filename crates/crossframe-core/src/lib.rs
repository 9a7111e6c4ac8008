//! Core types: argument bags, typed values, tracing setup
//!
//! This crate holds the data model shared by the wire codec and the
//! client: the flat key/value [`ArgBag`] that every call and event
//! carries, and the tracing initialization used by embedders.

pub mod tracing;
pub mod value;

pub use value::{ArgBag, Value};
