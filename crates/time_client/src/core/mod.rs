//! Protocol envelopes and error types for the stdio JSON-RPC client.
//!
//! ## Modules
//! - `error`: Client-side failure types
//! - `models`: JSON-RPC 2.0 envelopes and tool-layer result views

pub mod error;
pub mod models;
