//! # MCP Time Client
//!
//! A minimal test client for MCP tool servers speaking newline-delimited
//! JSON-RPC 2.0 over stdio. The client spawns the server as a subprocess,
//! correlates responses to requests by identifier, and fails any request
//! that stays unanswered past a fixed timeout.
//!
//! ## Modules
//! - `client`: Process spawning, request dispatch, and response correlation
//! - `core`: Protocol envelopes, tool-layer views, and error types

pub mod client;
pub mod core;
