//! # Time MCP Server Core
//!
//! Time rendering and timezone-offset operations for the MCP server.
//!
//! ## Modules
//! - `clock`: Injectable source of the current instant
//! - `error`: Custom error types and error handling
//! - `models`: Typed tool parameter structures
//! - `provider`: Time rendering and offset calculations
//! - `utils`: Format constants and helper functions

pub mod clock;
pub mod error;
pub mod models;
pub mod provider;
pub mod utils;
