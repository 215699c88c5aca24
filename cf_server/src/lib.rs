//! HTTP and WebSocket front end for the Connect Four room server.
//!
//! Exposed as a library so the router can be driven directly from integration tests.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
