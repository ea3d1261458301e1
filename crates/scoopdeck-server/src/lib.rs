//! Scoopdeck server library - HTTP/WebSocket front door for the Scoop command core.
//!
//! This library provides the HTTP routes, the notification WebSocket and the
//! application state. It's separated from main.rs to enable integration testing.

pub mod config;
pub mod events_ws;
pub mod logging;
pub mod routes;
pub mod state;
pub mod table_processor;
