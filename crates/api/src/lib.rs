//! HTTP API for the one-click product form: server wiring, routing, and request/response
//! mapping.

pub mod app;
pub mod config;
pub mod context;
pub mod middleware;
