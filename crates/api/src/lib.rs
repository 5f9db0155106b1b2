//! HTTP API: server wiring, guard middleware and request context extraction.

pub mod app;
pub mod authz;
pub mod context;
pub mod middleware;
