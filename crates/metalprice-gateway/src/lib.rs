//! metalprice gateway library entry.
//!
//! This crate wires config, the upstream client, the per-base cache, and the
//! price service into an axum router. It is intended to be consumed by the
//! binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod cache;
pub mod config;
pub mod obs;
pub mod policy;
pub mod router;
pub mod services;
pub mod transport;
pub mod upstream;
