//! Transport layer (HTTP).
//!
//! Handlers resolve the requested base currency, call the price service, and
//! map its outcome (fresh, stale, or error) onto a JSON response.

pub mod http;
