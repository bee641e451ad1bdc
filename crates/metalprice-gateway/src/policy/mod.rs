//! Request policy.
//!
//! Compiles the configured base currencies into a lookup the HTTP layer
//! consults before touching the cache or the upstream.

pub mod allowlist;

pub use allowlist::{normalize_base, BaseAllowlist};
