//! Upstream wire format.
//!
//! The pricing API is an untrusted third party: every field is optional on
//! the way in, and accessors fall back to defaults instead of failing.

pub mod upstream;
