//! metalprice core: transport-agnostic primitives for the metal price proxy.
//!
//! This crate defines the error taxonomy, metal codes, the upstream wire
//! format, and the rate inversion shared by the gateway. It carries no
//! transport or runtime dependencies.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Upstream bodies are untrusted: malformed input surfaces as
//! `PriceProxyError`, and a zero rate maps to an absent price.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod metal;
pub mod protocol;
pub mod rates;

/// Shared result type.
pub use error::{ClientCode, PriceProxyError, Result};
pub use metal::Metal;
pub use rates::{PriceSnapshot, RateMap};
