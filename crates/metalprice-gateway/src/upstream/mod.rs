//! Upstream pricing API.
//!
//! `Upstream` is the seam between the price service and the network; the
//! reqwest-backed `MetalPriceClient` is the production implementation.

pub mod client;

use async_trait::async_trait;

use metalprice_core::error::Result;
use metalprice_core::protocol::upstream::UpstreamResponse;
use metalprice_core::Metal;

pub use client::MetalPriceClient;

/// One GET against the pricing API.
///
/// Errors: `Network` for transport failures and timeouts, `UpstreamContract`
/// for a body that is not the expected JSON. A parsed body is returned as-is,
/// including `success: false`.
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn fetch(&self, base: &str, metals: &[Metal]) -> Result<UpstreamResponse>;

    fn name(&self) -> &str;
}

/// First `max_chars` characters of `body`, cut on a char boundary.
pub fn truncate_chars(body: &str, max_chars: usize) -> String {
    match body.char_indices().nth(max_chars) {
        Some((idx, _)) => body[..idx].to_string(),
        None => body.to_string(),
    }
}
