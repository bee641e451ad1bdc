//! Shared application state for the price proxy.
//!
//! Owns the compiled base allowlist, the price service (and through it the
//! cache), and the metrics registry. Construction returns Result so `main`
//! can fail before binding.

use std::sync::Arc;

use metalprice_core::error::Result;

use crate::config::GatewayConfig;
use crate::obs::PriceMetrics;
use crate::policy::BaseAllowlist;
use crate::services::PriceService;
use crate::upstream::{MetalPriceClient, Upstream};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    allowlist: BaseAllowlist,
    prices: PriceService,
    metrics: Arc<PriceMetrics>,
}

impl AppState {
    /// Build application state around the real upstream client.
    pub fn new(cfg: GatewayConfig) -> Result<Self> {
        let upstream = Arc::new(MetalPriceClient::from_config(&cfg)?);
        Self::with_upstream(cfg, upstream)
    }

    /// Build application state around any `Upstream` (tests inject mocks here).
    pub fn with_upstream(cfg: GatewayConfig, upstream: Arc<dyn Upstream>) -> Result<Self> {
        let allowlist = BaseAllowlist::compile(&cfg.prices.allowed_bases)?;
        let metrics = Arc::new(PriceMetrics::default());
        let prices = PriceService::from_config(&cfg, upstream, Arc::clone(&metrics));

        tracing::info!(
            bases = ?allowlist.bases(),
            ttl_secs = cfg.cache.ttl_secs,
            timeout_ms = cfg.upstream.timeout_ms,
            "price service ready"
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                allowlist,
                prices,
                metrics,
            }),
        })
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn allowlist(&self) -> &BaseAllowlist {
        &self.inner.allowlist
    }

    pub fn prices(&self) -> &PriceService {
        &self.inner.prices
    }

    pub fn metrics(&self) -> &PriceMetrics {
        &self.inner.metrics
    }
}
