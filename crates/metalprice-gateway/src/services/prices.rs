use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::time::Instant;
use tracing::{info, warn};

use metalprice_core::error::{PriceProxyError, Result};
use metalprice_core::rates::{collect_rates, invert, round_prices};
use metalprice_core::{Metal, PriceSnapshot};

use crate::cache::{CacheEntry, PriceCache};
use crate::config::GatewayConfig;
use crate::obs::PriceMetrics;
use crate::upstream::Upstream;

/// How a price request was satisfied.
#[derive(Debug, Clone)]
pub enum Served {
    /// Fresh cache entry, no upstream call.
    Cached(PriceSnapshot),
    /// Fetched from upstream just now and written to the cache.
    Fetched(PriceSnapshot),
    /// Upstream unreachable; previous result returned past its TTL.
    Stale {
        snapshot: PriceSnapshot,
        error: PriceProxyError,
    },
}

impl Served {
    pub fn snapshot(&self) -> &PriceSnapshot {
        match self {
            Served::Cached(s) | Served::Fetched(s) => s,
            Served::Stale { snapshot, .. } => snapshot,
        }
    }
}

/// Cache-then-fetch-then-transform for one base currency at a time.
pub struct PriceService {
    upstream: Arc<dyn Upstream>,
    cache: PriceCache,
    metals: Vec<Metal>,
    ttl: Duration,
    precision: Option<u32>,
    metrics: Arc<PriceMetrics>,
}

impl PriceService {
    pub fn new(
        upstream: Arc<dyn Upstream>,
        metals: Vec<Metal>,
        ttl: Duration,
        precision: Option<u32>,
        metrics: Arc<PriceMetrics>,
    ) -> Self {
        Self {
            upstream,
            cache: PriceCache::new(),
            metals,
            ttl,
            precision,
            metrics,
        }
    }

    pub fn from_config(cfg: &GatewayConfig, upstream: Arc<dyn Upstream>, metrics: Arc<PriceMetrics>) -> Self {
        Self::new(
            upstream,
            cfg.prices.metals.clone(),
            cfg.cache.ttl(),
            cfg.prices.precision,
            metrics,
        )
    }

    pub fn cache(&self) -> &PriceCache {
        &self.cache
    }

    /// Serve prices for `base` (already normalized).
    ///
    /// The slot lock is held through the upstream call, so a concurrent
    /// caller for the same base waits and then sees the entry written here.
    pub async fn prices(&self, base: &str) -> Result<Served> {
        let mut slot = self.cache.lock(base).await;
        let now = Instant::now();

        if let Some(entry) = slot.as_ref().filter(|e| e.is_fresh(now, self.ttl)) {
            self.metrics.cache_lookups.inc(&[("base", base), ("result", "hit")]);
            return Ok(Served::Cached(entry.snapshot.clone()));
        }
        self.metrics.cache_lookups.inc(&[("base", base), ("result", "miss")]);

        match self.refresh(base).await {
            Ok(snapshot) => {
                *slot = Some(CacheEntry::new(snapshot.clone(), now));
                Ok(Served::Fetched(snapshot))
            }
            Err(error) if error.is_recoverable() => match slot.as_ref() {
                Some(entry) => {
                    warn!(%base, %error, age_secs = now.saturating_duration_since(entry.fetched_at).as_secs(),
                        "upstream unavailable, serving stale prices");
                    self.metrics.stale_served.inc(&[("base", base)]);
                    Ok(Served::Stale {
                        snapshot: entry.snapshot.clone(),
                        error,
                    })
                }
                None => Err(error),
            },
            Err(error) => Err(error),
        }
    }

    /// fetch -> validate -> invert. Does not touch the cache.
    async fn refresh(&self, base: &str) -> Result<PriceSnapshot> {
        let started = Instant::now();
        let res = self.upstream.fetch(base, &self.metals).await;
        let elapsed = started.elapsed();
        self.metrics
            .upstream_fetch_duration
            .observe(&[("base", base)], elapsed);

        let res = res.and_then(|resp| {
            resp.ensure_success()?;
            Ok(resp)
        });

        let resp = match res {
            Ok(resp) => resp,
            Err(e) => {
                let outcome = outcome_label(&e);
                self.metrics
                    .upstream_fetches
                    .inc(&[("base", base), ("outcome", outcome)]);
                warn!(%base, upstream = self.upstream.name(), outcome, error = %e,
                    elapsed_ms = elapsed.as_millis() as u64, "upstream fetch failed");
                return Err(e);
            }
        };

        let mut prices = invert(&collect_rates(&resp, &self.metals));
        if let Some(p) = self.precision {
            prices = round_prices(&prices, p);
        }

        self.metrics
            .upstream_fetches
            .inc(&[("base", base), ("outcome", "ok")]);
        info!(%base, upstream = self.upstream.name(), metals = prices.len(),
            elapsed_ms = elapsed.as_millis() as u64, "prices refreshed");

        Ok(PriceSnapshot::new(base, unix_now(), &prices))
    }
}

fn outcome_label(e: &PriceProxyError) -> &'static str {
    match e {
        PriceProxyError::Network(_) => "network",
        PriceProxyError::UpstreamRejected(_) => "rejected",
        PriceProxyError::UpstreamContract { .. } => "contract",
        _ => "error",
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
