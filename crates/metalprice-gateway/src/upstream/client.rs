use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{debug, warn};

use metalprice_core::error::{PriceProxyError, Result};
use metalprice_core::metal::join_codes;
use metalprice_core::protocol::upstream::UpstreamResponse;
use metalprice_core::Metal;

use super::{truncate_chars, Upstream};
use crate::config::GatewayConfig;

/// reqwest client for `api.metalpriceapi.com`-compatible endpoints.
pub struct MetalPriceClient {
    client: Client,
    endpoint: String,
    api_key: String,
    body_snippet_chars: usize,
}

impl MetalPriceClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
        user_agent: &str,
        body_snippet_chars: usize,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| PriceProxyError::Config(format!("http client build failed: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            body_snippet_chars,
        })
    }

    pub fn from_config(cfg: &GatewayConfig) -> Result<Self> {
        Self::new(
            cfg.upstream.endpoint.clone(),
            cfg.api_key.clone(),
            cfg.upstream.timeout(),
            &cfg.upstream.user_agent,
            cfg.prices.body_snippet_chars,
        )
    }

    fn snippet(&self, body: &Bytes) -> String {
        truncate_chars(&String::from_utf8_lossy(body), self.body_snippet_chars)
    }
}

#[async_trait]
impl Upstream for MetalPriceClient {
    async fn fetch(&self, base: &str, metals: &[Metal]) -> Result<UpstreamResponse> {
        let currencies = join_codes(metals);
        let params = [
            ("api_key", self.api_key.as_str()),
            ("base", base),
            ("currencies", currencies.as_str()),
        ];

        debug!(endpoint = %self.endpoint, %base, %currencies, "querying upstream");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&params)
            .send()
            .await
            .map_err(|e| PriceProxyError::Network(describe(&e)))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        if !content_type.contains("application/json") {
            let prefix = read_prefix(response, self.body_snippet_chars.saturating_mul(4)).await;
            warn!(%status, %content_type, "upstream did not return JSON");
            return Err(PriceProxyError::UpstreamContract {
                reason: format!("API did not return JSON (status {status}, content-type {content_type:?})"),
                body: Some(self.snippet(&prefix)),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| PriceProxyError::Network(describe(&e)))?;

        UpstreamResponse::from_slice(&body).map_err(|e| match e {
            PriceProxyError::UpstreamContract { reason, .. } => PriceProxyError::UpstreamContract {
                reason,
                body: Some(self.snippet(&body)),
            },
            other => other,
        })
    }

    fn name(&self) -> &str {
        "metalpriceapi"
    }
}

/// Reads at most `limit` bytes of the body.
async fn read_prefix(mut response: reqwest::Response, limit: usize) -> Bytes {
    let mut buf = BytesMut::new();
    while buf.len() < limit {
        match response.chunk().await {
            Ok(Some(chunk)) => buf.extend_from_slice(&chunk),
            Ok(None) => break,
            Err(e) => {
                debug!(error = %describe(&e), "upstream body read stopped");
                break;
            }
        }
    }
    buf.truncate(limit);
    buf.freeze()
}

/// reqwest errors print the full request URL, which carries the API key.
fn describe(e: &reqwest::Error) -> String {
    let kind = if e.is_timeout() {
        "request timed out"
    } else if e.is_connect() {
        "connection failed"
    } else if e.is_body() || e.is_decode() {
        "reading response body failed"
    } else {
        "request failed"
    };
    match e.status() {
        Some(s) => format!("{kind} (status {s})"),
        None => kind.to_string(),
    }
}
