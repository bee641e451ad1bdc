use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;
use metalprice_core::error::{PriceProxyError, Result};
use metalprice_core::Metal;

use crate::policy::allowlist::normalize_base;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub upstream: UpstreamSection,

    #[serde(default)]
    pub cache: CacheSection,

    #[serde(default)]
    pub prices: PricesSection,

    /// Only ever taken from the environment.
    #[serde(skip)]
    pub api_key: String,
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(PriceProxyError::Config(format!(
                "unsupported config version: {}",
                self.version
            )));
        }
        if self.api_key.trim().is_empty() {
            return Err(PriceProxyError::Config("API_KEY environment variable not set".into()));
        }

        self.server.validate()?;
        self.upstream.validate()?;
        self.cache.validate()?;
        self.prices.validate()?;

        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| PriceProxyError::Config(format!("invalid listen address: {e}")))
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            server: ServerSection::default(),
            upstream: UpstreamSection::default(),
            cache: CacheSection::default(),
            prices: PricesSection::default(),
            api_key: String::new(),
        }
    }
}

fn default_version() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(PriceProxyError::Config("server.host must not be empty".into()));
        }
        Ok(())
    }
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    5000
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpstreamSection {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for UpstreamSection {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }
}

impl UpstreamSection {
    pub fn validate(&self) -> Result<()> {
        if !(self.endpoint.starts_with("https://") || self.endpoint.starts_with("http://")) {
            return Err(PriceProxyError::Config(
                "upstream.endpoint must be an http(s) URL".into(),
            ));
        }
        if !(1..=60_000).contains(&self.timeout_ms) {
            return Err(PriceProxyError::Config(
                "upstream.timeout_ms must be between 1 and 60000".into(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_endpoint() -> String {
    "https://api.metalpriceapi.com/v1/latest".into()
}
fn default_timeout_ms() -> u64 {
    10_000
}
fn default_user_agent() -> String {
    concat!("metalprice/", env!("CARGO_PKG_VERSION")).into()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheSection {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

impl CacheSection {
    pub fn validate(&self) -> Result<()> {
        if !(1..=604_800).contains(&self.ttl_secs) {
            return Err(PriceProxyError::Config(
                "cache.ttl_secs must be between 1 and 604800".into(),
            ));
        }
        Ok(())
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

// 8 hours
fn default_ttl_secs() -> u64 {
    8 * 60 * 60
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PricesSection {
    #[serde(default = "default_base")]
    pub default_base: String,

    #[serde(default = "default_allowed_bases")]
    pub allowed_bases: Vec<String>,

    #[serde(default = "default_metals")]
    pub metals: Vec<Metal>,

    /// Decimal places to round prices to; unset keeps full precision.
    #[serde(default)]
    pub precision: Option<u32>,

    #[serde(default = "default_body_snippet_chars")]
    pub body_snippet_chars: usize,
}

impl Default for PricesSection {
    fn default() -> Self {
        Self {
            default_base: default_base(),
            allowed_bases: default_allowed_bases(),
            metals: default_metals(),
            precision: None,
            body_snippet_chars: default_body_snippet_chars(),
        }
    }
}

impl PricesSection {
    pub fn validate(&self) -> Result<()> {
        let default_base = normalize_base(&self.default_base)
            .map_err(|e| PriceProxyError::Config(format!("prices.default_base: {e}")))?;
        for b in &self.allowed_bases {
            normalize_base(b)
                .map_err(|e| PriceProxyError::Config(format!("prices.allowed_bases: {e}")))?;
        }
        if !self
            .allowed_bases
            .iter()
            .any(|b| b.eq_ignore_ascii_case(&default_base))
        {
            return Err(PriceProxyError::Config(
                "prices.allowed_bases must contain prices.default_base".into(),
            ));
        }
        if self.metals.is_empty() {
            return Err(PriceProxyError::Config("prices.metals must not be empty".into()));
        }
        if matches!(self.precision, Some(p) if p > 12) {
            return Err(PriceProxyError::Config(
                "prices.precision must be at most 12".into(),
            ));
        }
        if !(1..=4096).contains(&self.body_snippet_chars) {
            return Err(PriceProxyError::Config(
                "prices.body_snippet_chars must be between 1 and 4096".into(),
            ));
        }
        Ok(())
    }
}

fn default_base() -> String {
    "USD".into()
}
fn default_allowed_bases() -> Vec<String> {
    vec!["USD".into(), "EUR".into(), "GBP".into()]
}
fn default_metals() -> Vec<Metal> {
    Metal::ALL.to_vec()
}
fn default_body_snippet_chars() -> usize {
    200
}
