//! Gateway config loader (strict YAML + environment overlay).
//!
//! The YAML file is optional (`METALPRICE_CONFIG`); every field has a default.
//! `API_KEY` and `PORT` always come from the environment. Validation runs
//! before the listener binds so a bad config never starts serving.

pub mod schema;

use std::fs;

use metalprice_core::error::{PriceProxyError, Result};

pub use schema::{CacheSection, GatewayConfig, PricesSection, ServerSection, UpstreamSection};

pub const ENV_API_KEY: &str = "API_KEY";
pub const ENV_PORT: &str = "PORT";
pub const ENV_CONFIG_PATH: &str = "METALPRICE_CONFIG";

/// Load from the process environment (and the config file it points at).
pub fn load_from_env() -> Result<GatewayConfig> {
    let lookup = |k: &str| std::env::var(k).ok();
    let yaml = match lookup(ENV_CONFIG_PATH) {
        Some(path) => Some(
            fs::read_to_string(&path)
                .map_err(|e| PriceProxyError::Config(format!("read config {path} failed: {e}")))?,
        ),
        None => None,
    };
    load(yaml.as_deref(), lookup)
}

/// Parse optional YAML, overlay environment values from `env`, validate.
pub fn load<F>(yaml: Option<&str>, env: F) -> Result<GatewayConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut cfg = match yaml {
        Some(s) => parse_yaml(s)?,
        None => GatewayConfig::default(),
    };

    cfg.api_key = env(ENV_API_KEY).unwrap_or_default().trim().to_string();

    if let Some(port) = env(ENV_PORT) {
        cfg.server.port = port
            .trim()
            .parse()
            .map_err(|_| PriceProxyError::Config(format!("{ENV_PORT} must be a port number, got {port:?}")))?;
    }

    cfg.validate()?;
    Ok(cfg)
}

fn parse_yaml(s: &str) -> Result<GatewayConfig> {
    // An empty file deserializes as unit, not as a map.
    if s.trim().is_empty() {
        return Ok(GatewayConfig::default());
    }
    serde_yaml::from_str(s).map_err(|e| PriceProxyError::Config(format!("invalid yaml: {e}")))
}
