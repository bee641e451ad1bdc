//! Scripted upstream shared by service and router tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use metalprice_core::error::{PriceProxyError, Result};
use metalprice_core::protocol::upstream::UpstreamResponse;
use metalprice_core::Metal;
use metalprice_gateway::config::{self, GatewayConfig};
use metalprice_gateway::upstream::Upstream;

pub const OK_BODY: &str = r#"{"success":true,"base":"USD","rates":{"XAU":0.0005,"XAG":0.04,"XPT":0.001,"XPD":0}}"#;
pub const OK_BODY_2: &str = r#"{"success":true,"base":"USD","rates":{"XAU":0.00025,"XAG":0.05,"XPT":0.001,"XPD":0.002}}"#;
pub const REJECTED_BODY: &str = r#"{"success":false,"error":{"statusCode":101,"message":"Invalid API Key."}}"#;

#[derive(Clone)]
pub enum Reply {
    Body(&'static str),
    Fail(PriceProxyError),
}

pub fn network_down() -> Reply {
    Reply::Fail(PriceProxyError::Network("connection failed".into()))
}

pub fn html_page() -> Reply {
    Reply::Fail(PriceProxyError::UpstreamContract {
        reason: "API did not return JSON".into(),
        body: Some("<html>502 Bad Gateway</html>".into()),
    })
}

/// Replays `script` in order; the last reply repeats once the script runs out.
pub struct MockUpstream {
    calls: AtomicUsize,
    script: Mutex<VecDeque<Reply>>,
    last: Mutex<Option<Reply>>,
    delay: Duration,
    seen: Mutex<Vec<(String, Vec<Metal>)>>,
}

impl MockUpstream {
    pub fn new(script: Vec<Reply>) -> Arc<Self> {
        Self::with_delay(script, Duration::ZERO)
    }

    pub fn with_delay(script: Vec<Reply>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            script: Mutex::new(script.into()),
            last: Mutex::new(None),
            delay,
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<(String, Vec<Metal>)> {
        self.seen.lock().unwrap().clone()
    }

    fn next_reply(&self) -> Reply {
        let mut script = self.script.lock().unwrap();
        let mut last = self.last.lock().unwrap();
        if let Some(r) = script.pop_front() {
            *last = Some(r);
        }
        last.clone().expect("mock upstream has an empty script")
    }
}

#[async_trait]
impl Upstream for MockUpstream {
    async fn fetch(&self, base: &str, metals: &[Metal]) -> Result<UpstreamResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push((base.to_string(), metals.to_vec()));
        let reply = self.next_reply();
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match reply {
            Reply::Body(b) => UpstreamResponse::from_slice(b.as_bytes()),
            Reply::Fail(e) => Err(e),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Valid config with a 60s TTL and the given YAML body merged in.
pub fn test_config(extra_yaml: &str) -> GatewayConfig {
    let yaml = format!("version: 1\ncache:\n  ttl_secs: 60\n{extra_yaml}");
    config::load(Some(&yaml), |k| match k {
        "API_KEY" => Some("test-key".to_string()),
        _ => None,
    })
    .expect("test config must load")
}
