//! Rate inversion.
//!
//! The upstream quotes "metal per unit of base currency" (e.g. 0.0005 XAU per
//! USD). Clients want the reciprocal: base currency per troy ounce. Output
//! keys are `<BASE><METAL>`, e.g. `USDXAU`.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::metal::Metal;
use crate::protocol::upstream::UpstreamResponse;

/// Metal -> rate (or inverted price). `None` means "no usable value".
pub type RateMap = BTreeMap<Metal, Option<f64>>;

/// Inverted prices for one base currency, as served to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSnapshot {
    pub base: String,
    /// Unix seconds at which the upstream was queried.
    pub timestamp: u64,
    pub rates: BTreeMap<String, Option<f64>>,
}

impl PriceSnapshot {
    pub fn new(base: &str, timestamp: u64, prices: &RateMap) -> Self {
        let rates = prices
            .iter()
            .map(|(metal, v)| (price_key(base, *metal), *v))
            .collect();
        Self {
            base: base.to_string(),
            timestamp,
            rates,
        }
    }
}

pub fn price_key(base: &str, metal: Metal) -> String {
    format!("{base}{}", metal.code())
}

/// Pick the requested metals out of an upstream body. Missing or
/// non-numeric entries become `None`; unrequested keys are ignored.
pub fn collect_rates(resp: &UpstreamResponse, metals: &[Metal]) -> RateMap {
    metals.iter().map(|m| (*m, resp.rate(m.code()))).collect()
}

/// Reciprocal of every usable rate. Zero, non-finite and absent rates map to
/// `None`; the result never holds an infinity.
pub fn invert(rates: &RateMap) -> RateMap {
    rates
        .iter()
        .map(|(metal, rate)| (*metal, rate.and_then(invert_one)))
        .collect()
}

fn invert_one(rate: f64) -> Option<f64> {
    if rate == 0.0 || !rate.is_finite() {
        return None;
    }
    let v = 1.0 / rate;
    v.is_finite().then_some(v)
}

/// Round every present value to `decimals` places. A value too large to
/// scale without overflowing is already integral and is kept as is.
pub fn round_prices(prices: &RateMap, decimals: u32) -> RateMap {
    let factor = 10f64.powi(decimals as i32);
    prices
        .iter()
        .map(|(metal, v)| (*metal, v.map(|x| round_to(x, factor))))
        .collect()
}

fn round_to(x: f64, factor: f64) -> f64 {
    let scaled = x * factor;
    if !scaled.is_finite() {
        return x;
    }
    let rounded = scaled.round() / factor;
    if rounded.is_finite() {
        rounded
    } else {
        x
    }
}
