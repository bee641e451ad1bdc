//! Base currency allowlist.
//!
//! Each allowed base owns a cache slot, so the set of bases a caller may
//! request is bounded by configuration.

use metalprice_core::error::{PriceProxyError, Result};

/// Upper-case a three-letter currency code, rejecting anything else.
pub fn normalize_base(raw: &str) -> Result<String> {
    let s = raw.trim();
    if s.len() != 3 || !s.bytes().all(|b| b.is_ascii_alphabetic()) {
        return Err(PriceProxyError::BadRequest(format!(
            "invalid base currency: {raw:?} (expected three letters, e.g. USD)"
        )));
    }
    Ok(s.to_ascii_uppercase())
}

/// Compiled allowlist of upper-case base currency codes.
#[derive(Debug, Clone)]
pub struct BaseAllowlist {
    bases: Vec<String>,
}

impl BaseAllowlist {
    pub fn compile(raw: &[String]) -> Result<Self> {
        let mut bases = Vec::with_capacity(raw.len());
        for s in raw {
            let b = normalize_base(s)?;
            if !bases.contains(&b) {
                bases.push(b);
            }
        }
        Ok(Self { bases })
    }

    /// Normalize `raw` and check it against the allowlist.
    pub fn resolve(&self, raw: &str) -> Result<String> {
        let base = normalize_base(raw)?;
        if self.bases.contains(&base) {
            Ok(base)
        } else {
            Err(PriceProxyError::NotAllowed(format!("base currency {base} is not served")))
        }
    }

    pub fn bases(&self) -> &[String] {
        &self.bases
    }
}
