//! Metal codes quoted by the upstream pricing API.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PriceProxyError;

/// Precious metal, identified upstream by its ISO 4217-style code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Metal {
    Xau,
    Xag,
    Xpt,
    Xpd,
}

impl Metal {
    pub const ALL: [Metal; 4] = [Metal::Xau, Metal::Xag, Metal::Xpt, Metal::Xpd];

    pub fn code(self) -> &'static str {
        match self {
            Metal::Xau => "XAU",
            Metal::Xag => "XAG",
            Metal::Xpt => "XPT",
            Metal::Xpd => "XPD",
        }
    }
}

impl fmt::Display for Metal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Metal {
    type Err = PriceProxyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metal::ALL
            .into_iter()
            .find(|m| m.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| PriceProxyError::BadRequest(format!("unknown metal code: {s}")))
    }
}

impl TryFrom<String> for Metal {
    type Error = PriceProxyError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Metal> for String {
    fn from(m: Metal) -> Self {
        m.code().to_string()
    }
}

/// Comma-joined codes, as the upstream `currencies` parameter expects.
pub fn join_codes(metals: &[Metal]) -> String {
    metals.iter().map(|m| m.code()).collect::<Vec<_>>().join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("xau".parse::<Metal>().ok(), Some(Metal::Xau));
        assert_eq!(" XPD ".parse::<Metal>().ok(), Some(Metal::Xpd));
        assert!("XCU".parse::<Metal>().is_err());
    }

    #[test]
    fn joins_codes_in_given_order() {
        assert_eq!(join_codes(&Metal::ALL), "XAU,XAG,XPT,XPD");
        assert_eq!(join_codes(&[Metal::Xag]), "XAG");
    }
}
