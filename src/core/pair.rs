use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

use super::error::ForexError;

/// A validated three-letter currency code, always upper case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CurrencyCode {
    type Err = ForexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ForexError::InvalidPair {
                input: s.to_string(),
                reason: "currency codes are three ASCII letters".to_string(),
            });
        }
        Ok(CurrencyCode(code.to_ascii_uppercase()))
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = ForexError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

impl Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A (base, quote) pair. Rates are expressed as quote units per one base unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CurrencyPair {
    base: CurrencyCode,
    quote: CurrencyCode,
}

impl CurrencyPair {
    pub fn new(base: &str, quote: &str) -> Result<Self, ForexError> {
        Ok(Self {
            base: base.parse()?,
            quote: quote.parse()?,
        })
    }

    pub fn base(&self) -> &CurrencyCode {
        &self.base
    }

    pub fn quote(&self) -> &CurrencyCode {
        &self.quote
    }

    /// Filesystem and storage friendly key, e.g. `USD_COP`.
    pub fn slug(&self) -> String {
        format!("{}_{}", self.base, self.quote)
    }
}

impl FromStr for CurrencyPair {
    type Err = ForexError;

    /// Accepts `USD/COP`, `USD-COP`, `USD_COP` or `USDCOP`, in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (base, quote) = match trimmed.split_once(['/', '-', '_']) {
            Some(parts) => parts,
            None if trimmed.len() == 6 && trimmed.is_ascii() => trimmed.split_at(3),
            None => {
                return Err(ForexError::InvalidPair {
                    input: s.to_string(),
                    reason: "expected BASE/QUOTE".to_string(),
                });
            }
        };
        CurrencyPair::new(base, quote)
    }
}

impl Display for CurrencyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}
