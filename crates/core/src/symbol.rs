//! Symbol - Type-safe ticker symbols for simulated stocks

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur when parsing symbols
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SymbolError {
    #[error("Empty symbol")]
    Empty,

    #[error("Symbol too long (max {max} chars): {0}", max = Symbol::MAX_LEN)]
    TooLong(String),

    #[error("Invalid symbol format: {0}")]
    InvalidFormat(String),
}

/// A ticker symbol such as `ACME` or `BRK.B`.
///
/// Symbols are trimmed and stored upper-case, so `"acme"` and `"ACME"` are the same.
///
/// # Examples
/// ```
/// use fantrade_core::Symbol;
///
/// let acme: Symbol = "acme".parse().unwrap();
/// assert_eq!(acme.as_str(), "ACME");
/// assert!("AC ME".parse::<Symbol>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    pub const MAX_LEN: usize = 10;

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Symbol {
    type Err = SymbolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_uppercase();

        if s.is_empty() {
            return Err(SymbolError::Empty);
        }

        if s.len() > Self::MAX_LEN {
            return Err(SymbolError::TooLong(s));
        }

        // Alphanumeric plus share-class dots, must start with a letter
        let starts_with_letter = s.chars().next().is_some_and(|c| c.is_ascii_alphabetic());
        if !starts_with_letter || !s.chars().all(|c| c.is_ascii_alphanumeric() || c == '.') {
            return Err(SymbolError::InvalidFormat(s));
        }

        Ok(Symbol(s))
    }
}

impl TryFrom<String> for Symbol {
    type Error = SymbolError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_case() {
        let symbol: Symbol = " moon ".parse().unwrap();
        assert_eq!(symbol.to_string(), "MOON");
    }

    #[test]
    fn test_share_class_dot() {
        assert!("BRK.B".parse::<Symbol>().is_ok());
    }

    #[test]
    fn test_empty_error() {
        assert!(matches!("  ".parse::<Symbol>(), Err(SymbolError::Empty)));
    }

    #[test]
    fn test_too_long_error() {
        let result: Result<Symbol, _> = "VERYLONGTICKER".parse();
        assert!(matches!(result, Err(SymbolError::TooLong(_))));
    }

    #[test]
    fn test_invalid_format_error() {
        assert!(matches!(
            "ACME-USD".parse::<Symbol>(),
            Err(SymbolError::InvalidFormat(_))
        ));
        assert!(matches!(
            "9LIVES".parse::<Symbol>(),
            Err(SymbolError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_serde_rejects_invalid() {
        let parsed: Result<Symbol, _> = serde_json::from_str("\"A B\"");
        assert!(parsed.is_err());
    }
}
