use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest decimals value a token descriptor may carry.
pub const MAX_TOKEN_DECIMALS: u8 = 36;

/// Display metadata for one side of a pool.
///
/// `decimals` is informational only: every amount is carried as an
/// 18-decimal [`Fixed`](crate::fixed::Fixed) regardless of it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenInfo {
    pub symbol: String,
    pub decimals: u8,
}

impl TokenInfo {
    pub fn new(symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            symbol: symbol.into(),
            decimals,
        }
    }

    /// Trims the symbol, substitutes `TOKEN` for a blank one and clamps
    /// `decimals` to `0..=36`.
    pub fn normalized(&self) -> Self {
        let symbol = self.symbol.trim();
        Self {
            symbol: if symbol.is_empty() {
                "TOKEN".to_string()
            } else {
                symbol.to_string()
            },
            decimals: self.decimals.min(MAX_TOKEN_DECIMALS),
        }
    }
}

impl Default for TokenInfo {
    fn default() -> Self {
        Self::new("X", 18)
    }
}

impl fmt::Display for TokenInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}
