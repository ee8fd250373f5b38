use serde::{Deserialize, Serialize};
use std::fmt;

/// Which token a swap takes in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwapDirection {
    #[serde(rename = "X_TO_Y")]
    XToY,
    #[serde(rename = "Y_TO_X")]
    YToX,
}

impl SwapDirection {
    /// True when token X (token0) is the input.
    pub fn is_zero_for_one(self) -> bool {
        self == SwapDirection::XToY
    }

    pub fn reverse(self) -> Self {
        match self {
            SwapDirection::XToY => SwapDirection::YToX,
            SwapDirection::YToX => SwapDirection::XToY,
        }
    }
}

impl fmt::Display for SwapDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwapDirection::XToY => write!(f, "X -> Y"),
            SwapDirection::YToX => write!(f, "Y -> X"),
        }
    }
}

/// Kind of operation recorded in a timeline entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Init,
    Swap,
    Add,
    Remove,
    Reset,
    Import,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        assert_eq!(serde_json::to_string(&SwapDirection::XToY).unwrap(), "\"X_TO_Y\"");
        assert_eq!(serde_json::to_string(&OperationKind::Remove).unwrap(), "\"remove\"");
        let parsed: SwapDirection = serde_json::from_str("\"Y_TO_X\"").unwrap();
        assert_eq!(parsed, SwapDirection::YToX);
        assert_eq!(parsed.reverse(), SwapDirection::XToY);
    }
}
