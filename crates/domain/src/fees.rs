use serde::{Deserialize, Serialize};
use std::fmt;

/// The enumerated concentrated-liquidity fee tiers.
///
/// Serialized as the raw tier value (500, 3000 or 10000), which is both the
/// fee in hundredths of a basis point and its identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum FeeTier {
    Low,
    #[default]
    Medium,
    High,
}

impl FeeTier {
    pub const ALL: [FeeTier; 3] = [FeeTier::Low, FeeTier::Medium, FeeTier::High];

    /// Swap fee in parts per million.
    pub fn fee_pips(self) -> u32 {
        match self {
            FeeTier::Low => 500,
            FeeTier::Medium => 3000,
            FeeTier::High => 10_000,
        }
    }

    /// Fee in basis points, e.g. 30 for the 0.3% tier.
    pub fn bps(self) -> u32 {
        self.fee_pips() / 100
    }

    pub fn tick_spacing(self) -> i32 {
        match self {
            FeeTier::Low => 10,
            FeeTier::Medium => 60,
            FeeTier::High => 200,
        }
    }
}

impl TryFrom<u32> for FeeTier {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        FeeTier::ALL
            .into_iter()
            .find(|tier| tier.fee_pips() == value)
            .ok_or_else(|| format!("unsupported fee tier: {value}"))
    }
}

impl From<FeeTier> for u32 {
    fn from(tier: FeeTier) -> u32 {
        tier.fee_pips()
    }
}

impl fmt::Display for FeeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pips = self.fee_pips();
        write!(f, "{}.{:02}%", pips / 10_000, (pips % 10_000) / 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_table() {
        assert_eq!(FeeTier::Low.tick_spacing(), 10);
        assert_eq!(FeeTier::Medium.tick_spacing(), 60);
        assert_eq!(FeeTier::High.tick_spacing(), 200);
        assert_eq!(FeeTier::Medium.bps(), 30);
        assert_eq!(FeeTier::Low.to_string(), "0.05%");
        assert_eq!(FeeTier::High.to_string(), "1.00%");
    }

    #[test]
    fn test_conversion_from_raw_value() {
        assert_eq!(FeeTier::try_from(3000), Ok(FeeTier::Medium));
        assert!(FeeTier::try_from(100).is_err());
        assert_eq!(serde_json::to_string(&FeeTier::High).unwrap(), "10000");
        assert!(serde_json::from_str::<FeeTier>("250").is_err());
    }
}
