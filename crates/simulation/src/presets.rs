//! Named starting pools.

use crate::config::{V2PoolParams, V3PoolParams};
use crate::timeline::{Timeline, init_label};
use crate::v2::{self, V2PoolState};
use crate::v3::{self, V3PoolState};
use amm_sandbox_domain::{FeeTier, MathError, TokenInfo};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct V2Preset {
    pub id: &'static str,
    pub label: &'static str,
    pub params: V2PoolParams,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct V3Preset {
    pub id: &'static str,
    pub label: &'static str,
    pub params: V3PoolParams,
}

fn eth_usdc() -> (TokenInfo, TokenInfo) {
    (TokenInfo::new("ETH", 18), TokenInfo::new("USDC", 6))
}

/// The constant-product catalog; the first entry is the default.
pub fn v2_presets() -> Vec<V2Preset> {
    let (eth, usdc) = eth_usdc();
    let preset = |id, label, x: &str, y: &str| V2Preset {
        id,
        label,
        params: V2PoolParams::new(x, y).with_tokens(eth.clone(), usdc.clone()),
    };
    vec![
        preset("deep", "Deep Pool", "10000", "20000000"),
        preset("shallow", "Shallow Pool", "100", "200000"),
        preset("imbalanced", "Imbalanced", "10000", "6000000"),
        V2Preset {
            id: "zero-fee",
            label: "0 Fee",
            params: V2PoolParams::new("10000", "10000")
                .with_tokens(TokenInfo::new("TOKEN-A", 18), TokenInfo::new("TOKEN-B", 18))
                .with_fee_rate("0"),
        },
    ]
}

/// The concentrated-liquidity catalog, all ETH/USDC at a price of 2000.
pub fn v3_presets() -> Vec<V3Preset> {
    let (eth, usdc) = eth_usdc();
    let preset = |id, label, tier, lower, upper, x: &str, y: &str| V3Preset {
        id,
        label,
        params: V3PoolParams::new(tier, "2000")
            .with_tokens(eth.clone(), usdc.clone())
            .with_range(lower, upper)
            .with_amounts(x, y),
    };
    vec![
        preset("balanced", "Balanced 0.3%", FeeTier::Medium, 74_400, 78_000, "50", "100000"),
        preset("narrow", "Narrow 0.05%", FeeTier::Low, 75_800, 76_200, "20", "40000"),
        preset("wide", "Wide 1%", FeeTier::High, 70_000, 82_000, "100", "200000"),
    ]
}

/// Looks up a v2 preset; unknown ids fall back to the first one.
pub fn v2_preset(id: &str) -> V2Preset {
    let mut presets = v2_presets();
    let index = presets.iter().position(|preset| preset.id == id).unwrap_or(0);
    presets.swap_remove(index)
}

/// Looks up a v3 preset; unknown ids fall back to the first one.
pub fn v3_preset(id: &str) -> V3Preset {
    let mut presets = v3_presets();
    let index = presets.iter().position(|preset| preset.id == id).unwrap_or(0);
    presets.swap_remove(index)
}

/// Fresh history starting from a v2 preset.
pub fn v2_timeline(id: &str) -> Timeline<V2PoolState> {
    let preset = v2_preset(id);
    Timeline::new(v2::create_pool(&preset.params), init_label(preset.label)).with_preset(preset.id)
}

/// Fresh history starting from a v3 preset.
pub fn v3_timeline(id: &str) -> Result<Timeline<V3PoolState>, MathError> {
    let preset = v3_preset(id);
    Ok(Timeline::new(v3::create_pool(&preset.params)?, init_label(preset.label)).with_preset(preset.id))
}
