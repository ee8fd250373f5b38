//! Textual encoding of pool snapshots and timeline documents.
//!
//! Scaled decimals and wide integers travel as base-10 digit strings;
//! ticks, tiers, counters and flags are native JSON. Decoding checks that
//! every required key is present before parsing and validates the result
//! against the state invariants.

use crate::timeline::{Timeline, TimelineEntry};
use crate::v2::V2PoolState;
use crate::v3::V3PoolState;
use crate::v3::is_tick_in_range;
use amm_sandbox_domain::math::tick_math::tick_at_sqrt_ratio;
use amm_sandbox_domain::math::{MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO, MIN_TICK};
use amm_sandbox_domain::{Fixed, U256};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("missing required keys: {}", .0.join(", "))]
    MissingKeys(Vec<String>),
    #[error("expected a JSON object")]
    NotAnObject,
    #[error("invalid snapshot: {0}")]
    Snapshot(#[from] SnapshotError),
    #[error("model mismatch: expected {expected}, got {found}")]
    ModelMismatch { expected: &'static str, found: String },
    #[error("payload has no timeline entries")]
    NoEntries,
}

/// A decoded snapshot that breaks a pool invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: Fixed },
    #[error("feeRate must be in [0, 1), got {0}")]
    FeeRateOutOfRange(Fixed),
    #[error("lpUserBalance exceeds lpTotalSupply")]
    BalanceExceedsSupply,
    #[error("tickSpacing {spacing} does not match fee tier {fee_tier}")]
    SpacingMismatch { spacing: i32, fee_tier: u32 },
    #[error("invalid position range [{lower}, {upper})")]
    InvalidRange { lower: i32, upper: i32 },
    #[error("position range [{lower}, {upper}) is not aligned to spacing {spacing}")]
    UnalignedRange { lower: i32, upper: i32, spacing: i32 },
    #[error("tickCurrent out of range: {0}")]
    TickOutOfRange(i32),
    #[error("sqrtPriceX96 out of range: {0}")]
    SqrtPriceOutOfRange(U256),
    #[error("tickCurrent {tick} does not match sqrtPriceX96 (tick {expected})")]
    TickPriceMismatch { tick: i32, expected: i32 },
    #[error("active liquidity {0} while tickCurrent is outside the position range")]
    LiquidityOutsideRange(Fixed),
    #[error("active liquidity {active} exceeds position liquidity {position}")]
    LiquidityExceedsPosition { active: Fixed, position: Fixed },
}

/// A pool state that can be stored and restored.
pub trait PoolSnapshot: Serialize + DeserializeOwned + Clone {
    /// Model tag written into timeline documents.
    const MODEL: &'static str;
    /// Top-level keys every encoded snapshot must carry.
    const REQUIRED_KEYS: &'static [&'static str];

    /// Checks invariants serde cannot express.
    fn validate(&self) -> Result<(), SnapshotError>;
}

fn non_negative(fields: &[(&'static str, Fixed)]) -> Result<(), SnapshotError> {
    match fields.iter().find(|(_, value)| value.is_negative()) {
        Some(&(field, value)) => Err(SnapshotError::Negative { field, value }),
        None => Ok(()),
    }
}

impl PoolSnapshot for V2PoolState {
    const MODEL: &'static str = "v2";
    const REQUIRED_KEYS: &'static [&'static str] = &[
        "tokenX",
        "tokenY",
        "reserveX",
        "reserveY",
        "feeRate",
        "lpTotalSupply",
        "lpUserBalance",
        "feeAccX",
        "feeAccY",
        "t",
        "lastTrade",
    ];

    fn validate(&self) -> Result<(), SnapshotError> {
        non_negative(&[
            ("reserveX", self.reserve_x),
            ("reserveY", self.reserve_y),
            ("lpTotalSupply", self.lp_total_supply),
            ("lpUserBalance", self.lp_user_balance),
            ("feeAccX", self.fee_acc_x),
            ("feeAccY", self.fee_acc_y),
        ])?;
        if self.fee_rate.is_negative() || self.fee_rate >= Fixed::ONE {
            return Err(SnapshotError::FeeRateOutOfRange(self.fee_rate));
        }
        if self.lp_user_balance > self.lp_total_supply {
            return Err(SnapshotError::BalanceExceedsSupply);
        }
        Ok(())
    }
}

impl PoolSnapshot for V3PoolState {
    const MODEL: &'static str = "v3";
    const REQUIRED_KEYS: &'static [&'static str] = &[
        "tokenX",
        "tokenY",
        "feeTier",
        "tickSpacing",
        "sqrtPriceX96",
        "tickCurrent",
        "liquidity",
        "position",
        "feeGrowthGlobalX128X",
        "feeGrowthGlobalX128Y",
        "feeAccX",
        "feeAccY",
        "t",
        "lastTrade",
    ];

    fn validate(&self) -> Result<(), SnapshotError> {
        let spacing = self.tick_spacing;
        if spacing != self.fee_tier.tick_spacing() {
            return Err(SnapshotError::SpacingMismatch {
                spacing,
                fee_tier: u32::from(self.fee_tier),
            });
        }
        let (lower, upper) = (self.position.tick_lower, self.position.tick_upper);
        if lower >= upper || lower < MIN_TICK || upper > MAX_TICK {
            return Err(SnapshotError::InvalidRange { lower, upper });
        }
        if lower % spacing != 0 || upper % spacing != 0 {
            return Err(SnapshotError::UnalignedRange { lower, upper, spacing });
        }
        if !(MIN_TICK..=MAX_TICK).contains(&self.tick_current) {
            return Err(SnapshotError::TickOutOfRange(self.tick_current));
        }
        if self.sqrt_price_x96 < MIN_SQRT_RATIO || self.sqrt_price_x96 >= MAX_SQRT_RATIO {
            return Err(SnapshotError::SqrtPriceOutOfRange(self.sqrt_price_x96));
        }
        let expected = tick_at_sqrt_ratio(self.sqrt_price_x96)
            .map_err(|_| SnapshotError::SqrtPriceOutOfRange(self.sqrt_price_x96))?;
        if expected != self.tick_current {
            return Err(SnapshotError::TickPriceMismatch {
                tick: self.tick_current,
                expected,
            });
        }
        non_negative(&[
            ("liquidity", self.liquidity),
            ("position.liquidity", self.position.liquidity),
            ("position.feeOwedX", self.position.fee_owed_x),
            ("position.feeOwedY", self.position.fee_owed_y),
            ("feeAccX", self.fee_acc_x),
            ("feeAccY", self.fee_acc_y),
        ])?;
        if self.liquidity.is_positive() && !is_tick_in_range(self.tick_current, lower, upper) {
            return Err(SnapshotError::LiquidityOutsideRange(self.liquidity));
        }
        if self.liquidity > self.position.liquidity {
            return Err(SnapshotError::LiquidityExceedsPosition {
                active: self.liquidity,
                position: self.position.liquidity,
            });
        }
        Ok(())
    }
}

fn require_keys(value: &Value, keys: &[&str]) -> Result<(), CodecError> {
    let object = value.as_object().ok_or(CodecError::NotAnObject)?;
    let missing: Vec<String> = keys
        .iter()
        .filter(|key| !object.contains_key(**key))
        .map(|key| (*key).to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(CodecError::MissingKeys(missing))
    }
}

fn snapshot_from_value<S: PoolSnapshot>(value: Value) -> Result<S, CodecError> {
    require_keys(&value, S::REQUIRED_KEYS)?;
    let state: S = serde_json::from_value(value)?;
    state.validate().inspect_err(|reason| {
        warn!(model = S::MODEL, %reason, "Rejected invalid snapshot");
    })?;
    Ok(state)
}

/// Encodes a snapshot as pretty-printed JSON.
pub fn encode_state<S: PoolSnapshot>(state: &S) -> Result<String, CodecError> {
    Ok(serde_json::to_string_pretty(state)?)
}

/// Decodes and validates a snapshot.
pub fn decode_state<S: PoolSnapshot>(text: &str) -> Result<S, CodecError> {
    snapshot_from_value(serde_json::from_str(text)?)
}

/// Exported history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineDocument<S> {
    /// `v2` or `v3`; absent in older exports.
    #[serde(default)]
    pub model: Option<String>,
    pub exported_at: DateTime<Utc>,
    #[serde(default)]
    pub selected_preset: Option<String>,
    #[serde(default)]
    pub cursor: Option<usize>,
    pub timeline: Vec<TimelineEntry<S>>,
}

/// Encodes a whole history, cursor and preset included.
pub fn export_timeline<S: PoolSnapshot>(timeline: &Timeline<S>) -> Result<String, CodecError> {
    let document = TimelineDocument {
        model: Some(S::MODEL.to_string()),
        exported_at: Utc::now(),
        selected_preset: timeline.selected_preset().map(str::to_string),
        cursor: Some(timeline.cursor()),
        timeline: timeline.entries().to_vec(),
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Restores a history exported by [`export_timeline`].
///
/// Fails on a model mismatch or an empty entry list; every snapshot is
/// key-checked and validated. An out-of-range cursor selects the last entry.
pub fn import_timeline<S: PoolSnapshot>(text: &str) -> Result<Timeline<S>, CodecError> {
    let mut document: Value = serde_json::from_str(text)?;
    let object = document.as_object_mut().ok_or(CodecError::NotAnObject)?;

    if let Some(model) = object.get("model").and_then(Value::as_str) {
        if model != S::MODEL {
            return Err(CodecError::ModelMismatch {
                expected: S::MODEL,
                found: model.to_string(),
            });
        }
    }

    let raw_entries = match object.remove("timeline") {
        Some(Value::Array(entries)) if !entries.is_empty() => entries,
        _ => return Err(CodecError::NoEntries),
    };

    let mut entries = Vec::with_capacity(raw_entries.len());
    for (index, mut raw) in raw_entries.into_iter().enumerate() {
        let fields = raw.as_object_mut().ok_or(CodecError::NotAnObject)?;
        let snapshot = fields
            .remove("snapshot")
            .ok_or_else(|| CodecError::MissingKeys(vec![format!("timeline[{index}].snapshot")]))?;
        let snapshot = snapshot_from_value::<S>(snapshot)?;
        let header: EntryHeader = serde_json::from_value(raw)?;
        entries.push(TimelineEntry {
            id: header.id.unwrap_or(index as u64),
            kind: header.kind,
            label: header.label,
            created_at: header.created_at,
            snapshot,
        });
    }

    let cursor = object.get("cursor").and_then(Value::as_u64).map_or(usize::MAX, |c| c as usize);
    let selected_preset = object
        .get("selectedPreset")
        .and_then(Value::as_str)
        .map(str::to_string);

    Timeline::from_parts(entries, cursor, selected_preset)
        .ok_or(CodecError::NoEntries)
}

/// Entry fields other than the snapshot.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntryHeader {
    #[serde(default)]
    id: Option<u64>,
    kind: amm_sandbox_domain::OperationKind,
    label: String,
    #[serde(default)]
    created_at: i64,
}
