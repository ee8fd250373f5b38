//! Prelude module for convenient imports.
//!
//! # Example
//!
//! ```rust
//! use amm_sandbox_simulation::prelude::*;
//! ```

// Codec
pub use crate::codec::{
    CodecError, PoolSnapshot, SnapshotError, TimelineDocument, decode_state, encode_state, export_timeline,
    import_timeline,
};

// Configuration
pub use crate::config::{ArbitrageConfig, V2PoolParams, V3PoolParams};

// Presets
pub use crate::presets::{V2Preset, V3Preset, v2_preset, v2_timeline, v3_preset, v3_timeline};

// Quotes
pub use crate::quote::{Quote, QuoteError};

// Timeline
pub use crate::timeline::{Timeline, TimelineEntry};

// Pool states
pub use crate::v2::{V2PoolState, V2TradeRecord};
pub use crate::v3::{V3AddLiquidityParams, V3PoolState, V3Position, V3TradeRecord};

// Shared domain types
pub use amm_sandbox_domain::{FeeTier, Fixed, OperationKind, SwapDirection, TokenInfo};
