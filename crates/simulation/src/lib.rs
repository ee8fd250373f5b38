//! Pool engines, history and persistence for the AMM sandbox.
//!
//! Every operation is split into a side-effect-free quote and an apply step
//! that commits a successful quote onto a new state value:
//! - [`v2`]: constant-product pool with swaps, proportional liquidity and
//!   external-price arbitrage
//! - [`v3`]: concentrated-liquidity pool with one tick-range position
//! - [`timeline`]: undo/redo history of snapshots
//! - [`codec`]: JSON encoding of snapshots and histories

/// Serialization of snapshots and timeline documents.
pub mod codec;
/// Pool parameters and solver tuning.
pub mod config;
/// Convenience re-exports.
pub mod prelude;
/// Named starting pools.
pub mod presets;
/// Quote results and rejection reasons.
pub mod quote;
/// Snapshot history.
pub mod timeline;
/// Constant-product engine.
pub mod v2;
/// Concentrated-liquidity engine.
pub mod v3;
