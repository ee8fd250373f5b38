//! Leaf math for the AMM sandbox.
//!
//! This crate holds the exact arithmetic both pool engines are built on:
//! - 18-decimal scaled fixed point ([`Fixed`])
//! - Q96/Q128 multiply-divide with explicit rounding
//! - Tick <-> square-root price mapping
//! - Liquidity <-> token amount conversions
//! - The single-range swap step
//! - Constant-product formulas

/// Error types.
pub mod error;
/// Fee tiers.
pub mod fees;
/// Scaled decimal arithmetic.
pub mod fixed;
/// Shared enums.
pub mod enums;
/// Pool math.
pub mod math;
/// Decimal-string serde adapters for wide integers.
pub mod serde_dec;
/// Token descriptors.
pub mod token;

pub use enums::{OperationKind, SwapDirection};
pub use error::{FixedParseError, MathError};
pub use fees::FeeTier;
pub use fixed::Fixed;
pub use primitive_types::U256;
pub use token::TokenInfo;
