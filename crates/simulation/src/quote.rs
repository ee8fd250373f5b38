//! Quote results shared by both pool engines.
//!
//! A quote evaluates a hypothetical operation against a state without
//! touching it. Every user-reachable failure comes back as a [`QuoteError`];
//! the matching `apply_*` function commits a successful quote and returns
//! the state unchanged for a failed one.

use amm_sandbox_domain::MathError;
use tracing::{debug, warn};

/// Result of a quote: the computed effect or the reason it was rejected.
pub type Quote<T> = Result<T, QuoteError>;

/// Reasons a quote is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuoteError {
    /// Non-positive swap input.
    #[error("Input amount must be greater than zero")]
    NonPositiveInput,
    /// A reserve is zero or negative.
    #[error("Pool reserves are empty")]
    EmptyReserves,
    /// Fee rate outside `[0, 1)`.
    #[error("Invalid fee rate")]
    InvalidFeeRate,
    /// The fee consumed the entire input.
    #[error("Effective amount after fee is too small")]
    AmountAfterFeeTooSmall,
    /// Output rounds to zero or would empty the output reserve.
    #[error("Output amount is too small or drains pool")]
    OutputTooSmallOrDrainsPool,
    /// A reserve would end up non-positive.
    #[error("Resulting reserves must stay positive")]
    NonPositiveReserves,
    /// v2 deposits need both tokens.
    #[error("Both token inputs must be greater than zero")]
    NonPositiveDeposit,
    /// The deposit mints no LP tokens.
    #[error("LP mint amount too small, increase inputs")]
    MintTooSmall,
    /// Non-positive LP burn.
    #[error("LP burn amount must be greater than zero")]
    NonPositiveBurn,
    /// The pool has no LP supply.
    #[error("No LP supply in pool")]
    NoLpSupply,
    /// Burn larger than the user's LP balance.
    #[error("Cannot burn more LP than user balance")]
    BurnExceedsBalance,
    /// Both withdrawal amounts round to zero.
    #[error("Withdraw amount too small")]
    WithdrawTooSmall,
    /// Non-positive reference price.
    #[error("External price must be greater than zero")]
    NonPositiveExternalPrice,
    /// Pool and reference price already agree.
    #[error("Pool price already equals external price")]
    PriceAlreadyAligned,
    /// The search found no executable trade.
    #[error("Unable to find an arbitrage trade")]
    NoArbitrageTrade,
    /// The best trade loses money after fees.
    #[error("No profitable arbitrage after fees at this external price")]
    UnprofitableArbitrage,
    /// The current tick is outside the position range.
    #[error("No active liquidity at current tick")]
    NoActiveLiquidity,
    /// Selling token X with the price already at the lower bound.
    #[error("Price already at or below lower range bound")]
    AtLowerBound,
    /// Selling token Y with the price already at the upper bound.
    #[error("Price already at or above upper range bound")]
    AtUpperBound,
    /// The swap step rounds to nothing.
    #[error("Swap amount too small at current precision")]
    SwapTooSmall,
    /// v3 deposits need at least one token.
    #[error("At least one token amount must be greater than zero")]
    EmptyDeposit,
    /// The range can only move once the position is empty.
    #[error("Range can only be updated when existing position liquidity is zero")]
    RangeLocked,
    /// The deposit converts to no liquidity.
    #[error("Liquidity delta too small, increase deposit amounts")]
    LiquidityDeltaTooSmall,
    /// Non-positive liquidity burn.
    #[error("Liquidity burn amount must be greater than zero")]
    NonPositiveLiquidityBurn,
    /// The position is empty.
    #[error("No position liquidity to remove")]
    NoPositionLiquidity,
    /// Burn larger than the position liquidity.
    #[error("Cannot remove more than current position liquidity")]
    BurnExceedsLiquidity,
    /// Both v3 withdrawal amounts round to zero.
    #[error("Withdraw amount too small at current precision")]
    WithdrawTooSmallAtPrecision,
    /// The fee tier can only change once the position is empty.
    #[error("Set position liquidity to zero before changing fee tier")]
    FeeTierLocked,
    /// A precondition of the underlying math failed.
    #[error("Math error: {0}")]
    Math(#[from] MathError),
}

/// Logs a rejected quote and passes it through.
pub(crate) fn traced<T>(operation: &'static str, quote: Quote<T>) -> Quote<T> {
    match &quote {
        Err(QuoteError::Math(err)) => warn!(operation, error = %err, "Quote aborted by math error"),
        Err(err) => debug!(operation, reason = %err, "Quote rejected"),
        Ok(_) => {}
    }
    quote
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reasons_are_human_readable() {
        assert_eq!(
            QuoteError::NonPositiveInput.to_string(),
            "Input amount must be greater than zero"
        );
        let math: QuoteError = MathError::DivisionByZero.into();
        assert_eq!(math.to_string(), "Math error: denominator must be greater than zero");
    }

    #[test]
    fn test_traced_passes_quote_through() {
        let ok: Quote<u8> = traced("test", Ok(7));
        assert_eq!(ok, Ok(7));
        let err: Quote<u8> = traced("test", Err(QuoteError::NoLpSupply));
        assert_eq!(err, Err(QuoteError::NoLpSupply));
    }
}
