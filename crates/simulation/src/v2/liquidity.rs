//! Proportional deposits and withdrawals.

use super::state::V2PoolState;
use crate::quote::{Quote, QuoteError, traced};
use amm_sandbox_domain::Fixed;
use amm_sandbox_domain::math::constant_product::{clip_to_ratio, initial_lp_supply};
use tracing::info;

/// Effect of a deposit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct V2AddLiquidityQuote {
    pub amount_x_in: Fixed,
    pub amount_y_in: Fixed,
    /// X actually deposited after clipping to the pool ratio.
    pub amount_x_used: Fixed,
    /// Y actually deposited after clipping to the pool ratio.
    pub amount_y_used: Fixed,
    pub refund_x: Fixed,
    pub refund_y: Fixed,
    pub lp_mint: Fixed,
    /// User share of LP supply after the deposit.
    pub lp_share_after: Fixed,
}

/// Effect of a withdrawal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct V2RemoveLiquidityQuote {
    pub burn_lp: Fixed,
    pub out_x: Fixed,
    pub out_y: Fixed,
    /// User share of LP supply after the burn; zero once supply is gone.
    pub lp_share_after: Fixed,
}

/// Quotes a deposit, refunding whichever side exceeds the pool ratio.
pub fn quote_add_liquidity(state: &V2PoolState, amount_x_in: Fixed, amount_y_in: Fixed) -> Quote<V2AddLiquidityQuote> {
    traced("v2 add liquidity", compute_add(state, amount_x_in, amount_y_in))
}

fn compute_add(state: &V2PoolState, amount_x_in: Fixed, amount_y_in: Fixed) -> Quote<V2AddLiquidityQuote> {
    if !amount_x_in.is_positive() || !amount_y_in.is_positive() {
        return Err(QuoteError::NonPositiveDeposit);
    }

    let seeded = state.has_reserves() && state.lp_total_supply.is_positive();
    let (amount_x_used, amount_y_used) = if seeded {
        clip_to_ratio(amount_x_in, amount_y_in, state.reserve_x, state.reserve_y)?
    } else {
        (amount_x_in, amount_y_in)
    };

    let lp_mint = if seeded {
        let mint_x = Fixed::mul_div(amount_x_used, state.lp_total_supply, state.reserve_x)?;
        let mint_y = Fixed::mul_div(amount_y_used, state.lp_total_supply, state.reserve_y)?;
        mint_x.min(mint_y)
    } else {
        initial_lp_supply(amount_x_used, amount_y_used)
    };
    if !lp_mint.is_positive() {
        return Err(QuoteError::MintTooSmall);
    }

    state.reserve_x.checked_add(amount_x_used)?;
    state.reserve_y.checked_add(amount_y_used)?;
    let supply_after = state.lp_total_supply.checked_add(lp_mint)?;
    let user_after = state.lp_user_balance.checked_add(lp_mint)?;

    Ok(V2AddLiquidityQuote {
        amount_x_in,
        amount_y_in,
        amount_x_used,
        amount_y_used,
        refund_x: amount_x_in - amount_x_used,
        refund_y: amount_y_in - amount_y_used,
        lp_mint,
        lp_share_after: user_after.checked_div(supply_after)?,
    })
}

/// Commits a deposit quote.
pub fn apply_add_liquidity(state: &V2PoolState, quote: &Quote<V2AddLiquidityQuote>) -> V2PoolState {
    let Ok(quote) = quote else {
        return state.clone();
    };

    let mut next = state.clone();
    next.reserve_x += quote.amount_x_used;
    next.reserve_y += quote.amount_y_used;
    next.lp_total_supply += quote.lp_mint;
    next.lp_user_balance += quote.lp_mint;
    next.t = state.t + 1;
    next.last_trade = None;

    info!(t = next.t, lp_mint = %quote.lp_mint, "Applied v2 add liquidity");
    next
}

/// Quotes burning `burn_lp` LP tokens for a pro-rata share of both reserves.
pub fn quote_remove_liquidity(state: &V2PoolState, burn_lp: Fixed) -> Quote<V2RemoveLiquidityQuote> {
    traced("v2 remove liquidity", compute_remove(state, burn_lp))
}

fn compute_remove(state: &V2PoolState, burn_lp: Fixed) -> Quote<V2RemoveLiquidityQuote> {
    if !burn_lp.is_positive() {
        return Err(QuoteError::NonPositiveBurn);
    }
    if !state.lp_total_supply.is_positive() {
        return Err(QuoteError::NoLpSupply);
    }
    if burn_lp > state.lp_user_balance {
        return Err(QuoteError::BurnExceedsBalance);
    }

    let out_x = Fixed::mul_div(state.reserve_x, burn_lp, state.lp_total_supply)?;
    let out_y = Fixed::mul_div(state.reserve_y, burn_lp, state.lp_total_supply)?;
    if !out_x.is_positive() && !out_y.is_positive() {
        return Err(QuoteError::WithdrawTooSmall);
    }

    let supply_after = state.lp_total_supply - burn_lp;
    let user_after = state.lp_user_balance - burn_lp;
    let lp_share_after = if supply_after.is_positive() {
        user_after.checked_div(supply_after)?
    } else {
        Fixed::ZERO
    };

    Ok(V2RemoveLiquidityQuote {
        burn_lp,
        out_x,
        out_y,
        lp_share_after,
    })
}

/// Commits a withdrawal quote.
pub fn apply_remove_liquidity(state: &V2PoolState, quote: &Quote<V2RemoveLiquidityQuote>) -> V2PoolState {
    let Ok(quote) = quote else {
        return state.clone();
    };

    let mut next = state.clone();
    next.reserve_x -= quote.out_x;
    next.reserve_y -= quote.out_y;
    next.lp_total_supply -= quote.burn_lp;
    next.lp_user_balance -= quote.burn_lp;
    next.t = state.t + 1;
    next.last_trade = None;

    info!(t = next.t, burn_lp = %quote.burn_lp, "Applied v2 remove liquidity");
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::V2PoolParams;
    use crate::v2::state::create_pool;
    use amm_sandbox_domain::MathError;

    #[test]
    fn test_add_clips_to_pool_ratio() {
        let state = create_pool(&V2PoolParams::new("1000", "2000"));
        let quote = quote_add_liquidity(&state, Fixed::from_int(100), Fixed::from_int(300));
        let q = quote.as_ref().unwrap();

        assert_eq!(q.amount_x_used, Fixed::from_int(100));
        assert_eq!(q.amount_y_used, Fixed::from_int(200));
        assert_eq!(q.refund_x, Fixed::ZERO);
        assert_eq!(q.refund_y, Fixed::from_int(100));

        let next = apply_add_liquidity(&state, &quote);
        assert_eq!(next.reserve_x, state.reserve_x + Fixed::from_int(100));
        assert_eq!(next.reserve_y, state.reserve_y + Fixed::from_int(200));
        assert!(next.lp_user_balance > state.lp_user_balance);
        assert_eq!(next.t, 1);
    }

    #[test]
    fn test_add_refunds_excess_x() {
        let state = create_pool(&V2PoolParams::new("1000", "2000"));
        let q = quote_add_liquidity(&state, Fixed::from_int(100), Fixed::from_int(100)).unwrap();
        assert_eq!(q.amount_x_used, Fixed::from_int(50));
        assert_eq!(q.refund_x, Fixed::from_int(50));
        assert!(q.refund_y.is_zero());
        // the implicit user owns the whole pool
        assert_eq!(q.lp_share_after, Fixed::ONE);
    }

    #[test]
    fn test_first_deposit_mints_geometric_mean() {
        let mut state = create_pool(&V2PoolParams::new("0", "0"));
        state.lp_total_supply = Fixed::ZERO;
        state.lp_user_balance = Fixed::ZERO;

        let q = quote_add_liquidity(&state, Fixed::from_int(100), Fixed::from_int(400)).unwrap();
        assert_eq!(q.lp_mint, Fixed::from_int(200));
        assert!(q.refund_x.is_zero() && q.refund_y.is_zero());
    }

    #[test]
    fn test_add_rejections() {
        let state = create_pool(&V2PoolParams::new("1000", "2000"));
        assert_eq!(
            quote_add_liquidity(&state, Fixed::ZERO, Fixed::ONE),
            Err(QuoteError::NonPositiveDeposit)
        );
        assert_eq!(
            quote_add_liquidity(&state, Fixed::from_raw_i128(1), Fixed::from_raw_i128(1)),
            Err(QuoteError::MintTooSmall)
        );
    }

    #[test]
    fn test_add_beyond_representable_reserves_overflows() {
        let max = format!("1{}", "0".repeat(58));
        let state = create_pool(&V2PoolParams::new(max.as_str(), max.as_str()));
        let quote = quote_add_liquidity(&state, Fixed::max_value(), Fixed::max_value());
        assert_eq!(quote, Err(QuoteError::Math(MathError::Overflow("scaled decimal"))));
        assert_eq!(apply_add_liquidity(&state, &quote), state);

        let big = format!("1{}", "0".repeat(21));
        let deep = create_pool(&V2PoolParams::new(big.as_str(), big.as_str()));
        let q = quote_add_liquidity(&deep, Fixed::parse(&big), Fixed::parse(&big)).unwrap();
        assert_eq!(q.lp_mint, deep.lp_total_supply);
        assert_eq!(q.lp_share_after, Fixed::ONE);
    }

    #[test]
    fn test_remove_pro_rata() {
        let state = create_pool(&V2PoolParams::new("800", "3200"));
        // LP seed is exactly 1600, so half is exact
        let burn_half = Fixed::from_int(800);
        let quote = quote_remove_liquidity(&state, burn_half);
        let q = quote.as_ref().unwrap();

        assert_eq!(q.out_x, Fixed::from_int(400));
        assert_eq!(q.out_y, Fixed::from_int(1600));
        assert_eq!(q.lp_share_after, Fixed::ONE);

        let next = apply_remove_liquidity(&state, &quote);
        assert_eq!(next.reserve_x, Fixed::from_int(400));
        assert_eq!(next.reserve_y, Fixed::from_int(1600));
        assert_eq!(next.lp_user_balance, Fixed::from_int(800));
    }

    #[test]
    fn test_remove_everything_zeroes_share() {
        let state = create_pool(&V2PoolParams::new("800", "3200"));
        let q = quote_remove_liquidity(&state, state.lp_user_balance).unwrap();
        assert_eq!(q.out_x, state.reserve_x);
        assert_eq!(q.out_y, state.reserve_y);
        assert!(q.lp_share_after.is_zero());
    }

    #[test]
    fn test_remove_rejections() {
        let state = create_pool(&V2PoolParams::new("800", "3200"));
        assert_eq!(
            quote_remove_liquidity(&state, Fixed::ZERO),
            Err(QuoteError::NonPositiveBurn)
        );
        assert_eq!(
            quote_remove_liquidity(&state, state.lp_user_balance + Fixed::ONE),
            Err(QuoteError::BurnExceedsBalance)
        );

        let mut drained = state.clone();
        drained.lp_total_supply = Fixed::ZERO;
        assert_eq!(
            quote_remove_liquidity(&drained, Fixed::ONE),
            Err(QuoteError::NoLpSupply)
        );

        let mut dusty = state.clone();
        dusty.reserve_x = Fixed::from_raw_i128(1);
        dusty.reserve_y = Fixed::from_raw_i128(1);
        assert_eq!(
            quote_remove_liquidity(&dusty, Fixed::from_raw_i128(1)),
            Err(QuoteError::WithdrawTooSmall)
        );
    }

    #[test]
    fn test_add_then_remove_round_trips_reserves() {
        for (x, y, dx, dy) in [("1000", "2000", "100", "300"), ("10000", "6000000", "3.5", "2100"), ("100", "200000", "1", "1")] {
            let state = create_pool(&V2PoolParams::new(x, y));
            let add = quote_add_liquidity(&state, Fixed::parse(dx), Fixed::parse(dy));
            let mid = apply_add_liquidity(&state, &add);
            let minted = add.as_ref().unwrap().lp_mint;

            let remove = quote_remove_liquidity(&mid, minted);
            let end = apply_remove_liquidity(&mid, &remove);

            let tolerance = Fixed::from_raw_i128(1_000_000);
            assert!((end.reserve_x - state.reserve_x).abs() <= tolerance);
            assert!((end.reserve_y - state.reserve_y).abs() <= tolerance);
            // rounding always favours the pool
            assert!(end.reserve_x >= state.reserve_x);
            assert!(end.reserve_y >= state.reserve_y);
        }
    }
}
