//! Conversions between a liquidity magnitude and the token amounts it
//! commands over a Q96 square-root price range.
//!
//! delta_x = L * (1/sqrt(P_a) - 1/sqrt(P_b))
//! delta_y = L * (sqrt(P_b) - sqrt(P_a))

use crate::error::MathError;
use crate::math::q_math::{Q96, Rounding, div_rounding_up, mul_div};
use primitive_types::U256;

fn sorted(a: U256, b: U256) -> (U256, U256) {
    if a > b { (b, a) } else { (a, b) }
}

/// Amount of token0 between two square-root prices for `liquidity`.
///
/// Degenerate input (zero price, empty range or zero liquidity) is zero.
pub fn get_amount0_delta(
    sqrt_a: U256,
    sqrt_b: U256,
    liquidity: U256,
    rounding: Rounding,
) -> Result<U256, MathError> {
    let (lower, upper) = sorted(sqrt_a, sqrt_b);
    if lower.is_zero() || upper <= lower || liquidity.is_zero() {
        return Ok(U256::zero());
    }
    if liquidity.bits() > 160 {
        return Err(MathError::Overflow("amount0 delta"));
    }
    let numerator1 = liquidity << 96;
    let numerator2 = upper - lower;

    match rounding {
        Rounding::Up => {
            let scaled = mul_div(numerator1, numerator2, upper, Rounding::Up)?;
            div_rounding_up(scaled, lower)
        }
        Rounding::Down => Ok(mul_div(numerator1, numerator2, upper, Rounding::Down)? / lower),
    }
}

/// Amount of token1 between two square-root prices for `liquidity`.
pub fn get_amount1_delta(
    sqrt_a: U256,
    sqrt_b: U256,
    liquidity: U256,
    rounding: Rounding,
) -> Result<U256, MathError> {
    let (lower, upper) = sorted(sqrt_a, sqrt_b);
    if upper <= lower || liquidity.is_zero() {
        return Ok(U256::zero());
    }
    mul_div(liquidity, upper - lower, Q96, rounding)
}

/// L = amount0 * (sqrt(P_a) * sqrt(P_b)) / (sqrt(P_b) - sqrt(P_a))
pub fn get_liquidity_for_amount0(sqrt_a: U256, sqrt_b: U256, amount0: U256) -> Result<U256, MathError> {
    let (lower, upper) = sorted(sqrt_a, sqrt_b);
    if upper <= lower {
        return Err(MathError::DivisionByZero);
    }
    let intermediate = mul_div(lower, upper, Q96, Rounding::Down)?;
    mul_div(amount0, intermediate, upper - lower, Rounding::Down)
}

/// L = amount1 / (sqrt(P_b) - sqrt(P_a))
pub fn get_liquidity_for_amount1(sqrt_a: U256, sqrt_b: U256, amount1: U256) -> Result<U256, MathError> {
    let (lower, upper) = sorted(sqrt_a, sqrt_b);
    if upper <= lower {
        return Err(MathError::DivisionByZero);
    }
    mul_div(amount1, Q96, upper - lower, Rounding::Down)
}

/// Largest liquidity the two amounts can fund at `sqrt_price`.
///
/// Below the range only token0 counts, above it only token1; inside the
/// range the scarcer side bounds the result. A side that is needed but
/// missing yields zero liquidity.
pub fn get_liquidity_for_amounts(
    sqrt_price: U256,
    sqrt_a: U256,
    sqrt_b: U256,
    amount0: U256,
    amount1: U256,
) -> Result<U256, MathError> {
    let (lower, upper) = sorted(sqrt_a, sqrt_b);
    if upper <= lower {
        return Ok(U256::zero());
    }

    if sqrt_price <= lower {
        get_liquidity_for_amount0(lower, upper, amount0)
    } else if sqrt_price < upper {
        let liquidity0 = get_liquidity_for_amount0(sqrt_price, upper, amount0)?;
        let liquidity1 = get_liquidity_for_amount1(lower, sqrt_price, amount1)?;
        Ok(liquidity0.min(liquidity1))
    } else {
        get_liquidity_for_amount1(lower, upper, amount1)
    }
}

/// Token amounts occupied by `liquidity` at `sqrt_price`, rounded up.
pub fn get_amounts_for_liquidity(
    sqrt_price: U256,
    sqrt_a: U256,
    sqrt_b: U256,
    liquidity: U256,
) -> Result<(U256, U256), MathError> {
    let (lower, upper) = sorted(sqrt_a, sqrt_b);

    if sqrt_price <= lower {
        Ok((get_amount0_delta(lower, upper, liquidity, Rounding::Up)?, U256::zero()))
    } else if sqrt_price < upper {
        Ok((
            get_amount0_delta(sqrt_price, upper, liquidity, Rounding::Up)?,
            get_amount1_delta(lower, sqrt_price, liquidity, Rounding::Up)?,
        ))
    } else {
        Ok((U256::zero(), get_amount1_delta(lower, upper, liquidity, Rounding::Up)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::tick_math::sqrt_ratio_at_tick;

    fn e18(value: u64) -> U256 {
        U256::from(value) * U256::exp10(18)
    }

    #[test]
    fn test_amount_deltas() {
        // sqrt prices 1 and 2, L = 1000: dy = 1000, dx = 500
        let one = Q96;
        let two = Q96 * 2;
        let liquidity = U256::from(1000u64);

        let dy = get_amount1_delta(one, two, liquidity, Rounding::Down).unwrap();
        assert_eq!(dy, U256::from(1000u64));

        let dx = get_amount0_delta(two, one, liquidity, Rounding::Down).unwrap();
        assert_eq!(dx, U256::from(500u64));
    }

    #[test]
    fn test_amount_delta_rounding() {
        let lower = sqrt_ratio_at_tick(-60).unwrap();
        let upper = sqrt_ratio_at_tick(60).unwrap();
        let liquidity = U256::from(1_000_003u64);

        let down0 = get_amount0_delta(lower, upper, liquidity, Rounding::Down).unwrap();
        let up0 = get_amount0_delta(lower, upper, liquidity, Rounding::Up).unwrap();
        assert!(up0 == down0 || up0 == down0 + U256::one());

        let down1 = get_amount1_delta(lower, upper, liquidity, Rounding::Down).unwrap();
        let up1 = get_amount1_delta(lower, upper, liquidity, Rounding::Up).unwrap();
        assert!(up1 == down1 || up1 == down1 + U256::one());
    }

    #[test]
    fn test_degenerate_deltas_are_zero() {
        let price = Q96;
        assert!(get_amount0_delta(price, price, U256::one(), Rounding::Up).unwrap().is_zero());
        assert!(get_amount0_delta(U256::zero(), price, U256::one(), Rounding::Up).unwrap().is_zero());
        assert!(get_amount1_delta(price, price * 2, U256::zero(), Rounding::Up).unwrap().is_zero());
    }

    #[test]
    fn test_get_liquidity() {
        let one = Q96;
        let two = Q96 * 2;

        let l0 = get_liquidity_for_amount0(one, two, U256::from(500u64)).unwrap();
        assert_eq!(l0, U256::from(1000u64));

        let l1 = get_liquidity_for_amount1(one, two, U256::from(1000u64)).unwrap();
        assert_eq!(l1, U256::from(1000u64));

        assert_eq!(
            get_liquidity_for_amount1(one, one, U256::one()),
            Err(MathError::DivisionByZero)
        );
    }

    #[test]
    fn test_liquidity_for_amounts_branches() {
        let lower = sqrt_ratio_at_tick(-120).unwrap();
        let upper = sqrt_ratio_at_tick(120).unwrap();
        let amount = e18(30);

        let below = sqrt_ratio_at_tick(-600).unwrap();
        let only0 = get_liquidity_for_amounts(below, lower, upper, amount, U256::zero()).unwrap();
        assert!(!only0.is_zero());

        let above = sqrt_ratio_at_tick(600).unwrap();
        let only1 = get_liquidity_for_amounts(above, lower, upper, U256::zero(), amount).unwrap();
        assert!(!only1.is_zero());

        let inside = get_liquidity_for_amounts(Q96, lower, upper, amount, U256::zero()).unwrap();
        assert!(inside.is_zero());
    }

    #[test]
    fn test_round_trip_never_fabricates_value() {
        let cases = [
            (0, -120, 120, 30u64, 30u64),
            (0, -120, 120, 30, 7),
            (76_020, 74_400, 78_000, 50, 100_000),
            (-500, -600, 600, 1, 1_000),
            (-900, -600, 600, 10, 0),
            (900, -600, 600, 0, 10),
        ];
        for (tick, tick_lower, tick_upper, a0, a1) in cases {
            let price = sqrt_ratio_at_tick(tick).unwrap();
            let lower = sqrt_ratio_at_tick(tick_lower).unwrap();
            let upper = sqrt_ratio_at_tick(tick_upper).unwrap();
            let (amount0, amount1) = (e18(a0), e18(a1));

            let liquidity = get_liquidity_for_amounts(price, lower, upper, amount0, amount1).unwrap();
            let (used0, used1) = get_amounts_for_liquidity(price, lower, upper, liquidity).unwrap();
            assert!(used0 <= amount0, "token0 over-counted at tick {tick}");
            assert!(used1 <= amount1, "token1 over-counted at tick {tick}");
        }
    }

    #[test]
    fn test_amounts_for_liquidity_branches() {
        let lower = sqrt_ratio_at_tick(-120).unwrap();
        let upper = sqrt_ratio_at_tick(120).unwrap();
        let liquidity = e18(1000);

        let (x, y) = get_amounts_for_liquidity(lower, lower, upper, liquidity).unwrap();
        assert!(!x.is_zero() && y.is_zero());

        let (x, y) = get_amounts_for_liquidity(upper, lower, upper, liquidity).unwrap();
        assert!(x.is_zero() && !y.is_zero());

        let (x, y) = get_amounts_for_liquidity(Q96, lower, upper, liquidity).unwrap();
        assert!(!x.is_zero() && !y.is_zero());
    }
}
