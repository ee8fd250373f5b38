//! Tick <-> Q96 square-root price mapping.
//!
//! A tick `i` corresponds to the price `1.0001^i`. The forward mapping uses
//! the fixed table of Q128 factors `1 / sqrt(1.0001^(2^k))`, multiplied in
//! for every set bit of `|tick|`; the inverse is a binary search over the
//! forward mapping.

use crate::error::MathError;
use primitive_types::U256;

pub const MIN_TICK: i32 = -887_272;
pub const MAX_TICK: i32 = 887_272;

/// `sqrt_ratio_at_tick(MIN_TICK)`.
pub const MIN_SQRT_RATIO: U256 = U256([4_295_128_739, 0, 0, 0]);
/// `sqrt_ratio_at_tick(MAX_TICK)`, i.e.
/// 1461446703485210103287273052203988822378723970342.
pub const MAX_SQRT_RATIO: U256 = U256([0x5d95_1d52_6398_8d26, 0xefd1_fc6a_5064_8849, 0xfffd_8963, 0]);

const BIT_FACTORS: [(u32, u128); 19] = [
    (0x2, 0xfff97272373d413259a46990580e213a),
    (0x4, 0xfff2e50f5f656932ef12357cf3c7fdcc),
    (0x8, 0xffe5caca7e10e4e61c3624eaa0941cd0),
    (0x10, 0xffcb9843d60f6159c9db58835c926644),
    (0x20, 0xff973b41fa98c081472e6896dfb254c0),
    (0x40, 0xff2ea16466c96a3843ec78b326b52861),
    (0x80, 0xfe5dee046a99a2a811c461f1969c3053),
    (0x100, 0xfcbe86c7900a88aedcffc83b479aa3a4),
    (0x200, 0xf987a7253ac413176f2b074cf7815e54),
    (0x400, 0xf3392b0822b70005940c7a398e4b70f3),
    (0x800, 0xe7159475a2c29b7443b29c7fa6e889d9),
    (0x1000, 0xd097f3bdfd2022b8845ad8f792aa5825),
    (0x2000, 0xa9f746462d870fdf8a65dc1f90e061e5),
    (0x4000, 0x70d869a156d2a1b890bb3df62baf32f7),
    (0x8000, 0x31be135f97d08fd981231505542fcfa6),
    (0x10000, 0x9aa508b5b7a84e1c677de54f3e99bc9),
    (0x20000, 0x5d6af8dedb81196699c329225ee604),
    (0x40000, 0x2216e584f5fa1ea926041bedfe98),
    (0x80000, 0x48a170391f7dc42444e8fa2),
];

const ODD_TICK_FACTOR: u128 = 0xfffcb933bd6fad37aa2d162d1a594001;

/// Q96 square-root price of `tick`.
///
/// The ratio is accumulated in Q128 for `-|tick|`; positive ticks invert it
/// (`U256::MAX / ratio`) before the shift down to Q96, which rounds up on a
/// non-zero remainder.
pub fn sqrt_ratio_at_tick(tick: i32) -> Result<U256, MathError> {
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(MathError::TickOutOfRange(tick));
    }
    let abs_tick = tick.unsigned_abs();

    let mut ratio = if abs_tick & 0x1 != 0 {
        U256::from(ODD_TICK_FACTOR)
    } else {
        U256::one() << 128
    };
    for (bit, factor) in BIT_FACTORS {
        if abs_tick & bit != 0 {
            ratio = (ratio * U256::from(factor)) >> 128;
        }
    }

    if tick > 0 {
        ratio = U256::MAX / ratio;
    }

    let remainder_mask = (U256::one() << 32) - U256::one();
    let round_up = if (ratio & remainder_mask).is_zero() {
        U256::zero()
    } else {
        U256::one()
    };
    Ok((ratio >> 32) + round_up)
}

/// Highest tick whose square-root price does not exceed `sqrt_price_x96`.
///
/// Input must lie in `[MIN_SQRT_RATIO, MAX_SQRT_RATIO)`.
pub fn tick_at_sqrt_ratio(sqrt_price_x96: U256) -> Result<i32, MathError> {
    if sqrt_price_x96 < MIN_SQRT_RATIO || sqrt_price_x96 >= MAX_SQRT_RATIO {
        return Err(MathError::SqrtRatioOutOfRange(sqrt_price_x96.to_string()));
    }

    let mut low = MIN_TICK;
    let mut high = MAX_TICK;
    while low <= high {
        let mid = (low + high).div_euclid(2);
        let ratio = sqrt_ratio_at_tick(mid)?;
        if ratio == sqrt_price_x96 {
            return Ok(mid);
        }
        if ratio < sqrt_price_x96 {
            low = mid + 1;
        } else {
            high = mid - 1;
        }
    }
    Ok(high)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::q_math::Q96;

    #[test]
    fn test_boundary_constants() {
        assert_eq!(sqrt_ratio_at_tick(MIN_TICK).unwrap(), MIN_SQRT_RATIO);
        assert_eq!(sqrt_ratio_at_tick(MAX_TICK).unwrap(), MAX_SQRT_RATIO);
        assert_eq!(
            MAX_SQRT_RATIO.to_string(),
            "1461446703485210103287273052203988822378723970342"
        );
    }

    #[test]
    fn test_tick_zero_is_unit_price() {
        assert_eq!(sqrt_ratio_at_tick(0).unwrap(), Q96);
        assert_eq!(tick_at_sqrt_ratio(Q96).unwrap(), 0);
    }

    #[test]
    fn test_out_of_range_ticks_fail() {
        assert_eq!(
            sqrt_ratio_at_tick(MIN_TICK - 1),
            Err(MathError::TickOutOfRange(MIN_TICK - 1))
        );
        assert_eq!(
            sqrt_ratio_at_tick(MAX_TICK + 1),
            Err(MathError::TickOutOfRange(MAX_TICK + 1))
        );
        assert!(tick_at_sqrt_ratio(MIN_SQRT_RATIO - U256::one()).is_err());
        assert!(tick_at_sqrt_ratio(MAX_SQRT_RATIO).is_err());
    }

    #[test]
    fn test_ratio_is_monotonic() {
        let mut previous = sqrt_ratio_at_tick(-2000).unwrap();
        for tick in -1999..=2000 {
            let ratio = sqrt_ratio_at_tick(tick).unwrap();
            assert!(ratio > previous, "ratio not increasing at tick {tick}");
            previous = ratio;
        }
    }

    #[test]
    fn test_round_trip_across_domain() {
        let samples = [
            MIN_TICK,
            MIN_TICK + 1,
            -500_000,
            -76_020,
            -1200,
            -1,
            0,
            1,
            60,
            1200,
            76_020,
            500_000,
            MAX_TICK - 1,
        ];
        for tick in samples {
            let sqrt = sqrt_ratio_at_tick(tick).unwrap();
            assert_eq!(tick_at_sqrt_ratio(sqrt).unwrap(), tick);
        }
    }

    #[test]
    fn test_inverse_returns_highest_tick_not_above() {
        let at_ten = sqrt_ratio_at_tick(10).unwrap();
        let at_eleven = sqrt_ratio_at_tick(11).unwrap();
        assert_eq!(tick_at_sqrt_ratio(at_ten + U256::one()).unwrap(), 10);
        assert_eq!(tick_at_sqrt_ratio(at_eleven - U256::one()).unwrap(), 10);
    }
}
