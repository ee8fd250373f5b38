use crate::error::MathError;
use crate::fixed::Fixed;
use primitive_types::{U256, U512};

/// Splits `amount_in` into the part that trades and the part kept as fee.
/// Returns `(amount_in_after_fee, fee_amount)`.
pub fn apply_fee(amount_in: Fixed, fee_rate: Fixed) -> Result<(Fixed, Fixed), MathError> {
    let after_fee = amount_in.checked_mul(Fixed::ONE.checked_sub(fee_rate)?)?;
    Ok((after_fee, amount_in.checked_sub(after_fee)?))
}

/// Calculates the output amount for an input that already has the fee removed.
///
/// formula: dy = y * dx / (x + dx)
pub fn calculate_out_amount(amount_in: Fixed, reserve_in: Fixed, reserve_out: Fixed) -> Result<Fixed, MathError> {
    Fixed::mul_div(reserve_out, amount_in, reserve_in.checked_add(amount_in)?)
}

/// Price of X in units of Y. Price = reserve_y / reserve_x
pub fn calculate_spot_price(reserve_x: Fixed, reserve_y: Fixed) -> Result<Fixed, MathError> {
    reserve_y.checked_div(reserve_x)
}

/// Calculates the constant product K on the raw scaled integers.
pub fn calculate_k(reserve_x: Fixed, reserve_y: Fixed) -> Result<U256, MathError> {
    Ok(reserve_x.to_u256()?.saturating_mul(reserve_y.to_u256()?))
}

fn isqrt(value: U512) -> U512 {
    if value < U512::from(2u8) {
        return value;
    }
    let mut x0 = value;
    let mut x1 = (value >> 1) + (value & U512::one());
    while x1 < x0 {
        x0 = x1;
        x1 = (x1 + value / x1) >> 1;
    }
    x0
}

/// LP supply minted by the first deposit: the scaled geometric mean.
///
/// The product is taken in 512 bits and the root never exceeds the larger
/// input, so this cannot overflow. Negative inputs yield zero.
pub fn initial_lp_supply(amount_x: Fixed, amount_y: Fixed) -> Fixed {
    let (Ok(x), Ok(y)) = (amount_x.to_u256(), amount_y.to_u256()) else {
        return Fixed::ZERO;
    };
    U256::try_from(isqrt(x.full_mul(y)))
        .ok()
        .and_then(|root| Fixed::from_u256(root).ok())
        .unwrap_or(Fixed::ZERO)
}

/// Deposit clipped to the `reserve_x : reserve_y` ratio.
/// Returns `(amount_x_used, amount_y_used)`.
pub fn clip_to_ratio(
    amount_x: Fixed,
    amount_y: Fixed,
    reserve_x: Fixed,
    reserve_y: Fixed,
) -> Result<(Fixed, Fixed), MathError> {
    let amount_y_optimal = Fixed::mul_div(amount_x, reserve_y, reserve_x)?;
    if amount_y_optimal <= amount_y {
        Ok((amount_x, amount_y_optimal))
    } else {
        Ok((Fixed::mul_div(amount_y, reserve_x, reserve_y)?, amount_y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_out_amount() {
        // 1000 / 1000 pool, 10 in with 0.3% fee
        // after fee = 9.97, out = 1000 * 9.97 / 1009.97 = 9.8715...
        let (after_fee, fee) = apply_fee(Fixed::from_int(10), Fixed::parse("0.003")).unwrap();
        assert_eq!(after_fee, Fixed::parse("9.97"));
        assert_eq!(fee, Fixed::parse("0.03"));

        let out = calculate_out_amount(after_fee, Fixed::from_int(1000), Fixed::from_int(1000)).unwrap();
        assert_eq!(out.format(4), "9.8715");
    }

    #[test]
    fn test_calculate_spot_price() {
        let price = calculate_spot_price(Fixed::from_int(2000), Fixed::from_int(1000));
        assert_eq!(price, Ok(Fixed::parse("0.5")));
        assert_eq!(calculate_spot_price(Fixed::ZERO, Fixed::from_int(1)), Ok(Fixed::ZERO));

        // a dust X reserve against a huge Y reserve has no representable price
        let huge = Fixed::parse(&format!("1{}", "0".repeat(50)));
        assert_eq!(
            calculate_spot_price(Fixed::from_raw_i128(1), huge),
            Err(MathError::Overflow("scaled decimal"))
        );
    }

    #[test]
    fn test_calculate_k() {
        let k = calculate_k(Fixed::from_int(2), Fixed::from_int(3)).unwrap();
        assert_eq!(k.to_string(), "6000000000000000000000000000000000000");
        assert!(calculate_k(Fixed::from_int(-1), Fixed::ONE).is_err());
    }

    #[test]
    fn test_initial_lp_supply() {
        let lp = initial_lp_supply(Fixed::from_int(1000), Fixed::from_int(4000));
        assert_eq!(lp, Fixed::from_int(2000));
        assert_eq!(initial_lp_supply(Fixed::from_int(-1), Fixed::ONE), Fixed::ZERO);
        assert_eq!(isqrt(U512::from(99u8)), U512::from(9u8));
        assert_eq!(isqrt(U512::from(3u8)), U512::one());
    }

    #[test]
    fn test_initial_lp_supply_for_large_reserves() {
        // raw product 10^78 is past the signed 256-bit range
        let reserve = Fixed::parse("1000000000000000000000");
        assert_eq!(initial_lp_supply(reserve, reserve), reserve);
        assert_eq!(initial_lp_supply(Fixed::max_value(), Fixed::max_value()), Fixed::max_value());
    }

    #[test]
    fn test_clip_to_ratio() {
        let (x, y) = clip_to_ratio(
            Fixed::from_int(100),
            Fixed::from_int(300),
            Fixed::from_int(1000),
            Fixed::from_int(2000),
        )
        .unwrap();
        assert_eq!((x, y), (Fixed::from_int(100), Fixed::from_int(200)));

        let (x, y) = clip_to_ratio(
            Fixed::from_int(100),
            Fixed::from_int(100),
            Fixed::from_int(1000),
            Fixed::from_int(2000),
        )
        .unwrap();
        assert_eq!((x, y), (Fixed::from_int(50), Fixed::from_int(100)));
    }
}
