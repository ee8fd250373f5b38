pub mod constant_product;
pub mod liquidity_amounts;
pub mod price_tick;
pub mod q_math;
pub mod swap_math;
pub mod tick_math;

pub use q_math::{Q96, Q128, Q192, Rounding};
pub use tick_math::{MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO, MIN_TICK};
