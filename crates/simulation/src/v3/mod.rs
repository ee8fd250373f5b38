//! Concentrated-liquidity pool engine with a single position.

pub mod admin;
pub mod liquidity;
pub mod range;
pub mod state;
pub mod swap;

pub use admin::{apply_fee_tier_update, quote_fee_tier_update, with_token_meta};
pub use liquidity::{
    V3AddLiquidityParams, V3AddLiquidityQuote, V3RemoveLiquidityQuote, apply_add_liquidity,
    apply_remove_liquidity, quote_add_liquidity, quote_remove_liquidity,
};
pub use range::{
    align_tick_down, align_tick_up, is_tick_in_range, max_usable_tick, min_usable_tick, normalize_range,
};
pub use state::{LIQUIDITY_DUST, V3PoolState, V3Position, V3TradeRecord, create_pool, normalize_liquidity, spot_price};
pub use swap::{V3SwapQuote, apply_swap, quote_swap};
