//! Constant-product (x·y = k) pool engine.

pub mod admin;
pub mod arbitrage;
pub mod liquidity;
pub mod state;
pub mod swap;

pub use admin::{apply_fee_rate_update, quote_fee_rate_update, with_token_meta};
pub use arbitrage::{ArbitrageQuote, apply_arbitrage, quote_arbitrage, quote_arbitrage_with_config};
pub use liquidity::{
    V2AddLiquidityQuote, V2RemoveLiquidityQuote, apply_add_liquidity, apply_remove_liquidity,
    quote_add_liquidity, quote_remove_liquidity,
};
pub use state::{V2PoolState, V2TradeRecord, create_pool, pool_value_in_y, relative_spread, spot_price};
pub use swap::{V2SwapQuote, apply_swap, quote_swap};
