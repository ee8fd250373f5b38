//! Pool construction parameters and solver tuning.
//!
//! Amounts and prices are kept as decimal text, the way they arrive from a
//! form field or a preset; the pool constructors parse them leniently.

use amm_sandbox_domain::{FeeTier, TokenInfo};

/// Parameters for a new constant-product pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct V2PoolParams {
    /// Base token.
    pub token_x: TokenInfo,
    /// Quote token.
    pub token_y: TokenInfo,
    /// Initial X reserve.
    pub reserve_x: String,
    /// Initial Y reserve.
    pub reserve_y: String,
    /// Swap fee as a fraction, e.g. `0.003`.
    pub fee_rate: String,
}

impl V2PoolParams {
    /// Creates params with the default tokens and fee.
    #[must_use]
    pub fn new(reserve_x: impl Into<String>, reserve_y: impl Into<String>) -> Self {
        Self {
            reserve_x: reserve_x.into(),
            reserve_y: reserve_y.into(),
            ..Self::default()
        }
    }

    /// Sets the token pair.
    #[must_use]
    pub fn with_tokens(mut self, token_x: TokenInfo, token_y: TokenInfo) -> Self {
        self.token_x = token_x;
        self.token_y = token_y;
        self
    }

    /// Sets the fee rate.
    #[must_use]
    pub fn with_fee_rate(mut self, fee_rate: impl Into<String>) -> Self {
        self.fee_rate = fee_rate.into();
        self
    }
}

impl Default for V2PoolParams {
    fn default() -> Self {
        Self {
            token_x: TokenInfo::new("X", 18),
            token_y: TokenInfo::new("Y", 18),
            reserve_x: "10000".to_string(),
            reserve_y: "10000".to_string(),
            fee_rate: "0.003".to_string(),
        }
    }
}

/// Parameters for a new concentrated-liquidity pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct V3PoolParams {
    /// Base token.
    pub token_x: TokenInfo,
    /// Quote token.
    pub token_y: TokenInfo,
    /// Fee tier, which also fixes the tick spacing.
    pub fee_tier: FeeTier,
    /// Initial price of X in Y.
    pub initial_price: String,
    /// Lower range tick; ten spacings below the current tick when unset.
    pub tick_lower: Option<i32>,
    /// Upper range tick; ten spacings above the current tick when unset.
    pub tick_upper: Option<i32>,
    /// X deposited into the initial position.
    pub initial_amount_x: String,
    /// Y deposited into the initial position.
    pub initial_amount_y: String,
}

impl V3PoolParams {
    /// Creates params for `fee_tier` at `initial_price`.
    #[must_use]
    pub fn new(fee_tier: FeeTier, initial_price: impl Into<String>) -> Self {
        Self {
            fee_tier,
            initial_price: initial_price.into(),
            ..Self::default()
        }
    }

    /// Sets the token pair.
    #[must_use]
    pub fn with_tokens(mut self, token_x: TokenInfo, token_y: TokenInfo) -> Self {
        self.token_x = token_x;
        self.token_y = token_y;
        self
    }

    /// Sets an explicit position range.
    #[must_use]
    pub fn with_range(mut self, tick_lower: i32, tick_upper: i32) -> Self {
        self.tick_lower = Some(tick_lower);
        self.tick_upper = Some(tick_upper);
        self
    }

    /// Sets the initial deposit.
    #[must_use]
    pub fn with_amounts(mut self, amount_x: impl Into<String>, amount_y: impl Into<String>) -> Self {
        self.initial_amount_x = amount_x.into();
        self.initial_amount_y = amount_y.into();
        self
    }
}

impl Default for V3PoolParams {
    fn default() -> Self {
        Self {
            token_x: TokenInfo::new("X", 18),
            token_y: TokenInfo::new("Y", 18),
            fee_tier: FeeTier::Medium,
            initial_price: "1".to_string(),
            tick_lower: None,
            tick_upper: None,
            initial_amount_x: "10000".to_string(),
            initial_amount_y: "10000".to_string(),
        }
    }
}

/// Search bounds for the v2 arbitrage solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArbitrageConfig {
    /// The first trial input is `input_reserve / seed_divisor` (at least one raw unit).
    pub seed_divisor: u64,
    /// The expanding search stops at `input_reserve * cap_multiplier`.
    pub cap_multiplier: u64,
    /// Iteration cap for each of the two search loops.
    pub max_iterations: u32,
}

impl ArbitrageConfig {
    /// Sets the seed divisor.
    #[must_use]
    pub fn with_seed_divisor(mut self, seed_divisor: u64) -> Self {
        self.seed_divisor = seed_divisor.max(1);
        self
    }

    /// Sets the cap multiplier.
    #[must_use]
    pub fn with_cap_multiplier(mut self, cap_multiplier: u64) -> Self {
        self.cap_multiplier = cap_multiplier.max(1);
        self
    }

    /// Sets the iteration cap.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

impl Default for ArbitrageConfig {
    fn default() -> Self {
        Self {
            seed_divisor: 1_000,
            cap_multiplier: 1_000_000,
            max_iterations: 90,
        }
    }
}
