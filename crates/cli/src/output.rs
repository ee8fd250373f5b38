//! Terminal rendering of pool state and quotes.

use amm_sandbox_domain::{Fixed, MathError, U256};
use amm_sandbox_domain::math::price_tick::sqrt_price_x96_to_price;
use amm_sandbox_simulation::timeline::Timeline;
use amm_sandbox_simulation::v2::{
    self, ArbitrageQuote, V2AddLiquidityQuote, V2PoolState, V2RemoveLiquidityQuote, V2SwapQuote,
};
use amm_sandbox_simulation::v3::{V3AddLiquidityQuote, V3PoolState, V3RemoveLiquidityQuote, V3SwapQuote};

const AMOUNT_DECIMALS: usize = 6;
const PERCENT_DECIMALS: usize = 4;
const RULE: &str = "════════════════════════════════════";

fn amount(value: Fixed) -> String {
    value.format(AMOUNT_DECIMALS)
}

fn percent(value: Fixed) -> String {
    format!("{}%", value.format_percent(PERCENT_DECIMALS))
}

fn fallible(value: Result<Fixed, MathError>) -> String {
    value.map_or_else(|err| format!("n/a ({err})"), amount)
}

fn sqrt_price(value: U256) -> String {
    fallible(sqrt_price_x96_to_price(value))
}

/// Renders a raw 18-decimal integer.
fn raw_amount(value: U256) -> String {
    Fixed::from_u256(value).map_or_else(|_| value.to_string(), amount)
}

pub fn print_history<S: Clone>(timeline: &Timeline<S>) {
    println!("{:<4} | {:<6} | {:<8} | {:<20} | Label", "", "Id", "Kind", "Created");
    println!("{}", "-".repeat(70));
    for (index, entry) in timeline.entries().iter().enumerate() {
        let marker = if index == timeline.cursor() { "▶" } else { "" };
        let created = chrono::DateTime::from_timestamp_millis(entry.created_at).unwrap_or_default();
        println!(
            "{:<4} | {:<6} | {:<8} | {:<20} | {}",
            marker,
            entry.id,
            format!("{:?}", entry.kind).to_lowercase(),
            created.format("%Y-%m-%d %H:%M:%S"),
            entry.label
        );
    }
}

pub fn print_v2_state(state: &V2PoolState) {
    let (x, y) = (&state.token_x.symbol, &state.token_y.symbol);
    println!("\n📊 Constant-Product Pool {x}/{y}");
    println!("{RULE}");
    println!("Reserve {x}:     {}", amount(state.reserve_x));
    println!("Reserve {y}:     {}", amount(state.reserve_y));
    println!("Spot Price:     {} {y} per {x}", fallible(v2::spot_price(state)));
    println!("Pool Value:     {} {y}", fallible(v2::pool_value_in_y(state)));
    println!("Fee Rate:       {}", percent(state.fee_rate));
    println!("LP Supply:      {}", amount(state.lp_total_supply));
    println!("LP Balance:     {}", amount(state.lp_user_balance));
    println!("Fees Charged:   {} {x} / {} {y}", amount(state.fee_acc_x), amount(state.fee_acc_y));
    println!("Operations:     {}", state.t);
    println!("{RULE}");
}

pub fn print_v2_swap(state: &V2PoolState, quote: &V2SwapQuote) {
    let (symbol_in, symbol_out) = state.symbols_for(quote.direction);
    println!("\n🔁 Swap {} {symbol_in} for {} {symbol_out}", amount(quote.amount_in), amount(quote.amount_out));
    println!("{RULE}");
    println!("Fee:            {} {symbol_in}", amount(quote.fee_amount_in_token));
    println!("Out (no fee):   {} {symbol_out}", amount(quote.amount_out_no_fee));
    println!("Avg Price:      {}", amount(quote.avg_price_y_per_x));
    println!(
        "Spot Price:     {} -> {}",
        amount(quote.spot_price_before_y_per_x),
        amount(quote.spot_price_after_y_per_x)
    );
    println!("Slippage:       {}", percent(quote.slippage_total));
    println!("  Curve:        {}", percent(quote.slippage_curve));
    println!("  Fee Impact:   {}", percent(quote.fee_impact_rate));
    println!(
        "Reserves After: {} {} / {} {}",
        amount(quote.reserve_x_after),
        state.token_x.symbol,
        amount(quote.reserve_y_after),
        state.token_y.symbol
    );
    println!("k:              {} -> {}", quote.k_before, quote.k_after);
    println!("{RULE}");
}

pub fn print_v2_add(state: &V2PoolState, quote: &V2AddLiquidityQuote) {
    let (x, y) = (&state.token_x.symbol, &state.token_y.symbol);
    println!("\n➕ Add Liquidity {x}/{y}");
    println!("{RULE}");
    println!("Used:           {} {x} / {} {y}", amount(quote.amount_x_used), amount(quote.amount_y_used));
    println!("Refund:         {} {x} / {} {y}", amount(quote.refund_x), amount(quote.refund_y));
    println!("LP Minted:      {}", amount(quote.lp_mint));
    println!("Pool Share:     {}", percent(quote.lp_share_after));
    println!("{RULE}");
}

pub fn print_v2_remove(state: &V2PoolState, quote: &V2RemoveLiquidityQuote) {
    let (x, y) = (&state.token_x.symbol, &state.token_y.symbol);
    println!("\n➖ Remove Liquidity {x}/{y}");
    println!("{RULE}");
    println!("LP Burned:      {}", amount(quote.burn_lp));
    println!("Received:       {} {x} / {} {y}", amount(quote.out_x), amount(quote.out_y));
    println!("Pool Share:     {}", percent(quote.lp_share_after));
    println!("{RULE}");
}

pub fn print_v2_arbitrage(state: &V2PoolState, quote: &ArbitrageQuote) {
    let (symbol_in, symbol_out) = state.symbols_for(quote.direction);
    println!("\n🎯 Arbitrage toward {}", amount(quote.external_price));
    println!("{RULE}");
    println!("Trade:          {} {symbol_in} -> {} {symbol_out}", amount(quote.amount_in), amount(quote.amount_out));
    println!(
        "Spot Price:     {} -> {}",
        amount(quote.spot_price_before),
        amount(quote.spot_price_after)
    );
    println!("Spread:         {} -> {}", percent(quote.spread_before), percent(quote.spread_after));
    println!("Profit:         {} {}", amount(quote.expected_profit_in_y), state.token_y.symbol);
    println!("{RULE}");
}

pub fn print_v3_state(state: &V3PoolState) {
    let (x, y) = (&state.token_x.symbol, &state.token_y.symbol);
    let position = &state.position;
    println!("\n📊 Concentrated-Liquidity Pool {x}/{y} ({})", state.fee_tier);
    println!("{RULE}");
    println!("Spot Price:     {} {y} per {x}", sqrt_price(state.sqrt_price_x96));
    println!("Tick:           {} (spacing {})", state.tick_current, state.tick_spacing);
    println!("Range:          [{}, {})", position.tick_lower, position.tick_upper);
    println!("In Range:       {}", if state.is_in_range() { "yes" } else { "no" });
    println!("Position L:     {}", amount(position.liquidity));
    println!("Active L:       {}", amount(state.liquidity));
    match state.virtual_reserves(state.sqrt_price_x96, state.liquidity) {
        Ok((reserve_x, reserve_y)) => println!(
            "Virtual:        {} {x} / {} {y}",
            raw_amount(reserve_x),
            raw_amount(reserve_y)
        ),
        Err(err) => println!("Virtual:        n/a ({err})"),
    }
    println!("Fees Owed:      {} {x} / {} {y}", amount(position.fee_owed_x), amount(position.fee_owed_y));
    println!("Operations:     {}", state.t);
    println!("{RULE}");
}

pub fn print_v3_swap(state: &V3PoolState, quote: &V3SwapQuote) {
    let (x, y) = (&state.token_x.symbol, &state.token_y.symbol);
    let (symbol_in, symbol_out) = if quote.direction.is_zero_for_one() { (x, y) } else { (y, x) };
    println!(
        "\n🔁 Swap {} {symbol_in} for {} {symbol_out}",
        amount(quote.amount_in_consumed),
        amount(quote.amount_out)
    );
    println!("{RULE}");
    if quote.partial_fill {
        println!("⚠️  Range exhausted, {} {symbol_in} unfilled", amount(quote.amount_in_unfilled));
    }
    println!("Fee:            {} {symbol_in}", amount(quote.fee_amount_in_token));
    println!("Avg Price:      {}", amount(quote.avg_price_y_per_x));
    println!(
        "Spot Price:     {} -> {}",
        amount(quote.spot_price_before_y_per_x),
        amount(quote.spot_price_after_y_per_x)
    );
    println!("Slippage:       {}", percent(quote.slippage_total));
    println!("Tick:           {} -> {}", quote.tick_before, quote.tick_after);
    println!(
        "Active L:       {} -> {}",
        amount(quote.liquidity_before),
        amount(quote.liquidity_after)
    );
    println!("{RULE}");
}

pub fn print_v3_add(state: &V3PoolState, quote: &V3AddLiquidityQuote) {
    let (x, y) = (&state.token_x.symbol, &state.token_y.symbol);
    println!("\n➕ Add Liquidity [{}, {})", quote.tick_lower, quote.tick_upper);
    println!("{RULE}");
    if quote.range_updated {
        println!("Range moved from [{}, {})", state.position.tick_lower, state.position.tick_upper);
    }
    println!("Used:           {} {x} / {} {y}", amount(quote.amount_x_used), amount(quote.amount_y_used));
    println!("Refund:         {} {x} / {} {y}", amount(quote.refund_x), amount(quote.refund_y));
    println!("Liquidity:      +{}", amount(quote.liquidity_delta));
    println!("Position L:     {}", amount(quote.position_liquidity_after));
    println!("Active L:       {}", amount(quote.active_liquidity_after));
    println!("{RULE}");
}

pub fn print_v3_remove(state: &V3PoolState, quote: &V3RemoveLiquidityQuote) {
    let (x, y) = (&state.token_x.symbol, &state.token_y.symbol);
    println!("\n➖ Remove Liquidity [{}, {})", state.position.tick_lower, state.position.tick_upper);
    println!("{RULE}");
    println!("Liquidity:      -{}", amount(quote.liquidity_delta));
    println!("Received:       {} {x} / {} {y}", amount(quote.amount_x_out), amount(quote.amount_y_out));
    println!("Position L:     {}", amount(quote.position_liquidity_after));
    println!("Active L:       {}", amount(quote.active_liquidity_after));
    println!("{RULE}");
}
