//! Command Line Interface for the AMM sandbox.
//!
//! The state file holds a whole timeline document, so every command can be
//! undone. Quotes are printed without touching the file unless `--apply` is
//! given.
mod output;

use amm_sandbox_domain::{FeeTier, Fixed, OperationKind, SwapDirection, TokenInfo};
use amm_sandbox_simulation::codec::{PoolSnapshot, export_timeline, import_timeline};
use amm_sandbox_simulation::config::ArbitrageConfig;
use amm_sandbox_simulation::presets::{v2_timeline, v3_timeline};
use amm_sandbox_simulation::quote::Quote;
use amm_sandbox_simulation::timeline::{
    FEE_RATE_LABEL, TOKEN_META_LABEL, Timeline, add_liquidity_label, fee_tier_label, remove_liquidity_label,
    swap_label,
};
use amm_sandbox_simulation::v2::{self, V2PoolState};
use amm_sandbox_simulation::v3::{self, V3AddLiquidityParams, V3PoolState};
use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand, ValueEnum};
use dotenv::dotenv;
use std::env;
use std::fs;
use std::path::PathBuf;
use tracing::info;

const STATE_ENV: &str = "AMM_SANDBOX_STATE";
const DEFAULT_STATE_FILE: &str = "amm-sandbox.json";

#[derive(Parser)]
#[command(name = "amm-sandbox")]
#[command(about = "What-if sandbox for constant-product and concentrated-liquidity pools", long_about = None)]
struct Cli {
    /// Timeline file to read (defaults to $AMM_SANDBOX_STATE, then ./amm-sandbox.json)
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    /// Where to write the updated timeline (defaults to the state file)
    #[arg(long, global = true)]
    out: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Constant-product pool
    #[command(subcommand)]
    V2(V2Command),
    /// Concentrated-liquidity pool
    #[command(subcommand)]
    V3(V3Command),
}

#[derive(Subcommand)]
enum V2Command {
    /// Start a new timeline from a preset (deep, shallow, imbalanced, zero-fee)
    Init {
        #[arg(short, long, default_value = "deep")]
        preset: String,
    },
    /// Quote an exact-input swap
    Swap(SwapArgs),
    /// Quote a proportional deposit
    Add {
        #[arg(short, long, value_parser = parse_amount)]
        x: Fixed,
        #[arg(short, long, value_parser = parse_amount)]
        y: Fixed,
        #[arg(long)]
        apply: bool,
    },
    /// Quote burning LP tokens
    Remove {
        /// LP tokens to burn
        #[arg(long, value_parser = parse_amount)]
        lp: Fixed,
        #[arg(long)]
        apply: bool,
    },
    /// Quote the trade that moves the pool toward an external price
    Arbitrage {
        /// External price of X in Y
        #[arg(short, long, value_parser = parse_amount)]
        price: Fixed,
        /// Iteration cap for each search phase
        #[arg(long, default_value_t = 90)]
        max_iterations: u32,
        #[arg(long)]
        apply: bool,
    },
    /// Change the swap fee
    Fee {
        /// Fee as a fraction, e.g. 0.003
        #[arg(short, long, value_parser = parse_amount)]
        rate: Fixed,
    },
    /// Rename the tokens
    Tokens(TokenArgs),
    /// Print the current state
    Show,
    #[command(flatten)]
    History(HistoryCommand),
}

#[derive(Subcommand)]
enum V3Command {
    /// Start a new timeline from a preset (balanced, narrow, wide)
    Init {
        #[arg(short, long, default_value = "balanced")]
        preset: String,
    },
    /// Quote an exact-input swap inside the position range
    Swap(SwapArgs),
    /// Quote a deposit, optionally into a new range
    Add {
        #[arg(short, long, value_parser = parse_amount, default_value = "0")]
        x: Fixed,
        #[arg(short, long, value_parser = parse_amount, default_value = "0")]
        y: Fixed,
        #[arg(long, allow_hyphen_values = true)]
        lower: Option<i32>,
        #[arg(long, allow_hyphen_values = true)]
        upper: Option<i32>,
        #[arg(long)]
        apply: bool,
    },
    /// Quote a liquidity withdrawal
    Remove {
        /// Liquidity to burn
        #[arg(long, value_parser = parse_amount, required_unless_present = "all", conflicts_with = "all")]
        liquidity: Option<Fixed>,
        /// Burn the whole position
        #[arg(long)]
        all: bool,
        #[arg(long)]
        apply: bool,
    },
    /// Switch the fee tier of an empty position (500, 3000 or 10000)
    FeeTier {
        #[arg(short, long, value_parser = parse_fee_tier)]
        tier: FeeTier,
    },
    /// Rename the tokens
    Tokens(TokenArgs),
    /// Print the current state
    Show,
    #[command(flatten)]
    History(HistoryCommand),
}

#[derive(Subcommand)]
enum HistoryCommand {
    /// List timeline entries
    History,
    /// Step back one entry
    Undo,
    /// Step forward one entry
    Redo,
    /// Move to a timeline entry by index
    Jump { index: usize },
}

#[derive(Args)]
struct SwapArgs {
    #[arg(short, long, value_enum)]
    direction: DirectionArg,
    /// Input amount
    #[arg(short, long, value_parser = parse_amount)]
    amount: Fixed,
    /// Commit the quote to the timeline
    #[arg(long)]
    apply: bool,
}

#[derive(Args)]
struct TokenArgs {
    /// Token X as SYMBOL:DECIMALS
    #[arg(long, value_parser = parse_token)]
    x: TokenInfo,
    /// Token Y as SYMBOL:DECIMALS
    #[arg(long, value_parser = parse_token)]
    y: TokenInfo,
}

#[derive(Clone, Copy, ValueEnum)]
enum DirectionArg {
    XToY,
    YToX,
}

impl From<DirectionArg> for SwapDirection {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::XToY => SwapDirection::XToY,
            DirectionArg::YToX => SwapDirection::YToX,
        }
    }
}

fn parse_amount(text: &str) -> Result<Fixed, String> {
    Fixed::parse_strict(text).map_err(|err| err.to_string())
}

fn parse_fee_tier(text: &str) -> Result<FeeTier, String> {
    let value: u32 = text.parse().map_err(|_| format!("not a fee tier: {text}"))?;
    FeeTier::try_from(value)
}

fn parse_token(text: &str) -> Result<TokenInfo, String> {
    let (symbol, decimals) = text.rsplit_once(':').unwrap_or((text, "18"));
    let decimals = decimals
        .parse::<u8>()
        .map_err(|_| format!("invalid decimals in {text:?}"))?;
    Ok(TokenInfo::new(symbol, decimals).normalized())
}

/// A loaded timeline and where it goes back to.
struct Session<S> {
    out: PathBuf,
    timeline: Timeline<S>,
}

impl<S: PoolSnapshot> Session<S> {
    fn load(state: PathBuf, out: Option<PathBuf>) -> Result<Self> {
        let text = fs::read_to_string(&state)
            .with_context(|| format!("Failed to read {} (run `init` first)", state.display()))?;
        let timeline = import_timeline(&text).with_context(|| format!("Failed to load {}", state.display()))?;
        Ok(Self {
            out: out.unwrap_or(state),
            timeline,
        })
    }

    fn save(&self) -> Result<()> {
        let text = export_timeline(&self.timeline)?;
        fs::write(&self.out, text).with_context(|| format!("Failed to write {}", self.out.display()))?;
        info!(path = %self.out.display(), entries = self.timeline.entries().len(), "Saved timeline");
        Ok(())
    }

    /// Quotes against the present state and, with `apply`, commits and saves.
    fn run<Q>(
        &mut self,
        apply: bool,
        kind: OperationKind,
        label: String,
        quote_fn: impl FnOnce(&S) -> Quote<Q>,
        apply_fn: impl FnOnce(&S, &Quote<Q>) -> S,
    ) -> Result<Q> {
        let quote = if apply {
            self.timeline.execute(kind, label, quote_fn, apply_fn)
        } else {
            quote_fn(self.timeline.current())
        };
        let quote = quote.map_err(|err| anyhow!("Quote rejected: {err}"))?;
        if apply {
            self.save()?;
        }
        Ok(quote)
    }

    /// Commits an administrative change that has no quote of its own.
    fn commit(&mut self, label: &str, snapshot: S) -> Result<()> {
        self.timeline.commit(OperationKind::Reset, label, snapshot);
        self.save()
    }

    fn history(&mut self, command: HistoryCommand) -> Result<()> {
        let moved = match command {
            HistoryCommand::History => {
                output::print_history(&self.timeline);
                return Ok(());
            }
            HistoryCommand::Undo => self.timeline.undo(),
            HistoryCommand::Redo => self.timeline.redo(),
            HistoryCommand::Jump { index } => self.timeline.jump_to(index),
        };
        if !moved {
            println!("Nothing to do: cursor stays at entry {}", self.timeline.cursor());
            return Ok(());
        }
        self.save()?;
        println!(
            "Now at entry {}: {}",
            self.timeline.cursor(),
            self.timeline.current_entry().label
        );
        Ok(())
    }
}

fn write_new<S: PoolSnapshot>(path: PathBuf, timeline: &Timeline<S>) -> Result<()> {
    let text = export_timeline(timeline)?;
    fs::write(&path, text).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("✅ {} written to {}", timeline.current_entry().label, path.display());
    Ok(())
}

fn run_v2(command: V2Command, state: PathBuf, out: Option<PathBuf>) -> Result<()> {
    if let V2Command::Init { preset } = &command {
        let timeline = v2_timeline(preset);
        output::print_v2_state(timeline.current());
        return write_new(out.unwrap_or(state), &timeline);
    }

    let mut session = Session::<V2PoolState>::load(state, out)?;
    let current = session.timeline.current().clone();
    let (symbol_x, symbol_y) = (current.token_x.symbol.as_str(), current.token_y.symbol.as_str());

    match command {
        V2Command::Init { .. } => unreachable!("handled above"),
        V2Command::Swap(args) => {
            let direction = SwapDirection::from(args.direction);
            let quote = session.run(
                args.apply,
                OperationKind::Swap,
                swap_label(direction, symbol_x, symbol_y),
                |state| v2::quote_swap(state, direction, args.amount),
                v2::apply_swap,
            )?;
            output::print_v2_swap(&current, &quote);
        }
        V2Command::Add { x, y, apply } => {
            let quote = session.run(
                apply,
                OperationKind::Add,
                add_liquidity_label(symbol_x, symbol_y),
                |state| v2::quote_add_liquidity(state, x, y),
                v2::apply_add_liquidity,
            )?;
            output::print_v2_add(&current, &quote);
        }
        V2Command::Remove { lp, apply } => {
            let quote = session.run(
                apply,
                OperationKind::Remove,
                remove_liquidity_label(symbol_x, symbol_y),
                |state| v2::quote_remove_liquidity(state, lp),
                v2::apply_remove_liquidity,
            )?;
            output::print_v2_remove(&current, &quote);
        }
        V2Command::Arbitrage {
            price,
            max_iterations,
            apply,
        } => {
            let config = ArbitrageConfig::default().with_max_iterations(max_iterations);
            let label = match v2::quote_arbitrage_with_config(&current, price, &config) {
                Ok(quote) => swap_label(quote.direction, symbol_x, symbol_y),
                Err(_) => String::new(),
            };
            let quote = session.run(
                apply,
                OperationKind::Swap,
                label,
                |state| v2::quote_arbitrage_with_config(state, price, &config),
                v2::apply_arbitrage,
            )?;
            output::print_v2_arbitrage(&current, &quote);
        }
        V2Command::Fee { rate } => {
            let quote = v2::quote_fee_rate_update(rate).map_err(|err| anyhow!("Fee rejected: {err}"))?;
            let next = v2::apply_fee_rate_update(&current, &Ok(quote));
            session.commit(FEE_RATE_LABEL, next)?;
            println!("Fee rate set to {}%", rate.format_percent(4));
        }
        V2Command::Tokens(args) => {
            session.commit(TOKEN_META_LABEL, v2::with_token_meta(&current, &args.x, &args.y))?;
            println!("Tokens set to {}/{}", args.x, args.y);
        }
        V2Command::Show => output::print_v2_state(&current),
        V2Command::History(history) => session.history(history)?,
    }
    Ok(())
}

fn run_v3(command: V3Command, state: PathBuf, out: Option<PathBuf>) -> Result<()> {
    if let V3Command::Init { preset } = &command {
        let timeline = v3_timeline(preset)?;
        output::print_v3_state(timeline.current());
        return write_new(out.unwrap_or(state), &timeline);
    }

    let mut session = Session::<V3PoolState>::load(state, out)?;
    let current = session.timeline.current().clone();
    let (symbol_x, symbol_y) = (current.token_x.symbol.as_str(), current.token_y.symbol.as_str());

    match command {
        V3Command::Init { .. } => unreachable!("handled above"),
        V3Command::Swap(args) => {
            let direction = SwapDirection::from(args.direction);
            let quote = session.run(
                args.apply,
                OperationKind::Swap,
                swap_label(direction, symbol_x, symbol_y),
                |state| v3::quote_swap(state, direction, args.amount),
                v3::apply_swap,
            )?;
            output::print_v3_swap(&current, &quote);
        }
        V3Command::Add {
            x,
            y,
            lower,
            upper,
            apply,
        } => {
            let params = V3AddLiquidityParams {
                amount_x: x,
                amount_y: y,
                tick_lower: lower,
                tick_upper: upper,
            };
            let quote = session.run(
                apply,
                OperationKind::Add,
                add_liquidity_label(symbol_x, symbol_y),
                |state| v3::quote_add_liquidity(state, &params),
                v3::apply_add_liquidity,
            )?;
            output::print_v3_add(&current, &quote);
        }
        V3Command::Remove { liquidity, all, apply } => {
            let delta = if all {
                current.position.liquidity
            } else {
                liquidity.unwrap_or_default()
            };
            let quote = session.run(
                apply,
                OperationKind::Remove,
                remove_liquidity_label(symbol_x, symbol_y),
                |state| v3::quote_remove_liquidity(state, delta),
                v3::apply_remove_liquidity,
            )?;
            output::print_v3_remove(&current, &quote);
        }
        V3Command::FeeTier { tier } => {
            let quote = v3::quote_fee_tier_update(&current, tier).map_err(|err| anyhow!("Fee tier rejected: {err}"))?;
            let next = v3::apply_fee_tier_update(&current, &Ok(quote));
            session.commit(&fee_tier_label(tier), next)?;
            println!("Fee tier set to {tier}");
        }
        V3Command::Tokens(args) => {
            session.commit(TOKEN_META_LABEL, v3::with_token_meta(&current, &args.x, &args.y))?;
            println!("Tokens set to {}/{}", args.x, args.y);
        }
        V3Command::Show => output::print_v3_state(&current),
        V3Command::History(history) => session.history(history)?,
    }
    Ok(())
}

fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let state = cli
        .state
        .or_else(|| env::var_os(STATE_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_FILE));

    match cli.command {
        Commands::V2(command) => run_v2(command, state, cli.out),
        Commands::V3(command) => run_v3(command, state, cli.out),
    }
}
