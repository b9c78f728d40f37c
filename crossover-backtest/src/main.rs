use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use crossover_backtest::{
    generate_synthetic_series, load_file, BacktestEngine, BacktestParameters, BacktestResult,
    MaKind, ParameterSweep, PriceSeries, SweepEntry, SyntheticDataConfig,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MaArg {
    Sma,
    Ema,
}

impl From<MaArg> for MaKind {
    fn from(arg: MaArg) -> Self {
        match arg {
            MaArg::Sma => MaKind::Sma,
            MaArg::Ema => MaKind::Ema,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Parser, Debug)]
#[command(name = "crossover-backtest")]
#[command(version)]
#[command(about = "Moving average crossover strategy backtester", long_about = None)]
struct Args {
    /// JSON config file with `backtest` and `data` sections
    #[arg(long)]
    config: Option<PathBuf>,

    /// Data file path (CSV/JSON). If not provided, uses synthetic data.
    #[arg(short = 'f', long)]
    data_file: Option<PathBuf>,

    /// Short moving average period
    #[arg(long)]
    short: Option<usize>,

    /// Long moving average period
    #[arg(long)]
    long: Option<usize>,

    /// Moving average type
    #[arg(long, value_enum)]
    ma_type: Option<MaArg>,

    /// Initial capital
    #[arg(short, long)]
    capital: Option<f64>,

    /// Stop loss percentage below entry (5 = 5%)
    #[arg(long)]
    stop_loss: Option<f64>,

    /// Number of days of synthetic data
    #[arg(short, long)]
    days: Option<usize>,

    /// Initial price for synthetic data
    #[arg(long)]
    start_price: Option<f64>,

    /// Daily volatility for synthetic data (0.015 = 1.5%)
    #[arg(long)]
    volatility: Option<f64>,

    /// Daily drift for synthetic data
    #[arg(long, allow_hyphen_values = true)]
    drift: Option<f64>,

    /// RNG seed for reproducible synthetic data
    #[arg(long)]
    seed: Option<u64>,

    /// Run a grid search over short/long periods instead of a single backtest
    #[arg(long)]
    sweep: bool,

    /// Short periods to sweep
    #[arg(long, value_delimiter = ',', default_value = "5,10,15,20")]
    sweep_short: Vec<usize>,

    /// Long periods to sweep
    #[arg(long, value_delimiter = ',', default_value = "20,30,50,100")]
    sweep_long: Vec<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    output: OutputFormat,

    /// Pretty print JSON output
    #[arg(long)]
    pretty: bool,

    /// Log level when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    backtest: BacktestParameters,
    data: SyntheticDataConfig,
}

impl FileConfig {
    fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("crossover_backtest={}", args.log_level))),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &args.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let (params, data_config) = apply_overrides(&args, config);

    // Load or generate data
    let series = if let Some(path) = &args.data_file {
        tracing::info!(path = %path.display(), "loading prices");
        load_file(path).with_context(|| format!("loading {}", path.display()))?
    } else {
        tracing::info!(
            days = data_config.days,
            start_price = data_config.start_price,
            seed = ?data_config.seed,
            "generating synthetic prices"
        );
        generate_synthetic_series(&data_config)?
    };

    if args.sweep {
        let entries =
            ParameterSweep::new(params).run(&series.closes, &args.sweep_short, &args.sweep_long);
        match args.output {
            OutputFormat::Json => print_json(&entries, args.pretty)?,
            OutputFormat::Text => print_sweep_report(&entries),
        }
        return Ok(());
    }

    let result = BacktestEngine::new(params).run(&series.closes)?;

    match args.output {
        OutputFormat::Json => print_json(&result, args.pretty)?,
        OutputFormat::Text => print_text_report(&result, &series),
    }

    Ok(())
}

fn apply_overrides(args: &Args, config: FileConfig) -> (BacktestParameters, SyntheticDataConfig) {
    let FileConfig {
        backtest: mut params,
        mut data,
    } = config;

    if let Some(short) = args.short {
        params.short_period = short;
    }
    if let Some(long) = args.long {
        params.long_period = long;
    }
    if let Some(ma) = args.ma_type {
        params.ma_kind = ma.into();
    }
    if let Some(capital) = args.capital {
        params.initial_capital = capital;
    }
    if let Some(stop_loss) = args.stop_loss {
        params.stop_loss_pct = stop_loss;
    }

    if let Some(days) = args.days {
        data.days = days;
    }
    if let Some(start_price) = args.start_price {
        data.start_price = start_price;
    }
    if let Some(volatility) = args.volatility {
        data.volatility = volatility;
    }
    if let Some(drift) = args.drift {
        data.upward_drift = drift;
    }
    if args.seed.is_some() {
        data.seed = args.seed;
    }

    (params, data)
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", json);
    Ok(())
}

fn format_profit_factor(profit_factor: f64) -> String {
    if profit_factor.is_infinite() {
        "∞".to_string()
    } else {
        format!("{:.3}", profit_factor)
    }
}

fn day_label(series: &PriceSeries, day: usize) -> String {
    series
        .date(day)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| format!("day {}", day))
}

fn print_text_report(result: &BacktestResult, series: &PriceSeries) {
    let params = &result.parameters;
    let metrics = &result.metrics;

    println!();
    println!("================================================================");
    println!(
        "  BACKTEST REPORT - {}({}) / {}({}) Crossover",
        params.ma_kind, params.short_period, params.ma_kind, params.long_period
    );
    println!("================================================================");
    println!();
    if let (Some(first), Some(last)) = (series.dates.first(), series.dates.last()) {
        println!("  Period: {} to {}", first, last);
    }
    println!("  Duration: {} trading days", result.history.len());
    println!("  Stop Loss: {:.2}%", params.stop_loss_pct);
    println!();
    println!("----------------------------------------------------------------");
    println!("  CAPITAL");
    println!("----------------------------------------------------------------");
    println!("  Initial Capital:  ${:>12.2}", result.initial_capital);
    println!("  Final Value:      ${:>12.2}", result.final_value);
    println!(
        "  Total Return:     ${:>12.2} ({:+.2}%)",
        metrics.total_return, metrics.total_return_pct
    );
    println!("  Annualized:       {:>12.2}%", metrics.annualized_return_pct);
    println!("  Max Drawdown:     {:>12.2}%", metrics.max_drawdown_pct);
    println!();
    println!("----------------------------------------------------------------");
    println!("  TRADE STATISTICS");
    println!("----------------------------------------------------------------");
    println!("  Total Trades:     {:>12}", metrics.total_trades);
    println!("  Winning Trades:   {:>12}", metrics.winning_trades);
    println!("  Losing Trades:    {:>12}", metrics.losing_trades);
    println!("  Win Rate:         {:>12.1}%", metrics.win_rate_pct);
    println!("  Avg Win:          ${:>12.2}", metrics.avg_win);
    println!("  Avg Loss:         ${:>12.2}", metrics.avg_loss);
    println!(
        "  Profit Factor:    {:>12}",
        format_profit_factor(metrics.profit_factor)
    );
    println!();
    println!("================================================================");

    if !result.trades.is_empty() {
        println!();
        println!("  TRADES");
        println!("----------------------------------------------------------------");
        for trade in &result.trades {
            println!(
                "  {} -> {} | {} sh @ ${:.2} -> ${:.2} | P&L: ${:+.2} ({:+.1}%) | {} days | {}",
                day_label(series, trade.entry_day),
                day_label(series, trade.exit_day),
                trade.shares,
                trade.entry_price,
                trade.exit_price,
                trade.profit_loss,
                trade.profit_loss_pct,
                trade.duration_days,
                trade.exit_reason
            );
        }
        println!();
    }

    if result.history.last().is_some_and(|s| s.in_position) {
        println!("  Position still open at end of data (marked to market)");
        println!();
    }
}

fn print_sweep_report(entries: &[SweepEntry]) {
    println!();
    println!("================================================================");
    println!("  PARAMETER SWEEP ({} combinations)", entries.len());
    println!("================================================================");
    println!(
        "  {:>5} {:>5} {:>10} {:>10} {:>7} {:>9} {:>8}",
        "short", "long", "return%", "annual%", "trades", "win%", "maxDD%"
    );
    for entry in entries {
        let m = &entry.result.metrics;
        println!(
            "  {:>5} {:>5} {:>10.2} {:>10.2} {:>7} {:>9.1} {:>8.2}",
            entry.short_period,
            entry.long_period,
            m.total_return_pct,
            m.annualized_return_pct,
            m.total_trades,
            m.win_rate_pct,
            m.max_drawdown_pct
        );
    }
    println!();
}
