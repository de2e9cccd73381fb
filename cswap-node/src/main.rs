use std::path::PathBuf;

use clap::Parser;
use color_eyre::Result;
use cswap_node::config::{load_config, ConfigFormat};
use cswap_node::scenario::ScenarioRunner;
use tracing_subscriber::EnvFilter;

#[cfg(any(
    all(feature = "dev", feature = "test"),
    all(feature = "dev", feature = "prod"),
    all(feature = "test", feature = "prod")
))]
compile_error!("Only one of the `dev`, `test`, or `prod` features may be enabled for cswap-node.");

#[derive(Debug, Parser)]
#[command(
    name = "cswap-node",
    version,
    about = "Seeds a confidential pool and runs quote/swap rounds against it"
)]
struct Cli {
    /// Path to configuration file (TOML or YAML).
    #[arg(long, default_value = "configs/cswap-node.toml")]
    config: PathBuf,
    /// Explicit configuration format override.
    #[arg(long, value_enum, default_value_t = ConfigFormat::Auto)]
    config_format: ConfigFormat,
    /// Number of swap rounds to execute before exiting.
    #[arg(long, default_value_t = 1)]
    rounds: u32,
    /// Submit every floor one unit above the quote.
    #[arg(long)]
    strict_slippage: bool,
    /// Print round reports and the telemetry snapshot as JSON; logs on stderr
    /// switch to JSON lines as well.
    #[arg(long)]
    json: bool,
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_logging(cli.json);

    let config = load_config(&cli.config, cli.config_format)?;
    let mut runner = ScenarioRunner::new(&config)?;

    let mut reports = Vec::with_capacity(cli.rounds as usize);
    for _ in 0..cli.rounds {
        let report = runner.run_round(cli.strict_slippage)?;
        if !cli.json {
            let filled = report.trades.iter().filter(|trade| trade.filled).count();
            println!(
                "round {} filled {}/{} trades, reserves {} / {}",
                report.round + 1,
                filled,
                report.trades.len(),
                report.reserve0,
                report.reserve1
            );
        }
        reports.push(report);
    }

    let snapshot = runner.chain().telemetry().flush();
    if cli.json {
        let output = serde_json::json!({
            "rounds": reports,
            "telemetry": snapshot.to_json(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!(
            "{} swaps committed, {} calls aborted",
            snapshot.counter("pool.swap"),
            snapshot.counter("pool.abort")
        );
    }

    Ok(())
}
