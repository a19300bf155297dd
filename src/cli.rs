//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::text_report_adapter::TextReportAdapter;
use crate::domain::desk::TradingDesk;
use crate::domain::error::TradeLedgerError;
use crate::domain::scenario::{ReplayOutcome, Scenario, load_scenario, replay};
use crate::domain::summary::summarize;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "tradeledger", about = "Portfolio trade ledger")]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay a scenario and print the ledger report
    Run {
        #[arg(short, long)]
        scenario: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a scenario file without replaying it
    Validate {
        #[arg(short, long)]
        scenario: PathBuf,
    },
}

pub fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Run { scenario, output } => run_scenario(&scenario, output.as_ref()),
        Command::Validate { scenario } => run_validate(&scenario),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_scenario_file(path: &PathBuf) -> Result<Scenario, TradeLedgerError> {
    info!("loading scenario from {}", path.display());
    let adapter = FileConfigAdapter::from_file(path).map_err(|e| TradeLedgerError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })?;
    load_scenario(&adapter)
}

/// Replays `scenario` on a fresh desk that logs every price change.
pub fn execute(scenario: &Scenario) -> Result<(TradingDesk, ReplayOutcome), TradeLedgerError> {
    let mut desk = TradingDesk::new();
    desk.subscribe_to_price_changes(|symbol, price| {
        info!("price updated: {symbol} = {price}");
        Ok(())
    });
    let outcome = replay(scenario, &mut desk)?;
    Ok((desk, outcome))
}

fn run_scenario(path: &PathBuf, output: Option<&PathBuf>) -> Result<(), TradeLedgerError> {
    let scenario = load_scenario_file(path)?;
    let (desk, outcome) = execute(&scenario)?;

    for rejected in &outcome.rejected {
        eprintln!(
            "rejected trade #{} ({} {} {} @ {}): {}",
            rejected.index + 1,
            rejected.request.side,
            rejected.request.quantity,
            rejected.request.symbol,
            rejected.request.price,
            rejected.error
        );
    }
    info!(
        accepted = outcome.accepted,
        rejected = outcome.rejected.len(),
        "scenario replayed"
    );

    let report = TextReportAdapter::with_title(scenario.name.as_str());
    let summary = summarize(&desk);
    match output {
        Some(path) => {
            report.write(&summary, &path.display().to_string())?;
            eprintln!("Report written to {}", path.display());
        }
        None => print!("{}", report.render(&summary)),
    }
    Ok(())
}

fn run_validate(path: &PathBuf) -> Result<(), TradeLedgerError> {
    let scenario = load_scenario_file(path)?;
    println!(
        "OK: {} ({} stocks, {} investors, {} trades, {} price updates)",
        scenario.name,
        scenario.symbols.len(),
        scenario.investors.len(),
        scenario.trades.len(),
        scenario.price_updates.len()
    );
    Ok(())
}
