mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::execution::{RealizedCostArgs, RiskCostArgs, TrajectoryArgs};
use commands::market_data::AggregateArgs;

/// VWAP execution analytics with decimal precision
#[derive(Parser)]
#[command(
    name = "vwx",
    version,
    about = "VWAP optimal execution: trajectories, realized cost, risk-adjusted cost",
    long_about = "A CLI for Almgren-Chriss style VWAP execution under a stochastic volume \
                  forecast. Solves the optimal liquidation trajectory, scores an executed \
                  trajectory against realized prices and volumes, estimates the \
                  risk-adjusted cost per share, and buckets tick trades into interval tables."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve the optimal remaining-position trajectory
    Trajectory(TrajectoryArgs),
    /// Trading cost and VWAP spread of an executed trajectory
    RealizedCost(RealizedCostArgs),
    /// Risk-adjusted cost per share from forecast volume moments
    RiskCost(RiskCostArgs),
    /// Bucket a tick-trade archive into interval price/volume tables
    Aggregate(AggregateArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Trajectory(args) => commands::execution::run_trajectory(args),
        Commands::RealizedCost(args) => commands::execution::run_realized_cost(args),
        Commands::RiskCost(args) => commands::execution::run_risk_cost(args),
        Commands::Aggregate(args) => commands::market_data::run_aggregate(args),
        Commands::Version => {
            println!("vwx {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            log::debug!("command failed: {:?}", e);
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
