mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::metrics::MetricsArgs;
use commands::rate::RateArgs;
use commands::scenarios::ScenariosArgs;
use commands::schedule::ScheduleArgs;

/// Real-estate loan and investment analytics
#[derive(Parser)]
#[command(
    name = "pfa",
    version,
    about = "Real-estate loan and investment analytics",
    long_about = "A CLI for real-estate investment analysis with decimal precision. \
                  Generates mortgage amortization schedules (fixed and indexed \
                  variable rates), investment metrics (LTV, DSCR, cap rate, \
                  cash-on-cash, break-even rent), and comparative scenario runs."
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
    /// Generate a monthly amortization schedule
    Schedule(ScheduleArgs),
    /// Compute investment metrics for a financed property
    Metrics(MetricsArgs),
    /// Run comparative scenarios (optimistic/pessimistic/stress or custom)
    Scenarios(ScenariosArgs),
    /// Resolve the effective annual rate for a given month
    Rate(RateArgs),
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
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Schedule(args) => commands::schedule::run_schedule(args),
        Commands::Metrics(args) => commands::metrics::run_metrics(args),
        Commands::Scenarios(args) => commands::scenarios::run_scenarios(args),
        Commands::Rate(args) => commands::rate::run_rate(args),
        Commands::Version => {
            println!("pfa {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
