use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use property_finance_core::amortization::{self, AmortizationInput};
use property_finance_core::types::{Loan, LoanType};

use crate::input;

/// Arguments for amortization schedule generation
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Fixed annual rate as a decimal (0.035 = 3.5%)
    #[arg(long)]
    pub annual_rate: Option<Decimal>,

    /// Term in months
    #[arg(long)]
    pub term_months: Option<u32>,

    /// First month of the schedule (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Limit output to the first N months
    #[arg(long)]
    pub head: Option<usize>,
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let amort_input: AmortizationInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        // Flags cover the fixed-rate case; variable loans come via JSON
        AmortizationInput {
            loan: Loan {
                principal: args
                    .principal
                    .ok_or("--principal is required (or provide --input)")?,
                start_date: args
                    .start_date
                    .ok_or("--start-date is required (or provide --input)")?,
                term_months: args
                    .term_months
                    .ok_or("--term-months is required (or provide --input)")?,
                loan_type: LoanType::Fixed,
                fixed_rate: Some(
                    args.annual_rate
                        .ok_or("--annual-rate is required (or provide --input)")?,
                ),
                index_assumption: None,
                margin: Decimal::ZERO,
                review_period_months: None,
            },
            revisions: vec![],
            prepayments: vec![],
        }
    };

    let mut computed = amortization::build_schedule(&amort_input)?;

    // Rounding to 2 dp happens only at this presentation boundary
    computed.result = computed.result.rounded();
    if let Some(n) = args.head {
        computed.result.entries.truncate(n);
    }

    Ok(serde_json::to_value(computed)?)
}
