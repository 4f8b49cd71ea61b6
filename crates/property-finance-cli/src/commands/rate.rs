use chrono::NaiveDate;
use clap::Args;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use property_finance_core::rates;
use property_finance_core::types::{Loan, RateRevision};

use crate::input;

/// Arguments for effective rate resolution
#[derive(Args)]
pub struct RateArgs {
    /// Path to JSON input file with the loan and its rate revisions
    #[arg(long)]
    pub input: Option<String>,

    /// Target month (YYYY-MM-DD)
    #[arg(long)]
    pub month: NaiveDate,
}

#[derive(Debug, Serialize, Deserialize)]
struct RateLookupInput {
    loan: Loan,
    #[serde(default)]
    revisions: Vec<RateRevision>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RateLookupOutput {
    month: NaiveDate,
    annual_rate: rust_decimal::Decimal,
}

pub fn run_rate(args: RateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let lookup: RateLookupInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input is required (or pipe JSON via stdin)".into());
    };

    let annual_rate = rates::resolve_annual_rate(&lookup.loan, &lookup.revisions, args.month)?;

    Ok(serde_json::to_value(RateLookupOutput {
        month: args.month,
        annual_rate,
    })?)
}
