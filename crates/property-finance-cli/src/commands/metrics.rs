use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use property_finance_core::amortization::{self, AmortizationInput};
use property_finance_core::metrics::{self, MetricsInput};
use property_finance_core::types::{Loan, LoanType, Prepayment, PropertyFinancials, RateRevision};

use crate::input;

/// A complete investment case: the loan plus the property parameters.
#[derive(Debug, Serialize, Deserialize)]
pub struct InvestmentCase {
    pub loan: Loan,
    #[serde(default)]
    pub revisions: Vec<RateRevision>,
    #[serde(default)]
    pub prepayments: Vec<Prepayment>,
    pub financials: PropertyFinancials,
}

/// Arguments for investment metrics calculation
#[derive(Args)]
pub struct MetricsArgs {
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

    /// Purchase price
    #[arg(long)]
    pub purchase_price: Option<Decimal>,

    /// Notary, registry, transfer tax, agency fees
    #[arg(long, default_value = "0")]
    pub acquisition_costs: Decimal,

    /// Renovation budget
    #[arg(long, default_value = "0")]
    pub renovation_costs: Decimal,

    /// Down payment (equity invested)
    #[arg(long)]
    pub down_payment: Option<Decimal>,

    /// Expected monthly rent
    #[arg(long)]
    pub monthly_rent: Option<Decimal>,

    /// Monthly community fees
    #[arg(long, default_value = "0")]
    pub community_fees: Decimal,

    /// Annual property tax
    #[arg(long, default_value = "0")]
    pub property_tax: Decimal,

    /// Annual insurance premium
    #[arg(long, default_value = "0")]
    pub insurance: Decimal,

    /// Maintenance allowance as a fraction of rent
    #[arg(long, default_value = "0")]
    pub maintenance_rate: Decimal,

    /// Management fee as a fraction of rent
    #[arg(long, default_value = "0")]
    pub management_rate: Decimal,
}

pub fn run_metrics(args: MetricsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let case: InvestmentCase = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        InvestmentCase {
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
            financials: PropertyFinancials {
                purchase_price: args
                    .purchase_price
                    .ok_or("--purchase-price is required (or provide --input)")?,
                acquisition_costs: args.acquisition_costs,
                renovation_costs: args.renovation_costs,
                down_payment: args
                    .down_payment
                    .ok_or("--down-payment is required (or provide --input)")?,
                monthly_rent: args
                    .monthly_rent
                    .ok_or("--monthly-rent is required (or provide --input)")?,
                monthly_community_fees: args.community_fees,
                annual_property_tax: args.property_tax,
                annual_insurance: args.insurance,
                maintenance_rate: args.maintenance_rate,
                management_rate: args.management_rate,
            },
        }
    };

    let amort_input = AmortizationInput {
        loan: case.loan.clone(),
        revisions: case.revisions,
        prepayments: case.prepayments,
    };
    let schedule = amortization::build_schedule(&amort_input)?;

    // The first scheduled month carries the current payment and balance
    let current = schedule
        .result
        .entries
        .first()
        .cloned()
        .ok_or("Schedule generation produced no entries")?;

    let metrics_input = MetricsInput {
        financials: case.financials,
        loan_amount: case.loan.principal,
        current,
        totals: schedule.result.totals.clone(),
    };

    let mut computed = metrics::compute_metrics(&metrics_input)?;
    computed.result = computed.result.rounded();

    Ok(serde_json::to_value(computed)?)
}
