use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.035 = 3.5%). Never as percentages.
pub type Rate = Decimal;

/// Fixed-rate vs indexed variable-rate loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanType {
    Fixed,
    Variable,
}

/// A mortgage loan as supplied by the caller.
///
/// For fixed loans `fixed_rate` is required. For variable loans the
/// effective rate comes from rate revisions; `index_assumption + margin`
/// is the documented fallback before the first observed revision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loan {
    /// Initial loan amount
    pub principal: Money,
    /// First month of the schedule
    pub start_date: NaiveDate,
    /// Term in months
    pub term_months: u32,
    pub loan_type: LoanType,
    /// Annual rate for fixed loans
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_rate: Option<Rate>,
    /// Assumed index rate before the first revision is observed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_assumption: Option<Rate>,
    /// Margin over the index (variable loans)
    pub margin: Rate,
    /// Months between rate reviews (variable loans)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_period_months: Option<u32>,
}

/// A periodic rate review for a variable loan. Ordered by effective date;
/// at most one revision is authoritative per period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateRevision {
    pub effective_date: NaiveDate,
    /// None until the index fixing is observed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_rate: Option<Rate>,
    pub margin_rate: Rate,
    /// Length of the period this revision governs, in months
    pub period_months: u32,
}

/// A voluntary extra repayment, applied against the balance before
/// interest accrues in its month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prepayment {
    pub date: NaiveDate,
    pub amount: Money,
}

/// One month of the amortization schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub month: NaiveDate,
    pub payment: Money,
    pub interest: Money,
    pub principal: Money,
    pub balance: Money,
    /// Annual rate in effect for this month
    pub annual_rate: Rate,
}

impl ScheduleEntry {
    /// Presentation view with monetary fields rounded to 2 decimal places.
    /// The engine itself keeps full precision to avoid drift.
    pub fn rounded(&self) -> ScheduleEntry {
        ScheduleEntry {
            month: self.month,
            payment: self.payment.round_dp(2),
            interest: self.interest.round_dp(2),
            principal: self.principal.round_dp(2),
            balance: self.balance.round_dp(2),
            annual_rate: self.annual_rate,
        }
    }
}

/// Property acquisition and operating parameters. Inputs to the metrics
/// aggregator only; never mutated by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyFinancials {
    pub purchase_price: Money,
    /// Notary, registry, transfer tax, agency fees
    pub acquisition_costs: Money,
    pub renovation_costs: Money,
    pub down_payment: Money,
    pub monthly_rent: Money,
    pub monthly_community_fees: Money,
    pub annual_property_tax: Money,
    pub annual_insurance: Money,
    /// Maintenance allowance as a fraction of rent
    pub maintenance_rate: Rate,
    /// Management fee as a fraction of rent
    pub management_rate: Rate,
}

impl PropertyFinancials {
    /// Purchase price plus acquisition and renovation costs.
    pub fn total_investment(&self) -> Money {
        self.purchase_price + self.acquisition_costs + self.renovation_costs
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
