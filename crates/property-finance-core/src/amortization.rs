use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::PropertyFinanceError;
use crate::rates;
use crate::types::{with_metadata, ComputationOutput, Loan, Money, Prepayment, Rate, RateRevision, ScheduleEntry};
use crate::PropertyFinanceResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Input for schedule generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationInput {
    pub loan: Loan,
    /// Rate revisions for variable loans, ordered by effective date
    #[serde(default)]
    pub revisions: Vec<RateRevision>,
    /// Voluntary extra repayments
    #[serde(default)]
    pub prepayments: Vec<Prepayment>,
}

/// Aggregate totals over the whole schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleTotals {
    /// Scheduled payments plus prepayments
    pub total_paid: Money,
    pub total_interest: Money,
    /// Amortized principal plus prepayments
    pub total_principal: Money,
    /// Number of scheduled months (may be shorter than the term)
    pub months: u32,
}

/// Complete amortization schedule output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationOutput {
    pub entries: Vec<ScheduleEntry>,
    pub totals: ScheduleTotals,
}

impl ScheduleTotals {
    /// Presentation view with monetary fields rounded to 2 decimal places.
    pub fn rounded(&self) -> ScheduleTotals {
        ScheduleTotals {
            total_paid: self.total_paid.round_dp(2),
            total_interest: self.total_interest.round_dp(2),
            total_principal: self.total_principal.round_dp(2),
            months: self.months,
        }
    }
}

impl AmortizationOutput {
    /// Last scheduled month, if any.
    pub fn last_entry(&self) -> Option<&ScheduleEntry> {
        self.entries.last()
    }

    /// Presentation view with every monetary field rounded to 2 decimal
    /// places. The engine keeps full precision; only output layers use this.
    pub fn rounded(&self) -> AmortizationOutput {
        AmortizationOutput {
            entries: self.entries.iter().map(ScheduleEntry::rounded).collect(),
            totals: self.totals.rounded(),
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Generate the monthly amortization schedule for a loan.
///
/// Standard declining-balance amortization: each month resolves the annual
/// rate, accrues interest on the outstanding balance, and amortizes the
/// remainder of an annuity payment. The payment is recalculated over the
/// remaining term whenever the resolved rate changes. The schedule ends when
/// the term is exhausted or the balance reaches zero, whichever comes first.
///
/// Invalid inputs fail fast; no partial schedule is ever returned.
pub fn build_schedule(
    input: &AmortizationInput,
) -> PropertyFinanceResult<ComputationOutput<AmortizationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input)?;

    let loan = &input.loan;
    let mut entries: Vec<ScheduleEntry> = Vec::with_capacity(loan.term_months as usize);
    let mut balance = loan.principal;
    let mut total_interest = Decimal::ZERO;
    let mut total_principal = Decimal::ZERO;
    let mut total_paid = Decimal::ZERO;

    let mut current_rate: Option<Rate> = None;
    let mut payment = Decimal::ZERO;

    for m in 0..loan.term_months {
        if balance <= Decimal::ZERO {
            break;
        }

        let month = add_months(loan.start_date, m)?;

        // Prepayments land before interest accrues for the month
        let prepaid = prepayments_for(&input.prepayments, month);
        if prepaid > Decimal::ZERO {
            let applied = prepaid.min(balance);
            if applied < prepaid {
                warnings.push(format!(
                    "Prepayment in {} exceeds outstanding balance; clamped to {applied}",
                    month.format("%Y-%m")
                ));
            }
            balance -= applied;
            total_principal += applied;
            total_paid += applied;

            if balance.is_zero() {
                warnings.push(format!(
                    "Balance cleared by prepayment in {}; schedule ends {} months early",
                    month.format("%Y-%m"),
                    loan.term_months - m
                ));
                break;
            }
        }

        let annual_rate = rates::resolve_annual_rate(loan, &input.revisions, month)?;
        if annual_rate < Decimal::ZERO {
            return Err(PropertyFinanceError::InvalidLoanParameters {
                field: "annual_rate".into(),
                reason: format!(
                    "Resolved rate {annual_rate} for {} is negative",
                    month.format("%Y-%m")
                ),
            });
        }
        let monthly_rate = annual_rate / dec!(12);

        // Recalculate the payment over the remaining term on any rate change
        // (standard behavior for variable-rate loans). Prepayments keep the
        // payment and shorten the schedule instead.
        if current_rate != Some(annual_rate) {
            payment = monthly_payment(balance, monthly_rate, loan.term_months - m)?;
            current_rate = Some(annual_rate);
        }

        let interest = balance * monthly_rate;
        let mut principal = payment - interest;
        let mut month_payment = payment;

        // Final month: never amortize past zero
        if principal >= balance {
            principal = balance;
            month_payment = interest + principal;
        }

        balance -= principal;
        total_interest += interest;
        total_principal += principal;
        total_paid += month_payment;

        entries.push(ScheduleEntry {
            month,
            payment: month_payment,
            interest,
            principal,
            balance,
            annual_rate,
        });
    }

    // A prepayment clearing the balance in the first month leaves no
    // scheduled entries; the totals still carry the applied amount.
    let totals = ScheduleTotals {
        total_paid,
        total_interest,
        total_principal,
        months: entries.len() as u32,
    };

    let output = AmortizationOutput { entries, totals };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Declining-Balance Amortization (annuity payment, monthly accrual)",
        input,
        warnings,
        elapsed,
        output,
    ))
}

/// Standard annuity payment: P * r(1+r)^n / ((1+r)^n - 1).
///
/// A zero monthly rate divides the principal straight-line instead, which
/// also avoids the zero denominator.
pub fn monthly_payment(
    principal: Money,
    monthly_rate: Rate,
    remaining_months: u32,
) -> PropertyFinanceResult<Money> {
    if remaining_months == 0 {
        return Err(PropertyFinanceError::DivisionByZero {
            context: "monthly payment with zero remaining months".into(),
        });
    }

    if monthly_rate.is_zero() {
        return Ok(principal / Decimal::from(remaining_months));
    }

    let factor = (Decimal::ONE + monthly_rate).powd(Decimal::from(remaining_months));
    let denominator = factor - Decimal::ONE;

    if denominator.is_zero() {
        return Err(PropertyFinanceError::DivisionByZero {
            context: "annuity payment denominator".into(),
        });
    }

    Ok(principal * monthly_rate * factor / denominator)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_input(input: &AmortizationInput) -> PropertyFinanceResult<()> {
    let loan = &input.loan;

    if loan.principal <= Decimal::ZERO {
        return Err(PropertyFinanceError::InvalidLoanParameters {
            field: "principal".into(),
            reason: "Principal must be positive".into(),
        });
    }

    if loan.term_months == 0 {
        return Err(PropertyFinanceError::InvalidLoanParameters {
            field: "term_months".into(),
            reason: "Term must be at least one month".into(),
        });
    }

    if let Some(rate) = loan.fixed_rate {
        if rate < Decimal::ZERO {
            return Err(PropertyFinanceError::InvalidLoanParameters {
                field: "fixed_rate".into(),
                reason: "Fixed rate must be non-negative".into(),
            });
        }
    }

    for p in &input.prepayments {
        if p.amount <= Decimal::ZERO {
            return Err(PropertyFinanceError::InvalidLoanParameters {
                field: "prepayments".into(),
                reason: format!("Prepayment on {} must be positive", p.date),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn add_months(start: NaiveDate, months: u32) -> PropertyFinanceResult<NaiveDate> {
    start
        .checked_add_months(Months::new(months))
        .ok_or_else(|| {
            PropertyFinanceError::DateError(format!("Cannot add {months} months to {start}"))
        })
}

/// Total prepayments falling in the same calendar month as `month`.
fn prepayments_for(prepayments: &[Prepayment], month: NaiveDate) -> Money {
    prepayments
        .iter()
        .filter(|p| p.date.year() == month.year() && p.date.month() == month.month())
        .map(|p| p.amount)
        .sum()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
