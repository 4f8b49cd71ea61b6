//! Effective annual rate resolution.
//!
//! Pure lookup over caller-supplied data: no IO, no retries. Variable
//! loans take the latest revision whose effective date is on or before
//! the target month; before the first observed fixing the documented
//! fallback is the loan's index assumption plus its margin.

use chrono::NaiveDate;

use crate::error::PropertyFinanceError;
use crate::types::{Loan, LoanType, Rate, RateRevision};
use crate::PropertyFinanceResult;

/// Resolve the annual interest rate applicable to `month`.
///
/// Fixed loans return their fixed rate for every month. Variable loans
/// take the latest revision (by effective date) in effect for the month;
/// at most one revision is authoritative per period, so an unset index on
/// that revision falls through to the fallback rather than reviving an
/// earlier period's fixing.
pub fn resolve_annual_rate(
    loan: &Loan,
    revisions: &[RateRevision],
    month: NaiveDate,
) -> PropertyFinanceResult<Rate> {
    match loan.loan_type {
        LoanType::Fixed => loan.fixed_rate.ok_or_else(|| {
            PropertyFinanceError::InvalidLoanParameters {
                field: "fixed_rate".into(),
                reason: "Fixed-rate loan has no fixed rate set".into(),
            }
        }),
        LoanType::Variable => {
            let applicable = revisions.iter().rev().find(|r| r.effective_date <= month);

            match applicable.and_then(|r| r.index_rate.map(|i| (i, r.margin_rate))) {
                Some((index, margin)) => Ok(index + margin),
                None => fallback_rate(loan),
            }
        }
    }
}

/// Fallback for a variable loan with no resolvable revision: the initial
/// index assumption plus the loan's margin.
pub fn fallback_rate(loan: &Loan) -> PropertyFinanceResult<Rate> {
    match loan.index_assumption {
        Some(index) => Ok(index + loan.margin),
        None => Err(PropertyFinanceError::MissingRateData(format!(
            "Variable loan starting {} has no applicable revision and no index assumption",
            loan.start_date
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn variable_loan() -> Loan {
        Loan {
            principal: dec!(160000),
            start_date: date(2024, 1, 1),
            term_months: 300,
            loan_type: LoanType::Variable,
            fixed_rate: None,
            index_assumption: Some(dec!(0.025)),
            margin: dec!(0.010),
            review_period_months: Some(12),
        }
    }

    fn revision(y: i32, index: Option<Rate>) -> RateRevision {
        RateRevision {
            effective_date: date(y, 1, 1),
            index_rate: index,
            margin_rate: dec!(0.010),
            period_months: 12,
        }
    }

    #[test]
    fn test_fixed_loan_ignores_revisions() {
        let loan = Loan {
            loan_type: LoanType::Fixed,
            fixed_rate: Some(dec!(0.035)),
            index_assumption: None,
            ..variable_loan()
        };
        let revisions = vec![revision(2025, Some(dec!(0.04)))];
        let rate = resolve_annual_rate(&loan, &revisions, date(2026, 6, 1)).unwrap();
        assert_eq!(rate, dec!(0.035));
    }

    #[test]
    fn test_fixed_loan_without_rate_errors() {
        let loan = Loan {
            loan_type: LoanType::Fixed,
            fixed_rate: None,
            ..variable_loan()
        };
        assert!(resolve_annual_rate(&loan, &[], date(2024, 1, 1)).is_err());
    }

    #[test]
    fn test_variable_picks_latest_applicable_revision() {
        let loan = variable_loan();
        let revisions = vec![
            revision(2025, Some(dec!(0.030))),
            revision(2026, Some(dec!(0.040))),
        ];
        // Mid-2026: the 2026 revision governs
        let rate = resolve_annual_rate(&loan, &revisions, date(2026, 6, 1)).unwrap();
        assert_eq!(rate, dec!(0.050));
        // Mid-2025: only the 2025 revision applies
        let rate = resolve_annual_rate(&loan, &revisions, date(2025, 6, 1)).unwrap();
        assert_eq!(rate, dec!(0.040));
    }

    #[test]
    fn test_fallback_before_first_revision() {
        let loan = variable_loan();
        let revisions = vec![revision(2025, Some(dec!(0.030)))];
        // Before the first review: index assumption + margin
        let rate = resolve_annual_rate(&loan, &revisions, date(2024, 6, 1)).unwrap();
        assert_eq!(rate, dec!(0.035));
    }

    #[test]
    fn test_unset_index_on_latest_revision_uses_fallback() {
        let loan = variable_loan();
        let revisions = vec![revision(2025, Some(dec!(0.030))), revision(2026, None)];
        // The 2026 revision governs mid-2026 but its fixing is unobserved:
        // fall back to index assumption + margin, not the 2025 fixing
        let rate = resolve_annual_rate(&loan, &revisions, date(2026, 6, 1)).unwrap();
        assert_eq!(rate, dec!(0.035));
        // The 2025 revision still governs its own period
        let rate = resolve_annual_rate(&loan, &revisions, date(2025, 6, 1)).unwrap();
        assert_eq!(rate, dec!(0.040));
    }

    #[test]
    fn test_unset_index_with_no_history_uses_fallback() {
        let loan = variable_loan();
        let revisions = vec![revision(2024, None)];
        let rate = resolve_annual_rate(&loan, &revisions, date(2024, 6, 1)).unwrap();
        assert_eq!(rate, dec!(0.035));
    }

    #[test]
    fn test_missing_rate_data_error() {
        let loan = Loan {
            index_assumption: None,
            ..variable_loan()
        };
        let err = resolve_annual_rate(&loan, &[], date(2024, 1, 1)).unwrap_err();
        match err {
            PropertyFinanceError::MissingRateData(_) => {}
            other => panic!("Expected MissingRateData, got {other:?}"),
        }
    }
}
