use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::ScheduleTotals;
use crate::error::PropertyFinanceError;
use crate::thresholds::{self, ReturnStrength, RiskTier, DSCR_VACANCY_FACTOR};
use crate::types::{with_metadata, ComputationOutput, Money, PropertyFinancials, Rate, ScheduleEntry};
use crate::PropertyFinanceResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Input for the metrics aggregator: property parameters plus the state of
/// the amortization schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsInput {
    pub financials: PropertyFinancials,
    /// Original loan amount (for LTV)
    pub loan_amount: Money,
    /// Latest schedule entry (current payment and balance)
    pub current: ScheduleEntry,
    /// Aggregate totals over the schedule so far
    pub totals: ScheduleTotals,
}

/// Derived, stateless snapshot of investment metrics. Recomputed on demand;
/// never persisted independently of its inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub total_paid: Money,
    pub total_interest: Money,
    pub total_principal: Money,
    pub monthly_payment: Money,
    pub outstanding_balance: Money,
    /// Loan amount / total investment
    pub ltv: Rate,
    /// Annual rent / purchase price
    pub gross_yield: Rate,
    /// (Annual rent - annual operating expenses) / total investment
    pub net_annual_return: Rate,
    /// Annual net cashflow / down payment
    pub cash_on_cash: Rate,
    /// Vacancy-adjusted rent / monthly mortgage payment
    pub dscr: Decimal,
    /// Annual NOI / purchase price
    pub cap_rate: Rate,
    /// Minimum rent covering the mortgage and all fixed monthly costs
    pub break_even_rent: Money,
    pub monthly_net_cashflow: Money,
    /// None when annual net cashflow is non-positive (undefined, not zero)
    pub payback_years: Option<Decimal>,
    pub risk: RiskTier,
    /// Banding of net_annual_return over the 4/6/8% table
    pub return_strength: ReturnStrength,
    pub favorable: bool,
}

impl MetricsSummary {
    /// Presentation view with monetary fields rounded to 2 decimal places
    /// and ratios to 4.
    pub fn rounded(&self) -> MetricsSummary {
        MetricsSummary {
            total_paid: self.total_paid.round_dp(2),
            total_interest: self.total_interest.round_dp(2),
            total_principal: self.total_principal.round_dp(2),
            monthly_payment: self.monthly_payment.round_dp(2),
            outstanding_balance: self.outstanding_balance.round_dp(2),
            ltv: self.ltv.round_dp(4),
            gross_yield: self.gross_yield.round_dp(4),
            net_annual_return: self.net_annual_return.round_dp(4),
            cash_on_cash: self.cash_on_cash.round_dp(4),
            dscr: self.dscr.round_dp(4),
            cap_rate: self.cap_rate.round_dp(4),
            break_even_rent: self.break_even_rent.round_dp(2),
            monthly_net_cashflow: self.monthly_net_cashflow.round_dp(2),
            payback_years: self.payback_years.map(|p| p.round_dp(2)),
            risk: self.risk,
            return_strength: self.return_strength,
            favorable: self.favorable,
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute the investment metrics snapshot for a financed property.
///
/// Pure function over its inputs. All ratio denominators are guarded: a
/// non-positive annual net cashflow reports `payback_years = None` instead
/// of failing, matching the sentinel policy for undefined ratios.
pub fn compute_metrics(
    input: &MetricsInput,
) -> PropertyFinanceResult<ComputationOutput<MetricsSummary>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input)?;

    let fin = &input.financials;
    let total_investment = fin.total_investment();
    let annual_rent = fin.monthly_rent * dec!(12);

    // Operating expenses, excluding debt service
    let monthly_operating = monthly_operating_expenses(fin);
    let annual_operating = monthly_operating * dec!(12);

    let monthly_payment = input.current.payment;
    let monthly_net_cashflow = fin.monthly_rent - monthly_operating - monthly_payment;
    let annual_net_cashflow = monthly_net_cashflow * dec!(12);

    let ltv = input.loan_amount / total_investment;

    let gross_yield = if fin.purchase_price.is_zero() {
        Decimal::ZERO
    } else {
        annual_rent / fin.purchase_price
    };

    let net_annual_return = (annual_rent - annual_operating) / total_investment;

    let noi = annual_rent - annual_operating;
    let cap_rate = if fin.purchase_price.is_zero() {
        Decimal::ZERO
    } else {
        noi / fin.purchase_price
    };

    let cash_on_cash = if fin.down_payment.is_zero() {
        warnings.push("Down payment is zero — cash-on-cash reported as zero".into());
        Decimal::ZERO
    } else {
        annual_net_cashflow / fin.down_payment
    };

    let dscr = if monthly_payment.is_zero() {
        Decimal::ZERO
    } else {
        fin.monthly_rent * DSCR_VACANCY_FACTOR / monthly_payment
    };

    // Fixed monthly costs only; rent-proportional costs excluded
    let break_even_rent = monthly_payment + fixed_monthly_costs(fin);

    let payback_years = if annual_net_cashflow <= Decimal::ZERO || fin.down_payment.is_zero() {
        if annual_net_cashflow <= Decimal::ZERO {
            warnings.push("Annual net cashflow is non-positive — payback period undefined".into());
        }
        None
    } else {
        Some(fin.down_payment / annual_net_cashflow)
    };

    let risk = thresholds::classify_risk(ltv, net_annual_return, monthly_net_cashflow);
    let return_strength = thresholds::classify_return(net_annual_return);
    let favorable = thresholds::is_favorable(risk, monthly_net_cashflow);

    if dscr > Decimal::ZERO && dscr < Decimal::ONE {
        warnings.push(format!(
            "DSCR of {:.2} is below 1.00 — vacancy-adjusted rent does not cover debt service",
            dscr
        ));
    }

    let summary = MetricsSummary {
        total_paid: input.totals.total_paid,
        total_interest: input.totals.total_interest,
        total_principal: input.totals.total_principal,
        monthly_payment,
        outstanding_balance: input.current.balance,
        ltv,
        gross_yield,
        net_annual_return,
        cash_on_cash,
        dscr,
        cap_rate,
        break_even_rent,
        monthly_net_cashflow,
        payback_years,
        risk,
        return_strength,
        favorable,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Leveraged Residential Investment Metrics",
        input,
        warnings,
        elapsed,
        summary,
    ))
}

/// All recurring monthly costs excluding debt service.
fn monthly_operating_expenses(fin: &PropertyFinancials) -> Money {
    fixed_monthly_costs(fin)
        + fin.monthly_rent * fin.maintenance_rate
        + fin.monthly_rent * fin.management_rate
}

/// Costs that do not scale with rent: community fees, tax, insurance.
fn fixed_monthly_costs(fin: &PropertyFinancials) -> Money {
    fin.monthly_community_fees + fin.annual_property_tax / dec!(12) + fin.annual_insurance / dec!(12)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_input(input: &MetricsInput) -> PropertyFinanceResult<()> {
    let fin = &input.financials;

    if fin.purchase_price <= Decimal::ZERO {
        return Err(PropertyFinanceError::InvalidLoanParameters {
            field: "purchase_price".into(),
            reason: "Purchase price must be positive".into(),
        });
    }

    if fin.monthly_rent < Decimal::ZERO {
        return Err(PropertyFinanceError::InvalidLoanParameters {
            field: "monthly_rent".into(),
            reason: "Monthly rent must be non-negative".into(),
        });
    }

    if fin.acquisition_costs < Decimal::ZERO {
        return Err(PropertyFinanceError::InvalidLoanParameters {
            field: "acquisition_costs".into(),
            reason: "Acquisition costs must be non-negative".into(),
        });
    }

    if fin.renovation_costs < Decimal::ZERO {
        return Err(PropertyFinanceError::InvalidLoanParameters {
            field: "renovation_costs".into(),
            reason: "Renovation costs must be non-negative".into(),
        });
    }

    if fin.down_payment < Decimal::ZERO {
        return Err(PropertyFinanceError::InvalidLoanParameters {
            field: "down_payment".into(),
            reason: "Down payment must be non-negative".into(),
        });
    }

    if input.loan_amount < Decimal::ZERO {
        return Err(PropertyFinanceError::InvalidLoanParameters {
            field: "loan_amount".into(),
            reason: "Loan amount must be non-negative".into(),
        });
    }

    if fin.maintenance_rate < Decimal::ZERO || fin.maintenance_rate >= Decimal::ONE {
        return Err(PropertyFinanceError::InvalidLoanParameters {
            field: "maintenance_rate".into(),
            reason: "Maintenance rate must be between 0 and 1".into(),
        });
    }

    if fin.management_rate < Decimal::ZERO || fin.management_rate >= Decimal::ONE {
        return Err(PropertyFinanceError::InvalidLoanParameters {
            field: "management_rate".into(),
            reason: "Management rate must be between 0 and 1".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn sample_input() -> MetricsInput {
        MetricsInput {
            financials: PropertyFinancials {
                purchase_price: dec!(200000),
                acquisition_costs: dec!(20000),
                renovation_costs: dec!(10000),
                down_payment: dec!(70000),
                monthly_rent: dec!(1500),
                monthly_community_fees: dec!(60),
                annual_property_tax: dec!(600),
                annual_insurance: dec!(300),
                maintenance_rate: dec!(0.05),
                management_rate: dec!(0.00),
            },
            loan_amount: dec!(160000),
            current: ScheduleEntry {
                month: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                payment: dec!(800),
                interest: dec!(466.67),
                principal: dec!(333.33),
                balance: dec!(159666.67),
                annual_rate: dec!(0.035),
            },
            totals: ScheduleTotals {
                total_paid: dec!(800),
                total_interest: dec!(466.67),
                total_principal: dec!(333.33),
                months: 1,
            },
        }
    }

    #[test]
    fn test_ltv() {
        let result = compute_metrics(&sample_input()).unwrap();
        // 160000 / 230000
        assert_eq!(result.result.ltv, dec!(160000) / dec!(230000));
    }

    #[test]
    fn test_gross_yield() {
        let result = compute_metrics(&sample_input()).unwrap();
        // 18000 / 200000 = 0.09
        assert_eq!(result.result.gross_yield, dec!(0.09));
    }

    #[test]
    fn test_net_annual_return_and_cap_rate() {
        let result = compute_metrics(&sample_input()).unwrap();
        let out = &result.result;

        // Monthly operating: 60 + 50 + 25 + 75 (5% maintenance) = 210
        // Annual NOI = 18000 - 2520 = 15480
        assert_eq!(out.net_annual_return, dec!(15480) / dec!(230000));
        assert_eq!(out.cap_rate, dec!(15480) / dec!(200000));
    }

    #[test]
    fn test_monthly_net_cashflow() {
        let result = compute_metrics(&sample_input()).unwrap();
        // 1500 - 210 operating - 800 mortgage = 490
        assert_eq!(result.result.monthly_net_cashflow, dec!(490));
    }

    #[test]
    fn test_cash_on_cash() {
        let result = compute_metrics(&sample_input()).unwrap();
        // 490 * 12 / 70000
        assert_eq!(result.result.cash_on_cash, dec!(5880) / dec!(70000));
    }

    #[test]
    fn test_dscr_uses_vacancy_factor() {
        let result = compute_metrics(&sample_input()).unwrap();
        // 1500 * 0.8 / 800 = 1.5
        assert_eq!(result.result.dscr, dec!(1.5));
    }

    #[test]
    fn test_break_even_rent_excludes_proportional_costs() {
        let result = compute_metrics(&sample_input()).unwrap();
        // 800 mortgage + 60 community + 50 tax + 25 insurance = 935
        assert_eq!(result.result.break_even_rent, dec!(935));
    }

    #[test]
    fn test_payback_period() {
        let result = compute_metrics(&sample_input()).unwrap();
        // 70000 / 5880 ≈ 11.9 years
        let payback = result.result.payback_years.unwrap();
        assert!(payback > dec!(11.8) && payback < dec!(12.0));
    }

    #[test]
    fn test_payback_sentinel_on_zero_cashflow() {
        let mut input = sample_input();
        // Rent exactly covers operating + mortgage given no proportional costs
        input.financials.maintenance_rate = Decimal::ZERO;
        input.financials.monthly_rent = dec!(935);
        let result = compute_metrics(&input).unwrap();

        assert_eq!(result.result.monthly_net_cashflow, Decimal::ZERO);
        assert_eq!(result.result.payback_years, None);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("payback period undefined")));
    }

    #[test]
    fn test_risk_classification_low() {
        let result = compute_metrics(&sample_input()).unwrap();
        let out = &result.result;

        // LTV ≈ 0.696, net return ≈ 0.067, positive cashflow
        assert_eq!(out.risk, RiskTier::Low);
        assert!(out.favorable);
    }

    #[test]
    fn test_return_strength_annotation() {
        let result = compute_metrics(&sample_input()).unwrap();
        // Net return ≈ 0.067 sits in the adequate band
        assert_eq!(result.result.return_strength, ReturnStrength::Adequate);

        let mut input = sample_input();
        input.financials.monthly_rent = dec!(1800);
        let result = compute_metrics(&input).unwrap();
        // NOI 18900 / 230000 ≈ 0.082
        assert_eq!(result.result.return_strength, ReturnStrength::Strong);
    }

    #[test]
    fn test_risk_classification_high_on_negative_cashflow() {
        let mut input = sample_input();
        input.financials.monthly_rent = dec!(700);
        let result = compute_metrics(&input).unwrap();
        let out = &result.result;

        assert!(out.monthly_net_cashflow < Decimal::ZERO);
        assert_eq!(out.risk, RiskTier::High);
        assert!(!out.favorable);
    }

    #[test]
    fn test_zero_down_payment_warns() {
        let mut input = sample_input();
        input.financials.down_payment = Decimal::ZERO;
        let result = compute_metrics(&input).unwrap();

        assert_eq!(result.result.cash_on_cash, Decimal::ZERO);
        assert_eq!(result.result.payback_years, None);
        assert!(result.warnings.iter().any(|w| w.contains("Down payment")));
    }

    #[test]
    fn test_low_dscr_warning() {
        let mut input = sample_input();
        input.current.payment = dec!(1400);
        let result = compute_metrics(&input).unwrap();

        // 1500 * 0.8 / 1400 < 1.0
        assert!(result.result.dscr < Decimal::ONE);
        assert!(result.warnings.iter().any(|w| w.contains("DSCR")));
    }

    #[test]
    fn test_invalid_purchase_price() {
        let mut input = sample_input();
        input.financials.purchase_price = Decimal::ZERO;
        assert!(compute_metrics(&input).is_err());
    }

    #[test]
    fn test_negative_costs_fail_fast() {
        // Costs cancelling the purchase price must not reach the LTV division
        let mut input = sample_input();
        input.financials.purchase_price = dec!(100000);
        input.financials.acquisition_costs = dec!(-100000);
        let err = compute_metrics(&input).unwrap_err();
        match err {
            PropertyFinanceError::InvalidLoanParameters { field, .. } => {
                assert_eq!(field, "acquisition_costs");
            }
            other => panic!("Expected InvalidLoanParameters, got {other:?}"),
        }

        let mut input = sample_input();
        input.financials.renovation_costs = dec!(-1);
        assert!(compute_metrics(&input).is_err());

        let mut input = sample_input();
        input.financials.down_payment = dec!(-5000);
        assert!(compute_metrics(&input).is_err());
    }

    #[test]
    fn test_rounded_view() {
        let result = compute_metrics(&sample_input()).unwrap();
        let rounded = result.result.rounded();
        assert_eq!(rounded.ltv, (dec!(160000) / dec!(230000)).round_dp(4));
        assert_eq!(rounded.break_even_rent, dec!(935.00));
    }
}
