use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::{self, AmortizationInput};
use crate::error::PropertyFinanceError;
use crate::metrics::{self, MetricsInput, MetricsSummary};
use crate::types::{with_metadata, ComputationOutput, Loan, Money, Prepayment, PropertyFinancials, Rate, RateRevision};
use crate::PropertyFinanceResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A named perturbation of the base case. Deltas default to zero, so a
/// scenario only needs to name the levers it moves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioAdjustment {
    pub name: String,
    /// Relative rent change (-0.10 = rent down 10%)
    #[serde(default)]
    pub rent_delta_pct: Rate,
    /// Rate shift in basis points (+150 = +1.50%)
    #[serde(default)]
    pub rate_delta_bps: Decimal,
    /// Relative change to fixed operating costs
    #[serde(default)]
    pub expense_delta_pct: Rate,
}

impl ScenarioAdjustment {
    /// The conventional optimistic / pessimistic / stress trio.
    pub fn standard_set() -> Vec<ScenarioAdjustment> {
        vec![
            ScenarioAdjustment {
                name: "optimistic".into(),
                rent_delta_pct: dec!(0.05),
                rate_delta_bps: dec!(-50),
                expense_delta_pct: dec!(-0.05),
            },
            ScenarioAdjustment {
                name: "pessimistic".into(),
                rent_delta_pct: dec!(-0.10),
                rate_delta_bps: dec!(150),
                expense_delta_pct: dec!(0.10),
            },
            ScenarioAdjustment {
                name: "stress".into(),
                rent_delta_pct: dec!(-0.20),
                rate_delta_bps: dec!(300),
                expense_delta_pct: dec!(0.20),
            },
        ]
    }
}

/// Base inputs plus the scenarios to evaluate against them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioInput {
    pub loan: Loan,
    #[serde(default)]
    pub revisions: Vec<RateRevision>,
    #[serde(default)]
    pub prepayments: Vec<Prepayment>,
    pub financials: PropertyFinancials,
    pub scenarios: Vec<ScenarioAdjustment>,
}

/// Outcome of a single scenario evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub metrics: MetricsSummary,
    /// Monthly net cashflow relative to the base case
    pub cashflow_deviation: Money,
    /// None when the base cashflow is zero
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cashflow_deviation_pct: Option<Rate>,
}

/// Base metrics plus one result per scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioOutput {
    pub base: MetricsSummary,
    pub results: Vec<ScenarioResult>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Evaluate the base case and every named scenario.
///
/// Each scenario run clones the base inputs, applies its deltas, and
/// re-invokes the amortization engine and metrics aggregator from scratch.
/// No state is shared between runs; the caller's inputs are never mutated.
pub fn run_scenarios(
    input: &ScenarioInput,
) -> PropertyFinanceResult<ComputationOutput<ScenarioOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.scenarios.is_empty() {
        return Err(PropertyFinanceError::InsufficientData(
            "At least one scenario required".into(),
        ));
    }

    let base = evaluate(
        &input.loan,
        &input.revisions,
        &input.prepayments,
        &input.financials,
        "base",
        &mut warnings,
    )?;

    let mut results = Vec::with_capacity(input.scenarios.len());

    for scenario in &input.scenarios {
        let (loan, revisions, financials) = apply_adjustment(input, scenario);

        let metrics = evaluate(
            &loan,
            &revisions,
            &input.prepayments,
            &financials,
            &scenario.name,
            &mut warnings,
        )?;

        let deviation = metrics.monthly_net_cashflow - base.monthly_net_cashflow;
        let deviation_pct = if base.monthly_net_cashflow.is_zero() {
            None
        } else {
            Some(deviation / base.monthly_net_cashflow)
        };

        results.push(ScenarioResult {
            name: scenario.name.clone(),
            metrics,
            cashflow_deviation: deviation,
            cashflow_deviation_pct: deviation_pct,
        });
    }

    let output = ScenarioOutput { base, results };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Comparative Scenario Analysis (independent re-evaluation)",
        &serde_json::json!({
            "num_scenarios": input.scenarios.len(),
            "scenario_names": input.scenarios.iter().map(|s| s.name.clone()).collect::<Vec<_>>(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// One full engine + aggregator pass. The first schedule month supplies the
/// current payment and balance for the metrics snapshot.
fn evaluate(
    loan: &Loan,
    revisions: &[RateRevision],
    prepayments: &[Prepayment],
    financials: &PropertyFinancials,
    label: &str,
    warnings: &mut Vec<String>,
) -> PropertyFinanceResult<MetricsSummary> {
    let amort_input = AmortizationInput {
        loan: loan.clone(),
        revisions: revisions.to_vec(),
        prepayments: prepayments.to_vec(),
    };
    let schedule = amortization::build_schedule(&amort_input)?;
    collect_warnings(label, &schedule.warnings, warnings);

    let current = schedule
        .result
        .entries
        .first()
        .cloned()
        .ok_or_else(|| PropertyFinanceError::InsufficientData("Empty schedule".into()))?;

    let metrics_input = MetricsInput {
        financials: financials.clone(),
        loan_amount: loan.principal,
        current,
        totals: schedule.result.totals.clone(),
    };
    let computed = metrics::compute_metrics(&metrics_input)?;
    collect_warnings(label, &computed.warnings, warnings);

    Ok(computed.result)
}

fn collect_warnings(label: &str, source: &[String], sink: &mut Vec<String>) {
    for w in source {
        sink.push(format!("{label}: {w}"));
    }
}

/// Produce perturbed copies of the base inputs. The originals are borrowed
/// immutably and never touched.
fn apply_adjustment(
    input: &ScenarioInput,
    adjustment: &ScenarioAdjustment,
) -> (Loan, Vec<RateRevision>, PropertyFinancials) {
    let rate_delta = adjustment.rate_delta_bps / dec!(10000);
    let rent_factor = Decimal::ONE + adjustment.rent_delta_pct;
    let expense_factor = Decimal::ONE + adjustment.expense_delta_pct;

    let mut loan = input.loan.clone();
    loan.fixed_rate = loan.fixed_rate.map(|r| r + rate_delta);
    loan.index_assumption = loan.index_assumption.map(|r| r + rate_delta);

    let revisions: Vec<RateRevision> = input
        .revisions
        .iter()
        .map(|r| RateRevision {
            index_rate: r.index_rate.map(|i| i + rate_delta),
            ..r.clone()
        })
        .collect();

    let mut financials = input.financials.clone();
    financials.monthly_rent *= rent_factor;
    financials.monthly_community_fees *= expense_factor;
    financials.annual_property_tax *= expense_factor;
    financials.annual_insurance *= expense_factor;

    (loan, revisions, financials)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
