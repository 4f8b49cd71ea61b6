use clap::Args;
use serde_json::Value;

use property_finance_core::scenarios::{self, ScenarioAdjustment, ScenarioInput};

use crate::input;

/// Arguments for comparative scenario analysis
#[derive(Args)]
pub struct ScenariosArgs {
    /// Path to JSON input file with loan, financials and scenarios
    #[arg(long)]
    pub input: Option<String>,

    /// Use the standard optimistic/pessimistic/stress trio instead of
    /// (or in absence of) scenarios from the input
    #[arg(long)]
    pub standard: bool,
}

pub fn run_scenarios(args: ScenariosArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut scenario_input: ScenarioInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input is required (or pipe JSON via stdin)".into());
    };

    if args.standard || scenario_input.scenarios.is_empty() {
        scenario_input.scenarios = ScenarioAdjustment::standard_set();
    }

    let mut computed = scenarios::run_scenarios(&scenario_input)?;

    computed.result.base = computed.result.base.rounded();
    for r in &mut computed.result.results {
        r.metrics = r.metrics.rounded();
        r.cashflow_deviation = r.cashflow_deviation.round_dp(2);
        r.cashflow_deviation_pct = r.cashflow_deviation_pct.map(|p| p.round_dp(4));
    }

    Ok(serde_json::to_value(computed)?)
}
