use serde::Serialize;

use super::engine::{simulate, summarize};
use super::types::{
    ScenarioSummary, SimulationParameters, SimulationResult, TaxSavingMode, YearRow,
};

/// Tax on profit when the retirement account is paid out.
pub const DEFAULT_FINAL_TAX_RATE_A: f64 = 0.20;
/// Gains in the brokerage account are not taxed.
pub const DEFAULT_FINAL_TAX_RATE_B: f64 = 0.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeSchedule {
    pub entry_fee_rate: f64,
    pub management_fee_rate: f64,
}

/// Normalized inputs shared by both vehicles plus the per-vehicle settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonInputs {
    pub annual_growth_rate: f64,
    pub yearly_contribution: f64,
    pub deductible_ceiling: Option<f64>,
    pub horizon_years: u32,
    pub fees_a: FeeSchedule,
    pub tax_credit_rate_a: f64,
    pub tax_saving_mode_a: TaxSavingMode,
    pub fees_b: FeeSchedule,
    pub final_tax_rate_a: f64,
    pub final_tax_rate_b: f64,
}

impl ComparisonInputs {
    pub fn scenario_a_parameters(&self) -> SimulationParameters {
        SimulationParameters {
            annual_growth_rate: self.annual_growth_rate,
            entry_fee_rate: self.fees_a.entry_fee_rate,
            management_fee_rate: self.fees_a.management_fee_rate,
            yearly_contribution: self.yearly_contribution,
            horizon_years: self.horizon_years,
            tax_credit_rate: self.tax_credit_rate_a,
            tax_saving_mode: self.tax_saving_mode_a,
            deductible_ceiling: self.deductible_ceiling,
        }
    }

    /// The brokerage account never earns a tax credit.
    pub fn scenario_b_parameters(&self) -> SimulationParameters {
        SimulationParameters {
            annual_growth_rate: self.annual_growth_rate,
            entry_fee_rate: self.fees_b.entry_fee_rate,
            management_fee_rate: self.fees_b.management_fee_rate,
            yearly_contribution: self.yearly_contribution,
            horizon_years: self.horizon_years,
            tax_credit_rate: 0.0,
            tax_saving_mode: TaxSavingMode::Ignore,
            deductible_ceiling: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioReport {
    pub rows: Vec<YearRow>,
    pub deferred_tax_saving_total: f64,
    pub summary: ScenarioSummary,
}

impl ScenarioReport {
    fn new(result: SimulationResult, final_tax_rate_on_profit: f64) -> Self {
        let summary = summarize(&result, final_tax_rate_on_profit);
        Self {
            rows: result.rows,
            deferred_tax_saving_total: result.deferred_tax_saving_total,
            summary,
        }
    }
}

/// Per-year series for the comparison chart. Capital for scenario A shows the
/// ending capital each year, except the last point which is the payout after
/// tax including any deferred tax saving.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub years: Vec<u32>,
    pub capital_a: Vec<f64>,
    pub capital_b: Vec<f64>,
    pub fees_a: Vec<f64>,
    pub fees_b: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub scenario_a: ScenarioReport,
    pub scenario_b: ScenarioReport,
    pub chart: ChartSeries,
}

pub fn compare(inputs: &ComparisonInputs) -> Comparison {
    let scenario_a = ScenarioReport::new(
        simulate(&inputs.scenario_a_parameters()),
        inputs.final_tax_rate_a,
    );
    let scenario_b = ScenarioReport::new(
        simulate(&inputs.scenario_b_parameters()),
        inputs.final_tax_rate_b,
    );
    let chart = build_chart_series(&scenario_a, &scenario_b);

    tracing::debug!(
        horizon_years = inputs.horizon_years,
        capital_a = scenario_a.summary.capital_after_tax_including_deferred,
        capital_b = scenario_b.summary.capital_after_tax_including_deferred,
        "compared scenarios"
    );

    Comparison {
        scenario_a,
        scenario_b,
        chart,
    }
}

fn build_chart_series(scenario_a: &ScenarioReport, scenario_b: &ScenarioReport) -> ChartSeries {
    let last_idx = scenario_a.rows.len().saturating_sub(1);
    let capital_a = scenario_a
        .rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            if idx == last_idx {
                scenario_a.summary.capital_after_tax_including_deferred
            } else {
                row.ending_capital
            }
        })
        .collect();

    ChartSeries {
        years: scenario_a.rows.iter().map(|r| r.year).collect(),
        capital_a,
        capital_b: scenario_b.rows.iter().map(|r| r.ending_capital).collect(),
        fees_a: scenario_a
            .rows
            .iter()
            .map(|r| r.cumulative_fees_to_date)
            .collect(),
        fees_b: scenario_b
            .rows
            .iter()
            .map(|r| r.cumulative_fees_to_date)
            .collect(),
    }
}
