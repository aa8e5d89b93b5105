use super::types::{
    MAX_HORIZON_YEARS, MIN_HORIZON_YEARS, ScenarioSummary, SimulationParameters,
    SimulationResult, TaxSavingMode, YearRow,
};

#[derive(Debug, Clone, Copy)]
struct ContributionFlow {
    gross: f64,
    entry_fee: f64,
    deferred_saving: f64,
}

impl ContributionFlow {
    fn net(self) -> f64 {
        self.gross - self.entry_fee
    }
}

#[derive(Debug, Default)]
struct Ledger {
    starting_capital: f64,
    cumulative_fees: f64,
    deferred_tax_saving: f64,
}

/// Runs the yearly compounding recurrence for one savings vehicle.
///
/// Panics when `horizon_years` is outside `1..=60`; callers are expected to
/// clamp it first.
pub fn simulate(params: &SimulationParameters) -> SimulationResult {
    assert!(
        (MIN_HORIZON_YEARS..=MAX_HORIZON_YEARS).contains(&params.horizon_years),
        "horizon_years must be within {MIN_HORIZON_YEARS}..={MAX_HORIZON_YEARS}, got {}",
        params.horizon_years
    );

    let mut ledger = Ledger::default();
    let mut rows = Vec::with_capacity(params.horizon_years as usize);

    for year in 1..=params.horizon_years {
        let flow = yearly_contribution_flow(params);
        ledger.deferred_tax_saving += flow.deferred_saving;

        let net_contribution = flow.net();
        let managed_base = ledger.starting_capital + net_contribution;
        let management_fee_paid = managed_base * params.management_fee_rate;
        // Growth is taken on the full managed base and the fee comes out of it.
        let interest_earned = managed_base * params.annual_growth_rate - management_fee_paid;
        let ending_capital = ledger.starting_capital + net_contribution + interest_earned;

        ledger.cumulative_fees += flow.entry_fee + management_fee_paid;

        rows.push(YearRow {
            year,
            starting_capital: ledger.starting_capital,
            gross_contribution: flow.gross,
            net_contribution,
            interest_earned,
            ending_capital,
            entry_fee_paid: flow.entry_fee,
            management_fee_paid,
            cumulative_fees_to_date: ledger.cumulative_fees,
        });

        ledger.starting_capital = ending_capital;
    }

    SimulationResult {
        rows,
        deferred_tax_saving_total: ledger.deferred_tax_saving,
    }
}

fn yearly_contribution_flow(params: &SimulationParameters) -> ContributionFlow {
    let deductible_base = match params.deductible_ceiling {
        Some(ceiling) => params.yearly_contribution.min(ceiling.max(0.0)),
        None => params.yearly_contribution,
    };
    let tax_saving = deductible_base * params.tax_credit_rate;

    let (reinvested, deferred_saving) = match params.tax_saving_mode {
        TaxSavingMode::Reinvest => (tax_saving, 0.0),
        TaxSavingMode::DeferToEnd => (0.0, tax_saving),
        TaxSavingMode::Ignore => (0.0, 0.0),
    };

    let gross = params.yearly_contribution + reinvested;
    ContributionFlow {
        gross,
        entry_fee: gross * params.entry_fee_rate,
        deferred_saving,
    }
}

/// Reduces a simulated row sequence to end-of-horizon totals.
///
/// Losses are not carried forward: profit, and therefore tax, never goes
/// below zero.
pub fn summarize(result: &SimulationResult, final_tax_rate_on_profit: f64) -> ScenarioSummary {
    let Some(last) = result.rows.last() else {
        return ScenarioSummary::default();
    };

    let total_contributions = result.rows.iter().map(|r| r.net_contribution).sum::<f64>();
    let capital_before_tax = last.ending_capital;
    let profit = (capital_before_tax - total_contributions).max(0.0);
    let tax_owed = profit * final_tax_rate_on_profit;
    let capital_after_tax = capital_before_tax - tax_owed;

    ScenarioSummary {
        total_contributions,
        capital_before_tax,
        profit,
        tax_owed,
        capital_after_tax,
        deferred_tax_saving_total: result.deferred_tax_saving_total,
        capital_after_tax_including_deferred: capital_after_tax + result.deferred_tax_saving_total,
        total_fees: last.cumulative_fees_to_date,
    }
}
