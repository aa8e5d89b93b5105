use serde::Serialize;

pub const MIN_HORIZON_YEARS: u32 = 1;
pub const MAX_HORIZON_YEARS: u32 = 60;

/// What happens to the yearly tax credit earned on deductible contributions.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaxSavingMode {
    /// Added to the same year's contribution (and charged the entry fee).
    Reinvest,
    /// Accumulated outside the account and paid out after the last year.
    DeferToEnd,
    /// Computed and discarded.
    Ignore,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationParameters {
    pub annual_growth_rate: f64,
    pub entry_fee_rate: f64,
    pub management_fee_rate: f64,
    pub yearly_contribution: f64,
    pub horizon_years: u32,
    pub tax_credit_rate: f64,
    pub tax_saving_mode: TaxSavingMode,
    /// `None` means every unit of contribution is deductible.
    pub deductible_ceiling: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearRow {
    pub year: u32,
    pub starting_capital: f64,
    pub gross_contribution: f64,
    pub net_contribution: f64,
    pub interest_earned: f64,
    pub ending_capital: f64,
    pub entry_fee_paid: f64,
    pub management_fee_paid: f64,
    pub cumulative_fees_to_date: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub rows: Vec<YearRow>,
    pub deferred_tax_saving_total: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioSummary {
    pub total_contributions: f64,
    pub capital_before_tax: f64,
    pub profit: f64,
    pub tax_owed: f64,
    pub capital_after_tax: f64,
    pub deferred_tax_saving_total: f64,
    pub capital_after_tax_including_deferred: f64,
    pub total_fees: f64,
}
