mod compare;
mod engine;
mod types;

pub use compare::{
    ChartSeries, Comparison, ComparisonInputs, DEFAULT_FINAL_TAX_RATE_A, DEFAULT_FINAL_TAX_RATE_B,
    FeeSchedule, ScenarioReport, compare,
};
pub use engine::{simulate, summarize};
pub use types::{
    MAX_HORIZON_YEARS, MIN_HORIZON_YEARS, ScenarioSummary, SimulationParameters,
    SimulationResult, TaxSavingMode, YearRow,
};
