//! Plain-text rendering of a [`Comparison`] for the command line.

use comfy_table::{Cell, CellAlignment, Table, presets::UTF8_FULL};

use crate::core::{Comparison, ScenarioReport, ScenarioSummary, YearRow};

pub const SCENARIO_A_LABEL: &str = "Scenario Pillar 3";
pub const SCENARIO_B_LABEL: &str = "Scenario Brokerage Account with ETF";

const THOUSANDS_SEPARATOR: char = '\u{202f}';

/// Formats an amount as euros with a decimal comma, e.g. `12 345,67 €`.
pub fn format_currency(amount: f64, decimals: usize) -> String {
    let rounded = format!("{:.*}", decimals, amount.abs());
    let (int_part, frac_part) = match rounded.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (rounded.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (idx, digit) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(THOUSANDS_SEPARATOR);
        }
        grouped.push(digit);
    }

    let is_negative = amount < 0.0 && rounded.bytes().any(|b| matches!(b, b'1'..=b'9'));
    let sign = if is_negative { "-" } else { "" };
    match frac_part {
        Some(frac) => format!("{sign}{grouped},{frac} €"),
        None => format!("{sign}{grouped} €"),
    }
}

fn amount_cell(amount: f64, decimals: usize) -> Cell {
    Cell::new(format_currency(amount, decimals)).set_alignment(CellAlignment::Right)
}

pub fn render_year_table(rows: &[YearRow]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Year",
        "Starting capital",
        "Net contribution",
        "Interest",
        "Ending capital",
        "Cumulative fees",
    ]);

    for row in rows {
        table.add_row(vec![
            Cell::new(row.year).set_alignment(CellAlignment::Center),
            amount_cell(row.starting_capital, 0),
            amount_cell(row.net_contribution, 0),
            amount_cell(row.interest_earned, 0),
            amount_cell(row.ending_capital, 0),
            amount_cell(row.cumulative_fees_to_date, 0),
        ]);
    }

    table.to_string()
}

pub fn render_summary(summary: &ScenarioSummary, with_deferred_saving: bool) -> String {
    let mut lines = vec![
        ("Total contributions", summary.total_contributions),
        ("Capital before tax", summary.capital_before_tax),
        ("Profit before tax", summary.profit),
        ("Tax on profit", summary.tax_owed),
        ("Capital after tax", summary.capital_after_tax),
        ("Fees paid", summary.total_fees),
    ];
    if with_deferred_saving {
        lines.push(("Tax savings paid at end", summary.deferred_tax_saving_total));
        lines.push((
            "Capital after tax incl. savings",
            summary.capital_after_tax_including_deferred,
        ));
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    for (label, amount) in lines {
        table.add_row(vec![Cell::new(label), amount_cell(amount, 2)]);
    }
    table.to_string()
}

fn render_scenario(label: &str, report: &ScenarioReport, with_deferred_saving: bool) -> String {
    format!(
        "{label}\n{}\n{}\n",
        render_summary(&report.summary, with_deferred_saving),
        render_year_table(&report.rows)
    )
}

pub fn render_comparison(comparison: &Comparison) -> String {
    let a = &comparison.scenario_a;
    let b = &comparison.scenario_b;
    let difference = a.summary.capital_after_tax_including_deferred
        - b.summary.capital_after_tax_including_deferred;

    format!(
        "{}\n{}\nDifference ({SCENARIO_A_LABEL} - {SCENARIO_B_LABEL}): {}\n",
        render_scenario(SCENARIO_A_LABEL, a, true),
        render_scenario(SCENARIO_B_LABEL, b, false),
        format_currency(difference, 2)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        ComparisonInputs, DEFAULT_FINAL_TAX_RATE_A, DEFAULT_FINAL_TAX_RATE_B, FeeSchedule,
        TaxSavingMode, compare,
    };

    fn sample_comparison(horizon_years: u32) -> Comparison {
        compare(&ComparisonInputs {
            annual_growth_rate: 0.05,
            yearly_contribution: 3_200.0,
            deductible_ceiling: Some(3_200.0),
            horizon_years,
            fees_a: FeeSchedule {
                entry_fee_rate: 0.03,
                management_fee_rate: 0.01,
            },
            tax_credit_rate_a: 0.3,
            tax_saving_mode_a: TaxSavingMode::DeferToEnd,
            fees_b: FeeSchedule {
                entry_fee_rate: 0.0,
                management_fee_rate: 0.002,
            },
            final_tax_rate_a: DEFAULT_FINAL_TAX_RATE_A,
            final_tax_rate_b: DEFAULT_FINAL_TAX_RATE_B,
        })
    }

    #[test]
    fn currency_groups_thousands_and_uses_decimal_comma() {
        assert_eq!(format_currency(1_234_567.891, 2), "1\u{202f}234\u{202f}567,89 €");
        assert_eq!(format_currency(999.0, 0), "999 €");
        assert_eq!(format_currency(1_000.0, 0), "1\u{202f}000 €");
        assert_eq!(format_currency(0.0, 2), "0,00 €");
    }

    #[test]
    fn currency_keeps_sign_unless_rounded_to_zero() {
        assert_eq!(format_currency(-1_500.5, 2), "-1\u{202f}500,50 €");
        assert_eq!(format_currency(-0.004, 2), "0,00 €");
    }

    #[test]
    fn year_table_has_one_line_per_row() {
        let comparison = sample_comparison(4);
        let rendered = render_year_table(&comparison.scenario_a.rows);
        assert!(rendered.contains("Cumulative fees"));
        for year in 1..=4 {
            assert!(rendered.contains(&format!(" {year} ")));
        }
    }

    #[test]
    fn summary_lists_deferred_saving_only_when_requested() {
        let comparison = sample_comparison(3);
        let with = render_summary(&comparison.scenario_a.summary, true);
        let without = render_summary(&comparison.scenario_b.summary, false);
        assert!(with.contains("Tax savings paid at end"));
        assert!(!without.contains("Tax savings paid at end"));
    }

    #[test]
    fn comparison_names_both_scenarios() {
        let rendered = render_comparison(&sample_comparison(2));
        assert!(rendered.contains(SCENARIO_A_LABEL));
        assert!(rendered.contains(SCENARIO_B_LABEL));
        assert!(rendered.contains("Difference"));
    }
}
