use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{
    Comparison, ComparisonInputs, FeeSchedule, MAX_HORIZON_YEARS, MIN_HORIZON_YEARS,
    TaxSavingMode, compare,
};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

const DEFAULT_FINAL_TAX_PERCENT_A: f64 = 20.0;
const DEFAULT_FINAL_TAX_PERCENT_B: f64 = 0.0;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliTaxSavingMode {
    Reinvest,
    #[value(alias = "end", alias = "defer")]
    DeferToEnd,
    #[value(alias = "none")]
    Ignore,
}

impl From<CliTaxSavingMode> for TaxSavingMode {
    fn from(value: CliTaxSavingMode) -> Self {
        match value {
            CliTaxSavingMode::Reinvest => TaxSavingMode::Reinvest,
            CliTaxSavingMode::DeferToEnd => TaxSavingMode::DeferToEnd,
            CliTaxSavingMode::Ignore => TaxSavingMode::Ignore,
        }
    }
}

/// Scenario assumptions as a user enters them: rates in percent, amounts in
/// currency units.
#[derive(Args, Debug, Clone)]
pub struct ScenarioArgs {
    #[arg(
        long,
        default_value_t = 5.0,
        allow_negative_numbers = true,
        help = "Expected annual performance in percent"
    )]
    pub performance: f64,
    #[arg(long, default_value_t = 3200.0, help = "Yearly contribution")]
    pub deposit: f64,
    #[arg(
        long,
        help = "Yearly contribution eligible for the tax credit; unbounded when omitted"
    )]
    pub tax_ceiling: Option<f64>,
    #[arg(
        long,
        default_value_t = 30,
        allow_negative_numbers = true,
        help = "Investment horizon in years, clamped to 1..=60"
    )]
    pub years: i64,
    #[arg(long, default_value_t = 3.0, help = "Retirement account entry fee in percent")]
    pub entry_fee_a: f64,
    #[arg(
        long,
        default_value_t = 1.0,
        help = "Retirement account yearly management fee in percent"
    )]
    pub mgmt_fee_a: f64,
    #[arg(
        long,
        default_value_t = 30.0,
        help = "Marginal tax rate in percent credited on deductible contributions"
    )]
    pub tax_rate_a: f64,
    #[arg(long, value_enum, default_value_t = CliTaxSavingMode::Reinvest)]
    pub tax_saving_mode_a: CliTaxSavingMode,
    #[arg(long, default_value_t = 0.0, help = "Brokerage entry fee in percent")]
    pub entry_fee_b: f64,
    #[arg(
        long,
        default_value_t = 0.2,
        help = "Brokerage yearly management fee (fund TER) in percent"
    )]
    pub mgmt_fee_b: f64,
    #[arg(
        long,
        default_value_t = DEFAULT_FINAL_TAX_PERCENT_A,
        help = "Tax on retirement account profit at payout in percent"
    )]
    pub final_tax_rate_a: f64,
    #[arg(
        long,
        default_value_t = DEFAULT_FINAL_TAX_PERCENT_B,
        help = "Tax on brokerage profit at the end of the horizon in percent"
    )]
    pub final_tax_rate_b: f64,
}

impl Default for ScenarioArgs {
    fn default() -> Self {
        Self {
            performance: 5.0,
            deposit: 3_200.0,
            tax_ceiling: None,
            years: 30,
            entry_fee_a: 3.0,
            mgmt_fee_a: 1.0,
            tax_rate_a: 30.0,
            tax_saving_mode_a: CliTaxSavingMode::Reinvest,
            entry_fee_b: 0.0,
            mgmt_fee_b: 0.2,
            final_tax_rate_a: DEFAULT_FINAL_TAX_PERCENT_A,
            final_tax_rate_b: DEFAULT_FINAL_TAX_PERCENT_B,
        }
    }
}

/// A form value that may arrive as a JSON number or as text.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum NumberInput {
    Number(f64),
    Text(String),
}

impl NumberInput {
    /// Reads the leading number of a text value, so `"5%"` is 5. Accepts a
    /// decimal comma. Non-finite values count as unparsable.
    fn parse(&self) -> Option<f64> {
        let value = match self {
            NumberInput::Number(v) => *v,
            NumberInput::Text(raw) => {
                let normalized = raw.replacen(',', ".", 1);
                leading_decimal(&normalized)?.parse::<f64>().ok()?
            }
        };
        value.is_finite().then_some(value)
    }

    fn number_or(&self, fallback: f64) -> f64 {
        self.parse().unwrap_or(fallback)
    }

    /// Integer part of the leading number; `"12.9"` and `"12abc"` are both 12.
    fn whole_years(&self) -> Option<i64> {
        match self {
            NumberInput::Number(v) => v.is_finite().then(|| v.trunc() as i64),
            NumberInput::Text(raw) => {
                let digits = leading_integer(raw)?;
                // Out of range only on overflow, which the horizon clamp absorbs.
                Some(digits.parse::<i64>().unwrap_or(if digits.starts_with('-') {
                    i64::MIN
                } else {
                    i64::MAX
                }))
            }
        }
    }
}

fn count_digits(bytes: &[u8], from: usize) -> usize {
    bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count()
}

fn sign_len(bytes: &[u8], at: usize) -> usize {
    usize::from(matches!(bytes.get(at), Some(b'+' | b'-')))
}

/// Longest prefix of the trimmed input that is an integer with optional sign.
fn leading_integer(raw: &str) -> Option<&str> {
    let text = raw.trim_start();
    let bytes = text.as_bytes();
    let sign = sign_len(bytes, 0);
    let digits = count_digits(bytes, sign);
    (digits > 0).then(|| &text[..sign + digits])
}

/// Longest prefix of the trimmed input that is a decimal number with optional
/// sign, fraction and exponent.
fn leading_decimal(raw: &str) -> Option<&str> {
    let text = raw.trim_start();
    let bytes = text.as_bytes();
    let mut end = sign_len(bytes, 0);

    let int_digits = count_digits(bytes, end);
    end += int_digits;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(bytes, end + 1);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let exp_sign = sign_len(bytes, end + 1);
        let exp_digits = count_digits(bytes, end + 1 + exp_sign);
        if exp_digits > 0 {
            end += 1 + exp_sign + exp_digits;
        }
    }
    Some(&text[..end])
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    performance: Option<NumberInput>,
    deposit: Option<NumberInput>,
    tax_ceiling: Option<NumberInput>,
    years: Option<NumberInput>,
    entry_fee_a: Option<NumberInput>,
    mgmt_fee_a: Option<NumberInput>,
    tax_rate_a: Option<NumberInput>,
    tax_saving_mode_a: Option<String>,
    entry_fee_b: Option<NumberInput>,
    mgmt_fee_b: Option<NumberInput>,
    final_tax_rate_a: Option<NumberInput>,
    final_tax_rate_b: Option<NumberInput>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    inputs: ComparisonInputs,
    #[serde(flatten)]
    comparison: Comparison,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Clamps and defaults user input into the parameters the simulator expects.
/// Nothing is rejected here.
pub fn build_inputs(args: &ScenarioArgs) -> ComparisonInputs {
    ComparisonInputs {
        annual_growth_rate: percent(args.performance),
        yearly_contribution: non_negative(args.deposit),
        deductible_ceiling: args.tax_ceiling.filter(|v| v.is_finite()),
        horizon_years: clamp_years(args.years),
        fees_a: FeeSchedule {
            entry_fee_rate: non_negative_percent(args.entry_fee_a),
            management_fee_rate: non_negative_percent(args.mgmt_fee_a),
        },
        tax_credit_rate_a: non_negative_percent(args.tax_rate_a),
        tax_saving_mode_a: args.tax_saving_mode_a.into(),
        fees_b: FeeSchedule {
            entry_fee_rate: non_negative_percent(args.entry_fee_b),
            management_fee_rate: non_negative_percent(args.mgmt_fee_b),
        },
        final_tax_rate_a: non_negative_percent(args.final_tax_rate_a),
        final_tax_rate_b: non_negative_percent(args.final_tax_rate_b),
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

fn percent(value: f64) -> f64 {
    finite_or_zero(value) / 100.0
}

fn non_negative(value: f64) -> f64 {
    finite_or_zero(value).max(0.0)
}

fn non_negative_percent(value: f64) -> f64 {
    non_negative(value) / 100.0
}

fn clamp_years(years: i64) -> u32 {
    years.clamp(MIN_HORIZON_YEARS as i64, MAX_HORIZON_YEARS as i64) as u32
}

/// Unknown mode names fall back to reinvesting the tax saving.
fn parse_tax_saving_mode(raw: &str) -> CliTaxSavingMode {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return CliTaxSavingMode::Reinvest;
    }
    CliTaxSavingMode::from_str(trimmed, true).unwrap_or_else(|_| {
        tracing::warn!(mode = trimmed, "unrecognized tax saving mode, using reinvest");
        CliTaxSavingMode::Reinvest
    })
}

fn args_from_payload(payload: SimulatePayload) -> ScenarioArgs {
    let mut args = ScenarioArgs::default();

    if let Some(v) = payload.performance {
        args.performance = v.number_or(0.0);
    }
    if let Some(v) = payload.deposit {
        args.deposit = v.number_or(0.0);
    }
    if let Some(v) = payload.tax_ceiling {
        args.tax_ceiling = v.parse();
    }
    if let Some(v) = payload.years {
        args.years = v.whole_years().unwrap_or(MIN_HORIZON_YEARS as i64);
    }
    if let Some(v) = payload.entry_fee_a {
        args.entry_fee_a = v.number_or(0.0);
    }
    if let Some(v) = payload.mgmt_fee_a {
        args.mgmt_fee_a = v.number_or(0.0);
    }
    if let Some(v) = payload.tax_rate_a {
        args.tax_rate_a = v.number_or(0.0);
    }
    if let Some(v) = payload.tax_saving_mode_a {
        args.tax_saving_mode_a = parse_tax_saving_mode(&v);
    }
    if let Some(v) = payload.entry_fee_b {
        args.entry_fee_b = v.number_or(0.0);
    }
    if let Some(v) = payload.mgmt_fee_b {
        args.mgmt_fee_b = v.number_or(0.0);
    }
    if let Some(v) = payload.final_tax_rate_a {
        args.final_tax_rate_a = v.number_or(0.0);
    }
    if let Some(v) = payload.final_tax_rate_b {
        args.final_tax_rate_b = v.number_or(0.0);
    }

    args
}

pub fn app() -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route("/api/health", get(health_handler))
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .fallback(not_found_handler)
}

pub async fn run_http_server(addr: SocketAddr) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "pillar HTTP API listening");
    tracing::info!("Local access: http://127.0.0.1:{}/", addr.port());

    axum::serve(listener, app()).await
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn health_handler() -> Response {
    with_cache_control("ok")
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn simulate_get_handler(
    payload: Result<Query<SimulatePayload>, QueryRejection>,
) -> Response {
    match payload {
        Ok(Query(payload)) => simulate_handler_impl(payload),
        Err(rejection) => {
            let msg = format!("Invalid API query string: {}", rejection.body_text());
            error_response(StatusCode::BAD_REQUEST, &msg)
        }
    }
}

async fn simulate_post_handler(payload: Result<Json<SimulatePayload>, JsonRejection>) -> Response {
    match payload {
        Ok(Json(payload)) => simulate_handler_impl(payload),
        Err(rejection) => {
            let msg = format!("Invalid API JSON payload: {}", rejection.body_text());
            error_response(StatusCode::BAD_REQUEST, &msg)
        }
    }
}

fn simulate_handler_impl(payload: SimulatePayload) -> Response {
    let inputs = build_inputs(&args_from_payload(payload));
    tracing::debug!(?inputs, "simulate request");
    json_response(StatusCode::OK, build_simulate_response(inputs))
}

fn build_simulate_response(inputs: ComparisonInputs) -> SimulateResponse {
    let comparison = compare(&inputs);
    SimulateResponse { inputs, comparison }
}

/// The JSON document `pillar compare --format json` prints, identical to the
/// `/api/simulate` body.
pub fn comparison_json(inputs: ComparisonInputs) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&build_simulate_response(inputs))
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn args_from_json(json: &str) -> Result<ScenarioArgs, String> {
    let payload = serde_json::from_str::<SimulatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    Ok(args_from_payload(payload))
}
