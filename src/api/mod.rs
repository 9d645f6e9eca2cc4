mod error;

use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{
    BalancePoint, LoanComparison, LoanParameters, ZeroRatePolicy, balance_series, compare_loan,
};

pub use error::{CliError, InputError};

pub const MAX_TERM_MONTHS: u32 = 1200;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliZeroRatePolicy {
    Straight,
    Legacy,
}

impl From<CliZeroRatePolicy> for ZeroRatePolicy {
    fn from(value: CliZeroRatePolicy) -> Self {
        match value {
            CliZeroRatePolicy::Straight => ZeroRatePolicy::Straight,
            CliZeroRatePolicy::Legacy => ZeroRatePolicy::Legacy,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiZeroRatePolicy {
    #[serde(alias = "straightLine", alias = "straight_line")]
    Straight,
    #[serde(alias = "zero")]
    Legacy,
}

impl From<ApiZeroRatePolicy> for CliZeroRatePolicy {
    fn from(value: ApiZeroRatePolicy) -> Self {
        match value {
            ApiZeroRatePolicy::Straight => CliZeroRatePolicy::Straight,
            ApiZeroRatePolicy::Legacy => CliZeroRatePolicy::Legacy,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AmortizePayload {
    #[serde(alias = "loanAmount")]
    principal: Option<f64>,
    #[serde(alias = "interestRate")]
    annual_rate: Option<f64>,
    #[serde(alias = "loanTerm")]
    term_years: Option<f64>,
    term_months: Option<u32>,
    #[serde(alias = "additionalPayment")]
    extra_payment: Option<f64>,
    zero_rate_policy: Option<ApiZeroRatePolicy>,
}

#[derive(Parser, Debug)]
#[command(
    name = "loanpayoff",
    about = "Loan amortization schedule with and without a recurring extra payment",
    after_help = "Run `loanpayoff serve [port]` to start the HTTP API instead."
)]
struct Cli {
    #[arg(long, default_value_t = 10_000.0, help = "Loan amount")]
    principal: f64,
    #[arg(
        long,
        default_value_t = 5.0,
        help = "Nominal annual interest rate in percent, e.g. 5"
    )]
    annual_rate: f64,
    #[arg(long, default_value_t = 5.0, help = "Loan term in years")]
    term_years: f64,
    #[arg(long, help = "Loan term in months; overrides --term-years")]
    term_months: Option<u32>,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Additional principal paid every month"
    )]
    extra_payment: f64,
    #[arg(
        long,
        value_enum,
        default_value_t = CliZeroRatePolicy::Straight,
        help = "Payment at a 0% rate: straight-line principal/term, or legacy zero payment"
    )]
    zero_rate_policy: CliZeroRatePolicy,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AmortizeResponse {
    principal: f64,
    annual_rate: f64,
    term_months: u32,
    extra_payment: f64,
    zero_rate_policy: ZeroRatePolicy,
    #[serde(flatten)]
    comparison: LoanComparison,
    balance_series: Vec<BalancePoint>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

fn build_params(cli: Cli) -> Result<LoanParameters, InputError> {
    for (flag, value) in [
        ("--principal", cli.principal),
        ("--annual-rate", cli.annual_rate),
        ("--term-years", cli.term_years),
        ("--extra-payment", cli.extra_payment),
    ] {
        if !value.is_finite() {
            return Err(InputError::NotFinite { flag });
        }
    }

    if cli.principal <= 0.0 {
        return Err(InputError::NonPositivePrincipal);
    }

    if cli.annual_rate < 0.0 {
        return Err(InputError::NegativeRate);
    }

    let months = match cli.term_months {
        Some(months) => months as f64,
        None => (cli.term_years * 12.0).round(),
    };
    if months < 1.0 || months > MAX_TERM_MONTHS as f64 {
        return Err(InputError::TermOutOfRange {
            months,
            max: MAX_TERM_MONTHS,
        });
    }

    if cli.extra_payment < 0.0 {
        return Err(InputError::NegativeExtraPayment);
    }

    Ok(LoanParameters {
        principal: cli.principal,
        annual_rate_percent: cli.annual_rate,
        term_months: months as u32,
        extra_monthly_payment: cli.extra_payment,
        zero_rate_policy: cli.zero_rate_policy.into(),
    })
}

/// Parses loan flags (program name first) and renders the comparison report as JSON.
///
/// `--help` and malformed flags exit the process the way any clap binary does.
pub fn run_cli<I, T>(args: I) -> Result<String, CliError>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let params = build_params(Cli::parse_from(args))?;
    let response = build_amortize_response(&params);
    tracing::debug!(
        principal = params.principal,
        term_months = params.term_months,
        payoff_months = response.comparison.accelerated.len(),
        "computed loan report"
    );
    Ok(serde_json::to_string_pretty(&response)?)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router();

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "loan payoff HTTP API listening");
    tracing::info!("local access: http://127.0.0.1:{port}/api/amortize");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server shutdown complete");
    Ok(())
}

fn router() -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/amortize",
            get(amortize_get_handler).post(amortize_post_handler),
        )
        .fallback(not_found_handler)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c; serving until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("received ctrl-c, shutting down");
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn amortize_get_handler(payload: Result<Query<AmortizePayload>, QueryRejection>) -> Response {
    match payload {
        Ok(Query(payload)) => amortize_handler_impl(payload).await,
        Err(rejection) => malformed_payload_response(rejection.status(), &rejection.body_text()),
    }
}

async fn amortize_post_handler(payload: Result<Json<AmortizePayload>, JsonRejection>) -> Response {
    match payload {
        Ok(Json(payload)) => amortize_handler_impl(payload).await,
        Err(rejection) => malformed_payload_response(rejection.status(), &rejection.body_text()),
    }
}

fn malformed_payload_response(status: StatusCode, msg: &str) -> Response {
    tracing::warn!(%status, error = msg, "malformed amortization payload");
    error_response(status, msg)
}

async fn amortize_handler_impl(payload: AmortizePayload) -> Response {
    let params = match params_from_payload(payload) {
        Ok(params) => params,
        Err(err) => {
            tracing::warn!(error = %err, "rejected amortization request");
            return error_response(StatusCode::BAD_REQUEST, &err.to_string());
        }
    };

    let response = build_amortize_response(&params);
    tracing::debug!(
        principal = params.principal,
        annual_rate = params.annual_rate_percent,
        term_months = params.term_months,
        extra_payment = params.extra_monthly_payment,
        payoff_months = response.comparison.accelerated.len(),
        "computed amortization"
    );
    json_response(StatusCode::OK, response)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
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
fn params_from_json(json: &str) -> Result<LoanParameters, String> {
    let payload = serde_json::from_str::<AmortizePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    params_from_payload(payload).map_err(|e| e.to_string())
}

fn params_from_payload(payload: AmortizePayload) -> Result<LoanParameters, InputError> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.principal {
        cli.principal = v;
    }
    if let Some(v) = payload.annual_rate {
        cli.annual_rate = v;
    }
    if let Some(v) = payload.term_years {
        cli.term_years = v;
    }
    if let Some(v) = payload.term_months {
        cli.term_months = Some(v);
    }
    if let Some(v) = payload.extra_payment {
        cli.extra_payment = v;
    }
    if let Some(v) = payload.zero_rate_policy {
        cli.zero_rate_policy = v.into();
    }

    build_params(cli)
}

fn default_cli_for_api() -> Cli {
    Cli {
        principal: 10_000.0,
        annual_rate: 5.0,
        term_years: 5.0,
        term_months: None,
        extra_payment: 0.0,
        zero_rate_policy: CliZeroRatePolicy::Straight,
    }
}

fn build_amortize_response(params: &LoanParameters) -> AmortizeResponse {
    let comparison = compare_loan(params);
    let balance_series = balance_series(&comparison.standard, &comparison.accelerated);
    AmortizeResponse {
        principal: params.principal,
        annual_rate: params.annual_rate_percent,
        term_months: params.term_months,
        extra_payment: params.extra_monthly_payment,
        zero_rate_policy: params.zero_rate_policy,
        comparison,
        balance_series,
    }
}
