use serde::Serialize;

/// How the payment formula is resolved when the monthly rate is zero and
/// `P·r·(1+r)^n / ((1+r)^n - 1)` degenerates to 0/0.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ZeroRatePolicy {
    /// Straight-line repayment: `principal / term_months`.
    #[default]
    Straight,
    /// Coerce the undefined payment to zero, as the web calculator always did.
    /// The schedule then only ends at the term bound.
    Legacy,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoanParameters {
    pub principal: f64,
    pub annual_rate_percent: f64,
    pub term_months: u32,
    pub extra_monthly_payment: f64,
    pub zero_rate_policy: ZeroRatePolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub month: u32,
    pub payment_total: f64,
    pub principal_portion: f64,
    pub interest_portion: f64,
    pub remaining_balance: f64,
    pub cumulative_interest: f64,
    pub cumulative_paid: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationResult {
    pub monthly_payment: f64,
    pub schedule: Vec<ScheduleEntry>,
}

/// Side-by-side run of the same loan with and without the extra payment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanComparison {
    pub monthly_payment: f64,
    pub total_payment: f64,
    pub total_interest: f64,
    pub payoff_years: f64,
    pub time_saved_years: f64,
    pub interest_saved: f64,
    pub standard: Vec<ScheduleEntry>,
    pub accelerated: Vec<ScheduleEntry>,
}

/// Remaining balance of both schedules at one month. `None` once that
/// schedule has already been paid off.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalancePoint {
    pub month: u32,
    pub standard: Option<f64>,
    pub accelerated: Option<f64>,
}
