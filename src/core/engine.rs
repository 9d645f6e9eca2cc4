use super::types::{
    AmortizationResult, BalancePoint, LoanComparison, LoanParameters, ScheduleEntry,
    ZeroRatePolicy,
};

// Residual balance below this fraction of the principal is rounding error, not debt.
const RESIDUAL_TOLERANCE: f64 = 1e-9;

pub fn monthly_rate(annual_rate_percent: f64) -> f64 {
    annual_rate_percent / 100.0 / 12.0
}

pub fn compute_monthly_payment(
    principal: f64,
    annual_rate_percent: f64,
    term_months: u32,
    zero_rate_policy: ZeroRatePolicy,
) -> f64 {
    fixed_payment(
        principal,
        monthly_rate(annual_rate_percent),
        term_months,
        zero_rate_policy,
    )
}

pub fn build_schedule(
    principal: f64,
    monthly_rate: f64,
    term_months: u32,
    extra_payment: f64,
    zero_rate_policy: ZeroRatePolicy,
) -> Vec<ScheduleEntry> {
    let payment = fixed_payment(principal, monthly_rate, term_months, zero_rate_policy);
    let residual_tolerance = RESIDUAL_TOLERANCE * principal.abs().max(1.0);

    let mut schedule = Vec::new();
    let mut balance = principal;
    let mut cumulative_interest = 0.0;
    let mut cumulative_paid = 0.0;

    // The term bound is the only exit for a schedule whose payment never covers interest.
    for month in 1..=term_months {
        if balance.is_nan() || balance <= 0.0 {
            break;
        }

        let interest_portion = balance * monthly_rate;
        let mut principal_portion = payment - interest_portion + extra_payment;
        if principal_portion > balance {
            principal_portion = balance;
        }

        balance -= principal_portion;
        if balance <= residual_tolerance {
            principal_portion += balance;
            balance = 0.0;
        }

        cumulative_interest += interest_portion;
        cumulative_paid += principal_portion + interest_portion;

        schedule.push(ScheduleEntry {
            month,
            payment_total: principal_portion + interest_portion,
            principal_portion,
            interest_portion,
            remaining_balance: balance,
            cumulative_interest,
            cumulative_paid,
        });
    }

    schedule
}

pub fn amortize(params: &LoanParameters) -> AmortizationResult {
    let rate = monthly_rate(params.annual_rate_percent);
    AmortizationResult {
        monthly_payment: fixed_payment(
            params.principal,
            rate,
            params.term_months,
            params.zero_rate_policy,
        ),
        schedule: build_schedule(
            params.principal,
            rate,
            params.term_months,
            params.extra_monthly_payment,
            params.zero_rate_policy,
        ),
    }
}

pub fn compare_loan(params: &LoanParameters) -> LoanComparison {
    let standard = amortize(&LoanParameters {
        extra_monthly_payment: 0.0,
        ..*params
    });
    let accelerated = amortize(params);

    let total_payment = standard
        .schedule
        .last()
        .map_or(0.0, |entry| entry.cumulative_paid);
    let total_interest = standard
        .schedule
        .last()
        .map_or(0.0, |entry| entry.cumulative_interest);
    let accelerated_interest = accelerated
        .schedule
        .last()
        .map_or(0.0, |entry| entry.cumulative_interest);
    let payoff_years = accelerated.schedule.len() as f64 / 12.0;

    LoanComparison {
        monthly_payment: standard.monthly_payment,
        total_payment,
        total_interest,
        payoff_years,
        time_saved_years: params.term_months as f64 / 12.0 - payoff_years,
        interest_saved: total_interest - accelerated_interest,
        standard: standard.schedule,
        accelerated: accelerated.schedule,
    }
}

pub fn balance_series(
    standard: &[ScheduleEntry],
    accelerated: &[ScheduleEntry],
) -> Vec<BalancePoint> {
    let months = standard.len().max(accelerated.len());
    (0..months)
        .map(|idx| BalancePoint {
            month: idx as u32 + 1,
            standard: standard.get(idx).map(|entry| entry.remaining_balance),
            accelerated: accelerated.get(idx).map(|entry| entry.remaining_balance),
        })
        .collect()
}

fn fixed_payment(
    principal: f64,
    monthly_rate: f64,
    term_months: u32,
    zero_rate_policy: ZeroRatePolicy,
) -> f64 {
    if term_months == 0 {
        return 0.0;
    }

    let months = term_months as f64;
    // (1+r)^n - 1 via ln_1p/exp_m1; the naive form cancels to noise for tiny r.
    let growth_minus_one = (months * monthly_rate.ln_1p()).exp_m1();
    let payment = if monthly_rate == 0.0 || growth_minus_one == 0.0 {
        match zero_rate_policy {
            ZeroRatePolicy::Straight => principal / months,
            ZeroRatePolicy::Legacy => 0.0,
        }
    } else {
        principal * monthly_rate * (growth_minus_one + 1.0) / growth_minus_one
    };

    if payment.is_finite() { payment } else { 0.0 }
}
