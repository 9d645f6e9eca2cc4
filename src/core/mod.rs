mod engine;
mod types;

pub use engine::{
    amortize, balance_series, build_schedule, compare_loan, compute_monthly_payment, monthly_rate,
};
pub use types::{
    AmortizationResult, BalancePoint, LoanComparison, LoanParameters, ScheduleEntry,
    ZeroRatePolicy,
};
