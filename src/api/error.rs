use thiserror::Error;

/// Rejected loan input. Messages name the CLI flag; the HTTP layer reuses them verbatim.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum InputError {
    #[error("{flag} must be a finite number")]
    NotFinite { flag: &'static str },

    #[error("--principal must be > 0")]
    NonPositivePrincipal,

    #[error("--annual-rate must be >= 0")]
    NegativeRate,

    #[error("loan term must be between 1 and {max} months, got {months}")]
    TermOutOfRange { months: f64, max: u32 },

    #[error("--extra-payment must be >= 0")]
    NegativeExtraPayment,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("failed to render report: {0}")]
    Render(#[from] serde_json::Error),
}
