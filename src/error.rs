//! Error and warning types shared across the forecast pipeline

use crate::calendar::YearMonth;
use std::fmt;
use thiserror::Error;

/// Fatal construction-time errors
///
/// These are raised before any simulation work begins and always propagate
/// to the caller.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ForecastError {
    /// Malformed or missing configuration field, or an out-of-range value
    #[error("invalid configuration for `{field}`: {reason}")]
    InvalidConfig { field: String, reason: String },

    /// Loan term must be between one month and one hundred years
    #[error("invalid loan term: {term_months} months (must be 1 to 1200)")]
    InvalidTerm { term_months: i64 },

    /// Month label could not be parsed as a calendar year-month
    #[error("invalid month `{value}`: expected MM-YYYY")]
    InvalidDate { value: String },
}

impl ForecastError {
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ForecastError::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Non-fatal conditions raised while the monthly loop runs
#[derive(Debug, Clone, PartialEq)]
pub enum ForecastWarning {
    /// The mortgage schedule has no row for this month; the month was carried forward
    MissingScheduleRow { month: YearMonth },
}

impl fmt::Display for ForecastWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForecastWarning::MissingScheduleRow { month } => write!(
                f,
                "no amortization row for {}; month carried forward unchanged",
                month
            ),
        }
    }
}

/// Errors at the snapshot/report file boundary
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed snapshot file: {0}")]
    Malformed(String),

    #[error(transparent)]
    Forecast(#[from] ForecastError),
}
