//! Wealth Forecast - monthly household net worth projection
//!
//! This library provides:
//! - Fixed-rate amortization schedules with prepayment, insurance and escrow
//! - Loans, a mortgage, savings, retirement and brokerage accounts
//! - A month-by-month forecast that redirects paid-off debt payments
//!   down a payoff waterfall and finally into the brokerage account
//! - JSON configuration and CSV snapshot persistence
//! - Parallel comparison of prepayment scenarios

pub mod amortization;
pub mod calendar;
pub mod config;
pub mod entities;
pub mod error;
pub mod forecast;
pub mod income;
pub mod scenario;
pub mod store;

// Re-export commonly used types
pub use amortization::{AmortizationSchedule, ScheduleCache, ScheduleTerms};
pub use calendar::YearMonth;
pub use config::{load_plan, Plan};
pub use entities::{EntitySet, Loan, Mortgage};
pub use error::{ForecastError, ForecastWarning, StoreError};
pub use forecast::{ForecastConfig, ForecastEngine, ForecastResult, WealthSnapshot};
pub use income::{Income, PaySchedule};
pub use scenario::{PrepaymentVariant, ScenarioRunner};
