//! Month-by-month wealth forecast with waterfall debt redirection

mod engine;
mod result;
mod snapshot;
mod state;
pub mod waterfall;

pub use engine::{ForecastConfig, ForecastEngine, MonthStep};
pub use result::{ForecastResult, ForecastSummary, Payoff};
pub use snapshot::{SnapshotLayout, WealthSnapshot};
pub use state::LiabilityState;
