use super::snapshot::WealthSnapshot;
use crate::calendar::YearMonth;
use crate::error::ForecastWarning;
use serde::Serialize;

/// A liability reaching zero during a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payoff {
    pub name: String,
    pub month: YearMonth,
}

/// Output of a forecast run
#[derive(Debug, Clone)]
pub struct ForecastResult {
    /// Balances the run started from
    pub opening: WealthSnapshot,

    /// One snapshot per simulated month
    pub snapshots: Vec<WealthSnapshot>,

    /// Non-fatal conditions met along the way
    pub warnings: Vec<ForecastWarning>,

    /// Liabilities paid off during the run, in the order they were cleared
    pub payoffs: Vec<Payoff>,

    /// Cash the waterfall sent to the brokerage over the whole run
    pub redirected_total: f64,
}

impl ForecastResult {
    pub fn new(opening: WealthSnapshot) -> Self {
        Self {
            opening,
            snapshots: Vec::new(),
            warnings: Vec::new(),
            payoffs: Vec::new(),
            redirected_total: 0.0,
        }
    }

    pub fn add_snapshot(&mut self, snapshot: WealthSnapshot) {
        self.snapshots.push(snapshot);
    }

    /// Last simulated snapshot, or the opening one for an empty run
    pub fn final_snapshot(&self) -> &WealthSnapshot {
        self.snapshots.last().unwrap_or(&self.opening)
    }

    /// Opening snapshot followed by every simulated month
    pub fn all_snapshots(&self) -> impl Iterator<Item = &WealthSnapshot> {
        std::iter::once(&self.opening).chain(self.snapshots.iter())
    }

    pub fn payoff_month(&self, name: &str) -> Option<YearMonth> {
        self.payoffs.iter().find(|p| p.name == name).map(|p| p.month)
    }

    /// Get summary statistics
    pub fn summary(&self) -> ForecastSummary {
        let last = self.final_snapshot();
        ForecastSummary {
            total_months: self.snapshots.len() as u32,
            first_month: self.snapshots.first().map(|s| s.month),
            final_month: last.month,
            opening_wealth: self.opening.total_wealth,
            final_wealth: last.total_wealth,
            wealth_change: last.total_wealth - self.opening.total_wealth,
            final_liabilities: last.total_liabilities(),
            redirected_total: self.redirected_total,
            payoffs: self.payoffs.len(),
            warnings: self.warnings.len(),
        }
    }
}

/// Summary statistics for a forecast
#[derive(Debug, Clone, Serialize)]
pub struct ForecastSummary {
    pub total_months: u32,
    pub first_month: Option<YearMonth>,
    pub final_month: YearMonth,
    pub opening_wealth: f64,
    pub final_wealth: f64,
    pub wealth_change: f64,
    pub final_liabilities: f64,
    pub redirected_total: f64,
    pub payoffs: usize,
    pub warnings: usize,
}
