//! Month-end balance sheet

use crate::calendar::YearMonth;
use serde::Serialize;

/// Entity names behind a snapshot's vector fields, in column order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotLayout {
    pub loans: Vec<String>,
    pub savings: Vec<String>,
    pub retirement: Vec<String>,
}

impl SnapshotLayout {
    pub const MONTH: &'static str = "month";
    pub const TOTAL_WEALTH: &'static str = "total_wealth";
    pub const MORTGAGE: &'static str = "mortgage_balance";
    pub const BROKERAGE: &'static str = "brokerage_balance";
    pub const LOAN_PREFIX: &'static str = "loan:";
    pub const SAVINGS_PREFIX: &'static str = "savings:";
    pub const RETIREMENT_PREFIX: &'static str = "retirement:";

    /// Full CSV header in documented order
    pub fn column_names(&self) -> Vec<String> {
        let mut columns = vec![
            Self::MONTH.to_string(),
            Self::TOTAL_WEALTH.to_string(),
            Self::MORTGAGE.to_string(),
        ];
        columns.extend(self.loans.iter().map(|n| format!("{}{}", Self::LOAN_PREFIX, n)));
        columns.extend(self.savings.iter().map(|n| format!("{}{}", Self::SAVINGS_PREFIX, n)));
        columns.extend(
            self.retirement
                .iter()
                .map(|n| format!("{}{}", Self::RETIREMENT_PREFIX, n)),
        );
        columns.push(Self::BROKERAGE.to_string());
        columns
    }

    pub fn column_count(&self) -> usize {
        4 + self.loans.len() + self.savings.len() + self.retirement.len()
    }
}

/// Balances at the end of one month
///
/// `total_wealth` is derived: assets minus liabilities, recomputed whenever a
/// snapshot is assembled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WealthSnapshot {
    pub month: YearMonth,
    pub total_wealth: f64,
    pub mortgage_balance: f64,
    pub other_loan_balances: Vec<f64>,
    pub savings_balances: Vec<f64>,
    pub retirement_balances: Vec<f64>,
    pub brokerage_balance: f64,
}

impl WealthSnapshot {
    /// Build a snapshot and compute its total
    pub fn assemble(
        month: YearMonth,
        mortgage_balance: f64,
        other_loan_balances: Vec<f64>,
        savings_balances: Vec<f64>,
        retirement_balances: Vec<f64>,
        brokerage_balance: f64,
    ) -> Self {
        let mut snapshot = Self {
            month,
            total_wealth: 0.0,
            mortgage_balance,
            other_loan_balances,
            savings_balances,
            retirement_balances,
            brokerage_balance,
        };
        snapshot.total_wealth = snapshot.compute_total();
        snapshot
    }

    pub fn total_assets(&self) -> f64 {
        self.savings_balances.iter().sum::<f64>()
            + self.retirement_balances.iter().sum::<f64>()
            + self.brokerage_balance
    }

    pub fn total_liabilities(&self) -> f64 {
        self.mortgage_balance + self.other_loan_balances.iter().sum::<f64>()
    }

    /// Assets minus liabilities from the individual balances
    pub fn compute_total(&self) -> f64 {
        self.total_assets() - self.total_liabilities()
    }

    /// Whether the stored total agrees with the balances
    pub fn is_balanced(&self, tolerance: f64) -> bool {
        (self.total_wealth - self.compute_total()).abs() <= tolerance
    }

    /// Same balances relabeled to `month`
    pub fn carried_forward(&self, month: YearMonth) -> Self {
        Self {
            month,
            ..self.clone()
        }
    }

    pub fn matches_layout(&self, layout: &SnapshotLayout) -> bool {
        self.other_loan_balances.len() == layout.loans.len()
            && self.savings_balances.len() == layout.savings.len()
            && self.retirement_balances.len() == layout.retirement.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn month(label: &str) -> YearMonth {
        label.parse().unwrap()
    }

    #[test]
    fn test_total_wealth_is_signed_sum() {
        let snapshot = WealthSnapshot::assemble(
            month("10-2026"),
            250_000.0,
            vec![30_000.0, 5_000.0],
            vec![12_000.0],
            vec![80_000.0, 9_000.0],
            19_000.0,
        );

        assert_relative_eq!(snapshot.total_assets(), 120_000.0);
        assert_relative_eq!(snapshot.total_liabilities(), 285_000.0);
        assert_relative_eq!(snapshot.total_wealth, -165_000.0);
        assert!(snapshot.is_balanced(1e-9));
    }

    #[test]
    fn test_carried_forward_keeps_balances() {
        let snapshot =
            WealthSnapshot::assemble(month("10-2026"), 1.0, vec![], vec![2.0], vec![], 3.0);
        let next = snapshot.carried_forward(month("11-2026"));

        assert_eq!(next.month, month("11-2026"));
        assert_eq!(next.total_wealth, snapshot.total_wealth);
        assert_eq!(next.savings_balances, snapshot.savings_balances);
    }

    #[test]
    fn test_column_names_order() {
        let layout = SnapshotLayout {
            loans: vec!["student_loans".into(), "car_loan".into()],
            savings: vec!["emergency".into()],
            retirement: vec!["401k".into()],
        };

        assert_eq!(
            layout.column_names(),
            vec![
                "month",
                "total_wealth",
                "mortgage_balance",
                "loan:student_loans",
                "loan:car_loan",
                "savings:emergency",
                "retirement:401k",
                "brokerage_balance",
            ]
        );
        assert_eq!(layout.column_count(), 8);
    }
}
