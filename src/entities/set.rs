use super::{
    BrokerageAccount, GrowthAccount, Liability, Loan, Mortgage, RetirementAccount, SavingsAccount,
};
use crate::calendar::YearMonth;
use crate::error::ForecastError;
use crate::forecast::{SnapshotLayout, WealthSnapshot};
use std::collections::HashSet;

/// Every entity taking part in one forecast
#[derive(Debug, Clone, Default)]
pub struct EntitySet {
    /// Highest-priority liability when present
    pub mortgage: Option<Mortgage>,

    /// Remaining liabilities in payoff priority order
    pub loans: Vec<Loan>,

    pub savings: Vec<SavingsAccount>,
    pub retirement: Vec<RetirementAccount>,
    pub brokerage: BrokerageAccount,
}

fn check_unique<'a>(
    group: &str,
    names: impl IntoIterator<Item = &'a str>,
) -> Result<(), ForecastError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(ForecastError::invalid_config(
                group,
                format!("duplicate name `{}`", name),
            ));
        }
    }
    Ok(())
}

impl EntitySet {
    pub fn new(
        mortgage: Option<Mortgage>,
        loans: Vec<Loan>,
        savings: Vec<SavingsAccount>,
        retirement: Vec<RetirementAccount>,
        brokerage: BrokerageAccount,
    ) -> Result<Self, ForecastError> {
        let set = Self {
            mortgage,
            loans,
            savings,
            retirement,
            brokerage,
        };
        set.validate()?;
        Ok(set)
    }

    fn validate(&self) -> Result<(), ForecastError> {
        if self.loans.iter().any(|l| l.name == Mortgage::NAME) {
            return Err(ForecastError::invalid_config(
                "loans",
                format!("`{}` is reserved for the mortgage", Mortgage::NAME),
            ));
        }
        check_unique("loans", self.loans.iter().map(|l| l.name.as_str()))?;
        check_unique("savings", self.savings.iter().map(|s| s.name.as_str()))?;
        check_unique("retirement", self.retirement.iter().map(|r| r.name.as_str()))?;
        Ok(())
    }

    /// Liabilities in payoff priority order: the mortgage, then the loans
    pub fn liabilities(&self) -> Vec<&dyn Liability> {
        let mut out: Vec<&dyn Liability> = Vec::with_capacity(self.loans.len() + 1);
        if let Some(mortgage) = &self.mortgage {
            out.push(mortgage);
        }
        out.extend(self.loans.iter().map(|l| l as &dyn Liability));
        out
    }

    /// Reorder loans so the named ones come first, in the given order
    ///
    /// Loans not named keep their relative order after the named ones.
    pub fn prioritize_loans(&mut self, order: &[String]) -> Result<(), ForecastError> {
        check_unique("forecast.payoff_priority", order.iter().map(String::as_str))?;
        if let Some(unknown) = order.iter().find(|n| !self.loans.iter().any(|l| &l.name == *n)) {
            return Err(ForecastError::invalid_config(
                "forecast.payoff_priority",
                format!("unknown loan `{}`", unknown),
            ));
        }

        // Stable sort: unnamed loans rank after every named one
        let rank = |loan: &Loan| {
            order
                .iter()
                .position(|n| *n == loan.name)
                .unwrap_or(order.len())
        };
        self.loans.sort_by_key(|l| rank(l));
        Ok(())
    }

    pub fn loan_mut(&mut self, name: &str) -> Option<&mut Loan> {
        self.loans.iter_mut().find(|l| l.name == name)
    }

    /// Column names behind a snapshot's vector fields
    pub fn layout(&self) -> SnapshotLayout {
        SnapshotLayout {
            loans: self.loans.iter().map(|l| l.name.clone()).collect(),
            savings: self.savings.iter().map(|s| s.name.clone()).collect(),
            retirement: self.retirement.iter().map(|r| r.name.clone()).collect(),
        }
    }

    /// Snapshot of the configured opening balances
    pub fn opening_snapshot(&self, month: YearMonth) -> WealthSnapshot {
        WealthSnapshot::assemble(
            month,
            self.mortgage
                .as_ref()
                .map(|m| m.opening_balance())
                .unwrap_or(0.0),
            self.loans.iter().map(|l| l.opening_balance()).collect(),
            self.savings.iter().map(|s| s.opening_balance()).collect(),
            self.retirement.iter().map(|r| r.opening_balance()).collect(),
            self.brokerage.opening_balance(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{LoanTerms, MortgageCosts};
    use approx::assert_relative_eq;

    fn loan(name: &str, balance: f64) -> Loan {
        let terms = LoanTerms::new(balance, 0.05, 60, "01-2023")
            .unwrap()
            .with_monthly_payment(300.0);
        Loan::new(name, terms).unwrap()
    }

    fn household() -> EntitySet {
        let mortgage = Mortgage::new(
            LoanTerms::new(320_100.0, 0.0299, 360, "08-2020")
                .unwrap()
                .with_current_principal(289_500.0),
            MortgageCosts {
                monthly_escrow: 697.33,
                recorded_property_value: 345_000.0,
                monthly_mortgage_insurance: 95.0,
            },
        )
        .unwrap();
        let savings = SavingsAccount::new("emergency", 12_000.0, 0.04, vec![]).unwrap();

        EntitySet::new(
            Some(mortgage),
            vec![loan("student_loans", 40_000.0), loan("car_loan", 12_700.0)],
            vec![savings],
            vec![],
            BrokerageAccount::new(19_000.0, 0.045).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_liabilities_in_priority_order() {
        let set = household();
        let names: Vec<&str> = set.liabilities().iter().map(|l| l.name()).collect();
        assert_eq!(names, vec!["mortgage", "student_loans", "car_loan"]);
    }

    #[test]
    fn test_prioritize_loans() {
        let mut set = household();
        set.prioritize_loans(&["car_loan".to_string()]).unwrap();
        assert_eq!(set.layout().loans, vec!["car_loan", "student_loans"]);

        let err = set.prioritize_loans(&["boat".to_string()]).unwrap_err();
        assert!(matches!(err, ForecastError::InvalidConfig { .. }));
        assert_eq!(set.loans.len(), 2);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = EntitySet::new(
            None,
            vec![loan("car_loan", 1.0), loan("car_loan", 2.0)],
            vec![],
            vec![],
            BrokerageAccount::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ForecastError::InvalidConfig { .. }));

        let reserved = EntitySet::new(
            None,
            vec![loan("mortgage", 1.0)],
            vec![],
            vec![],
            BrokerageAccount::default(),
        );
        assert!(reserved.is_err());
    }

    #[test]
    fn test_opening_snapshot_totals() {
        let set = household();
        let snapshot = set.opening_snapshot("10-2026".parse().unwrap());

        assert_eq!(snapshot.mortgage_balance, 289_500.0);
        assert_eq!(snapshot.other_loan_balances, vec![40_000.0, 12_700.0]);
        assert_relative_eq!(
            snapshot.total_wealth,
            12_000.0 + 19_000.0 - 289_500.0 - 40_000.0 - 12_700.0
        );
        assert!(snapshot.matches_layout(&set.layout()));
    }
}
