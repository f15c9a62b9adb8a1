//! Growth accounts: savings, retirement and brokerage

use super::GrowthAccount;
use crate::error::ForecastError;
use crate::income::Income;
use serde::{Deserialize, Serialize};

/// Most incomes a single savings account can draw from
pub const MAX_CONTRIBUTION_LINKS: usize = 2;

/// Contribution settings for one income feeding a savings account
///
/// A non-zero percentage takes precedence over the fixed amount; the
/// percentage is applied to the income's monthly taxable pay.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ContributionTerms {
    pub contribution: f64,
    pub contribution_percent: f64,
    pub withdrawal: f64,
    pub withdrawal_percent: f64,
    /// Replaces the base contribution in the first simulated month
    pub one_time_contribution: f64,
    /// Replaces the base withdrawal in the first simulated month
    pub one_time_withdrawal: f64,
}

/// A resolved income-to-account flow in fixed monthly amounts
#[derive(Debug, Clone, PartialEq)]
pub struct ContributionLink {
    pub income: String,
    pub contribution: f64,
    pub withdrawal: f64,
    pub one_time_contribution: f64,
    pub one_time_withdrawal: f64,
}

impl ContributionLink {
    pub fn new(income: &Income, terms: &ContributionTerms) -> Result<Self, ForecastError> {
        let amounts = [
            ("contribution", terms.contribution),
            ("contribution_percent", terms.contribution_percent),
            ("withdrawal", terms.withdrawal),
            ("withdrawal_percent", terms.withdrawal_percent),
            ("one_time_contribution", terms.one_time_contribution),
            ("one_time_withdrawal", terms.one_time_withdrawal),
        ];
        for (field, value) in amounts {
            if !value.is_finite() || value < 0.0 {
                return Err(ForecastError::invalid_config(
                    format!("savings.{}.{}", income.name, field),
                    "must be non-negative",
                ));
            }
        }

        let taxable = income.monthly_taxable();
        let resolve = |fixed: f64, percent: f64| {
            if percent > 0.0 {
                taxable * percent
            } else {
                fixed
            }
        };

        Ok(Self {
            income: income.name.clone(),
            contribution: resolve(terms.contribution, terms.contribution_percent),
            withdrawal: resolve(terms.withdrawal, terms.withdrawal_percent),
            one_time_contribution: terms.one_time_contribution,
            one_time_withdrawal: terms.one_time_withdrawal,
        })
    }

    /// Net deposit for a simulated month (1-based)
    pub fn net_for(&self, month_index: u32) -> f64 {
        let first = month_index == 1;
        let contribution = if first && self.one_time_contribution > 0.0 {
            self.one_time_contribution
        } else {
            self.contribution
        };
        let withdrawal = if first && self.one_time_withdrawal > 0.0 {
            self.one_time_withdrawal
        } else {
            self.withdrawal
        };
        contribution - withdrawal
    }
}

fn check_rate(field: String, rate: f64) -> Result<(), ForecastError> {
    if !rate.is_finite() || rate < 0.0 {
        return Err(ForecastError::invalid_config(field, "must be non-negative"));
    }
    Ok(())
}

fn check_balance(field: String, balance: f64) -> Result<(), ForecastError> {
    if !balance.is_finite() {
        return Err(ForecastError::invalid_config(field, "must be a finite number"));
    }
    Ok(())
}

/// Interest-bearing cash account funded from up to two incomes
#[derive(Debug, Clone, PartialEq)]
pub struct SavingsAccount {
    pub name: String,
    pub balance: f64,
    pub annual_interest_rate: f64,
    pub links: Vec<ContributionLink>,
}

impl SavingsAccount {
    pub fn new(
        name: impl Into<String>,
        balance: f64,
        annual_interest_rate: f64,
        links: Vec<ContributionLink>,
    ) -> Result<Self, ForecastError> {
        let name = name.into();
        check_balance(format!("savings.{}.balance", name), balance)?;
        check_rate(format!("savings.{}.interest_rate", name), annual_interest_rate)?;
        if links.len() > MAX_CONTRIBUTION_LINKS {
            return Err(ForecastError::invalid_config(
                format!("savings.{}.contributions", name),
                format!(
                    "{} incomes linked, at most {} allowed",
                    links.len(),
                    MAX_CONTRIBUTION_LINKS
                ),
            ));
        }

        Ok(Self {
            name,
            balance,
            annual_interest_rate,
            links,
        })
    }
}

impl GrowthAccount for SavingsAccount {
    fn name(&self) -> &str {
        &self.name
    }

    fn opening_balance(&self) -> f64 {
        self.balance
    }

    fn annual_rate(&self) -> f64 {
        self.annual_interest_rate
    }

    fn monthly_contribution(&self, month_index: u32) -> f64 {
        self.links.iter().map(|link| link.net_for(month_index)).sum()
    }
}

/// How retirement contributions are computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetirementKind {
    /// Employer plan: employee and employer shares of base salary
    EmployerSponsored,
    /// Individual post-tax account: share of taxable income
    Individual,
}

/// Tax-advantaged account tied to one income
#[derive(Debug, Clone, PartialEq)]
pub struct RetirementAccount {
    pub name: String,
    pub kind: RetirementKind,
    pub balance: f64,
    pub annual_return: f64,
    pub income: String,

    /// Resolved monthly deposits
    pub employee_contribution: f64,
    pub employer_contribution: f64,
}

impl RetirementAccount {
    /// Employer plan; both shares are fractions of the monthly base salary
    pub fn employer_sponsored(
        name: impl Into<String>,
        balance: f64,
        annual_return: f64,
        income: &Income,
        employee_percent: f64,
        employer_percent: f64,
    ) -> Result<Self, ForecastError> {
        let name = name.into();
        check_balance(format!("retirement.{}.balance", name), balance)?;
        check_rate(format!("retirement.{}.annual_return", name), annual_return)?;
        check_rate(format!("retirement.{}.employee_percent", name), employee_percent)?;
        check_rate(format!("retirement.{}.employer_percent", name), employer_percent)?;

        let monthly_salary = income.monthly_base_salary();
        Ok(Self {
            name,
            kind: RetirementKind::EmployerSponsored,
            balance,
            annual_return,
            income: income.name.clone(),
            employee_contribution: monthly_salary * employee_percent,
            employer_contribution: monthly_salary * employer_percent,
        })
    }

    /// Individual account funded from monthly taxable income
    pub fn individual(
        name: impl Into<String>,
        balance: f64,
        annual_return: f64,
        income: &Income,
        contribution_percent: f64,
    ) -> Result<Self, ForecastError> {
        let name = name.into();
        check_balance(format!("retirement.{}.balance", name), balance)?;
        check_rate(format!("retirement.{}.annual_return", name), annual_return)?;
        check_rate(
            format!("retirement.{}.contribution_percent", name),
            contribution_percent,
        )?;

        Ok(Self {
            name,
            kind: RetirementKind::Individual,
            balance,
            annual_return,
            income: income.name.clone(),
            employee_contribution: income.monthly_taxable() * contribution_percent,
            employer_contribution: 0.0,
        })
    }
}

impl GrowthAccount for RetirementAccount {
    fn name(&self) -> &str {
        &self.name
    }

    fn opening_balance(&self) -> f64 {
        self.balance
    }

    fn annual_rate(&self) -> f64 {
        self.annual_return
    }

    fn monthly_contribution(&self, _month_index: u32) -> f64 {
        self.employee_contribution + self.employer_contribution
    }
}

/// Taxable investment account; the sink for freed-up debt payments
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BrokerageAccount {
    pub balance: f64,
    pub annual_return: f64,
}

impl BrokerageAccount {
    pub const NAME: &'static str = "brokerage";

    pub fn new(balance: f64, annual_return: f64) -> Result<Self, ForecastError> {
        check_balance("brokerage.balance".to_string(), balance)?;
        check_rate("brokerage.annual_return".to_string(), annual_return)?;
        Ok(Self {
            balance,
            annual_return,
        })
    }
}

impl GrowthAccount for BrokerageAccount {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn opening_balance(&self) -> f64 {
        self.balance
    }

    fn annual_rate(&self) -> f64 {
        self.annual_return
    }

    /// Funded only by redirected debt payments
    fn monthly_contribution(&self, _month_index: u32) -> f64 {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::income::PaySchedule;
    use approx::assert_relative_eq;

    fn monthly_income(name: &str, salary: f64) -> Income {
        Income::new(name, salary, PaySchedule::Monthly, 0.0, 0.0).unwrap()
    }

    #[test]
    fn test_percentage_wins_over_fixed_contribution() {
        let income = monthly_income("ben", 120_000.0);
        let terms = ContributionTerms {
            contribution: 250.0,
            contribution_percent: 0.05,
            ..Default::default()
        };
        let link = ContributionLink::new(&income, &terms).unwrap();
        assert_relative_eq!(link.contribution, 500.0);

        let fixed = ContributionLink::new(
            &income,
            &ContributionTerms {
                contribution: 250.0,
                ..Default::default()
            },
        )
        .unwrap();
        assert_relative_eq!(fixed.contribution, 250.0);
    }

    #[test]
    fn test_one_time_amounts_apply_to_first_month() {
        let income = monthly_income("ben", 120_000.0);
        let link = ContributionLink::new(
            &income,
            &ContributionTerms {
                contribution: 300.0,
                withdrawal: 50.0,
                one_time_contribution: 1_000.0,
                ..Default::default()
            },
        )
        .unwrap();

        assert_relative_eq!(link.net_for(1), 950.0);
        assert_relative_eq!(link.net_for(2), 250.0);
    }

    #[test]
    fn test_savings_sums_links_and_caps_count() {
        let a = monthly_income("ben", 120_000.0);
        let b = monthly_income("nadia", 60_000.0);
        let link = |income: &Income, amount: f64| {
            ContributionLink::new(
                income,
                &ContributionTerms {
                    contribution: amount,
                    ..Default::default()
                },
            )
            .unwrap()
        };

        let savings = SavingsAccount::new(
            "emergency",
            10_000.0,
            0.045,
            vec![link(&a, 200.0), link(&b, 100.0)],
        )
        .unwrap();
        assert_relative_eq!(savings.monthly_contribution(3), 300.0);
        assert_relative_eq!(savings.monthly_return(10_000.0), 37.5);

        let err = SavingsAccount::new(
            "emergency",
            0.0,
            0.045,
            vec![link(&a, 1.0), link(&b, 1.0), link(&a, 1.0)],
        )
        .unwrap_err();
        assert!(matches!(err, ForecastError::InvalidConfig { .. }));
    }

    #[test]
    fn test_employer_plan_uses_base_salary() {
        let income = Income::new("ben", 165_000.0, PaySchedule::Biweekly, 363.11, 0.135).unwrap();
        let plan =
            RetirementAccount::employer_sponsored("401k", 50_000.0, 0.07, &income, 0.135, 0.05)
                .unwrap();

        assert_relative_eq!(plan.employee_contribution, 13_750.0 * 0.135);
        assert_relative_eq!(plan.employer_contribution, 13_750.0 * 0.05);
        assert_relative_eq!(plan.monthly_contribution(1), 13_750.0 * 0.185);
    }

    #[test]
    fn test_individual_account_uses_taxable_income() {
        let income = monthly_income("nadia", 90_000.0);
        let roth = RetirementAccount::individual("roth", 8_000.0, 0.06, &income, 0.1).unwrap();

        assert_eq!(roth.kind, RetirementKind::Individual);
        assert_relative_eq!(roth.monthly_contribution(1), 750.0);
        assert_eq!(roth.employer_contribution, 0.0);
    }

    #[test]
    fn test_brokerage_has_no_scheduled_contribution() {
        let brokerage = BrokerageAccount::new(19_000.0, 0.045).unwrap();
        assert_eq!(brokerage.monthly_contribution(1), 0.0);
        assert_relative_eq!(brokerage.monthly_return(19_000.0), 71.25);
        assert!(BrokerageAccount::new(1.0, -0.1).is_err());
    }
}
