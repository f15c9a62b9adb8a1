//! Salary and paycheck arithmetic feeding account contributions

use crate::error::ForecastError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Paycheck cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PaySchedule {
    Weekly,
    Biweekly,
    Semimonthly,
    Monthly,
}

impl PaySchedule {
    /// Number of paychecks in a year
    pub fn paychecks_per_year(&self) -> u32 {
        match self {
            PaySchedule::Weekly => 52,
            PaySchedule::Biweekly => 26,
            PaySchedule::Semimonthly => 24,
            PaySchedule::Monthly => 12,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaySchedule::Weekly => "weekly",
            PaySchedule::Biweekly => "biweekly",
            PaySchedule::Semimonthly => "semimonthly",
            PaySchedule::Monthly => "monthly",
        }
    }
}

impl FromStr for PaySchedule {
    type Err = ForecastError;

    /// Lenient match: "bi-weekly", "Every two weeks (biweekly)" etc.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        if lower.contains("bi") {
            Ok(PaySchedule::Biweekly)
        } else if lower.contains("semi") {
            Ok(PaySchedule::Semimonthly)
        } else if lower.contains("week") {
            Ok(PaySchedule::Weekly)
        } else if lower.contains("month") {
            Ok(PaySchedule::Monthly)
        } else {
            Err(ForecastError::invalid_config(
                "income.pay_schedule",
                format!("unknown pay schedule `{}`", s),
            ))
        }
    }
}

impl TryFrom<String> for PaySchedule {
    type Error = ForecastError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PaySchedule> for String {
    fn from(value: PaySchedule) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for PaySchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One earner's salary
#[derive(Debug, Clone, PartialEq)]
pub struct Income {
    /// Identifier referenced by accounts
    pub name: String,

    /// Annual gross salary
    pub base_salary: f64,

    /// Paycheck cadence
    pub pay_schedule: PaySchedule,

    /// Pre-tax deductions per paycheck other than retirement (health, HSA, ...)
    pub pre_tax_deductions: f64,

    /// Pre-tax employer-plan contribution as a fraction of gross pay
    pub retirement_contribution_rate: f64,
}

impl Income {
    pub fn new(
        name: impl Into<String>,
        base_salary: f64,
        pay_schedule: PaySchedule,
        pre_tax_deductions: f64,
        retirement_contribution_rate: f64,
    ) -> Result<Self, ForecastError> {
        let name = name.into();
        if !(base_salary >= 0.0) {
            return Err(ForecastError::invalid_config(
                format!("income.{}.base_salary", name),
                "must be non-negative",
            ));
        }
        if !(0.0..=1.0).contains(&retirement_contribution_rate) {
            return Err(ForecastError::invalid_config(
                format!("income.{}.retirement_contribution_rate", name),
                "must be between 0 and 1",
            ));
        }
        if !(pre_tax_deductions >= 0.0) {
            return Err(ForecastError::invalid_config(
                format!("income.{}.pre_tax_deductions", name),
                "must be non-negative",
            ));
        }

        Ok(Self {
            name,
            base_salary,
            pay_schedule,
            pre_tax_deductions,
            retirement_contribution_rate,
        })
    }

    /// Gross pay per paycheck
    pub fn paycheck_gross(&self) -> f64 {
        self.base_salary / self.pay_schedule.paychecks_per_year() as f64
    }

    /// Taxable pay per paycheck after pre-tax deductions and retirement deferral
    pub fn paycheck_taxable(&self) -> f64 {
        let gross = self.paycheck_gross();
        gross - self.pre_tax_deductions - gross * self.retirement_contribution_rate
    }

    /// Taxable income averaged over a calendar month
    pub fn monthly_taxable(&self) -> f64 {
        self.paycheck_taxable() * self.pay_schedule.paychecks_per_year() as f64 / 12.0
    }

    pub fn monthly_base_salary(&self) -> f64 {
        self.base_salary / 12.0
    }

    /// Monthly net pay at a single marginal tax rate
    pub fn monthly_take_home(&self, marginal_tax_rate: f64) -> f64 {
        self.monthly_taxable() * (1.0 - marginal_tax_rate)
    }
}
