//! Raw JSON configuration document
//!
//! Mirrors the file layout one-to-one; conversion into domain types and all
//! cross-field validation happens in the `into_*` methods.

use crate::amortization::ScheduleCache;
use crate::calendar::YearMonth;
use crate::entities::{
    BrokerageAccount, ContributionLink, ContributionTerms, Loan, LoanTerms, Mortgage,
    MortgageCosts, RetirementAccount, SavingsAccount,
};
use crate::error::ForecastError;
use crate::income::{Income, PaySchedule};
use serde::Deserialize;

/// Top-level configuration groups
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigDocument {
    pub forecast: ForecastSection,
    #[serde(default)]
    pub income: Vec<IncomeSection>,
    pub mortgage: Option<MortgageSection>,
    pub student_loans: Option<LoanSection>,
    pub car_loan: Option<LoanSection>,
    #[serde(default)]
    pub investments: InvestmentsSection,
    #[serde(default)]
    pub savings: Vec<SavingsSection>,
    #[serde(default)]
    pub taxes: TaxSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForecastSection {
    pub horizon_months: i64,
    pub start_month: Option<String>,
    #[serde(default)]
    pub payoff_priority: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IncomeSection {
    pub name: String,
    pub base_salary: f64,
    pub pay_schedule: PaySchedule,
    #[serde(default)]
    pub pre_tax_deductions: f64,
    #[serde(default)]
    pub retirement_contribution_rate: f64,
}

impl IncomeSection {
    pub fn into_income(self) -> Result<Income, ForecastError> {
        Income::new(
            self.name,
            self.base_salary,
            self.pay_schedule,
            self.pre_tax_deductions,
            self.retirement_contribution_rate,
        )
    }
}

/// Terms shared by every loan group
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoanSection {
    pub initial_principal: f64,
    pub annual_rate: f64,
    pub term_months: i64,
    pub origination_month: String,
    /// Defaults to the initial principal
    pub current_principal: Option<f64>,
    pub monthly_payment: f64,
    #[serde(default)]
    pub one_time_extra_payment: f64,
    #[serde(default)]
    pub recurring_extra_payment: f64,
}

impl LoanSection {
    fn into_terms(self) -> Result<LoanTerms, ForecastError> {
        let terms = LoanTerms::new(
            self.initial_principal,
            self.annual_rate,
            self.term_months,
            &self.origination_month,
        )?;
        Ok(terms
            .with_current_principal(self.current_principal.unwrap_or(self.initial_principal))
            .with_monthly_payment(self.monthly_payment)
            .with_one_time_extra(self.one_time_extra_payment)
            .with_recurring_extra(self.recurring_extra_payment))
    }

    pub fn into_loan(self, name: &str) -> Result<Loan, ForecastError> {
        Loan::new(name, self.into_terms()?)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MortgageSection {
    pub initial_principal: f64,
    pub annual_rate: f64,
    pub term_months: i64,
    pub origination_month: String,
    pub current_principal: Option<f64>,
    #[serde(default)]
    pub one_time_extra_payment: f64,
    #[serde(default)]
    pub recurring_extra_payment: f64,
    #[serde(default)]
    pub monthly_escrow: f64,
    pub property_value: f64,
    #[serde(default)]
    pub monthly_insurance: f64,
}

impl MortgageSection {
    pub fn into_mortgage(self, cache: &mut ScheduleCache) -> Result<Mortgage, ForecastError> {
        let costs = MortgageCosts {
            monthly_escrow: self.monthly_escrow,
            recorded_property_value: self.property_value,
            monthly_mortgage_insurance: self.monthly_insurance,
        };
        let loan = LoanSection {
            initial_principal: self.initial_principal,
            annual_rate: self.annual_rate,
            term_months: self.term_months,
            origination_month: self.origination_month,
            current_principal: self.current_principal,
            monthly_payment: 0.0,
            one_time_extra_payment: self.one_time_extra_payment,
            recurring_extra_payment: self.recurring_extra_payment,
        };
        Mortgage::with_cache(loan.into_terms()?, costs, cache)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InvestmentsSection {
    /// Default annual return for accounts that do not set their own
    #[serde(default)]
    pub average_return: f64,
    #[serde(default)]
    pub retirement_accounts: Vec<RetirementSection>,
    #[serde(default)]
    pub brokerage: BrokerageSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RetirementSection {
    EmployerSponsored {
        name: String,
        income: String,
        #[serde(default)]
        balance: f64,
        annual_return: Option<f64>,
        employee_percent: f64,
        #[serde(default)]
        employer_percent: f64,
    },
    Individual {
        name: String,
        income: String,
        #[serde(default)]
        balance: f64,
        annual_return: Option<f64>,
        contribution_percent: f64,
    },
}

impl RetirementSection {
    pub fn income(&self) -> &str {
        match self {
            RetirementSection::EmployerSponsored { income, .. }
            | RetirementSection::Individual { income, .. } => income,
        }
    }

    pub fn into_account(
        self,
        income: &Income,
        default_return: f64,
    ) -> Result<RetirementAccount, ForecastError> {
        match self {
            RetirementSection::EmployerSponsored {
                name,
                balance,
                annual_return,
                employee_percent,
                employer_percent,
                ..
            } => RetirementAccount::employer_sponsored(
                name,
                balance,
                annual_return.unwrap_or(default_return),
                income,
                employee_percent,
                employer_percent,
            ),
            RetirementSection::Individual {
                name,
                balance,
                annual_return,
                contribution_percent,
                ..
            } => RetirementAccount::individual(
                name,
                balance,
                annual_return.unwrap_or(default_return),
                income,
                contribution_percent,
            ),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BrokerageSection {
    #[serde(default)]
    pub balance: f64,
    pub annual_return: Option<f64>,
}

impl BrokerageSection {
    pub fn into_account(self, default_return: f64) -> Result<BrokerageAccount, ForecastError> {
        BrokerageAccount::new(self.balance, self.annual_return.unwrap_or(default_return))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SavingsSection {
    pub name: String,
    #[serde(default)]
    pub balance: f64,
    #[serde(default)]
    pub interest_rate: f64,
    #[serde(default)]
    pub contributions: Vec<ContributionSection>,
}

impl SavingsSection {
    /// Resolve against the configured incomes
    pub fn into_account(self, incomes: &[Income]) -> Result<SavingsAccount, ForecastError> {
        let links = self
            .contributions
            .iter()
            .map(|c| {
                let income = find_income(incomes, &c.income, &format!("savings.{}", self.name))?;
                ContributionLink::new(income, &c.terms())
            })
            .collect::<Result<Vec<_>, _>>()?;
        SavingsAccount::new(self.name, self.balance, self.interest_rate, links)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContributionSection {
    pub income: String,
    #[serde(default)]
    pub contribution: f64,
    #[serde(default)]
    pub contribution_percent: f64,
    #[serde(default)]
    pub withdrawal: f64,
    #[serde(default)]
    pub withdrawal_percent: f64,
    #[serde(default)]
    pub one_time_contribution: f64,
    #[serde(default)]
    pub one_time_withdrawal: f64,
}

impl ContributionSection {
    fn terms(&self) -> ContributionTerms {
        ContributionTerms {
            contribution: self.contribution,
            contribution_percent: self.contribution_percent,
            withdrawal: self.withdrawal,
            withdrawal_percent: self.withdrawal_percent,
            one_time_contribution: self.one_time_contribution,
            one_time_withdrawal: self.one_time_withdrawal,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaxSection {
    #[serde(default)]
    pub marginal_rate: f64,
}

impl ForecastSection {
    /// Explicit start month, or the current local month
    pub fn start_month(&self) -> Result<YearMonth, ForecastError> {
        match &self.start_month {
            Some(label) => label.parse(),
            None => Ok(YearMonth::current()),
        }
    }
}

/// Look up an income by name, naming the referencing field on failure
pub fn find_income<'a>(
    incomes: &'a [Income],
    name: &str,
    field: &str,
) -> Result<&'a Income, ForecastError> {
    incomes.iter().find(|i| i.name == name).ok_or_else(|| {
        ForecastError::invalid_config(
            format!("{}.income", field),
            format!("unknown income `{}`", name),
        )
    })
}
