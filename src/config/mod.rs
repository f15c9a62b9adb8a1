//! Household configuration loading
//!
//! A JSON document with the groups `forecast`, `income`, `mortgage`,
//! `student_loans`, `car_loan`, `investments`, `savings` and `taxes` is parsed
//! with serde and validated into a [`Plan`]: the forecast settings plus a
//! ready-to-run [`EntitySet`].

mod document;

pub use document::{
    BrokerageSection, ConfigDocument, ContributionSection, ForecastSection, IncomeSection,
    InvestmentsSection, LoanSection, MortgageSection, RetirementSection, SavingsSection,
    TaxSection,
};

use crate::amortization::ScheduleCache;
use crate::entities::EntitySet;
use crate::error::ForecastError;
use crate::forecast::{ForecastConfig, ForecastEngine};
use crate::income::Income;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Tax settings
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TaxConfig {
    /// Single marginal rate applied to taxable income
    pub marginal_rate: f64,
}

impl TaxConfig {
    pub fn new(marginal_rate: f64) -> Result<Self, ForecastError> {
        if !(0.0..1.0).contains(&marginal_rate) {
            return Err(ForecastError::invalid_config(
                "taxes.marginal_rate",
                format!("must be in [0, 1), got {}", marginal_rate),
            ));
        }
        Ok(Self { marginal_rate })
    }
}

/// A validated household configuration
#[derive(Debug, Clone)]
pub struct Plan {
    pub forecast: ForecastConfig,
    pub taxes: TaxConfig,
    pub incomes: Vec<Income>,
    pub entities: EntitySet,
}

impl Plan {
    /// Validate a parsed document
    pub fn from_document(doc: ConfigDocument) -> Result<Self, ForecastError> {
        Self::from_document_with_cache(doc, &mut ScheduleCache::new())
    }

    /// Validate a parsed document, sharing mortgage schedules through `cache`
    pub fn from_document_with_cache(
        doc: ConfigDocument,
        cache: &mut ScheduleCache,
    ) -> Result<Self, ForecastError> {
        let ConfigDocument {
            forecast,
            income,
            mortgage,
            student_loans,
            car_loan,
            investments,
            savings,
            taxes,
        } = doc;

        if forecast.horizon_months <= 0 {
            return Err(ForecastError::invalid_config(
                "forecast.horizon_months",
                format!("must be positive, got {}", forecast.horizon_months),
            ));
        }
        let start_month = forecast.start_month()?;
        let taxes = TaxConfig::new(taxes.marginal_rate)?;

        let incomes = income
            .into_iter()
            .map(IncomeSection::into_income)
            .collect::<Result<Vec<_>, _>>()?;
        let mut seen = HashSet::new();
        if let Some(dup) = incomes.iter().find(|i| !seen.insert(i.name.as_str())) {
            return Err(ForecastError::invalid_config(
                "income",
                format!("duplicate name `{}`", dup.name),
            ));
        }

        let mortgage = mortgage.map(|m| m.into_mortgage(cache)).transpose()?;

        let mut loans = Vec::new();
        if let Some(section) = student_loans {
            loans.push(section.into_loan("student_loans")?);
        }
        if let Some(section) = car_loan {
            loans.push(section.into_loan("car_loan")?);
        }

        let savings = savings
            .into_iter()
            .map(|s| s.into_account(&incomes))
            .collect::<Result<Vec<_>, _>>()?;

        let default_return = investments.average_return;
        let retirement = investments
            .retirement_accounts
            .into_iter()
            .map(|r| {
                let income = document::find_income(
                    &incomes,
                    r.income(),
                    "investments.retirement_accounts",
                )?;
                r.into_account(income, default_return)
            })
            .collect::<Result<Vec<_>, _>>()?;
        let brokerage = investments.brokerage.into_account(default_return)?;

        let mut entities = EntitySet::new(mortgage, loans, savings, retirement, brokerage)?;
        entities.prioritize_loans(&forecast.payoff_priority)?;

        log::debug!(
            "configured {} income(s), {} loan(s), {} savings and {} retirement account(s)",
            incomes.len(),
            entities.loans.len(),
            entities.savings.len(),
            entities.retirement.len()
        );

        Ok(Self {
            forecast: ForecastConfig {
                horizon_months: forecast.horizon_months,
                start_month,
            },
            taxes,
            incomes,
            entities,
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self, ForecastError> {
        let doc: ConfigDocument = serde_json::from_str(json).map_err(parse_error)?;
        Self::from_document(doc)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ForecastError> {
        let doc: ConfigDocument = serde_json::from_reader(reader).map_err(parse_error)?;
        Self::from_document(doc)
    }

    /// Combined monthly take-home pay of every income
    pub fn monthly_take_home(&self) -> f64 {
        self.incomes
            .iter()
            .map(|i| i.monthly_take_home(self.taxes.marginal_rate))
            .sum()
    }

    pub fn into_engine(self) -> ForecastEngine {
        ForecastEngine::new(self.entities, self.forecast)
    }
}

fn parse_error(e: serde_json::Error) -> ForecastError {
    ForecastError::invalid_config("config", e.to_string())
}

/// Load and validate a configuration file
pub fn load_plan(path: &Path) -> Result<Plan, ForecastError> {
    let file = File::open(path).map_err(|e| {
        ForecastError::invalid_config("config", format!("cannot read {}: {}", path.display(), e))
    })?;
    Plan::from_reader(BufReader::new(file))
}
