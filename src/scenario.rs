//! Scenario runner for comparing prepayment strategies
//!
//! Holds the household once, then runs the same forecast under several
//! prepayment variants. Mortgage schedules are shared through a cache so
//! variants with identical terms never rebuild them.

use crate::amortization::ScheduleCache;
use crate::calendar::YearMonth;
use crate::config::Plan;
use crate::entities::{EntitySet, Loan};
use crate::error::ForecastError;
use crate::forecast::{ForecastConfig, ForecastEngine, ForecastResult, Payoff, WealthSnapshot};
use rayon::prelude::*;
use serde::Serialize;
use std::sync::{Mutex, MutexGuard};

/// Recurring prepayments to apply on top of the configured household
#[derive(Debug, Clone, PartialEq)]
pub struct PrepaymentVariant {
    pub label: String,

    /// Replaces the mortgage's recurring extra when set
    pub mortgage_recurring_extra: Option<f64>,

    /// Replaces the recurring extra of each named loan
    pub loan_recurring_extra: Vec<(String, f64)>,
}

impl PrepaymentVariant {
    /// The configured household, unchanged
    pub fn baseline() -> Self {
        Self {
            label: "baseline".to_string(),
            mortgage_recurring_extra: None,
            loan_recurring_extra: Vec::new(),
        }
    }

    pub fn mortgage(extra: f64) -> Self {
        Self {
            label: format!("mortgage +{:.2}", extra),
            mortgage_recurring_extra: Some(extra),
            loan_recurring_extra: Vec::new(),
        }
    }

    pub fn loan(name: &str, extra: f64) -> Self {
        Self {
            label: format!("{} +{:.2}", name, extra),
            mortgage_recurring_extra: None,
            loan_recurring_extra: vec![(name.to_string(), extra)],
        }
    }
}

/// Headline figures of one variant's run
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioSummary {
    pub label: String,
    pub final_month: YearMonth,
    pub final_wealth: f64,
    pub final_liabilities: f64,
    pub redirected_total: f64,
    pub payoffs: Vec<Payoff>,
    pub warnings: usize,
}

impl ScenarioSummary {
    pub fn from_result(label: &str, result: &ForecastResult) -> Self {
        let summary = result.summary();
        Self {
            label: label.to_string(),
            final_month: summary.final_month,
            final_wealth: summary.final_wealth,
            final_liabilities: summary.final_liabilities,
            redirected_total: summary.redirected_total,
            payoffs: result.payoffs.clone(),
            warnings: summary.warnings,
        }
    }

    pub fn payoff_month(&self, name: &str) -> Option<YearMonth> {
        self.payoffs.iter().find(|p| p.name == name).map(|p| p.month)
    }
}

/// Runs one household under many prepayment variants
#[derive(Debug)]
pub struct ScenarioRunner {
    entities: EntitySet,
    config: ForecastConfig,
    opening: WealthSnapshot,
    cache: Mutex<ScheduleCache>,
}

impl ScenarioRunner {
    /// Start every variant from the configured opening balances
    pub fn new(entities: EntitySet, config: ForecastConfig) -> Self {
        let opening = entities.opening_snapshot(config.start_month);
        Self::with_opening(entities, config, opening)
    }

    /// Start every variant from an explicit snapshot (e.g. a persisted state)
    pub fn with_opening(
        entities: EntitySet,
        config: ForecastConfig,
        opening: WealthSnapshot,
    ) -> Self {
        Self {
            entities,
            config,
            opening,
            cache: Mutex::new(ScheduleCache::new()),
        }
    }

    pub fn from_plan(plan: Plan) -> Self {
        Self::new(plan.entities, plan.forecast)
    }

    pub fn entities(&self) -> &EntitySet {
        &self.entities
    }

    pub fn opening(&self) -> &WealthSnapshot {
        &self.opening
    }

    fn lock_cache(&self) -> MutexGuard<'_, ScheduleCache> {
        // The cache holds only finished schedules, so a poisoned lock is still usable
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Household with the variant's prepayments applied
    pub fn apply(&self, variant: &PrepaymentVariant) -> Result<EntitySet, ForecastError> {
        let mut entities = self.entities.clone();

        if let Some(extra) = variant.mortgage_recurring_extra {
            let mortgage = entities.mortgage.as_ref().ok_or_else(|| {
                ForecastError::invalid_config(
                    format!("scenario.{}", variant.label),
                    "no mortgage is configured",
                )
            })?;
            let rebuilt = mortgage.with_recurring_extra(extra, &mut self.lock_cache())?;
            entities.mortgage = Some(rebuilt);
        }

        for (name, extra) in &variant.loan_recurring_extra {
            let loan = entities.loan_mut(name).ok_or_else(|| {
                ForecastError::invalid_config(
                    format!("scenario.{}", variant.label),
                    format!("unknown loan `{}`", name),
                )
            })?;
            *loan = Loan::new(name.as_str(), loan.terms.with_recurring_extra(*extra))?;
        }

        Ok(entities)
    }

    /// Run the forecast for a single variant
    pub fn run(&self, variant: &PrepaymentVariant) -> Result<ForecastResult, ForecastError> {
        let engine = ForecastEngine::new(self.apply(variant)?, self.config.clone());
        engine.run(&self.opening)
    }

    /// Run every variant in parallel, preserving input order
    pub fn run_all(
        &self,
        variants: &[PrepaymentVariant],
    ) -> Vec<Result<ScenarioSummary, ForecastError>> {
        variants
            .par_iter()
            .map(|variant| {
                let result = self.run(variant)?;
                log::debug!(
                    "scenario `{}`: final wealth {:.2}",
                    variant.label,
                    result.final_snapshot().total_wealth
                );
                Ok(ScenarioSummary::from_result(&variant.label, &result))
            })
            .collect()
    }

    /// Schedule cache (hits, misses)
    pub fn cache_stats(&self) -> (u64, u64) {
        let cache = self.lock_cache();
        (cache.hits, cache.misses)
    }
}
