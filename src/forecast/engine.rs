//! Monthly forecast engine

use super::result::{ForecastResult, Payoff};
use super::snapshot::WealthSnapshot;
use super::waterfall::{cascade, LiabilityStep};
use crate::calendar::YearMonth;
use crate::entities::{EntitySet, GrowthAccount, LiabilityPayment};
use crate::error::{ForecastError, ForecastWarning};

/// Configuration for a forecast run
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastConfig {
    /// Number of months to simulate
    pub horizon_months: i64,

    /// Month of the opening snapshot when none is persisted
    pub start_month: YearMonth,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon_months: 60, // 5 years
            start_month: YearMonth::current(),
        }
    }
}

/// Outcome of advancing one month
#[derive(Debug, Clone)]
pub struct MonthStep {
    pub snapshot: WealthSnapshot,
    pub warning: Option<ForecastWarning>,

    /// Cash the waterfall sent to the brokerage this month
    pub redirected: f64,

    /// Liabilities that reached zero this month
    pub paid_off: Vec<String>,
}

/// Forecast engine over a fixed entity set
pub struct ForecastEngine {
    entities: EntitySet,
    config: ForecastConfig,
}

impl ForecastEngine {
    pub fn new(entities: EntitySet, config: ForecastConfig) -> Self {
        Self { entities, config }
    }

    pub fn entities(&self) -> &EntitySet {
        &self.entities
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Opening snapshot from the configured balances at the configured start month
    pub fn opening_snapshot(&self) -> WealthSnapshot {
        self.entities.opening_snapshot(self.config.start_month)
    }

    /// Produce the snapshot following `previous`
    ///
    /// `month_index` is the 1-based position of the new month within the run;
    /// one-time amounts only apply when it is 1.
    pub fn advance(&self, previous: &WealthSnapshot, month_index: u32) -> MonthStep {
        let month = previous.month.next();
        let liabilities = self.entities.liabilities();

        let payments: Option<Vec<LiabilityPayment>> = liabilities
            .iter()
            .map(|l| l.payment_due(month_index, month))
            .collect();
        let payments = match payments {
            Some(payments) => payments,
            None => {
                let warning = ForecastWarning::MissingScheduleRow { month };
                log::warn!("{}", warning);
                return MonthStep {
                    snapshot: previous.carried_forward(month),
                    warning: Some(warning),
                    redirected: 0.0,
                    paid_off: Vec::new(),
                };
            }
        };

        // Previous liability balances in the same order as `liabilities`
        let has_mortgage = self.entities.mortgage.is_some();
        let mut previous_balances = Vec::with_capacity(liabilities.len());
        if has_mortgage {
            previous_balances.push(previous.mortgage_balance);
        }
        previous_balances.extend(previous.other_loan_balances.iter().copied());

        let steps: Vec<LiabilityStep> = previous_balances
            .iter()
            .zip(&payments)
            .map(|(&previous_balance, &payment)| LiabilityStep {
                previous_balance,
                payment,
            })
            .collect();
        let outcome = cascade(&steps);

        let paid_off: Vec<String> = outcome
            .newly_exhausted
            .iter()
            .map(|&i| liabilities[i].name().to_string())
            .collect();
        for name in &paid_off {
            log::info!("{} paid off in {}", name, month);
        }

        let (mortgage_balance, loan_balances) = if has_mortgage {
            (outcome.balances[0], outcome.balances[1..].to_vec())
        } else {
            (previous.mortgage_balance, outcome.balances)
        };

        let savings = grow(&self.entities.savings, &previous.savings_balances, month_index);
        let retirement = grow(
            &self.entities.retirement,
            &previous.retirement_balances,
            month_index,
        );
        let brokerage = previous.brokerage_balance
            + self.entities.brokerage.monthly_return(previous.brokerage_balance)
            + outcome.redirected_to_brokerage;

        MonthStep {
            snapshot: WealthSnapshot::assemble(
                month,
                mortgage_balance,
                loan_balances,
                savings,
                retirement,
                brokerage,
            ),
            warning: None,
            redirected: outcome.redirected_to_brokerage,
            paid_off,
        }
    }

    /// Simulate `horizon_months` months starting after `initial`
    pub fn run(&self, initial: &WealthSnapshot) -> Result<ForecastResult, ForecastError> {
        let horizon = u32::try_from(self.config.horizon_months)
            .ok()
            .filter(|&h| h > 0)
            .ok_or_else(|| {
                ForecastError::invalid_config(
                    "forecast.horizon_months",
                    format!("must be positive, got {}", self.config.horizon_months),
                )
            })?;

        let layout = self.entities.layout();
        if !initial.matches_layout(&layout) {
            return Err(ForecastError::invalid_config(
                "snapshot",
                format!(
                    "opening snapshot for {} does not match configured columns {:?}",
                    initial.month,
                    layout.column_names()
                ),
            ));
        }

        log::info!(
            "forecasting {} months from {} (opening wealth {:.2})",
            horizon,
            initial.month,
            initial.total_wealth
        );

        let mut result = ForecastResult::new(initial.clone());
        let mut current = initial.clone();

        for month_index in 1..=horizon {
            let step = self.advance(&current, month_index);

            if let Some(warning) = step.warning {
                result.warnings.push(warning);
            }
            for name in step.paid_off {
                result.payoffs.push(Payoff {
                    name,
                    month: step.snapshot.month,
                });
            }
            result.redirected_total += step.redirected;

            current = step.snapshot.clone();
            result.add_snapshot(step.snapshot);
        }

        log::info!(
            "forecast finished at {}: total wealth {:.2}, {} warning(s)",
            current.month,
            current.total_wealth,
            result.warnings.len()
        );

        Ok(result)
    }
}

/// Next balance for each account: return on the previous balance plus contributions
fn grow<A: GrowthAccount>(accounts: &[A], previous: &[f64], month_index: u32) -> Vec<f64> {
    accounts
        .iter()
        .zip(previous)
        .map(|(account, &balance)| {
            balance + account.monthly_return(balance) + account.monthly_contribution(month_index)
        })
        .collect()
}
