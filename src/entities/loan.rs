//! Amortizing loans and the mortgage specialization

use super::Liability;
use crate::amortization::{AmortizationSchedule, ScheduleCache, ScheduleTerms, MAX_TERM_MONTHS};
use crate::calendar::YearMonth;
use crate::error::ForecastError;
use std::sync::Arc;

/// Loan-to-value at or above which mortgage insurance is charged
pub const PMI_LTV_THRESHOLD: f64 = 0.80;

/// Cash owed on a liability in one month
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LiabilityPayment {
    /// Portion applied against the balance (scheduled principal plus any extra)
    pub principal: f64,

    /// Interest charged on the balance
    pub interest: f64,

    /// Pass-through collected with the payment; never touches the balance
    pub escrow: f64,
}

impl LiabilityPayment {
    pub fn total(&self) -> f64 {
        self.principal + self.interest + self.escrow
    }

    /// Capacity released once the balance is gone (no principal owed, no interest charged)
    pub fn freed_capacity(&self) -> f64 {
        self.principal + self.interest
    }
}

/// Loan terms as supplied by configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoanTerms {
    pub initial_principal: f64,
    pub annual_rate: f64,
    pub term_months: i64,
    pub origination_month: YearMonth,
    /// Unpaid balance at the start of the forecast
    pub current_principal: f64,
    /// Fixed base payment
    pub monthly_payment: f64,
    /// Replaces the recurring extra in the first simulated month
    pub one_time_extra_payment: f64,
    pub recurring_extra_payment: f64,
}

impl LoanTerms {
    /// New loan with nothing repaid yet and no payment or prepayments set
    pub fn new(
        initial_principal: f64,
        annual_rate: f64,
        term_months: i64,
        origination_month: &str,
    ) -> Result<Self, ForecastError> {
        Ok(Self {
            initial_principal,
            annual_rate,
            term_months,
            origination_month: origination_month.parse()?,
            current_principal: initial_principal,
            monthly_payment: 0.0,
            one_time_extra_payment: 0.0,
            recurring_extra_payment: 0.0,
        })
    }

    pub fn with_current_principal(mut self, current_principal: f64) -> Self {
        self.current_principal = current_principal;
        self
    }

    pub fn with_monthly_payment(mut self, monthly_payment: f64) -> Self {
        self.monthly_payment = monthly_payment;
        self
    }

    pub fn with_one_time_extra(mut self, amount: f64) -> Self {
        self.one_time_extra_payment = amount;
        self
    }

    pub fn with_recurring_extra(mut self, amount: f64) -> Self {
        self.recurring_extra_payment = amount;
        self
    }
}

/// A generic amortizing loan paid with a fixed monthly amount
#[derive(Debug, Clone, PartialEq)]
pub struct Loan {
    pub name: String,
    pub terms: LoanTerms,
}

impl Loan {
    pub fn new(name: impl Into<String>, terms: LoanTerms) -> Result<Self, ForecastError> {
        let name = name.into();
        let field = |f: &str| format!("{}.{}", name, f);

        if terms.term_months <= 0 || terms.term_months > MAX_TERM_MONTHS {
            return Err(ForecastError::InvalidTerm {
                term_months: terms.term_months,
            });
        }
        let non_negative = [
            ("initial_principal", terms.initial_principal),
            ("annual_rate", terms.annual_rate),
            ("current_principal", terms.current_principal),
            ("monthly_payment", terms.monthly_payment),
            ("one_time_extra_payment", terms.one_time_extra_payment),
            ("recurring_extra_payment", terms.recurring_extra_payment),
        ];
        for (f, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ForecastError::invalid_config(field(f), "must be non-negative"));
            }
        }
        if terms.current_principal > terms.initial_principal {
            return Err(ForecastError::invalid_config(
                field("current_principal"),
                format!(
                    "{} exceeds initial principal {}",
                    terms.current_principal, terms.initial_principal
                ),
            ));
        }

        Ok(Self { name, terms })
    }

    /// Extra payment for a simulated month (1-based)
    ///
    /// A positive one-time extra overrides the recurring extra in month 1.
    pub fn extra_payment(&self, month_index: u32) -> f64 {
        match self.one_time_extra(month_index) {
            Some(one_time) => one_time,
            None => self.terms.recurring_extra_payment,
        }
    }

    fn one_time_extra(&self, month_index: u32) -> Option<f64> {
        (month_index == 1 && self.terms.one_time_extra_payment > 0.0)
            .then_some(self.terms.one_time_extra_payment)
    }

    /// Terms for this loan's own amortization schedule
    pub fn schedule_terms(&self) -> ScheduleTerms {
        ScheduleTerms {
            principal: self.terms.initial_principal,
            annual_rate: self.terms.annual_rate,
            term_months: self.terms.term_months,
            start_month: self.terms.origination_month,
            recurring_extra: self.terms.recurring_extra_payment,
            insurance: 0.0,
            escrow: 0.0,
        }
    }
}

impl Liability for Loan {
    fn name(&self) -> &str {
        &self.name
    }

    fn opening_balance(&self) -> f64 {
        self.terms.current_principal
    }

    fn payment_due(&self, month_index: u32, _month: YearMonth) -> Option<LiabilityPayment> {
        Some(LiabilityPayment {
            principal: self.terms.monthly_payment + self.extra_payment(month_index),
            interest: 0.0,
            escrow: 0.0,
        })
    }
}

/// Housing costs collected alongside the mortgage payment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MortgageCosts {
    pub monthly_escrow: f64,
    pub recorded_property_value: f64,
    /// Premium charged while loan-to-value is at or above the threshold
    pub monthly_mortgage_insurance: f64,
}

/// A loan secured by the home, paid from a precomputed schedule
///
/// Mortgage insurance applicability is decided once, from the opening
/// balance; it is not re-evaluated as the balance falls during a run.
#[derive(Debug, Clone)]
pub struct Mortgage {
    loan: Loan,
    costs: MortgageCosts,
    insurance_due: f64,
    schedule: Arc<AmortizationSchedule>,
}

impl Mortgage {
    pub const NAME: &'static str = "mortgage";

    pub fn new(terms: LoanTerms, costs: MortgageCosts) -> Result<Self, ForecastError> {
        Self::with_cache(terms, costs, &mut ScheduleCache::new())
    }

    /// Build, reusing a cached schedule when the terms were seen before
    pub fn with_cache(
        terms: LoanTerms,
        costs: MortgageCosts,
        cache: &mut ScheduleCache,
    ) -> Result<Self, ForecastError> {
        let mut loan = Loan::new(Self::NAME, terms)?;

        if !(costs.recorded_property_value > 0.0) || !costs.recorded_property_value.is_finite() {
            return Err(ForecastError::invalid_config(
                "mortgage.property_value",
                "must be positive",
            ));
        }
        for (field, value) in [
            ("mortgage.monthly_escrow", costs.monthly_escrow),
            ("mortgage.monthly_insurance", costs.monthly_mortgage_insurance),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ForecastError::invalid_config(field, "must be non-negative"));
            }
        }

        let loan_to_value = terms.current_principal / costs.recorded_property_value;
        let insurance_due = if loan_to_value >= PMI_LTV_THRESHOLD {
            costs.monthly_mortgage_insurance
        } else {
            0.0
        };

        let schedule_terms = loan
            .schedule_terms()
            .with_insurance(insurance_due)
            .with_escrow(costs.monthly_escrow);
        let schedule = cache.get_or_build(&schedule_terms)?;

        // The base payment is derived, never configured, for a mortgage
        loan.terms.monthly_payment = schedule.base_payment();

        log::debug!(
            "mortgage LTV {:.3}, insurance due {:.2}, base payment {:.2}",
            loan_to_value,
            insurance_due,
            schedule.base_payment()
        );

        Ok(Self {
            loan,
            costs,
            insurance_due,
            schedule,
        })
    }

    /// Same mortgage with a different recurring prepayment
    pub fn with_recurring_extra(
        &self,
        extra: f64,
        cache: &mut ScheduleCache,
    ) -> Result<Self, ForecastError> {
        let terms = self.loan.terms.with_recurring_extra(extra);
        Self::with_cache(terms, self.costs, cache)
    }

    pub fn schedule(&self) -> &Arc<AmortizationSchedule> {
        &self.schedule
    }

    pub fn monthly_insurance_due(&self) -> f64 {
        self.insurance_due
    }
}

impl Liability for Mortgage {
    fn name(&self) -> &str {
        &self.loan.name
    }

    fn opening_balance(&self) -> f64 {
        self.loan.terms.current_principal
    }

    /// `None` when the schedule has no row for `month`
    fn payment_due(&self, month_index: u32, month: YearMonth) -> Option<LiabilityPayment> {
        let row = self.schedule.row_for(month)?;

        // Past the scheduled payoff the level payment is still budgeted
        if row.payment == 0.0 {
            return Some(LiabilityPayment {
                principal: self.loan.terms.monthly_payment + self.loan.extra_payment(month_index),
                interest: 0.0,
                escrow: 0.0,
            });
        }

        // The recurring extra is already inside the scheduled principal
        let principal = match self.loan.one_time_extra(month_index) {
            Some(one_time) => {
                (row.principal - self.loan.terms.recurring_extra_payment).max(0.0) + one_time
            }
            None => row.principal,
        };

        Some(LiabilityPayment {
            principal,
            interest: row.interest,
            escrow: self.costs.monthly_escrow,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn mortgage_terms() -> LoanTerms {
        LoanTerms::new(320_100.0, 0.0299, 360, "08-2020")
            .unwrap()
            .with_current_principal(289_500.0)
    }

    fn costs(value: f64) -> MortgageCosts {
        MortgageCosts {
            monthly_escrow: 697.33,
            recorded_property_value: value,
            monthly_mortgage_insurance: 95.0,
        }
    }

    #[test]
    fn test_loan_validation() {
        let terms = LoanTerms::new(14_100.0, 0.0499, 36, "10-2023").unwrap();
        assert!(Loan::new("car_loan", terms.with_current_principal(12_700.0)).is_ok());

        let err = Loan::new("car_loan", terms.with_current_principal(20_000.0)).unwrap_err();
        assert!(matches!(err, ForecastError::InvalidConfig { .. }));

        let mut zero_term = terms;
        zero_term.term_months = 0;
        assert_eq!(
            Loan::new("car_loan", zero_term).unwrap_err(),
            ForecastError::InvalidTerm { term_months: 0 }
        );

        let mut century = terms;
        century.term_months = 1_201;
        assert_eq!(
            Loan::new("car_loan", century).unwrap_err(),
            ForecastError::InvalidTerm { term_months: 1_201 }
        );

        assert!(matches!(
            LoanTerms::new(14_100.0, 0.0499, 36, "2023/10").unwrap_err(),
            ForecastError::InvalidDate { .. }
        ));
    }

    #[test]
    fn test_one_time_extra_overrides_recurring_in_first_month_only() {
        let terms = LoanTerms::new(61_000.0, 0.061, 120, "08-2020")
            .unwrap()
            .with_monthly_payment(600.0)
            .with_one_time_extra(2_000.0)
            .with_recurring_extra(100.0);
        let loan = Loan::new("student_loans", terms).unwrap();
        let month: YearMonth = "01-2025".parse().unwrap();

        assert_eq!(loan.payment_due(1, month).unwrap().principal, 2_600.0);
        assert_eq!(loan.payment_due(2, month).unwrap().principal, 700.0);
        assert_eq!(loan.payment_due(30, month).unwrap().total(), 700.0);
    }

    #[test]
    fn test_pmi_from_opening_loan_to_value() {
        // 289500 / 345000 = 0.839
        let with_pmi = Mortgage::new(mortgage_terms(), costs(345_000.0)).unwrap();
        assert_eq!(with_pmi.monthly_insurance_due(), 95.0);

        // 289500 / 400000 = 0.724
        let without = Mortgage::new(mortgage_terms(), costs(400_000.0)).unwrap();
        assert_eq!(without.monthly_insurance_due(), 0.0);

        let row = &with_pmi.schedule().rows()[5];
        assert_abs_diff_eq!(
            row.payment,
            with_pmi.schedule().base_payment() + 95.0 + 697.33,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_zero_property_value_rejected() {
        let err = Mortgage::new(mortgage_terms(), costs(0.0)).unwrap_err();
        assert!(matches!(err, ForecastError::InvalidConfig { .. }));
    }

    #[test]
    fn test_mortgage_payment_from_schedule() {
        let mortgage = Mortgage::new(mortgage_terms(), costs(345_000.0)).unwrap();
        let month: YearMonth = "11-2026".parse().unwrap();
        let row = *mortgage.schedule().row_for(month).unwrap();

        let payment = mortgage.payment_due(2, month).unwrap();
        assert_eq!(payment.principal, row.principal);
        assert_eq!(payment.interest, row.interest);
        assert_eq!(payment.escrow, 697.33);
        assert_abs_diff_eq!(payment.total(), 697.33 + row.principal + row.interest);

        // Outside the schedule
        assert!(mortgage.payment_due(2, "01-2060".parse().unwrap()).is_none());
    }

    #[test]
    fn test_level_payment_budgeted_after_scheduled_payoff() {
        let terms = LoanTerms::new(10_000.0, 0.05, 12, "01-2024").unwrap();
        let mortgage = Mortgage::new(terms, costs(200_000.0)).unwrap();

        // Last scheduled row is 12-2024 (row 11 pays the loan off, row 12 is zero)
        let after = mortgage.payment_due(5, "01-2025".parse().unwrap()).unwrap();
        assert_abs_diff_eq!(after.principal, mortgage.schedule().base_payment(), epsilon = 1e-9);
        assert_eq!(after.interest, 0.0);
        assert_eq!(after.escrow, 0.0);
    }

    #[test]
    fn test_mortgage_one_time_extra_replaces_scheduled_recurring() {
        let terms = mortgage_terms().with_recurring_extra(200.0).with_one_time_extra(5_000.0);
        let mortgage = Mortgage::new(terms, costs(345_000.0)).unwrap();
        let month: YearMonth = "11-2026".parse().unwrap();
        let row = *mortgage.schedule().row_for(month).unwrap();

        let first = mortgage.payment_due(1, month).unwrap();
        assert_abs_diff_eq!(first.principal, row.principal - 200.0 + 5_000.0, epsilon = 1e-9);

        let later = mortgage.payment_due(2, month).unwrap();
        assert_eq!(later.principal, row.principal);
    }

    #[test]
    fn test_recurring_extra_rebuild_uses_cache() {
        let mut cache = ScheduleCache::new();
        let base = Mortgage::with_cache(mortgage_terms(), costs(345_000.0), &mut cache).unwrap();
        let faster = base.with_recurring_extra(500.0, &mut cache).unwrap();
        let again = base.with_recurring_extra(500.0, &mut cache).unwrap();

        assert!(Arc::ptr_eq(faster.schedule(), again.schedule()));
        assert_eq!(cache.misses, 2);
        assert_eq!(cache.hits, 1);
        assert!(faster.schedule().payoff_month() < base.schedule().payoff_month());
    }
}
