//! Fixed-rate amortization schedule construction

use crate::calendar::YearMonth;
use crate::error::ForecastError;
use serde::Serialize;

/// Residual balances below this are treated as paid off (floating point dust)
const SETTLED_BALANCE: f64 = 1e-6;

/// Longest term accepted, in months
pub const MAX_TERM_MONTHS: i64 = 1200;

/// Inputs that fully determine a schedule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduleTerms {
    /// Principal at origination
    pub principal: f64,

    /// Annual interest rate as a proportion (0.0299 = 2.99%)
    pub annual_rate: f64,

    /// Number of monthly payments
    pub term_months: i64,

    /// Origination month (row 0)
    pub start_month: YearMonth,

    /// Prepayment added to every month's principal
    pub recurring_extra: f64,

    /// Monthly mortgage insurance collected with the payment
    pub insurance: f64,

    /// Monthly escrow collected with the payment
    pub escrow: f64,
}

impl ScheduleTerms {
    /// Terms with no prepayment, insurance or escrow
    pub fn new(
        principal: f64,
        annual_rate: f64,
        term_months: i64,
        start_month: &str,
    ) -> Result<Self, ForecastError> {
        Ok(Self {
            principal,
            annual_rate,
            term_months,
            start_month: start_month.parse()?,
            recurring_extra: 0.0,
            insurance: 0.0,
            escrow: 0.0,
        })
    }

    pub fn with_recurring_extra(mut self, extra: f64) -> Self {
        self.recurring_extra = extra;
        self
    }

    pub fn with_insurance(mut self, insurance: f64) -> Self {
        self.insurance = insurance;
        self
    }

    pub fn with_escrow(mut self, escrow: f64) -> Self {
        self.escrow = escrow;
        self
    }

    /// Monthly interest rate
    pub fn monthly_rate(&self) -> f64 {
        self.annual_rate / 12.0
    }

    /// Level principal-and-interest payment from the annuity formula
    pub fn base_payment(&self) -> f64 {
        let r = self.monthly_rate();
        let n = self.term_months as f64;
        if r == 0.0 {
            self.principal / n
        } else {
            self.principal * r / (1.0 - (1.0 + r).powf(-n))
        }
    }

    fn validate(&self) -> Result<(), ForecastError> {
        if self.term_months <= 0 || self.term_months > MAX_TERM_MONTHS {
            return Err(ForecastError::InvalidTerm {
                term_months: self.term_months,
            });
        }
        let amounts = [
            ("principal", self.principal),
            ("annual_rate", self.annual_rate),
            ("recurring_extra", self.recurring_extra),
            ("insurance", self.insurance),
            ("escrow", self.escrow),
        ];
        for (field, value) in amounts {
            if !value.is_finite() || value < 0.0 {
                return Err(ForecastError::invalid_config(
                    format!("amortization.{}", field),
                    format!("must be a non-negative number, got {}", value),
                ));
            }
        }
        Ok(())
    }
}

/// One month of a schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AmortizationRow {
    pub month: YearMonth,
    /// Total collected: interest + principal + insurance + escrow
    pub payment: f64,
    pub interest: f64,
    pub principal: f64,
    /// Unpaid principal after this month's payment
    pub balance: f64,
}

/// Immutable month-by-month breakdown of a fixed-rate loan
///
/// Holds exactly `term_months + 1` rows: row 0 is the origination month and
/// each following row is one calendar month later. Recurring prepayments are
/// folded into each row's principal, so once the balance reaches zero the
/// remaining rows are all zero.
#[derive(Debug, Clone, PartialEq)]
pub struct AmortizationSchedule {
    terms: ScheduleTerms,
    base_payment: f64,
    rows: Vec<AmortizationRow>,
}

impl AmortizationSchedule {
    /// Build the full-term schedule
    pub fn build(terms: ScheduleTerms) -> Result<Self, ForecastError> {
        terms.validate()?;

        let r = terms.monthly_rate();
        let base_payment = terms.base_payment();
        let row_count = terms.term_months as usize + 1;
        let mut rows = Vec::with_capacity(row_count);
        let mut balance = terms.principal;

        for m in 0..row_count {
            let month = terms.start_month.plus_months(m as u32);

            if balance <= 0.0 {
                rows.push(AmortizationRow {
                    month,
                    payment: 0.0,
                    interest: 0.0,
                    principal: 0.0,
                    balance: 0.0,
                });
                continue;
            }

            let interest = r * balance;
            let mut principal = (base_payment + terms.recurring_extra - interest).min(balance);
            balance -= principal;
            if balance < SETTLED_BALANCE {
                principal += balance;
                balance = 0.0;
            }

            rows.push(AmortizationRow {
                month,
                payment: interest + principal + terms.insurance + terms.escrow,
                interest,
                principal,
                balance,
            });
        }

        log::debug!(
            "built {}-month schedule from {}: base payment {:.2}",
            terms.term_months,
            terms.start_month,
            base_payment
        );

        Ok(Self {
            terms,
            base_payment,
            rows,
        })
    }

    pub fn terms(&self) -> &ScheduleTerms {
        &self.terms
    }

    /// Level principal-and-interest payment (before prepayment, insurance, escrow)
    pub fn base_payment(&self) -> f64 {
        self.base_payment
    }

    pub fn rows(&self) -> &[AmortizationRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn start_month(&self) -> YearMonth {
        self.terms.start_month
    }

    /// Row for a calendar month, if the month falls inside the schedule
    pub fn row_for(&self, month: YearMonth) -> Option<&AmortizationRow> {
        let offset = month.months_since(self.terms.start_month);
        if offset < 0 {
            return None;
        }
        self.rows.get(offset as usize)
    }

    /// First month whose closing balance is zero
    pub fn payoff_month(&self) -> Option<YearMonth> {
        self.rows.iter().find(|row| row.balance <= 0.0).map(|row| row.month)
    }

    pub fn total_interest(&self) -> f64 {
        self.rows.iter().map(|row| row.interest).sum()
    }

    pub fn final_balance(&self) -> f64 {
        self.rows.last().map(|row| row.balance).unwrap_or(0.0)
    }
}

/// Build a schedule from loose arguments
pub fn build(
    principal: f64,
    annual_rate: f64,
    term_months: i64,
    start_month: &str,
    recurring_extra: f64,
    insurance: f64,
    escrow: f64,
) -> Result<AmortizationSchedule, ForecastError> {
    let terms = ScheduleTerms::new(principal, annual_rate, term_months, start_month)?
        .with_recurring_extra(recurring_extra)
        .with_insurance(insurance)
        .with_escrow(escrow);
    AmortizationSchedule::build(terms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn mortgage_schedule() -> AmortizationSchedule {
        build(320_100.0, 0.0299, 360, "08-2020", 0.0, 0.0, 0.0).unwrap()
    }

    #[test]
    fn test_row_zero_interest() {
        let schedule = mortgage_schedule();
        let row0 = &schedule.rows()[0];

        assert_eq!(row0.interest, 0.0299 / 12.0 * 320_100.0);
        assert_abs_diff_eq!(row0.interest, 797.58, epsilon = 0.005);
        assert_eq!(row0.month.to_string(), "08-2020");
        assert_abs_diff_eq!(row0.principal, schedule.base_payment() - row0.interest, epsilon = 1e-9);
        assert_abs_diff_eq!(row0.balance, 320_100.0 - row0.principal, epsilon = 1e-9);
    }

    #[test]
    fn test_base_payment_matches_annuity_formula() {
        let schedule = mortgage_schedule();
        let r: f64 = 0.0299 / 12.0;
        let expected = 320_100.0 * r / (1.0 - (1.0 + r).powf(-360.0));
        assert_abs_diff_eq!(schedule.base_payment(), expected, epsilon = 1e-9);
        assert_abs_diff_eq!(schedule.base_payment(), 1347.8, epsilon = 0.1);
    }

    #[test]
    fn test_row_count_and_labels() {
        let schedule = mortgage_schedule();
        assert_eq!(schedule.len(), 361);

        for pair in schedule.rows().windows(2) {
            assert_eq!(pair[1].month.months_since(pair[0].month), 1);
        }
        assert_eq!(schedule.rows()[360].month.to_string(), "08-2050");
    }

    #[test]
    fn test_full_amortization() {
        let schedule = mortgage_schedule();

        let total_principal: f64 = schedule.rows().iter().map(|r| r.principal).sum();
        assert_abs_diff_eq!(total_principal, 320_100.0, epsilon = 0.01);
        assert_abs_diff_eq!(schedule.final_balance(), 0.0, epsilon = 0.01);

        // Row 0 is itself a payment, so the loan retires one row before the end
        assert_abs_diff_eq!(schedule.rows()[359].balance, 0.0, epsilon = 0.01);
        assert_eq!(schedule.rows()[360].payment, 0.0);
    }

    #[test]
    fn test_regular_payment_includes_insurance_and_escrow() {
        let schedule = build(320_100.0, 0.0299, 360, "08-2020", 0.0, 95.0, 697.33).unwrap();
        let row = &schedule.rows()[12];
        assert_abs_diff_eq!(row.payment, schedule.base_payment() + 95.0 + 697.33, epsilon = 1e-6);
        assert_abs_diff_eq!(row.interest + row.principal, schedule.base_payment(), epsilon = 1e-6);
    }

    #[test]
    fn test_balances_never_increase() {
        for extra in [0.0, 250.0, 5_000.0] {
            let schedule = build(61_000.0, 0.061, 120, "08-2020", extra, 0.0, 0.0).unwrap();
            let mut previous = 61_000.0;
            for row in schedule.rows() {
                assert!(row.balance <= previous, "extra {}: {} > {}", extra, row.balance, previous);
                assert!(row.balance >= 0.0);
                previous = row.balance;
            }
        }
    }

    #[test]
    fn test_recurring_extra_shortens_the_loan() {
        let plain = build(61_000.0, 0.061, 120, "08-2020", 0.0, 0.0, 0.0).unwrap();
        let extra = build(61_000.0, 0.061, 120, "08-2020", 1_000.0, 0.0, 0.0).unwrap();

        assert_eq!(extra.len(), plain.len());
        assert!(extra.payoff_month().unwrap() < plain.payoff_month().unwrap());
        assert!(extra.total_interest() < plain.total_interest());

        // Extra goes straight to principal while the loan is open
        let row = &extra.rows()[3];
        assert_abs_diff_eq!(row.principal + row.interest, extra.base_payment() + 1_000.0, epsilon = 1e-6);

        // After payoff every row is zero
        let payoff = extra.payoff_month().unwrap();
        for row in extra.rows().iter().filter(|r| r.month > payoff) {
            assert_eq!(row.payment, 0.0);
            assert_eq!(row.balance, 0.0);
        }
    }

    #[test]
    fn test_zero_rate_loan() {
        let schedule = build(12_000.0, 0.0, 12, "01-2024", 0.0, 0.0, 0.0).unwrap();
        assert_abs_diff_eq!(schedule.base_payment(), 1_000.0);
        assert_eq!(schedule.total_interest(), 0.0);
        assert_abs_diff_eq!(schedule.rows()[10].balance, 1_000.0, epsilon = 1e-9);
        assert_eq!(schedule.rows()[11].balance, 0.0);
    }

    #[test]
    fn test_invalid_term() {
        for term in [0, -1, -360, MAX_TERM_MONTHS + 1, i64::MAX] {
            let err = build(100_000.0, 0.05, term, "01-2024", 0.0, 0.0, 0.0).unwrap_err();
            assert_eq!(err, ForecastError::InvalidTerm { term_months: term });
        }
    }

    #[test]
    fn test_longest_term_accepted() {
        let schedule = build(100_000.0, 0.05, MAX_TERM_MONTHS, "01-2024", 0.0, 0.0, 0.0).unwrap();
        assert_eq!(schedule.len(), MAX_TERM_MONTHS as usize + 1);
    }

    #[test]
    fn test_invalid_start_month() {
        let err = build(100_000.0, 0.05, 360, "2024/01", 0.0, 0.0, 0.0).unwrap_err();
        assert!(matches!(err, ForecastError::InvalidDate { .. }));
    }

    #[test]
    fn test_negative_amounts_rejected() {
        let err = build(100_000.0, -0.01, 360, "01-2024", 0.0, 0.0, 0.0).unwrap_err();
        assert!(matches!(err, ForecastError::InvalidConfig { .. }));
    }

    #[test]
    fn test_row_lookup_by_month() {
        let schedule = mortgage_schedule();

        let row = schedule.row_for("10-2026".parse().unwrap()).unwrap();
        assert_eq!(row.month.to_string(), "10-2026");
        assert!(std::ptr::eq(row, &schedule.rows()[74]));

        assert!(schedule.row_for("07-2020".parse().unwrap()).is_none());
        assert!(schedule.row_for("09-2050".parse().unwrap()).is_none());
    }
}
