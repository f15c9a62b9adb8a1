//! Amortization schedules for fixed-rate loans

mod schedule;
mod cache;

pub use schedule::{build, AmortizationRow, AmortizationSchedule, ScheduleTerms, MAX_TERM_MONTHS};
pub use cache::ScheduleCache;

use crate::error::ForecastError;
use rayon::prelude::*;

/// Build several independent schedules in parallel, preserving input order
pub fn build_many(terms: &[ScheduleTerms]) -> Vec<Result<AmortizationSchedule, ForecastError>> {
    terms
        .par_iter()
        .map(|t| AmortizationSchedule::build(*t))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_many_keeps_order_and_errors() {
        let good = ScheduleTerms::new(14_100.0, 0.0499, 36, "10-2023").unwrap();
        let mut bad = good;
        bad.term_months = -5;
        let long = ScheduleTerms::new(61_000.0, 0.061, 120, "08-2020").unwrap();

        let built = build_many(&[good, bad, long]);

        assert_eq!(built.len(), 3);
        assert_eq!(built[0].as_ref().unwrap().len(), 37);
        assert!(matches!(built[1], Err(ForecastError::InvalidTerm { term_months: -5 })));
        assert_eq!(built[2].as_ref().unwrap().len(), 121);
    }
}
