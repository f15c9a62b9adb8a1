//! Memoization of schedules across repeated runs
//!
//! A schedule is a pure function of its terms, so runs that share loan terms
//! (scenario sweeps, repeated CLI runs inside one process) can reuse the
//! same immutable schedule instead of rebuilding 360+ rows each time.

use super::schedule::{AmortizationSchedule, ScheduleTerms};
use crate::calendar::YearMonth;
use crate::error::ForecastError;
use std::collections::HashMap;
use std::sync::Arc;

/// Exact identity of a set of terms (floats compared bit-for-bit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct TermsKey {
    principal: u64,
    annual_rate: u64,
    term_months: i64,
    start_month: YearMonth,
    recurring_extra: u64,
    insurance: u64,
    escrow: u64,
}

impl From<&ScheduleTerms> for TermsKey {
    fn from(terms: &ScheduleTerms) -> Self {
        Self {
            principal: terms.principal.to_bits(),
            annual_rate: terms.annual_rate.to_bits(),
            term_months: terms.term_months,
            start_month: terms.start_month,
            recurring_extra: terms.recurring_extra.to_bits(),
            insurance: terms.insurance.to_bits(),
            escrow: terms.escrow.to_bits(),
        }
    }
}

/// Cache of built schedules keyed by their terms
#[derive(Debug, Default)]
pub struct ScheduleCache {
    entries: HashMap<TermsKey, Arc<AmortizationSchedule>>,

    /// Statistics
    pub hits: u64,
    pub misses: u64,
}

impl ScheduleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached schedule for these terms, building it on first use
    ///
    /// Invalid terms are never cached; every call re-reports the error.
    pub fn get_or_build(
        &mut self,
        terms: &ScheduleTerms,
    ) -> Result<Arc<AmortizationSchedule>, ForecastError> {
        let key = TermsKey::from(terms);
        if let Some(schedule) = self.entries.get(&key) {
            self.hits += 1;
            return Ok(Arc::clone(schedule));
        }

        self.misses += 1;
        let schedule = Arc::new(AmortizationSchedule::build(*terms)?);
        self.entries.insert(key, Arc::clone(&schedule));
        Ok(schedule)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }

    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(extra: f64) -> ScheduleTerms {
        ScheduleTerms::new(320_100.0, 0.0299, 360, "08-2020")
            .unwrap()
            .with_recurring_extra(extra)
    }

    #[test]
    fn test_same_terms_share_one_schedule() {
        let mut cache = ScheduleCache::new();

        let first = cache.get_or_build(&terms(0.0)).unwrap();
        let second = cache.get_or_build(&terms(0.0)).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.misses, 1);
        assert_eq!(cache.hits, 1);
        assert!((cache.hit_rate() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_different_terms_build_separately() {
        let mut cache = ScheduleCache::new();

        let plain = cache.get_or_build(&terms(0.0)).unwrap();
        let extra = cache.get_or_build(&terms(200.0)).unwrap();

        assert!(!Arc::ptr_eq(&plain, &extra));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.hits, 0);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let mut cache = ScheduleCache::new();
        let mut bad = terms(0.0);
        bad.term_months = 0;

        assert!(cache.get_or_build(&bad).is_err());
        assert!(cache.get_or_build(&bad).is_err());
        assert!(cache.is_empty());

        cache.clear();
        assert_eq!(cache.misses, 0);
    }
}
