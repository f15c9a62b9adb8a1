//! Waterfall redirection of debt payments
//!
//! Liabilities are processed in priority order. A liability can absorb at
//! most its remaining balance. Its remainder (the excess, or the whole freed
//! payment of a liability already at zero) goes to the immediately following
//! liability when that one still owes money, otherwise to the brokerage.

use super::state::LiabilityState;
use crate::entities::LiabilityPayment;

/// One liability's input for a month
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiabilityStep {
    pub previous_balance: f64,
    pub payment: LiabilityPayment,
}

/// Result of cascading one month of payments
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WaterfallOutcome {
    /// New balance per liability, same order as the input
    pub balances: Vec<f64>,

    /// Principal actually absorbed by each liability
    pub applied: Vec<f64>,

    /// Cash not absorbed by any liability, destined for the brokerage
    pub redirected_to_brokerage: f64,

    /// Indices of liabilities that reached zero this month
    pub newly_exhausted: Vec<usize>,
}

/// Apply a month of payments across liabilities in priority order
pub fn cascade(steps: &[LiabilityStep]) -> WaterfallOutcome {
    let mut outcome = WaterfallOutcome {
        balances: Vec::with_capacity(steps.len()),
        applied: Vec::with_capacity(steps.len()),
        ..Default::default()
    };
    // Remainder handed over by the previous liability; only ever non-zero
    // when the current liability is active
    let mut incoming = 0.0;

    for (i, step) in steps.iter().enumerate() {
        let previous = step.previous_balance;

        let remainder = if LiabilityState::from_balance(previous).is_exhausted() {
            // Balances never rise back from zero
            outcome.balances.push(previous.max(0.0));
            outcome.applied.push(0.0);
            step.payment.freed_capacity()
        } else {
            let capacity = step.payment.principal + incoming;
            if capacity >= previous {
                outcome.balances.push(0.0);
                outcome.applied.push(previous);
                outcome.newly_exhausted.push(i);
                capacity - previous
            } else {
                outcome.balances.push(previous - capacity);
                outcome.applied.push(capacity);
                0.0
            }
        };

        let next_active = steps
            .get(i + 1)
            .map(|next| !LiabilityState::from_balance(next.previous_balance).is_exhausted())
            .unwrap_or(false);
        if next_active {
            incoming = remainder;
        } else {
            incoming = 0.0;
            outcome.redirected_to_brokerage += remainder;
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn step(previous_balance: f64, principal: f64, interest: f64) -> LiabilityStep {
        LiabilityStep {
            previous_balance,
            payment: LiabilityPayment {
                principal,
                interest,
                escrow: 0.0,
            },
        }
    }

    #[test]
    fn test_partial_payment_reduces_balance() {
        let outcome = cascade(&[step(1_000.0, 300.0, 10.0)]);
        assert_eq!(outcome.balances, vec![700.0]);
        assert_eq!(outcome.redirected_to_brokerage, 0.0);
        assert!(outcome.newly_exhausted.is_empty());
    }

    #[test]
    fn test_overpayment_clamps_and_redirects() {
        // 600 owed, 700 paid: 100 goes to the brokerage
        let outcome = cascade(&[step(600.0, 700.0, 0.0)]);
        assert_eq!(outcome.balances, vec![0.0]);
        assert_eq!(outcome.applied, vec![600.0]);
        assert_relative_eq!(outcome.redirected_to_brokerage, 100.0);
        assert_eq!(outcome.newly_exhausted, vec![0]);
    }

    #[test]
    fn test_excess_flows_to_next_liability() {
        let outcome = cascade(&[step(600.0, 700.0, 0.0), step(5_000.0, 250.0, 0.0)]);
        assert_eq!(outcome.balances, vec![0.0, 4_650.0]);
        assert_relative_eq!(outcome.applied[1], 350.0);
        assert_eq!(outcome.redirected_to_brokerage, 0.0);
    }

    #[test]
    fn test_exhausted_liability_frees_principal_and_interest() {
        let outcome = cascade(&[step(0.0, 900.0, 400.0), step(10_000.0, 250.0, 0.0)]);
        assert_eq!(outcome.balances, vec![0.0, 8_450.0]);
        assert_eq!(outcome.applied[0], 0.0);
        assert!(outcome.newly_exhausted.is_empty());
    }

    #[test]
    fn test_remainder_stops_at_paid_off_neighbour() {
        // The 100 excess meets a paid-off loan and goes to the brokerage;
        // that loan's own freed 300 reaches the car loan behind it
        let outcome = cascade(&[
            step(600.0, 700.0, 0.0),
            step(0.0, 300.0, 0.0),
            step(5_000.0, 250.0, 0.0),
        ]);
        assert_eq!(outcome.balances, vec![0.0, 0.0, 4_450.0]);
        assert_relative_eq!(outcome.applied[2], 550.0);
        assert_relative_eq!(outcome.redirected_to_brokerage, 100.0);
        assert_eq!(outcome.newly_exhausted, vec![0]);
    }

    #[test]
    fn test_chained_payoffs_in_one_month() {
        let outcome = cascade(&[
            step(100.0, 400.0, 0.0),
            step(200.0, 50.0, 0.0),
            step(1_000.0, 100.0, 0.0),
        ]);
        // 300 spills into the second loan, which then spills 150 into the third
        assert_eq!(outcome.balances, vec![0.0, 0.0, 750.0]);
        assert_eq!(outcome.newly_exhausted, vec![0, 1]);
        assert_eq!(outcome.redirected_to_brokerage, 0.0);
    }

    #[test]
    fn test_floor_is_idempotent() {
        let first = cascade(&[step(0.0, 700.0, 0.0)]);
        let second = cascade(&[step(first.balances[0], 700.0, 0.0)]);
        assert_eq!(second.balances, vec![0.0]);
        assert_relative_eq!(second.redirected_to_brokerage, 700.0);
    }

    #[test]
    fn test_escrow_is_never_redirected() {
        let outcome = cascade(&[LiabilityStep {
            previous_balance: 0.0,
            payment: LiabilityPayment {
                principal: 500.0,
                interest: 100.0,
                escrow: 700.0,
            },
        }]);
        assert_relative_eq!(outcome.redirected_to_brokerage, 600.0);
    }
}
