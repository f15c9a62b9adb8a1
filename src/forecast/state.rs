/// Payoff state of a liability, derived from its balance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiabilityState {
    /// Positive balance; payments reduce it
    Active,
    /// Balance is zero; payments are freed for redirection
    Exhausted,
}

impl LiabilityState {
    pub fn from_balance(balance: f64) -> Self {
        if balance > 0.0 {
            LiabilityState::Active
        } else {
            LiabilityState::Exhausted
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, LiabilityState::Exhausted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_from_balance() {
        assert_eq!(LiabilityState::from_balance(0.01), LiabilityState::Active);
        assert_eq!(LiabilityState::from_balance(0.0), LiabilityState::Exhausted);
        assert!(LiabilityState::from_balance(-0.0).is_exhausted());
    }
}
