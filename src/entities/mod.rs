//! Household balance-sheet entities
//!
//! Liabilities (loans, the mortgage) and growth accounts (savings,
//! retirement, brokerage) are plain records behind two capability traits.
//! The forecast engine only talks to the traits, in priority order.

mod account;
mod loan;
mod set;

pub use account::{
    BrokerageAccount, ContributionLink, ContributionTerms, RetirementAccount, RetirementKind,
    SavingsAccount, MAX_CONTRIBUTION_LINKS,
};
pub use loan::{
    LiabilityPayment, Loan, LoanTerms, Mortgage, MortgageCosts, PMI_LTV_THRESHOLD,
};
pub use set::EntitySet;

use crate::calendar::YearMonth;

/// Something the household owes and pays down monthly
pub trait Liability {
    fn name(&self) -> &str;

    /// Balance at the start of the forecast
    fn opening_balance(&self) -> f64;

    /// Payment owed for simulated month `month_index` (1-based) falling on `month`
    ///
    /// `None` means no payment data exists for that month.
    fn payment_due(&self, month_index: u32, month: YearMonth) -> Option<LiabilityPayment>;
}

/// Something that grows by a monthly return plus contributions
pub trait GrowthAccount {
    fn name(&self) -> &str;

    fn opening_balance(&self) -> f64;

    /// Nominal annual rate, compounded monthly
    fn annual_rate(&self) -> f64;

    fn monthly_rate(&self) -> f64 {
        self.annual_rate() / 12.0
    }

    /// Return earned on `balance` over one month
    fn monthly_return(&self, balance: f64) -> f64 {
        balance * self.monthly_rate()
    }

    /// Net scheduled deposit for simulated month `month_index` (1-based)
    fn monthly_contribution(&self, month_index: u32) -> f64;
}
