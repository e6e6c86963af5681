// src/policy.rs
//! Per-flow rules deciding whether an entered amount may proceed.
//!
//! Each amount-entry flow (plain send, CrowdNode transfer, custodial card
//! withdrawal) plugs its own [`AmountPolicy`] into the same converter and
//! session.
use crate::{MonetaryAmount, ValidationBounds, ValidationResult};
use serde::Serialize;
use std::fmt;

/// A problem that blocks continuing with the entered amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AmountIssue {
    Zero,
    BelowMinimum { minimum: u64 },
    InsufficientFunds { available: u64 },
}

impl fmt::Display for AmountIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zero => write!(f, "Amount must be greater than zero"),
            Self::BelowMinimum { minimum } => {
                write!(f, "Amount is below the minimum of {} units", minimum)
            }
            Self::InsufficientFunds { available } => {
                write!(f, "Insufficient funds: {} units available", available)
            }
        }
    }
}

impl std::error::Error for AmountIssue {}

/// Something the user should confirm, but which does not block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AmountWarning {
    /// Sending this leaves less than `leftover_minimum` in the wallet.
    EmptyingWallet { leftover_minimum: u64 },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PolicyVerdict {
    pub issue: Option<AmountIssue>,
    pub warnings: Vec<AmountWarning>,
}

impl PolicyVerdict {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn blocked(issue: AmountIssue) -> Self {
        Self {
            issue: Some(issue),
            warnings: Vec::new(),
        }
    }

    pub fn with_warning(mut self, warning: AmountWarning) -> Self {
        self.warnings.push(warning);
        self
    }

    pub fn is_allowed_to_continue(&self) -> bool {
        self.issue.is_none()
    }
}

pub trait AmountPolicy: Send + Sync {
    fn check(&self, amount: &MonetaryAmount) -> PolicyVerdict;
}

/// Zero is never allowed; then the bounds apply. Exceeding the maximum reads
/// as insufficient funds since the maximum is what can be spent.
fn bounds_issue(native_units: u64, bounds: &ValidationBounds) -> Option<AmountIssue> {
    if native_units == 0 {
        return Some(AmountIssue::Zero);
    }

    match bounds.check(native_units) {
        ValidationResult::Ok => None,
        ValidationResult::BelowMinimum(minimum) => Some(AmountIssue::BelowMinimum { minimum }),
        ValidationResult::AboveMaximum(available) => {
            Some(AmountIssue::InsufficientFunds { available })
        }
    }
}

/// Only requires a non-zero amount.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonZeroPolicy;

impl AmountPolicy for NonZeroPolicy {
    fn check(&self, amount: &MonetaryAmount) -> PolicyVerdict {
        if amount.is_zero() {
            PolicyVerdict::blocked(AmountIssue::Zero)
        } else {
            PolicyVerdict::ok()
        }
    }
}

/// Paying from the wallet: at least the network's minimum output, at most the
/// spendable balance.
#[derive(Debug, Clone, Copy)]
pub struct SendPolicy {
    bounds: ValidationBounds,
}

impl SendPolicy {
    pub fn new(min_output: u64, spendable: u64) -> Self {
        Self {
            bounds: ValidationBounds::new(min_output, spendable),
        }
    }

    pub fn bounds(&self) -> &ValidationBounds {
        &self.bounds
    }
}

impl AmountPolicy for SendPolicy {
    fn check(&self, amount: &MonetaryAmount) -> PolicyVerdict {
        match bounds_issue(amount.native_units(), &self.bounds) {
            Some(issue) => PolicyVerdict::blocked(issue),
            None => PolicyVerdict::ok(),
        }
    }
}

/// Sending while funds sit with CrowdNode, or depositing to it.
///
/// Withdrawing from CrowdNode later needs a leftover balance in the wallet, so
/// an amount that would dip under it gets a warning.
#[derive(Debug, Clone, Copy)]
pub struct CrowdNodeTransferPolicy {
    bounds: ValidationBounds,
    minimum_leftover_balance: u64,
    has_crowdnode_balance: bool,
    is_crowdnode_deposit: bool,
}

impl CrowdNodeTransferPolicy {
    pub fn new(bounds: ValidationBounds, minimum_leftover_balance: u64) -> Self {
        Self {
            bounds,
            minimum_leftover_balance,
            has_crowdnode_balance: false,
            is_crowdnode_deposit: false,
        }
    }

    pub fn with_crowdnode_balance(mut self, has_balance: bool) -> Self {
        self.has_crowdnode_balance = has_balance;
        self
    }

    pub fn deposit(mut self) -> Self {
        self.is_crowdnode_deposit = true;
        self
    }

    fn leaves_too_little(&self, native_units: u64) -> bool {
        native_units.saturating_add(self.minimum_leftover_balance)
            > self.bounds.maximum_native_units
    }
}

impl AmountPolicy for CrowdNodeTransferPolicy {
    fn check(&self, amount: &MonetaryAmount) -> PolicyVerdict {
        if let Some(issue) = bounds_issue(amount.native_units(), &self.bounds) {
            return PolicyVerdict::blocked(issue);
        }

        let verdict = PolicyVerdict::ok();
        let watch_leftover = self.has_crowdnode_balance || self.is_crowdnode_deposit;

        if watch_leftover && self.leaves_too_little(amount.native_units()) {
            verdict.with_warning(AmountWarning::EmptyingWallet {
                leftover_minimum: self.minimum_leftover_balance,
            })
        } else {
            verdict
        }
    }
}

/// Moving funds out of a custodial card (Uphold-style) into the wallet.
#[derive(Debug, Clone, Copy)]
pub struct CustodialCardPolicy {
    card_available: u64,
}

impl CustodialCardPolicy {
    pub fn new(card_available: u64) -> Self {
        Self { card_available }
    }

    pub fn card_available(&self) -> u64 {
        self.card_available
    }

    /// Amount to request once the provider has quoted `fee`.
    ///
    /// Unchanged if amount plus fee fits the card; otherwise the fee comes out
    /// of the amount. `None` when nothing would be left to transfer.
    pub fn fee_corrected_amount(&self, amount: u64, fee: u64) -> Option<u64> {
        if amount == 0 {
            return None;
        }
        if amount.saturating_add(fee) <= self.card_available {
            return Some(amount);
        }

        amount.checked_sub(fee).filter(|corrected| *corrected > 0)
    }
}

impl AmountPolicy for CustodialCardPolicy {
    fn check(&self, amount: &MonetaryAmount) -> PolicyVerdict {
        let bounds = ValidationBounds::up_to(self.card_available);
        match bounds_issue(amount.native_units(), &bounds) {
            Some(issue) => PolicyVerdict::blocked(issue),
            None => PolicyVerdict::ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AmountConverter;

    fn amount(units: u64) -> MonetaryAmount {
        AmountConverter::default().from_native_units(units, None, "USD")
    }

    #[test]
    fn test_non_zero_policy() {
        assert_eq!(
            NonZeroPolicy.check(&amount(0)).issue,
            Some(AmountIssue::Zero)
        );
        assert!(NonZeroPolicy.check(&amount(1)).is_allowed_to_continue());
    }

    #[test]
    fn test_send_policy() {
        let policy = SendPolicy::new(1_000, 50_000);

        assert_eq!(policy.check(&amount(0)).issue, Some(AmountIssue::Zero));
        assert_eq!(
            policy.check(&amount(999)).issue,
            Some(AmountIssue::BelowMinimum { minimum: 1_000 })
        );
        assert!(policy.check(&amount(1_000)).is_allowed_to_continue());
        assert!(policy.check(&amount(50_000)).is_allowed_to_continue());
        assert_eq!(
            policy.check(&amount(50_001)).issue,
            Some(AmountIssue::InsufficientFunds { available: 50_000 })
        );
    }

    #[test]
    fn test_crowdnode_warns_when_emptying_wallet() {
        let bounds = ValidationBounds::new(1_000, 1_000_000);
        let policy = CrowdNodeTransferPolicy::new(bounds, 300_000).with_crowdnode_balance(true);

        let verdict = policy.check(&amount(800_000));

        assert!(verdict.is_allowed_to_continue());
        assert_eq!(
            verdict.warnings,
            vec![AmountWarning::EmptyingWallet {
                leftover_minimum: 300_000
            }]
        );

        assert!(policy.check(&amount(700_000)).warnings.is_empty());
    }

    #[test]
    fn test_crowdnode_no_warning_without_balance() {
        let bounds = ValidationBounds::new(1_000, 1_000_000);
        let policy = CrowdNodeTransferPolicy::new(bounds, 300_000);

        assert!(policy.check(&amount(900_000)).warnings.is_empty());
        assert_eq!(policy.deposit().check(&amount(900_000)).warnings.len(), 1);
    }

    #[test]
    fn test_crowdnode_issue_wins_over_warning() {
        let bounds = ValidationBounds::new(1_000, 1_000_000);
        let policy = CrowdNodeTransferPolicy::new(bounds, 300_000).deposit();

        let verdict = policy.check(&amount(2_000_000));

        assert_eq!(
            verdict.issue,
            Some(AmountIssue::InsufficientFunds {
                available: 1_000_000
            })
        );
        assert!(verdict.warnings.is_empty());
    }

    #[test]
    fn test_custodial_card_policy() {
        let policy = CustodialCardPolicy::new(10_000);

        assert!(policy.check(&amount(10_000)).is_allowed_to_continue());
        assert_eq!(
            policy.check(&amount(10_001)).issue,
            Some(AmountIssue::InsufficientFunds { available: 10_000 })
        );
    }

    #[test]
    fn test_fee_corrected_amount() {
        let policy = CustodialCardPolicy::new(10_000);

        assert_eq!(policy.fee_corrected_amount(9_000, 500), Some(9_000));
        assert_eq!(policy.fee_corrected_amount(10_000, 500), Some(9_500));
        assert_eq!(policy.fee_corrected_amount(500, 500), Some(500));
        assert_eq!(CustodialCardPolicy::new(400).fee_corrected_amount(400, 400), None);
        assert_eq!(policy.fee_corrected_amount(0, 10), None);
    }

    #[test]
    fn test_issue_messages() {
        assert_eq!(
            AmountIssue::InsufficientFunds { available: 5 }.to_string(),
            "Insufficient funds: 5 units available"
        );
    }
}
