//! Double-entry balance check for journal and debit-note lines

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use templeweb_client::EntryItemRequest;
use thiserror::Error;

/// Largest difference between debit and credit totals still treated as balanced
/// (exclusive). Amounts are currency values at 2-decimal precision.
pub const BALANCE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// One line of an entry form
///
/// At most one of `debit` / `credit` is non-zero when edited through
/// [`LineItem::set_debit`] and [`LineItem::set_credit`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub ledger_id: Option<i64>,
    pub debit: Decimal,
    pub credit: Decimal,
}

impl LineItem {
    pub fn debit(ledger_id: i64, amount: Decimal) -> Self {
        let mut item = Self { ledger_id: Some(ledger_id), ..Self::default() };
        item.set_debit(amount);
        item
    }

    pub fn credit(ledger_id: i64, amount: Decimal) -> Self {
        let mut item = Self { ledger_id: Some(ledger_id), ..Self::default() };
        item.set_credit(amount);
        item
    }

    /// Set the debit side; a positive value clears the credit side
    pub fn set_debit(&mut self, amount: Decimal) {
        self.debit = amount.max(Decimal::ZERO);
        if self.debit > Decimal::ZERO {
            self.credit = Decimal::ZERO;
        }
    }

    /// Set the credit side; a positive value clears the debit side
    pub fn set_credit(&mut self, amount: Decimal) {
        self.credit = amount.max(Decimal::ZERO);
        if self.credit > Decimal::ZERO {
            self.debit = Decimal::ZERO;
        }
    }

    pub fn has_amount(&self) -> bool {
        self.debit > Decimal::ZERO || self.credit > Decimal::ZERO
    }

    /// Has a ledger and a positive amount, so it will be submitted
    pub fn is_postable(&self) -> bool {
        self.ledger_id.is_some() && self.has_amount()
    }

    pub fn to_request(&self) -> Option<EntryItemRequest> {
        if !self.is_postable() {
            return None;
        }
        Some(EntryItemRequest {
            ledger_id: self.ledger_id?,
            dr_amount: self.debit,
            cr_amount: self.credit,
        })
    }
}

/// Debit / credit totals of a set of lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub total_debit: Decimal,
    pub total_credit: Decimal,
    /// `|total_debit - total_credit|`
    pub difference: Decimal,
    pub balanced: bool,
}

fn checked_sum(mut amounts: impl Iterator<Item = Decimal>) -> Result<Decimal, ValidationError> {
    amounts
        .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount))
        .ok_or(ValidationError::AmountTooLarge)
}

/// Sum both sides and compare them within [`BALANCE_TOLERANCE`]
///
/// Fails with [`ValidationError::AmountTooLarge`] when a side overflows
/// `Decimal`.
pub fn compute_totals(items: &[LineItem]) -> Result<Totals, ValidationError> {
    let total_debit = checked_sum(items.iter().map(|i| i.debit))?;
    let total_credit = checked_sum(items.iter().map(|i| i.credit))?;
    // both sides are non-negative, so the subtraction stays in range
    let difference = (total_debit - total_credit).abs();
    Ok(Totals {
        total_debit,
        total_credit,
        difference,
        balanced: difference < BALANCE_TOLERANCE,
    })
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("no line has both a ledger and an amount")]
    NoValidItems,

    #[error("entry is unbalanced by {difference}")]
    Unbalanced { difference: Decimal },

    #[error("line amounts add up to more than can be represented")]
    AmountTooLarge,
}

/// Lines that passed validation, ready to submit
#[derive(Debug, Clone, PartialEq)]
pub struct ValidEntry {
    pub items: Vec<LineItem>,
    pub totals: Totals,
}

impl ValidEntry {
    pub fn requests(&self) -> Vec<EntryItemRequest> {
        self.items.iter().filter_map(LineItem::to_request).collect()
    }
}

/// Check a set of lines before submission
///
/// Balance is checked on every line as shown to the user and again on the
/// postable subset, so a line with an amount but no ledger cannot be
/// silently dropped from a balanced-looking entry.
pub fn validate(items: &[LineItem]) -> Result<ValidEntry, ValidationError> {
    let postable: Vec<LineItem> = items.iter().filter(|i| i.is_postable()).cloned().collect();
    if postable.is_empty() {
        return Err(ValidationError::NoValidItems);
    }

    let shown = compute_totals(items)?;
    if !shown.balanced {
        return Err(ValidationError::Unbalanced { difference: shown.difference });
    }

    let totals = compute_totals(&postable)?;
    if !totals.balanced {
        return Err(ValidationError::Unbalanced { difference: totals.difference });
    }

    Ok(ValidEntry { items: postable, totals })
}
