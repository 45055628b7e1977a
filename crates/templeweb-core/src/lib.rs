//! Accounting rules behind the admin pages
//!
//! - [`balance`]: double-entry totals and the pre-submit check
//! - [`tree`]: chart-of-accounts tree with filter and expansion state
//! - [`code_range`]: advisory code bands for new groups
//! - [`chart`] / [`entry`]: per-navigation page sessions over [`AccountsApi`]

pub mod balance;
pub mod chart;
pub mod code_range;
pub mod entry;
pub mod error;
pub mod tree;

#[cfg(test)]
mod testing;

pub use balance::{compute_totals, validate, LineItem, Totals, ValidEntry, ValidationError, BALANCE_TOLERANCE};
pub use chart::{ChartOfAccounts, GroupDraft};
pub use code_range::{is_valid_code, CodeRange};
pub use entry::{EntryForm, EntryHeader, MIN_ROWS};
pub use error::{
    CoreError, CoreResult, DefaultErrorLogger, ErrorCode, ErrorContext, ErrorDetails, ErrorLogger, ErrorSeverity,
};
pub use templeweb_client::AccountsApi;
pub use tree::{build_tree, find_node_by_id, AccountNode, AccountTree, TreeRow};
