//! Error types for templeweb-core
//!
//! Every error here is recoverable: pages render it as an inline message
//! and keep working. Upstream failures are wrapped so the page can offer
//! a retry.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use templeweb_client::ClientError;
use thiserror::Error;

use crate::balance::ValidationError;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// No row has both a ledger and an amount
    NoValidItems,
    /// Debit and credit totals differ
    Unbalanced,
    /// Tree node id not present
    NodeNotFound,
    /// Operation needs a group but got a ledger
    NotAGroup,
    /// Group is system-protected
    FixedGroup,
    /// Permissions from the tree payload forbid the action
    PermissionDenied,
    /// Line totals overflow the amount type
    AmountTooLarge,
    /// Entry form would drop below its minimum rows
    TooFewRows,
    /// Entry form row index out of range
    RowOutOfRange,
    /// Upstream API failure
    Upstream,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::NoValidItems => write!(f, "NO_VALID_ITEMS"),
            ErrorCode::Unbalanced => write!(f, "UNBALANCED"),
            ErrorCode::NodeNotFound => write!(f, "NODE_NOT_FOUND"),
            ErrorCode::NotAGroup => write!(f, "NOT_A_GROUP"),
            ErrorCode::FixedGroup => write!(f, "FIXED_GROUP"),
            ErrorCode::PermissionDenied => write!(f, "PERMISSION_DENIED"),
            ErrorCode::AmountTooLarge => write!(f, "AMOUNT_TOO_LARGE"),
            ErrorCode::TooFewRows => write!(f, "TOO_FEW_ROWS"),
            ErrorCode::RowOutOfRange => write!(f, "ROW_OUT_OF_RANGE"),
            ErrorCode::Upstream => write!(f, "UPSTREAM"),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Informational, nothing to fix
    Info,
    /// User input must change before retrying
    Warning,
    /// Operation failed for reasons outside the page
    Error,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
        }
    }
}

/// Detailed error information for toasts and JSON responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
    pub severity: ErrorSeverity,
    pub retryable: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    pub fn new(code: ErrorCode, message: String, severity: ErrorSeverity) -> Self {
        Self {
            code,
            message,
            severity,
            retryable: false,
            suggestions: vec![],
        }
    }

    pub fn retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Main error type for templeweb-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Enter at least one line with a ledger and an amount")]
    NoValidItems,

    #[error("Debit and credit totals differ by {difference}")]
    Unbalanced { difference: Decimal },

    #[error("Amounts are too large to total")]
    AmountTooLarge,

    #[error("Account node not found: {id}")]
    NodeNotFound { id: String },

    #[error("Not an account group: {id}")]
    NotAGroup { id: String },

    #[error("Group {id} is system-protected and cannot be changed")]
    FixedGroup { id: String },

    #[error("Not permitted to {action}")]
    PermissionDenied { action: String },

    #[error("An entry needs at least {min} lines")]
    TooFewRows { min: usize },

    #[error("No entry line at position {index}")]
    RowOutOfRange { index: usize },

    #[error("Accounts service error: {0}")]
    Upstream(#[from] ClientError),
}

impl From<ValidationError> for CoreError {
    fn from(error: ValidationError) -> Self {
        match error {
            ValidationError::NoValidItems => CoreError::NoValidItems,
            ValidationError::Unbalanced { difference } => CoreError::Unbalanced { difference },
            ValidationError::AmountTooLarge => CoreError::AmountTooLarge,
        }
    }
}

impl CoreError {
    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::NoValidItems => ErrorCode::NoValidItems,
            CoreError::Unbalanced { .. } => ErrorCode::Unbalanced,
            CoreError::AmountTooLarge => ErrorCode::AmountTooLarge,
            CoreError::NodeNotFound { .. } => ErrorCode::NodeNotFound,
            CoreError::NotAGroup { .. } => ErrorCode::NotAGroup,
            CoreError::FixedGroup { .. } => ErrorCode::FixedGroup,
            CoreError::PermissionDenied { .. } => ErrorCode::PermissionDenied,
            CoreError::TooFewRows { .. } => ErrorCode::TooFewRows,
            CoreError::RowOutOfRange { .. } => ErrorCode::RowOutOfRange,
            CoreError::Upstream(_) => ErrorCode::Upstream,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::NodeNotFound { .. } => ErrorSeverity::Info,
            CoreError::Upstream(_) => ErrorSeverity::Error,
            _ => ErrorSeverity::Warning,
        }
    }

    /// Whether the same request may succeed if sent again unchanged
    pub fn is_retryable(&self) -> bool {
        match self {
            CoreError::Upstream(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let details = ErrorDetails::new(self.code(), self.to_string(), self.severity())
            .retryable(self.is_retryable());

        match self {
            CoreError::NoValidItems => details.with_suggestion(
                "Pick a ledger and enter a debit or credit amount on each line.".to_string()
            ),
            CoreError::Unbalanced { .. } => details.with_suggestion(
                "Adjust the amounts until total debit equals total credit.".to_string()
            ),
            CoreError::AmountTooLarge => details.with_suggestion(
                "Check the amounts for extra digits.".to_string()
            ),
            CoreError::NodeNotFound { .. } => details.with_suggestion(
                "The chart may have changed; reload the page.".to_string()
            ),
            CoreError::Upstream(e) if e.is_retryable() => details.with_suggestion(
                "The accounts service is unreachable; try again shortly.".to_string()
            ),
            _ => details,
        }
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

/// Error context for reporting
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Page or action being performed, e.g. `chart.delete_group`
    pub operation: String,
    /// Tree node or entry the operation targeted
    pub target: Option<String>,
}

impl ErrorContext {
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            target: None,
        }
    }

    pub fn with_target(mut self, target: &str) -> Self {
        self.target = Some(target.to_string());
        self
    }
}

/// Error logger trait
pub trait ErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext);
}

/// Default error logger using log crate
///
/// User-input problems log at `warn`, upstream failures at `error`.
#[derive(Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        let target = context.target.as_deref().unwrap_or("-");
        match error.severity() {
            ErrorSeverity::Error => log::error!(
                target: "templeweb::error",
                "[{}] {} - operation: {} - target: {}",
                error.code(), error, context.operation, target
            ),
            ErrorSeverity::Warning => log::warn!(
                target: "templeweb::error",
                "[{}] {} - operation: {} - target: {}",
                error.code(), error, context.operation, target
            ),
            ErrorSeverity::Info => log::info!(
                target: "templeweb::error",
                "[{}] {} - operation: {} - target: {}",
                error.code(), error, context.operation, target
            ),
        }
    }
}

// ==================== Tests ====================
