//! Error types for templeweb-api
//!
//! Handlers never fail the HTTP request for domain errors: HTMX only swaps
//! 2xx responses, so every error is rendered as an inline toast instead.

use templeweb_client::ClientError;
use templeweb_core::{CoreError, DefaultErrorLogger, ErrorContext, ErrorLogger};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<ClientError> for ApiError {
    fn from(error: ClientError) -> Self {
        ApiError::Core(CoreError::Upstream(error))
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest { message: message.into() }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        ApiError::NotFound { resource: resource.into() }
    }

    /// Log through the core error logger, then render as a toast
    pub fn report(&self, context: &ErrorContext) -> String {
        match self {
            ApiError::Core(e) => DefaultErrorLogger.log_error(e, context),
            other => log::warn!(
                target: "templeweb::error",
                "{} - operation: {} - target: {}",
                other,
                context.operation,
                context.target.as_deref().unwrap_or("-")
            ),
        }
        self.toast()
    }

    /// Render as an inline error box
    pub fn toast(&self) -> String {
        match self {
            ApiError::Core(e) => {
                let details = e.to_details();
                let title = if details.retryable { "Service unavailable" } else { "Could not complete" };
                crate::toast_error(title, &details.message, &details.suggestions)
            }
            ApiError::NotFound { .. } => crate::toast_error("Not found", &self.to_string(), &[]),
            ApiError::BadRequest { message } => crate::toast_error("Invalid input", message, &[]),
        }
    }
}
