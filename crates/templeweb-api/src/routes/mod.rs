//! Route modules for the admin server
//!
//! - chart: Chart-of-accounts tree, node detail and group maintenance
//! - entries: Journal / debit-note forms, live totals and submission
//! - settings: Settings page
//!
//! Each module follows a consistent structure:
//! - mod.rs: Module declaration and exports
//! - api.rs: JSON API endpoints and HTMX partials
//! - page.rs: HTMX page rendering

pub mod chart;
pub mod entries;
pub mod settings;
