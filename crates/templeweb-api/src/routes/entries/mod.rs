//! Entry routes - Journal entries and debit notes
//!
//! Features:
//! - Form with header fields and at least two debit / credit lines
//! - Live totals with balance indicator
//! - Add and remove lines server-side
//! - Copy an existing entry with `?from=<id>`
//!
//! Structure:
//! - api.rs: HTMX partials and submission
//! - page.rs: Form page rendering

pub mod api;
pub mod page;

pub use api::{htmx_entry_row_add, htmx_entry_row_remove, htmx_entry_store, htmx_entry_totals};
pub use page::{page_entry_new, render_entry_form, render_rows, render_totals};
