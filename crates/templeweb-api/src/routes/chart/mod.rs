//! Chart-of-accounts routes
//!
//! Features:
//! - Indented tree of groups and ledgers with expand / collapse
//! - Substring search on name or code that opens the path to each match
//! - Node detail panel with breadcrumb and counts
//! - Create, edit and delete groups, guarded by the permissions that
//!   come with the tree
//!
//! Structure:
//! - api.rs: HTMX partials and group actions
//! - page.rs: Full page and tree rendering

pub mod api;
pub mod page;

pub use api::{
    htmx_chart_node,
    htmx_chart_tree,
    htmx_code_range,
    htmx_group_create,
    htmx_group_delete,
    htmx_group_edit_form,
    htmx_group_new_form,
    htmx_group_update,
};
pub use page::{page_chart, render_node_detail, render_tree};
