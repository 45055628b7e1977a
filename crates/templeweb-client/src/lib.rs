//! Client for the upstream accounts REST API
//!
//! The upstream service owns persistence, validation and authentication.
//! Pages talk to it through the [`AccountsApi`] trait so sessions can be
//! driven by the HTTP client in production and by in-memory fakes in tests.

use async_trait::async_trait;
use std::sync::Arc;

pub mod error;
pub mod http;
pub mod types;

pub use error::{ClientError, ClientResult};
pub use http::HttpAccountsApi;
pub use types::{
    ApiEnvelope, DrCr, Entry, EntryCreated, EntryItem, EntryItemRequest, EntryItems, EntryKind,
    EntryRequest, Group, GroupPayload, NodeData, NodeType, Permissions, TreeNode, TreeResponse,
};

/// Shared handle to an accounts API implementation
pub type ApiRef = Arc<dyn AccountsApi>;

/// Operations the admin pages need from the accounts API
#[async_trait]
pub trait AccountsApi: Send + Sync {
    /// `GET /accounts/chart-of-accounts/tree`
    async fn chart_tree(&self) -> ClientResult<TreeResponse>;

    /// `GET /accounts/chart-of-accounts/groups/:id`
    async fn group(&self, id: i64) -> ClientResult<Group>;

    /// `POST /accounts/chart-of-accounts/groups`
    async fn create_group(&self, payload: &GroupPayload) -> ClientResult<()>;

    /// `PUT /accounts/chart-of-accounts/groups/:id`
    async fn update_group(&self, id: i64, payload: &GroupPayload) -> ClientResult<()>;

    /// `DELETE /accounts/chart-of-accounts/groups/:id`
    async fn delete_group(&self, id: i64) -> ClientResult<()>;

    /// `GET /accounts/entries/:id`
    async fn entry(&self, id: i64) -> ClientResult<Entry>;

    /// `POST /accounts/entries/journal` or `/accounts/entries/debit-note`
    async fn create_entry(&self, request: &EntryRequest) -> ClientResult<EntryCreated>;
}
