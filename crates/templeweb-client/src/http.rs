//! reqwest implementation of [`AccountsApi`]

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::{ClientError, ClientResult};
use crate::types::{ApiEnvelope, Entry, EntryCreated, EntryRequest, Group, GroupPayload, TreeResponse};
use crate::AccountsApi;

const TREE_PATH: &str = "accounts/chart-of-accounts/tree";
const GROUPS_PATH: &str = "accounts/chart-of-accounts/groups";
const ENTRIES_PATH: &str = "accounts/entries";

/// HTTP client bound to one upstream base URL
#[derive(Debug, Clone)]
pub struct HttpAccountsApi {
    client: Client,
    base_url: String,
}

impl HttpAccountsApi {
    /// Build a client for `base_url` with a per-request timeout
    pub fn new(base_url: &str, timeout: Duration) -> ClientResult<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|_| ClientError::InvalidUrl { url: base_url.clone() })?;

        let client = Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join a relative API path onto the base URL
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send a request and decode the JSON envelope
    ///
    /// Non-2xx responses that still carry an envelope with a message are
    /// reported as rejections so validation messages reach the page.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> ClientResult<ApiEnvelope<T>> {
        let response = request
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::warn!(target: "templeweb::client", "{} failed with HTTP {}", what, status);
            if let Ok(envelope) = serde_json::from_str::<ApiEnvelope<serde_json::Value>>(&body) {
                if let Some(message) = envelope.message {
                    return Err(ClientError::Rejected { message });
                }
            }
            return Err(ClientError::Status { status: status.as_u16(), body });
        }

        response.json::<ApiEnvelope<T>>().await.map_err(|e| ClientError::Decode {
            message: format!("{}: {}", what, e),
        })
    }
}

#[async_trait]
impl AccountsApi for HttpAccountsApi {
    async fn chart_tree(&self) -> ClientResult<TreeResponse> {
        let url = self.url(TREE_PATH);
        log::debug!(target: "templeweb::client", "GET {}", url);
        self.send(self.client.get(&url), "load chart tree").await?.into_data()
    }

    async fn group(&self, id: i64) -> ClientResult<Group> {
        let url = self.url(&format!("{}/{}", GROUPS_PATH, id));
        log::debug!(target: "templeweb::client", "GET {}", url);
        self.send(self.client.get(&url), "load group").await?.into_data()
    }

    async fn create_group(&self, payload: &GroupPayload) -> ClientResult<()> {
        let url = self.url(GROUPS_PATH);
        log::debug!(target: "templeweb::client", "POST {}", url);
        self.send::<serde_json::Value>(self.client.post(&url).json(payload), "create group")
            .await?
            .into_ack()
    }

    async fn update_group(&self, id: i64, payload: &GroupPayload) -> ClientResult<()> {
        let url = self.url(&format!("{}/{}", GROUPS_PATH, id));
        log::debug!(target: "templeweb::client", "PUT {}", url);
        self.send::<serde_json::Value>(self.client.put(&url).json(payload), "update group")
            .await?
            .into_ack()
    }

    async fn delete_group(&self, id: i64) -> ClientResult<()> {
        let url = self.url(&format!("{}/{}", GROUPS_PATH, id));
        log::debug!(target: "templeweb::client", "DELETE {}", url);
        self.send::<serde_json::Value>(self.client.delete(&url), "delete group")
            .await?
            .into_ack()
    }

    async fn entry(&self, id: i64) -> ClientResult<Entry> {
        let url = self.url(&format!("{}/{}", ENTRIES_PATH, id));
        log::debug!(target: "templeweb::client", "GET {}", url);
        self.send(self.client.get(&url), "load entry").await?.into_data()
    }

    async fn create_entry(&self, request: &EntryRequest) -> ClientResult<EntryCreated> {
        let kind = request.items.kind();
        let url = self.url(&format!("{}/{}", ENTRIES_PATH, kind.path()));
        log::debug!(target: "templeweb::client", "POST {}", url);
        let envelope = self
            .send::<EntryCreated>(self.client.post(&url).json(request), "create entry")
            .await?;
        // Some deployments acknowledge without echoing the stored entry
        if envelope.success && envelope.data.is_none() {
            return Ok(EntryCreated::default());
        }
        envelope.into_data()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_join() {
        let api = HttpAccountsApi::new("http://localhost:8000/api/v1/", Duration::from_secs(5)).unwrap();
        assert_eq!(api.base_url(), "http://localhost:8000/api/v1");
        assert_eq!(api.url(TREE_PATH), "http://localhost:8000/api/v1/accounts/chart-of-accounts/tree");
        assert_eq!(api.url("/accounts/entries/9"), "http://localhost:8000/api/v1/accounts/entries/9");
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let result = HttpAccountsApi::new("not a url", Duration::from_secs(5));
        assert!(matches!(result, Err(ClientError::InvalidUrl { .. })));
    }
}
