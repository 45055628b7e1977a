//! Chart-of-accounts page session
//!
//! One [`ChartOfAccounts`] is built per page navigation. It owns the tree,
//! the permissions that came with it and the current selection. Every
//! group mutation goes through [`ChartOfAccounts::write_then_refresh`], so
//! the tree shown after a write is always the one the service returns.

use std::collections::HashSet;

use templeweb_client::{ApiRef, ClientResult, Group, GroupPayload, Permissions};

use crate::code_range::CodeRange;
use crate::error::{CoreError, CoreResult};
use crate::tree::{AccountNode, AccountTree};

/// Group form contents as typed by the user
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupDraft {
    pub name: String,
    pub code: String,
    /// Tree id of the parent group (`g_<id>`), `None` for a top-level group
    pub parent_id: Option<String>,
}

pub struct ChartOfAccounts {
    api: ApiRef,
    tree: AccountTree,
    permissions: Permissions,
    selected: Option<String>,
}

impl ChartOfAccounts {
    /// Fetch the tree and build a fresh session
    pub async fn init(api: ApiRef) -> CoreResult<Self> {
        let mut chart = Self {
            api,
            tree: AccountTree::default(),
            permissions: Permissions::default(),
            selected: None,
        };
        chart.refresh().await?;
        Ok(chart)
    }

    /// Re-fetch and rebuild the tree
    ///
    /// Expansion, the active filter and the selection carry over for nodes
    /// that still exist.
    pub async fn refresh(&mut self) -> CoreResult<()> {
        let response = self.api.chart_tree().await?;

        let expanded: HashSet<String> = self
            .tree
            .iter()
            .filter(|n| n.expanded)
            .map(|n| n.id.clone())
            .collect();
        let filter = self.tree.filter().to_string();

        let mut tree = AccountTree::build(&response.tree);
        for id in &expanded {
            tree.set_expanded(id, true);
        }
        if !filter.is_empty() {
            tree.filter_by_substring(&filter);
        }

        if let Some(id) = &self.selected {
            if !tree.contains(id) {
                log::debug!(target: "templeweb::chart", "selection {} dropped after refresh", id);
                self.selected = None;
            }
        }

        self.tree = tree;
        self.permissions = response.permissions;
        log::info!(target: "templeweb::chart", "chart loaded: {} nodes", self.tree.len());
        Ok(())
    }

    pub fn tree(&self) -> &AccountTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut AccountTree {
        &mut self.tree
    }

    pub fn permissions(&self) -> Permissions {
        self.permissions
    }

    pub fn select(&mut self, id: &str) -> CoreResult<&AccountNode> {
        let node = self
            .tree
            .get(id)
            .ok_or_else(|| CoreError::NodeNotFound { id: id.to_string() })?;
        self.selected = Some(node.id.clone());
        Ok(node)
    }

    pub fn selected(&self) -> Option<&AccountNode> {
        self.selected.as_deref().and_then(|id| self.tree.get(id))
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Advisory code band for a new group under `parent_id`
    ///
    /// `None` for top-level groups, unknown parents and parents whose code
    /// is not 4 digits.
    pub fn code_range_for_parent(&self, parent_id: Option<&str>) -> Option<CodeRange> {
        let parent = self.tree.get(parent_id?)?;
        if !parent.is_group() {
            return None;
        }
        CodeRange::for_parent_code(&parent.data.code)
    }

    /// Load a group for the edit form
    pub async fn load_group(&self, id: &str) -> CoreResult<Group> {
        let group_id = self.group_id_of(id)?;
        Ok(self.api.group(group_id).await?)
    }

    pub async fn create_group(&mut self, draft: &GroupDraft) -> CoreResult<()> {
        if !self.permissions.can_create {
            return Err(CoreError::PermissionDenied { action: "create groups".to_string() });
        }
        let payload = self.payload(draft)?;
        let result = self.api.create_group(&payload).await;
        self.write_then_refresh("create group", result).await
    }

    pub async fn update_group(&mut self, id: &str, draft: &GroupDraft) -> CoreResult<()> {
        if !self.permissions.can_edit {
            return Err(CoreError::PermissionDenied { action: "edit groups".to_string() });
        }
        let group_id = self.editable_group(id)?;
        let payload = self.payload(draft)?;
        let result = self.api.update_group(group_id, &payload).await;
        self.write_then_refresh("update group", result).await
    }

    pub async fn delete_group(&mut self, id: &str) -> CoreResult<()> {
        if !self.permissions.can_delete {
            return Err(CoreError::PermissionDenied { action: "delete groups".to_string() });
        }
        let group_id = self.editable_group(id)?;
        let result = self.api.delete_group(group_id).await;
        self.write_then_refresh("delete group", result).await
    }

    /// Apply the outcome of an upstream write: on success re-fetch the tree,
    /// on failure keep the current tree and report
    pub async fn write_then_refresh(&mut self, action: &str, result: ClientResult<()>) -> CoreResult<()> {
        if let Err(e) = result {
            log::warn!(target: "templeweb::chart", "{} failed: {}", action, e);
            return Err(e.into());
        }
        log::info!(target: "templeweb::chart", "{} succeeded, refreshing", action);
        self.refresh().await
    }

    fn group_id_of(&self, id: &str) -> CoreResult<i64> {
        let node = self
            .tree
            .get(id)
            .ok_or_else(|| CoreError::NodeNotFound { id: id.to_string() })?;
        node.group_id().ok_or_else(|| CoreError::NotAGroup { id: id.to_string() })
    }

    fn editable_group(&self, id: &str) -> CoreResult<i64> {
        let group_id = self.group_id_of(id)?;
        if self.tree.get(id).map_or(false, |n| n.data.fixed) {
            return Err(CoreError::FixedGroup { id: id.to_string() });
        }
        Ok(group_id)
    }

    fn payload(&self, draft: &GroupDraft) -> CoreResult<GroupPayload> {
        let parent_id = match draft.parent_id.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(id) => Some(self.group_id_of(id)?),
        };
        Ok(GroupPayload {
            name: draft.name.trim().to_string(),
            code: draft.code.trim().to_string(),
            parent_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::testing::{group, ledger, FakeApi};
    use std::sync::Arc;
    use templeweb_client::TreeNode;

    fn sample() -> Vec<TreeNode> {
        vec![
            group(1, "Assets", "1000", true, vec![
                group(2, "Current Assets", "1100", false, vec![
                    ledger(1, "Petty Cash", "1001"),
                ]),
            ]),
            group(3, "Income", "4000", false, vec![ledger(2, "Donations", "4100")]),
        ]
    }

    async fn chart_with(permissions: Permissions) -> (Arc<FakeApi>, ChartOfAccounts) {
        let api = Arc::new(FakeApi::new(sample(), permissions));
        let chart = ChartOfAccounts::init(api.clone()).await.unwrap();
        (api, chart)
    }

    #[tokio::test]
    async fn test_init_builds_tree() {
        let (api, chart) = chart_with(FakeApi::all_permissions()).await;
        assert_eq!(chart.tree().len(), 5);
        assert!(chart.permissions().can_create);
        assert!(chart.selected().is_none());
        assert_eq!(api.tree_fetches(), 1);
    }

    #[tokio::test]
    async fn test_select() {
        let (_, mut chart) = chart_with(FakeApi::all_permissions()).await;
        assert_eq!(chart.select("l_1").unwrap().data.name, "Petty Cash");
        assert_eq!(chart.selected().unwrap().id, "l_1");

        let err = chart.select("g_99").unwrap_err();
        assert_eq!(err.code(), ErrorCode::NodeNotFound);
        // failed select keeps the previous selection
        assert_eq!(chart.selected().unwrap().id, "l_1");
    }

    #[tokio::test]
    async fn test_code_range_for_parent() {
        let (_, chart) = chart_with(FakeApi::all_permissions()).await;
        assert_eq!(chart.code_range_for_parent(Some("g_2")).unwrap().help_text(), "1000–1999");
        assert_eq!(chart.code_range_for_parent(Some("g_3")).unwrap().help_text(), "4000–4999");
        assert!(chart.code_range_for_parent(None).is_none());
        assert!(chart.code_range_for_parent(Some("l_1")).is_none());
        assert!(chart.code_range_for_parent(Some("g_42")).is_none());
    }

    #[tokio::test]
    async fn test_create_group_refreshes_once() {
        let (api, mut chart) = chart_with(FakeApi::all_permissions()).await;
        let draft = GroupDraft {
            name: " Bank ".to_string(),
            code: "1200".to_string(),
            parent_id: Some("g_1".to_string()),
        };
        chart.create_group(&draft).await.unwrap();

        assert_eq!(api.tree_fetches(), 2);
        let created = chart.tree().get("g_100").unwrap();
        assert_eq!(created.data.name, "Bank");
        assert_eq!(chart.tree().parent("g_100").unwrap().id, "g_1");
    }

    #[tokio::test]
    async fn test_create_under_ledger_is_rejected() {
        let (api, mut chart) = chart_with(FakeApi::all_permissions()).await;
        let draft = GroupDraft {
            name: "Nested".to_string(),
            code: "1002".to_string(),
            parent_id: Some("l_1".to_string()),
        };
        let err = chart.create_group(&draft).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotAGroup);
        assert_eq!(api.tree_fetches(), 1);
    }

    #[tokio::test]
    async fn test_permissions_are_enforced() {
        let (api, mut chart) = chart_with(Permissions::default()).await;

        let err = chart.create_group(&GroupDraft::default()).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::PermissionDenied);
        let err = chart.update_group("g_3", &GroupDraft::default()).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::PermissionDenied);
        let err = chart.delete_group("g_3").await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::PermissionDenied);

        assert_eq!(api.tree_fetches(), 1);
    }

    #[tokio::test]
    async fn test_fixed_group_cannot_change() {
        let (_, mut chart) = chart_with(FakeApi::all_permissions()).await;
        let err = chart.delete_group("g_1").await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::FixedGroup);

        let draft = GroupDraft { name: "Renamed".to_string(), code: "1000".to_string(), parent_id: None };
        let err = chart.update_group("g_1", &draft).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::FixedGroup);
    }

    #[tokio::test]
    async fn test_update_group() {
        let (_, mut chart) = chart_with(FakeApi::all_permissions()).await;
        let group = chart.load_group("g_3").await.unwrap();
        assert_eq!(group.name, "Income");

        let draft = GroupDraft { name: "Temple Income".to_string(), code: group.code.clone(), parent_id: None };
        chart.update_group("g_3", &draft).await.unwrap();
        assert_eq!(chart.tree().get("g_3").unwrap().data.name, "Temple Income");
    }

    #[tokio::test]
    async fn test_delete_drops_selection() {
        let (_, mut chart) = chart_with(FakeApi::all_permissions()).await;
        chart.select("g_3").unwrap();
        chart.tree_mut().toggle("g_1");

        chart.delete_group("g_3").await.unwrap();

        assert!(chart.tree().get("g_3").is_none());
        assert!(chart.selected().is_none());
        // expansion of surviving nodes carries over
        assert!(chart.tree().get("g_1").unwrap().expanded);
    }

    #[tokio::test]
    async fn test_failed_write_keeps_tree() {
        let (api, mut chart) = chart_with(FakeApi::all_permissions()).await;
        chart.select("g_3").unwrap();
        api.state.lock().unwrap().fail_writes = Some("Group has ledgers".to_string());

        let err = chart.delete_group("g_3").await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::Upstream);
        assert!(err.to_string().contains("Group has ledgers"));
        assert_eq!(api.tree_fetches(), 1);
        assert_eq!(chart.selected().unwrap().id, "g_3");
    }

    #[tokio::test]
    async fn test_load_group_rejects_ledger() {
        let (_, chart) = chart_with(FakeApi::all_permissions()).await;
        let err = chart.load_group("l_2").await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotAGroup);
    }
}
