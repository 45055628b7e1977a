//! Router test helpers: request builders and an in-memory accounts API

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::sync::{Arc, Mutex};
use templeweb_client::{
    AccountsApi, ClientError, ClientResult, DrCr, Entry, EntryCreated, EntryItem, EntryRequest, Group, GroupPayload,
    NodeData, NodeType, Permissions, TreeNode, TreeResponse,
};
use templeweb_config::Config;

use crate::AppState;

fn node(id: &str, node_type: NodeType, name: &str, code: &str, fixed: bool, children: Vec<TreeNode>) -> TreeNode {
    TreeNode {
        id: id.to_string(),
        node_type,
        data: NodeData {
            name: name.to_string(),
            code: code.to_string(),
            children_count: children.len(),
            ledgers_count: 0,
            fixed,
            parent_name: None,
        },
        children,
    }
}

/// Assets(1000, fixed) > Cash(1100) > Petty Cash(1001); Income(4000) > Donations(4100)
pub fn sample_tree() -> Vec<TreeNode> {
    vec![
        node("g_1", NodeType::Group, "Assets", "1000", true, vec![
            node("g_2", NodeType::Group, "Cash", "1100", false, vec![
                node("l_1", NodeType::Ledger, "Petty Cash", "1001", false, vec![]),
            ]),
        ]),
        node("g_3", NodeType::Group, "Income", "4000", false, vec![
            node("l_2", NodeType::Ledger, "Donations", "4100", false, vec![]),
        ]),
    ]
}

#[derive(Default)]
pub struct FakeState {
    pub tree: Vec<TreeNode>,
    pub permissions: Permissions,
    pub groups_created: Vec<GroupPayload>,
    pub groups_deleted: Vec<i64>,
    pub submitted: Vec<EntryRequest>,
    pub unavailable: bool,
}

#[derive(Default)]
pub struct FakeApi {
    pub state: Mutex<FakeState>,
}

impl FakeApi {
    fn check(&self) -> ClientResult<()> {
        if self.state.lock().unwrap().unavailable {
            return Err(ClientError::Status { status: 503, body: String::new() });
        }
        Ok(())
    }
}

#[async_trait]
impl AccountsApi for FakeApi {
    async fn chart_tree(&self) -> ClientResult<TreeResponse> {
        self.check()?;
        let state = self.state.lock().unwrap();
        Ok(TreeResponse { tree: state.tree.clone(), permissions: state.permissions })
    }

    async fn group(&self, id: i64) -> ClientResult<Group> {
        self.check()?;
        Ok(Group { id, name: "Cash".to_string(), code: "1100".to_string(), parent_id: Some(1), fixed: false })
    }

    async fn create_group(&self, payload: &GroupPayload) -> ClientResult<()> {
        self.check()?;
        let mut state = self.state.lock().unwrap();
        state.groups_created.push(payload.clone());
        let id = format!("g_{}", 100 + state.groups_created.len());
        state.tree.push(node(&id, NodeType::Group, &payload.name, &payload.code, false, vec![]));
        Ok(())
    }

    async fn update_group(&self, _id: i64, _payload: &GroupPayload) -> ClientResult<()> {
        self.check()
    }

    async fn delete_group(&self, id: i64) -> ClientResult<()> {
        self.check()?;
        let mut state = self.state.lock().unwrap();
        state.groups_deleted.push(id);
        let target = format!("g_{}", id);
        state.tree.retain(|n| n.id != target);
        Ok(())
    }

    async fn entry(&self, id: i64) -> ClientResult<Entry> {
        self.check()?;
        Ok(Entry {
            id,
            date: NaiveDate::from_ymd_opt(2024, 4, 14).unwrap(),
            entry_code: Some("JOR00007".to_string()),
            narration: Some("Festival offerings".to_string()),
            fund_id: Some(2),
            entry_items: vec![
                EntryItem { ledger_id: 1, dc: DrCr::Debit, amount: Decimal::new(15000, 2) },
                EntryItem { ledger_id: 2, dc: DrCr::Credit, amount: Decimal::new(15000, 2) },
            ],
        })
    }

    async fn create_entry(&self, request: &EntryRequest) -> ClientResult<EntryCreated> {
        self.check()?;
        let mut state = self.state.lock().unwrap();
        state.submitted.push(request.clone());
        Ok(EntryCreated { id: Some(77), entry_code: Some("JOR00077".to_string()) })
    }
}

/// State over a fake with the sample tree and every permission
pub fn test_state() -> (Arc<FakeApi>, AppState) {
    let api = Arc::new(FakeApi::default());
    {
        let mut state = api.state.lock().unwrap();
        state.tree = sample_tree();
        state.permissions = Permissions { can_create: true, can_edit: true, can_delete: true };
    }
    let state = AppState { api: api.clone(), config: Config::default() };
    (api, state)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
