//! In-memory accounts API for session tests

use async_trait::async_trait;
use std::sync::Mutex;
use templeweb_client::{
    AccountsApi, ClientError, ClientResult, Entry, EntryCreated, EntryRequest, Group, GroupPayload,
    NodeData, NodeType, Permissions, TreeNode, TreeResponse,
};

pub fn group(id: i64, name: &str, code: &str, fixed: bool, children: Vec<TreeNode>) -> TreeNode {
    TreeNode {
        id: format!("g_{}", id),
        node_type: NodeType::Group,
        data: NodeData {
            name: name.to_string(),
            code: code.to_string(),
            children_count: children.len(),
            ledgers_count: children.iter().filter(|c| !c.is_group()).count(),
            fixed,
            parent_name: None,
        },
        children,
    }
}

pub fn ledger(id: i64, name: &str, code: &str) -> TreeNode {
    TreeNode {
        id: format!("l_{}", id),
        node_type: NodeType::Ledger,
        data: NodeData {
            name: name.to_string(),
            code: code.to_string(),
            children_count: 0,
            ledgers_count: 0,
            fixed: false,
            parent_name: None,
        },
        children: vec![],
    }
}

#[derive(Default)]
pub struct FakeState {
    pub tree: Vec<TreeNode>,
    pub permissions: Permissions,
    pub next_group_id: i64,
    pub tree_fetches: usize,
    pub entries: Vec<Entry>,
    pub submitted: Vec<EntryRequest>,
    pub fail_writes: Option<String>,
}

/// Fake backed by a mutable nested tree
#[derive(Default)]
pub struct FakeApi {
    pub state: Mutex<FakeState>,
}

impl FakeApi {
    pub fn new(tree: Vec<TreeNode>, permissions: Permissions) -> Self {
        Self {
            state: Mutex::new(FakeState {
                tree,
                permissions,
                next_group_id: 100,
                ..FakeState::default()
            }),
        }
    }

    pub fn all_permissions() -> Permissions {
        Permissions { can_create: true, can_edit: true, can_delete: true }
    }

    pub fn tree_fetches(&self) -> usize {
        self.state.lock().unwrap().tree_fetches
    }

    fn find_mut<'a>(nodes: &'a mut Vec<TreeNode>, id: &str) -> Option<&'a mut TreeNode> {
        for node in nodes.iter_mut() {
            if node.id == id {
                return Some(node);
            }
            if let Some(found) = Self::find_mut(&mut node.children, id) {
                return Some(found);
            }
        }
        None
    }

    fn remove(nodes: &mut Vec<TreeNode>, id: &str) -> bool {
        if let Some(pos) = nodes.iter().position(|n| n.id == id) {
            nodes.remove(pos);
            return true;
        }
        nodes.iter_mut().any(|n| Self::remove(&mut n.children, id))
    }
}

#[async_trait]
impl AccountsApi for FakeApi {
    async fn chart_tree(&self) -> ClientResult<TreeResponse> {
        let mut state = self.state.lock().unwrap();
        state.tree_fetches += 1;
        Ok(TreeResponse { tree: state.tree.clone(), permissions: state.permissions })
    }

    async fn group(&self, id: i64) -> ClientResult<Group> {
        let mut state = self.state.lock().unwrap();
        let node = Self::find_mut(&mut state.tree, &format!("g_{}", id))
            .ok_or_else(|| ClientError::Status { status: 404, body: String::new() })?;
        Ok(Group {
            id,
            name: node.data.name.clone(),
            code: node.data.code.clone(),
            parent_id: None,
            fixed: node.data.fixed,
        })
    }

    async fn create_group(&self, payload: &GroupPayload) -> ClientResult<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(message) = state.fail_writes.clone() {
            return Err(ClientError::Rejected { message });
        }
        let id = state.next_group_id;
        state.next_group_id += 1;
        let node = group(id, &payload.name, &payload.code, false, vec![]);
        match payload.parent_id {
            Some(parent) => {
                let parent = Self::find_mut(&mut state.tree, &format!("g_{}", parent))
                    .ok_or_else(|| ClientError::Rejected { message: "parent not found".to_string() })?;
                parent.children.push(node);
            }
            None => state.tree.push(node),
        }
        Ok(())
    }

    async fn update_group(&self, id: i64, payload: &GroupPayload) -> ClientResult<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(message) = state.fail_writes.clone() {
            return Err(ClientError::Rejected { message });
        }
        let node = Self::find_mut(&mut state.tree, &format!("g_{}", id))
            .ok_or_else(|| ClientError::Status { status: 404, body: String::new() })?;
        node.data.name = payload.name.clone();
        node.data.code = payload.code.clone();
        Ok(())
    }

    async fn delete_group(&self, id: i64) -> ClientResult<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(message) = state.fail_writes.clone() {
            return Err(ClientError::Rejected { message });
        }
        if Self::remove(&mut state.tree, &format!("g_{}", id)) {
            Ok(())
        } else {
            Err(ClientError::Status { status: 404, body: String::new() })
        }
    }

    async fn entry(&self, id: i64) -> ClientResult<Entry> {
        let state = self.state.lock().unwrap();
        state
            .entries
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or_else(|| ClientError::Status { status: 404, body: String::new() })
    }

    async fn create_entry(&self, request: &EntryRequest) -> ClientResult<EntryCreated> {
        let mut state = self.state.lock().unwrap();
        if let Some(message) = state.fail_writes.clone() {
            return Err(ClientError::Rejected { message });
        }
        state.submitted.push(request.clone());
        Ok(EntryCreated {
            id: Some(state.submitted.len() as i64),
            entry_code: Some(format!("JOR{:05}", state.submitted.len())),
        })
    }
}
