//! Chart-of-accounts tree
//!
//! The accounts service delivers the hierarchy already nested. It is
//! flattened here into an arena of nodes with parent / child indices so
//! lookups by id are O(1) and the filter can walk ancestors without
//! recursion. Pre-order is kept: a node's index is always smaller than the
//! indices of its descendants.

use std::collections::HashMap;

use serde::Serialize;
use templeweb_client::{NodeData, NodeType, TreeNode};

/// Depth-first pre-order search over the nested wire forest
///
/// Returns the first node whose id matches exactly.
pub fn find_node_by_id<'a>(id: &str, nodes: &'a [TreeNode]) -> Option<&'a TreeNode> {
    for node in nodes {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_node_by_id(id, &node.children) {
            return Some(found);
        }
    }
    None
}

/// Build the display tree from the nested API payload
pub fn build_tree(nodes: &[TreeNode]) -> AccountTree {
    AccountTree::build(nodes)
}

/// Arena entry for one group or ledger
#[derive(Debug, Clone, Serialize)]
pub struct AccountNode {
    pub id: String,
    pub node_type: NodeType,
    pub data: NodeData,
    #[serde(skip)]
    pub parent: Option<usize>,
    #[serde(skip)]
    pub children: Vec<usize>,
    pub depth: usize,
    pub expanded: bool,
    pub visible: bool,
}

impl AccountNode {
    pub fn is_group(&self) -> bool {
        self.node_type == NodeType::Group
    }

    /// Numeric id for group endpoints
    pub fn group_id(&self) -> Option<i64> {
        if !self.is_group() {
            return None;
        }
        self.id.strip_prefix("g_").and_then(|s| s.parse().ok())
    }

    pub fn ledger_id(&self) -> Option<i64> {
        if self.is_group() {
            return None;
        }
        self.id.strip_prefix("l_").and_then(|s| s.parse().ok())
    }

    /// Display label, `code - name`
    pub fn label(&self) -> String {
        format!("{} - {}", self.data.code, self.data.name)
    }

    fn matches(&self, term_lower: &str) -> bool {
        self.data.name.to_lowercase().contains(term_lower)
            || self.data.code.to_lowercase().contains(term_lower)
    }
}

/// One line of the indented tree view
#[derive(Debug, Clone, Copy)]
pub struct TreeRow<'a> {
    pub node: &'a AccountNode,
    pub depth: usize,
    /// Has at least one visible child, so it gets a toggle
    pub has_children: bool,
}

/// Chart-of-accounts tree with expansion and filter state
#[derive(Debug, Clone, Default)]
pub struct AccountTree {
    nodes: Vec<AccountNode>,
    roots: Vec<usize>,
    index: HashMap<String, usize>,
    filter: String,
}

impl AccountTree {
    /// Flatten a nested forest; every node starts collapsed and visible
    pub fn build(forest: &[TreeNode]) -> Self {
        let mut tree = Self::default();
        // (node, parent index, depth), children pushed in reverse to keep pre-order
        let mut stack: Vec<(&TreeNode, Option<usize>, usize)> =
            forest.iter().rev().map(|n| (n, None, 0)).collect();

        while let Some((node, parent, depth)) = stack.pop() {
            let idx = tree.nodes.len();
            tree.nodes.push(AccountNode {
                id: node.id.clone(),
                node_type: node.node_type,
                data: node.data.clone(),
                parent,
                children: Vec::new(),
                depth,
                expanded: false,
                visible: true,
            });
            match parent {
                Some(p) => tree.nodes[p].children.push(idx),
                None => tree.roots.push(idx),
            }
            // Duplicate ids resolve to the first node in pre-order
            tree.index.entry(node.id.clone()).or_insert(idx);

            for child in node.children.iter().rev() {
                stack.push((child, Some(idx), depth + 1));
            }
        }

        log::debug!(target: "templeweb::tree", "built tree with {} nodes, {} roots", tree.nodes.len(), tree.roots.len());
        tree
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// O(1) lookup by node id
    pub fn get(&self, id: &str) -> Option<&AccountNode> {
        self.index.get(id).map(|&idx| &self.nodes[idx])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn roots(&self) -> impl Iterator<Item = &AccountNode> {
        self.roots.iter().map(move |&idx| &self.nodes[idx])
    }

    /// Every node in pre-order
    pub fn iter(&self) -> impl Iterator<Item = &AccountNode> {
        self.nodes.iter()
    }

    pub fn children(&self, id: &str) -> Vec<&AccountNode> {
        self.index
            .get(id)
            .map(|&idx| self.nodes[idx].children.iter().map(|&c| &self.nodes[c]).collect())
            .unwrap_or_default()
    }

    pub fn parent(&self, id: &str) -> Option<&AccountNode> {
        let idx = *self.index.get(id)?;
        self.nodes[idx].parent.map(|p| &self.nodes[p])
    }

    /// Ancestors from the nearest parent up to the root
    pub fn ancestors(&self, id: &str) -> Vec<&AccountNode> {
        let mut result = Vec::new();
        let mut current = self.index.get(id).and_then(|&idx| self.nodes[idx].parent);
        while let Some(idx) = current {
            result.push(&self.nodes[idx]);
            current = self.nodes[idx].parent;
        }
        result
    }

    /// Groups, for parent pickers
    pub fn groups(&self) -> impl Iterator<Item = &AccountNode> {
        self.nodes.iter().filter(|n| n.is_group())
    }

    /// Postable ledgers in tree order, for line-item pickers
    pub fn ledgers(&self) -> impl Iterator<Item = &AccountNode> {
        self.nodes.iter().filter(|n| n.ledger_id().is_some())
    }

    /// Ids of expanded nodes, in tree order
    pub fn expanded_ids(&self) -> Vec<&str> {
        self.nodes.iter().filter(|n| n.expanded).map(|n| n.id.as_str()).collect()
    }

    /// Flip one node's expansion; returns the new state, `None` if absent
    pub fn toggle(&mut self, id: &str) -> Option<bool> {
        let idx = *self.index.get(id)?;
        let node = &mut self.nodes[idx];
        node.expanded = !node.expanded;
        Some(node.expanded)
    }

    pub fn set_expanded(&mut self, id: &str, expanded: bool) -> bool {
        match self.index.get(id) {
            Some(&idx) => {
                self.nodes[idx].expanded = expanded;
                true
            }
            None => false,
        }
    }

    pub fn expand_all(&mut self) {
        self.nodes.iter_mut().for_each(|n| n.expanded = true);
    }

    pub fn collapse_all(&mut self) {
        self.nodes.iter_mut().for_each(|n| n.expanded = false);
    }

    /// Active filter term, empty when unfiltered
    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Case-insensitive substring filter on name or code
    ///
    /// Matches stay visible and every ancestor of a match is made visible
    /// and expanded; everything else is hidden. Leading and trailing
    /// whitespace is ignored, inner spaces are matched as typed. A blank
    /// term clears the filter, shows every node, keeps expansion as it was
    /// and returns 0. Otherwise returns the number of matching nodes.
    pub fn filter_by_substring(&mut self, term: &str) -> usize {
        let term = term.trim().to_lowercase();
        self.filter = term.clone();

        if term.is_empty() {
            self.nodes.iter_mut().for_each(|n| n.visible = true);
            return 0;
        }

        let matched: Vec<bool> = self.nodes.iter().map(|n| n.matches(&term)).collect();

        // Reverse pre-order visits children before their parents
        let mut has_match = matched.clone();
        for idx in (0..self.nodes.len()).rev() {
            if has_match[idx] {
                if let Some(p) = self.nodes[idx].parent {
                    has_match[p] = true;
                }
            }
        }

        for (idx, node) in self.nodes.iter_mut().enumerate() {
            node.visible = has_match[idx];
        }

        // Open every ancestor of a match, including ancestors that match themselves
        for idx in 0..self.nodes.len() {
            if matched[idx] {
                let mut current = self.nodes[idx].parent;
                while let Some(p) = current {
                    self.nodes[p].expanded = true;
                    current = self.nodes[p].parent;
                }
            }
        }

        let count = matched.iter().filter(|&&m| m).count();
        log::debug!(target: "templeweb::tree", "filter '{}' matched {} of {} nodes", term, count, self.nodes.len());
        count
    }

    /// Visible rows in display order: a node is listed when it is visible
    /// and all of its ancestors are expanded
    pub fn rows(&self) -> Vec<TreeRow<'_>> {
        let mut rows = Vec::new();
        let mut stack: Vec<usize> = self.roots.iter().rev().copied().collect();
        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            if !node.visible {
                continue;
            }
            let has_children = node.children.iter().any(|&c| self.nodes[c].visible);
            rows.push(TreeRow { node, depth: node.depth, has_children });
            if node.expanded {
                for &child in node.children.iter().rev() {
                    stack.push(child);
                }
            }
        }
        rows
    }

    pub fn visible_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.visible).count()
    }
}
