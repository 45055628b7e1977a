//! Wire types of the accounts API

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ClientError, ClientResult};

// ==================== Envelope ====================

/// Response envelope shared by every endpoint: `{ success, data, message }`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Unwrap the payload, mapping `success: false` to a rejection
    pub fn into_data(self) -> ClientResult<T> {
        if !self.success {
            return Err(self.rejection());
        }
        self.data.ok_or_else(|| ClientError::Decode {
            message: "response has no data".to_string(),
        })
    }

    /// Check the success flag only; the payload is ignored
    pub fn into_ack(self) -> ClientResult<()> {
        if self.success {
            Ok(())
        } else {
            Err(self.rejection())
        }
    }

    fn rejection(&self) -> ClientError {
        ClientError::Rejected {
            message: self.message.clone().unwrap_or_else(|| "request was not accepted".to_string()),
        }
    }
}

// ==================== Lenient field decoding ====================

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Int(i64),
    Float(f64),
}

/// Accept `"1001"` or `1001`
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s,
        StringOrNumber::Int(n) => n.to_string(),
        StringOrNumber::Float(n) => n.to_string(),
    })
}

/// Accept `12` or `"12"` for numeric ids
fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::Int(n) => Ok(n),
        StringOrNumber::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
        StringOrNumber::Float(n) => Err(serde::de::Error::custom(format!("id is not an integer: {}", n))),
    }
}

fn optional_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<StringOrNumber>::deserialize(deserializer)? {
        None => Ok(None),
        Some(StringOrNumber::Int(n)) => Ok(Some(n)),
        Some(StringOrNumber::String(s)) if s.trim().is_empty() => Ok(None),
        Some(StringOrNumber::String(s)) => s.trim().parse().map(Some).map_err(serde::de::Error::custom),
        Some(StringOrNumber::Float(n)) => Err(serde::de::Error::custom(format!("id is not an integer: {}", n))),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BoolOrInt {
    Bool(bool),
    Int(i64),
}

/// Accept `true` or `1`
fn bool_or_int<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match BoolOrInt::deserialize(deserializer)? {
        BoolOrInt::Bool(b) => b,
        BoolOrInt::Int(n) => n != 0,
    })
}

// ==================== Chart of accounts ====================

/// Node kind in the chart-of-accounts tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Group,
    Ledger,
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeType::Group => write!(f, "group"),
            NodeType::Ledger => write!(f, "ledger"),
        }
    }
}

/// Display data attached to a tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    pub name: String,
    /// 4-digit numeric code
    #[serde(deserialize_with = "string_or_number")]
    pub code: String,
    #[serde(default, alias = "childrenCount")]
    pub children_count: usize,
    #[serde(default, alias = "ledgersCount")]
    pub ledgers_count: usize,
    /// System-protected group
    #[serde(default, deserialize_with = "bool_or_int")]
    pub fixed: bool,
    #[serde(default, alias = "parentName", skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,
}

/// Chart-of-accounts node as delivered by `GET /accounts/chart-of-accounts/tree`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    /// `g_<id>` for groups, `l_<id>` for ledgers
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub data: NodeData,
    #[serde(default)]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn is_group(&self) -> bool {
        self.node_type == NodeType::Group
    }

    /// Numeric group id for `/groups/:id`, when this is a group node
    pub fn group_id(&self) -> Option<i64> {
        if !self.is_group() {
            return None;
        }
        self.id.strip_prefix("g_").and_then(|s| s.parse().ok())
    }

    /// Numeric ledger id, when this is a ledger node
    pub fn ledger_id(&self) -> Option<i64> {
        if self.is_group() {
            return None;
        }
        self.id.strip_prefix("l_").and_then(|s| s.parse().ok())
    }
}

/// What the signed-in user may do on the chart page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    #[serde(default)]
    pub can_create: bool,
    #[serde(default)]
    pub can_edit: bool,
    #[serde(default)]
    pub can_delete: bool,
}

/// Payload of the tree endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TreeResponse {
    #[serde(default)]
    pub tree: Vec<TreeNode>,
    #[serde(default)]
    pub permissions: Permissions,
}

/// A single account group, `GET /accounts/chart-of-accounts/groups/:id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: i64,
    pub name: String,
    #[serde(deserialize_with = "string_or_number")]
    pub code: String,
    #[serde(default, deserialize_with = "optional_id")]
    pub parent_id: Option<i64>,
    #[serde(default, deserialize_with = "bool_or_int")]
    pub fixed: bool,
}

/// Body for creating or updating a group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupPayload {
    pub name: String,
    pub code: String,
    pub parent_id: Option<i64>,
}

// ==================== Entries ====================

/// Journal or debit note; selects endpoint and item field name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryKind {
    Journal,
    DebitNote,
}

impl EntryKind {
    /// Path segment under `/accounts/entries/`
    pub fn path(&self) -> &'static str {
        match self {
            EntryKind::Journal => "journal",
            EntryKind::DebitNote => "debit-note",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EntryKind::Journal => "Journal Entry",
            EntryKind::DebitNote => "Debit Note",
        }
    }
}

impl std::str::FromStr for EntryKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "journal" => Ok(EntryKind::Journal),
            "debit-note" | "debit_note" => Ok(EntryKind::DebitNote),
            _ => Err(format!("Invalid entry kind: {}", s)),
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// Posting side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrCr {
    #[serde(rename = "D")]
    Debit,
    #[serde(rename = "C")]
    Credit,
}

/// One posting of a stored entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryItem {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub ledger_id: i64,
    pub dc: DrCr,
    pub amount: Decimal,
}

/// A stored entry, `GET /accounts/entries/:id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: i64,
    pub date: NaiveDate,
    #[serde(default)]
    pub entry_code: Option<String>,
    #[serde(default)]
    pub narration: Option<String>,
    #[serde(default, deserialize_with = "optional_id")]
    pub fund_id: Option<i64>,
    #[serde(default)]
    pub entry_items: Vec<EntryItem>,
}

/// One submitted posting
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryItemRequest {
    pub ledger_id: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub dr_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub cr_amount: Decimal,
}

/// Item list keyed by the field name the endpoint expects
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum EntryItems {
    #[serde(rename = "journal_items")]
    Journal(Vec<EntryItemRequest>),
    #[serde(rename = "debit_note_items")]
    DebitNote(Vec<EntryItemRequest>),
}

impl EntryItems {
    pub fn new(kind: EntryKind, items: Vec<EntryItemRequest>) -> Self {
        match kind {
            EntryKind::Journal => EntryItems::Journal(items),
            EntryKind::DebitNote => EntryItems::DebitNote(items),
        }
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            EntryItems::Journal(_) => EntryKind::Journal,
            EntryItems::DebitNote(_) => EntryKind::DebitNote,
        }
    }

    pub fn items(&self) -> &[EntryItemRequest] {
        match self {
            EntryItems::Journal(items) | EntryItems::DebitNote(items) => items,
        }
    }
}

/// Body of `POST /accounts/entries/journal` and `/accounts/entries/debit-note`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryRequest {
    pub date: NaiveDate,
    pub fund_id: Option<i64>,
    pub entry_code: String,
    pub narration: String,
    #[serde(flatten)]
    pub items: EntryItems,
}

/// What the upstream returns after storing an entry
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EntryCreated {
    #[serde(default, deserialize_with = "optional_id")]
    pub id: Option<i64>,
    #[serde(default)]
    pub entry_code: Option<String>,
}

// ==================== Tests ====================
