//! Declarative batch operations

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::entity::EntityType;
use super::options::RequestOptions;

/// CRUD verb of a batch operation
///
/// Unrecognized strings are kept as [`BatchOperationKind::Unknown`] so a
/// single bad entry fails its own slot instead of the whole batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BatchOperationKind {
    List,
    Get,
    Create,
    Update,
    Delete,
    Unknown(String),
}

impl BatchOperationKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::List => "list",
            Self::Get => "get",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Unknown(other) => other.as_str(),
        }
    }

    /// Whether the operation addresses a single record by id
    pub fn requires_id(&self) -> bool {
        matches!(self, Self::Get | Self::Update | Self::Delete)
    }

    /// Whether the operation sends a request body
    pub fn requires_data(&self) -> bool {
        matches!(self, Self::Create | Self::Update)
    }
}

impl From<String> for BatchOperationKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "list" => Self::List,
            "get" => Self::Get,
            "create" => Self::Create,
            "update" => Self::Update,
            "delete" => Self::Delete,
            _ => Self::Unknown(value),
        }
    }
}

impl From<BatchOperationKind> for String {
    fn from(kind: BatchOperationKind) -> Self {
        match kind {
            BatchOperationKind::Unknown(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for BatchOperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One façade call described as data, not yet executed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOperation {
    #[serde(rename = "type")]
    pub kind: BatchOperationKind,
    pub entity_type: EntityType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<RequestOptions>,
}

impl BatchOperation {
    fn new(kind: BatchOperationKind, entity_type: EntityType) -> Self {
        Self { kind, entity_type, id: None, data: None, options: None }
    }

    pub fn list(entity_type: EntityType) -> Self {
        Self::new(BatchOperationKind::List, entity_type)
    }

    pub fn get(entity_type: EntityType, id: impl Into<String>) -> Self {
        Self { id: Some(id.into()), ..Self::new(BatchOperationKind::Get, entity_type) }
    }

    pub fn create(entity_type: EntityType, data: Value) -> Self {
        Self { data: Some(data), ..Self::new(BatchOperationKind::Create, entity_type) }
    }

    pub fn update(entity_type: EntityType, id: impl Into<String>, data: Value) -> Self {
        Self {
            id: Some(id.into()),
            data: Some(data),
            ..Self::new(BatchOperationKind::Update, entity_type)
        }
    }

    pub fn delete(entity_type: EntityType, id: impl Into<String>) -> Self {
        Self { id: Some(id.into()), ..Self::new(BatchOperationKind::Delete, entity_type) }
    }

    /// Per-operation options; the batch-level options apply otherwise
    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = Some(options);
        self
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_wire_format() {
        let op: BatchOperation = serde_json::from_value(json!({
            "type": "update",
            "entityType": "Patient",
            "id": "p1",
            "data": { "first_name": "Jo" }
        }))
        .unwrap();

        assert_eq!(op, BatchOperation::update(EntityType::Patient, "p1", json!({ "first_name": "Jo" })));
    }

    #[test]
    fn unknown_type_is_preserved() {
        let op: BatchOperation =
            serde_json::from_value(json!({ "type": "archive", "entityType": "Patient" })).unwrap();

        assert_eq!(op.kind, BatchOperationKind::Unknown("archive".into()));
        assert_eq!(serde_json::to_value(&op).unwrap()["type"], "archive");
    }

    #[test]
    fn requirement_flags() {
        assert!(BatchOperationKind::Delete.requires_id());
        assert!(!BatchOperationKind::Delete.requires_data());
        assert!(BatchOperationKind::Update.requires_data());
        assert!(!BatchOperationKind::List.requires_id());
    }
}
