use crate::validate::SchemaIssue;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Table not found: {0}")]
    TableNotFound(String),
    #[error("Column {column} not found in table {table}")]
    ColumnNotFound { table: String, column: String },
    #[error("Relationship not found: {0}")]
    RelationshipNotFound(String),
    #[error("Duplicate id: {0}")]
    DuplicateId(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("Invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid share token: {0}")]
    Decode(#[from] base64::DecodeError),
    #[error("Share token is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("Snapshot too large to share ({len} > {max} characters)")]
    TooLarge { len: usize, max: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Export blocked by {} validation issue(s)", .issues.len())]
    Blocked { issues: Vec<SchemaIssue> },
}
