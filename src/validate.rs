//! Structural checks run before export.
//!
//! Issues come out in a stable order: tables in the order given, and within
//! a table the name checks first, then columns in their stored order.

use crate::model::Table;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaIssue {
    pub id: String,
    #[serde(rename = "type")]
    pub severity: Severity,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,
}

impl SchemaIssue {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

struct IssueLog {
    issues: Vec<SchemaIssue>,
}

impl IssueLog {
    fn push(&mut self, severity: Severity, title: &str, description: String, table: &Table) {
        let id = format!("issue-{}", self.issues.len() + 1);
        self.issues.push(SchemaIssue {
            id,
            severity,
            title: title.to_string(),
            description,
            table_id: Some(table.id.clone()),
        });
    }
}

/// Validate the tables selected for export.
pub fn validate(tables: &[&Table]) -> Vec<SchemaIssue> {
    let mut log = IssueLog { issues: Vec::new() };
    let mut table_names: HashSet<String> = HashSet::new();

    for table in tables {
        let name = table.name.trim();

        if name.is_empty() {
            log.push(
                Severity::Error,
                "Unnamed table",
                format!("Table with id {} has no name.", table.id),
                table,
            );
        } else if !table_names.insert(name.to_lowercase()) {
            log.push(
                Severity::Error,
                "Duplicate table name",
                format!("Duplicate table name: \"{}\".", name),
                table,
            );
        }

        let display_name = if name.is_empty() { "Unnamed" } else { name };

        if table.columns.is_empty() {
            log.push(
                Severity::Warning,
                "Empty table",
                format!("Table \"{}\" has no columns.", display_name),
                table,
            );
            continue;
        }

        if !table.columns.iter().any(|c| c.is_primary_key) {
            log.push(
                Severity::Warning,
                "Missing primary key",
                format!("Table \"{}\" has no primary key.", display_name),
                table,
            );
        }

        let mut column_names: HashSet<String> = HashSet::new();
        for column in &table.columns {
            let column_name = column.name.trim();
            if column_name.is_empty() {
                log.push(
                    Severity::Error,
                    "Unnamed column",
                    format!("Table \"{}\" contains an unnamed column.", display_name),
                    table,
                );
            } else if !column_names.insert(column_name.to_lowercase()) {
                log.push(
                    Severity::Error,
                    "Duplicate column name",
                    format!(
                        "Table \"{}\" has duplicate column: \"{}\".",
                        display_name, column_name
                    ),
                    table,
                );
            }
        }
    }

    log.issues
}

pub fn has_errors(issues: &[SchemaIssue]) -> bool {
    issues.iter().any(SchemaIssue::is_error)
}
