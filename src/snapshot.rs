//! Persisted snapshot shape and share tokens.
//!
//! A snapshot is `{ tables, relationships, dialect }`. Older snapshots call
//! the relationship list `edges`; both spellings are read.

use crate::dialect::Dialect;
use crate::error::SnapshotError;
use crate::layout::LayoutEngine;
use crate::model::{Relationship, Table};
use crate::schema::{LayoutPolicy, SchemaModel};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

/// Longest share token accepted in either direction.
pub const MAX_SHARE_TOKEN_LEN: usize = 30_000;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub tables: Vec<Table>,
    /// `None` when the snapshot carries no list; relationships are then
    /// derived from column references.
    #[serde(alias = "edges", skip_serializing_if = "Option::is_none")]
    pub relationships: Option<Vec<Relationship>>,
    pub dialect: Dialect,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Snapshot {
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_model(model: &SchemaModel) -> Self {
        Self {
            tables: model.tables().to_vec(),
            relationships: Some(model.relationships().to_vec()),
            dialect: model.dialect(),
            name: None,
        }
    }

    /// Hydrate a model. Tables that were never placed are laid out.
    pub fn into_model(self, engine: &LayoutEngine) -> SchemaModel {
        SchemaModel::load(
            self.tables,
            self.relationships,
            self.dialect,
            LayoutPolicy::IfUnplaced,
            engine,
        )
    }

    /// Encode as URL-safe base64 of the JSON form.
    pub fn to_share_token(&self) -> Result<String, SnapshotError> {
        let token = URL_SAFE_NO_PAD.encode(self.to_json()?);
        check_len(token.len())?;
        Ok(token)
    }

    /// Decode a share token and hydrate it.
    ///
    /// Shared schemas whose first table sits at the origin are laid out
    /// before they are returned.
    pub fn from_share_token(
        token: &str,
        engine: &LayoutEngine,
    ) -> Result<SchemaModel, SnapshotError> {
        let token = token.trim();
        check_len(token.len())?;
        let bytes = URL_SAFE_NO_PAD.decode(token.trim_end_matches('='))?;
        let snapshot = Self::from_json(&String::from_utf8(bytes)?)?;

        let policy = match snapshot.tables.first() {
            Some(first) if first.position.is_origin() => LayoutPolicy::Always,
            _ => LayoutPolicy::Never,
        };
        Ok(SchemaModel::load(
            snapshot.tables,
            snapshot.relationships,
            snapshot.dialect,
            policy,
            engine,
        ))
    }
}

fn check_len(len: usize) -> Result<(), SnapshotError> {
    if len > MAX_SHARE_TOKEN_LEN {
        return Err(SnapshotError::TooLarge {
            len,
            max: MAX_SHARE_TOKEN_LEN,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Column;
    use crate::schema::Command;

    const SNAPSHOT: &str = r#"{
        "tables": [
            {
                "id": "t1", "name": "users", "position": { "x": 100, "y": 80 },
                "columns": [
                    { "id": "c1", "name": "id", "type": "INT", "isPrimaryKey": true, "isNullable": false }
                ]
            },
            {
                "id": "t2", "name": "orders", "position": { "x": 500, "y": 80 },
                "columns": [
                    { "id": "c2", "name": "id", "type": "INT", "isPrimaryKey": true, "isNullable": false },
                    { "id": "c3", "name": "user_id", "type": "INT", "isForeignKey": true,
                      "references": { "table": "users", "column": "id" } }
                ]
            }
        ],
        "dialect": "MySQL"
    }"#;

    fn engine() -> LayoutEngine {
        LayoutEngine::default()
    }

    #[test]
    fn test_hydrate_derives_relationships() {
        let model = Snapshot::from_json(SNAPSHOT).unwrap().into_model(&engine());
        assert_eq!(model.dialect(), Dialect::MySQL);
        assert_eq!(model.relationships().len(), 1);

        let rel = &model.relationships()[0];
        assert_eq!((rel.source.as_str(), rel.source_column.as_str()), ("t2", "c3"));
        assert_eq!((rel.target.as_str(), rel.target_column.as_str()), ("t1", "c1"));
        // placed tables keep their positions
        assert_eq!(model.tables()[1].position.x, 500.0);
    }

    #[test]
    fn test_round_trip_regenerates_identical_relationships() {
        let model = Snapshot::from_json(SNAPSHOT).unwrap().into_model(&engine());
        let json = Snapshot::from_model(&model).to_json().unwrap();
        let reloaded = Snapshot::from_json(&json).unwrap().into_model(&engine());

        assert_eq!(reloaded.tables(), model.tables());
        assert_eq!(reloaded.relationships(), model.relationships());
        assert_eq!(reloaded.regenerate_relationships(), model.relationships());
    }

    #[test]
    fn test_round_trip_keeps_type_spelling() {
        let json = SNAPSHOT.replace(
            r#""name": "id", "type": "INT""#,
            r#""name": "id", "type": "bigint""#,
        );
        let model = Snapshot::from_json(&json).unwrap().into_model(&engine());
        let out = Snapshot::from_model(&model).to_json().unwrap();
        assert!(out.contains(r#""type":"bigint""#));
        assert!(!out.contains("BIGINT"));
    }

    #[test]
    fn test_connected_edges_survive_round_trip() {
        let model = Snapshot::from_json(SNAPSHOT)
            .unwrap()
            .into_model(&engine())
            .apply(Command::AddColumn {
                table_id: "t2".to_string(),
                column: Some(Column::new("c4", "approver_id", "INT")),
            })
            .unwrap()
            .apply(Command::Connect {
                source: ("t1".to_string(), "c1".to_string()),
                target: ("t2".to_string(), "c4".to_string()),
            })
            .unwrap();

        let reloaded = Snapshot::from_json(&Snapshot::from_model(&model).to_json().unwrap())
            .unwrap()
            .into_model(&engine());
        assert_eq!(reloaded.regenerate_relationships(), model.relationships());
    }

    #[test]
    fn test_reads_legacy_edges_with_handles() {
        let json = r#"{
            "tables": [
                { "id": "a", "name": "a", "columns": [ { "id": "a1", "name": "id", "type": "INT", "isPrimaryKey": true } ] },
                { "id": "b", "name": "b", "columns": [ { "id": "b1", "name": "a_id", "type": "INT" } ] }
            ],
            "edges": [
                { "id": "e1", "source": "b", "target": "a", "sourceHandle": "source-b1", "targetHandle": "target-a1" }
            ]
        }"#;
        let snapshot = Snapshot::from_json(json).unwrap();
        assert_eq!(snapshot.dialect, Dialect::PostgreSQL);

        let model = snapshot.into_model(&engine());
        assert_eq!(model.relationships()[0].source_column, "b1");
        // unplaced tables were laid out
        assert!(model.tables().iter().all(|t| !t.position.is_origin()));
        let child = model.table("b").and_then(|t| t.column("b1")).unwrap();
        assert_eq!(child.references.as_ref().map(|r| r.table.as_str()), Some("a"));
    }

    #[test]
    fn test_dangling_relationship_dropped_on_load() {
        let json = r#"{
            "tables": [ { "id": "a", "name": "a", "columns": [ { "id": "a1", "name": "id", "type": "INT", "isPrimaryKey": true } ] } ],
            "relationships": [
                { "id": "e1", "source": "a", "target": "ghost", "sourceColumn": "a1", "targetColumn": "x" }
            ]
        }"#;
        let model = Snapshot::from_json(json).unwrap().into_model(&engine());
        assert!(model.relationships().is_empty());
    }

    #[test]
    fn test_share_token_round_trip() {
        let model = Snapshot::from_json(SNAPSHOT).unwrap().into_model(&engine());
        let token = Snapshot::from_model(&model).to_share_token().unwrap();
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));

        let shared = Snapshot::from_share_token(&token, &engine()).unwrap();
        assert_eq!(shared.tables(), model.tables());
        assert_eq!(shared.relationships(), model.relationships());
    }

    #[test]
    fn test_share_token_rejects_garbage() {
        assert!(matches!(
            Snapshot::from_share_token("not base64!", &engine()),
            Err(SnapshotError::Decode(_))
        ));
    }

    #[test]
    fn test_share_token_size_limit() {
        let long = "A".repeat(MAX_SHARE_TOKEN_LEN + 1);
        assert!(matches!(
            Snapshot::from_share_token(&long, &engine()),
            Err(SnapshotError::TooLarge { .. })
        ));

        let tables = (0..400)
            .map(|i| {
                Table::new(
                    format!("t{}", i),
                    format!("table_with_a_long_name_{}", i),
                    vec![Column::primary_key(format!("c{}", i), "id", "INT")],
                )
            })
            .collect();
        let snapshot = Snapshot {
            tables,
            ..Snapshot::default()
        };
        assert!(matches!(
            snapshot.to_share_token(),
            Err(SnapshotError::TooLarge { .. })
        ));
    }
}
