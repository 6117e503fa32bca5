use crate::data_type::DataType;
use serde::{Deserialize, Deserializer, Serialize};

/// Canvas position of a table's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_origin(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

/// Foreign-key target named by table and column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRef {
    pub table: String,
    pub column: String,
}

impl ColumnRef {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }

    pub fn points_to_table(&self, table_name: &str) -> bool {
        self.table.eq_ignore_ascii_case(table_name)
    }

    pub fn points_to(&self, table_name: &str, column_name: &str) -> bool {
        self.points_to_table(table_name) && self.column.eq_ignore_ascii_case(column_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(rename = "type", alias = "dataType", default)]
    pub data_type: DataType,
    #[serde(default)]
    pub is_primary_key: bool,
    #[serde(default)]
    pub is_foreign_key: bool,
    #[serde(default = "default_nullable")]
    pub is_nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<ColumnRef>,
}

fn default_nullable() -> bool {
    true
}

impl Column {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        data_type: impl Into<DataType>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            data_type: data_type.into(),
            is_primary_key: false,
            is_foreign_key: false,
            is_nullable: true,
            references: None,
        }
    }

    /// Primary-key column; never nullable.
    pub fn primary_key(
        id: impl Into<String>,
        name: impl Into<String>,
        data_type: impl Into<DataType>,
    ) -> Self {
        Self {
            is_primary_key: true,
            is_nullable: false,
            ..Self::new(id, name, data_type)
        }
    }

    pub fn not_null(mut self) -> Self {
        self.is_nullable = false;
        self
    }

    pub fn foreign_key(mut self) -> Self {
        self.is_foreign_key = true;
        self
    }

    pub fn references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.is_foreign_key = true;
        self.references = Some(ColumnRef::new(table, column));
        self
    }

    /// A column carrying `references` counts as a foreign key even when the
    /// flag was never set by its producer.
    pub fn is_fk(&self) -> bool {
        self.is_foreign_key || self.references.is_some()
    }
}

/// Visual tag. Carries no meaning for compilation or layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableColor {
    Blue,
    White,
    Yellow,
    Red,
    Green,
    Purple,
    Pink,
}

impl TableColor {
    pub const PALETTE: [TableColor; 7] = [
        Self::Blue,
        Self::White,
        Self::Yellow,
        Self::Red,
        Self::Green,
        Self::Purple,
        Self::Pink,
    ];

    pub fn for_index(index: usize) -> Self {
        Self::PALETTE[index % Self::PALETTE.len()]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<TableColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Table {
    pub fn new(id: impl Into<String>, name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            columns,
            position: Position::default(),
            color: None,
            description: None,
        }
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Position::new(x, y);
        self
    }

    pub fn column(&self, id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn column_mut(&mut self, id: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.id == id)
    }

    /// Case-insensitive lookup by column name.
    pub fn column_named(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// The table's primary-key column, if exactly one column is flagged.
    pub fn single_primary_key(&self) -> Option<&Column> {
        let mut pks = self.columns.iter().filter(|c| c.is_primary_key);
        match (pks.next(), pks.next()) {
            (Some(pk), None) => Some(pk),
            _ => None,
        }
    }

    pub fn has_column_named(&self, name: &str) -> bool {
        self.column_named(name).is_some()
    }
}

/// A connection between one column on `source` and one column on `target`.
///
/// Which end is the parent is not stored; it is derived from the column
/// flags whenever it is needed (see [`crate::resolver`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(alias = "sourceHandle", deserialize_with = "deserialize_handle")]
    pub source_column: String,
    #[serde(alias = "targetHandle", deserialize_with = "deserialize_handle")]
    pub target_column: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Relationship {
    pub fn new(
        id: impl Into<String>,
        (source, source_column): (&str, &str),
        (target, target_column): (&str, &str),
    ) -> Self {
        Self {
            id: id.into(),
            source: source.to_string(),
            target: target.to_string(),
            source_column: source_column.to_string(),
            target_column: target_column.to_string(),
            label: None,
        }
    }

    pub fn touches_table(&self, table_id: &str) -> bool {
        self.source == table_id || self.target == table_id
    }

    pub fn touches_column(&self, table_id: &str, column_id: &str) -> bool {
        (self.source == table_id && self.source_column == column_id)
            || (self.target == table_id && self.target_column == column_id)
    }

    pub fn is_self_ref(&self) -> bool {
        self.source == self.target
    }

    /// User label, or `source.col → target.col` built from the tables.
    pub fn display_label(&self, tables: &[Table]) -> String {
        if let Some(label) = self.label.as_deref().filter(|l| !l.is_empty()) {
            return label.to_string();
        }
        let end = |table_id: &str, column_id: &str| {
            let table = tables.iter().find(|t| t.id == table_id);
            let table_name = table.map(|t| t.name.as_str()).unwrap_or("?");
            let column_name = table
                .and_then(|t| t.column(column_id))
                .map(|c| c.name.as_str())
                .unwrap_or("?");
            format!("{}.{}", table_name, column_name)
        };
        format!(
            "{} → {}",
            end(&self.source, &self.source_column),
            end(&self.target, &self.target_column)
        )
    }
}

/// Canvas handles are stored as `source-<col>` / `target-<col>`.
pub fn strip_handle(handle: &str) -> &str {
    handle
        .strip_prefix("source-")
        .or_else(|| handle.strip_prefix("target-"))
        .unwrap_or(handle)
}

fn deserialize_handle<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(strip_handle(&raw).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_type::TypeKind;

    #[test]
    fn test_references_imply_fk() {
        let col = Column::new("c1", "user_id", "INT");
        assert!(!col.is_fk());

        let mut col = col;
        col.references = Some(ColumnRef::new("users", "id"));
        assert!(col.is_fk());
        assert!(!col.is_foreign_key);
    }

    #[test]
    fn test_single_primary_key() {
        let table = Table::new(
            "t1",
            "users",
            vec![
                Column::primary_key("c1", "id", "INT"),
                Column::new("c2", "email", "VARCHAR"),
            ],
        );
        assert_eq!(table.single_primary_key().map(|c| c.id.as_str()), Some("c1"));

        let composite = Table::new(
            "t2",
            "memberships",
            vec![
                Column::primary_key("c1", "user_id", "INT"),
                Column::primary_key("c2", "group_id", "INT"),
            ],
        );
        assert!(composite.single_primary_key().is_none());
    }

    #[test]
    fn test_column_json_shape() {
        let json = r#"{
            "id": "c1",
            "name": "user_id",
            "type": "INT",
            "isPrimaryKey": false,
            "isForeignKey": true,
            "isNullable": false,
            "references": { "table": "users", "column": "id" }
        }"#;
        let col: Column = serde_json::from_str(json).unwrap();
        assert_eq!(col.data_type.kind(), Some(TypeKind::Int));
        assert!(!col.is_nullable);
        assert_eq!(col.references, Some(ColumnRef::new("users", "id")));
    }

    #[test]
    fn test_relationship_accepts_canvas_handles() {
        let json = r#"{
            "id": "e1",
            "source": "t2",
            "target": "t1",
            "sourceHandle": "source-c9",
            "targetHandle": "target-c1"
        }"#;
        let rel: Relationship = serde_json::from_str(json).unwrap();
        assert_eq!(rel.source_column, "c9");
        assert_eq!(rel.target_column, "c1");
        assert!(rel.label.is_none());
    }

    #[test]
    fn test_display_label() {
        let tables = vec![
            Table::new("t1", "users", vec![Column::primary_key("c1", "id", "INT")]),
            Table::new("t2", "orders", vec![Column::new("c2", "user_id", "INT")]),
        ];
        let mut rel = Relationship::new("e1", ("t2", "c2"), ("t1", "c1"));
        assert_eq!(rel.display_label(&tables), "orders.user_id → users.id");

        rel.label = Some("placed by".to_string());
        assert_eq!(rel.display_label(&tables), "placed by");
    }
}
