//! DDL compilation: `CREATE TABLE` per table, then one
//! `ALTER TABLE ... ADD CONSTRAINT` per resolved relationship.
//!
//! `compile` is a pure function of its inputs. `export` puts the validator
//! in front of it and refuses to return SQL while error issues exist.

use crate::dialect::{Dialect, ReferentialAction};
use crate::error::ExportError;
use crate::model::{Column, Relationship, Table};
use crate::resolver;
use crate::schema::Selection;
use crate::validate::{self, SchemaIssue};
use serde::Deserialize;
use std::collections::HashSet;

/// Layout of the `CREATE TABLE` column list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementStyle {
    /// `CREATE TABLE t ( a INT, b INT );`
    #[default]
    Inline,
    /// One column per indented line.
    Multiline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompileOptions {
    pub dialect: Dialect,
    pub on_delete: ReferentialAction,
    pub on_update: ReferentialAction,
    pub style: StatementStyle,
    /// Emit the `-- Generated for <dialect>` comment line.
    pub header: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            on_delete: ReferentialAction::NoAction,
            on_update: ReferentialAction::NoAction,
            style: StatementStyle::Inline,
            header: true,
        }
    }
}

/// Export request as sent by the export dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportOptions {
    /// Table ids to export; `None` exports everything.
    pub selected_tables: Option<Vec<String>>,
    pub on_delete: ReferentialAction,
    pub on_update: ReferentialAction,
    pub style: StatementStyle,
}

impl ExportOptions {
    pub fn compile_options(&self, dialect: Dialect) -> CompileOptions {
        CompileOptions {
            dialect,
            on_delete: self.on_delete,
            on_update: self.on_update,
            style: self.style,
            header: true,
        }
    }
}

/// Compile tables and relationships into a SQL script.
///
/// Relationships whose ends fall outside `tables`, or whose columns are
/// gone, are left out without complaint.
pub fn compile(
    tables: &[&Table],
    relationships: &[&Relationship],
    options: &CompileOptions,
) -> String {
    let mut output = String::new();

    if options.header {
        output.push_str(&format!("-- Generated for {}\n\n", options.dialect));
    }

    for table in tables {
        compile_table(&mut output, table, options.style);
        output.push_str("\n\n");
    }

    let constraints = compile_constraints(tables, relationships, options);
    if !constraints.is_empty() {
        output.push_str("-- Relationships\n");
        for statement in &constraints {
            output.push_str(statement);
            output.push('\n');
        }
    }

    output
}

fn compile_table(output: &mut String, table: &Table, style: StatementStyle) {
    output.push_str(&format!("CREATE TABLE {} (", table.name));
    let columns: Vec<String> = table.columns.iter().map(column_definition).collect();

    if columns.is_empty() {
        output.push_str(");");
        return;
    }
    match style {
        StatementStyle::Inline => {
            output.push(' ');
            output.push_str(&columns.join(", "));
            output.push_str(" );");
        }
        StatementStyle::Multiline => {
            output.push('\n');
            let lines: Vec<String> = columns.iter().map(|c| format!("  {}", c)).collect();
            output.push_str(&lines.join(",\n"));
            output.push_str("\n);");
        }
    }
}

fn column_definition(column: &Column) -> String {
    let mut def = format!("{} {}", column.name, column.data_type);
    if column.is_primary_key {
        def.push_str(" PRIMARY KEY");
    } else if !column.is_nullable {
        def.push_str(" NOT NULL");
    }
    def
}

fn compile_constraints(
    tables: &[&Table],
    relationships: &[&Relationship],
    options: &CompileOptions,
) -> Vec<String> {
    let mut seen: HashSet<(&str, &str, &str)> = HashSet::new();
    let mut statements = Vec::new();

    for rel in relationships {
        let Some(link) = resolver::resolve(tables, rel) else {
            log::debug!("Skipping unresolved relationship {}", rel.id);
            continue;
        };
        if !seen.insert(link.key()) {
            continue;
        }

        let mut statement = format!(
            "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {}({})",
            link.child_table.name,
            link.constraint_name(),
            link.child_column.name,
            link.parent_table.name,
            link.parent_column.name
        );
        if options.on_delete != ReferentialAction::NoAction {
            statement.push_str(&format!(" ON DELETE {}", options.on_delete.as_sql()));
        }
        if options.on_update != ReferentialAction::NoAction {
            statement.push_str(&format!(" ON UPDATE {}", options.on_update.as_sql()));
        }
        statement.push(';');
        statements.push(statement);
    }

    statements
}

/// A usable script together with the non-blocking issues found.
#[derive(Debug, Clone)]
pub struct Export {
    pub sql: String,
    pub issues: Vec<SchemaIssue>,
}

/// Validate the selection and compile it.
///
/// Fails with every issue attached when at least one is an error.
pub fn export(selection: &Selection<'_>, options: &CompileOptions) -> Result<Export, ExportError> {
    let issues = validate::validate(&selection.tables);
    if validate::has_errors(&issues) {
        return Err(ExportError::Blocked { issues });
    }

    let sql = compile(&selection.tables, &selection.relationships, options);
    Ok(Export { sql, issues })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaModel;
    use crate::validate::Severity;

    fn users_orders() -> (Vec<Table>, Vec<Relationship>) {
        let tables = vec![
            Table::new("t1", "users", vec![Column::primary_key("c1", "id", "INT")]),
            Table::new(
                "t2",
                "orders",
                vec![
                    Column::primary_key("c2", "id", "INT"),
                    Column::new("c3", "user_id", "INT").foreign_key().not_null(),
                ],
            ),
        ];
        let rels = vec![Relationship::new("e1", ("t2", "c3"), ("t1", "c1"))];
        (tables, rels)
    }

    fn compile_all(tables: &[Table], rels: &[Relationship], options: &CompileOptions) -> String {
        let t: Vec<&Table> = tables.iter().collect();
        let r: Vec<&Relationship> = rels.iter().collect();
        compile(&t, &r, options)
    }

    #[test]
    fn test_users_orders_example() {
        let (tables, rels) = users_orders();
        let options = CompileOptions {
            dialect: Dialect::PostgreSQL,
            on_delete: ReferentialAction::Cascade,
            on_update: ReferentialAction::NoAction,
            ..CompileOptions::default()
        };
        let sql = compile_all(&tables, &rels, &options);

        assert!(sql.contains("CREATE TABLE users ( id INT PRIMARY KEY );"));
        assert!(sql.contains("CREATE TABLE orders ( id INT PRIMARY KEY, user_id INT NOT NULL );"));
        assert!(sql.contains(
            "ALTER TABLE orders ADD CONSTRAINT fk_orders_users_user_id FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE;"
        ));
        assert!(!sql.contains("ON UPDATE"));
        assert!(sql.starts_with("-- Generated for PostgreSQL\n"));
    }

    #[test]
    fn test_full_script_layout() {
        let (tables, rels) = users_orders();
        let options = CompileOptions {
            header: false,
            on_update: ReferentialAction::SetNull,
            ..CompileOptions::default()
        };
        let sql = compile_all(&tables, &rels, &options);
        let expected = "CREATE TABLE users ( id INT PRIMARY KEY );\n\n\
CREATE TABLE orders ( id INT PRIMARY KEY, user_id INT NOT NULL );\n\n\
-- Relationships\n\
ALTER TABLE orders ADD CONSTRAINT fk_orders_users_user_id FOREIGN KEY (user_id) REFERENCES users(id) ON UPDATE SET NULL;\n";
        assert_eq!(sql, expected);
    }

    #[test]
    fn test_multiline_style() {
        let (tables, _) = users_orders();
        let options = CompileOptions {
            style: StatementStyle::Multiline,
            header: false,
            ..CompileOptions::default()
        };
        let sql = compile_all(&tables[1..], &[], &options);
        assert_eq!(
            sql,
            "CREATE TABLE orders (\n  id INT PRIMARY KEY,\n  user_id INT NOT NULL\n);\n\n"
        );
    }

    #[test]
    fn test_primary_key_never_marked_not_null() {
        let tables = vec![Table::new("t1", "users", vec![Column::primary_key("c1", "id", "UUID")])];
        let sql = compile_all(&tables, &[], &CompileOptions::default());
        assert!(sql.contains("id UUID PRIMARY KEY"));
        assert!(!sql.contains("NOT NULL"));
    }

    #[test]
    fn test_compile_is_deterministic() {
        let (tables, rels) = users_orders();
        let options = CompileOptions::default();
        assert_eq!(
            compile_all(&tables, &rels, &options),
            compile_all(&tables, &rels, &options)
        );
    }

    #[test]
    fn test_duplicate_edges_emit_one_constraint() {
        let (tables, mut rels) = users_orders();
        rels.push(Relationship::new("e2", ("t1", "c1"), ("t2", "c3")));
        rels.push(Relationship::new("e3", ("t2", "c3"), ("t1", "c1")));
        let sql = compile_all(&tables, &rels, &CompileOptions::default());
        assert_eq!(sql.matches("ALTER TABLE").count(), 1);
    }

    #[test]
    fn test_unknown_type_passes_through() {
        let tables = vec![Table::new(
            "t1",
            "docs",
            vec![
                Column::primary_key("c1", "id", "INT"),
                Column::new("c2", "body", "VARCHAR(255)"),
            ],
        )];
        let sql = compile_all(&tables, &[], &CompileOptions::default());
        assert!(sql.contains("body VARCHAR(255)"));
    }

    #[test]
    fn test_dangling_relationship_is_dropped() {
        let (tables, mut rels) = users_orders();
        rels[0].target_column = "gone".to_string();
        let sql = compile_all(&tables, &rels, &CompileOptions::default());
        assert!(!sql.contains("ALTER TABLE"));
        assert!(!sql.contains("-- Relationships"));
    }

    #[test]
    fn test_subset_omits_relationship_without_error() {
        let (tables, rels) = users_orders();
        let model = SchemaModel::load(
            tables,
            Some(rels),
            Dialect::PostgreSQL,
            crate::schema::LayoutPolicy::Never,
            &crate::layout::LayoutEngine::default(),
        );
        let orders_only = vec!["t2".to_string()];
        let selection = model.select(Some(orders_only.as_slice()));

        let export = export(&selection, &CompileOptions::default()).unwrap();
        assert!(export.sql.contains("CREATE TABLE orders"));
        assert!(!export.sql.contains("CREATE TABLE users"));
        assert!(!export.sql.contains("ALTER TABLE"));
        assert!(export.issues.is_empty());

        // the compiler still drops it when handed the edge directly
        let all_relationships: Vec<&Relationship> = model.relationships().iter().collect();
        let sql = compile(&selection.tables, &all_relationships, &CompileOptions::default());
        assert!(!sql.contains("ALTER TABLE"));
    }

    #[test]
    fn test_export_blocked_on_blank_table_name() {
        let tables = vec![Table::new("t1", "", vec![Column::primary_key("c1", "id", "INT")])];
        let refs: Vec<&Table> = tables.iter().collect();
        let selection = Selection {
            tables: refs,
            relationships: vec![],
        };
        match export(&selection, &CompileOptions::default()) {
            Err(ExportError::Blocked { issues }) => {
                assert_eq!(issues.len(), 1);
                assert_eq!(issues[0].severity, Severity::Error);
            }
            Ok(_) => panic!("export should be blocked"),
        }
    }

    #[test]
    fn test_export_passes_warnings_through() {
        let tables = vec![Table::new("t1", "logs", vec![Column::new("c1", "line", "TEXT")])];
        let selection = Selection {
            tables: tables.iter().collect(),
            relationships: vec![],
        };
        let export = export(&selection, &CompileOptions::default()).unwrap();
        assert_eq!(export.issues.len(), 1);
        assert_eq!(export.issues[0].severity, Severity::Warning);
        assert!(export.sql.contains("CREATE TABLE logs ( line TEXT );"));
    }

    #[test]
    fn test_options_from_json() {
        let options: CompileOptions =
            serde_json::from_str(r#"{ "dialect": "MySQL", "onDelete": "SET NULL", "style": "multiline" }"#)
                .unwrap();
        assert_eq!(options.dialect, Dialect::MySQL);
        assert_eq!(options.on_delete, ReferentialAction::SetNull);
        assert_eq!(options.on_update, ReferentialAction::NoAction);
        assert_eq!(options.style, StatementStyle::Multiline);
        assert!(options.header);
    }
}
