//! The editable schema state.
//!
//! `SchemaModel` is a value. Every edit goes through [`SchemaModel::apply`],
//! which returns a new model and leaves the original untouched. A command
//! naming a missing table, column or relationship fails with [`ModelError`]
//! and produces no state at all, so relationships never point at objects
//! that do not exist.

use crate::data_type::{DataType, TypeKind};
use crate::dialect::Dialect;
use crate::error::ModelError;
use crate::layout::LayoutEngine;
use crate::model::{Column, ColumnRef, Position, Relationship, Table, TableColor};
use crate::resolver;

/// A new table as requested by the canvas or a generator.
#[derive(Debug, Clone, Default)]
pub struct TableDraft {
    pub id: Option<String>,
    pub name: String,
    /// `None` gets a single `id INT` primary key.
    pub columns: Option<Vec<Column>>,
    pub position: Option<Position>,
    pub color: Option<TableColor>,
}

impl TableDraft {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_columns(mut self, columns: Vec<Column>) -> Self {
        self.columns = Some(columns);
        self
    }
}

/// Partial column update. `None` fields are left as they are.
#[derive(Debug, Clone, Default)]
pub struct ColumnPatch {
    pub name: Option<String>,
    pub data_type: Option<DataType>,
    pub is_primary_key: Option<bool>,
    pub is_foreign_key: Option<bool>,
    pub is_nullable: Option<bool>,
    /// `Some(None)` clears the pointer.
    pub references: Option<Option<ColumnRef>>,
}

#[derive(Debug, Clone)]
pub enum Command {
    AddTable(TableDraft),
    RenameTable { id: String, name: String },
    MoveTable { id: String, position: Position },
    SetTableColor { id: String, color: Option<TableColor> },
    RemoveTable { id: String },
    /// `None` adds the default `new_column VARCHAR`.
    AddColumn { table_id: String, column: Option<Column> },
    UpdateColumn { table_id: String, column_id: String, patch: ColumnPatch },
    RemoveColumn { table_id: String, column_id: String },
    /// Store an edge exactly as drawn.
    AddRelationship(Relationship),
    /// Connect two columns: resolve parent/child, store the normalized edge
    /// and point the child column at its parent.
    Connect {
        source: (String, String),
        target: (String, String),
    },
    SetRelationshipLabel { id: String, label: Option<String> },
    RemoveRelationship { id: String },
    SetDialect(Dialect),
}

/// When a bulk load should run the layout engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutPolicy {
    Always,
    Never,
    /// Lay out only when every incoming table sits at the origin.
    #[default]
    IfUnplaced,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaModel {
    tables: Vec<Table>,
    relationships: Vec<Relationship>,
    dialect: Dialect,
    next_id: u64,
}

/// Tables and relationships picked for export.
#[derive(Debug, Clone)]
pub struct Selection<'a> {
    pub tables: Vec<&'a Table>,
    pub relationships: Vec<&'a Relationship>,
}

impl SchemaModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bulk load from a generator or a persisted snapshot.
    ///
    /// Missing ids are filled in, tables get a palette colour, and
    /// relationships are derived from `references` when none are given.
    /// Given relationships that point at missing tables or columns are
    /// dropped.
    pub fn load(
        tables: Vec<Table>,
        relationships: Option<Vec<Relationship>>,
        dialect: Dialect,
        policy: LayoutPolicy,
        engine: &LayoutEngine,
    ) -> Self {
        let mut model = Self {
            dialect,
            ..Self::default()
        };

        for (idx, mut table) in tables.into_iter().enumerate() {
            if table.id.is_empty() || model.table(&table.id).is_some() {
                table.id = model.unique_id(&format!("table-{}", idx));
            }
            for (cidx, column) in table.columns.iter_mut().enumerate() {
                if column.id.is_empty() {
                    column.id = format!("col-{}-{}", idx, cidx);
                }
            }
            if table.color.is_none() {
                table.color = Some(TableColor::for_index(idx));
            }
            model.tables.push(table);
        }

        model.relationships = match relationships {
            Some(given) => {
                let kept: Vec<Relationship> = given
                    .into_iter()
                    .filter(|rel| {
                        let ok = model.endpoints_exist(rel);
                        if !ok {
                            log::warn!("Dropping dangling relationship {}", rel.id);
                        }
                        ok
                    })
                    .collect();
                resolver::materialize_references(&mut model.tables, &kept);
                kept
            }
            None => resolver::derive_relationships(&model.tables),
        };

        log::info!(
            "Loaded {} tables, {} relationships",
            model.tables.len(),
            model.relationships.len()
        );

        let unplaced = model.tables.iter().all(|t| t.position.is_origin());
        match policy {
            LayoutPolicy::Always => model.auto_layout(engine),
            LayoutPolicy::IfUnplaced if unplaced && !model.tables.is_empty() => {
                model.auto_layout(engine)
            }
            _ => model,
        }
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn table(&self, id: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.id == id)
    }

    pub fn table_named(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    pub fn relationship(&self, id: &str) -> Option<&Relationship> {
        self.relationships.iter().find(|r| r.id == id)
    }

    /// Edges rebuilt purely from the `references` pointers.
    pub fn regenerate_relationships(&self) -> Vec<Relationship> {
        resolver::derive_relationships(&self.tables)
    }

    /// Pick tables for export, keeping model order. `None` selects all.
    /// Only relationships with both ends selected are kept.
    pub fn select(&self, table_ids: Option<&[String]>) -> Selection<'_> {
        let included = |id: &str| table_ids.is_none_or(|ids| ids.iter().any(|s| s == id));
        Selection {
            tables: self.tables.iter().filter(|t| included(&t.id)).collect(),
            relationships: self
                .relationships
                .iter()
                .filter(|r| included(&r.source) && included(&r.target))
                .collect(),
        }
    }

    /// Reposition every table; relationships are untouched.
    pub fn auto_layout(&self, engine: &LayoutEngine) -> Self {
        let mut next = self.clone();
        next.tables = engine.arrange(&self.tables, &self.relationships);
        next
    }

    pub fn apply(&self, command: Command) -> Result<Self, ModelError> {
        let mut next = self.clone();
        match command {
            Command::AddTable(draft) => next.add_table(draft)?,
            Command::RenameTable { id, name } => next.rename_table(&id, name)?,
            Command::MoveTable { id, position } => next.table_mut(&id)?.position = position,
            Command::SetTableColor { id, color } => next.table_mut(&id)?.color = color,
            Command::RemoveTable { id } => next.remove_table(&id)?,
            Command::AddColumn { table_id, column } => next.add_column(&table_id, column)?,
            Command::UpdateColumn {
                table_id,
                column_id,
                patch,
            } => next.update_column(&table_id, &column_id, patch)?,
            Command::RemoveColumn {
                table_id,
                column_id,
            } => next.remove_column(&table_id, &column_id)?,
            Command::AddRelationship(rel) => next.add_relationship(rel)?,
            Command::Connect { source, target } => next.connect(source, target)?,
            Command::SetRelationshipLabel { id, label } => {
                next.relationships
                    .iter_mut()
                    .find(|r| r.id == id)
                    .ok_or(ModelError::RelationshipNotFound(id))?
                    .label = label;
            }
            Command::RemoveRelationship { id } => next.remove_relationship(&id)?,
            Command::SetDialect(dialect) => next.dialect = dialect,
        }
        Ok(next)
    }

    /// Apply commands in order, stopping at the first failure.
    pub fn apply_all(
        &self,
        commands: impl IntoIterator<Item = Command>,
    ) -> Result<Self, ModelError> {
        commands
            .into_iter()
            .try_fold(self.clone(), |model, command| model.apply(command))
    }

    fn table_mut(&mut self, id: &str) -> Result<&mut Table, ModelError> {
        self.tables
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| ModelError::TableNotFound(id.to_string()))
    }

    fn id_in_use(&self, id: &str) -> bool {
        self.tables
            .iter()
            .any(|t| t.id == id || t.columns.iter().any(|c| c.id == id))
            || self.relationships.iter().any(|r| r.id == id)
    }

    fn unique_id(&mut self, base: &str) -> String {
        if !self.id_in_use(base) {
            return base.to_string();
        }
        loop {
            self.next_id += 1;
            let candidate = format!("{}-{}", base, self.next_id);
            if !self.id_in_use(&candidate) {
                return candidate;
            }
        }
    }

    fn fresh_id(&mut self, prefix: &str) -> String {
        loop {
            self.next_id += 1;
            let candidate = format!("{}-{}", prefix, self.next_id);
            if !self.id_in_use(&candidate) {
                return candidate;
            }
        }
    }

    fn endpoints_exist(&self, rel: &Relationship) -> bool {
        let has = |table_id: &str, column_id: &str| {
            self.table(table_id)
                .is_some_and(|t| t.column(column_id).is_some())
        };
        has(&rel.source, &rel.source_column) && has(&rel.target, &rel.target_column)
    }

    fn add_table(&mut self, draft: TableDraft) -> Result<(), ModelError> {
        let id = match draft.id {
            Some(id) if self.id_in_use(&id) => return Err(ModelError::DuplicateId(id)),
            Some(id) => id,
            None => self.fresh_id("table"),
        };

        let base = match draft.name.trim() {
            "" => "new_table",
            trimmed => trimmed,
        };
        let name = unique_name(base, |candidate| self.table_named(candidate).is_some());

        let columns = match draft.columns {
            Some(columns) => columns,
            None => vec![Column::primary_key(self.fresh_id("col"), "id", TypeKind::Int)],
        };

        let index = self.tables.len();
        let position = draft.position.unwrap_or_else(|| {
            let offset = (index % 10) as f64 * 20.0;
            Position::new(100.0 + offset, 100.0 + offset)
        });

        self.tables.push(Table {
            id,
            name,
            columns,
            position,
            color: Some(draft.color.unwrap_or_else(|| TableColor::for_index(index))),
            description: None,
        });
        Ok(())
    }

    fn rename_table(&mut self, id: &str, name: String) -> Result<(), ModelError> {
        let table = self.table_mut(id)?;
        let old = std::mem::replace(&mut table.name, name.clone());

        let shadowed = self
            .tables
            .iter()
            .any(|t| t.id != id && t.name.eq_ignore_ascii_case(&old));
        if shadowed {
            // another table still answers to the old name
            return Ok(());
        }
        for column in self.tables.iter_mut().flat_map(|t| t.columns.iter_mut()) {
            if let Some(reference) = column.references.as_mut() {
                if reference.points_to_table(&old) {
                    reference.table = name.clone();
                }
            }
        }
        Ok(())
    }

    fn remove_table(&mut self, id: &str) -> Result<(), ModelError> {
        let idx = self
            .tables
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| ModelError::TableNotFound(id.to_string()))?;
        let removed = self.tables.remove(idx);

        let before = self.relationships.len();
        self.relationships.retain(|r| !r.touches_table(id));
        log::debug!(
            "Removed table {} and {} relationship(s)",
            removed.name,
            before - self.relationships.len()
        );

        if self.table_named(&removed.name).is_none() {
            for column in self.tables.iter_mut().flat_map(|t| t.columns.iter_mut()) {
                if column
                    .references
                    .as_ref()
                    .is_some_and(|r| r.points_to_table(&removed.name))
                {
                    column.references = None;
                }
            }
        }
        Ok(())
    }

    fn add_column(&mut self, table_id: &str, column: Option<Column>) -> Result<(), ModelError> {
        let fresh = self.fresh_id("col");
        let table = self.table_mut(table_id)?;

        let mut column = column.unwrap_or_else(|| Column::new("", "new_column", TypeKind::Varchar));
        if column.id.is_empty() || table.column(&column.id).is_some() {
            column.id = fresh;
        }
        let base = match column.name.trim() {
            "" => "new_column".to_string(),
            trimmed => trimmed.to_string(),
        };
        column.name = unique_name(&base, |candidate| table.has_column_named(candidate));
        table.columns.push(column);
        Ok(())
    }

    fn update_column(
        &mut self,
        table_id: &str,
        column_id: &str,
        patch: ColumnPatch,
    ) -> Result<(), ModelError> {
        let table = self.table_mut(table_id)?;
        let table_name = table.name.clone();
        let column = table
            .column_mut(column_id)
            .ok_or_else(|| ModelError::ColumnNotFound {
                table: table_id.to_string(),
                column: column_id.to_string(),
            })?;

        let renamed = patch
            .name
            .map(|name| (std::mem::replace(&mut column.name, name.clone()), name));
        if let Some(data_type) = patch.data_type {
            column.data_type = data_type;
        }
        if let Some(pk) = patch.is_primary_key {
            column.is_primary_key = pk;
        }
        if let Some(fk) = patch.is_foreign_key {
            column.is_foreign_key = fk;
        }
        if let Some(nullable) = patch.is_nullable {
            column.is_nullable = nullable;
        }
        if let Some(references) = patch.references {
            column.references = references;
        }

        if let Some((old, new)) = renamed {
            let still_named = self.table(table_id).is_some_and(|t| {
                t.columns
                    .iter()
                    .any(|c| c.id != column_id && c.name.eq_ignore_ascii_case(&old))
            });
            if !still_named {
                for column in self.tables.iter_mut().flat_map(|t| t.columns.iter_mut()) {
                    if let Some(reference) = column.references.as_mut() {
                        if reference.points_to(&table_name, &old) {
                            reference.column = new.clone();
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn remove_column(&mut self, table_id: &str, column_id: &str) -> Result<(), ModelError> {
        let table = self.table_mut(table_id)?;
        let table_name = table.name.clone();
        let idx = table
            .columns
            .iter()
            .position(|c| c.id == column_id)
            .ok_or_else(|| ModelError::ColumnNotFound {
                table: table_id.to_string(),
                column: column_id.to_string(),
            })?;
        let removed = table.columns.remove(idx);
        let still_named = table.has_column_named(&removed.name);

        self.relationships
            .retain(|r| !r.touches_column(table_id, column_id));

        if !still_named {
            for column in self.tables.iter_mut().flat_map(|t| t.columns.iter_mut()) {
                if column
                    .references
                    .as_ref()
                    .is_some_and(|r| r.points_to(&table_name, &removed.name))
                {
                    column.references = None;
                }
            }
        }
        Ok(())
    }

    fn check_endpoint(&self, table_id: &str, column_id: &str) -> Result<(), ModelError> {
        let table = self
            .table(table_id)
            .ok_or_else(|| ModelError::TableNotFound(table_id.to_string()))?;
        table
            .column(column_id)
            .map(|_| ())
            .ok_or_else(|| ModelError::ColumnNotFound {
                table: table_id.to_string(),
                column: column_id.to_string(),
            })
    }

    fn add_relationship(&mut self, mut rel: Relationship) -> Result<(), ModelError> {
        self.check_endpoint(&rel.source, &rel.source_column)?;
        self.check_endpoint(&rel.target, &rel.target_column)?;
        if rel.id.is_empty() {
            rel.id = self.fresh_id("edge");
        } else if self.id_in_use(&rel.id) {
            return Err(ModelError::DuplicateId(rel.id));
        }
        resolver::materialize_references(&mut self.tables, std::slice::from_ref(&rel));
        self.relationships.push(rel);
        Ok(())
    }

    fn connect(
        &mut self,
        (source_table, source_column): (String, String),
        (target_table, target_column): (String, String),
    ) -> Result<(), ModelError> {
        self.check_endpoint(&source_table, &source_column)?;
        self.check_endpoint(&target_table, &target_column)?;

        let raw = Relationship {
            id: String::new(),
            source: source_table,
            target: target_table,
            source_column,
            target_column,
            label: None,
        };
        let (edge, reference) = {
            let all: Vec<&Table> = self.tables.iter().collect();
            // both endpoints were checked above
            let link = resolver::resolve(&all, &raw).ok_or_else(|| ModelError::ColumnNotFound {
                table: raw.source.clone(),
                column: raw.source_column.clone(),
            })?;
            (resolver::normalized_edge(&link), link.reference())
        };

        if let Some(child) = self
            .tables
            .iter_mut()
            .find(|t| t.id == edge.source)
            .and_then(|t| t.column_mut(&edge.source_column))
        {
            child.is_foreign_key = true;
            child.references = Some(reference);
        }

        match self.relationships.iter().position(|r| r.id == edge.id) {
            Some(idx) => {
                let label = self.relationships[idx].label.take();
                self.relationships[idx] = Relationship { label, ..edge };
            }
            None => self.relationships.push(edge),
        }
        Ok(())
    }

    fn remove_relationship(&mut self, id: &str) -> Result<(), ModelError> {
        let idx = self
            .relationships
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| ModelError::RelationshipNotFound(id.to_string()))?;
        let rel = self.relationships.remove(idx);

        let cleared = {
            let all: Vec<&Table> = self.tables.iter().collect();
            resolver::resolve(&all, &rel).map(|link| {
                (
                    link.child_table.id.clone(),
                    link.child_column.id.clone(),
                    link.reference(),
                )
            })
        };
        if let Some((table_id, column_id, reference)) = cleared {
            let still_linked = {
                let all: Vec<&Table> = self.tables.iter().collect();
                self.relationships
                    .iter()
                    .filter_map(|r| resolver::resolve(&all, r))
                    .any(|l| l.child_table.id == table_id && l.child_column.id == column_id)
            };
            if !still_linked {
                if let Some(column) = self
                    .tables
                    .iter_mut()
                    .find(|t| t.id == table_id)
                    .and_then(|t| t.column_mut(&column_id))
                {
                    if column.references.as_ref() == Some(&reference) {
                        column.references = None;
                    }
                }
            }
        }
        Ok(())
    }
}

/// `base`, or `base_1`, `base_2`, … until `taken` says no.
fn unique_name(base: &str, taken: impl Fn(&str) -> bool) -> String {
    let mut name = base.to_string();
    let mut count = 1;
    while taken(&name) {
        name = format!("{}_{}", base, count);
        count += 1;
    }
    name
}
