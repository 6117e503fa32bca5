//! Parent/child resolution for relationships.
//!
//! A relationship joins two columns. The end holding the foreign key is the
//! child, the referenced end is the parent. Rules, first match wins:
//!
//! 1. exactly one column is a foreign key: it is the child;
//! 2. exactly one column is a primary key: the other one is the child;
//! 3. otherwise the source end is the child ([`fallback_child`]).
//!
//! The same rule turns edges into `references` pointers and back, so a model
//! built from pointers alone yields the same edges as one built by
//! connecting columns on the canvas.

use crate::model::{Column, ColumnRef, Relationship, Table};

/// Which end of a connection holds the foreign key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildEnd {
    Source,
    Target,
}

/// The rule that decided an orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    ForeignKeyFlag,
    PrimaryKeyFlag,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Orientation {
    pub child: ChildEnd,
    pub rule: Rule,
}

/// Decide which of two connected columns is the child.
pub fn orient(source: &Column, target: &Column) -> Orientation {
    match (source.is_fk(), target.is_fk()) {
        (true, false) => {
            return Orientation {
                child: ChildEnd::Source,
                rule: Rule::ForeignKeyFlag,
            };
        }
        (false, true) => {
            return Orientation {
                child: ChildEnd::Target,
                rule: Rule::ForeignKeyFlag,
            };
        }
        _ => {}
    }

    match (source.is_primary_key, target.is_primary_key) {
        (true, false) => Orientation {
            child: ChildEnd::Target,
            rule: Rule::PrimaryKeyFlag,
        },
        (false, true) => Orientation {
            child: ChildEnd::Source,
            rule: Rule::PrimaryKeyFlag,
        },
        _ => Orientation {
            child: fallback_child(),
            rule: Rule::Fallback,
        },
    }
}

/// Orientation used when the flags on both columns agree.
///
/// This is a default, not a reading of intent. Keep every ambiguous case
/// routed through here so the policy can change in one place.
pub fn fallback_child() -> ChildEnd {
    ChildEnd::Source
}

/// A relationship with both ends found and parent/child decided.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedLink<'a> {
    pub child_table: &'a Table,
    pub child_column: &'a Column,
    pub parent_table: &'a Table,
    pub parent_column: &'a Column,
    pub rule: Rule,
}

impl<'a> ResolvedLink<'a> {
    /// `fk_<child>_<parent>_<childColumn>`
    pub fn constraint_name(&self) -> String {
        format!(
            "fk_{}_{}_{}",
            self.child_table.name, self.parent_table.name, self.child_column.name
        )
    }

    /// Identity of the logical constraint: child table, parent table, child column.
    pub fn key(&self) -> (&'a str, &'a str, &'a str) {
        (
            self.child_table.id.as_str(),
            self.parent_table.id.as_str(),
            self.child_column.id.as_str(),
        )
    }

    pub fn reference(&self) -> ColumnRef {
        ColumnRef::new(&self.parent_table.name, &self.parent_column.name)
    }
}

/// Resolve a relationship against a set of tables.
///
/// Returns `None` when either table is outside `tables` or either column id
/// is missing; callers drop such relationships.
pub fn resolve<'a>(tables: &[&'a Table], rel: &Relationship) -> Option<ResolvedLink<'a>> {
    let source_table = *tables.iter().find(|t| t.id == rel.source)?;
    let target_table = *tables.iter().find(|t| t.id == rel.target)?;
    let source_column = source_table.column(&rel.source_column)?;
    let target_column = target_table.column(&rel.target_column)?;

    let orientation = orient(source_column, target_column);
    let link = match orientation.child {
        ChildEnd::Source => ResolvedLink {
            child_table: source_table,
            child_column: source_column,
            parent_table: target_table,
            parent_column: target_column,
            rule: orientation.rule,
        },
        ChildEnd::Target => ResolvedLink {
            child_table: target_table,
            child_column: target_column,
            parent_table: source_table,
            parent_column: source_column,
            rule: orientation.rule,
        },
    };
    Some(link)
}

/// Id given to the edge that carries a child column's foreign key.
pub fn edge_id(child_table_id: &str, child_column_id: &str) -> String {
    format!("fk-{}-{}", child_table_id, child_column_id)
}

/// Build the normalized edge (source = child, target = parent) for a link.
pub fn normalized_edge(link: &ResolvedLink<'_>) -> Relationship {
    Relationship {
        id: edge_id(&link.child_table.id, &link.child_column.id),
        source: link.child_table.id.clone(),
        target: link.parent_table.id.clone(),
        source_column: link.child_column.id.clone(),
        target_column: link.parent_column.id.clone(),
        label: None,
    }
}

/// Find the column a `references` pointer names.
///
/// Falls back to the parent's primary key when the named column is missing
/// and the parent has exactly one.
pub fn lookup_reference<'a>(
    tables: &'a [Table],
    reference: &ColumnRef,
) -> Option<(&'a Table, &'a Column)> {
    let parent = tables.iter().find(|t| t.name.eq_ignore_ascii_case(&reference.table))?;
    let column = parent
        .column_named(&reference.column)
        .or_else(|| parent.single_primary_key())?;
    Some((parent, column))
}

/// Derive edges from the `references` pointers in `tables`.
///
/// One edge per child column, in table then column order. Pointers that do
/// not resolve are skipped.
pub fn derive_relationships(tables: &[Table]) -> Vec<Relationship> {
    let mut relationships = Vec::new();

    for child in tables {
        for column in &child.columns {
            let Some(reference) = column.references.as_ref().filter(|r| !r.table.is_empty()) else {
                continue;
            };
            match lookup_reference(tables, reference) {
                Some((parent, parent_column)) => relationships.push(Relationship {
                    id: edge_id(&child.id, &column.id),
                    source: child.id.clone(),
                    target: parent.id.clone(),
                    source_column: column.id.clone(),
                    target_column: parent_column.id.clone(),
                    label: None,
                }),
                None => log::debug!(
                    "Unresolved reference {}.{} -> {}.{}",
                    child.name,
                    column.name,
                    reference.table,
                    reference.column
                ),
            }
        }
    }

    relationships
}

/// Write `references` onto child columns for every resolvable edge.
///
/// Existing pointers are kept; only columns without one are filled.
pub fn materialize_references(tables: &mut [Table], relationships: &[Relationship]) {
    let mut updates: Vec<(String, String, ColumnRef)> = Vec::new();
    {
        let all: Vec<&Table> = tables.iter().collect();
        for rel in relationships {
            if let Some(link) = resolve(&all, rel) {
                if link.child_column.references.is_none() {
                    updates.push((
                        link.child_table.id.clone(),
                        link.child_column.id.clone(),
                        link.reference(),
                    ));
                }
            }
        }
    }

    for (table_id, column_id, reference) in updates {
        let column = tables
            .iter_mut()
            .find(|t| t.id == table_id)
            .and_then(|t| t.column_mut(&column_id));
        if let Some(column) = column {
            if column.references.is_none() {
                column.is_foreign_key = true;
                column.references = Some(reference);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn col(id: &str, pk: bool, fk: bool) -> Column {
        let mut c = Column::new(id, id, "INT");
        c.is_primary_key = pk;
        c.is_foreign_key = fk;
        c
    }

    #[rstest]
    // (source pk, source fk, target pk, target fk) -> child
    #[case((false, true, true, false), ChildEnd::Source, Rule::ForeignKeyFlag)]
    #[case((true, false, false, true), ChildEnd::Target, Rule::ForeignKeyFlag)]
    #[case((true, false, false, false), ChildEnd::Target, Rule::PrimaryKeyFlag)]
    #[case((false, false, true, false), ChildEnd::Source, Rule::PrimaryKeyFlag)]
    #[case((true, true, true, true), ChildEnd::Source, Rule::Fallback)]
    #[case((false, false, false, false), ChildEnd::Source, Rule::Fallback)]
    #[case((true, true, false, true), ChildEnd::Target, Rule::PrimaryKeyFlag)]
    fn test_orient_rules(
        #[case] flags: (bool, bool, bool, bool),
        #[case] child: ChildEnd,
        #[case] rule: Rule,
    ) {
        let (spk, sfk, tpk, tfk) = flags;
        let o = orient(&col("s", spk, sfk), &col("t", tpk, tfk));
        assert_eq!(o.child, child);
        assert_eq!(o.rule, rule);
    }

    #[test]
    fn test_references_count_as_fk_flag() {
        let source = Column::new("s", "user_id", "INT");
        let mut target = Column::new("t", "owner_id", "INT");
        target.references = Some(ColumnRef::new("users", "id"));
        assert_eq!(orient(&source, &target).child, ChildEnd::Target);
    }

    fn users_orders() -> Vec<Table> {
        vec![
            Table::new("t1", "users", vec![Column::primary_key("c1", "id", "INT")]),
            Table::new(
                "t2",
                "orders",
                vec![
                    Column::primary_key("c2", "id", "INT"),
                    Column::new("c3", "user_id", "INT").foreign_key().not_null(),
                ],
            ),
        ]
    }

    #[test]
    fn test_resolve_is_independent_of_argument_order() {
        let tables = users_orders();
        let all: Vec<&Table> = tables.iter().collect();

        let forward = Relationship::new("e1", ("t2", "c3"), ("t1", "c1"));
        let backward = Relationship::new("e2", ("t1", "c1"), ("t2", "c3"));

        for rel in [forward, backward] {
            let link = resolve(&all, &rel).unwrap();
            assert_eq!(link.child_table.name, "orders");
            assert_eq!(link.child_column.name, "user_id");
            assert_eq!(link.parent_table.name, "users");
            assert_eq!(link.parent_column.name, "id");
            assert_eq!(link.constraint_name(), "fk_orders_users_user_id");
        }
    }

    #[test]
    fn test_resolve_outside_subset() {
        let tables = users_orders();
        let only_orders: Vec<&Table> = tables.iter().filter(|t| t.name == "orders").collect();
        let rel = Relationship::new("e1", ("t2", "c3"), ("t1", "c1"));
        assert!(resolve(&only_orders, &rel).is_none());
    }

    #[test]
    fn test_resolve_missing_column() {
        let tables = users_orders();
        let all: Vec<&Table> = tables.iter().collect();
        let rel = Relationship::new("e1", ("t2", "gone"), ("t1", "c1"));
        assert!(resolve(&all, &rel).is_none());
    }

    #[test]
    fn test_derive_from_references() {
        let mut tables = users_orders();
        tables[1].columns[1].references = Some(ColumnRef::new("USERS", "id"));

        let rels = derive_relationships(&tables);
        assert_eq!(rels.len(), 1);
        assert_eq!(rels[0].id, "fk-t2-c3");
        assert_eq!(rels[0].source, "t2");
        assert_eq!(rels[0].target, "t1");
        assert_eq!(rels[0].source_column, "c3");
        assert_eq!(rels[0].target_column, "c1");
    }

    #[test]
    fn test_derive_falls_back_to_primary_key() {
        let mut tables = users_orders();
        tables[1].columns[1].references = Some(ColumnRef::new("users", "uuid"));

        let rels = derive_relationships(&tables);
        assert_eq!(rels.len(), 1);
        assert_eq!(rels[0].target_column, "c1");
    }

    #[test]
    fn test_derive_skips_unresolvable() {
        let mut tables = users_orders();
        tables[1].columns[1].references = Some(ColumnRef::new("customers", "id"));
        assert!(derive_relationships(&tables).is_empty());

        // composite key on the parent: no single fallback column
        tables[0].columns.push(Column::primary_key("c4", "tenant_id", "INT"));
        tables[1].columns[1].references = Some(ColumnRef::new("users", "missing"));
        assert!(derive_relationships(&tables).is_empty());
    }

    #[test]
    fn test_edges_and_references_agree() {
        let mut tables = users_orders();
        let drawn = Relationship::new("e1", ("t1", "c1"), ("t2", "c3"));
        materialize_references(&mut tables, std::slice::from_ref(&drawn));

        assert_eq!(
            tables[1].columns[1].references,
            Some(ColumnRef::new("users", "id"))
        );

        let derived = derive_relationships(&tables);
        let all: Vec<&Table> = tables.iter().collect();
        let from_drawn = resolve(&all, &drawn).unwrap();
        assert_eq!(derived, vec![normalized_edge(&from_drawn)]);
    }
}
