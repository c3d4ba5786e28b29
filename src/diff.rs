//! Comparison of a schema snapshot against the live schema.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::models::schema::{Schema, Table};

/// A single difference between the snapshot and the live database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discrepancy {
    TableMissingFromLive(String),
    TableMissingFromSnapshot(String),
    ColumnMissingFromLive {
        table: String,
        column: String,
    },
    ColumnMissingFromSnapshot {
        table: String,
        column: String,
    },
    TypeMismatch {
        table: String,
        column: String,
        snapshot_type: String,
        live_type: String,
    },
}

impl Discrepancy {
    pub fn table(&self) -> &str {
        match self {
            Discrepancy::TableMissingFromLive(table)
            | Discrepancy::TableMissingFromSnapshot(table)
            | Discrepancy::ColumnMissingFromLive { table, .. }
            | Discrepancy::ColumnMissingFromSnapshot { table, .. }
            | Discrepancy::TypeMismatch { table, .. } => table,
        }
    }
}

impl fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Discrepancy::TableMissingFromLive(table) => {
                write!(f, "{}: table missing in live database", table)
            }
            Discrepancy::TableMissingFromSnapshot(table) => {
                write!(f, "{}: table missing in snapshot", table)
            }
            Discrepancy::ColumnMissingFromLive { table, column } => {
                write!(f, "{}.{}: column missing in live database", table, column)
            }
            Discrepancy::ColumnMissingFromSnapshot { table, column } => {
                write!(f, "{}.{}: column missing in snapshot", table, column)
            }
            Discrepancy::TypeMismatch {
                table,
                column,
                snapshot_type,
                live_type,
            } => write!(
                f,
                "{}.{}: type mismatch snapshot={} live={}",
                table, column, snapshot_type, live_type
            ),
        }
    }
}

/// Compares `snapshot` against `live`.
///
/// Missing tables are reported first, ordered by table name. Column level
/// differences follow, ordered by table name and then column name. Types are
/// compared verbatim.
pub fn diff(snapshot: &Schema, live: &Schema) -> Vec<Discrepancy> {
    let names: BTreeSet<&str> = snapshot.table_names().chain(live.table_names()).collect();

    let mut tables = Vec::new();
    let mut columns = Vec::new();

    for name in names {
        match (snapshot.table(name), live.table(name)) {
            (Some(_), None) => tables.push(Discrepancy::TableMissingFromLive(name.to_string())),
            (None, Some(_)) => {
                tables.push(Discrepancy::TableMissingFromSnapshot(name.to_string()))
            }
            (Some(s), Some(l)) => diff_columns(s, l, &mut columns),
            (None, None) => {}
        }
    }

    tables.extend(columns);
    tables
}

fn diff_columns(snapshot: &Table, live: &Table, out: &mut Vec<Discrepancy>) {
    let snapshot_types = column_types(snapshot);
    let live_types = column_types(live);
    let names: BTreeSet<&str> = snapshot_types.keys().chain(live_types.keys()).copied().collect();

    for column in names {
        let discrepancy = match (snapshot_types.get(column), live_types.get(column)) {
            (Some(_), None) => Discrepancy::ColumnMissingFromLive {
                table: snapshot.name.clone(),
                column: column.to_string(),
            },
            (None, Some(_)) => Discrepancy::ColumnMissingFromSnapshot {
                table: snapshot.name.clone(),
                column: column.to_string(),
            },
            (Some(s), Some(l)) if s != l => Discrepancy::TypeMismatch {
                table: snapshot.name.clone(),
                column: column.to_string(),
                snapshot_type: s.to_string(),
                live_type: l.to_string(),
            },
            _ => continue,
        };
        out.push(discrepancy);
    }
}

fn column_types(table: &Table) -> BTreeMap<&str, &str> {
    table
        .columns
        .iter()
        .map(|c| (c.name.as_str(), c.data_type.as_str()))
        .collect()
}
