use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A column as the drift check sees it: its name and normalized type.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Column {
    #[serde(rename = "column_name")]
    pub name: String,
    pub data_type: String,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

/// A base table with its columns in ordinal position order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    pub fn with_column(mut self, name: &str, data_type: &str) -> Self {
        self.columns.push(Column::new(name, data_type));
        self
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Table name to table mapping. Iteration is always in table-name order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    pub tables: BTreeMap<String, Table>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, table: Table) {
        self.tables.insert(table.name.clone(), table);
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl FromIterator<Table> for Schema {
    fn from_iter<I: IntoIterator<Item = Table>>(iter: I) -> Self {
        let mut schema = Schema::new();
        for table in iter {
            schema.insert(table);
        }
        schema
    }
}

/// One row of the normalized column catalog query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogColumn {
    pub table_name: String,
    pub column_name: String,
    pub data_type: String,
}

/// Full column metadata used by the schema analyzer.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct ColumnDetails {
    pub name: String,
    pub data_type: String,
    pub udt_name: String,
    pub is_nullable: bool,
    pub default: Option<String>,
    pub max_length: Option<i32>,
    pub precision: Option<i32>,
    pub scale: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub referenced_table: String,
    pub referenced_column: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct TableDetails {
    pub table_name: String,
    pub columns: Vec<ColumnDetails>,
    pub primary_keys: Vec<String>,
    /// Keyed by the referencing column.
    pub foreign_keys: BTreeMap<String, ForeignKey>,
    pub unique_columns: Vec<String>,
}

impl TableDetails {
    pub fn is_primary_key(&self, column: &str) -> bool {
        self.primary_keys.iter().any(|c| c == column)
    }

    pub fn is_unique(&self, column: &str) -> bool {
        self.unique_columns.iter().any(|c| c == column)
    }
}

/// A user-defined enum type and its labels in sort order.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct EnumType {
    pub name: String,
    pub labels: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_iterates_in_name_order() {
        let schema: Schema = vec![Table::new("users"), Table::new("accounts"), Table::new("orders")]
            .into_iter()
            .collect();

        let names: Vec<&str> = schema.table_names().collect();
        assert_eq!(names, vec!["accounts", "orders", "users"]);
        assert_eq!(schema.len(), 3);
    }

    #[test]
    fn test_table_column_lookup() {
        let table = Table::new("users")
            .with_column("id", "integer")
            .with_column("email", "text");

        assert_eq!(table.column("email").map(|c| c.data_type.as_str()), Some("text"));
        assert!(table.column("missing").is_none());
    }

    #[test]
    fn test_column_serializes_with_catalog_field_names() {
        let json = serde_json::to_value(Column::new("id", "integer")).unwrap();
        assert_eq!(json, serde_json::json!({"column_name": "id", "data_type": "integer"}));
    }
}
