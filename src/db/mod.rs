use crate::{
    errors::DbError,
    models::schema::{CatalogColumn, Column, EnumType, Schema, Table, TableDetails},
};
use async_trait::async_trait;
use log::{debug, warn};

pub mod postgres;

/// Read-only access to the catalog of a single database schema.
#[async_trait]
pub trait DbClient {
    /// Base table names, sorted.
    async fn list_tables(&self) -> Result<Vec<String>, DbError>;
    /// Every column of every base table with its normalized type, ordered by
    /// table name then ordinal position.
    async fn list_columns(&self) -> Result<Vec<CatalogColumn>, DbError>;
    async fn describe_table(&self, table_name: &str) -> Result<TableDetails, DbError>;
    async fn list_enums(&self) -> Result<Vec<EnumType>, DbError>;
}

/// Captures the live schema as the drift check compares it.
///
/// Tables come from the table listing so that tables without columns are
/// still reported.
pub async fn capture_live_schema<C>(client: &C) -> Result<Schema, DbError>
where
    C: DbClient + ?Sized,
{
    let mut schema: Schema = client
        .list_tables()
        .await?
        .into_iter()
        .map(Table::new)
        .collect();

    for row in client.list_columns().await? {
        match schema.tables.get_mut(&row.table_name) {
            Some(table) => table
                .columns
                .push(Column::new(row.column_name, row.data_type)),
            // A table created between the two queries.
            None => warn!(
                "Column {}.{} belongs to an unlisted table, ignoring",
                row.table_name, row.column_name
            ),
        }
    }

    debug!("Captured {} tables from the live database", schema.len());
    Ok(schema)
}
