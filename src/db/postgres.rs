use std::collections::BTreeMap;

use async_trait::async_trait;
use log::debug;
use sqlx::{postgres::PgPoolOptions, PgPool, Row};

use crate::{
    config::DEFAULT_SCHEMA_NAME,
    errors::DbError,
    models::schema::{CatalogColumn, ColumnDetails, EnumType, ForeignKey, TableDetails},
};

use super::DbClient;

const LIST_TABLES: &str = r#"
    SELECT table_name::text AS table_name
    FROM information_schema.tables
    WHERE table_schema = $1 AND table_type = 'BASE TABLE'
    ORDER BY table_name
"#;

// hstore is itself a user-defined type; it is matched first so it keeps its name.
const LIST_COLUMNS: &str = r#"
    SELECT c.table_name::text AS table_name,
           c.column_name::text AS column_name,
           CASE
             WHEN c.udt_name = 'hstore' THEN 'hstore'
             WHEN c.data_type = 'ARRAY' THEN 'ARRAY'
             WHEN c.data_type ILIKE 'USER-DEFINED' THEN c.udt_name::text
             ELSE c.data_type::text
           END AS data_type
    FROM information_schema.columns c
    JOIN information_schema.tables t
      ON t.table_name = c.table_name AND t.table_schema = c.table_schema
    WHERE c.table_schema = $1 AND t.table_type = 'BASE TABLE'
    ORDER BY c.table_name, c.ordinal_position
"#;

const DESCRIBE_COLUMNS: &str = r#"
    SELECT column_name::text AS column_name,
           data_type::text AS data_type,
           udt_name::text AS udt_name,
           is_nullable::text AS is_nullable,
           column_default::text AS column_default,
           character_maximum_length::int4 AS max_length,
           numeric_precision::int4 AS precision,
           numeric_scale::int4 AS scale
    FROM information_schema.columns
    WHERE table_schema = $1 AND table_name = $2
    ORDER BY ordinal_position
"#;

const PRIMARY_KEY_COLUMNS: &str = r#"
    SELECT kcu.column_name::text AS column_name
    FROM information_schema.table_constraints tc
    JOIN information_schema.key_column_usage kcu
      ON tc.constraint_name = kcu.constraint_name
     AND tc.constraint_schema = kcu.constraint_schema
     AND tc.table_name = kcu.table_name
    WHERE tc.table_schema = $1
      AND tc.table_name = $2
      AND tc.constraint_type = 'PRIMARY KEY'
    ORDER BY kcu.ordinal_position
"#;

// Composite unique constraints are left out: no single column is unique on its own.
const UNIQUE_COLUMNS: &str = r#"
    SELECT min(kcu.column_name::text) AS column_name
    FROM information_schema.table_constraints tc
    JOIN information_schema.key_column_usage kcu
      ON tc.constraint_name = kcu.constraint_name
     AND tc.constraint_schema = kcu.constraint_schema
     AND tc.table_name = kcu.table_name
    WHERE tc.table_schema = $1
      AND tc.table_name = $2
      AND tc.constraint_type = 'UNIQUE'
    GROUP BY tc.constraint_name
    HAVING count(*) = 1
    ORDER BY 1
"#;

// Constraint names are only unique per table, so this goes through
// pg_constraint and its column number arrays rather than matching by name.
const FOREIGN_KEYS: &str = r#"
    SELECT a.attname::text AS column_name,
           rt.relname::text AS referenced_table,
           ra.attname::text AS referenced_column
    FROM pg_constraint con
    JOIN pg_class t ON t.oid = con.conrelid
    JOIN pg_namespace n ON n.oid = t.relnamespace
    JOIN pg_class rt ON rt.oid = con.confrelid
    CROSS JOIN LATERAL unnest(con.conkey, con.confkey) AS k(attnum, ref_attnum)
    JOIN pg_attribute a ON a.attrelid = con.conrelid AND a.attnum = k.attnum
    JOIN pg_attribute ra ON ra.attrelid = con.confrelid AND ra.attnum = k.ref_attnum
    WHERE con.contype = 'f'
      AND n.nspname = $1
      AND t.relname = $2
    ORDER BY con.conname, a.attnum
"#;

const LIST_ENUMS: &str = r#"
    SELECT t.typname::text AS enum_name,
           array_agg(e.enumlabel::text ORDER BY e.enumsortorder) AS enum_values
    FROM pg_type t
    JOIN pg_enum e ON t.oid = e.enumtypid
    JOIN pg_catalog.pg_namespace n ON n.oid = t.typnamespace
    WHERE n.nspname = $1
    GROUP BY t.typname
    ORDER BY t.typname
"#;

pub struct PostgresClient {
    pub pool: PgPool,
    pub schema_name: String,
}

impl PostgresClient {
    /// Opens a single connection; the tools never need more than one.
    pub async fn connect(database_url: &str) -> Result<Self, DbError> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect(database_url)
            .await
            .map_err(|e| DbError::Connection(e.to_string()))?;

        Ok(Self {
            pool,
            schema_name: DEFAULT_SCHEMA_NAME.to_string(),
        })
    }

    pub fn with_schema(mut self, schema_name: impl Into<String>) -> Self {
        self.schema_name = schema_name.into();
        self
    }

    pub async fn close(self) {
        self.pool.close().await;
    }

    async fn constraint_columns(&self, query: &str, table_name: &str) -> Result<Vec<String>, DbError> {
        let rows = sqlx::query(query)
            .bind(&self.schema_name)
            .bind(table_name)
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::Sqlx)?;

        rows.iter()
            .map(|row| row.try_get::<String, _>("column_name").map_err(DbError::Sqlx))
            .collect()
    }
}

#[async_trait]
impl DbClient for PostgresClient {
    async fn list_tables(&self) -> Result<Vec<String>, DbError> {
        let rows = sqlx::query(LIST_TABLES)
            .bind(&self.schema_name)
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::Sqlx)?;

        let tables = rows
            .iter()
            .map(|row| row.try_get::<String, _>("table_name"))
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Found {} base tables in schema {}", tables.len(), self.schema_name);
        Ok(tables)
    }

    async fn list_columns(&self) -> Result<Vec<CatalogColumn>, DbError> {
        let rows = sqlx::query(LIST_COLUMNS)
            .bind(&self.schema_name)
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::Sqlx)?;

        rows.iter()
            .map(|row| -> Result<CatalogColumn, DbError> {
                Ok(CatalogColumn {
                    table_name: row.try_get("table_name")?,
                    column_name: row.try_get("column_name")?,
                    data_type: row.try_get("data_type")?,
                })
            })
            .collect()
    }

    async fn describe_table(&self, table_name: &str) -> Result<TableDetails, DbError> {
        let rows = sqlx::query(DESCRIBE_COLUMNS)
            .bind(&self.schema_name)
            .bind(table_name)
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::Sqlx)?;

        let columns = rows
            .iter()
            .map(|row| -> Result<ColumnDetails, DbError> {
                Ok(ColumnDetails {
                    name: row.try_get("column_name")?,
                    data_type: row.try_get("data_type")?,
                    udt_name: row.try_get("udt_name")?,
                    is_nullable: row.try_get::<String, _>("is_nullable")? == "YES",
                    default: row.try_get("column_default")?,
                    max_length: row.try_get("max_length")?,
                    precision: row.try_get("precision")?,
                    scale: row.try_get("scale")?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let fk_rows = sqlx::query(FOREIGN_KEYS)
            .bind(&self.schema_name)
            .bind(table_name)
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::Sqlx)?;

        let mut foreign_keys = BTreeMap::new();
        for row in &fk_rows {
            foreign_keys.insert(
                row.try_get::<String, _>("column_name")?,
                ForeignKey {
                    referenced_table: row.try_get("referenced_table")?,
                    referenced_column: row.try_get("referenced_column")?,
                },
            );
        }

        Ok(TableDetails {
            table_name: table_name.to_string(),
            columns,
            primary_keys: self.constraint_columns(PRIMARY_KEY_COLUMNS, table_name).await?,
            foreign_keys,
            unique_columns: self.constraint_columns(UNIQUE_COLUMNS, table_name).await?,
        })
    }

    async fn list_enums(&self) -> Result<Vec<EnumType>, DbError> {
        let rows = sqlx::query(LIST_ENUMS)
            .bind(&self.schema_name)
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::Sqlx)?;

        rows.iter()
            .map(|row| -> Result<EnumType, DbError> {
                Ok(EnumType {
                    name: row.try_get("enum_name")?,
                    labels: row.try_get("enum_values")?,
                })
            })
            .collect()
    }
}
