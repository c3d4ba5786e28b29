use log::info;

use crate::{
    codegen,
    config::Config,
    connect,
    db::DbClient,
    errors::DbError,
    models::schema::{EnumType, TableDetails},
    snapshot::replace_file,
};

/// Detailed metadata for every base table, plus the enum types they use.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaAnalysis {
    pub enums: Vec<EnumType>,
    pub tables: Vec<TableDetails>,
}

pub async fn analyze_schema<C>(client: &C) -> Result<SchemaAnalysis, DbError>
where
    C: DbClient + ?Sized,
{
    let enums = client.list_enums().await?;
    info!("Found {} custom enums", enums.len());

    let names = client.list_tables().await?;
    info!("Found {} tables", names.len());

    let mut tables = Vec::with_capacity(names.len());
    for name in &names {
        tables.push(client.describe_table(name).await?);
    }

    Ok(SchemaAnalysis { enums, tables })
}

/// Analyzes the configured database and writes the generated Drizzle module.
pub async fn analyze_with_config(config: &Config) -> Result<SchemaAnalysis, DbError> {
    let client = connect(config).await?;
    let analysis = analyze_schema(&client).await;
    client.close().await;
    let analysis = analysis?;

    replace_file(&config.generated_schema_path, &analysis.drizzle_module())?;
    info!(
        "Complete schema written to {}",
        config.generated_schema_path.display()
    );
    Ok(analysis)
}

impl SchemaAnalysis {
    /// Human readable report of enums and per-table structure.
    pub fn report(&self) -> String {
        let mut out = String::from("=== Complete Database Schema Analysis ===\n");

        out.push_str(&format!("Found {} custom enums:\n", self.enums.len()));
        for e in &self.enums {
            out.push_str(&format!("  {}: [{}]\n", e.name, e.labels.join(", ")));
        }

        out.push_str(&format!("\nFound {} tables:\n", self.tables.len()));
        for table in &self.tables {
            out.push_str(&format!("  {}\n", table.table_name));
        }

        out.push_str("\n=== Detailed Table Analysis ===\n");
        for table in &self.tables {
            out.push_str(&format!("\n--- {} ---\n", table.table_name));
            out.push_str(&format!("Columns ({}):\n", table.columns.len()));
            for col in &table.columns {
                let nullable = if col.is_nullable { "NULL" } else { "NOT NULL" };
                let default = col
                    .default
                    .as_ref()
                    .map(|d| format!(" DEFAULT {}", d))
                    .unwrap_or_default();
                out.push_str(&format!(
                    "  {}: {} {}{}\n",
                    col.name, col.data_type, nullable, default
                ));
            }

            out.push_str(&format!("Primary Keys: [{}]\n", table.primary_keys.join(", ")));
            let fks: Vec<String> = table
                .foreign_keys
                .iter()
                .map(|(col, fk)| format!("{} -> {}.{}", col, fk.referenced_table, fk.referenced_column))
                .collect();
            out.push_str(&format!("Foreign Keys: [{}]\n", fks.join(", ")));
            out.push_str(&format!(
                "Unique Constraints: [{}]\n",
                table.unique_columns.join(", ")
            ));
        }
        out
    }

    pub fn drizzle_module(&self) -> String {
        codegen::render_module(&self.enums, &self.tables)
    }
}
