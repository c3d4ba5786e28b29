//! Reading and writing the schema snapshot artifact.
//!
//! The artifact is a text file with a human readable table listing followed
//! by a JSON section introduced by [`DATA_MARKER`].

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::{
    config::Config,
    connect,
    db::capture_live_schema,
    errors::DbError,
    models::schema::{Column, Schema, Table},
};

pub const DATA_MARKER: &str = "DETAILED SCHEMA DATA:";
const HEADER: &str = "Complete Schema - Auto-updated via script";

#[derive(Debug, Default, Serialize, Deserialize)]
struct SnapshotData {
    #[serde(default)]
    tables: BTreeMap<String, SnapshotTable>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotTable {
    #[serde(default = "exists_default")]
    exists: bool,
    #[serde(default)]
    columns: Vec<Column>,
}

fn exists_default() -> bool {
    true
}

impl From<&Schema> for SnapshotData {
    fn from(schema: &Schema) -> Self {
        let tables = schema
            .tables
            .values()
            .map(|table| {
                (
                    table.name.clone(),
                    SnapshotTable {
                        exists: true,
                        columns: table.columns.clone(),
                    },
                )
            })
            .collect();
        SnapshotData { tables }
    }
}

impl From<SnapshotData> for Schema {
    fn from(data: SnapshotData) -> Self {
        data.tables
            .into_iter()
            .map(|(name, table)| Table {
                name,
                columns: table.columns,
            })
            .collect()
    }
}

/// Renders the full artifact text for `schema`.
pub fn render_snapshot(schema: &Schema) -> Result<String, DbError> {
    let json = serde_json::to_string_pretty(&SnapshotData::from(schema)).map_err(encode_error)?;

    let mut content = String::new();
    content.push_str(HEADER);
    content.push('\n');
    content.push_str("TABLE LIST:\n");
    for name in schema.table_names() {
        content.push_str(&format!("- {}\n", name));
    }
    content.push('\n');
    content.push_str(DATA_MARKER);
    content.push('\n');
    content.push_str(&json);
    content.push('\n');
    Ok(content)
}

fn encode_error(e: serde_json::Error) -> DbError {
    DbError::Io(format!("cannot encode schema data: {}", e))
}

/// Parses artifact text back into a schema.
pub fn parse_snapshot(text: &str) -> Result<Schema, DbError> {
    let idx = text.find(DATA_MARKER).ok_or_else(|| {
        DbError::Parse(format!(
            "marker '{}' not found in snapshot; regenerate it with update_schema",
            DATA_MARKER
        ))
    })?;

    // Tolerate labels or code fences between the marker and the JSON object.
    let data = text[idx + DATA_MARKER.len()..].trim();
    let brace = data.find('{').ok_or_else(|| {
        DbError::Parse(format!(
            "expected a JSON object after '{}' in snapshot",
            DATA_MARKER
        ))
    })?;

    let data: SnapshotData = serde_json::from_str(&data[brace..]).map_err(|e| {
        DbError::Parse(format!(
            "invalid schema data after '{}': {}; regenerate the snapshot with update_schema",
            DATA_MARKER, e
        ))
    })?;

    Ok(data.into())
}

pub fn load_snapshot(path: &Path) -> Result<Schema, DbError> {
    let text = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => {
            DbError::NotFound(format!("snapshot file {} does not exist", path.display()))
        }
        _ => DbError::Io(format!("cannot read {}: {}", path.display(), e)),
    })?;

    let schema = parse_snapshot(&text)?;
    debug!("Loaded {} tables from {}", schema.len(), path.display());
    Ok(schema)
}

pub fn write_snapshot(schema: &Schema, path: &Path) -> Result<(), DbError> {
    let content = render_snapshot(schema)?;
    replace_file(path, &content)?;
    info!("Wrote snapshot with {} tables to {}", schema.len(), path.display());
    Ok(())
}

/// Captures the live schema and overwrites the configured snapshot with it.
pub async fn update_snapshot(config: &Config) -> Result<Schema, DbError> {
    config.require_database_url()?;

    info!("Connecting to database and fetching current schema...");
    let client = connect(config).await?;
    let captured = capture_live_schema(&client).await;
    client.close().await;
    let schema = captured?;

    write_snapshot(&schema, &config.snapshot_path)?;
    Ok(schema)
}

/// Replaces `path` with `contents` via a temp file in the same directory, so
/// a crash never leaves a half-written file behind.
pub fn replace_file(path: &Path, contents: &str) -> Result<(), DbError> {
    let io_err = |e: io::Error| DbError::Io(format!("cannot write {}: {}", path.display(), e));

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(io_err)?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(contents.as_bytes()).map_err(io_err)?;
    tmp.flush().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}
