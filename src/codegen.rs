//! Drizzle ORM table definitions generated from catalog metadata.

use crate::models::schema::{ColumnDetails, EnumType, TableDetails};

pub const MODULE_HEADER: &str = r#"import { relations } from "drizzle-orm";
import { bigint, bigserial, boolean, date, decimal, integer, json, jsonb, pgEnum, pgTable, serial, text, time, timestamp, uuid, varchar } from "drizzle-orm/pg-core";
import { createInsertSchema } from "drizzle-zod";
import { z } from "zod";
"#;

/// A Drizzle column builder call, minus the column name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrizzleType {
    pub builder: String,
    pub options: Option<String>,
}

impl DrizzleType {
    fn plain(builder: &str) -> Self {
        Self {
            builder: builder.to_string(),
            options: None,
        }
    }

    fn with_options(builder: &str, options: String) -> Self {
        Self {
            builder: builder.to_string(),
            options: Some(options),
        }
    }

    /// Renders the builder call for `column`, e.g. `varchar("email", { length: 255 })`.
    pub fn call(&self, column: &str) -> String {
        match &self.options {
            Some(options) => format!("{}({}, {})", self.builder, ts_string(column), options),
            None => format!("{}({})", self.builder, ts_string(column)),
        }
    }
}

/// Quotes `s` as a TypeScript string literal.
pub fn ts_string(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

/// `snake_case` to `camelCase`.
pub fn camel_case(snake: &str) -> String {
    let mut parts = snake.split('_');
    let mut out = parts.next().unwrap_or_default().to_string();
    for part in parts {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(&chars.as_str().to_lowercase());
        }
    }
    out
}

pub fn enum_const_name(enum_name: &str) -> String {
    format!("{}Enum", camel_case(enum_name))
}

fn is_sequence_default(column: &ColumnDetails) -> bool {
    column
        .default
        .as_deref()
        .is_some_and(|d| d.contains("nextval"))
}

/// Maps a column to the Drizzle builder that declares it.
pub fn drizzle_type(column: &ColumnDetails, enums: &[EnumType]) -> DrizzleType {
    if enums.iter().any(|e| e.name == column.udt_name) {
        return DrizzleType::plain(&enum_const_name(&column.udt_name));
    }

    match column.data_type.as_str() {
        "integer" if is_sequence_default(column) => DrizzleType::plain("serial"),
        "integer" => DrizzleType::plain("integer"),
        "bigint" if is_sequence_default(column) => {
            DrizzleType::with_options("bigserial", "{ mode: \"number\" }".to_string())
        }
        "bigint" => DrizzleType::with_options("bigint", "{ mode: \"number\" }".to_string()),
        "character varying" | "varchar" => match column.max_length {
            Some(length) => DrizzleType::with_options("varchar", format!("{{ length: {} }}", length)),
            None => DrizzleType::plain("varchar"),
        },
        "boolean" => DrizzleType::plain("boolean"),
        "timestamp with time zone" => {
            DrizzleType::with_options("timestamp", "{ withTimezone: true }".to_string())
        }
        "timestamp without time zone" => DrizzleType::plain("timestamp"),
        "date" => DrizzleType::plain("date"),
        "time without time zone" => DrizzleType::plain("time"),
        "numeric" => match (column.precision, column.scale) {
            (Some(p), Some(s)) if s != 0 => DrizzleType::with_options(
                "decimal",
                format!("{{ precision: {}, scale: {} }}", p, s),
            ),
            (Some(p), _) => {
                DrizzleType::with_options("decimal", format!("{{ precision: {} }}", p))
            }
            (None, _) => DrizzleType::plain("decimal"),
        },
        "json" => DrizzleType::plain("json"),
        "jsonb" => DrizzleType::plain("jsonb"),
        "uuid" => DrizzleType::plain("uuid"),
        // Arrays and anything unrecognised fall back to text.
        _ => DrizzleType::plain("text"),
    }
}

/// Translates a column default into a Drizzle modifier, if it has a literal form.
fn default_modifier(default: &str) -> Option<String> {
    if default.contains("nextval") {
        return None;
    }
    if let Some(inner) = default
        .strip_prefix('\'')
        .and_then(|d| d.strip_suffix("'::text"))
    {
        return Some(format!(".default({})", ts_string(&sql_unquote(inner))));
    }
    match default {
        "true" | "false" => Some(format!(".default({})", default)),
        "now()" => Some(".defaultNow()".to_string()),
        _ => default
            .strip_prefix('\'')
            .and_then(|d| d.strip_suffix('\''))
            .map(|inner| format!(".default({})", ts_string(&sql_unquote(inner)))),
    }
}

/// Undoes SQL quote doubling inside a string literal.
fn sql_unquote(inner: &str) -> String {
    inner.replace("''", "'")
}

fn column_definition(table: &TableDetails, column: &ColumnDetails, enums: &[EnumType]) -> String {
    let ty = drizzle_type(column, enums);
    let mut line = format!("  {}: {}", camel_case(&column.name), ty.call(&column.name));

    let is_pk = table.is_primary_key(&column.name);
    if is_pk {
        line.push_str(".primaryKey()");
        if ty.builder == "uuid" {
            line.push_str(".defaultRandom()");
        }
    }

    if let Some(fk) = table.foreign_keys.get(&column.name) {
        line.push_str(&format!(
            ".references(() => {}.{})",
            camel_case(&fk.referenced_table),
            camel_case(&fk.referenced_column)
        ));
    }

    if table.is_unique(&column.name) && !is_pk {
        line.push_str(".unique()");
    }

    if !column.is_nullable {
        line.push_str(".notNull()");
    }

    if let Some(modifier) = column.default.as_deref().and_then(default_modifier) {
        line.push_str(&modifier);
    }

    line.push(',');
    line
}

pub fn table_definition(table: &TableDetails, enums: &[EnumType]) -> String {
    let mut lines = vec![format!(
        "export const {} = pgTable({}, {{",
        camel_case(&table.table_name),
        ts_string(&table.table_name)
    )];
    lines.extend(
        table
            .columns
            .iter()
            .map(|column| column_definition(table, column, enums)),
    );
    lines.push("});".to_string());
    lines.join("\n")
}

pub fn enum_definition(e: &EnumType) -> String {
    let labels: Vec<String> = e.labels.iter().map(|l| ts_string(l)).collect();
    format!(
        "export const {} = pgEnum({}, [{}]);",
        enum_const_name(&e.name),
        ts_string(&e.name),
        labels.join(", ")
    )
}

/// Renders a complete TypeScript module: imports, enums, then tables.
pub fn render_module(enums: &[EnumType], tables: &[TableDetails]) -> String {
    let mut out = String::from(MODULE_HEADER);
    out.push('\n');

    if !enums.is_empty() {
        out.push_str("// Custom PostgreSQL Enums\n");
        for e in enums {
            out.push_str(&enum_definition(e));
            out.push('\n');
        }
        out.push('\n');
    }

    for table in tables {
        out.push_str(&table_definition(table, enums));
        out.push_str("\n\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::schema::ForeignKey;

    fn column(name: &str, data_type: &str) -> ColumnDetails {
        ColumnDetails {
            name: name.to_string(),
            data_type: data_type.to_string(),
            udt_name: data_type.to_string(),
            is_nullable: true,
            ..Default::default()
        }
    }

    fn role_enum() -> EnumType {
        EnumType {
            name: "user_role".to_string(),
            labels: vec!["admin".to_string(), "coach".to_string()],
        }
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("athlete_videos"), "athleteVideos");
        assert_eq!(camel_case("id"), "id");
        assert_eq!(camel_case("created_at_utc"), "createdAtUtc");
    }

    #[test]
    fn test_enum_columns_use_enum_builder() {
        let mut col = column("role", "USER-DEFINED");
        col.udt_name = "user_role".to_string();

        assert_eq!(
            drizzle_type(&col, &[role_enum()]).call("role"),
            "userRoleEnum(\"role\")"
        );
    }

    #[test]
    fn test_type_mapping() {
        let mut id = column("id", "integer");
        id.default = Some("nextval('users_id_seq'::regclass)".to_string());
        assert_eq!(drizzle_type(&id, &[]).builder, "serial");

        let mut email = column("email", "character varying");
        email.max_length = Some(255);
        assert_eq!(
            drizzle_type(&email, &[]).call("email"),
            "varchar(\"email\", { length: 255 })"
        );

        let mut price = column("price", "numeric");
        price.precision = Some(10);
        price.scale = Some(2);
        assert_eq!(
            drizzle_type(&price, &[]).call("price"),
            "decimal(\"price\", { precision: 10, scale: 2 })"
        );

        assert_eq!(
            drizzle_type(&column("at", "timestamp with time zone"), &[]).call("at"),
            "timestamp(\"at\", { withTimezone: true })"
        );
        assert_eq!(drizzle_type(&column("tags", "ARRAY"), &[]).builder, "text");
        assert_eq!(drizzle_type(&column("geo", "point"), &[]).builder, "text");
    }

    #[test]
    fn test_default_modifiers() {
        assert_eq!(default_modifier("'pending'::text").as_deref(), Some(".default(\"pending\")"));
        assert_eq!(default_modifier("true").as_deref(), Some(".default(true)"));
        assert_eq!(default_modifier("now()").as_deref(), Some(".defaultNow()"));
        assert_eq!(default_modifier("'x'").as_deref(), Some(".default(\"x\")"));
        assert_eq!(default_modifier("nextval('seq'::regclass)"), None);
        assert_eq!(default_modifier("gen_random_uuid()"), None);
    }

    #[test]
    fn test_table_definition_modifiers() {
        let mut id = column("id", "uuid");
        id.is_nullable = false;
        let mut email = column("email", "text");
        email.is_nullable = false;
        let parent = column("parent_id", "uuid");
        let mut status = column("status", "text");
        status.default = Some("'active'::text".to_string());

        let table = TableDetails {
            table_name: "user_accounts".to_string(),
            columns: vec![id, email, parent, status],
            primary_keys: vec!["id".to_string()],
            foreign_keys: [(
                "parent_id".to_string(),
                ForeignKey {
                    referenced_table: "parent_accounts".to_string(),
                    referenced_column: "id".to_string(),
                },
            )]
            .into_iter()
            .collect(),
            unique_columns: vec!["id".to_string(), "email".to_string()],
        };

        assert_eq!(
            table_definition(&table, &[]),
            "export const userAccounts = pgTable(\"user_accounts\", {\n\
             \x20 id: uuid(\"id\").primaryKey().defaultRandom().notNull(),\n\
             \x20 email: text(\"email\").unique().notNull(),\n\
             \x20 parentId: uuid(\"parent_id\").references(() => parentAccounts.id),\n\
             \x20 status: text(\"status\").default(\"active\"),\n\
             });"
        );
    }

    #[test]
    fn test_render_module_orders_enums_before_tables() {
        let table = TableDetails {
            table_name: "users".to_string(),
            columns: vec![column("id", "integer")],
            ..Default::default()
        };

        let module = render_module(&[role_enum()], &[table]);

        let enum_pos = module
            .find("export const userRoleEnum = pgEnum(\"user_role\", [\"admin\", \"coach\"]);")
            .unwrap();
        let table_pos = module.find("export const users = pgTable(\"users\", {").unwrap();
        assert!(module.starts_with(MODULE_HEADER));
        assert!(enum_pos < table_pos);
    }

    #[test]
    fn test_literals_are_escaped() {
        assert_eq!(ts_string(r#"say "hi" \ bye"#), r#""say \"hi\" \\ bye""#);
        assert_eq!(
            default_modifier(r#"'a "quoted" \ value'::text"#).as_deref(),
            Some(r#".default("a \"quoted\" \\ value")"#)
        );
        assert_eq!(
            default_modifier("'it''s'::text").as_deref(),
            Some(".default(\"it's\")")
        );

        let e = EnumType {
            name: "tone".to_string(),
            labels: vec![r#"say "hi""#.to_string(), r"back\slash".to_string()],
        };
        assert_eq!(
            enum_definition(&e),
            r#"export const toneEnum = pgEnum("tone", ["say \"hi\"", "back\\slash"]);"#
        );
    }
}
