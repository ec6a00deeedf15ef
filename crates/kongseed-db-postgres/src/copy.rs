//! Statement builders and the `COPY ... FROM STDIN` text-format encoder.

use kongseed_storage::{Cell, Table};

/// Name of the per-transaction staging table used by bulk delete.
pub const STAGING_TABLE: &str = "kongseed_delete_ids";

/// Quotes an SQL identifier.
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn column_list(columns: &[&str]) -> String {
    columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `SELECT "a"::text, "b"::text FROM "table"`
pub fn projection_statement(table: Table, columns: &[&str]) -> String {
    let projection = columns
        .iter()
        .map(|c| format!("{}::text", quote_ident(c)))
        .collect::<Vec<_>>()
        .join(", ");
    format!("SELECT {projection} FROM {}", quote_ident(table.name()))
}

/// `COPY "table" ("a", "b") FROM STDIN`
pub fn copy_in_statement(table: Table, columns: &[&str]) -> String {
    format!(
        "COPY {} ({}) FROM STDIN",
        quote_ident(table.name()),
        column_list(columns)
    )
}

pub fn create_staging_statement() -> String {
    format!("CREATE TEMP TABLE {STAGING_TABLE} (id uuid) ON COMMIT DROP")
}

pub fn copy_staging_statement() -> String {
    format!("COPY {STAGING_TABLE} (id) FROM STDIN")
}

/// `DELETE FROM "table" WHERE "key" IN (SELECT id FROM staging)`
pub fn delete_staged_statement(table: Table, key_column: &str) -> String {
    format!(
        "DELETE FROM {} WHERE {} IN (SELECT id FROM {STAGING_TABLE})",
        quote_ident(table.name()),
        quote_ident(key_column)
    )
}

fn escape_copy_text(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
}

fn array_literal(items: &[String]) -> String {
    let quoted: Vec<String> = items
        .iter()
        .map(|item| format!("\"{}\"", item.replace('\\', "\\\\").replace('"', "\\\"")))
        .collect();
    format!("{{{}}}", quoted.join(","))
}

fn encode_cell(cell: &Cell, out: &mut String) {
    match cell {
        Cell::Null => out.push_str("\\N"),
        Cell::TextArray(items) => escape_copy_text(&array_literal(items), out),
        other => {
            if let Some(text) = other.to_text() {
                escape_copy_text(&text, out);
            }
        }
    }
}

/// Appends one row in PostgreSQL `COPY` text format, newline included.
pub fn encode_row(row: &[Cell], out: &mut String) {
    for (index, cell) in row.iter().enumerate() {
        if index > 0 {
            out.push('\t');
        }
        encode_cell(cell, out);
    }
    out.push('\n');
}
