//! Rendering of report results
//!
//! - Table: fixed-width, right-aligned, long values truncated (stdout)
//! - JSON: array of `{column: value}` objects in column order
//! - CSV: header plus comma-joined rows, no quoting

use std::fs;
use std::path::Path;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::Result;
use crate::rows::ResultSet;
use crate::utils::truncate_ellipsis;

/// Width of every table cell.
pub const CELL_WIDTH: usize = 30;
/// Row values longer than this are cut and end in "...".
pub const VALUE_LIMIT: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Csv,
}

impl OutputFormat {
    /// Pick a format from the file extension, `None` if unsupported.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("json") {
            Some(OutputFormat::Json)
        } else if ext.eq_ignore_ascii_case("csv") {
            Some(OutputFormat::Csv)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written(OutputFormat),
    /// Unknown extension, nothing was written.
    Skipped,
}

fn push_cell(line: &mut String, text: &str) {
    line.push_str(&format!("{:>width$}  ", text, width = CELL_WIDTH));
}

pub fn render_table(result: &ResultSet) -> String {
    let mut out = String::new();

    for col in result.columns() {
        push_cell(&mut out, col);
    }
    out.push('\n');

    for row in result.rows() {
        for value in row.values() {
            push_cell(&mut out, &truncate_ellipsis(value, VALUE_LIMIT));
        }
        out.push('\n');
    }
    out
}

/// One row as a JSON object, keys in column order.
struct RowObject<'a> {
    columns: &'a [&'a str],
    values: Vec<&'a str>,
}

impl Serialize for RowObject<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (col, value) in self.columns.iter().zip(&self.values) {
            map.serialize_entry(col, value)?;
        }
        map.end()
    }
}

pub fn to_json(result: &ResultSet) -> Result<String> {
    let columns = result.columns();
    let objects: Vec<RowObject> = result
        .rows()
        .iter()
        .map(|row| RowObject { columns: &columns, values: row.values() })
        .collect();
    Ok(serde_json::to_string(&objects)?)
}

pub fn to_csv(result: &ResultSet) -> String {
    let mut lines = Vec::with_capacity(result.len() + 1);
    lines.push(result.columns().join(","));
    for row in result.rows() {
        lines.push(row.values().join(","));
    }
    lines.join("\n")
}

/// Write `result` to `path` in the format its extension names.
pub fn write_output(path: &Path, result: &ResultSet) -> Result<WriteOutcome> {
    let Some(format) = OutputFormat::from_path(path) else {
        return Ok(WriteOutcome::Skipped);
    };
    let content = match format {
        OutputFormat::Json => to_json(result)?,
        OutputFormat::Csv => to_csv(result),
    };
    fs::write(path, content)?;
    Ok(WriteOutcome::Written(format))
}
