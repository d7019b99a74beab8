//! Plain-text tables for chat-sized reports.

use std::fmt::Write as _;

use crate::{Error, Result};

/// Horizontal alignment of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableOptions {
    /// Spaces after every cell
    pub margin: usize,
    /// Cells wider than this are cut and end in "..."
    pub max_width: usize,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            margin: 1,
            max_width: 80,
        }
    }
}

/// Render `rows` under a `---title---` header with default options.
///
/// Columns without an entry in `aligns` are left aligned.
pub fn write_table(title: &str, rows: &[Vec<String>], aligns: &[Align]) -> Result<String> {
    write_table_with(title, rows, aligns, TableOptions::default())
}

pub fn write_table_with(
    title: &str,
    rows: &[Vec<String>],
    aligns: &[Align],
    options: TableOptions,
) -> Result<String> {
    let columns = rows.first().map_or(0, Vec::len);
    if rows.iter().any(|row| row.len() != columns) {
        return Err(Error::InvalidInput(format!(
            "not all rows of table '{title}' are {columns} cells long"
        )));
    }

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| fit_cell(cell, options.max_width))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = (0..columns)
        .map(|column| {
            cells
                .iter()
                .map(|row| row[column].chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut output = String::new();
    let _ = writeln!(output, "---{title}---");
    for row in &cells {
        let mut line = String::new();
        for (column, cell) in row.iter().enumerate() {
            let width = widths[column];
            match aligns.get(column).copied().unwrap_or(Align::Left) {
                Align::Left => {
                    let _ = write!(line, "{cell:<width$}");
                }
                Align::Right => {
                    let _ = write!(line, "{cell:>width$}");
                }
            }
            line.push_str(&" ".repeat(options.margin));
        }
        output.push_str(&line);
        output.push('\n');
    }
    Ok(output)
}

/// Render a titled list, one item per line.
pub fn write_list<I, S>(title: &str, items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut output = String::new();
    let _ = writeln!(output, "---{title}---");
    for item in items {
        output.push_str(item.as_ref());
        output.push('\n');
    }
    output
}

fn fit_cell(cell: &str, max_width: usize) -> String {
    let flattened = cell.replace("\r\n", " ").replace(['\n', '\r'], " ");
    if flattened.chars().count() > max_width {
        let mut cut: String = flattened.chars().take(max_width.saturating_sub(3)).collect();
        cut.push_str("...");
        cut
    } else {
        flattened
    }
}
