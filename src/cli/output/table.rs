//! Table output formatting for CLI commands
//!
//! Renders batch plans and configuration settings using comfy-table.

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use std::env;

use super::truncate;

const PREVIEW_WIDTH: usize = 48;

/// One row of a batch plan.
#[derive(Debug, Clone, serde::Serialize)]
pub struct BatchRow {
    pub index: usize,
    pub items: usize,
    pub first: String,
    pub last: String,
}

/// Table formatter for CLI output
pub struct TableFormatter {
    use_colors: bool,
    max_width: Option<u16>,
}

impl TableFormatter {
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
            max_width: None,
        }
    }

    pub const fn with_config(use_colors: bool, max_width: Option<u16>) -> Self {
        Self {
            use_colors,
            max_width,
        }
    }

    /// Format a batch plan as a table
    pub fn format_batches(&self, rows: &[BatchRow]) -> String {
        let mut table = self.create_base_table();
        table.set_header(vec![
            self.header("Batch"),
            self.header("Items"),
            self.header("First item"),
            self.header("Last item"),
        ]);

        for row in rows {
            table.add_row(vec![
                Cell::new(row.index),
                Cell::new(row.items),
                Cell::new(truncate(&row.first, PREVIEW_WIDTH)),
                Cell::new(truncate(&row.last, PREVIEW_WIDTH)),
            ]);
        }

        table.to_string()
    }

    /// Format key/value settings as a two column table
    pub fn format_settings(&self, settings: &[(String, String)]) -> String {
        let mut table = self.create_base_table();
        table.set_header(vec![self.header("Setting"), self.header("Value")]);

        for (key, value) in settings {
            let key_cell = if self.use_colors {
                Cell::new(key).fg(Color::Cyan)
            } else {
                Cell::new(key)
            };
            table.add_row(vec![key_cell, Cell::new(value)]);
        }

        table.to_string()
    }

    fn header(&self, name: &str) -> Cell {
        let cell = Cell::new(name).add_attribute(Attribute::Bold);
        if self.use_colors {
            cell.fg(Color::Blue)
        } else {
            cell
        }
    }

    fn create_base_table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        if let Some(width) = self.max_width {
            table.set_width(width);
        }

        table
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if color output is supported
fn supports_color() -> bool {
    if env::var_os("NO_COLOR").is_some() {
        return false;
    }
    !matches!(env::var("TERM").as_deref(), Ok("dumb"))
}
