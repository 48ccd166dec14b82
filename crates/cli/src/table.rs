// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared table renderer for CLI list views.
//!
//! Provides consistent column alignment, color application, and
//! truncation across list commands.

use crate::color;

/// How a cell's text is styled after padding.
pub enum CellStyle {
    /// No color applied.
    Plain,
    /// Apply [`color::muted()`].
    Muted,
    /// Apply [`color::state()`] — auto-detects green/yellow/red.
    State,
}

/// A column definition in a [`Table`].
pub struct Column {
    pub name: &'static str,
    pub style: CellStyle,
    /// Maximum width (`None` = unlimited). Longer values are truncated
    /// with an ellipsis.
    pub max_width: Option<usize>,
}

impl Column {
    pub fn plain(name: &'static str) -> Self {
        Self {
            name,
            style: CellStyle::Plain,
            max_width: None,
        }
    }

    pub fn muted(name: &'static str) -> Self {
        Self {
            name,
            style: CellStyle::Muted,
            max_width: None,
        }
    }

    pub fn state(name: &'static str) -> Self {
        Self {
            name,
            style: CellStyle::State,
            max_width: None,
        }
    }

    pub fn max_width(mut self, width: usize) -> Self {
        self.max_width = Some(width);
        self
    }
}

/// A simple aligned-column table.
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render to a string (colors applied after padding so widths are
    /// computed on visible characters).
    pub fn render(&self) -> String {
        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.name.len()).collect();
        let truncated_rows: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .map(|(i, cell)| {
                        let cell = match self.columns.get(i).and_then(|c| c.max_width) {
                            Some(max) => truncate(cell, max),
                            None => cell.clone(),
                        };
                        if let Some(width) = widths.get_mut(i) {
                            *width = (*width).max(cell.len());
                        }
                        cell
                    })
                    .collect()
            })
            .collect();

        let mut out = String::new();
        for (i, column) in self.columns.iter().enumerate() {
            out.push_str(&color::header(&pad(column.name, widths[i])));
            out.push_str("  ");
        }
        out.push('\n');

        for row in &truncated_rows {
            for (i, cell) in row.iter().enumerate() {
                let padded = pad(cell, widths.get(i).copied().unwrap_or(0));
                let styled = match self.columns.get(i).map(|c| &c.style) {
                    Some(CellStyle::Muted) => color::muted(&padded),
                    Some(CellStyle::State) => color::state(&padded),
                    _ => padded,
                };
                out.push_str(&styled);
                out.push_str("  ");
            }
            out.push('\n');
        }
        out
    }
}

fn pad(text: &str, width: usize) -> String {
    format!("{:<width$}", text)
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", cut)
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;
