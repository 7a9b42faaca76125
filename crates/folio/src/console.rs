// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

//! Human-readable report text: separators, titles and bounded table previews.

use crate::config::DEFAULT_SEPARATOR_WIDTH;
use crate::error::Result;
use comfy_table::presets::ASCII_MARKDOWN;
use comfy_table::{ContentArrangement, Table};
use polars::prelude::{AnyValue, DataFrame};
use std::fmt::{self, Display, Write as _};
use std::io::Write;
use tracing::warn;

const TITLE_MARKER: &str = "◘ ";

/// Writes report sections to any byte sink, stdout in the binary.
#[derive(Debug)]
pub struct ReportConsole<W: Write> {
    out: W,
    separator: String,
}

impl<W: Write> ReportConsole<W> {
    pub fn new(out: W) -> Self {
        Self::with_separator_width(out, DEFAULT_SEPARATOR_WIDTH)
    }

    pub fn with_separator_width(out: W, width: usize) -> Self {
        Self {
            out,
            separator: "=".repeat(width),
        }
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn header(&mut self, title: &str) -> std::io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "{}", self.separator)?;
        writeln!(self.out, "{TITLE_MARKER} {title}")
    }

    /// Prints `title` and the formatted `task`. A formatting failure is
    /// reported inline and logged; the closing separator is always written.
    pub fn debug_text(&mut self, title: &str, task: &dyn Display) -> Result<()> {
        self.header(title)?;
        let mut body = String::new();
        let formatted = body.write_fmt(format_args!("{task}"));
        let outcome = match formatted {
            Ok(()) => writeln!(self.out, "{body}"),
            Err(err) => {
                warn!(title, "value could not be formatted for display");
                writeln!(self.out, "!  {}", FormatFailure(err))
            }
        };
        writeln!(self.out, "{}", self.separator)?;
        outcome?;
        Ok(())
    }

    /// Prints at most `cap` leading rows of `frame` under a titled header.
    pub fn display_frame(&mut self, name: &str, frame: &DataFrame, cap: usize) -> Result<()> {
        let table = preview_table(frame, cap)?;
        self.header(&format!("{name}  Dataframe:"))?;
        writeln!(self.out, "{table}")?;
        writeln!(self.out, "{}", self.separator)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

struct FormatFailure(fmt::Error);

impl Display for FormatFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "formatting failed: {}", self.0)
    }
}

fn cell_text(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => "null".to_string(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Float64(v) => format!("{v:.2}"),
        AnyValue::Float32(v) => format!("{v:.2}"),
        other => other.to_string(),
    }
}

/// Cell text of the first `min(cap, height)` rows.
pub fn preview_rows(frame: &DataFrame, cap: usize) -> Result<Vec<Vec<String>>> {
    let head = frame.head(Some(cap));
    let mut rows = Vec::with_capacity(head.height());
    for index in 0..head.height() {
        let mut row = Vec::with_capacity(head.width());
        for column in head.get_columns() {
            row.push(cell_text(column.get(index)?));
        }
        rows.push(row);
    }
    Ok(rows)
}

pub fn preview_table(frame: &DataFrame, cap: usize) -> Result<Table> {
    let mut table = Table::new();
    table
        .load_preset(ASCII_MARKDOWN)
        .set_content_arrangement(ContentArrangement::Disabled)
        .set_header(
            frame
                .get_column_names()
                .into_iter()
                .map(|name| name.to_string()),
        );
    for row in preview_rows(frame, cap)? {
        table.add_row(row);
    }
    Ok(table)
}
