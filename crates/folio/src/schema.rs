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

//! Typed schemas for the two source tables.
//!
//! A table is checked once, when it is wrapped: every declared column must be
//! present and castable to its declared type. The wrapped frame keeps only the
//! declared columns, in declaration order, with canonical dtypes, so views can
//! address columns without re-checking them.

use crate::error::{DataError, DataResult};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const BOOK_TITLE: &str = "book_title";
pub const BOOK_AUTHOR: &str = "book_author";
pub const CATEGORIES: &str = "categories";
pub const PUBLISHED_YEAR: &str = "published_year";
pub const RATINGS_COUNT: &str = "ratings_count";
pub const USER_ID: &str = "user_id";
pub const RATING: &str = "rating";
pub const BOOK_PRICE: &str = "book_price";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Integer,
    Float,
}

impl ColumnType {
    pub fn dtype(self) -> DataType {
        match self {
            ColumnType::Text => DataType::String,
            ColumnType::Integer => DataType::Int64,
            ColumnType::Float => DataType::Float64,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ColumnType::Text => "text",
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub column_type: ColumnType,
}

const fn spec(name: &'static str, column_type: ColumnType) -> ColumnSpec {
    ColumnSpec { name, column_type }
}

pub const CATALOG_COLUMNS: [ColumnSpec; 5] = [
    spec(BOOK_TITLE, ColumnType::Text),
    spec(BOOK_AUTHOR, ColumnType::Text),
    spec(CATEGORIES, ColumnType::Text),
    spec(PUBLISHED_YEAR, ColumnType::Integer),
    spec(RATINGS_COUNT, ColumnType::Integer),
];

pub const RATING_COLUMNS: [ColumnSpec; 4] = [
    spec(USER_ID, ColumnType::Text),
    spec(BOOK_TITLE, ColumnType::Text),
    spec(RATING, ColumnType::Float),
    spec(BOOK_PRICE, ColumnType::Float),
];

/// One book in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub book_title: String,
    pub book_author: String,
    pub categories: String,
    pub published_year: i64,
    pub ratings_count: i64,
}

/// One user rating or purchase of a book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingEvent {
    /// Opaque reviewer id; only ever counted.
    pub user_id: String,
    pub book_title: String,
    pub rating: f64,
    pub book_price: f64,
}

fn conform(table: &'static str, frame: &DataFrame, specs: &[ColumnSpec]) -> DataResult<DataFrame> {
    if frame.height() == 0 {
        return Err(DataError::EmptyTable { table });
    }
    let mut columns = Vec::with_capacity(specs.len());
    for column_spec in specs {
        let column = frame
            .column(column_spec.name)
            .map_err(|_| DataError::MissingColumn {
                table,
                column: column_spec.name.to_string(),
            })?;
        let series = column
            .as_materialized_series()
            .strict_cast(&column_spec.column_type.dtype())
            .map_err(|source| DataError::TypeMismatch {
                table,
                column: column_spec.name.to_string(),
                expected: column_spec.column_type.as_str(),
                source,
            })?;
        if series.null_count() > 0 {
            warn!(
                table,
                column = column_spec.name,
                nulls = series.null_count(),
                "column contains nulls"
            );
        }
        columns.push(Column::from(series));
    }
    let conformed = DataFrame::new(columns)?;
    debug!(
        table,
        rows = conformed.height(),
        dropped = frame.width().saturating_sub(conformed.width()),
        "table conformed to schema"
    );
    Ok(conformed)
}

/// The catalog table: one row per book.
#[derive(Debug, Clone)]
pub struct CatalogTable(DataFrame);

impl CatalogTable {
    pub const NAME: &'static str = "catalog";

    pub fn try_from_frame(frame: &DataFrame) -> DataResult<Self> {
        conform(Self::NAME, frame, &CATALOG_COLUMNS).map(Self)
    }

    pub fn from_records(records: &[CatalogRecord]) -> DataResult<Self> {
        let frame = df!(
            BOOK_TITLE => records.iter().map(|r| r.book_title.as_str()).collect::<Vec<_>>(),
            BOOK_AUTHOR => records.iter().map(|r| r.book_author.as_str()).collect::<Vec<_>>(),
            CATEGORIES => records.iter().map(|r| r.categories.as_str()).collect::<Vec<_>>(),
            PUBLISHED_YEAR => records.iter().map(|r| r.published_year).collect::<Vec<_>>(),
            RATINGS_COUNT => records.iter().map(|r| r.ratings_count).collect::<Vec<_>>()
        )?;
        Self::try_from_frame(&frame)
    }

    pub fn frame(&self) -> &DataFrame {
        &self.0
    }

    pub fn height(&self) -> usize {
        self.0.height()
    }
}

/// The rating table: one row per (user, book) event.
#[derive(Debug, Clone)]
pub struct RatingTable(DataFrame);

impl RatingTable {
    pub const NAME: &'static str = "ratings";

    pub fn try_from_frame(frame: &DataFrame) -> DataResult<Self> {
        conform(Self::NAME, frame, &RATING_COLUMNS).map(Self)
    }

    pub fn from_records(events: &[RatingEvent]) -> DataResult<Self> {
        let frame = df!(
            USER_ID => events.iter().map(|e| e.user_id.as_str()).collect::<Vec<_>>(),
            BOOK_TITLE => events.iter().map(|e| e.book_title.as_str()).collect::<Vec<_>>(),
            RATING => events.iter().map(|e| e.rating).collect::<Vec<_>>(),
            BOOK_PRICE => events.iter().map(|e| e.book_price).collect::<Vec<_>>()
        )?;
        Self::try_from_frame(&frame)
    }

    pub fn frame(&self) -> &DataFrame {
        &self.0
    }

    pub fn height(&self) -> usize {
        self.0.height()
    }
}

/// Both source tables, fixed for the lifetime of a run.
#[derive(Debug, Clone)]
pub struct SourceTables {
    pub catalog: CatalogTable,
    pub ratings: RatingTable,
}

impl SourceTables {
    pub fn new(catalog: CatalogTable, ratings: RatingTable) -> Self {
        Self { catalog, ratings }
    }
}
