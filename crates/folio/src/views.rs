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

//! Derived views over the source tables.
//!
//! Every view is a pure function of [`SourceTables`]: it clones the frame into
//! a lazy query and collects a fresh result. Grouped views put the grouping
//! key in the first column and the aggregate in the last one, ordered by the
//! aggregate descending with ties broken by key ascending.

use crate::error::{DataError, DataResult};
use crate::schema::*;
use polars::prelude::*;

pub const COUNT: &str = "count";
pub const PURCHASES: &str = "purchases";
pub const MEAN_RATING: &str = "mean_rating";
pub const MEAN_PRICE: &str = "mean_price";
pub const TITLES: &str = "titles";
pub const ACTIVE_YEARS: &str = "active_years";
pub const CATEGORY_COUNT: &str = "category_count";
pub const FEATURE: &str = "feature";

pub const TOP_GENRES: usize = 10;
pub const POPULAR_THRESHOLD: i64 = 3500;

fn ranked(frame: LazyFrame, value: &str, key: &str) -> LazyFrame {
    frame.sort_by_exprs(
        [col(value), col(key)],
        SortMultipleOptions::default()
            .with_order_descending_multi([true, false])
            .with_nulls_last(true)
            .with_maintain_order(true),
    )
}

fn grouped(frame: &DataFrame, key: &str, aggregate: Expr, alias: &str) -> DataResult<DataFrame> {
    let view = ranked(
        frame
            .clone()
            .lazy()
            .filter(col(key).is_not_null())
            .group_by([col(key)])
            .agg([aggregate.alias(alias)]),
        alias,
        key,
    )
    .collect()?;
    Ok(view)
}

/// Occurrences of each distinct value of `key`, most frequent first.
pub fn value_counts(frame: &DataFrame, key: &str) -> DataResult<DataFrame> {
    grouped(frame, key, len(), COUNT)
}

/// Non-null `value` entries per `key`.
pub fn count_per(frame: &DataFrame, key: &str, value: &str, alias: &str) -> DataResult<DataFrame> {
    grouped(frame, key, col(value).count(), alias)
}

pub fn mean_per(frame: &DataFrame, key: &str, value: &str, alias: &str) -> DataResult<DataFrame> {
    grouped(frame, key, col(value).mean(), alias)
}

/// Distinct non-null `value` entries per `key`.
pub fn distinct_per(
    frame: &DataFrame,
    key: &str,
    value: &str,
    alias: &str,
) -> DataResult<DataFrame> {
    grouped(frame, key, col(value).drop_nulls().n_unique(), alias)
}

pub fn rating_price_pairs(tables: &SourceTables) -> DataResult<DataFrame> {
    Ok(tables
        .ratings
        .frame()
        .select([RATING, BOOK_PRICE])?)
}

pub fn rating_values(tables: &SourceTables) -> DataResult<DataFrame> {
    Ok(tables.ratings.frame().select([RATING])?)
}

pub fn price_values(tables: &SourceTables) -> DataResult<DataFrame> {
    Ok(tables.ratings.frame().select([BOOK_PRICE])?)
}

/// Pearson correlation matrix of rating and price, labelled by a
/// `feature` column.
pub fn rating_price_correlation(tables: &SourceTables) -> DataResult<DataFrame> {
    let coefficient = tables
        .ratings
        .frame()
        .clone()
        .lazy()
        .select([pearson_corr(col(RATING), col(BOOK_PRICE)).alias("r")])
        .collect()?;
    let r = f64_values(&coefficient, "r")?
        .first()
        .copied()
        .unwrap_or(f64::NAN);
    Ok(df!(
        FEATURE => [RATING, BOOK_PRICE],
        RATING => [1.0, r],
        BOOK_PRICE => [r, 1.0]
    )?)
}

pub fn top_genres(tables: &SourceTables) -> DataResult<DataFrame> {
    Ok(value_counts(tables.catalog.frame(), CATEGORIES)?.head(Some(TOP_GENRES)))
}

/// Every (rating, price) pair, most expensive first, then highest rated.
pub fn ratings_by_price(tables: &SourceTables) -> DataResult<DataFrame> {
    let view = tables
        .ratings
        .frame()
        .clone()
        .lazy()
        .select([col(RATING), col(BOOK_PRICE)])
        .sort_by_exprs(
            [col(BOOK_PRICE), col(RATING)],
            SortMultipleOptions::default()
                .with_order_descending(true)
                .with_nulls_last(true)
                .with_maintain_order(true),
        )
        .collect()?;
    Ok(view)
}

pub fn most_purchased(tables: &SourceTables) -> DataResult<DataFrame> {
    count_per(tables.ratings.frame(), BOOK_TITLE, USER_ID, PURCHASES)
}

pub fn highest_rated(tables: &SourceTables) -> DataResult<DataFrame> {
    mean_per(tables.ratings.frame(), BOOK_TITLE, RATING, MEAN_RATING)
}

pub fn most_expensive(tables: &SourceTables) -> DataResult<DataFrame> {
    mean_per(tables.ratings.frame(), BOOK_TITLE, BOOK_PRICE, MEAN_PRICE)
}

/// Titles whose ratings count exceeds `threshold`, one row per distinct
/// (title, count) pair.
pub fn titles_over(tables: &SourceTables, threshold: i64) -> DataResult<DataFrame> {
    let view = ranked(
        tables
            .catalog
            .frame()
            .clone()
            .lazy()
            .filter(col(RATINGS_COUNT).gt(lit(threshold)))
            .group_by_stable([col(BOOK_TITLE), col(RATINGS_COUNT)])
            .agg([len().alias("listings")])
            .select([col(BOOK_TITLE), col(RATINGS_COUNT)]),
        RATINGS_COUNT,
        BOOK_TITLE,
    )
    .collect()?;
    Ok(view)
}

pub fn popular_titles(tables: &SourceTables) -> DataResult<DataFrame> {
    titles_over(tables, POPULAR_THRESHOLD)
}

pub fn category_titles(tables: &SourceTables) -> DataResult<DataFrame> {
    count_per(tables.catalog.frame(), CATEGORIES, BOOK_TITLE, TITLES)
}

pub fn author_titles(tables: &SourceTables) -> DataResult<DataFrame> {
    count_per(tables.catalog.frame(), BOOK_AUTHOR, BOOK_TITLE, TITLES)
}

pub fn author_active_years(tables: &SourceTables) -> DataResult<DataFrame> {
    distinct_per(tables.catalog.frame(), BOOK_AUTHOR, PUBLISHED_YEAR, ACTIVE_YEARS)
}

pub fn author_categories(tables: &SourceTables) -> DataResult<DataFrame> {
    distinct_per(tables.catalog.frame(), BOOK_AUTHOR, CATEGORIES, CATEGORY_COUNT)
}

pub fn catalog_sample(tables: &SourceTables) -> DataResult<DataFrame> {
    Ok(tables.catalog.frame().clone())
}

pub fn rating_sample(tables: &SourceTables) -> DataResult<DataFrame> {
    Ok(tables.ratings.frame().clone())
}

fn view_column<'a>(view: &'a DataFrame, name: &str) -> DataResult<&'a Column> {
    view.column(name)
        .map_err(|_| DataError::ViewColumnNotFound {
            column: name.to_string(),
        })
}

/// Column values as floats; nulls become NaN so paired columns stay aligned.
pub fn f64_values(view: &DataFrame, name: &str) -> DataResult<Vec<f64>> {
    let series = view_column(view, name)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    let values = series
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect();
    Ok(values)
}

/// Column values rendered as labels.
pub fn label_values(view: &DataFrame, name: &str) -> DataResult<Vec<String>> {
    let series = view_column(view, name)?
        .as_materialized_series()
        .cast(&DataType::String)?;
    let labels = series
        .str()?
        .into_iter()
        .map(|v| v.unwrap_or("null").to_string())
        .collect();
    Ok(labels)
}

/// Names of the key (first) and aggregate (last) columns of a grouped view.
pub fn key_and_value(view: &DataFrame) -> DataResult<(String, String)> {
    let names = view.get_column_names();
    match (names.first(), names.last()) {
        (Some(key), Some(value)) if names.len() >= 2 => Ok((key.to_string(), value.to_string())),
        _ => Err(DataError::ViewColumnNotFound {
            column: "<key, value>".to_string(),
        }),
    }
}

/// Key labels and aggregate values of the first `top` rows of a grouped view.
pub fn labelled_values(view: &DataFrame, top: usize) -> DataResult<(Vec<String>, Vec<f64>)> {
    let (key, value) = key_and_value(view)?;
    let head = view.head(Some(top));
    Ok((label_values(&head, &key)?, f64_values(&head, &value)?))
}
