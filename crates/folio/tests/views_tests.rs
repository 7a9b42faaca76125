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

use anyhow::Result;
use folio::schema::{
    CatalogRecord, CatalogTable, RatingEvent, RatingTable, SourceTables, BOOK_PRICE, RATING,
};
use folio::views::{self, f64_values, key_and_value, label_values, labelled_values};
use polars::prelude::*;
use proptest::prelude::*;

fn book(title: &str, author: &str, category: &str, year: i64, ratings: i64) -> CatalogRecord {
    CatalogRecord {
        book_title: title.to_string(),
        book_author: author.to_string(),
        categories: category.to_string(),
        published_year: year,
        ratings_count: ratings,
    }
}

fn event(user: i64, title: &str, rating: f64, price: f64) -> RatingEvent {
    RatingEvent {
        user_id: user.to_string(),
        book_title: title.to_string(),
        rating,
        book_price: price,
    }
}

fn tables(catalog: &[CatalogRecord], events: &[RatingEvent]) -> Result<SourceTables> {
    Ok(SourceTables::new(
        CatalogTable::from_records(catalog)?,
        RatingTable::from_records(events)?,
    ))
}

fn small_catalog() -> Vec<CatalogRecord> {
    vec![book("Dune", "Herbert", "Fiction", 1965, 10)]
}

#[test]
fn test_highest_rated_breaks_ties_by_title() -> Result<()> {
    let tables = tables(
        &small_catalog(),
        &[
            event(1, "A", 5.0, 10.0),
            event(2, "A", 3.0, 10.0),
            event(1, "B", 4.0, 20.0),
        ],
    )?;
    let view = views::highest_rated(&tables)?;
    let (key, value) = key_and_value(&view)?;
    assert_eq!(key, "book_title");
    assert_eq!(value, views::MEAN_RATING);
    assert_eq!(label_values(&view, &key)?, vec!["A", "B"]);
    assert_eq!(f64_values(&view, &value)?, vec![4.0, 4.0]);
    Ok(())
}

#[test]
fn test_most_purchased_counts_events_per_title() -> Result<()> {
    let tables = tables(
        &small_catalog(),
        &[
            event(1, "A", 5.0, 10.0),
            event(2, "A", 3.0, 10.0),
            event(1, "B", 4.0, 20.0),
        ],
    )?;
    let (labels, values) = labelled_values(&views::most_purchased(&tables)?, 10)?;
    assert_eq!(labels, vec!["A", "B"]);
    assert_eq!(values, vec![2.0, 1.0]);
    Ok(())
}

#[test]
fn test_most_expensive_averages_price() -> Result<()> {
    let tables = tables(
        &small_catalog(),
        &[
            event(1, "Cheap", 4.0, 5.0),
            event(2, "Dear", 5.0, 30.0),
            event(3, "Dear", 3.0, 20.0),
        ],
    )?;
    let (labels, values) = labelled_values(&views::most_expensive(&tables)?, 10)?;
    assert_eq!(labels, vec!["Dear", "Cheap"]);
    assert_eq!(values, vec![25.0, 5.0]);
    Ok(())
}

#[test]
fn test_top_genres_has_one_row_per_category() -> Result<()> {
    let mut catalog = Vec::new();
    for i in 0..7 {
        catalog.push(book(&format!("F{i}"), "Someone", "Fiction", 2000, 1));
    }
    for i in 0..3 {
        catalog.push(book(&format!("H{i}"), "Someone", "History", 2000, 1));
    }
    let tables = tables(&catalog, &[event(1, "F0", 4.0, 10.0)])?;
    let (labels, values) = labelled_values(&views::top_genres(&tables)?, views::TOP_GENRES)?;
    assert_eq!(labels, vec!["Fiction", "History"]);
    assert_eq!(values, vec![7.0, 3.0]);
    Ok(())
}

#[test]
fn test_top_genres_keeps_at_most_ten() -> Result<()> {
    let catalog: Vec<_> = (0..14)
        .map(|i| book(&format!("T{i}"), "A", &format!("Genre{i:02}"), 2000, 1))
        .collect();
    let tables = tables(&catalog, &[event(1, "T0", 4.0, 10.0)])?;
    let view = views::top_genres(&tables)?;
    assert_eq!(view.height(), views::TOP_GENRES);
    // All counts tie, so keys come out in ascending order.
    let labels = label_values(&view, "categories")?;
    assert_eq!(labels.first().map(String::as_str), Some("Genre00"));
    assert_eq!(labels.last().map(String::as_str), Some("Genre09"));
    Ok(())
}

#[test]
fn test_popular_titles_filters_and_dedups() -> Result<()> {
    let tables = tables(
        &[
            book("Big", "A", "Fiction", 2001, 5000),
            book("Big", "A", "Fiction", 2003, 5000),
            book("Bigger", "B", "Fiction", 2002, 9000),
            book("Edge", "C", "Fiction", 2002, 3500),
            book("Small", "D", "Fiction", 2002, 12),
        ],
        &[event(1, "Big", 4.0, 10.0)],
    )?;
    let view = views::popular_titles(&tables)?;
    assert_eq!(label_values(&view, "book_title")?, vec!["Bigger", "Big"]);
    assert_eq!(f64_values(&view, "ratings_count")?, vec![9000.0, 5000.0]);
    Ok(())
}

#[test]
fn test_author_views_count_distinct_values() -> Result<()> {
    let tables = tables(
        &[
            book("One", "Austen", "Romance", 1811, 1),
            book("Two", "Austen", "Romance", 1813, 1),
            book("Three", "Austen", "Satire", 1813, 1),
            book("Four", "Orwell", "Satire", 1945, 1),
        ],
        &[event(1, "One", 4.0, 10.0)],
    )?;

    let (authors, titles) = labelled_values(&views::author_titles(&tables)?, 10)?;
    assert_eq!(authors, vec!["Austen", "Orwell"]);
    assert_eq!(titles, vec![3.0, 1.0]);

    let (_, years) = labelled_values(&views::author_active_years(&tables)?, 10)?;
    assert_eq!(years, vec![2.0, 1.0]);

    let (_, categories) = labelled_values(&views::author_categories(&tables)?, 10)?;
    assert_eq!(categories, vec![2.0, 1.0]);
    Ok(())
}

#[test]
fn test_category_titles_orders_by_count() -> Result<()> {
    let tables = tables(
        &[
            book("One", "A", "Poetry", 2000, 1),
            book("Two", "B", "Drama", 2000, 1),
            book("Three", "C", "Drama", 2000, 1),
        ],
        &[event(1, "One", 4.0, 10.0)],
    )?;
    let (labels, values) = labelled_values(&views::category_titles(&tables)?, 15)?;
    assert_eq!(labels, vec!["Drama", "Poetry"]);
    assert_eq!(values, vec![2.0, 1.0]);
    Ok(())
}

#[test]
fn test_ratings_by_price_sorts_price_then_rating() -> Result<()> {
    let tables = tables(
        &small_catalog(),
        &[
            event(1, "A", 3.0, 10.0),
            event(2, "B", 5.0, 20.0),
            event(3, "C", 4.0, 10.0),
        ],
    )?;
    let view = views::ratings_by_price(&tables)?;
    assert_eq!(f64_values(&view, BOOK_PRICE)?, vec![20.0, 10.0, 10.0]);
    assert_eq!(f64_values(&view, RATING)?, vec![5.0, 4.0, 3.0]);
    Ok(())
}

#[test]
fn test_correlation_matrix_is_symmetric() -> Result<()> {
    let tables = tables(
        &small_catalog(),
        &[
            event(1, "A", 1.0, 10.0),
            event(2, "B", 2.0, 20.0),
            event(3, "C", 3.0, 30.0),
        ],
    )?;
    let matrix = views::rating_price_correlation(&tables)?;
    assert_eq!(matrix.shape(), (2, 3));
    assert_eq!(label_values(&matrix, views::FEATURE)?, vec![RATING, BOOK_PRICE]);
    let ratings = f64_values(&matrix, RATING)?;
    let prices = f64_values(&matrix, BOOK_PRICE)?;
    assert_eq!(ratings[0], 1.0);
    assert_eq!(prices[1], 1.0);
    assert!((ratings[1] - 1.0).abs() < 1e-9);
    assert_eq!(ratings[1], prices[0]);
    Ok(())
}

#[test]
fn test_views_leave_source_tables_untouched() -> Result<()> {
    let tables = tables(
        &[book("One", "A", "Poetry", 2000, 4000)],
        &[event(1, "One", 4.0, 10.0), event(2, "One", 2.0, 10.0)],
    )?;
    let before = tables.clone();
    for step in folio::standard_steps() {
        (step.view)(&tables)?;
    }
    assert!(tables.catalog.frame().equals_missing(before.catalog.frame()));
    assert!(tables.ratings.frame().equals_missing(before.ratings.frame()));
    Ok(())
}

#[test]
fn test_missing_view_column_is_reported() -> Result<()> {
    let frame = df!("only" => [1.0, 2.0])?;
    let err = f64_values(&frame, "absent").unwrap_err();
    assert!(matches!(
        err,
        folio::DataError::ViewColumnNotFound { ref column } if column == "absent"
    ));
    assert!(key_and_value(&frame).is_err());
    Ok(())
}

fn purchases_strategy() -> impl Strategy<Value = Vec<(i64, u8)>> {
    prop::collection::vec((0i64..50, 0u8..8), 1..60)
}

proptest! {
    #[test]
    fn prop_grouped_view_has_one_row_per_key(events in purchases_strategy()) {
        let ratings: Vec<_> = events
            .iter()
            .map(|(user, title)| event(*user, &format!("T{title}"), 3.0, 9.0))
            .collect();
        let tables = tables(&small_catalog(), &ratings).unwrap();
        let view = views::most_purchased(&tables).unwrap();

        let distinct: std::collections::BTreeSet<_> = events.iter().map(|(_, t)| *t).collect();
        prop_assert_eq!(view.height(), distinct.len());

        let (_, counts) = labelled_values(&view, view.height()).unwrap();
        prop_assert!(counts.windows(2).all(|pair| pair[0] >= pair[1]));
        prop_assert_eq!(counts.iter().sum::<f64>() as usize, events.len());
    }
}
