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

//! Declarative description of the report.
//!
//! A [`ReportStep`] names a view function, how (if at all) to preview the
//! view on the console, and which chart (if any) to draw from it.

use crate::error::{ConfigError, ConfigResult, DataResult};
use crate::render::{FrameKind, Orientation, Presentation};
use crate::schema::{BOOK_PRICE, RATING, SourceTables};
use crate::views;
use polars::prelude::DataFrame;

pub type ViewFn = fn(&SourceTables) -> DataResult<DataFrame>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preview {
    /// Bounded table preview.
    Table { title: &'static str, cap: usize },
    /// Whole view through the fault-tolerant diagnostic printer.
    Diagnostic { title: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChartRequest {
    HistogramPair {
        first: &'static str,
        second: &'static str,
        bins: Option<usize>,
        first_title: &'static str,
        second_title: &'static str,
    },
    Density {
        column: &'static str,
        presentation: Presentation<'static>,
    },
    CorrelationHeatmap {
        presentation: Presentation<'static>,
    },
    /// Pie of the first `top` rows with the largest slice pulled out.
    Pie {
        top: usize,
        emphasis: f64,
        title: &'static str,
    },
    CategoricalBar {
        top: usize,
        orientation: Orientation,
        presentation: Presentation<'static>,
    },
    FramePlot {
        kind: FrameKind,
        presentation: Presentation<'static>,
    },
    Scatter {
        x: &'static str,
        y: &'static str,
        presentation: Presentation<'static>,
    },
    /// Bar from raw label and value sequences, capped at `top` rows when set.
    ValueBar {
        top: Option<usize>,
        presentation: Presentation<'static>,
    },
}

impl ChartRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            ChartRequest::HistogramPair { .. } => "paired_histogram",
            ChartRequest::Density { .. } => "density",
            ChartRequest::CorrelationHeatmap { .. } => "correlation_heatmap",
            ChartRequest::Pie { .. } => "pie",
            ChartRequest::CategoricalBar { .. } => "categorical_bar",
            ChartRequest::FramePlot { .. } => "frame_plot",
            ChartRequest::Scatter { .. } => "scatter",
            ChartRequest::ValueBar { .. } => "value_bar",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReportStep {
    pub id: &'static str,
    pub view: ViewFn,
    pub preview: Option<Preview>,
    pub chart: Option<ChartRequest>,
}

const TOP_CHART_ROWS: usize = 15;
const TOP_SLICE_EMPHASIS: f64 = 0.1;

/// The book report, in print order.
pub fn standard_steps() -> Vec<ReportStep> {
    vec![
        ReportStep {
            id: "rating_price_histograms",
            view: views::rating_price_pairs,
            preview: None,
            chart: Some(ChartRequest::HistogramPair {
                first: RATING,
                second: BOOK_PRICE,
                bins: Some(10),
                first_title: "Histogram: Book Ratings",
                second_title: "Histogram: Book Prices",
            }),
        },
        ReportStep {
            id: "rating_density",
            view: views::rating_values,
            preview: None,
            chart: Some(ChartRequest::Density {
                column: RATING,
                presentation: Presentation::with_axes("Kde Plot: Book Ratings", "Ratings", "Frequency"),
            }),
        },
        ReportStep {
            id: "price_density",
            view: views::price_values,
            preview: None,
            chart: Some(ChartRequest::Density {
                column: BOOK_PRICE,
                presentation: Presentation::with_axes("Kde Plot: Book Prices", "Prices", "Frequency"),
            }),
        },
        ReportStep {
            id: "rating_price_correlation",
            view: views::rating_price_correlation,
            preview: None,
            chart: Some(ChartRequest::CorrelationHeatmap {
                presentation: Presentation::titled("Pearson Correlation: Ratings and Prices"),
            }),
        },
        ReportStep {
            id: "genre_share",
            view: views::top_genres,
            preview: Some(Preview::Diagnostic {
                title: "Pie Distribution: Book Genres",
            }),
            chart: Some(ChartRequest::Pie {
                top: views::TOP_GENRES,
                emphasis: TOP_SLICE_EMPHASIS,
                title: "Pie Distribution: Book Genres",
            }),
        },
        ReportStep {
            id: "genre_frequency",
            view: views::top_genres,
            preview: None,
            chart: Some(ChartRequest::FramePlot {
                kind: FrameKind::BarH,
                presentation: Presentation::with_axes("Bar Chart: Book Genres", "Frequency", "Genres"),
            }),
        },
        ReportStep {
            id: "ratings_vs_price",
            view: views::ratings_by_price,
            preview: Some(Preview::Table {
                title: "Ratings vs Price",
                cap: 20,
            }),
            chart: Some(ChartRequest::Scatter {
                x: RATING,
                y: BOOK_PRICE,
                presentation: Presentation::with_axes(
                    "Scatter Plot: Ratings and Price",
                    "Ratings",
                    "Book Price",
                ),
            }),
        },
        ReportStep {
            id: "most_purchased",
            view: views::most_purchased,
            preview: Some(Preview::Table {
                title: "Books most purchased",
                cap: 15,
            }),
            chart: Some(ChartRequest::ValueBar {
                top: Some(TOP_CHART_ROWS),
                presentation: Presentation::with_axes(
                    "Bar Plot: Most Purchased Books",
                    "Purchases",
                    "Books",
                ),
            }),
        },
        ReportStep {
            id: "highest_rated",
            view: views::highest_rated,
            preview: Some(Preview::Table {
                title: "Highest Rated Books",
                cap: 15,
            }),
            chart: Some(ChartRequest::ValueBar {
                top: Some(TOP_CHART_ROWS),
                presentation: Presentation::with_axes(
                    "Bar Plot: Highest Rated Books",
                    "Ratings",
                    "Books",
                ),
            }),
        },
        ReportStep {
            id: "most_expensive",
            view: views::most_expensive,
            preview: Some(Preview::Table {
                title: "Top Expensive Books",
                cap: 15,
            }),
            chart: Some(ChartRequest::FramePlot {
                kind: FrameKind::Hist,
                presentation: Presentation::with_axes(
                    "Histogram: Book Price distribution",
                    "Price Range ($)",
                    "Frequency",
                ),
            }),
        },
        ReportStep {
            id: "popular_titles",
            view: views::popular_titles,
            preview: Some(Preview::Table {
                title: "Books over 3500 Ratings",
                cap: 15,
            }),
            chart: Some(ChartRequest::ValueBar {
                top: None,
                presentation: Presentation::with_axes(
                    "Bar Plot: Books over 3500 Ratings",
                    "Ratings",
                    "Books",
                ),
            }),
        },
        ReportStep {
            id: "category_titles",
            view: views::category_titles,
            preview: Some(Preview::Table {
                title: "15 Top Books in a Category",
                cap: 15,
            }),
            chart: Some(ChartRequest::CategoricalBar {
                top: TOP_CHART_ROWS,
                orientation: Orientation::Horizontal,
                presentation: Presentation::with_axes(
                    "Bar Plot: Top 15 Categorical Books",
                    "Books",
                    "Categories",
                ),
            }),
        },
        ReportStep {
            id: "author_titles",
            view: views::author_titles,
            preview: Some(Preview::Table {
                title: "Most Books by Author",
                cap: 15,
            }),
            chart: Some(ChartRequest::CategoricalBar {
                top: TOP_CHART_ROWS,
                orientation: Orientation::Horizontal,
                presentation: Presentation::with_axes(
                    "Bar Plot: Most Published Books by Authors",
                    "Publishes",
                    "Authors",
                ),
            }),
        },
        ReportStep {
            id: "author_active_years",
            view: views::author_active_years,
            preview: Some(Preview::Table {
                title: "Years most active by Authors",
                cap: 15,
            }),
            chart: Some(ChartRequest::Pie {
                top: TOP_CHART_ROWS,
                emphasis: TOP_SLICE_EMPHASIS,
                title: "Top 15 Active Authors",
            }),
        },
        ReportStep {
            id: "author_categories",
            view: views::author_categories,
            preview: Some(Preview::Table {
                title: "Authors with diverse Categories",
                cap: 15,
            }),
            chart: None,
        },
        ReportStep {
            id: "catalog_sample",
            view: views::catalog_sample,
            preview: Some(Preview::Table {
                title: "Info data",
                cap: 25,
            }),
            chart: None,
        },
        ReportStep {
            id: "rating_sample",
            view: views::rating_sample,
            preview: Some(Preview::Table {
                title: "Rating data",
                cap: 25,
            }),
            chart: None,
        },
    ]
}

/// Keeps the steps named in `ids`, in report order. An empty list keeps all.
pub fn select_steps(steps: Vec<ReportStep>, ids: &[String]) -> ConfigResult<Vec<ReportStep>> {
    if ids.is_empty() {
        return Ok(steps);
    }
    if let Some(unknown) = ids
        .iter()
        .find(|id| !steps.iter().any(|step| step.id == id.as_str()))
    {
        return Err(ConfigError::UnknownStep {
            id: unknown.clone(),
        });
    }
    Ok(steps
        .into_iter()
        .filter(|step| ids.iter().any(|id| id == step.id))
        .collect())
}
