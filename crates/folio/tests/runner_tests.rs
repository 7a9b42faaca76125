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
use folio::error::{RenderError, RenderResult};
use folio::render::{HistogramPair, PieRequest};
use folio::schema::{CatalogRecord, CatalogTable, RatingEvent, RatingTable, SourceTables};
use folio::steps::select_steps;
use folio::{
    standard_steps, ChartRenderer, ConfigError, FrameKind, InMemorySource, Orientation,
    Presentation, ReportConfig, ReportError, ReportRunner,
};
use polars::prelude::DataFrame;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Histograms { first: usize, second: usize, bins: Option<usize> },
    Density { title: String, points: usize },
    Heatmap { rows: usize },
    Pie { title: String, labels: Vec<String>, explode: Vec<f64> },
    CategoricalBar { title: String, rows: usize, orientation: Orientation },
    Frame { title: String, kind: FrameKind },
    Scatter { points: usize },
    ValueBar { title: String, labels: Vec<String> },
}

#[derive(Default)]
struct RecordingRenderer {
    calls: Vec<Call>,
    fail_on: Option<&'static str>,
}

impl RecordingRenderer {
    fn check(&self, title: &str) -> RenderResult<()> {
        if self.fail_on == Some(title) {
            return Err(RenderError::EmptyData {
                chart: title.to_string(),
            });
        }
        Ok(())
    }
}

impl ChartRenderer for RecordingRenderer {
    fn paired_histogram(&mut self, request: &HistogramPair<'_>) -> RenderResult<()> {
        self.calls.push(Call::Histograms {
            first: request.first.len(),
            second: request.second.len(),
            bins: request.bins,
        });
        Ok(())
    }

    fn density(&mut self, values: &[f64], presentation: &Presentation<'_>) -> RenderResult<()> {
        self.calls.push(Call::Density {
            title: presentation.title.to_string(),
            points: values.len(),
        });
        Ok(())
    }

    fn correlation_heatmap(
        &mut self,
        matrix: &DataFrame,
        _presentation: &Presentation<'_>,
    ) -> RenderResult<()> {
        self.calls.push(Call::Heatmap {
            rows: matrix.height(),
        });
        Ok(())
    }

    fn pie(&mut self, request: &PieRequest<'_>) -> RenderResult<()> {
        self.check(request.title)?;
        self.calls.push(Call::Pie {
            title: request.title.to_string(),
            labels: request.labels.to_vec(),
            explode: request.explode.to_vec(),
        });
        Ok(())
    }

    fn categorical_bar(
        &mut self,
        view: &DataFrame,
        orientation: Orientation,
        presentation: &Presentation<'_>,
    ) -> RenderResult<()> {
        self.calls.push(Call::CategoricalBar {
            title: presentation.title.to_string(),
            rows: view.height(),
            orientation,
        });
        Ok(())
    }

    fn frame_plot(
        &mut self,
        _view: &DataFrame,
        kind: FrameKind,
        presentation: &Presentation<'_>,
    ) -> RenderResult<()> {
        self.calls.push(Call::Frame {
            title: presentation.title.to_string(),
            kind,
        });
        Ok(())
    }

    fn scatter(&mut self, x: &[f64], y: &[f64], _: &Presentation<'_>) -> RenderResult<()> {
        assert_eq!(x.len(), y.len());
        self.calls.push(Call::Scatter { points: x.len() });
        Ok(())
    }

    fn value_bar(
        &mut self,
        values: &[f64],
        labels: &[String],
        presentation: &Presentation<'_>,
    ) -> RenderResult<()> {
        assert_eq!(values.len(), labels.len());
        self.calls.push(Call::ValueBar {
            title: presentation.title.to_string(),
            labels: labels.to_vec(),
        });
        Ok(())
    }
}

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

fn library() -> Result<SourceTables> {
    let catalog = CatalogTable::from_records(&[
        book("Dune", "Herbert", "Fiction", 1965, 4100),
        book("Emma", "Austen", "Romance", 1815, 900),
        book("Persuasion", "Austen", "Romance", 1817, 3600),
        book("1984", "Orwell", "Fiction", 1949, 7000),
    ])?;
    let ratings = RatingTable::from_records(&[
        event(1, "Dune", 5.0, 12.5),
        event(2, "Dune", 4.0, 12.5),
        event(3, "Emma", 3.0, 8.0),
        event(1, "1984", 4.5, 9.0),
    ])?;
    Ok(SourceTables::new(catalog, ratings))
}

#[test]
fn test_full_report_renders_every_chart_in_order() -> Result<()> {
    let tables = library()?;
    let mut renderer = RecordingRenderer::default();
    let mut runner = ReportRunner::new(tables.clone(), &mut renderer, Vec::new());
    runner.run()?;
    let (_, out) = runner.into_parts();

    let calls = &renderer.calls;
    assert_eq!(calls.len(), 14);
    assert_eq!(
        calls[0],
        Call::Histograms {
            first: 4,
            second: 4,
            bins: Some(10)
        }
    );
    assert!(matches!(&calls[1], Call::Density { title, points: 4 } if title.contains("Ratings")));
    assert!(matches!(&calls[2], Call::Density { title, .. } if title.contains("Prices")));
    assert_eq!(calls[3], Call::Heatmap { rows: 2 });
    assert!(matches!(
        &calls[4],
        Call::Pie { labels, explode, .. }
            if labels == &["Fiction", "Romance"] && explode == &[0.1, 0.0]
    ));
    assert!(matches!(&calls[5], Call::Frame { kind: FrameKind::BarH, .. }));
    assert_eq!(calls[6], Call::Scatter { points: 4 });
    assert!(matches!(
        &calls[7],
        Call::ValueBar { labels, .. } if labels.first().map(String::as_str) == Some("Dune")
    ));
    assert!(matches!(&calls[9], Call::Frame { kind: FrameKind::Hist, .. }));
    assert!(matches!(
        &calls[10],
        Call::ValueBar { title, labels } if title.contains("3500") && labels == &["1984", "Dune", "Persuasion"]
    ));
    assert!(matches!(
        &calls[12],
        Call::CategoricalBar { rows: 3, orientation: Orientation::Horizontal, .. }
    ));
    assert!(matches!(&calls[13], Call::Pie { title, .. } if title == "Top 15 Active Authors"));

    let text = String::from_utf8(out)?;
    assert!(text.contains("Books most purchased  Dataframe:"));
    assert!(text.contains("Pie Distribution: Book Genres"));
    assert!(text.contains("Info data  Dataframe:"));
    assert!(text.contains("Rating data  Dataframe:"));
    Ok(())
}

#[test]
fn test_run_leaves_source_tables_unchanged() -> Result<()> {
    let tables = library()?;
    let mut runner = ReportRunner::new(tables.clone(), RecordingRenderer::default(), Vec::new());
    runner.run()?;
    assert_eq!(runner.tables().catalog.height(), tables.catalog.height());
    assert!(runner
        .tables()
        .catalog
        .frame()
        .equals_missing(tables.catalog.frame()));
    assert!(runner
        .tables()
        .ratings
        .frame()
        .equals_missing(tables.ratings.frame()));
    Ok(())
}

#[test]
fn test_render_failure_aborts_with_step_id() -> Result<()> {
    let renderer = RecordingRenderer {
        fail_on: Some("Pie Distribution: Book Genres"),
        ..Default::default()
    };
    let mut runner = ReportRunner::new(library()?, renderer, Vec::new());
    let err = runner.run().unwrap_err();

    assert_eq!(err.step(), Some("genre_share"));
    assert!(matches!(
        &err,
        ReportError::Step { source, .. }
            if matches!(**source, ReportError::Render(RenderError::EmptyData { .. }))
    ));
    // Nothing after the failing step ran.
    assert_eq!(runner.renderer().calls.len(), 4);
    Ok(())
}

#[test]
fn test_selected_steps_run_alone() -> Result<()> {
    let steps = select_steps(standard_steps(), &["most_expensive".to_string()])?;
    let mut runner = ReportRunner::new(library()?, RecordingRenderer::default(), Vec::new())
        .with_separator_width(3)
        .with_steps(steps);
    runner.run()?;
    assert_eq!(runner.steps().len(), 1);
    let (renderer, out) = runner.into_parts();
    assert_eq!(renderer.calls.len(), 1);
    let text = String::from_utf8(out)?;
    assert!(text.starts_with("\n===\n◘  Top Expensive Books  Dataframe:"));
    Ok(())
}

#[test]
fn test_popular_titles_chart_shows_every_title() -> Result<()> {
    let catalog: Vec<_> = (0..20)
        .map(|i| book(&format!("Hit {i:02}"), "Author", "Fiction", 2000, 4000 + i))
        .collect();
    let tables = SourceTables::new(
        CatalogTable::from_records(&catalog)?,
        RatingTable::from_records(&[event(1, "Hit 00", 4.0, 10.0)])?,
    );
    let steps = select_steps(standard_steps(), &["popular_titles".to_string()])?;
    let mut runner =
        ReportRunner::new(tables, RecordingRenderer::default(), Vec::new()).with_steps(steps);
    runner.run()?;
    let (renderer, out) = runner.into_parts();

    assert!(matches!(
        renderer.calls.as_slice(),
        [Call::ValueBar { labels, .. }]
            if labels.len() == 20 && labels.first().map(String::as_str) == Some("Hit 19")
    ));
    // The console preview stays capped.
    let text = String::from_utf8(out)?;
    assert!(text.contains("Hit 05"));
    assert!(!text.contains("Hit 04"));
    Ok(())
}

#[test]
fn test_unknown_step_is_rejected() {
    let err = select_steps(standard_steps(), &["nope".to_string()]).unwrap_err();
    assert!(matches!(err, ConfigError::UnknownStep { ref id } if id == "nope"));
}

#[test]
fn test_run_report_writes_chart_pages() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config = ReportConfig {
        output_dir: dir.path().join("charts"),
        ..Default::default()
    };
    let mut out = Vec::new();
    let written = folio::run_report(&InMemorySource::new(library()?), &config, &mut out)?;
    assert_eq!(written.len(), 14);
    for path in &written {
        assert!(path.exists(), "{} missing", path.display());
    }
    assert!(written[0]
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with("01-")));
    Ok(())
}
