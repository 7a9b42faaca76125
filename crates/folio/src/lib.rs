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

pub mod config;
pub mod console;
pub mod error;
pub mod render;
pub mod runner;
pub mod schema;
pub mod source;
pub mod steps;
pub mod views;

pub use config::{RendererConfig, ReportConfig};
pub use console::ReportConsole;
pub use error::{
    ConfigError, DataError, ErrorSeverity, RenderError, ReportError, Result,
};
pub use render::{ChartRenderer, FrameKind, Orientation, PlotlyRenderer, Presentation};
pub use runner::ReportRunner;
pub use schema::{CatalogRecord, CatalogTable, RatingEvent, RatingTable, SourceTables};
pub use source::{CsvFeatureSource, FeatureSource, InMemorySource};
pub use steps::{standard_steps, ReportStep};

use std::io::Write;
use std::path::PathBuf;

/// Loads the tables from `source`, renders every configured step with a
/// [`PlotlyRenderer`] and returns the chart pages written.
pub fn run_report<W: Write>(
    source: &dyn FeatureSource,
    config: &ReportConfig,
    out: W,
) -> Result<Vec<PathBuf>> {
    config.validate()?;
    let steps = steps::select_steps(standard_steps(), &config.steps)?;
    let renderer = PlotlyRenderer::new(config.renderer.clone(), config.output_dir.clone());
    let mut runner = ReportRunner::from_source(source, renderer, out)?
        .with_separator_width(config.separator_width)
        .with_steps(steps);
    runner.run()?;
    let (renderer, _) = runner.into_parts();
    Ok(renderer.written().to_vec())
}
