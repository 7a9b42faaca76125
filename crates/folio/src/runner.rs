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

use crate::console::ReportConsole;
use crate::error::{ReportError, Result};
use crate::render::{emphasise_first, ChartRenderer, HistogramPair, PieRequest};
use crate::schema::SourceTables;
use crate::source::FeatureSource;
use crate::steps::{standard_steps, ChartRequest, Preview, ReportStep};
use crate::views::{f64_values, labelled_values};
use polars::prelude::DataFrame;
use std::io::Write;
use std::time::Instant;
use tracing::{debug, info};

/// Runs report steps in order against one fixed pair of source tables.
///
/// The first failing step aborts the run; its error is wrapped with the step
/// id. Only the diagnostic printer swallows failures.
pub struct ReportRunner<R: ChartRenderer, W: Write> {
    tables: SourceTables,
    renderer: R,
    console: ReportConsole<W>,
    steps: Vec<ReportStep>,
}

impl<R: ChartRenderer, W: Write> ReportRunner<R, W> {
    pub fn new(tables: SourceTables, renderer: R, out: W) -> Self {
        Self {
            tables,
            renderer,
            console: ReportConsole::new(out),
            steps: standard_steps(),
        }
    }

    pub fn from_source(source: &dyn FeatureSource, renderer: R, out: W) -> Result<Self> {
        Ok(Self::new(source.load()?, renderer, out))
    }

    pub fn with_separator_width(mut self, width: usize) -> Self {
        let out = self.console.into_inner();
        self.console = ReportConsole::with_separator_width(out, width);
        self
    }

    pub fn with_steps(mut self, steps: Vec<ReportStep>) -> Self {
        self.steps = steps;
        self
    }

    pub fn tables(&self) -> &SourceTables {
        &self.tables
    }

    pub fn steps(&self) -> &[ReportStep] {
        &self.steps
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn into_parts(self) -> (R, W) {
        (self.renderer, self.console.into_inner())
    }

    pub fn run(&mut self) -> Result<()> {
        let started = Instant::now();
        let steps = self.steps.clone();
        info!(steps = steps.len(), "report started");
        for step in &steps {
            self.run_step(step)
                .map_err(|e| ReportError::wrap_step(step.id, e))?;
        }
        self.console.flush()?;
        info!(
            steps = steps.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "report finished"
        );
        Ok(())
    }

    pub fn run_step(&mut self, step: &ReportStep) -> Result<()> {
        debug!(step = step.id, "computing view");
        let view = (step.view)(&self.tables)?;
        debug!(step = step.id, rows = view.height(), columns = view.width(), "view ready");
        match step.preview {
            Some(Preview::Table { title, cap }) => self.console.display_frame(title, &view, cap)?,
            Some(Preview::Diagnostic { title }) => self.console.debug_text(title, &view)?,
            None => {}
        }
        if let Some(chart) = &step.chart {
            self.render(chart, &view)?;
            info!(step = step.id, chart = chart.kind(), "chart rendered");
        }
        Ok(())
    }

    fn render(&mut self, chart: &ChartRequest, view: &DataFrame) -> Result<()> {
        match *chart {
            ChartRequest::HistogramPair {
                first,
                second,
                bins,
                first_title,
                second_title,
            } => {
                let first = f64_values(view, first)?;
                let second = f64_values(view, second)?;
                self.renderer.paired_histogram(&HistogramPair {
                    first: &first,
                    second: &second,
                    bins,
                    first_title,
                    second_title,
                })?;
            }
            ChartRequest::Density {
                column,
                presentation,
            } => {
                let values = f64_values(view, column)?;
                self.renderer.density(&values, &presentation)?;
            }
            ChartRequest::CorrelationHeatmap { presentation } => {
                self.renderer.correlation_heatmap(view, &presentation)?;
            }
            ChartRequest::Pie {
                top,
                emphasis,
                title,
            } => {
                let (labels, values) = labelled_values(view, top)?;
                let explode = emphasise_first(values.len(), emphasis);
                self.renderer.pie(&PieRequest {
                    values: &values,
                    labels: &labels,
                    explode: &explode,
                    legend_anchor: None,
                    title,
                })?;
            }
            ChartRequest::CategoricalBar {
                top,
                orientation,
                presentation,
            } => {
                self.renderer
                    .categorical_bar(&view.head(Some(top)), orientation, &presentation)?;
            }
            ChartRequest::FramePlot { kind, presentation } => {
                self.renderer.frame_plot(view, kind, &presentation)?;
            }
            ChartRequest::Scatter { x, y, presentation } => {
                let x = f64_values(view, x)?;
                let y = f64_values(view, y)?;
                self.renderer.scatter(&x, &y, &presentation)?;
            }
            ChartRequest::ValueBar { top, presentation } => {
                let (labels, values) = labelled_values(view, top.unwrap_or(view.height()))?;
                self.renderer.value_bar(&values, &labels, &presentation)?;
            }
        }
        Ok(())
    }
}
