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

pub mod density;
pub mod plotly;

pub use density::{gaussian_kde, scott_bandwidth, DensityCurve};
pub use plotly::PlotlyRenderer;

use crate::config::LegendAnchor;
use crate::error::RenderResult;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

/// Title and axis captions of one chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Presentation<'a> {
    pub title: &'a str,
    pub x_label: Option<&'a str>,
    pub y_label: Option<&'a str>,
}

impl<'a> Presentation<'a> {
    pub const fn titled(title: &'a str) -> Self {
        Self {
            title,
            x_label: None,
            y_label: None,
        }
    }

    pub const fn with_axes(title: &'a str, x_label: &'a str, y_label: &'a str) -> Self {
        Self {
            title,
            x_label: Some(x_label),
            y_label: Some(y_label),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    pub fn as_plotly(self) -> &'static str {
        match self {
            Orientation::Horizontal => "h",
            Orientation::Vertical => "v",
        }
    }
}

/// Chart kinds accepted by [`ChartRenderer::frame_plot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameKind {
    Bar,
    BarH,
    Hist,
}

#[derive(Debug, Clone, Copy)]
pub struct HistogramPair<'a> {
    pub first: &'a [f64],
    pub second: &'a [f64],
    /// `None` uses the renderer's configured bin count.
    pub bins: Option<usize>,
    pub first_title: &'a str,
    pub second_title: &'a str,
}

#[derive(Debug, Clone, Copy)]
pub struct PieRequest<'a> {
    pub values: &'a [f64],
    pub labels: &'a [String],
    /// Radial offset per slice, same length as `values`.
    pub explode: &'a [f64],
    /// `None` uses the renderer's configured legend anchor.
    pub legend_anchor: Option<LegendAnchor>,
    pub title: &'a str,
}

/// Explode vector that pulls out only the first slice.
pub fn emphasise_first(slices: usize, offset: f64) -> Vec<f64> {
    (0..slices)
        .map(|i| if i == 0 { offset } else { 0.0 })
        .collect()
}

/// Sink for every chart the report draws.
///
/// Calls arrive one at a time in report order. Frame-taking operations read
/// the label (key) column first and the value column last.
pub trait ChartRenderer {
    fn paired_histogram(&mut self, request: &HistogramPair<'_>) -> RenderResult<()>;

    fn density(&mut self, values: &[f64], presentation: &Presentation<'_>) -> RenderResult<()>;

    /// `matrix` holds a label column followed by one numeric column per
    /// feature.
    fn correlation_heatmap(
        &mut self,
        matrix: &DataFrame,
        presentation: &Presentation<'_>,
    ) -> RenderResult<()>;

    fn pie(&mut self, request: &PieRequest<'_>) -> RenderResult<()>;

    fn categorical_bar(
        &mut self,
        view: &DataFrame,
        orientation: Orientation,
        presentation: &Presentation<'_>,
    ) -> RenderResult<()>;

    fn frame_plot(
        &mut self,
        view: &DataFrame,
        kind: FrameKind,
        presentation: &Presentation<'_>,
    ) -> RenderResult<()>;

    fn scatter(&mut self, x: &[f64], y: &[f64], presentation: &Presentation<'_>)
        -> RenderResult<()>;

    fn value_bar(
        &mut self,
        values: &[f64],
        labels: &[String],
        presentation: &Presentation<'_>,
    ) -> RenderResult<()>;
}

impl<R: ChartRenderer + ?Sized> ChartRenderer for &mut R {
    fn paired_histogram(&mut self, request: &HistogramPair<'_>) -> RenderResult<()> {
        (**self).paired_histogram(request)
    }

    fn density(&mut self, values: &[f64], presentation: &Presentation<'_>) -> RenderResult<()> {
        (**self).density(values, presentation)
    }

    fn correlation_heatmap(
        &mut self,
        matrix: &DataFrame,
        presentation: &Presentation<'_>,
    ) -> RenderResult<()> {
        (**self).correlation_heatmap(matrix, presentation)
    }

    fn pie(&mut self, request: &PieRequest<'_>) -> RenderResult<()> {
        (**self).pie(request)
    }

    fn categorical_bar(
        &mut self,
        view: &DataFrame,
        orientation: Orientation,
        presentation: &Presentation<'_>,
    ) -> RenderResult<()> {
        (**self).categorical_bar(view, orientation, presentation)
    }

    fn frame_plot(
        &mut self,
        view: &DataFrame,
        kind: FrameKind,
        presentation: &Presentation<'_>,
    ) -> RenderResult<()> {
        (**self).frame_plot(view, kind, presentation)
    }

    fn scatter(
        &mut self,
        x: &[f64],
        y: &[f64],
        presentation: &Presentation<'_>,
    ) -> RenderResult<()> {
        (**self).scatter(x, y, presentation)
    }

    fn value_bar(
        &mut self,
        values: &[f64],
        labels: &[String],
        presentation: &Presentation<'_>,
    ) -> RenderResult<()> {
        (**self).value_bar(values, labels, presentation)
    }
}
