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

//! Writes every chart as a standalone HTML page holding a Plotly figure.

use super::density::gaussian_kde;
use super::{ChartRenderer, FrameKind, HistogramPair, Orientation, PieRequest, Presentation};
use crate::config::RendererConfig;
use crate::error::{RenderError, RenderResult};
use crate::views::{f64_values, key_and_value, label_values, labelled_values};
use polars::prelude::DataFrame;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct PlotlyRenderer {
    config: RendererConfig,
    output_dir: PathBuf,
    written: Vec<PathBuf>,
}

fn non_empty(chart: &str, len: usize) -> RenderResult<()> {
    if len == 0 {
        return Err(RenderError::EmptyData {
            chart: chart.to_string(),
        });
    }
    Ok(())
}

fn same_length(chart: &str, left: usize, right: usize) -> RenderResult<()> {
    if left != right {
        return Err(RenderError::LengthMismatch {
            chart: chart.to_string(),
            left,
            right,
        });
    }
    Ok(())
}

/// File-name friendly form of a chart title.
pub fn slug(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    let trimmed = out.trim_end_matches('-');
    if trimmed.is_empty() {
        "chart".to_string()
    } else {
        trimmed.to_string()
    }
}

// JSON embedded in a <script> element must not close it.
fn script_json<T: serde::Serialize + ?Sized>(value: &T) -> RenderResult<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

impl PlotlyRenderer {
    pub fn new(config: RendererConfig, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            output_dir: output_dir.into(),
            written: Vec::new(),
        }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Chart pages written so far, in render order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn layout(&self, presentation: &Presentation<'_>) -> Value {
        let mut layout = json!({
            "title": { "text": presentation.title },
            "width": self.config.width,
            "height": self.config.height,
            "font": { "family": self.config.font_family, "size": self.config.font_size },
            "paper_bgcolor": self.config.background,
            "plot_bgcolor": self.config.background,
        });
        if let Some(x_label) = presentation.x_label {
            layout["xaxis"]["title"]["text"] = json!(x_label);
        }
        if let Some(y_label) = presentation.y_label {
            layout["yaxis"]["title"]["text"] = json!(y_label);
        }
        layout
    }

    fn bar_trace(&self, labels: &[String], values: &[f64], orientation: Orientation) -> Value {
        let (x, y) = match orientation {
            Orientation::Horizontal => (json!(values), json!(labels)),
            Orientation::Vertical => (json!(labels), json!(values)),
        };
        json!([{
            "type": "bar",
            "x": x,
            "y": y,
            "orientation": orientation.as_plotly(),
            "marker": { "color": self.config.colour(0) },
        }])
    }

    fn bar_layout(&self, presentation: &Presentation<'_>, orientation: Orientation) -> Value {
        let mut layout = self.layout(presentation);
        layout["bargap"] = json!(self.config.bar.bar_gap);
        if orientation == Orientation::Horizontal && self.config.bar.largest_first {
            layout["yaxis"]["autorange"] = json!("reversed");
        }
        layout
    }

    fn page(&self, title: &str, data: &Value, layout: &Value) -> RenderResult<String> {
        Ok(format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<script src="{src}"></script>
</head>
<body>
<div id="chart"></div>
<script>
document.title = {title};
Plotly.newPlot("chart", {data}, {layout}, {{"responsive": true}});
</script>
</body>
</html>
"#,
            src = self.config.plotly_src,
            title = script_json(title)?,
            data = script_json(data)?,
            layout = script_json(layout)?,
        ))
    }

    fn write_figure(&mut self, title: &str, data: Value, layout: Value) -> RenderResult<()> {
        let html = self.page(title, &data, &layout)?;
        fs::create_dir_all(&self.output_dir).map_err(|source| RenderError::Write {
            path: self.output_dir.clone(),
            source,
        })?;
        let path = self
            .output_dir
            .join(format!("{:02}-{}.html", self.written.len() + 1, slug(title)));
        fs::write(&path, html).map_err(|source| RenderError::Write {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "chart written");
        self.written.push(path);
        Ok(())
    }
}

impl ChartRenderer for PlotlyRenderer {
    fn paired_histogram(&mut self, request: &HistogramPair<'_>) -> RenderResult<()> {
        non_empty("paired_histogram", request.first.len())?;
        non_empty("paired_histogram", request.second.len())?;
        let bins = request.bins.unwrap_or(self.config.histogram.bins);
        let data = json!([
            {
                "type": "histogram",
                "x": request.first,
                "nbinsx": bins,
                "name": request.first_title,
                "opacity": self.config.histogram.opacity,
                "marker": { "color": self.config.colour(0) },
                "xaxis": "x",
                "yaxis": "y",
            },
            {
                "type": "histogram",
                "x": request.second,
                "nbinsx": bins,
                "name": request.second_title,
                "opacity": self.config.histogram.opacity,
                "marker": { "color": self.config.colour(1) },
                "xaxis": "x2",
                "yaxis": "y2",
            }
        ]);
        let title = format!("{} | {}", request.first_title, request.second_title);
        let mut layout = self.layout(&Presentation::titled(&title));
        layout["grid"] = json!({ "rows": 1, "columns": 2, "pattern": "independent" });
        layout["showlegend"] = json!(false);
        layout["xaxis"]["title"]["text"] = json!(request.first_title);
        layout["xaxis2"]["title"]["text"] = json!(request.second_title);
        layout["yaxis"]["title"]["text"] = json!("Frequency");
        self.write_figure(&title, data, layout)
    }

    fn density(&mut self, values: &[f64], presentation: &Presentation<'_>) -> RenderResult<()> {
        let curve = gaussian_kde(
            values,
            self.config.density.grid_points,
            self.config.density.cut,
        )
        .ok_or_else(|| RenderError::EmptyData {
            chart: presentation.title.to_string(),
        })?;
        let fill = if self.config.density.fill {
            "tozeroy"
        } else {
            "none"
        };
        let data = json!([{
            "type": "scatter",
            "mode": "lines",
            "x": curve.x,
            "y": curve.y,
            "fill": fill,
            "line": { "color": self.config.colour(0) },
        }]);
        let layout = self.layout(presentation);
        self.write_figure(presentation.title, data, layout)
    }

    fn correlation_heatmap(
        &mut self,
        matrix: &DataFrame,
        presentation: &Presentation<'_>,
    ) -> RenderResult<()> {
        let names = matrix.get_column_names();
        if names.len() < 2 || matrix.height() == 0 {
            return Err(RenderError::InvalidFrame {
                chart: presentation.title.to_string(),
                reason: format!(
                    "expected a label column and at least one feature, got {}x{}",
                    matrix.height(),
                    names.len()
                ),
            });
        }
        let rows = label_values(matrix, names[0].as_str())?;
        let features: Vec<String> = names[1..].iter().map(|n| n.to_string()).collect();
        let columns = features
            .iter()
            .map(|name| f64_values(matrix, name))
            .collect::<Result<Vec<_>, _>>()?;
        let z: Vec<Vec<f64>> = (0..rows.len())
            .map(|row| columns.iter().map(|column| column[row]).collect())
            .collect();
        let mut trace = json!({
            "type": "heatmap",
            "z": z,
            "x": features,
            "y": rows,
            "zmin": -1.0,
            "zmax": 1.0,
            "colorscale": self.config.heatmap.colorscale,
        });
        if self.config.heatmap.show_values {
            trace["texttemplate"] = json!("%{z:.2f}");
        }
        let layout = self.layout(presentation);
        self.write_figure(presentation.title, json!([trace]), layout)
    }

    fn pie(&mut self, request: &PieRequest<'_>) -> RenderResult<()> {
        non_empty(request.title, request.values.len())?;
        same_length(request.title, request.values.len(), request.labels.len())?;
        same_length(request.title, request.values.len(), request.explode.len())?;
        let anchor = request
            .legend_anchor
            .unwrap_or(self.config.pie.legend_anchor);
        let colours: Vec<&str> = (0..request.values.len())
            .map(|i| self.config.colour(i))
            .collect();
        let data = json!([{
            "type": "pie",
            "values": request.values,
            "labels": request.labels,
            "pull": request.explode,
            "textinfo": self.config.pie.text_info,
            "hole": self.config.pie.hole,
            "sort": false,
            "marker": { "colors": colours },
        }]);
        let mut layout = self.layout(&Presentation::titled(request.title));
        layout["legend"] = json!({ "x": anchor.x, "y": anchor.y });
        self.write_figure(request.title, data, layout)
    }

    fn categorical_bar(
        &mut self,
        view: &DataFrame,
        orientation: Orientation,
        presentation: &Presentation<'_>,
    ) -> RenderResult<()> {
        let (labels, values) = labelled_values(view, view.height())?;
        non_empty(presentation.title, values.len())?;
        let data = self.bar_trace(&labels, &values, orientation);
        let layout = self.bar_layout(presentation, orientation);
        self.write_figure(presentation.title, data, layout)
    }

    fn frame_plot(
        &mut self,
        view: &DataFrame,
        kind: FrameKind,
        presentation: &Presentation<'_>,
    ) -> RenderResult<()> {
        match kind {
            FrameKind::Bar => self.categorical_bar(view, Orientation::Vertical, presentation),
            FrameKind::BarH => self.categorical_bar(view, Orientation::Horizontal, presentation),
            FrameKind::Hist => {
                let (_, value) = key_and_value(view)?;
                let values = f64_values(view, &value)?;
                non_empty(presentation.title, values.len())?;
                let data = json!([{
                    "type": "histogram",
                    "x": values,
                    "nbinsx": self.config.histogram.bins,
                    "opacity": self.config.histogram.opacity,
                    "marker": { "color": self.config.colour(0) },
                }]);
                let layout = self.layout(presentation);
                self.write_figure(presentation.title, data, layout)
            }
        }
    }

    fn scatter(
        &mut self,
        x: &[f64],
        y: &[f64],
        presentation: &Presentation<'_>,
    ) -> RenderResult<()> {
        non_empty(presentation.title, x.len())?;
        same_length(presentation.title, x.len(), y.len())?;
        let data = json!([{
            "type": "scatter",
            "mode": "markers",
            "x": x,
            "y": y,
            "marker": {
                "size": self.config.scatter.marker_size,
                "opacity": self.config.scatter.opacity,
                "color": self.config.colour(0),
            },
        }]);
        let layout = self.layout(presentation);
        self.write_figure(presentation.title, data, layout)
    }

    fn value_bar(
        &mut self,
        values: &[f64],
        labels: &[String],
        presentation: &Presentation<'_>,
    ) -> RenderResult<()> {
        non_empty(presentation.title, values.len())?;
        same_length(presentation.title, values.len(), labels.len())?;
        let data = self.bar_trace(labels, values, Orientation::Horizontal);
        let layout = self.bar_layout(presentation, Orientation::Horizontal);
        self.write_figure(presentation.title, data, layout)
    }
}
