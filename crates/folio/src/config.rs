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

//! Report and chart styling configuration.
//!
//! Everything here is plain data handed to the runner and the renderer at
//! construction time. A YAML file may override any subset of fields; missing
//! fields keep their defaults.

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_SEPARATOR_WIDTH: usize = 150;
pub const DEFAULT_PLOTLY_SRC: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Width of the `=` rule printed around every console section.
    pub separator_width: usize,
    /// Directory the renderer writes chart pages into.
    pub output_dir: PathBuf,
    /// Step ids to run; empty runs every step.
    pub steps: Vec<String>,
    pub renderer: RendererConfig,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            separator_width: DEFAULT_SEPARATOR_WIDTH,
            output_dir: PathBuf::from("reports"),
            steps: Vec::new(),
            renderer: RendererConfig::default(),
        }
    }
}

impl ReportConfig {
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|source| ConfigError::ReadFailed {
                path: path.as_ref().to_path_buf(),
                source,
            })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(yaml_content: &str) -> ConfigResult<Self> {
        let config: ReportConfig = serde_yaml::from_str(yaml_content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.separator_width == 0 {
            return Err(ConfigError::OutOfRange {
                field: "separator_width",
                value: self.separator_width.to_string(),
            });
        }
        self.renderer.validate()
    }
}

/// Styling shared by every chart plus one section per chart kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub width: u32,
    pub height: u32,
    pub font_family: String,
    pub font_size: u32,
    /// Page and plot area background colour.
    pub background: String,
    /// Script URL embedded in every chart page.
    pub plotly_src: String,
    pub palette: Vec<String>,
    pub histogram: HistogramStyle,
    pub density: DensityStyle,
    pub heatmap: HeatmapStyle,
    pub pie: PieStyle,
    pub bar: BarStyle,
    pub scatter: ScatterStyle,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 700,
            font_family: "Helvetica, Arial, sans-serif".to_string(),
            font_size: 14,
            background: "#ffffff".to_string(),
            plotly_src: DEFAULT_PLOTLY_SRC.to_string(),
            palette: vec![
                "#4C72B0".to_string(),
                "#DD8452".to_string(),
                "#55A868".to_string(),
                "#C44E52".to_string(),
                "#8172B3".to_string(),
                "#937860".to_string(),
                "#DA8BC3".to_string(),
                "#8C8C8C".to_string(),
                "#CCB974".to_string(),
                "#64B5CD".to_string(),
            ],
            histogram: HistogramStyle::default(),
            density: DensityStyle::default(),
            heatmap: HeatmapStyle::default(),
            pie: PieStyle::default(),
            bar: BarStyle::default(),
            scatter: ScatterStyle::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistogramStyle {
    /// Bin count used when a request does not name one.
    pub bins: usize,
    pub opacity: f64,
}

impl Default for HistogramStyle {
    fn default() -> Self {
        Self {
            bins: 10,
            opacity: 0.85,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DensityStyle {
    /// Number of evaluation points along the x axis.
    pub grid_points: usize,
    /// Kernel support beyond the data range, in bandwidths.
    pub cut: f64,
    pub fill: bool,
}

impl Default for DensityStyle {
    fn default() -> Self {
        Self {
            grid_points: 200,
            cut: 3.0,
            fill: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapStyle {
    pub colorscale: String,
    pub show_values: bool,
}

impl Default for HeatmapStyle {
    fn default() -> Self {
        Self {
            colorscale: "RdBu".to_string(),
            show_values: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LegendAnchor {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PieStyle {
    /// Legend position used when a request does not carry its own.
    pub legend_anchor: LegendAnchor,
    pub text_info: String,
    pub hole: f64,
}

impl Default for PieStyle {
    fn default() -> Self {
        Self {
            legend_anchor: LegendAnchor { x: 1.0, y: 1.2 },
            text_info: "percent".to_string(),
            hole: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarStyle {
    pub bar_gap: f64,
    /// Largest bar at the top of horizontal charts.
    pub largest_first: bool,
}

impl Default for BarStyle {
    fn default() -> Self {
        Self {
            bar_gap: 0.2,
            largest_first: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScatterStyle {
    pub marker_size: f64,
    pub opacity: f64,
}

impl Default for ScatterStyle {
    fn default() -> Self {
        Self {
            marker_size: 8.0,
            opacity: 0.6,
        }
    }
}

impl RendererConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::OutOfRange {
                field: "renderer.width/height",
                value: format!("{}x{}", self.width, self.height),
            });
        }
        if self.font_size == 0 {
            return Err(ConfigError::OutOfRange {
                field: "renderer.font_size",
                value: self.font_size.to_string(),
            });
        }
        if self.histogram.bins == 0 {
            return Err(ConfigError::OutOfRange {
                field: "renderer.histogram.bins",
                value: self.histogram.bins.to_string(),
            });
        }
        if self.density.grid_points < 2 {
            return Err(ConfigError::OutOfRange {
                field: "renderer.density.grid_points",
                value: self.density.grid_points.to_string(),
            });
        }
        if !(0.0..1.0).contains(&self.pie.hole) {
            return Err(ConfigError::OutOfRange {
                field: "renderer.pie.hole",
                value: self.pie.hole.to_string(),
            });
        }
        for (field, value) in [
            ("renderer.histogram.opacity", self.histogram.opacity),
            ("renderer.scatter.opacity", self.scatter.opacity),
            ("renderer.bar.bar_gap", self.bar.bar_gap),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfRange {
                    field,
                    value: value.to_string(),
                });
            }
        }
        if self.palette.is_empty() {
            return Err(ConfigError::OutOfRange {
                field: "renderer.palette",
                value: "[]".to_string(),
            });
        }
        Ok(())
    }

    /// Larger pages and markers for slides and print.
    pub fn for_print() -> Self {
        Self {
            width: 1600,
            height: 1000,
            font_size: 18,
            scatter: ScatterStyle {
                marker_size: 10.0,
                opacity: 0.8,
            },
            ..Default::default()
        }
    }

    pub fn for_screen() -> Self {
        Self {
            width: 960,
            height: 600,
            density: DensityStyle {
                grid_points: 120,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn colour(&self, index: usize) -> &str {
        self.palette
            .get(index % self.palette.len().max(1))
            .map_or("#4C72B0", String::as_str)
    }
}
