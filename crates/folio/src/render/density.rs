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

//! Gaussian kernel density estimate for the density charts.

use std::f64::consts::PI;

#[derive(Debug, Clone, PartialEq)]
pub struct DensityCurve {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub bandwidth: f64,
}

/// Scott's rule: `std * n^(-1/5)`, with the sample standard deviation.
/// Falls back to 1.0 when the sample has no spread.
pub fn scott_bandwidth(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    if values.len() < 2 {
        return 1.0;
    }
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let std = variance.sqrt();
    if std > 1e-12 {
        std * n.powf(-0.2)
    } else {
        1.0
    }
}

/// Evaluates the estimate on `grid_points` evenly spaced points spanning the
/// data range widened by `cut` bandwidths on each side. Non-finite inputs are
/// ignored; `None` when nothing finite remains.
pub fn gaussian_kde(values: &[f64], grid_points: usize, cut: f64) -> Option<DensityCurve> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || grid_points < 2 {
        return None;
    }
    let bandwidth = scott_bandwidth(&finite);
    let (min, max) = finite
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let start = min - cut * bandwidth;
    let step = ((max + cut * bandwidth) - start) / (grid_points - 1) as f64;
    let norm = 1.0 / (finite.len() as f64 * bandwidth * (2.0 * PI).sqrt());

    let x: Vec<f64> = (0..grid_points).map(|i| start + step * i as f64).collect();
    let y = x
        .iter()
        .map(|&point| {
            finite
                .iter()
                .map(|&v| {
                    let z = (point - v) / bandwidth;
                    (-0.5 * z * z).exp()
                })
                .sum::<f64>()
                * norm
        })
        .collect();
    Some(DensityCurve { x, y, bandwidth })
}
