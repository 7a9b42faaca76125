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

use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Data error: {0}")]
    Data(#[from] DataError),
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Report step '{step}' failed: {source}")]
    Step {
        step: String,
        #[source]
        source: Box<ReportError>,
    },
}

#[derive(Error, Debug)]
pub enum DataError {
    #[error("Failed to read table file '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },
    #[error("Table '{table}' is missing required column '{column}'")]
    MissingColumn { table: &'static str, column: String },
    #[error("Column '{column}' in table '{table}' is not convertible to {expected}: {source}")]
    TypeMismatch {
        table: &'static str,
        column: String,
        expected: &'static str,
        #[source]
        source: PolarsError,
    },
    #[error("Table '{table}' has no rows")]
    EmptyTable { table: &'static str },
    #[error("Column '{column}' not found in derived view")]
    ViewColumnNotFound { column: String },
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Chart '{chart}' received no data")]
    EmptyData { chart: String },
    #[error("Chart '{chart}' received sequences of different lengths: {left} vs {right}")]
    LengthMismatch {
        chart: String,
        left: usize,
        right: usize,
    },
    #[error("Chart '{chart}' cannot be drawn from this frame: {reason}")]
    InvalidFrame { chart: String, reason: String },
    #[error("Failed to write chart '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Chart data error: {0}")]
    View(#[from] DataError),
    #[error("Figure serialisation failed: {0}")]
    Serialisation(#[from] serde_json::Error),
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse configuration YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {field} = {value}")]
    OutOfRange { field: &'static str, value: String },
    #[error("Unknown report step: '{id}'")]
    UnknownStep { id: String },
}

pub type Result<T> = std::result::Result<T, ReportError>;
pub type DataResult<T> = std::result::Result<T, DataError>;
pub type RenderResult<T> = std::result::Result<T, RenderError>;
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

impl From<PolarsError> for ReportError {
    fn from(err: PolarsError) -> Self {
        ReportError::Data(DataError::Polars(err))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl ErrorSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorSeverity::Info => "INFO",
            ErrorSeverity::Warning => "WARNING",
            ErrorSeverity::Error => "ERROR",
            ErrorSeverity::Critical => "CRITICAL",
        }
    }
}

impl ReportError {
    pub fn wrap_step(step: &str, error: ReportError) -> Self {
        ReportError::Step {
            step: step.to_string(),
            source: Box::new(error),
        }
    }

    /// Missing inputs or an unreadable configuration stop the run before any
    /// step executes; everything else fails a single step.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ReportError::Data(DataError::ReadFailed { .. })
            | ReportError::Data(DataError::MissingColumn { .. })
            | ReportError::Data(DataError::EmptyTable { .. }) => ErrorSeverity::Critical,
            ReportError::Config(_) => ErrorSeverity::Critical,
            ReportError::Render(RenderError::EmptyData { .. }) => ErrorSeverity::Warning,
            ReportError::Step { source, .. } => source.severity(),
            _ => ErrorSeverity::Error,
        }
    }

    pub fn step(&self) -> Option<&str> {
        match self {
            ReportError::Step { step, .. } => Some(step),
            _ => None,
        }
    }
}
