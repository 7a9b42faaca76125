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

use crate::error::{DataError, DataResult, Result};
use crate::schema::{CatalogTable, RatingTable, SourceTables};
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;

/// Supplies the two source tables of a report run.
pub trait FeatureSource {
    fn load(&self) -> Result<SourceTables>;
}

/// Reads the catalog and rating tables from CSV files with headers.
#[derive(Debug, Clone)]
pub struct CsvFeatureSource {
    catalog_path: PathBuf,
    ratings_path: PathBuf,
}

impl CsvFeatureSource {
    pub fn new(catalog_path: impl Into<PathBuf>, ratings_path: impl Into<PathBuf>) -> Self {
        Self {
            catalog_path: catalog_path.into(),
            ratings_path: ratings_path.into(),
        }
    }

    fn read_csv(path: &Path) -> DataResult<DataFrame> {
        let file = File::open(path).map_err(|e| DataError::ReadFailed {
            path: path.to_path_buf(),
            source: PolarsError::from(e),
        })?;
        CsvReader::new(file)
            .finish()
            .map_err(|source| DataError::ReadFailed {
                path: path.to_path_buf(),
                source,
            })
    }
}

impl FeatureSource for CsvFeatureSource {
    fn load(&self) -> Result<SourceTables> {
        let catalog = CatalogTable::try_from_frame(&Self::read_csv(&self.catalog_path)?)?;
        let ratings = RatingTable::try_from_frame(&Self::read_csv(&self.ratings_path)?)?;
        info!(
            catalog = %self.catalog_path.display(),
            catalog_rows = catalog.height(),
            ratings = %self.ratings_path.display(),
            rating_rows = ratings.height(),
            "source tables loaded"
        );
        Ok(SourceTables::new(catalog, ratings))
    }
}

/// Hands out clones of tables that were built elsewhere.
#[derive(Debug, Clone)]
pub struct InMemorySource {
    tables: SourceTables,
}

impl InMemorySource {
    pub fn new(tables: SourceTables) -> Self {
        Self { tables }
    }
}

impl FeatureSource for InMemorySource {
    fn load(&self) -> Result<SourceTables> {
        Ok(self.tables.clone())
    }
}
