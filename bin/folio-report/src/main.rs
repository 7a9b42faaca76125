// SPDX-License-Identifier: AGPL-3.0-only
// Minimal bootstrap; report logic resides in the folio library.
use anyhow::{Context, Result};
use clap::Parser;
use folio::{standard_steps, CsvFeatureSource, ReportConfig};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "folio-report",
    about = "Exploratory charts over a book catalog and its ratings"
)]
struct Cli {
    /// Catalog CSV: book_title, book_author, categories, published_year, ratings_count.
    #[arg(long, required_unless_present = "list_steps")]
    catalog: Option<PathBuf>,

    /// Ratings CSV: user_id, book_title, rating, book_price.
    #[arg(long, required_unless_present = "list_steps")]
    ratings: Option<PathBuf>,

    /// YAML file overriding report and chart defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for chart pages; overrides the configuration file.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Run only this step (repeatable).
    #[arg(long = "only", value_name = "STEP")]
    only: Vec<String>,

    /// Print the step ids and exit.
    #[arg(long)]
    list_steps: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    if cli.list_steps {
        for step in standard_steps() {
            println!("{}", step.id);
        }
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => ReportConfig::from_yaml_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => ReportConfig::default(),
    };
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }
    if !cli.only.is_empty() {
        config.steps = cli.only;
    }

    let (Some(catalog), Some(ratings)) = (cli.catalog, cli.ratings) else {
        anyhow::bail!("--catalog and --ratings are both required");
    };
    let source = CsvFeatureSource::new(catalog, ratings);
    let stdout = std::io::stdout();
    match folio::run_report(&source, &config, stdout.lock()) {
        Ok(written) => {
            info!(
                charts = written.len(),
                output_dir = %config.output_dir.display(),
                "report complete"
            );
            Ok(())
        }
        Err(err) => {
            error!(severity = err.severity().as_str(), step = err.step(), "report aborted");
            Err(err.into())
        }
    }
}
