use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod analytics;
mod cli;
mod converter;
mod engine;
mod errors;
mod models;
mod report_writer;
mod store;
mod traits;

use cli::{Action, Args, OutputFormat};
use engine::Engine;
use report_writer::{CsvReportWriter, JsonReportWriter};
use store::JsonFileStore;

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() -> Result<()> {
    let config = Args::parse().into_config()?;
    init_logging(&config.log_level);

    match config.action {
        Action::Convert { input, output } => {
            converter::convert_file(&input, &output)?;
        }
        Action::Query(query) => {
            let source = JsonFileStore::new(&config.data_path);
            info!(path = %source.path().display(), ?query, "querying sales store");

            match config.format {
                OutputFormat::Csv => {
                    Engine::new(CsvReportWriter::stdout(), source).run(&query)?;
                }
                OutputFormat::Json => {
                    Engine::new(JsonReportWriter::stdout(), source).run(&query)?;
                }
            }
        }
    }

    Ok(())
}
