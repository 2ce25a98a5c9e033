use crate::engine::Query;
use anyhow::{Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

const DEFAULT_DATA_PATH: &str = "data/data.json";

/// Retail sales analytics over a JSON sales store.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the JSON sales store
    #[arg(long, default_value = DEFAULT_DATA_PATH)]
    pub data: PathBuf,

    /// Report format written to stdout
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,

    /// Log filter (trace, debug, info, warn, error); RUST_LOG wins when set
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Total sales of the store
    Total,

    /// Sales total of a single month
    Monthly {
        #[arg(long)]
        year: i32,

        /// Month number, 1 for January
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: u32,
    },

    /// Most popular item (largest quantity in one sale) in each month
    Popular,

    /// Item generating the most revenue in each month
    Revenue,

    /// Min, max and average order quantity of an item in each month
    OrderStats {
        /// SKU to report on, matched exactly
        #[arg(long)]
        item: String,
    },

    /// Convert a comma-delimited export into the JSON sales store
    Convert {
        #[arg(long)]
        input: PathBuf,

        #[arg(long, default_value = DEFAULT_DATA_PATH)]
        output: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Csv,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Query(Query),
    Convert { input: PathBuf, output: PathBuf },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub data_path: PathBuf,
    pub format: OutputFormat,
    pub log_level: String,
    pub action: Action,
}

impl Args {
    pub fn into_config(self) -> Result<Config> {
        let action = match self.command {
            Command::Total => Action::Query(Query::Total),
            Command::Monthly { year, month } => Action::Query(Query::Monthly { year, month }),
            Command::Popular => Action::Query(Query::Popular),
            Command::Revenue => Action::Query(Query::Revenue),
            Command::OrderStats { item } => {
                if item.is_empty() {
                    bail!("--item must not be empty");
                }
                Action::Query(Query::OrderStats { item })
            }
            Command::Convert { input, output } => {
                if input == output {
                    bail!(
                        "refusing to convert {} onto itself",
                        input.display()
                    );
                }
                Action::Convert { input, output }
            }
        };

        Ok(Config {
            data_path: self.data,
            format: self.format,
            log_level: self.log_level,
            action,
        })
    }
}
