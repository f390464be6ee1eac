#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Feedback file tooling.
//!
//! ```text
//! citypulse_feedback generate [--records 500] [--days 30] [--output path]
//! citypulse_feedback summary [--days 30]
//! ```

use std::path::PathBuf;

use chrono::Local;
use clap::{Parser, Subcommand};
use citypulse_feedback::generate::{DEFAULT_DAYS, DEFAULT_RECORDS, generate};
use citypulse_feedback::{feedback_path, load, write_records};

#[derive(Parser)]
#[command(name = "citypulse_feedback", about = "Generate and inspect citizen feedback")]
struct Cli {
    /// Feedback CSV (defaults to `$FEEDBACK_CSV` or data/feedback_synthetic.csv)
    #[arg(long, global = true)]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a synthetic feedback file
    Generate {
        /// Number of rows
        #[arg(long, default_value_t = DEFAULT_RECORDS)]
        records: usize,
        /// Spread timestamps over this many days
        #[arg(long, default_value_t = DEFAULT_DAYS)]
        days: u32,
    },
    /// Print sentiment statistics for the feedback file
    Summary {
        /// Days to look back
        #[arg(long, default_value_t = citypulse_server_models::DEFAULT_SENTIMENT_DAYS)]
        days: u32,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    let path = cli
        .file
        .unwrap_or_else(|| PathBuf::from(feedback_path(|k| std::env::var(k).ok())));
    let now = Local::now().naive_local();

    match cli.command {
        Commands::Generate { records, days } => {
            let rows = generate(&mut rand::thread_rng(), now, records, days);
            write_records(&path, &rows)?;
            log::info!("Wrote {} feedback rows to {}", rows.len(), path.display());
        }
        Commands::Summary { days } => {
            let window = load(&path, now)?.since_days(now, days);
            let summary = window.summary();
            println!(
                "{} items in the last {days} days: {}% positive, {}% neutral, {}% negative",
                summary.total, summary.positive, summary.neutral, summary.negative
            );
            for topic in window.topics() {
                println!("  {:<20} {:>3}% {}", topic.name, topic.percentage, topic.sentiment);
            }
        }
    }

    Ok(())
}
