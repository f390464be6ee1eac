#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal front end for the `CityPulse` dashboard.
//!
//! ```text
//! citypulse_dashboard snapshot [--json]
//! citypulse_dashboard sentiment [--days 7]
//! citypulse_dashboard alerts [--filter urgent]
//! citypulse_dashboard resolve <id>
//! citypulse_dashboard zones [--select <id>]
//! citypulse_dashboard reports [--location ..] [--data-type ..]
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use citypulse_dashboard::config::API_BASE_ENV;
use citypulse_dashboard::render::{
    render_alerts, render_analytics, render_overview, render_reports, render_sentiment,
    render_zones,
};
use citypulse_dashboard::views::alerts::SeverityFilter;
use citypulse_dashboard::views::reports::{DATA_TYPES, LOCATIONS, ReportFilter};
use citypulse_dashboard::{ApiClient, DashboardConfig, DashboardPage};

#[derive(Parser)]
#[command(name = "citypulse_dashboard", about = "CityPulse smart city dashboard")]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Analytics service base URL (overrides config and environment)
    #[arg(long, global = true)]
    api_base: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and print every section
    Snapshot {
        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Sentiment analysis for a time range
    Sentiment {
        /// Days to look back (7, 30 or 90)
        #[arg(long)]
        days: Option<u32>,
    },
    /// List alerts
    Alerts {
        /// Severity filter: all, urgent, warning or resolved
        #[arg(long, default_value = "all")]
        filter: SeverityFilter,
    },
    /// Resolve an alert
    Resolve {
        /// Alert ID
        id: i64,
    },
    /// Show the zone map
    Zones {
        /// Zone ID to show details for
        #[arg(long)]
        select: Option<i64>,
    },
    /// Browse the report catalog
    Reports {
        /// Location filter
        #[arg(long, default_value = LOCATIONS[0])]
        location: String,
        /// Data type filter
        #[arg(long, default_value = DATA_TYPES[0])]
        data_type: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    let mut config = DashboardConfig::load(cli.config.as_deref())?;
    if let Some(base) = cli.api_base {
        config = config.with_overrides(|key| (key == API_BASE_ENV).then(|| base.clone()))?;
    }
    log::info!("Using analytics service at {}", config.api_base);

    let client = ApiClient::from_config(&config)?;
    let page = DashboardPage::new(client, &config);

    match cli.command.unwrap_or(Commands::Snapshot { json: false }) {
        Commands::Snapshot { json } => {
            page.refresh_all().await;
            let snapshot = page.snapshot();
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
                return Ok(());
            }
            if let Some(overview) = &snapshot.overview {
                println!("{}", render_overview(overview));
            }
            if let Some(analytics) = &snapshot.analytics {
                println!("{}", render_analytics(analytics));
            }
            if let Some(zones) = &snapshot.zones {
                println!("{}", render_zones(zones));
            }
            if let Some(sentiment) = &snapshot.sentiment {
                println!("{}", render_sentiment(sentiment, snapshot.sentiment_days));
            }
            if let Some(alerts) = &snapshot.alerts {
                println!("{}", render_alerts(alerts, SeverityFilter::All));
            }
            page.with_reports(|catalog| {
                let all: Vec<_> = catalog.reports().iter().collect();
                println!("{}", render_reports(&all));
            });
        }
        Commands::Sentiment { days } => {
            if let Some(days) = days {
                if !page.set_time_range(days).await {
                    eprintln!("Unsupported time range: {days} (use 7, 30 or 90)");
                    std::process::exit(1);
                }
            } else {
                page.refresh_sentiment().await;
            }
            if let Some(sentiment) = page.snapshot().sentiment {
                print!("{}", render_sentiment(&sentiment, page.sentiment_days()));
            }
        }
        Commands::Alerts { filter } => {
            page.refresh_alerts().await;
            if let Some(alerts) = page.snapshot().alerts {
                print!("{}", render_alerts(&alerts, filter));
            }
        }
        Commands::Resolve { id } => {
            page.refresh_alerts().await;
            let alert = page.resolve_alert(id).await?;
            println!("Resolved #{}: {} ({})", alert.id, alert.title, alert.status);
        }
        Commands::Zones { select } => {
            page.refresh_zones().await;
            if let Some(zones) = page.snapshot().zones {
                print!("{}", render_zones(&zones));
            }
            if let Some(id) = select {
                match page.select_zone(id) {
                    Some(zone) => println!("\nSelected: {} ({})", zone.name, zone.priority),
                    None => {
                        eprintln!("Zone not found: {id}");
                        std::process::exit(1);
                    }
                }
            }
        }
        Commands::Reports {
            location,
            data_type,
        } => {
            let filter = ReportFilter::from_selection(&location, &data_type);
            page.with_reports(|catalog| print!("{}", render_reports(&catalog.filtered(&filter))));
        }
    }

    Ok(())
}
