//! # Content Aggregator
//!
//! A single-pass batch job that gathers articles, tweets and blog posts from
//! heterogeneous sources, normalizes them into one record shape, classifies
//! and translates them, and hands the result to one sink.
//!
//! ## Usage
//!
//! ```sh
//! content_aggregator -c config.yaml -o aggregated_data.json
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Configuration**: load `config.yaml` once (the only fatal failure)
//! 2. **Collection**: feeds, then APIs, then scraped pages, one source at a time
//! 3. **Normalization**: clean text, normalize dates, translate, classify
//! 4. **Delivery**: push each item to Notion, or write one JSON file

use clap::Parser;
use std::error::Error;
use std::time::Instant;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod aggregator;
mod classify;
mod cli;
mod config;
mod dates;
mod models;
mod outputs;
mod sources;
mod text;
mod translate;
mod utils;

use cli::Cli;
use outputs::Delivery;
use translate::{ConfiguredTranslator, GoogleTranslator, Passthrough};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = Instant::now();
    info!("content_aggregator starting up");

    let args = Cli::parse();
    debug!(?args.config, ?args.output, no_translate = args.no_translate, "Parsed CLI arguments");

    // ---- Configuration: the only failure allowed to stop the run ----
    let config = match config::load_config(&args.config).await {
        Ok(config) => config,
        Err(e) => {
            error!(path = %args.config.display(), error = %e, "Failed to load configuration");
            return Err(e);
        }
    };

    let client = reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let translator = if args.no_translate || !config.translation.enable {
        info!("Translation disabled");
        ConfiguredTranslator::Passthrough(Passthrough)
    } else {
        let target = args
            .target_lang
            .clone()
            .unwrap_or_else(|| config.translation.target.clone());
        info!(%target, "Translating titles and summaries");
        ConfiguredTranslator::Google(GoogleTranslator::new(client.clone(), target))
    };

    // ---- Collect ----
    let report = aggregator::collect_items(&config, &client, &translator).await;

    // ---- Deliver ----
    match outputs::deliver(&report.items, config.notion.as_ref(), &client, &args.output).await {
        Ok(Delivery::Notion { pushed, failed }) => {
            info!(pushed, failed, "Delivered items to Notion");
        }
        Ok(Delivery::File { path, count }) => {
            info!(path = %path.display(), count, "Data saved to file");
        }
        Err(e) => {
            error!(path = %args.output.display(), error = %e, "Failed to write output file");
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        items = report.items.len(),
        failed_sources = ?report.failed_sources(),
        "Execution complete"
    );

    Ok(())
}
