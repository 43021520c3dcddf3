//! Command-line interface definitions.
//!
//! All options can be provided via command-line flags or environment variables.

use crate::outputs::json::DEFAULT_OUTPUT_FILE;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the content aggregator.
///
/// # Examples
///
/// ```sh
/// # Defaults: ./config.yaml in, ./aggregated_data.json out
/// content_aggregator
///
/// # Explicit paths, no translation
/// content_aggregator -c sources.yaml -o out/items.json --no-translate
///
/// # Translate into Japanese instead of Simplified Chinese
/// content_aggregator --target-lang ja
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, env = "AGGREGATOR_CONFIG", default_value = "config.yaml")]
    pub config: PathBuf,

    /// JSON file written when the Notion sink is not used
    #[arg(short, long, env = "AGGREGATOR_OUTPUT", default_value = DEFAULT_OUTPUT_FILE)]
    pub output: PathBuf,

    /// Skip translation and keep original titles and summaries
    #[arg(long)]
    pub no_translate: bool,

    /// Target language, overriding `translation.target` from the config file
    #[arg(long, env = "AGGREGATOR_TARGET_LANG")]
    pub target_lang: Option<String>,
}
