//! Flat-file sink.
//!
//! Writes the whole run as one pretty-printed JSON array. Non-ASCII text
//! (translated titles and summaries) is written as-is, not `\u`-escaped.
//!
//! ```text
//! [
//!   {
//!     "source": "OpenAI Blog",
//!     "title": "...",
//!     "summary": "...",
//!     "published": "2025-05-06T14:30:00+00:00",
//!     "link": "https://...",
//!     "type": "趋势新闻"
//!   }
//! ]
//! ```

use crate::models::CanonicalItem;
use crate::utils::ensure_parent_dir;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Default output file name.
pub const DEFAULT_OUTPUT_FILE: &str = "aggregated_data.json";

/// Serialize `items` to `path`, replacing any existing file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_items(items: &[CanonicalItem], path: &Path) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(items)?;

    if let Err(e) = ensure_parent_dir(path).await {
        error!(error = %e, "Failed to create output directory");
        return Err(e);
    }

    fs::write(path, json).await?;
    info!(count = items.len(), "Data saved");
    Ok(())
}
