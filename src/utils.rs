//! Small helpers shared across modules.
//!
//! - String truncation for log fields
//! - Output-path validation before the file sink writes

use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` characters with an ellipsis and a count of
/// the omitted bytes appended. Cuts always land on a character boundary, so
/// non-ASCII titles are safe to log.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// Ensure the directory that will hold `path` exists.
///
/// A bare file name (no parent component) refers to the working directory
/// and needs nothing created.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub async fn ensure_parent_dir(path: &Path) -> Result<(), Box<dyn Error>> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).await?;
            info!(dir = %parent.display(), "Output directory ready");
            Ok(())
        }
        _ => Ok(()),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_multibyte() {
        let s = "深度学习入门教程";
        let result = truncate_for_log(s, 2);
        assert!(result.starts_with("深度…"));
        assert!(result.contains("(+18 bytes)"));
    }

    #[tokio::test]
    async fn test_ensure_parent_dir_creates_nested_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out/nested/items.json");
        ensure_parent_dir(&target).await.unwrap();
        assert!(dir.path().join("out/nested").is_dir());
    }

    #[test]
    fn test_captured_logs_split_by_level() {
        let logs = testing::CapturedLogs::default();
        {
            let _guard = logs.install();
            tracing::info!("kept going");
            tracing::error!(source = "feed-a", "gave up");
            tracing::debug!("below the capture level");
        }
        tracing::error!("after the guard dropped");

        assert_eq!(logs.lines().len(), 2);
        let errors = logs.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("gave up"));
        assert!(errors[0].contains("feed-a"));
    }

    #[tokio::test]
    async fn test_ensure_parent_dir_bare_file_name() {
        ensure_parent_dir(Path::new("aggregated_data.json")).await.unwrap();
    }
}
