use crate::{ArticleRecord, Result};
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Writes the records to `path` as a pretty-printed JSON array.
///
/// Non-ASCII text is written as-is in UTF-8. Missing parent directories are created and an
/// existing file is replaced. Any failure here is returned to the caller.
#[instrument(level = "info", skip(records, path), fields(path = %path.as_ref().display(), count = records.len()))]
pub async fn save_to_json(records: &[ArticleRecord], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(records)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    fs::write(path, json).await?;
    info!("Results saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScraperError;

    fn records() -> Vec<ArticleRecord> {
        vec![
            ArticleRecord {
                title: "سد النهضة: جولة مفاوضات جديدة".to_string(),
                url: "https://www.almasryalyoum.com/news/details/1".to_string(),
                time: "منذ ساعتين".to_string(),
                image: Some("https://img.almasryalyoum.com/1.jpg".to_string()),
            },
            ArticleRecord {
                title: "Second".to_string(),
                url: "https://www.almasryalyoum.com/news/details/2".to_string(),
                time: "10:30".to_string(),
                image: None,
            },
        ]
    }

    /// Tests that saved records read back unchanged, with text kept unescaped.
    #[tokio::test]
    async fn test_round_trip_preserves_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("response").join("results.json");

        save_to_json(&records(), &path).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("سد النهضة"));
        assert!(written.contains("\n  {\n    \"title\""));
        assert!(written.contains("\"image\": null"));

        let parsed: Vec<ArticleRecord> = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, records());
    }

    /// Tests that an existing file is replaced.
    #[tokio::test]
    async fn test_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        std::fs::write(&path, "stale contents that are much longer than an empty array").unwrap();

        save_to_json(&[], &path).await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
    }

    /// Tests that a write failure is returned rather than swallowed.
    #[tokio::test]
    async fn test_write_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();

        let err = save_to_json(&records(), dir.path()).await.unwrap_err();

        assert!(matches!(err, ScraperError::IoError(_)));
    }
}
