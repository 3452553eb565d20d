use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::TARGET_PIPELINE;

/// Default hand-off files between the pipeline stages, in flow order.
pub const NEWS_WINDOW_FILE: &str = "trend_news_window.json";
pub const KEYWORDS_FILE: &str = "trend_keywords_output.json";
pub const BREAKPOINT_FILE: &str = "trend_breakpoint_output.json";
pub const RECOMMENDATIONS_FILE: &str = "trend_recommendations.json";

/// A fetched news item, one per (keyword, article) pair in the trailing window.
///
/// Records are produced by the article source and consumed only by the topic
/// clusterer. Fields missing from a record deserialize to empty strings rather
/// than failing the batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub translated_title: String,
    #[serde(rename = "publishedAt", default)]
    pub published_at: String,
}

/// The pipeline's central record, threaded through all three analytical stages.
///
/// The clusterer sets `cluster_id`, `keywords`, `trend_score` and `dates`;
/// downstream stages only add fields. `breakpoint_detected` and
/// `recommendation` stay absent from the serialized document until their stage
/// has run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendCluster {
    pub cluster_id: i64,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub trend_score: f64,
    #[serde(default)]
    pub dates: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakpoint_detected: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<Vec<String>>,
}

/// Loads the article window written by the fetch stage.
///
/// A missing or empty file yields an empty list; only a structurally
/// unparseable document is an error.
pub fn load_articles(path: &Path) -> Result<Vec<Article>> {
    load_document(path)
}

/// Loads a cluster document written by a prior analytical stage.
///
/// Same tolerance rules as [`load_articles`].
pub fn load_clusters(path: &Path) -> Result<Vec<TrendCluster>> {
    load_document(path)
}

fn load_document<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        warn!(target: TARGET_PIPELINE, "Input file {} does not exist, continuing with empty input", path.display());
        return Ok(Vec::new());
    }

    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    if raw.trim().is_empty() {
        warn!(target: TARGET_PIPELINE, "Input file {} is empty, continuing with empty input", path.display());
        return Ok(Vec::new());
    }

    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Writes a stage's complete output, replacing any previous document.
pub fn write_document<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let json = serde_json::to_string_pretty(records)
        .context("Failed to serialize output document")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(target: TARGET_PIPELINE, "Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("trendwatch-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_missing_file_yields_empty_list() {
        let path = scratch_path("does-not-exist.json");
        let articles = load_articles(&path).unwrap();
        assert!(articles.is_empty());
    }

    #[test]
    fn test_empty_file_yields_empty_list() {
        let path = scratch_path("empty.json");
        fs::write(&path, "").unwrap();
        let clusters = load_clusters(&path).unwrap();
        assert!(clusters.is_empty());
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_unparseable_document_is_an_error() {
        let path = scratch_path("garbage.json");
        fs::write(&path, "{not json").unwrap();
        assert!(load_articles(&path).is_err());
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_record_fields_default() {
        let path = scratch_path("partial.json");
        fs::write(&path, r#"[{"title": "Chip makers rally"}]"#).unwrap();
        let articles = load_articles(&path).unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Chip makers rally");
        assert!(articles[0].translated_title.is_empty());
        assert!(articles[0].published_at.is_empty());
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_unset_stage_fields_stay_absent() {
        let cluster = TrendCluster {
            cluster_id: 0,
            keywords: vec!["ai".to_string()],
            trend_score: 3.0,
            dates: vec!["2024-01-01".to_string()],
            breakpoint_detected: None,
            recommendation: None,
        };
        let json = serde_json::to_string(&cluster).unwrap();
        assert!(!json.contains("breakpoint_detected"));
        assert!(!json.contains("recommendation"));
    }

    #[test]
    fn test_round_trip_preserves_stage_fields() {
        let path = scratch_path("round-trip.json");
        let cluster = TrendCluster {
            cluster_id: 2,
            keywords: vec!["solar".to_string()],
            trend_score: 5.0,
            dates: vec!["2024-01-02T08:00:00Z".to_string()],
            breakpoint_detected: Some(true),
            recommendation: Some(vec!["TAN".to_string()]),
        };
        write_document(&path, std::slice::from_ref(&cluster)).unwrap();
        let loaded = load_clusters(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].cluster_id, 2);
        assert_eq!(loaded[0].breakpoint_detected, Some(true));
        assert_eq!(loaded[0].recommendation, Some(vec!["TAN".to_string()]));
        fs::remove_file(&path).unwrap();
    }
}
