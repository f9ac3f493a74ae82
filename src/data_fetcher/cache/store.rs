//! On-disk layout of the player name cache.
//!
//! The whole cache (names plus bootstrap cursor) is one JSON document that
//! is replaced via temp file + rename, so a crash can never persist an
//! advanced cursor without the names it covers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

use crate::constants::bootstrap::CACHE_FORMAT_VERSION;
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: i64,
    pub name: String,
    pub fetched_at: DateTime<Utc>,
}

/// Progress of the paced top-N sweep
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BootstrapState {
    /// Index into `ranked_ids` of the next player to process
    pub cursor: u32,
    pub total_target: u32,
    pub in_progress: bool,
    /// Money-ranked ids of the running sweep, fixed when the sweep starts
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ranked_ids: Vec<i64>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    /// Completion time of the most recent full sweep
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl BootstrapState {
    /// At least one sweep has reached its target
    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }

    /// A completed, idle sweep older than `refresh_after` should be redone
    pub fn needs_refresh(&self, now: DateTime<Utc>, refresh_after: chrono::Duration) -> bool {
        !self.in_progress
            && self
                .completed_at
                .is_some_and(|completed| now - completed >= refresh_after)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheDocument {
    pub version: u32,
    #[serde(default)]
    pub players: BTreeMap<i64, PlayerRecord>,
    #[serde(default)]
    pub bootstrap: BootstrapState,
}

impl Default for CacheDocument {
    fn default() -> Self {
        Self {
            version: CACHE_FORMAT_VERSION,
            players: BTreeMap::new(),
            bootstrap: BootstrapState::default(),
        }
    }
}

/// Reads the cache document. A missing file yields an empty cache; an
/// unreadable one is logged and replaced by an empty cache on the next write.
pub async fn load_document(path: &Path) -> Result<CacheDocument, AppError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No player cache at {}, starting empty", path.display());
            return Ok(CacheDocument::default());
        }
        Err(e) => return Err(e.into()),
    };

    match serde_json::from_str::<CacheDocument>(&content) {
        Ok(document) => {
            debug!(
                players = document.players.len(),
                cursor = document.bootstrap.cursor,
                "Loaded player cache from {}",
                path.display()
            );
            Ok(document)
        }
        Err(e) => {
            warn!(
                "Player cache at {} is unreadable ({e}), starting empty",
                path.display()
            );
            Ok(CacheDocument::default())
        }
    }
}

/// Persists the document atomically.
pub async fn save_document(path: &Path, document: &CacheDocument) -> Result<(), AppError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    let tmp = path.with_extension("json.tmp");
    let body = serde_json::to_string_pretty(document)?;
    tokio::fs::write(&tmp, body).await?;
    tokio::fs::rename(&tmp, path).await.map_err(|e| {
        AppError::cache_error(format!(
            "Failed to move {} into place: {e}",
            tmp.display()
        ))
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn record(id: i64, name: &str) -> PlayerRecord {
        PlayerRecord {
            id,
            name: name.to_string(),
            fetched_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_cache() {
        let dir = tempdir().unwrap();
        let doc = load_document(&dir.path().join("absent.json")).await.unwrap();
        assert_eq!(doc, CacheDocument::default());
    }

    #[tokio::test]
    async fn test_save_and_load_preserves_records_and_cursor() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache").join("players.json");

        let mut doc = CacheDocument::default();
        doc.players.insert(5, record(5, "Ronnie O'Sullivan"));
        doc.players.insert(12, record(12, "Judd Trump"));
        doc.bootstrap = BootstrapState {
            cursor: 2,
            total_target: 100,
            in_progress: true,
            ranked_ids: vec![12, 5, 44],
            started_at: Some(Utc.with_ymd_and_hms(2024, 5, 1, 11, 0, 0).unwrap()),
            completed_at: None,
        };

        save_document(&path, &doc).await.unwrap();
        assert!(!path.with_extension("json.tmp").exists());

        let loaded = load_document(&path).await.unwrap();
        assert_eq!(loaded, doc);
    }

    #[tokio::test]
    async fn test_corrupt_file_starts_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("players.json");
        tokio::fs::write(&path, "{not json").await.unwrap();

        let doc = load_document(&path).await.unwrap();
        assert!(doc.players.is_empty());
    }

    #[test]
    fn test_needs_refresh() {
        let completed = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let state = BootstrapState {
            cursor: 100,
            total_target: 100,
            in_progress: false,
            ranked_ids: Vec::new(),
            started_at: None,
            completed_at: Some(completed),
        };
        let month = chrono::Duration::days(30);
        assert!(!state.needs_refresh(completed + chrono::Duration::days(29), month));
        assert!(state.needs_refresh(completed + chrono::Duration::days(30), month));

        let running = BootstrapState {
            in_progress: true,
            ..state
        };
        assert!(!running.needs_refresh(completed + chrono::Duration::days(60), month));
        assert!(!BootstrapState::default().needs_refresh(completed, month));
    }
}
