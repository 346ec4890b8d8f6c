//! Local JSON cache of decoded vocabulary.
//!
//! The file holds `{"Words": [{"Term": .., "Status": ..}], "Time": ..}` and is
//! considered fresh while `now - Time` is below the maximum age.

use super::Word;
use crate::error::{LearningError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, instrument};

/// Default cache lifetime.
pub const DEFAULT_MAX_AGE_MINUTES: i64 = 60;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StorageFormat {
    words: Vec<Word>,
    time: DateTime<Utc>,
}

/// File-backed word cache.
#[derive(Debug, Clone)]
pub struct WordDatabase {
    path: PathBuf,
}

impl WordDatabase {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Overwrite the cache with `words`, stamped with the current time.
    pub fn store(&self, words: &[Word]) -> Result<()> {
        self.store_at(words, Utc::now())
    }

    /// Overwrite the cache with `words`, stamped with `time`.
    #[instrument(skip(self, words), fields(path = %self.path.display(), count = words.len()))]
    pub fn store_at(&self, words: &[Word], time: DateTime<Utc>) -> Result<()> {
        let data = StorageFormat {
            words: words.to_vec(),
            time,
        };
        let json = serde_json::to_string(&data)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, json).map_err(|e| {
            LearningError::Cache(format!("Failed to write {}: {}", self.path.display(), e))
        })?;

        debug!("Stored words in cache");
        Ok(())
    }

    /// Return the cached words if they were stored less than `max_age` ago.
    ///
    /// A missing file or stale data is a cache miss (`Ok(None)`); an
    /// unreadable or malformed file is an error.
    pub fn fetch_if_fresh(&self, max_age: Duration) -> Result<Option<Vec<Word>>> {
        self.fetch_if_fresh_at(Utc::now(), max_age)
    }

    /// Same as [`fetch_if_fresh`](Self::fetch_if_fresh), evaluated at `now`.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn fetch_if_fresh_at(
        &self,
        now: DateTime<Utc>,
        max_age: Duration,
    ) -> Result<Option<Vec<Word>>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No cache file");
                return Ok(None);
            }
            Err(e) => {
                return Err(LearningError::Cache(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let stored: StorageFormat = serde_json::from_str(&content).map_err(|e| {
            LearningError::Cache(format!("Failed to parse {}: {}", self.path.display(), e))
        })?;

        let age = now.signed_duration_since(stored.time);
        if age >= max_age {
            debug!(age_minutes = age.num_minutes(), "Cache is stale");
            return Ok(None);
        }

        Ok(Some(stored.words))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary::FamiliarityLevel;

    fn sample_words() -> Vec<Word> {
        vec![
            Word::new("casa", FamiliarityLevel::Known),
            Word::new("correr", FamiliarityLevel::Familiar),
        ]
    }

    #[test]
    fn test_missing_file_is_miss() {
        let dir = tempfile::tempdir().unwrap();
        let db = WordDatabase::new(dir.path().join("missing.json"));
        assert!(db.fetch_if_fresh(Duration::minutes(60)).unwrap().is_none());
    }

    #[test]
    fn test_freshness_window() {
        let dir = tempfile::tempdir().unwrap();
        let db = WordDatabase::new(dir.path().join("lingq-data.json"));
        let stored_at = Utc::now();
        db.store_at(&sample_words(), stored_at).unwrap();

        let max_age = Duration::minutes(DEFAULT_MAX_AGE_MINUTES);
        let fresh = db
            .fetch_if_fresh_at(stored_at + Duration::minutes(59), max_age)
            .unwrap();
        assert_eq!(fresh, Some(sample_words()));

        let stale = db
            .fetch_if_fresh_at(stored_at + Duration::minutes(61), max_age)
            .unwrap();
        assert!(stale.is_none());
    }

    #[test]
    fn test_store_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let db = WordDatabase::new(dir.path().join("nested").join("cache.json"));
        db.store(&sample_words()).unwrap();
        db.store(&[Word::new("nuevo", FamiliarityLevel::New)]).unwrap();

        let words = db.fetch_if_fresh(Duration::minutes(60)).unwrap().unwrap();
        assert_eq!(words, vec![Word::new("nuevo", FamiliarityLevel::New)]);
    }

    #[test]
    fn test_reads_offset_timestamps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(
            &path,
            r#"{"Words":[{"Term":"hola","Status":5}],"Time":"2024-03-01T10:00:00.123456-07:00"}"#,
        )
        .unwrap();

        let db = WordDatabase::new(&path);
        let now: DateTime<Utc> = "2024-03-01T17:30:00Z".parse().unwrap();
        let words = db.fetch_if_fresh_at(now, Duration::minutes(60)).unwrap().unwrap();
        assert_eq!(words, vec![Word::new("hola", FamiliarityLevel::Known)]);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, "not json").unwrap();

        let db = WordDatabase::new(&path);
        assert!(matches!(
            db.fetch_if_fresh(Duration::minutes(60)),
            Err(LearningError::Cache(_))
        ));
    }
}
