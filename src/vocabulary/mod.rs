//! Learner vocabulary: raw terms, decoded words, and the local word cache.

mod cache;
mod status;

pub use cache::{WordDatabase, DEFAULT_MAX_AGE_MINUTES};
pub use status::{decode_status, FamiliarityLevel};

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// A term as reported by the vocabulary service, before decoding.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VocabularyTerm {
    pub term: String,
    #[serde(rename = "status")]
    pub raw_status: i64,
    #[serde(rename = "extended_status", default)]
    pub raw_extended_status: Option<i64>,
}

impl VocabularyTerm {
    /// Decode into a [`Word`], dropping the raw status fields.
    pub fn decode(&self) -> Word {
        Word {
            term: self.term.clone(),
            status: decode_status(self.raw_status, self.raw_extended_status),
        }
    }
}

/// A decoded term, as stored in the cache and fed to story generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Word {
    pub term: String,
    pub status: FamiliarityLevel,
}

impl Word {
    pub fn new(term: impl Into<String>, status: FamiliarityLevel) -> Self {
        Self {
            term: term.into(),
            status,
        }
    }
}

/// One page of vocabulary plus the cursor for the next page, if any.
#[derive(Debug, Clone, Default)]
pub struct VocabularyPage {
    pub terms: Vec<VocabularyTerm>,
    pub next: Option<String>,
}

/// A paginated source of learner vocabulary.
#[async_trait]
pub trait VocabularySource: Send + Sync {
    /// Fetch one page. `None` requests the first page; otherwise pass the
    /// `next` cursor from the previous page.
    async fn fetch_page(&self, cursor: Option<&str>) -> Result<VocabularyPage>;
}

/// Fetch every page from `source` and decode the terms, in page order.
///
/// Terms whose status cannot be decoded are kept with
/// [`FamiliarityLevel::Unknown`]; story prompts never include them.
pub async fn fetch_all_words(source: &dyn VocabularySource) -> Result<Vec<Word>> {
    let mut words = Vec::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = source.fetch_page(cursor.as_deref()).await?;
        pages += 1;

        words.extend(page.terms.iter().map(VocabularyTerm::decode));

        debug!(page = pages, next = ?page.next, "Fetched vocabulary page");
        match page.next {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    let unknown = words
        .iter()
        .filter(|w| w.status == FamiliarityLevel::Unknown)
        .count();
    if unknown > 0 {
        warn!("{} terms have an unrecognized status and will be excluded from stories", unknown);
    }

    info!("Fetched {} terms across {} pages", words.len(), pages);
    Ok(words)
}

/// Where a loaded word list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordOrigin {
    Cache,
    Fetched,
}

/// Load vocabulary from `cache` when it is younger than `max_age`, otherwise
/// fetch everything from `source` and overwrite the cache.
///
/// `refresh` skips the cache lookup but still stores the fetched words.
pub async fn load_words(
    source: &dyn VocabularySource,
    cache: &WordDatabase,
    max_age: chrono::Duration,
    refresh: bool,
) -> Result<(Vec<Word>, WordOrigin)> {
    if !refresh {
        info!("Checking local database...");
        if let Some(words) = cache.fetch_if_fresh(max_age)? {
            info!(count = words.len(), "Loaded words from cache");
            return Ok((words, WordOrigin::Cache));
        }
        info!("Database not fresh, fetching new words...");
    }

    let words = fetch_all_words(source).await?;

    info!("Storing fetched words in database...");
    cache.store(&words)?;

    Ok((words, WordOrigin::Fetched))
}

/// Count words per familiarity level, including unknowns.
pub fn count_by_level(words: &[Word]) -> BTreeMap<FamiliarityLevel, usize> {
    let mut counts = BTreeMap::new();
    for word in words {
        *counts.entry(word.status).or_insert(0) += 1;
    }
    counts
}
