//! Vocab command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::lingq::LingqClient;
use crate::vocabulary::{count_by_level, load_words, FamiliarityLevel, WordDatabase, WordOrigin};
use anyhow::Result;

/// Load vocabulary (cache-aware) and print the count per familiarity level.
pub async fn run_vocab(refresh: bool, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Vocab, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let cache = WordDatabase::new(settings.database_path());
    let max_age = settings.cache_max_age()?;
    let client = LingqClient::new(&settings.lingq)?;

    let spinner = Output::spinner("Loading vocabulary...");
    let loaded = load_words(&client, &cache, max_age, refresh).await;
    spinner.finish_and_clear();

    let (words, origin) = loaded?;
    let source = match origin {
        WordOrigin::Cache => "cache",
        WordOrigin::Fetched => "LingQ",
    };

    Output::header(&format!("Vocabulary ({} words from {})", words.len(), source));
    let counts = count_by_level(&words);
    for level in FamiliarityLevel::ALL {
        let count = counts.get(&level).copied().unwrap_or(0);
        Output::level_count(level.name(), level.as_u8(), count, words.len());
    }

    let unknown = counts.get(&FamiliarityLevel::Unknown).copied().unwrap_or(0);
    if unknown > 0 {
        println!();
        Output::warning(&format!(
            "{} words have a status combination that could not be decoded; \
             they are left out of stories. Run with --refresh to log their raw statuses.",
            unknown
        ));
    }

    Ok(())
}
