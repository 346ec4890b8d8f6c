//! Paginated vocabulary fetch from the `cards` endpoint.

use super::LingqClient;
use crate::error::{LearningError, Result};
use crate::vocabulary::{VocabularyPage, VocabularySource, VocabularyTerm};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

#[derive(Debug, Deserialize)]
struct CardsResponse {
    #[serde(default)]
    count: Option<u64>,
    next: Option<String>,
    #[serde(default)]
    results: Vec<VocabularyTerm>,
}

impl LingqClient {
    /// URL of the first cards page, sorted alphabetically and filtered to the
    /// configured statuses.
    fn first_cards_url(&self) -> Result<String> {
        let mut url = Url::parse(&self.endpoint("cards/"))
            .map_err(|e| LearningError::Config(format!("Invalid lingq.base_url: {}", e)))?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("page", "1")
                .append_pair("page_size", &self.page_size.to_string())
                .append_pair("sort", "alpha");
            for status in &self.statuses {
                query.append_pair("status", &status.to_string());
            }
        }
        Ok(url.into())
    }
}

#[async_trait]
impl VocabularySource for LingqClient {
    #[instrument(skip(self))]
    async fn fetch_page(&self, cursor: Option<&str>) -> Result<VocabularyPage> {
        let url = match cursor {
            Some(next) => next.to_string(),
            None => self.first_cards_url()?,
        };

        let response = self.authorized(self.client.get(&url)).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LearningError::Vocabulary(format!(
                "LingQ returned {} for {}",
                status, url
            )));
        }

        let body: CardsResponse = serde_json::from_str(&response.text().await?)?;
        debug!(
            count = ?body.count,
            results = body.results.len(),
            next = ?body.next,
            "Cards page"
        );

        Ok(VocabularyPage {
            terms: body.results,
            next: body.next,
        })
    }
}
