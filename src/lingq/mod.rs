//! LingQ API client.
//!
//! The v3 API is undocumented; endpoints and payloads here were observed from
//! the LingQ web app. Authentication is `Authorization: Token <api key>`, with
//! keys from https://www.lingq.com/en/accounts/apikey/.

mod cards;
mod import;

pub use import::{LessonImporter, LessonUpload};

use crate::config::LingqSettings;
use crate::error::{LearningError, Result};
use std::time::Duration;

const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Client for the LingQ v3 API, scoped to one course language.
#[derive(Clone)]
pub struct LingqClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    language: String,
    page_size: u32,
    statuses: Vec<u8>,
    collection: String,
    tags: String,
}

impl LingqClient {
    /// Create a client from settings. Fails if the API key is missing.
    pub fn new(settings: &LingqSettings) -> Result<Self> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| LearningError::Config("lingq.api_key must be set".to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            language: settings.language.clone(),
            page_size: settings.page_size,
            statuses: settings.statuses.clone(),
            collection: settings.collection.clone(),
            tags: settings.tags.clone(),
        })
    }

    /// URL of an endpoint under the course language, e.g. `cards/`.
    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.language, path)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("Authorization", format!("Token {}", self.api_key))
            .header("Accept", "application/json")
    }
}
