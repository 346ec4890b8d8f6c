//! Configuration settings for language-learning.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Prefix for environment variable overrides (`LL_OPENAI_API_KEY`, ...).
pub const ENV_PREFIX: &str = "LL_";

/// Environment variable naming a story JSON file to use instead of generating one.
pub const LOAD_STORY_FILE_ENV: &str = "LOAD_STORY_FILE";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub lingq: LingqSettings,
    pub openai: OpenAISettings,
    pub tts: TtsSettings,
    pub story: StorySettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Directory the output.* artifacts are written to.
    pub output_dir: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            output_dir: ".".to_string(),
        }
    }
}

/// LingQ account and API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LingqSettings {
    /// API key from https://www.lingq.com/en/accounts/apikey/
    pub api_key: Option<String>,
    /// Root of the v3 API.
    pub base_url: String,
    /// Language code of the course (e.g. "es").
    pub language: String,
    /// Path of the local vocabulary cache.
    pub database_path: String,
    /// Minutes before the cache is considered stale.
    pub cache_ttl_minutes: i64,
    /// Cards requested per page.
    pub page_size: u32,
    /// Raw card statuses to request.
    pub statuses: Vec<u8>,
    /// Collection (course) imported lessons are added to.
    pub collection: String,
    /// Tags attached to imported lessons.
    pub tags: String,
}

impl Default for LingqSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://www.lingq.com/api/v3".to_string(),
            language: "es".to_string(),
            database_path: "lingq-data.json".to_string(),
            cache_ttl_minutes: crate::vocabulary::DEFAULT_MAX_AGE_MINUTES,
            page_size: 200,
            statuses: vec![2, 3, 4],
            collection: "1467506".to_string(),
            tags: "gpt".to_string(),
        }
    }
}

/// OpenAI story and thumbnail generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAISettings {
    /// API key; falls back to `OPENAI_API_KEY` when unset.
    pub api_key: Option<String>,
    /// Chat model used for story generation.
    pub chat_model: Option<String>,
    /// Image model used for thumbnails.
    pub image_model: String,
    /// Approximate story length in words.
    pub story_length: u32,
    /// Lowest familiarity level included in the story prompt (1-5).
    pub min_familiarity: u8,
    /// Style and audience instructions placed at the top of the system prompt.
    pub story_instructions: String,
    /// User message asking for the story.
    pub story_prompt: String,
    /// Heading placed before the comprehension questions.
    pub questions_heading: String,
}

impl Default for OpenAISettings {
    fn default() -> Self {
        Self {
            api_key: None,
            chat_model: None,
            image_model: "dall-e-3".to_string(),
            story_length: 500,
            min_familiarity: 3,
            story_instructions: "You are a Spanish teacher writing short stories for an \
                intermediate student. Write the story in Spanish, using mostly words from \
                the student's vocabulary list."
                .to_string(),
            story_prompt: "Please write me a new story.".to_string(),
            questions_heading: "Preguntas:".to_string(),
        }
    }
}

/// Google Cloud Text-to-Speech settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsSettings {
    /// Google Cloud API key with Text-to-Speech enabled.
    pub api_key: Option<String>,
    /// API root.
    pub endpoint: String,
    /// BCP-47 language code of the voices.
    pub language_code: String,
    /// Voices to pick from at random for each lesson.
    pub voices: Vec<String>,
    /// Speaking rate (1.0 is normal speed).
    pub speaking_rate: f64,
}

impl Default for TtsSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: "https://texttospeech.googleapis.com".to_string(),
            language_code: "es-US".to_string(),
            voices: vec![
                "es-US-Studio-B".to_string(),
                "es-US-Neural2-A".to_string(),
                "es-US-Neural2-B".to_string(),
                "es-US-Neural2-C".to_string(),
            ],
            speaking_rate: 0.8,
        }
    }
}

/// Story source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct StorySettings {
    /// Load the story from this JSON file instead of generating one.
    pub load_from: Option<String>,
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
}

impl Settings {
    /// Load settings from the default configuration file, then apply
    /// environment overrides.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or the default location if None,
    /// then apply environment overrides.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let mut settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else if path.is_some() {
            return Err(crate::error::LearningError::Config(format!(
                "Config file not found: {}",
                config_path.display()
            )));
        } else {
            Settings::default()
        };

        settings.apply_env(|key| std::env::var(key).ok());
        Ok(settings)
    }

    /// Apply environment overrides using `lookup` to read variables.
    ///
    /// Keys are the dotted setting path upper-cased with `.` replaced by `_`
    /// and prefixed with [`ENV_PREFIX`], e.g. `LL_LINGQ_API_KEY`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(&format!("{}{}", ENV_PREFIX, key)).filter(|v| !v.is_empty())
        };

        if let Some(v) = get("LOG_LEVEL") {
            self.general.log_level = v;
        }
        if let Some(v) = get("GENERAL_OUTPUT_DIR") {
            self.general.output_dir = v;
        }
        if let Some(v) = get("LINGQ_API_KEY") {
            self.lingq.api_key = Some(v);
        }
        if let Some(v) = get("LINGQ_BASE_URL") {
            self.lingq.base_url = v;
        }
        if let Some(v) = get("LINGQ_LANGUAGE") {
            self.lingq.language = v;
        }
        if let Some(v) = get("LINGQ_DATABASE_PATH") {
            self.lingq.database_path = v;
        }
        if let Some(v) = get("LINGQ_COLLECTION") {
            self.lingq.collection = v;
        }
        if let Some(v) = get("OPENAI_API_KEY") {
            self.openai.api_key = Some(v);
        } else if self.openai.api_key.is_none() {
            self.openai.api_key = lookup("OPENAI_API_KEY").filter(|v| !v.is_empty());
        }
        if let Some(v) = get("OPENAI_CHAT_MODEL") {
            self.openai.chat_model = Some(v);
        }
        if let Some(v) = get("OPENAI_STORY_LENGTH").and_then(|v| v.parse().ok()) {
            self.openai.story_length = v;
        }
        if let Some(v) = get("OPENAI_STORY_INSTRUCTIONS") {
            self.openai.story_instructions = v;
        }
        if let Some(v) = get("OPENAI_STORY_PROMPT") {
            self.openai.story_prompt = v;
        }
        if let Some(v) = get("TTS_API_KEY") {
            self.tts.api_key = Some(v);
        }
        if let Some(v) = lookup(LOAD_STORY_FILE_ENV).filter(|v| !v.is_empty()) {
            self.story.load_from = Some(v);
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::LearningError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path: `./config.toml` if present,
    /// otherwise the per-user config directory.
    pub fn default_config_path() -> PathBuf {
        let local = PathBuf::from("config.toml");
        if local.exists() {
            return local;
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("language-learning")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded output directory path.
    pub fn output_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.output_dir)
    }

    /// Get the expanded vocabulary cache path.
    pub fn database_path(&self) -> PathBuf {
        Self::expand_path(&self.lingq.database_path)
    }

    /// Maximum age of the vocabulary cache.
    pub fn cache_max_age(&self) -> crate::error::Result<chrono::Duration> {
        chrono::Duration::try_minutes(self.lingq.cache_ttl_minutes).ok_or_else(|| {
            crate::error::LearningError::Config(format!(
                "lingq.cache_ttl_minutes is out of range: {}",
                self.lingq.cache_ttl_minutes
            ))
        })
    }

    /// Dotted names of required settings that are missing.
    pub fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(&self.lingq.api_key) {
            missing.push("lingq.api_key");
        }
        if is_blank(&self.openai.api_key) {
            missing.push("openai.api_key");
        }
        if is_blank(&self.openai.chat_model) {
            missing.push("openai.chat_model");
        }
        if is_blank(&self.tts.api_key) {
            missing.push("tts.api_key");
        }
        missing
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}
