//! Graded-reader stories built from the learner's vocabulary.

mod openai;

pub use openai::OpenAIStoryGenerator;

use crate::error::{LearningError, Result};
use crate::vocabulary::{FamiliarityLevel, Word};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// A comprehension question and its answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub question: String,
    pub answer: String,
}

/// A generated story.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub story: String,
    #[serde(default)]
    pub questions: Vec<Question>,

    /// JSON text the story was decoded from.
    #[serde(skip)]
    pub original_json: String,
    /// Base64-encoded PNG thumbnail, once generated.
    #[serde(skip)]
    pub thumbnail: Option<String>,
}

impl Story {
    /// Decode a story from the JSON object returned by the model.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut story: Story = serde_json::from_str(json)
            .map_err(|e| LearningError::Story(format!("Failed to decode story JSON: {}", e)))?;
        story.original_json = json.to_string();
        Ok(story)
    }

    /// Read a previously saved story (e.g. an earlier `output.json`).
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            LearningError::Story(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// Story body split into paragraphs on newlines.
    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        self.story.split('\n')
    }

    /// Plain-text transcript: title, paragraphs, then the questions under
    /// `questions_heading`, every block followed by a blank line.
    pub fn transcript(&self, questions_heading: &str) -> String {
        let mut result = String::new();

        result.push_str(&self.title);
        result.push_str("\n\n");
        for paragraph in self.paragraphs() {
            result.push_str(paragraph);
            result.push_str("\n\n");
        }
        result.push_str(questions_heading);
        result.push_str("\n\n");
        for question in &self.questions {
            result.push_str(&question.question);
            result.push_str("\n\n");
            result.push_str(&question.answer);
            result.push_str("\n\n");
        }

        result
    }
}

/// Trait for story generation backends.
#[async_trait]
pub trait StoryGenerator: Send + Sync {
    /// Write a story using words at or above `min_familiarity`.
    async fn create_story(&self, words: &[Word], min_familiarity: FamiliarityLevel)
        -> Result<Story>;

    /// Create a thumbnail for the story text. Returns base64-encoded PNG data.
    async fn create_image(&self, story_text: &str) -> Result<String>;
}

/// Vocabulary listing for the story prompt, grouped by level from
/// `min_familiarity` up to Known. Levels with no words are omitted.
pub fn words_by_status(words: &[Word], min_familiarity: FamiliarityLevel) -> String {
    let mut by_level: BTreeMap<FamiliarityLevel, Vec<&str>> = BTreeMap::new();
    for word in words {
        if word.status.is_known_encoding() && word.status >= min_familiarity {
            by_level.entry(word.status).or_default().push(&word.term);
        }
    }

    let mut result = String::new();
    for (level, terms) in by_level {
        result.push_str(level.description());
        result.push('\n');
        result.push_str(&terms.join(","));
        result.push_str("\n\n");
    }
    result
}

/// First `n` characters of `s`.
pub(crate) fn first_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
