//! OpenAI story and thumbnail generation.

use super::{first_chars, words_by_status, Story, StoryGenerator};
use crate::config::{OpenAISettings, Prompts, StoryPrompts};
use crate::error::{LearningError, Result};
use crate::openai::create_client;
use crate::vocabulary::{FamiliarityLevel, Word};
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    CreateImageRequestArgs, FinishReason, Image, ImageModel, ImageQuality, ImageResponseFormat,
    ImageSize, ImageStyle, ResponseFormat,
};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, info, instrument};

/// Identifies this tool to OpenAI in the `user` field.
const API_USER_NAME: &str = "Language Learning";

/// Story characters sent along with the thumbnail prompt.
const THUMBNAIL_STORY_CHARS: usize = 2000;

/// Tokens allowed on top of the requested story length.
const EXTRA_TOKENS: u32 = 500;

/// Story generator backed by OpenAI chat completions and image generation.
pub struct OpenAIStoryGenerator {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    chat_model: String,
    image_model: String,
    story_length: u32,
    story_instructions: String,
    story_prompt: String,
    prompts: StoryPrompts,
}

impl OpenAIStoryGenerator {
    /// Create a generator from settings. Fails if the API key or chat model is missing.
    pub fn new(settings: &OpenAISettings, prompts: StoryPrompts) -> Result<Self> {
        let api_key = settings
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| LearningError::Config("openai.api_key must be set".to_string()))?;
        let chat_model = settings
            .chat_model
            .clone()
            .filter(|m| !m.is_empty())
            .ok_or_else(|| LearningError::Config("openai.chat_model must be set".to_string()))?;

        Ok(Self {
            client: create_client(api_key)?,
            chat_model,
            image_model: settings.image_model.clone(),
            story_length: settings.story_length,
            story_instructions: settings.story_instructions.clone(),
            story_prompt: settings.story_prompt.clone(),
            prompts,
        })
    }

    /// System message: instructions, target length, format, then the vocabulary.
    fn system_prompt(&self, words: &[Word], min_familiarity: FamiliarityLevel) -> String {
        let mut vars = HashMap::new();
        vars.insert("story_length".to_string(), self.story_length.to_string());

        format!(
            "{}\n\n{}\n\n{}{}",
            self.story_instructions,
            Prompts::render(&self.prompts.length, &vars),
            self.prompts.format,
            words_by_status(words, min_familiarity)
        )
    }

    fn thumbnail_prompt(&self, story_text: &str) -> String {
        format!(
            "{}\n{}",
            self.prompts.thumbnail,
            first_chars(story_text, THUMBNAIL_STORY_CHARS)
        )
    }

    fn image_model(&self) -> ImageModel {
        match self.image_model.as_str() {
            "dall-e-3" => ImageModel::DallE3,
            "dall-e-2" => ImageModel::DallE2,
            other => ImageModel::Other(other.to_string()),
        }
    }
}

#[async_trait]
impl StoryGenerator for OpenAIStoryGenerator {
    #[instrument(skip(self, words), fields(words = words.len(), model = %self.chat_model))]
    async fn create_story(
        &self,
        words: &[Word],
        min_familiarity: FamiliarityLevel,
    ) -> Result<Story> {
        let system_message = self.system_prompt(words, min_familiarity);
        debug!("Story system prompt: {}", system_message);

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system_message)
                .build()
                .map_err(|e| LearningError::Story(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(self.story_prompt.clone())
                .build()
                .map_err(|e| LearningError::Story(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.chat_model)
            .messages(messages)
            .max_tokens(self.story_length + EXTRA_TOKENS)
            .n(1)
            .temperature(0.7)
            .user(API_USER_NAME)
            .response_format(ResponseFormat::JsonObject)
            .build()
            .map_err(|e| LearningError::Story(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            LearningError::OpenAI(format!("Failed to generate story: {}", e))
        })?;

        let choice = response
            .choices
            .first()
            .ok_or_else(|| LearningError::Story("No choices in response".to_string()))?;

        if choice.finish_reason != Some(FinishReason::Stop) {
            return Err(LearningError::Story(format!(
                "Unexpected finish reason: {:?}",
                choice.finish_reason
            )));
        }

        let content = choice
            .message
            .content
            .as_deref()
            .ok_or_else(|| LearningError::Story("Empty response from LLM".to_string()))?;
        debug!("Story response: {}", content);

        let story = Story::from_json(content)?;
        info!(characters = story.story.chars().count(), "Generated story '{}'", story.title);
        Ok(story)
    }

    #[instrument(skip(self, story_text), fields(model = %self.image_model))]
    async fn create_image(&self, story_text: &str) -> Result<String> {
        let request = CreateImageRequestArgs::default()
            .model(self.image_model())
            .prompt(self.thumbnail_prompt(story_text))
            .n(1)
            .size(ImageSize::S1024x1024)
            .quality(ImageQuality::Standard)
            .style(ImageStyle::Vivid)
            .response_format(ImageResponseFormat::B64Json)
            .user(API_USER_NAME)
            .build()
            .map_err(|e| LearningError::Story(e.to_string()))?;

        let response = self.client.images().create(request).await.map_err(|e| {
            LearningError::OpenAI(format!("Failed to generate thumbnail: {}", e))
        })?;

        if response.data.len() != 1 {
            return Err(LearningError::Story(format!(
                "Unexpected number of images in response: {}",
                response.data.len()
            )));
        }

        let image: &Image = &response.data[0];
        match image {
            Image::B64Json { b64_json, .. } => Ok(b64_json.to_string()),
            Image::Url { .. } => Err(LearningError::Story(
                "Image API returned a URL instead of base64 data".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> OpenAISettings {
        OpenAISettings {
            api_key: Some("sk-test".to_string()),
            chat_model: Some("gpt-4o".to_string()),
            story_length: 300,
            story_instructions: "Write in Spanish.".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_requires_key_and_model() {
        let mut missing_key = settings();
        missing_key.api_key = None;
        assert!(matches!(
            OpenAIStoryGenerator::new(&missing_key, StoryPrompts::default()),
            Err(LearningError::Config(_))
        ));

        let mut missing_model = settings();
        missing_model.chat_model = Some(String::new());
        assert!(OpenAIStoryGenerator::new(&missing_model, StoryPrompts::default()).is_err());
    }

    #[test]
    fn test_system_prompt_layout() {
        let generator = OpenAIStoryGenerator::new(&settings(), StoryPrompts::default()).unwrap();
        let words = vec![
            Word::new("casa", FamiliarityLevel::Known),
            Word::new("nuevo", FamiliarityLevel::New),
        ];

        let prompt = generator.system_prompt(&words, FamiliarityLevel::Familiar);
        assert!(prompt.starts_with(
            "Write in Spanish.\n\nPlease make the story in the neighborhood of 300 words.\n\n"
        ));
        assert!(prompt.contains("valid JSON object"));
        assert!(prompt.ends_with(&format!(
            "{}\ncasa\n\n",
            FamiliarityLevel::Known.description()
        )));
        assert!(!prompt.contains("nuevo"));
    }

    #[test]
    fn test_thumbnail_prompt_truncates_story() {
        let generator = OpenAIStoryGenerator::new(&settings(), StoryPrompts::default()).unwrap();
        let story = "é".repeat(THUMBNAIL_STORY_CHARS + 50);

        let prompt = generator.thumbnail_prompt(&story);
        let tail = prompt.rsplit('\n').next().unwrap();
        assert_eq!(tail.chars().count(), THUMBNAIL_STORY_CHARS);
    }

    #[test]
    fn test_image_model_mapping() {
        let mut s = settings();
        s.image_model = "gpt-image-1".to_string();
        let generator = OpenAIStoryGenerator::new(&s, StoryPrompts::default()).unwrap();
        assert!(matches!(generator.image_model(), ImageModel::Other(m) if m == "gpt-image-1"));
    }
}
