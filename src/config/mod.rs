//! Configuration module for language-learning.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, StoryPrompts};
pub use settings::{
    GeneralSettings, LingqSettings, OpenAISettings, PromptSettings, Settings, StorySettings,
    TtsSettings, ENV_PREFIX, LOAD_STORY_FILE_ENV,
};
