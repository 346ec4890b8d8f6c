//! Prompt templates for story and thumbnail generation.
//!
//! Prompts can be customized by placing a `story.toml` file in the custom
//! prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub story: StoryPrompts,
}

/// Prompts for story and thumbnail generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoryPrompts {
    /// Target length line; `{{story_length}}` is replaced with the word count.
    pub length: String,
    /// Response format instructions, followed by the vocabulary list.
    pub format: String,
    /// Thumbnail prompt, followed by the start of the story.
    pub thumbnail: String,
}

impl Default for StoryPrompts {
    fn default() -> Self {
        Self {
            length: "Please make the story in the neighborhood of {{story_length}} words.".to_string(),

            format: r#"After each story, ask the student 5 questions in Spanish about the story. The
point is to reinforce the vocabulary from the story.

I want the response in the form of a valid JSON object. Here is an example:

{
	"title": "Juan's Trip to France",
	"description": "Juan takes a trip to France and learns the true meaning of friendship.",
	"story": "Once upon a time there was a boy named Juan. He wanted to travel to France. He thought it was a beautiful country.\nHe had a friend named Maria. She wanted to travel to France too. They decided to travel to France together. They had a great time. They learned a lot about French culture. They learned a lot about each other.\nThey became best friends. The end.",
	"questions": [
		{
			"question": "Where does Juan want to travel to?",
			"answer": "Juan wants to travel to France. He thinks it is a beautiful country."
		},
		{
			"question": "Is Maria Juan's sister?",
			"answer": "No, Maria is Juan's friend."
		}
	]
}
Here is a vocabulary list for the student:
"#
            .to_string(),

            thumbnail: "Create an eye-catching thumbnail in the style of an Audiobook cover for the story that follows. Match the style and intended audience of the image to that of the story:".to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts, overriding the defaults from `custom_dir/story.toml` if present.
    pub fn load(custom_dir: Option<&str>) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let story_path = custom_path.join("story.toml");
            if story_path.exists() {
                let content = std::fs::read_to_string(&story_path)?;
                prompts.story = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }
}
