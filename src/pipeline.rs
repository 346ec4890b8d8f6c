//! Lesson pipeline.
//!
//! Runs the whole process in order: vocabulary, story, artifacts, audio, import.
//! Every step is awaited before the next starts and any error ends the run.

use crate::config::{Prompts, Settings};
use crate::error::{LearningError, Result};
use crate::lingq::{LessonImporter, LessonUpload, LingqClient};
use crate::speech::{GoogleSpeechSynthesizer, SpeechSynthesizer};
use crate::story::{OpenAIStoryGenerator, Story, StoryGenerator};
use crate::vocabulary::{load_words, FamiliarityLevel, VocabularySource, Word, WordDatabase};
use base64::{engine::general_purpose, Engine as _};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument};

/// Options for a single pipeline run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Ignore the word cache and refetch vocabulary.
    pub refresh: bool,
    /// Load the story from this file instead of generating one.
    pub story_file: Option<PathBuf>,
    /// Override the configured minimum familiarity.
    pub min_familiarity: Option<FamiliarityLevel>,
    /// Write the artifacts but do not import the lesson.
    pub skip_import: bool,
}

/// Paths of the files written for a lesson.
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub json_path: PathBuf,
    pub text_path: PathBuf,
    pub image_path: Option<PathBuf>,
    pub audio_path: PathBuf,
}

/// Result of a pipeline run.
#[derive(Debug)]
pub struct RunResult {
    pub title: String,
    pub words_loaded: usize,
    pub artifacts: Artifacts,
    pub imported: bool,
}

/// The lesson pipeline and its collaborators.
pub struct Pipeline {
    settings: Settings,
    vocabulary: Arc<dyn VocabularySource>,
    cache: WordDatabase,
    stories: Arc<dyn StoryGenerator>,
    speech: Arc<dyn SpeechSynthesizer>,
    importer: Arc<dyn LessonImporter>,
    output_dir: PathBuf,
}

impl Pipeline {
    /// Create a pipeline with the LingQ, OpenAI and Google clients built from settings.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(settings.prompts.custom_dir.as_deref())?;

        let lingq = Arc::new(LingqClient::new(&settings.lingq)?);
        let stories = Arc::new(OpenAIStoryGenerator::new(&settings.openai, prompts.story)?);
        let speech = Arc::new(GoogleSpeechSynthesizer::new(
            &settings.tts,
            &settings.openai.questions_heading,
        )?);

        Ok(Self::with_components(
            settings,
            lingq.clone(),
            stories,
            speech,
            lingq,
        ))
    }

    /// Create a pipeline with custom components.
    pub fn with_components(
        settings: Settings,
        vocabulary: Arc<dyn VocabularySource>,
        stories: Arc<dyn StoryGenerator>,
        speech: Arc<dyn SpeechSynthesizer>,
        importer: Arc<dyn LessonImporter>,
    ) -> Self {
        let cache = WordDatabase::new(settings.database_path());
        let output_dir = settings.output_dir();

        Self {
            settings,
            vocabulary,
            cache,
            stories,
            speech,
            importer,
            output_dir,
        }
    }

    /// Load vocabulary from the cache when fresh, otherwise fetch, decode and cache it.
    #[instrument(skip(self))]
    pub async fn load_words(&self, refresh: bool) -> Result<Vec<Word>> {
        let max_age = self.settings.cache_max_age()?;
        let (words, _) =
            load_words(self.vocabulary.as_ref(), &self.cache, max_age, refresh).await?;

        info!(count = words.len(), "Loaded words");
        Ok(words)
    }

    /// Generate a story (and thumbnail) from `words`, or load one from `story_file`.
    ///
    /// A loaded story keeps whatever it had: no thumbnail is generated for it.
    #[instrument(skip(self, words))]
    pub async fn load_story(
        &self,
        words: &[Word],
        min_familiarity: FamiliarityLevel,
        story_file: Option<&Path>,
    ) -> Result<Story> {
        if let Some(path) = story_file {
            info!("Skipping story generation, loading from {}", path.display());
            return Story::load(path);
        }

        info!("Generating story...");
        let mut story = self.stories.create_story(words, min_familiarity).await?;
        info!(characters = story.story.chars().count(), "Generated story");

        info!("Generating thumbnail...");
        story.thumbnail = Some(self.stories.create_image(&story.story).await?);
        Ok(story)
    }

    /// Write the JSON, transcript, thumbnail and audio files for `story`.
    #[instrument(skip(self, story, audio))]
    pub fn write_artifacts(&self, story: &Story, audio: &[u8]) -> Result<Artifacts> {
        std::fs::create_dir_all(&self.output_dir)?;

        let json_path = self.output_dir.join("output.json");
        std::fs::write(&json_path, &story.original_json)?;

        let text_path = self.output_dir.join("output.txt");
        std::fs::write(
            &text_path,
            story.transcript(&self.settings.openai.questions_heading),
        )?;

        let image_path = match &story.thumbnail {
            Some(encoded) => {
                let bytes = general_purpose::STANDARD.decode(encoded.trim())?;
                let path = self.output_dir.join("output.png");
                std::fs::write(&path, bytes)?;
                Some(path)
            }
            None => None,
        };

        let audio_path = self.output_dir.join("output.mp3");
        std::fs::write(&audio_path, audio)?;

        Ok(Artifacts {
            json_path,
            text_path,
            image_path,
            audio_path,
        })
    }

    /// Run the full pipeline.
    #[instrument(skip(self))]
    pub async fn run(&self, options: &RunOptions) -> Result<RunResult> {
        let min_familiarity = match options.min_familiarity {
            Some(level) => level,
            None => FamiliarityLevel::try_from(self.settings.openai.min_familiarity)
                .ok()
                .filter(|l| l.is_known_encoding())
                .ok_or_else(|| {
                    LearningError::Config(format!(
                        "openai.min_familiarity must be between 1 and 5, got {}",
                        self.settings.openai.min_familiarity
                    ))
                })?,
        };

        let story_file = options
            .story_file
            .clone()
            .or_else(|| self.settings.story.load_from.as_deref().map(Settings::expand_path));

        // A story loaded from disk needs no vocabulary.
        let words = if story_file.is_some() {
            Vec::new()
        } else {
            self.load_words(options.refresh).await?
        };

        let story = self
            .load_story(&words, min_familiarity, story_file.as_deref())
            .await?;

        info!("Generating audio...");
        let audio = self.speech.synthesize(&story).await?;
        let artifacts = self.write_artifacts(&story, &audio)?;

        let imported = if options.skip_import {
            info!("Skipping lesson import");
            false
        } else {
            info!("Importing lesson to LingQ...");
            self.importer
                .import_lesson(&LessonUpload {
                    text_path: artifacts.text_path.clone(),
                    audio_path: artifacts.audio_path.clone(),
                    image_path: artifacts.image_path.clone(),
                    title: story.title.clone(),
                    description: story.description.clone(),
                })
                .await?;
            true
        };

        Ok(RunResult {
            title: story.title,
            words_loaded: words.len(),
            artifacts,
            imported,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::story::Question;
    use crate::vocabulary::{VocabularyPage, VocabularyTerm};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FakeVocabulary {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl VocabularySource for FakeVocabulary {
        async fn fetch_page(&self, _cursor: Option<&str>) -> Result<VocabularyPage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(VocabularyPage {
                terms: vec![
                    VocabularyTerm {
                        term: "casa".to_string(),
                        raw_status: 3,
                        raw_extended_status: None,
                    },
                    VocabularyTerm {
                        term: "raro".to_string(),
                        raw_status: 3,
                        raw_extended_status: Some(2),
                    },
                ],
                next: None,
            })
        }
    }

    #[derive(Default)]
    struct FakeStories {
        seen_words: Mutex<Vec<Word>>,
    }

    #[async_trait]
    impl StoryGenerator for FakeStories {
        async fn create_story(
            &self,
            words: &[Word],
            _min_familiarity: FamiliarityLevel,
        ) -> Result<Story> {
            *self.seen_words.lock().unwrap() = words.to_vec();
            Story::from_json(
                r#"{"title": "La casa", "description": "Una casa.", "story": "Hay una casa.", "questions": [{"question": "¿Qué hay?", "answer": "Una casa."}]}"#,
            )
        }

        async fn create_image(&self, _story_text: &str) -> Result<String> {
            Ok(general_purpose::STANDARD.encode(b"\x89PNG"))
        }
    }

    struct FakeSpeech;

    #[async_trait]
    impl SpeechSynthesizer for FakeSpeech {
        async fn synthesize(&self, _story: &Story) -> Result<Vec<u8>> {
            Ok(b"ID3audio".to_vec())
        }
    }

    #[derive(Default)]
    struct FakeImporter {
        uploads: Mutex<Vec<LessonUpload>>,
    }

    #[async_trait]
    impl LessonImporter for FakeImporter {
        async fn import_lesson(&self, upload: &LessonUpload) -> Result<()> {
            self.uploads.lock().unwrap().push(upload.clone());
            Ok(())
        }
    }

    struct Harness {
        pipeline: Pipeline,
        vocabulary: Arc<FakeVocabulary>,
        stories: Arc<FakeStories>,
        importer: Arc<FakeImporter>,
        dir: tempfile::TempDir,
    }

    fn harness() -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.general.output_dir = dir.path().join("out").to_string_lossy().to_string();
        settings.lingq.database_path = dir
            .path()
            .join("lingq-data.json")
            .to_string_lossy()
            .to_string();

        let vocabulary = Arc::new(FakeVocabulary {
            calls: AtomicUsize::new(0),
        });
        let stories = Arc::new(FakeStories::default());
        let importer = Arc::new(FakeImporter::default());
        let pipeline = Pipeline::with_components(
            settings,
            vocabulary.clone(),
            stories.clone(),
            Arc::new(FakeSpeech),
            importer.clone(),
        );

        Harness {
            pipeline,
            vocabulary,
            stories,
            importer,
            dir,
        }
    }

    #[tokio::test]
    async fn test_full_run_writes_and_imports() {
        let h = harness();

        let result = h.pipeline.run(&RunOptions::default()).await.unwrap();
        assert_eq!(result.title, "La casa");
        assert_eq!(result.words_loaded, 2);
        assert!(result.imported);

        let out = h.dir.path().join("out");
        let transcript = std::fs::read_to_string(out.join("output.txt")).unwrap();
        assert!(transcript.starts_with("La casa\n\nHay una casa.\n\nPreguntas:\n\n"));
        assert_eq!(std::fs::read(out.join("output.png")).unwrap(), b"\x89PNG");
        assert_eq!(std::fs::read(out.join("output.mp3")).unwrap(), b"ID3audio");
        assert!(std::fs::read_to_string(out.join("output.json"))
            .unwrap()
            .contains("\"La casa\""));

        let uploads = h.importer.uploads.lock().unwrap();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].title, "La casa");
        assert_eq!(uploads[0].description, "Una casa.");
        assert_eq!(uploads[0].image_path.as_deref(), Some(out.join("output.png").as_path()));

        let seen = h.stories.seen_words.lock().unwrap();
        assert_eq!(seen[0], Word::new("casa", FamiliarityLevel::Known));
        assert_eq!(seen[1], Word::new("raro", FamiliarityLevel::Unknown));
    }

    #[tokio::test]
    async fn test_fresh_cache_skips_fetch() {
        let h = harness();

        h.pipeline.load_words(false).await.unwrap();
        let words = h.pipeline.load_words(false).await.unwrap();
        assert_eq!(words.len(), 2);
        assert_eq!(h.vocabulary.calls.load(Ordering::SeqCst), 1);

        h.pipeline.load_words(true).await.unwrap();
        assert_eq!(h.vocabulary.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_story_file_skips_generation_and_vocabulary() {
        let h = harness();
        let story_path = h.dir.path().join("saved.json");
        std::fs::write(&story_path, r#"{"title": "Guardada", "story": "Texto."}"#).unwrap();

        let options = RunOptions {
            story_file: Some(story_path),
            skip_import: true,
            ..Default::default()
        };
        let result = h.pipeline.run(&options).await.unwrap();

        assert_eq!(result.title, "Guardada");
        assert_eq!(result.words_loaded, 0);
        assert!(!result.imported);
        assert!(result.artifacts.image_path.is_none());
        assert_eq!(h.vocabulary.calls.load(Ordering::SeqCst), 0);
        assert!(h.importer.uploads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_min_familiarity_is_config_error() {
        let mut h = harness();
        h.pipeline.settings.openai.min_familiarity = 0;

        let err = h.pipeline.run(&RunOptions::default()).await.unwrap_err();
        assert!(matches!(err, LearningError::Config(_)));
    }

    #[test]
    fn test_write_artifacts_rejects_bad_thumbnail() {
        let h = harness();
        let story = Story {
            title: "T".to_string(),
            story: "S".to_string(),
            questions: vec![Question {
                question: "Q".to_string(),
                answer: "A".to_string(),
            }],
            thumbnail: Some("not base64!".to_string()),
            ..Default::default()
        };

        assert!(matches!(
            h.pipeline.write_artifacts(&story, b""),
            Err(LearningError::Base64(_))
        ));
    }
}
