//! Run command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::{Pipeline, RunOptions};
use crate::vocabulary::FamiliarityLevel;
use anyhow::Result;
use std::path::Path;

/// Run the full lesson pipeline.
pub async fn run_lesson(
    story_file: Option<String>,
    refresh: bool,
    min_familiarity: Option<u8>,
    no_import: bool,
    output_dir: Option<String>,
    mut settings: Settings,
) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Run, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'language-learning doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    if let Some(dir) = output_dir {
        settings.general.output_dir = dir;
    }

    let min_familiarity = min_familiarity
        .map(FamiliarityLevel::try_from)
        .transpose()
        .map_err(|e| anyhow::anyhow!(e))?;

    let options = RunOptions {
        refresh,
        story_file: story_file.map(|p| Settings::expand_path(&p)),
        min_familiarity,
        skip_import: no_import,
    };

    let pipeline = Pipeline::new(settings)?;

    let spinner = Output::spinner("Building lesson...");
    let result = pipeline.run(&options).await;
    spinner.finish_and_clear();

    let result = match result {
        Ok(result) => result,
        Err(e) => {
            Output::error(&format!("Failed to build lesson: {}", e));
            return Err(e.into());
        }
    };

    Output::header(&result.title);
    if result.words_loaded > 0 {
        Output::kv("Vocabulary", &format!("{} words", result.words_loaded));
    }
    Output::kv("Story", &display(&result.artifacts.json_path));
    Output::kv("Transcript", &display(&result.artifacts.text_path));
    if let Some(image) = &result.artifacts.image_path {
        Output::kv("Thumbnail", &display(image));
    }
    Output::kv("Audio", &display(&result.artifacts.audio_path));
    println!();

    if result.imported {
        Output::success(&format!("Imported '{}' into LingQ", result.title));
    } else {
        Output::info("Lesson import skipped.");
    }

    Ok(())
}

fn display(path: &Path) -> String {
    path.display().to_string()
}
