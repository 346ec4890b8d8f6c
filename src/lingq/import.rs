//! Lesson import.

use super::LingqClient;
use crate::error::{LearningError, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Files and metadata for a new lesson.
#[derive(Debug, Clone)]
pub struct LessonUpload {
    pub text_path: PathBuf,
    pub audio_path: PathBuf,
    pub image_path: Option<PathBuf>,
    pub title: String,
    pub description: String,
}

/// Trait for lesson import backends.
#[async_trait]
pub trait LessonImporter: Send + Sync {
    async fn import_lesson(&self, upload: &LessonUpload) -> Result<()>;
}

async fn file_part(path: &Path, mime: &str) -> Result<Part> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        LearningError::Import(format!("Failed to read {}: {}", path.display(), e))
    })?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();

    Part::bytes(bytes)
        .file_name(file_name)
        .mime_str(mime)
        .map_err(|e| LearningError::Import(e.to_string()))
}

impl LingqClient {
    async fn lesson_form(&self, upload: &LessonUpload) -> Result<Form> {
        let mut form = Form::new()
            .part("file", file_part(&upload.text_path, "text/plain").await?)
            .part("audio", file_part(&upload.audio_path, "audio/mpeg").await?);

        if let Some(image_path) = &upload.image_path {
            form = form.part("image", file_part(image_path, "image/png").await?);
        }

        Ok(form
            .text("title", upload.title.clone())
            .text("description", upload.description.clone())
            .text("collection", self.collection.clone())
            .text("hasPrice", "false")
            .text("isProtected", "false")
            .text("isHidden", "true")
            .text("language", self.language.clone())
            .text("status", "private")
            .text("tags", self.tags.clone())
            .text("save", "true"))
    }
}

#[async_trait]
impl LessonImporter for LingqClient {
    #[instrument(skip(self, upload), fields(title = %upload.title))]
    async fn import_lesson(&self, upload: &LessonUpload) -> Result<()> {
        let form = self.lesson_form(upload).await?;
        let url = self.endpoint("lessons/import/");

        let response = self
            .authorized(self.client.post(&url))
            .multipart(form)
            .send()
            .await?;

        // LingQ answers a successful import with 201 and an empty body.
        let status = response.status();
        if status != StatusCode::CREATED {
            return Err(LearningError::Import(format!(
                "Unexpected status code: {}",
                status
            )));
        }

        info!("Imported lesson '{}'", upload.title);
        Ok(())
    }
}
