//! Google Cloud Text-to-Speech (REST) implementation.

use super::{story_to_ssml, SpeechSynthesizer};
use crate::config::TtsSettings;
use crate::error::{LearningError, Result};
use crate::story::Story;
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument};

const REQUEST_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest<'a> {
    input: SynthesisInput<'a>,
    voice: VoiceSelection<'a>,
    audio_config: AudioConfig,
}

#[derive(Debug, Serialize)]
struct SynthesisInput<'a> {
    ssml: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection<'a> {
    language_code: &'a str,
    name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: &'static str,
    speaking_rate: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: String,
}

/// Speech synthesizer backed by the Google Cloud Text-to-Speech REST API.
pub struct GoogleSpeechSynthesizer {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    language_code: String,
    voices: Vec<String>,
    speaking_rate: f64,
    questions_heading: String,
}

impl GoogleSpeechSynthesizer {
    /// Create a synthesizer from settings. Fails if the API key or voice list is missing.
    pub fn new(settings: &TtsSettings, questions_heading: &str) -> Result<Self> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| LearningError::Config("tts.api_key must be set".to_string()))?;
        if settings.voices.is_empty() {
            return Err(LearningError::Config("tts.voices must not be empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            api_key,
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            language_code: settings.language_code.clone(),
            voices: settings.voices.clone(),
            speaking_rate: settings.speaking_rate,
            questions_heading: questions_heading.to_string(),
        })
    }

    fn random_voice(&self) -> &str {
        self.voices
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
            .unwrap_or_default()
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleSpeechSynthesizer {
    #[instrument(skip(self, story), fields(title = %story.title))]
    async fn synthesize(&self, story: &Story) -> Result<Vec<u8>> {
        let ssml = story_to_ssml(story, &self.questions_heading);
        debug!("Generated SSML: {}", ssml);

        let voice = self.random_voice();
        info!("Synthesizing speech with voice {}", voice);

        let request = SynthesizeRequest {
            input: SynthesisInput { ssml: &ssml },
            voice: VoiceSelection {
                language_code: &self.language_code,
                name: voice,
            },
            audio_config: AudioConfig {
                audio_encoding: "MP3",
                speaking_rate: self.speaking_rate,
            },
        };

        let url = format!("{}/v1/text:synthesize", self.endpoint);
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LearningError::Speech(format!(
                "Text-to-Speech returned {}: {}",
                status, body
            )));
        }

        let body: SynthesizeResponse = response.json().await?;
        let audio = general_purpose::STANDARD.decode(body.audio_content.as_bytes())?;
        debug!(bytes = audio.len(), "Received audio");
        Ok(audio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::HeaderMap, routing::post, Json, Router};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    fn settings(endpoint: &str) -> TtsSettings {
        TtsSettings {
            api_key: Some("google-key".to_string()),
            endpoint: endpoint.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_requires_api_key_and_voices() {
        let mut s = settings("http://localhost");
        s.api_key = None;
        assert!(matches!(
            GoogleSpeechSynthesizer::new(&s, "Preguntas:"),
            Err(LearningError::Config(_))
        ));

        let mut s = settings("http://localhost");
        s.voices.clear();
        assert!(GoogleSpeechSynthesizer::new(&s, "Preguntas:").is_err());
    }

    #[test]
    fn test_random_voice_from_list() {
        let s = settings("http://localhost");
        let synth = GoogleSpeechSynthesizer::new(&s, "Preguntas:").unwrap();
        for _ in 0..20 {
            assert!(s.voices.iter().any(|v| v == synth.random_voice()));
        }
    }

    #[tokio::test]
    async fn test_synthesize_against_local_server() {
        let captured: Arc<Mutex<Option<(Value, Option<String>)>>> = Arc::new(Mutex::new(None));
        let captured_handler = captured.clone();

        let app = Router::new().route(
            "/v1/text:synthesize",
            post(move |headers: HeaderMap, Json(body): Json<Value>| {
                let captured = captured_handler.clone();
                async move {
                    let key = headers
                        .get("x-goog-api-key")
                        .and_then(|v| v.to_str().ok())
                        .map(|v| v.to_string());
                    *captured.lock().unwrap() = Some((body, key));
                    Json(json!({ "audioContent": general_purpose::STANDARD.encode(b"ID3fake") }))
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let synth =
            GoogleSpeechSynthesizer::new(&settings(&format!("http://{}/", addr)), "Preguntas:")
                .unwrap();
        let story = Story {
            title: "Hola".to_string(),
            story: "Mundo".to_string(),
            ..Default::default()
        };

        let audio = synth.synthesize(&story).await.unwrap();
        assert_eq!(audio, b"ID3fake");

        let (body, key) = captured.lock().unwrap().take().unwrap();
        assert_eq!(key.as_deref(), Some("google-key"));
        assert_eq!(body["voice"]["languageCode"], "es-US");
        assert_eq!(body["audioConfig"]["audioEncoding"], "MP3");
        assert_eq!(body["audioConfig"]["speakingRate"], 0.8);
        assert!(body["input"]["ssml"]
            .as_str()
            .unwrap()
            .starts_with("<speak><p>Hola</p>"));
    }
}
