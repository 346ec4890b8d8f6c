//! Text-to-speech for generated stories.

mod google;

pub use google::GoogleSpeechSynthesizer;

use crate::error::Result;
use crate::story::Story;
use async_trait::async_trait;
use tracing::debug;

/// Trait for speech synthesis backends.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Render the story (title, body and questions) as MP3 audio.
    async fn synthesize(&self, story: &Story) -> Result<Vec<u8>>;
}

/// Build the SSML document read aloud for a story.
///
/// Pauses: 2s after the title, 3s before the questions heading, 1s after it,
/// then 3s after each question (time to answer) and 1s after each answer.
pub fn story_to_ssml(story: &Story, questions_heading: &str) -> String {
    let mut ssml = String::from("<speak>");

    push_paragraph(&mut ssml, &story.title);
    ssml.push_str(r#"<break time="2s"/>"#);

    let mut paragraphs = 0usize;
    for paragraph in story.paragraphs() {
        push_paragraph(&mut ssml, paragraph);
        paragraphs += 1;
    }
    debug!(paragraphs, "Story paragraphs");

    ssml.push_str(r#"<break time="3s"/>"#);
    push_paragraph(&mut ssml, questions_heading);
    ssml.push_str(r#"<break time="1s"/>"#);

    for question in &story.questions {
        push_paragraph(&mut ssml, &question.question);
        ssml.push_str(r#"<break time="3s"/>"#);
        push_paragraph(&mut ssml, &question.answer);
        ssml.push_str(r#"<break time="1s"/>"#);
    }

    ssml.push_str("</speak>");
    ssml
}

fn push_paragraph(ssml: &mut String, text: &str) {
    ssml.push_str("<p>");
    ssml.push_str(&escape_xml(text));
    ssml.push_str("</p>");
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::story::Question;

    #[test]
    fn test_ssml_layout() {
        let story = Story {
            title: "Título".to_string(),
            story: "Uno.\nDos.".to_string(),
            questions: vec![Question {
                question: "¿Qué?".to_string(),
                answer: "Esto.".to_string(),
            }],
            ..Default::default()
        };

        let ssml = story_to_ssml(&story, "Preguntas:");
        assert_eq!(
            ssml,
            concat!(
                "<speak>",
                "<p>Título</p>",
                r#"<break time="2s"/>"#,
                "<p>Uno.</p><p>Dos.</p>",
                r#"<break time="3s"/>"#,
                "<p>Preguntas:</p>",
                r#"<break time="1s"/>"#,
                "<p>¿Qué?</p>",
                r#"<break time="3s"/>"#,
                "<p>Esto.</p>",
                r#"<break time="1s"/>"#,
                "</speak>"
            )
        );
    }

    #[test]
    fn test_ssml_escapes_markup() {
        let story = Story {
            title: "Tom & Jerry <3".to_string(),
            story: "Hola".to_string(),
            ..Default::default()
        };
        let ssml = story_to_ssml(&story, "Preguntas:");
        assert!(ssml.contains("<p>Tom &amp; Jerry &lt;3</p>"));
    }
}
