//! Pre-flight checks before expensive operations.
//!
//! Validates that required configuration is available before starting
//! operations that would otherwise fail midway.

use crate::config::Settings;
use crate::error::{LearningError, Result};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// The full pipeline needs every API key and the chat model.
    Run,
    /// Listing vocabulary only needs LingQ.
    Vocab,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error naming the missing settings.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    let missing: Vec<&str> = match operation {
        Operation::Run => settings.missing_required(),
        Operation::Vocab => settings
            .missing_required()
            .into_iter()
            .filter(|key| key.starts_with("lingq."))
            .collect(),
    };

    if missing.is_empty() {
        Ok(())
    } else {
        Err(LearningError::Config(format!(
            "Must be set: {}. Set them in the config file or with {} environment variables \
             (e.g. LL_LINGQ_API_KEY).",
            missing.join(", "),
            crate::config::ENV_PREFIX
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocab_only_needs_lingq() {
        let mut settings = Settings::default();
        assert!(check(Operation::Vocab, &settings).is_err());

        settings.lingq.api_key = Some("key".to_string());
        assert!(check(Operation::Vocab, &settings).is_ok());

        let err = check(Operation::Run, &settings).unwrap_err().to_string();
        assert!(err.contains("openai.api_key"));
        assert!(err.contains("openai.chat_model"));
        assert!(err.contains("tts.api_key"));
        assert!(!err.contains("lingq.api_key"));
    }
}
