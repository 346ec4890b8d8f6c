//! Familiarity levels and the LingQ status decoder.
//!
//! LingQ's v3 API reports how well a term is known with two fields, `status`
//! (0-3) and a nullable `extended_status`. Neither is documented, and the top
//! of the scale is split across both fields. [`decode_status`] folds them into
//! a single [`FamiliarityLevel`].

use serde::{Deserialize, Serialize};
use tracing::warn;

/// How well the learner knows a term, ordered from least to most familiar.
///
/// Serialized as its integer value (`0` for [`FamiliarityLevel::Unknown`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum FamiliarityLevel {
    /// Raw status combination we could not decode.
    Unknown = 0,
    New = 1,
    Recognized = 2,
    Familiar = 3,
    Learned = 4,
    Known = 5,
}

impl FamiliarityLevel {
    /// All decodable levels, least familiar first.
    pub const ALL: [FamiliarityLevel; 5] = [
        FamiliarityLevel::New,
        FamiliarityLevel::Recognized,
        FamiliarityLevel::Familiar,
        FamiliarityLevel::Learned,
        FamiliarityLevel::Known,
    ];

    /// Numeric value on the 1-5 scale, or 0 for unknown.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Short name of the level.
    pub fn name(self) -> &'static str {
        match self {
            FamiliarityLevel::Unknown => "Unknown",
            FamiliarityLevel::New => "New",
            FamiliarityLevel::Recognized => "Recognized",
            FamiliarityLevel::Familiar => "Familiar",
            FamiliarityLevel::Learned => "Learned",
            FamiliarityLevel::Known => "Known",
        }
    }

    /// Heading used when listing words of this level in a story prompt.
    pub fn description(self) -> &'static str {
        match self {
            FamiliarityLevel::Unknown => "Words with an unrecognized status:",
            FamiliarityLevel::New => "New words (the student has not studied these yet):",
            FamiliarityLevel::Recognized => {
                "Recognized words (the student has seen these once or twice):"
            }
            FamiliarityLevel::Familiar => "Familiar words (the student is starting to know these):",
            FamiliarityLevel::Learned => "Learned words (the student knows these fairly well):",
            FamiliarityLevel::Known => "Known words (the student knows these very well):",
        }
    }

    /// True for every level except [`FamiliarityLevel::Unknown`].
    pub fn is_known_encoding(self) -> bool {
        self != FamiliarityLevel::Unknown
    }
}

impl From<FamiliarityLevel> for u8 {
    fn from(level: FamiliarityLevel) -> Self {
        level.as_u8()
    }
}

impl TryFrom<u8> for FamiliarityLevel {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(FamiliarityLevel::Unknown),
            1 => Ok(FamiliarityLevel::New),
            2 => Ok(FamiliarityLevel::Recognized),
            3 => Ok(FamiliarityLevel::Familiar),
            4 => Ok(FamiliarityLevel::Learned),
            5 => Ok(FamiliarityLevel::Known),
            other => Err(format!("Invalid familiarity level: {}", other)),
        }
    }
}

impl std::fmt::Display for FamiliarityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name(), self.as_u8())
    }
}

/// Decode LingQ's `(status, extended_status)` pair into a familiarity level.
///
/// First match wins:
///
/// | status | extended_status | level |
/// |---|---|---|
/// | 0 | any | New |
/// | 1 | any | Recognized |
/// | 2 | any | Familiar |
/// | 3 | 0 or 1 | Learned |
/// | 3 | 3 or null | Known |
///
/// Anything else decodes to [`FamiliarityLevel::Unknown`] and emits a warning.
/// `3` with extended status `2` is the known case of this; it is left unknown
/// rather than guessed.
pub fn decode_status(status: i64, extended_status: Option<i64>) -> FamiliarityLevel {
    match (status, extended_status) {
        (0, _) => FamiliarityLevel::New,
        (1, _) => FamiliarityLevel::Recognized,
        (2, _) => FamiliarityLevel::Familiar,
        (3, Some(ext)) if ext < 2 => FamiliarityLevel::Learned,
        (3, Some(3)) | (3, None) => FamiliarityLevel::Known,
        _ => {
            warn!(
                status,
                extended_status = ?extended_status,
                "Unrecognized vocabulary status combination"
            );
            FamiliarityLevel::Unknown
        }
    }
}
