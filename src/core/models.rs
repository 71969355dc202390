//! Core data models for dispatch

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Literal result returned for an unrecognised mode
pub const INVALID_MODE_MESSAGE: &str = "Invalid mode selected.";

/// Ordered (source, target) language pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LanguagePair {
    /// Source language code
    pub source: String,
    /// Target language code
    pub target: String,
}

impl LanguagePair {
    /// Pair from two codes
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

impl fmt::Display for LanguagePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.source, self.target)
    }
}

/// Request mode selected by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Neural machine translation between two languages
    Translate,
    /// Script conversion for a single language
    Transliterate,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Translate => write!(f, "translate"),
            Mode::Transliterate => write!(f, "transliterate"),
        }
    }
}

/// Mode string outside the supported set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidMode(pub String);

impl FromStr for Mode {
    type Err = InvalidMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "translate" => Ok(Mode::Translate),
            "transliterate" => Ok(Mode::Transliterate),
            other => Err(InvalidMode(other.to_string())),
        }
    }
}

/// Translation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationRequest {
    /// Text to translate
    pub text: String,
    /// Source language code
    pub source_lang: String,
    /// Target language code
    pub target_lang: String,
}

impl TranslationRequest {
    /// Build a request
    pub fn new(
        text: impl Into<String>,
        source_lang: impl Into<String>,
        target_lang: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
        }
    }

    /// Registry key for this request
    pub fn pair(&self) -> LanguagePair {
        LanguagePair::new(self.source_lang.as_str(), self.target_lang.as_str())
    }
}

/// Transliteration request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransliterationRequest {
    /// Text to convert
    pub text: String,
    /// Language whose script the text is in
    pub source_lang: String,
}

impl TransliterationRequest {
    /// Build a request
    pub fn new(text: impl Into<String>, source_lang: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source_lang: source_lang.into(),
        }
    }
}

/// Why a dispatcher could not serve a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnavailableReason {
    /// Pair is absent from the registry
    NotRegistered(LanguagePair),
    /// Pair is registered but this process did not materialize it
    NotLoaded(LanguagePair),
    /// Source code is outside the transliteration set
    TransliterationUnsupported(String),
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnavailableReason::NotRegistered(pair) | UnavailableReason::NotLoaded(pair) => {
                write!(f, "Translation model for {} not available.", pair)
            }
            UnavailableReason::TransliterationUnsupported(code) => {
                write!(f, "Transliteration for {} not available.", code)
            }
        }
    }
}

/// Outcome of a dispatch: converted text or a soft "not available" signal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchResult {
    /// Converted text
    Ok(String),
    /// The request cannot be served here
    Unavailable(UnavailableReason),
}

impl DispatchResult {
    /// Whether text was produced
    pub fn is_ok(&self) -> bool {
        matches!(self, DispatchResult::Ok(_))
    }

    /// Render as the single string carried on the wire
    pub fn into_message(self) -> String {
        match self {
            DispatchResult::Ok(text) => text,
            DispatchResult::Unavailable(reason) => reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_renders_with_dash() {
        assert_eq!(LanguagePair::new("fr", "zz").to_string(), "fr-zz");
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("translate".parse::<Mode>(), Ok(Mode::Translate));
        assert_eq!("transliterate".parse::<Mode>(), Ok(Mode::Transliterate));
        assert_eq!("foo".parse::<Mode>(), Err(InvalidMode("foo".to_string())));
        assert!("Translate".parse::<Mode>().is_err());
    }

    #[test]
    fn test_unavailable_messages() {
        let missing = UnavailableReason::NotRegistered(LanguagePair::new("fr", "zz"));
        assert_eq!(missing.to_string(), "Translation model for fr-zz not available.");

        let not_loaded = UnavailableReason::NotLoaded(LanguagePair::new("en", "de"));
        assert_eq!(not_loaded.to_string(), "Translation model for en-de not available.");

        let translit = UnavailableReason::TransliterationUnsupported("xx".to_string());
        assert_eq!(translit.to_string(), "Transliteration for xx not available.");
    }

    #[test]
    fn test_dispatch_result_message() {
        assert_eq!(DispatchResult::Ok("Bonjour".into()).into_message(), "Bonjour");
        let unavailable = DispatchResult::Unavailable(UnavailableReason::TransliterationUnsupported(
            "zz".into(),
        ));
        assert!(!unavailable.is_ok());
        assert_eq!(unavailable.into_message(), "Transliteration for zz not available.");
    }
}
