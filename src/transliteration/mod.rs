//! Script transliteration
//!
//! [`ScriptMapper`] is the conversion capability; [`TableTransliterator`] is
//! the built-in table-driven implementation and [`TransliterationDispatcher`]
//! applies the supported-language check in front of it.

pub mod packs;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::core::models::{DispatchResult, TransliterationRequest, UnavailableReason};
use packs::{LanguagePack, PACKS};

/// Conversion direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Latin → native script
    ToScript,
    /// Native script → Latin
    Reversed,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::ToScript => write!(f, "to-script"),
            Direction::Reversed => write!(f, "reversed"),
        }
    }
}

/// Language code without a conversion table
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no transliteration table for language {0}")]
pub struct UnknownLanguage(pub String);

/// Script-mapping capability
pub trait ScriptMapper: Send + Sync {
    /// Codes with a conversion table
    fn supported_languages(&self) -> BTreeSet<&'static str>;

    /// Convert `text` written in the script of `code`
    fn convert(&self, text: &str, code: &str, direction: Direction)
        -> Result<String, UnknownLanguage>;
}

/// Longest-match substitution rules for one direction
#[derive(Debug, Default)]
struct Rules {
    map: HashMap<String, &'static str>,
    max_len: usize,
}

impl Rules {
    fn insert(&mut self, from: &'static str, to: &'static str) {
        self.max_len = self.max_len.max(from.chars().count());
        self.map.entry(from.to_string()).or_insert(to);
    }

    fn apply(&self, text: &str) -> String {
        let chars: Vec<char> = text.chars().collect();
        let lower: Vec<char> = chars
            .iter()
            .map(|c| c.to_lowercase().next().unwrap_or(*c))
            .collect();

        let mut out = String::with_capacity(text.len());
        let mut i = 0;
        while i < chars.len() {
            let longest = self.max_len.min(chars.len() - i);
            let hit = (1..=longest).rev().find_map(|len| {
                let key: String = lower[i..i + len].iter().collect();
                self.map.get(&key).map(|rep| (len, *rep))
            });

            match hit {
                Some((len, rep)) => {
                    if chars[i].is_uppercase() {
                        let shouting = chars.get(i + len).is_some_and(|c| c.is_uppercase())
                            || (i > 0 && chars[i - 1].is_uppercase());
                        if shouting {
                            out.push_str(&rep.to_uppercase());
                        } else {
                            out.push_str(&capitalize(rep));
                        }
                    } else {
                        out.push_str(rep);
                    }
                    i += len;
                }
                None => {
                    out.push(chars[i]);
                    i += 1;
                }
            }
        }
        out
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Compiled rules for one language pack
#[derive(Debug)]
struct CompiledPack {
    pack: LanguagePack,
    to_script: Rules,
    reversed: Rules,
}

impl CompiledPack {
    fn new(pack: LanguagePack) -> Self {
        let mut to_script = Rules::default();
        let mut reversed = Rules::default();
        for &(native, latin) in pack.rows {
            reversed.insert(native, latin);
            to_script.insert(latin, native);
        }
        Self {
            pack,
            to_script,
            reversed,
        }
    }
}

/// Table-driven transliterator over the built-in packs
#[derive(Debug)]
pub struct TableTransliterator {
    packs: BTreeMap<&'static str, CompiledPack>,
}

impl TableTransliterator {
    /// Transliterator over the built-in packs
    pub fn new() -> Self {
        Self::with_packs(PACKS)
    }

    /// Transliterator over custom packs
    pub fn with_packs(packs: &[LanguagePack]) -> Self {
        let packs = packs
            .iter()
            .map(|pack| (pack.code, CompiledPack::new(*pack)))
            .collect();
        Self { packs }
    }

    /// Human-readable language name for a code
    pub fn language_name(&self, code: &str) -> Option<&'static str> {
        self.packs.get(code).map(|compiled| compiled.pack.name)
    }
}

impl Default for TableTransliterator {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptMapper for TableTransliterator {
    fn supported_languages(&self) -> BTreeSet<&'static str> {
        self.packs.keys().copied().collect()
    }

    fn convert(
        &self,
        text: &str,
        code: &str,
        direction: Direction,
    ) -> Result<String, UnknownLanguage> {
        let compiled = self
            .packs
            .get(code)
            .ok_or_else(|| UnknownLanguage(code.to_string()))?;

        let rules = match direction {
            Direction::ToScript => &compiled.to_script,
            Direction::Reversed => &compiled.reversed,
        };
        Ok(rules.apply(text))
    }
}

/// Checks the supported set, then converts native script back to Latin
#[derive(Clone)]
pub struct TransliterationDispatcher {
    mapper: Arc<dyn ScriptMapper>,
}

impl TransliterationDispatcher {
    /// Dispatcher over any mapper
    pub fn new(mapper: Arc<dyn ScriptMapper>) -> Self {
        Self { mapper }
    }

    /// Codes the mapper supports
    pub fn supported_languages(&self) -> BTreeSet<&'static str> {
        self.mapper.supported_languages()
    }

    /// Native script to Latin, or `Unavailable` for unknown codes
    pub fn transliterate(&self, request: &TransliterationRequest) -> DispatchResult {
        self.convert(request, Direction::Reversed)
    }

    /// Like [`transliterate`](Self::transliterate) with an explicit direction
    pub fn convert(&self, request: &TransliterationRequest, direction: Direction) -> DispatchResult {
        let code = request.source_lang.as_str();
        let unsupported = || {
            DispatchResult::Unavailable(UnavailableReason::TransliterationUnsupported(
                code.to_string(),
            ))
        };

        if !self.mapper.supported_languages().contains(code) {
            debug!("Transliteration for {} not available", code);
            return unsupported();
        }

        match self.mapper.convert(&request.text, code, direction) {
            Ok(text) => DispatchResult::Ok(text),
            Err(_) => unsupported(),
        }
    }
}

impl Default for TransliterationDispatcher {
    fn default() -> Self {
        Self::new(Arc::new(TableTransliterator::new()))
    }
}

impl fmt::Debug for TransliterationDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransliterationDispatcher")
            .field("languages", &self.mapper.supported_languages())
            .finish()
    }
}
