//! Display-language selection.
//!
//! Storage keeps every localized string in all supported languages; this module
//! only decides *which* one a caller sees.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Supported display languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Ru,
    Uz,
    En,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Ru, Language::Uz, Language::En];

    pub fn code(self) -> &'static str {
        match self {
            Language::Ru => "ru",
            Language::Uz => "uz",
            Language::En => "en",
        }
    }
}

impl core::fmt::Display for Language {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ru" => Ok(Language::Ru),
            "uz" => Ok(Language::Uz),
            "en" => Ok(Language::En),
            other => Err(DomainError::validation(format!("unsupported language '{other}'"))),
        }
    }
}

/// Picks a display language from a caller-supplied hint.
///
/// The hint is usually a raw `Accept-Language` header (`"en-US,en;q=0.9"`);
/// only its first two characters are considered.
#[derive(Debug, Clone, Copy, Default)]
pub struct LanguageResolver;

impl LanguageResolver {
    /// Resolve a hint, defaulting to [`Language::Ru`].
    pub fn resolve(hint: Option<&str>) -> Language {
        Self::resolve_with_preference(hint, None)
    }

    /// Resolve a hint, falling back to a stored account preference and then
    /// to [`Language::Ru`].
    pub fn resolve_with_preference(hint: Option<&str>, preferred: Option<Language>) -> Language {
        match hint.map(str::trim).filter(|h| !h.is_empty()) {
            Some(h) => {
                let prefix: String = h.chars().take(2).collect();
                prefix.parse().unwrap_or_default()
            }
            None => preferred.unwrap_or_default(),
        }
    }
}

/// A string stored in every supported language.
///
/// `ru` is the canonical entry; the other languages are optional and may be
/// empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LocalizedText {
    pub ru: String,
    #[serde(default)]
    pub uz: String,
    #[serde(default)]
    pub en: String,
}

impl LocalizedText {
    pub fn new(ru: impl Into<String>, uz: impl Into<String>, en: impl Into<String>) -> Self {
        Self {
            ru: ru.into(),
            uz: uz.into(),
            en: en.into(),
        }
    }

    /// Russian-only text (other languages left empty).
    pub fn ru(ru: impl Into<String>) -> Self {
        Self::new(ru, "", "")
    }

    /// Text in `lang`, falling back to `ru` when that entry is empty.
    pub fn get(&self, lang: Language) -> &str {
        let text = match lang {
            Language::Ru => &self.ru,
            Language::Uz => &self.uz,
            Language::En => &self.en,
        };
        if text.is_empty() { &self.ru } else { text }
    }

    /// All entries, in [`Language::ALL`] order.
    pub fn entries(&self) -> [&str; 3] {
        [&self.ru, &self.uz, &self.en]
    }
}
