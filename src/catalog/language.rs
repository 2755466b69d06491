use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::DatasetError;

/// Closed set of dataset languages.
///
/// Parsing accepts any case and folds the `en` alias into [`Language::Us`],
/// so one logical dataset never ends up under two cache keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Kr,
    Jp,
    Zh,
    Us,
    Au,
    Ca,
    Fr,
}

impl Language {
    pub const ALL: [Language; 7] = [
        Language::Kr,
        Language::Jp,
        Language::Zh,
        Language::Us,
        Language::Au,
        Language::Ca,
        Language::Fr,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Language::Kr => "kr",
            Language::Jp => "jp",
            Language::Zh => "zh",
            Language::Us => "us",
            Language::Au => "au",
            Language::Ca => "ca",
            Language::Fr => "fr",
        }
    }

    /// Code used in storage folder names. The US dataset lives under `en/`.
    pub fn storage_code(self) -> &'static str {
        match self {
            Language::Us => "en",
            other => other.code(),
        }
    }
}

impl FromStr for Language {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kr" => Ok(Language::Kr),
            "jp" => Ok(Language::Jp),
            "zh" => Ok(Language::Zh),
            "us" | "en" => Ok(Language::Us),
            "au" => Ok(Language::Au),
            "ca" => Ok(Language::Ca),
            "fr" => Ok(Language::Fr),
            _ => Err(DatasetError::UnsupportedLanguage(s.to_string())),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
