use crate::error::{EngineError, Result};
use clap::ValueEnum;
use include_dir::{include_dir, Dir};
use serde::{Deserialize, Serialize};
use serde_json::from_str;

static LANG_DIR: Dir = include_dir!("src/lang");

/// Languages with built-in passages, identified by their ISO 639-1 code.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    ValueEnum,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
pub enum Language {
    #[serde(rename = "tr")]
    #[value(name = "tr")]
    #[strum(serialize = "tr")]
    Turkish,
    #[serde(rename = "en")]
    #[value(name = "en")]
    #[strum(serialize = "en")]
    English,
    #[serde(rename = "es")]
    #[value(name = "es")]
    #[strum(serialize = "es")]
    Spanish,
    #[serde(rename = "fr")]
    #[value(name = "fr")]
    #[strum(serialize = "fr")]
    French,
    #[serde(rename = "de")]
    #[value(name = "de")]
    #[strum(serialize = "de")]
    German,
    #[serde(rename = "it")]
    #[value(name = "it")]
    #[strum(serialize = "it")]
    Italian,
    #[serde(rename = "pt")]
    #[value(name = "pt")]
    #[strum(serialize = "pt")]
    Portuguese,
    #[serde(rename = "ru")]
    #[value(name = "ru")]
    #[strum(serialize = "ru")]
    Russian,
    #[serde(rename = "ja")]
    #[value(name = "ja")]
    #[strum(serialize = "ja")]
    Japanese,
}

impl Language {
    pub const ALL: [Language; 9] = [
        Language::Turkish,
        Language::English,
        Language::Spanish,
        Language::French,
        Language::German,
        Language::Italian,
        Language::Portuguese,
        Language::Russian,
        Language::Japanese,
    ];

    pub fn code(&self) -> String {
        self.to_string()
    }

    /// Native name, as shown in menus
    pub fn native_name(&self) -> &'static str {
        match self {
            Language::Turkish => "Türkçe",
            Language::English => "English",
            Language::Spanish => "Español",
            Language::French => "Français",
            Language::German => "Deutsch",
            Language::Italian => "Italiano",
            Language::Portuguese => "Português",
            Language::Russian => "Русский",
            Language::Japanese => "日本語",
        }
    }

    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|l| l == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn previous(&self) -> Self {
        let idx = Self::ALL.iter().position(|l| l == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Passages bundled for one language
#[derive(Deserialize, Clone, Debug)]
pub struct PassageSet {
    pub code: String,
    pub name: String,
    pub passages: Vec<String>,
}

impl PassageSet {
    pub fn load(language: Language) -> Result<Self> {
        read_passage_file(&format!("{}.json", language.code()))
    }
}

fn read_passage_file(file_name: &str) -> Result<PassageSet> {
    let file = LANG_DIR
        .get_file(file_name)
        .ok_or_else(|| EngineError::PassageData {
            file: file_name.to_string(),
            reason: "file not found".to_string(),
        })?;

    let file_as_str = file
        .contents_utf8()
        .ok_or_else(|| EngineError::PassageData {
            file: file_name.to_string(),
            reason: "not valid utf-8".to_string(),
        })?;

    from_str(file_as_str).map_err(|e| EngineError::PassageData {
        file: file_name.to_string(),
        reason: e.to_string(),
    })
}
