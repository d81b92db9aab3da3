use crate::{
    error::{EngineError, Result},
    language::{Language, PassageSet},
};
use itertools::Itertools;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use std::collections::HashMap;

/// Number of bundled passages joined into one test passage
pub const PASSAGES_PER_TEST: usize = 16;

/// What the engine asks a provider for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassageRequest {
    pub language: Language,
    pub min_length: Option<usize>,
}

/// Source of target text for a session.
///
/// Repeated calls may return different content; nothing is guaranteed about
/// uniqueness.
pub trait PassageProvider {
    fn get_passage(&mut self, request: &PassageRequest) -> Result<String>;
}

/// Provider backed by the passages compiled into the binary
pub struct EmbeddedPassages {
    sets: HashMap<Language, Vec<String>>,
    rng: StdRng,
}

impl EmbeddedPassages {
    pub fn load() -> Result<Self> {
        Self::load_with_rng(StdRng::from_entropy())
    }

    /// Deterministic selection, for tests and reproducible runs
    pub fn with_seed(seed: u64) -> Result<Self> {
        Self::load_with_rng(StdRng::seed_from_u64(seed))
    }

    fn load_with_rng(rng: StdRng) -> Result<Self> {
        let mut sets = HashMap::new();
        for language in Language::ALL {
            let set = PassageSet::load(language)?;
            sets.insert(language, set.passages);
        }
        Ok(Self { sets, rng })
    }

    pub fn from_sets(sets: HashMap<Language, Vec<String>>, seed: u64) -> Self {
        Self {
            sets,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl PassageProvider for EmbeddedPassages {
    fn get_passage(&mut self, request: &PassageRequest) -> Result<String> {
        let passages = self
            .sets
            .get(&request.language)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| EngineError::NoPassages {
                language: request.language.code(),
            })?;

        let min_length = request.min_length.unwrap_or(0);
        let mut picked: Vec<&str> = Vec::with_capacity(PASSAGES_PER_TEST);
        let mut length = 0;
        while picked.len() < PASSAGES_PER_TEST || length < min_length {
            let Some(passage) = passages.choose(&mut self.rng) else {
                break;
            };
            length += passage.chars().count() + 1;
            picked.push(passage.as_str());
        }

        Ok(picked.iter().join(" ").trim().to_string())
    }
}

/// Provider that always hands back the same text
#[derive(Debug, Clone)]
pub struct FixedPassage(pub String);

impl PassageProvider for FixedPassage {
    fn get_passage(&mut self, _request: &PassageRequest) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Shorten `text` to at most `max_length` characters on a word boundary.
///
/// Words are accumulated while `result + " " + word` still fits, so the first
/// word has to leave room for one separator. When not even that fits, the
/// text is cut at `max_length` characters instead.
pub fn fit_to_length(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        return text.to_string();
    }

    let mut result = String::new();
    let mut result_len = 0;
    for word in text.split(' ') {
        let word_len = word.chars().count();
        if result_len + 1 + word_len > max_length {
            break;
        }
        if !result.is_empty() {
            result.push(' ');
            result_len += 1;
        }
        result.push_str(word);
        result_len += word_len;
    }

    if result.is_empty() {
        text.chars().take(max_length).collect()
    } else {
        result
    }
}
