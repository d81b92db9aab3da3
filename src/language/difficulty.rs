use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Passage length cap applied in free mode
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Default,
    ValueEnum,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Maximum passage length in characters
    pub fn max_length(&self) -> usize {
        match self {
            Difficulty::Easy => 100,
            Difficulty::Medium => 200,
            Difficulty::Hard => 300,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Hard,
            Difficulty::Medium => Difficulty::Easy,
            Difficulty::Hard => Difficulty::Medium,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_lengths() {
        assert_eq!(Difficulty::Easy.max_length(), 100);
        assert_eq!(Difficulty::Medium.max_length(), 200);
        assert_eq!(Difficulty::Hard.max_length(), 300);
    }

    #[test]
    fn test_display_is_lowercase() {
        assert_eq!(Difficulty::Hard.to_string(), "hard");
    }

    #[test]
    fn test_cycle() {
        for d in Difficulty::ALL {
            assert_eq!(d.next().previous(), d);
        }
    }
}
