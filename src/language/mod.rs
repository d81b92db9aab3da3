pub mod core;
pub mod difficulty;

// Re-export the main types for convenience
pub use self::core::{Language, PassageSet};
pub use difficulty::Difficulty;
