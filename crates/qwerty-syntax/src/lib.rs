//! # Qwerty Syntax
//!
//! Line-local syntax highlighting driven by an ordered table of regular
//! expressions.
//!
//! ```text
//! Language (static data)
//!     -> PatternTable (compiled matchers + frozen vocabularies)
//!         -> LineClassifier (one line -> non-overlapping spans)
//!             -> HighlightDriver (per-line cache, incremental updates, styles)
//! ```
//!
//! There is no state carried between lines: a triple-quoted string that
//! spans several lines is not recognized as a string on any of them.

mod category;
mod classify;
mod driver;
mod language;
mod pattern;

use std::collections::HashMap;
use std::sync::Arc;

pub use category::{Category, Color, Style, Theme};
pub use classify::{Classify, LineClassifier, Span};
pub use driver::{HighlightDriver, LineSource, StyledSpan};
pub use language::{LANGUAGES, Language, PYTHON};
pub use pattern::{PatternTable, Rule};

/// Errors that can occur while setting up highlighting.
#[derive(Debug, thiserror::Error)]
pub enum SyntaxError {
    #[error("Unknown language: {0}")]
    UnknownLanguage(String),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Invalid color: {0}")]
    InvalidColor(String),
}

/// Classifiers by language name and file extension.
///
/// Classifiers are compiled once and shared between documents.
#[derive(Default)]
pub struct LanguageRegistry {
    by_name: HashMap<String, Arc<dyn Classify>>,
    by_extension: HashMap<String, Arc<dyn Classify>>,
}

impl LanguageRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with every built-in language.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for language in LANGUAGES {
            match LineClassifier::new(*language) {
                Ok(classifier) => registry.register(language, Arc::new(classifier)),
                Err(e) => tracing::error!(language = language.name, "Failed to compile patterns: {}", e),
            }
        }
        registry
    }

    /// Registers a classifier for a language and all of its extensions.
    pub fn register(&mut self, language: &Language, classifier: Arc<dyn Classify>) {
        for ext in language.extensions {
            self.by_extension
                .insert(ext.to_ascii_lowercase(), classifier.clone());
        }
        self.by_name.insert(language.name.to_string(), classifier);
    }

    /// Gets the classifier for a language name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Classify>, SyntaxError> {
        self.by_name
            .get(name)
            .cloned()
            .ok_or_else(|| SyntaxError::UnknownLanguage(name.to_string()))
    }

    /// Gets the classifier for a file extension, with or without the dot.
    pub fn for_extension(&self, extension: &str) -> Option<Arc<dyn Classify>> {
        let extension = extension.strip_prefix('.').unwrap_or(extension);
        self.by_extension
            .get(&extension.to_ascii_lowercase())
            .cloned()
    }

    /// Returns registered language names, sorted.
    pub fn languages(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_name.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Looks up a built-in language definition by name or extension.
pub fn find_language(name_or_extension: &str) -> Result<&'static Language, SyntaxError> {
    LANGUAGES
        .iter()
        .find(|l| l.name == name_or_extension || l.matches_extension(name_or_extension))
        .ok_or_else(|| SyntaxError::UnknownLanguage(name_or_extension.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry() {
        let registry = LanguageRegistry::with_defaults();
        assert_eq!(registry.languages(), vec!["python"]);
        assert!(registry.for_extension("py").is_some());
        assert!(registry.for_extension(".PY").is_some());
        assert!(registry.for_extension("rs").is_none());
    }

    #[test]
    fn test_unknown_language() {
        let registry = LanguageRegistry::with_defaults();
        assert!(matches!(
            registry.get("cobol"),
            Err(SyntaxError::UnknownLanguage(name)) if name == "cobol"
        ));
        assert!(find_language("cobol").is_err());
        assert_eq!(find_language("py").unwrap().name, "python");
    }
}
