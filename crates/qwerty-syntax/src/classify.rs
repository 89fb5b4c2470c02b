//! Line classification.
//!
//! [`LineClassifier::classify`] turns one line of text into the sorted,
//! non-overlapping spans that get painted:
//!
//! 1. A comment introducer anywhere on the line claims everything from there
//!    to the end of the line, and nothing else is evaluated.
//! 2. Complete string literals are found next; their ranges are protected.
//! 3. The remaining rules run in [`Rule::ORDER`]. A candidate starting inside
//!    a protected range is dropped, identifier candidates whose text is a
//!    keyword or built-in are dropped, and a candidate overlapping text
//!    already claimed by an earlier rule is dropped.
//!
//! Offsets are byte offsets into the line, which must not include its line
//! break. Classification is line-local: a string or comment never continues
//! onto the next line.

use std::ops::Range;

use crate::pattern::{PatternTable, Rule};
use crate::{Category, Language, SyntaxError};

/// A classified run of text within one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub category: Category,
    /// Start byte offset
    pub start: usize,
    /// Length in bytes
    pub len: usize,
}

impl Span {
    pub fn new(category: Category, start: usize, len: usize) -> Self {
        Self {
            category,
            start,
            len,
        }
    }

    fn from_range(category: Category, range: Range<usize>) -> Self {
        Self::new(category, range.start, range.end - range.start)
    }

    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }

    fn overlaps(&self, other: &Range<usize>) -> bool {
        self.start < other.end && other.start < self.end()
    }
}

/// Anything that can classify a single line.
///
/// The highlight driver only depends on this trait, so hosts can wrap the
/// real classifier (for caching, counting, tracing) without touching the
/// driver.
pub trait Classify: Send + Sync {
    /// Name of the language this classifier highlights.
    fn language(&self) -> &str;

    /// Classifies one line. Must be a pure function of `line`.
    fn classify(&self, line: &str) -> Vec<Span>;
}

/// The regex-driven classifier for one language.
#[derive(Debug, Clone)]
pub struct LineClassifier {
    table: PatternTable,
}

impl LineClassifier {
    pub fn new(language: Language) -> Result<Self, SyntaxError> {
        Ok(Self {
            table: PatternTable::new(language)?,
        })
    }

    pub fn table(&self) -> &PatternTable {
        &self.table
    }

    /// Classifies one line.
    ///
    /// # Example
    /// ```
    /// use qwerty_syntax::{Category, LineClassifier, Span, PYTHON};
    ///
    /// let classifier = LineClassifier::new(PYTHON).unwrap();
    /// assert_eq!(
    ///     classifier.classify("def add(a, b):"),
    ///     vec![
    ///         Span::new(Category::Keyword, 0, 3),
    ///         Span::new(Category::Definition, 4, 3),
    ///     ]
    /// );
    /// ```
    pub fn classify(&self, line: &str) -> Vec<Span> {
        if line.is_empty() {
            return Vec::new();
        }

        if let Some(start) = self.table.comment_start(line) {
            return vec![Span::new(Category::Comment, start, line.len() - start)];
        }

        let protected = self.table.strings(line);
        let mut painted = PaintSet::default();
        for range in &protected {
            painted.claim(Span::from_range(Category::String, range.clone()));
        }

        for rule in Rule::ORDER {
            for range in self.table.candidates(rule, line) {
                if protected.iter().any(|p| p.contains(&range.start)) {
                    continue;
                }
                if rule.is_identifier() && self.is_reserved(&line[range.clone()]) {
                    continue;
                }
                painted.claim(Span::from_range(rule.category(), range));
            }
        }

        painted.into_spans()
    }

    fn is_reserved(&self, word: &str) -> bool {
        self.table.is_keyword(word) || self.table.is_builtin(word)
    }
}

impl Classify for LineClassifier {
    fn language(&self) -> &str {
        self.table.language().name
    }

    fn classify(&self, line: &str) -> Vec<Span> {
        LineClassifier::classify(self, line)
    }
}

/// Spans sorted by start offset, never overlapping.
#[derive(Debug, Default)]
struct PaintSet {
    spans: Vec<Span>,
}

impl PaintSet {
    /// Adds `span` unless it overlaps text that is already claimed.
    fn claim(&mut self, span: Span) -> bool {
        if span.len == 0 {
            return false;
        }
        let range = span.range();
        let idx = self.spans.partition_point(|s| s.start < span.start);
        let hits_prev = idx > 0 && self.spans[idx - 1].overlaps(&range);
        let hits_next = self.spans.get(idx).is_some_and(|s| s.overlaps(&range));
        if hits_prev || hits_next {
            return false;
        }
        self.spans.insert(idx, span);
        true
    }

    fn into_spans(self) -> Vec<Span> {
        self.spans
    }
}
