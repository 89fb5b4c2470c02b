//! Incremental highlighting.
//!
//! The [`HighlightDriver`] keeps one classification result per document line
//! and recomputes only the lines an edit touched. Lines outside a
//! [`LineDelta`]'s replaced range keep their cached spans; lines after it are
//! shifted, not reclassified.

use std::borrow::Cow;
use std::sync::Arc;

use qwerty_buffer::{LineDelta, TextBuffer};

use crate::{Category, Classify, LanguageRegistry, Span, Style, Theme};

/// Read access to the lines of a document.
pub trait LineSource {
    fn line_count(&self) -> usize;

    /// Line text without its line break.
    fn line_text(&self, line: usize) -> Option<Cow<'_, str>>;
}

impl LineSource for TextBuffer {
    fn line_count(&self) -> usize {
        self.len_lines()
    }

    fn line_text(&self, line: usize) -> Option<Cow<'_, str>> {
        self.line_content(line).ok()
    }
}

impl<S: AsRef<str>> LineSource for [S] {
    fn line_count(&self) -> usize {
        self.len()
    }

    fn line_text(&self, line: usize) -> Option<Cow<'_, str>> {
        self.get(line).map(|s| Cow::Borrowed(s.as_ref()))
    }
}

/// A span paired with the style it should be painted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyledSpan<'a> {
    pub span: Span,
    pub style: &'a Style,
}

#[derive(Debug, Clone, Default)]
struct LineHighlight {
    spans: Vec<Span>,
    /// Set for lines that could not be decoded; cleared when the line changes
    skipped: bool,
}

/// Per-document highlighting state.
pub struct HighlightDriver {
    registry: Arc<LanguageRegistry>,
    theme: Theme,
    classifier: Option<Arc<dyn Classify>>,
    lines: Vec<LineHighlight>,
}

impl HighlightDriver {
    pub fn new(registry: Arc<LanguageRegistry>, theme: Theme) -> Self {
        Self {
            registry,
            theme,
            classifier: None,
            lines: Vec::new(),
        }
    }

    /// Installs highlighting if `file_type` (a file extension) belongs to a
    /// registered language, classifying every line eagerly. Returns whether
    /// highlighting is active.
    pub fn on_file_opened<L>(&mut self, file_type: Option<&str>, source: &L) -> bool
    where
        L: LineSource + ?Sized,
    {
        self.on_file_opened_skipping(file_type, source, &[])
    }

    /// Like [`on_file_opened`](Self::on_file_opened), but the lines in
    /// `malformed` (sorted) are never classified. They stay unhighlighted
    /// until edited.
    pub fn on_file_opened_skipping<L>(
        &mut self,
        file_type: Option<&str>,
        source: &L,
        malformed: &[usize],
    ) -> bool
    where
        L: LineSource + ?Sized,
    {
        self.lines.clear();
        self.classifier = file_type.and_then(|ext| self.registry.for_extension(ext));

        let Some(classifier) = self.classifier.clone() else {
            tracing::debug!(?file_type, "No highlighter for file type");
            return false;
        };

        self.lines = (0..source.line_count())
            .map(|idx| {
                if malformed.binary_search(&idx).is_ok() {
                    LineHighlight {
                        spans: Vec::new(),
                        skipped: true,
                    }
                } else {
                    classify_line(classifier.as_ref(), source, idx)
                }
            })
            .collect();
        tracing::info!(
            language = classifier.language(),
            lines = self.lines.len(),
            skipped = malformed.len(),
            "Highlighting installed"
        );
        true
    }

    /// Recomputes a single line whose text changed in place.
    pub fn on_block_changed<L>(&mut self, line: usize, source: &L)
    where
        L: LineSource + ?Sized,
    {
        let Some(classifier) = self.classifier.clone() else {
            return;
        };
        match self.lines.get_mut(line) {
            Some(slot) => {
                *slot = classify_line(classifier.as_ref(), source, line);
                tracing::trace!(line, "Reclassified line");
            }
            None => tracing::debug!(line, "Ignoring change to unknown line"),
        }
    }

    /// Applies an edit that may have inserted or removed lines.
    pub fn on_lines_replaced<L>(&mut self, delta: LineDelta, source: &L)
    where
        L: LineSource + ?Sized,
    {
        let Some(classifier) = self.classifier.clone() else {
            return;
        };

        let start = delta.start.min(self.lines.len());
        let end = (delta.start + delta.removed).min(self.lines.len());
        let replacement: Vec<LineHighlight> = delta
            .changed_lines()
            .filter(|&idx| idx < source.line_count())
            .map(|idx| classify_line(classifier.as_ref(), source, idx))
            .collect();
        self.lines.splice(start..end, replacement);

        if self.lines.len() != source.line_count() {
            tracing::warn!(
                cached = self.lines.len(),
                actual = source.line_count(),
                "Highlight cache out of sync, reclassifying document"
            );
            self.lines = (0..source.line_count())
                .map(|idx| classify_line(classifier.as_ref(), source, idx))
                .collect();
        }

        tracing::debug!(
            start = delta.start,
            removed = delta.removed,
            inserted = delta.inserted,
            "Reclassified edited lines"
        );
    }

    /// Discards all results, e.g. when the document is closed.
    pub fn on_closed(&mut self) {
        self.classifier = None;
        self.lines.clear();
    }

    /// Returns true if a language highlighter is installed.
    pub fn is_active(&self) -> bool {
        self.classifier.is_some()
    }

    /// Name of the installed language, if any.
    pub fn language(&self) -> Option<&str> {
        self.classifier.as_deref().map(|c| c.language())
    }

    /// Number of lines with cached results.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Cached spans for a line. Empty when inactive or out of range.
    pub fn spans(&self, line: usize) -> &[Span] {
        self.lines
            .get(line)
            .map(|l| l.spans.as_slice())
            .unwrap_or(&[])
    }

    /// Returns true if the line was skipped as malformed.
    pub fn is_skipped(&self, line: usize) -> bool {
        self.lines.get(line).is_some_and(|l| l.skipped)
    }

    /// Display instructions for a line.
    pub fn styled(&self, line: usize) -> impl Iterator<Item = StyledSpan<'_>> + '_ {
        self.spans(line).iter().map(|&span| StyledSpan {
            span,
            style: self.theme.style(span.category),
        })
    }

    pub fn style(&self, category: Category) -> &Style {
        self.theme.style(category)
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }
}

fn classify_line<L>(classifier: &dyn Classify, source: &L, line: usize) -> LineHighlight
where
    L: LineSource + ?Sized,
{
    let spans = source
        .line_text(line)
        .map(|text| classifier.classify(&text))
        .unwrap_or_default();
    LineHighlight {
        spans,
        skipped: false,
    }
}
