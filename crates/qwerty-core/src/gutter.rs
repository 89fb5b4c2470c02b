//! Line-number gutter.
//!
//! The gutter is sized from the document's line count and the width of a
//! digit, then painted from the vertical extents of the visible lines. The
//! host supplies font metrics through [`GlyphMetrics`].

use crate::config::GutterConfig;

/// Font measurements needed to lay out the gutter.
pub trait GlyphMetrics {
    /// Horizontal advance of a single character.
    fn advance(&self, ch: char) -> f32;

    /// Height of one text line.
    fn line_height(&self) -> f32;

    /// Horizontal advance of a string.
    fn text_width(&self, text: &str) -> f32 {
        text.chars().map(|ch| self.advance(ch)).sum()
    }
}

/// Metrics for a fixed-width font, or a character grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMetrics {
    pub advance: f32,
    pub line_height: f32,
}

impl MonospaceMetrics {
    pub fn new(advance: f32, line_height: f32) -> Self {
        Self {
            advance,
            line_height,
        }
    }

    /// One unit per character and per line.
    pub fn cells() -> Self {
        Self::new(1.0, 1.0)
    }
}

impl From<&GutterConfig> for MonospaceMetrics {
    fn from(config: &GutterConfig) -> Self {
        Self::new(config.digit_advance, config.line_height)
    }
}

impl GlyphMetrics for MonospaceMetrics {
    fn advance(&self, _ch: char) -> f32 {
        self.advance
    }

    fn line_height(&self) -> f32 {
        self.line_height
    }
}

/// Vertical placement of one line, in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineExtent {
    /// 0-based line index
    pub line: usize,
    pub top: f32,
    pub height: f32,
}

impl LineExtent {
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// Visible vertical range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub top: f32,
    pub bottom: f32,
}

impl Viewport {
    pub fn new(top: f32, bottom: f32) -> Self {
        Self { top, bottom }
    }

    fn intersects(&self, extent: &LineExtent) -> bool {
        extent.top <= self.bottom && extent.bottom() >= self.top
    }
}

/// Layout snapshot the gutter paints from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GutterState {
    pub line_count: usize,
    pub first_visible: usize,
    /// Extents of the lines from `first_visible` on, in order
    pub extents: Vec<LineExtent>,
}

impl GutterState {
    /// Lays out `visible` lines of equal height starting at `first_visible`,
    /// with the first one at `y = offset`.
    pub fn uniform(
        line_count: usize,
        first_visible: usize,
        visible: usize,
        line_height: f32,
        offset: f32,
    ) -> Self {
        let end = first_visible.saturating_add(visible).min(line_count);
        let extents = (first_visible.min(end)..end)
            .enumerate()
            .map(|(row, line)| LineExtent {
                line,
                top: offset + row as f32 * line_height,
                height: line_height,
            })
            .collect();
        Self {
            line_count,
            first_visible,
            extents,
        }
    }
}

/// One line number to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct GutterLabel {
    /// 0-based line index
    pub line: usize,
    /// 1-based number as shown
    pub text: String,
    pub x: f32,
    pub y: f32,
}

/// How the host should update the gutter after a scroll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GutterUpdate {
    /// Move the painted gutter by this many units
    Shift(f32),
    /// Repaint from the current layout
    Repaint,
}

/// Computes gutter width and label positions.
#[derive(Debug, Clone)]
pub struct GutterRenderer {
    base_margin: f32,
    right_padding: f32,
    line_count: usize,
    width: f32,
}

impl GutterRenderer {
    pub fn new(config: &GutterConfig) -> Self {
        Self {
            base_margin: config.base_margin,
            right_padding: config.right_padding,
            line_count: 0,
            width: config.base_margin,
        }
    }

    /// Width needed to show numbers up to `line_count`.
    pub fn required_width(&self, line_count: usize, metrics: &impl GlyphMetrics) -> f32 {
        self.base_margin + metrics.advance('9') * digit_count(line_count.max(1)) as f32
    }

    /// Records a new line count. Returns the new width if it changed.
    pub fn set_line_count(&mut self, line_count: usize, metrics: &impl GlyphMetrics) -> Option<f32> {
        self.line_count = line_count;
        let width = self.required_width(line_count, metrics);
        if width != self.width {
            tracing::debug!(line_count, old = self.width, new = width, "Gutter width changed");
            self.width = width;
            Some(width)
        } else {
            None
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// Labels for every line that intersects the viewport.
    ///
    /// Extents are expected in top-to-bottom order; painting stops at the
    /// first line that starts below the viewport.
    pub fn paint(
        &self,
        viewport: Viewport,
        state: &GutterState,
        metrics: &impl GlyphMetrics,
    ) -> Vec<GutterLabel> {
        let mut labels = Vec::new();
        for extent in &state.extents {
            if extent.top > viewport.bottom {
                break;
            }
            if !viewport.intersects(extent) {
                continue;
            }
            let text = (extent.line + 1).to_string();
            let x = self.width - self.right_padding - metrics.text_width(&text);
            labels.push(GutterLabel {
                line: extent.line,
                text,
                x,
                y: extent.top,
            });
        }
        labels
    }

    /// Decides how to follow a scroll of `dy` units.
    pub fn on_scroll(&self, dy: f32) -> GutterUpdate {
        if dy != 0.0 {
            GutterUpdate::Shift(dy)
        } else {
            GutterUpdate::Repaint
        }
    }
}

/// Number of decimal digits in `n`.
pub fn digit_count(n: usize) -> usize {
    n.checked_ilog10().map_or(1, |log| log as usize + 1)
}

/// Distance between tab stops for `tab_width` spaces.
pub fn tab_stop_distance(metrics: &impl GlyphMetrics, tab_width: usize) -> f32 {
    metrics.advance(' ') * tab_width as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> GutterRenderer {
        GutterRenderer::new(&GutterConfig::default())
    }

    /// Wider digits than spaces, like a proportional font.
    struct Proportional;

    impl GlyphMetrics for Proportional {
        fn advance(&self, ch: char) -> f32 {
            if ch.is_ascii_digit() { 7.0 } else { 3.0 }
        }

        fn line_height(&self) -> f32 {
            14.0
        }
    }

    #[test]
    fn test_digit_count() {
        assert_eq!(digit_count(0), 1);
        assert_eq!(digit_count(9), 1);
        assert_eq!(digit_count(10), 2);
        assert_eq!(digit_count(1234), 4);
        assert_eq!(digit_count(100_000), 6);
    }

    #[test]
    fn test_width_for_1234_lines() {
        let metrics = MonospaceMetrics::new(8.0, 16.0);
        let gutter = renderer();
        assert_eq!(gutter.required_width(1234, &metrics), 10.0 + 8.0 * 4.0);
    }

    #[test]
    fn test_empty_document_reserves_one_digit() {
        let metrics = MonospaceMetrics::new(8.0, 16.0);
        assert_eq!(renderer().required_width(0, &metrics), 18.0);
    }

    #[test]
    fn test_width_changes_only_on_digit_boundary() {
        let metrics = MonospaceMetrics::new(8.0, 16.0);
        let mut gutter = renderer();
        assert_eq!(gutter.set_line_count(5, &metrics), Some(18.0));
        assert_eq!(gutter.set_line_count(9, &metrics), None);
        assert_eq!(gutter.set_line_count(10, &metrics), Some(26.0));
        assert_eq!(gutter.set_line_count(9, &metrics), Some(18.0));
        assert_eq!(gutter.line_count(), 9);
    }

    #[test]
    fn test_labels_are_right_aligned() {
        let metrics = Proportional;
        let mut gutter = renderer();
        gutter.set_line_count(120, &metrics);
        assert_eq!(gutter.width(), 10.0 + 21.0);

        let state = GutterState::uniform(120, 8, 3, 14.0, 0.0);
        let labels = gutter.paint(Viewport::new(0.0, 42.0), &state, &metrics);
        let texts: Vec<&str> = labels.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["9", "10", "11"]);

        // Right edges line up at width - padding
        for label in &labels {
            let right = label.x + metrics.text_width(&label.text);
            assert_eq!(right, gutter.width() - 5.0);
        }
        assert_eq!(labels[1].y, 14.0);
    }

    #[test]
    fn test_straddling_lines_are_painted_once() {
        let metrics = MonospaceMetrics::cells();
        let mut gutter = renderer();
        gutter.set_line_count(10, &metrics);

        // Viewport starts halfway into line 3 and ends halfway into line 6
        let state = GutterState::uniform(10, 0, 10, 1.0, 0.0);
        let labels = gutter.paint(Viewport::new(2.5, 5.5), &state, &metrics);
        let lines: Vec<usize> = labels.iter().map(|l| l.line).collect();
        assert_eq!(lines, vec![2, 3, 4, 5]);
    }

    #[test]
    fn test_paint_stops_below_viewport() {
        let metrics = MonospaceMetrics::cells();
        let gutter = renderer();
        let state = GutterState::uniform(1000, 0, 1000, 1.0, 0.0);
        let labels = gutter.paint(Viewport::new(0.0, 2.0), &state, &metrics);
        assert_eq!(labels.len(), 3);
    }

    #[test]
    fn test_uniform_clamps_to_line_count() {
        let state = GutterState::uniform(3, 1, 10, 1.0, 0.0);
        assert_eq!(state.extents.len(), 2);
        assert_eq!(state.extents[0].line, 1);
        assert!(GutterState::uniform(3, 5, 10, 1.0, 0.0).extents.is_empty());
    }

    #[test]
    fn test_scroll() {
        let gutter = renderer();
        assert_eq!(gutter.on_scroll(-3.0), GutterUpdate::Shift(-3.0));
        assert_eq!(gutter.on_scroll(0.0), GutterUpdate::Repaint);
    }

    #[test]
    fn test_tab_stop_distance() {
        assert_eq!(tab_stop_distance(&Proportional, 4), 12.0);
        assert_eq!(tab_stop_distance(&MonospaceMetrics::cells(), 8), 8.0);
    }
}
