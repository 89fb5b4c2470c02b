//! Terminal rendering of a document: gutter plus highlighted text.

use std::io::{self, Write};

use crossterm::queue;
use crossterm::style::{Attribute, Color, ContentStyle, Print, PrintStyledContent};
use qwerty_core::{Editor, GutterLabel};
use qwerty_syntax::{Category, Style};

/// Writes the open document to `out`, one terminal row per line.
///
/// Gutter positions are converted from layout units to terminal cells using
/// the configured digit advance.
pub fn render_document(editor: &Editor, out: &mut impl Write, color: bool) -> anyhow::Result<()> {
    let doc = editor.document()?;
    let advance = editor.config().gutter.digit_advance.max(f32::EPSILON);
    let columns = to_cells(editor.gutter_width(), advance);
    let labels = editor.gutter_labels(0, doc.len_lines());
    let gutter_style = editor.theme().style(Category::Comment);

    for line in 0..doc.len_lines() {
        if columns > 0 {
            let gutter = gutter_cell(labels.get(line), columns, advance);
            write_styled(out, &gutter, gutter_style, color)?;
        }

        let text = doc.line(line)?;
        let mut cursor = 0;
        for styled in doc.styled(line) {
            let span = styled.span;
            // Spans are sorted and disjoint
            queue!(out, Print(&text[cursor..span.start]))?;
            write_styled(out, &text[span.range()], styled.style, color)?;
            cursor = span.end();
        }
        queue!(out, Print(&text[cursor..]), Print('\n'))?;
    }
    out.flush()?;
    Ok(())
}

fn gutter_cell(label: Option<&GutterLabel>, columns: usize, advance: f32) -> String {
    let Some(label) = label else {
        return " ".repeat(columns);
    };
    let start = to_cells(label.x.max(0.0), advance);
    let mut cell = " ".repeat(start);
    cell.push_str(&label.text);
    let used = cell.chars().count();
    cell.push_str(&" ".repeat(columns.saturating_sub(used).max(1)));
    cell
}

fn to_cells(units: f32, advance: f32) -> usize {
    (units / advance).round() as usize
}

fn write_styled(out: &mut impl Write, text: &str, style: &Style, color: bool) -> io::Result<()> {
    if !color {
        return queue!(out, Print(text));
    }
    let mut content = ContentStyle::new();
    content.foreground_color = Some(Color::Rgb {
        r: style.color.r,
        g: style.color.g,
        b: style.color.b,
    });
    if style.bold {
        content.attributes.set(Attribute::Bold);
    }
    if style.italic {
        content.attributes.set(Attribute::Italic);
    }
    queue!(out, PrintStyledContent(content.apply(text)))
}
