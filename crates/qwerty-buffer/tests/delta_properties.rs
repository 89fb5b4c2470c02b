//! Property tests for the line deltas reported by buffer edits.

use proptest::prelude::*;
use qwerty_buffer::{LineDelta, TextBuffer};

// Lone `\r` and `\r\n` are line breaks too, and edits can join or split them
fn text() -> impl Strategy<Value = String> {
    "[a-z =\r\n]{0,40}"
}

/// Applies `delta` to a snapshot of line texts the way a cache would.
fn splice(before: &[String], delta: LineDelta, after: &TextBuffer) -> Vec<String> {
    let mut lines = before.to_vec();
    let replacement = delta
        .changed_lines()
        .map(|idx| after.line_content(idx).unwrap().into_owned());
    lines.splice(delta.start..delta.start + delta.removed, replacement);
    lines
}

fn snapshot(buffer: &TextBuffer) -> Vec<String> {
    buffer.lines().map(|l| l.into_owned()).collect()
}

fn content(buffer: &TextBuffer) -> Vec<String> {
    (0..buffer.len_lines())
        .map(|idx| buffer.line_content(idx).unwrap().into_owned())
        .collect()
}

proptest! {
    #[test]
    fn insert_delta_describes_the_edit(base in text(), insert in text(), at in 0usize..64) {
        let mut buffer = TextBuffer::from(base.as_str());
        let before = content(&buffer);
        let at = at.min(buffer.len_chars());

        let delta = buffer.insert(at, &insert).unwrap();

        prop_assert_eq!(
            before.len() as isize + delta.line_count_change(),
            buffer.len_lines() as isize
        );
        prop_assert_eq!(splice(&before, delta, &buffer), content(&buffer));
    }

    #[test]
    fn delete_delta_describes_the_edit(base in text(), a in 0usize..64, b in 0usize..64) {
        let mut buffer = TextBuffer::from(base.as_str());
        let before = content(&buffer);
        let len = buffer.len_chars();
        let (start, end) = (a.min(b).min(len), a.max(b).min(len));

        let delta = buffer.delete(start..end).unwrap();

        prop_assert_eq!(
            before.len() as isize + delta.line_count_change(),
            buffer.len_lines() as isize
        );
        prop_assert_eq!(splice(&before, delta, &buffer), content(&buffer));
    }

    #[test]
    fn undo_restores_text(base in text(), insert in text(), at in 0usize..64) {
        let mut buffer = TextBuffer::from(base.as_str());
        let original = snapshot(&buffer);
        let at = at.min(buffer.len_chars());

        buffer.insert(at, &insert).unwrap();
        if buffer.can_undo() {
            buffer.undo().unwrap();
            prop_assert_eq!(snapshot(&buffer), original);
        }
    }

    #[test]
    fn undo_delta_describes_the_edit(base in text(), a in 0usize..64, b in 0usize..64) {
        let mut buffer = TextBuffer::from(base.as_str());
        let len = buffer.len_chars();
        let (start, end) = (a.min(b).min(len), a.max(b).min(len));
        buffer.delete(start..end).unwrap();
        let before = content(&buffer);

        if buffer.can_undo() {
            let delta = buffer.undo().unwrap();
            prop_assert_eq!(splice(&before, delta, &buffer), content(&buffer));
        }
    }
}
