//! Single-line command line for ferrule.
//!
//! [EditBuffer] is the text being edited plus a cursor kept on grapheme boundaries. [Cmdline]
//! pairs a buffer with the [Mode] that owns it and turns key events into edits, submits and
//! aborts.

use crate::app::App;
use crate::app::modes::{Mode, Transition};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Text and a byte cursor that always sits on a grapheme boundary in `[0, len]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditBuffer {
    text: String,
    cursor: usize,
}

impl EditBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A buffer holding `text` with the cursor at its end.
    pub fn with_text(text: impl Into<String>) -> Self {
        let mut buffer = Self::new();
        buffer.set_text(text);
        buffer
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Display width of the text before the cursor.
    pub fn cursor_column(&self) -> usize {
        self.text[..self.cursor].width()
    }

    /// Replaces the text and moves the cursor to the end.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor = self.text.len();
    }

    pub fn clear(&mut self) {
        self.set_text(String::new());
    }

    fn prev_boundary(&self) -> usize {
        self.text[..self.cursor]
            .grapheme_indices(true)
            .next_back()
            .map_or(0, |(i, _)| i)
    }

    fn next_boundary(&self) -> usize {
        self.text[self.cursor..]
            .graphemes(true)
            .next()
            .map_or(self.cursor, |g| self.cursor + g.len())
    }

    fn prev_word_boundary(&self) -> usize {
        let mut idx = self.cursor;
        let mut seen_word = false;
        for (i, g) in self.text[..self.cursor].grapheme_indices(true).rev() {
            let word = g.chars().all(char::is_alphanumeric);
            if seen_word && !word {
                break;
            }
            seen_word |= word;
            idx = i;
        }
        idx
    }

    fn next_word_boundary(&self) -> usize {
        let mut idx = self.cursor;
        let mut seen_word = false;
        for g in self.text[self.cursor..].graphemes(true) {
            let word = g.chars().all(char::is_alphanumeric);
            if seen_word && !word {
                break;
            }
            seen_word |= word;
            idx += g.len();
        }
        idx
    }

    pub fn insert(&mut self, c: char) {
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn insert_str(&mut self, s: &str) {
        self.text.insert_str(self.cursor, s);
        self.cursor += s.len();
    }

    pub fn backspace(&mut self) {
        let start = self.prev_boundary();
        self.text.replace_range(start..self.cursor, "");
        self.cursor = start;
    }

    pub fn delete(&mut self) {
        let end = self.next_boundary();
        self.text.replace_range(self.cursor..end, "");
    }

    pub fn left(&mut self) {
        self.cursor = self.prev_boundary();
    }

    pub fn right(&mut self) {
        self.cursor = self.next_boundary();
    }

    pub fn word_left(&mut self) {
        self.cursor = self.prev_word_boundary();
    }

    pub fn word_right(&mut self) {
        self.cursor = self.next_word_boundary();
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.text.len();
    }

    pub fn kill_to_end(&mut self) {
        self.text.truncate(self.cursor);
    }

    pub fn kill_to_start(&mut self) {
        self.text.replace_range(..self.cursor, "");
        self.cursor = 0;
    }

    pub fn delete_word_backward(&mut self) {
        let start = self.prev_word_boundary();
        self.text.replace_range(start..self.cursor, "");
        self.cursor = start;
    }

    /// Moves the cursor by `offset` graphemes, negative to the left. Stops at either end.
    pub fn move_cursor(&mut self, offset: isize) {
        for _ in 0..offset.unsigned_abs() {
            if offset < 0 {
                self.left();
            } else {
                self.right();
            }
        }
    }
}

/// What a key did to the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    Changed,
    Submit,
    Abort,
    Ignored,
}

/// Applies the line-editing bindings to `buffer`.
pub fn edit_key(buffer: &mut EditBuffer, key: KeyEvent) -> Edit {
    use KeyCode::*;

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        Enter => return Edit::Submit,
        Esc => return Edit::Abort,
        Char('g') if ctrl => return Edit::Abort,
        Char('m') | Char('j') if ctrl => return Edit::Submit,

        Char('a') if ctrl => buffer.home(),
        Char('e') if ctrl => buffer.end(),
        Char('b') if ctrl => buffer.word_left(),
        Char('f') if ctrl => buffer.word_right(),
        Char('h') if ctrl => buffer.backspace(),
        Char('d') if ctrl => buffer.delete(),
        Char('k') if ctrl => buffer.kill_to_end(),
        Char('u') if ctrl => buffer.kill_to_start(),
        Char('w') if ctrl => buffer.delete_word_backward(),
        Char(_) if ctrl => return Edit::Ignored,
        Char(c) => buffer.insert(c),

        Left => buffer.left(),
        Right => buffer.right(),
        Home => buffer.home(),
        End => buffer.end(),
        Backspace => buffer.backspace(),
        Delete => buffer.delete(),
        _ => return Edit::Ignored,
    }
    Edit::Changed
}

/// The command-line widget: a mode and the buffer it edits.
#[derive(Debug)]
pub struct Cmdline {
    mode: Mode,
    buffer: EditBuffer,
}

impl Cmdline {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            buffer: EditBuffer::new(),
        }
    }

    pub fn with_text(mode: Mode, text: impl Into<String>) -> Self {
        Self {
            mode,
            buffer: EditBuffer::with_text(text),
        }
    }

    #[inline]
    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    #[inline]
    pub fn buffer(&self) -> &EditBuffer {
        &self.buffer
    }

    #[inline]
    pub fn buffer_mut(&mut self) -> &mut EditBuffer {
        &mut self.buffer
    }

    /// Handles one key. Returns false once the widget is done.
    pub fn input(&mut self, key: KeyEvent, app: &mut App) -> bool {
        match edit_key(&mut self.buffer, key) {
            Edit::Submit => match self.mode.on_submit(&mut self.buffer, app) {
                Transition::Stay => true,
                Transition::Exit => false,
            },
            Edit::Abort => {
                tracing::debug!(mode = self.mode.name(), "aborted");
                false
            }
            Edit::Changed | Edit::Ignored => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn cursor_stays_on_graphemes() {
        let mut buf = EditBuffer::with_text("ae\u{301}x");
        buf.left();
        assert_eq!(buf.cursor(), 4);
        buf.left();
        assert_eq!(buf.cursor(), 1);
        buf.backspace();
        assert_eq!(buf.text(), "e\u{301}x");
        assert_eq!(buf.cursor(), 0);
        buf.backspace();
        assert_eq!(buf.cursor(), 0);
        buf.end();
        buf.right();
        assert_eq!(buf.cursor(), buf.text().len());
    }

    #[test]
    fn move_cursor_from_end() {
        let mut buf = EditBuffer::with_text("cp -r -v %M %D2");
        buf.move_cursor(-7);
        assert_eq!(&buf.text()[..buf.cursor()], "cp -r -v");
        buf.move_cursor(100);
        assert_eq!(buf.cursor(), buf.text().len());
        buf.move_cursor(-100);
        assert_eq!(buf.cursor(), 0);
    }

    #[test]
    fn word_motions_and_kills() {
        let mut buf = EditBuffer::with_text("mv foo.txt bar");
        assert_eq!(edit_key(&mut buf, ctrl('w')), Edit::Changed);
        assert_eq!(buf.text(), "mv foo.txt ");
        edit_key(&mut buf, ctrl('b'));
        assert_eq!(&buf.text()[buf.cursor()..], "txt ");
        edit_key(&mut buf, ctrl('k'));
        assert_eq!(buf.text(), "mv foo.");
        edit_key(&mut buf, ctrl('a'));
        edit_key(&mut buf, ctrl('f'));
        assert_eq!(buf.cursor(), 2);
        edit_key(&mut buf, ctrl('u'));
        assert_eq!(buf.text(), " foo.");
    }

    #[test]
    fn submit_and_abort_keys() {
        let mut buf = EditBuffer::new();
        assert_eq!(edit_key(&mut buf, key(KeyCode::Enter)), Edit::Submit);
        assert_eq!(edit_key(&mut buf, key(KeyCode::Esc)), Edit::Abort);
        assert_eq!(edit_key(&mut buf, ctrl('g')), Edit::Abort);
        assert_eq!(edit_key(&mut buf, key(KeyCode::F(2))), Edit::Ignored);
        edit_key(&mut buf, KeyEvent::new(KeyCode::Char('Y'), KeyModifiers::SHIFT));
        assert_eq!(buf.text(), "Y");
    }

    #[test]
    fn column_counts_wide_chars() {
        let buf = EditBuffer::with_text("日本");
        assert_eq!(buf.cursor_column(), 4);
    }
}
