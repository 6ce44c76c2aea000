use ropey::{Rope, RopeSlice};

/// Where the caret sits, as a line plus a char column within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub line: usize,
    /// Counted in chars, not bytes or display cells.
    pub col: usize,
    /// Column that Up/Down try to return to after crossing short lines.
    preferred_col: usize,
}

impl Cursor {
    pub const fn at(line: usize, col: usize) -> Self {
        Self {
            line,
            col,
            preferred_col: col,
        }
    }

    const fn jump_to_col(&mut self, col: usize) {
        self.col = col;
        self.preferred_col = col;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// The draft text, backed by a rope.
///
/// Every mutating method reports whether the content actually changed so the
/// caller can decide whether an edit invalidates pending suggestions.
pub struct EditorBuffer {
    rope: Rope,
    cursor: Cursor,
}

impl EditorBuffer {
    /// Load `text`; the caret starts at the top left.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            cursor: Cursor::default(),
        }
    }

    pub fn empty() -> Self {
        Self::from_text("")
    }

    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Lines as ropey counts them, so a trailing newline opens an empty last line.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Content length in chars. This is the length suggestions are checked against.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Whether the buffer holds nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        self.rope.chars().all(char::is_whitespace)
    }

    /// Text of `idx` with its line ending stripped, or `None` past the end.
    pub fn line_at(&self, idx: usize) -> Option<String> {
        (idx < self.rope.len_lines()).then(|| {
            let slice = self.rope.line(idx);
            slice.slice(..content_len(slice)).to_string()
        })
    }

    /// Chars on `idx` excluding the line ending; 0 past the end.
    pub fn line_len(&self, idx: usize) -> usize {
        if idx < self.rope.len_lines() {
            content_len(self.rope.line(idx))
        } else {
            0
        }
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Swap in new content. The caret is clamped into it rather than reset.
    pub fn set_text(&mut self, text: &str) -> bool {
        if self.rope == text {
            return false;
        }
        self.rope = Rope::from_str(text);
        let Cursor { line, col, .. } = self.cursor;
        self.move_to(line, col);
        true
    }

    /// Append text at the very end of the buffer in a single insertion and
    /// park the cursor after it.
    pub fn append(&mut self, s: &str) -> bool {
        if s.is_empty() {
            return false;
        }
        self.rope.insert(self.rope.len_chars(), s);
        self.move_to_end();
        true
    }

    pub fn insert_char(&mut self, ch: char) -> bool {
        if ch == '\n' {
            return self.split_line();
        }
        let at = self.cursor_char_idx();
        self.rope.insert_char(at, ch);
        self.cursor.jump_to_col(self.cursor.col + 1);
        true
    }

    pub fn split_line(&mut self) -> bool {
        let at = self.cursor_char_idx();
        self.rope.insert_char(at, '\n');
        self.cursor.line += 1;
        self.cursor.jump_to_col(0);
        true
    }

    /// Backspace. `false` at the start of the buffer.
    pub fn delete_back(&mut self) -> bool {
        let end = self.cursor_char_idx();
        if end == 0 {
            return false;
        }
        // A CRLF pair goes as one unit so the cursor never lands between them.
        let start = if end >= 2
            && self.rope.char(end - 1) == '\n'
            && self.rope.char(end - 2) == '\r'
        {
            end - 2
        } else {
            end - 1
        };
        self.rope.remove(start..end);
        self.place_cursor_at_char(start);
        true
    }

    /// Delete key. `false` at the end of the buffer.
    pub fn delete_forward(&mut self) -> bool {
        let start = self.cursor_char_idx();
        let total = self.rope.len_chars();
        if start >= total {
            return false;
        }
        let crlf = self.rope.char(start) == '\r'
            && start + 1 < total
            && self.rope.char(start + 1) == '\n';
        let end = if crlf { start + 2 } else { start + 1 };
        self.rope.remove(start..end);
        true
    }

    /// Arrow-key movement. Left and Right wrap across line ends.
    pub fn move_cursor(&mut self, direction: Direction) {
        let Cursor { line, col, .. } = self.cursor;
        match direction {
            Direction::Left if col > 0 => self.cursor.jump_to_col(col - 1),
            Direction::Left if line > 0 => {
                self.cursor.line = line - 1;
                self.cursor.jump_to_col(self.line_len(line - 1));
            }
            Direction::Right if col < self.line_len(line) => self.cursor.jump_to_col(col + 1),
            Direction::Right if line + 1 < self.line_count() => {
                self.cursor.line = line + 1;
                self.cursor.jump_to_col(0);
            }
            Direction::Up if line > 0 => self.step_vertically(line - 1),
            Direction::Down if line + 1 < self.line_count() => self.step_vertically(line + 1),
            _ => {}
        }
    }

    fn step_vertically(&mut self, line: usize) {
        self.cursor.line = line;
        self.cursor.col = self.cursor.preferred_col.min(self.line_len(line));
    }

    pub const fn move_home(&mut self) {
        self.cursor.jump_to_col(0);
    }

    pub fn move_end(&mut self) {
        self.cursor.jump_to_col(self.line_len(self.cursor.line));
    }

    /// Place the caret at (`line`, `col`), clamped to the content.
    pub fn move_to(&mut self, line: usize, col: usize) {
        let line = line.min(self.line_count().saturating_sub(1));
        self.cursor.line = line;
        self.cursor.jump_to_col(col.min(self.line_len(line)));
    }

    pub const fn move_to_start(&mut self) {
        self.cursor = Cursor::at(0, 0);
    }

    /// Caret after the last char, i.e. the point where suggestions merge.
    pub fn move_to_end(&mut self) {
        self.place_cursor_at_char(self.rope.len_chars());
    }

    /// Line and column of a char offset, clamped to the buffer.
    pub fn position_of_char(&self, char_idx: usize) -> (usize, usize) {
        let idx = char_idx.min(self.rope.len_chars());
        let line = self.rope.char_to_line(idx);
        let col = (idx - self.rope.line_to_char(line)).min(self.line_len(line));
        (line, col)
    }

    /// Absolute char offset of the cursor.
    pub fn cursor_char_idx(&self) -> usize {
        let line = self.cursor.line.min(self.line_count().saturating_sub(1));
        self.rope.line_to_char(line) + self.cursor.col.min(self.line_len(line))
    }

    fn place_cursor_at_char(&mut self, char_idx: usize) {
        let (line, col) = self.position_of_char(char_idx);
        self.cursor.line = line;
        self.cursor.jump_to_col(col);
    }
}

/// Chars in `line` before its `\n` / `\r\n` terminator.
fn content_len(line: RopeSlice<'_>) -> usize {
    let mut len = line.len_chars();
    if len > 0 && line.char(len - 1) == '\n' {
        len -= 1;
        if len > 0 && line.char(len - 1) == '\r' {
            len -= 1;
        }
    }
    len
}

impl Default for EditorBuffer {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for EditorBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "EditorBuffer {{ lines: {}, chars: {}, cursor: {}:{} }}",
            self.rope.len_lines(),
            self.rope.len_chars(),
            self.cursor.line,
            self.cursor.col
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;


    #[test]
    fn test_empty_buffer_is_one_blank_line() {
        let buf = EditorBuffer::empty();
        assert_eq!(buf.line_count(), 1);
        assert_eq!(buf.line_at(0), Some(String::new()));
        assert!(buf.is_blank());
    }

    #[test]
    fn test_from_text_splits_lines() {
        let buf = EditorBuffer::from_text("Dear reader,\nthanks");
        assert_eq!(buf.line_count(), 2);
        assert_eq!(buf.line_at(0).as_deref(), Some("Dear reader,"));
        assert_eq!(buf.line_at(1).as_deref(), Some("thanks"));
        assert_eq!(buf.len_chars(), 19);
    }

    #[test]
    fn test_line_at_strips_crlf() {
        let buf = EditorBuffer::from_text("hello\r\nworld");
        assert_eq!(buf.line_at(0), Some("hello".to_string()));
        assert_eq!(buf.line_len(0), 5);
    }

    #[test]
    fn test_line_at_out_of_bounds_returns_none() {
        let buf = EditorBuffer::from_text("draft");
        assert_eq!(buf.line_at(1), None);
        assert_eq!(buf.line_len(7), 0);
    }

    #[test]
    fn test_line_len_counts_chars_not_bytes() {
        let buf = EditorBuffer::from_text("café");
        assert_eq!(buf.line_len(0), 4);
        assert_eq!(buf.len_chars(), 4);
    }


    #[test]
    fn test_set_text_reports_change() {
        let mut buf = EditorBuffer::from_text("Draft");
        assert!(buf.set_text("Draft more"));
        assert_eq!(buf.text(), "Draft more");
        assert!(!buf.set_text("Draft more"));
    }

    #[test]
    fn test_set_text_clamps_cursor() {
        let mut buf = EditorBuffer::from_text("one\ntwo\nthree");
        buf.move_to(2, 5);
        buf.set_text("x");
        assert_eq!(buf.cursor(), Cursor::at(0, 1));
    }


    #[test]
    fn test_append_moves_cursor_to_end() {
        let mut buf = EditorBuffer::from_text("Hello");
        assert!(buf.append(" world"));
        assert_eq!(buf.text(), "Hello world");
        assert_eq!(buf.cursor(), Cursor::at(0, 11));
    }

    #[test]
    fn test_append_empty_is_noop() {
        let mut buf = EditorBuffer::from_text("Hello");
        assert!(!buf.append(""));
        assert_eq!(buf.cursor(), Cursor::at(0, 0));
    }


    #[test]
    fn test_insert_char_in_middle() {
        let mut buf = EditorBuffer::from_text("hllo");
        buf.move_cursor(Direction::Right);
        assert!(buf.insert_char('e'));
        assert_eq!(buf.text(), "hello");
        assert_eq!(buf.cursor(), Cursor::at(0, 2));
    }

    #[test]
    fn test_insert_multibyte_char_advances_one_column() {
        let mut buf = EditorBuffer::from_text("caf");
        buf.move_end();
        buf.insert_char('é');
        buf.insert_char('!');
        assert_eq!(buf.text(), "café!");
        assert_eq!(buf.cursor(), Cursor::at(0, 5));
    }

    #[test]
    fn test_insert_newline_char_splits() {
        let mut buf = EditorBuffer::from_text("ab");
        buf.move_to(0, 1);
        buf.insert_char('\n');
        assert_eq!(buf.text(), "a\nb");
        assert_eq!(buf.cursor(), Cursor::at(1, 0));
    }


    #[test]
    fn test_delete_back_at_start_is_noop() {
        let mut buf = EditorBuffer::from_text("hello");
        assert!(!buf.delete_back());
        assert_eq!(buf.text(), "hello");
    }

    #[test]
    fn test_delete_back_joins_lines() {
        let mut buf = EditorBuffer::from_text("hello\nworld");
        buf.move_to(1, 0);
        assert!(buf.delete_back());
        assert_eq!(buf.text(), "helloworld");
        assert_eq!(buf.cursor(), Cursor::at(0, 5));
    }

    #[test]
    fn test_delete_back_removes_crlf_as_unit() {
        let mut buf = EditorBuffer::from_text("ab\r\ncd");
        buf.move_to(1, 0);
        buf.delete_back();
        assert_eq!(buf.text(), "abcd");
        assert_eq!(buf.cursor(), Cursor::at(0, 2));
    }

    #[test]
    fn test_delete_back_multibyte() {
        let mut buf = EditorBuffer::from_text("café");
        buf.move_end();
        buf.delete_back();
        assert_eq!(buf.text(), "caf");
    }

    #[test]
    fn test_delete_forward_at_end_is_noop() {
        let mut buf = EditorBuffer::from_text("hello");
        buf.move_end();
        assert!(!buf.delete_forward());
    }

    #[test]
    fn test_delete_forward_joins_lines() {
        let mut buf = EditorBuffer::from_text("hello\nworld");
        buf.move_to(0, 5);
        assert!(buf.delete_forward());
        assert_eq!(buf.text(), "helloworld");
        assert_eq!(buf.cursor(), Cursor::at(0, 5));
    }


    #[test]
    fn test_move_left_wraps_to_prev_line() {
        let mut buf = EditorBuffer::from_text("hello\nworld");
        buf.move_to(1, 0);
        buf.move_cursor(Direction::Left);
        assert_eq!(buf.cursor(), Cursor::at(0, 5));
    }

    #[test]
    fn test_move_right_wraps_to_next_line() {
        let mut buf = EditorBuffer::from_text("hello\nworld");
        buf.move_to(0, 5);
        buf.move_cursor(Direction::Right);
        assert_eq!(buf.cursor(), Cursor::at(1, 0));
    }

    #[test]
    fn test_column_memory_across_short_line() {
        let mut buf = EditorBuffer::from_text("hello\nhi\nworld");
        buf.move_to(0, 4);
        buf.move_cursor(Direction::Down);
        assert_eq!(buf.cursor().col, 2);
        buf.move_cursor(Direction::Down);
        assert_eq!(buf.cursor().line, 2);
        assert_eq!(buf.cursor().col, 4);
    }

    #[test]
    fn test_move_to_clamps() {
        let mut buf = EditorBuffer::from_text("hello");
        buf.move_to(100, 100);
        assert_eq!(buf.cursor(), Cursor::at(0, 5));
    }

    #[test]
    fn test_move_to_start_and_end() {
        let mut buf = EditorBuffer::from_text("hello\nworld");
        buf.move_to_end();
        assert_eq!(buf.cursor(), Cursor::at(1, 5));
        buf.move_to_start();
        assert_eq!(buf.cursor(), Cursor::at(0, 0));
    }


    #[test]
    fn test_cursor_char_idx_counts_newlines() {
        let mut buf = EditorBuffer::from_text("ab\ncd");
        buf.move_to(1, 1);
        assert_eq!(buf.cursor_char_idx(), 4);
    }

    #[test]
    fn test_position_of_char_end_of_buffer() {
        let buf = EditorBuffer::from_text("ab\ncd\n");
        assert_eq!(buf.position_of_char(buf.len_chars()), (2, 0));
        assert_eq!(buf.position_of_char(usize::MAX), (2, 0));
        assert_eq!(buf.position_of_char(4), (1, 1));
    }
}
