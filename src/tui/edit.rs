use super::focus::Field;

/// In-place editing of one text field. `original` is restored on cancel.
#[derive(Debug, Clone)]
pub struct EditState {
    pub field: Field,
    pub buffer: String,
    pub cursor: usize,
    pub original: String,
}

impl EditState {
    pub fn new(field: Field, content: String) -> Self {
        Self {
            field,
            cursor: content.len(),
            original: content.clone(),
            buffer: content,
        }
    }

    pub fn insert_char(&mut self, c: char) {
        self.buffer.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn backspace(&mut self) {
        if let Some((start, _)) = self.buffer[..self.cursor].char_indices().next_back() {
            self.buffer.remove(start);
            self.cursor = start;
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.buffer.len() {
            self.buffer.remove(self.cursor);
        }
    }

    pub fn move_cursor_left(&mut self) {
        if let Some((start, _)) = self.buffer[..self.cursor].char_indices().next_back() {
            self.cursor = start;
        }
    }

    pub fn move_cursor_right(&mut self) {
        if let Some(c) = self.buffer[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor = self.buffer.len();
    }

    pub fn delete_word_backward(&mut self) {
        let before = &self.buffer[..self.cursor];
        let trimmed = before.trim_end();
        let word_start = trimmed
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace())
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        self.buffer.replace_range(word_start..self.cursor, "");
        self.cursor = word_start;
    }

    pub fn split_at_cursor(&self) -> (&str, &str) {
        self.buffer.split_at(self.cursor)
    }
}
