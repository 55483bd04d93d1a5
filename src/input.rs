//! Single-line text entry used by every form.

/// Editable text with a character-based cursor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditField {
    /// Label shown before the value.
    pub caption: String,
    /// Current value.
    pub value: String,
    /// Cursor position in characters.
    pub cursor: usize,
    /// Render the value as `*`.
    pub masked: bool,
}

impl EditField {
    /// Field with the cursor after the initial value.
    pub fn new(caption: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            caption: caption.into(),
            cursor: value.chars().count(),
            value,
            masked: false,
        }
    }

    /// Masked field for passwords.
    pub fn password(caption: impl Into<String>) -> Self {
        Self {
            masked: true,
            ..Self::new(caption, "")
        }
    }

    /// Insert a character at the cursor.
    pub fn insert_char(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
    }

    /// Remove the character before the cursor.
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            let at = self.byte_index(self.cursor - 1);
            self.value.remove(at);
            self.cursor -= 1;
        }
    }

    /// Remove the character under the cursor.
    pub fn delete(&mut self) {
        if self.cursor < self.value.chars().count() {
            let at = self.byte_index(self.cursor);
            self.value.remove(at);
        }
    }

    /// Move left; false when already at the start.
    pub fn move_left(&mut self) -> bool {
        if self.cursor > 0 {
            self.cursor -= 1;
            true
        } else {
            false
        }
    }

    /// Move right; false when already at the end.
    pub fn move_right(&mut self) -> bool {
        if self.cursor < self.value.chars().count() {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.value.chars().count();
    }

    /// Empty the field.
    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    /// Apply an editing key. Returns false for keys the field does not use.
    pub fn handle_key(&mut self, key: &str) -> bool {
        match key {
            "backspace" => self.backspace(),
            "delete" => self.delete(),
            "home" => self.move_home(),
            "end" => self.move_end(),
            "ctrl u" => self.clear(),
            "left" => return self.move_left(),
            "right" => return self.move_right(),
            _ => match crate::keys::printable(key) {
                Some(c) => self.insert_char(c),
                None => return false,
            },
        }
        true
    }

    /// Value as displayed, with `|` marking the cursor when focused, cut to
    /// `width` characters around the cursor.
    pub fn display(&self, focused: bool, width: usize) -> String {
        let chars: Vec<char> = if self.masked {
            vec!['*'; self.value.chars().count()]
        } else {
            self.value.chars().collect()
        };
        // Keep the cursor visible by scrolling horizontally.
        let offset = if width > 1 && self.cursor > width - 2 {
            self.cursor - (width - 2)
        } else {
            0
        };
        let before: String = chars[offset..self.cursor.min(chars.len())].iter().collect();
        let after: String = chars[self.cursor.min(chars.len())..].iter().collect();
        let text = if focused {
            format!("{before}|{after}")
        } else {
            format!("{before}{after}")
        };
        text.chars().take(width.max(1)).collect()
    }

    fn byte_index(&self, char_idx: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }
}
