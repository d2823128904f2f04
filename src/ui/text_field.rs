//! Single-line text buffer edited through [`TextEdit`] messages.
//!
//! Modals keep a `TextField` per input inside their model. Key handling maps a
//! key to a `TextEdit` without touching the buffer; the update function applies
//! the edit. This keeps input handling pure.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEdit {
    Insert(char),
    Backspace,
    Delete,
    DeleteWord,
    Left,
    Right,
    Home,
    End,
    Clear,
}

impl TextEdit {
    /// The edit a key performs in a focused text field, if any.
    pub fn from_key(key: &KeyEvent) -> Option<Self> {
        Some(match (key.code, key.modifiers) {
            (KeyCode::Backspace, KeyModifiers::ALT) | (KeyCode::Char('w'), KeyModifiers::CONTROL) => {
                Self::DeleteWord
            }
            (KeyCode::Backspace, _) => Self::Backspace,
            (KeyCode::Delete, _) => Self::Delete,
            (KeyCode::Left, _) => Self::Left,
            (KeyCode::Right, _) => Self::Right,
            (KeyCode::Home, _) | (KeyCode::Char('a'), KeyModifiers::CONTROL) => Self::Home,
            (KeyCode::End, _) | (KeyCode::Char('e'), KeyModifiers::CONTROL) => Self::End,
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => Self::Clear,
            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => Self::Insert(c),
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextField {
    value: String,
    /// Cursor position in characters.
    cursor: usize,
}

impl TextField {
    /// A field holding `value` with the cursor at the end.
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let cursor = value.chars().count();
        Self { value, cursor }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn trimmed(&self) -> &str {
        self.value.trim()
    }

    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map_or(self.value.len(), |(i, _)| i)
    }

    fn len(&self) -> usize {
        self.value.chars().count()
    }

    pub fn apply(&mut self, edit: TextEdit) {
        match edit {
            TextEdit::Insert(c) => {
                let at = self.byte_index(self.cursor);
                self.value.insert(at, c);
                self.cursor += 1;
            }
            TextEdit::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = self.byte_index(self.cursor);
                    self.value.remove(at);
                }
            }
            TextEdit::Delete => {
                if self.cursor < self.len() {
                    let at = self.byte_index(self.cursor);
                    self.value.remove(at);
                }
            }
            TextEdit::DeleteWord => {
                let chars: Vec<char> = self.value.chars().collect();
                let mut start = self.cursor;
                while start > 0 && chars[start - 1] == ' ' {
                    start -= 1;
                }
                while start > 0 && chars[start - 1] != ' ' {
                    start -= 1;
                }
                let (from, to) = (self.byte_index(start), self.byte_index(self.cursor));
                self.value.drain(from..to);
                self.cursor = start;
            }
            TextEdit::Left => self.cursor = self.cursor.saturating_sub(1),
            TextEdit::Right => self.cursor = (self.cursor + 1).min(self.len()),
            TextEdit::Home => self.cursor = 0,
            TextEdit::End => self.cursor = self.len(),
            TextEdit::Clear => {
                self.value.clear();
                self.cursor = 0;
            }
        }
    }

    /// The field's content as a line, with a block cursor when focused.
    pub fn line(&self, focused: bool, placeholder: &str, theme: &Theme) -> Line<'static> {
        let text_style = Style::default().fg(theme.text);
        let cursor_style = Style::default()
            .fg(theme.base)
            .bg(theme.text)
            .add_modifier(Modifier::BOLD);

        if self.value.is_empty() {
            let placeholder = Span::styled(placeholder.to_string(), Style::default().fg(theme.muted()));
            return if focused {
                Line::from(vec![Span::styled(" ", cursor_style), placeholder])
            } else {
                Line::from(placeholder)
            };
        }
        if !focused {
            return Line::from(Span::styled(self.value.clone(), text_style));
        }

        let split = self.byte_index(self.cursor);
        let (before, after) = self.value.split_at(split);
        let mut rest = after.chars();
        let under_cursor = rest.next().unwrap_or(' ');
        Line::from(vec![
            Span::styled(before.to_string(), text_style),
            Span::styled(under_cursor.to_string(), cursor_style),
            Span::styled(rest.as_str().to_string(), text_style),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> TextField {
        let mut field = TextField::default();
        for c in text.chars() {
            field.apply(TextEdit::Insert(c));
        }
        field
    }

    #[test]
    fn inserts_at_cursor() {
        let mut field = typed("Hat");
        field.apply(TextEdit::Left);
        field.apply(TextEdit::Left);
        field.apply(TextEdit::Insert('e'));
        assert_eq!(field.value(), "Heat");
        assert_eq!(field.cursor(), 2);
    }

    #[test]
    fn handles_multibyte_characters() {
        let mut field = typed("Amélie");
        field.apply(TextEdit::Home);
        field.apply(TextEdit::Right);
        field.apply(TextEdit::Right);
        field.apply(TextEdit::Delete);
        assert_eq!(field.value(), "Amlie");
        field.apply(TextEdit::End);
        field.apply(TextEdit::Backspace);
        assert_eq!(field.value(), "Amli");
    }

    #[test]
    fn deletes_previous_word() {
        let mut field = typed("Spirited Away ");
        field.apply(TextEdit::DeleteWord);
        assert_eq!(field.value(), "Spirited ");
        field.apply(TextEdit::Clear);
        assert_eq!(field.value(), "");
        assert_eq!(field.cursor(), 0);
    }

    #[test]
    fn cursor_stays_in_bounds() {
        let mut field = TextField::new("ab");
        field.apply(TextEdit::Right);
        assert_eq!(field.cursor(), 2);
        field.apply(TextEdit::Home);
        field.apply(TextEdit::Left);
        field.apply(TextEdit::Backspace);
        assert_eq!(field.cursor(), 0);
        assert_eq!(field.value(), "ab");
    }

    #[test]
    fn maps_keys_to_edits() {
        let key = |code, modifiers| KeyEvent::new(code, modifiers);
        assert_eq!(
            TextEdit::from_key(&key(KeyCode::Char('X'), KeyModifiers::SHIFT)),
            Some(TextEdit::Insert('X'))
        );
        assert_eq!(
            TextEdit::from_key(&key(KeyCode::Char('u'), KeyModifiers::CONTROL)),
            Some(TextEdit::Clear)
        );
        assert_eq!(
            TextEdit::from_key(&key(KeyCode::Char('s'), KeyModifiers::CONTROL)),
            None
        );
        assert_eq!(TextEdit::from_key(&key(KeyCode::Enter, KeyModifiers::NONE)), None);
    }
}
