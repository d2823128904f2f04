//! Modal programs hosted by pages.
//!
//! Create/edit forms raise [`FormSignal`](crate::core::FormSignal), the delete
//! confirmation raises [`ConfirmSignal`](crate::core::ConfirmSignal). Each
//! form keeps its editable state in a `Model`, which can be built empty or
//! from an existing entity.

pub mod collection_form;
pub mod confirm;
pub mod entry_form;
pub mod friend_form;
pub mod session_form;
pub mod tag_form;

use crossterm::event::KeyEvent;

use crate::config::{FormAction, KeyResolver};

/// Direction of a focus change between form fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusMove {
    Next,
    Prev,
}

impl FocusMove {
    /// Focus index after the move, wrapping around `count` fields.
    pub const fn apply(self, focus: usize, count: usize) -> usize {
        match self {
            Self::Next => (focus + 1) % count,
            Self::Prev => (focus + count - 1) % count,
        }
    }
}

/// Maps the form-level keys shared by every modal.
fn form_key<M>(
    resolver: &KeyResolver,
    key: &KeyEvent,
    submit: M,
    close: M,
    focus: impl FnOnce(FocusMove) -> M,
) -> Option<M> {
    if resolver.matches_form(key, FormAction::Submit) {
        Some(submit)
    } else if resolver.matches_form(key, FormAction::Cancel) {
        Some(close)
    } else if resolver.matches_form(key, FormAction::NextField) {
        Some(focus(FocusMove::Next))
    } else if resolver.matches_form(key, FormAction::PrevField) {
        Some(focus(FocusMove::Prev))
    } else {
        None
    }
}

fn form_hint(resolver: &KeyResolver) -> String {
    format!(
        "{} save · {} cancel · {} next field",
        resolver.display_form(FormAction::Submit),
        resolver.display_form(FormAction::Cancel),
        resolver.display_form(FormAction::NextField),
    )
}

/// Trimmed optional text: blank input means "not set".
fn optional(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focus_wraps() {
        assert_eq!(FocusMove::Next.apply(1, 2), 0);
        assert_eq!(FocusMove::Prev.apply(0, 3), 2);
    }

    #[test]
    fn blank_optional_text_is_none() {
        assert_eq!(optional("  "), None);
        assert_eq!(optional(" note "), Some("note".to_string()));
    }
}
