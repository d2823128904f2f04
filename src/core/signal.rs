//! Signals a program raises to whoever owns it.
//!
//! A signal is the second half of every update result. Owners inspect it
//! after applying the new state: the shell reacts to [`AppSignal`], a page
//! reacts to the [`FormSignal`] or [`ConfirmSignal`] of the modal it hosts.

use crate::route::Route;

pub trait Signal {
    fn is_noop(&self) -> bool;
}

/// Input for the notification area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub is_success: bool,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_success: true,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_success: false,
        }
    }
}

/// Raised by pages, handled by the application shell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AppSignal {
    #[default]
    NoOp,
    Navigate(Route),
    Back,
    Notify(Notice),
    Quit,
}

impl AppSignal {
    pub fn success(message: impl Into<String>) -> Self {
        Self::Notify(Notice::success(message))
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::Notify(Notice::failure(message))
    }
}

impl Signal for AppSignal {
    fn is_noop(&self) -> bool {
        matches!(self, Self::NoOp)
    }
}

/// Raised by create/edit modals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormSignal<E> {
    NoOp,
    /// The entity was persisted; carries the stored record.
    Saved(E),
    CloseRequested,
}

impl<E> Default for FormSignal<E> {
    fn default() -> Self {
        Self::NoOp
    }
}

impl<E> Signal for FormSignal<E> {
    fn is_noop(&self) -> bool {
        matches!(self, Self::NoOp)
    }
}

/// Raised by delete confirmation modals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmSignal<T> {
    NoOp,
    Confirmed(T),
    Cancelled,
}

impl<T> Default for ConfirmSignal<T> {
    fn default() -> Self {
        Self::NoOp
    }
}

impl<T> Signal for ConfirmSignal<T> {
    fn is_noop(&self) -> bool {
        matches!(self, Self::NoOp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_noop() {
        assert!(AppSignal::default().is_noop());
        assert!(FormSignal::<String>::default().is_noop());
        assert!(ConfirmSignal::<u8>::default().is_noop());
        assert!(!AppSignal::Back.is_noop());
    }

    #[test]
    fn notify_helpers() {
        assert_eq!(
            AppSignal::failure("Failed to delete friend: disk full"),
            AppSignal::Notify(Notice {
                message: "Failed to delete friend: disk full".to_string(),
                is_success: false,
            })
        );
        assert!(matches!(AppSignal::success("ok"), AppSignal::Notify(n) if n.is_success));
    }
}
