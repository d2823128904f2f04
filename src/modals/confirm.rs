//! Delete confirmation.
//!
//! The modal only asks. On confirm it raises the target and stays open in the
//! submitting state; the hosting page runs the delete and closes it when the
//! outcome arrives.

use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;

use crate::config::{DialogAction, KeyResolver};
use crate::core::{ConfirmSignal, Program, Update};
use crate::ui::confirm::{ConfirmView, render_confirm};
use crate::ui::{Handled, ViewContext};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model<T> {
    pub target: T,
    pub title: String,
    pub message: String,
    pub is_submitting: bool,
}

impl<T> Model<T> {
    pub fn delete(target: T, what: &str, name: &str) -> Self {
        Self {
            target,
            title: format!("Delete {what}"),
            message: format!("Delete \"{name}\"? This cannot be undone."),
            is_submitting: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Msg {
    Confirm,
    Cancel,
}

pub struct Confirm<T> {
    pub model: Model<T>,
    resolver: Arc<KeyResolver>,
}

impl<T> Confirm<T> {
    pub const fn new(model: Model<T>, resolver: Arc<KeyResolver>) -> Self {
        Self { model, resolver }
    }
}

impl<T: Clone> Program for Confirm<T> {
    type Msg = Msg;
    type Signal = ConfirmSignal<T>;

    fn update(&mut self, msg: Msg) -> Update<Msg, Self::Signal> {
        if self.model.is_submitting {
            return Update::none();
        }
        match msg {
            Msg::Confirm => {
                self.model.is_submitting = true;
                Update::signal(ConfirmSignal::Confirmed(self.model.target.clone()))
            }
            Msg::Cancel => Update::signal(ConfirmSignal::Cancelled),
        }
    }

    fn view(&self, frame: &mut Frame, area: Rect, ctx: &ViewContext) {
        render_confirm(
            frame,
            area,
            ctx,
            &ConfirmView {
                title: &self.model.title,
                message: &self.model.message,
                confirm_key: self.resolver.display_dialog(DialogAction::Confirm),
                cancel_key: self.resolver.display_dialog(DialogAction::Cancel),
                is_submitting: self.model.is_submitting,
            },
        );
    }

    fn handle_key(&self, key: KeyEvent) -> Handled<Msg> {
        if self.resolver.matches_dialog(&key, DialogAction::Confirm) {
            Handled::Event(Msg::Confirm)
        } else if self.resolver.matches_dialog(&key, DialogAction::Cancel) {
            Handled::Event(Msg::Cancel)
        } else {
            Handled::Consumed
        }
    }

    fn title(&self) -> String {
        self.model.title.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::harness::Harness;
    use crate::model::FriendId;
    use crate::ui::testing::render_to_string;

    fn harness() -> Harness<Confirm<FriendId>> {
        Harness::new(Confirm::new(
            Model::delete(FriendId::new(3), "friend", "Alice"),
            Arc::new(KeyResolver::default()),
        ))
    }

    #[test]
    fn confirm_raises_target_once() {
        let mut harness = harness();
        assert_eq!(
            *harness.send(Msg::Confirm),
            ConfirmSignal::Confirmed(FriendId::new(3))
        );
        assert!(harness.program.model.is_submitting);
        assert!(harness.last_issued().is_empty());

        assert_eq!(*harness.send(Msg::Confirm), ConfirmSignal::NoOp);
        assert_eq!(*harness.send(Msg::Cancel), ConfirmSignal::NoOp);
    }

    #[test]
    fn cancel_before_confirm() {
        let mut harness = harness();
        assert_eq!(*harness.send(Msg::Cancel), ConfirmSignal::Cancelled);
        assert!(!harness.program.model.is_submitting);
    }

    #[test]
    fn shows_progress_while_deleting() {
        let mut harness = harness();
        let ctx = ViewContext::default();
        let before = render_to_string(100, 20, |f| {
            let area = f.area();
            harness.program.view(f, area, &ctx);
        });
        assert!(before.contains("Delete \"Alice\"?"));

        harness.send(Msg::Confirm);
        let after = render_to_string(100, 20, |f| {
            let area = f.area();
            harness.program.view(f, area, &ctx);
        });
        assert!(after.contains("Deleting..."));
    }
}
