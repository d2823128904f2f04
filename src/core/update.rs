//! The update contract shared by every page and modal.

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;

use super::command::Cmd;
use super::signal::Signal;
use crate::ui::{Handled, Keybinding, ViewContext};

/// Result of one call to [`Program::update`]: exactly one command batch and
/// exactly one signal. The new state is the program itself, mutated in place.
#[must_use]
pub struct Update<M, S> {
    pub cmd: Cmd<M>,
    pub signal: S,
}

impl<M: Send + 'static, S: Default> Update<M, S> {
    pub fn none() -> Self {
        Self {
            cmd: Cmd::none(),
            signal: S::default(),
        }
    }

    pub fn cmd(cmd: Cmd<M>) -> Self {
        Self {
            cmd,
            signal: S::default(),
        }
    }

    pub fn signal(signal: S) -> Self {
        Self {
            cmd: Cmd::none(),
            signal,
        }
    }
}

impl<M: Send + 'static, S> Update<M, S> {
    pub const fn new(cmd: Cmd<M>, signal: S) -> Self {
        Self { cmd, signal }
    }

    /// Adds `cmd` to the batch already carried.
    pub fn with_cmd(self, cmd: Cmd<M>) -> Self {
        Self {
            cmd: self.cmd.and(cmd),
            signal: self.signal,
        }
    }

    pub fn with_signal<T>(self, signal: T) -> Update<M, T> {
        Update {
            cmd: self.cmd,
            signal,
        }
    }

    pub fn map_msg<N: Send + 'static>(
        self,
        f: impl Fn(M) -> N + Send + Sync + 'static,
    ) -> Update<N, S> {
        Update {
            cmd: self.cmd.map(f),
            signal: self.signal,
        }
    }

    /// Lifts a child's result into its owner's message and signal types.
    pub fn map<N: Send + 'static, T>(
        self,
        f: impl Fn(M) -> N + Send + Sync + 'static,
        g: impl FnOnce(S) -> T,
    ) -> Update<N, T> {
        Update {
            cmd: self.cmd.map(f),
            signal: g(self.signal),
        }
    }

    pub fn into_parts(self) -> (Cmd<M>, S) {
        (self.cmd, self.signal)
    }
}

impl<M: Send + 'static, S: Default> From<Cmd<M>> for Update<M, S> {
    fn from(cmd: Cmd<M>) -> Self {
        Self::cmd(cmd)
    }
}

/// A page or modal driven by the message loop.
///
/// The owner calls the methods in this order:
///
/// 1. `init()` once when the program is created; a returned message is fed
///    straight back into `update`
/// 2. for each key: `handle_key()`, then `update()` with the produced message
/// 3. for each completed command: `update()` with the delivered message
/// 4. `view()` whenever a frame is drawn
pub trait Program {
    type Msg: Send + 'static;
    type Signal: Signal + Default;

    fn init(&self) -> Option<Self::Msg> {
        None
    }

    /// Applies one message. All I/O is returned as commands.
    fn update(&mut self, msg: Self::Msg) -> Update<Self::Msg, Self::Signal>;

    fn view(&self, frame: &mut Frame, area: Rect, ctx: &ViewContext);

    /// Translates a key into at most one message without touching state.
    fn handle_key(&self, key: KeyEvent) -> Handled<Self::Msg>;

    /// Breadcrumb shown in the header.
    fn title(&self) -> String;

    fn keybindings(&self) -> Vec<Keybinding> {
        vec![]
    }
}
