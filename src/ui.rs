//! Rendering helpers and input primitives shared by every page and modal.

pub mod confirm;
pub mod form;
pub mod remote;
pub mod select_list;
pub mod spinner;
pub mod status_bar;
pub mod tabs;
pub mod text_field;
pub mod toast;

use ratatui::layout::{Constraint, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders};
use throbber_widgets_tui::ThrobberState;

use crate::theme::Theme;

/// Result of handling an input event.
///
/// - `Ignored` - the handler didn't recognize this input, the owner may use it
/// - `Consumed` - the input was handled but produced no message
/// - `Event(E)` - the input was handled and produced a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handled<E> {
    Ignored,
    Consumed,
    Event(E),
}

impl<E> Handled<E> {
    pub const fn is_consumed(&self) -> bool {
        !matches!(self, Self::Ignored)
    }

    pub fn event(self) -> Option<E> {
        match self {
            Self::Event(e) => Some(e),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(E) -> U) -> Handled<U> {
        match self {
            Self::Ignored => Handled::Ignored,
            Self::Consumed => Handled::Consumed,
            Self::Event(e) => Handled::Event(f(e)),
        }
    }
}

impl<E> From<E> for Handled<E> {
    fn from(event: E) -> Self {
        Self::Event(event)
    }
}

/// A key shown in the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keybinding {
    pub key: String,
    pub description: String,
}

impl Keybinding {
    pub fn new(key: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            description: description.into(),
        }
    }
}

/// Read-only state every view needs: colors and the current spinner frame.
#[derive(Debug, Clone, Default)]
pub struct ViewContext {
    pub theme: Theme,
    pub spinner: ThrobberState,
}

impl ViewContext {
    pub fn new(theme: Theme) -> Self {
        Self {
            theme,
            spinner: ThrobberState::default(),
        }
    }

    /// Advances the spinner animation by one frame.
    pub fn tick(&mut self) {
        self.spinner.calc_next();
    }

    pub fn panel(&self, title: impl Into<String>, focused: bool) -> Block<'static> {
        let theme = &self.theme;
        Block::default()
            .title(format!(" {} ", title.into()))
            .title_style(theme.title())
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(if focused {
                theme.border_focused()
            } else {
                theme.border()
            }))
    }
}

/// Centered popup of `width_percent` of the area and a fixed height.
pub fn popup_area(area: Rect, width_percent: u16, height: u16) -> Rect {
    area.centered(
        Constraint::Percentage(width_percent),
        Constraint::Length(height.min(area.height)),
    )
}

#[cfg(test)]
pub mod testing {
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use ratatui::buffer::Buffer;

    /// Renders with `draw` into an off-screen terminal and returns the text.
    pub fn render_to_string(
        width: u16,
        height: u16,
        draw: impl FnOnce(&mut ratatui::Frame),
    ) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(draw).unwrap();
        buffer_text(terminal.backend().buffer())
    }

    pub fn buffer_text(buffer: &Buffer) -> String {
        let area = buffer.area;
        (area.top()..area.bottom())
            .map(|y| {
                (area.left()..area.right())
                    .map(|x| buffer[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
