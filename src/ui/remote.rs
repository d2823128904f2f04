//! The one place a [`RemoteData`] value becomes pixels.
//!
//! Pages render their fetched fields through [`render_remote`] and only supply
//! the success renderer. Loading, failure and not-asked presentation is
//! configured with a [`RemoteView`].

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::{Paragraph, Wrap};

use super::ViewContext;
use super::spinner::render_spinner;
use crate::core::RemoteData;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Loading {
    Spinner,
    /// Placeholder bars in place of the given number of rows.
    Skeleton(u16),
    Custom(String),
}

#[derive(Debug, Clone)]
pub struct RemoteView<'a> {
    pub loading: Loading,
    /// Context for failures, e.g. `Error loading friends`.
    pub error_prefix: &'a str,
    pub not_asked: &'a str,
}

impl<'a> RemoteView<'a> {
    pub const fn new(error_prefix: &'a str) -> Self {
        Self {
            loading: Loading::Spinner,
            error_prefix,
            not_asked: "",
        }
    }

    pub fn loading(mut self, loading: Loading) -> Self {
        self.loading = loading;
        self
    }

    pub const fn not_asked(mut self, text: &'a str) -> Self {
        self.not_asked = text;
        self
    }
}

pub fn render_remote<T>(
    frame: &mut Frame,
    area: Rect,
    ctx: &ViewContext,
    data: &RemoteData<T>,
    view: &RemoteView<'_>,
    on_success: impl FnOnce(&mut Frame, Rect, &T),
) {
    let theme = &ctx.theme;
    match data {
        RemoteData::NotAsked => {
            frame.render_widget(
                Paragraph::new(view.not_asked)
                    .style(Style::default().fg(theme.muted()))
                    .alignment(Alignment::Center),
                area,
            );
        }
        RemoteData::Loading => match &view.loading {
            Loading::Spinner => render_spinner(frame, area, ctx, "Loading..."),
            Loading::Skeleton(rows) => {
                let width = usize::from(area.width.saturating_sub(2));
                let lines: Vec<Line> = (0..*rows)
                    .map(|row| {
                        // Alternate widths so the placeholder reads as rows.
                        let len = if row % 2 == 0 { width } else { width * 2 / 3 };
                        Line::styled("▒".repeat(len), Style::default().fg(theme.surface0))
                    })
                    .collect();
                frame.render_widget(Paragraph::new(lines), area);
            }
            Loading::Custom(text) => {
                frame.render_widget(
                    Paragraph::new(text.as_str())
                        .style(Style::default().fg(theme.subtext0))
                        .alignment(Alignment::Center),
                    area,
                );
            }
        },
        RemoteData::Failure(message) => {
            frame.render_widget(
                Paragraph::new(format!("{}: {message}", view.error_prefix))
                    .style(Style::default().fg(theme.error()))
                    .wrap(Wrap { trim: true }),
                area,
            );
        }
        RemoteData::Success(value) => on_success(frame, area, value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::testing::render_to_string;

    fn draw(data: &RemoteData<Vec<&str>>, view: &RemoteView<'_>) -> String {
        let ctx = ViewContext::default();
        render_to_string(60, 5, |frame| {
            let area = frame.area();
            render_remote(frame, area, &ctx, data, view, |frame, area, names| {
                frame.render_widget(Paragraph::new(names.join(", ")), area);
            });
        })
    }

    #[test]
    fn failure_uses_error_prefix() {
        let text = draw(
            &RemoteData::Failure("disk full".to_string()),
            &RemoteView::new("Error loading friends"),
        );
        assert!(text.contains("Error loading friends: disk full"));
    }

    #[test]
    fn success_delegates_to_caller() {
        let text = draw(
            &RemoteData::Success(vec!["Alice", "Bob"]),
            &RemoteView::new("Error loading friends"),
        );
        assert!(text.contains("Alice, Bob"));
    }

    #[test]
    fn loading_variants() {
        let custom = draw(
            &RemoteData::Loading,
            &RemoteView::new("x").loading(Loading::Custom("Fetching friends".to_string())),
        );
        assert!(custom.contains("Fetching friends"));

        let spinner = draw(&RemoteData::Loading, &RemoteView::new("x"));
        assert!(spinner.contains("Loading..."));

        let skeleton = draw(&RemoteData::Loading, &RemoteView::new("x").loading(Loading::Skeleton(2)));
        assert!(skeleton.contains('▒'));
        assert!(!skeleton.contains("Loading..."));
    }

    #[test]
    fn not_asked_text() {
        let text = draw(
            &RemoteData::NotAsked,
            &RemoteView::new("x").not_asked("Nothing requested yet"),
        );
        assert!(text.contains("Nothing requested yet"));
    }
}
