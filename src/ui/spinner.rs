use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::Span;
use ratatui::widgets::Paragraph;
use throbber_widgets_tui::WhichUse::Spin;
use throbber_widgets_tui::{BRAILLE_SIX, Throbber};

use super::ViewContext;

/// Draws the one-cell spinner glyph at the left edge of `area`.
pub fn render_glyph(frame: &mut Frame, area: Rect, ctx: &ViewContext) {
    let throbber = Throbber::default()
        .throbber_set(BRAILLE_SIX)
        .use_type(Spin)
        .throbber_style(Style::default().fg(ctx.theme.lavender));
    let mut state = ctx.spinner.clone();
    let glyph = Rect { width: 1.min(area.width), height: 1.min(area.height), ..area };
    frame.render_stateful_widget(throbber, glyph, &mut state);
}

/// A spinner followed by `label`, centered in `area`.
pub fn render_spinner(frame: &mut Frame, area: Rect, ctx: &ViewContext, label: &str) {
    let width = u16::try_from(label.chars().count() + 2).unwrap_or(u16::MAX);
    let line = area.centered(Constraint::Length(width), Constraint::Length(1));
    let [glyph, text] = Layout::horizontal([Constraint::Length(2), Constraint::Fill(1)]).areas(line);
    render_glyph(frame, glyph, ctx);
    frame.render_widget(
        Paragraph::new(Span::styled(label.to_string(), Style::default().fg(ctx.theme.subtext0))),
        text,
    );
}
