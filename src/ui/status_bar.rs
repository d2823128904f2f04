use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::spinner::render_glyph;
use super::{Keybinding, ViewContext};

/// Bottom line: running commands on the left, key hints on the right.
pub fn render_status_bar(
    frame: &mut Frame,
    area: Rect,
    ctx: &ViewContext,
    running: &[&str],
    keybindings: &[Keybinding],
) {
    let theme = &ctx.theme;
    let status_width = if running.is_empty() { 0 } else { 36 };
    let [status, hints] =
        Layout::horizontal([Constraint::Length(status_width), Constraint::Fill(1)]).areas(area);

    if let Some(first) = running.first() {
        render_glyph(frame, status, ctx);
        let label = match running.len() {
            1 => (*first).to_string(),
            n => format!("{first} (+{})", n - 1),
        };
        let text = Rect {
            x: status.x + 2,
            width: status.width.saturating_sub(2),
            ..status
        };
        frame.render_widget(
            Paragraph::new(Span::styled(label, Style::default().fg(theme.subtext0))),
            text,
        );
    }

    let key_style = Style::default().fg(theme.peach).add_modifier(Modifier::BOLD);
    let desc_style = Style::default().fg(theme.subtext0);
    let separator = Span::styled(" │ ", Style::default().fg(theme.surface2));
    let mut spans = Vec::new();
    for (i, kb) in keybindings.iter().enumerate() {
        if i > 0 {
            spans.push(separator.clone());
        }
        spans.push(Span::styled(kb.key.clone(), key_style));
        spans.push(Span::raw(" "));
        spans.push(Span::styled(kb.description.clone(), desc_style));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), hints);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::testing::render_to_string;

    #[test]
    fn shows_running_commands_and_hints() {
        let ctx = ViewContext::default();
        let text = render_to_string(100, 1, |frame| {
            let area = frame.area();
            render_status_bar(
                frame,
                area,
                &ctx,
                &["Loading friends", "Loading tags"],
                &[Keybinding::new("n", "New"), Keybinding::new("q", "Quit")],
            );
        });
        assert!(text.contains("Loading friends (+1)"));
        assert!(text.contains("n New │ q Quit"));
    }
}
