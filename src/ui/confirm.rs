use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use super::{ViewContext, popup_area};

/// Contents of a destructive confirmation popup.
pub struct ConfirmView<'a> {
    pub title: &'a str,
    pub message: &'a str,
    pub confirm_key: String,
    pub cancel_key: String,
    pub is_submitting: bool,
}

pub fn render_confirm(frame: &mut Frame, area: Rect, ctx: &ViewContext, view: &ConfirmView<'_>) {
    let theme = &ctx.theme;
    let popup = popup_area(area, 50, 7);
    frame.render_widget(Clear, popup);

    let key_style = Style::default().fg(theme.peach).add_modifier(Modifier::BOLD);
    let actions = if view.is_submitting {
        Line::from(Span::styled("Deleting...", Style::default().fg(theme.subtext0)))
    } else {
        Line::from(vec![
            Span::styled(format!("[{}]", view.confirm_key), key_style),
            Span::styled(" Delete", Style::default().fg(theme.red).add_modifier(Modifier::BOLD)),
            Span::raw("    "),
            Span::styled(format!("[{}]", view.cancel_key), key_style),
            Span::styled(" Cancel", Style::default().fg(theme.overlay1)),
        ])
    };

    let block = Block::default()
        .title(format!(" {} ", view.title))
        .title_style(Style::default().fg(theme.red).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(Style::default().fg(theme.red))
        .style(Style::default().bg(theme.base));

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(view.message.to_string(), Style::default().fg(theme.text))),
        Line::from(""),
        actions,
    ];
    frame.render_widget(
        Paragraph::new(lines).block(block).alignment(Alignment::Center),
        popup,
    );
}
