//! Layout shared by the create/edit modals.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use super::spinner::render_glyph;
use super::{ViewContext, popup_area};

pub struct FormRow {
    pub label: &'static str,
    pub content: Line<'static>,
    pub focused: bool,
}

pub struct FormView {
    pub title: String,
    pub rows: Vec<FormRow>,
    pub error: Option<String>,
    pub is_submitting: bool,
    pub hint: String,
    /// Height reserved below the rows for content the caller draws itself.
    pub extra_height: u16,
}

impl FormView {
    /// Renders the popup and returns the reserved extra area.
    pub fn render(self, frame: &mut Frame, area: Rect, ctx: &ViewContext) -> Rect {
        let theme = &ctx.theme;
        let rows_height = u16::try_from(self.rows.len() * 3).unwrap_or(u16::MAX);
        let height = rows_height
            .saturating_add(self.extra_height)
            .saturating_add(4);
        let popup = popup_area(area, 60, height);
        frame.render_widget(Clear, popup);

        let block = ctx
            .panel(self.title, true)
            .style(Style::default().bg(theme.base));
        let inner = block.inner(popup);
        frame.render_widget(block, popup);

        let mut constraints: Vec<Constraint> = self.rows.iter().map(|_| Constraint::Length(3)).collect();
        constraints.extend([
            Constraint::Length(self.extra_height),
            Constraint::Length(1),
            Constraint::Length(1),
        ]);
        let areas = Layout::vertical(constraints).split(inner);
        let n = self.rows.len();

        for (row, slot) in self.rows.into_iter().zip(areas.iter()) {
            let border = if row.focused {
                theme.border_focused()
            } else {
                theme.border()
            };
            let field = Block::default()
                .title(format!(" {} ", row.label))
                .title_style(Style::default().fg(if row.focused { theme.lavender } else { theme.subtext0 }))
                .borders(Borders::ALL)
                .border_type(theme.border_type)
                .border_style(Style::default().fg(border));
            frame.render_widget(Paragraph::new(row.content).block(field), *slot);
        }

        let status_area = areas[n + 1];
        if self.is_submitting {
            render_glyph(frame, status_area, ctx);
            let text = Rect {
                x: status_area.x + 2,
                width: status_area.width.saturating_sub(2),
                ..status_area
            };
            frame.render_widget(
                Paragraph::new(Span::styled("Saving...", Style::default().fg(theme.subtext0))),
                text,
            );
        } else if let Some(error) = self.error {
            frame.render_widget(
                Paragraph::new(Span::styled(error, Style::default().fg(theme.error()))),
                status_area,
            );
        }

        frame.render_widget(
            Paragraph::new(Span::styled(self.hint, Style::default().fg(theme.muted()))),
            areas[n + 2],
        );

        areas[n]
    }
}
