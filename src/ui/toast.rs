//! Transient notifications stacked in the bottom-right corner.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use super::ViewContext;
use crate::config::NotificationConfig;
use crate::core::Notice;

#[derive(Debug, Clone)]
struct Toast {
    notice: Notice,
    shown_at: Instant,
}

/// The application's single notification queue.
///
/// Each notice hides itself after the configured duration. When more than
/// `max_visible` are queued the oldest are dropped.
#[derive(Debug)]
pub struct Notifications {
    toasts: VecDeque<Toast>,
    duration: Duration,
    max_visible: usize,
}

impl Default for Notifications {
    fn default() -> Self {
        Self::new(&NotificationConfig::default())
    }
}

impl Notifications {
    pub fn new(config: &NotificationConfig) -> Self {
        Self {
            toasts: VecDeque::new(),
            duration: config.duration(),
            max_visible: config.max_visible.max(1),
        }
    }

    pub fn push(&mut self, notice: Notice) {
        self.push_at(notice, Instant::now());
    }

    pub fn push_at(&mut self, notice: Notice, now: Instant) {
        self.toasts.push_back(Toast {
            notice,
            shown_at: now,
        });
        while self.toasts.len() > self.max_visible {
            self.toasts.pop_front();
        }
    }

    /// Drops notices shown at least one duration before `now`.
    pub fn expire(&mut self, now: Instant) {
        let duration = self.duration;
        self.toasts
            .retain(|toast| now.saturating_duration_since(toast.shown_at) < duration);
    }

    pub fn visible(&self) -> impl Iterator<Item = &Notice> {
        self.toasts.iter().map(|t| &t.notice)
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, ctx: &ViewContext) {
        let theme = &ctx.theme;
        let height = 3u16;
        let width = 50u16.min(area.width.saturating_sub(4));

        // Newest at the bottom, older ones stacked above it.
        for (i, toast) in self.toasts.iter().rev().enumerate() {
            let offset = u16::try_from(i).unwrap_or(u16::MAX).saturating_mul(height + 1);
            let Some(y) = area
                .bottom()
                .checked_sub(height + offset + 1)
                .filter(|y| *y >= area.y)
            else {
                break;
            };
            let x = area.right().saturating_sub(width + 2);
            let toast_area = Rect::new(x, y, width, height);

            let (color, icon) = if toast.notice.is_success {
                (theme.success(), "✓")
            } else {
                (theme.error(), "✗")
            };

            frame.render_widget(Clear, toast_area);
            let block = Block::default()
                .borders(Borders::ALL)
                .border_type(theme.border_type)
                .border_style(Style::default().fg(color))
                .style(Style::default().bg(theme.surface0));
            frame.render_widget(
                Paragraph::new(format!("{icon} {}", toast.notice.message))
                    .style(Style::default().fg(theme.text).add_modifier(Modifier::BOLD))
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true })
                    .block(block),
                toast_area,
            );
        }
    }
}
