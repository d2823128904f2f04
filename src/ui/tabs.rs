use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Tabs;

use super::ViewContext;
use crate::route::Route;

/// Header with one numbered tab per top-level page.
pub fn render_tabs(frame: &mut Frame, area: Rect, ctx: &ViewContext, current: Route, breadcrumb: &str) {
    let theme = &ctx.theme;
    let titles = Route::TABS.iter().enumerate().map(|(i, route)| {
        Line::from(vec![
            Span::styled(format!("{} ", i + 1), Style::default().fg(theme.overlay1)),
            Span::raw(route.title()),
        ])
    });
    let tabs = Tabs::new(titles)
        .block(ctx.panel(format!("watchlog · {breadcrumb}"), false))
        .style(Style::default().fg(theme.subtext0))
        .highlight_style(Style::default().fg(theme.mauve).add_modifier(Modifier::BOLD))
        .select(current.tab_index());
    frame.render_widget(tabs, area);
}
