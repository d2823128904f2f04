//! Library statistics.

use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use tracing::warn;

use crate::api::StatsApi;
use crate::config::{KeyResolver, ListAction};
use crate::core::{AppSignal, Cmd, Program, Remote, Ticket, Update};
use crate::model::{LibraryStats, RankedName};
use crate::ui::remote::{Loading, RemoteView, render_remote};
use crate::ui::{Handled, Keybinding, ViewContext};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    Load,
    Loaded(Ticket, Result<LibraryStats, String>),
}

pub struct StatsPage {
    pub stats: Remote<LibraryStats>,
    api: Arc<dyn StatsApi>,
    resolver: Arc<KeyResolver>,
}

impl StatsPage {
    pub fn new(api: Arc<dyn StatsApi>, resolver: Arc<KeyResolver>) -> Self {
        Self {
            stats: Remote::new(),
            api,
            resolver,
        }
    }
}

fn rating_line(average: Option<f32>) -> String {
    average.map_or_else(|| "no ratings yet".to_string(), |avg| format!("{avg:.1} / 10"))
}

fn figure<'a>(label: &'a str, value: String, ctx: &ViewContext) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{label:<18}"), Style::default().fg(ctx.theme.subtext0)),
        Span::styled(value, Style::default().fg(ctx.theme.text)),
    ])
}

fn ranking<'a>(names: &'a [RankedName], empty: &'a str, ctx: &ViewContext) -> Vec<Line<'a>> {
    if names.is_empty() {
        return vec![Line::styled(empty, Style::default().fg(ctx.theme.muted()))];
    }
    names
        .iter()
        .enumerate()
        .map(|(rank, ranked)| {
            Line::from(vec![
                Span::styled(format!("{:>2}. ", rank + 1), Style::default().fg(ctx.theme.overlay1)),
                Span::styled(ranked.name.as_str(), Style::default().fg(ctx.theme.text)),
                Span::styled(format!("  {}", ranked.count), Style::default().fg(ctx.theme.peach)),
            ])
        })
        .collect()
}

fn render_stats(frame: &mut Frame, area: Rect, ctx: &ViewContext, stats: &LibraryStats) {
    let [totals, rankings] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(area);

    let heading = Style::default().fg(ctx.theme.lavender).add_modifier(Modifier::BOLD);
    let lines = vec![
        Line::styled("Library", heading),
        figure("Entries", stats.total_entries.to_string(), ctx),
        figure("Movies", stats.movies.to_string(), ctx),
        figure("Series", stats.series.to_string(), ctx),
        figure("Favorites", stats.favorites.to_string(), ctx),
        Line::raw(""),
        Line::styled("Status", heading),
        figure("Completed", stats.completed.to_string(), ctx),
        figure("In progress", stats.in_progress.to_string(), ctx),
        figure("Not started", stats.not_started.to_string(), ctx),
        Line::raw(""),
        Line::styled("Watching", heading),
        figure("Sessions", stats.total_sessions.to_string(), ctx),
        figure("Episodes watched", stats.episodes_watched.to_string(), ctx),
        figure("Average rating", rating_line(stats.average_rating), ctx),
    ];
    frame.render_widget(Paragraph::new(lines), totals);

    let mut lines = vec![Line::styled("Top friends", heading)];
    lines.extend(ranking(&stats.top_friends, "Nobody joined a session yet", ctx));
    lines.push(Line::raw(""));
    lines.push(Line::styled("Top tags", heading));
    lines.extend(ranking(&stats.top_tags, "No tagged sessions", ctx));
    frame.render_widget(Paragraph::new(lines), rankings);
}

impl Program for StatsPage {
    type Msg = Msg;
    type Signal = AppSignal;

    fn init(&self) -> Option<Msg> {
        Some(Msg::Load)
    }

    fn update(&mut self, msg: Msg) -> Update<Msg, AppSignal> {
        match msg {
            Msg::Load => {
                let ticket = self.stats.begin();
                let api = self.api.clone();
                Update::cmd(Cmd::perform(
                    "Computing statistics",
                    move |()| async move { api.library_stats().await },
                    (),
                    move |result| Msg::Loaded(ticket, result),
                ))
            }
            Msg::Loaded(ticket, result) => {
                if let Err(error) = &result {
                    warn!("Failed to compute statistics: {error}");
                }
                self.stats.resolve(ticket, result);
                Update::none()
            }
        }
    }

    fn view(&self, frame: &mut Frame, area: Rect, ctx: &ViewContext) {
        let block = ctx.panel("Statistics", true);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        let view = RemoteView::new("Error loading statistics").loading(Loading::Skeleton(6));
        render_remote(frame, inner, ctx, self.stats.data(), &view, |frame, area, stats| {
            render_stats(frame, area, ctx, stats);
        });
    }

    fn handle_key(&self, key: KeyEvent) -> Handled<Msg> {
        if self.resolver.matches_list(&key, ListAction::Reload) {
            Msg::Load.into()
        } else {
            Handled::Ignored
        }
    }

    fn title(&self) -> String {
        "Stats".to_string()
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        vec![Keybinding::new(self.resolver.display_list(ListAction::Reload), "reload")]
    }
}
