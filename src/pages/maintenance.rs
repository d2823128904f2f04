//! Cache statistics and housekeeping jobs.
//!
//! Both jobs are split-mapped: a success carries its count to the page and a
//! failure goes straight to the notification channel.

use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use tracing::{info, warn};

use crate::api::MaintenanceApi;
use crate::config::{KeyResolver, ListAction, MaintenanceAction};
use crate::core::{AppSignal, Cmd, Program, Remote, Ticket, Update};
use crate::model::CacheStats;
use crate::ui::remote::{RemoteView, render_remote};
use crate::ui::spinner::render_spinner;
use crate::ui::{Handled, Keybinding, ViewContext};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    Load,
    Loaded(Ticket, Result<CacheStats, String>),
    ClearExpired,
    Cleared(usize),
    Recalculate,
    Recalculated(usize),
    /// A job failed; carries the job name and its error.
    Failed(&'static str, String),
}

pub struct MaintenancePage {
    pub cache: Remote<CacheStats>,
    pub clearing: bool,
    pub recalculating: bool,
    api: Arc<dyn MaintenanceApi>,
    resolver: Arc<KeyResolver>,
}

impl MaintenancePage {
    pub fn new(api: Arc<dyn MaintenanceApi>, resolver: Arc<KeyResolver>) -> Self {
        Self {
            cache: Remote::new(),
            clearing: false,
            recalculating: false,
            api,
            resolver,
        }
    }

    fn load(&mut self) -> Cmd<Msg> {
        let ticket = self.cache.begin();
        let api = self.api.clone();
        Cmd::perform(
            "Reading cache statistics",
            move |()| async move { api.cache_stats().await },
            (),
            move |result| Msg::Loaded(ticket, result),
        )
    }
}

const CLEAR_JOB: &str = "clear expired cache";
const RECALCULATE_JOB: &str = "recalculate series status";

fn plural(count: usize, one: &str, many: &str) -> String {
    if count == 1 {
        format!("{count} {one}")
    } else {
        format!("{count} {many}")
    }
}

impl Program for MaintenancePage {
    type Msg = Msg;
    type Signal = AppSignal;

    fn init(&self) -> Option<Msg> {
        Some(Msg::Load)
    }

    fn update(&mut self, msg: Msg) -> Update<Msg, AppSignal> {
        match msg {
            Msg::Load => Update::cmd(self.load()),
            Msg::Loaded(ticket, result) => {
                if let Err(error) = &result {
                    warn!("Failed to read cache statistics: {error}");
                }
                self.cache.resolve(ticket, result);
                Update::none()
            }
            Msg::ClearExpired if self.clearing => Update::none(),
            Msg::ClearExpired => {
                self.clearing = true;
                let api = self.api.clone();
                Update::cmd(Cmd::attempt(
                    "Clearing expired cache",
                    move |()| async move { api.clear_expired_cache().await },
                    (),
                    Msg::Cleared,
                    |error| Msg::Failed(CLEAR_JOB, error),
                ))
            }
            Msg::Cleared(count) => {
                self.clearing = false;
                info!("Cleared {count} expired cache entries");
                Update::new(
                    self.load(),
                    AppSignal::success(format!("Removed {}", plural(count, "expired entry", "expired entries"))),
                )
            }
            Msg::Recalculate if self.recalculating => Update::none(),
            Msg::Recalculate => {
                self.recalculating = true;
                let api = self.api.clone();
                Update::cmd(Cmd::attempt(
                    "Recalculating series status",
                    move |()| async move { api.recalculate_series_watch_status().await },
                    (),
                    Msg::Recalculated,
                    |error| Msg::Failed(RECALCULATE_JOB, error),
                ))
            }
            Msg::Recalculated(count) => {
                self.recalculating = false;
                info!("Recalculated status of {count} series");
                Update::signal(AppSignal::success(format!(
                    "Updated {}",
                    plural(count, "series", "series")
                )))
            }
            Msg::Failed(job, error) => {
                match job {
                    CLEAR_JOB => self.clearing = false,
                    _ => self.recalculating = false,
                }
                warn!("Failed to {job}: {error}");
                Update::signal(AppSignal::failure(format!("Failed to {job}: {error}")))
            }
        }
    }

    fn view(&self, frame: &mut Frame, area: Rect, ctx: &ViewContext) {
        let [stats_area, jobs_area] =
            Layout::vertical([Constraint::Length(5), Constraint::Fill(1)]).areas(area);

        let block = ctx.panel("Metadata cache", true);
        let inner = block.inner(stats_area);
        frame.render_widget(block, stats_area);
        let view = RemoteView::new("Error reading cache");
        render_remote(frame, inner, ctx, self.cache.data(), &view, |frame, area, stats| {
            let label = Style::default().fg(ctx.theme.subtext0);
            let expired = if stats.expired > 0 { ctx.theme.peach } else { ctx.theme.green };
            let lines = vec![
                Line::from(vec![Span::styled("Entries  ", label), Span::raw(stats.entries.to_string())]),
                Line::from(vec![
                    Span::styled("Expired  ", label),
                    Span::styled(stats.expired.to_string(), Style::default().fg(expired)),
                ]),
            ];
            frame.render_widget(Paragraph::new(lines), area);
        });

        let block = ctx.panel("Jobs", false);
        let inner = block.inner(jobs_area);
        frame.render_widget(block, jobs_area);
        let rows: [Rect; 2] = Layout::vertical([Constraint::Length(1); 2]).areas(inner);
        let jobs = [
            (MaintenanceAction::ClearExpired, "Clear expired cache entries", self.clearing),
            (MaintenanceAction::Recalculate, "Recalculate series watch status", self.recalculating),
        ];
        for (row, (action, label, busy)) in rows.into_iter().zip(jobs) {
            if busy {
                render_spinner(frame, row, ctx, label);
            } else {
                let key = self.resolver.display_maintenance(action);
                let line = Line::from(vec![
                    Span::styled(format!("[{key}] "), Style::default().fg(ctx.theme.lavender)),
                    Span::styled(label, Style::default().fg(ctx.theme.text)),
                ]);
                frame.render_widget(Paragraph::new(line), row);
            }
        }
    }

    fn handle_key(&self, key: KeyEvent) -> Handled<Msg> {
        let resolver = &self.resolver;
        if resolver.matches_list(&key, ListAction::Reload) {
            return Msg::Load.into();
        }
        super::action_key(&key, |key, action| resolver.matches_maintenance(key, action), [
            (MaintenanceAction::ClearExpired, Msg::ClearExpired),
            (MaintenanceAction::Recalculate, Msg::Recalculate),
        ])
    }

    fn title(&self) -> String {
        "Maintenance".to_string()
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        let resolver = &self.resolver;
        vec![
            Keybinding::new(resolver.display_maintenance(MaintenanceAction::ClearExpired), "clear expired"),
            Keybinding::new(resolver.display_maintenance(MaintenanceAction::Recalculate), "recalculate"),
            Keybinding::new(resolver.display_list(ListAction::Reload), "reload"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::api::{ApiError, ApiResult};
    use crate::core::harness::Harness;
    use crate::store::{MemoryStore, demo_catalog};

    fn page(api: Arc<dyn MaintenanceApi>) -> Harness<MaintenancePage> {
        Harness::start(MaintenancePage::new(api, Arc::new(KeyResolver::default())))
    }

    fn demo() -> Arc<dyn MaintenanceApi> {
        Arc::new(MemoryStore::in_memory(demo_catalog(chrono::Utc::now()).unwrap()))
    }

    struct Broken;

    #[async_trait]
    impl MaintenanceApi for Broken {
        async fn cache_stats(&self) -> ApiResult<CacheStats> {
            Ok(CacheStats::default())
        }

        async fn clear_expired_cache(&self) -> ApiResult<usize> {
            Err(ApiError::Invalid("cache is locked".to_string()))
        }

        async fn recalculate_series_watch_status(&self) -> ApiResult<usize> {
            Ok(0)
        }
    }

    #[test]
    fn counts_are_pluralised() {
        assert_eq!(plural(1, "expired entry", "expired entries"), "1 expired entry");
        assert_eq!(plural(3, "expired entry", "expired entries"), "3 expired entries");
    }

    #[tokio::test]
    async fn clearing_reloads_stats() {
        let mut harness = page(demo());
        harness.settle().await;
        assert_eq!(harness.program.cache.value(), Some(&CacheStats { entries: 2, expired: 1 }));

        harness.send(Msg::ClearExpired);
        assert!(harness.program.clearing);
        assert_eq!(*harness.send(Msg::ClearExpired), AppSignal::NoOp);
        assert!(harness.last_issued().is_empty());

        harness.settle().await;
        assert!(!harness.program.clearing);
        assert_eq!(harness.program.cache.value(), Some(&CacheStats { entries: 1, expired: 0 }));
        assert!(harness.raised().contains(&&AppSignal::success("Removed 1 expired entry")));
    }

    #[tokio::test]
    async fn recalculation_reports_count() {
        let mut harness = page(demo());
        harness.settle().await;
        harness.send(Msg::Recalculate);
        assert_eq!(harness.last_issued(), ["Recalculating series status"]);
        harness.settle().await;
        assert_eq!(harness.raised(), [&AppSignal::success("Updated 0 series")]);
    }

    #[tokio::test]
    async fn failures_go_to_notifications() {
        let mut harness = page(Arc::new(Broken));
        harness.settle().await;
        harness.send(Msg::ClearExpired);
        harness.settle().await;

        assert!(!harness.program.clearing);
        assert_eq!(
            harness.raised(),
            [&AppSignal::failure("Failed to clear expired cache: cache is locked")]
        );
    }
}
