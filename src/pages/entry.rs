//! Detail page of one library entry.
//!
//! The entry, its sessions and the friend and tag lists used to label them
//! are fetched concurrently on open; each panel renders as soon as its own
//! data arrives. Every mutation re-fetches what it changed.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Local};
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Paragraph, Row, Wrap};
use serde_json::json;
use tracing::warn;

use super::ModalSlot;
use super::library::{progress_label, rating_label};
use crate::api::{FriendApi, LibraryApi, MetadataCache, Services, SessionApi, TagApi};
use crate::commands::copy_to_clipboard;
use crate::config::{EntryAction, GlobalAction, KeyResolver};
use crate::core::{
    AppSignal, Cmd, ConfirmSignal, FormSignal, Program, Remote, RemoteData, Ticket, Update,
};
use crate::modals::confirm::{self, Confirm};
use crate::modals::session_form::{self, SessionForm};
use crate::model::{CacheEntry, EntryId, Friend, LibraryEntry, MediaKind, Tag, TmdbId, WatchSession};
use crate::ui::remote::{Loading, RemoteView, render_remote};
use crate::ui::select_list::{Nav, Selection, TableView, render_table};
use crate::ui::{Handled, Keybinding, ViewContext};

pub const MAX_RATING: u8 = 10;

/// Cache key of the TMDB record an entry is linked to.
pub fn metadata_key(entry: &LibraryEntry) -> Option<String> {
    let tmdb = entry.tmdb_id?;
    Some(match entry.kind {
        MediaKind::Movie => format!("movie/{tmdb}"),
        MediaKind::Series => format!("tv/{tmdb}"),
    })
}

/// The metadata record cached for an entry.
fn metadata_payload(entry: &LibraryEntry) -> String {
    json!({
        "id": entry.tmdb_id.map(TmdbId::get),
        "title": entry.title,
        "year": entry.year,
        "overview": entry.overview,
        "number_of_episodes": entry.progress.total,
    })
    .to_string()
}

const fn rated_up(rating: Option<u8>) -> Option<u8> {
    match rating {
        None => Some(1),
        Some(r) if r >= MAX_RATING => Some(MAX_RATING),
        Some(r) => Some(r + 1),
    }
}

const fn rated_down(rating: Option<u8>) -> Option<u8> {
    match rating {
        None | Some(0 | 1) => None,
        Some(r) => Some(r - 1),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    Load,
    EntryLoaded(Ticket, Result<LibraryEntry, String>),
    SessionsLoaded(Ticket, Result<Vec<WatchSession>, String>),
    FriendsLoaded(Ticket, Result<Vec<Friend>, String>),
    TagsLoaded(Ticket, Result<Vec<Tag>, String>),
    MetadataLoaded(Ticket, Result<Option<CacheEntry>, String>),
    CycleStatus,
    RateUp,
    RateDown,
    RecordEpisode,
    /// Outcome of an entry mutation, with the notice to show on success.
    Changed(String, Result<LibraryEntry, String>),
    Copy,
    Copied(Result<(), String>),
    SessionNav(Nav),
    LogSession,
    Session(u64, session_form::Msg),
    DeleteSession,
    Confirm(u64, confirm::Msg),
    SessionDeleted(Result<(), String>),
    RefreshMetadata,
    MetadataRefreshed(Result<(), String>),
    Back,
}

pub struct EntryPage {
    pub entry_id: EntryId,
    pub entry: Remote<LibraryEntry>,
    pub sessions: Remote<Vec<WatchSession>>,
    pub friends: Remote<Vec<Friend>>,
    pub tags: Remote<Vec<Tag>>,
    pub metadata: Remote<Option<CacheEntry>>,
    pub session_cursor: usize,
    session_form: ModalSlot<SessionForm>,
    confirm: ModalSlot<Confirm<WatchSession>>,
    library: Arc<dyn LibraryApi>,
    session_api: Arc<dyn SessionApi>,
    friend_api: Arc<dyn FriendApi>,
    tag_api: Arc<dyn TagApi>,
    cache: Arc<dyn MetadataCache>,
    metadata_ttl: Duration,
    resolver: Arc<KeyResolver>,
}

impl EntryPage {
    pub fn new(
        entry_id: EntryId,
        services: &Services,
        metadata_ttl: Duration,
        resolver: Arc<KeyResolver>,
    ) -> Self {
        Self {
            entry_id,
            entry: Remote::new(),
            sessions: Remote::new(),
            friends: Remote::new(),
            tags: Remote::new(),
            metadata: Remote::new(),
            session_cursor: 0,
            session_form: ModalSlot::default(),
            confirm: ModalSlot::default(),
            library: services.library.clone(),
            session_api: services.sessions.clone(),
            friend_api: services.friends.clone(),
            tag_api: services.tags.clone(),
            cache: services.cache.clone(),
            metadata_ttl,
            resolver,
        }
    }

    fn load_entry(&mut self) -> Cmd<Msg> {
        let ticket = self.entry.begin();
        let api = self.library.clone();
        Cmd::perform(
            "Loading entry",
            move |id| async move { api.get_entry(id).await },
            self.entry_id,
            move |result| Msg::EntryLoaded(ticket, result),
        )
    }

    fn load_sessions(&mut self) -> Cmd<Msg> {
        let ticket = self.sessions.begin();
        let api = self.session_api.clone();
        Cmd::perform(
            "Loading sessions",
            move |id| async move { api.list_sessions(id).await },
            self.entry_id,
            move |result| Msg::SessionsLoaded(ticket, result),
        )
    }

    fn load_metadata(&mut self, key: String) -> Cmd<Msg> {
        let ticket = self.metadata.begin();
        let cache = self.cache.clone();
        Cmd::perform(
            "Reading metadata cache",
            move |key: String| async move { cache.get_cached(&key).await },
            key,
            move |result| Msg::MetadataLoaded(ticket, result),
        )
    }

    fn load_all(&mut self) -> Cmd<Msg> {
        let friends_ticket = self.friends.begin();
        let tags_ticket = self.tags.begin();
        let friends = self.friend_api.clone();
        let tags = self.tag_api.clone();
        Cmd::batch([
            self.load_entry(),
            self.load_sessions(),
            Cmd::perform(
                "Loading friends",
                move |()| async move { friends.list_friends().await },
                (),
                move |result| Msg::FriendsLoaded(friends_ticket, result),
            ),
            Cmd::perform(
                "Loading tags",
                move |()| async move { tags.list_tags().await },
                (),
                move |result| Msg::TagsLoaded(tags_ticket, result),
            ),
        ])
    }

    /// Runs `op` against the loaded entry; the outcome arrives as `Changed`.
    fn mutate<Op, Fut>(&self, name: String, notice: String, op: Op) -> Update<Msg, AppSignal>
    where
        Op: FnOnce(Arc<dyn LibraryApi>) -> Fut + Send + 'static,
        Fut: Future<Output = crate::api::ApiResult<LibraryEntry>> + Send + 'static,
    {
        Update::cmd(Cmd::perform(
            name,
            op,
            self.library.clone(),
            move |result| Msg::Changed(notice, result),
        ))
    }

    fn selected_session(&self) -> Option<&WatchSession> {
        self.sessions.value()?.get(self.session_cursor)
    }

    fn on_session_form(&mut self, generation: u64, msg: session_form::Msg) -> Update<Msg, AppSignal> {
        let Some(update) = self.session_form.update(generation, msg) else {
            return Update::none();
        };
        let (cmd, signal) = update.into_parts();
        let cmd = cmd.map(move |msg| Msg::Session(generation, msg));
        match signal {
            FormSignal::NoOp => Update::cmd(cmd),
            FormSignal::CloseRequested => {
                self.session_form.close();
                Update::cmd(cmd)
            }
            FormSignal::Saved(session) => {
                self.session_form.close();
                Update::new(
                    cmd.and(self.load_sessions()).and(self.load_entry()),
                    AppSignal::success(format!("Logged session on {}", session.watched_on)),
                )
            }
        }
    }

    fn on_confirm(&mut self, generation: u64, msg: confirm::Msg) -> Update<Msg, AppSignal> {
        let Some(update) = self.confirm.update(generation, msg) else {
            return Update::none();
        };
        match update.signal {
            ConfirmSignal::NoOp => Update::none(),
            ConfirmSignal::Cancelled => {
                self.confirm.close();
                Update::none()
            }
            ConfirmSignal::Confirmed(session) => {
                let api = self.session_api.clone();
                Update::cmd(Cmd::perform(
                    format!("Deleting session of {}", session.watched_on),
                    move |id| async move { api.delete_session(id).await },
                    session.id,
                    Msg::SessionDeleted,
                ))
            }
        }
    }

    fn names(&self, session: &WatchSession) -> (String, String) {
        let friends: HashMap<_, &str> = self
            .friends
            .value()
            .map(|all| all.iter().map(|f| (f.id, f.name.as_str())).collect())
            .unwrap_or_default();
        let tags: HashMap<_, &str> = self
            .tags
            .value()
            .map(|all| all.iter().map(|t| (t.id, t.name.as_str())).collect())
            .unwrap_or_default();
        let friend_names: Vec<&str> = session
            .friends
            .iter()
            .map(|id| friends.get(id).copied().unwrap_or("…"))
            .collect();
        let tag_names: Vec<&str> = session
            .tags
            .iter()
            .map(|id| tags.get(id).copied().unwrap_or("…"))
            .collect();
        (friend_names.join(", "), tag_names.join(", "))
    }

    fn render_details(&self, frame: &mut Frame, area: Rect, ctx: &ViewContext) {
        let block = ctx.panel("Entry", false);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let view = RemoteView::new("Error loading entry").loading(Loading::Skeleton(4));
        render_remote(frame, inner, ctx, self.entry.data(), &view, |frame, area, entry| {
            let theme = &ctx.theme;
            let label = Style::default().fg(theme.subtext0);
            let mut title = vec![Span::styled(
                entry.display_title(),
                Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
            )];
            if entry.is_favorite {
                title.push(Span::styled(" ★", Style::default().fg(theme.yellow)));
            }
            let metadata = match (metadata_key(entry), self.metadata.data().as_ref()) {
                (None, _) => "not linked to TMDB".to_string(),
                (Some(_), RemoteData::Success(Some(cached))) => {
                    format!("cached until {}", cached.expires_at.format("%Y-%m-%d %H:%M"))
                }
                (Some(_), RemoteData::Success(None)) => "not cached".to_string(),
                (Some(_), RemoteData::Failure(error)) => format!("unavailable: {error}"),
                (Some(_), _) => "checking...".to_string(),
            };
            let mut lines = vec![
                Line::from(title),
                Line::from(vec![
                    Span::styled("Kind      ", label),
                    Span::raw(entry.kind.to_string()),
                ]),
                Line::from(vec![
                    Span::styled("Status    ", label),
                    Span::styled(
                        entry.status.to_string(),
                        Style::default().fg(theme.status_color(entry.status)),
                    ),
                ]),
                Line::from(vec![
                    Span::styled("Rating    ", label),
                    Span::raw(rating_label(entry.rating)),
                ]),
                Line::from(vec![
                    Span::styled("Episodes  ", label),
                    Span::raw(progress_label(entry)),
                ]),
                Line::from(vec![Span::styled("Metadata  ", label), Span::raw(metadata)]),
            ];
            if let Some(overview) = &entry.overview {
                lines.push(Line::raw(""));
                lines.push(Line::styled(overview.clone(), Style::default().fg(theme.subtext0)));
            }
            frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), area);
        });
    }

    fn render_sessions(&self, frame: &mut Frame, area: Rect, ctx: &ViewContext) {
        let view = RemoteView::new("Error loading sessions").loading(Loading::Skeleton(3));
        render_remote(frame, area, ctx, self.sessions.data(), &view, |frame, area, sessions| {
            let rows: Vec<Row> = sessions
                .iter()
                .map(|session| {
                    let (friends, tags) = self.names(session);
                    Row::new(vec![
                        Cell::from(session.watched_on.to_string()),
                        Cell::from(friends),
                        Cell::from(tags),
                        Cell::from(session.notes.clone().unwrap_or_default()),
                    ])
                })
                .collect();
            let selection = Selection {
                cursor: self.session_cursor,
                ..Selection::default()
            };
            render_table(
                frame,
                area,
                ctx,
                &selection,
                TableView {
                    title: format!("Watch sessions ({})", sessions.len()),
                    header: &["Date", "With", "Tags", "Notes"],
                    widths: &[
                        Constraint::Length(11),
                        Constraint::Percentage(30),
                        Constraint::Percentage(25),
                        Constraint::Fill(1),
                    ],
                    rows,
                    selected: self.session_cursor,
                    empty: "No sessions logged. Press n to log one.",
                },
            );
        });
    }
}

impl Program for EntryPage {
    type Msg = Msg;
    type Signal = AppSignal;

    fn init(&self) -> Option<Msg> {
        Some(Msg::Load)
    }

    fn update(&mut self, msg: Msg) -> Update<Msg, AppSignal> {
        match msg {
            Msg::Load => Update::cmd(self.load_all()),
            Msg::EntryLoaded(ticket, result) => {
                if !self.entry.resolve(ticket, result) {
                    return Update::none();
                }
                match self.entry.value().map(metadata_key) {
                    Some(Some(key)) => Update::cmd(self.load_metadata(key)),
                    _ => Update::none(),
                }
            }
            Msg::SessionsLoaded(ticket, result) => {
                if self.sessions.resolve(ticket, result) {
                    let len = self.sessions.value().map_or(0, Vec::len);
                    self.session_cursor = self.session_cursor.min(len.saturating_sub(1));
                }
                Update::none()
            }
            Msg::FriendsLoaded(ticket, result) => {
                self.friends.resolve(ticket, result);
                Update::none()
            }
            Msg::TagsLoaded(ticket, result) => {
                self.tags.resolve(ticket, result);
                Update::none()
            }
            Msg::MetadataLoaded(ticket, result) => {
                self.metadata.resolve(ticket, result);
                Update::none()
            }
            Msg::CycleStatus => {
                let Some(entry) = self.entry.value() else {
                    return Update::none();
                };
                let (id, status) = (entry.id, entry.status.next());
                self.mutate(
                    format!("Setting status of {}", entry.title),
                    format!("Status set to {status}"),
                    move |api| async move { api.set_status(id, status).await },
                )
            }
            Msg::RateUp | Msg::RateDown => {
                let Some(entry) = self.entry.value() else {
                    return Update::none();
                };
                let rating = if msg == Msg::RateUp {
                    rated_up(entry.rating)
                } else {
                    rated_down(entry.rating)
                };
                if rating == entry.rating {
                    return Update::none();
                }
                let id = entry.id;
                self.mutate(
                    format!("Rating {}", entry.title),
                    format!("Rating set to {}", rating_label(rating)),
                    move |api| async move { api.set_rating(id, rating).await },
                )
            }
            Msg::RecordEpisode => {
                let Some(entry) = self.entry.value() else {
                    return Update::none();
                };
                if entry.kind != MediaKind::Series {
                    return Update::signal(AppSignal::failure("Movies have no episodes"));
                }
                let id = entry.id;
                self.mutate(
                    format!("Recording episode of {}", entry.title),
                    "Episode recorded".to_string(),
                    move |api| async move { api.record_episode(id).await },
                )
            }
            Msg::Changed(notice, Ok(_)) => Update::new(self.load_entry(), AppSignal::success(notice)),
            Msg::Changed(_, Err(error)) => {
                warn!("Failed to update entry {}: {error}", self.entry_id);
                Update::signal(AppSignal::failure(format!("Failed to update entry: {error}")))
            }
            Msg::Copy => match self.entry.value() {
                Some(entry) => Update::cmd(copy_to_clipboard(
                    entry.display_title(),
                    "title",
                    |()| Msg::Copied(Ok(())),
                    |error| Msg::Copied(Err(error)),
                )),
                None => Update::none(),
            },
            Msg::Copied(Ok(())) => Update::signal(AppSignal::success("Copied title to clipboard")),
            Msg::Copied(Err(error)) => {
                Update::signal(AppSignal::failure(format!("Failed to copy title: {error}")))
            }
            Msg::SessionNav(nav) => {
                let len = self.sessions.value().map_or(0, Vec::len);
                self.session_cursor = nav.apply(self.session_cursor, len);
                Update::none()
            }
            Msg::LogSession => {
                let model = session_form::Model::new(self.entry_id, Local::now().date_naive());
                let form = SessionForm::new(
                    model,
                    self.session_api.clone(),
                    self.friend_api.clone(),
                    self.tag_api.clone(),
                    self.resolver.clone(),
                );
                let (generation, cmd) = self.session_form.open(form);
                Update::cmd(cmd.map(move |msg| Msg::Session(generation, msg)))
            }
            Msg::Session(generation, msg) => self.on_session_form(generation, msg),
            Msg::DeleteSession => {
                let Some(session) = self.selected_session().cloned() else {
                    return Update::none();
                };
                let label = format!("session of {}", session.watched_on);
                let model = confirm::Model::delete(session, "session", &label);
                let (generation, cmd) = self.confirm.open(Confirm::new(model, self.resolver.clone()));
                Update::cmd(cmd.map(move |msg| Msg::Confirm(generation, msg)))
            }
            Msg::Confirm(generation, msg) => self.on_confirm(generation, msg),
            Msg::SessionDeleted(result) => {
                self.confirm.close();
                match result {
                    Ok(()) => Update::new(
                        self.load_sessions().and(self.load_entry()),
                        AppSignal::success("Deleted session"),
                    ),
                    Err(error) => {
                        warn!("Failed to delete session: {error}");
                        Update::signal(AppSignal::failure(format!("Failed to delete session: {error}")))
                    }
                }
            }
            Msg::RefreshMetadata => {
                let Some(entry) = self.entry.value() else {
                    return Update::none();
                };
                let Some(key) = metadata_key(entry) else {
                    return Update::signal(AppSignal::failure(format!(
                        "{} is not linked to TMDB",
                        entry.title
                    )));
                };
                let payload = metadata_payload(entry);
                let cache = self.cache.clone();
                let ttl = self.metadata_ttl;
                Update::cmd(Cmd::perform(
                    format!("Caching metadata for {}", entry.title),
                    move |(key, payload): (String, String)| async move {
                        cache.put_cached(&key, payload, ttl).await
                    },
                    (key, payload),
                    Msg::MetadataRefreshed,
                ))
            }
            Msg::MetadataRefreshed(Ok(())) => {
                let key = self.entry.value().and_then(metadata_key);
                let cmd = key.map_or_else(Cmd::none, |key| self.load_metadata(key));
                Update::new(cmd, AppSignal::success("Metadata refreshed"))
            }
            Msg::MetadataRefreshed(Err(error)) => {
                warn!("Failed to cache metadata: {error}");
                Update::signal(AppSignal::failure(format!("Failed to refresh metadata: {error}")))
            }
            Msg::Back => Update::signal(AppSignal::Back),
        }
    }

    fn view(&self, frame: &mut Frame, area: Rect, ctx: &ViewContext) {
        let [details, sessions] =
            Layout::vertical([Constraint::Length(10), Constraint::Fill(1)]).areas(area);
        self.render_details(frame, details, ctx);
        self.render_sessions(frame, sessions, ctx);
        self.session_form.view(frame, area, ctx);
        self.confirm.view(frame, area, ctx);
    }

    fn handle_key(&self, key: KeyEvent) -> Handled<Msg> {
        if let Some(handled) = self.confirm.handle_key(key, Msg::Confirm) {
            return handled;
        }
        if let Some(handled) = self.session_form.handle_key(key, Msg::Session) {
            return handled;
        }
        let resolver = &self.resolver;
        if resolver.matches_global(&key, GlobalAction::Back) {
            return Msg::Back.into();
        }
        if let Some(nav) = Nav::from_key(resolver, &key) {
            return Msg::SessionNav(nav).into();
        }
        super::action_key(&key, |key, action| resolver.matches_entry(key, action), [
            (EntryAction::CycleStatus, Msg::CycleStatus),
            (EntryAction::RateUp, Msg::RateUp),
            (EntryAction::RateDown, Msg::RateDown),
            (EntryAction::Episode, Msg::RecordEpisode),
            (EntryAction::Copy, Msg::Copy),
            (EntryAction::LogSession, Msg::LogSession),
            (EntryAction::DeleteSession, Msg::DeleteSession),
            (EntryAction::RefreshMetadata, Msg::RefreshMetadata),
        ])
    }

    fn title(&self) -> String {
        self.entry
            .value()
            .map_or_else(|| format!("Entry {}", self.entry_id), |entry| entry.title.clone())
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        let resolver = &self.resolver;
        [
            (EntryAction::CycleStatus, "status"),
            (EntryAction::RateUp, "rate up"),
            (EntryAction::RateDown, "rate down"),
            (EntryAction::Episode, "episode"),
            (EntryAction::LogSession, "log session"),
            (EntryAction::DeleteSession, "delete session"),
            (EntryAction::Copy, "copy"),
            (EntryAction::RefreshMetadata, "metadata"),
        ]
        .into_iter()
        .map(|(action, description)| Keybinding::new(resolver.display_entry(action), description))
        .chain([Keybinding::new(resolver.display_global(GlobalAction::Back), "back")])
        .collect()
    }
}
