//! The library table: every tracked movie and series.

use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Cell, Row};
use tracing::warn;

use super::{ListTable, Listing, ModalSlot, Searchable, action_key, selection_key};
use crate::api::LibraryApi;
use crate::config::{KeyResolver, LibraryAction, ListAction, SearchAction};
use crate::core::{AppSignal, Cmd, ConfirmSignal, FormSignal, Program, Ticket, Update};
use crate::modals::confirm::{self, Confirm};
use crate::modals::entry_form::{self, EntryForm};
use crate::model::{LibraryEntry, MediaKind};
use crate::route::Route;
use crate::ui::select_list::SelectionMsg;
use crate::ui::{Handled, Keybinding, ViewContext};

impl Searchable for LibraryEntry {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str()]
    }
}

pub fn progress_label(entry: &LibraryEntry) -> String {
    match (entry.kind, entry.progress.total) {
        (MediaKind::Movie, _) => "-".to_string(),
        (MediaKind::Series, Some(total)) => format!("{}/{total}", entry.progress.watched),
        (MediaKind::Series, None) => entry.progress.watched.to_string(),
    }
}

pub fn rating_label(rating: Option<u8>) -> String {
    rating.map_or_else(|| "-".to_string(), |r| format!("{r}/10"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    Load,
    Loaded(Ticket, Result<Vec<LibraryEntry>, String>),
    Selection(SelectionMsg),
    Open,
    New,
    Edit,
    ToggleFavorite,
    Favorited(Result<LibraryEntry, String>),
    Untrack,
    Form(u64, entry_form::Msg),
    Confirm(u64, confirm::Msg),
    Untracked(String, Result<(), String>),
}

pub struct LibraryPage {
    pub listing: Listing<LibraryEntry>,
    form: ModalSlot<EntryForm>,
    confirm: ModalSlot<Confirm<LibraryEntry>>,
    api: Arc<dyn LibraryApi>,
    resolver: Arc<KeyResolver>,
}

impl LibraryPage {
    pub fn new(api: Arc<dyn LibraryApi>, resolver: Arc<KeyResolver>) -> Self {
        Self {
            listing: Listing::default(),
            form: ModalSlot::default(),
            confirm: ModalSlot::default(),
            api,
            resolver,
        }
    }

    fn load(&mut self) -> Cmd<Msg> {
        let ticket = self.listing.begin();
        let api = self.api.clone();
        Cmd::perform(
            "Loading library",
            move |()| async move { api.list_entries().await },
            (),
            move |result| Msg::Loaded(ticket, result),
        )
    }

    fn open_form(&mut self, model: entry_form::Model) -> Update<Msg, AppSignal> {
        let form = EntryForm::new(model, self.api.clone(), self.resolver.clone());
        let (generation, cmd) = self.form.open(form);
        Update::cmd(cmd.map(move |msg| Msg::Form(generation, msg)))
    }

    fn on_form(&mut self, generation: u64, msg: entry_form::Msg) -> Update<Msg, AppSignal> {
        let Some(update) = self.form.update(generation, msg) else {
            return Update::none();
        };
        let (cmd, signal) = update.into_parts();
        let cmd = cmd.map(move |msg| Msg::Form(generation, msg));
        match signal {
            FormSignal::NoOp => Update::cmd(cmd),
            FormSignal::CloseRequested => {
                self.form.close();
                Update::cmd(cmd)
            }
            FormSignal::Saved(entry) => {
                self.form.close();
                Update::new(
                    cmd.and(self.load()),
                    AppSignal::success(format!("Saved {}", entry.display_title())),
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
            ConfirmSignal::Confirmed(entry) => {
                let api = self.api.clone();
                let title = entry.title;
                Update::cmd(Cmd::perform(
                    format!("Untracking {title}"),
                    move |id| async move { api.untrack_entry(id).await },
                    entry.id,
                    move |result| Msg::Untracked(title, result),
                ))
            }
        }
    }
}

impl Program for LibraryPage {
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
                    warn!("Failed to load library: {error}");
                }
                self.listing.resolve(ticket, result);
                Update::none()
            }
            Msg::Selection(msg) => {
                self.listing.apply(msg);
                Update::none()
            }
            Msg::Open => self
                .listing
                .selected()
                .map_or_else(Update::none, |entry| Update::signal(AppSignal::Navigate(Route::Entry(entry.id)))),
            Msg::New => self.open_form(entry_form::Model::create()),
            Msg::Edit => match self.listing.selected().map(entry_form::Model::from_entry) {
                Some(model) => self.open_form(model),
                None => Update::none(),
            },
            Msg::ToggleFavorite => {
                let Some(entry) = self.listing.selected() else {
                    return Update::none();
                };
                let api = self.api.clone();
                Update::cmd(Cmd::perform(
                    format!("Toggling favorite on {}", entry.title),
                    move |id| async move { api.toggle_favorite(id).await },
                    entry.id,
                    Msg::Favorited,
                ))
            }
            Msg::Favorited(Ok(entry)) => {
                let notice = if entry.is_favorite {
                    format!("Added {} to favorites", entry.title)
                } else {
                    format!("Removed {} from favorites", entry.title)
                };
                Update::new(self.load(), AppSignal::success(notice))
            }
            Msg::Favorited(Err(error)) => {
                warn!("Failed to toggle favorite: {error}");
                Update::signal(AppSignal::failure(format!("Failed to update favorite: {error}")))
            }
            Msg::Untrack => {
                let Some(entry) = self.listing.selected().cloned() else {
                    return Update::none();
                };
                let mut model = confirm::Model::delete(entry.clone(), "entry", &entry.title);
                model.title = "Untrack entry".to_string();
                model.message = format!(
                    "Stop tracking \"{}\"? Its watch sessions are removed too.",
                    entry.title
                );
                let (generation, cmd) = self.confirm.open(Confirm::new(model, self.resolver.clone()));
                Update::cmd(cmd.map(move |msg| Msg::Confirm(generation, msg)))
            }
            Msg::Form(generation, msg) => self.on_form(generation, msg),
            Msg::Confirm(generation, msg) => self.on_confirm(generation, msg),
            Msg::Untracked(title, result) => {
                self.confirm.close();
                match result {
                    Ok(()) => Update::new(self.load(), AppSignal::success(format!("Untracked {title}"))),
                    Err(error) => {
                        warn!("Failed to untrack {title}: {error}");
                        Update::signal(AppSignal::failure(format!("Failed to untrack {title}: {error}")))
                    }
                }
            }
        }
    }

    fn view(&self, frame: &mut Frame, area: Rect, ctx: &ViewContext) {
        let count = self.listing.items.value().map_or(0, Vec::len);
        self.listing.render(
            frame,
            area,
            ctx,
            ListTable {
                title: format!("Library ({count})"),
                header: &["", "Title", "Kind", "Status", "Progress", "Rating"],
                widths: &[
                    Constraint::Length(2),
                    Constraint::Fill(1),
                    Constraint::Length(7),
                    Constraint::Length(12),
                    Constraint::Length(9),
                    Constraint::Length(7),
                ],
                empty: "Your library is empty. Press n to add a movie or series.",
                error_prefix: "Error loading library",
            },
            |entry, ctx| {
                let theme = &ctx.theme;
                Row::new(vec![
                    Cell::from(if entry.is_favorite { "★" } else { "" })
                        .style(Style::default().fg(theme.yellow)),
                    Cell::from(entry.display_title()),
                    Cell::from(entry.kind.to_string()),
                    Cell::from(entry.status.to_string())
                        .style(Style::default().fg(theme.status_color(entry.status))),
                    Cell::from(progress_label(entry)),
                    Cell::from(rating_label(entry.rating)),
                ])
            },
        );
        self.form.view(frame, area, ctx);
        self.confirm.view(frame, area, ctx);
    }

    fn handle_key(&self, key: KeyEvent) -> Handled<Msg> {
        if let Some(handled) = self.confirm.handle_key(key, Msg::Confirm) {
            return handled;
        }
        if let Some(handled) = self.form.handle_key(key, Msg::Form) {
            return handled;
        }
        if !self.listing.selection.filtering && self.resolver.matches_library(&key, LibraryAction::Open) {
            return Msg::Open.into();
        }
        if let Some(handled) = selection_key(&self.listing, &self.resolver, &key, Msg::Selection) {
            return handled;
        }
        if self.resolver.matches_library(&key, LibraryAction::Favorite) {
            return Msg::ToggleFavorite.into();
        }
        action_key(&key, |key, action| self.resolver.matches_list(key, action), [
            (ListAction::New, Msg::New),
            (ListAction::Edit, Msg::Edit),
            (ListAction::Delete, Msg::Untrack),
            (ListAction::Reload, Msg::Load),
        ])
    }

    fn title(&self) -> String {
        "Library".to_string()
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        let resolver = &self.resolver;
        vec![
            Keybinding::new(resolver.display_library(LibraryAction::Open), "open"),
            Keybinding::new(resolver.display_list(ListAction::New), "add"),
            Keybinding::new(resolver.display_list(ListAction::Edit), "edit"),
            Keybinding::new(resolver.display_library(LibraryAction::Favorite), "favorite"),
            Keybinding::new(resolver.display_list(ListAction::Delete), "untrack"),
            Keybinding::new(resolver.display_search(SearchAction::Toggle), "filter"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};

    use super::*;
    use crate::core::harness::Harness;
    use crate::store::{MemoryStore, demo_catalog};
    use crate::ui::testing::render_to_string;

    fn page() -> Harness<LibraryPage> {
        let store = MemoryStore::in_memory(demo_catalog(chrono::Utc::now()).unwrap());
        Harness::start(LibraryPage::new(Arc::new(store), Arc::new(KeyResolver::default())))
    }

    fn select(harness: &mut Harness<LibraryPage>, title: &str) {
        let index = harness
            .program
            .listing
            .visible()
            .iter()
            .position(|e| e.title == title)
            .unwrap();
        harness.program.listing.selection.cursor = index;
    }

    #[test]
    fn labels() {
        assert_eq!(rating_label(Some(8)), "8/10");
        assert_eq!(rating_label(None), "-");
    }

    #[tokio::test]
    async fn enter_opens_entry_detail() {
        let mut harness = page();
        harness.settle().await;
        select(&mut harness, "Dark");
        let dark = harness.program.listing.selected().unwrap().id;

        let Handled::Event(msg) = harness.program.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)) else {
            panic!("enter opens");
        };
        assert_eq!(*harness.send(msg), AppSignal::Navigate(Route::Entry(dark)));
    }

    #[tokio::test]
    async fn favorite_toggle_reloads_list() {
        let mut harness = page();
        harness.settle().await;
        select(&mut harness, "Heat");

        harness.send(Msg::ToggleFavorite);
        assert_eq!(harness.last_issued(), ["Toggling favorite on Heat"]);
        harness.settle().await;

        assert_eq!(harness.raised(), [&AppSignal::success("Added Heat to favorites")]);
        let heat = harness
            .program
            .listing
            .visible()
            .into_iter()
            .find(|e| e.title == "Heat")
            .unwrap();
        assert!(heat.is_favorite);
    }

    #[tokio::test]
    async fn untrack_removes_entry() {
        let mut harness = page();
        harness.settle().await;
        select(&mut harness, "Heat");

        harness.send(Msg::Untrack);
        let generation = harness.program.confirm.generation();
        harness.send(Msg::Confirm(generation, confirm::Msg::Confirm));
        harness.settle().await;

        assert_eq!(harness.raised(), [&AppSignal::success("Untracked Heat")]);
        assert!(harness.program.listing.visible().iter().all(|e| e.title != "Heat"));
    }

    #[tokio::test]
    async fn renders_status_and_progress() {
        let mut harness = page();
        harness.settle().await;

        let ctx = ViewContext::default();
        let screen = render_to_string(100, 14, |frame| {
            let area = frame.area();
            harness.program.view(frame, area, &ctx);
        });
        assert!(screen.contains("Chernobyl (2019)"));
        assert!(screen.contains("5/5"));
        assert!(screen.contains("Completed"));
    }
}
