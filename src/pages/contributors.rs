//! Read-only list of cast and crew credited across the library.

use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::widgets::{Cell, Row};
use tracing::warn;

use super::{ListTable, Listing, Searchable, selection_key};
use crate::api::ContributorApi;
use crate::config::{KeyResolver, ListAction, SearchAction};
use crate::core::{AppSignal, Cmd, Program, Ticket, Update};
use crate::model::Contributor;
use crate::ui::select_list::SelectionMsg;
use crate::ui::{Handled, Keybinding, ViewContext};

impl Searchable for Contributor {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.department.as_str()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    Load,
    Loaded(Ticket, Result<Vec<Contributor>, String>),
    Selection(SelectionMsg),
}

pub struct ContributorsPage {
    pub listing: Listing<Contributor>,
    api: Arc<dyn ContributorApi>,
    resolver: Arc<KeyResolver>,
}

impl ContributorsPage {
    pub fn new(api: Arc<dyn ContributorApi>, resolver: Arc<KeyResolver>) -> Self {
        Self {
            listing: Listing::default(),
            api,
            resolver,
        }
    }
}

impl Program for ContributorsPage {
    type Msg = Msg;
    type Signal = AppSignal;

    fn init(&self) -> Option<Msg> {
        Some(Msg::Load)
    }

    fn update(&mut self, msg: Msg) -> Update<Msg, AppSignal> {
        match msg {
            Msg::Load => {
                let ticket = self.listing.begin();
                let api = self.api.clone();
                Update::cmd(Cmd::perform(
                    "Loading contributors",
                    move |()| async move { api.list_contributors().await },
                    (),
                    move |result| Msg::Loaded(ticket, result),
                ))
            }
            Msg::Loaded(ticket, result) => {
                if let Err(error) = &result {
                    warn!("Failed to load contributors: {error}");
                }
                self.listing.resolve(ticket, result);
                Update::none()
            }
            Msg::Selection(msg) => {
                self.listing.apply(msg);
                Update::none()
            }
        }
    }

    fn view(&self, frame: &mut Frame, area: Rect, ctx: &ViewContext) {
        self.listing.render(
            frame,
            area,
            ctx,
            ListTable {
                title: "Contributors".to_string(),
                header: &["Name", "Department", "Credits"],
                widths: &[Constraint::Fill(1), Constraint::Length(14), Constraint::Length(8)],
                empty: "No contributors recorded",
                error_prefix: "Error loading contributors",
            },
            |contributor, _| {
                Row::new(vec![
                    Cell::from(contributor.name.clone()),
                    Cell::from(contributor.department.clone()),
                    Cell::from(contributor.credits.to_string()),
                ])
            },
        );
    }

    fn handle_key(&self, key: KeyEvent) -> Handled<Msg> {
        if let Some(handled) = selection_key(&self.listing, &self.resolver, &key, Msg::Selection) {
            return handled;
        }
        if self.resolver.matches_list(&key, ListAction::Reload) {
            Msg::Load.into()
        } else {
            Handled::Ignored
        }
    }

    fn title(&self) -> String {
        "Contributors".to_string()
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        vec![
            Keybinding::new(self.resolver.display_search(SearchAction::Toggle), "filter"),
            Keybinding::new(self.resolver.display_list(ListAction::Reload), "reload"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::harness::Harness;
    use crate::store::{MemoryStore, demo_catalog};

    #[tokio::test]
    async fn filters_by_department() {
        let store = MemoryStore::in_memory(demo_catalog(chrono::Utc::now()).unwrap());
        let mut harness = Harness::start(ContributorsPage::new(
            Arc::new(store),
            Arc::new(KeyResolver::default()),
        ));
        harness.settle().await;
        assert_eq!(harness.program.listing.visible().len(), 6);

        harness.send(Msg::Selection(SelectionMsg::StartFilter));
        for c in "acting".chars() {
            harness.send(Msg::Selection(SelectionMsg::Filter(
                crate::ui::text_field::TextEdit::Insert(c),
            )));
        }
        let mut names: Vec<&str> = harness
            .program
            .listing
            .visible()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        names.sort_unstable();
        assert_eq!(names, ["Amy Adams", "Jared Harris"]);
    }

    #[tokio::test]
    async fn reload_key_refetches() {
        let store = MemoryStore::in_memory(demo_catalog(chrono::Utc::now()).unwrap());
        let mut harness = Harness::start(ContributorsPage::new(
            Arc::new(store),
            Arc::new(KeyResolver::default()),
        ));
        harness.settle().await;

        let reload = KeyEvent::new(crossterm::event::KeyCode::Char('r'), crossterm::event::KeyModifiers::NONE);
        let Handled::Event(msg) = harness.program.handle_key(reload) else {
            panic!("r reloads");
        };
        harness.send(msg);
        assert_eq!(harness.last_issued(), ["Loading contributors"]);
    }
}
