use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::widgets::{Cell, Row};
use tracing::warn;

use super::{ListTable, Listing, ModalSlot, Searchable, action_key, list_keybindings, selection_key};
use crate::api::CollectionApi;
use crate::config::{KeyResolver, ListAction};
use crate::core::{AppSignal, Cmd, ConfirmSignal, FormSignal, Program, Ticket, Update};
use crate::modals::collection_form::{self, CollectionForm};
use crate::modals::confirm::{self, Confirm};
use crate::model::Collection;
use crate::ui::select_list::SelectionMsg;
use crate::ui::{Handled, Keybinding, ViewContext};

impl Searchable for Collection {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        fields.extend(self.description.as_deref());
        fields
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    Load,
    Loaded(Ticket, Result<Vec<Collection>, String>),
    Selection(SelectionMsg),
    New,
    Edit,
    Delete,
    Form(u64, collection_form::Msg),
    Confirm(u64, confirm::Msg),
    Deleted(String, Result<(), String>),
}

pub struct CollectionsPage {
    pub listing: Listing<Collection>,
    form: ModalSlot<CollectionForm>,
    confirm: ModalSlot<Confirm<Collection>>,
    api: Arc<dyn CollectionApi>,
    resolver: Arc<KeyResolver>,
}

impl CollectionsPage {
    pub fn new(api: Arc<dyn CollectionApi>, resolver: Arc<KeyResolver>) -> Self {
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
            "Loading collections",
            move |()| async move { api.list_collections().await },
            (),
            move |result| Msg::Loaded(ticket, result),
        )
    }

    fn open_form(&mut self, model: collection_form::Model) -> Update<Msg, AppSignal> {
        let form = CollectionForm::new(model, self.api.clone(), self.resolver.clone());
        let (generation, cmd) = self.form.open(form);
        Update::cmd(cmd.map(move |msg| Msg::Form(generation, msg)))
    }
}

impl Program for CollectionsPage {
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
                    warn!("Failed to load collections: {error}");
                }
                self.listing.resolve(ticket, result);
                Update::none()
            }
            Msg::Selection(msg) => {
                self.listing.apply(msg);
                Update::none()
            }
            Msg::New => self.open_form(collection_form::Model::create()),
            Msg::Edit => match self.listing.selected().map(collection_form::Model::from_collection) {
                Some(model) => self.open_form(model),
                None => Update::none(),
            },
            Msg::Delete => {
                let Some(collection) = self.listing.selected().cloned() else {
                    return Update::none();
                };
                let model = confirm::Model::delete(collection.clone(), "collection", &collection.name);
                let (generation, cmd) = self.confirm.open(Confirm::new(model, self.resolver.clone()));
                Update::cmd(cmd.map(move |msg| Msg::Confirm(generation, msg)))
            }
            Msg::Form(generation, msg) => {
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
                    FormSignal::Saved(collection) => {
                        self.form.close();
                        Update::new(
                            cmd.and(self.load()),
                            AppSignal::success(format!("Saved collection {}", collection.name)),
                        )
                    }
                }
            }
            Msg::Confirm(generation, msg) => {
                let Some(update) = self.confirm.update(generation, msg) else {
                    return Update::none();
                };
                match update.signal {
                    ConfirmSignal::NoOp => Update::none(),
                    ConfirmSignal::Cancelled => {
                        self.confirm.close();
                        Update::none()
                    }
                    ConfirmSignal::Confirmed(collection) => {
                        let api = self.api.clone();
                        let name = collection.name;
                        Update::cmd(Cmd::perform(
                            format!("Deleting collection {name}"),
                            move |id| async move { api.delete_collection(id).await },
                            collection.id,
                            move |result| Msg::Deleted(name, result),
                        ))
                    }
                }
            }
            Msg::Deleted(name, result) => {
                self.confirm.close();
                match result {
                    Ok(()) => Update::new(
                        self.load(),
                        AppSignal::success(format!("Deleted collection {name}")),
                    ),
                    Err(error) => {
                        warn!("Failed to delete collection {name}: {error}");
                        Update::signal(AppSignal::failure(format!(
                            "Failed to delete collection {name}: {error}"
                        )))
                    }
                }
            }
        }
    }

    fn view(&self, frame: &mut Frame, area: Rect, ctx: &ViewContext) {
        self.listing.render(
            frame,
            area,
            ctx,
            ListTable {
                title: "Collections".to_string(),
                header: &["Name", "Entries", "Updated", "Description"],
                widths: &[
                    Constraint::Length(24),
                    Constraint::Length(8),
                    Constraint::Length(12),
                    Constraint::Fill(1),
                ],
                empty: "No collections yet. Press n to start one.",
                error_prefix: "Error loading collections",
            },
            |collection, _| {
                Row::new(vec![
                    Cell::from(collection.name.clone()),
                    Cell::from(collection.entries.len().to_string()),
                    Cell::from(collection.updated_at.format("%Y-%m-%d").to_string()),
                    Cell::from(collection.description.clone().unwrap_or_default()),
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
        if let Some(handled) = selection_key(&self.listing, &self.resolver, &key, Msg::Selection) {
            return handled;
        }
        action_key(&key, |key, action| self.resolver.matches_list(key, action), [
            (ListAction::New, Msg::New),
            (ListAction::Edit, Msg::Edit),
            (ListAction::Delete, Msg::Delete),
            (ListAction::Reload, Msg::Load),
        ])
    }

    fn title(&self) -> String {
        "Collections".to_string()
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        list_keybindings(&self.resolver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::harness::Harness;
    use crate::store::{MemoryStore, demo_catalog};
    use crate::ui::testing::render_to_string;

    fn page() -> Harness<CollectionsPage> {
        let store = MemoryStore::in_memory(demo_catalog(chrono::Utc::now()).unwrap());
        Harness::start(CollectionsPage::new(Arc::new(store), Arc::new(KeyResolver::default())))
    }

    #[tokio::test]
    async fn shows_entry_counts() {
        let mut harness = page();
        harness.settle().await;

        let ctx = ViewContext::default();
        let screen = render_to_string(90, 10, |frame| {
            let area = frame.area();
            harness.program.view(frame, area, &ctx);
        });
        assert!(screen.contains("Slow sci-fi"));
        assert!(screen.contains("Quiet, patient science fiction"));
    }

    #[tokio::test]
    async fn duplicate_name_stays_in_form() {
        let mut harness = page();
        harness.settle().await;

        harness.send(Msg::New);
        let generation = harness.program.form.generation();
        for c in "slow sci-fi".chars() {
            harness.send(Msg::Form(
                generation,
                collection_form::Msg::Edit(crate::ui::text_field::TextEdit::Insert(c)),
            ));
        }
        harness.send(Msg::Form(generation, collection_form::Msg::Submit));
        harness.settle().await;

        assert!(harness.raised().is_empty());
        let form = harness.program.form.get().unwrap();
        assert_eq!(
            form.model.error.as_deref(),
            Some("A collection named \"slow sci-fi\" already exists")
        );
    }

    #[tokio::test]
    async fn delete_then_reload() {
        let mut harness = page();
        harness.settle().await;

        harness.send(Msg::Delete);
        let generation = harness.program.confirm.generation();
        harness.send(Msg::Confirm(generation, confirm::Msg::Confirm));
        harness.settle().await;

        assert_eq!(harness.raised(), [&AppSignal::success("Deleted collection Slow sci-fi")]);
        assert_eq!(harness.program.listing.items.value().map(Vec::len), Some(0));
    }
}
