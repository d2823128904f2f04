use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::widgets::{Cell, Row};
use tracing::warn;

use super::{ListTable, Listing, ModalSlot, Searchable, action_key, list_keybindings, selection_key};
use crate::api::TagApi;
use crate::config::{KeyResolver, ListAction};
use crate::core::{AppSignal, Cmd, ConfirmSignal, FormSignal, Program, Ticket, Update};
use crate::modals::confirm::{self, Confirm};
use crate::modals::tag_form::{self, TagForm, tag_label};
use crate::model::Tag;
use crate::ui::select_list::SelectionMsg;
use crate::ui::{Handled, Keybinding, ViewContext};

impl Searchable for Tag {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        fields.extend(self.description.as_deref());
        fields
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    Load,
    Loaded(Ticket, Result<Vec<Tag>, String>),
    Selection(SelectionMsg),
    New,
    Edit,
    Delete,
    Form(u64, tag_form::Msg),
    Confirm(u64, confirm::Msg),
    Deleted(String, Result<(), String>),
}

pub struct TagsPage {
    pub listing: Listing<Tag>,
    form: ModalSlot<TagForm>,
    confirm: ModalSlot<Confirm<Tag>>,
    api: Arc<dyn TagApi>,
    resolver: Arc<KeyResolver>,
}

impl TagsPage {
    pub fn new(api: Arc<dyn TagApi>, resolver: Arc<KeyResolver>) -> Self {
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
            "Loading tags",
            move |()| async move { api.list_tags().await },
            (),
            move |result| Msg::Loaded(ticket, result),
        )
    }

    fn open_form(&mut self, model: tag_form::Model) -> Update<Msg, AppSignal> {
        let (tag, cmd) = self
            .form
            .open(TagForm::new(model, self.api.clone(), self.resolver.clone()));
        Update::cmd(cmd.map(move |msg| Msg::Form(tag, msg)))
    }

    fn on_form(&mut self, generation: u64, msg: tag_form::Msg) -> Update<Msg, AppSignal> {
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
            FormSignal::Saved(tag) => {
                self.form.close();
                Update::new(
                    cmd.and(self.load()),
                    AppSignal::success(format!("Saved tag {}", tag.name)),
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
            ConfirmSignal::Confirmed(tag) => {
                let api = self.api.clone();
                let name = tag.name;
                Update::cmd(Cmd::perform(
                    format!("Deleting tag {name}"),
                    move |id| async move { api.delete_tag(id).await },
                    tag.id,
                    move |result| Msg::Deleted(name, result),
                ))
            }
        }
    }
}

impl Program for TagsPage {
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
                    warn!("Failed to load tags: {error}");
                }
                self.listing.resolve(ticket, result);
                Update::none()
            }
            Msg::Selection(msg) => {
                self.listing.apply(msg);
                Update::none()
            }
            Msg::New => self.open_form(tag_form::Model::create()),
            Msg::Edit => match self.listing.selected().map(tag_form::Model::from_tag) {
                Some(model) => self.open_form(model),
                None => Update::none(),
            },
            Msg::Delete => {
                let Some(tag) = self.listing.selected().cloned() else {
                    return Update::none();
                };
                let model = confirm::Model::delete(tag.clone(), "tag", &tag.name);
                let (generation, cmd) = self.confirm.open(Confirm::new(model, self.resolver.clone()));
                Update::cmd(cmd.map(move |msg| Msg::Confirm(generation, msg)))
            }
            Msg::Form(generation, msg) => self.on_form(generation, msg),
            Msg::Confirm(generation, msg) => self.on_confirm(generation, msg),
            Msg::Deleted(name, Ok(())) => {
                self.confirm.close();
                Update::new(self.load(), AppSignal::success(format!("Deleted tag {name}")))
            }
            Msg::Deleted(name, Err(error)) => {
                self.confirm.close();
                warn!("Failed to delete tag {name}: {error}");
                Update::signal(AppSignal::failure(format!("Failed to delete tag {name}: {error}")))
            }
        }
    }

    fn view(&self, frame: &mut Frame, area: Rect, ctx: &ViewContext) {
        self.listing.render(
            frame,
            area,
            ctx,
            ListTable {
                title: "Tags".to_string(),
                header: &["Name", "Color", "Description"],
                widths: &[Constraint::Length(24), Constraint::Length(9), Constraint::Fill(1)],
                empty: "No tags yet. Press n to create one.",
                error_prefix: "Error loading tags",
            },
            |tag, _| {
                Row::new(vec![
                    Cell::from(tag_label(tag)),
                    Cell::from(tag.color.clone()),
                    Cell::from(tag.description.clone().unwrap_or_default()),
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
        "Tags".to_string()
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

    fn page() -> Harness<TagsPage> {
        let store = MemoryStore::in_memory(demo_catalog(chrono::Utc::now()).unwrap());
        Harness::start(TagsPage::new(Arc::new(store), Arc::new(KeyResolver::default())))
    }

    #[tokio::test]
    async fn lists_tags_with_descriptions() {
        let mut harness = page();
        harness.settle().await;

        let ctx = ViewContext::default();
        let screen = render_to_string(80, 12, |frame| {
            let area = frame.area();
            harness.program.view(frame, area, &ctx);
        });
        assert!(screen.contains("cinema"));
        assert!(screen.contains("Watched on the big screen"));
    }

    #[tokio::test]
    async fn edit_saves_and_reloads() {
        let mut harness = page();
        harness.settle().await;

        harness.send(Msg::Edit);
        let generation = harness.program.form.generation();
        harness.send(Msg::Form(generation, tag_form::Msg::Edit(crate::ui::text_field::TextEdit::Insert('!'))));
        harness.send(Msg::Form(generation, tag_form::Msg::Submit));
        harness.settle().await;

        assert_eq!(harness.raised(), [&AppSignal::success("Saved tag cinema!")]);
        assert!(
            harness
                .program
                .listing
                .visible()
                .iter()
                .any(|t| t.name == "cinema!")
        );
    }

    #[tokio::test]
    async fn cancelled_delete_keeps_tag() {
        let mut harness = page();
        harness.settle().await;

        harness.send(Msg::Delete);
        let generation = harness.program.confirm.generation();
        harness.send(Msg::Confirm(generation, confirm::Msg::Cancel));

        assert!(!harness.program.confirm.is_open());
        assert!(harness.last_issued().is_empty());
        assert_eq!(harness.program.listing.visible().len(), 2);
    }
}
