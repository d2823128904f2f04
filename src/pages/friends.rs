use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::widgets::{Cell, Row};
use tracing::warn;

use super::{ListTable, Listing, ModalSlot, Searchable, action_key, list_keybindings, selection_key};
use crate::api::FriendApi;
use crate::config::{KeyResolver, ListAction};
use crate::core::{AppSignal, Cmd, ConfirmSignal, FormSignal, Program, Ticket, Update};
use crate::modals::confirm::{self, Confirm};
use crate::modals::friend_form::{self, FriendForm};
use crate::model::Friend;
use crate::ui::select_list::SelectionMsg;
use crate::ui::{Handled, Keybinding, ViewContext};

impl Searchable for Friend {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    Load,
    Loaded(Ticket, Result<Vec<Friend>, String>),
    Selection(SelectionMsg),
    New,
    Edit,
    Delete,
    Form(u64, friend_form::Msg),
    Confirm(u64, confirm::Msg),
    Deleted(String, Result<(), String>),
}

pub struct FriendsPage {
    pub listing: Listing<Friend>,
    form: ModalSlot<FriendForm>,
    confirm: ModalSlot<Confirm<Friend>>,
    api: Arc<dyn FriendApi>,
    resolver: Arc<KeyResolver>,
}

impl FriendsPage {
    pub fn new(api: Arc<dyn FriendApi>, resolver: Arc<KeyResolver>) -> Self {
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
            "Loading friends",
            move |()| async move { api.list_friends().await },
            (),
            move |result| Msg::Loaded(ticket, result),
        )
    }

    fn open_form(&mut self, model: friend_form::Model) -> Update<Msg, AppSignal> {
        let form = FriendForm::new(model, self.api.clone(), self.resolver.clone());
        let (tag, cmd) = self.form.open(form);
        Update::cmd(cmd.map(move |msg| Msg::Form(tag, msg)))
    }

    fn on_form(&mut self, tag: u64, msg: friend_form::Msg) -> Update<Msg, AppSignal> {
        let Some(update) = self.form.update(tag, msg) else {
            return Update::none();
        };
        let (cmd, signal) = update.into_parts();
        let cmd = cmd.map(move |msg| Msg::Form(tag, msg));
        match signal {
            FormSignal::NoOp => Update::cmd(cmd),
            FormSignal::CloseRequested => {
                self.form.close();
                Update::cmd(cmd)
            }
            FormSignal::Saved(friend) => {
                self.form.close();
                Update::new(
                    cmd.and(self.load()),
                    AppSignal::success(format!("Saved {}", friend.name)),
                )
            }
        }
    }

    fn on_confirm(&mut self, tag: u64, msg: confirm::Msg) -> Update<Msg, AppSignal> {
        let Some(update) = self.confirm.update(tag, msg) else {
            return Update::none();
        };
        match update.signal {
            ConfirmSignal::NoOp => Update::none(),
            ConfirmSignal::Cancelled => {
                self.confirm.close();
                Update::none()
            }
            ConfirmSignal::Confirmed(friend) => {
                let api = self.api.clone();
                let name = friend.name.clone();
                Update::cmd(Cmd::perform(
                    format!("Deleting {name}"),
                    move |id| async move { api.delete_friend(id).await },
                    friend.id,
                    move |result| Msg::Deleted(name, result),
                ))
            }
        }
    }
}

impl Program for FriendsPage {
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
                    warn!("Failed to load friends: {error}");
                }
                self.listing.resolve(ticket, result);
                Update::none()
            }
            Msg::Selection(msg) => {
                self.listing.apply(msg);
                Update::none()
            }
            Msg::New => self.open_form(friend_form::Model::create()),
            Msg::Edit => match self.listing.selected() {
                Some(friend) => {
                    let model = friend_form::Model::from_friend(friend);
                    self.open_form(model)
                }
                None => Update::none(),
            },
            Msg::Delete => {
                let Some(friend) = self.listing.selected().cloned() else {
                    return Update::none();
                };
                let name = friend.name.clone();
                let model = confirm::Model::delete(friend, "friend", &name);
                let (tag, cmd) = self.confirm.open(Confirm::new(model, self.resolver.clone()));
                Update::cmd(cmd.map(move |msg| Msg::Confirm(tag, msg)))
            }
            Msg::Form(tag, msg) => self.on_form(tag, msg),
            Msg::Confirm(tag, msg) => self.on_confirm(tag, msg),
            Msg::Deleted(name, result) => {
                self.confirm.close();
                match result {
                    Ok(()) => Update::new(self.load(), AppSignal::success(format!("Deleted {name}"))),
                    Err(error) => {
                        warn!("Failed to delete friend {name}: {error}");
                        Update::signal(AppSignal::failure(format!("Failed to delete {name}: {error}")))
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
                title: format!("Friends ({count})"),
                header: &["Name", "Image", "Added"],
                widths: &[Constraint::Fill(1), Constraint::Length(8), Constraint::Length(12)],
                empty: "No friends yet. Press n to add one.",
                error_prefix: "Error loading friends",
            },
            |friend, _| {
                Row::new(vec![
                    Cell::from(friend.name.clone()),
                    Cell::from(if friend.image_url.is_some() { "yes" } else { "-" }),
                    Cell::from(friend.created_at.format("%Y-%m-%d").to_string()),
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
        "Friends".to_string()
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        list_keybindings(&self.resolver)
    }
}
