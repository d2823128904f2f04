//! Create/edit modal for a friend.

use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;

use super::{FocusMove, form_hint, form_key, optional};
use crate::api::FriendApi;
use crate::config::KeyResolver;
use crate::core::{Cmd, FormSignal, Program, Update};
use crate::model::{CreateFriendRequest, Friend, FriendId, UpdateFriendRequest};
use crate::ui::form::{FormRow, FormView};
use crate::ui::text_field::{TextEdit, TextField};
use crate::ui::{Handled, ViewContext};

const FIELDS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    /// The friend being edited; `None` creates a new one.
    pub editing: Option<FriendId>,
    pub name: TextField,
    pub image_url: TextField,
    pub focus: usize,
    pub is_submitting: bool,
    pub error: Option<String>,
}

impl Model {
    pub fn create() -> Self {
        Self {
            editing: None,
            name: TextField::default(),
            image_url: TextField::default(),
            focus: 0,
            is_submitting: false,
            error: None,
        }
    }

    pub fn from_friend(friend: &Friend) -> Self {
        Self {
            editing: Some(friend.id),
            name: TextField::new(friend.name.clone()),
            image_url: TextField::new(friend.image_url.clone().unwrap_or_default()),
            ..Self::create()
        }
    }

    fn focused_field(&mut self) -> &mut TextField {
        match self.focus {
            0 => &mut self.name,
            _ => &mut self.image_url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    Edit(TextEdit),
    Focus(FocusMove),
    Submit,
    Close,
    Saved(Result<Friend, String>),
}

pub struct FriendForm {
    pub model: Model,
    api: Arc<dyn FriendApi>,
    resolver: Arc<KeyResolver>,
}

impl FriendForm {
    pub fn new(model: Model, api: Arc<dyn FriendApi>, resolver: Arc<KeyResolver>) -> Self {
        Self {
            model,
            api,
            resolver,
        }
    }

    fn submit(&mut self) -> Update<Msg, FormSignal<Friend>> {
        let model = &mut self.model;
        let name = model.name.trimmed().to_string();
        if name.is_empty() {
            model.error = Some("Name is required".to_string());
            return Update::none();
        }
        let image_url = optional(model.image_url.value());

        model.is_submitting = true;
        model.error = None;
        let api = self.api.clone();
        let cmd = match model.editing {
            Some(id) => Cmd::perform(
                format!("Saving {name}"),
                move |request| async move { api.update_friend(request).await },
                UpdateFriendRequest {
                    id,
                    name,
                    image_url,
                },
                Msg::Saved,
            ),
            None => Cmd::perform(
                format!("Creating {name}"),
                move |request| async move { api.create_friend(request).await },
                CreateFriendRequest { name, image_url },
                Msg::Saved,
            ),
        };
        Update::cmd(cmd)
    }
}

impl Program for FriendForm {
    type Msg = Msg;
    type Signal = FormSignal<Friend>;

    fn update(&mut self, msg: Msg) -> Update<Msg, Self::Signal> {
        match msg {
            Msg::Edit(edit) => {
                self.model.focused_field().apply(edit);
                Update::none()
            }
            Msg::Focus(direction) => {
                self.model.focus = direction.apply(self.model.focus, FIELDS);
                Update::none()
            }
            Msg::Submit if self.model.is_submitting => Update::none(),
            Msg::Submit => self.submit(),
            Msg::Close if self.model.is_submitting => Update::none(),
            Msg::Close => Update::signal(FormSignal::CloseRequested),
            Msg::Saved(Ok(friend)) => {
                self.model.is_submitting = false;
                Update::signal(FormSignal::Saved(friend))
            }
            Msg::Saved(Err(error)) => {
                self.model.is_submitting = false;
                self.model.error = Some(error);
                Update::none()
            }
        }
    }

    fn view(&self, frame: &mut Frame, area: Rect, ctx: &ViewContext) {
        let model = &self.model;
        let theme = &ctx.theme;
        FormView {
            title: if model.editing.is_some() { "Edit friend" } else { "New friend" }.to_string(),
            rows: vec![
                FormRow {
                    label: "Name",
                    content: model.name.line(model.focus == 0, "Alice", theme),
                    focused: model.focus == 0,
                },
                FormRow {
                    label: "Image URL",
                    content: model.image_url.line(model.focus == 1, "optional", theme),
                    focused: model.focus == 1,
                },
            ],
            error: model.error.clone(),
            is_submitting: model.is_submitting,
            hint: form_hint(&self.resolver),
            extra_height: 0,
        }
        .render(frame, area, ctx);
    }

    fn handle_key(&self, key: KeyEvent) -> Handled<Msg> {
        form_key(&self.resolver, &key, Msg::Submit, Msg::Close, Msg::Focus)
            .or_else(|| TextEdit::from_key(&key).map(Msg::Edit))
            .map_or(Handled::Consumed, Handled::Event)
    }

    fn title(&self) -> String {
        "Friend".to_string()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::Utc;
    use tokio::sync::Mutex;

    use super::*;
    use crate::api::{ApiError, ApiResult};
    use crate::core::harness::Harness;

    #[derive(Default)]
    struct Recorder {
        created: Mutex<Vec<CreateFriendRequest>>,
        updated: Mutex<Vec<UpdateFriendRequest>>,
    }

    fn alice() -> Friend {
        Friend {
            id: FriendId::new(1),
            name: "Alice".to_string(),
            image_url: None,
            created_at: Utc::now(),
        }
    }

    #[async_trait]
    impl FriendApi for Recorder {
        async fn list_friends(&self) -> ApiResult<Vec<Friend>> {
            Ok(vec![])
        }
        async fn get_friend(&self, id: FriendId) -> ApiResult<Friend> {
            Err(ApiError::not_found("friend", id.get()))
        }
        async fn create_friend(&self, request: CreateFriendRequest) -> ApiResult<Friend> {
            self.created.lock().await.push(request.clone());
            Ok(Friend {
                name: request.name,
                ..alice()
            })
        }
        async fn update_friend(&self, request: UpdateFriendRequest) -> ApiResult<Friend> {
            self.updated.lock().await.push(request.clone());
            Err(ApiError::Conflict(format!("{} already exists", request.name)))
        }
        async fn delete_friend(&self, _id: FriendId) -> ApiResult<()> {
            Ok(())
        }
    }

    fn form(model: Model) -> (Harness<FriendForm>, Arc<Recorder>) {
        let api = Arc::new(Recorder::default());
        let form = FriendForm::new(model, api.clone(), Arc::new(KeyResolver::default()));
        (Harness::new(form), api)
    }

    fn type_text(harness: &mut Harness<FriendForm>, text: &str) {
        for c in text.chars() {
            harness.send(Msg::Edit(TextEdit::Insert(c)));
        }
    }

    #[test]
    fn empty_name_is_rejected_without_commands() {
        let (mut harness, _) = form(Model::create());
        type_text(&mut harness, "   ");
        let before = harness.program.model.clone();

        assert_eq!(*harness.send(Msg::Submit), FormSignal::NoOp);
        assert!(harness.last_issued().is_empty());
        assert_eq!(harness.program.model.error.as_deref(), Some("Name is required"));
        assert_eq!(
            Model {
                error: None,
                ..harness.program.model.clone()
            },
            before
        );
    }

    #[tokio::test]
    async fn valid_submit_creates_and_raises_saved() {
        let (mut harness, api) = form(Model::create());
        type_text(&mut harness, "Alice");

        harness.send(Msg::Submit);
        assert!(harness.program.model.is_submitting);
        assert_eq!(harness.program.model.error, None);
        assert_eq!(harness.last_issued().len(), 1);

        harness.settle().await;
        assert_eq!(
            api.created.lock().await.as_slice(),
            &[CreateFriendRequest {
                name: "Alice".to_string(),
                image_url: None,
            }]
        );
        assert!(!harness.program.model.is_submitting);
        assert!(matches!(
            harness.raised()[..],
            [FormSignal::Saved(saved)] if saved.name == "Alice"
        ));
    }

    #[tokio::test]
    async fn failed_update_stays_open_with_error() {
        let (mut harness, api) = form(Model::from_friend(&alice()));
        harness.send(Msg::Submit);
        harness.settle().await;

        assert_eq!(api.updated.lock().await[0].id, FriendId::new(1));
        assert!(!harness.program.model.is_submitting);
        assert_eq!(
            harness.program.model.error.as_deref(),
            Some("Alice already exists")
        );
        assert!(harness.raised().is_empty());
    }

    #[test]
    fn close_is_idempotent_and_ignored_while_submitting() {
        let (mut harness, _) = form(Model::create());
        type_text(&mut harness, "Bo");
        let before = harness.program.model.clone();
        assert_eq!(*harness.send(Msg::Close), FormSignal::CloseRequested);
        assert_eq!(*harness.send(Msg::Close), FormSignal::CloseRequested);
        assert_eq!(harness.program.model, before);

        harness.program.model.is_submitting = true;
        assert_eq!(*harness.send(Msg::Close), FormSignal::NoOp);
        assert_eq!(*harness.send(Msg::Submit), FormSignal::NoOp);
        assert!(harness.last_issued().is_empty());
    }

    #[test]
    fn edit_round_trips_fields() {
        let friend = Friend {
            image_url: Some("https://img.example/alice.png".to_string()),
            ..alice()
        };
        let model = Model::from_friend(&friend);
        assert_eq!(model.editing, Some(friend.id));
        assert_eq!(model.name.value(), friend.name);
        assert_eq!(model.image_url.value(), "https://img.example/alice.png");
    }
}
