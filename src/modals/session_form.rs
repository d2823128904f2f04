//! Modal for logging a watch session of one entry.
//!
//! Friends and tags are loaded by two independent commands when the modal
//! opens; each list renders on its own as soon as its data arrives.

use std::sync::Arc;

use chrono::NaiveDate;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};

use super::{FocusMove, form_hint, form_key, optional};
use crate::api::{FriendApi, SessionApi, TagApi};
use crate::config::{FormAction, KeyResolver};
use crate::core::{Cmd, FormSignal, Program, Remote, Ticket, Update};
use crate::model::{CreateSessionRequest, EntryId, Friend, FriendId, Tag, TagId, WatchSession};
use crate::ui::form::{FormRow, FormView};
use crate::ui::remote::{Loading, RemoteView, render_remote};
use crate::ui::select_list::{Nav, render_checklist};
use crate::ui::text_field::{TextEdit, TextField};
use crate::ui::{Handled, ViewContext};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

const DATE: usize = 0;
const NOTES: usize = 1;
const FRIENDS: usize = 2;
const TAGS: usize = 3;
const FIELDS: usize = 4;
const LIST_HEIGHT: u16 = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    pub entry_id: EntryId,
    pub watched_on: TextField,
    pub notes: TextField,
    pub friends: Remote<Vec<Friend>>,
    pub tags: Remote<Vec<Tag>>,
    /// Most recently selected first.
    pub selected_friends: Vec<FriendId>,
    pub selected_tags: Vec<TagId>,
    pub friend_cursor: usize,
    pub tag_cursor: usize,
    pub focus: usize,
    pub is_submitting: bool,
    pub error: Option<String>,
}

impl Model {
    pub fn new(entry_id: EntryId, today: NaiveDate) -> Self {
        Self {
            entry_id,
            watched_on: TextField::new(today.format(DATE_FORMAT).to_string()),
            notes: TextField::default(),
            friends: Remote::new(),
            tags: Remote::new(),
            selected_friends: Vec::new(),
            selected_tags: Vec::new(),
            friend_cursor: 0,
            tag_cursor: 0,
            focus: DATE,
            is_submitting: false,
            error: None,
        }
    }

    fn friend_under_cursor(&self) -> Option<FriendId> {
        self.friends.value()?.get(self.friend_cursor).map(|f| f.id)
    }

    fn tag_under_cursor(&self) -> Option<TagId> {
        self.tags.value()?.get(self.tag_cursor).map(|t| t.id)
    }
}

/// Removes `id` when present, otherwise puts it first.
fn toggle<T: PartialEq>(selected: &mut Vec<T>, id: T) {
    if let Some(index) = selected.iter().position(|s| *s == id) {
        selected.remove(index);
    } else {
        selected.insert(0, id);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    Load,
    FriendsLoaded(Ticket, Result<Vec<Friend>, String>),
    TagsLoaded(Ticket, Result<Vec<Tag>, String>),
    Edit(TextEdit),
    Focus(FocusMove),
    Nav(Nav),
    ToggleFriend(FriendId),
    ToggleTag(TagId),
    Submit,
    Close,
    Saved(Result<WatchSession, String>),
}

pub struct SessionForm {
    pub model: Model,
    sessions: Arc<dyn SessionApi>,
    friends: Arc<dyn FriendApi>,
    tags: Arc<dyn TagApi>,
    resolver: Arc<KeyResolver>,
}

impl SessionForm {
    pub fn new(
        model: Model,
        sessions: Arc<dyn SessionApi>,
        friends: Arc<dyn FriendApi>,
        tags: Arc<dyn TagApi>,
        resolver: Arc<KeyResolver>,
    ) -> Self {
        Self {
            model,
            sessions,
            friends,
            tags,
            resolver,
        }
    }

    fn load(&mut self) -> Cmd<Msg> {
        let friends_ticket = self.model.friends.begin();
        let tags_ticket = self.model.tags.begin();
        let friends = self.friends.clone();
        let tags = self.tags.clone();
        Cmd::batch([
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

    fn submit(&mut self) -> Update<Msg, FormSignal<WatchSession>> {
        let model = &mut self.model;
        let Ok(watched_on) = NaiveDate::parse_from_str(model.watched_on.trimmed(), DATE_FORMAT) else {
            model.error = Some("Date must look like YYYY-MM-DD".to_string());
            return Update::none();
        };
        model.is_submitting = true;
        model.error = None;

        let request = CreateSessionRequest {
            entry_id: model.entry_id,
            watched_on,
            friends: model.selected_friends.clone(),
            tags: model.selected_tags.clone(),
            notes: optional(model.notes.value()),
        };
        let sessions = self.sessions.clone();
        Update::cmd(Cmd::perform(
            format!("Logging session on {watched_on}"),
            move |request| async move { sessions.create_session(request).await },
            request,
            Msg::Saved,
        ))
    }
}

impl Program for SessionForm {
    type Msg = Msg;
    type Signal = FormSignal<WatchSession>;

    fn init(&self) -> Option<Msg> {
        Some(Msg::Load)
    }

    fn update(&mut self, msg: Msg) -> Update<Msg, Self::Signal> {
        let model = &mut self.model;
        match msg {
            Msg::Load => Update::cmd(self.load()),
            Msg::FriendsLoaded(ticket, result) => {
                model.friends.resolve(ticket, result);
                Update::none()
            }
            Msg::TagsLoaded(ticket, result) => {
                model.tags.resolve(ticket, result);
                Update::none()
            }
            Msg::Edit(edit) => {
                match model.focus {
                    DATE => model.watched_on.apply(edit),
                    NOTES => model.notes.apply(edit),
                    _ => {}
                }
                Update::none()
            }
            Msg::Focus(direction) => {
                model.focus = direction.apply(model.focus, FIELDS);
                Update::none()
            }
            Msg::Nav(nav) => {
                match model.focus {
                    FRIENDS => {
                        let len = model.friends.value().map_or(0, Vec::len);
                        model.friend_cursor = nav.apply(model.friend_cursor, len);
                    }
                    TAGS => {
                        let len = model.tags.value().map_or(0, Vec::len);
                        model.tag_cursor = nav.apply(model.tag_cursor, len);
                    }
                    _ => {}
                }
                Update::none()
            }
            Msg::ToggleFriend(id) => {
                toggle(&mut model.selected_friends, id);
                Update::none()
            }
            Msg::ToggleTag(id) => {
                toggle(&mut model.selected_tags, id);
                Update::none()
            }
            Msg::Submit if model.is_submitting => Update::none(),
            Msg::Submit => self.submit(),
            Msg::Close if model.is_submitting => Update::none(),
            Msg::Close => Update::signal(FormSignal::CloseRequested),
            Msg::Saved(Ok(session)) => {
                model.is_submitting = false;
                Update::signal(FormSignal::Saved(session))
            }
            Msg::Saved(Err(error)) => {
                model.is_submitting = false;
                model.error = Some(error);
                Update::none()
            }
        }
    }

    fn view(&self, frame: &mut Frame, area: Rect, ctx: &ViewContext) {
        let model = &self.model;
        let theme = &ctx.theme;
        let lists = FormView {
            title: "Log watch session".to_string(),
            rows: vec![
                FormRow {
                    label: "Date",
                    content: model.watched_on.line(model.focus == DATE, "YYYY-MM-DD", theme),
                    focused: model.focus == DATE,
                },
                FormRow {
                    label: "Notes",
                    content: model.notes.line(model.focus == NOTES, "optional", theme),
                    focused: model.focus == NOTES,
                },
            ],
            error: model.error.clone(),
            is_submitting: model.is_submitting,
            hint: format!(
                "{} · {} select",
                form_hint(&self.resolver),
                self.resolver.display_form(FormAction::Toggle)
            ),
            extra_height: LIST_HEIGHT,
        }
        .render(frame, area, ctx);

        let [friends_area, tags_area] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(lists);

        render_remote(
            frame,
            friends_area,
            ctx,
            model.friends.data(),
            &RemoteView::new("Error loading friends").loading(Loading::Skeleton(3)),
            |frame, area, friends| {
                let items: Vec<(String, bool)> = friends
                    .iter()
                    .map(|f| (f.name.clone(), model.selected_friends.contains(&f.id)))
                    .collect();
                render_checklist(frame, area, ctx, "Friends", &items, model.friend_cursor, model.focus == FRIENDS);
            },
        );
        render_remote(
            frame,
            tags_area,
            ctx,
            model.tags.data(),
            &RemoteView::new("Error loading tags").loading(Loading::Skeleton(3)),
            |frame, area, tags| {
                let items: Vec<(String, bool)> = tags
                    .iter()
                    .map(|t| (t.name.clone(), model.selected_tags.contains(&t.id)))
                    .collect();
                render_checklist(frame, area, ctx, "Tags", &items, model.tag_cursor, model.focus == TAGS);
            },
        );
    }

    fn handle_key(&self, key: KeyEvent) -> Handled<Msg> {
        let model = &self.model;
        if let Some(msg) = form_key(&self.resolver, &key, Msg::Submit, Msg::Close, Msg::Focus) {
            return Handled::Event(msg);
        }
        let msg = match model.focus {
            FRIENDS | TAGS if self.resolver.matches_form(&key, FormAction::Toggle) => {
                if model.focus == FRIENDS {
                    model.friend_under_cursor().map(Msg::ToggleFriend)
                } else {
                    model.tag_under_cursor().map(Msg::ToggleTag)
                }
            }
            FRIENDS | TAGS => Nav::from_key(&self.resolver, &key).map(Msg::Nav),
            _ => TextEdit::from_key(&key).map(Msg::Edit),
        };
        msg.map_or(Handled::Consumed, Handled::Event)
    }

    fn title(&self) -> String {
        "Watch session".to_string()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::Utc;
    use crossterm::event::{KeyCode, KeyModifiers};
    use tokio::sync::Mutex;

    use super::*;
    use crate::api::ApiResult;
    use crate::core::harness::Harness;
    use crate::model::{CreateFriendRequest, CreateTagRequest, SessionId, UpdateFriendRequest, UpdateTagRequest};

    #[derive(Default)]
    struct Backend {
        created: Mutex<Vec<CreateSessionRequest>>,
    }

    fn friend(id: u64, name: &str) -> Friend {
        Friend {
            id: FriendId::new(id),
            name: name.to_string(),
            image_url: None,
            created_at: Utc::now(),
        }
    }

    fn tag(id: u64, name: &str) -> Tag {
        Tag {
            id: TagId::new(id),
            name: name.to_string(),
            color: crate::model::DEFAULT_TAG_COLOR.to_string(),
            description: None,
            created_at: Utc::now(),
        }
    }

    #[async_trait]
    impl FriendApi for Backend {
        async fn list_friends(&self) -> ApiResult<Vec<Friend>> {
            Ok(vec![friend(1, "Alice"), friend(2, "Bob")])
        }
        async fn get_friend(&self, id: FriendId) -> ApiResult<Friend> {
            Ok(friend(id.get(), "Alice"))
        }
        async fn create_friend(&self, request: CreateFriendRequest) -> ApiResult<Friend> {
            Ok(friend(9, &request.name))
        }
        async fn update_friend(&self, request: UpdateFriendRequest) -> ApiResult<Friend> {
            Ok(friend(request.id.get(), &request.name))
        }
        async fn delete_friend(&self, _: FriendId) -> ApiResult<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl TagApi for Backend {
        async fn list_tags(&self) -> ApiResult<Vec<Tag>> {
            Err(crate::api::ApiError::Invalid("tags unavailable".to_string()))
        }
        async fn create_tag(&self, request: CreateTagRequest) -> ApiResult<Tag> {
            Ok(tag(9, &request.name))
        }
        async fn update_tag(&self, request: UpdateTagRequest) -> ApiResult<Tag> {
            Ok(tag(request.id.get(), &request.name))
        }
        async fn delete_tag(&self, _: TagId) -> ApiResult<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl SessionApi for Backend {
        async fn list_sessions(&self, _: EntryId) -> ApiResult<Vec<WatchSession>> {
            Ok(vec![])
        }
        async fn create_session(&self, request: CreateSessionRequest) -> ApiResult<WatchSession> {
            self.created.lock().await.push(request.clone());
            Ok(WatchSession {
                id: SessionId::new(1),
                entry_id: request.entry_id,
                watched_on: request.watched_on,
                friends: request.friends,
                tags: request.tags,
                notes: request.notes,
            })
        }
        async fn delete_session(&self, _: SessionId) -> ApiResult<()> {
            Ok(())
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).expect("valid date")
    }

    fn harness() -> (Harness<SessionForm>, Arc<Backend>) {
        let backend = Arc::new(Backend::default());
        let form = SessionForm::new(
            Model::new(EntryId::new(4), today()),
            backend.clone(),
            backend.clone(),
            backend.clone(),
            Arc::new(KeyResolver::default()),
        );
        (Harness::start(form), backend)
    }

    #[test]
    fn date_defaults_to_today() {
        assert_eq!(Model::new(EntryId::new(1), today()).watched_on.value(), "2024-03-09");
    }

    #[tokio::test]
    async fn loads_friends_and_tags_concurrently() {
        let (mut harness, _) = harness();
        assert_eq!(harness.pending_names(), ["Loading friends", "Loading tags"]);
        assert!(harness.program.model.friends.data().is_loading());
        assert!(harness.program.model.tags.data().is_loading());

        harness.settle().await;
        assert_eq!(harness.program.model.friends.value().map(Vec::len), Some(2));
        assert_eq!(
            harness.program.model.tags.data().failure(),
            Some("tags unavailable")
        );
    }

    #[test]
    fn toggling_prepends_and_removes() {
        let (mut harness, _) = harness();
        let (a, b) = (FriendId::new(1), FriendId::new(2));

        harness.send(Msg::ToggleFriend(a));
        harness.send(Msg::ToggleFriend(b));
        assert_eq!(harness.program.model.selected_friends, [b, a]);

        harness.send(Msg::ToggleFriend(a));
        harness.send(Msg::ToggleFriend(a));
        assert_eq!(harness.program.model.selected_friends, [a, b]);

        harness.send(Msg::ToggleFriend(a));
        harness.send(Msg::ToggleFriend(b));
        assert!(harness.program.model.selected_friends.is_empty());
    }

    #[tokio::test]
    async fn toggle_key_targets_row_under_cursor() {
        let (mut harness, _) = harness();
        harness.settle().await;
        harness.send(Msg::Focus(FocusMove::Next));
        harness.send(Msg::Focus(FocusMove::Next));
        harness.send(Msg::Nav(Nav::Down));

        let space = KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE);
        assert_eq!(
            harness.program.handle_key(space),
            Handled::Event(Msg::ToggleFriend(FriendId::new(2)))
        );
    }

    #[test]
    fn rejects_malformed_date() {
        let (mut harness, _) = harness();
        harness.discard_pending();
        harness.send(Msg::Edit(TextEdit::Backspace));
        harness.send(Msg::Submit);

        assert!(harness.last_issued().is_empty());
        assert_eq!(
            harness.program.model.error.as_deref(),
            Some("Date must look like YYYY-MM-DD")
        );
    }

    #[tokio::test]
    async fn submits_selected_friends_and_notes() {
        let (mut harness, backend) = harness();
        harness.settle().await;
        harness.send(Msg::Focus(FocusMove::Next));
        for c in "cinema night".chars() {
            harness.send(Msg::Edit(TextEdit::Insert(c)));
        }
        harness.send(Msg::ToggleFriend(FriendId::new(2)));
        harness.send(Msg::Submit);
        assert_eq!(harness.last_issued(), ["Logging session on 2024-03-09"]);
        harness.settle().await;

        let created = backend.created.lock().await;
        assert_eq!(
            created.as_slice(),
            [CreateSessionRequest {
                entry_id: EntryId::new(4),
                watched_on: today(),
                friends: vec![FriendId::new(2)],
                tags: vec![],
                notes: Some("cinema night".to_string()),
            }]
        );
        let raised = harness.raised();
        assert!(matches!(raised.as_slice(), [FormSignal::Saved(s)] if s.friends == [FriendId::new(2)]));
    }
}
