//! Add/edit modal for a library entry.
//!
//! The first row is the media kind, flipped with the toggle key. The TMDB id
//! is only asked for when adding, since an existing entry keeps its link.

use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};

use super::{FocusMove, form_hint, form_key};
use crate::api::LibraryApi;
use crate::config::{FormAction, KeyResolver};
use crate::core::{Cmd, FormSignal, Program, Update};
use crate::model::{AddEntryRequest, EntryId, LibraryEntry, MediaKind, TmdbId, UpdateEntryRequest};
use crate::ui::form::{FormRow, FormView};
use crate::ui::text_field::{TextEdit, TextField};
use crate::ui::{Handled, ViewContext};

pub const MIN_YEAR: i32 = 1870;
pub const MAX_YEAR: i32 = 2100;

const KIND: usize = 0;
const TITLE: usize = 1;
const YEAR: usize = 2;
const EPISODES: usize = 3;
const TMDB: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    pub editing: Option<EntryId>,
    pub kind: MediaKind,
    pub title: TextField,
    pub year: TextField,
    pub total_episodes: TextField,
    pub tmdb_id: TextField,
    pub focus: usize,
    pub is_submitting: bool,
    pub error: Option<String>,
}

/// Parsed form values shared by the add and update requests.
#[derive(Debug, PartialEq, Eq)]
struct Validated {
    title: String,
    year: Option<i32>,
    total_episodes: Option<u32>,
    tmdb_id: Option<TmdbId>,
}

impl Model {
    pub fn create() -> Self {
        Self {
            editing: None,
            kind: MediaKind::Movie,
            title: TextField::default(),
            year: TextField::default(),
            total_episodes: TextField::default(),
            tmdb_id: TextField::default(),
            focus: TITLE,
            is_submitting: false,
            error: None,
        }
    }

    pub fn from_entry(entry: &LibraryEntry) -> Self {
        Self {
            editing: Some(entry.id),
            kind: entry.kind,
            title: TextField::new(entry.title.clone()),
            year: TextField::new(entry.year.map(|y| y.to_string()).unwrap_or_default()),
            total_episodes: TextField::new(
                entry.progress.total.map(|t| t.to_string()).unwrap_or_default(),
            ),
            tmdb_id: TextField::new(entry.tmdb_id.map(|id| id.to_string()).unwrap_or_default()),
            ..Self::create()
        }
    }

    const fn field_count(&self) -> usize {
        if self.editing.is_some() { TMDB } else { TMDB + 1 }
    }

    fn focused_field(&mut self) -> Option<&mut TextField> {
        match self.focus {
            TITLE => Some(&mut self.title),
            YEAR => Some(&mut self.year),
            EPISODES => Some(&mut self.total_episodes),
            TMDB => Some(&mut self.tmdb_id),
            _ => None,
        }
    }

    fn validate(&self) -> Result<Validated, String> {
        let title = self.title.trimmed();
        if title.is_empty() {
            return Err("Title is required".to_string());
        }
        let year = match parse_optional::<i32>(self.year.trimmed()) {
            Ok(year) if year.is_none_or(|y| (MIN_YEAR..=MAX_YEAR).contains(&y)) => year,
            _ => return Err(format!("Year must be between {MIN_YEAR} and {MAX_YEAR}")),
        };
        let total_episodes = match self.kind {
            MediaKind::Movie => None,
            MediaKind::Series => parse_optional::<u32>(self.total_episodes.trimmed())
                .map_err(|()| "Episodes must be a whole number".to_string())?,
        };
        let tmdb_id = parse_optional::<u64>(self.tmdb_id.trimmed())
            .map_err(|()| "TMDB id must be a number".to_string())?
            .map(TmdbId::new);
        Ok(Validated {
            title: title.to_string(),
            year,
            total_episodes,
            tmdb_id,
        })
    }
}

/// Blank means `None`; anything else must parse.
fn parse_optional<T: std::str::FromStr>(text: &str) -> Result<Option<T>, ()> {
    if text.is_empty() {
        return Ok(None);
    }
    text.parse().map(Some).map_err(|_| ())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    Edit(TextEdit),
    Focus(FocusMove),
    ToggleKind,
    Submit,
    Close,
    Saved(Result<LibraryEntry, String>),
}

pub struct EntryForm {
    pub model: Model,
    api: Arc<dyn LibraryApi>,
    resolver: Arc<KeyResolver>,
}

impl EntryForm {
    pub fn new(model: Model, api: Arc<dyn LibraryApi>, resolver: Arc<KeyResolver>) -> Self {
        Self {
            model,
            api,
            resolver,
        }
    }

    fn submit(&mut self) -> Update<Msg, FormSignal<LibraryEntry>> {
        let valid = match self.model.validate() {
            Ok(valid) => valid,
            Err(error) => {
                self.model.error = Some(error);
                return Update::none();
            }
        };
        self.model.is_submitting = true;
        self.model.error = None;

        let api = self.api.clone();
        let kind = self.model.kind;
        let cmd = match self.model.editing {
            Some(id) => Cmd::perform(
                format!("Saving {}", valid.title),
                move |request| async move { api.update_entry(request).await },
                UpdateEntryRequest {
                    id,
                    kind,
                    title: valid.title,
                    year: valid.year,
                    total_episodes: valid.total_episodes,
                },
                Msg::Saved,
            ),
            None => Cmd::perform(
                format!("Adding {}", valid.title),
                move |request| async move { api.add_entry(request).await },
                AddEntryRequest {
                    kind,
                    title: valid.title,
                    year: valid.year,
                    tmdb_id: valid.tmdb_id,
                    total_episodes: valid.total_episodes,
                },
                Msg::Saved,
            ),
        };
        Update::cmd(cmd)
    }
}

impl Program for EntryForm {
    type Msg = Msg;
    type Signal = FormSignal<LibraryEntry>;

    fn update(&mut self, msg: Msg) -> Update<Msg, Self::Signal> {
        match msg {
            Msg::Edit(edit) => {
                if let Some(field) = self.model.focused_field() {
                    field.apply(edit);
                }
                Update::none()
            }
            Msg::Focus(direction) => {
                self.model.focus = direction.apply(self.model.focus, self.model.field_count());
                Update::none()
            }
            Msg::ToggleKind => {
                self.model.kind = self.model.kind.toggled();
                Update::none()
            }
            Msg::Submit if self.model.is_submitting => Update::none(),
            Msg::Submit => self.submit(),
            Msg::Close if self.model.is_submitting => Update::none(),
            Msg::Close => Update::signal(FormSignal::CloseRequested),
            Msg::Saved(Ok(entry)) => {
                self.model.is_submitting = false;
                Update::signal(FormSignal::Saved(entry))
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
        let kind_style = if model.focus == KIND {
            theme.selection()
        } else {
            Style::default().fg(theme.text)
        };
        let mut rows = vec![
            FormRow {
                label: "Kind",
                content: Line::from(vec![
                    Span::styled(format!(" {} ", model.kind), kind_style),
                    Span::styled(
                        format!("  {} to switch", self.resolver.display_form(FormAction::Toggle)),
                        Style::default().fg(theme.muted()),
                    ),
                ]),
                focused: model.focus == KIND,
            },
            FormRow {
                label: "Title",
                content: model.title.line(model.focus == TITLE, "Blade Runner", theme),
                focused: model.focus == TITLE,
            },
            FormRow {
                label: "Year",
                content: model.year.line(model.focus == YEAR, "optional", theme),
                focused: model.focus == YEAR,
            },
            FormRow {
                label: "Episodes",
                content: if model.kind == MediaKind::Series {
                    model.total_episodes.line(model.focus == EPISODES, "unknown", theme)
                } else {
                    Line::styled("movies have no episodes", Style::default().fg(theme.muted()))
                },
                focused: model.focus == EPISODES,
            },
        ];
        if model.editing.is_none() {
            rows.push(FormRow {
                label: "TMDB id",
                content: model.tmdb_id.line(model.focus == TMDB, "optional", theme),
                focused: model.focus == TMDB,
            });
        }
        FormView {
            title: if model.editing.is_some() { "Edit entry" } else { "Add entry" }.to_string(),
            rows,
            error: model.error.clone(),
            is_submitting: model.is_submitting,
            hint: form_hint(&self.resolver),
            extra_height: 0,
        }
        .render(frame, area, ctx);
    }

    fn handle_key(&self, key: KeyEvent) -> Handled<Msg> {
        if self.model.focus == KIND && self.resolver.matches_form(&key, FormAction::Toggle) {
            return Handled::Event(Msg::ToggleKind);
        }
        form_key(&self.resolver, &key, Msg::Submit, Msg::Close, Msg::Focus)
            .or_else(|| {
                (self.model.focus != KIND)
                    .then(|| TextEdit::from_key(&key).map(Msg::Edit))
                    .flatten()
            })
            .map_or(Handled::Consumed, Handled::Event)
    }

    fn title(&self) -> String {
        "Entry".to_string()
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};

    use super::*;
    use crate::model::EpisodeProgress;
    use crate::model::WatchStatus;

    struct NoLibrary;

    #[async_trait::async_trait]
    impl LibraryApi for NoLibrary {
        async fn list_entries(&self) -> crate::api::ApiResult<Vec<LibraryEntry>> {
            Ok(vec![])
        }
        async fn get_entry(&self, id: EntryId) -> crate::api::ApiResult<LibraryEntry> {
            Err(crate::api::ApiError::not_found("entry", id.get()))
        }
        async fn add_entry(&self, request: AddEntryRequest) -> crate::api::ApiResult<LibraryEntry> {
            let mut entry = dark();
            entry.kind = request.kind;
            entry.title = request.title;
            entry.year = request.year;
            entry.tmdb_id = request.tmdb_id;
            entry.progress.total = request.total_episodes;
            Ok(entry)
        }
        async fn update_entry(&self, _: UpdateEntryRequest) -> crate::api::ApiResult<LibraryEntry> {
            Ok(dark())
        }
        async fn set_status(&self, _: EntryId, _: WatchStatus) -> crate::api::ApiResult<LibraryEntry> {
            Ok(dark())
        }
        async fn set_rating(&self, _: EntryId, _: Option<u8>) -> crate::api::ApiResult<LibraryEntry> {
            Ok(dark())
        }
        async fn toggle_favorite(&self, _: EntryId) -> crate::api::ApiResult<LibraryEntry> {
            Ok(dark())
        }
        async fn record_episode(&self, _: EntryId) -> crate::api::ApiResult<LibraryEntry> {
            Ok(dark())
        }
        async fn untrack_entry(&self, _: EntryId) -> crate::api::ApiResult<()> {
            Ok(())
        }
    }

    fn dark() -> LibraryEntry {
        LibraryEntry {
            id: EntryId::new(4),
            tmdb_id: Some(TmdbId::new(70523)),
            kind: MediaKind::Series,
            title: "Dark".to_string(),
            year: Some(2017),
            overview: None,
            status: WatchStatus::InProgress,
            rating: Some(9),
            is_favorite: false,
            progress: EpisodeProgress {
                watched: 3,
                total: Some(26),
            },
            added_at: chrono::Utc::now(),
        }
    }

    fn form(model: Model) -> EntryForm {
        EntryForm::new(model, Arc::new(NoLibrary), Arc::new(KeyResolver::default()))
    }

    fn with_title(title: &str) -> Model {
        Model {
            title: TextField::new(title),
            ..Model::create()
        }
    }

    #[test]
    fn title_is_required() {
        assert_eq!(with_title("   ").validate(), Err("Title is required".to_string()));
    }

    #[test]
    fn year_must_be_in_range() {
        let message = Err(format!("Year must be between {MIN_YEAR} and {MAX_YEAR}"));
        for year in ["1869", "2101", "soon"] {
            let model = Model {
                year: TextField::new(year),
                ..with_title("Metropolis")
            };
            assert_eq!(model.validate().map(|v| v.year), message, "{year}");
        }
        for (text, year) in [("1870", Some(1870)), ("2100", Some(2100)), ("", None)] {
            let model = Model {
                year: TextField::new(text),
                ..with_title("Metropolis")
            };
            assert_eq!(model.validate().map(|v| v.year), Ok(year));
        }
    }

    #[test]
    fn movies_drop_episode_counts() {
        let model = Model {
            total_episodes: TextField::new("12"),
            ..with_title("Heat")
        };
        assert_eq!(model.validate().map(|v| v.total_episodes), Ok(None));

        let series = Model {
            kind: MediaKind::Series,
            ..model
        };
        assert_eq!(series.validate().map(|v| v.total_episodes), Ok(Some(12)));
    }

    #[test]
    fn from_entry_round_trips_editable_fields() {
        let entry = dark();
        let model = Model::from_entry(&entry);
        let valid = model.validate();
        assert_eq!(
            valid,
            Ok(Validated {
                title: entry.title,
                year: entry.year,
                total_episodes: entry.progress.total,
                tmdb_id: entry.tmdb_id,
            })
        );
        assert_eq!(model.kind, entry.kind);
        assert_eq!(model.field_count(), 4);
    }

    #[test]
    fn toggle_key_only_flips_kind_on_kind_row() {
        let space = KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE);
        let mut form = form(Model::create());
        assert_eq!(form.handle_key(space), Handled::Event(Msg::Edit(TextEdit::Insert(' '))));

        form.model.focus = KIND;
        assert_eq!(form.handle_key(space), Handled::Event(Msg::ToggleKind));
        let _ = form.update(Msg::ToggleKind);
        assert_eq!(form.model.kind, MediaKind::Series);
    }

    #[tokio::test]
    async fn adds_series_with_tmdb_link() {
        let mut harness = crate::core::harness::Harness::new(form(Model {
            kind: MediaKind::Series,
            year: TextField::new("2019"),
            total_episodes: TextField::new("8"),
            tmdb_id: TextField::new("87108"),
            ..with_title("Chernobyl")
        }));
        harness.send(Msg::Submit);
        assert_eq!(harness.last_issued(), ["Adding Chernobyl"]);
        harness.settle().await;

        let raised = harness.raised();
        let [FormSignal::Saved(entry)] = raised.as_slice() else {
            panic!("expected a saved entry");
        };
        assert_eq!(entry.title, "Chernobyl");
        assert_eq!(entry.tmdb_id, Some(TmdbId::new(87108)));
        assert_eq!(entry.progress.total, Some(8));
    }
}
