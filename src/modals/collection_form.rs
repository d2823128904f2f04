use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;

use super::{FocusMove, form_hint, form_key, optional};
use crate::api::CollectionApi;
use crate::config::KeyResolver;
use crate::core::{Cmd, FormSignal, Program, Update};
use crate::model::{Collection, CollectionId, CreateCollectionRequest, UpdateCollectionRequest};
use crate::ui::form::{FormRow, FormView};
use crate::ui::text_field::{TextEdit, TextField};
use crate::ui::{Handled, ViewContext};

const FIELDS: usize = 2;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Model {
    pub editing: Option<CollectionId>,
    pub name: TextField,
    pub description: TextField,
    pub focus: usize,
    pub is_submitting: bool,
    pub error: Option<String>,
}

impl Model {
    pub fn create() -> Self {
        Self::default()
    }

    pub fn from_collection(collection: &Collection) -> Self {
        Self {
            editing: Some(collection.id),
            name: TextField::new(collection.name.clone()),
            description: TextField::new(collection.description.clone().unwrap_or_default()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    Edit(TextEdit),
    Focus(FocusMove),
    Submit,
    Close,
    Saved(Result<Collection, String>),
}

pub struct CollectionForm {
    pub model: Model,
    api: Arc<dyn CollectionApi>,
    resolver: Arc<KeyResolver>,
}

impl CollectionForm {
    pub fn new(model: Model, api: Arc<dyn CollectionApi>, resolver: Arc<KeyResolver>) -> Self {
        Self {
            model,
            api,
            resolver,
        }
    }

    fn submit(&mut self) -> Update<Msg, FormSignal<Collection>> {
        let name = self.model.name.trimmed().to_string();
        if name.is_empty() {
            self.model.error = Some("Name is required".to_string());
            return Update::none();
        }
        let description = optional(self.model.description.value());
        self.model.is_submitting = true;
        self.model.error = None;

        let api = self.api.clone();
        let cmd = if let Some(id) = self.model.editing {
            Cmd::perform(
                format!("Saving collection {name}"),
                move |request| async move { api.update_collection(request).await },
                UpdateCollectionRequest {
                    id,
                    name,
                    description,
                },
                Msg::Saved,
            )
        } else {
            Cmd::perform(
                format!("Creating collection {name}"),
                move |request| async move { api.create_collection(request).await },
                CreateCollectionRequest { name, description },
                Msg::Saved,
            )
        };
        Update::cmd(cmd)
    }
}

impl Program for CollectionForm {
    type Msg = Msg;
    type Signal = FormSignal<Collection>;

    fn update(&mut self, msg: Msg) -> Update<Msg, Self::Signal> {
        match msg {
            Msg::Edit(edit) => {
                if self.model.focus == 0 {
                    self.model.name.apply(edit);
                } else {
                    self.model.description.apply(edit);
                }
                Update::none()
            }
            Msg::Focus(direction) => {
                self.model.focus = direction.apply(self.model.focus, FIELDS);
                Update::none()
            }
            Msg::Submit | Msg::Close if self.model.is_submitting => Update::none(),
            Msg::Submit => self.submit(),
            Msg::Close => Update::signal(FormSignal::CloseRequested),
            Msg::Saved(result) => {
                self.model.is_submitting = false;
                match result {
                    Ok(collection) => Update::signal(FormSignal::Saved(collection)),
                    Err(error) => {
                        self.model.error = Some(error);
                        Update::none()
                    }
                }
            }
        }
    }

    fn view(&self, frame: &mut Frame, area: Rect, ctx: &ViewContext) {
        let model = &self.model;
        FormView {
            title: if model.editing.is_some() {
                "Edit collection"
            } else {
                "New collection"
            }
            .to_string(),
            rows: vec![
                FormRow {
                    label: "Name",
                    content: model.name.line(model.focus == 0, "Weekend marathon", &ctx.theme),
                    focused: model.focus == 0,
                },
                FormRow {
                    label: "Description",
                    content: model.description.line(model.focus == 1, "optional", &ctx.theme),
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
        "Collection".to_string()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::Utc;

    use super::*;
    use crate::api::{ApiError, ApiResult};
    use crate::core::harness::Harness;
    use crate::model::EntryId;

    struct Unavailable;

    #[async_trait]
    impl CollectionApi for Unavailable {
        async fn list_collections(&self) -> ApiResult<Vec<Collection>> {
            Ok(vec![])
        }
        async fn create_collection(&self, _: CreateCollectionRequest) -> ApiResult<Collection> {
            Err(ApiError::Invalid("disk full".to_string()))
        }
        async fn update_collection(&self, request: UpdateCollectionRequest) -> ApiResult<Collection> {
            Ok(Collection {
                id: request.id,
                name: request.name,
                description: request.description,
                entries: vec![],
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
        }
        async fn delete_collection(&self, _: CollectionId) -> ApiResult<()> {
            Ok(())
        }
        async fn add_to_collection(&self, id: CollectionId, _: EntryId) -> ApiResult<Collection> {
            Err(ApiError::not_found("collection", id.get()))
        }
        async fn remove_from_collection(&self, id: CollectionId, _: EntryId) -> ApiResult<Collection> {
            Err(ApiError::not_found("collection", id.get()))
        }
    }

    fn harness(model: Model) -> Harness<CollectionForm> {
        Harness::new(CollectionForm::new(
            model,
            Arc::new(Unavailable),
            Arc::new(KeyResolver::default()),
        ))
    }

    #[test]
    fn edits_follow_focus() {
        let mut harness = harness(Model::create());
        harness.send(Msg::Edit(TextEdit::Insert('a')));
        harness.send(Msg::Focus(FocusMove::Next));
        harness.send(Msg::Edit(TextEdit::Insert('b')));

        assert_eq!(harness.program.model.name.value(), "a");
        assert_eq!(harness.program.model.description.value(), "b");
    }

    #[tokio::test]
    async fn failed_create_keeps_form_open() {
        let mut model = Model::create();
        model.name = TextField::new("Noir");
        let mut harness = harness(model);

        harness.send(Msg::Submit);
        assert_eq!(harness.last_issued(), ["Creating collection Noir"]);
        harness.settle().await;

        assert!(harness.raised().is_empty());
        assert!(!harness.program.model.is_submitting);
        assert_eq!(harness.program.model.error.as_deref(), Some("disk full"));
    }

    #[tokio::test]
    async fn saving_existing_collection_raises_saved() {
        let collection = Collection {
            id: CollectionId::new(3),
            name: "Noir".to_string(),
            description: None,
            entries: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let mut harness = harness(Model::from_collection(&collection));

        harness.send(Msg::Focus(FocusMove::Prev));
        for c in "Black and white".chars() {
            harness.send(Msg::Edit(TextEdit::Insert(c)));
        }
        harness.send(Msg::Submit);
        assert_eq!(harness.last_issued(), ["Saving collection Noir"]);
        harness.settle().await;

        let raised = harness.raised();
        let [FormSignal::Saved(saved)] = raised.as_slice() else {
            panic!("expected a saved collection");
        };
        assert_eq!(saved.description.as_deref(), Some("Black and white"));
    }
}
