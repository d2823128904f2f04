use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};

use super::{FocusMove, form_hint, form_key, optional};
use crate::api::TagApi;
use crate::config::KeyResolver;
use crate::core::{Cmd, FormSignal, Program, Update};
use crate::model::{CreateTagRequest, DEFAULT_TAG_COLOR, Tag, TagId, UpdateTagRequest, is_hex_color};
use crate::ui::form::{FormRow, FormView};
use crate::ui::text_field::{TextEdit, TextField};
use crate::ui::{Handled, ViewContext};

const FIELDS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    pub editing: Option<TagId>,
    pub name: TextField,
    pub color: TextField,
    pub description: TextField,
    pub focus: usize,
    pub is_submitting: bool,
    pub error: Option<String>,
}

impl Model {
    pub fn create() -> Self {
        Self {
            editing: None,
            name: TextField::default(),
            color: TextField::new(DEFAULT_TAG_COLOR),
            description: TextField::default(),
            focus: 0,
            is_submitting: false,
            error: None,
        }
    }

    pub fn from_tag(tag: &Tag) -> Self {
        Self {
            editing: Some(tag.id),
            name: TextField::new(tag.name.clone()),
            color: TextField::new(tag.color.clone()),
            description: TextField::new(tag.description.clone().unwrap_or_default()),
            ..Self::create()
        }
    }

    fn focused_field(&mut self) -> &mut TextField {
        match self.focus {
            0 => &mut self.name,
            1 => &mut self.color,
            _ => &mut self.description,
        }
    }

    /// The `(name, color)` pair to save, or the message to show.
    fn validate(&self) -> Result<(String, String), String> {
        let name = self.name.trimmed();
        if name.is_empty() {
            return Err("Name is required".to_string());
        }
        let color = self.color.trimmed();
        if !is_hex_color(color) {
            return Err("Color must look like #rrggbb".to_string());
        }
        Ok((name.to_string(), color.to_lowercase()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    Edit(TextEdit),
    Focus(FocusMove),
    Submit,
    Close,
    Saved(Result<Tag, String>),
}

pub struct TagForm {
    pub model: Model,
    api: Arc<dyn TagApi>,
    resolver: Arc<KeyResolver>,
}

impl TagForm {
    pub fn new(model: Model, api: Arc<dyn TagApi>, resolver: Arc<KeyResolver>) -> Self {
        Self {
            model,
            api,
            resolver,
        }
    }
}

impl Program for TagForm {
    type Msg = Msg;
    type Signal = FormSignal<Tag>;

    fn update(&mut self, msg: Msg) -> Update<Msg, Self::Signal> {
        let model = &mut self.model;
        match msg {
            Msg::Edit(edit) => {
                model.focused_field().apply(edit);
                Update::none()
            }
            Msg::Focus(direction) => {
                model.focus = direction.apply(model.focus, FIELDS);
                Update::none()
            }
            Msg::Submit if model.is_submitting => Update::none(),
            Msg::Submit => {
                let (name, color) = match model.validate() {
                    Ok(valid) => valid,
                    Err(error) => {
                        model.error = Some(error);
                        return Update::none();
                    }
                };
                let description = optional(model.description.value());
                model.is_submitting = true;
                model.error = None;

                let api = self.api.clone();
                Update::cmd(match model.editing {
                    Some(id) => Cmd::perform(
                        format!("Saving tag {name}"),
                        move |request| async move { api.update_tag(request).await },
                        UpdateTagRequest {
                            id,
                            name,
                            color,
                            description,
                        },
                        Msg::Saved,
                    ),
                    None => Cmd::perform(
                        format!("Creating tag {name}"),
                        move |request| async move { api.create_tag(request).await },
                        CreateTagRequest {
                            name,
                            color,
                            description,
                        },
                        Msg::Saved,
                    ),
                })
            }
            Msg::Close if model.is_submitting => Update::none(),
            Msg::Close => Update::signal(FormSignal::CloseRequested),
            Msg::Saved(result) => {
                model.is_submitting = false;
                match result {
                    Ok(tag) => Update::signal(FormSignal::Saved(tag)),
                    Err(error) => {
                        model.error = Some(error);
                        Update::none()
                    }
                }
            }
        }
    }

    fn view(&self, frame: &mut Frame, area: Rect, ctx: &ViewContext) {
        let model = &self.model;
        let theme = &ctx.theme;
        let mut color = model.color.line(model.focus == 1, DEFAULT_TAG_COLOR, theme);
        if let Some(preview) = swatch(model.color.trimmed()) {
            color.spans.insert(0, preview);
        }
        FormView {
            title: if model.editing.is_some() { "Edit tag" } else { "New tag" }.to_string(),
            rows: vec![
                FormRow {
                    label: "Name",
                    content: model.name.line(model.focus == 0, "rewatch", theme),
                    focused: model.focus == 0,
                },
                FormRow {
                    label: "Color",
                    content: color,
                    focused: model.focus == 1,
                },
                FormRow {
                    label: "Description",
                    content: model.description.line(model.focus == 2, "optional", theme),
                    focused: model.focus == 2,
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
        "Tag".to_string()
    }
}

/// A colored block previewing a valid `#rrggbb` value.
pub fn swatch(color: &str) -> Option<Span<'static>> {
    if !is_hex_color(color) {
        return None;
    }
    let rgb = u32::from_str_radix(&color[1..], 16).ok()?;
    let [_, r, g, b] = rgb.to_be_bytes();
    Some(Span::styled(
        "██ ",
        Style::default().fg(ratatui::style::Color::Rgb(r, g, b)),
    ))
}

/// Tag name prefixed by its color swatch.
pub fn tag_label(tag: &Tag) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = swatch(&tag.color).into_iter().collect();
    spans.push(Span::raw(tag.name.clone()));
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::Utc;

    use super::*;
    use crate::api::ApiResult;
    use crate::core::harness::Harness;

    struct Echo;

    #[async_trait]
    impl TagApi for Echo {
        async fn list_tags(&self) -> ApiResult<Vec<Tag>> {
            Ok(vec![])
        }
        async fn create_tag(&self, request: CreateTagRequest) -> ApiResult<Tag> {
            Ok(Tag {
                id: TagId::new(7),
                name: request.name,
                color: request.color,
                description: request.description,
                created_at: Utc::now(),
            })
        }
        async fn update_tag(&self, request: UpdateTagRequest) -> ApiResult<Tag> {
            Ok(Tag {
                id: request.id,
                name: request.name,
                color: request.color,
                description: request.description,
                created_at: Utc::now(),
            })
        }
        async fn delete_tag(&self, _id: TagId) -> ApiResult<()> {
            Ok(())
        }
    }

    fn harness(model: Model) -> Harness<TagForm> {
        Harness::new(TagForm::new(model, Arc::new(Echo), Arc::new(KeyResolver::default())))
    }

    #[test]
    fn rejects_malformed_color() {
        let mut model = Model::create();
        model.name = TextField::new("cinema");
        model.color = TextField::new("blue");
        let mut harness = harness(model);

        harness.send(Msg::Submit);
        assert!(harness.last_issued().is_empty());
        assert_eq!(
            harness.program.model.error.as_deref(),
            Some("Color must look like #rrggbb")
        );
    }

    #[tokio::test]
    async fn creates_with_default_color() {
        let mut harness = harness(Model::create());
        for c in "rewatch".chars() {
            harness.send(Msg::Edit(TextEdit::Insert(c)));
        }
        harness.send(Msg::Submit);
        harness.settle().await;

        let raised = harness.raised();
        let [FormSignal::Saved(tag)] = raised.as_slice() else {
            panic!("expected a saved tag");
        };
        assert_eq!(tag.name, "rewatch");
        assert_eq!(tag.color, DEFAULT_TAG_COLOR);
        assert_eq!(tag.description, None);
    }

    #[test]
    fn edit_round_trips_fields() {
        let tag = Tag {
            id: TagId::new(2),
            name: "cinema".to_string(),
            color: "#f38ba8".to_string(),
            description: Some("Seen on the big screen".to_string()),
            created_at: Utc::now(),
        };
        let model = Model::from_tag(&tag);
        assert_eq!(model.validate(), Ok((tag.name.clone(), tag.color.clone())));
        assert_eq!(optional(model.description.value()), tag.description);
        assert_eq!(model.editing, Some(tag.id));
    }

    #[test]
    fn swatch_only_for_valid_colors() {
        assert!(swatch("#f38ba8").is_some());
        assert!(swatch("#f38ba").is_none());
    }
}
