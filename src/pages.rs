//! Top-level pages, one per route.
//!
//! Every page is a [`Program`] whose signal is [`AppSignal`](crate::core::AppSignal).
//! A page hosts at most one modal at a time through a [`ModalSlot`], and list
//! pages keep their fetched rows in a [`Listing`].

pub mod collections;
pub mod contributors;
pub mod entry;
pub mod friends;
pub mod library;
pub mod maintenance;
pub mod stats;
pub mod tags;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::widgets::Row;
use tracing::debug;

use crate::config::{KeyResolver, ListAction, SearchAction};
use crate::core::{Cmd, Program, Remote, Ticket, Update};
use crate::search;
use crate::ui::remote::{Loading, RemoteView, render_remote};
use crate::ui::select_list::{Selection, SelectionMsg, TableView, render_table};
use crate::ui::{Handled, Keybinding, ViewContext};

/// The modal a page currently shows, tagged with the generation it was
/// opened in.
///
/// Every open bumps the generation. Messages of a modal that has been closed,
/// or replaced by a newer one, carry an old tag and are dropped.
pub struct ModalSlot<P> {
    current: Option<P>,
    generation: u64,
}

impl<P> Default for ModalSlot<P> {
    fn default() -> Self {
        Self {
            current: None,
            generation: 0,
        }
    }
}

impl<P: Program> ModalSlot<P> {
    /// Opens `program`, runs its init message and returns the new tag with the
    /// commands init issued.
    pub fn open(&mut self, mut program: P) -> (u64, Cmd<P::Msg>) {
        self.generation += 1;
        let cmd = match program.init() {
            Some(msg) => program.update(msg).cmd,
            None => Cmd::none(),
        };
        self.current = Some(program);
        (self.generation, cmd)
    }

    pub fn close(&mut self) {
        self.current = None;
    }

    pub const fn is_open(&self) -> bool {
        self.current.is_some()
    }

    pub const fn get(&self) -> Option<&P> {
        self.current.as_ref()
    }

    pub const fn get_mut(&mut self) -> Option<&mut P> {
        self.current.as_mut()
    }

    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Routes a tagged message to the open modal. Returns `None` when the
    /// message belongs to a modal that is no longer shown.
    pub fn update(&mut self, tag: u64, msg: P::Msg) -> Option<Update<P::Msg, P::Signal>> {
        if tag != self.generation {
            debug!("Dropping message for modal generation {tag} (current {})", self.generation);
            return None;
        }
        let Some(program) = self.current.as_mut() else {
            debug!("Dropping message for closed modal (generation {tag})");
            return None;
        };
        Some(program.update(msg))
    }

    /// Key handling of the open modal, with its messages tagged by `wrap`.
    pub fn handle_key<M>(&self, key: KeyEvent, wrap: impl FnOnce(u64, P::Msg) -> M) -> Option<Handled<M>> {
        let tag = self.generation;
        self.current
            .as_ref()
            .map(|program| program.handle_key(key).map(|msg| wrap(tag, msg)))
    }

    pub fn view(&self, frame: &mut Frame, area: Rect, ctx: &ViewContext) {
        if let Some(program) = &self.current {
            program.view(frame, area, ctx);
        }
    }
}

/// Text a list row can be found by.
pub trait Searchable {
    fn search_fields(&self) -> Vec<&str>;
}

/// Fetched rows of a list page plus cursor and filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing<T> {
    pub items: Remote<Vec<T>>,
    pub selection: Selection,
}

impl<T> Default for Listing<T> {
    fn default() -> Self {
        Self {
            items: Remote::new(),
            selection: Selection::default(),
        }
    }
}

impl<T: Searchable> Listing<T> {
    /// Rows matching the current filter, best match first.
    pub fn visible(&self) -> Vec<&T> {
        self.items
            .value()
            .map_or_else(Vec::new, |items| search::filter(items, self.selection.query(), T::search_fields))
    }

    pub fn selected(&self) -> Option<&T> {
        self.visible().get(self.selection.cursor).copied()
    }

    pub fn begin(&mut self) -> Ticket {
        self.items.begin()
    }

    /// Applies a fetch result; the cursor stays on a visible row.
    pub fn resolve(&mut self, ticket: Ticket, result: Result<Vec<T>, String>) {
        if self.items.resolve(ticket, result) {
            let len = self.visible().len();
            self.selection.clamp(len);
        }
    }

    pub fn apply(&mut self, msg: SelectionMsg) {
        let items = &self.items;
        self.selection.apply(msg, |query| {
            items
                .value()
                .map_or(0, |items| search::filter(items, query, T::search_fields).len())
        });
    }

    pub fn handle_key(&self, resolver: &KeyResolver, key: &KeyEvent) -> Handled<SelectionMsg> {
        self.selection.handle_key(resolver, key)
    }

    /// Renders the rows as a table. Loading and failure states render through
    /// [`render_remote`].
    pub fn render(
        &self,
        frame: &mut Frame,
        area: Rect,
        ctx: &ViewContext,
        table: ListTable<'_>,
        row: impl Fn(&T, &ViewContext) -> Row<'static>,
    ) {
        let view = RemoteView::new(table.error_prefix).loading(Loading::Skeleton(6));
        render_remote(frame, area, ctx, self.items.data(), &view, |frame, area, _| {
            let rows: Vec<Row> = self.visible().into_iter().map(|item| row(item, ctx)).collect();
            let empty = if self.selection.query().is_empty() {
                table.empty
            } else {
                "No matches"
            };
            render_table(
                frame,
                area,
                ctx,
                &self.selection,
                TableView {
                    title: table.title,
                    header: table.header,
                    widths: table.widths,
                    rows,
                    selected: self.selection.cursor,
                    empty,
                },
            );
        });
    }
}

/// Selection and filter keys of a list page. `None` leaves the key to the
/// page's own actions.
pub fn selection_key<T: Searchable, M>(
    listing: &Listing<T>,
    resolver: &KeyResolver,
    key: &KeyEvent,
    wrap: impl FnOnce(SelectionMsg) -> M,
) -> Option<Handled<M>> {
    match listing.handle_key(resolver, key) {
        Handled::Ignored => None,
        handled => Some(handled.map(wrap)),
    }
}

/// The message of the first action `key` is bound to.
pub fn action_key<A: Copy, M, const N: usize>(
    key: &KeyEvent,
    matches: impl Fn(&KeyEvent, A) -> bool,
    actions: [(A, M); N],
) -> Handled<M> {
    actions
        .into_iter()
        .find(|(action, _)| matches(key, *action))
        .map_or(Handled::Ignored, |(_, msg)| Handled::Event(msg))
}

/// Status bar hints shared by the editable list pages.
pub fn list_keybindings(resolver: &KeyResolver) -> Vec<Keybinding> {
    vec![
        Keybinding::new(resolver.display_list(ListAction::New), "new"),
        Keybinding::new(resolver.display_list(ListAction::Edit), "edit"),
        Keybinding::new(resolver.display_list(ListAction::Delete), "delete"),
        Keybinding::new(resolver.display_search(SearchAction::Toggle), "filter"),
        Keybinding::new(resolver.display_list(ListAction::Reload), "reload"),
    ]
}

/// Static layout of a list page table.
pub struct ListTable<'a> {
    pub title: String,
    pub header: &'a [&'a str],
    pub widths: &'a [ratatui::layout::Constraint],
    pub empty: &'a str,
    pub error_prefix: &'a str,
}
