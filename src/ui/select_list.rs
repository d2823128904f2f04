//! Cursor and filter state for list pages, plus table and checklist renderers.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem, ListState, Paragraph, Row, Table, TableState};

use super::text_field::{TextEdit, TextField};
use super::{Handled, ViewContext};
use crate::config::{GlobalAction, KeyResolver, NavAction, SearchAction};

const PAGE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nav {
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
}

impl Nav {
    pub fn from_key(resolver: &KeyResolver, key: &KeyEvent) -> Option<Self> {
        [
            (NavAction::Up, Self::Up),
            (NavAction::Down, Self::Down),
            (NavAction::PageUp, Self::PageUp),
            (NavAction::PageDown, Self::PageDown),
            (NavAction::Home, Self::Home),
            (NavAction::End, Self::End),
        ]
        .into_iter()
        .find_map(|(action, nav)| resolver.matches_nav(key, action).then_some(nav))
    }

    /// New cursor position in a list of `len` rows.
    pub const fn apply(self, cursor: usize, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        let last = len - 1;
        match self {
            Self::Up => cursor.saturating_sub(1),
            Self::Down => min(cursor + 1, last),
            Self::PageUp => cursor.saturating_sub(PAGE),
            Self::PageDown => min(cursor + PAGE, last),
            Self::Home => 0,
            Self::End => last,
        }
    }
}

const fn min(a: usize, b: usize) -> usize {
    if a < b { a } else { b }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMsg {
    Nav(Nav),
    StartFilter,
    Filter(TextEdit),
    EndFilter,
    ClearFilter,
}

/// Cursor plus fuzzy filter query of a list page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub cursor: usize,
    pub filter: TextField,
    pub filtering: bool,
}

impl Selection {
    pub fn query(&self) -> &str {
        self.filter.trimmed()
    }

    /// Applies `msg`; `visible_len` counts the rows shown for a query.
    pub fn apply(&mut self, msg: SelectionMsg, visible_len: impl Fn(&str) -> usize) {
        match msg {
            SelectionMsg::Nav(nav) => {
                self.cursor = nav.apply(self.cursor, visible_len(self.query()));
            }
            SelectionMsg::StartFilter => self.filtering = true,
            SelectionMsg::Filter(edit) => {
                self.filter.apply(edit);
                self.cursor = 0;
            }
            SelectionMsg::EndFilter => self.filtering = false,
            SelectionMsg::ClearFilter => {
                self.filter = TextField::default();
                self.filtering = false;
                self.cursor = 0;
            }
        }
    }

    /// Keeps the cursor on a row after the list changed size.
    pub const fn clamp(&mut self, len: usize) {
        if self.cursor >= len {
            self.cursor = len.saturating_sub(1);
        }
    }

    /// While filtering every key is consumed. Otherwise only navigation, the
    /// filter toggle and clearing an active query are recognized.
    pub fn handle_key(&self, resolver: &KeyResolver, key: &KeyEvent) -> Handled<SelectionMsg> {
        if self.filtering {
            if resolver.matches_search(key, SearchAction::Exit) {
                return SelectionMsg::EndFilter.into();
            }
            if matches!(key.code, KeyCode::Up | KeyCode::Down)
                && let Some(nav) = Nav::from_key(resolver, key)
            {
                return SelectionMsg::Nav(nav).into();
            }
            return TextEdit::from_key(key).map_or(Handled::Consumed, |edit| SelectionMsg::Filter(edit).into());
        }
        if resolver.matches_search(key, SearchAction::Toggle) {
            return SelectionMsg::StartFilter.into();
        }
        if !self.query().is_empty() && resolver.matches_global(key, GlobalAction::Back) {
            return SelectionMsg::ClearFilter.into();
        }
        Nav::from_key(resolver, key).map_or(Handled::Ignored, |nav| SelectionMsg::Nav(nav).into())
    }

    /// The filter prompt, or `None` when no filter is active or typed.
    pub fn filter_line(&self, ctx: &ViewContext) -> Option<Line<'static>> {
        if !self.filtering && self.query().is_empty() {
            return None;
        }
        let mut spans = vec![Span::styled("/ ", Style::default().fg(ctx.theme.peach))];
        spans.extend(self.filter.line(self.filtering, "type to filter", &ctx.theme).spans);
        Some(Line::from(spans))
    }
}

pub struct TableView<'a> {
    pub title: String,
    pub header: &'a [&'a str],
    pub widths: &'a [Constraint],
    pub rows: Vec<Row<'a>>,
    pub selected: usize,
    /// Shown instead of the table when there are no rows.
    pub empty: &'a str,
}

/// Renders a bordered table with an optional filter line above it.
pub fn render_table(
    frame: &mut Frame,
    area: Rect,
    ctx: &ViewContext,
    selection: &Selection,
    view: TableView<'_>,
) {
    let block = ctx.panel(view.title, true);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let body = match selection.filter_line(ctx) {
        Some(line) => {
            let [top, rest] = Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(inner);
            frame.render_widget(Paragraph::new(line), top);
            rest
        }
        None => inner,
    };

    if view.rows.is_empty() {
        frame.render_widget(
            Paragraph::new(view.empty)
                .style(Style::default().fg(ctx.theme.muted()))
                .alignment(Alignment::Center),
            body,
        );
        return;
    }

    let header = Row::new(view.header.iter().copied()).style(ctx.theme.header());
    let table = Table::new(view.rows, view.widths.iter().copied())
        .header(header)
        .row_highlight_style(ctx.theme.selection())
        .highlight_symbol("▶ ");
    let mut state = TableState::default().with_selected(Some(view.selected));
    frame.render_stateful_widget(table, body, &mut state);
}

/// Renders `(label, checked)` items as a multi-select list.
pub fn render_checklist(
    frame: &mut Frame,
    area: Rect,
    ctx: &ViewContext,
    title: &str,
    items: &[(String, bool)],
    cursor: usize,
    focused: bool,
) {
    let block = ctx.panel(title, focused);
    if items.is_empty() {
        frame.render_widget(
            Paragraph::new("None available")
                .style(Style::default().fg(ctx.theme.muted()))
                .block(block),
            area,
        );
        return;
    }

    let list_items: Vec<ListItem> = items
        .iter()
        .map(|(label, checked)| {
            let mark = if *checked { "[x] " } else { "[ ] " };
            let color = if *checked { ctx.theme.green } else { ctx.theme.text };
            ListItem::new(Line::from(vec![
                Span::styled(mark, Style::default().fg(color)),
                Span::styled(label.clone(), Style::default().fg(ctx.theme.text)),
            ]))
        })
        .collect();

    let mut list = List::new(list_items).block(block);
    if focused {
        list = list.highlight_style(ctx.theme.selection());
    }
    let mut state = ListState::default().with_selected(Some(cursor));
    frame.render_stateful_widget(list, area, &mut state);
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;

    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn nav_stays_in_bounds() {
        assert_eq!(Nav::Up.apply(0, 3), 0);
        assert_eq!(Nav::Down.apply(2, 3), 2);
        assert_eq!(Nav::PageDown.apply(1, 5), 4);
        assert_eq!(Nav::End.apply(0, 0), 0);
        assert_eq!(Nav::Home.apply(4, 5), 0);
    }

    #[test]
    fn filtering_consumes_characters() {
        let resolver = KeyResolver::default();
        let mut selection = Selection::default();
        assert_eq!(
            selection.handle_key(&resolver, &key(KeyCode::Char('/'))),
            Handled::Event(SelectionMsg::StartFilter)
        );
        selection.apply(SelectionMsg::StartFilter, |_| 0);

        assert_eq!(
            selection.handle_key(&resolver, &key(KeyCode::Char('q'))),
            Handled::Event(SelectionMsg::Filter(TextEdit::Insert('q')))
        );
        assert_eq!(
            selection.handle_key(&resolver, &key(KeyCode::Down)),
            Handled::Event(SelectionMsg::Nav(Nav::Down))
        );
        assert_eq!(
            selection.handle_key(&resolver, &key(KeyCode::Esc)),
            Handled::Event(SelectionMsg::EndFilter)
        );
    }

    #[test]
    fn back_clears_an_active_query() {
        let resolver = KeyResolver::default();
        let mut selection = Selection::default();
        assert_eq!(selection.handle_key(&resolver, &key(KeyCode::Esc)), Handled::Ignored);

        selection.apply(SelectionMsg::Filter(TextEdit::Insert('a')), |_| 1);
        assert_eq!(
            selection.handle_key(&resolver, &key(KeyCode::Esc)),
            Handled::Event(SelectionMsg::ClearFilter)
        );
        selection.apply(SelectionMsg::ClearFilter, |_| 1);
        assert_eq!(selection.query(), "");
    }

    #[test]
    fn editing_the_filter_resets_cursor() {
        let mut selection = Selection {
            cursor: 3,
            ..Selection::default()
        };
        selection.apply(SelectionMsg::Filter(TextEdit::Insert('x')), |_| 5);
        assert_eq!(selection.cursor, 0);
        selection.apply(SelectionMsg::Nav(Nav::End), |query| if query == "x" { 2 } else { 5 });
        assert_eq!(selection.cursor, 1);
    }
}
