//! Application shell: owns the current page and runs the event loop.
//!
//! Every update runs to completion on the loop task. Commands are spawned by
//! the [`Dispatcher`] and their messages come back tagged with the page
//! generation they were issued for; deliveries for a page that has since been
//! replaced are dropped.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, warn};

use crate::api::Services;
use crate::config::{AppConfig, GlobalAction, KeyResolver};
use crate::core::{AppSignal, CommandId, Delivery, Dispatcher, Generation, Program, Update};
use crate::pages::collections::{self, CollectionsPage};
use crate::pages::contributors::{self, ContributorsPage};
use crate::pages::entry::{self, EntryPage};
use crate::pages::friends::{self, FriendsPage};
use crate::pages::library::{self, LibraryPage};
use crate::pages::maintenance::{self, MaintenancePage};
use crate::pages::stats::{self, StatsPage};
use crate::pages::tags::{self, TagsPage};
use crate::route::Route;
use crate::theme::Theme;
use crate::tui::{Event, Tui};
use crate::ui::status_bar::render_status_bar;
use crate::ui::tabs::render_tabs;
use crate::ui::toast::Notifications;
use crate::ui::{Handled, Keybinding, ViewContext};

const FRAME_RATE: f64 = 30.0;
const TICK_RATE: f64 = 8.0;

enum Page {
    Library(LibraryPage),
    Entry(Box<EntryPage>),
    Friends(FriendsPage),
    Tags(TagsPage),
    Collections(CollectionsPage),
    Contributors(ContributorsPage),
    Stats(StatsPage),
    Maintenance(MaintenancePage),
}

#[derive(Debug)]
enum PageMsg {
    Library(library::Msg),
    Entry(entry::Msg),
    Friends(friends::Msg),
    Tags(tags::Msg),
    Collections(collections::Msg),
    Contributors(contributors::Msg),
    Stats(stats::Msg),
    Maintenance(maintenance::Msg),
}

macro_rules! each_page {
    ($page:expr, $p:ident => $body:expr) => {
        match $page {
            Page::Library($p) => $body,
            Page::Entry($p) => $body,
            Page::Friends($p) => $body,
            Page::Tags($p) => $body,
            Page::Collections($p) => $body,
            Page::Contributors($p) => $body,
            Page::Stats($p) => $body,
            Page::Maintenance($p) => $body,
        }
    };
}

impl Page {
    fn build(route: Route, services: &Services, config: &AppConfig, resolver: &Arc<KeyResolver>) -> Self {
        let resolver = resolver.clone();
        match route {
            Route::Library => Self::Library(LibraryPage::new(services.library.clone(), resolver)),
            Route::Entry(id) => Self::Entry(Box::new(EntryPage::new(
                id,
                services,
                config.metadata.ttl(),
                resolver,
            ))),
            Route::Friends => Self::Friends(FriendsPage::new(services.friends.clone(), resolver)),
            Route::Tags => Self::Tags(TagsPage::new(services.tags.clone(), resolver)),
            Route::Collections => {
                Self::Collections(CollectionsPage::new(services.collections.clone(), resolver))
            }
            Route::Contributors => {
                Self::Contributors(ContributorsPage::new(services.contributors.clone(), resolver))
            }
            Route::Stats => Self::Stats(StatsPage::new(services.stats.clone(), resolver)),
            Route::Maintenance => {
                Self::Maintenance(MaintenancePage::new(services.maintenance.clone(), resolver))
            }
        }
    }
}

impl Program for Page {
    type Msg = PageMsg;
    type Signal = AppSignal;

    fn init(&self) -> Option<PageMsg> {
        match self {
            Self::Library(p) => p.init().map(PageMsg::Library),
            Self::Entry(p) => p.init().map(PageMsg::Entry),
            Self::Friends(p) => p.init().map(PageMsg::Friends),
            Self::Tags(p) => p.init().map(PageMsg::Tags),
            Self::Collections(p) => p.init().map(PageMsg::Collections),
            Self::Contributors(p) => p.init().map(PageMsg::Contributors),
            Self::Stats(p) => p.init().map(PageMsg::Stats),
            Self::Maintenance(p) => p.init().map(PageMsg::Maintenance),
        }
    }

    fn update(&mut self, msg: PageMsg) -> Update<PageMsg, AppSignal> {
        match (self, msg) {
            (Self::Library(p), PageMsg::Library(m)) => p.update(m).map_msg(PageMsg::Library),
            (Self::Entry(p), PageMsg::Entry(m)) => p.update(m).map_msg(PageMsg::Entry),
            (Self::Friends(p), PageMsg::Friends(m)) => p.update(m).map_msg(PageMsg::Friends),
            (Self::Tags(p), PageMsg::Tags(m)) => p.update(m).map_msg(PageMsg::Tags),
            (Self::Collections(p), PageMsg::Collections(m)) => {
                p.update(m).map_msg(PageMsg::Collections)
            }
            (Self::Contributors(p), PageMsg::Contributors(m)) => {
                p.update(m).map_msg(PageMsg::Contributors)
            }
            (Self::Stats(p), PageMsg::Stats(m)) => p.update(m).map_msg(PageMsg::Stats),
            (Self::Maintenance(p), PageMsg::Maintenance(m)) => {
                p.update(m).map_msg(PageMsg::Maintenance)
            }
            (page, msg) => {
                debug!("Dropping {msg:?} addressed to another page than {}", page.title());
                Update::none()
            }
        }
    }

    fn view(&self, frame: &mut Frame, area: Rect, ctx: &ViewContext) {
        each_page!(self, p => p.view(frame, area, ctx));
    }

    fn handle_key(&self, key: KeyEvent) -> Handled<PageMsg> {
        match self {
            Self::Library(p) => p.handle_key(key).map(PageMsg::Library),
            Self::Entry(p) => p.handle_key(key).map(PageMsg::Entry),
            Self::Friends(p) => p.handle_key(key).map(PageMsg::Friends),
            Self::Tags(p) => p.handle_key(key).map(PageMsg::Tags),
            Self::Collections(p) => p.handle_key(key).map(PageMsg::Collections),
            Self::Contributors(p) => p.handle_key(key).map(PageMsg::Contributors),
            Self::Stats(p) => p.handle_key(key).map(PageMsg::Stats),
            Self::Maintenance(p) => p.handle_key(key).map(PageMsg::Maintenance),
        }
    }

    fn title(&self) -> String {
        each_page!(self, p => p.title())
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        each_page!(self, p => p.keybindings())
    }
}

pub struct App {
    route: Route,
    page: Page,
    history: Vec<Route>,
    generation: Generation,
    dispatcher: Dispatcher<PageMsg>,
    deliveries: UnboundedReceiver<Delivery<PageMsg>>,
    /// Commands in flight, shown in the status bar until their message arrives.
    running: BTreeMap<CommandId, String>,
    notifications: Notifications,
    ctx: ViewContext,
    services: Services,
    config: Arc<AppConfig>,
    resolver: Arc<KeyResolver>,
    should_quit: bool,
    should_suspend: bool,
}

enum Step {
    Terminal(Option<Event>),
    Delivery(Delivery<PageMsg>),
}

impl App {
    pub fn new(services: Services, config: Arc<AppConfig>, resolver: Arc<KeyResolver>, start: Route) -> Self {
        let (dispatcher, deliveries) = Dispatcher::new();
        let page = Page::build(start, &services, &config, &resolver);
        Self {
            route: start,
            page,
            history: Vec::new(),
            generation: Generation::default(),
            dispatcher,
            deliveries,
            running: BTreeMap::new(),
            notifications: Notifications::new(&config.notifications),
            ctx: ViewContext::new(Theme::from_name(&config.theme.name)),
            services,
            config,
            resolver,
            should_quit: false,
            should_suspend: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new(FRAME_RATE, TICK_RATE)?;
        tui.enter()?;
        self.start();

        loop {
            let step = tokio::select! {
                event = tui.next_event() => Step::Terminal(event),
                Some(delivery) = self.deliveries.recv() => Step::Delivery(delivery),
            };
            match step {
                Step::Terminal(Some(event)) => self.handle_event(&mut tui, event)?,
                Step::Terminal(None) => break,
                Step::Delivery(delivery) => self.deliver(delivery),
            }

            if self.should_suspend {
                self.should_suspend = false;
                tui.suspend()?;
                tui.resume()?;
            }
            if self.should_quit {
                break;
            }
        }

        tui.exit()?;
        Ok(())
    }

    /// Feeds the first page its init message.
    fn start(&mut self) {
        info!("Opening {}", self.route);
        if let Some(msg) = self.page.init() {
            self.process(msg);
        }
    }

    fn handle_event(&mut self, tui: &mut Tui, event: Event) -> Result<()> {
        match event {
            Event::Quit => self.should_quit = true,
            Event::Suspend => self.should_suspend = true,
            Event::Error(error) => warn!("Terminal event error: {error}"),
            Event::Tick => {
                self.ctx.tick();
                self.notifications.expire(Instant::now());
            }
            Event::Render => {
                tui.draw(|frame| self.render(frame))?;
            }
            Event::Resize(width, height) => {
                tui.resize(Rect::new(0, 0, width, height))?;
                tui.draw(|frame| self.render(frame))?;
            }
            Event::Key(key) => self.handle_key(key),
        }
        Ok(())
    }

    fn deliver(&mut self, delivery: Delivery<PageMsg>) {
        self.running.remove(&delivery.id);
        if delivery.generation != self.generation {
            debug!(
                "Dropping result of command {} for {} (current page is {})",
                delivery.id, delivery.generation, self.generation
            );
            return;
        }
        self.process(delivery.message);
    }

    fn process(&mut self, msg: PageMsg) {
        let update = self.page.update(msg);
        self.apply(update);
    }

    fn apply(&mut self, update: Update<PageMsg, AppSignal>) {
        let (cmd, signal) = update.into_parts();
        self.running.extend(self.dispatcher.dispatch(self.generation, cmd));
        self.interpret(signal);
    }

    fn interpret(&mut self, signal: AppSignal) {
        match signal {
            AppSignal::NoOp => {}
            AppSignal::Navigate(route) => {
                self.history.push(self.route);
                self.open(route);
            }
            AppSignal::Back => match self.history.pop() {
                Some(route) => self.open(route),
                None => debug!("Back requested with empty history"),
            },
            AppSignal::Notify(notice) => {
                if !notice.is_success {
                    warn!("{}", notice.message);
                }
                self.notifications.push(notice);
            }
            AppSignal::Quit => self.should_quit = true,
        }
    }

    /// Replaces the current page. Results still in flight for the old page
    /// will carry a stale generation.
    fn open(&mut self, route: Route) {
        info!("Navigating from {} to {route}", self.route);
        self.generation = self.generation.next();
        self.route = route;
        self.page = Page::build(route, &self.services, &self.config, &self.resolver);
        if let Some(msg) = self.page.init() {
            self.process(msg);
        }
    }

    /// Top-level tabs start a fresh history.
    fn switch_tab(&mut self, route: Route) {
        if route == self.route {
            return;
        }
        self.history.clear();
        self.open(route);
    }

    fn shift_tab(&mut self, forward: bool) {
        let len = Route::TABS.len();
        let current = self.route.tab_index();
        let index = if forward { (current + 1) % len } else { (current + len - 1) % len };
        self.switch_tab(Route::TABS[index]);
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match self.page.handle_key(key) {
            Handled::Event(msg) => self.process(msg),
            Handled::Consumed => {}
            Handled::Ignored => self.handle_global_key(key),
        }
    }

    fn handle_global_key(&mut self, key: KeyEvent) {
        let resolver = self.resolver.clone();
        if resolver.matches_global(&key, GlobalAction::Quit) {
            self.interpret(AppSignal::Quit);
        } else if resolver.matches_global(&key, GlobalAction::Back) {
            self.interpret(AppSignal::Back);
        } else if resolver.matches_global(&key, GlobalAction::NextTab) {
            self.shift_tab(true);
        } else if resolver.matches_global(&key, GlobalAction::PrevTab) {
            self.shift_tab(false);
        } else if let Some(route) = numbered_tab(&key) {
            self.switch_tab(route);
        }
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        let mut keybindings = self.page.keybindings();
        keybindings.push(Keybinding::new(format!("1-{}", Route::TABS.len()), "pages"));
        keybindings.push(Keybinding::new(self.resolver.display_global(GlobalAction::Quit), "quit"));
        keybindings
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let [header, body, footer] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(area);

        render_tabs(frame, header, &self.ctx, self.route, &self.page.title());
        self.page.view(frame, body, &self.ctx);
        let running: Vec<&str> = self.running.values().map(String::as_str).collect();
        render_status_bar(frame, footer, &self.ctx, &running, &self.keybindings());
        self.notifications.render(frame, body, &self.ctx);
    }
}

/// Tab selected by a plain digit key, `1` being the first.
fn numbered_tab(key: &KeyEvent) -> Option<Route> {
    if !key.modifiers.difference(KeyModifiers::SHIFT).is_empty() {
        return None;
    }
    let KeyCode::Char(c) = key.code else {
        return None;
    };
    let index = c.to_digit(10)?.checked_sub(1)?;
    Route::TABS.get(usize::try_from(index).ok()?).copied()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::core::{Cmd, Notice};
    use crate::store::{MemoryStore, demo_catalog};
    use crate::ui::testing::render_to_string;

    fn app(start: Route) -> App {
        let store = MemoryStore::in_memory(demo_catalog(chrono::Utc::now()).unwrap());
        let config = Arc::new(AppConfig::default());
        let mut app = App::new(
            Services::from_backend(Arc::new(store)),
            config,
            Arc::new(KeyResolver::default()),
            start,
        );
        app.start();
        app
    }

    async fn settle(app: &mut App) {
        while !app.running.is_empty() {
            let delivery = tokio::time::timeout(Duration::from_secs(5), app.deliveries.recv())
                .await
                .expect("command finished")
                .expect("channel open");
            app.deliver(delivery);
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[tokio::test]
    async fn start_tracks_running_commands() {
        let mut app = app(Route::Friends);
        assert_eq!(app.running.values().collect::<Vec<_>>(), ["Loading friends"]);
        settle(&mut app).await;
        assert!(app.running.is_empty());
        let Page::Friends(page) = &app.page else {
            panic!("friends page open");
        };
        assert_eq!(page.listing.visible().len(), 2);
    }

    #[tokio::test]
    async fn opening_entry_and_going_back() {
        let mut app = app(Route::Library);
        settle(&mut app).await;

        app.handle_key(key(KeyCode::Enter));
        assert!(matches!(app.route, Route::Entry(_)));
        assert_eq!(app.history, [Route::Library]);
        assert_eq!(app.generation, Generation::default().next());
        settle(&mut app).await;
        let Page::Entry(page) = &app.page else {
            panic!("entry page open");
        };
        assert!(page.entry.data().is_success());

        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.route, Route::Library);
        assert!(app.history.is_empty());
    }

    #[tokio::test]
    async fn stale_deliveries_are_dropped() {
        let mut app = app(Route::Stats);
        // Navigate away before the statistics arrive.
        app.handle_key(key(KeyCode::Char('2')));
        assert_eq!(app.route, Route::Friends);
        settle(&mut app).await;

        let Page::Friends(page) = &app.page else {
            panic!("friends page open");
        };
        assert!(page.listing.items.data().is_success());
    }

    #[tokio::test]
    async fn mismatched_message_is_ignored() {
        let mut app = app(Route::Tags);
        settle(&mut app).await;
        let issued = app.dispatcher.dispatch(
            app.generation,
            Cmd::task("Stray", |()| async {}, (), |_| PageMsg::Stats(stats::Msg::Load)),
        );
        app.running.extend(issued);
        settle(&mut app).await;
        assert!(matches!(app.page, Page::Tags(_)));
        assert!(app.running.is_empty());
    }

    #[tokio::test]
    async fn tab_keys_cycle_and_reset_history() {
        let mut app = app(Route::Maintenance);
        app.handle_key(key(KeyCode::Char(']')));
        assert_eq!(app.route, Route::Library);
        app.handle_key(key(KeyCode::Char('[')));
        assert_eq!(app.route, Route::Maintenance);
        assert!(app.history.is_empty());
    }

    #[tokio::test]
    async fn notifications_and_quit() {
        let mut app = app(Route::Library);
        app.interpret(AppSignal::Notify(Notice::failure("Failed to load")));
        assert_eq!(app.notifications.visible().count(), 1);

        app.handle_key(key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn renders_tabs_page_and_status() {
        let mut app = app(Route::Friends);
        settle(&mut app).await;
        app.interpret(AppSignal::success("Saved Alice"));

        let screen = render_to_string(120, 30, |frame| app.render(frame));
        assert!(screen.contains("1 Library"));
        assert!(screen.contains("Alice"));
        assert!(screen.contains("quit"));
        assert!(screen.contains("Saved Alice"));
    }

    #[test]
    fn digit_keys_map_to_tabs() {
        assert_eq!(numbered_tab(&key(KeyCode::Char('1'))), Some(Route::Library));
        assert_eq!(numbered_tab(&key(KeyCode::Char('7'))), Some(Route::Maintenance));
        assert_eq!(numbered_tab(&key(KeyCode::Char('8'))), None);
        assert_eq!(numbered_tab(&key(KeyCode::Char('0'))), None);
        assert_eq!(
            numbered_tab(&KeyEvent::new(KeyCode::Char('1'), KeyModifiers::CONTROL)),
            None
        );
    }
}
