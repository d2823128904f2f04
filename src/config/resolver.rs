use std::sync::Arc;

use crossterm::event::KeyEvent;

use crate::config::actions::{
    DialogAction, EntryAction, FormAction, GlobalAction, LibraryAction, ListAction,
    MaintenanceAction, NavAction, SearchAction,
};
use crate::config::key::KeyBinding;
use crate::config::keybindings::KeybindingsConfig;

/// Answers "does this key trigger action X" against the configured bindings.
pub struct KeyResolver {
    pub keybindings: Arc<KeybindingsConfig>,
}

impl Default for KeyResolver {
    fn default() -> Self {
        Self::new(Arc::new(KeybindingsConfig::default()))
    }
}

impl KeyResolver {
    pub const fn new(keybindings: Arc<KeybindingsConfig>) -> Self {
        Self { keybindings }
    }

    fn global(&self, action: GlobalAction) -> &KeyBinding {
        let kb = &self.keybindings.global;
        match action {
            GlobalAction::Quit => &kb.quit,
            GlobalAction::Back => &kb.back,
            GlobalAction::NextTab => &kb.next_tab,
            GlobalAction::PrevTab => &kb.prev_tab,
        }
    }

    pub fn matches_global(&self, event: &KeyEvent, action: GlobalAction) -> bool {
        self.global(action).matches(event)
    }

    pub fn display_global(&self, action: GlobalAction) -> String {
        self.global(action).display()
    }

    fn nav(&self, action: NavAction) -> &KeyBinding {
        let kb = &self.keybindings.navigation;
        match action {
            NavAction::Up => &kb.up,
            NavAction::Down => &kb.down,
            NavAction::PageUp => &kb.page_up,
            NavAction::PageDown => &kb.page_down,
            NavAction::Home => &kb.home,
            NavAction::End => &kb.end,
            NavAction::Select => &kb.select,
        }
    }

    pub fn matches_nav(&self, event: &KeyEvent, action: NavAction) -> bool {
        self.nav(action).matches(event)
    }

    pub fn display_nav(&self, action: NavAction) -> String {
        self.nav(action).display()
    }

    fn search(&self, action: SearchAction) -> &KeyBinding {
        let kb = &self.keybindings.search;
        match action {
            SearchAction::Toggle => &kb.toggle,
            SearchAction::Exit => &kb.exit,
        }
    }

    pub fn matches_search(&self, event: &KeyEvent, action: SearchAction) -> bool {
        self.search(action).matches(event)
    }

    pub fn display_search(&self, action: SearchAction) -> String {
        self.search(action).display()
    }

    fn list(&self, action: ListAction) -> &KeyBinding {
        let kb = &self.keybindings.list;
        match action {
            ListAction::New => &kb.new,
            ListAction::Edit => &kb.edit,
            ListAction::Delete => &kb.delete,
            ListAction::Reload => &kb.reload,
        }
    }

    pub fn matches_list(&self, event: &KeyEvent, action: ListAction) -> bool {
        self.list(action).matches(event)
    }

    pub fn display_list(&self, action: ListAction) -> String {
        self.list(action).display()
    }

    fn library(&self, action: LibraryAction) -> &KeyBinding {
        let kb = &self.keybindings.library;
        match action {
            LibraryAction::Open => &kb.open,
            LibraryAction::Favorite => &kb.favorite,
        }
    }

    pub fn matches_library(&self, event: &KeyEvent, action: LibraryAction) -> bool {
        self.library(action).matches(event)
    }

    pub fn display_library(&self, action: LibraryAction) -> String {
        self.library(action).display()
    }

    fn entry(&self, action: EntryAction) -> &KeyBinding {
        let kb = &self.keybindings.entry;
        match action {
            EntryAction::CycleStatus => &kb.cycle_status,
            EntryAction::RateUp => &kb.rate_up,
            EntryAction::RateDown => &kb.rate_down,
            EntryAction::Episode => &kb.episode,
            EntryAction::Copy => &kb.copy,
            EntryAction::LogSession => &kb.log_session,
            EntryAction::DeleteSession => &kb.delete_session,
            EntryAction::RefreshMetadata => &kb.refresh_metadata,
        }
    }

    pub fn matches_entry(&self, event: &KeyEvent, action: EntryAction) -> bool {
        self.entry(action).matches(event)
    }

    pub fn display_entry(&self, action: EntryAction) -> String {
        self.entry(action).display()
    }

    fn maintenance(&self, action: MaintenanceAction) -> &KeyBinding {
        let kb = &self.keybindings.maintenance;
        match action {
            MaintenanceAction::ClearExpired => &kb.clear_expired,
            MaintenanceAction::Recalculate => &kb.recalculate,
        }
    }

    pub fn matches_maintenance(&self, event: &KeyEvent, action: MaintenanceAction) -> bool {
        self.maintenance(action).matches(event)
    }

    pub fn display_maintenance(&self, action: MaintenanceAction) -> String {
        self.maintenance(action).display()
    }

    fn form(&self, action: FormAction) -> &KeyBinding {
        let kb = &self.keybindings.form;
        match action {
            FormAction::Submit => &kb.submit,
            FormAction::Cancel => &kb.cancel,
            FormAction::NextField => &kb.next_field,
            FormAction::PrevField => &kb.prev_field,
            FormAction::Toggle => &kb.toggle,
        }
    }

    pub fn matches_form(&self, event: &KeyEvent, action: FormAction) -> bool {
        self.form(action).matches(event)
    }

    pub fn display_form(&self, action: FormAction) -> String {
        self.form(action).display()
    }

    fn dialog(&self, action: DialogAction) -> &KeyBinding {
        let kb = &self.keybindings.dialog;
        match action {
            DialogAction::Confirm => &kb.confirm,
            DialogAction::Cancel => &kb.cancel,
        }
    }

    pub fn matches_dialog(&self, event: &KeyEvent, action: DialogAction) -> bool {
        self.dialog(action).matches(event)
    }

    pub fn display_dialog(&self, action: DialogAction) -> String {
        self.dialog(action).display()
    }
}
