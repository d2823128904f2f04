use crossterm::event::KeyCode;
use serde::{Deserialize, Serialize};

use crate::config::key::{Key, KeyBinding};

fn keys(keys: impl IntoIterator<Item = Key>) -> KeyBinding {
    KeyBinding::multiple(keys.into_iter().collect())
}

fn char_key(c: char) -> KeyBinding {
    Key::new(KeyCode::Char(c)).into()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalKeybindings {
    pub quit: KeyBinding,
    pub back: KeyBinding,
    pub next_tab: KeyBinding,
    pub prev_tab: KeyBinding,
}

impl Default for GlobalKeybindings {
    fn default() -> Self {
        Self {
            quit: char_key('q'),
            back: keys([Key::new(KeyCode::Esc), Key::new(KeyCode::Backspace)]),
            next_tab: char_key(']'),
            prev_tab: char_key('['),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationKeybindings {
    pub up: KeyBinding,
    pub down: KeyBinding,
    pub page_up: KeyBinding,
    pub page_down: KeyBinding,
    pub home: KeyBinding,
    pub end: KeyBinding,
    pub select: KeyBinding,
}

impl Default for NavigationKeybindings {
    fn default() -> Self {
        Self {
            up: keys([Key::new(KeyCode::Char('k')), Key::new(KeyCode::Up)]),
            down: keys([Key::new(KeyCode::Char('j')), Key::new(KeyCode::Down)]),
            page_up: Key::new(KeyCode::PageUp).into(),
            page_down: Key::new(KeyCode::PageDown).into(),
            home: keys([Key::new(KeyCode::Char('g')), Key::new(KeyCode::Home)]),
            end: keys([Key::new(KeyCode::Char('G')), Key::new(KeyCode::End)]),
            select: Key::new(KeyCode::Enter).into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchKeybindings {
    pub toggle: KeyBinding,
    pub exit: KeyBinding,
}

impl Default for SearchKeybindings {
    fn default() -> Self {
        Self {
            toggle: char_key('/'),
            exit: keys([Key::new(KeyCode::Esc), Key::new(KeyCode::Enter)]),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListKeybindings {
    pub new: KeyBinding,
    pub edit: KeyBinding,
    pub delete: KeyBinding,
    pub reload: KeyBinding,
}

impl Default for ListKeybindings {
    fn default() -> Self {
        Self {
            new: char_key('n'),
            edit: char_key('e'),
            delete: keys([Key::new(KeyCode::Char('d')), Key::new(KeyCode::Delete)]),
            reload: char_key('r'),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryKeybindings {
    pub open: KeyBinding,
    pub favorite: KeyBinding,
}

impl Default for LibraryKeybindings {
    fn default() -> Self {
        Self {
            open: Key::new(KeyCode::Enter).into(),
            favorite: char_key('f'),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryKeybindings {
    pub cycle_status: KeyBinding,
    pub rate_up: KeyBinding,
    pub rate_down: KeyBinding,
    pub episode: KeyBinding,
    pub copy: KeyBinding,
    pub log_session: KeyBinding,
    pub delete_session: KeyBinding,
    pub refresh_metadata: KeyBinding,
}

impl Default for EntryKeybindings {
    fn default() -> Self {
        Self {
            cycle_status: char_key('s'),
            rate_up: keys([Key::new(KeyCode::Char('+')), Key::new(KeyCode::Char('='))]),
            rate_down: char_key('-'),
            episode: char_key('e'),
            copy: char_key('y'),
            log_session: char_key('n'),
            delete_session: char_key('d'),
            refresh_metadata: char_key('m'),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintenanceKeybindings {
    pub clear_expired: KeyBinding,
    pub recalculate: KeyBinding,
}

impl Default for MaintenanceKeybindings {
    fn default() -> Self {
        Self {
            clear_expired: char_key('c'),
            recalculate: char_key('R'),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormKeybindings {
    pub submit: KeyBinding,
    pub cancel: KeyBinding,
    pub next_field: KeyBinding,
    pub prev_field: KeyBinding,
    pub toggle: KeyBinding,
}

impl Default for FormKeybindings {
    fn default() -> Self {
        Self {
            submit: keys([
                Key::with_ctrl(KeyCode::Char('s')),
                Key::new(KeyCode::Enter),
            ]),
            cancel: Key::new(KeyCode::Esc).into(),
            next_field: Key::new(KeyCode::Tab).into(),
            prev_field: Key::new(KeyCode::BackTab).into(),
            toggle: char_key(' '),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogKeybindings {
    pub confirm: KeyBinding,
    pub cancel: KeyBinding,
}

impl Default for DialogKeybindings {
    fn default() -> Self {
        Self {
            confirm: keys([
                Key::new(KeyCode::Char('y')),
                Key::new(KeyCode::Enter),
            ]),
            cancel: keys([Key::new(KeyCode::Char('n')), Key::new(KeyCode::Esc)]),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct KeybindingsConfig {
    pub global: GlobalKeybindings,
    pub navigation: NavigationKeybindings,
    pub search: SearchKeybindings,
    pub list: ListKeybindings,
    pub library: LibraryKeybindings,
    pub entry: EntryKeybindings,
    pub maintenance: MaintenanceKeybindings,
    pub form: FormKeybindings,
    pub dialog: DialogKeybindings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config: KeybindingsConfig = toml::from_str(
            r#"
            [list]
            new = "a"

            [form]
            submit = ["ctrl+s"]
            "#,
        )
        .unwrap();
        assert_eq!(config.list.new, char_key('a'));
        assert_eq!(config.list.reload, char_key('r'));
        assert_eq!(config.form.submit.display(), "ctrl+s");
        assert_eq!(config.global.quit, char_key('q'));
    }
}
