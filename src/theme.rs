use catppuccin::PALETTE;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::BorderType;

use crate::model::WatchStatus;

const fn catppuccin_to_color(c: &catppuccin::Color) -> Color {
    Color::Rgb(c.rgb.r, c.rgb.g, c.rgb.b)
}

/// Colors used across all views, built from a Catppuccin flavor.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub base: Color,
    pub mantle: Color,
    pub surface0: Color,
    pub surface1: Color,
    pub surface2: Color,
    pub overlay0: Color,
    pub overlay1: Color,
    pub text: Color,
    pub subtext0: Color,
    pub mauve: Color,
    pub red: Color,
    pub peach: Color,
    pub yellow: Color,
    pub green: Color,
    pub teal: Color,
    pub sky: Color,
    pub blue: Color,
    pub lavender: Color,
    pub border_type: BorderType,
}

impl Theme {
    const fn from_catppuccin(flavor: &catppuccin::Flavor) -> Self {
        let c = &flavor.colors;
        Self {
            base: catppuccin_to_color(&c.base),
            mantle: catppuccin_to_color(&c.mantle),
            surface0: catppuccin_to_color(&c.surface0),
            surface1: catppuccin_to_color(&c.surface1),
            surface2: catppuccin_to_color(&c.surface2),
            overlay0: catppuccin_to_color(&c.overlay0),
            overlay1: catppuccin_to_color(&c.overlay1),
            text: catppuccin_to_color(&c.text),
            subtext0: catppuccin_to_color(&c.subtext0),
            mauve: catppuccin_to_color(&c.mauve),
            red: catppuccin_to_color(&c.red),
            peach: catppuccin_to_color(&c.peach),
            yellow: catppuccin_to_color(&c.yellow),
            green: catppuccin_to_color(&c.green),
            teal: catppuccin_to_color(&c.teal),
            sky: catppuccin_to_color(&c.sky),
            blue: catppuccin_to_color(&c.blue),
            lavender: catppuccin_to_color(&c.lavender),
            border_type: BorderType::Rounded,
        }
    }

    #[must_use]
    pub fn catppuccin_mocha() -> Self {
        Self::from_catppuccin(&PALETTE.mocha)
    }

    #[must_use]
    pub fn catppuccin_macchiato() -> Self {
        Self::from_catppuccin(&PALETTE.macchiato)
    }

    #[must_use]
    pub fn catppuccin_frappe() -> Self {
        Self::from_catppuccin(&PALETTE.frappe)
    }

    #[must_use]
    pub fn catppuccin_latte() -> Self {
        Self::from_catppuccin(&PALETTE.latte)
    }

    /// Looks up a theme by its display name (`"Catppuccin Latte"`) or flavor
    /// (`"latte"`). Unknown names fall back to Mocha.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let name = name.trim().to_lowercase();
        let flavor = name.strip_prefix("catppuccin").map_or(name.as_str(), str::trim);
        match flavor {
            "latte" => Self::catppuccin_latte(),
            "frappe" | "frappé" => Self::catppuccin_frappe(),
            "macchiato" => Self::catppuccin_macchiato(),
            _ => Self::catppuccin_mocha(),
        }
    }

    // Semantic roles

    #[must_use]
    pub const fn border(&self) -> Color {
        self.surface1
    }

    #[must_use]
    pub const fn border_focused(&self) -> Color {
        self.lavender
    }

    #[must_use]
    pub const fn success(&self) -> Color {
        self.green
    }

    #[must_use]
    pub const fn error(&self) -> Color {
        self.red
    }

    #[must_use]
    pub const fn muted(&self) -> Color {
        self.overlay0
    }

    #[must_use]
    pub fn title(&self) -> Style {
        Style::default().fg(self.mauve).add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn header(&self) -> Style {
        Style::default().fg(self.yellow).add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn selection(&self) -> Style {
        Style::default()
            .bg(self.surface1)
            .fg(self.text)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub const fn status_color(&self, status: WatchStatus) -> Color {
        match status {
            WatchStatus::NotStarted => self.overlay1,
            WatchStatus::InProgress => self.sky,
            WatchStatus::Completed => self.green,
            WatchStatus::OnHold => self.yellow,
            WatchStatus::Abandoned => self.red,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::catppuccin_mocha()
    }
}
