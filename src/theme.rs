//! Theme system for the TUI.
//!
//! Provides semantic color roles that map to ratatui `Style` values.
//! The `ThemeVariant` enum selects between Dark and Light palettes,
//! and `StyleMap` resolves role names to concrete styles.

use ratatui::style::{Color, Modifier, Style};
use std::collections::HashMap;

use crate::board::{CategoryColor, Priority};

// ============================================================================
// Theme Variant
// ============================================================================

/// Available theme variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeVariant {
    Dark,
    Light,
}

impl ThemeVariant {
    /// Parse a variant name from a string (case-insensitive).
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    /// Build the `ColorPalette` for this variant.
    pub fn palette(self) -> ColorPalette {
        match self {
            Self::Dark => ColorPalette::dark(),
            Self::Light => ColorPalette::light(),
        }
    }

    /// Cycle to the next variant: Dark → Light → Dark.
    pub fn next(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    /// Human-readable name for status display.
    pub fn name(self) -> &'static str {
        match self {
            Self::Dark => "Dark",
            Self::Light => "Light",
        }
    }

    /// Preference value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }
}

/// Terminal color for a category swatch.
pub fn category_color(color: CategoryColor) -> Color {
    let (r, g, b) = color.rgb();
    Color::Rgb(r, g, b)
}

/// Style role for a priority badge.
pub fn priority_role(priority: Priority) -> &'static str {
    match priority {
        Priority::Today => "priority_today",
        Priority::Soon => "priority_soon",
        Priority::Later => "priority_later",
    }
}

// ============================================================================
// Color Palette: semantic roles to Style
// ============================================================================

/// A complete color palette mapping every semantic UI role to a `Style`.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    // -- Tabs --
    pub tab_active: Style,
    pub tab_inactive: Style,

    // -- Task list --
    pub group_header: Style,
    pub group_header_selected: Style,
    pub group_count: Style,
    pub group_move_target: Style,
    pub task_normal: Style,
    pub task_selected: Style,
    pub task_done: Style,
    pub task_date: Style,
    pub task_move_source: Style,
    pub empty_message: Style,

    // -- Priority badges --
    pub priority_today: Style,
    pub priority_soon: Style,
    pub priority_later: Style,

    // -- Summary --
    pub summary_heading: Style,
    pub summary_meta: Style,

    // -- Dialogs --
    pub dialog_border: Style,
    pub dialog_title: Style,
    pub input_text: Style,
    pub input_hint: Style,
    pub field_active: Style,
    pub error_text: Style,

    // -- Chrome --
    pub status_bar: Style,
    pub panel_border: Style,
    pub panel_border_focused: Style,
}

impl ColorPalette {
    fn dark() -> Self {
        let selected = Style::default().bg(Color::DarkGray).fg(Color::White);
        Self {
            // Tabs
            tab_active: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),

            // Task list
            group_header: Style::default().add_modifier(Modifier::BOLD),
            group_header_selected: selected.add_modifier(Modifier::BOLD),
            group_count: Style::default().fg(Color::DarkGray),
            group_move_target: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            task_normal: Style::default(),
            task_selected: selected,
            task_done: Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::CROSSED_OUT),
            task_date: Style::default().fg(Color::DarkGray),
            task_move_source: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::ITALIC),
            empty_message: Style::default().fg(Color::DarkGray),

            // Priority badges
            priority_today: Style::default().fg(Color::Red),
            priority_soon: Style::default().fg(Color::Yellow),
            priority_later: Style::default().fg(Color::Green),

            // Summary
            summary_heading: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            summary_meta: Style::default().fg(Color::DarkGray),

            // Dialogs
            dialog_border: Style::default().fg(Color::Cyan),
            dialog_title: Style::default().add_modifier(Modifier::BOLD),
            input_text: Style::default().fg(Color::White),
            input_hint: Style::default().fg(Color::DarkGray),
            field_active: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            error_text: Style::default().fg(Color::Red),

            // Chrome
            status_bar: Style::default().bg(Color::DarkGray).fg(Color::White),
            panel_border: Style::default(),
            panel_border_focused: Style::default().fg(Color::Cyan),
        }
    }

    /// Light palette for light terminal backgrounds.
    fn light() -> Self {
        let selected = Style::default().bg(Color::Blue).fg(Color::White);
        Self {
            // Tabs
            tab_active: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),

            // Task list
            group_header: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            group_header_selected: selected.add_modifier(Modifier::BOLD),
            group_count: Style::default().fg(Color::DarkGray),
            group_move_target: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
            task_normal: Style::default().fg(Color::Black),
            task_selected: selected,
            task_done: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::CROSSED_OUT),
            task_date: Style::default().fg(Color::DarkGray),
            task_move_source: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::ITALIC),
            empty_message: Style::default().fg(Color::DarkGray),

            // Priority badges
            priority_today: Style::default().fg(Color::Red),
            priority_soon: Style::default().fg(Color::Magenta),
            priority_later: Style::default().fg(Color::Green),

            // Summary
            summary_heading: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            summary_meta: Style::default().fg(Color::DarkGray),

            // Dialogs
            dialog_border: Style::default().fg(Color::Blue),
            dialog_title: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            input_text: Style::default().fg(Color::Black),
            input_hint: Style::default().fg(Color::DarkGray),
            field_active: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            error_text: Style::default().fg(Color::Red),

            // Chrome
            status_bar: Style::default().bg(Color::White).fg(Color::Black),
            panel_border: Style::default().fg(Color::DarkGray),
            panel_border_focused: Style::default().fg(Color::Blue),
        }
    }
}

// ============================================================================
// Style Map: string-keyed lookup
// ============================================================================

/// String-keyed style lookup.
///
/// Built from a `ColorPalette`, this resolves role names (e.g.
/// `"task_selected"`) to their concrete `Style` at runtime.
#[derive(Debug, Clone)]
pub struct StyleMap {
    map: HashMap<&'static str, Style>,
}

/// All semantic role names, in declaration order.
const ROLE_NAMES: [&str; 26] = [
    "tab_active",
    "tab_inactive",
    "group_header",
    "group_header_selected",
    "group_count",
    "group_move_target",
    "task_normal",
    "task_selected",
    "task_done",
    "task_date",
    "task_move_source",
    "empty_message",
    "priority_today",
    "priority_soon",
    "priority_later",
    "summary_heading",
    "summary_meta",
    "dialog_border",
    "dialog_title",
    "input_text",
    "input_hint",
    "field_active",
    "error_text",
    "status_bar",
    "panel_border",
    "panel_border_focused",
];

impl StyleMap {
    /// Build a `StyleMap` from a `ColorPalette`.
    pub fn from_palette(p: &ColorPalette) -> Self {
        let styles: [Style; 26] = [
            p.tab_active,
            p.tab_inactive,
            p.group_header,
            p.group_header_selected,
            p.group_count,
            p.group_move_target,
            p.task_normal,
            p.task_selected,
            p.task_done,
            p.task_date,
            p.task_move_source,
            p.empty_message,
            p.priority_today,
            p.priority_soon,
            p.priority_later,
            p.summary_heading,
            p.summary_meta,
            p.dialog_border,
            p.dialog_title,
            p.input_text,
            p.input_hint,
            p.field_active,
            p.error_text,
            p.status_bar,
            p.panel_border,
            p.panel_border_focused,
        ];

        let map = ROLE_NAMES.into_iter().zip(styles).collect();
        Self { map }
    }

    /// Resolve a role name to its `Style`. Returns `Style::default()` for unknown roles.
    pub fn resolve(&self, role: &str) -> Style {
        self.map.get(role).copied().unwrap_or_default()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dark_palette_selection_is_gray() {
        let palette = ThemeVariant::Dark.palette();
        assert_eq!(
            palette.task_selected,
            Style::default().bg(Color::DarkGray).fg(Color::White)
        );
    }

    #[test]
    fn light_palette_differs_from_dark() {
        let dark = ThemeVariant::Dark.palette();
        let light = ThemeVariant::Light.palette();
        assert_ne!(dark.task_selected, light.task_selected);
        assert_ne!(dark.status_bar, light.status_bar);
    }

    #[test]
    fn variant_from_str_name() {
        assert_eq!(
            ThemeVariant::from_str_name("Light"),
            Some(ThemeVariant::Light)
        );
        assert_eq!(
            ThemeVariant::from_str_name("DARK"),
            Some(ThemeVariant::Dark)
        );
        assert_eq!(ThemeVariant::from_str_name("neon"), None);
        for v in [ThemeVariant::Dark, ThemeVariant::Light] {
            assert_eq!(ThemeVariant::from_str_name(v.as_str()), Some(v));
        }
    }

    #[test]
    fn category_color_is_exact_rgb() {
        assert_eq!(
            category_color(CategoryColor::Blue),
            Color::Rgb(0x3B, 0x82, 0xF6)
        );
    }

    #[test]
    fn priority_roles_resolve() {
        let palette = ThemeVariant::Dark.palette();
        let sm = StyleMap::from_palette(&palette);
        assert_eq!(sm.resolve(priority_role(Priority::Today)), palette.priority_today);
        assert_eq!(sm.resolve(priority_role(Priority::Later)), palette.priority_later);
    }

    #[test]
    fn style_map_returns_default_for_unknown() {
        let sm = StyleMap::from_palette(&ThemeVariant::Dark.palette());
        assert_eq!(sm.resolve("nonexistent_role"), Style::default());
    }

    #[test]
    fn role_names_count_matches_palette_fields() {
        let sm = StyleMap::from_palette(&ThemeVariant::Light.palette());
        assert_eq!(sm.map.len(), ROLE_NAMES.len());
    }
}
