//! Keybinding registry: maps actions to key events with config overrides.
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;

// ============================================================================
// Action Enum
// ============================================================================

/// All user-facing actions that can be triggered by keybindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    NavDown,
    NavUp,
    NextTab,
    PrevTab,
    TabActive,
    TabDone,
    TabSummary,
    CycleFocus,
    Back,
    Select,
    ToggleComplete,
    ToggleGrouping,
    CollapseAll,
    AddTask,
    AddCategory,
    DeleteTask,
    DeleteCategory,
    CyclePriority,
    MoveTask,
    CopySummary,
    CycleTheme,
    ShowHelp,
}

impl Action {
    /// Human-readable description for the help screen.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Quit => "Quit application",
            Self::NavDown => "Navigate down",
            Self::NavUp => "Navigate up",
            Self::NextTab => "Next tab",
            Self::PrevTab => "Previous tab",
            Self::TabActive => "Show active tasks",
            Self::TabDone => "Show completed tasks",
            Self::TabSummary => "Show weekly summary",
            Self::CycleFocus => "Switch between tasks and categories",
            Self::Back => "Cancel move / dismiss",
            Self::Select => "Toggle group / drop moved task",
            Self::ToggleComplete => "Toggle task complete",
            Self::ToggleGrouping => "Group by category / priority",
            Self::CollapseAll => "Collapse or expand all groups",
            Self::AddTask => "Add task",
            Self::AddCategory => "Add category",
            Self::DeleteTask => "Delete task",
            Self::DeleteCategory => "Delete category and its tasks",
            Self::CyclePriority => "Cycle task priority",
            Self::MoveTask => "Move task to another group",
            Self::CopySummary => "Copy summary to clipboard",
            Self::CycleTheme => "Cycle theme",
            Self::ShowHelp => "Show help",
        }
    }
}

// ============================================================================
// Context Enum
// ============================================================================

/// Dispatch context: determines which bindings are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Global,
    TaskList,
    Categories,
    Summary,
}

// ============================================================================
// Key Specification
// ============================================================================

/// A key event: code + modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    /// Drop SHIFT where it is already encoded in the key code.
    ///
    /// Terminals report `A` as `Char('A')` + SHIFT and Shift+Tab as
    /// `BackTab` + SHIFT; bindings are stored without the modifier.
    fn normalized(self) -> Self {
        match self.code {
            KeyCode::Char(_) | KeyCode::BackTab => {
                Self::new(self.code, self.modifiers.difference(KeyModifiers::SHIFT))
            }
            _ => self,
        }
    }
}

/// Parse a key string from config into a KeySpec.
///
/// Supported formats:
/// - Single char: "q", "j", "/"
/// - Named keys: "Enter", "Esc", "Tab", "Shift+Tab", "Up", "Down", "Space"
/// - Modifier combos: "Ctrl+d"
/// - Function keys: "F1" through "F12"
fn parse_key_string(s: &str) -> Option<KeySpec> {
    let s = s.trim();

    if let Some(rest) = s.strip_prefix("Ctrl+") {
        let mut chars = rest.trim().chars();
        let c = chars.next()?;
        return chars.next().is_none().then_some(KeySpec::ctrl(c));
    }

    // Named keys (case-insensitive)
    match s.to_lowercase().as_str() {
        "enter" | "return" => return Some(KeySpec::plain(KeyCode::Enter)),
        "esc" | "escape" => return Some(KeySpec::plain(KeyCode::Esc)),
        "tab" => return Some(KeySpec::plain(KeyCode::Tab)),
        "shift+tab" | "backtab" => return Some(KeySpec::plain(KeyCode::BackTab)),
        "up" => return Some(KeySpec::plain(KeyCode::Up)),
        "down" => return Some(KeySpec::plain(KeyCode::Down)),
        "left" => return Some(KeySpec::plain(KeyCode::Left)),
        "right" => return Some(KeySpec::plain(KeyCode::Right)),
        "backspace" => return Some(KeySpec::plain(KeyCode::Backspace)),
        "delete" | "del" => return Some(KeySpec::plain(KeyCode::Delete)),
        "space" => return Some(KeySpec::plain(KeyCode::Char(' '))),
        _ => {}
    }

    // Function keys
    if let Some(n) = s
        .strip_prefix(|c: char| c == 'F' || c == 'f')
        .and_then(|rest| rest.parse::<u8>().ok())
    {
        return (1..=12).contains(&n).then_some(KeySpec::plain(KeyCode::F(n)));
    }

    // Single character
    let mut chars = s.chars();
    let c = chars.next()?;
    chars
        .next()
        .is_none()
        .then_some(KeySpec::plain(KeyCode::Char(c)))
}

/// Format a KeySpec as a human-readable string for the help screen.
fn format_key(key: &KeySpec) -> String {
    let modifier = if key.modifiers.contains(KeyModifiers::CONTROL) {
        "Ctrl+"
    } else {
        ""
    };

    let key_name = match key.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::BackTab => "Shift+Tab".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Delete => "Delete".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        _ => "?".to_string(),
    };

    format!("{}{}", modifier, key_name)
}

// ============================================================================
// Keybinding Registry
// ============================================================================

/// Registry of keybindings, supporting default bindings and config overrides.
///
/// The same key can map to different actions in different contexts; lookups
/// fall back to `Global`.
pub struct KeybindingRegistry {
    /// Primary lookup: (Context, KeySpec) -> Action
    lookup: HashMap<(Context, KeySpec), Action>,
    /// All bindings for help screen enumeration
    bindings: Vec<(Context, KeySpec, Action)>,
}

impl KeybindingRegistry {
    /// Create a registry with the default bindings.
    pub fn new() -> Self {
        let mut registry = Self {
            lookup: HashMap::new(),
            bindings: Vec::new(),
        };
        registry.register_defaults();
        registry
    }

    /// Bind `key` in `context`, displacing whatever it was bound to there.
    fn bind(&mut self, context: Context, key: KeySpec, action: Action) {
        self.bindings
            .retain(|(c, k, _)| !(*c == context && *k == key));
        self.lookup.insert((context, key), action);
        self.bindings.push((context, key, action));
    }

    fn register_defaults(&mut self) {
        use KeyCode::*;

        let global: [(KeyCode, Action); 18] = [
            (Char('q'), Action::Quit),
            (Char('j'), Action::NavDown),
            (Down, Action::NavDown),
            (Char('k'), Action::NavUp),
            (Up, Action::NavUp),
            (Tab, Action::NextTab),
            (BackTab, Action::PrevTab),
            (Char('1'), Action::TabActive),
            (Char('2'), Action::TabDone),
            (Char('3'), Action::TabSummary),
            (Char('c'), Action::CycleFocus),
            (Esc, Action::Back),
            (Enter, Action::Select),
            (Char('a'), Action::AddTask),
            (Char('A'), Action::AddCategory),
            (Char('g'), Action::ToggleGrouping),
            (Char('T'), Action::CycleTheme),
            (Char('?'), Action::ShowHelp),
        ];
        for (code, action) in global {
            self.bind(Context::Global, KeySpec::plain(code), action);
        }

        // === Task list ===
        let task_list: [(KeyCode, Action); 6] = [
            (Char(' '), Action::ToggleComplete),
            (Char('x'), Action::ToggleComplete),
            (Char('d'), Action::DeleteTask),
            (Char('p'), Action::CyclePriority),
            (Char('m'), Action::MoveTask),
            (Char('z'), Action::CollapseAll),
        ];
        for (code, action) in task_list {
            self.bind(Context::TaskList, KeySpec::plain(code), action);
        }

        // === Category strip ===
        self.bind(
            Context::Categories,
            KeySpec::plain(Char('d')),
            Action::DeleteCategory,
        );
        self.bind(
            Context::Categories,
            KeySpec::plain(Delete),
            Action::DeleteCategory,
        );
        self.bind(
            Context::Categories,
            KeySpec::plain(Char('l')),
            Action::NavDown,
        );
        self.bind(Context::Categories, KeySpec::plain(Right), Action::NavDown);
        self.bind(
            Context::Categories,
            KeySpec::plain(Char('h')),
            Action::NavUp,
        );
        self.bind(Context::Categories, KeySpec::plain(Left), Action::NavUp);

        // === Summary ===
        self.bind(
            Context::Summary,
            KeySpec::plain(Char('y')),
            Action::CopySummary,
        );
    }

    /// Apply user overrides from config keybindings map.
    ///
    /// Keys in the map are action names (e.g., "quit", "add_task").
    /// Values are key strings (e.g., "q", "Ctrl+d", "F5").
    ///
    /// Returns a list of warnings for unrecognized action names or unparseable keys.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, String>) -> Vec<String> {
        let mut warnings = Vec::new();

        // Sorted so repeated runs warn and rebind in a stable order.
        let mut entries: Vec<(&String, &String)> = overrides.iter().collect();
        entries.sort();

        for (action_name, key_str) in entries {
            let Some(action) = parse_action_name(action_name) else {
                warnings.push(format!("Unknown action '{}', ignoring", action_name));
                continue;
            };

            let Some(key) = parse_key_string(key_str) else {
                warnings.push(format!(
                    "Cannot parse key '{}' for action '{}', ignoring",
                    key_str, action_name
                ));
                continue;
            };

            // Re-bind in every context the action had, with the new key
            let mut contexts_for_action: Vec<Context> = self
                .bindings
                .iter()
                .filter(|(_, _, a)| *a == action)
                .map(|(c, _, _)| *c)
                .collect();
            contexts_for_action.dedup();

            self.lookup.retain(|_, a| *a != action);
            self.bindings.retain(|(_, _, a)| *a != action);

            for ctx in contexts_for_action {
                self.bind(ctx, key, action);
            }

            tracing::info!(
                action = %action_name,
                key = %key_str,
                "Applied keybinding override"
            );
        }

        warnings
    }

    /// Look up the action for a given key in a given context.
    ///
    /// Tries the specific context first, then falls back to Global.
    pub fn action_for_key(
        &self,
        code: KeyCode,
        modifiers: KeyModifiers,
        context: Context,
    ) -> Option<Action> {
        let key = KeySpec::new(code, modifiers).normalized();

        if let Some(&action) = self.lookup.get(&(context, key)) {
            return Some(action);
        }

        if context != Context::Global {
            if let Some(&action) = self.lookup.get(&(Context::Global, key)) {
                return Some(action);
            }
        }

        None
    }

    /// First key bound to an action in a context (or Global), for hints.
    pub fn key_label(&self, action: Action, context: Context) -> Option<String> {
        self.bindings
            .iter()
            .find(|(c, _, a)| *a == action && (*c == context || *c == Context::Global))
            .map(|(_, key, _)| format_key(key))
    }

    /// Get all bindings for the help screen.
    ///
    /// Returns (context, key_display_string, action, description) tuples.
    pub fn all_bindings(&self) -> Vec<(Context, String, Action, &'static str)> {
        self.bindings
            .iter()
            .map(|(ctx, key, action)| (*ctx, format_key(key), *action, action.describe()))
            .collect()
    }
}

impl Default for KeybindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse an action name string (from config) into an Action enum.
fn parse_action_name(name: &str) -> Option<Action> {
    match name.to_lowercase().as_str() {
        "quit" => Some(Action::Quit),
        "nav_down" | "down" => Some(Action::NavDown),
        "nav_up" | "up" => Some(Action::NavUp),
        "next_tab" => Some(Action::NextTab),
        "prev_tab" => Some(Action::PrevTab),
        "tab_active" | "active" => Some(Action::TabActive),
        "tab_done" | "done" => Some(Action::TabDone),
        "tab_summary" | "summary" => Some(Action::TabSummary),
        "cycle_focus" | "focus" => Some(Action::CycleFocus),
        "back" => Some(Action::Back),
        "select" | "enter" => Some(Action::Select),
        "toggle_complete" | "complete" => Some(Action::ToggleComplete),
        "toggle_grouping" | "grouping" => Some(Action::ToggleGrouping),
        "collapse_all" => Some(Action::CollapseAll),
        "add_task" => Some(Action::AddTask),
        "add_category" => Some(Action::AddCategory),
        "delete_task" => Some(Action::DeleteTask),
        "delete_category" => Some(Action::DeleteCategory),
        "cycle_priority" | "priority" => Some(Action::CyclePriority),
        "move_task" | "move" => Some(Action::MoveTask),
        "copy_summary" | "copy" => Some(Action::CopySummary),
        "cycle_theme" | "theme" => Some(Action::CycleTheme),
        "show_help" | "help" => Some(Action::ShowHelp),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
