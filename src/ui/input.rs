//! Input handling for the TUI.
//!
//! Overlays capture every key while open: help first, then the
//! confirmation prompt, then dialogs. Otherwise keys go through the
//! keybinding registry for the focused panel.

use crate::app::{App, Dialog, Focus, FormField, Tab, MAX_INPUT_CHARS};
use crate::clipboard::Osc52Clipboard;
use crate::keybindings::{Action as KbAction, Context as KbContext};
use crossterm::event::{KeyCode, KeyModifiers};

use super::Action;

/// Keybinding context for the focused panel.
fn current_context(app: &App) -> KbContext {
    match (app.focus, app.tab) {
        (Focus::Categories, _) => KbContext::Categories,
        (Focus::Tasks, Tab::Summary) => KbContext::Summary,
        (Focus::Tasks, _) => KbContext::TaskList,
    }
}

/// Main input dispatch function.
pub(super) async fn handle_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Action {
    // Raw mode swallows SIGINT, so Ctrl+C is handled here.
    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }

    if app.show_help {
        handle_help_input(app, code);
        return Action::Continue;
    }

    if app.pending_confirm.is_some() {
        handle_confirm_input(app, code).await;
        return Action::Continue;
    }

    if app.dialog.is_some() {
        handle_dialog_input(app, code, modifiers).await;
        return Action::Continue;
    }

    handle_board_input(app, code, modifiers).await
}

/// Captures all keys: j/k/Up/Down scroll, Esc/q/? dismiss.
fn handle_help_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
            app.show_help = false;
            app.help_scroll_offset = 0;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_sub(1);
        }
        _ => {}
    }
}

async fn handle_confirm_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.confirm_pending().await,
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.pending_confirm = None;
            app.set_status("Cancelled");
        }
        _ => {}
    }
}

// ============================================================================
// Dialogs
// ============================================================================

async fn handle_dialog_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    match code {
        KeyCode::Esc => {
            app.dialog = None;
            return;
        }
        KeyCode::Enter => {
            match app.dialog {
                Some(Dialog::AddCategory(_)) => app.submit_category().await,
                Some(Dialog::AddTask(_)) => app.submit_task().await,
                None => {}
            }
            return;
        }
        _ => {}
    }

    let category_count = app.board.categories().len();
    match &mut app.dialog {
        Some(Dialog::AddCategory(form)) => {
            if edit_text(&mut form.name, code, modifiers) {
                form.error = None;
            }
        }
        Some(Dialog::AddTask(form)) => match (code, form.field) {
            (KeyCode::Tab | KeyCode::Down, _) => form.field = form.field.next(),
            (KeyCode::BackTab | KeyCode::Up, _) => form.field = form.field.prev(),
            (KeyCode::Left, FormField::Category) if category_count > 0 => {
                form.category = (form.category + category_count - 1) % category_count;
            }
            (KeyCode::Right | KeyCode::Char(' '), FormField::Category) if category_count > 0 => {
                form.category = (form.category + 1) % category_count;
            }
            (KeyCode::Left, FormField::Priority) => form.priority = form.priority.prev(),
            (KeyCode::Right | KeyCode::Char(' '), FormField::Priority) => {
                form.priority = form.priority.next();
            }
            (_, FormField::Title) => {
                if edit_text(&mut form.title, code, modifiers) {
                    form.error = None;
                }
            }
            _ => {}
        },
        None => {}
    }
}

/// Apply a key to a single-line input. Returns true if the text changed.
fn edit_text(buffer: &mut String, code: KeyCode, modifiers: KeyModifiers) -> bool {
    match code {
        KeyCode::Backspace => buffer.pop().is_some(),
        KeyCode::Char(c)
            if !c.is_control()
                && !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            if buffer.chars().count() >= MAX_INPUT_CHARS {
                return false;
            }
            buffer.push(c);
            true
        }
        _ => false,
    }
}

// ============================================================================
// Board
// ============================================================================

async fn handle_board_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Action {
    let context = current_context(app);
    let Some(action) = app.keybindings.action_for_key(code, modifiers, context) else {
        return Action::Continue;
    };
    tracing::trace!(?action, ?context, "Dispatching key");

    match action {
        KbAction::Quit => return Action::Quit,
        KbAction::NavDown => app.nav_down(),
        KbAction::NavUp => app.nav_up(),
        KbAction::NextTab => app.set_tab(app.tab.next()),
        KbAction::PrevTab => app.set_tab(app.tab.prev()),
        KbAction::TabActive => app.set_tab(Tab::Active),
        KbAction::TabDone => app.set_tab(Tab::Done),
        KbAction::TabSummary => app.set_tab(Tab::Summary),
        KbAction::CycleFocus => app.cycle_focus(),
        KbAction::Back => app.back(),
        KbAction::Select => app.activate_selected().await,
        KbAction::ToggleComplete => app.toggle_selected().await,
        KbAction::ToggleGrouping => app.toggle_grouping().await,
        KbAction::CollapseAll => app.toggle_collapse_all(),
        KbAction::AddTask => app.open_add_task(),
        KbAction::AddCategory => app.open_add_category(),
        KbAction::DeleteTask => app.delete_selected_task().await,
        KbAction::DeleteCategory => app.request_delete_category().await,
        KbAction::CyclePriority => app.cycle_selected_priority().await,
        KbAction::MoveTask => app.start_move(),
        KbAction::CopySummary => app.copy_summary(&mut Osc52Clipboard::stdout()),
        KbAction::CycleTheme => app.cycle_theme().await,
        KbAction::ShowHelp => {
            app.show_help = true;
            app.help_scroll_offset = 0;
        }
    }
    Action::Continue
}

// ============================================================================
// Tests
// ============================================================================
