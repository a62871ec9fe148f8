//! Render functions for the TUI.
//!
//! Lays out the frame (tab bar, category strip, main panel, status bar) and
//! draws overlays on top.

use crate::app::{App, ConfirmAction, LoadState, Tab};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::{categories, dialogs, help, status, summary, tabs, tasks};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 50;
pub(super) const MIN_HEIGHT: u16 = 12;

pub(super) fn render(f: &mut Frame, app: &App) {
    let area = f.area();

    // At truly minimal dimensions, we can't render anything meaningful
    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    tabs::render(f, app, chunks[0]);
    categories::render(f, app, chunks[1]);
    match &app.load_state {
        LoadState::Ready => match app.tab {
            Tab::Summary => summary::render(f, app, chunks[2]),
            Tab::Active | Tab::Done => tasks::render(f, app, chunks[2]),
        },
        LoadState::Loading => render_notice(f, app, chunks[2], "Loading tasks...", "empty_message"),
        LoadState::Failed(error) => render_notice(
            f,
            app,
            chunks[2],
            &format!("Could not load your tasks: {}", error),
            "error_text",
        ),
    }
    status::render(f, app, chunks[3]);

    if app.show_help {
        help::render(f, app);
    }

    if let Some(ref confirm) = app.pending_confirm {
        render_confirm_overlay(f, app, confirm);
    }

    if let Some(ref dialog) = app.dialog {
        dialogs::render(f, app, dialog);
    }
}

fn render_notice(f: &mut Frame, app: &App, area: Rect, text: &str, role: &str) {
    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.style("panel_border")),
        )
        .style(app.style(role))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn render_confirm_overlay(f: &mut Frame, app: &App, confirm: &ConfirmAction) {
    let text = match confirm {
        ConfirmAction::DeleteCategory {
            name, task_count, ..
        } => {
            let consequence = match task_count {
                0 => "It has no tasks.".to_string(),
                1 => "Its 1 task will also be deleted.".to_string(),
                n => format!("Its {} tasks will also be deleted.", n),
            };
            format!(
                "Delete category \"{}\"?\n\n{}\n\n(y) Confirm  (n/Esc) Cancel",
                name, consequence
            )
        }
    };

    let overlay = fixed_rect(52, 7, f.area());
    if overlay.width < 10 || overlay.height < 5 {
        return;
    }

    f.render_widget(Clear, overlay);

    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.style("dialog_border"))
                .title(" Confirm "),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false })
        .style(app.style("input_text"));

    f.render_widget(paragraph, overlay);
}

/// Rectangle covering a percentage of `area`, centered in it.
pub(super) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let scale = |len: u16, pct: u16| {
        u16::try_from(u32::from(len) * u32::from(pct.min(100)) / 100).unwrap_or(len)
    };
    center_in(scale(area.width, percent_x), scale(area.height, percent_y), area)
}

/// Centered rectangle of a fixed size, shrunk to leave a 2-cell margin.
pub(super) fn fixed_rect(width: u16, height: u16, area: Rect) -> Rect {
    center_in(
        width.min(area.width.saturating_sub(4)),
        height.min(area.height.saturating_sub(4)),
        area,
    )
}

fn center_in(width: u16, height: u16, area: Rect) -> Rect {
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Dialog;
    use crate::board::summary::{format_date, DEFAULT_DATE_FORMAT};
    use crate::board::Priority;
    use crate::config::Config;
    use crate::keybindings::KeybindingRegistry;
    use crate::preferences::PreferenceManager;
    use crate::storage::{Database, LoadedBoard};
    use chrono::Local;
    use ratatui::{backend::TestBackend, Terminal};

    async fn test_app() -> App {
        let db = Database::open(":memory:").await.unwrap();
        let prefs = PreferenceManager::from_config(&Config::default());
        App::new(db, prefs, KeybindingRegistry::new())
    }

    fn draw(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer.content.iter().map(|cell| cell.symbol()).collect()
    }

    #[tokio::test]
    async fn test_loading_screen() {
        let app = test_app().await;
        assert!(draw(&app, 80, 24).contains("Loading tasks..."));
    }

    #[tokio::test]
    async fn test_renders_tabs_groups_and_tasks() {
        let mut app = test_app().await;
        app.apply_loaded(LoadedBoard::default());
        let work = app.board.add_category("Work").unwrap();
        app.board.add_task("Ship report", &work.id, Priority::Today).unwrap();
        let done = app.board.add_task("File taxes", &work.id, Priority::Later).unwrap();
        app.board.toggle_complete(&done.id);

        let screen = draw(&app, 80, 24);
        assert!(screen.contains("Active (1)"));
        assert!(screen.contains("Done (1)"));
        assert!(screen.contains("Summary"));
        assert!(screen.contains("Work (1)"));
        assert!(screen.contains("Ship report"));
        assert!(!screen.contains("File taxes"));
    }

    #[tokio::test]
    async fn test_empty_messages_per_tab() {
        let mut app = test_app().await;
        app.apply_loaded(LoadedBoard::default());
        assert!(draw(&app, 80, 24).contains("No active tasks"));

        app.set_tab(Tab::Done);
        assert!(draw(&app, 80, 24).contains("No completed tasks yet"));

        app.set_tab(Tab::Summary);
        assert!(draw(&app, 80, 24).contains("No tasks completed this week yet"));
    }

    #[tokio::test]
    async fn test_done_tab_and_summary_show_completion_dates() {
        let mut app = test_app().await;
        app.apply_loaded(LoadedBoard::default());
        let work = app.board.add_category("Work").unwrap();
        let task = app.board.add_task("File taxes", &work.id, Priority::Later).unwrap();
        app.board.toggle_complete(&task.id);
        let completed_at = app.board.task(&task.id).unwrap().completed_at().unwrap();
        let date = format_date(
            completed_at.with_timezone(&Local).date_naive(),
            DEFAULT_DATE_FORMAT,
        );

        app.set_tab(Tab::Done);
        let screen = draw(&app, 100, 24);
        assert!(screen.contains("File taxes"));
        assert!(screen.contains(&date));

        app.set_tab(Tab::Summary);
        let screen = draw(&app, 100, 24);
        assert!(screen.contains("1 task completed"));
        assert!(screen.contains("Work (1)"));
        assert!(screen.contains(&format!("✓ File taxes  {}", date)));
    }

    #[tokio::test]
    async fn test_category_dialog_previews_color() {
        let mut app = test_app().await;
        app.apply_loaded(LoadedBoard::default());
        app.open_add_category();
        let hex = match &app.dialog {
            Some(Dialog::AddCategory(form)) => form.color.hex(),
            _ => panic!("dialog expected"),
        };
        let screen = draw(&app, 80, 24);
        assert!(screen.contains(hex));
        assert!(screen.contains("randomly assigned"));
    }

    #[tokio::test]
    async fn test_too_small_terminal() {
        let app = test_app().await;
        assert!(draw(&app, 30, 8).contains("Terminal too small"));
    }
}
