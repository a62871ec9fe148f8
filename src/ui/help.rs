//! Help overlay: scrollable keybinding table.
//!
//! Lists the live bindings (config overrides included), one row per action
//! and context with every key bound to it.

use crate::app::App;
use crate::keybindings::{Action, Context};
use ratatui::{
    layout::{Constraint, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table},
    Frame,
};

use super::render::centered_rect;

/// Context display order and labels for the help screen.
const CONTEXT_ORDER: [(Context, &str); 4] = [
    (Context::Global, "General"),
    (Context::TaskList, "Task List"),
    (Context::Categories, "Categories"),
    (Context::Summary, "Weekly Summary"),
];

/// Bindings of one context with keys for the same action joined.
fn merged_bindings(app: &App, context: Context) -> Vec<(String, &'static str)> {
    let mut merged: Vec<(Action, String, &'static str)> = Vec::new();
    for (ctx, key, action, description) in app.keybindings.all_bindings() {
        if ctx != context {
            continue;
        }
        match merged.iter_mut().find(|(a, _, _)| *a == action) {
            Some((_, keys, _)) => {
                keys.push_str(", ");
                keys.push_str(&key);
            }
            None => merged.push((action, key, description)),
        }
    }
    merged
        .into_iter()
        .map(|(_, keys, description)| (keys, description))
        .collect()
}

pub fn render(f: &mut Frame, app: &App) {
    let overlay = centered_rect(80, 80, f.area());
    if overlay.width < 20 || overlay.height < 6 {
        return;
    }

    f.render_widget(Clear, overlay);

    let mut rows: Vec<Row> = Vec::new();
    for (context, label) in CONTEXT_ORDER {
        let bindings = merged_bindings(app, context);
        if bindings.is_empty() {
            continue;
        }
        if !rows.is_empty() {
            rows.push(Row::new(vec![String::new(), String::new()]));
        }
        rows.push(
            Row::new(vec![Line::from(format!("-- {} --", label)), Line::from("")])
                .style(app.style("summary_heading")),
        );
        for (keys, description) in bindings {
            rows.push(Row::new(vec![format!("  {}", keys), description.to_string()]));
        }
    }

    // -2 border -2 header with margin
    let visible_height = usize::from(overlay.height.saturating_sub(4));
    let max_scroll = rows.len().saturating_sub(visible_height);
    let scroll = app.help_scroll_offset.min(max_scroll);
    let visible_rows: Vec<Row> = rows.into_iter().skip(scroll).take(visible_height).collect();

    let title = if max_scroll > 0 {
        format!(" Help ({}/{}) ", scroll + 1, max_scroll + 1)
    } else {
        " Help (? to close) ".to_string()
    };

    let table = Table::new(visible_rows, [Constraint::Length(20), Constraint::Min(20)])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.style("dialog_border"))
                .title(title),
        )
        .header(
            Row::new(vec!["Key", "Action"])
                .style(
                    app.style("dialog_title")
                        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
                )
                .bottom_margin(1),
        )
        .style(app.style("task_normal"));

    f.render_widget(table, overlay);

    if scroll < max_scroll {
        let hint = Line::from(Span::styled(
            " j/k to scroll, ? or Esc to close ",
            app.style("input_hint"),
        ));
        let hint_area = Rect {
            x: overlay.x + 1,
            y: overlay.y + overlay.height.saturating_sub(1),
            width: overlay.width.saturating_sub(2),
            height: 1,
        };
        f.render_widget(Paragraph::new(hint), hint_area);
    }
}
