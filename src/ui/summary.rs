use crate::app::App;
use crate::board::build_summary;
use crate::board::summary::format_date;
use crate::keybindings::{Action, Context};
use crate::theme::category_color;
use chrono::Local;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Render the weekly summary panel.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let summary = build_summary(
        app.board.tasks().as_slice(),
        app.board.categories().as_slice(),
        &Local::now(),
    );
    let date_format = app.prefs.date_format();

    let mut lines = vec![
        Line::styled(
            format!(
                "Week starting {}",
                format_date(summary.week_start_date, date_format)
            ),
            app.style("summary_meta"),
        ),
        Line::styled(
            format!(
                "{} {} completed",
                summary.total_count,
                if summary.total_count == 1 { "task" } else { "tasks" }
            ),
            app.style("summary_heading"),
        ),
        Line::from(""),
    ];

    if summary.is_empty() {
        lines.push(Line::styled(
            "No tasks completed this week yet",
            app.style("empty_message"),
        ));
    }

    for group in &summary.groups {
        lines.push(Line::from(vec![
            Span::styled(
                "● ",
                Style::default().fg(category_color(group.category.color)),
            ),
            Span::styled(
                format!("{} ({})", group.category.name, group.tasks.len()),
                app.style("group_header"),
            ),
        ]));
        for task in &group.tasks {
            let mut spans = vec![
                Span::styled("  ✓ ", app.style("priority_later")),
                Span::styled(task.title.as_str(), app.style("task_normal")),
            ];
            if let Some(at) = task.completed_at() {
                spans.push(Span::styled(
                    format!("  {}", format_date(at.with_timezone(&Local).date_naive(), date_format)),
                    app.style("task_date"),
                ));
            }
            lines.push(Line::from(spans));
        }
        lines.push(Line::from(""));
    }

    let key = app
        .keybindings
        .key_label(Action::CopySummary, Context::Summary)
        .unwrap_or_else(|| "y".to_string());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.style("panel_border_focused"))
        .title(" This Week's Summary ")
        .title_bottom(Line::from(format!(" {} copy as text ", key)).right_aligned());

    let scroll = u16::try_from(app.summary_scroll).unwrap_or(u16::MAX);
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    f.render_widget(paragraph, area);
}
