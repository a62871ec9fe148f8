use crate::app::{flatten_groups, App, Focus, ListRow, Tab};
use crate::board::summary::format_date;
use crate::board::{GroupHeader, GroupingMode, Task, TaskGroup};
use crate::theme::{category_color, priority_role};
use crate::util::{display_width, truncate_to_width};
use chrono::Local;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

/// Width of the widest priority badge, `[Today]`.
const BADGE_WIDTH: usize = 7;

/// Render the grouped task list for the Active or Done tab.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }
    let Some(filter) = app.tab.filter() else {
        return;
    };

    let is_focused = app.focus == Focus::Tasks;
    let title = match app.tab {
        Tab::Done => " Completed ",
        _ => " Tasks ",
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(if is_focused {
            app.style("panel_border_focused")
        } else {
            app.style("panel_border")
        })
        .title(title);

    let groups = app.task_groups();
    if groups.is_empty() {
        let paragraph = Paragraph::new(filter.empty_message())
            .style(app.style("empty_message"))
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(paragraph, area);
        return;
    }

    let rows = flatten_groups(&groups, &app.collapsed);
    let width = usize::from(area.width.saturating_sub(2));
    let moving = app.pending_move.is_some();

    let items: Vec<ListItem> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let selected = is_focused && i == app.selected_row;
            let line = match *row {
                ListRow::Header { group, collapsed } => {
                    header_line(app, group, collapsed, selected, moving)
                }
                ListRow::Task { task, .. } => task_line(app, task, selected, width),
            };
            ListItem::new(line)
        })
        .collect();

    let list = List::new(items).block(block).highlight_style(Style::default());
    let mut state = ListState::default().with_selected(Some(app.selected_row));
    f.render_stateful_widget(list, area, &mut state);
}

fn header_line<'a>(
    app: &App,
    group: &'a TaskGroup<'a>,
    collapsed: bool,
    selected: bool,
    moving: bool,
) -> Line<'a> {
    let style = if selected {
        app.style("group_header_selected")
    } else if moving {
        app.style("group_move_target")
    } else {
        app.style("group_header")
    };

    let mut spans = vec![Span::styled(if collapsed { "> " } else { "v " }, style)];
    match group.header {
        GroupHeader::Category(category) => {
            spans.push(Span::styled(
                "● ",
                Style::default().fg(category_color(category.color)),
            ));
            spans.push(Span::styled(category.name.as_str(), style));
        }
        GroupHeader::Priority(priority) => {
            spans.push(Span::styled(
                priority.label(),
                style.patch(app.style(priority_role(priority))),
            ));
        }
    }
    spans.push(Span::styled(
        format!(" ({})", group.tasks.len()),
        app.style("group_count"),
    ));
    if let Some(subtitle) = group.header.subtitle() {
        spans.push(Span::styled(format!("  {}", subtitle), app.style("task_date")));
    }
    Line::from(spans)
}

fn task_line<'a>(app: &App, task: &'a Task, selected: bool, width: usize) -> Line<'a> {
    let is_move_source = app.pending_move.as_ref() == Some(&task.id);
    let title_style = if selected {
        app.style("task_selected")
    } else if is_move_source {
        app.style("task_move_source")
    } else if task.completed() {
        app.style("task_done")
    } else {
        app.style("task_normal")
    };

    let checkbox = if task.completed() { "[x] " } else { "[ ] " };
    let badge = format!("{:<w$} ", format!("[{}]", task.priority.label()), w = BADGE_WIDTH);

    // The other grouping dimension is shown after the title.
    let category = match app.grouping {
        GroupingMode::Priority => app.board.category(&task.category_id),
        GroupingMode::Category => None,
    };
    let date = match (app.tab, task.completed_at()) {
        (Tab::Done, Some(at)) => Some(format_date(
            at.with_timezone(&Local).date_naive(),
            app.prefs.date_format(),
        )),
        _ => None,
    };

    let mut suffix_width = 0;
    if let Some(c) = category {
        suffix_width += 4 + display_width(&c.name);
    }
    if let Some(d) = &date {
        suffix_width += 2 + display_width(d);
    }
    let prefix_width = 4 + display_width(checkbox) + badge.len();
    let title_width = width.saturating_sub(prefix_width + suffix_width);

    let mut spans = vec![
        Span::raw("    "),
        Span::styled(checkbox, title_style),
        Span::styled(badge, app.style(priority_role(task.priority))),
        Span::styled(truncate_to_width(&task.title, title_width), title_style),
    ];
    if let Some(c) = category {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("● {}", c.name),
            Style::default()
                .fg(category_color(c.color))
                .add_modifier(Modifier::DIM),
        ));
    }
    if let Some(d) = date {
        spans.push(Span::styled(format!("  {}", d), app.style("task_date")));
    }
    Line::from(spans)
}
