//! Add-category and add-task forms.

use crate::app::{App, CategoryForm, Dialog, FormField, TaskForm};
use crate::theme::{category_color, priority_role};
use ratatui::{
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::render::fixed_rect;

pub fn render(f: &mut Frame, app: &App, dialog: &Dialog) {
    let (title, lines) = match dialog {
        Dialog::AddCategory(form) => (" New Category ", category_lines(app, form)),
        Dialog::AddTask(form) => (" New Task ", task_lines(app, form)),
    };

    let height = u16::try_from(lines.len() + 2).unwrap_or(u16::MAX);
    let overlay = fixed_rect(60, height, f.area());
    if overlay.width < 20 || overlay.height < 5 {
        return;
    }

    f.render_widget(Clear, overlay);
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(app.style("dialog_border"))
            .title(Span::styled(title, app.style("dialog_title"))),
    );
    f.render_widget(paragraph, overlay);
}

fn category_lines<'a>(app: &App, form: &'a CategoryForm) -> Vec<Line<'a>> {
    let mut lines = vec![
        Line::from(vec![
            Span::styled("Name:  ", app.style("field_active")),
            Span::styled(form.name.as_str(), app.style("input_text")),
            Span::styled("_", app.style("input_hint")),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::raw("Color: "),
            Span::styled("■■ ", Style::default().fg(category_color(form.color))),
            Span::raw(form.color.hex()),
            Span::styled(" (randomly assigned)", app.style("input_hint")),
        ]),
    ];
    push_error(app, &mut lines, form.error.as_deref());
    lines.push(Line::from(""));
    lines.push(Line::styled(
        "(Enter) Save  (Esc) Cancel",
        app.style("input_hint"),
    ));
    lines
}

fn task_lines<'a>(app: &App, form: &'a TaskForm) -> Vec<Line<'a>> {
    let label = |field: FormField, text: &'static str| {
        if form.field == field {
            Span::styled(text, app.style("field_active"))
        } else {
            Span::raw(text)
        }
    };

    let mut title = vec![
        label(FormField::Title, "Title:    "),
        Span::styled(form.title.as_str(), app.style("input_text")),
    ];
    if form.field == FormField::Title {
        title.push(Span::styled("_", app.style("input_hint")));
    } else if form.title.is_empty() {
        title.push(Span::styled("What needs to be done?", app.style("input_hint")));
    }

    let mut category = vec![label(FormField::Category, "Category: "), Span::raw("< ")];
    match app.board.categories().as_slice().get(form.category) {
        Some(c) => {
            category.push(Span::styled("● ", Style::default().fg(category_color(c.color))));
            category.push(Span::raw(c.name.clone()));
        }
        None => category.push(Span::styled("(none)", app.style("error_text"))),
    }
    category.push(Span::raw(" >"));

    let priority = vec![
        label(FormField::Priority, "Priority: "),
        Span::raw("< "),
        Span::styled(
            form.priority.label(),
            app.style(priority_role(form.priority)),
        ),
        Span::styled(
            format!(" - {}", form.priority.description()),
            app.style("input_hint"),
        ),
        Span::raw(" >"),
    ];

    let mut lines = vec![
        Line::from(title),
        Line::from(category),
        Line::from(priority),
    ];
    push_error(app, &mut lines, form.error.as_deref());
    lines.push(Line::from(""));
    lines.push(Line::styled(
        "(Tab) Next field  (Left/Right) Change  (Enter) Add  (Esc) Cancel",
        app.style("input_hint"),
    ));
    lines
}

fn push_error<'a>(app: &App, lines: &mut Vec<Line<'a>>, error: Option<&str>) {
    if let Some(message) = error {
        lines.push(Line::from(""));
        lines.push(Line::styled(message.to_string(), app.style("error_text")));
    }
}
