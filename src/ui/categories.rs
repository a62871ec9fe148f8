use crate::app::{App, Focus};
use crate::keybindings::{Action, Context};
use crate::theme::category_color;
use crate::util::{display_width, truncate_to_width};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Space between chips.
const CHIP_GAP: &str = "   ";

/// Render the category strip as a row of colored chips.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let is_focused = app.focus == Focus::Categories;
    let border_style = if is_focused {
        app.style("panel_border_focused")
    } else {
        app.style("panel_border")
    };
    let title = if is_focused && app.pending_move.is_some() {
        " Categories (Enter moves the task here) "
    } else {
        " Categories "
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title);

    let categories = app.board.categories().as_slice();
    if categories.is_empty() {
        let key = app
            .keybindings
            .key_label(Action::AddCategory, Context::Global)
            .unwrap_or_else(|| "A".to_string());
        let hint = format!("No categories yet. Press {} to add one.", key);
        let paragraph = Paragraph::new(hint)
            .style(app.style("empty_message"))
            .block(block);
        f.render_widget(paragraph, area);
        return;
    }

    let inner_width = usize::from(area.width.saturating_sub(2));
    let chip_width = |name: &str| 2 + display_width(name) + display_width(CHIP_GAP);

    // Scroll so the selected chip stays visible.
    let selected = app.selected_category.min(categories.len() - 1);
    let mut first = 0;
    while first < selected
        && categories[first..=selected]
            .iter()
            .map(|c| chip_width(&c.name))
            .sum::<usize>()
            > inner_width
    {
        first += 1;
    }

    let mut spans = Vec::with_capacity((categories.len() - first) * 3);
    for (i, category) in categories.iter().enumerate().skip(first) {
        let name_style = if i == selected && is_focused {
            app.style("task_selected")
        } else {
            app.style("task_normal")
        };
        spans.push(Span::styled(
            "● ",
            Style::default().fg(category_color(category.color)),
        ));
        spans.push(Span::styled(
            truncate_to_width(&category.name, inner_width.saturating_sub(2)).into_owned(),
            name_style,
        ));
        spans.push(Span::raw(CHIP_GAP));
    }

    f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}
