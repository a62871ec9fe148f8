use crate::app::{App, Tab};
use ratatui::{
    layout::Rect,
    text::Line,
    widgets::{Block, Borders, Tabs},
    Frame,
};

/// Render the tab bar: `Active (n)`, `Done (n)`, `Summary`.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let titles: Vec<Line> = Tab::ALL
        .iter()
        .map(|&tab| match app.tab_count(tab) {
            Some(count) => Line::from(format!("{} ({})", tab.label(), count)),
            None => Line::from(tab.label()),
        })
        .collect();
    let selected = Tab::ALL.iter().position(|&t| t == app.tab).unwrap_or(0);

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.style("panel_border"))
        .title(" taskboard ");
    if app.tab != Tab::Summary {
        block = block.title_top(Line::from(format!(" {} ", app.grouping.label())).right_aligned());
    }

    let tabs = Tabs::new(titles)
        .block(block)
        .select(selected)
        .style(app.style("tab_inactive"))
        .highlight_style(app.style("tab_active"))
        .divider(" | ");
    f.render_widget(tabs, area);
}
