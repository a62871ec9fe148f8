use crate::app::{App, Focus, LoadState, Tab};
use crate::board::GroupingMode;
use ratatui::{layout::Rect, widgets::Paragraph, Frame};
use std::borrow::Cow;

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let text: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(&**msg)
    } else if app.load_state == LoadState::Loading {
        Cow::Borrowed("Loading...")
    } else if app.pending_move.is_some() {
        Cow::Borrowed(match app.grouping {
            GroupingMode::Category => {
                "Select a category group to move this task  [Enter] move  [Esc] cancel"
            }
            GroupingMode::Priority => {
                "Select a priority group to move this task  [Enter] move  [Esc] cancel"
            }
        })
    } else {
        Cow::Borrowed(match (app.focus, app.tab) {
            (Focus::Categories, _) => {
                "[h/l] select [A]dd category [a]dd task here [d]elete [Esc] back [?]help"
            }
            (Focus::Tasks, Tab::Summary) => "[y] copy summary [Tab] switch tab [?]help [q]uit",
            (Focus::Tasks, _) => {
                "[a]dd [space] done [p]riority [m]ove [d]elete [g]roup [c]ategories [?]help [q]uit"
            }
        })
    };

    let paragraph = Paragraph::new(text).style(app.style("status_bar"));
    f.render_widget(paragraph, area);
}
