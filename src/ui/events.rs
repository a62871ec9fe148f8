//! Application event handling.
//!
//! Background tasks report back through `AppEvent`; the only one today is
//! the initial board load.

use crate::app::{App, AppEvent};

pub(super) fn handle_app_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::BoardLoaded(loaded) => app.apply_loaded(loaded),
        AppEvent::LoadFailed(error) => app.load_failed(error),
    }
    app.needs_redraw = true;
}
