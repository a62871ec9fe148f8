//! Event loop and terminal lifecycle.

use crate::app::{App, AppEvent};
use crate::storage::Database;
use anyhow::Result;
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::time::Duration;
use tokio::sync::mpsc;

use super::events::handle_app_event;
use super::input::handle_input;
use super::render::render;

/// Outcome of one key press.
pub enum Action {
    Continue,
    Quit,
}

/// Raw-mode alternate screen, restored when dropped.
struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    fn start() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(e.into());
        }
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Leave raw mode before the default hook prints a panic message.
fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        previous(info);
    }));
}

/// Resolves on SIGTERM or SIGINT. Never resolves off Unix.
#[cfg(unix)]
async fn shutdown_signal() -> Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};
    let mut term = signal(SignalKind::terminate())?;
    let mut int = signal(SignalKind::interrupt())?;
    let name = tokio::select! {
        _ = term.recv() => "SIGTERM",
        _ = int.recv() => "SIGINT",
    };
    Ok(name)
}

#[cfg(not(unix))]
async fn shutdown_signal() -> Result<&'static str> {
    std::future::pending().await
}

/// Run the TUI until the user quits or a termination signal arrives.
///
/// The board loads on a background task; its result comes back through
/// `event_rx` while the loading screen is up. A 250ms tick keeps status
/// messages expiring without input.
pub async fn run(
    app: &mut App,
    event_tx: mpsc::Sender<AppEvent>,
    mut event_rx: mpsc::Receiver<AppEvent>,
) -> Result<()> {
    install_panic_hook();
    let mut session = TerminalSession::start()?;
    let mut keys = EventStream::new();
    let mut tick = tokio::time::interval(Duration::from_millis(250));

    spawn_initial_load(app.db.clone(), event_tx);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        if app.clear_expired_status() {
            app.needs_redraw = true;
        }
        if app.needs_redraw {
            session.terminal.draw(|f| render(f, app))?;
            app.needs_redraw = false;
        }

        tokio::select! {
            biased;

            signal = &mut shutdown => {
                match signal {
                    Ok(name) => tracing::info!(signal = name, "Shutting down"),
                    Err(e) => tracing::warn!(error = %e, "Signal handler failed"),
                }
                break;
            }

            event = keys.next() => match event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    app.needs_redraw = true;
                    if let Action::Quit = handle_input(app, key.code, key.modifiers).await {
                        break;
                    }
                }
                Some(Ok(Event::Resize(..))) => app.needs_redraw = true,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::error!(error = %e, "Terminal event stream failed");
                    break;
                }
                None => break,
            },

            Some(event) = event_rx.recv() => handle_app_event(app, event),

            _ = tick.tick() => {}
        }
    }

    drop(session);
    Ok(())
}

/// Load the board off the UI task and report back as an [`AppEvent`].
fn spawn_initial_load(db: Database, event_tx: mpsc::Sender<AppEvent>) {
    tokio::spawn(async move {
        let event = match db.load_board().await {
            Ok(loaded) => AppEvent::BoardLoaded(loaded),
            Err(e) => AppEvent::LoadFailed(e.to_string()),
        };
        if event_tx.send(event).await.is_err() {
            tracing::warn!("UI exited before the board finished loading");
        }
    });
}
