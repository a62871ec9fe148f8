//! Clipboard access for the summary export.
//!
//! The terminal clipboard is reached with an OSC 52 escape sequence. tmux
//! needs `set-clipboard on` to pass it through.

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use std::io::Write;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("terminal write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("nothing to copy")]
    Empty,
}

/// Destination for copied text.
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// Writes to the system clipboard through the terminal (OSC 52).
pub struct Osc52Clipboard<W: Write> {
    out: W,
}

impl Osc52Clipboard<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self {
            out: std::io::stdout(),
        }
    }
}

impl<W: Write> Osc52Clipboard<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Clipboard for Osc52Clipboard<W> {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        if text.is_empty() {
            return Err(ClipboardError::Empty);
        }
        // OSC 52 ; c (system clipboard) ; base64 payload, BEL terminated
        write!(self.out, "\x1b]52;c;{}\x07", B64.encode(text))?;
        self.out.flush()?;
        tracing::debug!(bytes = text.len(), "Copied to clipboard via OSC 52");
        Ok(())
    }
}

/// Keeps the last copied text in memory.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    pub contents: Option<String>,
    /// When set, every write fails with this I/O error kind.
    pub fail_with: Option<std::io::ErrorKind>,
}

impl Clipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        if let Some(kind) = self.fail_with {
            return Err(ClipboardError::Io(std::io::Error::from(kind)));
        }
        if text.is_empty() {
            return Err(ClipboardError::Empty);
        }
        self.contents = Some(text.to_owned());
        Ok(())
    }
}
