//! Text helpers shared by the board model and the terminal UI.

mod text;

pub use text::{display_width, sanitize_single_line, truncate_to_width};
