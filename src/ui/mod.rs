//! Terminal User Interface module.
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `events` - Background task event processing
//! - `render` - Frame layout and overlay dispatch
//! - `tabs` - Tab bar with task counts
//! - `categories` - Category strip
//! - `tasks` - Grouped task list
//! - `summary` - Weekly summary panel
//! - `dialogs` - Add-task and add-category forms
//! - `help` - Keybinding overlay
//! - `status` - Status bar widget

mod categories;
mod dialogs;
mod events;
mod help;
mod input;
mod loop_runner;
mod render;
mod status;
mod summary;
mod tabs;
mod tasks;

// Re-export the public API
pub use loop_runner::{run, Action};
