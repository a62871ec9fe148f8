//! Terminal task board: categories, priority buckets and a weekly summary
//! of finished work, persisted to a local SQLite file.

pub mod app;
pub mod board;
pub mod clipboard;
pub mod config;
pub mod keybindings;
pub mod preferences;
pub mod storage;
pub mod theme;
pub mod ui;
pub mod util;
