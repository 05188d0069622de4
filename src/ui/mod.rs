//! Terminal User Interface module.
//!
//! This module provides the TUI for the random picker, including:
//! - Main event loop (`run`)
//! - Input handling for picker, lists, and history views
//! - Rendering for the collection, search dropdown, and reveal screen
//! - Background task event processing
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `events` - Background task event processing
//! - `render` - View rendering dispatch and overlays
//! - `wheel` - Picker view widgets (collection, search, spin/reveal)
//! - `lists` - Saved lists view widget
//! - `history` - Pick history view widget
//! - `status` - Status bar widget
//! - `help` - Help overlay widget

// Submodules for UI components
mod events;
mod help;
mod history;
mod input;
mod lists;
mod loop_runner;
mod render;
mod status;
mod wheel;

// Re-export the public API
pub use loop_runner::{run, Action};
