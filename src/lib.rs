//! Random picker for games, movies, TV shows, and anything else.
//!
//! Core pieces:
//! - [`collection`]: the session's candidate items
//! - [`picker`]: the spin state machine (Idle, Spinning, Revealed)
//! - [`catalog`]: IGDB/TMDB search with a session query cache
//! - [`storage`]: SQLite-backed lists and pick history
//! - [`ui`]: the terminal interface

pub mod app;
pub mod catalog;
pub mod collection;
pub mod config;
pub mod picker;
pub mod storage;
pub mod ui;
pub mod util;
