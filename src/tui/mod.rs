//! TUI module for recorrer.
//!
//! Reusable application state and key handling live here so they can be
//! tested without a terminal. The actual terminal I/O stays in
//! `bin/route_tui.rs`.

#[cfg(feature = "tui")]
pub mod route_app;
