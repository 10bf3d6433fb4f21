//! Terminal UI for launching cloud clusters

pub mod action;
pub mod app;
pub mod components;
pub mod tui;

pub use app::App;
