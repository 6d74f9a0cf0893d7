pub mod app;
pub mod config;
pub mod prefs;
pub mod render;
pub mod terminal;
pub mod visual;
