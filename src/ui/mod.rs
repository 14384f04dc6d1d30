pub mod components;
pub mod render;
pub mod shortcuts;
pub mod tui;
