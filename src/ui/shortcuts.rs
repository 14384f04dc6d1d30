//! Keyboard shortcut constants for consistent documentation.

pub const NEXT_SUGGESTION: &str = "↓";
pub const PREV_SUGGESTION: &str = "↑";
pub const CHOOSE: &str = "Enter";
pub const DISMISS: &str = "Esc";
pub const CLEAR_QUERY: &str = "Ctrl+U";
pub const TAB_FOCUS: &str = "Tab";
pub const RETRY_LEADERBOARD: &str = "F5";
pub const THEME: &str = "F2";
pub const QUIT: &str = "F10/Ctrl+C";
