use std::fmt;
use std::time::Duration;

use serde::Serialize;

/// How long a presenter keeps a notice on screen.
pub const NOTICE_DURATION: Duration = Duration::from_millis(2200);

/// Short user-facing messages raised by form events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    Downloaded { filename: String },
    Cleared,
    SelectionLimit { limit: usize },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Downloaded { filename } => write!(f, "Downloaded: {filename}"),
            Notice::Cleared => f.write_str("Form cleared."),
            Notice::SelectionLimit { limit } => write!(f, "Select up to {limit} options."),
        }
    }
}
