use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A timestamp as the backend reports it: either pre-formatted text or epoch
/// milliseconds, depending on how the backend serializes dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FireTime {
    Millis(i64),
    Text(String),
}

impl FireTime {
    pub fn display(&self) -> String {
        match self {
            FireTime::Text(s) => s.clone(),
            FireTime::Millis(ms) => match Local.timestamp_millis_opt(*ms).single() {
                Some(t) => t.format(DISPLAY_FORMAT).to_string(),
                None => ms.to_string(),
            },
        }
    }
}

impl std::fmt::Display for FireTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}

/// Renders an optional timestamp; absent values render empty.
pub fn display_opt(t: Option<&FireTime>) -> String {
    t.map(FireTime::display).unwrap_or_default()
}
