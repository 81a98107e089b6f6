//! Shared data structures for the application state
//!
//! These types flow between the persisted settings, the refresh
//! policy and the UI layer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Photo categories offered in the settings panel
pub const THEMES: &[&str] = &[
    "nature",
    "city",
    "architecture",
    "ocean",
    "mountains",
    "forest",
    "animals",
    "space",
    "travel",
];

/// How often the background photo is replaced
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum IntervalClass {
    Minute,
    Hour,
    Day,
}

impl IntervalClass {
    pub const ALL: [IntervalClass; 3] = [Self::Minute, Self::Hour, Self::Day];
}

impl Default for IntervalClass {
    fn default() -> Self {
        Self::Hour
    }
}

impl fmt::Display for IntervalClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Minute => "Every minute",
            Self::Hour => "Every hour",
            Self::Day => "Every day",
        };
        f.write_str(label)
    }
}

/// One of the three world clocks
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct WorldClock {
    /// Label shown above the time (e.g., "Tokyo")
    pub name: String,
    /// IANA zone name (e.g., "Asia/Tokyo")
    pub time_zone: String,
}

impl WorldClock {
    pub fn new(name: &str, time_zone: &str) -> Self {
        Self {
            name: name.to_string(),
            time_zone: time_zone.to_string(),
        }
    }
}
