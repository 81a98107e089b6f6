//! Clock display formatting
//!
//! Turns the current instant and the user's settings into the strings
//! shown on screen: local time, date, and the optional world clocks.

use chrono::{DateTime, TimeZone};
use chrono_tz::Tz;
use std::fmt::Display;

use crate::state::settings::Settings;

/// 24-hour clock, e.g. "17:05"
pub const LONG_TIME_FORMAT: &str = "%H:%M";
/// 12-hour clock, e.g. "5:05 PM"
pub const SHORT_TIME_FORMAT: &str = "%-I:%M %p";
/// Long date, e.g. "Saturday, June 1, 2024"
pub const DATE_FORMAT: &str = "%A, %B %-d, %Y";

/// Time in one of the world clock zones
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldClockReading {
    pub name: String,
    pub time: String,
}

/// Everything the clock overlay displays for one tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClockFace {
    pub time: String,
    pub date: String,
    /// Empty when world clocks are turned off
    pub world: Vec<WorldClockReading>,
}

impl ClockFace {
    pub fn compose<Z>(now: &DateTime<Z>, settings: &Settings) -> Self
    where
        Z: TimeZone,
        Z::Offset: Display,
    {
        let time_format = time_format(settings.long_time_format);

        let world = if settings.world_time {
            settings
                .clocks
                .iter()
                .map(|clock| WorldClockReading {
                    name: clock.name.clone(),
                    time: now
                        .with_timezone(&zone(&clock.time_zone))
                        .format(time_format)
                        .to_string(),
                })
                .collect()
        } else {
            Vec::new()
        };

        ClockFace {
            time: now.format(time_format).to_string(),
            date: now.format(DATE_FORMAT).to_string(),
            world,
        }
    }
}

pub fn time_format(long_time_format: bool) -> &'static str {
    if long_time_format {
        LONG_TIME_FORMAT
    } else {
        SHORT_TIME_FORMAT
    }
}

/// Resolve a zone name; settings are sanitized on load, so unknown
/// names only fall back to UTC silently here.
pub fn zone(name: &str) -> Tz {
    name.parse().unwrap_or(Tz::UTC)
}
