use std::fmt::Display;
use std::time::Duration;

use chrono::{DateTime, Local, TimeZone};

/// How often the displayed time and placement are refreshed.
pub const TICK_INTERVAL: Duration = Duration::from_millis(250);

/// 24-hour `HH:MM:SS`.
pub const TIME_FORMAT: &str = "%H:%M:%S";

pub fn format_time<Tz>(time: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    time.format(TIME_FORMAT).to_string()
}

pub fn now_text() -> String {
    format_time(&Local::now())
}
