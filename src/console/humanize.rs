//! Relative rendering of last-login timestamps ("3 hours ago").

use chrono::{DateTime, Utc};

pub const NEVER_LOGGED_IN: &str = "Never logged in";

const MINUTES_IN_HOUR: i64 = 60;
const MINUTES_IN_DAY: i64 = 1_440;
const MINUTES_IN_MONTH: i64 = 43_200;

/// Label for the "Last Login" column, relative to `now`.
#[must_use]
pub fn last_login_label(last_login: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    match last_login {
        Some(at) => relative_to(at, now),
        None => NEVER_LOGGED_IN.to_string(),
    }
}

/// Distance between `at` and `now` in words, with an "ago"/"in" suffix.
#[must_use]
pub fn relative_to(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - at).num_seconds();
    let distance = distance_in_words(seconds.unsigned_abs());
    if seconds >= 0 {
        format!("{distance} ago")
    } else {
        format!("in {distance}")
    }
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit}")
    } else {
        format!("{count} {unit}s")
    }
}

#[allow(clippy::cast_possible_wrap)]
fn distance_in_words(seconds: u64) -> String {
    let seconds = seconds.min(i64::MAX as u64) as i64;
    let minutes = (seconds + 30) / 60;

    if minutes == 0 {
        return "less than a minute".to_string();
    }
    if minutes < 45 {
        return plural(minutes, "minute");
    }
    if minutes < 90 {
        return "about 1 hour".to_string();
    }
    if minutes < MINUTES_IN_DAY {
        let hours = (minutes + MINUTES_IN_HOUR / 2) / MINUTES_IN_HOUR;
        return format!("about {}", plural(hours, "hour"));
    }
    if minutes < 2_520 {
        return "1 day".to_string();
    }
    if minutes < MINUTES_IN_MONTH {
        let days = (minutes + MINUTES_IN_DAY / 2) / MINUTES_IN_DAY;
        return plural(days, "day");
    }
    if minutes < 2 * MINUTES_IN_MONTH {
        return "about 1 month".to_string();
    }

    let months = (minutes + MINUTES_IN_MONTH / 2) / MINUTES_IN_MONTH;
    if months < 12 {
        return plural(months, "month");
    }

    let years = months / 12;
    match months % 12 {
        0..=2 => format!("about {}", plural(years, "year")),
        3..=8 => format!("over {}", plural(years, "year")),
        _ => format!("almost {}", plural(years + 1, "year")),
    }
}
