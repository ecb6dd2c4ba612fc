//! Human-readable ages for session listings (es-ES labels).

use chrono::{DateTime, Local, Utc};

/// Describe how long ago `timestamp` was, relative to `now`.
///
/// Anything older than 30 days is shown as an absolute `d/m/yyyy` date.
pub fn format_relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - timestamp).num_seconds();
    if seconds < 60 {
        return "hace unos segundos".to_string();
    }

    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("hace {minutes} min");
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("hace {hours} {}", if hours == 1 { "hora" } else { "horas" });
    }

    let days = hours / 24;
    if days < 7 {
        return format!("hace {days} {}", if days == 1 { "día" } else { "días" });
    }
    if days < 30 {
        let weeks = days / 7;
        return format!("hace {weeks} {}", if weeks == 1 { "semana" } else { "semanas" });
    }

    timestamp.with_timezone(&Local).format("%-d/%-m/%Y").to_string()
}
