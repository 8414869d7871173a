//! Human-readable labels for headline dates and fetch ages.

use chrono::{DateTime, NaiveDate, Utc};

/// `"2nd Jan (Today)"`, `"1st Jan (Yesterday)"`, `"3rd Dec (30 days ago)"`.
///
/// `date` is `yyyymmdd`; anything unparseable is returned unchanged.
pub fn date_distance_from_today(date: &str, today: NaiveDate) -> String {
    let Ok(parsed) = NaiveDate::parse_from_str(date, "%Y%m%d") else {
        return date.to_string();
    };

    let day_and_month = format!(
        "{}{} {}",
        parsed.format("%-d"),
        ordinal_suffix(parsed),
        parsed.format("%b")
    );
    let days_ago = (today - parsed).num_days();
    match days_ago {
        0 => format!("{day_and_month} (Today)"),
        1 => format!("{day_and_month} (Yesterday)"),
        n => format!("{day_and_month} ({n} days ago)"),
    }
}

fn ordinal_suffix(date: NaiveDate) -> &'static str {
    use chrono::Datelike;

    let day = date.day();
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

/// Distance since the last successful fetch, `None` if there never was one.
pub fn time_since_last_fetch(
    last_fetch: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<String> {
    last_fetch.map(|at| {
        let seconds = now.signed_duration_since(at).num_seconds().abs();
        format_distance(seconds)
    })
}

/// Coarse distance in words, rounding to the nearest minute.
///
/// Buckets follow date-fns `formatDistance`, with months counted as 30 days.
pub fn format_distance(seconds: i64) -> String {
    const HOUR: i64 = 60;
    const DAY: i64 = 24 * HOUR;
    const MONTH: i64 = 30 * DAY;

    let minutes = (seconds as f64 / 60.0).round() as i64;
    let rounded = |unit: i64| (minutes as f64 / unit as f64).round() as i64;

    match minutes {
        0 => "less than a minute".to_string(),
        1 => "1 minute".to_string(),
        m if m < 45 => format!("{m} minutes"),
        m if m < 90 => "about 1 hour".to_string(),
        m if m < DAY => format!("about {} hours", rounded(HOUR)),
        m if m < 42 * HOUR => "1 day".to_string(),
        m if m < MONTH => format!("{} days", rounded(DAY)),
        m if m < 2 * MONTH => match rounded(MONTH) {
            1 => "about 1 month".to_string(),
            months => format!("about {months} months"),
        },
        m if m / MONTH < 12 => format!("{} months", rounded(MONTH)),
        m => {
            let months = m / MONTH;
            let (years, remainder) = (months / 12, months % 12);
            let (qualifier, years) = match remainder {
                0..=2 => ("about", years),
                3..=8 => ("over", years),
                _ => ("almost", years + 1),
            };
            let unit = if years == 1 { "year" } else { "years" };
            format!("{qualifier} {years} {unit}")
        }
    }
}
