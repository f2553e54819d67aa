use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime};

use crate::models::OperationDetail;

/// Currency suffix used when none is given
const DEFAULT_CURRENCY_SUFFIX: &str = "KGS";

/// Label for operations whose timestamp is missing or unreadable
const UNKNOWN_DATE_LABEL: &str = "Unknown date";

/// Format an amount with its currency, dropping a zero fraction
pub fn format_amount(amount: f64, currency: Option<&str>) -> String {
    let currency = currency.unwrap_or(DEFAULT_CURRENCY_SUFFIX);
    if amount.fract() == 0.0 {
        format!("{:.0} {}", amount, currency)
    } else {
        format!("{:.2} {}", amount, currency)
    }
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Parse a server timestamp into local time.
/// Offset-carrying timestamps are converted; naive ones are taken as-is.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
}

/// Format a timestamp as `HH:MM`, or return it unchanged if unreadable
pub fn format_time(value: &str) -> String {
    parse_timestamp(value)
        .map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_else(|| value.to_string())
}

/// `Today`, `Yesterday`, or day and month name
pub fn day_label(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        "Today".to_string()
    } else if Some(date) == today.checked_sub_signed(Duration::days(1)) {
        "Yesterday".to_string()
    } else {
        date.format("%-d %B").to_string()
    }
}

/// Operations that share a display day
#[derive(Debug, Clone, PartialEq)]
pub struct DateGroup<'a> {
    pub label: String,
    pub operations: Vec<&'a OperationDetail>,
}

/// Group operations by day, keeping the order in which days first appear
pub fn group_by_date(operations: &[OperationDetail], today: NaiveDate) -> Vec<DateGroup<'_>> {
    let mut groups: Vec<DateGroup<'_>> = Vec::new();
    for op in operations {
        let label = op
            .created_at
            .as_deref()
            .and_then(parse_timestamp)
            .map(|dt| day_label(dt.date(), today))
            .unwrap_or_else(|| UNKNOWN_DATE_LABEL.to_string());

        match groups.iter_mut().find(|g| g.label == label) {
            Some(group) => group.operations.push(op),
            None => groups.push(DateGroup {
                label,
                operations: vec![op],
            }),
        }
    }
    groups
}
