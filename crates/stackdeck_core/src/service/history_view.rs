//! Read-only views over the history log.

use crate::model::HistoryItem;
use chrono::TimeZone;
use std::fmt::Display;

const DAY_FORMAT: &str = "%Y/%m/%d";

/// History entries of one calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyActivity {
    /// `YYYY/MM/DD` in the requested time zone.
    pub date: String,
    pub count: usize,
    /// `"<label>: <details>"` for each entry, chronological.
    pub summary: Vec<String>,
}

/// History in display order: by timestamp, ties kept in stored order.
pub fn sorted_history(history: &[HistoryItem]) -> Vec<HistoryItem> {
    let mut sorted = history.to_vec();
    sorted.sort_by_key(|item| item.timestamp);
    sorted
}

/// Groups history by calendar day in `tz`, oldest day first.
///
/// Entries whose timestamp cannot be mapped to a local time are skipped.
pub fn daily_activity<Tz>(history: &[HistoryItem], tz: &Tz) -> Vec<DailyActivity>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut days: Vec<DailyActivity> = Vec::new();
    for item in sorted_history(history) {
        let Some(local) = tz.timestamp_millis_opt(item.timestamp).single() else {
            continue;
        };
        let date = local.format(DAY_FORMAT).to_string();
        let line = format!("{}: {}", item.action_type.label(), item.details);
        match days.last_mut() {
            Some(day) if day.date == date => {
                day.count += 1;
                day.summary.push(line);
            }
            _ => days.push(DailyActivity {
                date,
                count: 1,
                summary: vec![line],
            }),
        }
    }
    days
}
