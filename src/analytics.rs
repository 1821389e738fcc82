//! Completion Statistics
//!
//! Pure rollups over a task slice: per-day completion counts for a date
//! range and overall totals. Views slice the same canonical list the boards
//! render, so these take `&[Task]` and never touch the store.

use chrono::NaiveDate;

use crate::domain::Task;

/// Completions on one calendar day (UTC)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayStat {
    pub date: NaiveDate,
    pub completed: u32,
}

/// Aggregate counters over a task slice
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Totals {
    pub total: u32,
    pub completed: u32,
    pub estimated_minutes: i64,
}

/// Count completions per day over `[from, to]` inclusive.
///
/// Every day in the range is present, zero or not, so a chart can plot the
/// result directly. Tasks completed outside the range are ignored, as are
/// tasks flagged complete without a timestamp.
pub fn completed_per_day(tasks: &[Task], from: NaiveDate, to: NaiveDate) -> Vec<DayStat> {
    let mut stats: Vec<DayStat> = from
        .iter_days()
        .take_while(|day| *day <= to)
        .map(|date| DayStat { date, completed: 0 })
        .collect();
    for task in tasks {
        let Some(completed_at) = task.completed_at else {
            continue;
        };
        let day = completed_at.date_naive();
        if let Some(stat) = stats.iter_mut().find(|s| s.date == day) {
            stat.completed += 1;
        }
    }
    stats
}

/// Overall counts and estimated workload for a task slice
pub fn totals(tasks: &[Task]) -> Totals {
    let mut out = Totals::default();
    for task in tasks {
        out.total += 1;
        if task.is_completed {
            out.completed += 1;
        }
        out.estimated_minutes += task.estimated_minutes.unwrap_or(0);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn completed_on(id: &str, y: i32, m: u32, d: u32) -> Task {
        let mut task = Task::new(id, "user-1", format!("Task {}", id));
        task.is_completed = true;
        task.completed_at = Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).single();
        task
    }

    #[test]
    fn test_completed_per_day_covers_whole_range() {
        let tasks = vec![
            completed_on("A", 2024, 3, 1),
            completed_on("B", 2024, 3, 1),
            completed_on("C", 2024, 3, 3),
            completed_on("D", 2024, 4, 9),
        ];
        let from = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 3, 3).unwrap();

        let stats = completed_per_day(&tasks, from, to);
        assert_eq!(stats.len(), 3);
        assert_eq!(stats[0].completed, 2);
        assert_eq!(stats[1].completed, 0);
        assert_eq!(stats[2].completed, 1);
    }

    #[test]
    fn test_completed_without_timestamp_is_skipped() {
        let mut task = Task::new("A", "user-1", "no stamp");
        task.is_completed = true;
        let from = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

        let stats = completed_per_day(&[task], from, from);
        assert_eq!(stats[0].completed, 0);
    }

    #[test]
    fn test_totals() {
        let mut open = Task::new("A", "user-1", "open");
        open.estimated_minutes = Some(30);
        let done = completed_on("B", 2024, 3, 1);

        let out = totals(&[open, done]);
        assert_eq!(out.total, 2);
        assert_eq!(out.completed, 1);
        assert_eq!(out.estimated_minutes, 30);
    }
}
