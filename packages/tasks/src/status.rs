// ABOUTME: Task status derivation
// ABOUTME: Pure mapping from completion flag, due time and "now" to a display status

use chrono::{DateTime, TimeZone};

use crate::types::{Task, TaskStatus};

/// Derive the display status of a task at instant `now`.
///
/// Rules, first match wins:
/// 1. completed tasks are `completed`
/// 2. tasks without a deadline (`due_time == 0`) are `wait to be done`
/// 3. a deadline on the same calendar day as `now` is `wait to be done`, even if already passed
/// 4. a deadline before `now` is `overdue`
/// 5. anything later is `schedule`
///
/// Calendar days are evaluated in `now`'s time zone.
pub fn derive_status<Tz: TimeZone>(is_completed: bool, due_time: i64, now: &DateTime<Tz>) -> TaskStatus {
    if is_completed {
        return TaskStatus::Completed;
    }
    if due_time == 0 {
        return TaskStatus::WaitToBeDone;
    }

    let now_ms = now.timestamp_millis();
    match now.timezone().timestamp_millis_opt(due_time).single() {
        Some(due) if due.date_naive() == now.date_naive() => TaskStatus::WaitToBeDone,
        _ if due_time < now_ms => TaskStatus::Overdue,
        _ => TaskStatus::Schedule,
    }
}

impl Task {
    pub fn status_at<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> TaskStatus {
        derive_status(self.is_completed, self.due_time, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};
    use rstest::rstest;

    // 2024-06-15T10:00:00Z
    const NOW: i64 = 1_718_445_600_000;

    fn utc(ms: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(ms).unwrap()
    }

    #[rstest]
    #[case::same_day_later(1_718_492_400_000, TaskStatus::WaitToBeDone)] // 2024-06-15T23:00Z
    #[case::same_day_minutes_late(1_718_445_300_000, TaskStatus::WaitToBeDone)] // 2024-06-15T09:55Z
    #[case::same_day_start(1_718_409_660_000, TaskStatus::WaitToBeDone)] // 2024-06-15T00:01Z
    #[case::earlier_day(1_717_977_600_000, TaskStatus::Overdue)] // 2024-06-10T00:00Z
    #[case::previous_evening(1_718_409_540_000, TaskStatus::Overdue)] // 2024-06-14T23:59Z
    #[case::later_day(1_718_841_600_000, TaskStatus::Schedule)] // 2024-06-20T00:00Z
    #[case::no_deadline(0, TaskStatus::WaitToBeDone)]
    fn test_open_task_status(#[case] due_time: i64, #[case] expected: TaskStatus) {
        assert_eq!(derive_status(false, due_time, &utc(NOW)), expected);
    }

    #[rstest]
    #[case(0)]
    #[case(1_577_836_800_000)] // 2020-01-01
    #[case(NOW)]
    #[case(4_102_444_800_000)] // 2100-01-01
    fn test_completed_wins(#[case] due_time: i64) {
        assert_eq!(derive_status(true, due_time, &utc(NOW)), TaskStatus::Completed);
    }

    #[test]
    fn test_no_deadline_for_any_now() {
        for now in [0, NOW, 4_102_444_800_000] {
            assert_eq!(derive_status(false, 0, &utc(now)), TaskStatus::WaitToBeDone);
        }
    }

    #[test]
    fn test_calendar_day_not_24h_window() {
        // 2024-06-15T23:59Z is late in the same day as 00:01Z
        let now = utc(1_718_409_660_000);
        assert_eq!(
            derive_status(false, 1_718_495_940_000, &now),
            TaskStatus::WaitToBeDone
        );
        // Two minutes earlier but on the previous day
        assert_eq!(derive_status(false, 1_718_409_540_000, &now), TaskStatus::Overdue);
    }

    #[test]
    fn test_day_boundary_follows_time_zone() {
        // 2024-06-14T23:59Z is 2024-06-15T07:59 in UTC+8, same day as 10:00Z (18:00 local)
        let tz = FixedOffset::east_opt(8 * 3600).unwrap();
        let now = utc(NOW).with_timezone(&tz);
        assert_eq!(
            derive_status(false, 1_718_409_540_000, &now),
            TaskStatus::WaitToBeDone
        );
        assert_eq!(
            derive_status(false, 1_718_409_540_000, &utc(NOW)),
            TaskStatus::Overdue
        );
    }

    #[test]
    fn test_unrepresentable_due_time_still_total() {
        assert_eq!(derive_status(false, i64::MAX, &utc(NOW)), TaskStatus::Schedule);
        assert_eq!(derive_status(false, i64::MIN, &utc(NOW)), TaskStatus::Overdue);
    }

    #[test]
    fn test_uncompleting_returns_to_due_status() {
        let mut task = Task {
            id: 1,
            owner_id: 1,
            content: "file taxes".to_string(),
            priority: None,
            due_time: 1_717_977_600_000,
            is_completed: true,
            created_at: 0,
            updated_at: 0,
        };
        assert_eq!(task.status_at(&utc(NOW)), TaskStatus::Completed);

        task.is_completed = false;
        assert_eq!(task.status_at(&utc(NOW)), TaskStatus::Overdue);
    }
}
