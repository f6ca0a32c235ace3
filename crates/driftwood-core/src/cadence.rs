//! Reminder cadence: when an item is due for another text.

use jiff::civil::Date;

/// Minimum days since the previous reminder (or the send date) before the
/// reminder with this index goes out. The index is the number of reminders
/// already delivered.
pub const SCHEDULE: [(u32, i64); 3] = [(0, 0), (1, 7), (2, 5)];

/// Reminders delivered before an item is handed to a human to call.
pub const MAX_REMINDERS: u32 = 3;

/// Days after the last reminder before an item at [`MAX_REMINDERS`] lands
/// on the call list.
pub const ESCALATION_MIN_DAYS: i64 = 3;

/// Decide whether a reminder should go out now.
///
/// Counts outside the schedule never send; count 3 is the caller's
/// escalation case.
pub fn should_send_reminder(reminded_count: u32, last_reminded_distance_days: i64) -> bool {
    SCHEDULE
        .iter()
        .find(|(count, _)| *count == reminded_count)
        .is_some_and(|(_, min_days)| last_reminded_distance_days >= *min_days)
}

/// Whole days from `earlier` to `later`; negative if `later` comes first.
pub fn days_between(earlier: Date, later: Date) -> i64 {
    later
        .since(earlier)
        .map(|span| i64::from(span.get_days()))
        .unwrap_or(0)
}

/// What the orchestration should do with one tracked item this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderAction {
    /// Compose and send the reminder using this template index.
    Send { template: u32 },
    /// Put the client on the call list; no text.
    Escalate,
    Wait,
}

/// Combine the cadence schedule with the escalation rule.
pub fn next_action(reminded_count: u32, elapsed_days: i64, resolved: bool) -> ReminderAction {
    if resolved {
        return ReminderAction::Wait;
    }
    if reminded_count == MAX_REMINDERS {
        return if elapsed_days >= ESCALATION_MIN_DAYS {
            ReminderAction::Escalate
        } else {
            ReminderAction::Wait
        };
    }
    if should_send_reminder(reminded_count, elapsed_days) {
        ReminderAction::Send {
            template: reminded_count,
        }
    } else {
        ReminderAction::Wait
    }
}
