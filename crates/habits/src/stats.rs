//! Habit statistics
//!
//! Derived from a habit's log and a reference "today":
//! - Total completed days
//! - Current and longest streak
//! - Completion rate over a recent window

use chrono::{Duration, NaiveDate};

use crate::date::{key_for, parse_date_key};
use crate::habit::{Habit, HabitId};
use crate::store::HabitStore;

/// Statistics for one habit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HabitStats {
    pub id: HabitId,
    /// Days logged as completed, all time
    pub total_completions: u32,
    pub completed_today: bool,
    /// Consecutive completed days ending today, or yesterday while today is
    /// still open
    pub current_streak: u32,
    pub longest_streak: u32,
    /// Completed days in the window as percentage (0-100)
    pub completion_rate: u32,
    /// Window size in days
    pub window_days: u32,
}

impl HabitStats {
    /// Calculate statistics for a habit as of `today`
    pub fn for_habit(habit: &Habit, today: NaiveDate, window_days: u32) -> Self {
        let done_on = |date: NaiveDate| habit.is_done(&key_for(date));

        let completed_today = done_on(today);
        let mut cursor = if completed_today {
            Some(today)
        } else {
            today.pred_opt()
        };
        let mut current_streak = 0;
        while let Some(date) = cursor.filter(|d| done_on(*d)) {
            current_streak += 1;
            cursor = date.pred_opt();
        }

        let completed_in_window = completed_between(habit, window_start(today, window_days), today);
        let completion_rate = if window_days > 0 {
            (completed_in_window * 100 / u64::from(window_days)) as u32
        } else {
            0
        };

        Self {
            id: habit.id,
            total_completions: habit.completed_days() as u32,
            completed_today,
            current_streak,
            longest_streak: longest_streak(habit),
            completion_rate,
            window_days,
        }
    }
}

/// First day of a `days`-long window ending on `today`, clamped to the
/// earliest representable date
fn window_start(today: NaiveDate, days: u32) -> NaiveDate {
    let back = i64::from(days.saturating_sub(1));
    today
        .checked_sub_signed(Duration::days(back))
        .unwrap_or(NaiveDate::MIN)
}

/// Completed days in `from..=to`, counting only well-formed date keys
fn completed_between(habit: &Habit, from: NaiveDate, to: NaiveDate) -> u64 {
    habit
        .logs
        .iter()
        .filter(|(_, done)| **done)
        .filter_map(|(key, _)| parse_date_key(key).ok().filter(|d| key_for(*d) == *key))
        .filter(|date| (from..=to).contains(date))
        .count() as u64
}

/// Longest run of consecutive completed days anywhere in the log
pub fn longest_streak(habit: &Habit) -> u32 {
    let mut dates: Vec<NaiveDate> = habit
        .logs
        .iter()
        .filter(|(_, done)| **done)
        .filter_map(|(key, _)| parse_date_key(key).ok())
        .collect();
    dates.sort();

    let mut longest = 0;
    let mut run = 0;
    let mut prev: Option<NaiveDate> = None;
    for date in dates {
        run = match prev {
            Some(p) if date - p == Duration::days(1) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        prev = Some(date);
    }
    longest
}

/// Completion flags for the last `days` days, oldest first
pub fn recent_days(habit: &Habit, today: NaiveDate, days: u32) -> Vec<bool> {
    if days == 0 {
        return Vec::new();
    }
    window_start(today, days)
        .iter_days()
        .take_while(|date| *date <= today)
        .map(|date| habit.is_done(&key_for(date)))
        .collect()
}

/// Statistics across all active habits
#[derive(Debug, Clone, Default)]
pub struct StoreSummary {
    pub habits: Vec<HabitStats>,
    /// Active habits completed today
    pub done_today: u32,
    pub active: u32,
    pub archived: u32,
}

impl StoreSummary {
    pub fn from_store(store: &HabitStore, today: NaiveDate, window_days: u32) -> Self {
        let habits: Vec<HabitStats> = store
            .active
            .iter()
            .map(|h| HabitStats::for_habit(h, today, window_days))
            .collect();
        let done_today = habits.iter().filter(|s| s.completed_today).count() as u32;

        Self {
            habits,
            done_today,
            active: store.active.len() as u32,
            archived: store.inactive.len() as u32,
        }
    }

    /// Share of active habits done today as percentage (0-100)
    pub fn today_percent(&self) -> u32 {
        if self.active == 0 {
            return 0;
        }
        (self.done_today * 100) / self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        parse_date_key(s).unwrap()
    }

    fn habit_with(days: &[&str]) -> Habit {
        let mut habit = Habit::new(1, "Read", "📚", 1);
        for d in days {
            habit.logs.insert(d.to_string(), true);
        }
        habit
    }

    #[test]
    fn test_empty_log() {
        let stats = HabitStats::for_habit(&habit_with(&[]), day("2024-05-10"), 7);
        assert_eq!(stats.total_completions, 0);
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.longest_streak, 0);
        assert_eq!(stats.completion_rate, 0);
        assert!(!stats.completed_today);
    }

    #[test]
    fn test_current_streak_including_today() {
        let habit = habit_with(&["2024-05-08", "2024-05-09", "2024-05-10"]);
        let stats = HabitStats::for_habit(&habit, day("2024-05-10"), 7);
        assert!(stats.completed_today);
        assert_eq!(stats.current_streak, 3);
    }

    #[test]
    fn test_current_streak_survives_open_today() {
        let habit = habit_with(&["2024-05-08", "2024-05-09"]);
        let stats = HabitStats::for_habit(&habit, day("2024-05-10"), 7);
        assert!(!stats.completed_today);
        assert_eq!(stats.current_streak, 2);
    }

    #[test]
    fn test_current_streak_broken() {
        let habit = habit_with(&["2024-05-07", "2024-05-08"]);
        let stats = HabitStats::for_habit(&habit, day("2024-05-10"), 7);
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.longest_streak, 2);
    }

    #[test]
    fn test_false_entries_break_streaks() {
        let mut habit = habit_with(&["2024-05-08", "2024-05-10"]);
        habit.logs.insert("2024-05-09".to_string(), false);
        let stats = HabitStats::for_habit(&habit, day("2024-05-10"), 7);
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.longest_streak, 1);
        assert_eq!(stats.total_completions, 2);
    }

    #[test]
    fn test_longest_streak_across_month_boundary() {
        let habit = habit_with(&[
            "2024-01-30",
            "2024-01-31",
            "2024-02-01",
            "2024-02-02",
            "2024-02-10",
            "2024-02-11",
        ]);
        assert_eq!(longest_streak(&habit), 4);
    }

    #[test]
    fn test_unparseable_keys_ignored() {
        let habit = habit_with(&["garbage", "2024-05-10"]);
        assert_eq!(longest_streak(&habit), 1);
    }

    #[test]
    fn test_completion_rate_window() {
        let habit = habit_with(&["2024-05-10", "2024-05-09", "2024-05-01"]);
        let stats = HabitStats::for_habit(&habit, day("2024-05-10"), 4);
        assert_eq!(stats.completion_rate, 50);
        let stats = HabitStats::for_habit(&habit, day("2024-05-10"), 0);
        assert_eq!(stats.completion_rate, 0);
    }

    #[test]
    fn test_huge_window_is_bounded() {
        let habit = habit_with(&["2024-05-10", "2024-05-09", "1999-12-31"]);
        let stats = HabitStats::for_habit(&habit, day("2024-05-10"), u32::MAX);
        assert_eq!(stats.window_days, u32::MAX);
        assert_eq!(stats.completion_rate, 0);
        assert_eq!(stats.current_streak, 2);
    }

    #[test]
    fn test_window_at_earliest_date() {
        let habit = habit_with(&[]);
        let stats = HabitStats::for_habit(&habit, NaiveDate::MIN, 30);
        assert_eq!(stats.current_streak, 0);
        assert_eq!(recent_days(&habit, NaiveDate::MIN, 3), vec![false]);
        assert!(recent_days(&habit, day("2024-05-10"), 0).is_empty());
    }

    #[test]
    fn test_recent_days_oldest_first() {
        let habit = habit_with(&["2024-05-08", "2024-05-10"]);
        assert_eq!(recent_days(&habit, day("2024-05-10"), 3), vec![true, false, true]);
    }

    #[test]
    fn test_store_summary() {
        let mut store = HabitStore::with_defaults();
        store.toggle_log(1, "2024-05-10");
        store.toggle_log(2, "2024-05-10");
        store.archive_habit(4);

        let summary = StoreSummary::from_store(&store, day("2024-05-10"), 7);
        assert_eq!(summary.active, 3);
        assert_eq!(summary.archived, 1);
        assert_eq!(summary.done_today, 2);
        assert_eq!(summary.today_percent(), 66);
        assert_eq!(summary.habits.len(), 3);
    }
}
