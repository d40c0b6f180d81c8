//! Month calendar for a habit
//!
//! Weeks start on Sunday. Future days are marked so callers can refuse to
//! toggle them.

use chrono::{Datelike, NaiveDate};

use crate::date::key_for;
use crate::habit::Habit;

/// One day of the month grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCell {
    /// Day of month, 1-based
    pub day: u32,
    pub key: String,
    pub completed: bool,
    pub is_today: bool,
    pub is_future: bool,
}

/// A month of a habit's log
#[derive(Debug, Clone)]
pub struct MonthView {
    pub year: i32,
    pub month: u32,
    /// Empty cells before the 1st (Sunday = 0)
    pub leading_blanks: u32,
    pub days: Vec<DayCell>,
}

/// Number of days in a month
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(31)
}

impl MonthView {
    /// Build the grid for `year`/`month` (1-12). Returns `None` for an
    /// invalid month.
    pub fn build(habit: &Habit, year: i32, month: u32, today: NaiveDate) -> Option<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;

        let days = (1..=days_in_month(year, month))
            .filter_map(|day| NaiveDate::from_ymd_opt(year, month, day))
            .map(|date| {
                let key = key_for(date);
                DayCell {
                    day: date.day(),
                    completed: habit.is_done(&key),
                    is_today: date == today,
                    is_future: date > today,
                    key,
                }
            })
            .collect();

        Some(Self {
            year,
            month,
            leading_blanks: first.weekday().num_days_from_sunday(),
            days,
        })
    }

    /// (year, month) before this one
    pub fn prev(&self) -> (i32, u32) {
        if self.month == 1 {
            (self.year - 1, 12)
        } else {
            (self.year, self.month - 1)
        }
    }

    /// (year, month) after this one
    pub fn next(&self) -> (i32, u32) {
        if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        }
    }

    /// Completed days in this month
    pub fn completed(&self) -> usize {
        self.days.iter().filter(|d| d.completed).count()
    }

    /// Rows of 7 cells, `None` for padding
    pub fn weeks(&self) -> Vec<Vec<Option<&DayCell>>> {
        let mut cells: Vec<Option<&DayCell>> = (0..self.leading_blanks).map(|_| None).collect();
        cells.extend(self.days.iter().map(Some));
        while cells.len() % 7 != 0 {
            cells.push(None);
        }
        cells.chunks(7).map(|row| row.to_vec()).collect()
    }

    /// Month name, e.g. "January"
    pub fn month_name(&self) -> String {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map(|d| d.format("%B").to_string())
            .unwrap_or_default()
    }
}
