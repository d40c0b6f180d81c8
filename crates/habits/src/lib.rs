//! habits - Tiny daily habits, tracked locally
//!
//! "Two minutes a day, every day."
//!
//! Pick a handful of small habits, tick them off each day, and watch the
//! streaks grow:
//! - An active list ordered by priority, plus an archive that keeps history
//! - Per-day completion logs keyed by local date
//! - Streaks, completion rates and a month calendar per habit
//! - Versioned JSON backups for export and import
//!
//! Commands:
//! - list: Show today's habits
//! - toggle ID: Mark a habit done (or undone) for a day
//! - add/rename/icon/move: Manage the active list
//! - archive/resume: Retire a habit or bring it back
//! - show ID: Month calendar for one habit
//! - stats [DAYS]: Streaks and completion rates
//! - export/import/clear: Manage stored data

pub mod backup;
pub mod calendar;
pub mod date;
pub mod habit;
pub mod persist;
pub mod setup;
pub mod stats;
pub mod store;
pub mod tracker;

pub use backup::{ExportDocument, APP_VERSION};
pub use habit::{Habit, HabitId, HabitPatch, NewHabit};
pub use persist::{FileStorage, MemoryStorage, Storage};
pub use stats::HabitStats;
pub use store::{Action, ActiveUpdate, HabitStore};
pub use tracker::HabitTracker;
