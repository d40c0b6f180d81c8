//! Habit types
//!
//! A habit is a small daily activity with a per-date completion log. Logs are
//! keyed by local calendar date (`YYYY-MM-DD`); a `true` value means the habit
//! was done that day.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Habit identifier, derived from the creation timestamp in milliseconds
pub type HabitId = i64;

/// Completion log: date key -> completed
pub type Logs = BTreeMap<String, bool>;

/// A tracked habit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub id: HabitId,
    pub name: String,
    /// Emoji shown next to the name
    pub icon: String,
    /// 1-based display position among active habits
    pub priority: u32,
    #[serde(default)]
    pub logs: Logs,
    /// Retired from active tracking, history kept
    #[serde(default, skip_serializing_if = "is_false")]
    pub archived: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl Habit {
    /// Create a habit with an empty log
    pub fn new(id: HabitId, name: impl Into<String>, icon: impl Into<String>, priority: u32) -> Self {
        Self {
            id,
            name: name.into(),
            icon: icon.into(),
            priority,
            logs: Logs::new(),
            archived: false,
        }
    }

    /// Whether the habit was completed on the given date key
    pub fn is_done(&self, date_key: &str) -> bool {
        self.logs.get(date_key).copied().unwrap_or(false)
    }

    /// Number of dates logged as completed
    pub fn completed_days(&self) -> usize {
        self.logs.values().filter(|done| **done).count()
    }

    /// Apply a partial update. `id` and `archived` are never changed here.
    pub fn apply(&mut self, patch: &HabitPatch) {
        if let Some(ref name) = patch.name {
            self.name = name.clone();
        }
        if let Some(ref icon) = patch.icon {
            self.icon = icon.clone();
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(ref logs) = patch.logs {
            self.logs = logs.clone();
        }
    }
}

/// A habit about to be added: everything but the log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewHabit {
    pub id: HabitId,
    pub name: String,
    pub icon: String,
    pub priority: u32,
    #[serde(default)]
    pub archived: bool,
}

impl NewHabit {
    pub fn new(id: HabitId, name: impl Into<String>, icon: impl Into<String>, priority: u32) -> Self {
        Self {
            id,
            name: name.into(),
            icon: icon.into(),
            priority,
            archived: false,
        }
    }
}

impl From<NewHabit> for Habit {
    fn from(new: NewHabit) -> Self {
        Self {
            id: new.id,
            name: new.name,
            icon: new.icon,
            priority: new.priority,
            logs: Logs::new(),
            archived: new.archived,
        }
    }
}

/// Partial update for a habit; `None` fields are left alone
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HabitPatch {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub priority: Option<u32>,
    pub logs: Option<Logs>,
}

impl HabitPatch {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn icon(icon: impl Into<String>) -> Self {
        Self {
            icon: Some(icon.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.icon.is_none() && self.priority.is_none() && self.logs.is_none()
    }
}

/// Habits seeded on first launch
pub const DEFAULT_HABITS: [(HabitId, &str, &str); 4] = [
    (1, "Fitness", "🏋️"),
    (2, "Meditation", "🧘"),
    (3, "Wind Down for Sleep", "🌙"),
    (4, "No Sugar Drinks", "🍵"),
];

/// The seed habits with empty logs, priorities 1..n
pub fn default_habits() -> Vec<Habit> {
    DEFAULT_HABITS
        .iter()
        .enumerate()
        .map(|(idx, (id, name, icon))| Habit::new(*id, *name, *icon, idx as u32 + 1))
        .collect()
}
