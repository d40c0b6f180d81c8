//! Habit store
//!
//! The store holds two lists: `active` habits, shown and ordered by
//! priority, and `inactive` (archived) habits kept for their history.
//! Invariants maintained by every transition:
//! - ids are unique across both lists
//! - `active` priorities are exactly 1..=n in list order
//! - `inactive` holds exactly the habits with `archived = true`
//!
//! Only `set_active_habits` (and `archive_habit`, for the habits left behind)
//! renumbers priorities; every other mutator keeps relative order.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

use crate::habit::{default_habits, Habit, HabitId, HabitPatch, NewHabit};

/// Store invariant violations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Duplicate habit id: {0}")]
    DuplicateId(HabitId),

    #[error("Active habit {id} has priority {found}, expected {expected}")]
    PriorityOutOfOrder { id: HabitId, expected: u32, found: u32 },

    #[error("Archived habit {0} is in the active list")]
    ArchivedInActive(HabitId),

    #[error("Habit {0} is in the archived list but not flagged archived")]
    NotArchivedInInactive(HabitId),
}

/// All habits, active and archived
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitStore {
    pub active: Vec<Habit>,
    #[serde(default)]
    pub inactive: Vec<Habit>,
}

/// New contents for the active list
pub enum ActiveUpdate {
    /// Use this list
    Replace(Vec<Habit>),
    /// Compute the list from the current one
    With(Box<dyn FnOnce(Vec<Habit>) -> Vec<Habit>>),
}

impl fmt::Debug for ActiveUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActiveUpdate::Replace(habits) => f.debug_tuple("Replace").field(habits).finish(),
            ActiveUpdate::With(_) => f.write_str("With(..)"),
        }
    }
}

/// A store transition
#[derive(Debug)]
pub enum Action {
    SetActiveHabits(ActiveUpdate),
    AddNewHabits(Vec<NewHabit>),
    UpdateHabit { id: HabitId, patch: HabitPatch },
    ArchiveHabit(HabitId),
    ResumeHabit(HabitId),
    ToggleLog { id: HabitId, date: String },
    /// Move the active habit at `from` to position `to` (0-based)
    MoveHabit { from: usize, to: usize },
    Replace(HabitStore),
}

impl HabitStore {
    /// Store with the seed habits
    pub fn with_defaults() -> Self {
        Self {
            active: default_habits(),
            inactive: Vec::new(),
        }
    }

    /// Apply an action and return the resulting store
    pub fn reduce(mut self, action: Action) -> Self {
        match action {
            Action::SetActiveHabits(ActiveUpdate::Replace(next)) => self.set_active_habits(next),
            Action::SetActiveHabits(ActiveUpdate::With(f)) => self.set_active_habits_with(f),
            Action::AddNewHabits(habits) => self.add_new_habits(habits),
            Action::UpdateHabit { id, patch } => {
                self.update_habit(id, &patch);
            }
            Action::ArchiveHabit(id) => {
                self.archive_habit(id);
            }
            Action::ResumeHabit(id) => {
                self.resume_habit(id);
            }
            Action::ToggleLog { id, date } => {
                self.toggle_log(id, &date);
            }
            Action::MoveHabit { from, to } => {
                self.move_habit(from, to);
            }
            Action::Replace(store) => return store,
        }
        self
    }

    /// Replace the active list: archived habits are dropped and priorities
    /// renumbered from 1 in list order. `inactive` is untouched.
    pub fn set_active_habits(&mut self, next: Vec<Habit>) {
        self.active = next
            .into_iter()
            .filter(|h| !h.archived)
            .enumerate()
            .map(|(idx, mut h)| {
                h.priority = idx as u32 + 1;
                h
            })
            .collect();
    }

    /// Compute the new active list from the current one
    pub fn set_active_habits_with<F>(&mut self, f: F)
    where
        F: FnOnce(Vec<Habit>) -> Vec<Habit>,
    {
        let prev = std::mem::take(&mut self.active);
        self.set_active_habits(f(prev));
    }

    /// Append habits with empty logs. Priorities are taken as given; an
    /// `archived` flag on a new habit is ignored.
    pub fn add_new_habits(&mut self, habits: Vec<NewHabit>) {
        self.active.extend(habits.into_iter().map(|new| Habit {
            archived: false,
            ..Habit::from(new)
        }));
    }

    /// Patch the habit with this id in whichever list holds it.
    /// Returns false when no habit matched.
    pub fn update_habit(&mut self, id: HabitId, patch: &HabitPatch) -> bool {
        let mut found = false;
        for habit in self.active.iter_mut().chain(self.inactive.iter_mut()) {
            if habit.id == id {
                habit.apply(patch);
                found = true;
            }
        }
        found
    }

    /// Move an active habit to the end of the archived list
    pub fn archive_habit(&mut self, id: HabitId) -> bool {
        let Some(pos) = self.active.iter().position(|h| h.id == id) else {
            return false;
        };

        let mut habit = self.active.remove(pos);
        habit.archived = true;

        let remaining = std::mem::take(&mut self.active);
        self.set_active_habits(remaining);
        self.inactive.push(habit);
        true
    }

    /// Bring an archived habit back to the end of the active list
    pub fn resume_habit(&mut self, id: HabitId) -> bool {
        let Some(pos) = self.inactive.iter().position(|h| h.id == id) else {
            return false;
        };

        let mut habit = self.inactive.remove(pos);
        habit.archived = false;
        habit.priority = self.next_priority();
        self.active.push(habit);
        true
    }

    /// Flip the completion flag for a date. Archived habits are frozen.
    /// Returns the new value, or `None` if nothing was toggled.
    pub fn toggle_log(&mut self, id: HabitId, date: &str) -> Option<bool> {
        let habit = self.active.iter_mut().find(|h| h.id == id && !h.archived)?;
        let next = !habit.is_done(date);
        habit.logs.insert(date.to_string(), next);
        Some(next)
    }

    /// Reorder: remove the active habit at `from` and insert it at `to`
    pub fn move_habit(&mut self, from: usize, to: usize) -> bool {
        let len = self.active.len();
        if from >= len || to >= len {
            return false;
        }
        if from == to {
            return true;
        }
        self.set_active_habits_with(|mut habits| {
            let habit = habits.remove(from);
            habits.insert(to, habit);
            habits
        });
        true
    }

    /// Priority for a habit appended to the active list
    pub fn next_priority(&self) -> u32 {
        self.active.len() as u32 + 1
    }

    /// Look a habit up in either list
    pub fn get(&self, id: HabitId) -> Option<&Habit> {
        self.active
            .iter()
            .chain(self.inactive.iter())
            .find(|h| h.id == id)
    }

    /// Position of an active habit
    pub fn active_position(&self, id: HabitId) -> Option<usize> {
        self.active.iter().position(|h| h.id == id)
    }

    pub fn contains(&self, id: HabitId) -> bool {
        self.get(id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.inactive.is_empty()
    }

    /// Repair a store read from outside: archived habits move out of the
    /// active list, inactive habits are flagged archived, active priorities
    /// are renumbered.
    pub fn normalized(self) -> Self {
        let (still_active, newly_archived): (Vec<Habit>, Vec<Habit>) =
            self.active.into_iter().partition(|h| !h.archived);

        let mut store = HabitStore {
            active: Vec::new(),
            inactive: self.inactive,
        };
        store.inactive.extend(newly_archived);
        for habit in &mut store.inactive {
            habit.archived = true;
        }
        store.set_active_habits(still_active);
        store
    }

    /// Check every store invariant
    pub fn check_invariants(&self) -> Result<(), StoreError> {
        let mut seen = HashSet::new();
        for habit in self.active.iter().chain(self.inactive.iter()) {
            if !seen.insert(habit.id) {
                return Err(StoreError::DuplicateId(habit.id));
            }
        }

        for (idx, habit) in self.active.iter().enumerate() {
            if habit.archived {
                return Err(StoreError::ArchivedInActive(habit.id));
            }
            let expected = idx as u32 + 1;
            if habit.priority != expected {
                return Err(StoreError::PriorityOutOfOrder {
                    id: habit.id,
                    expected,
                    found: habit.priority,
                });
            }
        }

        if let Some(habit) = self.inactive.iter().find(|h| !h.archived) {
            return Err(StoreError::NotArchivedInInactive(habit.id));
        }

        Ok(())
    }
}
