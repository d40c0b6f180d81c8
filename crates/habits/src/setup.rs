//! First-run habit selection
//!
//! The user picks up to `max` suggestions; the order they pick them in
//! becomes the priority order.

use thiserror::Error;

use crate::habit::{HabitId, NewHabit};

/// Suggested habits: (name, icon)
pub const SUGGESTIONS: &[(&str, &str)] = &[
    ("Fitness", "🏋️"),
    ("Meditation", "🧘"),
    ("Wind Down for Sleep", "🌙"),
    ("No Sugar Drinks", "🍵"),
    ("Read 2 Pages", "📚"),
    ("Drink Water", "💧"),
    ("Journal", "📝"),
    ("Stretch", "🤸"),
    ("Walk Outside", "🚶"),
    ("Floss", "🦷"),
    ("Tidy Up", "🧹"),
    ("Call a Friend", "📞"),
];

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SetupError {
    #[error("Please select at least one habit")]
    Empty,

    #[error("Choose up to {max} habits ({selected} selected)")]
    TooMany { max: usize, selected: usize },

    #[error("No suggestion numbered {0}")]
    UnknownSuggestion(usize),
}

/// Turn a selection of suggestion indices (0-based, in pick order) into new
/// habits. Repeated indices count once. Ids are `now_millis + position`.
pub fn build_selection(
    indices: &[usize],
    max: usize,
    now_millis: HabitId,
) -> Result<Vec<NewHabit>, SetupError> {
    let mut picked: Vec<usize> = Vec::new();
    for &idx in indices {
        if idx >= SUGGESTIONS.len() {
            return Err(SetupError::UnknownSuggestion(idx));
        }
        if !picked.contains(&idx) {
            picked.push(idx);
        }
    }

    if picked.is_empty() {
        return Err(SetupError::Empty);
    }
    if picked.len() > max {
        return Err(SetupError::TooMany {
            max,
            selected: picked.len(),
        });
    }

    Ok(picked
        .iter()
        .enumerate()
        .map(|(pos, &idx)| {
            let (name, icon) = SUGGESTIONS[idx];
            NewHabit::new(now_millis + pos as HabitId, name, icon, pos as u32 + 1)
        })
        .collect())
}
