//! Habit tracker state container
//!
//! Owns the in-memory store together with its storage backend. Every
//! mutation goes through here and is written back immediately.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, TimeZone};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::backup::{self, BackupError, APP_VERSION};
use crate::habit::{Habit, HabitId, HabitPatch, NewHabit};
use crate::persist::{self, Storage};
use crate::store::{Action, ActiveUpdate, HabitStore};

/// What an import did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    /// Store replaced
    Replaced { active: usize, inactive: usize },
    /// Backup is valid but was not confirmed; nothing changed
    NeedsConfirmation { active: usize, inactive: usize },
}

pub struct HabitTracker<S: Storage> {
    store: HabitStore,
    storage: S,
}

impl<S: Storage> HabitTracker<S> {
    /// Load the persisted store (or the seed habits) from `storage`
    pub fn open(storage: S) -> Self {
        let store = persist::load_store(&storage);
        Self { store, storage }
    }

    pub fn store(&self) -> &HabitStore {
        &self.store
    }

    pub fn active(&self) -> &[Habit] {
        &self.store.active
    }

    pub fn archived(&self) -> &[Habit] {
        &self.store.inactive
    }

    pub fn get(&self, id: HabitId) -> Option<&Habit> {
        self.store.get(id)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Apply an action and persist the result
    pub fn dispatch(&mut self, action: Action) {
        let store = std::mem::take(&mut self.store);
        self.store = store.reduce(action);
        self.persist();
    }

    fn persist(&mut self) {
        persist::save_store(&mut self.storage, &self.store);
    }

    fn persist_if(&mut self, changed: bool) -> bool {
        if changed {
            self.persist();
        }
        changed
    }

    pub fn set_active_habits(&mut self, next: Vec<Habit>) {
        self.dispatch(Action::SetActiveHabits(ActiveUpdate::Replace(next)));
    }

    pub fn add_new_habits(&mut self, habits: Vec<NewHabit>) {
        self.dispatch(Action::AddNewHabits(habits));
    }

    /// Add one habit at the end of the active list. The id comes from the
    /// creation time in milliseconds, bumped past any id already taken.
    pub fn add_habit<Tz: TimeZone>(&mut self, name: &str, icon: &str, now: &DateTime<Tz>) -> HabitId {
        let mut id = now.timestamp_millis();
        while self.store.contains(id) {
            id += 1;
        }

        let priority = self.store.next_priority();
        self.add_new_habits(vec![NewHabit::new(id, name, icon, priority)]);
        info!(id, habit = name, "added habit");
        id
    }

    /// Replace the active habits with an onboarding selection. Ids that
    /// clash with an archived habit are bumped.
    pub fn complete_setup(&mut self, selection: Vec<NewHabit>) {
        let mut taken: Vec<HabitId> = self.store.inactive.iter().map(|h| h.id).collect();
        let habits = selection
            .into_iter()
            .map(|new| {
                let mut habit = Habit::from(new);
                while taken.contains(&habit.id) {
                    habit.id += 1;
                }
                taken.push(habit.id);
                habit
            })
            .collect();
        self.set_active_habits(habits);
    }

    pub fn update_habit(&mut self, id: HabitId, patch: &HabitPatch) -> bool {
        let changed = self.store.update_habit(id, patch);
        self.persist_if(changed)
    }

    pub fn archive_habit(&mut self, id: HabitId) -> bool {
        let changed = self.store.archive_habit(id);
        self.persist_if(changed)
    }

    pub fn resume_habit(&mut self, id: HabitId) -> bool {
        let changed = self.store.resume_habit(id);
        self.persist_if(changed)
    }

    /// Toggle a day; returns the new value, `None` if nothing changed
    pub fn toggle_log(&mut self, id: HabitId, date: &str) -> Option<bool> {
        let next = self.store.toggle_log(id, date);
        self.persist_if(next.is_some());
        next
    }

    /// Move the habit with this id to a 0-based position in the active list
    pub fn move_habit(&mut self, id: HabitId, to: usize) -> bool {
        let Some(from) = self.store.active_position(id) else {
            return false;
        };
        let changed = self.store.move_habit(from, to);
        self.persist_if(changed)
    }

    pub fn replace_store(&mut self, store: HabitStore) {
        self.dispatch(Action::Replace(store));
    }

    /// Validate a backup and, if `confirmed`, swap it in as the whole store.
    /// On error the store is untouched.
    pub fn import_backup(&mut self, text: &str, confirmed: bool) -> Result<ImportOutcome, BackupError> {
        let imported = backup::parse_import(text, APP_VERSION)?;
        Ok(self.import_store(imported, confirmed))
    }

    /// Same as `import_backup`, reading the backup from a file
    pub fn import_backup_file(&mut self, path: &Path, confirmed: bool) -> Result<ImportOutcome> {
        let imported = backup::read_import(path, APP_VERSION)?;
        Ok(self.import_store(imported, confirmed))
    }

    fn import_store(&mut self, imported: HabitStore, confirmed: bool) -> ImportOutcome {
        let active = imported.active.len();
        let inactive = imported.inactive.len();

        if !confirmed {
            return ImportOutcome::NeedsConfirmation { active, inactive };
        }

        self.replace_store(imported);
        info!(active, inactive, "imported backup");
        ImportOutcome::Replaced { active, inactive }
    }

    /// Write a backup file into `dir`
    pub fn export_backup(&self, dir: &Path, date: NaiveDate) -> Result<PathBuf> {
        let path = backup::export_to_dir(dir, &self.store, date)?;
        info!(path = %path.display(), "exported backup");
        Ok(path)
    }

    /// Forget everything: drop the persisted store and go back to the seeds
    pub fn clear_data(&mut self) -> Result<()> {
        persist::clear(&mut self.storage)?;
        self.store = HabitStore::with_defaults();
        info!("cleared habit data");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::ExportDocument;
    use crate::persist::{FileStorage, MemoryStorage, STORE_KEY};
    use chrono::Utc;
    use tempfile::TempDir;

    fn tracker() -> HabitTracker<MemoryStorage> {
        HabitTracker::open(MemoryStorage::new())
    }

    fn persisted(t: &HabitTracker<MemoryStorage>) -> HabitStore {
        persist::load_store(t.storage())
    }

    #[test]
    fn test_opens_with_defaults() {
        let t = tracker();
        assert_eq!(t.active().len(), 4);
        assert!(t.archived().is_empty());
    }

    #[test]
    fn test_every_change_is_persisted() {
        let mut t = tracker();
        t.toggle_log(1, "2024-01-01");
        assert!(persisted(&t).active[0].is_done("2024-01-01"));

        t.archive_habit(2);
        assert_eq!(persisted(&t).inactive.len(), 1);

        t.update_habit(3, &HabitPatch::name("Sleep early"));
        assert_eq!(persisted(&t).get(3).unwrap().name, "Sleep early");

        assert_eq!(&persisted(&t), t.store());
    }

    #[test]
    fn test_noop_does_not_write() {
        let mut t = tracker();
        assert!(!t.archive_habit(99));
        assert!(t.storage().get(STORE_KEY).unwrap().is_none());
    }

    #[test]
    fn test_add_habit_ids_and_priority() {
        let mut t = tracker();
        let now = Utc::now();
        let first = t.add_habit("Read", "📚", &now);
        let second = t.add_habit("Write", "✍️", &now);

        assert_eq!(first, now.timestamp_millis());
        assert_eq!(second, first + 1);
        assert_eq!(t.get(second).unwrap().priority, 6);
        t.store().check_invariants().unwrap();
    }

    #[test]
    fn test_move_habit_by_id() {
        let mut t = tracker();
        assert!(t.move_habit(4, 0));
        assert_eq!(t.active().iter().map(|h| h.id).collect::<Vec<_>>(), vec![4, 1, 2, 3]);
        assert_eq!(t.active()[0].priority, 1);
        assert!(!t.move_habit(42, 0));
        assert!(!t.move_habit(1, 10));
    }

    #[test]
    fn test_complete_setup_replaces_active() {
        let mut t = tracker();
        t.archive_habit(1);
        t.complete_setup(vec![NewHabit::new(100, "Floss", "🦷", 9)]);

        assert_eq!(t.active().len(), 1);
        assert_eq!(t.active()[0].priority, 1);
        assert_eq!(t.archived().len(), 1);
    }

    #[test]
    fn test_import_requires_confirmation() {
        let mut source = tracker();
        source.archive_habit(4);
        let json = ExportDocument::new(source.store()).to_json().unwrap();

        let mut t = tracker();
        t.toggle_log(1, "2024-01-01");
        let before = t.store().clone();

        let outcome = t.import_backup(&json, false).unwrap();
        assert_eq!(outcome, ImportOutcome::NeedsConfirmation { active: 3, inactive: 1 });
        assert_eq!(t.store(), &before);

        let outcome = t.import_backup(&json, true).unwrap();
        assert_eq!(outcome, ImportOutcome::Replaced { active: 3, inactive: 1 });
        assert_eq!(t.store(), source.store());
        assert_eq!(&persisted(&t), source.store());
    }

    #[test]
    fn test_complete_setup_avoids_archived_ids() {
        let mut t = tracker();
        t.archive_habit(2);
        t.complete_setup(vec![
            NewHabit::new(1, "Floss", "🦷", 1),
            NewHabit::new(2, "Journal", "📝", 2),
            NewHabit::new(3, "Stretch", "🤸", 3),
        ]);

        assert_eq!(t.active().iter().map(|h| h.id).collect::<Vec<_>>(), vec![1, 3, 4]);
        assert_eq!(t.get(2).unwrap().name, "Meditation");
        t.store().check_invariants().unwrap();
    }

    #[test]
    fn test_import_backup_file() {
        let temp = TempDir::new().unwrap();
        let mut source = tracker();
        source.archive_habit(1);
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let path = source.export_backup(temp.path(), date).unwrap();

        let mut t = tracker();
        let outcome = t.import_backup_file(&path, false).unwrap();
        assert_eq!(outcome, ImportOutcome::NeedsConfirmation { active: 3, inactive: 1 });
        assert_eq!(t.store(), &HabitStore::with_defaults());

        t.import_backup_file(&path, true).unwrap();
        assert_eq!(t.store(), source.store());

        assert!(t.import_backup_file(&temp.path().join("missing.json"), true).is_err());
        assert_eq!(t.store(), source.store());
    }

    #[test]
    fn test_rejected_import_leaves_store() {
        let mut t = tracker();
        t.toggle_log(2, "2024-01-01");
        let before = t.store().clone();

        let json = r#"{"version": "0.1.0", "habits": {"active": []}}"#;
        assert!(matches!(
            t.import_backup(json, true),
            Err(BackupError::VersionMismatch { .. })
        ));
        assert_eq!(t.store(), &before);
        assert_eq!(persisted(&t), before);
    }

    #[test]
    fn test_clear_data() {
        let mut t = tracker();
        t.archive_habit(1);
        t.clear_data().unwrap();

        assert_eq!(t.store(), &HabitStore::with_defaults());
        assert!(t.storage().get(STORE_KEY).unwrap().is_none());
    }

    #[test]
    fn test_reopen_from_disk() {
        let temp = TempDir::new().unwrap();
        {
            let mut t = HabitTracker::open(FileStorage::new(temp.path()).unwrap());
            t.toggle_log(1, "2024-07-04");
            t.archive_habit(3);
        }

        let t = HabitTracker::open(FileStorage::new(temp.path()).unwrap());
        assert!(t.get(1).unwrap().is_done("2024-07-04"));
        assert!(t.get(3).unwrap().archived);
        assert_eq!(t.active().len(), 3);
    }

    #[test]
    fn test_export_backup() {
        let temp = TempDir::new().unwrap();
        let t = tracker();
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let path = t.export_backup(temp.path(), date).unwrap();
        assert_eq!(backup::read_import(&path, APP_VERSION).unwrap(), *t.store());
    }
}
