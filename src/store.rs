use crate::errors::StoreError;
use crate::models::{is_challenge_day, ChecklistMap, DailyCheckins, DayChecklist, CHALLENGE_DAYS};
use crate::schema::RecordName;
use crate::stats::{progress_summary, ProgressSummary};
use crate::storage::KeyValuePersistence;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Typed access to the registry's records over an injected backend.
///
/// Values read or written during the session are cached. If the backend
/// rejects a write, the cached value stays authoritative for the rest of the
/// session.
pub struct ProgressStore {
    backend: Box<dyn KeyValuePersistence>,
    cache: HashMap<RecordName, Value>,
}

impl ProgressStore {
    pub fn new(backend: impl KeyValuePersistence + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            cache: HashMap::new(),
        }
    }

    /// Current value of `name`. A missing or malformed record yields the
    /// registry default, which is written back.
    pub fn read_record(&mut self, name: RecordName) -> Value {
        let entry = name.entry();
        let Some(key) = entry.key else {
            return serde_json::to_value(self.progress()).unwrap_or_default();
        };

        if let Some(value) = self.cache.get(&name) {
            return value.clone();
        }

        let stored = self
            .backend
            .get(key)
            .and_then(|value| match entry.normalize(value) {
                Ok(value) => Some(value),
                Err(err) => {
                    warn!("stored {name} record does not match its shape: {err}");
                    None
                }
            });

        let value = match stored {
            Some(value) => value,
            None => {
                let default = entry.default_value();
                debug!("creating {name} record from its default");
                if let Err(err) = self.backend.set(key, &default) {
                    warn!("failed to persist default {name} record: {err}");
                }
                default
            }
        };

        self.cache.insert(name, value.clone());
        value
    }

    /// Replaces the whole record. On a persistence failure the new value is
    /// still what later reads return.
    pub fn write_record(&mut self, name: RecordName, value: Value) -> Result<(), StoreError> {
        let entry = name.entry();
        let Some(key) = entry.key else {
            return Err(StoreError::Derived(name));
        };

        if name == RecordName::DailyCheckin {
            ensure_challenge_days(&value)?;
        }
        let value = entry
            .normalize(value)
            .map_err(|source| StoreError::Invalid { name, source })?;

        self.cache.insert(name, value.clone());
        if let Err(err) = self.backend.set(key, &value) {
            warn!("{name} record kept in memory only: {err}");
            return Err(err.into());
        }
        Ok(())
    }

    /// Drops the record; the next read recreates the default.
    pub fn remove_record(&mut self, name: RecordName) -> Result<(), StoreError> {
        let Some(key) = name.key() else {
            return Err(StoreError::Derived(name));
        };
        self.cache.remove(&name);
        self.backend.remove(key);
        Ok(())
    }

    pub fn read_as<T: DeserializeOwned>(&mut self, name: RecordName) -> Result<T, StoreError> {
        let value = self.read_record(name);
        serde_json::from_value(value).map_err(|source| StoreError::Invalid { name, source })
    }

    pub fn write_as<T: Serialize>(&mut self, name: RecordName, value: &T) -> Result<(), StoreError> {
        let value =
            serde_json::to_value(value).map_err(|source| StoreError::Invalid { name, source })?;
        self.write_record(name, value)
    }

    pub fn checkins(&mut self) -> DailyCheckins {
        self.read_as(RecordName::DailyCheckin).unwrap_or_default()
    }

    pub fn progress(&mut self) -> ProgressSummary {
        progress_summary(&self.checkins(), CHALLENGE_DAYS)
    }
}

fn ensure_challenge_days(value: &Value) -> Result<(), StoreError> {
    let days: BTreeMap<u32, DayChecklist> =
        serde_json::from_value(value.clone()).map_err(|source| StoreError::Invalid {
            name: RecordName::DailyCheckin,
            source,
        })?;
    match days.keys().find(|day| !is_challenge_day(**day)) {
        Some(day) => Err(StoreError::DayOutOfRange(*day)),
        None => Ok(()),
    }
}

/// Flips `item_id`, adding it as done when absent. The caller still writes
/// the result.
pub fn toggle_checklist_item(mut checklist: ChecklistMap, item_id: &str) -> ChecklistMap {
    let done = checklist.entry(item_id.to_string()).or_insert(false);
    *done = !*done;
    checklist
}

pub fn reset_checklist(mut checklist: ChecklistMap) -> ChecklistMap {
    checklist.values_mut().for_each(|done| *done = false);
    checklist
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::PersistenceError;
    use crate::models::{Goal, PhotoEntry};
    use crate::storage::MemoryStorage;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    /// Shares its map with the test so stored state can be inspected.
    #[derive(Clone, Default)]
    struct SharedStorage {
        inner: Arc<Mutex<MemoryStorage>>,
        fail_writes: bool,
    }

    impl KeyValuePersistence for SharedStorage {
        fn set(&mut self, key: &str, value: &Value) -> Result<(), PersistenceError> {
            if self.fail_writes {
                return Err(PersistenceError::Quota {
                    key: key.to_string(),
                    needed: 1,
                    quota: 0,
                });
            }
            self.inner.lock().unwrap().set(key, value)
        }

        fn get(&self, key: &str) -> Option<Value> {
            self.inner.lock().unwrap().get(key)
        }

        fn remove(&mut self, key: &str) {
            self.inner.lock().unwrap().remove(key);
        }
    }

    #[test]
    fn first_read_writes_default_back() {
        let storage = SharedStorage::default();
        let mut store = ProgressStore::new(storage.clone());

        let goals = store.read_record(RecordName::Goals);
        assert_eq!(goals, serde_json::to_value(Goal::default()).unwrap());
        assert_eq!(storage.get("fitness_goals"), Some(goals));
    }

    #[test]
    fn write_then_read_round_trips() {
        let mut store = ProgressStore::new(MemoryStorage::new());
        let value = json!({ "chicken": true, "rice": false });
        store.write_record(RecordName::Nutrition, value.clone()).unwrap();
        assert_eq!(store.read_record(RecordName::Nutrition), value);
    }

    #[test]
    fn written_records_survive_a_new_store() {
        let storage = SharedStorage::default();
        let mut store = ProgressStore::new(storage.clone());
        let goal = Goal::default().with_personal_goal("10k run");
        store.write_as(RecordName::Goals, &goal).unwrap();

        let mut reopened = ProgressStore::new(storage);
        assert_eq!(reopened.read_as::<Goal>(RecordName::Goals).unwrap(), goal);
    }

    #[test]
    fn malformed_stored_text_reads_as_default() {
        let mut backend = MemoryStorage::new();
        backend.set_raw("fitness_photos", "[{oops");
        backend.set_raw("fitness_rules", "\"not a map\"");
        let mut store = ProgressStore::new(backend);

        assert_eq!(store.read_record(RecordName::Photos), json!([]));
        let rules: ChecklistMap = store.read_as(RecordName::Rules).unwrap();
        assert_eq!(rules.len(), 5);
    }

    #[test]
    fn failed_write_keeps_value_in_memory() {
        let storage = SharedStorage {
            fail_writes: true,
            ..SharedStorage::default()
        };
        let mut store = ProgressStore::new(storage.clone());
        let photos: Vec<PhotoEntry> = Vec::new();
        let value = json!({ "1": true });

        let err = store.write_record(RecordName::Workouts, value.clone()).unwrap_err();
        assert!(matches!(err, StoreError::Persistence(_)));
        assert_eq!(store.read_record(RecordName::Workouts), value);
        assert_eq!(storage.get("fitness_workouts"), None);
        assert_eq!(store.read_as::<Vec<PhotoEntry>>(RecordName::Photos).unwrap(), photos);
    }

    #[test]
    fn computed_progress_is_read_only() {
        let mut store = ProgressStore::new(MemoryStorage::new());
        let err = store
            .write_record(RecordName::ComputedProgress, json!({}))
            .unwrap_err();
        assert!(matches!(err, StoreError::Derived(RecordName::ComputedProgress)));
        assert!(matches!(
            store.remove_record(RecordName::ComputedProgress),
            Err(StoreError::Derived(_))
        ));
    }

    #[test]
    fn computed_progress_follows_checkins() {
        let mut store = ProgressStore::new(MemoryStorage::new());
        let full = json!({
            "morning_workout": true, "afternoon_workout": true, "evening_workout": true,
            "clean_nutrition": true, "hydration_goal": true, "photo_taken": true,
            "sleep_goal": true
        });
        store
            .write_record(RecordName::DailyCheckin, json!({ "1": full, "2": full }))
            .unwrap();

        let summary: ProgressSummary = store.read_as(RecordName::ComputedProgress).unwrap();
        assert_eq!(summary.completed_days, 2);
        assert_eq!(summary.streak, 2);
    }

    #[test]
    fn wrong_shape_is_rejected() {
        let mut store = ProgressStore::new(MemoryStorage::new());
        let err = store
            .write_record(RecordName::Photos, json!({ "not": "a list" }))
            .unwrap_err();
        assert!(matches!(err, StoreError::Invalid { name: RecordName::Photos, .. }));
    }

    #[test]
    fn checkin_days_outside_challenge_are_rejected() {
        let mut store = ProgressStore::new(MemoryStorage::new());
        let err = store
            .write_record(RecordName::DailyCheckin, json!({ "31": {} }))
            .unwrap_err();
        assert!(matches!(err, StoreError::DayOutOfRange(31)));
    }

    #[test]
    fn unknown_checkin_fields_are_dropped_on_write() {
        let mut store = ProgressStore::new(MemoryStorage::new());
        store
            .write_record(RecordName::DailyCheckin, json!({ "3": { "sleep_goal": true, "yoga": true } }))
            .unwrap();
        let checkins = store.checkins();
        assert!(checkins.day(3).sleep_goal);
        assert!(
            store.read_record(RecordName::DailyCheckin)["3"]
                .get("yoga")
                .is_none()
        );
    }

    #[test]
    fn stored_day_beyond_u8_does_not_wipe_checkins() {
        let storage = SharedStorage::default();
        storage
            .inner
            .lock()
            .unwrap()
            .set_raw("fitness_checkin", r#"{"1":{"sleep_goal":true},"300":{}}"#);
        let mut store = ProgressStore::new(storage.clone());

        let checkins = store.checkins();
        assert!(checkins.has_entry(1));
        assert!(checkins.day(1).sleep_goal);
        assert_eq!(
            storage.get("fitness_checkin").unwrap()["1"]["sleep_goal"],
            json!(true)
        );
    }

    #[test]
    fn remove_restores_default() {
        let storage = SharedStorage::default();
        let mut store = ProgressStore::new(storage.clone());
        store
            .write_record(RecordName::Nutrition, json!({ "eggs": true }))
            .unwrap();
        store.remove_record(RecordName::Nutrition).unwrap();

        assert_eq!(storage.get("fitness_nutrition"), None);
        assert_eq!(store.read_record(RecordName::Nutrition), json!({}));
    }

    #[test]
    fn empty_store_has_no_completed_days() {
        let mut store = ProgressStore::new(MemoryStorage::new());
        let progress = store.progress();
        assert_eq!(progress.completed_days, 0);
        assert_eq!(progress.streak, 0);
    }

    #[test]
    fn toggle_twice_is_identity() {
        let map = crate::models::default_workouts();
        let once = toggle_checklist_item(map.clone(), "3");
        assert_eq!(once.get("3"), Some(&true));
        assert_eq!(toggle_checklist_item(once, "3"), map);
    }

    #[test]
    fn toggle_inserts_missing_item_as_done() {
        let map = toggle_checklist_item(ChecklistMap::new(), "oats");
        assert_eq!(map.get("oats"), Some(&true));
    }

    #[test]
    fn reset_clears_every_item() {
        let map = toggle_checklist_item(crate::models::default_workouts(), "1");
        let map = toggle_checklist_item(map, "4");
        assert_eq!(reset_checklist(map), crate::models::default_workouts());
    }
}
