//! In-memory workout collection, the session's source of truth

use std::collections::HashMap;

use crate::error::StoreError;
use crate::workout::Workout;

/// Ordered by insertion, indexed by id
#[derive(Debug, Default)]
pub struct WorkoutStore {
    workouts: Vec<Workout>,
    index: HashMap<String, usize>,
}

impl WorkoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, workout: Workout) -> Result<(), StoreError> {
        if self.index.contains_key(workout.id()) {
            return Err(StoreError::DuplicateId(workout.id().to_string()));
        }
        self.index.insert(workout.id().to_string(), self.workouts.len());
        self.workouts.push(workout);
        Ok(())
    }

    pub fn all(&self) -> &[Workout] {
        &self.workouts
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Workout> {
        self.index.get(id).map(|&i| &self.workouts[i])
    }

    /// Swaps the whole collection. Leaves the store untouched on duplicate ids.
    pub fn replace_all(&mut self, workouts: Vec<Workout>) -> Result<(), StoreError> {
        let mut index = HashMap::with_capacity(workouts.len());
        for (i, workout) in workouts.iter().enumerate() {
            if index.insert(workout.id().to_string(), i).is_some() {
                return Err(StoreError::DuplicateId(workout.id().to_string()));
            }
        }
        self.workouts = workouts;
        self.index = index;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.workouts.clear();
        self.index.clear();
    }

    pub fn len(&self) -> usize {
        self.workouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workouts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::{RawFields, WorkoutFactory};
    use crate::workout::{Coords, WorkoutKind};

    fn create_run(distance: f64) -> Workout {
        WorkoutFactory::default()
            .create(
                WorkoutKind::Running,
                Coords::new(51.5, -0.1),
                &RawFields::new(distance, 30).with_cadence(160),
            )
            .unwrap()
    }

    #[test]
    fn test_append_then_find() {
        let mut store = WorkoutStore::new();
        let workout = create_run(5.0);
        let id = workout.id().to_string();
        store.append(workout.clone()).unwrap();

        assert_eq!(store.find_by_id(&id), Some(&workout));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_find_absent_id() {
        let store = WorkoutStore::new();
        assert!(store.find_by_id("nope").is_none());
    }

    #[test]
    fn test_duplicate_append_rejected() {
        let mut store = WorkoutStore::new();
        let workout = create_run(5.0);
        store.append(workout.clone()).unwrap();

        let err = store.append(workout.clone()).unwrap_err();
        assert_eq!(err, StoreError::DuplicateId(workout.id().to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_all_preserves_insertion_order() {
        let mut store = WorkoutStore::new();
        let workouts: Vec<_> = (1..=4).map(|d| create_run(d as f64)).collect();
        for w in &workouts {
            store.append(w.clone()).unwrap();
        }
        let distances: Vec<f64> = store.all().iter().map(|w| w.distance()).collect();
        assert_eq!(distances, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_replace_all_swaps_collection() {
        let mut store = WorkoutStore::new();
        let old = create_run(1.0);
        let old_id = old.id().to_string();
        store.append(old).unwrap();

        let fresh = vec![create_run(2.0), create_run(3.0)];
        let fresh_id = fresh[1].id().to_string();
        store.replace_all(fresh).unwrap();

        assert_eq!(store.len(), 2);
        assert!(store.find_by_id(&old_id).is_none());
        assert_eq!(store.find_by_id(&fresh_id).map(|w| w.distance()), Some(3.0));
    }

    #[test]
    fn test_replace_all_with_duplicates_keeps_old_state() {
        let mut store = WorkoutStore::new();
        store.append(create_run(1.0)).unwrap();

        let dup = create_run(2.0);
        let result = store.replace_all(vec![dup.clone(), dup]);

        assert!(matches!(result, Err(StoreError::DuplicateId(_))));
        assert_eq!(store.len(), 1);
        assert_eq!(store.all()[0].distance(), 1.0);
    }
}
