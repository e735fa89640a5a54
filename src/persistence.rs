//! Persistence gateway - snapshots the store into durable storage
//!
//! The whole store lives under one key as a JSON array of flat records.
//! Loading hands back plain [`StoredWorkout`] data; callers rebuild real
//! workouts through [`crate::factory::WorkoutFactory::rehydrate`].

use anyhow::Result;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::db::Storage;
use crate::error::StorageReadError;
use crate::store::WorkoutStore;
use crate::workout::{Activity, Workout, WorkoutKind};

pub const DEFAULT_STORAGE_KEY: &str = "workouts";

/// Flat storage form of a workout.
///
/// Also reads the layout written by the browser version of the app
/// (`date` and `type` instead of `createdAt` and `kind`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredWorkout {
    pub id: String,
    #[serde(alias = "date")]
    pub created_at: DateTime<FixedOffset>,
    /// [lat, lng]
    pub coords: [f64; 2],
    pub distance: f64,
    pub duration: f64,
    #[serde(alias = "type")]
    pub kind: WorkoutKind,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cadence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pace: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation_gain: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
}

impl From<&Workout> for StoredWorkout {
    fn from(workout: &Workout) -> Self {
        let coords = workout.coords();
        let (cadence, pace, elevation_gain, speed) = match *workout.activity() {
            Activity::Running { cadence, pace } => (Some(f64::from(cadence)), Some(pace), None, None),
            Activity::Cycling { elevation_gain, speed } => (None, None, Some(elevation_gain), Some(speed)),
        };
        Self {
            id: workout.id().to_string(),
            created_at: workout.created_at(),
            coords: [coords.lat, coords.lng],
            distance: workout.distance(),
            duration: workout.duration(),
            kind: workout.kind(),
            description: workout.description().to_string(),
            cadence,
            pace,
            elevation_gain,
            speed,
        }
    }
}

pub struct PersistenceGateway<S> {
    storage: S,
    key: String,
}

impl<S: Storage> PersistenceGateway<S> {
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self { storage, key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Write every workout of the store, in order
    pub fn save(&mut self, store: &WorkoutStore) -> Result<()> {
        let records: Vec<StoredWorkout> = store.all().iter().map(StoredWorkout::from).collect();
        let json = serde_json::to_string(&records)?;
        self.storage.set(&self.key, &json)?;
        debug!(key = %self.key, count = records.len(), "Saved workouts");
        Ok(())
    }

    /// Stored records, or nothing when the key is absent or unreadable
    pub fn load(&self) -> Vec<StoredWorkout> {
        match self.read() {
            Ok(Some(records)) => {
                info!(key = %self.key, count = records.len(), "Loaded workouts");
                records
            }
            Ok(None) => {
                debug!(key = %self.key, "No stored workouts");
                Vec::new()
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Ignoring unreadable workout data");
                Vec::new()
            }
        }
    }

    /// Like [`load`](Self::load) but reports why nothing came back
    pub fn read(&self) -> Result<Option<Vec<StoredWorkout>>, StorageReadError> {
        let Some(json) = self.storage.get(&self.key)? else {
            return Ok(None);
        };
        // the browser version stored the literal string "null" after a failed save
        let records: Option<Vec<StoredWorkout>> = serde_json::from_str(&json)?;
        Ok(records)
    }

    /// Drop the stored snapshot entirely
    pub fn clear(&mut self) -> Result<()> {
        self.storage.remove(&self.key)?;
        info!(key = %self.key, "Cleared stored workouts");
        Ok(())
    }
}
