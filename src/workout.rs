//! Workout records - one logged activity pinned to a map location

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Latitude / longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coords {
    pub lat: f64,
    pub lng: f64,
}

impl Coords {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}, {:.5}", self.lat, self.lng)
    }
}

/// Parses `"lat,lng"`
impl FromStr for Coords {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| format!("expected \"lat,lng\", got {:?}", s))?;
        let lat: f64 = lat.trim().parse().map_err(|_| format!("bad latitude {:?}", lat))?;
        let lng: f64 = lng.trim().parse().map_err(|_| format!("bad longitude {:?}", lng))?;
        let coords = Coords::new(lat, lng);
        if !coords.is_valid() {
            return Err(format!("coordinates out of range: {}", coords));
        }
        Ok(coords)
    }
}

/// Workout variant discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutKind {
    Running,
    Cycling,
}

impl WorkoutKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkoutKind::Running => "running",
            WorkoutKind::Cycling => "cycling",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WorkoutKind::Running => "Running",
            WorkoutKind::Cycling => "Cycling",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            WorkoutKind::Running => "🏃",
            WorkoutKind::Cycling => "🚲",
        }
    }

    /// Style class attached to the map popup
    pub fn popup_class(&self) -> &'static str {
        match self {
            WorkoutKind::Running => "running-popup",
            WorkoutKind::Cycling => "cycling-popup",
        }
    }

    pub fn toggled(&self) -> WorkoutKind {
        match self {
            WorkoutKind::Running => WorkoutKind::Cycling,
            WorkoutKind::Cycling => WorkoutKind::Running,
        }
    }
}

impl fmt::Display for WorkoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkoutKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "running" | "run" => Ok(WorkoutKind::Running),
            "cycling" | "ride" => Ok(WorkoutKind::Cycling),
            other => Err(format!("unknown workout kind {:?}", other)),
        }
    }
}

/// Variant-specific input plus its derived metric
#[derive(Debug, Clone, PartialEq)]
pub enum Activity {
    Running {
        /// steps/min
        cadence: u32,
        /// min/km
        pace: f64,
    },
    Cycling {
        /// meters
        elevation_gain: f64,
        /// km/h
        speed: f64,
    },
}

impl Activity {
    pub(crate) fn running(distance: f64, duration: f64, cadence: u32) -> Self {
        Activity::Running { cadence, pace: duration / distance }
    }

    pub(crate) fn cycling(distance: f64, duration: f64, elevation_gain: f64) -> Self {
        Activity::Cycling { elevation_gain, speed: distance / (duration / 60.0) }
    }

    pub fn kind(&self) -> WorkoutKind {
        match self {
            Activity::Running { .. } => WorkoutKind::Running,
            Activity::Cycling { .. } => WorkoutKind::Cycling,
        }
    }
}

/// A display-ready metric: value and unit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metric {
    pub value: f64,
    pub unit: &'static str,
}

/// One logged workout. Built only by [`crate::factory::WorkoutFactory`], never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    id: String,
    created_at: DateTime<FixedOffset>,
    coords: Coords,
    distance: f64,
    duration: f64,
    description: String,
    activity: Activity,
}

impl Workout {
    pub(crate) fn new(
        id: String,
        created_at: DateTime<FixedOffset>,
        coords: Coords,
        distance: f64,
        duration: f64,
        activity: Activity,
    ) -> Self {
        let description = describe(activity.kind(), &created_at);
        Self { id, created_at, coords, distance, duration, description, activity }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<FixedOffset> {
        self.created_at
    }

    pub fn coords(&self) -> Coords {
        self.coords
    }

    /// km
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// minutes
    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn activity(&self) -> &Activity {
        &self.activity
    }

    pub fn kind(&self) -> WorkoutKind {
        self.activity.kind()
    }

    /// Pace for running, speed for cycling
    pub fn performance(&self) -> Metric {
        match self.activity {
            Activity::Running { pace, .. } => Metric { value: pace, unit: "min/km" },
            Activity::Cycling { speed, .. } => Metric { value: speed, unit: "km/h" },
        }
    }

    /// Cadence for running, elevation gain for cycling
    pub fn extra(&self) -> Metric {
        match self.activity {
            Activity::Running { cadence, .. } => Metric { value: f64::from(cadence), unit: "spm" },
            Activity::Cycling { elevation_gain, .. } => Metric { value: elevation_gain, unit: "m" },
        }
    }

    /// Marker popup text, e.g. "🏃 Running on July 3"
    pub fn popup_label(&self) -> String {
        format!("{} {}", self.kind().emoji(), self.description)
    }
}

/// "Running on July 3"
pub fn describe(kind: WorkoutKind, created_at: &DateTime<FixedOffset>) -> String {
    format!("{} on {}", kind.label(), created_at.format("%B %-d"))
}
