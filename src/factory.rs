//! Workout factory - validates raw input and builds the right variant

use chrono::{DateTime, FixedOffset, Local};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ValidationError;
use crate::persistence::StoredWorkout;
use crate::workout::{Activity, Coords, Workout, WorkoutKind};

/// How cycling elevation gain is checked
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElevationPolicy {
    /// Reject negative gain
    #[default]
    NonNegative,
    /// Any finite value, descents included
    Lenient,
}

impl std::str::FromStr for ElevationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" | "non-negative" | "nonnegative" => Ok(ElevationPolicy::NonNegative),
            "lenient" => Ok(ElevationPolicy::Lenient),
            other => Err(format!("unknown elevation policy {:?}", other)),
        }
    }
}

/// Form values as typed by the user
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFields {
    pub distance: String,
    pub duration: String,
    pub cadence: String,
    pub elevation_gain: String,
}

impl RawFields {
    pub fn new(distance: impl ToString, duration: impl ToString) -> Self {
        Self {
            distance: distance.to_string(),
            duration: duration.to_string(),
            ..Self::default()
        }
    }

    pub fn with_cadence(mut self, cadence: impl ToString) -> Self {
        self.cadence = cadence.to_string();
        self
    }

    pub fn with_elevation_gain(mut self, elevation_gain: impl ToString) -> Self {
        self.elevation_gain = elevation_gain.to_string();
        self
    }
}

/// Builds workouts. Holds no state besides the validation policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkoutFactory {
    elevation_policy: ElevationPolicy,
}

impl WorkoutFactory {
    pub fn new(elevation_policy: ElevationPolicy) -> Self {
        Self { elevation_policy }
    }

    pub fn create(
        &self,
        kind: WorkoutKind,
        coords: Coords,
        fields: &RawFields,
    ) -> Result<Workout, ValidationError> {
        self.create_at(kind, coords, fields, Local::now().fixed_offset())
    }

    /// Same as [`create`](Self::create) with an explicit creation time
    pub fn create_at(
        &self,
        kind: WorkoutKind,
        coords: Coords,
        fields: &RawFields,
        now: DateTime<FixedOffset>,
    ) -> Result<Workout, ValidationError> {
        let distance = coerce("distance", &fields.distance)?;
        let duration = coerce("duration", &fields.duration)?;
        let extra = match kind {
            WorkoutKind::Running => coerce("cadence", &fields.cadence)?,
            WorkoutKind::Cycling => coerce("elevation gain", &fields.elevation_gain)?,
        };
        let policy = self.elevation_policy;
        build(generate_id(&now), now, kind, coords, distance, duration, extra, policy)
    }

    /// Rebuilds a stored record, recomputing every derived field.
    /// Identity, timestamp and inputs come from storage. The elevation
    /// policy only applies to new workouts: a ride saved under a looser
    /// policy must survive a restart.
    pub fn rehydrate(&self, stored: &StoredWorkout) -> Result<Workout, ValidationError> {
        let extra = match stored.kind {
            WorkoutKind::Running => stored.cadence,
            WorkoutKind::Cycling => stored.elevation_gain,
        };
        let extra = extra.ok_or(ValidationError::NonNumeric {
            field: extra_field(stored.kind),
        })?;
        let [lat, lng] = stored.coords;
        build(
            stored.id.clone(),
            stored.created_at,
            stored.kind,
            Coords::new(lat, lng),
            stored.distance,
            stored.duration,
            extra,
            ElevationPolicy::Lenient,
        )
    }
}

#[allow(clippy::too_many_arguments)]
fn build(
    id: String,
    created_at: DateTime<FixedOffset>,
    kind: WorkoutKind,
    coords: Coords,
    distance: f64,
    duration: f64,
    extra: f64,
    elevation_policy: ElevationPolicy,
) -> Result<Workout, ValidationError> {
    if !coords.is_valid() {
        return Err(ValidationError::InvalidCoordinates { lat: coords.lat, lng: coords.lng });
    }
    let distance = positive("distance", distance)?;
    let duration = positive("duration", duration)?;

    let activity = match kind {
        WorkoutKind::Running => {
            let cadence = positive("cadence", extra)?;
            if cadence.fract() != 0.0 || cadence > f64::from(u32::MAX) {
                return Err(ValidationError::NotWhole { field: "cadence" });
            }
            Activity::running(distance, duration, cadence as u32)
        }
        WorkoutKind::Cycling => {
            let gain = finite("elevation gain", extra)?;
            if elevation_policy == ElevationPolicy::NonNegative && gain < 0.0 {
                return Err(ValidationError::NonPositive { field: "elevation gain" });
            }
            Activity::cycling(distance, duration, gain)
        }
    };

    debug!(%id, %kind, distance, duration, "Built workout");
    Ok(Workout::new(id, created_at, coords, distance, duration, activity))
}

fn extra_field(kind: WorkoutKind) -> &'static str {
    match kind {
        WorkoutKind::Running => "cadence",
        WorkoutKind::Cycling => "elevation gain",
    }
}

/// Form coercion: blank input reads as 0, anything else must parse
fn coerce(field: &'static str, raw: &str) -> Result<f64, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0.0);
    }
    let value: f64 = raw.parse().map_err(|_| ValidationError::NonNumeric { field })?;
    finite(field, value)
}

fn finite(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValidationError::NonNumeric { field })
    }
}

fn positive(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    let value = finite(field, value)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(ValidationError::NonPositive { field })
    }
}

/// Last ten digits of the millisecond timestamp plus a random suffix
fn generate_id(now: &DateTime<FixedOffset>) -> String {
    let millis = now.timestamp_millis().rem_euclid(10_000_000_000);
    format!("{:010}{:04x}", millis, rand::random::<u16>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};

    fn london() -> Coords {
        Coords::new(51.5, -0.1)
    }

    fn noon() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 17, 12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_create_running() {
        let factory = WorkoutFactory::default();
        let fields = RawFields::new(5, 25).with_cadence(150);
        let workout = factory.create(WorkoutKind::Running, london(), &fields).unwrap();

        assert_eq!(workout.kind(), WorkoutKind::Running);
        assert!((workout.performance().value - 5.0).abs() < 1e-9);
        assert_eq!(workout.coords(), london());

        let now = workout.created_at();
        let expected = format!("Running on {} {}", now.format("%B"), now.day());
        assert_eq!(workout.description(), expected);
    }

    #[test]
    fn test_create_cycling() {
        let factory = WorkoutFactory::default();
        let fields = RawFields::new("20", "60").with_elevation_gain("300");
        let workout = factory.create_at(WorkoutKind::Cycling, london(), &fields, noon()).unwrap();

        assert!((workout.performance().value - 20.0).abs() < 1e-9);
        assert_eq!(workout.extra().value, 300.0);
        assert_eq!(workout.description(), "Cycling on March 17");
    }

    #[test]
    fn test_pace_and_speed_formulas() {
        let factory = WorkoutFactory::default();
        for (distance, duration) in [(1.0, 1.0), (3.7, 21.3), (42.195, 180.0), (0.4, 99.9)] {
            let run = factory
                .create_at(WorkoutKind::Running, london(), &RawFields::new(distance, duration).with_cadence(170), noon())
                .unwrap();
            assert!((run.performance().value - duration / distance).abs() < 1e-9);

            let ride = factory
                .create_at(WorkoutKind::Cycling, london(), &RawFields::new(distance, duration).with_elevation_gain(0), noon())
                .unwrap();
            assert!((ride.performance().value - distance / (duration / 60.0)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_negative_distance_rejected() {
        let factory = WorkoutFactory::default();
        let fields = RawFields::new(-3, 25).with_cadence(150);
        let err = factory.create(WorkoutKind::Running, london(), &fields).unwrap_err();
        assert_eq!(err.code(), "non-positive");
        assert_eq!(err, ValidationError::NonPositive { field: "distance" });
    }

    #[test]
    fn test_non_numeric_rejected() {
        let factory = WorkoutFactory::default();
        let fields = RawFields::new("five", 25).with_cadence(150);
        let err = factory.create(WorkoutKind::Running, london(), &fields).unwrap_err();
        assert_eq!(err.code(), "non-numeric");

        let fields = RawFields::new("inf", 25).with_cadence(150);
        let err = factory.create(WorkoutKind::Running, london(), &fields).unwrap_err();
        assert_eq!(err.code(), "non-numeric");
    }

    #[test]
    fn test_blank_cadence_is_non_positive() {
        let factory = WorkoutFactory::default();
        let fields = RawFields::new(5, 25);
        let err = factory.create(WorkoutKind::Running, london(), &fields).unwrap_err();
        assert_eq!(err, ValidationError::NonPositive { field: "cadence" });
    }

    #[test]
    fn test_fractional_cadence_rejected() {
        let factory = WorkoutFactory::default();
        let fields = RawFields::new(5, 25).with_cadence("150.5");
        let err = factory.create(WorkoutKind::Running, london(), &fields).unwrap_err();
        assert_eq!(err.code(), "not-whole");
    }

    #[test]
    fn test_zero_elevation_allowed() {
        let factory = WorkoutFactory::default();
        let fields = RawFields::new(20, 60);
        let workout = factory.create(WorkoutKind::Cycling, london(), &fields).unwrap();
        assert_eq!(workout.extra().value, 0.0);
    }

    #[test]
    fn test_negative_elevation_by_policy() {
        let fields = RawFields::new(20, 60).with_elevation_gain(-40);

        let strict = WorkoutFactory::new(ElevationPolicy::NonNegative);
        let err = strict.create(WorkoutKind::Cycling, london(), &fields).unwrap_err();
        assert_eq!(err.code(), "non-positive");

        let lenient = WorkoutFactory::new(ElevationPolicy::Lenient);
        let workout = lenient.create(WorkoutKind::Cycling, london(), &fields).unwrap();
        assert_eq!(workout.extra().value, -40.0);
    }

    #[test]
    fn test_invalid_coordinates_rejected() {
        let factory = WorkoutFactory::default();
        let fields = RawFields::new(5, 25).with_cadence(150);
        let err = factory
            .create(WorkoutKind::Running, Coords::new(f64::NAN, 0.0), &fields)
            .unwrap_err();
        assert_eq!(err.code(), "invalid-coordinates");
    }

    #[test]
    fn test_id_shape() {
        let factory = WorkoutFactory::default();
        let fields = RawFields::new(5, 25).with_cadence(150);
        let a = factory.create_at(WorkoutKind::Running, london(), &fields, noon()).unwrap();
        let b = factory.create_at(WorkoutKind::Running, london(), &fields, noon()).unwrap();
        assert_eq!(a.id().len(), 14);
        assert_eq!(&a.id()[..10], &b.id()[..10]);
    }

    #[test]
    fn test_rehydrate_recomputes_derived_fields() {
        let factory = WorkoutFactory::default();
        let fields = RawFields::new(10, 50).with_cadence(160);
        let original = factory.create_at(WorkoutKind::Running, london(), &fields, noon()).unwrap();

        let mut stored = StoredWorkout::from(&original);
        stored.pace = Some(999.0);
        stored.description = "tampered".to_string();

        let restored = factory.rehydrate(&stored).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn test_rehydrate_missing_extra_fails() {
        let factory = WorkoutFactory::default();
        let fields = RawFields::new(20, 60).with_elevation_gain(10);
        let original = factory.create_at(WorkoutKind::Cycling, london(), &fields, noon()).unwrap();

        let mut stored = StoredWorkout::from(&original);
        stored.elevation_gain = None;
        assert_eq!(
            factory.rehydrate(&stored).unwrap_err(),
            ValidationError::NonNumeric { field: "elevation gain" }
        );
    }

    #[test]
    fn test_rehydrate_ignores_elevation_policy() {
        let fields = RawFields::new(20, 60).with_elevation_gain(-40);
        let lenient = WorkoutFactory::new(ElevationPolicy::Lenient);
        let original = lenient.create_at(WorkoutKind::Cycling, london(), &fields, noon()).unwrap();

        let stored = StoredWorkout::from(&original);
        let restored = WorkoutFactory::default().rehydrate(&stored).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn test_elevation_policy_from_str() {
        assert_eq!("lenient".parse::<ElevationPolicy>(), Ok(ElevationPolicy::Lenient));
        assert_eq!("strict".parse::<ElevationPolicy>(), Ok(ElevationPolicy::NonNegative));
        assert!("loose".parse::<ElevationPolicy>().is_err());
    }
}
