//! waymark - Running and cycling log pinned to a map
//!
//! Workouts are validated and built by the factory, kept in an ordered
//! in-memory store, snapshotted to SQLite and drawn on a terminal map.

pub mod config;
pub mod db;
pub mod error;
pub mod factory;
pub mod location;
pub mod persistence;
pub mod session;
pub mod store;
pub mod tui;
pub mod workout;

pub use config::Config;
pub use db::Database;
pub use factory::{ElevationPolicy, RawFields, WorkoutFactory};
pub use session::SessionController;
pub use store::WorkoutStore;
pub use workout::{Coords, Workout, WorkoutKind};
