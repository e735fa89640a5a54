//! Runtime configuration, assembled by the CLI from flags and `WAYMARK_*` variables

use std::path::PathBuf;

use crate::factory::ElevationPolicy;
use crate::persistence::DEFAULT_STORAGE_KEY;
use crate::workout::Coords;

#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite file holding the workout snapshot
    pub db_path: PathBuf,
    pub storage_key: String,
    pub elevation_policy: ElevationPolicy,
    /// Position reported by the location provider, if known
    pub location: Option<Coords>,
    /// TUI log destination
    pub log_path: PathBuf,
    /// Zoom when the map first opens
    pub map_zoom: u8,
    /// Zoom when jumping to a listed workout
    pub focus_zoom: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("waymark.db"),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            elevation_policy: ElevationPolicy::default(),
            location: None,
            log_path: PathBuf::from("waymark.log"),
            map_zoom: 15,
            focus_zoom: 13,
        }
    }
}
