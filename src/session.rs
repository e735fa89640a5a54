//! Session controller - reconciles the store, durable storage and the views
//!
//! All handlers run to completion on the caller's thread. The controller
//! owns the store and the persistence gateway; views are injected through
//! the [`Ui`] trait so tests can record what was asked of them.

use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::db::Storage;
use crate::error::{LocationUnavailable, SessionError};
use crate::factory::{RawFields, WorkoutFactory};
use crate::persistence::PersistenceGateway;
use crate::store::WorkoutStore;
use crate::workout::{Coords, Workout, WorkoutKind};

pub trait MapView {
    fn render_marker(&mut self, coords: Coords, label: &str, style_class: &str);
    fn center_on(&mut self, coords: Coords, zoom: u8);
    fn clear_markers(&mut self);
}

pub trait FormView {
    fn show(&mut self);
    fn hide(&mut self);
    fn clear(&mut self);
    fn toggle_fields_for(&mut self, kind: WorkoutKind);
    fn show_error(&mut self, message: &str);
}

pub trait ListView {
    fn render_workout(&mut self, workout: &Workout);
    fn clear_list(&mut self);
}

/// Everything the controller draws on, plus a channel for user-visible notices
pub trait Ui: MapView + FormView + ListView {
    fn alert(&mut self, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionState {
    Idle,
    AwaitingFormInput { pending: Coords },
}

pub struct SessionController<S, U> {
    factory: WorkoutFactory,
    store: WorkoutStore,
    gateway: PersistenceGateway<S>,
    ui: U,
    state: SessionState,
    map_ready: bool,
    map_zoom: u8,
    focus_zoom: u8,
}

impl<S: Storage, U: Ui> SessionController<S, U> {
    pub fn new(factory: WorkoutFactory, gateway: PersistenceGateway<S>, ui: U) -> Self {
        let defaults = Config::default();
        Self {
            factory,
            store: WorkoutStore::new(),
            gateway,
            ui,
            state: SessionState::Idle,
            map_ready: false,
            map_zoom: defaults.map_zoom,
            focus_zoom: defaults.focus_zoom,
        }
    }

    pub fn from_config(config: &Config, storage: S, ui: U) -> Self {
        let gateway = PersistenceGateway::with_key(storage, config.storage_key.clone());
        let mut controller = Self::new(WorkoutFactory::new(config.elevation_policy), gateway, ui);
        controller.map_zoom = config.map_zoom;
        controller.focus_zoom = config.focus_zoom;
        controller
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn store(&self) -> &WorkoutStore {
        &self.store
    }

    pub fn gateway(&self) -> &PersistenceGateway<S> {
        &self.gateway
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut U {
        &mut self.ui
    }

    pub fn is_map_ready(&self) -> bool {
        self.map_ready
    }

    /// Restore stored workouts and list them. Markers wait for the map.
    pub fn on_startup(&mut self) {
        let stored = self.gateway.load();
        let mut restored: Vec<Workout> = Vec::with_capacity(stored.len());
        for record in &stored {
            if restored.iter().any(|w| w.id() == record.id) {
                warn!(id = %record.id, "Skipping duplicate stored workout");
                continue;
            }
            match self.factory.rehydrate(record) {
                Ok(workout) => restored.push(workout),
                Err(e) => warn!(id = %record.id, error = %e, "Skipping invalid stored workout"),
            }
        }

        if let Err(e) = self.store.replace_all(restored) {
            error!(error = %e, "Could not restore workouts");
            self.store.clear();
        }

        self.ui.clear_list();
        for workout in self.store.all() {
            self.ui.render_workout(workout);
        }
        info!(count = self.store.len(), "Session started");
    }

    /// Outcome of the one-shot location lookup
    pub fn on_position(&mut self, position: Result<Coords, LocationUnavailable>) {
        match position {
            Ok(coords) => {
                info!(%coords, "Location found");
                self.ui.center_on(coords, self.map_zoom);
                self.on_map_ready();
            }
            Err(e) => {
                warn!(error = %e, "Location unavailable, map stays uninitialized");
                self.ui.alert("Could not find your current location");
            }
        }
    }

    pub fn on_map_ready(&mut self) {
        self.map_ready = true;
        for workout in self.store.all() {
            self.ui.render_marker(workout.coords(), &workout.popup_label(), workout.kind().popup_class());
        }
        debug!(markers = self.store.len(), "Map ready");
    }

    pub fn on_location_picked(&mut self, coords: Coords) {
        debug!(%coords, "Location picked");
        self.state = SessionState::AwaitingFormInput { pending: coords };
        self.ui.show();
    }

    pub fn on_kind_changed(&mut self, kind: WorkoutKind) {
        self.ui.toggle_fields_for(kind);
    }

    pub fn on_cancel(&mut self) {
        if let SessionState::AwaitingFormInput { .. } = self.state {
            self.state = SessionState::Idle;
            self.ui.clear();
            self.ui.hide();
        }
    }

    /// Build, store, draw and persist a workout at the pending location.
    /// On validation failure the form stays open and nothing changes.
    pub fn on_form_submitted(
        &mut self,
        kind: WorkoutKind,
        fields: &RawFields,
    ) -> Result<Workout, SessionError> {
        let SessionState::AwaitingFormInput { pending } = self.state else {
            self.ui.alert(&SessionError::NoPendingLocation.to_string());
            return Err(SessionError::NoPendingLocation);
        };

        let workout = match self.factory.create(kind, pending, fields) {
            Ok(workout) => workout,
            Err(e) => {
                debug!(error = %e, "Rejected form input");
                self.ui.show_error(&e.to_string());
                return Err(e.into());
            }
        };

        if let Err(e) = self.store.append(workout.clone()) {
            error!(error = %e, "Append aborted");
            self.ui.alert(&e.to_string());
            return Err(e.into());
        }

        if self.map_ready {
            self.ui.render_marker(workout.coords(), &workout.popup_label(), workout.kind().popup_class());
        }
        self.ui.render_workout(&workout);
        self.ui.clear();
        self.ui.hide();
        self.state = SessionState::Idle;

        if let Err(e) = self.gateway.save(&self.store) {
            error!(error = %e, "Could not save workouts");
            self.ui.alert("Workout added but could not be saved");
        }
        info!(id = %workout.id(), %kind, "Workout added");
        Ok(workout)
    }

    /// Focus the map on a listed workout
    pub fn on_list_item_activated(&mut self, id: &str) {
        if !self.map_ready {
            warn!(%id, "Map not ready, ignoring list activation");
            self.ui.alert("The map is not ready yet");
            return;
        }
        let Some(workout) = self.store.find_by_id(id) else {
            warn!(%id, "Activated workout not found");
            self.ui.alert("Workout not found");
            return;
        };
        self.ui.center_on(workout.coords(), self.focus_zoom);
    }

    /// Wipe durable storage and start over with an empty store
    pub fn reset(&mut self) -> anyhow::Result<()> {
        self.gateway.clear()?;
        self.store.clear();
        self.state = SessionState::Idle;
        self.ui.clear();
        self.ui.hide();
        self.ui.clear_markers();
        self.on_startup();
        info!("Session reset");
        Ok(())
    }
}
