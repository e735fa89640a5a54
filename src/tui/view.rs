//! Terminal-side state the session controller draws on

use crate::factory::RawFields;
use crate::session::{FormView, ListView, MapView, Ui};
use crate::workout::{Activity, Coords, Workout, WorkoutKind};

pub const MIN_ZOOM: u8 = 2;
pub const MAX_ZOOM: u8 = 18;

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub coords: Coords,
    pub label: String,
    pub style_class: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListEntry {
    pub id: String,
    pub kind: WorkoutKind,
    pub title: String,
    pub details: String,
}

impl From<&Workout> for ListEntry {
    fn from(workout: &Workout) -> Self {
        Self {
            id: workout.id().to_string(),
            kind: workout.kind(),
            title: workout.description().to_string(),
            details: format_details(workout),
        }
    }
}

/// "🏃 5 km  ⏱ 25 min  ⚡ 5.0 min/km  🦶 150 spm"
pub fn format_details(workout: &Workout) -> String {
    let performance = workout.performance();
    let extra = workout.extra();
    let extra_icon = match workout.activity() {
        Activity::Running { .. } => "🦶",
        Activity::Cycling { .. } => "⛰",
    };
    format!(
        "{} {} km  ⏱ {} min  ⚡ {:.1} {}  {} {} {}",
        workout.kind().emoji(),
        workout.distance(),
        workout.duration(),
        performance.value,
        performance.unit,
        extra_icon,
        extra.value,
        extra.unit,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Kind,
    Distance,
    Duration,
    Extra,
}

impl FormField {
    pub fn next(self) -> Self {
        match self {
            FormField::Kind => FormField::Distance,
            FormField::Distance => FormField::Duration,
            FormField::Duration => FormField::Extra,
            FormField::Extra => FormField::Kind,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            FormField::Kind => FormField::Extra,
            FormField::Distance => FormField::Kind,
            FormField::Duration => FormField::Distance,
            FormField::Extra => FormField::Duration,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FormState {
    pub visible: bool,
    pub kind: WorkoutKind,
    pub focus: FormField,
    pub distance: String,
    pub duration: String,
    pub cadence: String,
    pub elevation_gain: String,
    pub error: Option<String>,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            visible: false,
            kind: WorkoutKind::Running,
            focus: FormField::Distance,
            distance: String::new(),
            duration: String::new(),
            cadence: String::new(),
            elevation_gain: String::new(),
            error: None,
        }
    }
}

impl FormState {
    pub fn raw_fields(&self) -> RawFields {
        RawFields::new(&self.distance, &self.duration)
            .with_cadence(&self.cadence)
            .with_elevation_gain(&self.elevation_gain)
    }

    /// Input buffer behind the focused field, if it takes text
    pub fn focused_input(&mut self) -> Option<&mut String> {
        match self.focus {
            FormField::Kind => None,
            FormField::Distance => Some(&mut self.distance),
            FormField::Duration => Some(&mut self.duration),
            FormField::Extra => match self.kind {
                WorkoutKind::Running => Some(&mut self.cadence),
                WorkoutKind::Cycling => Some(&mut self.elevation_gain),
            },
        }
    }

    pub fn extra_label(&self) -> &'static str {
        match self.kind {
            WorkoutKind::Running => "Cadence",
            WorkoutKind::Cycling => "Elev Gain",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TuiView {
    pub markers: Vec<Marker>,
    /// None until the location lookup succeeds
    pub center: Option<Coords>,
    pub cursor: Coords,
    pub zoom: u8,
    pub form: FormState,
    pub entries: Vec<ListEntry>,
    pub status: Option<String>,
}

impl Default for TuiView {
    fn default() -> Self {
        Self {
            markers: Vec::new(),
            center: None,
            cursor: Coords::new(0.0, 0.0),
            zoom: MIN_ZOOM,
            form: FormState::default(),
            entries: Vec::new(),
            status: None,
        }
    }
}

impl TuiView {
    /// Half-width and half-height of the visible area in degrees
    pub fn span(&self) -> (f64, f64) {
        let half_width = 180.0 / 2f64.powi(i32::from(self.zoom));
        (half_width, half_width / 2.0)
    }

    pub fn move_cursor(&mut self, d_lat: f64, d_lng: f64) {
        let (half_width, half_height) = self.span();
        let step_lng = half_width / 10.0;
        let step_lat = half_height / 10.0;
        let lat = (self.cursor.lat + d_lat * step_lat).clamp(-90.0, 90.0);
        let lng = (self.cursor.lng + d_lng * step_lng).clamp(-180.0, 180.0);
        self.cursor = Coords::new(lat, lng);

        // keep the cursor on screen
        if let Some(center) = self.center {
            let lat = if (lat - center.lat).abs() > half_height { lat } else { center.lat };
            let lng = if (lng - center.lng).abs() > half_width { lng } else { center.lng };
            self.center = Some(Coords::new(lat, lng));
        }
    }

    pub fn zoom_by(&mut self, delta: i8) {
        self.zoom = self.zoom.saturating_add_signed(delta).clamp(MIN_ZOOM, MAX_ZOOM);
        if self.center.is_some() {
            self.center = Some(self.cursor);
        }
    }
}

impl MapView for TuiView {
    fn render_marker(&mut self, coords: Coords, label: &str, style_class: &str) {
        self.markers.push(Marker {
            coords,
            label: label.to_string(),
            style_class: style_class.to_string(),
        });
    }

    fn center_on(&mut self, coords: Coords, zoom: u8) {
        self.center = Some(coords);
        self.cursor = coords;
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    fn clear_markers(&mut self) {
        self.markers.clear();
    }
}

impl FormView for TuiView {
    fn show(&mut self) {
        self.form.visible = true;
        self.form.focus = FormField::Distance;
        self.form.error = None;
    }

    fn hide(&mut self) {
        self.form.visible = false;
    }

    fn clear(&mut self) {
        self.form.distance.clear();
        self.form.duration.clear();
        self.form.cadence.clear();
        self.form.elevation_gain.clear();
        self.form.error = None;
    }

    fn toggle_fields_for(&mut self, kind: WorkoutKind) {
        self.form.kind = kind;
    }

    fn show_error(&mut self, message: &str) {
        self.form.error = Some(message.to_string());
    }
}

impl ListView for TuiView {
    fn render_workout(&mut self, workout: &Workout) {
        self.entries.push(ListEntry::from(workout));
    }

    fn clear_list(&mut self) {
        self.entries.clear();
    }
}

impl Ui for TuiView {
    fn alert(&mut self, message: &str) {
        self.status = Some(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::WorkoutFactory;

    #[test]
    fn test_format_details_running() {
        let workout = WorkoutFactory::default()
            .create(WorkoutKind::Running, Coords::new(51.5, -0.1), &RawFields::new(5, 25).with_cadence(150))
            .unwrap();
        assert_eq!(format_details(&workout), "🏃 5 km  ⏱ 25 min  ⚡ 5.0 min/km  🦶 150 spm");
    }

    #[test]
    fn test_format_details_cycling() {
        let workout = WorkoutFactory::default()
            .create(WorkoutKind::Cycling, Coords::new(51.5, -0.1), &RawFields::new(20, 60).with_elevation_gain(300))
            .unwrap();
        assert_eq!(format_details(&workout), "🚲 20 km  ⏱ 60 min  ⚡ 20.0 km/h  ⛰ 300 m");
    }

    #[test]
    fn test_focused_input_follows_kind() {
        let mut form = FormState { focus: FormField::Extra, ..FormState::default() };
        form.focused_input().unwrap().push('9');
        form.kind = WorkoutKind::Cycling;
        form.focused_input().unwrap().push('7');

        assert_eq!(form.cadence, "9");
        assert_eq!(form.elevation_gain, "7");
        form.focus = FormField::Kind;
        assert!(form.focused_input().is_none());
    }

    #[test]
    fn test_form_field_cycle() {
        let mut field = FormField::Kind;
        for _ in 0..4 {
            field = field.next();
        }
        assert_eq!(field, FormField::Kind);
        assert_eq!(FormField::Kind.prev(), FormField::Extra);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut view = TuiView::default();
        view.zoom_by(-5);
        assert_eq!(view.zoom, MIN_ZOOM);
        view.center_on(Coords::new(0.0, 0.0), 40);
        assert_eq!(view.zoom, MAX_ZOOM);
    }

    #[test]
    fn test_cursor_stays_in_world() {
        let mut view = TuiView::default();
        view.center_on(Coords::new(89.9, 179.9), MIN_ZOOM);
        for _ in 0..50 {
            view.move_cursor(1.0, 1.0);
        }
        assert!(view.cursor.is_valid());
    }

    #[test]
    fn test_clear_resets_inputs() {
        let mut view = TuiView::default();
        view.form.distance = "5".to_string();
        view.show_error("bad");
        view.clear();
        assert!(view.form.distance.is_empty());
        assert!(view.form.error.is_none());
    }
}
