//! waymark - Running and cycling log pinned to a map

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;

use waymark::config::Config;
use waymark::db::Database;
use waymark::factory::{ElevationPolicy, RawFields};
use waymark::location::{FixedLocation, LocationProvider};
use waymark::session::{FormView, ListView, MapView, SessionController, Ui};
use waymark::tui::{App, view::{TuiView, format_details}};
use waymark::workout::{Coords, Workout, WorkoutKind};

#[derive(Parser)]
#[command(name = "waymark")]
#[command(author, version, about = "Running and cycling log pinned to a map")]
struct Cli {
    /// SQLite database file
    #[arg(long, global = true, env = "WAYMARK_DB", default_value = "waymark.db")]
    db: PathBuf,

    /// Current location as "lat,lng"
    #[arg(long, global = true, env = "WAYMARK_LOCATION", allow_hyphen_values = true)]
    at: Option<Coords>,

    /// Elevation gain check for rides: strict or lenient
    #[arg(long, global = true, env = "WAYMARK_ELEVATION_POLICY", default_value = "strict")]
    elevation_policy: ElevationPolicy,

    /// Log file used while the TUI is open
    #[arg(long, global = true, env = "WAYMARK_LOG_FILE", default_value = "waymark.log")]
    log_file: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open TUI map and list
    Tui,

    /// Log a workout at a location
    Log {
        /// running or cycling
        kind: WorkoutKind,

        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lng: f64,

        /// Distance in km
        #[arg(short, long, allow_hyphen_values = true)]
        distance: String,

        /// Duration in minutes
        #[arg(short = 't', long, allow_hyphen_values = true)]
        duration: String,

        /// Steps per minute (running)
        #[arg(short, long, default_value = "", allow_hyphen_values = true)]
        cadence: String,

        /// Elevation gain in meters (cycling)
        #[arg(short, long, default_value = "", allow_hyphen_values = true)]
        elevation: String,
    },

    /// List logged workouts
    List,

    /// Show one workout
    Show {
        id: String,
    },

    /// Delete every stored workout
    Reset,
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            db_path: self.db.clone(),
            elevation_policy: self.elevation_policy,
            location: self.at,
            log_path: self.log_file.clone(),
            ..Config::default()
        }
    }
}

/// Prints what the session asks to draw
struct ConsoleUi {
    print_list: bool,
}

impl MapView for ConsoleUi {
    fn render_marker(&mut self, _coords: Coords, _label: &str, _style_class: &str) {}
    fn center_on(&mut self, _coords: Coords, _zoom: u8) {}
    fn clear_markers(&mut self) {}
}

impl FormView for ConsoleUi {
    fn show(&mut self) {}
    fn hide(&mut self) {}
    fn clear(&mut self) {}
    fn toggle_fields_for(&mut self, _kind: WorkoutKind) {}
    fn show_error(&mut self, message: &str) {
        eprintln!("Invalid workout: {}", message);
    }
}

impl ListView for ConsoleUi {
    fn render_workout(&mut self, workout: &Workout) {
        if self.print_list {
            print_workout(workout);
        }
    }
    fn clear_list(&mut self) {}
}

impl Ui for ConsoleUi {
    fn alert(&mut self, message: &str) {
        eprintln!("{}", message);
    }
}

fn print_workout(workout: &Workout) {
    println!(
        "{} | {:20} | {} | {}",
        workout.id(),
        workout.description(),
        workout.coords(),
        format_details(workout)
    );
}

fn open_db(config: &Config) -> Result<Database> {
    let path = config.db_path.to_string_lossy();
    Database::open(&path).with_context(|| format!("opening database {}", path))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = cli.config();

    match cli.command {
        Some(Commands::Tui) | None => {
            let log_file = std::fs::File::create(&config.log_path)
                .with_context(|| format!("creating log file {}", config.log_path.display()))?;
            tracing_subscriber::fmt()
                .with_writer(Mutex::new(log_file))
                .with_ansi(false)
                .init();

            let mut session = SessionController::from_config(&config, open_db(&config)?, TuiView::default());
            session.on_startup();

            let position = FixedLocation::new(config.location).request().await;
            session.on_position(position);

            let mut app = App::new(session);
            app.run()?;
        }

        Some(Commands::Log { kind, lat, lng, distance, duration, cadence, elevation }) => {
            tracing_subscriber::fmt().with_writer(std::io::stderr).init();

            let ui = ConsoleUi { print_list: false };
            let mut session = SessionController::from_config(&config, open_db(&config)?, ui);
            session.on_startup();
            session.on_location_picked(Coords::new(lat, lng));

            let fields = RawFields::new(distance, duration)
                .with_cadence(cadence)
                .with_elevation_gain(elevation);
            let workout = match session.on_form_submitted(kind, &fields) {
                Ok(workout) => workout,
                Err(e) => bail!("workout not logged: {}", e),
            };
            println!("Logged: {} (id: {})", workout.description(), workout.id());
            print_workout(&workout);
        }

        Some(Commands::List) => {
            tracing_subscriber::fmt().with_writer(std::io::stderr).init();

            let ui = ConsoleUi { print_list: true };
            let mut session = SessionController::from_config(&config, open_db(&config)?, ui);
            println!("Workouts:");
            println!("{:-<80}", "");
            session.on_startup();
            if session.store().is_empty() {
                println!("(none yet)");
            }
        }

        Some(Commands::Show { id }) => {
            tracing_subscriber::fmt().with_writer(std::io::stderr).init();

            let ui = ConsoleUi { print_list: false };
            let mut session = SessionController::from_config(&config, open_db(&config)?, ui);
            session.on_startup();
            let Some(workout) = session.store().find_by_id(&id) else {
                bail!("no workout with id {}", id);
            };
            print_workout(workout);
            println!("Logged at: {}", workout.created_at().format("%Y-%m-%d %H:%M"));
        }

        Some(Commands::Reset) => {
            tracing_subscriber::fmt().with_writer(std::io::stderr).init();

            let ui = ConsoleUi { print_list: false };
            let mut session = SessionController::from_config(&config, open_db(&config)?, ui);
            session.reset()?;
            info!(db = %config.db_path.display(), "Storage wiped");
            println!("All workouts deleted");
        }
    }

    Ok(())
}
