use std::path::Path;

use axum::{
    Router,
    middleware::from_fn,
    routing::{delete, get, post, put},
};
use diesel::{
    SqliteConnection,
    connection::SimpleConnection,
    r2d2::{ConnectionManager, CustomizeConnection, Pool},
};
use diesel_migrations::MigrationHarness;
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::{
    MIGRATIONS,
    admin::admin_page,
    brackets::{
        build::Seeding,
        manage::{bracket_manage_page, generate_bracket, schedule_match},
        results::{record_result, ui_record_result},
        view::{bracket_fragment, bracket_page, get_bracket},
    },
    divisions::{
        competitors::{add_competitors, competitors_list},
        manage::{
            create_division, delete_division, division_setup_page,
            list_divisions, ui_add_division, ui_delete_division,
            ui_divisions_list, update_division,
        },
    },
    rings::{
        manage::{create_ring, list_rings, ui_add_ring, ui_delete_ring, ui_rings_list},
        public::{public_rings_fragment, public_rings_page},
        scorekeeper::ring_scorekeeper_page,
    },
    state::{AppState, DbPool, tx_commit},
};

/// Server settings, read from a TOML file such as
///
/// ```toml
/// database_url = "tournament.db"
/// bind = "0.0.0.0:5000"
///
/// [brackets]
/// shuffle = true
/// seed = 42
/// ```
///
/// Every key is optional.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub database_url: String,
    pub bind: String,
    pub brackets: BracketSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: "tournament.db".to_string(),
            bind: "0.0.0.0:5000".to_string(),
            brackets: BracketSettings::default(),
        }
    }
}

/// How new brackets are seeded.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct BracketSettings {
    /// Shuffle the competitors before they are dealt into the first round.
    pub shuffle: bool,
    /// Makes shuffling reproducible. A fresh seed is drawn for every bracket
    /// when unset.
    pub seed: Option<u64>,
}

impl BracketSettings {
    pub fn seeding(&self) -> Seeding {
        match (self.shuffle, self.seed) {
            (false, _) => Seeding::Ordered,
            (true, Some(seed)) => Seeding::Shuffled(seed),
            (true, None) => Seeding::Shuffled(rand::random()),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Read(std::io::Error),
    Parse(toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Read(e) => write!(f, "could not read config file: {e}"),
            ConfigError::Parse(e) => write!(f, "invalid config file: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Settings {
    pub fn from_toml(text: &str) -> Result<Settings, ConfigError> {
        toml::from_str(text).map_err(ConfigError::Parse)
    }

    /// Reads the settings file, if there is one.
    pub fn load(path: Option<&Path>) -> Result<Settings, ConfigError> {
        match path {
            Some(path) => {
                let text =
                    std::fs::read_to_string(path).map_err(ConfigError::Read)?;
                Self::from_toml(&text)
            }
            None => Ok(Settings::default()),
        }
    }

    /// Values given on the command line (or through the environment) win
    /// over the file.
    pub fn with_overrides(
        mut self,
        database_url: Option<String>,
        bind: Option<String>,
    ) -> Settings {
        if let Some(url) = database_url {
            self.database_url = url;
        }
        if let Some(bind) = bind {
            self.bind = bind;
        }
        self
    }
}

#[derive(Debug)]
struct SqlitePragmas;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
    fn on_acquire(
        &self,
        conn: &mut SqliteConnection,
    ) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// An in-memory database lives and dies with its connection, so it gets a
/// pool of exactly one connection which is never recycled.
pub fn make_pool(db_url: &str) -> Result<DbPool, diesel::r2d2::PoolError> {
    let memory = db_url == ":memory:";
    let builder = Pool::builder()
        .max_size(if memory { 1 } else { 10 })
        .connection_customizer(Box::new(SqlitePragmas));
    let builder = if memory {
        builder.idle_timeout(None).max_lifetime(None)
    } else {
        builder
    };

    builder.build(ConnectionManager::<SqliteConnection>::new(db_url))
}

pub fn run_migrations(
    pool: &DbPool,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    tracing::info!("applied {} migrations", applied.len());
    Ok(())
}

/// Reverts every migration and runs them again, leaving empty tables.
/// Returns how many migrations were reverted and applied.
pub fn reset_database(
    pool: &DbPool,
) -> Result<(usize, usize), Box<dyn std::error::Error + Send + Sync>> {
    let mut conn = pool.get()?;
    let reverted = conn.revert_all_migrations(MIGRATIONS)?.len();
    let applied = conn.run_pending_migrations(MIGRATIONS)?.len();
    Ok((reverted, applied))
}

pub fn create_app(pool: DbPool) -> Router {
    create_app_with(pool, BracketSettings::default())
}

pub fn create_app_with(pool: DbPool, brackets: BracketSettings) -> Router {
    Router::new()
        // pages
        .route("/", get(public_rings_page))
        .route("/admin", get(admin_page))
        .route("/admin/divisions/:id/setup", get(division_setup_page))
        .route("/admin/divisions/:id/bracket_manage", get(bracket_manage_page))
        .route("/ui/divisions/:id/bracket", get(bracket_page))
        .route("/ring/:id/scorekeeper", get(ring_scorekeeper_page))
        // htmx fragments
        .route("/ui/public_rings", get(public_rings_fragment))
        .route("/ui/rings", post(ui_add_ring))
        .route("/ui/rings_list", get(ui_rings_list))
        .route("/ui/rings/:id", delete(ui_delete_ring))
        .route("/ui/divisions", post(ui_add_division))
        .route("/ui/divisions_list", get(ui_divisions_list))
        .route("/ui/divisions/:id", delete(ui_delete_division))
        .route("/ui/divisions/:id/competitors", post(add_competitors))
        .route("/ui/divisions/:id/competitors_list", get(competitors_list))
        .route("/ui/matches/:id/result", post(ui_record_result))
        .route("/divisions/:id/generate_bracket", post(generate_bracket))
        .route("/divisions/:id/bracket_ui", get(bracket_fragment))
        .route("/matches/:id/schedule", put(schedule_match))
        // JSON
        .route("/rings", get(list_rings).post(create_ring))
        .route("/divisions", get(list_divisions).post(create_division))
        .route(
            "/divisions/:id",
            put(update_division).delete(delete_division),
        )
        .route("/divisions/:id/bracket", get(get_bracket))
        .route("/matches/:id/result", post(record_result))
        .layer(from_fn(tx_commit))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { pool, brackets })
}
