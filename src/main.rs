pub mod models {
    pub mod cwa;
}

pub mod client;
pub mod config;
pub mod db {
    pub mod models;
}
pub mod formatter;
pub mod schema;
pub mod services {
    pub mod normalize;
    pub mod refresh;
    pub mod sample;
    pub mod snapshot;
}

use crate::client::CwaClient;
use crate::config::Config;
use crate::services::refresh::RefreshError;
use crate::services::{refresh, sample, snapshot};
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::{error, info, warn};
use std::collections::BTreeSet;

pub fn run() -> Result<(), String> {
    // 1) Load config
    let cfg = Config::from_env()?;
    info!(
        "Config loaded (endpoint={}, db={}, timeout={}s, sample_data={})",
        cfg.endpoint,
        cfg.database_path,
        cfg.request_timeout.as_secs(),
        cfg.sample_data_enabled
    );

    // 2) Open the snapshot store; table creation is idempotent
    let mut conn = SqliteConnection::establish(&cfg.database_path)
        .map_err(|e| format!("opening store {} failed: {}", cfg.database_path, e))?;
    snapshot::ensure_schema(&mut conn)?;
    info!("Snapshot store ready at {}", cfg.database_path);

    // 3) Refresh the snapshot (or seed it synthetically)
    if cfg.sample_data_enabled {
        sample::run(&mut conn)?;
    } else {
        let client = CwaClient::new(&cfg);
        match refresh::run(&mut conn, &client) {
            Ok(_) => {}
            // A failed refresh keeps the previous snapshot on display; only the
            // shape sentinel is worth waking a developer for.
            Err(e @ RefreshError::SchemaChanged(_)) => error!("{}", e),
            Err(e) => warn!("{}", e),
        }
    }

    // 4) Read-side summary through the same accessors the dashboard uses
    report_snapshot(&mut conn);
    Ok(())
}

fn report_snapshot(conn: &mut SqliteConnection) {
    let forecasts = snapshot::load_forecasts(conn);
    let degree_days = snapshot::load_degree_days(conn);
    let crops = snapshot::load_crop_stats(conn);

    let locations: BTreeSet<&str> = forecasts.iter().map(|r| r.location.as_str()).collect();
    info!(
        "Snapshot: {} forecast row(s) across {} location(s), {} degree-day row(s), {} crop card(s)",
        forecasts.len(),
        locations.len(),
        degree_days.len(),
        crops.len()
    );

    for row in snapshot::load_overview(conn) {
        info!("Overview (updated {}):", row.update_time.format("%Y-%m-%d %H:%M"));
        for entry in formatter::parse_overview(&row.content) {
            match &entry.day {
                Some(day) => info!("  [{}] {}", day, entry.content),
                None => info!("  {}", entry.content),
            }
        }
    }
}

fn main() {
    let default_filter = env_logger::Env::default().default_filter_or("info");
    env_logger::Builder::from_env(default_filter)
        .format_timestamp_secs()
        .init();

    info!(
        "cwa-agriweather {} (git {}) starting",
        env!("CARGO_PKG_VERSION"),
        env!("BUILD_TIME_GIT_HASH")
    );
    if let Err(e) = run() {
        error!("fatal: {}", e);
        std::process::exit(1);
    }
}
