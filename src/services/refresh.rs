//! Refresh orchestration: fetch, normalize, replace the snapshot.
//!
//! Exactly two failure sentinels cross this boundary (plus the in-flight
//! rejection): a schema-shape failure means the provider changed the document
//! and a developer needs to look, anything else means "try again later". Either
//! way the store still holds the previous snapshot. Per-record omissions never
//! surface here; normalization absorbs them.

use diesel::SqliteConnection;
use log::info;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::client::{CwaClient, CwaClientError};
use crate::services::normalize::{self, SchemaShapeError};
use crate::services::snapshot;

// The store has no locking of its own, so refreshes are serialized here: a
// request arriving while one runs is rejected, not queued.
static IN_FLIGHT: AtomicBool = AtomicBool::new(false);

#[derive(Debug)]
pub enum RefreshError {
    /// The document envelope no longer matches; retrying will not help.
    SchemaChanged(SchemaShapeError),
    /// Transport, decode or storage failure; the previous snapshot is intact.
    Unavailable(String),
    /// Another refresh is already running; this one was rejected unstarted.
    InFlight,
}

impl core::fmt::Display for RefreshError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RefreshError::SchemaChanged(e) => write!(f, "data format changed: {}", e),
            RefreshError::Unavailable(s) => write!(f, "could not retrieve data, try later: {}", s),
            RefreshError::InFlight => write!(f, "a refresh is already in flight"),
        }
    }
}

impl std::error::Error for RefreshError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RefreshError::SchemaChanged(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CwaClientError> for RefreshError {
    fn from(value: CwaClientError) -> Self {
        RefreshError::Unavailable(value.to_string())
    }
}

impl From<SchemaShapeError> for RefreshError {
    fn from(value: SchemaShapeError) -> Self {
        RefreshError::SchemaChanged(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSummary {
    pub forecast_rows: usize,
    pub degree_day_rows: usize,
    pub crop_rows: usize,
    /// Rows written across the three tabular tables. Zero is a valid success:
    /// the feed currently has no data in any category.
    pub rows_written: usize,
}

pub fn run(conn: &mut SqliteConnection, client: &CwaClient) -> Result<RefreshSummary, RefreshError> {
    if IN_FLIGHT.swap(true, Ordering::SeqCst) {
        return Err(RefreshError::InFlight);
    }
    let result = execute(conn, client);
    IN_FLIGHT.store(false, Ordering::SeqCst);
    result
}

fn execute(conn: &mut SqliteConnection, client: &CwaClient) -> Result<RefreshSummary, RefreshError> {
    let doc = client.get_agr_forecast()?;
    let snapshot = normalize::normalize(&doc)?;
    let rows_written = snapshot::replace_snapshot(conn, &snapshot).map_err(RefreshError::Unavailable)?;

    let summary = RefreshSummary {
        forecast_rows: snapshot.forecasts.len(),
        degree_day_rows: snapshot.degree_days.len(),
        crop_rows: snapshot.crops.len(),
        rows_written,
    };
    info!(
        "Refresh complete: {} row(s) written ({} forecast, {} degree-day, {} crop)",
        summary.rows_written, summary.forecast_rows, summary.degree_day_rows, summary.crop_rows
    );
    Ok(summary)
}
