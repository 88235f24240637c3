//! Diesel row structs for the four snapshot tables.
//!
//! The tables carry no surrogate ids or server-side timestamps, so one struct
//! per table serves both reads and inserts.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema;

/// One forecast day for one station, merged from the three parallel
/// per-element sequences in the source document.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Insertable, Serialize, Deserialize)]
#[diesel(table_name = schema::forecasts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ForecastRecord {
    pub location: String,
    pub date: NaiveDate,
    pub min_temp: f64,
    pub max_temp: f64,
    pub description: String,
}

/// Daily growing-degree-day figure plus the running accumulated temperature.
/// The source keeps `accumulated_temp` monotone per location; we store what we
/// are given and do not enforce it.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Insertable, Serialize, Deserialize)]
#[diesel(table_name = schema::degree_days)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DegreeDayRecord {
    pub location: String,
    pub date: NaiveDate,
    pub degree_day: f64,
    pub accumulated_temp: f64,
}

/// Crop monitoring card for one demonstration field.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Insertable, Serialize, Deserialize)]
#[diesel(table_name = schema::crop_stats)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CropRecord {
    pub location: String,
    pub crop_breed: String,
    pub growing_days: i32,
    pub accumulated_temp: f64,
    pub description: String,
}

/// Weekly narrative text; at most one row exists at any time.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Insertable, Serialize, Deserialize)]
#[diesel(table_name = schema::overview)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OverviewRecord {
    pub content: String,
    pub update_time: NaiveDateTime,
}
