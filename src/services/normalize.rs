//! Flattening of the nested forecast document into snapshot rows.
//!
//! The document is the de facto schema and the provider does not guarantee it.
//! Only the top navigation path is load-bearing: if it is missing, the whole
//! refresh fails with a shape error. Everything below it degrades per record:
//! missing optional fields become defaults, records missing their key are
//! skipped, and an empty feed is a valid (zero-row) snapshot.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::db::models::{CropRecord, DegreeDayRecord, ForecastRecord};
use crate::models::cwa::{
    AgrLocation, CropLocation, CwaDocument, DailyEntry, DailySeries, ForecastLocation, Scalar,
};

/// Narrative fallback when the document carries no `weatherProfile`.
pub const DEFAULT_OVERVIEW: &str = "目前無概況資料";
/// Breed fallback for crop cards without one.
pub const DEFAULT_CROP_BREED: &str = "未知品種";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A required navigation node was absent, meaning the provider changed the
/// document shape. Distinct from transport/decode failures: this one needs
/// developer attention, not a retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaShapeError {
    pub missing: &'static str,
}

impl core::fmt::Display for SchemaShapeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "unexpected document shape: missing {}", self.missing)
    }
}

impl std::error::Error for SchemaShapeError {}

/// Everything one refresh writes: the three tabular record kinds plus the
/// narrative overview text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub forecasts: Vec<ForecastRecord>,
    pub degree_days: Vec<DegreeDayRecord>,
    pub crops: Vec<CropRecord>,
    pub overview: String,
}

impl Snapshot {
    /// Row count across the three tabular kinds (the overview is not counted).
    pub fn tabular_rows(&self) -> usize {
        self.forecasts.len() + self.degree_days.len() + self.crops.len()
    }
}

pub fn normalize(doc: &CwaDocument) -> Result<Snapshot, SchemaShapeError> {
    let root = doc
        .cwaopendata
        .as_ref()
        .and_then(|e| e.resources.as_ref())
        .and_then(|r| r.resource.as_ref())
        .and_then(|r| r.data.as_ref())
        .and_then(|d| d.agr_weather_forecasts.as_ref())
        .ok_or(SchemaShapeError {
            missing: "cwaopendata.resources.resource.data.agrWeatherForecasts",
        })?;

    let overview = root
        .weather_profile
        .clone()
        .unwrap_or_else(|| DEFAULT_OVERVIEW.to_string());

    let forecast_locs = root
        .weather_forecasts
        .as_ref()
        .and_then(|w| w.location.as_ref())
        .ok_or(SchemaShapeError {
            missing: "agrWeatherForecasts.weatherForecasts.location",
        })?;

    // Advisories and crop statistics are optional; the crop node has been seen
    // both at the top level and nested under the advisories, top level winning.
    let advices = root.agr_advices.as_ref();
    let agr_locs = advices
        .and_then(|a| a.agr_forecasts.as_ref())
        .and_then(|f| f.location.as_deref())
        .unwrap_or(&[]);
    let crop_locs = root
        .crop_statistics
        .as_ref()
        .or_else(|| advices.and_then(|a| a.crop_statistics.as_ref()))
        .and_then(|c| c.crop.as_ref())
        .and_then(|c| c.location.as_deref())
        .unwrap_or(&[]);

    Ok(Snapshot {
        forecasts: flatten_forecasts(forecast_locs),
        degree_days: flatten_degree_days(agr_locs),
        crops: flatten_crops(crop_locs),
        overview,
    })
}

#[derive(Debug, Default)]
struct MergedDay {
    description: String,
    max_temp: f64,
    min_temp: f64,
}

fn flatten_forecasts(locations: &[ForecastLocation]) -> Vec<ForecastRecord> {
    let mut rows = Vec::new();
    for loc in locations {
        let Some(name) = loc.location_name.as_deref() else { continue };
        let Some(elements) = loc.weather_elements.as_ref() else { continue };

        // Seed known dates from the description sequence. Temperatures attach
        // only to seeded dates; a date that appears solely in a temperature
        // sequence is dropped. That mirrors the source feed's own merging and
        // is deliberate (see DESIGN.md).
        let mut by_date: BTreeMap<NaiveDate, MergedDay> = BTreeMap::new();
        for item in series_entries(elements.wx.as_ref()) {
            let Some(date) = entry_date(item) else { continue };
            by_date.insert(
                date,
                MergedDay {
                    description: item.weather.clone().unwrap_or_default(),
                    ..MergedDay::default()
                },
            );
        }
        for item in series_entries(elements.max_t.as_ref()) {
            let Some(date) = entry_date(item) else { continue };
            if let Some(day) = by_date.get_mut(&date) {
                day.max_temp = scalar_or_zero(item.temperature.as_ref());
            }
        }
        for item in series_entries(elements.min_t.as_ref()) {
            let Some(date) = entry_date(item) else { continue };
            if let Some(day) = by_date.get_mut(&date) {
                day.min_temp = scalar_or_zero(item.temperature.as_ref());
            }
        }

        for (date, day) in by_date {
            rows.push(ForecastRecord {
                location: name.to_string(),
                date,
                min_temp: day.min_temp,
                max_temp: day.max_temp,
                description: day.description,
            });
        }
    }
    rows
}

fn flatten_degree_days(locations: &[AgrLocation]) -> Vec<DegreeDayRecord> {
    let mut rows = Vec::new();
    for loc in locations {
        let Some(name) = loc.location_name.as_deref() else { continue };
        let daily = loc
            .weather_elements
            .as_ref()
            .and_then(|e| e.daily.as_deref())
            .unwrap_or(&[]);
        for item in daily {
            // The date is the record key; without it the row is meaningless.
            let Some(date) = parse_date(item.data_date.as_deref()) else { continue };
            rows.push(DegreeDayRecord {
                location: name.to_string(),
                date,
                degree_day: scalar_or_zero(item.degree_day.as_ref()),
                accumulated_temp: scalar_or_zero(item.accumulated_temperature.as_ref()),
            });
        }
    }
    rows
}

fn flatten_crops(locations: &[CropLocation]) -> Vec<CropRecord> {
    let mut rows = Vec::new();
    for loc in locations {
        let Some(name) = loc.location_name.as_deref() else { continue };
        let this_year = loc.statistics.as_ref().and_then(|s| s.this_year.as_ref());
        let period = this_year.and_then(|y| y.time_period.as_ref());

        // A card without either figure is not rendered at all.
        let growing_days = period.and_then(|p| p.growing_days.as_ref()).filter(|s| s.is_present());
        let accumulated = period
            .and_then(|p| p.accumulated_temperature.as_ref())
            .filter(|s| s.is_present());
        let (Some(growing_days), Some(accumulated)) = (growing_days, accumulated) else {
            continue;
        };

        rows.push(CropRecord {
            location: name.to_string(),
            crop_breed: loc
                .crop_breed
                .clone()
                .unwrap_or_else(|| DEFAULT_CROP_BREED.to_string()),
            growing_days: growing_days.as_i32().unwrap_or(0),
            accumulated_temp: accumulated.as_f64().unwrap_or(0.0),
            description: this_year
                .and_then(|y| y.description.clone())
                .unwrap_or_default(),
        });
    }
    rows
}

fn series_entries(series: Option<&DailySeries>) -> &[DailyEntry] {
    series.and_then(|s| s.daily.as_deref()).unwrap_or(&[])
}

fn entry_date(item: &DailyEntry) -> Option<NaiveDate> {
    parse_date(item.data_date.as_deref())
}

fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    raw.and_then(|s| NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok())
}

fn scalar_or_zero(value: Option<&Scalar>) -> f64 {
    value.and_then(Scalar::as_f64).unwrap_or(0.0)
}
