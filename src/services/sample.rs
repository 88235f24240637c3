//! Seeded synthetic snapshot for running the pipeline without network access
//! (dashboard work, demos, cold-start development). Deterministic per start
//! date so repeated runs produce the same store.

use chrono::{Datelike, Duration, NaiveDate, Utc};
use diesel::SqliteConnection;
use log::info;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

use crate::db::models::{CropRecord, DegreeDayRecord, ForecastRecord};
use crate::services::normalize::Snapshot;
use crate::services::snapshot;

const FORECAST_DAYS: i64 = 7;
/// Rice base temperature for degree-day accumulation.
const GDD_BASE_TEMP_C: f64 = 10.0;

const STATIONS: [&str; 5] = ["臺中", "嘉義", "臺南", "高雄", "花蓮"];
const WEATHER_DESCRIPTIONS: [&str; 4] = ["晴時多雲", "多雲", "多雲短暫雨", "陰短暫雨"];
const CROP_FIELDS: [(&str, &str); 3] = [
    ("斗南", "台稉九號"),
    ("西螺", "台南十一號"),
    ("二林", "台中一九四號"),
];

pub fn run(conn: &mut SqliteConnection) -> Result<usize, String> {
    let snapshot = generate(Utc::now().date_naive());
    let written = snapshot::replace_snapshot(conn, &snapshot)?;
    info!(
        "Sample data: wrote {} row(s) for {} station(s), {} crop field(s)",
        written,
        STATIONS.len(),
        CROP_FIELDS.len()
    );
    Ok(written)
}

pub fn generate(start: NaiveDate) -> Snapshot {
    let mut rng = SmallRng::seed_from_u64(0xA6B1_C0DE ^ start.num_days_from_ce() as u64);

    let mut forecasts = Vec::with_capacity(STATIONS.len() * FORECAST_DAYS as usize);
    let mut degree_days = Vec::with_capacity(STATIONS.len() * FORECAST_DAYS as usize);

    for (idx, station) in STATIONS.iter().enumerate() {
        // Warmer the further down the list; the seasonal term swings ±6 °C
        // over the year.
        let mut accumulated = 600.0 + 150.0 * idx as f64;
        for offset in 0..FORECAST_DAYS {
            let date = start + Duration::days(offset);
            let seasonal = (2.0 * PI * date.ordinal0() as f64 / 365.0 - PI / 2.0).sin();
            let max_temp = 24.0 + idx as f64 * 0.8 + 6.0 * seasonal + rng.random_range(-1.5..=1.5);
            let min_temp = max_temp - rng.random_range(5.0..=9.0);
            let description = WEATHER_DESCRIPTIONS[rng.random_range(0..WEATHER_DESCRIPTIONS.len())];

            let mean_temp = (max_temp + min_temp) / 2.0;
            let degree_day = (mean_temp - GDD_BASE_TEMP_C).max(0.0);
            accumulated += degree_day;

            forecasts.push(ForecastRecord {
                location: station.to_string(),
                date,
                min_temp: round1(min_temp),
                max_temp: round1(max_temp),
                description: description.to_string(),
            });
            degree_days.push(DegreeDayRecord {
                location: station.to_string(),
                date,
                degree_day: round1(degree_day),
                accumulated_temp: round1(accumulated),
            });
        }
    }

    let crops = CROP_FIELDS
        .iter()
        .map(|(location, breed)| {
            let growing_days = rng.random_range(35..110);
            CropRecord {
                location: location.to_string(),
                crop_breed: breed.to_string(),
                growing_days,
                accumulated_temp: round1(growing_days as f64 * rng.random_range(12.0..=16.0)),
                description: "生長正常，持續監測中。".to_string(),
            }
        })
        .collect();

    let d1 = start.day();
    let d2 = (start + Duration::days(1)).day();
    let d3 = (start + Duration::days(2)).day();
    let overview = format!(
        "{d1}日、{d2}日，東北季風增強，北部轉涼有雨;{d3}日起，氣溫逐漸回升，日夜溫差大，請注意田間通風。"
    );

    Snapshot {
        forecasts,
        degree_days,
        crops,
        overview,
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 28).unwrap()
    }

    #[test]
    fn generates_full_week_per_station() {
        let snapshot = generate(start());
        assert_eq!(snapshot.forecasts.len(), STATIONS.len() * FORECAST_DAYS as usize);
        assert_eq!(snapshot.degree_days.len(), snapshot.forecasts.len());
        assert_eq!(snapshot.crops.len(), CROP_FIELDS.len());
        assert!(!snapshot.overview.is_empty());
    }

    #[test]
    fn accumulated_temperature_is_monotone_per_station() {
        let snapshot = generate(start());
        for station in STATIONS {
            let series: Vec<f64> = snapshot
                .degree_days
                .iter()
                .filter(|r| r.location == station)
                .map(|r| r.accumulated_temp)
                .collect();
            assert!(series.windows(2).all(|w| w[0] <= w[1]), "station {station}: {series:?}");
        }
    }

    #[test]
    fn min_never_exceeds_max() {
        let snapshot = generate(start());
        assert!(snapshot.forecasts.iter().all(|r| r.min_temp < r.max_temp));
    }

    #[test]
    fn deterministic_for_a_given_start_date() {
        assert_eq!(generate(start()), generate(start()));
    }

    #[test]
    fn overview_parses_into_dated_entries() {
        let entries = crate::formatter::parse_overview(&generate(start()).overview);
        assert!(entries.iter().any(|e| e.day.is_some()));
    }
}
