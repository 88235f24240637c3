//! SQLite snapshot store.
//!
//! The store is a cache of the latest successful fetch, not a time series:
//! every refresh truncates and repopulates all four tables inside a single
//! transaction, so a reader never observes some tables cleared and others
//! stale. Table creation is idempotent and runs on every process start; there
//! are no migrations.

use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::warn;

use crate::db::models::{CropRecord, DegreeDayRecord, ForecastRecord, OverviewRecord};
use crate::schema;
use crate::services::normalize::Snapshot;

// Must stay in sync with the table! declarations in `crate::schema`.
const DDL: [&str; 4] = [
    "CREATE TABLE IF NOT EXISTS forecasts (
        location TEXT NOT NULL,
        date TEXT NOT NULL,
        min_temp REAL NOT NULL,
        max_temp REAL NOT NULL,
        description TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS degree_days (
        location TEXT NOT NULL,
        date TEXT NOT NULL,
        degree_day REAL NOT NULL,
        accumulated_temp REAL NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS crop_stats (
        location TEXT NOT NULL,
        crop_breed TEXT NOT NULL,
        growing_days INTEGER NOT NULL,
        accumulated_temp REAL NOT NULL,
        description TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS overview (
        content TEXT NOT NULL,
        update_time TEXT NOT NULL
    )",
];

pub fn ensure_schema(conn: &mut SqliteConnection) -> Result<(), String> {
    for ddl in DDL {
        diesel::sql_query(ddl)
            .execute(conn)
            .map_err(|e| format!("schema setup failed: {}", e))?;
    }
    Ok(())
}

/// Replace the whole snapshot in one transaction. Returns the number of rows
/// written across the three tabular kinds (the overview row is not counted).
/// On error the transaction rolls back and the previous snapshot survives.
pub fn replace_snapshot(conn: &mut SqliteConnection, snapshot: &Snapshot) -> Result<usize, String> {
    use schema::crop_stats::dsl as C;
    use schema::degree_days::dsl as D;
    use schema::forecasts::dsl as F;
    use schema::overview::dsl as O;

    conn.transaction::<usize, diesel::result::Error, _>(|conn| {
        let mut written = 0;

        diesel::delete(F::forecasts).execute(conn)?;
        if !snapshot.forecasts.is_empty() {
            written += diesel::insert_into(F::forecasts)
                .values(&snapshot.forecasts)
                .execute(conn)?;
        }

        diesel::delete(D::degree_days).execute(conn)?;
        if !snapshot.degree_days.is_empty() {
            written += diesel::insert_into(D::degree_days)
                .values(&snapshot.degree_days)
                .execute(conn)?;
        }

        diesel::delete(C::crop_stats).execute(conn)?;
        if !snapshot.crops.is_empty() {
            written += diesel::insert_into(C::crop_stats)
                .values(&snapshot.crops)
                .execute(conn)?;
        }

        diesel::delete(O::overview).execute(conn)?;
        if !snapshot.overview.trim().is_empty() {
            let row = OverviewRecord {
                content: snapshot.overview.clone(),
                update_time: Utc::now().naive_utc(),
            };
            diesel::insert_into(O::overview).values(&row).execute(conn)?;
        }

        Ok(written)
    })
    .map_err(|e| format!("snapshot replace failed: {}", e))
}

// Read accessors never fail hard: the display layer treats "no data" and
// "could not read" the same way, so errors are logged and flattened to empty.

pub fn load_forecasts(conn: &mut SqliteConnection) -> Vec<ForecastRecord> {
    use schema::forecasts::dsl as F;
    rows_or_empty(
        F::forecasts
            .select(ForecastRecord::as_select())
            .order((F::location.asc(), F::date.asc()))
            .load(conn),
        "forecasts",
    )
}

pub fn load_degree_days(conn: &mut SqliteConnection) -> Vec<DegreeDayRecord> {
    use schema::degree_days::dsl as D;
    rows_or_empty(
        D::degree_days
            .select(DegreeDayRecord::as_select())
            .order((D::location.asc(), D::date.asc()))
            .load(conn),
        "degree_days",
    )
}

pub fn load_crop_stats(conn: &mut SqliteConnection) -> Vec<CropRecord> {
    use schema::crop_stats::dsl as C;
    rows_or_empty(
        C::crop_stats
            .select(CropRecord::as_select())
            .order((C::location.asc(), C::crop_breed.asc()))
            .load(conn),
        "crop_stats",
    )
}

pub fn load_overview(conn: &mut SqliteConnection) -> Vec<OverviewRecord> {
    use schema::overview::dsl as O;
    rows_or_empty(
        O::overview
            .select(OverviewRecord::as_select())
            .order(O::update_time.desc())
            .load(conn),
        "overview",
    )
}

fn rows_or_empty<T>(result: QueryResult<Vec<T>>, table: &str) -> Vec<T> {
    match result {
        Ok(rows) => rows,
        Err(e) => {
            warn!("reading {} failed: {}", table, e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn test_conn() -> SqliteConnection {
        let mut conn = SqliteConnection::establish(":memory:").expect("in-memory sqlite");
        ensure_schema(&mut conn).expect("schema");
        conn
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sample_snapshot() -> Snapshot {
        Snapshot {
            forecasts: vec![
                ForecastRecord {
                    location: "臺中".into(),
                    date: date("2025-11-29"),
                    min_temp: 16.0,
                    max_temp: 26.1,
                    description: "晴時多雲".into(),
                },
                ForecastRecord {
                    location: "臺中".into(),
                    date: date("2025-11-28"),
                    min_temp: 17.2,
                    max_temp: 24.5,
                    description: "多雲短暫雨".into(),
                },
            ],
            degree_days: vec![DegreeDayRecord {
                location: "臺中".into(),
                date: date("2025-11-28"),
                degree_day: 11.2,
                accumulated_temp: 830.5,
            }],
            crops: vec![CropRecord {
                location: "斗南".into(),
                crop_breed: "台稉九號".into(),
                growing_days: 62,
                accumulated_temp: 1250.3,
                description: "分蘗盛期".into(),
            }],
            overview: "28日，東北季風增強。".into(),
        }
    }

    #[test]
    fn ensure_schema_is_idempotent() {
        let mut conn = test_conn();
        ensure_schema(&mut conn).expect("second run");
    }

    #[test]
    fn written_count_matches_tabular_rows() {
        let mut conn = test_conn();
        let snapshot = sample_snapshot();
        let written = replace_snapshot(&mut conn, &snapshot).unwrap();
        assert_eq!(written, snapshot.tabular_rows());
    }

    #[test]
    fn refresh_fully_replaces_previous_snapshot() {
        let mut conn = test_conn();
        replace_snapshot(&mut conn, &sample_snapshot()).unwrap();

        let mut smaller = sample_snapshot();
        smaller.forecasts.truncate(1);
        smaller.degree_days.clear();
        let written = replace_snapshot(&mut conn, &smaller).unwrap();

        assert_eq!(written, 2);
        assert_eq!(load_forecasts(&mut conn).len(), 1);
        assert_eq!(load_degree_days(&mut conn).len(), 0);
        assert_eq!(load_crop_stats(&mut conn).len(), 1);
    }

    #[test]
    fn forecasts_come_back_ordered_by_location_and_date() {
        let mut conn = test_conn();
        replace_snapshot(&mut conn, &sample_snapshot()).unwrap();

        let rows = load_forecasts(&mut conn);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, date("2025-11-28"));
        assert_eq!(rows[1].date, date("2025-11-29"));
    }

    #[test]
    fn overview_holds_exactly_one_row() {
        let mut conn = test_conn();
        replace_snapshot(&mut conn, &sample_snapshot()).unwrap();
        replace_snapshot(&mut conn, &sample_snapshot()).unwrap();

        let rows = load_overview(&mut conn);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].content, "28日，東北季風增強。");
    }

    #[test]
    fn empty_overview_text_leaves_table_empty() {
        let mut conn = test_conn();
        let mut snapshot = sample_snapshot();
        snapshot.overview = String::new();
        replace_snapshot(&mut conn, &snapshot).unwrap();
        assert!(load_overview(&mut conn).is_empty());
    }

    #[test]
    fn zero_row_snapshot_truncates_everything() {
        let mut conn = test_conn();
        replace_snapshot(&mut conn, &sample_snapshot()).unwrap();
        let written = replace_snapshot(&mut conn, &Snapshot::default()).unwrap();
        assert_eq!(written, 0);
        assert!(load_forecasts(&mut conn).is_empty());
        assert!(load_degree_days(&mut conn).is_empty());
        assert!(load_crop_stats(&mut conn).is_empty());
        assert!(load_overview(&mut conn).is_empty());
    }

    #[test]
    fn reads_against_missing_tables_return_empty() {
        // No ensure_schema: every accessor degrades to an empty sequence.
        let mut conn = SqliteConnection::establish(":memory:").expect("in-memory sqlite");
        assert!(load_forecasts(&mut conn).is_empty());
        assert!(load_degree_days(&mut conn).is_empty());
        assert!(load_crop_stats(&mut conn).is_empty());
        assert!(load_overview(&mut conn).is_empty());
    }
}
