//! Hand-maintained table definitions. There are no migrations; the DDL lives in
//! `services::snapshot::ensure_schema` and must stay in sync with these.

diesel::table! {
    forecasts (location, date) {
        location -> Text,
        date -> Date,
        min_temp -> Double,
        max_temp -> Double,
        description -> Text,
    }
}

diesel::table! {
    degree_days (location, date) {
        location -> Text,
        date -> Date,
        degree_day -> Double,
        accumulated_temp -> Double,
    }
}

diesel::table! {
    crop_stats (location, crop_breed) {
        location -> Text,
        crop_breed -> Text,
        growing_days -> Integer,
        accumulated_temp -> Double,
        description -> Text,
    }
}

diesel::table! {
    overview (update_time) {
        content -> Text,
        update_time -> Timestamp,
    }
}

diesel::allow_tables_to_appear_in_same_query!(forecasts, degree_days, crop_stats, overview);
