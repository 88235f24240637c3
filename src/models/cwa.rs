//! Models for the CWA agricultural weather forecast document (`F-A0010-001`).
//!
//! Scope: types only — no API client code.
//!
//! Notes
//! - The provider does not guarantee this shape, so every field is `Option` and
//!   navigation decides what is fatal (see `services::normalize`).
//! - The file API delivers numeric fields as strings, but numbers have been
//!   observed after provider-side format changes; `Scalar` accepts both.

use serde::{Deserialize, Serialize};

/// Numeric field that arrives either as a JSON string ("25.3", possibly empty)
/// or as a bare number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(f64),
    Text(String),
}

impl Scalar {
    /// Numeric value, if the field holds one. Empty or unparseable text is `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => Some(*n),
            Scalar::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Scalar::Number(n) => Some(*n as i32),
            Scalar::Text(s) => s.trim().parse::<i32>().ok(),
        }
    }

    /// Mirrors the presence test used for crop rows: the field must exist and
    /// hold something other than an empty string.
    pub fn is_present(&self) -> bool {
        match self {
            Scalar::Number(_) => true,
            Scalar::Text(s) => !s.trim().is_empty(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CwaDocument {
    pub cwaopendata: Option<OpenDataEnvelope>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenDataEnvelope {
    pub resources: Option<Resources>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Resources {
    pub resource: Option<Resource>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Resource {
    pub data: Option<ResourceData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceData {
    pub agr_weather_forecasts: Option<AgrWeatherForecasts>,
}

/// The document root everything hangs off of.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgrWeatherForecasts {
    /// Free-text weekly narrative, Chinese.
    pub weather_profile: Option<String>,
    pub weather_forecasts: Option<WeatherForecasts>,
    pub agr_advices: Option<AgrAdvices>,
    /// Crop statistics have been observed both here and nested under
    /// `agrAdvices`; the top-level node wins when both exist.
    pub crop_statistics: Option<CropStatistics>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeatherForecasts {
    pub location: Option<Vec<ForecastLocation>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastLocation {
    pub location_name: Option<String>,
    pub weather_elements: Option<ForecastElements>,
}

/// Per-date values arrive as three parallel sequences rather than one row per
/// date: weather description, daily max, daily min.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForecastElements {
    #[serde(rename = "Wx")]
    pub wx: Option<DailySeries>,
    #[serde(rename = "MaxT")]
    pub max_t: Option<DailySeries>,
    #[serde(rename = "MinT")]
    pub min_t: Option<DailySeries>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailySeries {
    pub daily: Option<Vec<DailyEntry>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyEntry {
    pub data_date: Option<String>,
    /// Set on `Wx` entries.
    pub weather: Option<String>,
    /// Set on `MaxT`/`MinT` entries.
    pub temperature: Option<Scalar>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgrAdvices {
    pub agr_forecasts: Option<AgrForecasts>,
    pub crop_statistics: Option<CropStatistics>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgrForecasts {
    pub location: Option<Vec<AgrLocation>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgrLocation {
    pub location_name: Option<String>,
    pub weather_elements: Option<AgrElements>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgrElements {
    pub daily: Option<Vec<AgrDailyEntry>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgrDailyEntry {
    pub data_date: Option<String>,
    pub degree_day: Option<Scalar>,
    pub accumulated_temperature: Option<Scalar>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CropStatistics {
    pub crop: Option<CropGroup>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CropGroup {
    pub location: Option<Vec<CropLocation>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropLocation {
    pub location_name: Option<String>,
    pub crop_breed: Option<String>,
    pub statistics: Option<CropStatisticsDetail>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropStatisticsDetail {
    pub this_year: Option<CropYear>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropYear {
    pub description: Option<String>,
    pub time_period: Option<CropTimePeriod>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropTimePeriod {
    pub growing_days: Option<Scalar>,
    pub accumulated_temperature: Option<Scalar>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_accepts_string_and_number() {
        let s: Scalar = serde_json::from_str("\"25.3\"").unwrap();
        assert_eq!(s.as_f64(), Some(25.3));
        let n: Scalar = serde_json::from_str("25.3").unwrap();
        assert_eq!(n.as_f64(), Some(25.3));
    }

    #[test]
    fn empty_string_scalar_is_absent() {
        let s: Scalar = serde_json::from_str("\"\"").unwrap();
        assert!(!s.is_present());
        assert_eq!(s.as_f64(), None);
    }

    #[test]
    fn growing_days_parse_as_integer() {
        let s: Scalar = serde_json::from_str("\"75\"").unwrap();
        assert_eq!(s.as_i32(), Some(75));
    }
}
