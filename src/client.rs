//! Blocking HTTP client for the CWA open-data file API.
//!
//! - Single GET endpoint (`F-A0010-001`), query-string authorization.
//! - Uses existing models in `crate::models::cwa`.
//! - The request carries the configured timeout; a hung remote server surfaces
//!   as a transport error instead of blocking the refresh forever.

use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::models::cwa::CwaDocument;

#[derive(Debug)]
pub enum CwaClientError {
    Transport(String),
    Http { status: u16, message: String },
    /// Decode failure, annotated with the JSON path that failed so a provider
    /// format change is diagnosable from the log line alone.
    Json(serde_path_to_error::Error<serde_json::Error>),
}

impl core::fmt::Display for CwaClientError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CwaClientError::Transport(s) => write!(f, "transport error: {}", s),
            CwaClientError::Http { status, message } => write!(f, "http {}: {}", status, message),
            CwaClientError::Json(e) => write!(f, "json error at {}: {}", e.path(), e.inner()),
        }
    }
}

impl std::error::Error for CwaClientError {}

pub struct CwaClient {
    agent: ureq::Agent,
    endpoint: String,
    api_key: String,
}

impl CwaClient {
    pub fn new(cfg: &Config) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(cfg.request_timeout).build();
        CwaClient {
            agent,
            endpoint: cfg.endpoint.clone(),
            api_key: cfg.api_key.clone(),
        }
    }

    fn get_json<T: DeserializeOwned>(&self) -> Result<T, CwaClientError> {
        let resp = self
            .agent
            .get(&self.endpoint)
            .query("Authorization", &self.api_key)
            .query("format", "JSON")
            .set("Accept", "application/json")
            .call();

        match resp {
            Ok(res) => {
                let mut de = serde_json::Deserializer::from_reader(res.into_reader());
                serde_path_to_error::deserialize(&mut de).map_err(CwaClientError::Json)
            }
            Err(ureq::Error::Transport(t)) => Err(CwaClientError::Transport(t.to_string())),
            Err(ureq::Error::Status(status, res)) => {
                let body = res.into_string().unwrap_or_else(|_| String::from("<no body>"));
                Err(CwaClientError::Http { status, message: body })
            }
        }
    }

    /// Fetch the current agricultural weather forecast document.
    pub fn get_agr_forecast(&self) -> Result<CwaDocument, CwaClientError> {
        self.get_json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_error_reports_path() {
        let bad = r#"{"cwaopendata": {"resources": {"resource": {"data": 42}}}}"#;
        let mut de = serde_json::Deserializer::from_str(bad);
        let err = serde_path_to_error::deserialize::<_, CwaDocument>(&mut de).unwrap_err();
        let msg = CwaClientError::Json(err).to_string();
        assert!(msg.contains("cwaopendata.resources.resource.data"), "got: {msg}");
    }
}
