//! # Remote-First Resolution
//!
//! Every engine lookup can be answered by a remote catalog service first and
//! by the local store when the remote cannot answer. The remote gets exactly
//! one attempt. Transport errors, bad status codes, undecodable bodies and
//! "no such entry" all fall through to the local resolver; the remote failure
//! is logged at `debug` and never reaches the caller.
//!
//! ## Example
//!
//! ```rust
//! use piping_core::fallback::{resolve_with_fallback, RemoteQuery};
//!
//! let query = RemoteQuery::GasketWeight { gasket_type: "SW-".into(), nominal_bore_mm: 100 };
//! // No remote configured: the local closure answers
//! let mass: f64 = resolve_with_fallback(None, &query, || 0.12);
//! assert_eq!(mass, 0.12);
//! ```

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::RemoteConfig;
use crate::errors::{EngineError, EngineResult};

/// User agent sent to the remote catalog
const USER_AGENT: &str = concat!("piping-engine/", env!("CARGO_PKG_VERSION"));

/// A lookup the remote catalog may be able to answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "query", rename_all = "snake_case")]
pub enum RemoteQuery {
    FlangeWeight {
        nominal_bore_mm: u32,
        pressure_class: String,
        standard: Option<String>,
        flange_type: String,
    },
    BlankFlangeWeight {
        nominal_bore_mm: u32,
        pressure_class: String,
    },
    SansBlankFlangeWeight {
        nominal_bore_mm: u32,
        table_designation: String,
    },
    BnwSetInfo {
        nominal_bore_mm: u32,
        pressure_class: String,
    },
    GasketWeight {
        gasket_type: String,
        nominal_bore_mm: u32,
    },
    RetainingRingWeight {
        nominal_bore_mm: u32,
        pipe_od_mm: Option<f64>,
    },
    PtRating {
        standard: String,
        designation: String,
        material_group: String,
        temperature_celsius: i32,
    },
}

impl RemoteQuery {
    /// Endpoint path, relative to the catalog base URL.
    pub fn path(&self) -> &'static str {
        match self {
            RemoteQuery::FlangeWeight { .. } => "flange-weight",
            RemoteQuery::BlankFlangeWeight { .. } => "blank-flange-weight",
            RemoteQuery::SansBlankFlangeWeight { .. } => "sans-blank-flange-weight",
            RemoteQuery::BnwSetInfo { .. } => "bnw-set",
            RemoteQuery::GasketWeight { .. } => "gasket-weight",
            RemoteQuery::RetainingRingWeight { .. } => "retaining-ring-weight",
            RemoteQuery::PtRating { .. } => "pt-rating",
        }
    }

    /// Query-string parameters. Absent optionals are omitted.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        match self {
            RemoteQuery::FlangeWeight {
                nominal_bore_mm,
                pressure_class,
                standard,
                flange_type,
            } => {
                let mut params = vec![
                    ("nb", nominal_bore_mm.to_string()),
                    ("pressureClass", pressure_class.clone()),
                    ("flangeType", flange_type.clone()),
                ];
                if let Some(standard) = standard {
                    params.push(("standard", standard.clone()));
                }
                params
            }
            RemoteQuery::BlankFlangeWeight {
                nominal_bore_mm,
                pressure_class,
            }
            | RemoteQuery::BnwSetInfo {
                nominal_bore_mm,
                pressure_class,
            } => vec![("nb", nominal_bore_mm.to_string()), ("pressureClass", pressure_class.clone())],
            RemoteQuery::SansBlankFlangeWeight {
                nominal_bore_mm,
                table_designation,
            } => vec![("nb", nominal_bore_mm.to_string()), ("tableDesignation", table_designation.clone())],
            RemoteQuery::GasketWeight {
                gasket_type,
                nominal_bore_mm,
            } => vec![("gasketType", gasket_type.clone()), ("nb", nominal_bore_mm.to_string())],
            RemoteQuery::RetainingRingWeight {
                nominal_bore_mm,
                pipe_od_mm,
            } => {
                let mut params = vec![("nb", nominal_bore_mm.to_string())];
                if let Some(od) = pipe_od_mm {
                    params.push(("pipeOd", od.to_string()));
                }
                params
            }
            RemoteQuery::PtRating {
                standard,
                designation,
                material_group,
                temperature_celsius,
            } => vec![
                ("standard", standard.clone()),
                ("designation", designation.clone()),
                ("materialGroup", material_group.clone()),
                ("temperature", temperature_celsius.to_string()),
            ],
        }
    }
}

/// A remote source of engineering lookups.
///
/// `Ok(None)` means the remote answered but has no entry for the query.
pub trait RemoteCatalog: Send + Sync {
    fn fetch(&self, query: &RemoteQuery) -> EngineResult<Option<serde_json::Value>>;
}

/// Ask `remote` once, falling back to `local` on any failure or miss.
pub fn resolve_with_fallback<T, F>(remote: Option<&dyn RemoteCatalog>, query: &RemoteQuery, local: F) -> T
where
    T: DeserializeOwned,
    F: FnOnce() -> T,
{
    if let Some(remote) = remote {
        match remote.fetch(query) {
            Ok(Some(value)) => match serde_json::from_value::<T>(value) {
                Ok(resolved) => return resolved,
                Err(e) => debug!(endpoint = query.path(), error = %e, "remote answer did not decode; using local data"),
            },
            Ok(None) => debug!(endpoint = query.path(), "remote has no entry; using local data"),
            Err(e) => debug!(endpoint = query.path(), error = %e, "remote lookup failed; using local data"),
        }
    }
    local()
}

// ============================================================================
// HTTP Catalog
// ============================================================================

/// Remote catalog over HTTP: `GET {base_url}/{path}?{params}` returning the
/// answer as a JSON body. `404` and a `null` body both mean "no entry".
pub struct HttpRemoteCatalog {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpRemoteCatalog {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> EngineResult<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| EngineError::remote_unavailable(&base_url, format!("Failed to create HTTP client: {}", e)))?;
        Ok(HttpRemoteCatalog { base_url, client })
    }

    /// Build a catalog from config; `None` when no base URL is configured.
    pub fn from_config(config: &RemoteConfig) -> EngineResult<Option<Self>> {
        match config.base_url.as_deref().map(str::trim).filter(|url| !url.is_empty()) {
            Some(url) => Self::new(url, Duration::from_secs(config.timeout_secs)).map(Some),
            None => Ok(None),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, query: &RemoteQuery) -> String {
        format!("{}/{}", self.base_url, query.path())
    }
}

impl RemoteCatalog for HttpRemoteCatalog {
    fn fetch(&self, query: &RemoteQuery) -> EngineResult<Option<serde_json::Value>> {
        let endpoint = self.endpoint(query);
        let response = self
            .client
            .get(&endpoint)
            .query(&query.params())
            .send()
            .map_err(|e| EngineError::remote_unavailable(&endpoint, format!("Network error: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(EngineError::remote_unavailable(&endpoint, format!("Catalog returned {}", status)));
        }

        let value: serde_json::Value = response
            .json()
            .map_err(|e| EngineError::remote_unavailable(&endpoint, format!("Failed to parse response: {}", e)))?;
        Ok(if value.is_null() { None } else { Some(value) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Reply {
        Value(serde_json::Value),
        Missing,
        Fail,
    }

    struct ScriptedCatalog {
        reply: Reply,
        calls: AtomicUsize,
    }

    impl ScriptedCatalog {
        fn new(reply: Reply) -> Self {
            ScriptedCatalog {
                reply,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl RemoteCatalog for ScriptedCatalog {
        fn fetch(&self, query: &RemoteQuery) -> EngineResult<Option<serde_json::Value>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Reply::Value(v) => Ok(Some(v.clone())),
                Reply::Missing => Ok(None),
                Reply::Fail => Err(EngineError::remote_unavailable(query.path(), "connection refused")),
            }
        }
    }

    fn query() -> RemoteQuery {
        RemoteQuery::BlankFlangeWeight {
            nominal_bore_mm: 200,
            pressure_class: "PN16".into(),
        }
    }

    #[test]
    fn test_remote_answer_wins() {
        let remote = ScriptedCatalog::new(Reply::Value(serde_json::json!(21.5)));
        let mass: f64 = resolve_with_fallback(Some(&remote as &dyn RemoteCatalog), &query(), || 19.8);
        assert_eq!(mass, 21.5);
    }

    #[test]
    fn test_failure_falls_back_after_one_attempt() {
        let remote = ScriptedCatalog::new(Reply::Fail);
        let mass: f64 = resolve_with_fallback(Some(&remote as &dyn RemoteCatalog), &query(), || 19.8);
        assert_eq!(mass, 19.8);
        assert_eq!(remote.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_missing_and_undecodable_fall_back() {
        let missing = ScriptedCatalog::new(Reply::Missing);
        assert_eq!(resolve_with_fallback::<f64, _>(Some(&missing as &dyn RemoteCatalog), &query(), || 19.8), 19.8);

        let garbage = ScriptedCatalog::new(Reply::Value(serde_json::json!({"weight": "heavy"})));
        assert_eq!(resolve_with_fallback::<f64, _>(Some(&garbage as &dyn RemoteCatalog), &query(), || 19.8), 19.8);
    }

    #[test]
    fn test_query_params() {
        let q = RemoteQuery::FlangeWeight {
            nominal_bore_mm: 300,
            pressure_class: "PN16".into(),
            standard: None,
            flange_type: "/2".into(),
        };
        assert_eq!(q.path(), "flange-weight");
        let params = q.params();
        assert_eq!(params.len(), 3);
        assert!(params.contains(&("nb", "300".to_string())));
    }

    #[test]
    fn test_query_serializes_tagged() {
        let json = serde_json::to_value(query()).unwrap();
        assert_eq!(json["query"], "blank_flange_weight");
        assert_eq!(json["nominal_bore_mm"], 200);
    }

    #[test]
    fn test_from_config_without_url() {
        assert!(HttpRemoteCatalog::from_config(&RemoteConfig::default()).unwrap().is_none());
        let blank = RemoteConfig {
            base_url: Some("  ".into()),
            timeout_secs: 1,
        };
        assert!(HttpRemoteCatalog::from_config(&blank).unwrap().is_none());
    }

    #[test]
    fn test_http_catalog_trims_base_url() {
        let catalog = HttpRemoteCatalog::new("http://catalog.local/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(catalog.base_url(), "http://catalog.local/api");
        assert_eq!(catalog.endpoint(&query()), "http://catalog.local/api/blank-flange-weight");
    }

    #[test]
    fn test_unreachable_host_is_an_error_not_a_panic() {
        // Port 9 (discard) on localhost is closed in test environments
        let catalog = HttpRemoteCatalog::new("http://127.0.0.1:9", Duration::from_millis(200)).unwrap();
        let err = catalog.fetch(&query()).unwrap_err();
        assert_eq!(err.error_code(), "REMOTE_UNAVAILABLE");
    }
}
