//! Request Parser
//!
//! Turns raw query parameters into a [`ServiceCall`]. Only presence and
//! enumerated values are checked here; template lookup happens later.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::FltsError;

pub const GET_CAPABILITIES: &str = "GetCapabilities";
pub const GET_STARTER_CERT: &str = "GetStarterCert";

/// Request names that render documents.
pub const RENDER_REQUESTS: &[&str] = &[GET_STARTER_CERT];

/// Every request name the service answers, in registration order.
pub fn supported_requests() -> Vec<&'static str> {
    std::iter::once(GET_CAPABILITIES)
        .chain(RENDER_REQUESTS.iter().copied())
        .collect()
}

/// Query parameters with upper-cased keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(HashMap<String, String>);

impl QueryParams {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(&key.to_ascii_uppercase()).map(String::as_str)
    }

    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.0
            .entry(key.to_ascii_uppercase())
            .or_insert_with(|| value.into());
    }

    /// Non-empty value of `key`, trimmed.
    fn value(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|v| !v.is_empty())
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::default();
        for (k, v) in iter {
            params.insert(k.as_ref(), v);
        }
        params
    }
}

/// Decode a raw `a=b&c=d` query string. Keys are case-insensitive and the
/// first occurrence of a key wins.
pub fn parse_query_string(raw: &str) -> QueryParams {
    let raw = raw.strip_prefix('?').unwrap_or(raw);
    url::form_urlencoded::parse(raw.as_bytes()).collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QueryMode {
    /// First matching record only, answered as a single document.
    #[default]
    Single,
    /// Every matching record, answered as an archive.
    All,
}

impl QueryMode {
    fn from_param(value: Option<&str>) -> Result<Self, FltsError> {
        match value {
            None | Some("0") => Ok(Self::Single),
            Some("1") => Ok(Self::All),
            Some(_) => Err(FltsError::InvalidRequest(
                "Invalid QUERY parameter. Use 0 for FIRST or 1 for ALL.".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub request_name: String,
    pub version: Option<String>,
    pub template_id: String,
    pub query_mode: QueryMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceCall {
    GetCapabilities { version: Option<String> },
    Render(ServiceRequest),
}

pub fn parse(params: &QueryParams) -> Result<ServiceCall, FltsError> {
    let version = params.value("VERSION").map(str::to_string);

    let request_name = match params.value("REQUEST") {
        None => return Ok(ServiceCall::GetCapabilities { version }),
        Some(name) if name.eq_ignore_ascii_case(GET_CAPABILITIES) => {
            return Ok(ServiceCall::GetCapabilities { version })
        }
        Some(name) => RENDER_REQUESTS
            .iter()
            .find(|known| name.eq_ignore_ascii_case(known))
            .ok_or_else(|| {
                FltsError::InvalidRequest(format!(
                    "'{}' is an invalid REQUEST parameter. Must be {}",
                    name,
                    supported_requests().join(", ")
                ))
            })?,
    };

    let template_id = params
        .value("TEMPLATE_ID")
        .ok_or_else(|| FltsError::InvalidRequest("Null TEMPLATE_ID parameter".to_string()))?;

    let query_mode = QueryMode::from_param(params.value("QUERY"))?;

    Ok(ServiceCall::Render(ServiceRequest {
        request_name: (*request_name).to_string(),
        version,
        template_id: template_id.to_string(),
        query_mode,
    }))
}
