//! Wire contract and transport for the calculation service.
//!
//! Two JSON endpoints are consumed: `POST /api/calculate` for a single
//! evaluation and `POST /api/graph` for a parameter sweep. Non-2xx
//! responses are expected to carry a `{"detail": "..."}` body; when the
//! body is absent or unparsable we fall back to the HTTP status text
//! rather than raising a second error.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::credentials::Credentials;

pub const CALCULATE_PATH: &str = "/api/calculate";
pub const GRAPH_PATH: &str = "/api/graph";

/// Single-point evaluation payload. Optional fields are omitted from the
/// JSON entirely when unset, matching the upstream schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationRequest {
    pub current_h: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_h: Option<f64>,
    pub beta_0: f64,
    pub lambda_factor: f64,
    pub epsilon: f64,
    pub base_output: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_labels: Option<Vec<String>>,
    pub alpha_param: f64,
    pub gamma_param: f64,
}

/// One composite request sweeping a single parameter across an evenly
/// spaced range. Bounds and step count are forwarded verbatim; the
/// server owns validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepRequest {
    pub parameter_name: String,
    pub start_value: f64,
    pub end_value: f64,
    pub steps: u32,
    pub base_request: CalculationRequest,
}

/// The upstream reports timestamps either as epoch floats or as
/// formatted strings depending on deployment; both are tolerated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Number(f64),
    Text(String),
}

impl Default for Timestamp {
    fn default() -> Self {
        Timestamp::Text(String::new())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timestamp::Number(v) => write!(f, "{v}"),
            Timestamp::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub h_value: f64,
    pub delta_h: f64,
    pub processing_factor: f64,
    pub control_parameter: f64,
    pub output_gain: f64,
    #[serde(default)]
    pub timestamp: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_output: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_mapping: Option<BTreeMap<String, f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepResult {
    pub parameter_values: Vec<f64>,
    pub parameter_name: String,
    pub results: Vec<CalculationResult>,
}

/// Failure modes surfaced by the transport layer. `Display` yields the
/// operator-facing detail line.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// Non-2xx response; `detail` is the server-provided message or the
    /// HTTP status text when the body had none.
    #[error("{detail}")]
    Upstream { status: u16, detail: String },
    /// The request never produced a response (network failure, CORS,
    /// aborted connection, unparsable success body).
    #[error("{0}")]
    Transport(String),
}

/// Tolerant error body shape: everything except `detail` is ignored.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<String>,
}

/// The seam the orchestration layer depends on, so the request/response
/// flows are testable without a browser or a live upstream.
pub trait ApiClient {
    fn calculate(
        &self,
        request: &CalculationRequest,
    ) -> impl Future<Output = Result<CalculationResult, ApiError>>;

    fn sweep(
        &self,
        request: &SweepRequest,
    ) -> impl Future<Output = Result<SweepResult, ApiError>>;
}

/// Resolve the backend base URL once at startup: a JS global first, then
/// a persisted override, else empty for same-origin requests.
pub fn backend_base() -> String {
    #[cfg(target_arch = "wasm32")]
    {
        use wasm_bindgen::JsValue;

        let from_global = js_sys::Reflect::get(
            &js_sys::global(),
            &JsValue::from_str("CONTROLDECK_BACKEND_BASE"),
        )
        .ok()
        .and_then(|v| v.as_string());
        if let Some(base) = from_global {
            return base;
        }

        web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .and_then(|s| s.get_item("CONTROLDECK_BACKEND_BASE").ok().flatten())
            .unwrap_or_default()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        String::new()
    }
}

/// Fetch-backed client forwarding the credential headers on every call.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    base_url: String,
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    credentials: Credentials,
}

impl UpstreamClient {
    pub fn new(base_url: String, credentials: Credentials) -> Self {
        Self {
            base_url,
            credentials,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl ApiClient for UpstreamClient {
    async fn calculate(
        &self,
        request: &CalculationRequest,
    ) -> Result<CalculationResult, ApiError> {
        self.post_json(CALCULATE_PATH, request).await
    }

    async fn sweep(&self, request: &SweepRequest) -> Result<SweepResult, ApiError> {
        self.post_json(GRAPH_PATH, request).await
    }
}

impl UpstreamClient {
    #[cfg(target_arch = "wasm32")]
    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: serde::Serialize,
        T: serde::de::DeserializeOwned,
    {
        use gloo_net::http::Request;

        let mut builder = Request::post(&self.endpoint(path));
        for (name, value) in self.credentials.build_headers() {
            builder = builder.header(name, &value);
        }

        let response = builder
            .json(body)
            .map_err(|err| ApiError::Transport(err.to_string()))?
            .send()
            .await
            .map_err(|err| ApiError::Transport(err.to_string()))?;

        if response.ok() {
            response
                .json::<T>()
                .await
                .map_err(|err| ApiError::Transport(err.to_string()))
        } else {
            let status = response.status();
            let status_text = response.status_text();
            let body = response.json::<ErrorBody>().await.unwrap_or_default();
            Err(ApiError::Upstream {
                status,
                detail: body.detail.unwrap_or(status_text),
            })
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    async fn post_json<B, T>(&self, path: &str, _body: &B) -> Result<T, ApiError> {
        Err(ApiError::Transport(format!(
            "no transport available outside the browser for {}",
            self.endpoint(path)
        )))
    }
}
