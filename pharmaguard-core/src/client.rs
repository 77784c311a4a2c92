//! Analysis backend client.
//!
//! The `AnalysisBackend` trait abstracts over the transport so the submission
//! flow and the TUI worker can be driven by a stub in tests. `HttpBackend` is
//! the real implementation: blocking reqwest, one request at a time.

use std::time::Duration;

use reqwest::blocking::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ClientConfig;
use crate::model::{parse_response, Analysis, Provenance};
use crate::validation::VcfUpload;

/// Shown when the backend gave no usable explanation.
pub const GENERIC_FAILURE: &str = "Failed to connect to API.";

/// Request failures, displayable in both CLI and TUI contexts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("backend returned HTTP {status}: {}", detail_or_generic(.detail))]
    Backend { status: u16, detail: Option<String> },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

fn detail_or_generic(detail: &Option<String>) -> &str {
    detail.as_deref().unwrap_or(GENERIC_FAILURE)
}

impl ClientError {
    /// Message for the error banner: the backend's `detail` when it sent one.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Backend {
                detail: Some(detail),
                ..
            } => detail.clone(),
            ClientError::Malformed(reason) => format!("Malformed response from API: {reason}"),
            ClientError::InvalidRequest(reason) => reason.clone(),
            _ => GENERIC_FAILURE.to_string(),
        }
    }
}

/// Multipart field layout sent to `POST /analyze`.
///
/// Two layouts exist in the wild; which one a deployment accepts is a property
/// of the backend, so it is configuration rather than code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestShape {
    /// `vcf_file` + `drugs` (all selected drugs, comma-joined).
    #[default]
    Multi,
    /// `file` + `drug_name` (first selected drug only).
    Single,
}

impl RequestShape {
    pub fn file_field(self) -> &'static str {
        match self {
            RequestShape::Multi => "vcf_file",
            RequestShape::Single => "file",
        }
    }

    /// Text fields for the given drugs. `drugs` must be non-empty.
    pub fn text_fields(self, drugs: &[String]) -> Vec<(&'static str, String)> {
        match self {
            RequestShape::Multi => vec![("drugs", drugs.join(","))],
            RequestShape::Single => vec![("drug_name", drugs[0].clone())],
        }
    }

    /// Drugs the backend will actually be asked about.
    pub fn effective_drugs(self, drugs: &[String]) -> Vec<String> {
        match self {
            RequestShape::Multi => drugs.to_vec(),
            RequestShape::Single => drugs.iter().take(1).cloned().collect(),
        }
    }
}

/// Liveness report from `GET /health`.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthStatus {
    pub status: Option<String>,
    pub raw: serde_json::Value,
}

impl HealthStatus {
    pub fn summary(&self) -> String {
        match &self.status {
            Some(s) => s.clone(),
            None => self.raw.to_string(),
        }
    }
}

/// Anything that can run an analysis.
pub trait AnalysisBackend: Send + Sync {
    /// Human-readable target, for logs and the status bar.
    fn describe(&self) -> String;

    /// Submit one file with its target drugs.
    fn analyze(&self, upload: &VcfUpload, drugs: &[String]) -> Result<Vec<Analysis>, ClientError>;

    /// Probe backend liveness.
    fn health(&self) -> Result<HealthStatus, ClientError>;
}

/// Blocking HTTP backend.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::blocking::Client,
    base_url: String,
    shape: RequestShape,
    timeout_secs: u64,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("pharmaguard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::InvalidRequest(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            shape: config.request_shape,
            timeout_secs: config.timeout_secs,
        })
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn shape(&self) -> RequestShape {
        self.shape
    }

    fn classify(&self, e: reqwest::Error) -> ClientError {
        if e.is_timeout() {
            ClientError::Timeout(self.timeout_secs)
        } else if e.is_decode() {
            ClientError::Malformed(e.to_string())
        } else {
            ClientError::Network(e.to_string())
        }
    }

    fn build_form(&self, upload: &VcfUpload, drugs: &[String]) -> Form {
        let part = Part::bytes(upload.bytes().to_vec()).file_name(upload.name().to_string());
        let mut form = Form::new().part(self.shape.file_field(), part);
        for (name, value) in self.shape.text_fields(drugs) {
            form = form.text(name, value);
        }
        form
    }
}

impl AnalysisBackend for HttpBackend {
    fn describe(&self) -> String {
        self.base_url.clone()
    }

    fn analyze(&self, upload: &VcfUpload, drugs: &[String]) -> Result<Vec<Analysis>, ClientError> {
        if drugs.is_empty() {
            return Err(ClientError::InvalidRequest("no target drugs".into()));
        }

        let url = self.endpoint("analyze");
        let _span = tracing::info_span!("analyze", %url, file = upload.name(), drugs = drugs.len()).entered();
        tracing::info!(shape = ?self.shape, bytes = upload.size(), "submitting analysis");

        let resp = self
            .client
            .post(&url)
            .multipart(self.build_form(upload, drugs))
            .send()
            .map_err(|e| self.classify(e))?;

        let status = resp.status();
        let body = resp.text().map_err(|e| self.classify(e))?;

        if !status.is_success() {
            let detail = extract_detail(&body);
            tracing::warn!(status = status.as_u16(), ?detail, "backend rejected analysis");
            return Err(ClientError::Backend {
                status: status.as_u16(),
                detail,
            });
        }

        let results = parse_response(&body, Provenance::Backend).map_err(ClientError::Malformed)?;
        tracing::info!(results = results.len(), "analysis received");
        Ok(results)
    }

    fn health(&self) -> Result<HealthStatus, ClientError> {
        let url = self.endpoint("health");
        tracing::debug!(%url, "health check");

        let resp = self.client.get(&url).send().map_err(|e| self.classify(e))?;
        let status = resp.status();
        let body = resp.text().map_err(|e| self.classify(e))?;

        if !status.is_success() {
            return Err(ClientError::Backend {
                status: status.as_u16(),
                detail: extract_detail(&body),
            });
        }

        let raw: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| ClientError::Malformed(e.to_string()))?;
        let status = raw
            .get("status")
            .and_then(|s| s.as_str())
            .map(String::from);
        Ok(HealthStatus { status, raw })
    }
}

/// Pull a human-readable `detail` out of an error body, if there is one.
pub fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Null => None,
        // Validation errors arrive as a list of objects.
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drugs(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn multi_shape_joins_all_drugs() {
        let d = drugs(&["WARFARIN", "CODEINE"]);
        assert_eq!(RequestShape::Multi.file_field(), "vcf_file");
        assert_eq!(
            RequestShape::Multi.text_fields(&d),
            vec![("drugs", "WARFARIN,CODEINE".to_string())]
        );
        assert_eq!(RequestShape::Multi.effective_drugs(&d).len(), 2);
    }

    #[test]
    fn single_shape_sends_first_drug() {
        let d = drugs(&["WARFARIN", "CODEINE"]);
        assert_eq!(RequestShape::Single.file_field(), "file");
        assert_eq!(
            RequestShape::Single.text_fields(&d),
            vec![("drug_name", "WARFARIN".to_string())]
        );
        assert_eq!(RequestShape::Single.effective_drugs(&d), vec!["WARFARIN"]);
    }

    #[test]
    fn shape_config_names() {
        let s: RequestShape = serde_json::from_str("\"single\"").unwrap();
        assert_eq!(s, RequestShape::Single);
        assert_eq!(serde_json::to_string(&RequestShape::Multi).unwrap(), "\"multi\"");
    }

    #[test]
    fn detail_extraction() {
        assert_eq!(
            extract_detail(r#"{"detail":"Invalid VCF header"}"#),
            Some("Invalid VCF header".into())
        );
        assert_eq!(extract_detail(r#"{"detail":""}"#), None);
        assert_eq!(extract_detail("<html>502</html>"), None);
        assert!(extract_detail(r#"{"detail":[{"loc":["body","file"]}]}"#)
            .unwrap()
            .contains("loc"));
    }

    #[test]
    fn user_message_prefers_detail() {
        let e = ClientError::Backend {
            status: 500,
            detail: Some("boom".into()),
        };
        assert_eq!(e.user_message(), "boom");
        assert_eq!(ClientError::Network("refused".into()).user_message(), GENERIC_FAILURE);
        assert_eq!(
            ClientError::Backend { status: 502, detail: None }.to_string(),
            "backend returned HTTP 502: Failed to connect to API."
        );
    }

    #[test]
    fn endpoint_joins_cleanly() {
        let cfg = ClientConfig {
            api_url: "http://localhost:8000/api/".into(),
            ..ClientConfig::default()
        };
        let backend = HttpBackend::new(&cfg).unwrap();
        assert_eq!(backend.endpoint("/analyze"), "http://localhost:8000/api/analyze");
        assert_eq!(backend.endpoint("health"), "http://localhost:8000/api/health");
    }
}
