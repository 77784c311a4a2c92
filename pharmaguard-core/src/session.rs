//! Submission flow: validate, call the backend, apply the failure policy.
//!
//! A failed request produces exactly one of two things, chosen by
//! `FailurePolicy`: an error to surface, or synthetic results standing in for
//! the real ones. Never both, never neither.

use serde::{Deserialize, Serialize};

use crate::client::{AnalysisBackend, ClientError};
use crate::drugs::DrugSelection;
use crate::model::Analysis;
use crate::report;
use crate::synthetic;
use crate::validation::{can_submit, ValidationError, VcfUpload};

/// What to do when the backend call fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Report the failure to the user.
    #[default]
    Surface,
    /// Show clearly-labelled placeholder results instead.
    Synthesize,
}

impl FailurePolicy {
    pub fn toggled(self) -> Self {
        match self {
            FailurePolicy::Surface => FailurePolicy::Synthesize,
            FailurePolicy::Synthesize => FailurePolicy::Surface,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FailurePolicy::Surface => "surface errors",
            FailurePolicy::Synthesize => "synthetic fallback",
        }
    }
}

/// Result of one submission.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The backend answered.
    Analyzed(Vec<Analysis>),
    /// The backend failed and synthetic results were substituted.
    Substituted {
        results: Vec<Analysis>,
        cause: ClientError,
    },
    /// The backend failed and the error is to be shown.
    Failed(ClientError),
}

impl Outcome {
    /// Results to display; empty when failed.
    pub fn results(&self) -> &[Analysis] {
        match self {
            Outcome::Analyzed(r) => r,
            Outcome::Substituted { results, .. } => results,
            Outcome::Failed(_) => &[],
        }
    }

    pub fn into_results(self) -> Vec<Analysis> {
        match self {
            Outcome::Analyzed(r) => r,
            Outcome::Substituted { results, .. } => results,
            Outcome::Failed(_) => Vec::new(),
        }
    }

    /// Banner text, present only when the failure is surfaced.
    pub fn error_indicator(&self) -> Option<String> {
        match self {
            Outcome::Failed(e) => Some(e.user_message()),
            _ => None,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self, Outcome::Substituted { .. })
    }
}

/// A validated request, ready to send.
#[derive(Debug, Clone)]
pub struct Submission {
    upload: VcfUpload,
    drugs: Vec<String>,
}

impl Submission {
    /// Gate on file, drugs and in-flight state. No network access.
    pub fn prepare(
        upload: Option<&VcfUpload>,
        selection: &DrugSelection,
        in_flight: bool,
    ) -> Result<Self, ValidationError> {
        can_submit(upload, selection, in_flight)?;
        let upload = upload.ok_or(ValidationError::NoFile)?.clone();
        Ok(Self {
            upload,
            drugs: selection.selected().to_vec(),
        })
    }

    pub fn upload(&self) -> &VcfUpload {
        &self.upload
    }

    pub fn drugs(&self) -> &[String] {
        &self.drugs
    }

    /// Drug the report headlines when the document does not name one.
    pub fn target_drug(&self) -> &str {
        report::requested_drug(&self.drugs, 0, 1)
    }

    /// Call the backend and apply `policy` on failure.
    pub fn run(&self, backend: &dyn AnalysisBackend, policy: FailurePolicy) -> Outcome {
        match backend.analyze(&self.upload, &self.drugs) {
            Ok(results) => Outcome::Analyzed(results),
            Err(cause) => match policy {
                FailurePolicy::Surface => {
                    tracing::warn!(error = %cause, "analysis failed");
                    Outcome::Failed(cause)
                }
                FailurePolicy::Synthesize => {
                    tracing::warn!(error = %cause, "analysis failed, substituting synthetic results");
                    Outcome::Substituted {
                        results: synthetic::synthesize(&self.drugs, &self.upload),
                        cause,
                    }
                }
            },
        }
    }
}
