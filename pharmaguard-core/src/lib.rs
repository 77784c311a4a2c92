//! PharmaGuard Core: everything the terminal client needs short of drawing.
//!
//! This crate contains:
//! - The Analysis Result wire model, tolerant of any missing field
//! - Client-side upload validation and drug selection
//! - The blocking HTTP client for the analysis backend
//! - Submission flow with an explicit failure policy
//! - Synthetic placeholder results (opt-in, always labelled)
//! - Report view models and the JSON syntax highlighter
//! - Configuration loading and logging setup

pub mod client;
pub mod config;
pub mod drugs;
pub mod highlight;
pub mod logging;
pub mod model;
pub mod progress;
pub mod report;
pub mod session;
pub mod synthetic;
pub mod validation;

pub use client::{AnalysisBackend, ClientError, HealthStatus, HttpBackend, RequestShape};
pub use config::{ClientConfig, ConfigError};
pub use drugs::{DrugSelection, SUPPORTED_DRUGS};
pub use model::{Analysis, AnalysisResult, Phenotype, Provenance, RiskLabel, Severity};
pub use session::{FailurePolicy, Outcome, Submission};
pub use validation::{ValidationError, VcfUpload, MAX_UPLOAD_BYTES};
