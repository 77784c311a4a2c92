//! Application state: single-owner, main-thread only.
//!
//! All TUI state lives here. The worker thread communicates via channels.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, Sender};
use std::time::{Duration, Instant};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use pharmaguard_core::drugs::{is_supported, primary_gene};
use pharmaguard_core::progress::ProgressSchedule;
use pharmaguard_core::report;
use pharmaguard_core::{
    Analysis, ClientConfig, ClientError, DrugSelection, FailurePolicy, HealthStatus, Outcome,
    Submission, VcfUpload, SUPPORTED_DRUGS,
};

use crate::worker::{WorkerCommand, WorkerResponse};

pub const ERROR_HISTORY_CAP: usize = 50;

/// Delay between characters of the summary typewriter.
pub const TYPEWRITER_CHAR_INTERVAL: Duration = Duration::from_millis(12);

/// JSON lines shown while the viewer is collapsed.
pub const COLLAPSED_JSON_LINES: usize = 14;

/// Which panel is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Panel {
    Upload,
    Report,
    Explanation,
    Json,
    Help,
}

impl Panel {
    pub const COUNT: usize = 5;

    pub fn index(self) -> usize {
        match self {
            Panel::Upload => 0,
            Panel::Report => 1,
            Panel::Explanation => 2,
            Panel::Json => 3,
            Panel::Help => 4,
        }
    }

    pub fn from_index(i: usize) -> Option<Self> {
        match i {
            0 => Some(Panel::Upload),
            1 => Some(Panel::Report),
            2 => Some(Panel::Explanation),
            3 => Some(Panel::Json),
            4 => Some(Panel::Help),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Panel::Upload => "Upload",
            Panel::Report => "Report",
            Panel::Explanation => "Explanation",
            Panel::Json => "JSON",
            Panel::Help => "Help",
        }
    }

    pub fn next(self) -> Panel {
        Panel::from_index((self.index() + 1) % Self::COUNT).unwrap_or(Panel::Upload)
    }

    pub fn prev(self) -> Panel {
        Panel::from_index((self.index() + Self::COUNT - 1) % Self::COUNT).unwrap_or(Panel::Upload)
    }
}

/// Status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// An error record for the error history overlay.
#[derive(Debug, Clone)]
pub struct ErrorRecord {
    pub timestamp: NaiveDateTime,
    pub category: ErrorCategory,
    pub message: String,
    pub context: String,
}

/// Error category for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Network,
    Backend,
    Malformed,
    Export,
}

impl ErrorCategory {
    pub fn label(self) -> &'static str {
        match self {
            ErrorCategory::Validation => "VAL",
            ErrorCategory::Network => "NET",
            ErrorCategory::Backend => "API",
            ErrorCategory::Malformed => "FMT",
            ErrorCategory::Export => "IO",
        }
    }

    pub fn of(err: &ClientError) -> Self {
        match err {
            ClientError::Network(_) | ClientError::Timeout(_) => ErrorCategory::Network,
            ClientError::Backend { .. } => ErrorCategory::Backend,
            ClientError::Malformed(_) => ErrorCategory::Malformed,
            ClientError::InvalidRequest(_) => ErrorCategory::Validation,
        }
    }
}

/// One row of the drug picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrugRow {
    pub name: String,
    pub gene: Option<&'static str>,
    pub selected: bool,
    pub custom: bool,
}

/// Upload panel state: the chosen file and the drug picker.
#[derive(Debug, Default)]
pub struct UploadPanelState {
    pub upload: Option<VcfUpload>,
    pub last_path: Option<PathBuf>,
    /// Inline message under the file row; cleared by a successful load.
    pub file_error: Option<String>,
    pub drugs: DrugSelection,
    pub cursor: usize,
}

impl UploadPanelState {
    /// Catalogue drugs first, then selected custom drugs.
    pub fn rows(&self) -> Vec<DrugRow> {
        let catalogue = SUPPORTED_DRUGS.iter().map(|d| DrugRow {
            name: d.to_string(),
            gene: primary_gene(d),
            selected: self.drugs.contains(d),
            custom: false,
        });
        let custom = self
            .drugs
            .selected()
            .iter()
            .filter(|d| !is_supported(d))
            .map(|d| DrugRow {
                name: d.clone(),
                gene: None,
                selected: true,
                custom: true,
            });
        catalogue.chain(custom).collect()
    }

    pub fn row_count(&self) -> usize {
        SUPPORTED_DRUGS.len() + self.drugs.selected().iter().filter(|d| !is_supported(d)).count()
    }

    /// Toggle the drug under the cursor. Custom drugs are removed outright.
    pub fn toggle_cursor(&mut self) {
        let Some(row) = self.rows().into_iter().nth(self.cursor) else {
            return;
        };
        if row.custom {
            self.drugs.remove(&row.name);
            self.clamp_cursor();
        } else {
            self.drugs.toggle(&row.name);
        }
    }

    pub fn clamp_cursor(&mut self) {
        self.cursor = self.cursor.min(self.row_count().saturating_sub(1));
    }
}

/// Request lifecycle and the results it produced.
#[derive(Debug)]
pub struct AnalysisState {
    pub in_flight: bool,
    pub started_at: Option<Instant>,
    pub schedule: ProgressSchedule,
    /// Drugs of the last submission, in the order sent.
    pub requested_drugs: Vec<String>,
    pub results: Vec<Analysis>,
    pub selected: usize,
    /// Surfaced failure message; dismissed with Esc.
    pub banner: Option<String>,
    /// When the current results arrived, for the typewriter.
    pub received_at: Option<Instant>,
}

impl Default for AnalysisState {
    fn default() -> Self {
        Self {
            in_flight: false,
            started_at: None,
            schedule: ProgressSchedule::default(),
            requested_drugs: Vec::new(),
            results: Vec::new(),
            selected: 0,
            banner: None,
            received_at: None,
        }
    }
}

impl AnalysisState {
    pub fn current(&self) -> Option<&Analysis> {
        self.results.get(self.selected)
    }

    /// Headline fallback for the selected result.
    pub fn requested_drug(&self) -> &str {
        report::requested_drug(&self.requested_drugs, self.selected, self.results.len())
    }

    /// Active progress step index, while a request is in flight.
    pub fn progress_step(&self, now: Instant) -> Option<usize> {
        let started = self.started_at.filter(|_| self.in_flight)?;
        Some(self.schedule.step_at(now.saturating_duration_since(started)))
    }

    pub fn select_next(&mut self) {
        if !self.results.is_empty() {
            self.selected = (self.selected + 1) % self.results.len();
        }
    }

    pub fn select_prev(&mut self) {
        if !self.results.is_empty() {
            self.selected = (self.selected + self.results.len() - 1) % self.results.len();
        }
    }

    /// Summary characters revealed so far.
    pub fn revealed_chars(&self, now: Instant) -> usize {
        match self.received_at {
            Some(at) => {
                let elapsed = now.saturating_duration_since(at);
                (elapsed.as_millis() / TYPEWRITER_CHAR_INTERVAL.as_millis()) as usize
            }
            None => usize::MAX,
        }
    }
}

/// Expand/collapse and scroll state of the result views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewState {
    pub explanation_expanded: bool,
    pub json_expanded: bool,
    pub json_scroll: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            explanation_expanded: true,
            json_expanded: false,
            json_scroll: 0,
        }
    }
}

/// Which overlay (if any) is shown on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    None,
    Welcome,
    ErrorHistory,
    /// Text input for the VCF path.
    FilePath,
    /// Text input for a free-text drug name.
    CustomDrug,
}

/// Top-level application state.
pub struct AppState {
    // Navigation
    pub active_panel: Panel,
    pub running: bool,

    // Panel states
    pub upload: UploadPanelState,
    pub analysis: AnalysisState,
    pub view: ViewState,

    // Backend
    pub max_upload_bytes: u64,
    pub policy: FailurePolicy,
    pub api_url: String,
    pub health: Option<String>,

    // Worker communication
    pub worker_tx: Sender<WorkerCommand>,
    pub worker_rx: Receiver<WorkerResponse>,

    // Cross-cutting
    pub status_message: Option<(String, StatusLevel)>,
    pub error_history: VecDeque<ErrorRecord>,
    pub error_scroll: usize,
    pub overlay: Overlay,
    pub input: String,

    // Paths
    pub export_dir: PathBuf,
}

impl AppState {
    pub fn new(
        config: &ClientConfig,
        worker_tx: Sender<WorkerCommand>,
        worker_rx: Receiver<WorkerResponse>,
        export_dir: PathBuf,
    ) -> Self {
        Self {
            active_panel: Panel::Upload,
            running: true,
            upload: UploadPanelState::default(),
            analysis: AnalysisState::default(),
            view: ViewState::default(),
            max_upload_bytes: config.max_upload_bytes,
            policy: config.on_failure,
            api_url: config.api_url.clone(),
            health: None,
            worker_tx,
            worker_rx,
            status_message: None,
            error_history: VecDeque::with_capacity(ERROR_HISTORY_CAP),
            error_scroll: 0,
            overlay: Overlay::None,
            input: String::new(),
            export_dir,
        }
    }

    /// Push an error to the history, capping at 50.
    pub fn push_error(&mut self, category: ErrorCategory, message: String, context: String) {
        let record = ErrorRecord {
            timestamp: chrono::Local::now().naive_local(),
            category,
            message: message.clone(),
            context,
        };
        self.error_history.push_front(record);
        if self.error_history.len() > ERROR_HISTORY_CAP {
            self.error_history.pop_back();
        }
        self.status_message = Some((message, StatusLevel::Error));
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Info));
    }

    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Warning));
    }

    /// Validate and load a VCF from disk. A rejected file leaves no upload selected.
    pub fn load_file(&mut self, path: &Path) {
        self.upload.last_path = Some(path.to_path_buf());
        match VcfUpload::from_path(path, self.max_upload_bytes) {
            Ok(upload) => {
                self.set_status(format!("Loaded {} ({} KB)", upload.name(), upload.size_kib()));
                self.upload.upload = Some(upload);
                self.upload.file_error = None;
            }
            Err(e) => {
                self.upload.upload = None;
                self.upload.file_error = Some(e.to_string());
                self.push_error(
                    ErrorCategory::Validation,
                    e.to_string(),
                    path.display().to_string(),
                );
            }
        }
    }

    pub fn remove_file(&mut self) {
        self.upload.upload = None;
        self.upload.file_error = None;
    }

    /// Validate the form and hand the request to the worker.
    pub fn submit(&mut self) {
        let submission = match Submission::prepare(
            self.upload.upload.as_ref(),
            &self.upload.drugs,
            self.analysis.in_flight,
        ) {
            Ok(s) => s,
            Err(e) => {
                self.set_warning(e.to_string());
                return;
            }
        };

        let requested = submission.drugs().to_vec();
        let count = requested.len();
        let cmd = WorkerCommand::Analyze {
            submission,
            policy: self.policy,
        };
        if self.worker_tx.send(cmd).is_err() {
            self.push_error(
                ErrorCategory::Network,
                "Background worker is not running".into(),
                "submit".into(),
            );
            return;
        }

        self.analysis.in_flight = true;
        self.analysis.started_at = Some(Instant::now());
        self.analysis.requested_drugs = requested;
        self.analysis.results.clear();
        self.analysis.selected = 0;
        self.analysis.banner = None;
        self.analysis.received_at = None;
        self.view.json_scroll = 0;
        self.set_status(format!("Analyzing {count} drug(s)..."));
    }

    pub fn request_health(&mut self) {
        if self.worker_tx.send(WorkerCommand::Health).is_ok() {
            self.set_status(format!("Checking {}...", self.api_url));
        }
    }

    pub fn handle_response(&mut self, resp: WorkerResponse) {
        match resp {
            WorkerResponse::AnalysisDone { outcome } => self.finish_analysis(outcome),
            WorkerResponse::Health(Ok(status)) => self.finish_health(status),
            WorkerResponse::Health(Err(e)) => {
                self.health = Some("unreachable".into());
                self.push_error(ErrorCategory::of(&e), e.user_message(), e.to_string());
            }
        }
    }

    fn finish_analysis(&mut self, outcome: Outcome) {
        self.analysis.in_flight = false;
        self.analysis.started_at = None;
        self.analysis.banner = outcome.error_indicator();

        match &outcome {
            Outcome::Analyzed(results) => {
                self.set_status(format!("Analysis complete: {} result(s)", results.len()));
            }
            Outcome::Substituted { cause, .. } => {
                self.set_warning(format!(
                    "Backend unavailable ({}); showing synthetic placeholder",
                    cause.user_message()
                ));
            }
            Outcome::Failed(cause) => {
                self.push_error(ErrorCategory::of(cause), cause.user_message(), cause.to_string());
            }
        }

        self.analysis.results = outcome.into_results();
        if !self.analysis.results.is_empty() {
            self.analysis.received_at = Some(Instant::now());
            self.active_panel = Panel::Report;
        }
    }

    fn finish_health(&mut self, status: HealthStatus) {
        let summary = status.summary();
        self.set_status(format!("{}: {summary}", self.api_url));
        self.health = Some(summary);
    }

    /// Esc on the main screen dismisses the failure banner.
    pub fn dismiss_banner(&mut self) -> bool {
        self.analysis.banner.take().is_some()
    }

    pub fn toggle_policy(&mut self) {
        self.policy = self.policy.toggled();
        self.set_status(format!("On failure: {}", self.policy.label()));
    }

    /// Write the selected result to the export directory.
    pub fn export_current(&mut self) -> Option<PathBuf> {
        let analysis = self.analysis.current()?;
        let path = self.export_dir.join(report::export_file_name(analysis));
        let json = report::export_json(analysis);

        let written = std::fs::create_dir_all(&self.export_dir)
            .and_then(|_| std::fs::write(&path, json));
        match written {
            Ok(()) => {
                tracing::info!(path = %path.display(), "exported result");
                self.set_status(format!("Saved {}", path.display()));
                Some(path)
            }
            Err(e) => {
                self.push_error(
                    ErrorCategory::Export,
                    format!("Export failed: {e}"),
                    path.display().to_string(),
                );
                None
            }
        }
    }
}
