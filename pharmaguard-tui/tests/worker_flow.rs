//! Keyboard-driven flows through the real worker thread with a stub backend.
//!
//! Tests:
//! 1. Open file, pick a drug, submit: the card renders the backend result
//! 2. Failure under the default policy: banner only, no results
//! 3. Failure after switching policy: synthetic card, no banner
//! 4. A rejected file never reaches the worker

use std::sync::mpsc::{self, Receiver};
use std::thread::JoinHandle;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::backend::TestBackend;
use ratatui::Terminal;

use pharmaguard_core::report::SYNTHETIC_BANNER;
use pharmaguard_core::{
    Analysis, AnalysisBackend, ClientConfig, ClientError, FailurePolicy, HealthStatus, Provenance,
    VcfUpload,
};
use pharmaguard_tui::app::{ErrorCategory, Panel};
use pharmaguard_tui::worker::{spawn_worker, WorkerCommand, WorkerResponse};
use pharmaguard_tui::{handle_key, ui, AppState};

// ──────────────────────────────────────────────
// Helpers
// ──────────────────────────────────────────────

const VCF: &str = "##fileformat=VCFv4.2\n\
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tPATIENT_042\n\
chr10\t94942290\trs1799853\tC\tT\t.\tPASS\tGENE=CYP2C9;STAR=*2\tGT\t0/1\n";

/// Answers every analysis with `reply`.
struct Stub {
    reply: Result<serde_json::Value, ClientError>,
}

impl AnalysisBackend for Stub {
    fn describe(&self) -> String {
        "stub".into()
    }

    fn analyze(&self, _: &VcfUpload, _: &[String]) -> Result<Vec<Analysis>, ClientError> {
        let value = self.reply.clone()?;
        Ok(vec![Analysis::from_value(value, Provenance::Backend).unwrap()])
    }

    fn health(&self) -> Result<HealthStatus, ClientError> {
        Err(ClientError::Network("stub".into()))
    }
}

struct Harness {
    app: AppState,
    handle: Option<JoinHandle<()>>,
    dir: tempfile::TempDir,
    vcf_path: String,
}

impl Harness {
    fn new(reply: Result<serde_json::Value, ClientError>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let vcf_path = dir.path().join("patient.vcf");
        std::fs::write(&vcf_path, VCF).unwrap();

        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();
        let handle = spawn_worker(Box::new(Stub { reply }), cmd_rx, resp_tx).unwrap();
        let app = AppState::new(
            &ClientConfig::default(),
            cmd_tx,
            resp_rx,
            dir.path().join("exports"),
        );

        Self {
            app,
            handle: Some(handle),
            vcf_path: vcf_path.display().to_string(),
            dir,
        }
    }

    fn press(&mut self, code: KeyCode) {
        handle_key(&mut self.app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(&mut self, text: &str) {
        for c in text.chars() {
            self.press(KeyCode::Char(c));
        }
    }

    /// Open the VCF through the path prompt and select the drug under the cursor.
    fn load_and_pick(&mut self) {
        self.press(KeyCode::Char('o'));
        let path = self.vcf_path.clone();
        self.type_text(&path);
        self.press(KeyCode::Enter);
        assert!(self.app.upload.upload.is_some(), "{:?}", self.app.upload.file_error);
        self.press(KeyCode::Char(' '));
    }

    fn wait_response(&mut self) {
        let resp = recv(&self.app.worker_rx);
        self.app.handle_response(resp);
    }

    fn screen(&self) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal.draw(|f| ui::draw(f, &self.app)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|c| c.symbol()).collect()
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        let _ = self.app.worker_tx.send(WorkerCommand::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn recv(rx: &Receiver<WorkerResponse>) -> WorkerResponse {
    rx.recv_timeout(Duration::from_secs(5))
        .expect("worker did not answer")
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[test]
fn submit_renders_backend_card() {
    let mut h = Harness::new(Ok(serde_json::json!({
        "patient_id": "PATIENT_042",
        "drug": "CODEINE",
        "risk_assessment": {"risk_label": "Adjust Dosage", "confidence_score": 0.82, "severity": "moderate"}
    })));
    h.load_and_pick();
    h.press(KeyCode::Enter);
    assert!(h.app.analysis.in_flight);
    assert!(h.screen().contains("Analyzing"));

    h.wait_response();
    assert!(!h.app.analysis.in_flight);
    assert_eq!(h.app.active_panel, Panel::Report);
    assert!(h.app.analysis.banner.is_none());

    let screen = h.screen();
    assert!(screen.contains("ADJUST DOSAGE"));
    assert!(screen.contains("82.0%"));
    assert!(!screen.contains("SYNTHETIC"));

    // Export from the JSON panel.
    h.press(KeyCode::Char('4'));
    assert!(h.screen().contains("pharmaguard_PATIENT_042_CODEINE.json"));
    h.press(KeyCode::Char('w'));
    assert!(h.app.export_dir.join("pharmaguard_PATIENT_042_CODEINE.json").is_file());
}

#[test]
fn surfaced_failure_shows_banner_only() {
    let mut h = Harness::new(Err(ClientError::Backend {
        status: 422,
        detail: Some("Invalid VCF header".into()),
    }));
    assert_eq!(h.app.policy, FailurePolicy::Surface);
    h.load_and_pick();
    h.press(KeyCode::Enter);
    h.wait_response();

    assert_eq!(h.app.analysis.banner.as_deref(), Some("Invalid VCF header"));
    assert!(h.app.analysis.results.is_empty());
    assert_eq!(h.app.error_history[0].category, ErrorCategory::Backend);

    let screen = h.screen();
    assert!(screen.contains("Invalid VCF header"));
    assert!(!screen.contains(SYNTHETIC_BANNER));

    h.press(KeyCode::Esc);
    assert!(h.app.analysis.banner.is_none());
}

#[test]
fn synthesized_failure_shows_placeholder_card() {
    let mut h = Harness::new(Err(ClientError::Timeout(60)));
    h.press(KeyCode::Char('s'));
    assert_eq!(h.app.policy, FailurePolicy::Synthesize);
    h.load_and_pick();
    h.press(KeyCode::Enter);
    h.wait_response();

    assert!(h.app.analysis.banner.is_none());
    assert_eq!(h.app.analysis.results.len(), 1);
    assert!(h.app.analysis.results[0].provenance.is_synthetic());

    let screen = h.screen();
    assert!(screen.contains("SYNTHETIC PLACEHOLDER"));
    assert!(screen.contains("CODEINE"));
}

#[test]
fn rejected_file_never_reaches_worker() {
    let mut h = Harness::new(Ok(serde_json::json!({})));
    let bad = h.dir.path().join("notes.txt");
    std::fs::write(&bad, "hello").unwrap();

    h.press(KeyCode::Char('o'));
    h.type_text(&bad.display().to_string());
    h.press(KeyCode::Enter);
    assert!(h.app.upload.upload.is_none());
    assert!(h.app.upload.file_error.is_some());
    assert_eq!(h.app.error_history[0].category, ErrorCategory::Validation);

    h.press(KeyCode::Char(' '));
    h.press(KeyCode::Enter);
    assert!(!h.app.analysis.in_flight);
    assert!(h
        .app
        .worker_rx
        .recv_timeout(Duration::from_millis(200))
        .is_err());
}
