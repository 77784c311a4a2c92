//! PharmaGuard TUI: terminal interface for pharmacogenomic risk reports
//!
//! Panels:
//! 1. Upload: VCF file, target drugs, failure policy
//! 2. Report: risk card, profile, recommendation
//! 3. Explanation: typewriter summary and mechanism
//! 4. JSON: highlighted export preview and quality metrics
//! 5. Help: keyboard shortcuts

pub mod app;
pub mod input;
pub mod persistence;
pub mod theme;
pub mod ui;
pub mod worker;

pub use app::AppState;
pub use input::handle_key;
pub use theme::Theme;
