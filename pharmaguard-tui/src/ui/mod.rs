//! Top-level UI layout: one panel at a time, failure banner, status bar.

pub mod explanation_panel;
pub mod help_panel;
pub mod json_panel;
pub mod overlays;
pub mod report_panel;
pub mod status_bar;
pub mod upload_panel;

use std::time::Instant;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use pharmaguard_core::progress::ANALYSIS_STEPS;

use crate::app::{AppState, Overlay, Panel};
use crate::theme;

/// Draw the entire UI.
pub fn draw(f: &mut Frame, app: &AppState) {
    let now = Instant::now();
    let banner_height = if app.analysis.banner.is_some() { 1 } else { 0 };

    // Split: banner + main area + 1-line status bar.
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(banner_height),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(f.area());

    if let Some(msg) = &app.analysis.banner {
        let line = Line::from(vec![
            Span::styled(" ✕ ", theme::negative()),
            Span::styled(msg.as_str(), theme::negative()),
            Span::styled("  [Esc] dismiss  [!] history", theme::muted()),
        ]);
        f.render_widget(Paragraph::new(line), chunks[0]);
    }

    let main_area = chunks[1];
    draw_panel(f, main_area, app, now);
    status_bar::render(f, chunks[2], app);

    // Draw overlays on top.
    match app.overlay {
        Overlay::Welcome => overlays::render_welcome(f, main_area),
        Overlay::ErrorHistory => overlays::render_error_history(f, main_area, app),
        Overlay::FilePath => overlays::render_input(
            f,
            main_area,
            " Open VCF [Enter]load [Esc]cancel ",
            "Path to a .vcf file (max 5 MB):",
            &app.input,
        ),
        Overlay::CustomDrug => overlays::render_input(
            f,
            main_area,
            " Add Drug [Enter]add [Esc]cancel ",
            "Drug name (any CPIC drug):",
            &app.input,
        ),
        Overlay::None => {}
    }
}

/// Draw a single panel with its border.
fn draw_panel(f: &mut Frame, area: Rect, app: &AppState, now: Instant) {
    let panel = app.active_panel;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(true))
        .title(format!(" {} [{}] ", panel.label(), panel.index() + 1))
        .title_style(theme::panel_title(true));

    let inner = block.inner(area);
    f.render_widget(block, area);

    match panel {
        Panel::Upload => upload_panel::render(f, inner, app, now),
        Panel::Report => report_panel::render(f, inner, app, now),
        Panel::Explanation => explanation_panel::render(f, inner, app, now),
        Panel::Json => json_panel::render(f, inner, app),
        Panel::Help => help_panel::render(f, inner, app),
    }
}

/// Step list shown while a request is in flight.
pub fn progress_lines(active: usize) -> Vec<Line<'static>> {
    ANALYSIS_STEPS
        .iter()
        .enumerate()
        .map(|(i, step)| {
            let (marker, style) = if i < active {
                ("  ✓ ", theme::positive())
            } else if i == active {
                ("  ▶ ", theme::accent_bold())
            } else {
                ("  · ", theme::muted())
            };
            Line::from(vec![Span::styled(marker, style), Span::styled(*step, style)])
        })
        .collect()
}

/// Text bar of `width` cells filled to `ratio`.
pub fn bar(ratio: f64, width: usize) -> (String, String) {
    let filled = ((ratio.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    ("█".repeat(filled), "░".repeat(width - filled))
}

/// Compute a centered rect for overlays.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
