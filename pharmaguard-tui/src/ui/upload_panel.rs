//! Upload panel [1]: VCF file, drug picker, submit and progress.

use std::time::Instant;

use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use pharmaguard_core::validation::can_submit;

use crate::app::AppState;
use crate::theme;
use crate::ui::progress_lines;

pub fn render(f: &mut Frame, area: Rect, app: &AppState, now: Instant) {
    let u = &app.upload;
    let mut lines: Vec<Line> = Vec::new();

    // File
    lines.push(Line::from(Span::styled("VCF FILE", theme::accent_bold())));
    match &u.upload {
        Some(upload) => lines.push(Line::from(vec![
            Span::styled("  ● ", theme::positive()),
            Span::styled(upload.name().to_string(), theme::text()),
            Span::styled(format!("  {} KB", upload.size_kib()), theme::muted()),
            Span::styled("  [r]emove [o]pen another", theme::muted()),
        ])),
        None => lines.push(Line::from(vec![
            Span::styled("  ○ ", theme::muted()),
            Span::styled("No file selected", theme::muted()),
            Span::styled("  [o]pen  (.vcf, max 5 MB)", theme::muted()),
        ])),
    }
    if let Some(err) = &u.file_error {
        lines.push(Line::from(Span::styled(format!("  {err}"), theme::negative())));
    }
    lines.push(Line::from(""));

    // Drugs
    lines.push(Line::from(vec![
        Span::styled("TARGET DRUGS", theme::accent_bold()),
        Span::styled(
            "  [j/k]move [Space]toggle [c]ustom [x]clear",
            theme::muted(),
        ),
    ]));
    for (i, row) in u.rows().iter().enumerate() {
        let check = if row.selected { "[x]" } else { "[ ]" };
        let gene = match (row.custom, row.gene) {
            (true, _) => "custom".to_string(),
            (false, Some(g)) => g.to_string(),
            (false, None) => String::new(),
        };
        let base = if row.selected {
            theme::accent()
        } else {
            theme::secondary()
        };
        let style = if i == u.cursor {
            base.add_modifier(Modifier::REVERSED)
        } else {
            base
        };
        lines.push(Line::from(vec![
            Span::styled(format!("  {check} {:<14}", row.name), style),
            Span::styled(format!(" {gene}"), theme::muted()),
        ]));
    }
    let order = u.drugs.selected();
    if !order.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("  Selected: ", theme::muted()),
            Span::styled(order.join(", "), theme::accent()),
        ]));
    }
    lines.push(Line::from(""));

    // Backend
    lines.push(Line::from(vec![
        Span::styled("BACKEND  ", theme::accent_bold()),
        Span::styled(app.api_url.as_str(), theme::secondary()),
        Span::styled(
            format!("  health: {}", app.health.as_deref().unwrap_or("unchecked")),
            theme::muted(),
        ),
        Span::styled("  [h]ealth", theme::muted()),
    ]));
    lines.push(Line::from(vec![
        Span::styled("  On failure: ", theme::muted()),
        Span::styled(app.policy.label(), theme::warning()),
        Span::styled("  [s]witch", theme::muted()),
    ]));
    lines.push(Line::from(""));

    // Submit / progress
    if let Some(step) = app.analysis.progress_step(now) {
        lines.push(Line::from(Span::styled("ANALYZING", theme::accent_bold())));
        lines.extend(progress_lines(step));
    } else {
        match can_submit(u.upload.as_ref(), &u.drugs, app.analysis.in_flight) {
            Ok(()) => lines.push(Line::from(Span::styled(
                format!("[Enter] Analyze {} drug(s)", u.drugs.len()),
                theme::accent_bold(),
            ))),
            Err(reason) => lines.push(Line::from(vec![
                Span::styled("[Enter] Analyze", theme::muted()),
                Span::styled(format!("  ({reason})"), theme::muted()),
            ])),
        }
    }

    f.render_widget(Paragraph::new(lines), area);
}
