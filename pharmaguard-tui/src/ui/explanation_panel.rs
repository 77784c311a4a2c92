//! Explanation panel [3]: LLM summary with typewriter reveal, mechanism,
//! clinical context, cited variants and the disclaimer.

use std::time::Instant;

use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use ratatui::Frame;

use pharmaguard_core::report::{ExplanationView, DISCLAIMER};

use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState, now: Instant) {
    let Some(analysis) = app.analysis.current() else {
        let para = Paragraph::new(Span::styled("No explanation to show.", theme::muted()));
        f.render_widget(para, area);
        return;
    };

    let view = ExplanationView::build(analysis);
    let lines = explanation_lines(
        &view,
        app.view.explanation_expanded,
        app.analysis.revealed_chars(now),
    );
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

fn explanation_lines(view: &ExplanationView, expanded: bool, revealed: usize) -> Vec<Line<'static>> {
    let toggle = if expanded { "[e] collapse" } else { "[e] expand" };
    let mut lines = vec![Line::from(vec![
        Span::styled("LLM EXPLANATION  ", theme::accent_bold()),
        Span::styled("AI-generated clinical context", theme::muted()),
        Span::styled(format!("  {toggle}"), theme::muted()),
    ])];
    if !expanded {
        return lines;
    }
    lines.push(Line::from(""));

    if view.is_empty() {
        lines.push(Line::from(Span::styled(
            "The backend returned no explanation for this result.",
            theme::muted(),
        )));
    }

    if view.summary.is_some() {
        let typing = revealed < view.summary_len();
        let mut spans = vec![Span::styled(
            view.summary_prefix(revealed).to_string(),
            theme::text(),
        )];
        if typing {
            spans.push(Span::styled("▌", theme::accent()));
        }
        lines.push(Line::from(Span::styled("CLINICAL SUMMARY", theme::accent())));
        lines.push(Line::from(spans));
        lines.push(Line::from(""));
    }
    if let Some(mechanism) = &view.mechanism {
        section(&mut lines, "BIOLOGICAL MECHANISM", mechanism);
    }
    if let Some(context) = &view.clinical_context {
        section(&mut lines, "CLINICAL CONTEXT", context);
    }
    if !view.variants_cited.is_empty() {
        let mut spans = vec![Span::styled("VARIANTS REFERENCED  ", theme::accent())];
        for v in &view.variants_cited {
            spans.push(Span::styled(format!("{v} "), theme::neutral()));
        }
        lines.push(Line::from(spans));
        lines.push(Line::from(""));
    }

    lines.push(Line::from(Span::styled(
        DISCLAIMER,
        theme::muted().add_modifier(Modifier::ITALIC),
    )));
    lines
}

fn section(lines: &mut Vec<Line<'static>>, title: &'static str, body: &str) {
    lines.push(Line::from(Span::styled(title, theme::accent())));
    lines.push(Line::from(Span::styled(body.to_string(), theme::secondary())));
    lines.push(Line::from(""));
}
