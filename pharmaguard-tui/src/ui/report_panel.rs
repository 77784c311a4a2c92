//! Report panel [2]: risk card, pharmacogenomic profile, recommendation.

use std::time::Instant;

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use ratatui::Frame;

use pharmaguard_core::report::{RiskCard, SYNTHETIC_BANNER};

use crate::app::AppState;
use crate::theme;
use crate::ui::{bar, progress_lines};

const GAUGE_WIDTH: usize = 30;

pub fn render(f: &mut Frame, area: Rect, app: &AppState, now: Instant) {
    let a = &app.analysis;

    if let Some(step) = a.progress_step(now) {
        let mut lines = vec![
            Line::from(Span::styled("Analyzing...", theme::accent_bold())),
            Line::from(""),
        ];
        lines.extend(progress_lines(step));
        f.render_widget(Paragraph::new(lines), area);
        return;
    }

    let Some(analysis) = a.current() else {
        let msg = if a.banner.is_some() {
            "Analysis failed. See the banner above."
        } else {
            "No analysis yet. Load a VCF and pick drugs in Panel 1."
        };
        f.render_widget(Paragraph::new(Span::styled(msg, theme::muted())), area);
        return;
    };

    let card = RiskCard::build(analysis, a.requested_drug());
    let lines = card_lines(&card, a.selected, a.results.len());
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

fn card_lines(card: &RiskCard, selected: usize, total: usize) -> Vec<Line<'static>> {
    let mut lines: Vec<Line> = Vec::new();

    if card.synthetic {
        lines.push(Line::from(Span::styled(
            format!(" {SYNTHETIC_BANNER} "),
            theme::synthetic_banner(),
        )));
        lines.push(Line::from(""));
    }

    if total > 1 {
        lines.push(Line::from(Span::styled(
            format!("Result {}/{}  [ / ] cycle", selected + 1, total),
            theme::muted(),
        )));
    }

    // Headline
    lines.push(Line::from(vec![
        Span::styled("RISK ASSESSMENT  ", theme::muted()),
        Span::styled(card.headline(), theme::risk(card.label)),
        Span::styled(format!("  {}", card.sublabel()), theme::secondary()),
    ]));
    lines.push(Line::from(vec![
        Span::styled("DRUG TARGET      ", theme::muted()),
        Span::styled(card.drug.clone(), theme::text()),
    ]));
    lines.push(Line::from(vec![
        Span::styled("SEVERITY         ", theme::muted()),
        Span::styled(card.severity_line.clone(), theme::severity(card.severity)),
    ]));
    let (full, empty) = bar(card.gauge_ratio, GAUGE_WIDTH);
    lines.push(Line::from(vec![
        Span::styled("CONFIDENCE       ", theme::muted()),
        Span::styled(full, theme::risk(card.label)),
        Span::styled(empty, theme::muted()),
        Span::styled(format!(" {}", card.confidence_text), theme::text()),
    ]));
    lines.push(Line::from(""));

    // Profile
    lines.push(Line::from(Span::styled("PHARMACOGENOMIC PROFILE", theme::accent_bold())));
    for cell in &card.profile {
        let mut spans = vec![
            Span::styled(format!("  {:<14}", cell.label), theme::muted()),
            Span::styled(cell.value.clone(), theme::accent()),
        ];
        if let Some(detail) = cell.detail {
            spans.push(Span::styled(format!("  {detail}"), theme::secondary()));
        }
        lines.push(Line::from(spans));
    }
    if !card.variants.is_empty() {
        lines.push(Line::from(Span::styled("  DETECTED VARIANTS", theme::muted())));
        for v in &card.variants {
            let mut spans = vec![Span::styled(format!("    {}", v.rsid), theme::accent())];
            if let Some(impact) = &v.impact {
                spans.push(Span::styled(format!("  {impact}"), theme::secondary()));
            }
            lines.push(Line::from(spans));
        }
    }

    // Recommendation
    if let Some(rec) = &card.recommendation {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("CLINICAL RECOMMENDATION", theme::accent_bold())));
        if let Some(action) = &rec.action {
            lines.push(Line::from(Span::styled(format!("  {action}"), theme::text())));
        }
        if let Some(dose) = &rec.dose_adjustment {
            lines.push(Line::from(vec![
                Span::styled("  DOSE ADJUSTMENT  ", theme::warning()),
                Span::styled(dose.clone(), theme::text()),
            ]));
        }
        if let Some(guideline) = &rec.cpic_guideline {
            lines.push(Line::from(Span::styled(format!("  {guideline}"), theme::muted())));
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use pharmaguard_core::{Analysis, Provenance};

    fn text(lines: &[Line]) -> String {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn toxic_card_text() {
        let doc = serde_json::json!({
            "risk_assessment": {"risk_label": "Toxic", "confidence_score": 0.95, "severity": "critical"}
        });
        let analysis = Analysis::from_value(doc, Provenance::Backend).unwrap();
        let card = RiskCard::build(&analysis, "WARFARIN");
        let out = text(&card_lines(&card, 0, 1));
        assert!(out.contains("TOXIC"));
        assert!(out.contains("CRITICAL SEVERITY"));
        assert!(out.contains("95.0%"));
        assert!(out.contains("WARFARIN"));
        assert!(!out.contains("Result 1/1"));
        assert!(!out.contains("SYNTHETIC"));
    }

    #[test]
    fn synthetic_card_is_bannered() {
        let doc = serde_json::json!({});
        let analysis = Analysis::from_value(doc, Provenance::Synthetic).unwrap();
        let card = RiskCard::build(&analysis, "CODEINE");
        let out = text(&card_lines(&card, 1, 2));
        assert!(out.starts_with(&format!(" {SYNTHETIC_BANNER}")));
        assert!(out.contains("Result 2/2"));
        assert!(out.contains("—"));
    }
}
