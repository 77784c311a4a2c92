//! JSON panel [4]: highlighted, line-numbered export preview and quality metrics.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use pharmaguard_core::highlight;
use pharmaguard_core::report::{self, QualityMetric};

use crate::app::{AppState, COLLAPSED_JSON_LINES};
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let Some(analysis) = app.analysis.current() else {
        let para = Paragraph::new(Span::styled("No result to export.", theme::muted()));
        f.render_widget(para, area);
        return;
    };

    let json = report::export_json(analysis);
    let total = highlight::line_count(&json);
    let metrics = report::quality_metrics(analysis);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(if metrics.is_empty() { 0 } else { 2 }),
        ])
        .split(area);

    // Header
    let toggle = if app.view.json_expanded { "[e] collapse" } else { "[e] expand" };
    let header = Line::from(vec![
        Span::styled(report::export_file_name(analysis), theme::accent_bold()),
        Span::styled(format!("  {total} lines"), theme::muted()),
        Span::styled(format!("  {toggle} [w]rite [j/k]scroll"), theme::muted()),
    ]);
    f.render_widget(Paragraph::new(header), chunks[0]);

    // Body
    let (start, len) = window(
        total,
        app.view.json_expanded,
        app.view.json_scroll,
        chunks[1].height as usize,
    );
    let lines = numbered_lines(&json, start, len, total);
    f.render_widget(Paragraph::new(lines), chunks[1]);

    // Footer
    if !metrics.is_empty() {
        f.render_widget(Paragraph::new(metrics_line(&metrics)), chunks[2]);
    }
}

/// First line and number of lines to draw.
fn window(total: usize, expanded: bool, scroll: usize, height: usize) -> (usize, usize) {
    if expanded {
        let start = scroll.min(total.saturating_sub(1));
        (start, height.min(total - start))
    } else {
        (0, total.min(COLLAPSED_JSON_LINES).min(height))
    }
}

fn numbered_lines(json: &str, start: usize, len: usize, total: usize) -> Vec<Line<'_>> {
    let width = total.to_string().len();
    highlight::highlight_lines(json)
        .into_iter()
        .enumerate()
        .skip(start)
        .take(len)
        .map(|(i, tokens)| {
            let mut spans = vec![Span::styled(
                format!("{:>width$} ", i + 1),
                theme::muted(),
            )];
            spans.extend(
                tokens
                    .into_iter()
                    .map(|t| Span::styled(t.text, theme::token(t.kind))),
            );
            Line::from(spans)
        })
        .collect()
}

fn metrics_line(metrics: &[QualityMetric]) -> Line<'static> {
    let mut spans = vec![Span::styled("QUALITY  ", theme::accent())];
    for m in metrics {
        spans.push(Span::styled(format!("{}: ", m.label), theme::muted()));
        spans.push(Span::styled(format!("{}   ", m.value), theme::metric(&m.state)));
    }
    Line::from(spans)
}
