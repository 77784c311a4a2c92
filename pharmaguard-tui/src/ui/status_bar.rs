//! Bottom status bar: panel hints, request state, last status message.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{AppState, StatusLevel};
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let mut spans: Vec<Span> = Vec::new();

    // Panel hints
    spans.push(Span::styled(
        " 1:Upload 2:Report 3:Explanation 4:JSON 5:Help !:Errors",
        theme::muted(),
    ));

    spans.push(Span::raw(" | "));

    if app.analysis.in_flight {
        spans.push(Span::styled("● analyzing ", theme::warning()));
    } else if app.analysis.results.iter().any(|a| a.provenance.is_synthetic()) {
        spans.push(Span::styled("● synthetic ", theme::warning()));
    }

    // Status message
    if let Some((msg, level)) = &app.status_message {
        let style = match level {
            StatusLevel::Info => theme::accent(),
            StatusLevel::Warning => theme::warning(),
            StatusLevel::Error => theme::negative(),
        };
        spans.push(Span::styled(msg.as_str(), style));
    }

    let line = Line::from(spans);
    let para = Paragraph::new(line);
    f.render_widget(para, area);
}
