//! Help panel [5]: keyboard shortcuts.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use pharmaguard_core::report::DISCLAIMER;

use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let mut lines: Vec<Line> = Vec::new();

    section(&mut lines, "Global Navigation");
    key(&mut lines, "1-5", "Switch to panel by number");
    key(&mut lines, "Tab / Shift+Tab", "Cycle panels forward / back");
    key(&mut lines, "!", "Open error history overlay");
    key(&mut lines, "Esc", "Dismiss error banner");
    key(&mut lines, "q", "Quit");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 1 — Upload");
    key(&mut lines, "o", "Open a .vcf file by path (max 5 MB)");
    key(&mut lines, "r", "Remove the selected file");
    key(&mut lines, "j / k", "Move drug cursor down / up");
    key(&mut lines, "Space", "Toggle drug (removes a custom drug)");
    key(&mut lines, "c", "Add a custom drug");
    key(&mut lines, "x", "Clear drug selection");
    key(&mut lines, "s", "Switch failure policy (surface / synthetic)");
    key(&mut lines, "h", "Check backend health");
    key(&mut lines, "Enter", "Run analysis");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 2 — Report");
    key(&mut lines, "[ / ]", "Previous / next result");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 3 — Explanation");
    key(&mut lines, "e", "Expand / collapse");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 4 — JSON");
    key(&mut lines, "e", "Expand / collapse");
    key(&mut lines, "j / k", "Scroll (expanded)");
    key(&mut lines, "w", "Write export file");
    lines.push(Line::from(""));

    section(&mut lines, "Paths");
    key(&mut lines, "Exports", &app.export_dir.display().to_string());
    key(&mut lines, "Backend", &app.api_url);
    lines.push(Line::from(""));

    lines.push(Line::from(Span::styled(DISCLAIMER, theme::muted())));

    let para = Paragraph::new(lines).wrap(ratatui::widgets::Wrap { trim: false });
    f.render_widget(para, area);
}

fn section<'a>(lines: &mut Vec<Line<'a>>, title: &str) {
    lines.push(Line::from(Span::styled(title.to_string(), theme::accent_bold())));
}

fn key<'a>(lines: &mut Vec<Line<'a>>, keys: &str, desc: &str) {
    lines.push(Line::from(vec![
        Span::styled(format!("  {:>16}  ", keys), theme::accent()),
        Span::styled(desc.to_string(), theme::muted()),
    ]));
}
