//! Keyboard input dispatch. Overlays see keys first, then global keys, then the active panel.

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use pharmaguard_core::{highlight, report};

use crate::app::{AppState, Overlay, Panel};

pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return;
    }

    // 1. Overlays consume input first.
    match app.overlay {
        Overlay::Welcome => {
            app.overlay = Overlay::None;
            return;
        }
        Overlay::ErrorHistory => {
            handle_error_overlay(app, key);
            return;
        }
        Overlay::FilePath | Overlay::CustomDrug => {
            handle_text_overlay(app, key);
            return;
        }
        Overlay::None => {}
    }

    // 2. Global keys (always available).
    match key.code {
        KeyCode::Char('q') => {
            app.running = false;
            return;
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.running = false;
            return;
        }
        KeyCode::Char(c @ '1'..='5') => {
            if let Some(panel) = c.to_digit(10).and_then(|d| Panel::from_index(d as usize - 1)) {
                app.active_panel = panel;
            }
            return;
        }
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.active_panel = app.active_panel.prev();
            } else {
                app.active_panel = app.active_panel.next();
            }
            return;
        }
        KeyCode::BackTab => {
            app.active_panel = app.active_panel.prev();
            return;
        }
        KeyCode::Char('!') => {
            app.overlay = Overlay::ErrorHistory;
            app.error_scroll = 0;
            return;
        }
        KeyCode::Esc => {
            if !app.dismiss_banner() {
                app.status_message = None;
            }
            return;
        }
        _ => {}
    }

    // 3. Panel-specific keys.
    match app.active_panel {
        Panel::Upload => handle_upload_key(app, key),
        Panel::Report => handle_report_key(app, key),
        Panel::Explanation => handle_explanation_key(app, key),
        Panel::Json => handle_json_key(app, key),
        Panel::Help => {} // display only
    }
}

fn handle_error_overlay(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('!') => {
            app.overlay = Overlay::None;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            if app.error_scroll + 1 < app.error_history.len() {
                app.error_scroll += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.error_scroll = app.error_scroll.saturating_sub(1);
        }
        _ => {}
    }
}

fn handle_text_overlay(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.overlay = Overlay::None;
            app.input.clear();
        }
        KeyCode::Enter => {
            let text = std::mem::take(&mut app.input);
            let overlay = std::mem::replace(&mut app.overlay, Overlay::None);
            match overlay {
                Overlay::FilePath => {
                    let trimmed = text.trim();
                    if !trimmed.is_empty() {
                        app.load_file(&PathBuf::from(trimmed));
                    }
                }
                Overlay::CustomDrug => match app.upload.drugs.add_custom(&text) {
                    Some(drug) => app.set_status(format!("Added {drug}")),
                    None if text.trim().is_empty() => {}
                    None => app.set_warning(format!("{} is already selected", text.trim().to_uppercase())),
                },
                _ => {}
            }
        }
        KeyCode::Backspace => {
            app.input.pop();
        }
        KeyCode::Char(c) => {
            app.input.push(c);
        }
        _ => {}
    }
}

fn handle_upload_key(app: &mut AppState, key: KeyEvent) {
    let row_count = app.upload.row_count();

    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if app.upload.cursor + 1 < row_count {
                app.upload.cursor += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.upload.cursor = app.upload.cursor.saturating_sub(1);
        }
        KeyCode::Char(' ') => app.upload.toggle_cursor(),
        KeyCode::Char('o') => {
            app.input = app
                .upload
                .last_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            app.overlay = Overlay::FilePath;
        }
        KeyCode::Char('c') => {
            app.input.clear();
            app.overlay = Overlay::CustomDrug;
        }
        KeyCode::Char('x') => {
            app.upload.drugs.clear();
            app.upload.clamp_cursor();
        }
        KeyCode::Char('r') => app.remove_file(),
        KeyCode::Char('s') => app.toggle_policy(),
        KeyCode::Char('h') => app.request_health(),
        KeyCode::Enter => app.submit(),
        _ => {}
    }
}

fn handle_report_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Char(']') | KeyCode::Char('l') | KeyCode::Right => app.analysis.select_next(),
        KeyCode::Char('[') | KeyCode::Char('h') | KeyCode::Left => app.analysis.select_prev(),
        _ => {}
    }
}

fn handle_explanation_key(app: &mut AppState, key: KeyEvent) {
    if let KeyCode::Char('e') | KeyCode::Enter = key.code {
        app.view.explanation_expanded = !app.view.explanation_expanded;
    }
}

fn handle_json_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('e') | KeyCode::Enter => {
            app.view.json_expanded = !app.view.json_expanded;
            app.view.json_scroll = 0;
        }
        KeyCode::Char('w') => {
            app.export_current();
        }
        KeyCode::Char('j') | KeyCode::Down => {
            let lines = app
                .analysis
                .current()
                .map(|a| highlight::line_count(&report::export_json(a)))
                .unwrap_or(0);
            if app.view.json_expanded && app.view.json_scroll + 1 < lines {
                app.view.json_scroll += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.view.json_scroll = app.view.json_scroll.saturating_sub(1);
        }
        KeyCode::Char(']') => app.analysis.select_next(),
        KeyCode::Char('[') => app.analysis.select_prev(),
        _ => {}
    }
}
