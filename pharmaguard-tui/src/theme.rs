//! Clinical dark theme tokens for the PharmaGuard TUI
//!
//! # Color Palette
//! - **Background**: Deep navy (base layer)
//! - **Accent**: Teal (focus, highlights, keys)
//! - **Safe**: Green (safe risk, passing metrics)
//! - **Adjust**: Amber (dose adjustment, warnings)
//! - **Toxic**: Red (toxic risk, errors, failing metrics)
//! - **Ineffective**: Violet (ineffective risk)
//! - **Muted**: Slate (unknown risk, secondary text)

use ratatui::style::{Color, Modifier, Style};

use pharmaguard_core::highlight::TokenKind;
use pharmaguard_core::report::MetricState;
use pharmaguard_core::{RiskLabel, Severity};

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub background: Color,
    pub accent: Color,
    pub safe: Color,
    pub adjust: Color,
    pub toxic: Color,
    pub ineffective: Color,
    pub muted: Color,
    /// JSON string values
    pub string: Color,
    /// JSON numbers
    pub number: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::clinical()
    }
}

/// Palette used by the free style helpers below.
pub const PALETTE: Theme = Theme::clinical();

impl Theme {
    pub const fn clinical() -> Self {
        Self {
            background: Color::Rgb(10, 14, 26),
            accent: Color::Rgb(0, 229, 204),
            safe: Color::Rgb(0, 230, 118),
            adjust: Color::Rgb(255, 171, 64),
            toxic: Color::Rgb(255, 23, 68),
            ineffective: Color::Rgb(170, 0, 255),
            muted: Color::Rgb(84, 110, 122),
            string: Color::Rgb(128, 203, 196),
            number: Color::Rgb(255, 213, 79),
            text_primary: Color::White,
            text_secondary: Color::Rgb(176, 190, 197),
        }
    }

    pub fn risk_color(&self, label: RiskLabel) -> Color {
        match label {
            RiskLabel::Safe => self.safe,
            RiskLabel::AdjustDosage => self.adjust,
            RiskLabel::Toxic => self.toxic,
            RiskLabel::Ineffective => self.ineffective,
            RiskLabel::Unknown => self.muted,
        }
    }

    pub fn severity_color(&self, severity: Severity) -> Color {
        match severity {
            Severity::None => self.muted,
            Severity::Low => Color::Rgb(128, 203, 196),
            Severity::Moderate => self.adjust,
            Severity::High => Color::Rgb(255, 109, 0),
            Severity::Critical => self.toxic,
        }
    }

    pub fn token_color(&self, kind: TokenKind) -> Color {
        match kind {
            TokenKind::Key => self.accent,
            TokenKind::String => self.string,
            TokenKind::Number => self.number,
            TokenKind::Bool => self.ineffective,
            TokenKind::Null => self.muted,
            TokenKind::Plain | TokenKind::Whitespace => self.text_secondary,
        }
    }

    pub fn metric_color(&self, state: &MetricState) -> Color {
        match state {
            MetricState::Pass => self.safe,
            MetricState::Fail => self.toxic,
            MetricState::Value => self.text_secondary,
        }
    }
}

pub fn accent() -> Style {
    Style::default().fg(PALETTE.accent)
}

pub fn accent_bold() -> Style {
    accent().add_modifier(Modifier::BOLD)
}

pub fn muted() -> Style {
    Style::default().fg(PALETTE.muted)
}

pub fn text() -> Style {
    Style::default().fg(PALETTE.text_primary)
}

pub fn secondary() -> Style {
    Style::default().fg(PALETTE.text_secondary)
}

pub fn positive() -> Style {
    Style::default().fg(PALETTE.safe)
}

pub fn warning() -> Style {
    Style::default().fg(PALETTE.adjust)
}

pub fn negative() -> Style {
    Style::default().fg(PALETTE.toxic)
}

pub fn neutral() -> Style {
    Style::default().fg(PALETTE.ineffective)
}

pub fn panel_border(active: bool) -> Style {
    if active {
        accent()
    } else {
        muted()
    }
}

pub fn panel_title(active: bool) -> Style {
    if active {
        accent_bold()
    } else {
        muted()
    }
}

pub fn risk(label: RiskLabel) -> Style {
    Style::default()
        .fg(PALETTE.risk_color(label))
        .add_modifier(Modifier::BOLD)
}

pub fn severity(severity: Severity) -> Style {
    Style::default().fg(PALETTE.severity_color(severity))
}

pub fn token(kind: TokenKind) -> Style {
    Style::default().fg(PALETTE.token_color(kind))
}

pub fn metric(state: &MetricState) -> Style {
    Style::default().fg(PALETTE.metric_color(state))
}

/// Banner style for synthetic placeholder results.
pub fn synthetic_banner() -> Style {
    Style::default()
        .fg(PALETTE.background)
        .bg(PALETTE.adjust)
        .add_modifier(Modifier::BOLD)
}
