//! Neon-on-charcoal palette and the styles the panels draw with.
//!
//! - **Accent**: electric cyan (focus, headings)
//! - **Positive**: neon green (gains, long, take profit)
//! - **Negative**: hot pink (losses, short, stop loss, errors)
//! - **Warning**: neon orange
//! - **Neutral**: cool purple (other exits, secondary info)
//! - **Muted**: steel blue (labels, hints)

use ratatui::style::{Color, Modifier, Style};

use tradelog_core::{ExitClass, TradeSide};

pub const BACKGROUND: Color = Color::Rgb(18, 18, 20);
pub const ACCENT: Color = Color::Rgb(0, 255, 255);
pub const POSITIVE: Color = Color::Rgb(0, 255, 128);
pub const NEGATIVE: Color = Color::Rgb(255, 20, 147);
pub const WARNING: Color = Color::Rgb(255, 140, 0);
pub const NEUTRAL: Color = Color::Rgb(147, 112, 219);
pub const MUTED: Color = Color::Rgb(100, 149, 237);
pub const TEXT: Color = Color::White;

pub fn accent() -> Style {
    Style::default().fg(ACCENT)
}

pub fn accent_bold() -> Style {
    accent().add_modifier(Modifier::BOLD)
}

pub fn positive() -> Style {
    Style::default().fg(POSITIVE)
}

pub fn negative() -> Style {
    Style::default().fg(NEGATIVE)
}

pub fn warning() -> Style {
    Style::default().fg(WARNING)
}

pub fn neutral() -> Style {
    Style::default().fg(NEUTRAL)
}

pub fn muted() -> Style {
    Style::default().fg(MUTED)
}

pub fn text() -> Style {
    Style::default().fg(TEXT)
}

/// Cursor row highlight.
pub fn selected() -> Style {
    accent().add_modifier(Modifier::REVERSED)
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

/// Green for gains, pink for losses, plain for zero.
pub fn pnl_color(value: f64) -> Color {
    if value > 0.0 {
        POSITIVE
    } else if value < 0.0 {
        NEGATIVE
    } else {
        TEXT
    }
}

pub fn pnl(value: f64) -> Style {
    Style::default().fg(pnl_color(value))
}

pub fn side_color(side: TradeSide) -> Color {
    match side {
        TradeSide::Long => POSITIVE,
        TradeSide::Short => NEGATIVE,
        TradeSide::Unknown => MUTED,
    }
}

pub fn exit_color(class: ExitClass) -> Color {
    match class {
        ExitClass::TakeProfit => POSITIVE,
        ExitClass::StopLoss => NEGATIVE,
        ExitClass::Other => NEUTRAL,
    }
}
