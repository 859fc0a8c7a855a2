//! Help panel: keyboard shortcuts.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let mut lines: Vec<Line> = Vec::new();

    section(&mut lines, "Global");
    key(&mut lines, "1-5", "Switch to panel by number");
    key(&mut lines, "Tab / Shift+Tab", "Cycle panels forward / back");
    key(&mut lines, "r", "Reload the run list");
    key(&mut lines, "f", "Edit the trade filter");
    key(&mut lines, "x", "Export summary, distribution and daily CSVs");
    key(&mut lines, "e", "Open error history");
    key(&mut lines, "q / Ctrl+C", "Quit");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 1 — Runs");
    key(&mut lines, "j / k", "Move cursor down / up");
    key(&mut lines, "g / G", "First / last run");
    key(&mut lines, "Enter", "Load detail and trade log");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 3 — Trades");
    key(&mut lines, "j / k", "Move cursor down / up");
    key(&mut lines, "PgDn / PgUp", "Page down / up");
    key(&mut lines, "g / G", "First / last trade");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 4 — Charts");
    key(&mut lines, "m / Space", "Cycle cumulative PnL, daily PnL, trades, exits");
    lines.push(Line::from(""));

    section(&mut lines, "Filter editor");
    key(&mut lines, "Up / Down", "Move between fields");
    key(&mut lines, "0-9 -", "Type a date (YYYY-MM-DD, blank for open)");
    key(&mut lines, "Space", "Toggle take profit / stop loss, cycle side");
    key(&mut lines, "d", "Reset to the run's date range");
    key(&mut lines, "Enter / Esc", "Apply / cancel");
    lines.push(Line::from(""));

    section(&mut lines, "Output");
    key(&mut lines, "Export directory", &app.output_dir.display().to_string());

    f.render_widget(Paragraph::new(lines), area);
}

fn section<'a>(lines: &mut Vec<Line<'a>>, title: &str) {
    lines.push(Line::from(Span::styled(title.to_string(), theme::accent_bold())));
}

fn key<'a>(lines: &mut Vec<Line<'a>>, keys: &str, desc: &str) {
    lines.push(Line::from(vec![
        Span::styled(format!("  {:>20}  ", keys), theme::accent()),
        Span::styled(desc.to_string(), theme::muted()),
    ]));
}
