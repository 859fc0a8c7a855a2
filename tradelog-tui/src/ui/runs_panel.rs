//! Runs panel: backtest listing with a cursor.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use tradelog_core::to_date;

use crate::app::AppState;
use crate::theme;
use crate::ui::truncate;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let session = &app.session;
    let listing = session.listing();
    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(vec![
        Span::styled(format!("{} runs", listing.len()), theme::accent()),
        Span::styled("  [j/k]move [Enter]load [r]eload", theme::muted()),
    ]));
    if let Some(err) = session.list_error() {
        lines.push(Line::from(Span::styled(
            format!("Listing failed: {err}"),
            theme::negative(),
        )));
    }
    lines.push(Line::from(""));

    if listing.is_empty() {
        lines.push(Line::from(Span::styled(
            "No runs. Check api_url / data_dir in the config, then press r.",
            theme::muted(),
        )));
        f.render_widget(Paragraph::new(lines), area);
        return;
    }

    lines.push(Line::from(Span::styled(
        format!(
            "  {:>8} {:>12} {:>6} {:>12} {:>12}",
            "ID", "Symbol", "TF", "Start", "End"
        ),
        theme::accent_bold(),
    )));

    let visible = (area.height as usize).saturating_sub(lines.len()).max(1);
    let first = app.runs_cursor.saturating_sub(visible - 1);
    let selected = session.selected();

    for (i, run) in listing.iter().enumerate().skip(first).take(visible) {
        let style = if i == app.runs_cursor {
            theme::selected()
        } else if Some(run.id.as_str()) == selected {
            theme::positive()
        } else {
            theme::muted()
        };
        let loaded = if Some(run.id.as_str()) == selected { "*" } else { " " };
        let text = |v: &Option<String>, width: usize| truncate(v.as_deref().unwrap_or("-"), width);
        let day = |v: &Option<String>| match to_date(v.as_deref()) {
            Some(d) => d.to_string(),
            None => text(v, 12),
        };

        lines.push(Line::from(Span::styled(
            format!(
                "{loaded} {:>8} {:>12} {:>6} {:>12} {:>12}",
                truncate(&run.id, 8),
                text(&run.symbol, 12),
                text(&run.interval, 6),
                day(&run.start_date),
                day(&run.end_date),
            ),
            style,
        )));
    }

    f.render_widget(Paragraph::new(lines), area);
}
