//! Summary panel: run metadata, active filter and the metric table.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use tradelog_core::{format_display, FilterCriteria, MetricKind, SummarySource};

use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let session = &app.session;
    let mut lines: Vec<Line> = Vec::new();

    let Some(id) = session.selected() else {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "No run loaded. Pick one in Runs (press 1) and press Enter.",
            theme::muted(),
        )));
        f.render_widget(Paragraph::new(lines), area);
        return;
    };

    let title = session
        .selected_listing()
        .map(|l| l.label())
        .unwrap_or_else(|| format!("#{id}"));
    lines.push(Line::from(Span::styled(title, theme::accent_bold())));

    if let Some(d) = session.detail() {
        let mut meta: Vec<String> = Vec::new();
        meta.extend(d.market_type.clone());
        if let Some(lev) = d.leverage {
            meta.push(format!("{lev}x"));
        }
        if d.is_test_mode == Some(true) {
            meta.push("test mode".into());
        }
        if !meta.is_empty() {
            lines.push(Line::from(Span::styled(meta.join(" · "), theme::neutral())));
        }
    }
    for (what, err) in [
        ("Detail", session.detail_error()),
        ("Trade log", session.trades_error()),
    ] {
        if let Some(err) = err {
            lines.push(Line::from(Span::styled(
                format!("{what} unavailable: {err}"),
                theme::negative(),
            )));
        }
    }

    lines.push(Line::from(vec![
        Span::styled("Filter: ", theme::muted()),
        Span::styled(describe(session.criteria()), theme::accent()),
    ]));

    let summary = &app.view.summary;
    let source = match summary.source {
        SummarySource::Detail => "server detail, gaps filled from trades",
        SummarySource::Records => "trade rows only",
    };
    lines.push(Line::from(vec![
        Span::styled("Source: ", theme::muted()),
        Span::styled(source, theme::neutral()),
        Span::styled(
            format!("  ({} of {} trades shown)", app.view.outcome.len(), session.records().len()),
            theme::muted(),
        ),
    ]));
    lines.push(Line::from(""));

    for (label, value, kind) in summary.metrics() {
        let signed = matches!(kind, MetricKind::Currency | MetricKind::Percent)
            && (label.contains("PnL") || label.starts_with("Return"));
        let style = if signed { theme::pnl(value) } else { theme::text() };
        lines.push(Line::from(vec![
            Span::styled(format!("  {:>26}: ", label), theme::muted()),
            Span::styled(format!("{:>16}", format_display(value, kind)), style),
        ]));
    }

    f.render_widget(Paragraph::new(lines), area);
}

/// One-line description of the filter, e.g. `2024-01-01..open · TP SL · LONG`.
pub fn describe(criteria: &FilterCriteria) -> String {
    let bound = |d: Option<chrono::NaiveDate>| d.map_or_else(|| "open".to_string(), |d| d.to_string());
    let mut exits: Vec<&str> = Vec::new();
    if criteria.include_take_profit {
        exits.push("TP");
    }
    if criteria.include_stop_loss {
        exits.push("SL");
    }
    let exits = if exits.is_empty() { "other only".to_string() } else { exits.join(" ") };
    format!(
        "{}..{} · {} · {}",
        bound(criteria.start_date),
        bound(criteria.end_date),
        exits,
        criteria.side.label()
    )
}
