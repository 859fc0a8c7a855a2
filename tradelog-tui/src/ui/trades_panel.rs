//! Trades panel: filtered trade table drawn through the row window.
//!
//! Only rows inside the window are formatted; the table height feeds back
//! into the window's viewport on every draw.

use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use tradelog_core::{format_display, Field, MetricKind, TradeRecord, TradeView};

use crate::app::AppState;
use crate::theme;
use crate::ui::truncate;

/// Title, column header and footer.
const CHROME_LINES: u16 = 3;

pub fn render(f: &mut Frame, area: Rect, app: &mut AppState) {
    let body_height = area.height.saturating_sub(CHROME_LINES).max(1) as usize;
    app.session.rows_mut().set_viewport(body_height);

    let session = &app.session;
    let outcome = &app.view.outcome;
    let records = session.records();
    let mut lines: Vec<Line> = Vec::new();

    let tally = &outcome.tally;
    lines.push(Line::from(vec![
        Span::styled(format!("{} trades", outcome.len()), theme::accent()),
        Span::styled(
            format!(
                "  TP {}  SL {}  other {}",
                tally.take_profit, tally.stop_loss, tally.other
            ),
            theme::muted(),
        ),
        Span::styled("  [j/k]move [PgUp/PgDn]page [f]ilter", theme::muted()),
    ]));

    if outcome.is_empty() {
        lines.push(Line::from(""));
        let msg = match session.trades_error() {
            Some(err) => Span::styled(format!("Trade log unavailable: {err}"), theme::negative()),
            None if records.is_empty() => Span::styled("No trades loaded.", theme::muted()),
            None => Span::styled("No trades match the filter.", theme::muted()),
        };
        lines.push(Line::from(msg));
        f.render_widget(Paragraph::new(lines), area);
        return;
    }

    lines.push(Line::from(Span::styled(
        format!(
            "  {:<19} {:<10} {:<5} {:<12} {:>12} {:>12} {:>10} {:>12} {:>8} {:>9}",
            "Exit Time", "Symbol", "Side", "Reason", "Entry", "Exit", "Size", "PnL", "PnL %", "Fees"
        ),
        theme::accent_bold(),
    )));

    let rows = session.rows();
    let visible = rows.visible_range();
    for n in visible.clone() {
        let Some(record) = outcome.row(records, n) else {
            continue;
        };
        lines.push(trade_line(record, n == app.trades_cursor));
    }

    let window = rows.window();
    lines.push(Line::from(Span::styled(
        format!(
            "rows {}-{} of {} · window {}..{}",
            visible.start + 1,
            visible.end,
            rows.total(),
            window.start,
            window.end
        ),
        theme::muted(),
    )));

    f.render_widget(Paragraph::new(lines), area);
}

fn trade_line(record: &TradeRecord, is_cursor: bool) -> Line<'static> {
    let view = TradeView::from_record(record);
    let text = |field: Field| record.field(field).unwrap_or("-").to_string();
    let num = |v: f64, kind: MetricKind| format_display(v, kind);

    let row_style = |style: Style| if is_cursor { theme::selected() } else { style };
    let plain = row_style(theme::text());

    Line::from(vec![
        Span::styled(format!("  {:<19} ", truncate(&text(Field::ExitTime), 19)), plain),
        Span::styled(format!("{:<10} ", truncate(&text(Field::Symbol), 10)), plain),
        Span::styled(
            format!("{:<5} ", truncate(&text(Field::Side), 5)),
            row_style(Style::default().fg(theme::side_color(view.side))),
        ),
        Span::styled(
            format!("{:<12} ", truncate(&text(Field::ExitReason), 12)),
            row_style(Style::default().fg(theme::exit_color(view.exit_class))),
        ),
        Span::styled(format!("{:>12} ", num(view.entry_price, MetricKind::Price)), plain),
        Span::styled(format!("{:>12} ", num(view.exit_price, MetricKind::Price)), plain),
        Span::styled(format!("{:>10} ", num(view.size, MetricKind::Price)), plain),
        Span::styled(
            format!("{:>12} ", num(view.pnl_usdt, MetricKind::Currency)),
            row_style(theme::pnl(view.pnl_usdt)),
        ),
        Span::styled(
            format!("{:>8} ", num(view.pnl_percent, MetricKind::Percent)),
            row_style(theme::pnl(view.pnl_percent)),
        ),
        Span::styled(format!("{:>9}", num(view.fees(), MetricKind::Fee)), plain),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trade_line_uses_resolved_fields() {
        let record = TradeRecord::from_pairs([
            ("Exit_Time", "2024-03-01 10:00:00"),
            ("side", "SHORT"),
            ("exit_reason", "SL"),
            ("pnl_usdt", "-1234.5"),
        ]);
        let line = trade_line(&record, false);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(text.contains("2024-03-01 10:00:00"));
        assert!(text.contains("SHORT"));
        assert!(text.contains("-1,234.50"));
        assert_eq!(line.spans[2].style.fg, Some(theme::NEGATIVE));
    }

    #[test]
    fn cursor_row_is_highlighted() {
        let record = TradeRecord::from_pairs([("side", "LONG"), ("pnl_usdt", "5")]);
        let line = trade_line(&record, true);
        assert!(line.spans.iter().all(|s| s.style == theme::selected()));
    }
}
