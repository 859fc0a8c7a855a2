//! Charts panel: daily PnL lines, trades-per-day bars and the exit
//! distribution.

use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Bar, BarChart, BarGroup, Chart, Dataset, GraphType, Paragraph};
use ratatui::Frame;

use tradelog_core::{format_display, DailyPoint, DistributionSlice, MetricKind};

use crate::app::{AppState, ChartMode};
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let mode = app.chart_mode;
    let header = Line::from(vec![
        Span::styled(mode.label(), theme::accent_bold()),
        Span::styled("  [m]ode", theme::muted()),
    ]);
    f.render_widget(Paragraph::new(header), Rect { height: 1, ..area });
    let body = Rect {
        y: area.y + 1,
        height: area.height.saturating_sub(1),
        ..area
    };

    let daily = &app.view.daily;
    match mode {
        ChartMode::Distribution => render_distribution(f, body, &app.view.distribution),
        _ if daily.is_empty() => render_empty(f, body),
        ChartMode::CumulativePnl => {
            let series = series(daily, |p| p.cumulative_pnl);
            render_line(f, body, &series, daily, "Cumulative PnL (USDT)")
        }
        ChartMode::DailyPnl => {
            let series = series(daily, |p| p.pnl_usd);
            render_line(f, body, &series, daily, "Daily PnL (USDT)")
        }
        ChartMode::DailyTrades => render_trades(f, body, daily),
    }
}

fn render_empty(f: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "No daily results for this run. The server detail has none, or it failed to load.",
            theme::muted(),
        )),
        Line::from(Span::styled(
            "The exit distribution (press m) works from the trade log alone.",
            theme::muted(),
        )),
    ];
    f.render_widget(Paragraph::new(lines), area);
}

fn series(daily: &[DailyPoint], value: impl Fn(&DailyPoint) -> f64) -> Vec<(f64, f64)> {
    daily
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, value(p)))
        .collect()
}

/// Y bounds padded by 5% and always containing zero.
fn y_bounds(data: &[(f64, f64)]) -> [f64; 2] {
    let (lo, hi) = data
        .iter()
        .fold((0.0f64, 0.0f64), |(lo, hi), &(_, y)| (lo.min(y), hi.max(y)));
    let pad = ((hi - lo).abs() * 0.05).max(1.0);
    [lo - pad, hi + pad]
}

fn render_line(f: &mut Frame, area: Rect, data: &[(f64, f64)], daily: &[DailyPoint], title: &str) {
    let [y_min, y_max] = y_bounds(data);
    let x_max = data.len().saturating_sub(1) as f64;
    let last = data.last().map_or(0.0, |&(_, y)| y);

    let dataset = Dataset::default()
        .name(title)
        .marker(symbols::Marker::Braille)
        .style(Style::default().fg(theme::pnl_color(last)))
        .graph_type(GraphType::Line)
        .data(data);

    let first_day = daily.first().map_or("", |p| p.date.as_str());
    let last_day = daily.last().map_or("", |p| p.date.as_str());

    let chart = Chart::new(vec![dataset])
        .x_axis(
            Axis::default()
                .style(theme::muted())
                .bounds([0.0, x_max.max(1.0)])
                .labels(vec![
                    Span::styled(first_day.to_string(), theme::muted()),
                    Span::styled(last_day.to_string(), theme::muted()),
                ]),
        )
        .y_axis(
            Axis::default()
                .title(Span::styled("USDT", theme::muted()))
                .style(theme::muted())
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::styled(format_display(y_min, MetricKind::Currency), theme::muted()),
                    Span::styled(format_display(y_max, MetricKind::Currency), theme::muted()),
                ]),
        );

    f.render_widget(chart, area);
}

fn render_trades(f: &mut Frame, area: Rect, daily: &[DailyPoint]) {
    // Keep the most recent days that fit at 3 columns + 1 gap per bar.
    let fit = (area.width as usize / 4).max(1);
    let skip = daily.len().saturating_sub(fit);

    let bars: Vec<Bar> = daily
        .iter()
        .skip(skip)
        .map(|p| {
            Bar::default()
                .value(p.trades)
                .label(Line::from(day_label(&p.date)))
                .style(theme::accent())
        })
        .collect();

    let chart = BarChart::default()
        .data(BarGroup::default().bars(&bars))
        .bar_width(3)
        .bar_gap(1)
        .value_style(theme::accent_bold());

    f.render_widget(chart, area);
}

/// `2024-01-15` → `15`, anything else is kept short.
fn day_label(date: &str) -> String {
    match date.get(8..10) {
        Some(day) if date.len() >= 10 => day.to_string(),
        _ => date.chars().take(3).collect(),
    }
}

fn render_distribution(f: &mut Frame, area: Rect, slices: &[DistributionSlice; 3]) {
    let bars: Vec<Bar> = slices
        .iter()
        .map(|s| {
            Bar::default()
                .value(s.count as u64)
                .label(Line::from(s.class.label()))
                .text_value(format!(
                    "{} ({}%)",
                    s.count,
                    format_display(s.percent, MetricKind::Percent)
                ))
                .style(Style::default().fg(theme::exit_color(s.class)))
        })
        .collect();

    let width = (area.width / 3).saturating_sub(2).clamp(5, 24);
    let chart = BarChart::default()
        .data(BarGroup::default().bars(&bars))
        .bar_width(width)
        .bar_gap(2)
        .value_style(theme::text());

    f.render_widget(chart, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_include_zero_and_pad() {
        let [lo, hi] = y_bounds(&[(0.0, 10.0), (1.0, 110.0)]);
        assert!(lo < 0.0);
        assert!(hi > 110.0);
        let [lo, hi] = y_bounds(&[]);
        assert_eq!([lo, hi], [-1.0, 1.0]);
    }

    #[test]
    fn day_labels() {
        assert_eq!(day_label("2024-01-15"), "15");
        assert_eq!(day_label("2024-01-15T00:00:00"), "15");
        assert_eq!(day_label("d1"), "d1");
    }

    #[test]
    fn series_indexes_days() {
        let daily = vec![
            DailyPoint {
                date: "2024-01-01".into(),
                cumulative_pnl: 5.0,
                ..Default::default()
            },
            DailyPoint {
                date: "2024-01-02".into(),
                cumulative_pnl: 7.5,
                ..Default::default()
            },
        ];
        assert_eq!(series(&daily, |p| p.cumulative_pnl), vec![(0.0, 5.0), (1.0, 7.5)]);
    }
}
