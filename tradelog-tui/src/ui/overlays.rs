//! Overlay widgets: welcome, filter editor, error history.

use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::app::{AppState, FilterEditor, FilterField};
use crate::theme;
use crate::ui::centered_rect;

/// First-run welcome overlay.
pub fn render_welcome(f: &mut Frame, area: Rect, app: &AppState) {
    let popup = centered_rect(60, 40, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::accent())
        .title(" Backtest Trade Log Viewer ")
        .title_style(theme::accent_bold());

    let text = vec![
        Line::from(""),
        Line::from(Span::styled("Getting started:", theme::accent_bold())),
        Line::from(""),
        Line::from(Span::styled(
            format!("  1. Runs are listed from the {} source", app.source_name),
            theme::muted(),
        )),
        Line::from(Span::styled("  2. Pick one with j/k and press Enter", theme::muted())),
        Line::from(Span::styled(
            "  3. Press f to filter, x to export, 5 for all keys",
            theme::muted(),
        )),
        Line::from(""),
        Line::from(Span::styled("Press any key to dismiss...", theme::neutral())),
    ];

    let para = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    f.render_widget(para, popup);
}

/// Filter editor overlay.
pub fn render_filter(f: &mut Frame, area: Rect, editor: &FilterEditor) {
    let popup = centered_rect(50, 40, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::accent())
        .title(" Filter [Enter]apply [Esc]cancel [d]efaults ")
        .title_style(theme::accent_bold());

    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let draft = &editor.draft;
    let mut lines = vec![Line::from("")];
    for field in FilterField::ALL {
        let focused = field == editor.focus;
        let value = match field {
            FilterField::StartDate => date_input(&editor.start_input, focused),
            FilterField::EndDate => date_input(&editor.end_input, focused),
            FilterField::TakeProfit => checkbox(draft.include_take_profit),
            FilterField::StopLoss => checkbox(draft.include_stop_loss),
            FilterField::Side => draft.side.label().to_string(),
        };
        let (marker, value_style) = if focused {
            ("> ", theme::accent_bold().add_modifier(Modifier::UNDERLINED))
        } else {
            ("  ", theme::text())
        };
        lines.push(Line::from(vec![
            Span::styled(marker, theme::accent()),
            Span::styled(format!("{:>12}: ", field.label()), theme::muted()),
            Span::styled(value, value_style),
        ]));
    }

    f.render_widget(Paragraph::new(lines), inner);
}

fn date_input(input: &str, focused: bool) -> String {
    match (input.is_empty(), focused) {
        (true, false) => "(open)".to_string(),
        (_, true) => format!("{input}_"),
        (false, false) => input.to_string(),
    }
}

fn checkbox(on: bool) -> String {
    if on { "[x]" } else { "[ ]" }.to_string()
}

/// Error history overlay.
pub fn render_error_history(f: &mut Frame, area: Rect, app: &AppState) {
    let popup = centered_rect(80, 70, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::negative())
        .title(format!(
            " Error History ({}) [Esc]close [j/k]scroll ",
            app.error_history.len()
        ))
        .title_style(theme::negative());

    let inner = block.inner(popup);
    f.render_widget(block, popup);

    if app.error_history.is_empty() {
        let text = Paragraph::new(Span::styled("No errors recorded.", theme::muted()));
        f.render_widget(text, inner);
        return;
    }

    let mut lines: Vec<Line> = Vec::new();
    for (i, err) in app
        .error_history
        .iter()
        .enumerate()
        .skip(app.error_scroll)
        .take(inner.height as usize)
    {
        let style = if i == app.error_scroll {
            theme::negative().add_modifier(Modifier::BOLD)
        } else {
            theme::muted()
        };

        lines.push(Line::from(vec![
            Span::styled(format!("[{}] ", err.timestamp.format("%H:%M:%S")), theme::muted()),
            Span::styled(format!("[{}] ", err.category.label()), theme::warning()),
            Span::styled(err.message.as_str(), style),
        ]));

        if !err.context.is_empty() {
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(err.context.as_str(), theme::muted()),
            ]));
        }
    }

    f.render_widget(Paragraph::new(lines), inner);
}
