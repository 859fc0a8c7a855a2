//! Keyboard input dispatch: overlays → global keys → panel-specific handlers.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{AppState, FilterEditor, Overlay, Panel};

pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return;
    }

    // 1. Overlays consume input first.
    match &app.overlay {
        Overlay::Welcome => {
            app.overlay = Overlay::None;
            return;
        }
        Overlay::ErrorHistory => {
            handle_error_overlay(app, key);
            return;
        }
        Overlay::Filter(_) => {
            handle_filter_overlay(app, key);
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
        KeyCode::Char('r') => {
            app.request_list();
            return;
        }
        KeyCode::Char('f') => {
            app.overlay = Overlay::Filter(FilterEditor::from_criteria(app.session.criteria()));
            return;
        }
        KeyCode::Char('x') => {
            app.export();
            return;
        }
        KeyCode::Char('e') => {
            app.overlay = Overlay::ErrorHistory;
            app.error_scroll = 0;
            return;
        }
        _ => {}
    }

    // 3. Panel-specific keys.
    match app.active_panel {
        Panel::Runs => handle_runs_key(app, key),
        Panel::Trades => handle_trades_key(app, key),
        Panel::Charts => handle_charts_key(app, key),
        Panel::Summary | Panel::Help => {}
    }
}

fn handle_error_overlay(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('e') => {
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

fn handle_filter_overlay(app: &mut AppState, key: KeyEvent) {
    let Overlay::Filter(editor) = &mut app.overlay else {
        return;
    };

    match key.code {
        KeyCode::Esc => {
            app.overlay = Overlay::None;
        }
        KeyCode::Enter => match editor.commit() {
            Ok(criteria) => {
                app.overlay = Overlay::None;
                app.set_criteria(criteria);
                app.set_status(format!("Filter applied: {} trades", app.view.outcome.len()));
            }
            Err(msg) => app.set_warning(msg),
        },
        KeyCode::Up | KeyCode::BackTab => editor.focus = editor.focus.prev(),
        KeyCode::Down | KeyCode::Tab => editor.focus = editor.focus.next(),
        KeyCode::Backspace => {
            if let Some(input) = editor.focused_input() {
                input.pop();
            }
        }
        KeyCode::Char(c) if editor.focus.is_date() => {
            if c.is_ascii_digit() || c == '-' {
                if let Some(input) = editor.focused_input() {
                    input.push(c);
                }
            }
        }
        KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right => editor.toggle(),
        KeyCode::Char('d') => {
            // Back to the run's own range with everything included.
            *editor = FilterEditor::from_criteria(&app.session.default_criteria());
        }
        _ => {}
    }
}

fn handle_runs_key(app: &mut AppState, key: KeyEvent) {
    let count = app.session.listing().len();

    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if count > 0 && app.runs_cursor + 1 < count {
                app.runs_cursor += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.runs_cursor = app.runs_cursor.saturating_sub(1);
        }
        KeyCode::Char('g') | KeyCode::Home => app.runs_cursor = 0,
        KeyCode::Char('G') | KeyCode::End => app.runs_cursor = count.saturating_sub(1),
        KeyCode::Enter => app.request_selected_report(),
        _ => {}
    }
}

fn handle_trades_key(app: &mut AppState, key: KeyEvent) {
    let total = app.view.outcome.len();
    if total == 0 {
        return;
    }
    let last = total - 1;
    let page = app.session.rows().config().visible_rows().max(1);

    let cursor = match key.code {
        KeyCode::Char('j') | KeyCode::Down => (app.trades_cursor + 1).min(last),
        KeyCode::Char('k') | KeyCode::Up => app.trades_cursor.saturating_sub(1),
        KeyCode::PageDown | KeyCode::Char(' ') => (app.trades_cursor + page).min(last),
        KeyCode::PageUp => app.trades_cursor.saturating_sub(page),
        KeyCode::Char('g') | KeyCode::Home => 0,
        KeyCode::Char('G') | KeyCode::End => last,
        _ => return,
    };
    app.trades_cursor = cursor;
    app.session.rows_mut().scroll_to_row(cursor);
}

fn handle_charts_key(app: &mut AppState, key: KeyEvent) {
    if let KeyCode::Char('m') | KeyCode::Char(' ') | KeyCode::Right = key.code {
        app.chart_mode = app.chart_mode.next();
    }
}
