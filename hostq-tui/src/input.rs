//! Keyboard input dispatch: overlays → global keys → view-specific handlers.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use hostq_core::DemoView;

use crate::app::{AppState, Overlay};

/// Handle a key event.
pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return;
    }

    // 1. Overlays consume input first.
    match app.overlay {
        Overlay::Help => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                app.overlay = Overlay::None;
            }
            return;
        }
        Overlay::ErrorHistory => {
            handle_error_overlay(app, key);
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
        KeyCode::Char('1') => { app.active_view = DemoView::Portfolio; return; }
        KeyCode::Char('2') => { app.active_view = DemoView::Scheduling; return; }
        KeyCode::Char('3') => { app.active_view = DemoView::Risk; return; }
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.active_view = app.active_view.prev();
            } else {
                app.active_view = app.active_view.next();
            }
            return;
        }
        KeyCode::BackTab => {
            app.active_view = app.active_view.prev();
            return;
        }
        KeyCode::Char('?') => {
            app.overlay = Overlay::Help;
            return;
        }
        KeyCode::Char('e') => {
            app.overlay = Overlay::ErrorHistory;
            app.error_scroll = 0;
            return;
        }
        _ => {}
    }

    // 3. Keys every view shares: backend selector and run.
    match key.code {
        KeyCode::Char('h') | KeyCode::Left => {
            app.cycle_backend(false);
            return;
        }
        KeyCode::Char('l') | KeyCode::Right | KeyCode::Char('b') => {
            app.cycle_backend(true);
            return;
        }
        KeyCode::Enter | KeyCode::Char('r') => {
            app.trigger_run(Instant::now());
            return;
        }
        _ => {}
    }

    // 4. View-specific keys.
    match app.active_view {
        DemoView::Portfolio => handle_portfolio_key(app, key),
        DemoView::Scheduling => handle_scheduling_key(app, key),
        DemoView::Risk => {} // backend and run only
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

fn handle_portfolio_key(app: &mut AppState, key: KeyEvent) {
    if let KeyCode::Char('s') = key.code {
        app.share_portfolio();
    }
}

fn handle_scheduling_key(app: &mut AppState, key: KeyEvent) {
    let s = &mut app.scheduling;
    match key.code {
        KeyCode::Char('j') | KeyCode::Down | KeyCode::Char('k') | KeyCode::Up => {
            s.slider = s.slider.toggle();
        }
        KeyCode::Char('+') | KeyCode::Char('=') => s.adjust(1),
        KeyCode::Char('-') | KeyCode::Char('_') => s.adjust(-1),
        _ => {}
    }
}
