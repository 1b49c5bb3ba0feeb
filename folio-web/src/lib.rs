//! Browser frontend: the sample book rendered into a terminal grid on the
//! page, with state persisted in localStorage.

mod io;
mod ui;

use std::cell::RefCell;
use std::rc::Rc;

use folio_core::state::FONT_SIZE_STEP;
use folio_core::{App, Book, Focus, Mode, StateStore};
use ratzilla::event::{KeyCode, KeyEvent};
use ratzilla::ratatui::Terminal;
use ratzilla::{DomBackend, WebRenderer};
use wasm_bindgen::prelude::*;

use crate::io::WebStore;

/// Windows narrower than this get the overlay sidebar.
const NARROW_PX: u16 = 1024;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    io::init_logging();

    let mut app = App::new(Book::sample(), WebStore);
    app.set_narrow(io::viewport_width() < NARROW_PX);
    io::apply_font_size(app.state.font_size);
    io::apply_theme(app.state.theme);
    let app = Rc::new(RefCell::new(app));

    let backend = DomBackend::new().map_err(|e| JsValue::from_str(&e.to_string()))?;
    let mut terminal = Terminal::new(backend).map_err(|e| JsValue::from_str(&e.to_string()))?;

    let key_app = app.clone();
    terminal.on_key_event(move |event| {
        handle_key(&mut key_app.borrow_mut(), event);
    });

    terminal.draw_web(move |f| {
        let mut app = app.borrow_mut();
        app.set_narrow(io::viewport_width() < NARROW_PX);
        app.set_viewport(f.area().height.saturating_sub(ui::CHROME_ROWS) as usize);
        app.tick(io::now_ms());
        ui::draw(f, &app);
    });

    Ok(())
}

fn handle_key<S: StateStore>(app: &mut App<S>, event: KeyEvent) {
    app.clear_status();
    let now = io::now_ms();

    if event.ctrl {
        if let KeyCode::Char('b') = event.code {
            app.toggle_bookmark(&io::today());
        }
        return;
    }

    match app.mode {
        Mode::Help => app.toggle_help(),
        Mode::ColorPicker => handle_picker_key(app, event),
        Mode::Visual => handle_visual_key(app, event, now),
        Mode::Normal => handle_normal_key(app, event, now),
    }

    io::apply_font_size(app.state.font_size);
    io::apply_theme(app.state.theme);
}

fn handle_normal_key<S: StateStore>(app: &mut App<S>, event: KeyEvent, now: u64) {
    if app.focus == Focus::Sidebar {
        match event.code {
            KeyCode::Char('j') | KeyCode::Down => app.sidebar_down(),
            KeyCode::Char('k') | KeyCode::Up => app.sidebar_up(),
            KeyCode::Enter => {
                app.activate_sidebar_row();
            }
            KeyCode::Char('s') | KeyCode::Esc => app.toggle_sidebar(),
            KeyCode::Tab => app.cycle_focus(),
            KeyCode::Char('?') => app.toggle_help(),
            _ => {}
        }
        return;
    }

    match event.code {
        KeyCode::Char('j') | KeyCode::Down => app.cursor_down(now),
        KeyCode::Char('k') | KeyCode::Up => app.cursor_up(now),
        KeyCode::Char('h') => app.cursor_left(),
        KeyCode::Char('l') => app.cursor_right(),
        KeyCode::Char('w') => app.cursor_word_forward(now),
        KeyCode::Char('b') => app.cursor_word_back(now),
        KeyCode::Char('0') => app.cursor_line_start(),
        KeyCode::Char('$') => app.cursor_line_end(),
        KeyCode::Char('d') => app.half_page_down(now),
        KeyCode::Char('u') => app.half_page_up(now),
        KeyCode::Char('g') => app.cursor_top(now),
        KeyCode::Char('G') => app.cursor_bottom(now),
        KeyCode::PageDown => app.scroll_view(app.viewport_rows as isize, now),
        KeyCode::PageUp => app.scroll_view(-(app.viewport_rows as isize), now),
        KeyCode::Char('n') | KeyCode::Right => {
            app.next_chapter();
        }
        KeyCode::Char('p') | KeyCode::Left => {
            app.prev_chapter();
        }
        KeyCode::Char('v') => {
            app.enter_visual();
        }
        KeyCode::Char('m') => {
            app.toggle_bookmark(&io::today());
        }
        KeyCode::Char('s') => app.toggle_sidebar(),
        KeyCode::Esc => {
            if app.sidebar_open {
                app.toggle_sidebar();
            }
        }
        KeyCode::Tab => app.cycle_focus(),
        KeyCode::Char('t') => app.toggle_theme(),
        KeyCode::Char('+') | KeyCode::Char('=') => {
            app.adjust_font_size(FONT_SIZE_STEP);
        }
        KeyCode::Char('-') | KeyCode::Char('_') => {
            app.adjust_font_size(-FONT_SIZE_STEP);
        }
        KeyCode::Char('?') => app.toggle_help(),
        _ => {}
    }
}

fn handle_visual_key<S: StateStore>(app: &mut App<S>, event: KeyEvent, now: u64) {
    match event.code {
        KeyCode::Esc | KeyCode::Char('v') => app.exit_visual(),
        KeyCode::Char('j') | KeyCode::Down => app.cursor_down(now),
        KeyCode::Char('k') | KeyCode::Up => app.cursor_up(now),
        KeyCode::Char('h') | KeyCode::Left => app.cursor_left(),
        KeyCode::Char('l') | KeyCode::Right => app.cursor_right(),
        KeyCode::Char('w') => app.cursor_word_forward(now),
        KeyCode::Char('b') => app.cursor_word_back(now),
        KeyCode::Char('0') => app.cursor_line_start(),
        KeyCode::Char('$') => app.cursor_line_end(),
        KeyCode::Char('g') => app.cursor_top(now),
        KeyCode::Char('G') => app.cursor_bottom(now),
        KeyCode::Enter => {
            app.open_color_picker();
        }
        KeyCode::Char('c') => {
            if let Some(text) = app.selection_text() {
                io::clipboard_write(&text);
                app.exit_visual();
                app.set_status("Copied to clipboard");
            }
        }
        _ => {}
    }
}

fn handle_picker_key<S: StateStore>(app: &mut App<S>, event: KeyEvent) {
    match event.code {
        KeyCode::Esc => app.close_color_picker(),
        KeyCode::Char('j') | KeyCode::Char('l') | KeyCode::Down | KeyCode::Right => {
            app.picker_next()
        }
        KeyCode::Char('k') | KeyCode::Char('h') | KeyCode::Up | KeyCode::Left => {
            app.picker_prev()
        }
        KeyCode::Enter => {
            app.confirm_highlight(&io::today());
        }
        _ => {}
    }
}
