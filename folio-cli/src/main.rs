//! Terminal frontend: reads a book file (or the built-in sample), keeps
//! state under `~/.folio`, and drives the shared [`App`] from key and mouse
//! events.

mod io;
mod ui;

use std::io::stdout;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use arboard::Clipboard;
use chrono::Local;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use folio_core::state::FONT_SIZE_STEP;
use folio_core::{App, Book, Focus, Mode, StateStore};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::io::FileStore;

const TICK: Duration = Duration::from_millis(50);

fn main() -> Result<()> {
    env_logger::init();

    let book = match std::env::args_os().nth(1) {
        Some(path) => io::load_book(&PathBuf::from(path))?,
        None => io::rewrap(Book::sample()),
    };
    let store = FileStore::default_path()?;
    let mut app = App::new(book, store);

    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run<S: StateStore>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App<S>,
) -> Result<()> {
    let epoch = Instant::now();
    let mut clipboard = Clipboard::new().ok();

    loop {
        let size = terminal.size()?;
        let (narrow, rows) = ui::layout_metrics(size.width, size.height);
        app.set_narrow(narrow);
        app.set_viewport(rows);

        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(TICK)? {
            match event::read()? {
                Event::Key(key) => {
                    if handle_key(app, key, now_ms(epoch), &mut clipboard) {
                        break;
                    }
                }
                Event::Mouse(mouse) => {
                    handle_mouse(app, mouse, size.width, size.height, now_ms(epoch))
                }
                _ => {}
            }
        }
        app.tick(now_ms(epoch));
    }

    app.save_now();
    Ok(())
}

fn now_ms(epoch: Instant) -> u64 {
    epoch.elapsed().as_millis() as u64
}

fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Returns true when the app should quit.
fn handle_key<S: StateStore>(
    app: &mut App<S>,
    key: KeyEvent,
    now: u64,
    clipboard: &mut Option<Clipboard>,
) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    app.clear_status();

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('b') {
        app.toggle_bookmark(&today());
        return false;
    }

    match app.mode {
        Mode::Help => {
            app.toggle_help();
            false
        }
        Mode::ColorPicker => {
            handle_picker_key(app, key);
            false
        }
        Mode::Visual => {
            handle_visual_key(app, key, now, clipboard);
            false
        }
        Mode::Normal => handle_normal_key(app, key, now),
    }
}

fn handle_normal_key<S: StateStore>(app: &mut App<S>, key: KeyEvent, now: u64) -> bool {
    if app.focus == Focus::Sidebar {
        match key.code {
            KeyCode::Char('q') => return true,
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
        return false;
    }

    match key.code {
        KeyCode::Char('q') => return true,
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
            app.toggle_bookmark(&today());
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
    false
}

fn handle_visual_key<S: StateStore>(
    app: &mut App<S>,
    key: KeyEvent,
    now: u64,
    clipboard: &mut Option<Clipboard>,
) {
    match key.code {
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
        KeyCode::Char('c') => copy_selection(app, clipboard),
        _ => {}
    }
}

fn handle_picker_key<S: StateStore>(app: &mut App<S>, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.close_color_picker(),
        KeyCode::Char('j') | KeyCode::Char('l') | KeyCode::Down | KeyCode::Right => {
            app.picker_next()
        }
        KeyCode::Char('k') | KeyCode::Char('h') | KeyCode::Up | KeyCode::Left => {
            app.picker_prev()
        }
        KeyCode::Enter => {
            app.confirm_highlight(&today());
        }
        _ => {}
    }
}

fn handle_mouse<S: StateStore>(
    app: &mut App<S>,
    mouse: MouseEvent,
    width: u16,
    height: u16,
    now: u64,
) {
    match mouse.kind {
        MouseEventKind::ScrollDown => app.scroll_view(3, now),
        MouseEventKind::ScrollUp => app.scroll_view(-3, now),
        MouseEventKind::Down(MouseButton::Left) => {
            // Pressing outside the color popup dismisses it; same for the
            // narrow-layout sidebar overlay.
            if app.mode == Mode::ColorPicker {
                let popup = ui::picker_area(width, height);
                let inside = mouse.column >= popup.x
                    && mouse.column < popup.x + popup.width
                    && mouse.row >= popup.y
                    && mouse.row < popup.y + popup.height;
                if !inside {
                    app.close_color_picker();
                }
            } else if app.narrow && app.sidebar_open && mouse.column >= ui::SIDEBAR_COLS {
                app.toggle_sidebar();
            }
        }
        _ => {}
    }
}

fn copy_selection<S: StateStore>(app: &mut App<S>, clipboard: &mut Option<Clipboard>) {
    let Some(text) = app.selection_text() else {
        return;
    };
    match clipboard {
        Some(cb) => match cb.set_text(text) {
            Ok(()) => {
                app.exit_visual();
                app.set_status("Copied to clipboard");
            }
            Err(err) => {
                log::warn!("clipboard copy failed: {err}");
                app.set_status("Copy failed");
            }
        },
        None => app.set_status("Clipboard unavailable"),
    }
}
