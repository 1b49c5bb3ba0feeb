//! Rendering for the browser terminal. Mirrors the native frontend so the
//! two stay visually interchangeable.

use folio_core::view::{self, SidebarRow, SpanKind};
use folio_core::{App, Focus, HighlightColor, Mode, StateStore, TextRange, Theme};
use ratzilla::ratatui::layout::{Constraint, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{
    Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph,
};
use ratzilla::ratatui::Frame;

pub const SIDEBAR_COLS: u16 = 34;

/// Rows taken by chrome: title, reader borders, gauge, status.
pub const CHROME_ROWS: u16 = 5;

/// Interface colors, Catppuccin Mocha for dark and Latte for light.
pub struct Palette {
    pub base: Color,
    pub surface: Color,
    pub border: Color,
    pub text: Color,
    pub subtext: Color,
    pub accent: Color,
    pub green: Color,
    pub yellow: Color,
    pub blue: Color,
    pub pink: Color,
}

const MOCHA: Palette = Palette {
    base: Color::Rgb(30, 30, 46),
    surface: Color::Rgb(49, 50, 68),
    border: Color::Rgb(88, 91, 112),
    text: Color::Rgb(205, 214, 244),
    subtext: Color::Rgb(166, 173, 200),
    accent: Color::Rgb(203, 166, 247),
    green: Color::Rgb(166, 227, 161),
    yellow: Color::Rgb(249, 226, 175),
    blue: Color::Rgb(137, 180, 250),
    pink: Color::Rgb(245, 194, 231),
};

const LATTE: Palette = Palette {
    base: Color::Rgb(239, 241, 245),
    surface: Color::Rgb(204, 208, 218),
    border: Color::Rgb(156, 160, 176),
    text: Color::Rgb(76, 79, 105),
    subtext: Color::Rgb(108, 111, 133),
    accent: Color::Rgb(136, 57, 239),
    green: Color::Rgb(64, 160, 43),
    yellow: Color::Rgb(223, 142, 29),
    blue: Color::Rgb(30, 102, 245),
    pink: Color::Rgb(234, 118, 203),
};

impl Palette {
    pub fn for_theme(theme: Theme) -> &'static Palette {
        match theme {
            Theme::Dark => &MOCHA,
            Theme::Light => &LATTE,
        }
    }

    fn marker(&self, color: HighlightColor) -> Color {
        match color {
            HighlightColor::Yellow => self.yellow,
            HighlightColor::Green => self.green,
            HighlightColor::Blue => self.blue,
            HighlightColor::Pink => self.pink,
        }
    }
}

pub fn draw<S: StateStore>(f: &mut Frame, app: &App<S>) {
    let p = Palette::for_theme(app.state.theme);
    let area = f.area();
    f.render_widget(
        Block::default().style(Style::default().bg(p.base).fg(p.text)),
        area,
    );

    let rows = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .split(area);

    draw_title(f, app, p, rows[0]);

    let body = rows[1];
    if app.sidebar_open && !app.narrow {
        let cols =
            Layout::horizontal([Constraint::Length(SIDEBAR_COLS), Constraint::Min(0)]).split(body);
        draw_sidebar(f, app, p, cols[0]);
        draw_reader(f, app, p, cols[1]);
    } else {
        draw_reader(f, app, p, body);
    }

    draw_gauge(f, app, p, rows[2]);
    draw_status(f, app, p, rows[3]);

    if app.narrow && app.sidebar_open {
        let overlay = Rect {
            width: SIDEBAR_COLS.min(body.width),
            ..body
        };
        f.render_widget(Clear, overlay);
        draw_sidebar(f, app, p, overlay);
    }

    match app.mode {
        Mode::ColorPicker => draw_color_picker(f, app, p),
        Mode::Help => draw_help(f, p),
        _ => {}
    }
}

fn split_line(left: Vec<Span<'static>>, right: Vec<Span<'static>>, width: u16) -> Line<'static> {
    let used: usize = left
        .iter()
        .chain(right.iter())
        .map(|s| s.content.chars().count())
        .sum();
    let pad = (width as usize).saturating_sub(used);
    let mut spans = left;
    spans.push(Span::raw(" ".repeat(pad)));
    spans.extend(right);
    Line::from(spans)
}

fn draw_title<S: StateStore>(f: &mut Frame, app: &App<S>, p: &Palette, area: Rect) {
    let left = vec![Span::styled(
        format!(" {} ", app.book.title),
        Style::default().fg(p.accent).add_modifier(Modifier::BOLD),
    )];

    let mut right = Vec::new();
    if app.state.is_bookmarked(&app.state.current_chapter) {
        right.push(Span::styled("● ", Style::default().fg(p.yellow)));
    }
    right.push(Span::styled(
        format!("{} ", view::chapter_label(&app.book, &app.state)),
        Style::default().fg(p.subtext),
    ));

    f.render_widget(Paragraph::new(split_line(left, right, area.width)), area);
}

fn draw_reader<S: StateStore>(f: &mut Frame, app: &App<S>, p: &Palette, area: Rect) {
    let focused = app.focus == Focus::Reader;
    let title = app
        .current_chapter()
        .map(|c| format!(" {} ", c.title))
        .unwrap_or_default();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused { p.accent } else { p.border }))
        .title(title);

    f.render_widget(Paragraph::new(reader_lines(app, p)).block(block), area);
}

fn reader_lines<S: StateStore>(app: &App<S>, p: &Palette) -> Vec<Line<'static>> {
    let highlights = app.current_highlights();
    let selection = match app.mode {
        Mode::Visual | Mode::ColorPicker => app.selection_range(),
        _ => None,
    };

    let mut line_start: usize = (0..app.scroll_row)
        .filter_map(|r| app.cursor.line(r))
        .map(|l| l.chars().count() + 1)
        .sum();

    let end = (app.scroll_row + app.viewport_rows).min(app.cursor.line_count());
    let mut lines = Vec::with_capacity(end.saturating_sub(app.scroll_row));
    for row in app.scroll_row..end {
        let text = app.cursor.line(row).unwrap_or("");
        let cursor_col =
            (app.focus == Focus::Reader && row == app.cursor.row()).then(|| app.cursor.col());
        lines.push(styled_line(
            text, line_start, &highlights, selection, cursor_col, p,
        ));
        line_start += text.chars().count() + 1;
    }
    lines
}

fn run_style(kind: Option<SpanKind>, p: &Palette) -> Style {
    match kind {
        None => Style::default().fg(p.text),
        Some(SpanKind::Selection) => Style::default().fg(p.base).bg(p.accent),
        Some(SpanKind::Highlight(color)) => Style::default().fg(p.base).bg(p.marker(color)),
    }
}

fn styled_line(
    text: &str,
    line_start: usize,
    highlights: &[(TextRange, HighlightColor)],
    selection: Option<TextRange>,
    cursor_col: Option<usize>,
    p: &Palette,
) -> Line<'static> {
    let Some(col) = cursor_col else {
        let runs = view::line_spans(text, line_start, highlights, selection);
        return Line::from(
            runs.into_iter()
                .map(|(run, kind)| Span::styled(run, run_style(kind, p)))
                .collect::<Vec<_>>(),
        );
    };

    let chars: Vec<char> = text.chars().collect();
    let mut spans = Vec::with_capacity(chars.len() + 1);
    for (i, ch) in chars.iter().enumerate() {
        let kind = view::span_kind_at(line_start + i, highlights, selection);
        let mut style = run_style(kind, p);
        if i == col {
            style = style.add_modifier(Modifier::REVERSED);
        }
        spans.push(Span::styled(ch.to_string(), style));
    }
    if col >= chars.len() {
        spans.push(Span::styled(
            " ",
            Style::default().add_modifier(Modifier::REVERSED),
        ));
    }
    Line::from(spans)
}

fn draw_sidebar<S: StateStore>(f: &mut Frame, app: &App<S>, p: &Palette, area: Rect) {
    let focused = app.focus == Focus::Sidebar;
    let rows = view::sidebar_rows(&app.book, &app.state);
    let items: Vec<ListItem> = rows.iter().map(|row| sidebar_item(row, p)).collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused { p.accent } else { p.border }))
        .title(" Library ");
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = ListState::default();
    if focused {
        state.select(Some(app.sidebar_index));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn sidebar_item(row: &SidebarRow, p: &Palette) -> ListItem<'static> {
    let line = match row {
        SidebarRow::Section(title) => Line::from(Span::styled(
            format!(" {title}"),
            Style::default().fg(p.accent).add_modifier(Modifier::BOLD),
        )),
        SidebarRow::Toc {
            title,
            read,
            current,
            ..
        } => {
            let marker = if *read { "✓ " } else { "  " };
            let style = if *current {
                Style::default().fg(p.accent).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(p.text)
            };
            Line::from(vec![
                Span::styled(marker, Style::default().fg(p.green)),
                Span::styled(title.clone(), style),
            ])
        }
        SidebarRow::Bookmark { title, date, .. } => Line::from(vec![
            Span::styled(format!("  {title} "), Style::default().fg(p.text)),
            Span::styled(date.clone(), Style::default().fg(p.subtext)),
        ]),
        SidebarRow::Highlight {
            text, color, date, ..
        } => Line::from(vec![
            Span::styled("  ■ ", Style::default().fg(p.marker(*color))),
            Span::styled(text.clone(), Style::default().fg(p.text)),
            Span::styled(format!(" {date}"), Style::default().fg(p.subtext)),
        ]),
        SidebarRow::Placeholder(text) => Line::from(Span::styled(
            format!("  {text}"),
            Style::default().fg(p.subtext).add_modifier(Modifier::ITALIC),
        )),
    };
    ListItem::new(line)
}

fn draw_gauge<S: StateStore>(f: &mut Frame, app: &App<S>, p: &Palette, area: Rect) {
    let percent = view::reading_percent(&app.book, &app.state);
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(p.green).bg(p.surface))
        .ratio(f64::from(percent) / 100.0)
        .label(Span::styled(
            view::progress_label(percent),
            Style::default().fg(p.text),
        ));
    f.render_widget(gauge, area);
}

fn draw_status<S: StateStore>(f: &mut Frame, app: &App<S>, p: &Palette, area: Rect) {
    let left = if let Some(message) = &app.status {
        vec![Span::styled(
            format!(" {message}"),
            Style::default().fg(p.accent),
        )]
    } else {
        let hints = match (app.mode, app.focus) {
            (Mode::Visual, _) => "VISUAL  move to extend  Enter highlight  c copy  Esc cancel",
            (_, Focus::Sidebar) => "j/k move  Enter open  s close  Tab reader",
            _ => "j/k move  n/p chapter  v select  m bookmark  s library  ? help",
        };
        vec![Span::styled(
            format!(" {hints}"),
            Style::default().fg(p.subtext),
        )]
    };

    let nav = view::nav_buttons(&app.book, &app.state);
    let nav_style = |enabled: bool| {
        if enabled {
            Style::default().fg(p.text)
        } else {
            Style::default().fg(p.border)
        }
    };
    let right = vec![
        Span::styled("‹ prev  ", nav_style(nav.prev_enabled)),
        Span::styled("next ›  ", nav_style(nav.next_enabled)),
        Span::styled(
            format!("{}px ", app.state.font_size),
            Style::default().fg(p.subtext),
        ),
    ];

    f.render_widget(Paragraph::new(split_line(left, right, area.width)), area);
}

fn draw_color_picker<S: StateStore>(f: &mut Frame, app: &App<S>, p: &Palette) {
    let area = centered_rect(26, 8, f.area());
    f.render_widget(Clear, area);

    let items: Vec<ListItem> = HighlightColor::ALL
        .iter()
        .map(|color| {
            ListItem::new(Line::from(vec![
                Span::styled("■ ", Style::default().fg(p.marker(*color))),
                Span::styled(color.label(), Style::default().fg(p.text)),
            ]))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(p.accent))
        .style(Style::default().bg(p.surface))
        .title(" Highlight ")
        .title_bottom(" j/k  Enter  Esc ");
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = ListState::default();
    state.select(Some(app.picker_index));
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_help(f: &mut Frame, p: &Palette) {
    let area = centered_rect(44, 17, f.area());
    f.render_widget(Clear, area);

    let key = Style::default().fg(p.accent);
    let text = Style::default().fg(p.text);
    let lines: Vec<Line> = [
        ("j/k, arrows", "move cursor"),
        ("w/b", "word forward/back"),
        ("d/u", "half page down/up"),
        ("g/G", "chapter top/bottom"),
        ("n/p, ←/→", "next/previous chapter"),
        ("v", "select text"),
        ("Enter", "highlight selection"),
        ("c", "copy selection"),
        ("m, Ctrl+B", "toggle bookmark"),
        ("s", "toggle library"),
        ("Tab", "switch focus"),
        ("+/-", "font size"),
        ("t", "toggle theme"),
        ("?", "this help"),
    ]
    .iter()
    .map(|(keys, what)| {
        Line::from(vec![
            Span::styled(format!(" {keys:<12}"), key),
            Span::styled((*what).to_string(), text),
        ])
    })
    .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(p.accent))
        .style(Style::default().bg(p.surface))
        .title(" Keys ");
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn centered_rect(width: u16, height: u16, r: Rect) -> Rect {
    let width = width.min(r.width);
    let height = height.min(r.height);
    Rect {
        x: r.x + (r.width - width) / 2,
        y: r.y + (r.height - height) / 2,
        width,
        height,
    }
}
