//! Drawing of the header, the window body and the footer.

use ratatui::{
    Frame,
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::{
    i18n::Translator,
    layout,
    screens,
    theme::Palette,
    view::{Dialog, Item, LogView, MainView, Menu, Pane, Region, View},
};

use super::App;

/// Draw the whole screen. An open modal is drawn over its caller.
pub fn draw(f: &mut Frame, app: &App) {
    let p = app.scheme.palette();
    let frame = layout::create_frame_layout(f.area(), app.opts.debug);

    f.render_widget(Block::default().style(p.body), f.area());

    let header = Paragraph::new(screens::header_text(&app.tr, &app.session, &app.keyboard))
        .style(p.header);
    f.render_widget(header, frame.header);

    match &app.modal {
        Some(slot) => {
            draw_view(f, frame.body, &slot.caller, &app.tr, &p);
            draw_view(f, frame.body, &app.view, &app.tr, &p);
        }
        None => draw_view(f, frame.body, &app.view, &app.tr, &p),
    }

    draw_footer(f, frame.footer, app, &p);
}

fn draw_view(f: &mut Frame, area: Rect, view: &View, tr: &Translator, p: &Palette) {
    match view {
        View::Main(m) => draw_main(f, area, m, tr, p),
        View::MainMenu(menu) => draw_menu(f, area, menu, tr, p),
        View::Logs(l) => draw_logs(f, area, l, p),
        View::Terminal(cmd) => {
            let text = Paragraph::new(format!("$ {cmd}")).style(p.body);
            f.render_widget(text, area);
        }
        // The confirmation message is drawn on top.
        View::Power(_) => {}
        View::Login(d)
        | View::Message(d)
        | View::Input(d)
        | View::Timesyncd(d)
        | View::Repo(d)
        | View::Keyboard(d)
        | View::Password { dialog: d, .. } => draw_dialog(f, area, d, p),
    }
}

/// Status screen: facts on top, notes below.
fn draw_main(f: &mut Frame, area: Rect, m: &MainView, tr: &Translator, p: &Palette) {
    let (top, bottom) = layout::create_main_panes(area);
    let border = |pane| if m.focus == pane { p.focus } else { p.border };

    let status = Paragraph::new(m.status.join("\n"))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border(Pane::Top))
                .title(format!(" {} ", tr.t("System"))),
        )
        .style(p.body);
    f.render_widget(status, top);

    let tips = Paragraph::new(m.tips.join("\n"))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border(Pane::Bottom))
                .title(format!(" {} ", tr.t("Notes"))),
        )
        .style(p.body)
        .wrap(Wrap { trim: true });
    f.render_widget(tips, bottom);
}

/// Numbered entries on the left, description of the focused one on the right.
fn draw_menu(f: &mut Frame, area: Rect, menu: &Menu, tr: &Translator, p: &Palette) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let items: Vec<ListItem> = menu
        .items
        .iter()
        .map(|item| {
            let style = if item.enabled { p.body } else { p.dimmed };
            ListItem::new(format!("{:>2}  {}", item.action.ordinal(), item.label)).style(style)
        })
        .collect();
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(p.border)
                .title(format!(" {} ", tr.t("Main menu"))),
        )
        .highlight_style(p.focus);
    let mut state = ListState::default();
    state.select(Some(menu.focus));
    f.render_stateful_widget(list, cols[0], &mut state);

    if let Some(item) = menu.items.get(menu.focus) {
        let desc = Paragraph::new(item.body.clone())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(p.border)
                    .title(format!(" {} ", item.title)),
            )
            .style(p.body)
            .wrap(Wrap { trim: true });
        f.render_widget(desc, cols[1]);
    }
}

/// Journal lines, newest at the bottom, scrolled up by `scroll`.
fn draw_logs(f: &mut Frame, area: Rect, l: &LogView, p: &Palette) {
    let height = area.height.saturating_sub(2) as usize;
    let (start, end) = visible_range(l.lines.len(), height, l.scroll);
    let text: Vec<Line> = l.lines[start..end]
        .iter()
        .map(|s| Line::from(s.as_str()))
        .collect();
    let widget = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(p.border)
                .title(format!(" {} ", l.title)),
        )
        .style(p.body);
    f.render_widget(widget, area);
}

/// Slice of `total` lines that fits `height` rows, `scroll` lines above the
/// bottom.
fn visible_range(total: usize, height: usize, scroll: usize) -> (usize, usize) {
    let end = total.saturating_sub(scroll);
    (end.saturating_sub(height), end)
}

/// Dialog as a centered popup: body lines above a row of buttons.
fn draw_dialog(f: &mut Frame, area: Rect, d: &Dialog, p: &Palette) {
    let inner_width = d.width.saturating_sub(4).max(10);
    let body = dialog_body(d, p, inner_width as usize);
    let height = body.len() as u16 + 5;
    let popup = layout::centered_popup(area, d.width, height);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(p.border)
        .title(format!(" {} ", d.title))
        .style(p.body);
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .horizontal_margin(1)
        .split(inner);
    f.render_widget(Paragraph::new(body).wrap(Wrap { trim: false }), rows[0]);
    f.render_widget(
        Paragraph::new(dialog_buttons(d, p)).alignment(Alignment::Center),
        rows[1],
    );
}

fn dialog_body(d: &Dialog, p: &Palette, width: usize) -> Vec<Line<'static>> {
    d.body
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let focused = d.is_focused(Region::Body, i);
            let style = if focused { p.focus } else { p.body };
            match item {
                Item::Text(s) => Line::from(s.clone()),
                Item::Divider => Line::from("─".repeat(width)),
                Item::Edit(_, field) => {
                    let caption = if field.caption.is_empty() {
                        String::new()
                    } else {
                        format!("{}: ", field.caption)
                    };
                    let room = width.saturating_sub(caption.chars().count()).max(1);
                    Line::from(vec![
                        Span::raw(caption),
                        Span::styled(field.display(focused, room), style),
                    ])
                }
                Item::Radio(r) => {
                    let mark = if r.checked { "(X)" } else { "( )" };
                    Line::styled(format!("{mark} {}", r.label), style)
                }
                Item::Button(_, label) => Line::styled(format!("< {label} >"), style),
            }
        })
        .collect()
}

fn dialog_buttons(d: &Dialog, p: &Palette) -> Line<'static> {
    let mut spans = Vec::new();
    for (i, item) in d.footer.iter().enumerate() {
        if let Item::Button(_, label) = item {
            if !spans.is_empty() {
                spans.push(Span::raw("   "));
            }
            let style = if d.is_focused(Region::Footer, i) {
                p.focus
            } else {
                p.body
            };
            spans.push(Span::styled(format!("< {label} >"), style));
        }
    }
    Line::from(spans)
}

fn draw_footer(f: &mut Frame, area: Rect, app: &App, p: &Palette) {
    let hints = screens::hints(&app.tr, app.window(), app.session.authenticated);
    let session = if app.session.authenticated {
        app.tr.t("Logged in")
    } else {
        app.tr.t("Not logged in")
    };
    let mut status = vec![Span::raw(format!(
        "{}  {}  {}",
        app.footer.clock, app.footer.load, session
    ))];
    if let Some(err) = &app.footer.error {
        status.push(Span::styled(format!("  {err}"), p.alert));
    }
    let mut lines = vec![Line::from(hints), Line::from(status)];
    if app.opts.debug {
        lines.push(Line::from(app.footer.debug.clone()));
    }
    f.render_widget(Paragraph::new(lines).style(p.footer), area);
}
