use chrono::Local;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Borders, List, ListItem, Paragraph},
};
use unicode_width::UnicodeWidthStr;

use crate::app::App;
use crate::config::APP_NAME;
use crate::models::{CompletionFilter, InputMode, LoginField, LoginMode};

pub mod components;
pub mod popups;
pub mod theme;

use components::{centered_fixed, search_regex, todo_lines};
use popups::{
    fmt_keys, render_delete_popup, render_details_popup, render_form_popup, render_help_popup,
    render_text_field,
};
use theme::ThemeTokens;

const LOGIN_WIDTH: u16 = 60;

pub fn ui(f: &mut Frame, app: &mut App) {
    let tokens = ThemeTokens::from_theme(&app.config.theme);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(f.area());
    let (main_area, status_area) = (chunks[0], chunks[1]);

    if app.input_mode == InputMode::Login {
        render_login(f, main_area, app, &tokens);
    } else {
        render_main(f, main_area, app, &tokens);
    }
    render_status_bar(f, status_area, app, &tokens);

    if app.input_mode == InputMode::Form {
        render_form_popup(f, app, &tokens);
    }
    if app.show_details_popup {
        render_details_popup(f, app, &tokens, Local::now().naive_local());
    }
    if app.delete_target.is_some() {
        render_delete_popup(f, app, &tokens);
    }
    if app.show_help_popup {
        render_help_popup(f, app, &tokens);
    }
}

fn render_login(f: &mut Frame, area: Rect, app: &mut App, tokens: &ThemeTokens) {
    let fields = LoginField::order(app.login.mode);
    let height = 9 + 3 * fields.len() as u16;
    let area = centered_fixed(LOGIN_WIDTH, height, area);

    let subtitle = match app.login.mode {
        LoginMode::SignIn => "Sign In",
        LoginMode::Register => "Create Account",
    };
    let block = Block::default()
        .title(format!(" {APP_NAME} · {subtitle} "))
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(tokens.border_active));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut constraints = vec![Constraint::Length(1)];
    constraints.extend(fields.iter().map(|_| Constraint::Length(3)));
    constraints.extend([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(1),
    ]);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .margin(1)
        .split(inner);

    f.render_widget(
        Paragraph::new(format!("Server: {}", app.config.api.base_url))
            .style(Style::default().fg(tokens.muted)),
        rows[0],
    );

    let focus = app.login.focus;
    for (idx, field) in fields.iter().copied().enumerate() {
        render_text_field(
            f,
            rows[idx + 1],
            app.login.input_mut(field),
            field.label(),
            field == focus,
            tokens,
        );
    }

    let after_fields = fields.len() + 1;
    if let Some(error) = app.login.error.as_deref() {
        f.render_widget(
            Paragraph::new(error).style(Style::default().fg(tokens.error)),
            rows[after_fields],
        );
    }

    let kb = &app.config.keybindings.login;
    let switch_label = match app.login.mode {
        LoginMode::SignIn => "create an account",
        LoginMode::Register => "sign in instead",
    };
    let hints = vec![
        Line::from(format!(
            "{}: submit  {}: next field  {}: {switch_label}",
            fmt_keys(&kb.submit),
            fmt_keys(&kb.next_field),
            fmt_keys(&kb.switch_mode),
        )),
        Line::from(format!("{}: quit", fmt_keys(&kb.quit))),
    ];
    f.render_widget(
        Paragraph::new(Text::from(hints)).style(Style::default().fg(tokens.muted)),
        rows[after_fields + 2],
    );
}

fn render_main(f: &mut Frame, area: Rect, app: &mut App, tokens: &ThemeTokens) {
    let searching = app.input_mode == InputMode::Search;

    let mut constraints = vec![Constraint::Length(1), Constraint::Length(1)];
    if searching {
        constraints.push(Constraint::Length(3));
    }
    if app.todos.error().is_some() {
        constraints.push(Constraint::Length(1));
    }
    constraints.push(Constraint::Min(1));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let mut next = 0;
    let mut take_row = || {
        let row = rows[next];
        next += 1;
        row
    };

    f.render_widget(Paragraph::new(header_line(app, tokens)), take_row());
    f.render_widget(Paragraph::new(filter_line(app, tokens)), take_row());

    if searching {
        let search_area = take_row();
        let input_block = Block::default()
            .title(" Search ")
            .borders(Borders::ALL)
            .border_type(BorderType::Plain)
            .border_style(Style::default().fg(tokens.border_search));
        app.search_input.set_block(input_block);
        app.search_input.set_cursor_line_style(Style::default());
        app.search_input
            .set_cursor_style(Style::default().add_modifier(Modifier::REVERSED));
        f.render_widget(&app.search_input, search_area);
    }

    if let Some(error) = app.todos.error() {
        let hint = fmt_keys(&app.config.keybindings.list.clear_filters);
        f.render_widget(
            Paragraph::new(format!("⚠ {error} ({hint}: dismiss)")).style(
                Style::default()
                    .fg(tokens.error)
                    .add_modifier(Modifier::BOLD),
            ),
            take_row(),
        );
    }

    render_list(f, take_row(), app, tokens);
}

fn header_line(app: &App, tokens: &ThemeTokens) -> Line<'static> {
    let stats = app.todos.stats();
    let mut spans = vec![Span::styled(
        format!(" {APP_NAME} "),
        Style::default()
            .fg(tokens.border_active)
            .add_modifier(Modifier::BOLD),
    )];
    if let Some(user) = app.session.user() {
        spans.push(Span::styled(
            format!(" {} ", user.username),
            Style::default().fg(tokens.muted),
        ));
    }
    spans.push(Span::raw("  "));
    spans.push(Span::raw(format!("Total {}", stats.total)));
    spans.push(Span::styled(
        format!("  Active {}", stats.active),
        Style::default().fg(tokens.open),
    ));
    spans.push(Span::styled(
        format!("  Completed {}", stats.completed),
        Style::default().fg(tokens.done),
    ));
    Line::from(spans)
}

fn filter_line(app: &App, tokens: &ThemeTokens) -> Line<'static> {
    let filter = &app.todos.filter;
    let active = Style::default()
        .fg(tokens.border_active)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
    let inactive = Style::default().fg(tokens.muted);

    let mut spans = vec![Span::raw(" ")];
    for completion in [
        CompletionFilter::All,
        CompletionFilter::Active,
        CompletionFilter::Completed,
    ] {
        let style = if completion == filter.completion {
            active
        } else {
            inactive
        };
        spans.push(Span::styled(completion.label(), style));
        spans.push(Span::raw(" "));
    }

    let priority = filter
        .priority
        .map_or("All Priorities".to_string(), |p| format!("{} Priority", p.label()));
    let category = filter
        .category
        .map_or("All Categories".to_string(), |c| format!("{} {}", c.icon(), c.label()));
    spans.push(Span::styled("│ ", inactive));
    spans.push(Span::raw(priority));
    spans.push(Span::styled(" │ ", inactive));
    spans.push(Span::raw(category));
    spans.push(Span::styled(" │ ", inactive));
    spans.push(Span::raw(format!("Sort by {}", filter.sort.label())));

    let query = filter.query.trim();
    if !query.is_empty() && app.input_mode != InputMode::Search {
        spans.push(Span::styled(" │ ", inactive));
        spans.push(Span::styled(
            format!("\"{query}\""),
            Style::default().fg(tokens.border_search),
        ));
    }
    Line::from(spans)
}

fn render_list(f: &mut Frame, area: Rect, app: &mut App, tokens: &ThemeTokens) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(tokens.border_default));
    let inner = block.inner(area);

    let now = Local::now().naive_local();
    let regex = search_regex(&app.todos.filter.query);
    let width = inner.width.saturating_sub(2).max(1) as usize;
    let muted = Style::default().fg(tokens.muted);

    let items: Vec<ListItem> = app
        .todos
        .derive_view()
        .into_iter()
        .map(|todo| {
            let mut lines = todo_lines(todo, width, regex.as_ref(), now, tokens);
            if app.todos.is_busy(&todo.id)
                && let Some(first) = lines.first_mut()
            {
                first.spans.push(Span::styled("  working...", muted));
            }
            lines.push(Line::from(""));
            ListItem::new(Text::from(lines))
        })
        .collect();

    if items.is_empty() {
        f.render_widget(block, area);
        render_empty_state(f, inner, app, tokens);
        return;
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(tokens.highlight_bg))
        .highlight_symbol("▌ ");
    f.render_stateful_widget(list, area, &mut app.list_state);
}

fn render_empty_state(f: &mut Frame, area: Rect, app: &App, tokens: &ThemeTokens) {
    let kb = &app.config.keybindings;
    let muted = Style::default().fg(tokens.muted);
    let lines = if app.todos.is_loading() {
        vec![Line::from(Span::styled("Loading todos...", muted))]
    } else if app.todos.has_active_filters() {
        vec![
            Line::from(Span::styled(
                "No todos found",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled("Try adjusting your filters or search.", muted)),
            Line::from(""),
            Line::from(Span::styled(
                format!("Clear All Filters ({})", fmt_keys(&kb.list.clear_filters)),
                Style::default().fg(tokens.border_active),
            )),
        ]
    } else {
        vec![
            Line::from(Span::styled(
                "No todos found",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!("Press {} to create your first todo.", fmt_keys(&kb.list.new)),
                muted,
            )),
        ]
    };

    let height = (lines.len() as u16).min(area.height);
    let top = area.y + area.height.saturating_sub(height) / 2;
    let centered = Rect {
        y: top,
        height,
        ..area
    };
    f.render_widget(
        Paragraph::new(Text::from(lines)).alignment(Alignment::Center),
        centered,
    );
}

fn spinner() -> &'static str {
    const FRAMES: [&str; 4] = ["-", "\\", "|", "/"];
    let idx = (Local::now().timestamp_subsec_millis() / 250) as usize % FRAMES.len();
    FRAMES[idx]
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App, tokens: &ThemeTokens) {
    if area.height == 0 || area.width == 0 {
        return;
    }

    let mode_label = match app.input_mode {
        InputMode::Login => "LOGIN",
        InputMode::Navigate => "NAV",
        InputMode::Search => "SEARCH",
        InputMode::Form => "FORM",
    };

    let mut left_spans = vec![Span::styled(
        format!(" {mode_label} "),
        Style::default()
            .fg(tokens.border_active)
            .add_modifier(Modifier::BOLD),
    )];
    if let Some(pending) = app.pending_label() {
        left_spans.push(Span::raw(" "));
        left_spans.push(Span::styled(
            format!("{} {pending}", spinner()),
            Style::default().fg(tokens.muted),
        ));
    } else if app.input_mode != InputMode::Login {
        left_spans.push(Span::styled(
            format!(" {}: help", fmt_keys(&app.config.keybindings.global.help)),
            Style::default().fg(tokens.muted),
        ));
    }

    let status_message = if let Some(notice) = app.session_notice.as_deref() {
        Some((notice, tokens.error))
    } else {
        app.toast_message
            .as_deref()
            .filter(|toast| !toast.is_empty())
            .map(|toast| (toast, tokens.border_active))
    };

    let Some((message, color)) = status_message else {
        f.render_widget(Paragraph::new(Line::from(left_spans)), area);
        return;
    };

    let min_left_width = 10u16;
    let right_width =
        (UnicodeWidthStr::width(message) as u16).min(area.width.saturating_sub(min_left_width));

    let status_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(right_width)])
        .split(area);

    f.render_widget(Paragraph::new(Line::from(left_spans)), status_chunks[0]);
    let right = Paragraph::new(Span::styled(
        message.to_string(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Right);
    f.render_widget(right, status_chunks[1]);
}
