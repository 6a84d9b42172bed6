use crate::models::{Category, Priority, Todo};
use crate::ui::theme::ThemeTokens;
use chrono::NaiveDateTime;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
};
use regex::Regex;
use unicode_width::UnicodeWidthStr;

/// Description preview is cut after this many wrapped rows.
const DESCRIPTION_PREVIEW_ROWS: usize = 2;
const DUE_FORMAT: &str = "%b %-d, %Y %H:%M";

/// Helper function to calculate centered popup position
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Fixed-size box centered in `area`, shrunk to fit.
pub fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Case-insensitive literal matcher for the search box; `None` for a blank query.
pub fn search_regex(query: &str) -> Option<Regex> {
    if query.trim().is_empty() {
        return None;
    }
    Regex::new(&format!("(?i){}", regex::escape(query))).ok()
}

pub fn highlight_matches(
    text: &str,
    base_style: Style,
    match_style: Style,
    regex: Option<&Regex>,
) -> Vec<Span<'static>> {
    let Some(regex) = regex else {
        return vec![Span::styled(text.to_string(), base_style)];
    };

    let mut spans = Vec::new();
    let mut last = 0;
    for mat in regex.find_iter(text) {
        if mat.start() > last {
            spans.push(Span::styled(text[last..mat.start()].to_string(), base_style));
        }
        spans.push(Span::styled(
            mat.as_str().to_string(),
            base_style.patch(match_style),
        ));
        last = mat.end();
    }
    if last < text.len() {
        spans.push(Span::styled(text[last..].to_string(), base_style));
    }
    if spans.is_empty() {
        spans.push(Span::styled(text.to_string(), base_style));
    }
    spans
}

pub fn priority_badge(priority: Priority, tokens: &ThemeTokens) -> Span<'static> {
    Span::styled(
        format!("[{}]", priority.label()),
        Style::default()
            .fg(tokens.priority(priority))
            .add_modifier(Modifier::BOLD),
    )
}

pub fn category_badge(category: Category, tokens: &ThemeTokens) -> Span<'static> {
    Span::styled(
        format!("{} {}", category.icon(), category.label()),
        Style::default().fg(tokens.category),
    )
}

pub fn format_due(due: NaiveDateTime) -> String {
    due.format(DUE_FORMAT).to_string()
}

/// Open items past their due time are flagged; completed ones never are.
pub fn is_overdue(todo: &Todo, now: NaiveDateTime) -> bool {
    !todo.completed && todo.due_date.is_some_and(|due| due < now)
}

fn due_span(todo: &Todo, now: NaiveDateTime, tokens: &ThemeTokens) -> Option<Span<'static>> {
    let due = todo.due_date?;
    let (label, color) = if is_overdue(todo, now) {
        ("Overdue", tokens.overdue)
    } else {
        ("Due", tokens.due)
    };
    Some(Span::styled(
        format!("📅 {label}: {}", format_due(due)),
        Style::default().fg(color),
    ))
}

/// Rows for one list entry: checkbox and title, badges and due date, then a short
/// description preview wrapped to `width`.
pub fn todo_lines(
    todo: &Todo,
    width: usize,
    regex: Option<&Regex>,
    now: NaiveDateTime,
    tokens: &ThemeTokens,
) -> Vec<Line<'static>> {
    let (checkbox, title_style) = if todo.completed {
        (
            "[x] ",
            Style::default()
                .fg(tokens.done)
                .add_modifier(Modifier::CROSSED_OUT),
        )
    } else {
        (
            "[ ] ",
            Style::default().fg(tokens.open).add_modifier(Modifier::BOLD),
        )
    };
    let match_style = Style::default()
        .bg(tokens.highlight_bg)
        .add_modifier(Modifier::UNDERLINED);

    let mut title = vec![Span::styled(checkbox, title_style.remove_modifier(Modifier::CROSSED_OUT))];
    title.extend(highlight_matches(&todo.title, title_style, match_style, regex));

    let indent = " ".repeat(checkbox.width());
    let mut meta = vec![
        Span::raw(indent.clone()),
        priority_badge(todo.priority, tokens),
        Span::raw(" "),
        category_badge(todo.category, tokens),
    ];
    if let Some(due) = due_span(todo, now, tokens) {
        meta.push(Span::raw("  "));
        meta.push(due);
    }

    let mut lines = vec![Line::from(title), Line::from(meta)];

    if let Some(description) = todo.description.as_deref().filter(|d| !d.trim().is_empty()) {
        let muted = Style::default().fg(tokens.muted);
        let available = width.saturating_sub(indent.width()).max(1);
        let wrapped = textwrap::wrap(description.trim(), available);
        let truncated = wrapped.len() > DESCRIPTION_PREVIEW_ROWS;
        for (i, row) in wrapped.iter().take(DESCRIPTION_PREVIEW_ROWS).enumerate() {
            let mut text = row.to_string();
            if truncated && i + 1 == DESCRIPTION_PREVIEW_ROWS {
                text.push('…');
            }
            let mut spans = vec![Span::raw(indent.clone())];
            spans.extend(highlight_matches(&text, muted, match_style, regex));
            lines.push(Line::from(spans));
        }
    }

    lines
}
