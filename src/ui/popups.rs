use super::components::{
    category_badge, centered_fixed, centered_rect, format_due, is_overdue, priority_badge,
};
use crate::app::App;
use crate::models::{FormField, Todo};
use crate::ui::theme::ThemeTokens;
use chrono::NaiveDateTime;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use tui_textarea::TextArea;

const FORM_WIDTH: u16 = 72;
const FORM_HEIGHT: u16 = 20;

pub fn render_form_popup(f: &mut Frame, app: &mut App, tokens: &ThemeTokens) {
    let area = centered_fixed(FORM_WIDTH, FORM_HEIGHT, f.area());
    let block = Block::default()
        .title(format!(" {} ", app.todos.form.title()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(tokens.border_active));
    let inner = block.inner(area);
    f.render_widget(Clear, area);
    f.render_widget(block, area);

    let mut constraints: Vec<Constraint> = FormField::all()
        .iter()
        .map(|_| Constraint::Length(3))
        .collect();
    constraints.push(Constraint::Min(1));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    let focus = app.form_focus;
    let draft = &app.todos.form.draft;
    let priority = draft.priority;
    let category = draft.category;

    for (field, row) in FormField::all().into_iter().zip(rows.iter().copied()) {
        let focused = field == focus;
        match field {
            FormField::Title => {
                render_text_field(f, row, &mut app.title_input, field.label(), focused, tokens)
            }
            FormField::Description => render_text_field(
                f,
                row,
                &mut app.description_input,
                field.label(),
                focused,
                tokens,
            ),
            FormField::Due => {
                render_text_field(f, row, &mut app.due_input, field.label(), focused, tokens)
            }
            FormField::Priority => {
                render_choice_field(f, row, field, focused, priority_badge(priority, tokens), tokens)
            }
            FormField::Category => {
                render_choice_field(f, row, field, focused, category_badge(category, tokens), tokens)
            }
        }
    }

    let kb = &app.config.keybindings.form;
    let submit_label = if app.todos.form.is_editing() {
        "update"
    } else {
        "create"
    };
    let footer = format!(
        "{}: {submit_label}  {}: next field  {}: change option  {}: cancel",
        fmt_keys(&kb.submit),
        fmt_keys(&kb.next_field),
        fmt_keys(&kb.option_next),
        fmt_keys(&kb.cancel),
    );
    let mut footer_lines = Vec::new();
    if let Some(error) = app.todos.error() {
        footer_lines.push(Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(tokens.error).add_modifier(Modifier::BOLD),
        )));
    }
    footer_lines.push(Line::from(Span::styled(footer, Style::default().fg(tokens.muted))));
    if let Some(footer_area) = rows.last() {
        f.render_widget(
            Paragraph::new(Text::from(footer_lines)).wrap(Wrap { trim: true }),
            *footer_area,
        );
    }
}

fn field_block(title: &str, focused: bool, tokens: &ThemeTokens) -> Block<'static> {
    let color = if focused {
        tokens.border_active
    } else {
        tokens.border_default
    };
    Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
}

/// Draws a single-line input; only the focused one shows a cursor.
pub(super) fn render_text_field(
    f: &mut Frame,
    area: Rect,
    input: &mut TextArea<'_>,
    title: &str,
    focused: bool,
    tokens: &ThemeTokens,
) {
    input.set_block(field_block(title, focused, tokens));
    input.set_cursor_line_style(Style::default());
    let cursor = if focused {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
    };
    input.set_cursor_style(cursor);
    f.render_widget(&*input, area);
}

fn render_choice_field(
    f: &mut Frame,
    area: Rect,
    field: FormField,
    focused: bool,
    value: Span<'static>,
    tokens: &ThemeTokens,
) {
    let arrow = Style::default().fg(if focused { tokens.border_active } else { tokens.muted });
    let line = Line::from(vec![
        Span::styled("◀ ", arrow),
        value,
        Span::styled(" ▶", arrow),
    ]);
    f.render_widget(
        Paragraph::new(line).block(field_block(field.label(), focused, tokens)),
        area,
    );
}

pub fn render_delete_popup(f: &mut Frame, app: &App, tokens: &ThemeTokens) {
    let block = Block::default()
        .title(" Delete this todo? ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(tokens.error));
    let area = centered_fixed(50, 7, f.area());
    f.render_widget(Clear, area);
    f.render_widget(block, area);

    let text_area = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .margin(1)
        .split(area);

    let title = app
        .delete_target
        .as_deref()
        .and_then(|id| app.todos.get(id))
        .map(|todo| todo.title.as_str())
        .unwrap_or("this todo");
    let body = Paragraph::new(Line::from(vec![
        Span::raw("Delete "),
        Span::styled(format!("\"{title}\""), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("? This cannot be undone."),
    ]))
    .wrap(Wrap { trim: true });

    let kb = &app.config.keybindings.popup;
    let help_text = Paragraph::new(format!(
        "{}: delete  {}: cancel",
        fmt_keys(&kb.confirm),
        fmt_keys(&kb.cancel)
    ))
    .style(Style::default().fg(tokens.muted));

    f.render_widget(body, text_area[0]);
    f.render_widget(help_text, text_area[1]);
}

pub fn render_details_popup(f: &mut Frame, app: &App, tokens: &ThemeTokens, now: NaiveDateTime) {
    let Some(todo) = app.selected_id().and_then(|id| app.todos.get(&id)) else {
        return;
    };
    let block = Block::default()
        .title(" Todo Details ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(tokens.border_active));
    let area = centered_rect(70, 70, f.area());
    f.render_widget(Clear, area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .margin(1)
        .split(area);

    f.render_widget(
        Paragraph::new(Text::from(details_lines(todo, tokens, now))).wrap(Wrap { trim: false }),
        chunks[0],
    );

    let kb = &app.config.keybindings;
    let footer = format!(
        "{}: edit  {}: toggle  {}: close",
        fmt_keys(&kb.list.edit),
        fmt_keys(&kb.list.toggle),
        fmt_keys(&kb.popup.cancel),
    );
    f.render_widget(
        Paragraph::new(footer).style(Style::default().fg(tokens.muted)),
        chunks[1],
    );
}

fn details_lines(todo: &Todo, tokens: &ThemeTokens, now: NaiveDateTime) -> Vec<Line<'static>> {
    let label = Style::default().fg(tokens.muted);
    let (status, status_color) = if todo.completed {
        ("Completed", tokens.done)
    } else {
        ("Active", tokens.open)
    };

    let mut lines = vec![
        Line::from(Span::styled(
            todo.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Status:   ", label),
            Span::styled(status, Style::default().fg(status_color)),
        ]),
        Line::from(vec![
            Span::styled("Priority: ", label),
            priority_badge(todo.priority, tokens),
        ]),
        Line::from(vec![
            Span::styled("Category: ", label),
            category_badge(todo.category, tokens),
        ]),
    ];

    if let Some(due) = todo.due_date {
        let (suffix, color) = if is_overdue(todo, now) {
            (" (overdue)", tokens.overdue)
        } else {
            ("", tokens.due)
        };
        lines.push(Line::from(vec![
            Span::styled("Due:      ", label),
            Span::styled(format!("{}{suffix}", format_due(due)), Style::default().fg(color)),
        ]));
    }
    lines.push(Line::from(vec![
        Span::styled("Created:  ", label),
        Span::raw(format_due(todo.created_at)),
    ]));
    if let Some(updated) = todo.updated_at {
        lines.push(Line::from(vec![
            Span::styled("Updated:  ", label),
            Span::raw(format_due(updated)),
        ]));
    }

    lines.push(Line::from(""));
    match todo.description.as_deref().filter(|d| !d.trim().is_empty()) {
        Some(description) => {
            lines.extend(description.lines().map(|row| Line::from(row.to_string())));
        }
        None => lines.push(Line::from(Span::styled("No description.", label))),
    }
    lines
}

struct HelpSection {
    title: &'static str,
    entries: Vec<(String, &'static str)>,
}

fn help_sections(app: &App) -> Vec<HelpSection> {
    let kb = &app.config.keybindings;
    vec![
        HelpSection {
            title: "General",
            entries: vec![
                (fmt_keys(&kb.global.help), "Toggle help"),
                (fmt_keys(&kb.global.search), "Search todos"),
                (fmt_keys(&kb.global.refresh), "Reload from server"),
                (fmt_keys(&kb.global.logout), "Sign out"),
                (fmt_keys(&kb.global.quit), "Quit"),
            ],
        },
        HelpSection {
            title: "List",
            entries: vec![
                (fmt_keys(&kb.list.up), "Move up"),
                (fmt_keys(&kb.list.down), "Move down"),
                (fmt_keys(&kb.list.top), "First todo"),
                (fmt_keys(&kb.list.bottom), "Last todo"),
                (fmt_keys(&kb.list.toggle), "Toggle completed"),
                (fmt_keys(&kb.list.new), "New todo"),
                (fmt_keys(&kb.list.edit), "Edit todo"),
                (fmt_keys(&kb.list.delete), "Delete todo"),
                (fmt_keys(&kb.list.details), "Show details"),
            ],
        },
        HelpSection {
            title: "Filters",
            entries: vec![
                (fmt_keys(&kb.list.completion_filter), "All / Active / Completed"),
                (fmt_keys(&kb.list.priority_filter), "Cycle priority filter"),
                (fmt_keys(&kb.list.category_filter), "Cycle category filter"),
                (fmt_keys(&kb.list.sort), "Cycle sort order"),
                (fmt_keys(&kb.list.clear_filters), "Clear all filters"),
            ],
        },
        HelpSection {
            title: "Form",
            entries: vec![
                (fmt_keys(&kb.form.submit), "Save"),
                (fmt_keys(&kb.form.next_field), "Next field"),
                (fmt_keys(&kb.form.prev_field), "Previous field"),
                (fmt_keys(&kb.form.option_next), "Next option"),
                (fmt_keys(&kb.form.option_prev), "Previous option"),
                (fmt_keys(&kb.form.cancel), "Cancel"),
            ],
        },
        HelpSection {
            title: "Search",
            entries: vec![
                (fmt_keys(&kb.search.submit), "Keep query"),
                (fmt_keys(&kb.search.clear), "Clear query"),
                (fmt_keys(&kb.search.cancel), "Clear and close"),
            ],
        },
    ]
}

fn help_lines(app: &App, tokens: &ThemeTokens) -> Vec<Line<'static>> {
    let header_style = Style::default()
        .fg(tokens.border_active)
        .add_modifier(Modifier::BOLD);
    let key_style = Style::default().add_modifier(Modifier::BOLD);

    let sections = help_sections(app);
    let key_width = sections
        .iter()
        .flat_map(|section| section.entries.iter())
        .map(|(keys, _)| keys.chars().count())
        .max()
        .unwrap_or(0);

    let mut lines = Vec::new();
    for (idx, section) in sections.iter().enumerate() {
        if idx > 0 {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(section.title, header_style)));
        for (keys, label) in &section.entries {
            let padding = key_width.saturating_sub(keys.chars().count());
            lines.push(Line::from(vec![
                Span::styled(format!("  {keys}"), key_style),
                Span::raw(" ".repeat(padding + 2)),
                Span::raw(*label),
            ]));
        }
    }
    lines
}

pub fn render_help_popup(f: &mut Frame, app: &App, tokens: &ThemeTokens) {
    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(tokens.border_default));
    let area = centered_rect(70, 85, f.area());
    f.render_widget(Clear, area);
    f.render_widget(block, area);

    let inner_area = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .margin(1)
        .split(area);

    f.render_widget(Paragraph::new(Text::from(help_lines(app, tokens))), inner_area[0]);
    f.render_widget(
        Paragraph::new(format!("Esc / {}: close", fmt_keys(&app.config.keybindings.global.help)))
            .style(Style::default().fg(tokens.muted))
            .alignment(Alignment::Right),
        inner_area[1],
    );
}

pub fn fmt_keys(keys: &[String]) -> String {
    if keys.is_empty() {
        return "-".to_string();
    }
    keys.join(" / ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::{make_test_app, sample_todo};
    use crate::config::Theme;
    use chrono::NaiveDate;

    fn line_to_string(line: &Line<'_>) -> String {
        line.spans
            .iter()
            .map(|span| span.content.as_ref())
            .collect::<String>()
    }

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, day)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .unwrap()
    }

    #[test]
    fn help_lists_configured_bindings() {
        let (app, _) = make_test_app(true, Vec::new());
        let tokens = ThemeTokens::from_theme(&Theme::default());
        let combined = help_lines(&app, &tokens)
            .iter()
            .map(line_to_string)
            .collect::<Vec<_>>()
            .join("\n");

        assert!(combined.contains("ctrl+l"));
        assert!(combined.contains("Sign out"));
        assert!(combined.contains("space / x"));
        assert!(combined.contains("Clear all filters"));
    }

    #[test]
    fn details_mark_overdue_and_missing_description() {
        let tokens = ThemeTokens::from_theme(&Theme::default());
        let mut todo = sample_todo("1", "Pay rent");
        todo.due_date = Some(at(5));
        let combined = details_lines(&todo, &tokens, at(6))
            .iter()
            .map(line_to_string)
            .collect::<Vec<_>>()
            .join("\n");

        assert!(combined.contains("Status:   Active"));
        assert!(combined.contains("(overdue)"));
        assert!(combined.contains("No description."));
    }

    #[test]
    fn fmt_keys_handles_empty_bindings() {
        assert_eq!(fmt_keys(&[]), "-");
        assert_eq!(fmt_keys(&["esc".to_string(), "n".to_string()]), "esc / n");
    }
}
