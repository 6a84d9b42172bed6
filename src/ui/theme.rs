use crate::config::Theme;
use crate::models::Priority;
use ratatui::style::Color;

#[derive(Debug, Clone)]
pub struct ThemeTokens {
    pub border_default: Color,
    pub border_active: Color,
    pub border_search: Color,
    pub highlight_bg: Color,
    pub done: Color,
    pub open: Color,
    pub priority_high: Color,
    pub priority_medium: Color,
    pub priority_low: Color,
    pub category: Color,
    pub due: Color,
    pub overdue: Color,
    pub muted: Color,
    pub error: Color,
}

impl ThemeTokens {
    pub fn from_theme(theme: &Theme) -> Self {
        Self {
            border_default: parse_color(&theme.border_default),
            border_active: parse_color(&theme.border_active),
            border_search: parse_color(&theme.border_search),
            highlight_bg: parse_color(&theme.text_highlight),
            done: parse_color(&theme.todo_done),
            open: parse_color(&theme.todo_open),
            priority_high: parse_color(&theme.priority_high),
            priority_medium: parse_color(&theme.priority_medium),
            priority_low: parse_color(&theme.priority_low),
            category: parse_color(&theme.category),
            due: parse_color(&theme.due),
            overdue: parse_color(&theme.overdue),
            muted: parse_color(&theme.muted),
            error: parse_color(&theme.error),
        }
    }

    pub fn priority(&self, priority: Priority) -> Color {
        match priority {
            Priority::High => self.priority_high,
            Priority::Medium => self.priority_medium,
            Priority::Low => self.priority_low,
        }
    }
}

/// Accepts ratatui color names (any case), `r,g,b`, or `#rrggbb`. Anything else is `Reset`.
pub fn parse_color(s: &str) -> Color {
    let s = s.trim().to_lowercase();
    match s.as_str() {
        "reset" => Color::Reset,
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "gray" => Color::Gray,
        "darkgray" => Color::DarkGray,
        "lightred" => Color::LightRed,
        "lightgreen" => Color::LightGreen,
        "lightyellow" => Color::LightYellow,
        "lightblue" => Color::LightBlue,
        "lightmagenta" => Color::LightMagenta,
        "lightcyan" => Color::LightCyan,
        "white" => Color::White,
        other => parse_rgb(other).unwrap_or(Color::Reset),
    }
}

fn parse_rgb(s: &str) -> Option<Color> {
    if let Some(hex) = s.strip_prefix('#') {
        if hex.len() != 6 {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        return Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?));
    }

    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    match parts.as_slice() {
        [r, g, b] => Some(Color::Rgb(r.parse().ok()?, g.parse().ok()?, b.parse().ok()?)),
        _ => None,
    }
}
