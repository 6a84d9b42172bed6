use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Weekday};

/// Representation used by the due-date form field.
pub(crate) const EDIT_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Time given to a due date entered without one.
const DEFAULT_DUE_TIME: (u32, u32) = (23, 59);

/// Renders a due timestamp for editing. Seconds are dropped; the field has minute
/// granularity.
pub(crate) fn format_for_edit(value: NaiveDateTime) -> String {
    value.format(EDIT_FORMAT).to_string()
}

/// Parses the due-date field. `Ok(None)` means the field was left blank.
///
/// Accepts `2025-02-02T18:30`, `2025-02-02 18:30`, or a date word (`2025-02-02`,
/// `today`, `tomorrow`, `+3d`, `-1w`, `+1m`, `fri`, `next fri`) optionally followed by
/// a time (`18:30`, `1830`).
pub(crate) fn parse_due_input(input: &str, now: NaiveDateTime) -> Result<Option<NaiveDateTime>, ()> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    if let Ok(value) = NaiveDateTime::parse_from_str(trimmed, EDIT_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M"))
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S"))
    {
        return Ok(Some(value));
    }

    let base = now.date();
    if let Some(date) = parse_relative_date_input(trimmed, base) {
        let time = NaiveTime::from_hms_opt(DEFAULT_DUE_TIME.0, DEFAULT_DUE_TIME.1, 0).ok_or(())?;
        return Ok(Some(date.and_time(time)));
    }

    // Trailing token as a time, the rest as a date.
    if let Some((date_part, time_part)) = trimmed.rsplit_once(char::is_whitespace)
        && let Some(time) = parse_time(time_part)
        && let Some(date) = parse_relative_date_input(date_part, base)
    {
        return Ok(Some(date.and_time(time)));
    }

    Err(())
}

pub(crate) fn parse_relative_date_input(input: &str, base: NaiveDate) -> Option<NaiveDate> {
    let trimmed = input.trim().to_lowercase();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(&trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    match trimmed.as_str() {
        "today" => return Some(base),
        "tomorrow" => return base.succ_opt(),
        _ => {}
    }

    parse_relative_offset(&trimmed, base).or_else(|| parse_weekday_input(&trimmed, base))
}

fn parse_time(value: &str) -> Option<NaiveTime> {
    let trimmed = value.trim();
    if let Some((hour, minute)) = trimmed.split_once(':') {
        return NaiveTime::from_hms_opt(hour.parse().ok()?, minute.parse().ok()?, 0);
    }

    if (3..=4).contains(&trimmed.len()) && trimmed.chars().all(|c| c.is_ascii_digit()) {
        let (hour, minute) = trimmed.split_at(trimmed.len() - 2);
        return NaiveTime::from_hms_opt(hour.parse().ok()?, minute.parse().ok()?, 0);
    }

    None
}

fn parse_relative_offset(input: &str, base: NaiveDate) -> Option<NaiveDate> {
    let (sign, rest) = match input.as_bytes().first()? {
        b'+' => (1i64, &input[1..]),
        b'-' => (-1i64, &input[1..]),
        _ => (1i64, input),
    };

    let digits_end = rest.find(|c: char| !c.is_ascii_digit())?;
    if digits_end == 0 {
        return None;
    }
    let qty: i64 = rest[..digits_end].parse().ok()?;
    let unit = &rest[digits_end..];

    // Out-of-range offsets are rejected rather than saturated.
    let qty = sign.checked_mul(qty)?;
    match unit {
        "d" => base.checked_add_signed(TimeDelta::try_days(qty)?),
        "w" => base.checked_add_signed(TimeDelta::try_weeks(qty)?),
        "m" => add_months(base, i32::try_from(qty).ok()?),
        _ => None,
    }
}

fn parse_weekday_input(input: &str, base: NaiveDate) -> Option<NaiveDate> {
    let parts: Vec<&str> = input.split_whitespace().collect();
    match parts.as_slice() {
        [day] => parse_weekday(day).map(|weekday| next_weekday(base, weekday, false)),
        ["next", day] => parse_weekday(day).map(|weekday| next_weekday(base, weekday, true)),
        _ => None,
    }
}

/// Accepts the three-letter abbreviation or the full day name.
fn parse_weekday(token: &str) -> Option<Weekday> {
    const NAMES: [(&str, &str, Weekday); 7] = [
        ("mon", "monday", Weekday::Mon),
        ("tue", "tuesday", Weekday::Tue),
        ("wed", "wednesday", Weekday::Wed),
        ("thu", "thursday", Weekday::Thu),
        ("fri", "friday", Weekday::Fri),
        ("sat", "saturday", Weekday::Sat),
        ("sun", "sunday", Weekday::Sun),
    ];
    let token = token.trim();
    NAMES
        .iter()
        .find(|(short, full, _)| token == *short || token == *full)
        .map(|(_, _, weekday)| *weekday)
}

fn next_weekday(base: NaiveDate, weekday: Weekday, force_next: bool) -> NaiveDate {
    let base_num = i64::from(base.weekday().num_days_from_monday());
    let target_num = i64::from(weekday.num_days_from_monday());
    let mut delta = (target_num - base_num + 7) % 7;
    if force_next && delta == 0 {
        delta = 7;
    }
    base + TimeDelta::days(delta)
}

fn add_months(base: NaiveDate, months: i32) -> Option<NaiveDate> {
    let total = base
        .year()
        .checked_mul(12)?
        .checked_add(base.month0() as i32)?
        .checked_add(months)?;
    let year = total.div_euclid(12);
    let month = total.rem_euclid(12) as u32 + 1;
    // Clamp to the last day of the target month.
    (1..=base.day())
        .rev()
        .find_map(|day| NaiveDate::from_ymd_opt(year, month, day))
}
