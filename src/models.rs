use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputMode {
    Login,
    Navigate,
    Search,
    Form,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormField {
    Title,
    Description,
    Priority,
    Category,
    Due,
}

impl FormField {
    pub fn all() -> [FormField; 5] {
        [
            FormField::Title,
            FormField::Description,
            FormField::Priority,
            FormField::Category,
            FormField::Due,
        ]
    }

    pub fn label(self) -> &'static str {
        match self {
            FormField::Title => "Title *",
            FormField::Description => "Description",
            FormField::Priority => "Priority *",
            FormField::Category => "Category *",
            FormField::Due => "Due Date (Optional)",
        }
    }

    /// Fields edited by cycling through a fixed set instead of typing.
    pub fn is_choice(self) -> bool {
        matches!(self, FormField::Priority | FormField::Category)
    }

    pub fn next(self) -> Self {
        step(&FormField::all(), self, 1)
    }

    pub fn prev(self) -> Self {
        step(&FormField::all(), self, -1)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoginMode {
    #[default]
    SignIn,
    Register,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoginField {
    Username,
    Email,
    Password,
}

impl LoginField {
    /// Email is only asked for when registering.
    pub fn order(mode: LoginMode) -> &'static [LoginField] {
        match mode {
            LoginMode::SignIn => &[LoginField::Username, LoginField::Password],
            LoginMode::Register => &[LoginField::Username, LoginField::Email, LoginField::Password],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LoginField::Username => "Username",
            LoginField::Email => "Email",
            LoginField::Password => "Password",
        }
    }
}

/// Wrapping step through `values`; `current` must be one of them.
pub fn step<T: Copy + PartialEq>(values: &[T], current: T, delta: isize) -> T {
    let len = values.len() as isize;
    let idx = values.iter().position(|v| *v == current).unwrap_or(0) as isize;
    values[(idx + delta).rem_euclid(len) as usize]
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn all() -> [Priority; 3] {
        [Priority::Low, Priority::Medium, Priority::High]
    }

    /// Sort rank: HIGH first.
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Work,
    Personal,
    Shopping,
    Health,
    Finance,
    Education,
    Other,
}

impl Category {
    pub fn all() -> [Category; 7] {
        [
            Category::Work,
            Category::Personal,
            Category::Shopping,
            Category::Health,
            Category::Finance,
            Category::Education,
            Category::Other,
        ]
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Work => "Work",
            Category::Personal => "Personal",
            Category::Shopping => "Shopping",
            Category::Health => "Health",
            Category::Finance => "Finance",
            Category::Education => "Education",
            Category::Other => "Other",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Category::Work => "💼",
            Category::Personal => "👤",
            Category::Shopping => "🛒",
            Category::Health => "❤️",
            Category::Finance => "💰",
            Category::Education => "📚",
            Category::Other => "📌",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    pub priority: Priority,
    pub category: Category,
    #[serde(default, with = "opt_timestamp")]
    pub due_date: Option<NaiveDateTime>,
    #[serde(with = "timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(default, with = "opt_timestamp", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<NaiveDateTime>,
}

/// Body of `POST /api/todos` and `PUT /api/todos/{id}`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoRequest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(with = "opt_timestamp", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDateTime>,
    pub priority: Priority,
    pub category: Category,
}

impl TodoRequest {
    pub fn from_todo(todo: &Todo) -> Self {
        Self {
            title: todo.title.clone(),
            description: todo.description.clone(),
            due_date: todo.due_date,
            priority: todo.priority,
            category: todo.category,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CompletionFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl CompletionFilter {
    pub fn label(self) -> &'static str {
        match self {
            CompletionFilter::All => "All",
            CompletionFilter::Active => "Active",
            CompletionFilter::Completed => "Completed",
        }
    }

    pub fn next(self) -> Self {
        match self {
            CompletionFilter::All => CompletionFilter::Active,
            CompletionFilter::Active => CompletionFilter::Completed,
            CompletionFilter::Completed => CompletionFilter::All,
        }
    }

    pub fn accepts(self, todo: &Todo) -> bool {
        match self {
            CompletionFilter::All => true,
            CompletionFilter::Active => !todo.completed,
            CompletionFilter::Completed => todo.completed,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Date,
    Priority,
    Title,
}

impl SortKey {
    pub fn label(self) -> &'static str {
        match self {
            SortKey::Date => "Date",
            SortKey::Priority => "Priority",
            SortKey::Title => "Title",
        }
    }

    pub fn next(self) -> Self {
        match self {
            SortKey::Date => SortKey::Priority,
            SortKey::Priority => SortKey::Title,
            SortKey::Title => SortKey::Date,
        }
    }
}

/// Ephemeral view criteria. Never persisted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterSpec {
    pub completion: CompletionFilter,
    pub query: String,
    pub priority: Option<Priority>,
    pub category: Option<Category>,
    pub sort: SortKey,
}

/// Steps an "all or one of" filter through `None -> values... -> None`.
pub fn cycle_option<T: Copy + PartialEq>(current: Option<T>, values: &[T]) -> Option<T> {
    match current {
        None => values.first().copied(),
        Some(value) => {
            let idx = values.iter().position(|v| *v == value)?;
            values.get(idx + 1).copied()
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub roles: BTreeSet<String>,
}

impl From<AuthResponse> for User {
    fn from(response: AuthResponse) -> Self {
        Self {
            id: response.id,
            username: response.username,
            email: response.email,
            roles: response.roles.into_iter().collect(),
        }
    }
}

/// Accepts both `"42"` and `42`; identifiers are opaque strings on our side.
fn de_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(n) => n.to_string(),
    })
}

const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parses a server timestamp. Naive values are taken as local time; values with an
/// offset are converted to local time.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(value) = DateTime::parse_from_rfc3339(raw) {
        return Some(value.with_timezone(&Local).naive_local());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .ok()
}

mod timestamp {
    use super::{NaiveDateTime, WIRE_FORMAT, parse_timestamp};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.format(WIRE_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        parse_timestamp(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp: {raw}")))
    }
}

mod opt_timestamp {
    use super::{Deserialize, Deserializer, NaiveDateTime, Serializer, WIRE_FORMAT, parse_timestamp};
    use serde::de::Error;

    pub fn serialize<S: Serializer>(value: &Option<NaiveDateTime>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => s.serialize_str(&value.format(WIRE_FORMAT).to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDateTime>, D::Error> {
        match Option::<String>::deserialize(d)? {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => parse_timestamp(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid timestamp: {raw}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn decodes_server_todo_with_numeric_id() {
        let json = r#"{
            "id": 7,
            "title": "Buy milk",
            "description": null,
            "completed": false,
            "priority": "MEDIUM",
            "category": "SHOPPING",
            "dueDate": "2025-03-01T18:30:00",
            "createdAt": "2025-02-27T08:15:42.123456"
        }"#;
        let todo: Todo = serde_json::from_str(json).unwrap();
        assert_eq!(todo.id, "7");
        assert_eq!(todo.priority, Priority::Medium);
        assert_eq!(todo.category, Category::Shopping);
        assert_eq!(
            todo.due_date,
            NaiveDate::from_ymd_opt(2025, 3, 1).and_then(|d| d.and_hms_opt(18, 30, 0))
        );
        assert_eq!(todo.created_at.date(), NaiveDate::from_ymd_opt(2025, 2, 27).unwrap());
    }

    #[test]
    fn request_omits_absent_optionals() {
        let request = TodoRequest {
            title: "Pay rent".to_string(),
            description: None,
            due_date: None,
            priority: Priority::High,
            category: Category::Finance,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"title": "Pay rent", "priority": "HIGH", "category": "FINANCE"})
        );
    }

    #[test]
    fn cycle_option_wraps_back_to_all() {
        let values = Priority::all();
        let mut current = None;
        let mut seen = Vec::new();
        for _ in 0..4 {
            current = cycle_option(current, &values);
            seen.push(current);
        }
        assert_eq!(
            seen,
            vec![Some(Priority::Low), Some(Priority::Medium), Some(Priority::High), None]
        );
    }

    #[test]
    fn step_wraps_both_ways() {
        assert_eq!(FormField::Title.prev(), FormField::Due);
        assert_eq!(FormField::Due.next(), FormField::Title);
        assert_eq!(step(&Category::all(), Category::Other, 1), Category::Work);
        assert_eq!(step(&Priority::all(), Priority::Low, -1), Priority::High);
    }

    #[test]
    fn auth_response_becomes_user_with_role_set() {
        let response: AuthResponse = serde_json::from_str(
            r#"{"token":"t","id":"u1","username":"ana","email":"a@x.io","roles":["USER","USER","ADMIN"]}"#,
        )
        .unwrap();
        let user = User::from(response);
        assert_eq!(user.roles.len(), 2);
        assert!(user.roles.contains("ADMIN"));
    }
}
