use crate::date_input::{format_for_edit, parse_due_input};
use crate::models::{Category, Priority, Todo, TodoRequest};
use chrono::NaiveDateTime;

pub const TITLE_MAX_CHARS: usize = 200;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DraftError {
    #[error("Title is required.")]
    EmptyTitle,
    #[error("Title is limited to {TITLE_MAX_CHARS} characters.")]
    TitleTooLong,
    #[error("Description is limited to {DESCRIPTION_MAX_CHARS} characters.")]
    DescriptionTooLong,
    #[error("Could not read due date \"{0}\". Try 2025-01-31T17:00, tomorrow, or +3d.")]
    InvalidDueDate(String),
}

/// Raw field values of the create/edit modal.
#[derive(Debug, Clone, PartialEq)]
pub struct TodoDraft {
    pub title: String,
    pub description: String,
    pub due: String,
    pub priority: Priority,
    pub category: Category,
}

impl Default for TodoDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            due: String::new(),
            priority: Priority::Medium,
            category: Category::Personal,
        }
    }
}

impl TodoDraft {
    pub fn from_todo(todo: &Todo) -> Self {
        Self {
            title: todo.title.clone(),
            description: todo.description.clone().unwrap_or_default(),
            due: todo.due_date.map(format_for_edit).unwrap_or_default(),
            priority: todo.priority,
            category: todo.category,
        }
    }

    /// Enforces the same limits as the form inputs. Blank optional fields are omitted.
    pub fn to_request(&self, now: NaiveDateTime) -> Result<TodoRequest, DraftError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(DraftError::EmptyTitle);
        }
        if title.chars().count() > TITLE_MAX_CHARS {
            return Err(DraftError::TitleTooLong);
        }

        let description = self.description.trim();
        if description.chars().count() > DESCRIPTION_MAX_CHARS {
            return Err(DraftError::DescriptionTooLong);
        }

        let due_date = parse_due_input(&self.due, now)
            .map_err(|_| DraftError::InvalidDueDate(self.due.trim().to_string()))?;

        Ok(TodoRequest {
            title: title.to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
            due_date,
            priority: self.priority,
            category: self.category,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    pub open: bool,
    /// Identifier of the item being edited; `None` while creating.
    pub editing: Option<String>,
    pub draft: TodoDraft,
}

impl FormState {
    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn title(&self) -> &'static str {
        if self.is_editing() {
            "Edit Todo"
        } else {
            "Create New Todo"
        }
    }

    pub fn reset(&mut self) {
        *self = FormState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 15)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .unwrap()
    }

    #[test]
    fn defaults_match_new_item_form() {
        let draft = TodoDraft::default();
        assert_eq!(draft.priority, Priority::Medium);
        assert_eq!(draft.category, Category::Personal);
    }

    #[test]
    fn request_trims_and_omits_blank_fields() {
        let draft = TodoDraft {
            title: "  Pay rent ".to_string(),
            description: "   ".to_string(),
            due: String::new(),
            priority: Priority::High,
            category: Category::Finance,
        };
        let request = draft.to_request(now()).unwrap();
        assert_eq!(request.title, "Pay rent");
        assert_eq!(request.description, None);
        assert_eq!(request.due_date, None);
    }

    #[test]
    fn rejects_blank_and_oversized_fields() {
        let mut draft = TodoDraft::default();
        assert_eq!(draft.to_request(now()), Err(DraftError::EmptyTitle));

        draft.title = "x".repeat(TITLE_MAX_CHARS + 1);
        assert_eq!(draft.to_request(now()), Err(DraftError::TitleTooLong));

        draft.title = "ok".to_string();
        draft.description = "y".repeat(DESCRIPTION_MAX_CHARS + 1);
        assert_eq!(draft.to_request(now()), Err(DraftError::DescriptionTooLong));

        draft.description.clear();
        draft.due = "whenever".to_string();
        assert!(matches!(
            draft.to_request(now()),
            Err(DraftError::InvalidDueDate(_))
        ));
    }

    #[test]
    fn edit_draft_round_trips_due_at_minute_precision() {
        let due = NaiveDate::from_ymd_opt(2025, 2, 1)
            .and_then(|d| d.and_hms_opt(17, 45, 30))
            .unwrap();
        let todo = Todo {
            id: "1".to_string(),
            title: "File taxes".to_string(),
            description: Some("forms".to_string()),
            completed: false,
            priority: Priority::High,
            category: Category::Finance,
            due_date: Some(due),
            created_at: now(),
            updated_at: None,
        };

        let draft = TodoDraft::from_todo(&todo);
        assert_eq!(draft.due, "2025-02-01T17:45");

        let request = draft.to_request(now()).unwrap();
        assert_eq!(
            request.due_date,
            NaiveDate::from_ymd_opt(2025, 2, 1).and_then(|d| d.and_hms_opt(17, 45, 0))
        );
        assert_eq!(request.description.as_deref(), Some("forms"));
    }
}
