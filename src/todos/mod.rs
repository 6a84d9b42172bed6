//! The item list controller: the in-memory collection, the view criteria, and the
//! create/edit draft. Every mutation is a round trip through a [`TodoGateway`]; the
//! collection only ever changes from server responses.

pub mod form;
pub mod view;

use crate::api::ApiError;
use crate::api::todos::TodoGateway;
use crate::models::{CompletionFilter, FilterSpec, Stats, Todo, TodoRequest};
use chrono::NaiveDateTime;
use form::{DraftError, FormState, TodoDraft};
use std::collections::HashSet;

pub const FETCH_FAILED: &str = "Failed to fetch todos";
pub const CREATE_FAILED: &str = "Failed to create todo";
pub const UPDATE_FAILED: &str = "Failed to update todo";
pub const TOGGLE_FAILED: &str = "Failed to toggle todo";
pub const DELETE_FAILED: &str = "Failed to delete todo";

/// Outcome of the delete confirmation prompt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

/// A validated form, ready to send.
#[derive(Clone, Debug, PartialEq)]
pub enum Submission {
    Create(TodoRequest),
    Update(String, TodoRequest),
}

impl Submission {
    pub fn target(&self) -> Option<&str> {
        match self {
            Submission::Create(_) => None,
            Submission::Update(id, _) => Some(id),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Draft(#[from] DraftError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Default)]
pub struct TodoList {
    /// Canonical order: server order after a refresh, newly created items in front.
    items: Vec<Todo>,
    pub filter: FilterSpec,
    loading: bool,
    error: Option<String>,
    pub form: FormState,
    in_flight: HashSet<String>,
}

impl TodoList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[Todo] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&Todo> {
        self.items.iter().find(|todo| todo.id == id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Raises the loading flag ahead of a queued refresh so it can be drawn.
    pub fn mark_loading(&mut self) {
        self.loading = true;
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Reserves `id` for one pending mutation. Returns false if it is already reserved.
    pub fn mark_busy(&mut self, id: &str) -> bool {
        self.in_flight.insert(id.to_string())
    }

    pub fn is_busy(&self, id: &str) -> bool {
        self.in_flight.contains(id)
    }

    /// Drops every reservation and pending state. Used when the session ends.
    pub fn reset(&mut self) {
        *self = TodoList::default();
    }

    pub fn refresh(&mut self, gateway: &dyn TodoGateway) -> Result<(), ApiError> {
        self.loading = true;
        let result = gateway.list(None);
        self.loading = false;

        match result {
            Ok(items) => {
                tracing::debug!(count = items.len(), "todos fetched");
                self.items = items;
                self.error = None;
                Ok(())
            }
            Err(e) => Err(self.fail(FETCH_FAILED, e)),
        }
    }

    pub fn create(
        &mut self,
        gateway: &dyn TodoGateway,
        request: &TodoRequest,
    ) -> Result<(), ApiError> {
        let created = gateway
            .create(request)
            .map_err(|e| self.fail(CREATE_FAILED, e))?;
        self.items.insert(0, created);
        self.form.reset();
        self.error = None;
        Ok(())
    }

    pub fn update(
        &mut self,
        gateway: &dyn TodoGateway,
        id: &str,
        request: &TodoRequest,
    ) -> Result<(), ApiError> {
        debug_assert!(self.get(id).is_some(), "update of unknown todo {id}");

        let result = gateway.update(id, request);
        self.in_flight.remove(id);
        let updated = result.map_err(|e| self.fail(UPDATE_FAILED, e))?;
        self.replace(updated);
        self.form.reset();
        self.error = None;
        Ok(())
    }

    pub fn toggle(&mut self, gateway: &dyn TodoGateway, id: &str) -> Result<(), ApiError> {
        let result = gateway.toggle(id);
        self.in_flight.remove(id);
        let updated = result.map_err(|e| self.fail(TOGGLE_FAILED, e))?;
        self.replace(updated);
        self.error = None;
        Ok(())
    }

    pub fn remove(
        &mut self,
        gateway: &dyn TodoGateway,
        id: &str,
        confirmation: Confirmation,
    ) -> Result<(), ApiError> {
        if confirmation == Confirmation::Declined {
            self.in_flight.remove(id);
            return Ok(());
        }

        let result = gateway.delete(id);
        self.in_flight.remove(id);
        result.map_err(|e| self.fail(DELETE_FAILED, e))?;
        self.items.retain(|todo| todo.id != id);
        self.error = None;
        Ok(())
    }

    /// Validates the open draft without touching the network.
    pub fn prepare_submission(&self, now: NaiveDateTime) -> Result<Submission, DraftError> {
        let request = self.form.draft.to_request(now)?;
        Ok(match &self.form.editing {
            Some(id) => Submission::Update(id.clone(), request),
            None => Submission::Create(request),
        })
    }

    pub fn submit(
        &mut self,
        gateway: &dyn TodoGateway,
        submission: &Submission,
    ) -> Result<(), ApiError> {
        match submission {
            Submission::Create(request) => self.create(gateway, request),
            Submission::Update(id, request) => self.update(gateway, id, request),
        }
    }

    pub fn submit_form(
        &mut self,
        gateway: &dyn TodoGateway,
        now: NaiveDateTime,
    ) -> Result<(), SubmitError> {
        let submission = self.prepare_submission(now)?;
        self.submit(gateway, &submission)?;
        Ok(())
    }

    pub fn derive_view(&self) -> Vec<&Todo> {
        view::derive_view(&self.items, &self.filter)
    }

    /// Counts over the whole collection, independent of the filter.
    pub fn stats(&self) -> Stats {
        let completed = self.items.iter().filter(|todo| todo.completed).count();
        Stats {
            total: self.items.len(),
            active: self.items.len() - completed,
            completed,
        }
    }

    /// Sort order is not a filter.
    pub fn has_active_filters(&self) -> bool {
        self.filter.completion != CompletionFilter::All
            || !self.filter.query.trim().is_empty()
            || self.filter.priority.is_some()
            || self.filter.category.is_some()
    }

    pub fn clear_filters(&mut self) {
        self.filter = FilterSpec {
            sort: self.filter.sort,
            ..FilterSpec::default()
        };
    }

    pub fn open_create(&mut self) {
        self.form = FormState {
            open: true,
            editing: None,
            draft: TodoDraft::default(),
        };
    }

    /// Returns false when `id` is not in the collection.
    pub fn open_edit(&mut self, id: &str) -> bool {
        let Some(todo) = self.get(id) else {
            return false;
        };
        let form = FormState {
            open: true,
            editing: Some(todo.id.clone()),
            draft: TodoDraft::from_todo(todo),
        };
        self.form = form;
        true
    }

    pub fn close_form(&mut self) {
        self.form.reset();
    }

    fn replace(&mut self, updated: Todo) {
        if let Some(slot) = self.items.iter_mut().find(|todo| todo.id == updated.id) {
            *slot = updated;
        }
    }

    fn fail(&mut self, message: &str, err: ApiError) -> ApiError {
        tracing::warn!(error = %err, "{message}");
        self.error = Some(message.to_string());
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Priority, SortKey};
    use chrono::NaiveDate;
    use std::cell::{Cell, RefCell};

    /// In-process stand-in for the remote API.
    #[derive(Default)]
    struct FakeGateway {
        server: RefCell<Vec<Todo>>,
        calls: RefCell<Vec<String>>,
        failing: Cell<bool>,
        next_id: Cell<u32>,
    }

    impl FakeGateway {
        fn with(items: Vec<Todo>) -> Self {
            let gateway = Self::default();
            *gateway.server.borrow_mut() = items;
            gateway.next_id.set(100);
            gateway
        }

        fn record(&self, call: String) -> Result<(), ApiError> {
            self.calls.borrow_mut().push(call);
            if self.failing.get() {
                return Err(ApiError::Transport("connection refused".to_string()));
            }
            Ok(())
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }

        fn find(&self, id: &str) -> Result<Todo, ApiError> {
            self.server
                .borrow()
                .iter()
                .find(|t| t.id == id)
                .cloned()
                .ok_or(ApiError::Status {
                    status: 404,
                    body: String::new(),
                })
        }
    }

    impl TodoGateway for FakeGateway {
        fn list(&self, completed: Option<bool>) -> Result<Vec<Todo>, ApiError> {
            self.record(format!("list {completed:?}"))?;
            Ok(self.server.borrow().clone())
        }

        fn get(&self, id: &str) -> Result<Todo, ApiError> {
            self.record(format!("get {id}"))?;
            self.find(id)
        }

        fn create(&self, request: &TodoRequest) -> Result<Todo, ApiError> {
            self.record(format!("create {}", request.title))?;
            let id = self.next_id.get();
            self.next_id.set(id + 1);
            let mut todo = todo(&id.to_string(), &request.title, false);
            apply(&mut todo, request);
            self.server.borrow_mut().insert(0, todo.clone());
            Ok(todo)
        }

        fn update(&self, id: &str, request: &TodoRequest) -> Result<Todo, ApiError> {
            self.record(format!("update {id}"))?;
            let mut todo = self.find(id)?;
            apply(&mut todo, request);
            todo.updated_at = Some(now());
            self.store(&todo);
            Ok(todo)
        }

        fn toggle(&self, id: &str) -> Result<Todo, ApiError> {
            self.record(format!("toggle {id}"))?;
            let mut todo = self.find(id)?;
            todo.completed = !todo.completed;
            self.store(&todo);
            Ok(todo)
        }

        fn delete(&self, id: &str) -> Result<(), ApiError> {
            self.record(format!("delete {id}"))?;
            self.server.borrow_mut().retain(|t| t.id != id);
            Ok(())
        }
    }

    impl FakeGateway {
        fn store(&self, todo: &Todo) {
            if let Some(slot) = self.server.borrow_mut().iter_mut().find(|t| t.id == todo.id) {
                *slot = todo.clone();
            }
        }
    }

    fn apply(todo: &mut Todo, request: &TodoRequest) {
        todo.title = request.title.clone();
        todo.description = request.description.clone();
        todo.due_date = request.due_date;
        todo.priority = request.priority;
        todo.category = request.category;
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 15)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .unwrap()
    }

    fn todo(id: &str, title: &str, completed: bool) -> Todo {
        Todo {
            id: id.to_string(),
            title: title.to_string(),
            description: None,
            completed,
            priority: Priority::Medium,
            category: Category::Personal,
            due_date: None,
            created_at: now(),
            updated_at: None,
        }
    }

    fn request(title: &str) -> TodoRequest {
        TodoRequest {
            title: title.to_string(),
            description: None,
            due_date: None,
            priority: Priority::High,
            category: Category::Work,
        }
    }

    fn loaded(gateway: &FakeGateway) -> TodoList {
        let mut list = TodoList::new();
        list.refresh(gateway).unwrap();
        list
    }

    #[test]
    fn refresh_replaces_collection_and_clears_loading() {
        let gateway = FakeGateway::with(vec![todo("1", "Buy milk", false), todo("2", "Pay rent", true)]);
        let mut list = TodoList::new();
        list.mark_loading();

        list.refresh(&gateway).unwrap();
        assert_eq!(list.items().len(), 2);
        assert!(!list.is_loading());
        assert_eq!(list.error(), None);
        assert_eq!(gateway.calls(), vec!["list None"]);
    }

    #[test]
    fn failed_refresh_keeps_previous_collection() {
        let gateway = FakeGateway::with(vec![todo("1", "Buy milk", false)]);
        let mut list = loaded(&gateway);

        gateway.failing.set(true);
        assert!(list.refresh(&gateway).is_err());
        assert_eq!(list.items().len(), 1);
        assert_eq!(list.error(), Some(FETCH_FAILED));
        assert!(!list.is_loading());
    }

    #[test]
    fn create_on_empty_collection_lands_at_index_zero() {
        let gateway = FakeGateway::with(Vec::new());
        let mut list = loaded(&gateway);
        list.open_create();

        list.create(&gateway, &request("Buy milk")).unwrap();
        assert_eq!(list.items().len(), 1);
        assert_eq!(list.items()[0].title, "Buy milk");
        assert!(!list.form.open);
        assert_eq!(list.error(), None);
    }

    #[test]
    fn created_item_heads_the_date_sorted_view() {
        let gateway = FakeGateway::with(Vec::new());
        let mut list = loaded(&gateway);
        let request = TodoRequest {
            title: "Pay rent".to_string(),
            description: None,
            due_date: None,
            priority: Priority::High,
            category: Category::Finance,
        };

        list.create(&gateway, &request).unwrap();
        assert_eq!(list.filter.sort, SortKey::Date);
        let view = list.derive_view();
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].title, "Pay rent");
        assert_eq!(view[0].priority, Priority::High);
        assert_eq!(view[0].category, Category::Finance);
        assert!(!view[0].completed);
    }

    #[test]
    fn create_prepends_to_existing_items() {
        let gateway = FakeGateway::with(vec![todo("1", "Old", false)]);
        let mut list = loaded(&gateway);

        list.create(&gateway, &request("New")).unwrap();
        let titles: Vec<&str> = list.items().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["New", "Old"]);
    }

    #[test]
    fn failed_create_keeps_form_open() {
        let gateway = FakeGateway::with(Vec::new());
        let mut list = loaded(&gateway);
        list.open_create();
        list.form.draft.title = "Buy milk".to_string();

        gateway.failing.set(true);
        assert!(list.submit_form(&gateway, now()).is_err());
        assert!(list.form.open);
        assert_eq!(list.form.draft.title, "Buy milk");
        assert_eq!(list.error(), Some(CREATE_FAILED));
        assert!(list.items().is_empty());
    }

    #[test]
    fn toggle_failure_leaves_item_unchanged() {
        let gateway = FakeGateway::with(vec![todo("1", "Buy milk", false)]);
        let mut list = loaded(&gateway);

        gateway.failing.set(true);
        assert!(list.toggle(&gateway, "1").is_err());
        assert!(!list.items()[0].completed);
        assert_eq!(list.error(), Some(TOGGLE_FAILED));
    }

    #[test]
    fn successful_mutation_clears_previous_error() {
        let gateway = FakeGateway::with(vec![todo("1", "Buy milk", false)]);
        let mut list = loaded(&gateway);

        gateway.failing.set(true);
        let _ = list.toggle(&gateway, "1");
        gateway.failing.set(false);
        list.toggle(&gateway, "1").unwrap();
        assert!(list.items()[0].completed);
        assert_eq!(list.error(), None);
    }

    #[test]
    fn declined_removal_never_reaches_gateway() {
        let gateway = FakeGateway::with(vec![todo("1", "Buy milk", false)]);
        let mut list = loaded(&gateway);
        assert!(list.mark_busy("1"));

        list.remove(&gateway, "1", Confirmation::Declined).unwrap();
        assert_eq!(gateway.calls(), vec!["list None"]);
        assert_eq!(list.items().len(), 1);
        assert!(!list.is_busy("1"));
    }

    #[test]
    fn confirmed_removal_drops_item() {
        let gateway = FakeGateway::with(vec![todo("1", "Buy milk", false), todo("2", "Pay rent", false)]);
        let mut list = loaded(&gateway);

        list.remove(&gateway, "1", Confirmation::Confirmed).unwrap();
        let ids: Vec<&str> = list.items().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["2"]);
    }

    #[test]
    fn failed_removal_keeps_item() {
        let gateway = FakeGateway::with(vec![todo("1", "Buy milk", false)]);
        let mut list = loaded(&gateway);

        gateway.failing.set(true);
        assert!(list.remove(&gateway, "1", Confirmation::Confirmed).is_err());
        assert_eq!(list.items().len(), 1);
        assert_eq!(list.error(), Some(DELETE_FAILED));
    }

    #[test]
    fn create_edit_and_double_toggle_round_trip() {
        let gateway = FakeGateway::with(Vec::new());
        let mut list = loaded(&gateway);

        list.open_create();
        list.form.draft.title = "Buy milk".to_string();
        list.form.draft.due = "2025-01-20T09:30".to_string();
        list.submit_form(&gateway, now()).unwrap();
        let id = list.items()[0].id.clone();

        assert!(list.open_edit(&id));
        assert_eq!(list.form.title(), "Edit Todo");
        assert_eq!(list.form.draft.due, "2025-01-20T09:30");
        list.form.draft.title = "Buy oat milk".to_string();
        list.submit_form(&gateway, now()).unwrap();
        assert!(!list.form.open);

        list.toggle(&gateway, &id).unwrap();
        list.toggle(&gateway, &id).unwrap();

        let todo = list.get(&id).unwrap();
        assert_eq!(todo.title, "Buy oat milk");
        assert!(!todo.completed);
        assert_eq!(list.items().len(), 1);
    }

    #[test]
    fn unchanged_update_and_double_toggle_restore_the_item() {
        let gateway = FakeGateway::with(Vec::new());
        let mut list = loaded(&gateway);
        let mut request = request("Buy milk");
        request.description = Some("2 litres".to_string());
        request.due_date =
            NaiveDate::from_ymd_opt(2025, 1, 20).and_then(|d| d.and_hms_opt(9, 30, 0));
        list.create(&gateway, &request).unwrap();
        let created = list.items()[0].clone();

        assert!(list.mark_busy(&created.id));
        list.update(&gateway, &created.id, &TodoRequest::from_todo(&created))
            .unwrap();
        list.toggle(&gateway, &created.id).unwrap();
        list.toggle(&gateway, &created.id).unwrap();

        let after = list.get(&created.id).unwrap().clone();
        assert!(after.updated_at.is_some());
        assert_eq!(
            Todo {
                updated_at: created.updated_at,
                ..after
            },
            created
        );
        assert_eq!(list.items().len(), 1);
        assert!(!list.is_busy(&created.id));
    }

    #[test]
    fn invalid_draft_is_rejected_before_the_gateway() {
        let gateway = FakeGateway::with(Vec::new());
        let mut list = loaded(&gateway);
        list.open_create();

        let err = list.submit_form(&gateway, now()).unwrap_err();
        assert!(matches!(err, SubmitError::Draft(DraftError::EmptyTitle)));
        assert_eq!(gateway.calls(), vec!["list None"]);
        assert!(list.form.open);
    }

    #[test]
    fn busy_reservation_blocks_duplicates_until_completion() {
        let gateway = FakeGateway::with(vec![todo("1", "Buy milk", false)]);
        let mut list = loaded(&gateway);

        assert!(list.mark_busy("1"));
        assert!(!list.mark_busy("1"));
        list.toggle(&gateway, "1").unwrap();
        assert!(!list.is_busy("1"));
        assert!(list.mark_busy("1"));
    }

    #[test]
    fn stats_ignore_filters() {
        let gateway = FakeGateway::with(vec![
            todo("1", "a", false),
            todo("2", "b", true),
            todo("3", "c", false),
        ]);
        let mut list = loaded(&gateway);
        list.filter.completion = CompletionFilter::Completed;

        assert_eq!(
            list.stats(),
            Stats {
                total: 3,
                active: 2,
                completed: 1
            }
        );
        assert_eq!(list.derive_view().len(), 1);
    }

    #[test]
    fn clear_filters_keeps_sort() {
        let mut list = TodoList::new();
        assert!(!list.has_active_filters());

        list.filter.sort = SortKey::Title;
        assert!(!list.has_active_filters());

        list.filter.query = "milk".to_string();
        list.filter.category = Some(Category::Shopping);
        assert!(list.has_active_filters());

        list.clear_filters();
        assert!(!list.has_active_filters());
        assert_eq!(list.filter.sort, SortKey::Title);
    }

    #[test]
    fn open_edit_of_unknown_id_is_refused() {
        let mut list = TodoList::new();
        assert!(!list.open_edit("nope"));
        assert!(!list.form.open);
    }
}
