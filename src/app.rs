use crate::api::auth::{AuthGateway, HttpAuthGateway};
use crate::api::todos::{HttpTodoGateway, TodoGateway};
use crate::api::{ApiClient, ApiError};
use crate::config::Config;
use crate::models::{
    FormField, InputMode, LoginField, LoginMode, LoginRequest, RegisterRequest,
};
use crate::session::{FileTokenStore, SessionStore, TokenStore};
use crate::todos::{Submission, TodoList};
use chrono::{DateTime, Duration, Local};
use ratatui::widgets::ListState;
use std::collections::VecDeque;
use std::rc::Rc;
use tui_textarea::{CursorMove, TextArea};

const PLACEHOLDER_SEARCH: &str = "Search todos...";
const PLACEHOLDER_TITLE: &str = "Enter todo title";
const PLACEHOLDER_DESCRIPTION: &str = "Enter todo description (optional)";
const PLACEHOLDER_DUE: &str = "YYYY-MM-DDTHH:MM, tomorrow, +3d, fri 18:00";
const PASSWORD_MASK: char = '•';

/// Work that needs the network. Queued by key handlers, run one per frame by
/// `runtime::tick` so the loading state is on screen while the call blocks.
#[derive(Clone, Debug, PartialEq)]
pub enum Request {
    Refresh,
    Submit(Submission),
    Toggle(String),
    Delete(String),
    Login(LoginRequest),
    Register(RegisterRequest),
}

impl Request {
    /// The item this request reserves, if any.
    pub fn target(&self) -> Option<&str> {
        match self {
            Request::Submit(submission) => submission.target(),
            Request::Toggle(id) | Request::Delete(id) => Some(id),
            _ => None,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Request::Refresh => "Loading todos...",
            Request::Submit(Submission::Create(_)) => "Creating todo...",
            Request::Submit(Submission::Update(..)) => "Saving todo...",
            Request::Toggle(_) => "Updating todo...",
            Request::Delete(_) => "Deleting todo...",
            Request::Login(_) => "Signing in...",
            Request::Register(_) => "Creating account...",
        }
    }
}

pub struct LoginForm<'a> {
    pub mode: LoginMode,
    pub focus: LoginField,
    pub username: TextArea<'a>,
    pub email: TextArea<'a>,
    pub password: TextArea<'a>,
    pub error: Option<String>,
}

impl<'a> Default for LoginForm<'a> {
    fn default() -> Self {
        let mut password = TextArea::default();
        password.set_mask_char(PASSWORD_MASK);
        Self {
            mode: LoginMode::SignIn,
            focus: LoginField::Username,
            username: TextArea::default(),
            email: TextArea::default(),
            password,
            error: None,
        }
    }
}

impl<'a> LoginForm<'a> {
    pub fn input_mut(&mut self, field: LoginField) -> &mut TextArea<'a> {
        match field {
            LoginField::Username => &mut self.username,
            LoginField::Email => &mut self.email,
            LoginField::Password => &mut self.password,
        }
    }

    pub fn input(&self, field: LoginField) -> &TextArea<'a> {
        match field {
            LoginField::Username => &self.username,
            LoginField::Email => &self.email,
            LoginField::Password => &self.password,
        }
    }

    pub fn value(&self, field: LoginField) -> String {
        self.input(field).lines().join("")
    }
}

pub struct App<'a> {
    pub input_mode: InputMode,
    pub config: Config,
    pub session: SessionStore,
    pub todos: TodoList,
    pub todo_gateway: Box<dyn TodoGateway>,
    pub auth_gateway: Box<dyn AuthGateway>,
    pub list_state: ListState,

    pub search_input: TextArea<'a>,
    pub title_input: TextArea<'a>,
    pub description_input: TextArea<'a>,
    pub due_input: TextArea<'a>,
    pub form_focus: FormField,
    pub login: LoginForm<'a>,

    pub show_help_popup: bool,
    pub show_details_popup: bool,
    /// Item awaiting the delete confirmation. Reserved in the busy set while set.
    pub delete_target: Option<String>,

    pub queue: VecDeque<Request>,
    pub session_notice: Option<String>,
    pub toast_message: Option<String>,
    pub toast_expiry: Option<DateTime<Local>>,
    pub should_quit: bool,
}

impl<'a> App<'a> {
    pub fn new(config: Config) -> Result<App<'a>, ApiError> {
        let client = ApiClient::new(&config.api)?;
        let tokens: Rc<dyn TokenStore> = Rc::new(FileTokenStore::new(config.data.token_path()));
        let todo_gateway = Box::new(HttpTodoGateway::new(client.clone(), tokens.clone()));
        let auth_gateway = Box::new(HttpAuthGateway::new(client));
        Ok(App::with_parts(config, tokens, todo_gateway, auth_gateway))
    }

    pub fn with_parts(
        config: Config,
        tokens: Rc<dyn TokenStore>,
        todo_gateway: Box<dyn TodoGateway>,
        auth_gateway: Box<dyn AuthGateway>,
    ) -> App<'a> {
        let session = SessionStore::new(tokens);
        let mut search_input = TextArea::default();
        search_input.set_placeholder_text(PLACEHOLDER_SEARCH);

        let mut app = App {
            input_mode: InputMode::Login,
            config,
            session,
            todos: TodoList::new(),
            todo_gateway,
            auth_gateway,
            list_state: ListState::default(),
            search_input,
            title_input: TextArea::default(),
            description_input: TextArea::default(),
            due_input: TextArea::default(),
            form_focus: FormField::Title,
            login: LoginForm::default(),
            show_help_popup: false,
            show_details_popup: false,
            delete_target: None,
            queue: VecDeque::new(),
            session_notice: None,
            toast_message: None,
            toast_expiry: None,
            should_quit: false,
        };

        // A credential left over from an earlier run is trusted until the server says otherwise.
        if app.session.is_authenticated() {
            app.input_mode = InputMode::Navigate;
            app.enqueue(Request::Refresh);
        }
        app
    }

    /// Queues `request` unless it would duplicate pending work. Returns whether it was queued.
    pub fn enqueue(&mut self, request: Request) -> bool {
        if let Some(id) = request.target() {
            if !self.todos.mark_busy(id) {
                self.toast("Still working on that todo.");
                return false;
            }
        } else if self.queue.iter().any(|queued| {
            queued.target().is_none()
                && std::mem::discriminant(queued) == std::mem::discriminant(&request)
        }) {
            return false;
        }

        if request == Request::Refresh {
            self.todos.mark_loading();
        }
        tracing::debug!(action = request.describe(), "queued");
        self.queue.push_back(request);
        true
    }

    /// Queues a delete for an id already reserved by the confirmation prompt.
    pub fn enqueue_reserved_delete(&mut self, id: String) {
        self.queue.push_back(Request::Delete(id));
    }

    pub fn pending_label(&self) -> Option<&'static str> {
        self.queue.front().map(Request::describe)
    }

    pub fn toast(&mut self, message: impl Into<String>) {
        self.toast_message = Some(message.into());
        self.toast_expiry = Some(Local::now() + Duration::seconds(3));
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn selected_id(&self) -> Option<String> {
        let index = self.list_state.selected()?;
        self.todos
            .derive_view()
            .get(index)
            .map(|todo| todo.id.clone())
    }

    /// Keeps the selection inside the current view after any change to items or filters.
    pub fn clamp_selection(&mut self) {
        let len = self.todos.derive_view().len();
        if len == 0 {
            self.list_state.select(None);
            return;
        }
        let index = self.list_state.selected().unwrap_or(0).min(len - 1);
        self.list_state.select(Some(index));
    }

    /// Selects `id` if it is visible, otherwise clamps.
    pub fn select_id(&mut self, id: &str) {
        let position = self
            .todos
            .derive_view()
            .iter()
            .position(|todo| todo.id == id);
        match position {
            Some(index) => self.list_state.select(Some(index)),
            None => self.clamp_selection(),
        }
    }

    pub fn select_next(&mut self) {
        let len = self.todos.derive_view().len();
        if len == 0 {
            return;
        }
        let index = match self.list_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            Some(i) => i,
            None => 0,
        };
        self.list_state.select(Some(index));
    }

    pub fn select_prev(&mut self) {
        if self.todos.derive_view().is_empty() {
            return;
        }
        let index = self.list_state.selected().map_or(0, |i| i.saturating_sub(1));
        self.list_state.select(Some(index));
    }

    pub fn select_first(&mut self) {
        if !self.todos.derive_view().is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        let len = self.todos.derive_view().len();
        if len > 0 {
            self.list_state.select(Some(len - 1));
        }
    }

    /// Copies the draft into the form inputs. Call after opening the form.
    pub fn load_form_inputs(&mut self) {
        let draft = &self.todos.form.draft;
        self.title_input = single_line(&draft.title, PLACEHOLDER_TITLE);
        self.description_input = single_line(&draft.description, PLACEHOLDER_DESCRIPTION);
        self.due_input = single_line(&draft.due, PLACEHOLDER_DUE);
        self.form_focus = FormField::Title;
    }

    /// Copies the typed text back into the draft before validation.
    pub fn store_form_inputs(&mut self) {
        let draft = &mut self.todos.form.draft;
        draft.title = self.title_input.lines().join("");
        draft.description = self.description_input.lines().join("");
        draft.due = self.due_input.lines().join("");
    }

    pub fn form_input_mut(&mut self, field: FormField) -> Option<&mut TextArea<'a>> {
        match field {
            FormField::Title => Some(&mut self.title_input),
            FormField::Description => Some(&mut self.description_input),
            FormField::Due => Some(&mut self.due_input),
            FormField::Priority | FormField::Category => None,
        }
    }

    pub fn transition_to(&mut self, mode: InputMode) {
        match mode {
            InputMode::Search => {
                self.search_input = single_line(&self.todos.filter.query, PLACEHOLDER_SEARCH);
            }
            InputMode::Login => {
                self.login = LoginForm::default();
                self.show_help_popup = false;
                self.show_details_popup = false;
            }
            InputMode::Navigate | InputMode::Form => {}
        }
        self.input_mode = mode;
    }
}

fn single_line<'a>(text: &str, placeholder: &str) -> TextArea<'a> {
    let mut input = TextArea::from([text.to_string()]);
    input.set_placeholder_text(placeholder);
    input.move_cursor(CursorMove::End);
    input
}
