use crate::{
    app::{App, Request},
    models::{
        Category, FormField, InputMode, LoginField, LoginMode, LoginRequest, Priority,
        RegisterRequest, cycle_option, step,
    },
    todos::Confirmation,
};
use chrono::Local;

/// Filter cycling order, most urgent first.
const PRIORITY_FILTER_ORDER: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

pub fn refresh(app: &mut App) {
    if !app.enqueue(Request::Refresh) {
        app.toast("Already refreshing.");
    }
}

pub fn toggle_selected(app: &mut App) {
    let Some(id) = app.selected_id() else {
        app.toast("No todo selected.");
        return;
    };
    app.enqueue(Request::Toggle(id));
}

pub fn open_create_form(app: &mut App) {
    app.todos.open_create();
    app.load_form_inputs();
    app.transition_to(InputMode::Form);
}

pub fn open_edit_form(app: &mut App) {
    let Some(id) = app.selected_id() else {
        app.toast("No todo selected.");
        return;
    };
    if app.todos.is_busy(&id) {
        app.toast("Still working on that todo.");
        return;
    }
    if app.todos.open_edit(&id) {
        app.load_form_inputs();
        app.transition_to(InputMode::Form);
    }
}

pub fn cancel_form(app: &mut App) {
    app.todos.close_form();
    app.transition_to(InputMode::Navigate);
}

/// Validates locally, then queues the create or update. The form stays open until the
/// server answers.
pub fn submit_form(app: &mut App) {
    app.store_form_inputs();
    match app.todos.prepare_submission(Local::now().naive_local()) {
        Ok(submission) => {
            app.enqueue(Request::Submit(submission));
        }
        Err(e) => app.toast(e.to_string()),
    }
}

pub fn cycle_form_choice(app: &mut App, forward: bool) {
    let delta = if forward { 1 } else { -1 };
    let draft = &mut app.todos.form.draft;
    match app.form_focus {
        FormField::Priority => {
            draft.priority = step(&Priority::all(), draft.priority, delta);
        }
        FormField::Category => {
            draft.category = step(&Category::all(), draft.category, delta);
        }
        _ => {}
    }
}

/// Reserves the selected item and opens the confirmation prompt.
pub fn request_delete(app: &mut App) {
    let Some(id) = app.selected_id() else {
        app.toast("No todo selected.");
        return;
    };
    if !app.todos.mark_busy(&id) {
        app.toast("Still working on that todo.");
        return;
    }
    app.delete_target = Some(id);
}

pub fn confirm_delete(app: &mut App) {
    if let Some(id) = app.delete_target.take() {
        app.enqueue_reserved_delete(id);
    }
}

pub fn decline_delete(app: &mut App) {
    if let Some(id) = app.delete_target.take() {
        // Declining never reaches the gateway; this only releases the reservation.
        let _ = app
            .todos
            .remove(app.todo_gateway.as_ref(), &id, Confirmation::Declined);
    }
}

pub fn cycle_completion_filter(app: &mut App) {
    app.todos.filter.completion = app.todos.filter.completion.next();
    app.clamp_selection();
}

pub fn cycle_priority_filter(app: &mut App) {
    app.todos.filter.priority = cycle_option(app.todos.filter.priority, &PRIORITY_FILTER_ORDER);
    app.clamp_selection();
}

pub fn cycle_category_filter(app: &mut App) {
    app.todos.filter.category = cycle_option(app.todos.filter.category, &Category::all());
    app.clamp_selection();
}

pub fn cycle_sort(app: &mut App) {
    let selected = app.selected_id();
    app.todos.filter.sort = app.todos.filter.sort.next();
    match selected {
        Some(id) => app.select_id(&id),
        None => app.clamp_selection(),
    }
}

pub fn clear_filters(app: &mut App) {
    if !app.todos.has_active_filters() {
        return;
    }
    app.todos.clear_filters();
    app.clamp_selection();
    app.toast("Filters cleared.");
}

/// Applies the search box as the text filter on every keystroke.
pub fn apply_search(app: &mut App) {
    app.todos.filter.query = app.search_input.lines().join("");
    app.clamp_selection();
}

pub fn clear_search(app: &mut App) {
    app.todos.filter.query.clear();
    app.clamp_selection();
}

pub fn submit_login(app: &mut App) {
    let username = app.login.value(LoginField::Username).trim().to_string();
    let password = app.login.value(LoginField::Password);
    if username.is_empty() || password.is_empty() {
        app.login.error = Some("Username and password are required.".to_string());
        return;
    }

    let request = match app.login.mode {
        LoginMode::SignIn => Request::Login(LoginRequest { username, password }),
        LoginMode::Register => {
            let email = app.login.value(LoginField::Email).trim().to_string();
            if email.is_empty() {
                app.login.error = Some("Email is required to register.".to_string());
                return;
            }
            Request::Register(RegisterRequest {
                username,
                email,
                password,
            })
        }
    };
    app.login.error = None;
    app.enqueue(request);
}

pub fn switch_login_mode(app: &mut App) {
    app.login.mode = match app.login.mode {
        LoginMode::SignIn => LoginMode::Register,
        LoginMode::Register => LoginMode::SignIn,
    };
    app.login.focus = LoginField::Username;
    app.login.error = None;
}

pub fn move_login_focus(app: &mut App, forward: bool) {
    let order = LoginField::order(app.login.mode);
    let delta = if forward { 1 } else { -1 };
    app.login.focus = step(order, app.login.focus, delta);
}

/// Ends the session locally. No server call.
pub fn logout(app: &mut App) {
    app.session.logout();
    app.todos.reset();
    app.queue.clear();
    app.list_state.select(None);
    app.delete_target = None;
    app.session_notice = None;
    app.transition_to(InputMode::Login);
    app.toast("Signed out.");
}
