use crate::{
    api::{ApiError, ErrorKind},
    app::{App, Request},
    models::InputMode,
    todos::{Confirmation, Submission},
};
use chrono::Local;

pub fn tick(app: &mut App) {
    run_next_request(app);

    if let Some(expiry) = app.toast_expiry
        && Local::now() >= expiry
    {
        app.toast_expiry = None;
        app.toast_message = None;
    }
}

/// Runs at most one queued request. The call blocks; the caller has already drawn the
/// pending state.
fn run_next_request(app: &mut App) {
    let Some(request) = app.queue.pop_front() else {
        return;
    };

    match request {
        Request::Refresh => {
            let result = app.todos.refresh(app.todo_gateway.as_ref());
            note_auth_failure(app, result);
            app.clamp_selection();
        }
        Request::Toggle(id) => {
            let result = app.todos.toggle(app.todo_gateway.as_ref(), &id);
            note_auth_failure(app, result);
            app.select_id(&id);
        }
        Request::Delete(id) => {
            let result = app
                .todos
                .remove(app.todo_gateway.as_ref(), &id, Confirmation::Confirmed);
            if result.is_ok() {
                app.toast("Todo deleted.");
            }
            note_auth_failure(app, result);
            app.clamp_selection();
        }
        Request::Submit(submission) => {
            let result = app.todos.submit(app.todo_gateway.as_ref(), &submission);
            if result.is_ok() {
                finish_submission(app, &submission);
            }
            note_auth_failure(app, result);
        }
        Request::Login(credentials) => {
            let outcome = app
                .session
                .login(app.auth_gateway.as_ref(), &credentials)
                .map(|user| user.username.clone());
            finish_sign_in(app, outcome);
        }
        Request::Register(data) => {
            let outcome = app
                .session
                .register(app.auth_gateway.as_ref(), &data)
                .map(|user| user.username.clone());
            finish_sign_in(app, outcome);
        }
    }
}

fn finish_submission(app: &mut App, submission: &Submission) {
    let selected = match submission {
        Submission::Create(_) => {
            app.toast("Todo created.");
            app.todos.items().first().map(|todo| todo.id.clone())
        }
        Submission::Update(id, _) => {
            app.toast("Todo updated.");
            Some(id.clone())
        }
    };
    if app.input_mode == InputMode::Form {
        app.transition_to(InputMode::Navigate);
    }
    match selected {
        Some(id) => app.select_id(&id),
        None => app.clamp_selection(),
    }
}

fn finish_sign_in(app: &mut App, outcome: Result<String, ApiError>) {
    match outcome {
        Ok(username) => {
            app.todos.reset();
            app.session_notice = None;
            app.transition_to(InputMode::Navigate);
            app.enqueue(Request::Refresh);
            app.toast(format!("Welcome, {username}!"));
        }
        Err(e) => {
            tracing::warn!(error = %e, "sign-in failed");
            app.login.error = Some(sign_in_failure(&e));
        }
    }
}

fn sign_in_failure(err: &ApiError) -> String {
    match (err.kind(), err) {
        (ErrorKind::Authentication, _) => "Invalid username or password.".to_string(),
        (ErrorKind::Network, _) => "Cannot reach the server.".to_string(),
        (ErrorKind::Validation, ApiError::Status { body, .. }) if !body.is_empty() => {
            format!("Rejected: {body}")
        }
        _ => format!("Sign-in failed ({err})."),
    }
}

/// A rejected or missing credential is not retried; the user is pointed at sign-in.
fn note_auth_failure(app: &mut App, result: Result<(), ApiError>) {
    if let Err(e) = result
        && e.kind() == ErrorKind::Authentication
    {
        let key = app
            .config
            .keybindings
            .global
            .logout
            .first()
            .cloned()
            .unwrap_or_else(|| "logout".to_string());
        app.session_notice = Some(format!("Session rejected. Press {key} to sign in again."));
    }
}
