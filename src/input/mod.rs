pub(crate) mod form;
pub(crate) mod login;
pub(crate) mod navigate;
pub(crate) mod popups;
pub(crate) mod search;

use crate::{app::App, models::InputMode};
use crossterm::event::{self, Event, KeyEventKind};

pub fn handle_event(app: &mut App, event: Event) {
    match event {
        Event::Mouse(mouse_event) if app.input_mode == InputMode::Navigate => {
            match mouse_event.kind {
                event::MouseEventKind::ScrollUp => app.select_prev(),
                event::MouseEventKind::ScrollDown => app.select_next(),
                _ => {}
            }
        }
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            if popups::handle_popup_events(app, key) {
                return;
            }
            match app.input_mode {
                InputMode::Login => login::handle_login_mode(app, key),
                InputMode::Navigate => navigate::handle_normal_mode(app, key),
                InputMode::Search => search::handle_search_mode(app, key),
                InputMode::Form => form::handle_form_mode(app, key),
            }
        }
        _ => {}
    }
}
