use crate::{actions, app::App, config::key_match, models::InputMode};
use crossterm::event::KeyEvent;

pub fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    let kb = &app.config.keybindings;

    if key_match(&key, &kb.global.help) {
        app.show_help_popup = true;
    } else if key_match(&key, &kb.global.quit) {
        app.quit();
    } else if key_match(&key, &kb.global.logout) {
        actions::logout(app);
    } else if key_match(&key, &kb.global.refresh) {
        actions::refresh(app);
    } else if key_match(&key, &kb.global.search) {
        app.transition_to(InputMode::Search);
    } else if key_match(&key, &kb.list.up) {
        app.select_prev();
    } else if key_match(&key, &kb.list.down) {
        app.select_next();
    } else if key_match(&key, &kb.list.top) {
        app.select_first();
    } else if key_match(&key, &kb.list.bottom) {
        app.select_last();
    } else if key_match(&key, &kb.list.toggle) {
        actions::toggle_selected(app);
    } else if key_match(&key, &kb.list.new) {
        actions::open_create_form(app);
    } else if key_match(&key, &kb.list.edit) {
        actions::open_edit_form(app);
    } else if key_match(&key, &kb.list.delete) {
        actions::request_delete(app);
    } else if key_match(&key, &kb.list.details) {
        if app.selected_id().is_some() {
            app.show_details_popup = true;
        }
    } else if key_match(&key, &kb.list.completion_filter) {
        actions::cycle_completion_filter(app);
    } else if key_match(&key, &kb.list.priority_filter) {
        actions::cycle_priority_filter(app);
    } else if key_match(&key, &kb.list.category_filter) {
        actions::cycle_category_filter(app);
    } else if key_match(&key, &kb.list.sort) {
        actions::cycle_sort(app);
    } else if key_match(&key, &kb.list.clear_filters) {
        if app.todos.error().is_some() {
            app.todos.dismiss_error();
        } else {
            actions::clear_filters(app);
        }
    }
}
