use crate::{actions, app::App, config::key_match};
use crossterm::event::{KeyCode, KeyEvent};

/// Returns true when an open popup consumed the key.
pub fn handle_popup_events(app: &mut App, key: KeyEvent) -> bool {
    if app.show_help_popup {
        if key.code == KeyCode::Esc || key_match(&key, &app.config.keybindings.global.help) {
            app.show_help_popup = false;
        }
        return true;
    }
    if app.delete_target.is_some() {
        handle_delete_popup(app, key);
        return true;
    }
    if app.show_details_popup {
        handle_details_popup(app, key);
        return true;
    }
    false
}

fn handle_delete_popup(app: &mut App, key: KeyEvent) {
    if key_match(&key, &app.config.keybindings.popup.confirm) {
        actions::confirm_delete(app);
    } else if key_match(&key, &app.config.keybindings.popup.cancel) {
        actions::decline_delete(app);
    }
}

fn handle_details_popup(app: &mut App, key: KeyEvent) {
    if key_match(&key, &app.config.keybindings.popup.cancel)
        || key_match(&key, &app.config.keybindings.list.details)
    {
        app.show_details_popup = false;
    } else if key_match(&key, &app.config.keybindings.list.edit) {
        app.show_details_popup = false;
        actions::open_edit_form(app);
    } else if key_match(&key, &app.config.keybindings.list.toggle) {
        actions::toggle_selected(app);
    }
}
