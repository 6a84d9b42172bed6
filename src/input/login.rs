use crate::{actions, app::App, config::key_match};
use crossterm::event::KeyEvent;

pub fn handle_login_mode(app: &mut App, key: KeyEvent) {
    if key_match(&key, &app.config.keybindings.login.quit) {
        app.quit();
    } else if key_match(&key, &app.config.keybindings.login.submit) {
        actions::submit_login(app);
    } else if key_match(&key, &app.config.keybindings.login.switch_mode) {
        actions::switch_login_mode(app);
    } else if key_match(&key, &app.config.keybindings.login.next_field) {
        actions::move_login_focus(app, true);
    } else if key_match(&key, &app.config.keybindings.login.prev_field) {
        actions::move_login_focus(app, false);
    } else {
        let focus = app.login.focus;
        if app.login.input_mut(focus).input(key) {
            app.login.error = None;
        }
    }
}
