use crate::{actions, app::App, config::key_match, models::FormField};
use crossterm::event::KeyEvent;

pub fn handle_form_mode(app: &mut App, key: KeyEvent) {
    let focus = app.form_focus;

    if key_match(&key, &app.config.keybindings.form.cancel) {
        actions::cancel_form(app);
    } else if key_match(&key, &app.config.keybindings.form.submit) {
        actions::submit_form(app);
    } else if key_match(&key, &app.config.keybindings.form.next_field) {
        app.form_focus = focus.next();
    } else if key_match(&key, &app.config.keybindings.form.prev_field) {
        app.form_focus = focus.prev();
    } else if focus.is_choice() {
        if key_match(&key, &app.config.keybindings.form.option_next) {
            actions::cycle_form_choice(app, true);
        } else if key_match(&key, &app.config.keybindings.form.option_prev) {
            actions::cycle_form_choice(app, false);
        }
    } else if let Some(input) = app.form_input_mut(focus) {
        input.input(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::make_test_app;
    use crate::input::tests::{press, press_with};
    use crate::models::{Category, InputMode, Priority};
    use crossterm::event::{KeyCode, KeyModifiers};

    #[test]
    fn tab_walks_fields_and_arrows_cycle_choices() {
        let (mut app, _) = make_test_app(true, Vec::new());
        actions::open_create_form(&mut app);

        handle_form_mode(&mut app, press(KeyCode::Tab));
        handle_form_mode(&mut app, press(KeyCode::Tab));
        assert_eq!(app.form_focus, FormField::Priority);

        handle_form_mode(&mut app, press(KeyCode::Right));
        assert_eq!(app.todos.form.draft.priority, Priority::High);

        handle_form_mode(&mut app, press(KeyCode::Tab));
        handle_form_mode(&mut app, press(KeyCode::Left));
        assert_eq!(app.todos.form.draft.category, Category::Work);

        handle_form_mode(&mut app, press(KeyCode::BackTab));
        assert_eq!(app.form_focus, FormField::Priority);
    }

    #[test]
    fn space_types_into_text_fields() {
        let (mut app, _) = make_test_app(true, Vec::new());
        actions::open_create_form(&mut app);
        for c in "a b".chars() {
            handle_form_mode(&mut app, press(KeyCode::Char(c)));
        }
        app.store_form_inputs();
        assert_eq!(app.todos.form.draft.title, "a b");
    }

    #[test]
    fn escape_discards_the_draft() {
        let (mut app, _) = make_test_app(true, Vec::new());
        actions::open_create_form(&mut app);
        handle_form_mode(&mut app, press(KeyCode::Char('x')));
        handle_form_mode(&mut app, press(KeyCode::Esc));
        assert_eq!(app.input_mode, InputMode::Navigate);
        assert!(!app.todos.form.open);
        assert!(app.todos.form.draft.title.is_empty());
    }

    #[test]
    fn ctrl_s_submits() {
        let (mut app, _) = make_test_app(true, Vec::new());
        actions::open_create_form(&mut app);
        app.queue.clear();
        handle_form_mode(&mut app, press(KeyCode::Char('x')));
        handle_form_mode(&mut app, press_with(KeyCode::Char('s'), KeyModifiers::CONTROL));
        assert_eq!(app.queue.len(), 1);
    }
}
