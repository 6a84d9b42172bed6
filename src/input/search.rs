use crate::{actions, app::App, config::key_match, models::InputMode};
use crossterm::event::KeyEvent;

pub fn handle_search_mode(app: &mut App, key: KeyEvent) {
    if key_match(&key, &app.config.keybindings.search.cancel) {
        actions::clear_search(app);
        app.transition_to(InputMode::Navigate);
    } else if key_match(&key, &app.config.keybindings.search.clear) {
        actions::clear_search(app);
        app.transition_to(InputMode::Search);
    } else if key_match(&key, &app.config.keybindings.search.submit) {
        actions::apply_search(app);
        app.transition_to(InputMode::Navigate);
    } else if app.search_input.input(key) {
        actions::apply_search(app);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::{make_test_app, sample_todo};
    use crate::input::tests::press;
    use crate::runtime;
    use crossterm::event::KeyCode;

    #[test]
    fn typing_filters_live_and_escape_clears() {
        let (mut app, _) = make_test_app(
            true,
            vec![sample_todo("1", "Buy milk"), sample_todo("2", "Pay rent")],
        );
        runtime::tick(&mut app);
        app.transition_to(InputMode::Search);

        for c in "RENT".chars() {
            handle_search_mode(&mut app, press(KeyCode::Char(c)));
        }
        assert_eq!(app.todos.filter.query, "RENT");
        assert_eq!(app.todos.derive_view().len(), 1);
        assert_eq!(app.selected_id().as_deref(), Some("2"));

        handle_search_mode(&mut app, press(KeyCode::Esc));
        assert_eq!(app.input_mode, InputMode::Navigate);
        assert!(app.todos.filter.query.is_empty());
    }

    #[test]
    fn enter_keeps_the_query() {
        let (mut app, _) = make_test_app(true, Vec::new());
        app.transition_to(InputMode::Search);
        handle_search_mode(&mut app, press(KeyCode::Char('x')));
        handle_search_mode(&mut app, press(KeyCode::Enter));
        assert_eq!(app.input_mode, InputMode::Navigate);
        assert_eq!(app.todos.filter.query, "x");
    }
}
