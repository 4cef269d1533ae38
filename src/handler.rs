use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use crate::app::{App, InputMode};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => {}
        AppEvent::Tick => {
            app.tick_animation();
            app.poll_completion().await;
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Abort an in-flight request
        KeyCode::Esc => app.cancel_request(),

        // Back to typing
        KeyCode::Char('i') | KeyCode::Char('/') => {
            app.input_mode = InputMode::Editing;
            app.draft_cursor = app.draft.chars().count();
        }

        // Chat scrolling
        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(1),
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_down(app.chat_height / 2);
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_up(app.chat_height / 2);
        }
        KeyCode::Char('g') => app.scroll_to_top(),
        KeyCode::Char('G') => app.scroll_to_bottom(),

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            app.submit();
        }
        KeyCode::Backspace => {
            if app.draft_cursor > 0 {
                app.draft_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.draft, app.draft_cursor);
                app.draft.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.draft.chars().count();
            if app.draft_cursor < char_count {
                let byte_pos = char_to_byte_index(&app.draft, app.draft_cursor);
                app.draft.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.draft_cursor = app.draft_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.draft.chars().count();
            app.draft_cursor = (app.draft_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.draft_cursor = 0;
        }
        KeyCode::End => {
            app.draft_cursor = app.draft.chars().count();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.draft, app.draft_cursor);
            app.draft.insert(byte_pos, c);
            app.draft_cursor += 1;
        }
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollDown => app.scroll_down(3),
        MouseEventKind::ScrollUp => app.scroll_up(3),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Role;
    use crate::completion::CompletionService;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct Echo;

    #[async_trait]
    impl CompletionService for Echo {
        async fn generate(&self, prompt: &str) -> Result<String> {
            Ok(format!("echo: {prompt}"))
        }
    }

    fn test_app() -> App {
        App::new(Arc::new(Echo), "test-model".to_string())
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_key(app, press(KeyCode::Char(c)));
        }
    }

    #[tokio::test]
    async fn typing_updates_the_draft_at_the_cursor() {
        let mut app = test_app();
        type_text(&mut app, "helo");
        handle_key(&mut app, press(KeyCode::Left));
        handle_key(&mut app, press(KeyCode::Char('l')));
        assert_eq!(app.draft, "hello");
        assert_eq!(app.draft_cursor, 4);
    }

    #[tokio::test]
    async fn backspace_is_utf8_safe() {
        let mut app = test_app();
        type_text(&mut app, "héllo ✓");
        handle_key(&mut app, press(KeyCode::Backspace));
        assert_eq!(app.draft, "héllo ");
        handle_key(&mut app, press(KeyCode::Home));
        handle_key(&mut app, press(KeyCode::Delete));
        assert_eq!(app.draft, "éllo ");
    }

    #[tokio::test]
    async fn enter_submits_the_draft() {
        let mut app = test_app();
        type_text(&mut app, "Hello *world*");
        handle_key(&mut app, press(KeyCode::Enter));

        assert_eq!(app.history.len(), 1);
        assert_eq!(app.history[0].role, Role::User);
        assert_eq!(app.history[0].text, "Hello *world*");
        assert!(app.pending);
        assert!(app.draft.is_empty());

        app.cancel_request();
    }

    #[tokio::test]
    async fn enter_on_blank_draft_does_nothing() {
        let mut app = test_app();
        type_text(&mut app, "   ");
        handle_key(&mut app, press(KeyCode::Enter));
        assert!(app.history.is_empty());
        assert!(!app.pending);
    }

    #[tokio::test]
    async fn esc_switches_modes_and_cancels_requests() {
        let mut app = test_app();
        assert_eq!(app.input_mode, InputMode::Editing);
        handle_key(&mut app, press(KeyCode::Esc));
        assert_eq!(app.input_mode, InputMode::Normal);

        handle_key(&mut app, press(KeyCode::Char('x')));
        assert!(app.draft.is_empty());

        handle_key(&mut app, press(KeyCode::Char('i')));
        assert_eq!(app.input_mode, InputMode::Editing);
        type_text(&mut app, "hi");
        handle_key(&mut app, press(KeyCode::Enter));
        handle_key(&mut app, press(KeyCode::Esc));
        handle_key(&mut app, press(KeyCode::Esc));
        assert!(!app.pending);
        assert_eq!(app.history.last().map(|m| m.role), Some(Role::Error));
    }

    #[tokio::test]
    async fn ctrl_c_quits_from_any_mode() {
        let mut app = test_app();
        handle_key(
            &mut app,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        assert!(app.should_quit);
    }
}
