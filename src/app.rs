use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::completion::CompletionService;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
    /// Failed or cancelled requests surface here instead of hanging the UI.
    Error,
}

#[derive(Debug, Clone)]
pub struct Message {
    pub role: Role,
    pub text: String,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,

    // Conversation state. `history` is append-only: messages are never
    // edited, reordered, or deleted during a session.
    pub history: Vec<Message>,
    pub draft: String,
    pub draft_cursor: usize, // char index into draft

    // In-flight request state. At most one request may be pending; while it
    // is, further submissions are rejected.
    pub pending: bool,
    pub completion_task: Option<JoinHandle<anyhow::Result<String>>>,

    // Chat viewport state, updated during render
    pub chat_scroll: u16,
    pub chat_height: u16,
    pub chat_width: u16,

    // Animation state (0-2 for the ellipsis)
    pub animation_frame: u8,

    pub model: String,
    service: Arc<dyn CompletionService>,
}

impl App {
    pub fn new(service: Arc<dyn CompletionService>, model: String) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            history: Vec::new(),
            draft: String::new(),
            draft_cursor: 0,
            pending: false,
            completion_task: None,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            animation_frame: 0,
            model,
            service,
        }
    }

    /// Send the current draft to the completion service.
    ///
    /// A whitespace-only draft is a no-op. A submission while a request is
    /// already pending is rejected and leaves the draft untouched. Otherwise
    /// the raw draft goes into history as the user message, the trimmed text
    /// goes to the service, and the viewport follows the new message.
    pub fn submit(&mut self) {
        let trimmed = self.draft.trim().to_string();
        if trimmed.is_empty() || self.completion_task.is_some() {
            return;
        }

        let raw = std::mem::take(&mut self.draft);
        self.draft_cursor = 0;
        // Pending goes first so the scroll that follows the new message
        // keeps the loading indicator inside the viewport.
        self.pending = true;
        self.push_message(Role::User, raw);

        let service = Arc::clone(&self.service);
        self.completion_task = Some(tokio::spawn(async move {
            service.generate(&trimmed).await
        }));
    }

    /// Collect the finished request, if any. Called on every tick so that
    /// `pending` can never be left stuck: success appends an assistant
    /// message, any failure appends an error message.
    pub async fn poll_completion(&mut self) {
        let finished = self
            .completion_task
            .as_ref()
            .map(|task| task.is_finished())
            .unwrap_or(false);
        if !finished {
            return;
        }

        if let Some(task) = self.completion_task.take() {
            self.pending = false;
            match task.await {
                Ok(Ok(reply)) => self.push_message(Role::Assistant, reply),
                Ok(Err(err)) => {
                    self.push_message(Role::Error, format!("Request failed: {err:#}"))
                }
                Err(err) if err.is_cancelled() => {
                    self.push_message(Role::Error, "Request cancelled".to_string())
                }
                Err(err) => self.push_message(Role::Error, format!("Request panicked: {err}")),
            }
        }
    }

    /// Abort the in-flight request. The user message stays in history; a
    /// cancellation entry records that no reply is coming.
    pub fn cancel_request(&mut self) {
        if let Some(task) = self.completion_task.take() {
            task.abort();
            self.pending = false;
            self.push_message(Role::Error, "Request cancelled".to_string());
        }
    }

    fn push_message(&mut self, role: Role, text: String) {
        self.history.push(Message { role, text });
        self.scroll_to_bottom();
    }

    /// Pin the viewport to the newest message, accounting for line wrapping
    /// and the loading indicator.
    pub fn scroll_to_bottom(&mut self) {
        let total_lines = self.chat_line_count();
        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };

        if total_lines > visible_height {
            self.chat_scroll = total_lines.saturating_sub(visible_height);
        } else {
            self.chat_scroll = 0;
        }
    }

    /// Number of display lines the chat occupies after wrapping. Mirrors the
    /// line structure the renderer produces: role line, wrapped content
    /// lines, blank line per message, plus the loading indicator.
    pub fn chat_line_count(&self) -> u16 {
        // Use character count, not byte length, for proper UTF-8 handling
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;

        for msg in &self.history {
            total_lines += 1; // Role line ("You:", "AI:", "Error:")
            // split('\n') rather than lines(): the renderer emits a line for
            // a trailing newline too
            for line in msg.text.split('\n') {
                let char_count = line.chars().count();
                if char_count == 0 {
                    total_lines += 1;
                } else {
                    total_lines += ((char_count / wrap_width) + 1) as u16;
                }
            }
            total_lines += 1; // Blank line after message
        }

        if self.pending {
            total_lines += 2; // "AI:" + "Thinking..."
        }

        total_lines
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        let max_scroll = self.chat_line_count().saturating_sub(self.chat_height);
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(max_scroll);
    }

    pub fn scroll_to_top(&mut self) {
        self.chat_scroll = 0;
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.pending {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }
}
