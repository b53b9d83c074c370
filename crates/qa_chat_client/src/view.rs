//! View collaborators injected into the conversation and the record desk:
//! transcript sink, input surface, status display. In-memory implementations
//! are shared handles (`Clone` shares state) so callers can inspect them.

use std::sync::{Arc, Mutex, MutexGuard};

/// Who sent a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

/// One transcript message. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub sender: Sender,
    pub is_error: bool,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::User,
            is_error: false,
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::Bot,
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::bot(text)
        }
    }
}

/// Handle returned by [`TranscriptSink::show_typing_indicator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypingIndicator(pub u64);

/// Appending to the transcript failed.
#[derive(Debug, thiserror::Error)]
#[error("transcript unavailable: {0}")]
pub struct TranscriptError(pub String);

/// Append-only transcript of rendered messages.
pub trait TranscriptSink: Send + Sync {
    /// Appends `message` displayed as `markup`.
    fn append(&self, message: &Message, markup: &str) -> Result<(), TranscriptError>;
    /// Drops every entry.
    fn clear(&self);
    fn show_typing_indicator(&self) -> TypingIndicator;
    /// Removes at most one typing placeholder; returns whether one was present.
    fn remove_typing_indicator(&self) -> bool;
    /// Removes the placeholder identified by `indicator`, if still present.
    fn dismiss_typing_indicator(&self, _indicator: TypingIndicator) -> bool {
        self.remove_typing_indicator()
    }
}

/// The input box, send control and busy indicator.
pub trait InputSurface: Send + Sync {
    fn set_enabled(&self, enabled: bool);
    fn clear(&self);
    fn focus(&self);
    fn show_loading(&self);
    fn hide_loading(&self);
}

/// Single-line status display shared by the record forms.
pub trait StatusDisplay: Send + Sync {
    fn set_status(&self, status: &str);
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ── Transcript ──────────────────────────────────────────────────────────

/// A transcript entry: a rendered message or a typing placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Message { message: Message, markup: String },
    Typing(TypingIndicator),
}

#[derive(Debug, Default)]
struct TranscriptInner {
    entries: Vec<Entry>,
    next_indicator: u64,
}

/// In-memory transcript.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    inner: Arc<Mutex<TranscriptInner>>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Entry> {
        lock(&self.inner).entries.clone()
    }

    /// Messages only, in order.
    pub fn messages(&self) -> Vec<Message> {
        lock(&self.inner)
            .entries
            .iter()
            .filter_map(|e| match e {
                Entry::Message { message, .. } => Some(message.clone()),
                Entry::Typing(_) => None,
            })
            .collect()
    }

    pub fn has_typing_indicator(&self) -> bool {
        lock(&self.inner)
            .entries
            .iter()
            .any(|e| matches!(e, Entry::Typing(_)))
    }
}

impl TranscriptSink for Transcript {
    fn append(&self, message: &Message, markup: &str) -> Result<(), TranscriptError> {
        lock(&self.inner).entries.push(Entry::Message {
            message: message.clone(),
            markup: markup.to_string(),
        });
        Ok(())
    }

    fn clear(&self) {
        lock(&self.inner).entries.clear();
    }

    fn show_typing_indicator(&self) -> TypingIndicator {
        let mut inner = lock(&self.inner);
        let handle = TypingIndicator(inner.next_indicator);
        inner.next_indicator += 1;
        inner.entries.push(Entry::Typing(handle));
        handle
    }

    fn remove_typing_indicator(&self) -> bool {
        let mut inner = lock(&self.inner);
        match inner
            .entries
            .iter()
            .position(|e| matches!(e, Entry::Typing(_)))
        {
            Some(pos) => {
                inner.entries.remove(pos);
                true
            }
            None => false,
        }
    }

    fn dismiss_typing_indicator(&self, indicator: TypingIndicator) -> bool {
        let mut inner = lock(&self.inner);
        let before = inner.entries.len();
        inner
            .entries
            .retain(|e| *e != Entry::Typing(indicator));
        inner.entries.len() != before
    }
}

// ── Input ───────────────────────────────────────────────────────────────

#[derive(Debug)]
struct InputInner {
    enabled: bool,
    loading: bool,
    cleared: usize,
    focused: usize,
}

/// In-memory input surface; counts clears and focus requests.
#[derive(Debug, Clone)]
pub struct InputState {
    inner: Arc<Mutex<InputInner>>,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(InputInner {
                enabled: true,
                loading: false,
                cleared: 0,
                focused: 0,
            })),
        }
    }
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        lock(&self.inner).enabled
    }

    pub fn is_loading(&self) -> bool {
        lock(&self.inner).loading
    }

    pub fn clear_count(&self) -> usize {
        lock(&self.inner).cleared
    }

    pub fn focus_count(&self) -> usize {
        lock(&self.inner).focused
    }
}

impl InputSurface for InputState {
    fn set_enabled(&self, enabled: bool) {
        lock(&self.inner).enabled = enabled;
    }

    fn clear(&self) {
        lock(&self.inner).cleared += 1;
    }

    fn focus(&self) {
        lock(&self.inner).focused += 1;
    }

    fn show_loading(&self) {
        lock(&self.inner).loading = true;
    }

    fn hide_loading(&self) {
        lock(&self.inner).loading = false;
    }
}

// ── Status ──────────────────────────────────────────────────────────────

/// In-memory status line that remembers every status it showed.
#[derive(Debug, Clone, Default)]
pub struct StatusLine {
    history: Arc<Mutex<Vec<String>>>,
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The status currently displayed.
    pub fn current(&self) -> Option<String> {
        lock(&self.history).last().cloned()
    }

    pub fn history(&self) -> Vec<String> {
        lock(&self.history).clone()
    }
}

impl StatusDisplay for StatusLine {
    fn set_status(&self, status: &str) {
        lock(&self.history).push(status.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typing_indicator_removal_is_idempotent() {
        let t = Transcript::new();
        assert!(!t.remove_typing_indicator());
        t.show_typing_indicator();
        assert!(t.has_typing_indicator());
        assert!(t.remove_typing_indicator());
        assert!(!t.remove_typing_indicator());
        assert!(t.entries().is_empty());
    }

    #[test]
    fn remove_typing_indicator_removes_only_one() {
        let t = Transcript::new();
        let first = t.show_typing_indicator();
        let second = t.show_typing_indicator();
        assert_ne!(first, second);
        assert!(t.remove_typing_indicator());
        assert_eq!(t.entries(), vec![Entry::Typing(second)]);
    }

    #[test]
    fn dismiss_targets_one_handle_and_is_idempotent() {
        let t = Transcript::new();
        let first = t.show_typing_indicator();
        let second = t.show_typing_indicator();
        assert!(t.dismiss_typing_indicator(second));
        assert!(!t.dismiss_typing_indicator(second));
        assert_eq!(t.entries(), vec![Entry::Typing(first)]);
    }

    #[test]
    fn hide_loading_when_hidden_is_noop() {
        let input = InputState::new();
        input.hide_loading();
        assert!(!input.is_loading());
        input.show_loading();
        input.show_loading();
        assert!(input.is_loading());
        input.hide_loading();
        assert!(!input.is_loading());
    }

    #[test]
    fn cloned_handles_share_state() {
        let t = Transcript::new();
        let view = t.clone();
        t.append(&Message::user("hi"), "hi").unwrap();
        assert_eq!(view.messages(), vec![Message::user("hi")]);
    }
}
