//! Conversation controller: drives one turn from submitted text to rendered
//! reply and always hands the input back afterwards.

use std::sync::{Arc, Mutex};
use tracing::{debug, error, warn};

use crate::client::{ChatTransport, ClientError};
use crate::render::{MarkupRenderer, Renderer};
use crate::resolver::{Resolution, ResponseResolver};
use crate::view::{
    InputState, InputSurface, Message, Transcript, TranscriptError, TranscriptSink,
    TypingIndicator,
};

/// Bot message shown when a turn fails unexpectedly.
pub const APOLOGY: &str = "Sorry, I encountered an error. Please try again.";

/// Transcript content after [`Conversation::clear`].
pub const DEFAULT_GREETING: &str = "Hello! I'm your AI assistant. How can I help you today?";

/// Turn lifecycle. A turn always ends in `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    Validating,
    AwaitingResponse,
    Rendering,
}

/// What [`Conversation::submit`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Blank input; nothing happened.
    Ignored,
    /// Another turn was in flight; nothing happened.
    Rejected,
    Replied { reply: String, degraded: bool },
    /// The apology message was shown.
    Failed { error: String },
}

#[derive(Debug, thiserror::Error)]
enum TurnError {
    #[error(transparent)]
    Transcript(#[from] TranscriptError),
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// One chat session: resolver, renderer and views wired together.
pub struct Conversation {
    resolver: ResponseResolver,
    renderer: Box<dyn Renderer>,
    transcript: Box<dyn TranscriptSink>,
    input: Box<dyn InputSurface>,
    fallback_replies: bool,
    typing_indicator: bool,
    greeting: String,
    state: Mutex<TurnState>,
}

/// Builder for [`Conversation`]; unset views default to the in-memory ones.
pub struct ConversationBuilder {
    transport: Arc<dyn ChatTransport>,
    renderer: Option<Box<dyn Renderer>>,
    transcript: Option<Box<dyn TranscriptSink>>,
    input: Option<Box<dyn InputSurface>>,
    fallback_replies: bool,
    typing_indicator: bool,
    greeting: String,
}

impl ConversationBuilder {
    pub fn renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    pub fn transcript(mut self, transcript: impl TranscriptSink + 'static) -> Self {
        self.transcript = Some(Box::new(transcript));
        self
    }

    pub fn input(mut self, input: impl InputSurface + 'static) -> Self {
        self.input = Some(Box::new(input));
        self
    }

    /// When false, chat failures show the apology instead of a canned reply.
    pub fn fallback_replies(mut self, enabled: bool) -> Self {
        self.fallback_replies = enabled;
        self
    }

    pub fn typing_indicator(mut self, enabled: bool) -> Self {
        self.typing_indicator = enabled;
        self
    }

    pub fn greeting(mut self, greeting: impl Into<String>) -> Self {
        self.greeting = greeting.into();
        self
    }

    pub fn build(self) -> Conversation {
        Conversation {
            resolver: ResponseResolver::new(self.transport),
            renderer: self
                .renderer
                .unwrap_or_else(|| Box::new(MarkupRenderer::default())),
            transcript: self
                .transcript
                .unwrap_or_else(|| Box::new(Transcript::default())),
            input: self.input.unwrap_or_else(|| Box::new(InputState::default())),
            fallback_replies: self.fallback_replies,
            typing_indicator: self.typing_indicator,
            greeting: self.greeting,
            state: Mutex::new(TurnState::Idle),
        }
    }
}

impl Conversation {
    pub fn builder(transport: Arc<dyn ChatTransport>) -> ConversationBuilder {
        ConversationBuilder {
            transport,
            renderer: None,
            transcript: None,
            input: None,
            fallback_replies: true,
            typing_indicator: false,
            greeting: DEFAULT_GREETING.to_string(),
        }
    }

    pub fn state(&self) -> TurnState {
        *self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn set_state(&self, next: TurnState) {
        *self.state.lock().unwrap_or_else(|p| p.into_inner()) = next;
    }

    /// Moves `Idle → Validating`; false when a turn is already running.
    fn begin_turn(&self) -> bool {
        let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());
        if *state != TurnState::Idle {
            return false;
        }
        *state = TurnState::Validating;
        true
    }

    fn render(&self, message: &Message) -> Result<(), TranscriptError> {
        let markup = self.renderer.format(&message.text);
        self.transcript.append(message, &markup)
    }

    /// Runs one turn for `raw_text`. Never fails; see [`TurnOutcome`].
    pub async fn submit(&self, raw_text: &str) -> TurnOutcome {
        if !self.begin_turn() {
            debug!("submission ignored while a turn is in flight");
            return TurnOutcome::Rejected;
        }
        let text = raw_text.trim();
        if text.is_empty() {
            self.set_state(TurnState::Idle);
            return TurnOutcome::Ignored;
        }

        let mut typing = None;
        let outcome = match self.run_turn(text, &mut typing).await {
            Ok(resolution) => {
                if resolution.is_degraded() {
                    warn!("turn answered with a fallback reply");
                }
                TurnOutcome::Replied {
                    degraded: resolution.is_degraded(),
                    reply: resolution.text,
                }
            }
            Err(e) => {
                error!(error = %e, "chat turn failed");
                if let Err(render_err) = self.render(&Message::error(APOLOGY)) {
                    error!(error = %render_err, "could not show apology");
                }
                TurnOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };

        self.input.hide_loading();
        if let Some(indicator) = typing {
            self.transcript.dismiss_typing_indicator(indicator);
        }
        self.input.set_enabled(true);
        self.input.focus();
        self.set_state(TurnState::Idle);
        outcome
    }

    /// `typing` receives the placeholder this turn shows; `submit` removes it.
    async fn run_turn(
        &self,
        text: &str,
        typing: &mut Option<TypingIndicator>,
    ) -> Result<Resolution, TurnError> {
        self.render(&Message::user(text))?;
        self.input.clear();
        self.input.set_enabled(false);

        self.set_state(TurnState::AwaitingResponse);
        self.input.show_loading();
        if self.typing_indicator {
            *typing = Some(self.transcript.show_typing_indicator());
        }
        let resolution = if self.fallback_replies {
            self.resolver.resolve(text).await
        } else {
            self.resolver.try_resolve(text).await?
        };

        self.set_state(TurnState::Rendering);
        self.render(&Message::bot(resolution.text.as_str()))?;
        Ok(resolution)
    }

    /// Resets the transcript to the greeting message.
    pub fn clear(&self) -> Result<(), TranscriptError> {
        self.transcript.clear();
        self.render(&Message::bot(self.greeting.as_str()))
    }
}
