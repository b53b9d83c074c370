//! Chat and Q&A record client library: conversation turns with fallback
//! replies, reply formatting, record forms, and YAML config.
//! Used by the `qa-chat` terminal front end.

pub mod client;
pub mod config;
pub mod controller;
pub mod messages;
pub mod records;
pub mod render;
pub mod resolver;
pub mod view;

pub use client::{ChatTransport, ClientError, HttpBackend, RecordStore};
pub use config::{default_config_path, ChatSection, Config, ConfigError, ServerSection};
pub use controller::{Conversation, ConversationBuilder, TurnOutcome, TurnState, APOLOGY};
pub use messages::{ChatReply, Record, RecordDraft, RecordId};
pub use records::{AddForm, CrudOutcome, DeleteForm, RecordDesk, UpdateForm};
pub use render::{Dialect, MarkupRenderer, Renderer};
pub use resolver::{Resolution, ReplySource, ResponseResolver};
pub use view::{
    InputState, InputSurface, Message, Sender, StatusDisplay, StatusLine, Transcript,
    TranscriptSink,
};
