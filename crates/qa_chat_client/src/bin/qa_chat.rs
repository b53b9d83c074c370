//! qa-chat: terminal front end for the chat and Q&A record backend.
//! Reads config, then either runs one chat turn for a message given on the
//! command line or reads turns and `/` commands from stdin.

use qa_chat_client::config::{self, Config};
use qa_chat_client::render::Dialect;
use qa_chat_client::view::{InputSurface, StatusDisplay, TranscriptSink, TypingIndicator};
use qa_chat_client::{
    AddForm, Conversation, DeleteForm, HttpBackend, MarkupRenderer, Message, RecordDesk, Sender,
    UpdateForm,
};
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
Type a message to chat, or a command:
  /add QUESTION | ANSWER
  /update ID | QUESTION | ANSWER   (leave a part blank to keep it)
  /delete ID
  /list
  /clear
  /help
  /quit";

/// Parsed command line.
struct Args {
    config: Option<PathBuf>,
    base_url: Option<String>,
    html: bool,
    message: Option<String>,
}

fn parse_args() -> Args {
    let mut args = Args {
        config: None,
        base_url: None,
        html: false,
        message: None,
    };
    let mut words = Vec::new();
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => args.config = it.next().map(PathBuf::from),
            "--base-url" => args.base_url = it.next(),
            "--html" => args.html = true,
            "-h" | "--help" => {
                println!("usage: qa-chat [--config PATH] [--base-url URL] [--html] [MESSAGE]");
                println!("{}", HELP);
                process::exit(0);
            }
            _ => words.push(arg),
        }
    }
    if !words.is_empty() {
        args.message = Some(words.join(" "));
    }
    args
}

fn load_config(args: &Args) -> Config {
    // 1. --config <path> flag, 2. QA_CHAT_CONFIG env var: must load.
    let explicit = args
        .config
        .clone()
        .or_else(|| std::env::var_os("QA_CHAT_CONFIG").map(PathBuf::from));
    let result = match &explicit {
        Some(path) => config::load(path).map_err(|e| (path.clone(), e)),
        // 3. Default path (~/.qa-chat/config.yaml), optional.
        None => match config::default_config_path() {
            Some(path) => config::load_or_default(&path).map_err(|e| (path, e)),
            None => Ok(Config::default()),
        },
    };
    result.unwrap_or_else(|(path, e)| {
        eprintln!("Error: failed to load config from {}: {}", path.display(), e);
        process::exit(1);
    })
}

// ── Terminal views ──────────────────────────────────────────────────────

struct TerminalTranscript;

impl TranscriptSink for TerminalTranscript {
    fn append(
        &self,
        message: &Message,
        markup: &str,
    ) -> Result<(), qa_chat_client::view::TranscriptError> {
        let label = match (message.sender, message.is_error) {
            (Sender::User, _) => "You",
            (Sender::Bot, false) => "Bot",
            (Sender::Bot, true) => "Bot (error)",
        };
        let mut out = io::stdout().lock();
        writeln!(out, "{}: {}", label, markup)
            .and_then(|_| out.flush())
            .map_err(|e| qa_chat_client::view::TranscriptError(e.to_string()))
    }

    fn clear(&self) {
        if io::stdout().is_terminal() {
            print!("\x1b[2J\x1b[H");
        }
    }

    fn show_typing_indicator(&self) -> TypingIndicator {
        eprintln!("Bot is typing...");
        TypingIndicator(0)
    }

    fn remove_typing_indicator(&self) -> bool {
        false
    }
}

struct TerminalInput;

impl InputSurface for TerminalInput {
    fn set_enabled(&self, _enabled: bool) {}

    fn clear(&self) {}

    fn focus(&self) {
        if io::stdin().is_terminal() {
            eprint!("> ");
        }
    }

    fn show_loading(&self) {
        if io::stderr().is_terminal() {
            eprintln!("...");
        }
    }

    fn hide_loading(&self) {}
}

struct TerminalStatus;

impl StatusDisplay for TerminalStatus {
    fn set_status(&self, status: &str) {
        println!("[{}]", status);
    }
}

// ── Commands ────────────────────────────────────────────────────────────

fn parts(rest: &str) -> Vec<String> {
    rest.split('|').map(|p| p.trim().to_string()).collect()
}

/// Handles one input line; returns false on `/quit`.
async fn handle_line(line: &str, chat: &Conversation, desk: &RecordDesk) -> bool {
    let line = line.trim();
    let Some(command) = line.strip_prefix('/') else {
        chat.submit(line).await;
        return true;
    };
    let (name, rest) = command.split_once(' ').unwrap_or((command, ""));
    match name {
        "quit" | "exit" => return false,
        "help" => println!("{}", HELP),
        "clear" => {
            if let Err(e) = chat.clear() {
                eprintln!("Error: {}", e);
            }
        }
        "list" => {
            for record in desk.list().await.unwrap_or_default() {
                println!("#{} Q: {}\n   A: {}", record.id, record.question, record.answer);
            }
        }
        "add" => {
            let p = parts(rest);
            let mut form = AddForm {
                question: p.first().cloned().unwrap_or_default(),
                answer: p.get(1).cloned().unwrap_or_default(),
            };
            desk.add(&mut form).await;
        }
        "update" => {
            let p = parts(rest);
            let mut form = UpdateForm {
                id: p.first().cloned().unwrap_or_default(),
                question: p.get(1).cloned().unwrap_or_default(),
                answer: p.get(2).cloned().unwrap_or_default(),
            };
            desk.update(&mut form).await;
        }
        "delete" => {
            let mut form = DeleteForm {
                id: rest.trim().to_string(),
            };
            desk.delete(&mut form).await;
        }
        other => eprintln!("Unknown command: /{} (try /help)", other),
    }
    true
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = parse_args();
    let cfg = load_config(&args);
    let base_url = args.base_url.as_deref().unwrap_or(cfg.base_url());

    let backend = match HttpBackend::new(base_url) {
        Ok(b) => Arc::new(b),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let renderer = if args.html {
        MarkupRenderer::html(cfg.escape_html())
    } else if io::stdout().is_terminal() {
        MarkupRenderer::ansi()
    } else {
        MarkupRenderer::new(Dialect::PLAIN)
    };

    let chat = Conversation::builder(backend.clone())
        .renderer(renderer)
        .transcript(TerminalTranscript)
        .input(TerminalInput)
        .fallback_replies(cfg.fallback_replies())
        .typing_indicator(cfg.typing_indicator())
        .greeting(cfg.greeting())
        .build();
    let desk = RecordDesk::new(backend, Arc::new(TerminalStatus));

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap_or_else(|e| {
            eprintln!("Error: failed to create runtime: {}", e);
            process::exit(1);
        });

    rt.block_on(async {
        if let Some(message) = &args.message {
            handle_line(message, &chat, &desk).await;
            return;
        }

        if let Err(e) = chat.clear() {
            eprintln!("Error: {}", e);
        }
        chat_loop(&chat, &desk).await;
    });
}

async fn chat_loop(chat: &Conversation, desk: &RecordDesk) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    TerminalInput.focus();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if !handle_line(&line, chat, desk).await {
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                eprintln!("Error: failed to read input: {}", e);
                break;
            }
        }
    }
}
