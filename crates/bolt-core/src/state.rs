use std::collections::VecDeque;

use crate::actions::ActionKind;
use crate::actions::Artifact;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAction {
    pub action_id: u64,
    pub kind: ActionKind,
    pub file_path: String,
    pub body_start: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageParseState {
    pub position: usize,
    pub inside_artifact: bool,
    pub inside_action: bool,
    pub current_artifact: Option<Artifact>,
    pub current_action: Option<PendingAction>,
    pub next_action_id: u64,
    pub install_executed: bool,
}

impl MessageParseState {
    pub fn new() -> MessageParseState {
        MessageParseState {
            position: 0,
            inside_artifact: false,
            inside_action: false,
            current_artifact: None,
            current_action: None,
            next_action_id: 0,
            install_executed: false,
        }
    }
}

impl Default for MessageParseState {
    fn default() -> Self {
        MessageParseState::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSource {
    Parser,
    Dispatch,
    Replay,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub seq: u64,
    pub level: LogLevel,
    pub ts_ms: Option<i64>,
    pub source: LogSource,
    pub context: Option<String>,
    pub message: String,
}

impl LogEntry {
    pub fn new(level: LogLevel, source: LogSource, message: impl Into<String>) -> LogEntry {
        LogEntry {
            seq: 0,
            level,
            ts_ms: Some(chrono::Utc::now().timestamp_millis()),
            source,
            context: None,
            message: message.into(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> LogEntry {
        self.context = Some(context.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct LogBuffer {
    cap: usize,
    next_seq: u64,
    buf: VecDeque<LogEntry>,
}

impl LogBuffer {
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            next_seq: 1,
            buf: VecDeque::with_capacity(cap),
        }
    }

    pub fn append(&mut self, mut entry: LogEntry) {
        entry.seq = self.next_seq;
        self.next_seq += 1;

        if self.buf.len() == self.cap {
            self.buf.pop_front();
        }
        self.buf.push_back(entry);
    }

    pub fn clear(&mut self) {
        self.buf.clear();
        self.next_seq = 1;
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.buf.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}
