use std::collections::HashMap;
use std::fmt;

use crate::actions::ActionEvent;
use crate::actions::ActionKind;
use crate::actions::Artifact;
use crate::actions::ArtifactAction;
use crate::markup;
use crate::markup::TagScan;
use crate::state::LogBuffer;
use crate::state::LogEntry;
use crate::state::LogLevel;
use crate::state::LogSource;
use crate::state::MessageParseState;
use crate::state::PendingAction;

pub const ARTIFACT_PLACEHOLDER_CLASS: &str = "__boltArtifact__";

const LOG_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkErrorKind {
    FileStore,
    Command,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkError {
    pub kind: SinkErrorKind,
    pub message: String,
}

impl SinkError {
    pub fn file_store(message: impl Into<String>) -> SinkError {
        SinkError {
            kind: SinkErrorKind::FileStore,
            message: message.into(),
        }
    }

    pub fn command(message: impl Into<String>) -> SinkError {
        SinkError {
            kind: SinkErrorKind::Command,
            message: message.into(),
        }
    }
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SinkErrorKind::FileStore => write!(f, "file store: {}", self.message),
            SinkErrorKind::Command => write!(f, "command: {}", self.message),
        }
    }
}

impl std::error::Error for SinkError {}

/// Callbacks fired by the parser as markup regions complete.
///
/// `on_action_close` is only ever invoked for shell/start actions; file
/// actions funnel through `on_action_stream`, whose delivery semantics are
/// "replace file content with this value" for partial and final bodies
/// alike.
pub trait ActionSink {
    fn on_artifact_open(&mut self, _message_id: &str, _artifact: &Artifact) {}

    fn on_artifact_close(&mut self, _message_id: &str, _artifact: &Artifact) {}

    fn on_action_open(&mut self, _event: &ActionEvent) {}

    fn on_action_stream(&mut self, event: &ActionEvent) -> Result<(), SinkError>;

    fn on_action_close(&mut self, event: &ActionEvent) -> Result<(), SinkError>;
}

/// Incremental parser over the growing response text of each message.
///
/// One `MessageParseState` per message id, created lazily and mutated in
/// place across calls; `parse` may be invoked repeatedly with longer text
/// for the same id and returns only the newly sanitized display output.
pub struct StreamParser {
    states: HashMap<String, MessageParseState>,
    logs: LogBuffer,
}

impl StreamParser {
    pub fn new() -> StreamParser {
        StreamParser {
            states: HashMap::new(),
            logs: LogBuffer::new(LOG_CAPACITY),
        }
    }

    pub fn parse(
        &mut self,
        message_id: &str,
        input: &str,
        sink: &mut dyn ActionSink,
    ) -> Result<String, SinkError> {
        let state = self.states.entry(message_id.to_string()).or_default();
        if state.position > input.len() {
            return Ok(String::new());
        }
        let mut output = String::new();
        let mut pending_files: Vec<(String, ActionEvent)> = Vec::new();
        let mut dispatch_err: Option<SinkError> = None;

        loop {
            if state.inside_action {
                let Some(pending) = state.current_action.clone() else {
                    state.inside_action = false;
                    continue;
                };
                match markup::find_marker(input, state.position, markup::ACTION_CLOSE) {
                    Some(close_at) => {
                        let body = &input[pending.body_start..close_at];
                        let event = action_event(state, message_id, &pending, body);
                        state.position = close_at + markup::ACTION_CLOSE.len();
                        state.inside_action = false;
                        state.current_action = None;
                        match pending.kind {
                            ActionKind::File => {
                                upsert_pending(&mut pending_files, &pending.file_path, event);
                            }
                            ActionKind::Shell | ActionKind::Start => {
                                if let Err(err) = sink.on_action_close(&event) {
                                    dispatch_err = Some(err);
                                    break;
                                }
                            }
                        }
                    }
                    None => {
                        // Best-effort live body for an open file action;
                        // shell/start never surface before closing. A tail
                        // that may still grow into the close marker is held
                        // back so streamed content stays a prefix of the
                        // closed content.
                        if pending.kind == ActionKind::File
                            && !pending_files
                                .iter()
                                .any(|(path, _)| path == &pending.file_path)
                        {
                            let body_end = markup::trailing_prefix(
                                input,
                                pending.body_start,
                                markup::ACTION_CLOSE,
                            )
                            .unwrap_or(input.len());
                            let body = &input[pending.body_start..body_end];
                            let event = action_event(state, message_id, &pending, body);
                            upsert_pending(&mut pending_files, &pending.file_path, event);
                        }
                        break;
                    }
                }
            } else if state.inside_artifact {
                let open = match markup::scan_open_tag(input, state.position, markup::ACTION_OPEN) {
                    TagScan::Found(tag) => Some(tag),
                    TagScan::Partial(_) | TagScan::NotFound => None,
                };
                let close = markup::find_marker(input, state.position, markup::ARTIFACT_CLOSE);
                match (open, close) {
                    (Some(tag), close) if close.map_or(true, |at| tag.start < at) => {
                        let (kind, degraded) = match tag.attr("type") {
                            Some(value) => match ActionKind::from_attr(value) {
                                Some(kind) => (kind, false),
                                None => {
                                    self.logs.append(
                                        LogEntry::new(
                                            LogLevel::Warn,
                                            LogSource::Parser,
                                            format!(
                                                "unknown action type \"{value}\", treating as file action"
                                            ),
                                        )
                                        .with_context(message_id),
                                    );
                                    (ActionKind::File, true)
                                }
                            },
                            None => {
                                self.logs.append(
                                    LogEntry::new(
                                        LogLevel::Warn,
                                        LogSource::Parser,
                                        "action tag missing type attribute, treating as file action",
                                    )
                                    .with_context(message_id),
                                );
                                (ActionKind::File, true)
                            }
                        };
                        let file_path = match kind {
                            ActionKind::File if !degraded => match tag.attr("filePath") {
                                Some(path) if !path.is_empty() => path.to_string(),
                                Some(_) | None => {
                                    self.logs.append(
                                        LogEntry::new(
                                            LogLevel::Warn,
                                            LogSource::Parser,
                                            "file action missing filePath attribute",
                                        )
                                        .with_context(message_id),
                                    );
                                    String::new()
                                }
                            },
                            _ => String::new(),
                        };
                        let action_id = state.next_action_id;
                        state.next_action_id += 1;
                        let pending = PendingAction {
                            action_id,
                            kind,
                            file_path,
                            body_start: tag.end,
                        };
                        let event = action_event(state, message_id, &pending, "");
                        state.current_action = Some(pending);
                        state.inside_action = true;
                        state.position = tag.end;
                        sink.on_action_open(&event);
                    }
                    (_, Some(close_at)) => {
                        state.position = close_at + markup::ARTIFACT_CLOSE.len();
                        state.inside_artifact = false;
                        let artifact = state.current_artifact.take().unwrap_or(Artifact {
                            id: String::new(),
                            title: String::new(),
                        });
                        sink.on_artifact_close(message_id, &artifact);
                    }
                    (_, None) => break,
                }
            } else {
                match markup::scan_open_tag(input, state.position, markup::ARTIFACT_OPEN) {
                    TagScan::Found(tag) => {
                        output.push_str(&input[state.position..tag.start]);
                        let id = match tag.attr("id") {
                            Some(id) => id.to_string(),
                            None => {
                                self.logs.append(
                                    LogEntry::new(
                                        LogLevel::Warn,
                                        LogSource::Parser,
                                        "artifact tag missing id attribute",
                                    )
                                    .with_context(message_id),
                                );
                                String::new()
                            }
                        };
                        let title = match tag.attr("title") {
                            Some(title) => title.to_string(),
                            None => {
                                self.logs.append(
                                    LogEntry::new(
                                        LogLevel::Warn,
                                        LogSource::Parser,
                                        "artifact tag missing title attribute",
                                    )
                                    .with_context(message_id),
                                );
                                String::new()
                            }
                        };
                        let artifact = Artifact { id, title };
                        state.current_artifact = Some(artifact.clone());
                        state.inside_artifact = true;
                        state.position = tag.end;
                        sink.on_artifact_open(message_id, &artifact);
                        output.push_str(&artifact_placeholder(message_id));
                    }
                    TagScan::Partial(hold_at) => {
                        output.push_str(&input[state.position..hold_at]);
                        state.position = hold_at;
                        break;
                    }
                    TagScan::NotFound => {
                        output.push_str(&input[state.position..]);
                        state.position = input.len();
                        break;
                    }
                }
            }
        }

        for (_, event) in &pending_files {
            if dispatch_err.is_some() {
                break;
            }
            if let Err(err) = sink.on_action_stream(event) {
                dispatch_err = Some(err);
            }
        }

        match dispatch_err {
            Some(err) => Err(err),
            None => Ok(output),
        }
    }

    /// Clears all per-message state and the log buffer (conversation switch).
    pub fn reset(&mut self) {
        self.states.clear();
        self.logs.clear();
    }

    pub fn state(&self, message_id: &str) -> Option<&MessageParseState> {
        self.states.get(message_id)
    }

    pub fn logs(&self) -> &LogBuffer {
        &self.logs
    }
}

impl Default for StreamParser {
    fn default() -> Self {
        StreamParser::new()
    }
}

pub fn artifact_placeholder(message_id: &str) -> String {
    format!("<div class=\"{ARTIFACT_PLACEHOLDER_CLASS}\" data-message-id=\"{message_id}\"></div>")
}

fn action_event(
    state: &MessageParseState,
    message_id: &str,
    pending: &PendingAction,
    body: &str,
) -> ActionEvent {
    let artifact_id = state
        .current_artifact
        .as_ref()
        .map(|artifact| artifact.id.clone())
        .unwrap_or_default();
    let action = match pending.kind {
        ActionKind::File => ArtifactAction::File {
            file_path: pending.file_path.clone(),
            content: body.to_string(),
        },
        ActionKind::Shell => ArtifactAction::Shell {
            content: body.to_string(),
        },
        ActionKind::Start => ArtifactAction::Start {
            content: body.to_string(),
        },
    };
    ActionEvent {
        artifact_id,
        message_id: message_id.to_string(),
        action_id: pending.action_id,
        action,
    }
}

fn upsert_pending(pending: &mut Vec<(String, ActionEvent)>, path: &str, event: ActionEvent) {
    match pending.iter_mut().find(|(entry, _)| entry == path) {
        Some(slot) => slot.1 = event,
        None => pending.push((path.to_string(), event)),
    }
}

#[cfg(test)]
mod tests;
