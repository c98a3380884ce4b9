use std::fmt;

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandStatus {
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    pub command: String,
    pub status: CommandStatus,
    pub exit_code: Option<i32>,
    pub logs: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteOrigin {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecError {
    pub message: String,
}

impl ExecError {
    pub fn new(message: impl Into<String>) -> ExecError {
        ExecError {
            message: message.into(),
        }
    }
}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExecError {}

impl From<std::io::Error> for ExecError {
    fn from(err: std::io::Error) -> ExecError {
        ExecError::new(err.to_string())
    }
}

/// Virtual file-system collaborator; overwrite semantics, never append.
pub trait FileStore {
    fn write(&mut self, path: &str, content: &str, origin: WriteOrigin) -> Result<(), ExecError>;
}

/// Process-execution collaborator. `execute` blocks until the command
/// finishes; callers rely on that to serialize commands from one message.
pub trait CommandRunner {
    fn execute(&mut self, command: &str) -> Result<CommandResult, ExecError>;
}

/// Chat/turn submission collaborator (continuation requests).
pub trait ChatHandle {
    fn append_user_turn(&mut self, text: &str);
}

/// Sequential execution queue; receives an ordered command list, internals
/// out of scope here.
pub trait CommandQueue {
    fn run(&mut self, commands: Vec<String>) -> Result<(), ExecError>;
}
