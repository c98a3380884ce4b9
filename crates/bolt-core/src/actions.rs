use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ArtifactAction {
    File { file_path: String, content: String },
    Shell { content: String },
    Start { content: String },
}

impl ArtifactAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            ArtifactAction::File { .. } => ActionKind::File,
            ArtifactAction::Shell { .. } => ActionKind::Shell,
            ArtifactAction::Start { .. } => ActionKind::Start,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            ArtifactAction::File { content, .. } => content,
            ArtifactAction::Shell { content } => content,
            ArtifactAction::Start { content } => content,
        }
    }

    pub fn is_command(&self) -> bool {
        matches!(
            self,
            ArtifactAction::Shell { .. } | ArtifactAction::Start { .. }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    File,
    Shell,
    Start,
}

impl ActionKind {
    pub fn from_attr(value: &str) -> Option<ActionKind> {
        match value {
            "file" => Some(ActionKind::File),
            "shell" => Some(ActionKind::Shell),
            "start" => Some(ActionKind::Start),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionEvent {
    pub artifact_id: String,
    pub message_id: String,
    pub action_id: u64,
    pub action: ArtifactAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn assistant(content: impl Into<String>) -> ChatMessage {
        ChatMessage {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> ChatMessage {
        ChatMessage {
            role: Role::User,
            content: content.into(),
        }
    }
}
