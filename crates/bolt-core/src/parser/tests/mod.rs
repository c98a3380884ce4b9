pub(super) use pretty_assertions::assert_eq;

pub(super) use crate::actions::ActionEvent;
pub(super) use crate::actions::Artifact;
pub(super) use crate::actions::ArtifactAction;
pub(super) use crate::parser::artifact_placeholder;
pub(super) use crate::parser::ActionSink;
pub(super) use crate::parser::SinkError;
pub(super) use crate::parser::StreamParser;
pub(super) use crate::state::LogLevel;

mod incremental;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum SinkCall {
    ArtifactOpen {
        message_id: String,
        artifact: Artifact,
    },
    ArtifactClose {
        message_id: String,
        artifact: Artifact,
    },
    ActionOpen(ActionEvent),
    ActionStream(ActionEvent),
    ActionClose(ActionEvent),
}

#[derive(Debug, Default)]
pub(super) struct RecordingSink {
    pub calls: Vec<SinkCall>,
    pub fail_close_with: Option<SinkError>,
}

impl ActionSink for RecordingSink {
    fn on_artifact_open(&mut self, message_id: &str, artifact: &Artifact) {
        self.calls.push(SinkCall::ArtifactOpen {
            message_id: message_id.to_string(),
            artifact: artifact.clone(),
        });
    }

    fn on_artifact_close(&mut self, message_id: &str, artifact: &Artifact) {
        self.calls.push(SinkCall::ArtifactClose {
            message_id: message_id.to_string(),
            artifact: artifact.clone(),
        });
    }

    fn on_action_open(&mut self, event: &ActionEvent) {
        self.calls.push(SinkCall::ActionOpen(event.clone()));
    }

    fn on_action_stream(&mut self, event: &ActionEvent) -> Result<(), SinkError> {
        self.calls.push(SinkCall::ActionStream(event.clone()));
        Ok(())
    }

    fn on_action_close(&mut self, event: &ActionEvent) -> Result<(), SinkError> {
        self.calls.push(SinkCall::ActionClose(event.clone()));
        match &self.fail_close_with {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

impl RecordingSink {
    pub fn action_closes(&self) -> Vec<ActionEvent> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                SinkCall::ActionClose(event) => Some(event.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn action_streams(&self) -> Vec<ActionEvent> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                SinkCall::ActionStream(event) => Some(event.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn artifact_closes(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, SinkCall::ArtifactClose { .. }))
            .count()
    }
}

pub(super) fn well_formed_response() -> String {
    concat!(
        "Setting up the project.\n",
        r#"<boltArtifact id="setup" title="Project setup">"#,
        r#"<boltAction type="file" filePath="package.json">{ "name": "demo" }</boltAction>"#,
        "<boltAction type=\"shell\">npm install</boltAction>",
        "<boltAction type=\"file\" filePath=\"src/index.js\">console.log('hi');\n</boltAction>",
        "<boltAction type=\"start\">npm run dev</boltAction>",
        "</boltArtifact>\nAll done.",
    )
    .to_string()
}

/// Feeds every growing prefix of `text` through `parse`, accumulating the
/// sanitized output, and returns it together with the sink.
pub(super) fn parse_by_char(parser: &mut StreamParser, message_id: &str, text: &str) -> (String, RecordingSink) {
    let mut sink = RecordingSink::default();
    let mut output = String::new();
    for end in text.char_indices().map(|(at, _)| at).skip(1) {
        output.push_str(
            &parser
                .parse(message_id, &text[..end], &mut sink)
                .expect("parse should succeed"),
        );
    }
    output.push_str(
        &parser
            .parse(message_id, text, &mut sink)
            .expect("parse should succeed"),
    );
    (output, sink)
}

pub(super) fn parse_batch(parser: &mut StreamParser, message_id: &str, text: &str) -> (String, RecordingSink) {
    let mut sink = RecordingSink::default();
    let output = parser
        .parse(message_id, text, &mut sink)
        .expect("parse should succeed");
    (output, sink)
}
