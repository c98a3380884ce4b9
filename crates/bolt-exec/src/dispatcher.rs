use bolt_core::actions::ActionEvent;
use bolt_core::actions::Artifact;
use bolt_core::actions::ArtifactAction;
use bolt_core::parser::ActionSink;
use bolt_core::parser::SinkError;

use crate::contracts::CommandRunner;
use crate::contracts::CommandStatus;
use crate::contracts::FileStore;
use crate::contracts::WriteOrigin;

/// Binds parser callbacks to file-write and command-execution side effects.
///
/// Commands are executed synchronously inside `on_action_close`, so closes
/// within one message complete strictly in emission order; a failing command
/// surfaces as a `SinkError` and propagates out of `parse` uncaught.
pub struct ArtifactDispatcher<'a> {
    files: &'a mut dyn FileStore,
    runner: &'a mut dyn CommandRunner,
    pub open_artifacts: Vec<String>,
    pub commands_run: u64,
    pub skipped_writes: u64,
}

impl<'a> ArtifactDispatcher<'a> {
    pub fn new(
        files: &'a mut dyn FileStore,
        runner: &'a mut dyn CommandRunner,
    ) -> ArtifactDispatcher<'a> {
        ArtifactDispatcher {
            files,
            runner,
            open_artifacts: Vec::new(),
            commands_run: 0,
            skipped_writes: 0,
        }
    }
}

impl ActionSink for ArtifactDispatcher<'_> {
    fn on_artifact_open(&mut self, _message_id: &str, artifact: &Artifact) {
        self.open_artifacts.push(artifact.id.clone());
    }

    fn on_artifact_close(&mut self, _message_id: &str, artifact: &Artifact) {
        self.open_artifacts.retain(|id| id != &artifact.id);
    }

    fn on_action_stream(&mut self, event: &ActionEvent) -> Result<(), SinkError> {
        let ArtifactAction::File { file_path, content } = &event.action else {
            return Ok(());
        };
        if file_path.is_empty() {
            self.skipped_writes += 1;
            return Ok(());
        }
        self.files
            .write(file_path, content, WriteOrigin::Assistant)
            .map_err(|err| SinkError::file_store(err.message))
    }

    fn on_action_close(&mut self, event: &ActionEvent) -> Result<(), SinkError> {
        if !event.action.is_command() {
            return Ok(());
        }
        let command = single_line(event.action.content());
        if command.is_empty() {
            return Ok(());
        }
        let result = self
            .runner
            .execute(&command)
            .map_err(|err| SinkError::command(err.message))?;
        self.commands_run += 1;
        match result.status {
            CommandStatus::Succeeded => Ok(()),
            CommandStatus::Failed => Err(SinkError::command(format!(
                "command failed with exit code {:?}: {command}",
                result.exit_code
            ))),
        }
    }
}

/// Models wrap long commands across lines; collapse embedded newlines and
/// runs of whitespace into single spaces before submitting one shell line.
pub fn single_line(command: &str) -> String {
    command.split_whitespace().collect::<Vec<_>>().join(" ")
}
