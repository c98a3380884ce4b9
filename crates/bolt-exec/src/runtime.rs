use std::fs;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;

use crate::contracts::ChatHandle;
use crate::contracts::CommandQueue;
use crate::contracts::CommandResult;
use crate::contracts::CommandRunner;
use crate::contracts::CommandStatus;
use crate::contracts::ExecError;
use crate::contracts::FileStore;
use crate::contracts::WriteOrigin;

const DEFAULT_SHELL: &str = "sh";

/// Writes action content beneath a fixed root directory, creating parent
/// directories as needed. Paths are treated as relative; `..` components
/// must not escape the root.
pub struct DiskFileStore {
    root: PathBuf,
}

impl DiskFileStore {
    pub fn new(root: impl Into<PathBuf>) -> DiskFileStore {
        DiskFileStore { root: root.into() }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, ExecError> {
        let mut resolved = PathBuf::new();
        for component in Path::new(path).components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
                Component::ParentDir => {
                    if !resolved.pop() {
                        return Err(ExecError::new(format!(
                            "path escapes the working directory: {path}"
                        )));
                    }
                }
            }
        }
        if resolved.as_os_str().is_empty() {
            return Err(ExecError::new(format!("path resolves to nothing: {path}")));
        }
        Ok(self.root.join(resolved))
    }
}

impl FileStore for DiskFileStore {
    fn write(&mut self, path: &str, content: &str, _origin: WriteOrigin) -> Result<(), ExecError> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, content)?;
        Ok(())
    }
}

/// Runs one command at a time through `shell -c`, blocking until it exits
/// and capturing stdout/stderr into the result logs.
pub struct ShellCommandRunner {
    shell: String,
    workdir: PathBuf,
}

impl ShellCommandRunner {
    pub fn new(workdir: impl Into<PathBuf>) -> ShellCommandRunner {
        ShellCommandRunner {
            shell: DEFAULT_SHELL.to_string(),
            workdir: workdir.into(),
        }
    }

    pub fn with_shell(mut self, shell: impl Into<String>) -> ShellCommandRunner {
        self.shell = shell.into();
        self
    }
}

impl CommandRunner for ShellCommandRunner {
    fn execute(&mut self, command: &str) -> Result<CommandResult, ExecError> {
        let output = Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .current_dir(&self.workdir)
            .output()
            .map_err(|err| ExecError::new(format!("failed to spawn {}: {err}", self.shell)))?;

        let mut logs = Vec::new();
        for line in String::from_utf8_lossy(&output.stdout).lines() {
            logs.push(line.to_string());
        }
        for line in String::from_utf8_lossy(&output.stderr).lines() {
            logs.push(line.to_string());
        }

        let status = if output.status.success() {
            CommandStatus::Succeeded
        } else {
            CommandStatus::Failed
        };
        Ok(CommandResult {
            command: command.to_string(),
            status,
            exit_code: output.status.code(),
            logs,
        })
    }
}

/// Drains an ordered command list through a runner, stopping at the first
/// failure; later commands almost always depend on earlier ones.
pub struct SequentialCommandQueue<'a> {
    runner: &'a mut dyn CommandRunner,
    pub results: Vec<CommandResult>,
}

impl<'a> SequentialCommandQueue<'a> {
    pub fn new(runner: &'a mut dyn CommandRunner) -> SequentialCommandQueue<'a> {
        SequentialCommandQueue {
            runner,
            results: Vec::new(),
        }
    }
}

impl CommandQueue for SequentialCommandQueue<'_> {
    fn run(&mut self, commands: Vec<String>) -> Result<(), ExecError> {
        for command in commands {
            let result = self.runner.execute(&command)?;
            let status = result.status;
            let exit_code = result.exit_code;
            self.results.push(result);
            if status == CommandStatus::Failed {
                return Err(ExecError::new(format!(
                    "command failed with exit code {exit_code:?}: {command}"
                )));
            }
        }
        Ok(())
    }
}

/// In-memory file store recording every delivery; latest write per path
/// wins, mirroring the overwrite contract.
#[derive(Debug, Default)]
pub struct SimulatedFileStore {
    pub writes: Vec<(String, String, WriteOrigin)>,
}

impl SimulatedFileStore {
    pub fn new() -> SimulatedFileStore {
        SimulatedFileStore::default()
    }

    pub fn content(&self, path: &str) -> Option<&str> {
        self.writes
            .iter()
            .rev()
            .find(|(entry, _, _)| entry == path)
            .map(|(_, content, _)| content.as_str())
    }
}

impl FileStore for SimulatedFileStore {
    fn write(&mut self, path: &str, content: &str, origin: WriteOrigin) -> Result<(), ExecError> {
        self.writes
            .push((path.to_string(), content.to_string(), origin));
        Ok(())
    }
}

/// Deterministic runner double: records commands, succeeds unless told to
/// fail a specific command.
#[derive(Debug, Default)]
pub struct SimulatedCommandRunner {
    pub executed: Vec<String>,
    fail_matching: Option<String>,
}

impl SimulatedCommandRunner {
    pub fn new() -> SimulatedCommandRunner {
        SimulatedCommandRunner::default()
    }

    pub fn fail_on(&mut self, command: impl Into<String>) {
        self.fail_matching = Some(command.into());
    }
}

impl CommandRunner for SimulatedCommandRunner {
    fn execute(&mut self, command: &str) -> Result<CommandResult, ExecError> {
        self.executed.push(command.to_string());
        let failed = self.fail_matching.as_deref() == Some(command);
        Ok(CommandResult {
            command: command.to_string(),
            status: if failed {
                CommandStatus::Failed
            } else {
                CommandStatus::Succeeded
            },
            exit_code: Some(if failed { 1 } else { 0 }),
            logs: vec![format!("simulated: {command}")],
        })
    }
}

#[derive(Debug, Default)]
pub struct RecordingChat {
    pub turns: Vec<String>,
}

impl RecordingChat {
    pub fn new() -> RecordingChat {
        RecordingChat::default()
    }
}

impl ChatHandle for RecordingChat {
    fn append_user_turn(&mut self, text: &str) {
        self.turns.push(text.to_string());
    }
}
