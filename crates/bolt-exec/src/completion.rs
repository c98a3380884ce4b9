use bolt_core::actions::ChatMessage;
use bolt_core::replay::collect_commands;
use bolt_core::verify;
use bolt_core::verify::CONTINUE_PROMPT;

use crate::contracts::ChatHandle;
use crate::contracts::CommandQueue;
use crate::contracts::ExecError;

/// Checks tag balance on a finished assistant message and, when generation
/// was cut off mid-artifact, appends the continuation turn. Returns whether
/// the message was well-formed.
pub fn ensure_complete(text: &str, chat: &mut dyn ChatHandle) -> bool {
    let complete = verify::is_complete(text);
    if !complete {
        chat.append_user_turn(CONTINUE_PROMPT);
    }
    complete
}

/// Final authoritative sweep over a finished conversation: every closed
/// shell/start body, in document order, handed to the sequential queue in
/// one batch. Returns how many commands were submitted.
pub fn replay_conversation(
    messages: &[ChatMessage],
    queue: &mut dyn CommandQueue,
) -> Result<usize, ExecError> {
    let commands = collect_commands(messages);
    let submitted = commands.len();
    if submitted > 0 {
        queue.run(commands)?;
    }
    Ok(submitted)
}
