use crate::actions::ActionKind;
use crate::actions::ChatMessage;
use crate::actions::Role;
use crate::markup;
use crate::markup::TagScan;

/// Post-generation sweep over a finished conversation: collects the trimmed
/// bodies of every *closed* shell/start action across assistant messages, in
/// document order. Open or partial tags are ignored; this runs after
/// generation, so anything unclosed is truncation, not work in flight.
pub fn collect_commands(messages: &[ChatMessage]) -> Vec<String> {
    let mut commands = Vec::new();
    for message in messages {
        if message.role != Role::Assistant {
            continue;
        }
        collect_from_text(&message.content, &mut commands);
    }
    commands
}

fn collect_from_text(text: &str, commands: &mut Vec<String>) {
    let mut position = 0;
    loop {
        let tag = match markup::scan_open_tag(text, position, markup::ACTION_OPEN) {
            TagScan::Found(tag) => tag,
            TagScan::Partial(_) | TagScan::NotFound => return,
        };
        let Some(close_at) = markup::find_marker(text, tag.end, markup::ACTION_CLOSE) else {
            return;
        };
        let kind = tag.attr("type").and_then(ActionKind::from_attr);
        if matches!(kind, Some(ActionKind::Shell) | Some(ActionKind::Start)) {
            let body = text[tag.end..close_at].trim();
            if !body.is_empty() {
                commands.push(body.to_string());
            }
        }
        position = close_at + markup::ACTION_CLOSE.len();
    }
}
