use crate::markup;

/// Continuation turn submitted when generation was cut off mid-artifact.
pub const CONTINUE_PROMPT: &str = "Continue your prior response. IMPORTANT: Immediately begin from where you left off without any interruptions. Do not repeat any content, including artifact and action tags.";

/// A finished message is well-formed when its artifact-open and
/// artifact-close marker counts agree. Action-tag balance is not
/// additionally checked.
pub fn is_complete(text: &str) -> bool {
    markup::count_open_markers(text, markup::ARTIFACT_OPEN)
        == markup::count_markers(text, markup::ARTIFACT_CLOSE)
}
