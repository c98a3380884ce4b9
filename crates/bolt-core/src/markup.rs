pub const ARTIFACT_OPEN: &str = "<boltArtifact";
pub const ARTIFACT_CLOSE: &str = "</boltArtifact>";
pub const ACTION_OPEN: &str = "<boltAction";
pub const ACTION_CLOSE: &str = "</boltAction>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenTag {
    pub start: usize,
    pub end: usize,
    attrs: Vec<(String, String)>,
}

impl OpenTag {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagScan {
    Found(OpenTag),
    Partial(usize),
    NotFound,
}

pub fn find_marker(text: &str, from: usize, marker: &str) -> Option<usize> {
    if from > text.len() {
        return None;
    }
    text[from..].find(marker).map(|offset| from + offset)
}

/// Locates the next complete open tag for `marker` at or after `from`.
///
/// A marker immediately followed by a tag-name character is a different,
/// longer tag and is skipped. A marker whose `>` has not streamed in yet is
/// reported as `Partial` so the caller can hold its cursor there.
pub fn scan_open_tag(text: &str, from: usize, marker: &str) -> TagScan {
    let mut cursor = from;
    while let Some(start) = find_marker(text, cursor, marker) {
        let after = start + marker.len();
        let Some(boundary) = text.as_bytes().get(after).copied() else {
            return TagScan::Partial(start);
        };
        if is_name_byte(boundary) {
            cursor = start + 1;
            continue;
        }
        return match find_marker(text, after, ">") {
            Some(gt) => TagScan::Found(OpenTag {
                start,
                end: gt + 1,
                attrs: lex_attributes(&text[after..gt]),
            }),
            None => TagScan::Partial(start),
        };
    }
    match trailing_prefix(text, from, marker) {
        Some(hold) => TagScan::Partial(hold),
        None => TagScan::NotFound,
    }
}

/// Counts boundary-checked occurrences of an open marker, for tag-balance
/// verification.
pub fn count_open_markers(text: &str, marker: &str) -> usize {
    let mut cursor = 0;
    let mut count = 0;
    while let Some(start) = find_marker(text, cursor, marker) {
        let after = start + marker.len();
        let boundary = text.as_bytes().get(after).copied();
        if !boundary.is_some_and(is_name_byte) {
            count += 1;
        }
        cursor = start + 1;
    }
    count
}

pub fn count_markers(text: &str, marker: &str) -> usize {
    let mut cursor = 0;
    let mut count = 0;
    while let Some(start) = find_marker(text, cursor, marker) {
        count += 1;
        cursor = start + marker.len();
    }
    count
}

fn is_name_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_'
}

// A `<bolt` tail at the very end of the buffer may still grow into the
// marker once the next chunk arrives.
pub(crate) fn trailing_prefix(text: &str, from: usize, marker: &str) -> Option<usize> {
    if from > text.len() {
        return None;
    }
    let last = text[from..].rfind('<').map(|offset| from + offset)?;
    let tail = &text[last..];
    if tail.len() < marker.len() && marker.starts_with(tail) {
        Some(last)
    } else {
        None
    }
}

// Single forward pass over the raw text between the tag name and `>`.
// `name="value"` pairs only, no escape processing; anything malformed ends
// the scan with whatever was collected so far.
fn lex_attributes(raw: &str) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    let bytes = raw.as_bytes();
    let mut i = 0;
    loop {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        let name_start = i;
        while i < bytes.len() && is_name_byte(bytes[i]) {
            i += 1;
        }
        if i == name_start {
            break;
        }
        let name = &raw[name_start..i];
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if bytes.get(i) != Some(&b'=') {
            break;
        }
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if bytes.get(i) != Some(&b'"') {
            break;
        }
        i += 1;
        let value_start = i;
        while i < bytes.len() && bytes[i] != b'"' {
            i += 1;
        }
        if i >= bytes.len() {
            break;
        }
        attrs.push((name.to_string(), raw[value_start..i].to_string()));
        i += 1;
    }
    attrs
}
