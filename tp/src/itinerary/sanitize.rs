//! Best-effort markup stripping for generated itineraries
//!
//! The model is asked for plain text but does not always comply. This removes the
//! characters common lightweight markup uses without trying to parse it.

/// Characters removed from generated text
pub const MARKUP_CHARS: &[char] = &['#', '*', '_', '`', '~', '>', '-'];

fn is_markup(c: char) -> bool {
    MARKUP_CHARS.contains(&c)
}

/// Strip markup characters, line by line
///
/// A run of markers and spaces at the start of a line (a heading or list bullet) is
/// dropped entirely so the line starts at its first word. Letters, digits and all
/// other punctuation are kept as they were.
pub fn sanitize(text: &str) -> String {
    text.split('\n').map(sanitize_line).collect::<Vec<_>>().join("\n")
}

fn sanitize_line(line: &str) -> String {
    let prefix_len = line
        .char_indices()
        .find(|(_, c)| !(is_markup(*c) || *c == ' ' || *c == '\t'))
        .map(|(i, _)| i)
        .unwrap_or(line.len());
    let (prefix, body) = line.split_at(prefix_len);

    let mut out = String::with_capacity(line.len());
    if !prefix.chars().any(is_markup) {
        out.push_str(prefix);
    }
    out.extend(body.chars().filter(|c| !is_markup(*c)));
    out
}
