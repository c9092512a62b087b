/// Per-message size limit for outbound replies, in characters.
pub const MAX_CHUNK_CHARS: usize = 2000;

/// Split `text` into consecutive pieces of at most `max_chars` characters.
///
/// Purely positional: no word or line awareness, nothing trimmed, so
/// concatenating the result always gives back `text`. Counts Unicode scalar
/// values, never splitting inside one. Empty input or a zero limit yields no
/// chunks.
#[must_use]
pub fn chunk_message(text: &str, max_chars: usize) -> Vec<String> {
    if max_chars == 0 || text.is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (idx, _) in text.char_indices() {
        if count == max_chars {
            chunks.push(text[start..idx].to_string());
            start = idx;
            count = 0;
        }
        count += 1;
    }
    chunks.push(text[start..].to_string());

    chunks
}
