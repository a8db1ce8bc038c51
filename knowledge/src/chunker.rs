const TARGET_CHUNK_CHARS: usize = 1024;
const MAX_CHUNK_CHARS: usize = 2048;
const OVERLAP_SENTENCES: usize = 2;

/// One chunk of a parent document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Deterministic id, `"<parent_id>#chunk-<index>"`.
    pub id: String,
    /// Parent document id.
    pub parent_document_id: String,
    /// Zero-based index within the parent document.
    pub chunk_index: usize,
    /// Total number of chunks the parent was split into.
    pub total_chunks: usize,
    /// Chunk text, including any overlap prefix.
    pub text: String,
}

fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let bytes = text.as_bytes();
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if matches!(ch, '.' | '!' | '?') {
            let next_is_boundary = chars.peek().is_none_or(|(_, c)| c.is_whitespace());
            if next_is_boundary {
                let end = idx + ch.len_utf8();
                sentences.push(text[start..end].trim());
                // Skip whitespace run.
                while chars.peek().is_some_and(|(_, c)| c.is_whitespace()) {
                    chars.next();
                }
                start = chars.peek().map_or(bytes.len(), |(i, _)| *i);
            }
        }
    }
    if start < bytes.len() {
        let remainder = text[start..].trim();
        if !remainder.is_empty() {
            sentences.push(remainder);
        }
    }
    sentences.into_iter().filter(|s| !s.is_empty()).collect()
}

fn chunk_by_char_span(parent_id: &str, text: &str) -> Vec<Chunk> {
    let chars: Vec<char> = text.chars().collect();
    let spans: Vec<String> = chars.chunks(TARGET_CHUNK_CHARS).map(|c| c.iter().collect()).collect();
    let total = spans.len();
    spans
        .into_iter()
        .enumerate()
        .map(|(index, text)| Chunk {
            id: format!("{parent_id}#chunk-{index}"),
            parent_document_id: parent_id.to_string(),
            chunk_index: index,
            total_chunks: total,
            text,
        })
        .collect()
}

/// Splits `text` into chunks targeting `~1024` chars (max `2048`), with
/// overlap formed by prepending the previous chunk's last two sentences.
/// Falls back to fixed character spans when no sentence boundaries exist.
#[must_use]
pub fn chunk_document(parent_id: &str, text: &str) -> Vec<Chunk> {
    if text.len() <= MAX_CHUNK_CHARS {
        return vec![Chunk {
            id: format!("{parent_id}#chunk-0"),
            parent_document_id: parent_id.to_string(),
            chunk_index: 0,
            total_chunks: 1,
            text: text.to_string(),
        }];
    }

    let sentences = split_sentences(text);
    if sentences.len() <= 1 {
        return chunk_by_char_span(parent_id, text);
    }

    let mut chunks_text: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_len = 0usize;

    for sentence in &sentences {
        let added_len = sentence.len() + 1;
        if current_len + added_len > TARGET_CHUNK_CHARS && !current.is_empty() {
            chunks_text.push(current.join(" "));
            let overlap_start = current.len().saturating_sub(OVERLAP_SENTENCES);
            let overlap: Vec<&str> = current[overlap_start..].to_vec();
            current_len = overlap.iter().map(|s| s.len() + 1).sum();
            current = overlap;
        }
        current.push(sentence);
        current_len += added_len;
        if current_len > MAX_CHUNK_CHARS {
            chunks_text.push(current.join(" "));
            current.clear();
            current_len = 0;
        }
    }
    if !current.is_empty() {
        chunks_text.push(current.join(" "));
    }

    let total = chunks_text.len();
    chunks_text
        .into_iter()
        .enumerate()
        .map(|(index, text)| Chunk {
            id: format!("{parent_id}#chunk-{index}"),
            parent_document_id: parent_id.to_string(),
            chunk_index: index,
            total_chunks: total,
            text,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_a_single_chunk() {
        let chunks = chunk_document("doc-1", "A short note about a seller.");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].total_chunks, 1);
    }

    #[test]
    fn long_text_splits_on_sentence_boundaries_with_overlap() {
        let sentence = "The seller created a new listing for electronics. ";
        let text: String = sentence.repeat(80);
        let chunks = chunk_document("doc-2", &text);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.text.len() <= 2048 + 200);
            assert_eq!(chunk.total_chunks, chunks.len());
        }
    }

    #[test]
    fn text_without_sentence_boundaries_falls_back_to_char_spans() {
        let text = "x".repeat(3000);
        let chunks = chunk_document("doc-3", &text);
        assert!(chunks.len() > 1);
        assert!(chunks[0].text.len() <= TARGET_CHUNK_CHARS);
    }
}
