use sha1::{Digest, Sha1};

use super::sections::SectionKind;

/// Bounded slice of one paragraph, with its best-effort page attribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub kind: SectionKind,
    pub paragraph_index: usize,
    pub text: String,
    pub page_start: Option<usize>,
    pub page_end: Option<usize>,
    pub content_hash: String,
}

/// Cut a paragraph into consecutive slices of `limit` characters (the last
/// one may be shorter). Concatenating the slices gives back the trimmed
/// paragraph exactly.
pub fn chunk_paragraph(text: &str, limit: usize) -> Vec<String> {
    let text = text.trim();
    if limit == 0 || text.chars().count() <= limit {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;
    for (i, _) in text.char_indices() {
        if count == limit {
            chunks.push(text[start..i].to_string());
            start = i;
            count = 0;
        }
        count += 1;
    }
    chunks.push(text[start..].to_string());
    chunks
}

/// Lowercase hex SHA-1 of the chunk text.
pub fn content_hash(text: &str) -> String {
    format!("{:x}", Sha1::digest(text.as_bytes()))
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_paragraph_is_one_chunk() {
        assert_eq!(chunk_paragraph("Aprobar el informe.", 1000), vec!["Aprobar el informe."]);
    }

    #[test]
    fn paragraph_at_limit_is_not_split() {
        let text = "a".repeat(1000);
        assert_eq!(chunk_paragraph(&text, 1000), vec![text.clone()]);
    }

    #[test]
    fn long_paragraph_is_sliced_in_order() {
        let text = "abcdefghij".repeat(25);
        let chunks = chunk_paragraph(&text, 100);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chars().count(), 100);
        assert_eq!(chunks[1].chars().count(), 100);
        assert_eq!(chunks[2].chars().count(), 50);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn limit_counts_characters_not_bytes() {
        let text = "ñáéíóú".repeat(50);
        let chunks = chunk_paragraph(&text, 100);
        assert!(chunks.iter().all(|c| c.chars().count() <= 100));
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn chunks_reconstruct_trimmed_paragraph_with_inner_spaces() {
        let words = "  Que, el Consejo Universitario en uso de sus atribuciones resuelve  ";
        let text = words.repeat(40);
        let chunks = chunk_paragraph(&text, 97);
        assert!(chunks.iter().all(|c| c.chars().count() <= 97));
        assert_eq!(chunks.concat(), text.trim());
    }

    #[test]
    fn hash_depends_only_on_text() {
        assert_eq!(content_hash("abc"), "a9993e364706816aba3e25717850c26c9cd0d89d");
        assert_eq!(content_hash("Que, A."), content_hash("Que, A."));
        assert_ne!(content_hash("Que, A."), content_hash("Que, B."));
    }
}
