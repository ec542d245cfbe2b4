use super::normalize::CleanedPage;

/// Best-effort page attribution: a chunk belongs to the first page whose
/// whitespace-collapsed text contains the chunk's leading characters.
/// Repeated phrasing across pages attributes to the earliest one.
#[derive(Debug, Clone, Default)]
pub struct PageMapper {
    pages: Vec<(usize, String)>,
}

impl PageMapper {
    pub fn new(pages: &[CleanedPage]) -> Self {
        let pages = pages
            .iter()
            .map(|p| (p.page_number, collapse_whitespace(&p.cleaned_text)))
            .collect();
        PageMapper { pages }
    }

    /// `(page, page)` on a hit, `(None, None)` when no single page holds the
    /// prefix, e.g. when it straddles a page break.
    pub fn locate(&self, chunk: &str, key_len: usize) -> (Option<usize>, Option<usize>) {
        let prefix: String = chunk.chars().take(key_len).collect();
        let key = collapse_whitespace(&prefix);
        if key.is_empty() {
            return (None, None);
        }

        self.pages
            .iter()
            .find(|(_, text)| text.contains(&key))
            .map(|(page, _)| (Some(*page), Some(*page)))
            .unwrap_or((None, None))
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ── Tests ──
