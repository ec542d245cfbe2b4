pub mod chunks;
pub mod metadata;
pub mod normalize;
pub mod page_map;
pub mod pages;
pub mod sections;
pub mod summary;

use crate::config::ExtractionConfig;
use chunks::{chunk_paragraph, content_hash, Chunk};
use metadata::DocumentMetadata;
use normalize::CleanedPage;
use page_map::PageMapper;
use pages::RawPage;
use sections::Section;

/// Everything derived from one document before records are emitted.
#[derive(Debug, Clone)]
pub struct SegmentedDocument {
    pub filename: String,
    pub metadata: DocumentMetadata,
    pub pages: Vec<CleanedPage>,
    /// Normalized pages joined in order.
    pub text: String,
    pub considerando: Section,
    pub resuelve: Section,
    page_map: PageMapper,
}

/// Pages → metadata (raw text) + normalized text → sections. Never fails:
/// unmatched fields and missing sections come back empty.
pub fn segment_document<I>(filename: &str, pages: I, cfg: &ExtractionConfig) -> SegmentedDocument
where
    I: IntoIterator<Item = RawPage>,
{
    let mut raw_text = String::new();
    let mut cleaned = Vec::new();
    for page in pages {
        if !cleaned.is_empty() {
            raw_text.push('\n');
        }
        raw_text.push_str(&page.raw_text);
        cleaned.push(CleanedPage {
            page_number: page.page_number,
            cleaned_text: normalize::normalize_page(&page.raw_text, &cfg.boilerplate),
        });
    }

    let metadata = metadata::extract_metadata(&raw_text, filename, cfg);
    let text = cleaned
        .iter()
        .map(|p| p.cleaned_text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string();
    let (considerando, resuelve) = sections::split_sections(&text, cfg);
    let page_map = PageMapper::new(&cleaned);

    SegmentedDocument {
        filename: filename.to_string(),
        metadata,
        pages: cleaned,
        text,
        considerando,
        resuelve,
        page_map,
    }
}

impl SegmentedDocument {
    /// Chunks in emission order: recitals first, then operative clauses.
    pub fn chunks<'a>(&'a self, cfg: &'a ExtractionConfig) -> impl Iterator<Item = Chunk> + 'a {
        [&self.considerando, &self.resuelve]
            .into_iter()
            .flat_map(move |section| {
                section.paragraphs.iter().flat_map(move |paragraph| {
                    chunk_paragraph(&paragraph.text, cfg.char_limit)
                        .into_iter()
                        .map(move |text| {
                            let (page_start, page_end) =
                                self.page_map.locate(&text, cfg.page_key_len);
                            Chunk {
                                kind: section.kind,
                                paragraph_index: paragraph.index,
                                content_hash: content_hash(&text),
                                text,
                                page_start,
                                page_end,
                            }
                        })
                })
            })
    }
}

// ── Tests ──
