use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::config::ExtractionConfig;

static CONSIDERANDO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bCONSIDERANDO\b:?").unwrap());
static RESUELVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bRESUEL(?:VE|VO)\b:?").unwrap());
static QUE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bQue\b\s*,?\s*").unwrap());
static ENUM_ITEM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^\s*\d+\.\s+").unwrap());

const QUE_SEPARATOR: &str = "Que, ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Considerando,
    Resuelve,
}

impl SectionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SectionKind::Considerando => "considerando",
            SectionKind::Resuelve => "resuelve",
        }
    }
}

/// A retained paragraph. `index` is its position in the split, so dropped
/// short fragments leave gaps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    pub index: usize,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct Section {
    pub kind: SectionKind,
    pub paragraphs: Vec<Paragraph>,
}

impl Section {
    fn from_fragments(kind: SectionKind, fragments: Vec<String>, min_len: usize) -> Self {
        let paragraphs = fragments
            .into_iter()
            .enumerate()
            .filter(|(_, text)| text.chars().count() >= min_len)
            .map(|(index, text)| Paragraph { index, text })
            .collect();
        Section { kind, paragraphs }
    }

    pub fn texts(&self) -> Vec<String> {
        self.paragraphs.iter().map(|p| p.text.clone()).collect()
    }
}

/// Recitals and operative bodies of the normalized text. A missing marker
/// yields an empty body, never an error.
pub fn locate_bodies(text: &str) -> (&str, &str) {
    let cons = CONSIDERANDO_RE.find(text);
    let resv = RESUELVE_RE.find(text);

    match (cons, resv) {
        (Some(c), Some(r)) if c.start() < r.start() => {
            (text[c.end()..r.start()].trim(), text[r.end()..].trim())
        }
        (_, Some(r)) => ("", text[r.end()..].trim()),
        (Some(c), None) => (text[c.end()..].trim(), ""),
        (None, None) => ("", ""),
    }
}

/// Split recitals on every standalone "Que" (optionally followed by a comma)
/// and give each fragment back a uniform "Que, " prefix.
pub fn split_considerando(body: &str) -> Vec<String> {
    QUE_RE
        .split(body)
        .map(str::trim)
        .filter(|frag| !frag.is_empty())
        .map(|frag| format!("{}{}", QUE_SEPARATOR, frag))
        .collect()
}

/// Split operative clauses at line-start `N. ` markers. Text before the first
/// marker is discarded; with no markers the whole body is one clause.
pub fn split_resuelve(body: &str) -> Vec<String> {
    let markers: Vec<_> = ENUM_ITEM_RE.find_iter(body).collect();
    if markers.is_empty() {
        let whole = body.trim();
        return if whole.is_empty() {
            Vec::new()
        } else {
            vec![whole.to_string()]
        };
    }

    markers
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let end = markers.get(i + 1).map_or(body.len(), |next| next.start());
            body[m.end()..end].trim()
        })
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn split_sections(text: &str, cfg: &ExtractionConfig) -> (Section, Section) {
    let (cons_body, resv_body) = locate_bodies(text);
    let considerando = Section::from_fragments(
        SectionKind::Considerando,
        split_considerando(cons_body),
        cfg.min_len_considerando,
    );
    let resuelve = Section::from_fragments(
        SectionKind::Resuelve,
        split_resuelve(resv_body),
        cfg.min_len_resuelve,
    );
    (considerando, resuelve)
}

// ── Tests ──
