use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::metadata::SessionType;
use super::SegmentedDocument;

// "Dra. Ana Lucía Pérez, RECTORA"
static SIGNATORY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-ZÁÉÍÓÚÑ][^,]{2,},\s*[A-ZÁÉÍÓÚÑ][A-ZÁÉÍÓÚÑ ]{2,}$").unwrap()
});

/// One JSON object describing a whole resolution.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentSummary {
    pub archivo_origen: String,
    pub id_reso: String,
    /// ISO date when the month was recognized, otherwise the raw text.
    pub fecha: Option<String>,
    pub acta: Option<String>,
    pub tipo: Option<SessionType>,
    pub considerando: Vec<String>,
    pub resuelve: Vec<String>,
    pub firmante: Option<String>,
}

pub fn summarize(doc: &SegmentedDocument) -> DocumentSummary {
    let meta = &doc.metadata;
    DocumentSummary {
        archivo_origen: doc.filename.clone(),
        id_reso: meta.id_reso.clone(),
        fecha: meta.fecha_iso.clone().or_else(|| meta.fecha_texto.clone()),
        acta: meta.acta.clone(),
        tipo: meta.tipo.clone(),
        considerando: doc.considerando.texts(),
        resuelve: doc.resuelve.texts(),
        firmante: find_signatory(&doc.text),
    }
}

/// Last line shaped like `<Name>, <UPPERCASE TITLE>`.
pub fn find_signatory(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.starts_with("Que"))
        .filter(|line| SIGNATORY_RE.is_match(line))
        .last()
        .map(str::to_string)
}

// ── Tests ──
