use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::config::ExtractionConfig;
use crate::parser::chunks::Chunk;
use crate::parser::metadata::DocumentMetadata;
use crate::parser::sections::SectionKind;
use crate::parser::summary::DocumentSummary;
use crate::parser::SegmentedDocument;

/// One output line. Absent fields are written as `null`, never skipped.
#[derive(Debug, Serialize)]
pub struct Record<'a> {
    pub id_reso: &'a str,
    pub acta: Option<&'a str>,
    pub anio: Option<i32>,
    pub fecha_iso: Option<&'a str>,
    pub fecha: Option<&'a str>,
    pub seccion: SectionKind,
    pub parrafo_index: usize,
    pub pagina_inicio: Option<usize>,
    pub pagina_fin: Option<usize>,
    pub texto: &'a str,
    pub fuente_pdf: &'a str,
    pub sha1: &'a str,
}

impl<'a> Record<'a> {
    pub fn new(meta: &'a DocumentMetadata, chunk: &'a Chunk, filename: &'a str) -> Self {
        Record {
            id_reso: &meta.id_reso,
            acta: meta.acta.as_deref(),
            anio: meta.anio,
            fecha_iso: meta.fecha_iso.as_deref(),
            fecha: meta.fecha_texto.as_deref(),
            seccion: chunk.kind,
            parrafo_index: chunk.paragraph_index,
            pagina_inicio: chunk.page_start,
            pagina_fin: chunk.page_end,
            texto: &chunk.text,
            fuente_pdf: filename,
            sha1: &chunk.content_hash,
        }
    }
}

/// Newline-delimited JSON sink, flushed after every record so that a failure
/// mid-document leaves the already written lines on disk.
pub struct RecordWriter<W: Write> {
    out: W,
    written: usize,
}

impl RecordWriter<BufWriter<File>> {
    /// Create (or truncate) the destination file.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
        Ok(RecordWriter::new(BufWriter::new(file)))
    }
}

impl<W: Write> RecordWriter<W> {
    pub fn new(out: W) -> Self {
        RecordWriter { out, written: 0 }
    }

    pub fn write(&mut self, record: &Record) -> Result<()> {
        serde_json::to_writer(&mut self.out, record)?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        self.written += 1;
        Ok(())
    }

    pub fn written(&self) -> usize {
        self.written
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Write every chunk of the document as it is produced. Returns the number
/// of records written.
pub fn emit_document<W: Write>(
    doc: &SegmentedDocument,
    cfg: &ExtractionConfig,
    writer: &mut RecordWriter<W>,
) -> Result<usize> {
    let before = writer.written();
    for chunk in doc.chunks(cfg) {
        writer.write(&Record::new(&doc.metadata, &chunk, &doc.filename))?;
    }
    Ok(writer.written() - before)
}

pub fn write_summary(path: &Path, summary: &DocumentSummary) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, summary)?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::pages::RawPage;
    use crate::parser::segment_document;

    const FIELDS: [&str; 12] = [
        "id_reso",
        "acta",
        "anio",
        "fecha_iso",
        "fecha",
        "seccion",
        "parrafo_index",
        "pagina_inicio",
        "pagina_fin",
        "texto",
        "fuente_pdf",
        "sha1",
    ];

    fn doc(raw: &str, filename: &str, cfg: &ExtractionConfig) -> SegmentedDocument {
        let pages = vec![RawPage {
            page_number: 1,
            raw_text: raw.to_string(),
        }];
        segment_document(filename, pages, cfg)
    }

    fn emit_to_lines(doc: &SegmentedDocument, cfg: &ExtractionConfig) -> Vec<serde_json::Value> {
        let mut writer = RecordWriter::new(Vec::new());
        emit_document(doc, cfg, &mut writer).unwrap();
        let bytes = writer.into_inner();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn every_record_has_all_fields_in_order() {
        let cfg = ExtractionConfig::default();
        let d = doc(
            "CONSIDERANDO:\nQue, el Estatuto regula la organización académica.\nRESUELVE:\n1. Aprobar la reforma.",
            "Resolución_UC-CU-RES-022-2025.pdf",
            &cfg,
        );
        let mut writer = RecordWriter::new(Vec::new());
        assert_eq!(emit_document(&d, &cfg, &mut writer).unwrap(), 2);
        let out = String::from_utf8(writer.into_inner()).unwrap();

        for line in out.lines() {
            let keys: Vec<String> = serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(line)
                .unwrap()
                .keys()
                .cloned()
                .collect();
            let mut expected: Vec<String> = FIELDS.iter().map(|s| s.to_string()).collect();
            expected.sort();
            let mut keys_sorted = keys.clone();
            keys_sorted.sort();
            assert_eq!(keys_sorted, expected);
            assert!(line.starts_with("{\"id_reso\":"));
        }
        assert!(out.ends_with('\n'));
    }

    #[test]
    fn absent_metadata_is_explicit_null() {
        let cfg = ExtractionConfig::default();
        let d = doc("RESUELVE:\n1. Aprobar la reforma.", "Resolución_UC-CU-RES-022-2025.pdf", &cfg);
        let lines = emit_to_lines(&d, &cfg);
        assert_eq!(lines.len(), 1);
        let r = &lines[0];
        assert_eq!(r["id_reso"], "UC-CU-RES-022-2025");
        assert!(r["acta"].is_null());
        assert!(r["anio"].is_null());
        assert!(r["fecha_iso"].is_null());
        assert!(r["fecha"].is_null());
        assert_eq!(r["seccion"], "resuelve");
        assert_eq!(r["parrafo_index"], 0);
        assert_eq!(r["pagina_inicio"], 1);
        assert_eq!(r["pagina_fin"], 1);
        assert_eq!(r["texto"], "Aprobar la reforma.");
        assert_eq!(r["fuente_pdf"], "Resolución_UC-CU-RES-022-2025.pdf");
        assert_eq!(r["sha1"], content_hash_of("Aprobar la reforma."));
    }

    #[test]
    fn non_ascii_is_written_verbatim() {
        let cfg = ExtractionConfig::default();
        let d = doc("RESUELVE:\n1. Aprobar la resolución académica.", "r.pdf", &cfg);
        let mut writer = RecordWriter::new(Vec::new());
        emit_document(&d, &cfg, &mut writer).unwrap();
        let out = String::from_utf8(writer.into_inner()).unwrap();
        assert!(out.contains("resolución académica"));
    }

    #[test]
    fn recitals_come_before_operative_clauses() {
        let cfg = ExtractionConfig::default();
        let d = doc(
            "CONSIDERANDO:\nQue, primer considerando con longitud suficiente.\n\
             Que, segundo considerando con longitud suficiente.\nRESUELVE:\n1. Primera decisión.\n2. Segunda decisión.",
            "r.pdf",
            &cfg,
        );
        let lines = emit_to_lines(&d, &cfg);
        let order: Vec<(String, u64)> = lines
            .iter()
            .map(|r| (r["seccion"].as_str().unwrap().to_string(), r["parrafo_index"].as_u64().unwrap()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("considerando".to_string(), 0),
                ("considerando".to_string(), 1),
                ("resuelve".to_string(), 0),
                ("resuelve".to_string(), 1),
            ]
        );
    }

    #[test]
    fn create_truncates_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.ndjson");
        std::fs::write(&path, "stale line from an interrupted run\n").unwrap();

        let cfg = ExtractionConfig::default();
        let d = doc("RESUELVE:\n1. Aprobar la reforma.", "r.pdf", &cfg);
        let mut writer = RecordWriter::create(&path).unwrap();
        emit_document(&d, &cfg, &mut writer).unwrap();
        drop(writer);

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("stale"));
        assert_eq!(content.lines().count(), 1);
    }

    fn content_hash_of(text: &str) -> String {
        crate::parser::chunks::content_hash(text)
    }
}
