use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use crate::config::ExtractionConfig;
use crate::emit::{emit_document, write_summary, RecordWriter};
use crate::error_log::FailureLog;
use crate::parser::pages::PageExtractor;
use crate::parser::segment_document;
use crate::parser::summary::summarize;

/// What each document produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// One NDJSON line per chunk.
    Records,
    /// One pretty-printed JSON summary.
    Summary,
}

impl OutputKind {
    fn extension(self) -> &'static str {
        match self {
            OutputKind::Records => "ndjson",
            OutputKind::Summary => "json",
        }
    }
}

/// A source document and the directory its output goes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentJob {
    pub source: PathBuf,
    pub filename: String,
    pub dest_dir: PathBuf,
}

impl DocumentJob {
    pub fn destination(&self, kind: OutputKind) -> PathBuf {
        let stem = Path::new(&self.filename)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.filename.clone());
        self.dest_dir.join(format!("{}.{}", stem, kind.extension()))
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub documents: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub records: usize,
}

impl BatchReport {
    pub fn print(&self) {
        println!(
            "Processed {} documents ({} ok, {} failed), {} records written.",
            self.documents, self.succeeded, self.failed, self.records,
        );
    }
}

/// PDF files of `input`, sorted by file name. With `recursive`, each
/// immediate sub-directory (the per-year folders) is mirrored under `output`.
pub fn collect_jobs(input: &Path, output: &Path, recursive: bool) -> Result<Vec<DocumentJob>> {
    let mut jobs: Vec<DocumentJob> = pdf_files(input)?
        .into_iter()
        .map(|(source, filename)| DocumentJob {
            source,
            filename,
            dest_dir: output.to_path_buf(),
        })
        .collect();

    if recursive {
        let mut subdirs: Vec<(String, PathBuf)> = fs::read_dir(input)
            .with_context(|| format!("Failed to list {:?}", input))?
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .map(|e| (e.file_name().to_string_lossy().into_owned(), e.path()))
            .collect();
        subdirs.sort();

        for (name, dir) in subdirs {
            let dest_dir = output.join(&name);
            for (source, filename) in pdf_files(&dir)? {
                jobs.push(DocumentJob {
                    source,
                    filename,
                    dest_dir: dest_dir.clone(),
                });
            }
        }
    }

    Ok(jobs)
}

fn pdf_files(dir: &Path) -> Result<Vec<(PathBuf, String)>> {
    let mut files: Vec<(PathBuf, String)> = fs::read_dir(dir)
        .with_context(|| format!("Failed to list {:?}", dir))?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|e| (e.path(), e.file_name().to_string_lossy().into_owned()))
        .filter(|(_, name)| name.to_lowercase().ends_with(".pdf"))
        .collect();
    files.sort_by(|a, b| a.1.cmp(&b.1));
    Ok(files)
}

/// Run the whole pipeline for one document. Only page extraction is
/// expected to fail; output I/O errors are reported the same way.
pub fn process_document<E: PageExtractor + ?Sized>(
    extractor: &E,
    cfg: &ExtractionConfig,
    job: &DocumentJob,
    kind: OutputKind,
) -> Result<usize> {
    let pages = extractor
        .extract(&job.source)
        .with_context(|| format!("Failed to extract pages from {}", job.filename))?;
    let doc = segment_document(&job.filename, pages, cfg);
    debug!(
        file = %job.filename,
        pages = doc.pages.len(),
        considerando = doc.considerando.paragraphs.len(),
        resuelve = doc.resuelve.paragraphs.len(),
        "segmented"
    );

    fs::create_dir_all(&job.dest_dir)
        .with_context(|| format!("Failed to create {:?}", job.dest_dir))?;
    let dest = job.destination(kind);
    match kind {
        OutputKind::Records => {
            let mut writer = RecordWriter::create(&dest)?;
            emit_document(&doc, cfg, &mut writer)
        }
        OutputKind::Summary => {
            write_summary(&dest, &summarize(&doc))?;
            Ok(1)
        }
    }
}

/// Process every job in order. A failing document is logged and skipped;
/// it never stops the batch.
pub fn run_batch<E, L>(
    jobs: &[DocumentJob],
    extractor: &E,
    cfg: &ExtractionConfig,
    kind: OutputKind,
    log: &mut L,
) -> BatchReport
where
    E: PageExtractor + ?Sized,
    L: FailureLog + ?Sized,
{
    let pb = ProgressBar::new(jobs.len() as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-"),
    );

    let mut report = BatchReport {
        documents: jobs.len(),
        ..BatchReport::default()
    };

    for job in jobs {
        pb.set_message(job.filename.clone());
        match process_document(extractor, cfg, job, kind) {
            Ok(records) => {
                report.succeeded += 1;
                report.records += records;
                info!(file = %job.filename, records, "OK");
            }
            Err(e) => {
                report.failed += 1;
                let chain = format!("{:#}", e);
                warn!(file = %job.filename, error = %chain, "document failed");
                if let Err(log_err) = log.record(&job.filename, &e) {
                    warn!(file = %job.filename, error = %log_err, "could not write error log entry");
                }
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    report
}

// ── Tests ──
