mod batch;
mod config;
mod emit;
mod error_log;
mod parser;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};

use batch::{collect_jobs, run_batch, OutputKind};
use error_log::{ErrorLog, ERROR_LOG_NAME};
use parser::pages::{PageExtractor, PdfPageExtractor};

#[derive(Parser)]
#[command(
    name = "reso_chunker",
    about = "Turn university resolution PDFs into NDJSON chunk records"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write one NDJSON file of chunk records per PDF
    Run {
        #[command(flatten)]
        batch: BatchArgs,
    },
    /// Write one JSON summary per PDF
    Summary {
        #[command(flatten)]
        batch: BatchArgs,
    },
    /// Print what the pipeline sees in a single PDF (no files written)
    Inspect {
        file: PathBuf,
        /// Settings file (TOML) layered over the defaults
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Max chunks to preview
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },
}

#[derive(clap::Args)]
struct BatchArgs {
    /// Directory holding the PDFs
    #[arg(short, long)]
    input: PathBuf,
    /// Directory for output files and the error log
    #[arg(short, long)]
    output: PathBuf,
    /// Also process each sub-directory (e.g. one per year), mirrored in the output
    #[arg(short, long)]
    recursive: bool,
    /// Settings file (TOML) layered over the defaults
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { batch } => run(&batch, OutputKind::Records),
        Commands::Summary { batch } => run(&batch, OutputKind::Summary),
        Commands::Inspect {
            file,
            config,
            limit,
        } => inspect(&file, config.as_deref(), limit),
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn run(args: &BatchArgs, kind: OutputKind) -> anyhow::Result<()> {
    let cfg = config::load(args.config.as_deref())?;

    let jobs = collect_jobs(&args.input, &args.output, args.recursive)?;
    if jobs.is_empty() {
        println!("No PDF files found in {}.", args.input.display());
        return Ok(());
    }

    fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create {:?}", args.output))?;
    let mut log = ErrorLog::create(&args.output.join(ERROR_LOG_NAME))?;

    println!("Processing {} documents...", jobs.len());
    let report = run_batch(&jobs, &PdfPageExtractor, &cfg, kind, &mut log);
    report.print();

    if log.entries() > 0 {
        println!("Failures logged to {}", log.path().display());
    }
    log.close()?;
    Ok(())
}

fn inspect(file: &Path, config_path: Option<&Path>, limit: usize) -> anyhow::Result<()> {
    let cfg = config::load(config_path)?;
    let filename = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string());

    let pages = PdfPageExtractor
        .extract(file)
        .with_context(|| format!("Failed to extract pages from {}", filename))?;
    let doc = parser::segment_document(&filename, pages, &cfg);
    let meta = &doc.metadata;

    let show = |v: Option<String>| v.unwrap_or_else(|| "-".into());
    println!("File:      {}", doc.filename);
    println!("Pages:     {}", doc.pages.len());
    println!("Id:        {}", meta.id_reso);
    println!("Acta:      {}", show(meta.acta.clone()));
    println!("Tipo:      {}", show(meta.tipo.as_ref().map(|t| t.to_string())));
    println!("Fecha:     {}", show(meta.fecha_texto.clone()));
    println!("Fecha ISO: {}", show(meta.fecha_iso.clone()));
    println!("Considerando paragraphs: {}", doc.considerando.paragraphs.len());
    println!("Resuelve paragraphs:     {}", doc.resuelve.paragraphs.len());

    let chunks: Vec<_> = doc.chunks(&cfg).collect();
    println!("\n--- Chunks ({}) ---", chunks.len());
    for c in chunks.iter().take(limit) {
        let pages = match (c.page_start, c.page_end) {
            (Some(a), Some(b)) if a == b => format!("p{}", a),
            (Some(a), Some(b)) => format!("p{}-{}", a, b),
            _ => "p?".to_string(),
        };
        println!(
            "{:<12} #{:<3} {:<6} {}",
            c.kind.as_str(),
            c.paragraph_index,
            pages,
            truncate(&c.text.replace('\n', " "), 70)
        );
    }
    if chunks.len() > limit {
        println!("... {} more", chunks.len() - limit);
    }
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
