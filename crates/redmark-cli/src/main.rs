use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use redmark_core::{
    PmlComparer, PmlComparerSettings, PmlDocument, RedmarkError, SmlComparer,
    SmlComparerSettings, SmlDocument, WmlComparer, WmlComparerSettings, WmlDocument,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const EXIT_OK: u8 = 0;
const EXIT_INVALID_INPUT: u8 = 1;
const EXIT_RUNTIME: u8 = 2;
const EXIT_CANCELLED: u8 = 3;

#[derive(Parser)]
#[command(name = "redmark")]
#[command(about = "Compare OOXML documents and produce redlined output", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display basic information about a document
    Info {
        file: PathBuf,
    },
    /// List the parts of an OOXML package
    ListParts {
        file: PathBuf,
    },
    /// Extract the plain text of a Word document
    ExtractText {
        file: PathBuf,
    },
    /// Compare two documents; writes a marked output when a path is given
    Compare {
        /// Original document (before changes)
        older: PathBuf,
        /// Modified document (after changes)
        newer: PathBuf,
        /// Output path for the marked document
        output: Option<PathBuf>,

        /// Document type: auto, docx, xlsx, pptx
        #[arg(short = 't', long, default_value = "auto")]
        doc_type: String,

        /// Author for revisions and annotations
        #[arg(long)]
        author: Option<String>,

        /// Revision timestamp, ISO-8601 (defaults to now UTC)
        #[arg(long)]
        date: Option<String>,

        /// Emit the change report as JSON on stdout
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let code = match cli.command {
        Commands::Info { file } => run_info(&file),
        Commands::ListParts { file } => run_list_parts(&file),
        Commands::ExtractText { file } => run_extract_text(&file),
        Commands::Compare {
            older,
            newer,
            output,
            doc_type,
            author,
            date,
            json,
        } => run_compare(&older, &newer, output, &doc_type, author, date, json),
    };
    match code {
        Ok(()) => ExitCode::from(EXIT_OK),
        Err(exit) => exit,
    }
}

fn fail(message: &str, code: u8) -> ExitCode {
    eprintln!("Error: {message}");
    ExitCode::from(code)
}

fn exit_code_for(err: &RedmarkError) -> u8 {
    match err {
        RedmarkError::MalformedPackage { .. }
        | RedmarkError::UnsupportedContent { .. }
        | RedmarkError::InvalidSetting { .. } => EXIT_INVALID_INPUT,
        RedmarkError::Cancelled => EXIT_CANCELLED,
        _ => EXIT_RUNTIME,
    }
}

fn detect_doc_type(path: &Path, hint: &str) -> Result<&'static str, ExitCode> {
    if hint != "auto" {
        return match hint {
            "docx" => Ok("docx"),
            "xlsx" => Ok("xlsx"),
            "pptx" => Ok("pptx"),
            other => Err(fail(&format!("unknown document type: {other}"), EXIT_INVALID_INPUT)),
        };
    }
    match path.extension().and_then(|e| e.to_str()) {
        Some("docx") => Ok("docx"),
        Some("xlsx") => Ok("xlsx"),
        Some("pptx") => Ok("pptx"),
        Some(ext) => Err(fail(&format!("unknown file extension: .{ext}"), EXIT_INVALID_INPUT)),
        None => Err(fail(
            "cannot detect document type without a file extension",
            EXIT_INVALID_INPUT,
        )),
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, ExitCode> {
    std::fs::read(path)
        .map_err(|e| fail(&format!("failed to read {}: {e}", path.display()), EXIT_INVALID_INPUT))
}

fn run_info(file: &PathBuf) -> Result<(), ExitCode> {
    let bytes = read_file(file)?;
    let doc_type = detect_doc_type(file, "auto")?;
    let package = redmark_core::package::OpcPackage::open(&bytes)
        .map_err(|e| fail(&e.to_string(), exit_code_for(&e)))?;

    println!("Document: {}", file.display());
    println!("Type:     {doc_type}");
    println!("Size:     {} bytes", bytes.len());
    println!("Parts:    {}", package.part_names().len());
    Ok(())
}

fn run_list_parts(file: &PathBuf) -> Result<(), ExitCode> {
    let bytes = read_file(file)?;
    let package = redmark_core::package::OpcPackage::open(&bytes)
        .map_err(|e| fail(&e.to_string(), exit_code_for(&e)))?;
    for name in package.part_names() {
        println!("{name}");
    }
    Ok(())
}

fn run_extract_text(file: &PathBuf) -> Result<(), ExitCode> {
    let bytes = read_file(file)?;
    let document = WmlDocument::from_bytes(&bytes)
        .map_err(|e| fail(&e.to_string(), exit_code_for(&e)))?;
    let text = redmark_core::wml::extract_all_text(&document)
        .map_err(|e| fail(&e.to_string(), exit_code_for(&e)))?;
    println!("{text}");
    Ok(())
}

fn parse_date(date: Option<String>) -> Result<Option<DateTime<Utc>>, ExitCode> {
    match date {
        None => Ok(None),
        Some(raw) => match DateTime::parse_from_rfc3339(&raw) {
            Ok(parsed) => Ok(Some(parsed.with_timezone(&Utc))),
            Err(e) => Err(fail(&format!("invalid --date '{raw}': {e}"), EXIT_INVALID_INPUT)),
        },
    }
}

#[allow(clippy::too_many_arguments)]
fn run_compare(
    older: &PathBuf,
    newer: &PathBuf,
    output: Option<PathBuf>,
    doc_type: &str,
    author: Option<String>,
    date: Option<String>,
    json: bool,
) -> Result<(), ExitCode> {
    let doc_type = detect_doc_type(older, doc_type)?;
    let bytes1 = read_file(older)?;
    let bytes2 = read_file(newer)?;
    let date = parse_date(date)?;

    match doc_type {
        "docx" => {
            let doc1 = WmlDocument::from_bytes(&bytes1)
                .map_err(|e| fail(&e.to_string(), exit_code_for(&e)))?;
            let doc2 = WmlDocument::from_bytes(&bytes2)
                .map_err(|e| fail(&e.to_string(), exit_code_for(&e)))?;

            let mut settings = WmlComparerSettings::default();
            if let Some(author) = author {
                settings.author = author;
            }
            if let Some(date) = date {
                settings.date_time = date;
            }

            let result = if output.is_some() {
                WmlComparer::produce_marked_document(&doc1, &doc2, Some(&settings))
            } else {
                WmlComparer::compare(&doc1, &doc2, Some(&settings))
            }
            .map_err(|e| fail(&e.to_string(), exit_code_for(&e)))?;

            if let (Some(path), Some(document)) = (&output, &result.document) {
                std::fs::write(path, document).map_err(|e| {
                    fail(&format!("failed to write {}: {e}", path.display()), EXIT_RUNTIME)
                })?;
            }

            if json {
                let report = serde_json::json!({
                    "insertions": result.insertions,
                    "deletions": result.deletions,
                    "total": result.revision_count(),
                    "changes": result.changes,
                });
                println!("{report}");
            } else {
                println!("Comparison complete:");
                println!("  Insertions: {}", result.insertions);
                println!("  Deletions:  {}", result.deletions);
                println!("  Total:      {}", result.revision_count());
                if let Some(path) = &output {
                    println!("  Output:     {}", path.display());
                }
            }
        }
        "xlsx" => {
            let doc1 = SmlDocument::from_bytes(&bytes1)
                .map_err(|e| fail(&e.to_string(), exit_code_for(&e)))?;
            let doc2 = SmlDocument::from_bytes(&bytes2)
                .map_err(|e| fail(&e.to_string(), exit_code_for(&e)))?;

            let mut settings = SmlComparerSettings::default();
            if let Some(author) = author {
                settings.author = author;
            }

            let (marked, result) = SmlComparer::compare_and_render(&doc1, &doc2, Some(&settings))
                .map_err(|e| fail(&e.to_string(), exit_code_for(&e)))?;

            if let Some(path) = &output {
                let bytes = marked
                    .to_bytes()
                    .map_err(|e| fail(&e.to_string(), EXIT_RUNTIME))?;
                std::fs::write(path, bytes).map_err(|e| {
                    fail(&format!("failed to write {}: {e}", path.display()), EXIT_RUNTIME)
                })?;
            }

            if json {
                let report = serde_json::json!({
                    "total": result.total_changes(),
                    "cellsAdded": result.cells_added(),
                    "cellsDeleted": result.cells_deleted(),
                    "valueChanges": result.value_changes(),
                    "formulaChanges": result.formula_changes(),
                    "changes": result.changes,
                });
                println!("{report}");
            } else {
                println!("Comparison complete:");
                println!("  Value changes:   {}", result.value_changes());
                println!("  Formula changes: {}", result.formula_changes());
                println!("  Cells added:     {}", result.cells_added());
                println!("  Cells deleted:   {}", result.cells_deleted());
                println!("  Total changes:   {}", result.total_changes());
                if let Some(path) = &output {
                    println!("  Output:          {}", path.display());
                }
            }
        }
        "pptx" => {
            let doc1 = PmlDocument::from_bytes(&bytes1)
                .map_err(|e| fail(&e.to_string(), exit_code_for(&e)))?;
            let doc2 = PmlDocument::from_bytes(&bytes2)
                .map_err(|e| fail(&e.to_string(), exit_code_for(&e)))?;

            let mut settings = PmlComparerSettings::default();
            if let Some(author) = author {
                settings.author = author;
            }

            let (marked, result) = PmlComparer::compare_and_render(&doc1, &doc2, Some(&settings))
                .map_err(|e| fail(&e.to_string(), exit_code_for(&e)))?;

            if let Some(path) = &output {
                let bytes = marked
                    .to_bytes()
                    .map_err(|e| fail(&e.to_string(), EXIT_RUNTIME))?;
                std::fs::write(path, bytes).map_err(|e| {
                    fail(&format!("failed to write {}: {e}", path.display()), EXIT_RUNTIME)
                })?;
            }

            if json {
                let report = serde_json::json!({
                    "total": result.total_changes(),
                    "slidesInserted": result.slides_inserted(),
                    "slidesDeleted": result.slides_deleted(),
                    "changes": result.changes,
                });
                println!("{report}");
            } else {
                println!("Comparison complete:");
                println!("  Slides inserted: {}", result.slides_inserted());
                println!("  Slides deleted:  {}", result.slides_deleted());
                println!("  Total changes:   {}", result.total_changes());
                if let Some(path) = &output {
                    println!("  Output:          {}", path.display());
                }
            }
        }
        _ => unreachable!(),
    }

    Ok(())
}
