use clap::{Parser, Subcommand};
use memo_doc::{decode_json, encode, extract_preview};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a list-view preview of a memo file
    Preview {
        file: PathBuf,
        /// Maximum number of blocks to include
        #[arg(long, default_value_t = 5)]
        units: usize,
        #[arg(long)]
        json: bool,
    },
    /// Check that a memo file decodes
    Validate { file: PathBuf },
    /// Re-emit a memo file with dense block indexes
    Normalize {
        file: PathBuf,
        /// Rewrite the file in place instead of printing to stdout
        #[arg(long)]
        write: bool,
    },
    /// Preview every memo JSON file under a directory
    Scan {
        dir: PathBuf,
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Preview { file, units, json } => preview_command(file, *units, *json),
        Commands::Validate { file } => validate_command(file),
        Commands::Normalize { file, write } => normalize_command(file, *write),
        Commands::Scan { dir, json } => scan_command(dir, *json),
    }
}

fn load_document(path: &Path) -> memo_doc::Document {
    let payload = match fs::read_to_string(path) {
        Ok(payload) => payload,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    };
    match decode_json(&payload) {
        Ok(doc) => doc,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    }
}

fn preview_command(path: &Path, units: usize, json: bool) {
    let doc = load_document(path);
    let preview = extract_preview(&doc, units);

    if json {
        let entries: Vec<String> = preview.entries.iter().map(|entry| entry.line()).collect();
        let output = serde_json::json!({
            "title": doc.title,
            "entries": entries,
            "hasMore": preview.has_more,
        });
        println!("{}", serde_json::to_string_pretty(&output).unwrap());
        return;
    }

    if let Some(title) = &doc.title {
        println!("# {title}");
    }
    for entry in &preview.entries {
        println!("{}", entry.line());
    }
    if preview.has_more {
        println!("...");
    }
}

fn validate_command(path: &Path) {
    let doc = load_document(path);
    println!("Valid: {} blocks", doc.len());
}

fn normalize_command(path: &Path, write: bool) {
    let doc = load_document(path);
    let normalized = match serde_json::to_string_pretty(&encode(&doc)) {
        Ok(normalized) => normalized,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    };

    if write {
        if let Err(err) = fs::write(path, normalized) {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
        println!("Normalized {}", path.display());
    } else {
        println!("{normalized}");
    }
}

fn scan_command(dir: &Path, json: bool) {
    let mut memos = Vec::new();
    let mut invalid = Vec::new();

    for entry in WalkDir::new(dir).into_iter().filter_map(Result::ok) {
        let path = entry.path();
        if !entry.file_type().is_file()
            || path.extension().and_then(|ext| ext.to_str()) != Some("json")
        {
            continue;
        }
        let relative = path.strip_prefix(dir).unwrap_or(path).display().to_string();
        match fs::read_to_string(path).map_err(|err| err.to_string()).and_then(|payload| {
            decode_json(&payload).map_err(|err| err.to_string())
        }) {
            Ok(doc) => {
                let preview = extract_preview(&doc, 1);
                let line = preview
                    .entries
                    .first()
                    .map(|entry| entry.line())
                    .unwrap_or_default();
                memos.push((relative, doc.title, line));
            }
            Err(err) => invalid.push((relative, err)),
        }
    }

    if json {
        let output = serde_json::json!({
            "memos": memos
                .iter()
                .map(|(path, title, line)| serde_json::json!({
                    "path": path,
                    "title": title,
                    "preview": line,
                }))
                .collect::<Vec<_>>(),
            "invalid": invalid
                .iter()
                .map(|(path, err)| serde_json::json!({ "path": path, "error": err }))
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&output).unwrap());
    } else {
        for (path, title, line) in &memos {
            let title = title.as_deref().unwrap_or("(untitled)");
            println!("{path}: {title}: {line}");
        }
        for (path, err) in &invalid {
            eprintln!("Invalid {path}: {err}");
        }
    }

    if !invalid.is_empty() {
        std::process::exit(1);
    }
}
