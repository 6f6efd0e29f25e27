//! `csvgate classify`: classify one local file

use crate::cli::error::HelpfulError;
use crate::cli::output::{format_percent, format_size, print_json, print_table};
use anyhow::Result;
use csvgate_detect::{ClassificationDetail, ClassificationVerdict, Classifier};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Exit code for a non-CSV verdict under `--require-csv`.
pub const NOT_CSV_EXIT_CODE: u8 = 2;

#[derive(Debug)]
pub struct ClassifyArgs {
    pub file: PathBuf,
    pub filename: Option<String>,
    pub json: bool,
    pub require_csv: bool,
}

#[derive(Debug, Serialize)]
struct ClassifyOutput<'a> {
    path: String,
    filename: &'a str,
    size_bytes: u64,
    #[serde(flatten)]
    verdict: &'a ClassificationVerdict,
}

pub fn run(args: ClassifyArgs, classifier: &Classifier) -> Result<ExitCode> {
    let content = read_upload(&args.file)?;
    let filename = args
        .filename
        .clone()
        .or_else(|| {
            args.file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| csvgate_detect::UNKNOWN_FILENAME.to_string());

    let verdict = classifier.classify(&content, Some(&filename));

    if args.json {
        print_json(&ClassifyOutput {
            path: args.file.display().to_string(),
            filename: &filename,
            size_bytes: content.len() as u64,
            verdict: &verdict,
        })?;
    } else {
        print_verdict(&args.file, &filename, content.len() as u64, &verdict);
    }

    Ok(ExitCode::from(exit_status(verdict.is_csv, args.require_csv)))
}

fn exit_status(is_csv: bool, require_csv: bool) -> u8 {
    if require_csv && !is_csv {
        NOT_CSV_EXIT_CODE
    } else {
        0
    }
}

fn read_upload(path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        return Err(HelpfulError::file_not_found(path).into());
    }
    if path.is_dir() {
        return Err(HelpfulError::not_a_file(path).into());
    }
    std::fs::read(path).map_err(|e| HelpfulError::cannot_read_file(path, &e.to_string()).into())
}

fn print_verdict(path: &Path, filename: &str, size: u64, verdict: &ClassificationVerdict) {
    println!("{}", verdict.message);
    println!();

    let mut rows = vec![
        vec!["Path".to_string(), path.display().to_string()],
        vec!["Filename".to_string(), filename.to_string()],
        vec!["Size".to_string(), format_size(size)],
        vec!["MIME type".to_string(), verdict.mimetype.clone()],
    ];

    match &verdict.detail {
        ClassificationDetail::Signature(detail) => {
            rows.push(vec![
                "Signature".to_string(),
                detail.label.clone().unwrap_or_else(|| "(none)".to_string()),
            ]);
            rows.push(vec!["Source".to_string(), detail.source.to_string()]);
            if !detail.candidates.is_empty() {
                rows.push(vec!["All matches".to_string(), detail.candidates.join("\n")]);
            }
        }
        ClassificationDetail::BufferProbe(detail) => {
            let label = |l: &Option<String>| l.clone().unwrap_or_else(|| "(none)".to_string());
            rows.push(vec!["File detection".to_string(), label(&detail.file_detection)]);
            rows.push(vec!["Buffer detection".to_string(), label(&detail.buffer_detection)]);
            rows.push(vec!["Buffer MIME".to_string(), detail.buffer_mime.clone()]);
        }
    }

    if let Some(stats) = verdict.detail.csv_stats() {
        rows.push(vec![
            "Lines".to_string(),
            stats.total_non_empty_lines.to_string(),
        ]);
        rows.push(vec![
            "Header commas".to_string(),
            stats.header_comma_count.to_string(),
        ]);
        rows.push(vec![
            "Lines with commas".to_string(),
            format!(
                "{} ({})",
                stats.comma_bearing_line_count,
                format_percent(stats.comma_line_ratio())
            ),
        ]);
        rows.push(vec![
            "Consistent lines".to_string(),
            format!(
                "{} ({})",
                stats.consistent_comma_line_count,
                format_percent(stats.consistent_line_ratio())
            ),
        ]);
    }

    print_table(&["Field", "Value"], rows);
}
