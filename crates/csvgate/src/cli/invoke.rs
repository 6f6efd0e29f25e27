//! `csvgate invoke`: answer one upload event

use crate::cli::error::HelpfulError;
use crate::cli::output::print_json;
use anyhow::{Context, Result};
use csvgate::handle_event;
use csvgate_detect::Classifier;
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct InvokeArgs {
    /// Event file, or `-` for stdin.
    pub event: PathBuf,
}

pub fn run(args: InvokeArgs, classifier: &Classifier) -> Result<()> {
    let (source, raw) = read_event(&args.event)?;
    let event: Value = serde_json::from_str(&raw)
        .map_err(|e| HelpfulError::event_parse_error(&source, &e.to_string()))?;

    let response = handle_event(classifier, &event);
    print_json(&response)
}

fn read_event(path: &Path) -> Result<(String, String)> {
    if path == Path::new("-") {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("Failed to read event from stdin")?;
        return Ok(("stdin".to_string(), raw));
    }

    if !path.exists() {
        return Err(HelpfulError::file_not_found(path).into());
    }
    let raw = std::fs::read_to_string(path)
        .map_err(|e| HelpfulError::cannot_read_file(path, &e.to_string()))?;
    Ok((path.display().to_string(), raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_event_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("event.json");
        std::fs::write(&path, r#"{"file_content": ""}"#).unwrap();

        let (source, raw) = read_event(&path).unwrap();
        assert!(source.ends_with("event.json"));
        assert!(raw.contains("file_content"));
    }

    #[test]
    fn test_read_event_missing_file() {
        let err = read_event(Path::new("/nonexistent/event.json")).unwrap_err();
        assert!(err.downcast_ref::<HelpfulError>().is_some());
    }
}
