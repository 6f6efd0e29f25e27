//! Helpful error types for CLI commands
//!
//! Every error includes:
//! - What went wrong
//! - Context about the situation
//! - Suggestions for how to fix it

use serde_json::json;
use std::fmt;
use std::path::Path;

/// An error with helpful context and suggestions
#[derive(Debug)]
pub struct HelpfulError {
    /// The main error message
    pub message: String,
    /// Additional context about what was happening
    pub context: Option<String>,
    /// Suggestions for how to fix the error
    pub suggestions: Vec<String>,
}

impl HelpfulError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_suggestions(mut self, suggestions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.suggestions.extend(suggestions.into_iter().map(|s| s.into()));
        self
    }

    // === Common error constructors ===

    /// File does not exist
    pub fn file_not_found(path: &Path) -> Self {
        Self::new(format!("File not found: {}", path.display()))
            .with_context("The specified file does not exist")
            .with_suggestions([
                format!("TRY: Check if the file exists: ls -la {}", path.display()),
                format!(
                    "TRY: Look for similar files: ls {}",
                    parent_display(path)
                ),
            ])
    }

    /// Path exists but is a directory
    pub fn not_a_file(path: &Path) -> Self {
        Self::new(format!("Not a file: {}", path.display()))
            .with_context("csvgate classifies one file at a time")
            .with_suggestion(format!(
                "TRY: Classify each file: for f in {}/*; do csvgate classify \"$f\"; done",
                path.display()
            ))
    }

    /// File cannot be read
    pub fn cannot_read_file(path: &Path, reason: &str) -> Self {
        Self::new(format!("Cannot read file: {}", path.display()))
            .with_context(reason.to_string())
            .with_suggestions([
                format!("TRY: Check file permissions: ls -la {}", path.display()),
                "TRY: Ensure the file is not locked by another program".to_string(),
            ])
    }

    /// Config file missing or unusable
    pub fn invalid_config(path: &Path, reason: &str) -> Self {
        Self::new(format!("Invalid config: {}", path.display()))
            .with_context(reason.to_string())
            .with_suggestions([
                "TRY: Print the default config: csvgate config > csvgate.toml".to_string(),
                "TRY: Unset CSVGATE_CONFIG to run with defaults".to_string(),
            ])
    }

    /// Event input is not JSON
    pub fn event_parse_error(source: &str, details: &str) -> Self {
        Self::new(format!("Event is not valid JSON: {}", details))
            .with_context(format!("Failed to parse event from {}", source))
            .with_suggestions([
                "TRY: Validate the JSON: cat EVENT | python -m json.tool".to_string(),
                "TRY: Events look like {\"file_content\": \"<base64>\", \"filename\": \"data.csv\"}"
                    .to_string(),
            ])
    }
}

fn parent_display(path: &Path) -> String {
    path.parent()
        .map(|p| p.display().to_string())
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| ".".to_string())
}

impl fmt::Display for HelpfulError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ERROR: {}", self.message)?;

        if let Some(ctx) = &self.context {
            writeln!(f, "CONTEXT: {}", ctx)?;
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            for suggestion in &self.suggestions {
                writeln!(f, "  {}", suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for HelpfulError {}

/// Print an error as a JSON object on stdout, for commands run with `--json`.
pub fn print_json_error(err: &anyhow::Error) {
    let payload = match err.downcast_ref::<HelpfulError>() {
        Some(helpful) => json!({
            "error": {
                "message": helpful.message,
                "context": helpful.context,
                "suggestions": helpful.suggestions,
            }
        }),
        None => json!({
            "error": {
                "message": format!("{:#}", err),
                "context": null,
                "suggestions": [],
            }
        }),
    };
    println!("{}", payload);
}
