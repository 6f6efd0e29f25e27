//! Detector configuration

use crate::csv_heuristic::CsvHeuristicConfig;
use crate::error::{DetectError, Result};
use crate::signature::{ByteSignature, BytePattern, SignatureTable};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Which diagnostic payload the classifier attaches to a verdict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DetectorVariant {
    /// Report the winning signature and, optionally, every match.
    #[default]
    Signature,
    /// Also re-run detection over only the leading bytes of the buffer.
    BufferProbe,
}

impl DetectorVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectorVariant::Signature => "signature",
            DetectorVariant::BufferProbe => "buffer-probe",
        }
    }
}

impl fmt::Display for DetectorVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DetectorVariant {
    type Err = DetectError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "signature" => Ok(DetectorVariant::Signature),
            "buffer-probe" | "buffer_probe" => Ok(DetectorVariant::BufferProbe),
            other => Err(DetectError::config(format!(
                "unknown detector variant '{}' (expected 'signature' or 'buffer-probe')",
                other
            ))),
        }
    }
}

/// A user-defined signature as written in the config file.
///
/// ```toml
/// [[signatures]]
/// label = "Acme ledger export"
/// pattern = "41 43 4D 45 ?? 01"
/// mime = "application/x-acme-ledger"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureSpec {
    pub label: String,

    /// Hex bytes separated by whitespace, `??` for a wildcard byte.
    pub pattern: String,

    #[serde(default)]
    pub offset: usize,

    #[serde(default)]
    pub lookahead: usize,

    #[serde(default)]
    pub ignore_case: bool,

    /// Omit to let the label keywords or the text probe decide.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime: Option<String>,

    /// Defaults to the number of non-wildcard bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specificity: Option<i32>,
}

impl SignatureSpec {
    /// Parse the pattern and produce a table entry.
    pub fn to_signature(&self) -> Result<ByteSignature> {
        let pattern = BytePattern::parse_hex(&self.pattern)
            .map_err(|reason| DetectError::invalid_signature(&self.label, reason))?;

        let mut signature = ByteSignature::new(
            self.label.clone(),
            self.mime.clone().unwrap_or_default(),
            pattern,
        )
        .at_offset(self.offset)
        .with_lookahead(self.lookahead);

        if self.ignore_case {
            signature = signature.ignore_case();
        }
        if let Some(specificity) = self.specificity {
            signature = signature.with_specificity(specificity);
        }
        Ok(signature)
    }
}

/// Main configuration for the classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    #[serde(default)]
    pub variant: DetectorVariant,

    /// Leading bytes examined by the buffer-probe variant
    #[serde(default = "default_buffer_probe_bytes")]
    pub buffer_probe_bytes: usize,

    /// List every matching signature in the verdict detail
    #[serde(default)]
    pub include_all_candidates: bool,

    #[serde(default = "default_include_builtin_signatures")]
    pub include_builtin_signatures: bool,

    #[serde(default)]
    pub csv: CsvHeuristicConfig,

    /// Extra signatures, appended after the built-in ones
    #[serde(default)]
    pub signatures: Vec<SignatureSpec>,
}

fn default_buffer_probe_bytes() -> usize {
    1024
}

fn default_include_builtin_signatures() -> bool {
    true
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            variant: DetectorVariant::default(),
            buffer_probe_bytes: default_buffer_probe_bytes(),
            include_all_candidates: false,
            include_builtin_signatures: default_include_builtin_signatures(),
            csv: CsvHeuristicConfig::default(),
            signatures: Vec::new(),
        }
    }
}

impl DetectorConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: DetectorConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| DetectError::config(e.to_string()))
    }

    /// Reject values the heuristic or the buffer probe cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.buffer_probe_bytes == 0 {
            return Err(DetectError::config("buffer_probe_bytes must be at least 1"));
        }
        for (name, ratio) in [
            ("csv.comma_line_ratio", self.csv.comma_line_ratio),
            ("csv.consistent_line_ratio", self.csv.consistent_line_ratio),
        ] {
            if !(0.0..=1.0).contains(&ratio) {
                return Err(DetectError::config(format!(
                    "{} must be between 0 and 1, got {}",
                    name, ratio
                )));
            }
        }
        Ok(())
    }

    /// Build the signature table this config describes.
    pub fn build_table(&self) -> Result<SignatureTable> {
        let mut builder = SignatureTable::builder();
        if self.include_builtin_signatures {
            builder = builder.with_builtins();
        }
        for spec in &self.signatures {
            builder = builder.register(spec.to_signature()?);
        }
        builder.build()
    }
}
