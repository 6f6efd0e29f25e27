//! Per-call data types produced by the detector.
//!
//! Everything here is created fresh for each classification and dropped
//! afterwards; only the [`SignatureTable`](crate::SignatureTable) outlives a call.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a detection candidate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    /// A registered byte signature matched.
    Signature,
    /// No signature matched, but the buffer decodes as UTF-8.
    TextProbe,
    /// Nothing matched; generic binary fallback.
    None,
}

impl CandidateSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CandidateSource::Signature => "signature",
            CandidateSource::TextProbe => "text_probe",
            CandidateSource::None => "none",
        }
    }
}

impl fmt::Display for CandidateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single type guess for a buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionCandidate {
    /// Human-readable type label, e.g. "PDF document".
    pub label: String,
    /// MIME string registered for the label. May be empty for user-registered
    /// signatures; the MIME mapper fills it in.
    pub mime: String,
    pub source: CandidateSource,
}

impl DetectionCandidate {
    pub fn new(label: impl Into<String>, mime: impl Into<String>, source: CandidateSource) -> Self {
        Self {
            label: label.into(),
            mime: mime.into(),
            source,
        }
    }

    pub fn is_signature(&self) -> bool {
        self.source == CandidateSource::Signature
    }
}

/// Line and comma statistics gathered by the CSV heuristic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvStats {
    pub total_non_empty_lines: usize,
    pub header_comma_count: usize,
    /// Lines with at least one comma.
    pub comma_bearing_line_count: usize,
    /// Lines whose comma count equals the header's.
    pub consistent_comma_line_count: usize,
}

impl CsvStats {
    /// Share of non-empty lines that contain a comma.
    pub fn comma_line_ratio(&self) -> f64 {
        ratio(self.comma_bearing_line_count, self.total_non_empty_lines)
    }

    /// Share of non-empty lines that match the header's comma count.
    pub fn consistent_line_ratio(&self) -> f64 {
        ratio(self.consistent_comma_line_count, self.total_non_empty_lines)
    }
}

fn ratio(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}

/// Diagnostics reported by the `signature` detector variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureDetail {
    /// Label of the top signature match. `None` when no signature matched.
    pub label: Option<String>,
    /// MIME type before any CSV override.
    pub mime: String,
    pub source: CandidateSource,
    /// Every matching signature label in match order. Only filled when
    /// diagnostics are enabled.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csv_stats: Option<CsvStats>,
}

/// Diagnostics reported by the `buffer-probe` detector variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferProbeDetail {
    /// Top signature label over the whole buffer.
    pub file_detection: Option<String>,
    /// Top signature label over the leading sample only.
    pub buffer_detection: Option<String>,
    /// MIME type derived from the leading sample.
    pub buffer_mime: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csv_stats: Option<CsvStats>,
}

/// Detector-specific diagnostic payload. Never affects the verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "detector", rename_all = "snake_case")]
pub enum ClassificationDetail {
    Signature(SignatureDetail),
    BufferProbe(BufferProbeDetail),
}

impl ClassificationDetail {
    pub fn csv_stats(&self) -> Option<&CsvStats> {
        match self {
            ClassificationDetail::Signature(detail) => detail.csv_stats.as_ref(),
            ClassificationDetail::BufferProbe(detail) => detail.csv_stats.as_ref(),
        }
    }
}

/// The externally visible outcome of a classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationVerdict {
    pub is_csv: bool,
    /// Never empty.
    pub mimetype: String,
    pub message: String,
    pub detail: ClassificationDetail,
}

impl ClassificationVerdict {
    pub const CSV_MESSAGE: &'static str = "File is a valid CSV";
    pub const NOT_CSV_MESSAGE: &'static str = "File is not a valid CSV";

    pub fn message_for(is_csv: bool) -> &'static str {
        if is_csv {
            Self::CSV_MESSAGE
        } else {
            Self::NOT_CSV_MESSAGE
        }
    }
}
