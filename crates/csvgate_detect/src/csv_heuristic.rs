//! Structural CSV heuristic.
//!
//! Decides CSV-ness from line and comma statistics plus a corroborating hint
//! (file extension or a header keyword). Quotes are not stripped before
//! commas are counted, so a quoted field containing a comma shifts that
//! line's count. Downstream consumers rely on these exact thresholds.

use crate::types::CsvStats;
use serde::{Deserialize, Serialize};

/// Tunables for [`CsvHeuristic`]. Defaults reproduce the reference thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvHeuristicConfig {
    /// Minimum non-empty lines (header plus data).
    pub min_lines: usize,
    /// Minimum share of lines that contain a comma.
    pub comma_line_ratio: f64,
    /// Minimum share of lines whose comma count equals the header's.
    pub consistent_line_ratio: f64,
    /// Minimum commas in the header line.
    pub min_header_commas: usize,
    /// How many leading characters are searched for keywords.
    pub keyword_window_chars: usize,
    /// Case-folded substrings that suggest a CSV header.
    pub keywords: Vec<String>,
    /// Filename suffixes that corroborate CSV, compared case-insensitively.
    pub extensions: Vec<String>,
}

impl Default for CsvHeuristicConfig {
    fn default() -> Self {
        Self {
            min_lines: 2,
            comma_line_ratio: 0.8,
            consistent_line_ratio: 0.7,
            min_header_commas: 1,
            keyword_window_chars: 200,
            keywords: ["name,", "id,", "date,", ",value", ",count", ",amount"]
                .iter()
                .map(|k| k.to_string())
                .collect(),
            extensions: vec![".csv".to_string()],
        }
    }
}

/// Evidence outside the line structure that backs a CSV verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CorroborationHint {
    /// Filename ends with this configured extension.
    Extension(String),
    /// This keyword appears in the leading window of the text.
    Keyword(String),
}

/// Full outcome of a heuristic run, for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvAssessment {
    pub stats: CsvStats,
    pub enough_lines: bool,
    pub comma_lines_ok: bool,
    pub header_ok: bool,
    pub consistency_ok: bool,
    pub hint: Option<CorroborationHint>,
    pub is_csv: bool,
}

impl CsvAssessment {
    /// Whether every line-structure check passed, regardless of hints.
    pub fn structural(&self) -> bool {
        self.enough_lines && self.comma_lines_ok && self.header_ok && self.consistency_ok
    }
}

#[derive(Debug, Clone, Default)]
pub struct CsvHeuristic {
    config: CsvHeuristicConfig,
}

impl CsvHeuristic {
    pub fn new(config: CsvHeuristicConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CsvHeuristicConfig {
        &self.config
    }

    /// Count non-empty lines and commas. Lines split on `\n` and are trimmed.
    pub fn stats(&self, text: &str) -> CsvStats {
        let comma_counts: Vec<usize> = text
            .split('\n')
            .map(trim_line)
            .filter(|line| !line.is_empty())
            .map(|line| line.matches(',').count())
            .collect();

        let Some(&header_commas) = comma_counts.first() else {
            return CsvStats::default();
        };

        CsvStats {
            total_non_empty_lines: comma_counts.len(),
            header_comma_count: header_commas,
            comma_bearing_line_count: comma_counts.iter().filter(|&&c| c > 0).count(),
            consistent_comma_line_count: comma_counts.iter().filter(|&&c| c == header_commas).count(),
        }
    }

    /// Run every check and report which held.
    pub fn evaluate(&self, text: &str, filename: &str) -> CsvAssessment {
        let stats = self.stats(text);
        let total = stats.total_non_empty_lines as f64;

        let enough_lines = stats.total_non_empty_lines >= self.config.min_lines.max(1);
        let comma_lines_ok = stats.comma_bearing_line_count as f64 >= total * self.config.comma_line_ratio;
        let header_ok = stats.header_comma_count >= self.config.min_header_commas;
        let consistency_ok =
            stats.consistent_comma_line_count as f64 >= total * self.config.consistent_line_ratio;
        let hint = if enough_lines {
            self.corroborate(text, filename)
        } else {
            None
        };

        let is_csv = enough_lines && comma_lines_ok && header_ok && consistency_ok && hint.is_some();

        CsvAssessment {
            stats,
            enough_lines,
            comma_lines_ok,
            header_ok,
            consistency_ok,
            hint,
            is_csv,
        }
    }

    pub fn is_csv(&self, text: &str, filename: &str) -> bool {
        self.evaluate(text, filename).is_csv
    }

    /// Byte-level entry point: content that is not UTF-8 is never CSV.
    pub fn is_csv_bytes(&self, bytes: &[u8], filename: &str) -> bool {
        match std::str::from_utf8(bytes) {
            Ok(text) => self.is_csv(text, filename),
            Err(_) => false,
        }
    }

    fn corroborate(&self, text: &str, filename: &str) -> Option<CorroborationHint> {
        let filename = filename.to_lowercase();
        if let Some(ext) = self
            .config
            .extensions
            .iter()
            .find(|ext| !ext.is_empty() && filename.ends_with(&ext.to_lowercase()))
        {
            return Some(CorroborationHint::Extension(ext.clone()));
        }

        let head: String = text
            .chars()
            .flat_map(char::to_lowercase)
            .take(self.config.keyword_window_chars)
            .collect();
        self.config
            .keywords
            .iter()
            .find(|keyword| !keyword.is_empty() && head.contains(&keyword.to_lowercase()))
            .map(|keyword| CorroborationHint::Keyword(keyword.clone()))
    }
}

/// Trim whitespace plus the ASCII file/group/record/unit separators, which
/// line-oriented exporters treat as blank.
fn trim_line(line: &str) -> &str {
    line.trim_matches(|c: char| c.is_whitespace() || ('\x1c'..='\x1f').contains(&c))
}
