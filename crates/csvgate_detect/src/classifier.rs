//! Classification orchestrator.
//!
//! Runs the signature backend, maps the winner to a MIME type, and for text
//! content runs the CSV heuristic. `classify` never fails: unknown content
//! falls through to the text/binary probe and undecodable text is simply
//! not CSV.

use crate::config::{DetectorConfig, DetectorVariant};
use crate::csv_heuristic::CsvHeuristic;
use crate::error::Result;
use crate::matcher::{SignatureBackend, SignatureMatcher};
use crate::mime::{is_csv_mime, is_text_mime, MimeMapper, TEXT_CSV};
use crate::signature::SignatureTable;
use crate::types::{
    BufferProbeDetail, ClassificationDetail, ClassificationVerdict, CsvStats, DetectionCandidate,
    SignatureDetail,
};
use std::sync::Arc;
use tracing::debug;

/// Filename used when the caller supplies none.
pub const UNKNOWN_FILENAME: &str = "unknown";

/// Outcome of the CSV decision step, before the detail is attached.
struct CsvDecision {
    is_csv: bool,
    mimetype: String,
    stats: Option<CsvStats>,
}

/// Thread-safe classifier. Build once, share freely.
#[derive(Clone)]
pub struct Classifier {
    backend: Arc<dyn SignatureBackend>,
    mapper: MimeMapper,
    heuristic: CsvHeuristic,
    variant: DetectorVariant,
    buffer_probe_bytes: usize,
    include_all_candidates: bool,
}

impl std::fmt::Debug for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier")
            .field("backend", &self.backend.name())
            .field("variant", &self.variant)
            .field("buffer_probe_bytes", &self.buffer_probe_bytes)
            .field("include_all_candidates", &self.include_all_candidates)
            .finish()
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::with_table(&DetectorConfig::default(), Arc::new(SignatureTable::builtin()))
    }
}

impl Classifier {
    /// Validate `config` and build its signature table.
    pub fn new(config: &DetectorConfig) -> Result<Self> {
        config.validate()?;
        let table = config.build_table()?;
        Ok(Self::with_table(config, Arc::new(table)))
    }

    /// Use an already-built table; `config.signatures` is ignored.
    pub fn with_table(config: &DetectorConfig, table: Arc<SignatureTable>) -> Self {
        Self::with_backend(config, Arc::new(SignatureMatcher::new(table)))
    }

    /// Use a custom signature backend.
    pub fn with_backend(config: &DetectorConfig, backend: Arc<dyn SignatureBackend>) -> Self {
        Self {
            backend,
            mapper: MimeMapper::new(),
            heuristic: CsvHeuristic::new(config.csv.clone()),
            variant: config.variant,
            buffer_probe_bytes: config.buffer_probe_bytes.max(1),
            include_all_candidates: config.include_all_candidates,
        }
    }

    pub fn variant(&self) -> DetectorVariant {
        self.variant
    }

    pub fn backend(&self) -> &dyn SignatureBackend {
        self.backend.as_ref()
    }

    /// Classify `bytes`. A missing `filename` becomes [`UNKNOWN_FILENAME`].
    pub fn classify(&self, bytes: &[u8], filename: Option<&str>) -> ClassificationVerdict {
        let filename = filename.unwrap_or(UNKNOWN_FILENAME);

        let top = self.backend.best(bytes);
        let resolved = self.mapper.resolve(top.as_ref(), bytes);
        debug!(
            filename,
            backend = self.backend.name(),
            label = %resolved.label,
            mime = %resolved.mime,
            source = %resolved.source,
            "Signature detection"
        );

        let decision = self.decide(bytes, filename, &resolved.mime);

        let detail = match self.variant {
            DetectorVariant::Signature => self.signature_detail(bytes, top, &resolved, decision.stats),
            DetectorVariant::BufferProbe => self.buffer_probe_detail(bytes, top, decision.stats),
        };

        debug!(
            filename,
            is_csv = decision.is_csv,
            mimetype = %decision.mimetype,
            "Classification complete"
        );

        ClassificationVerdict {
            is_csv: decision.is_csv,
            message: ClassificationVerdict::message_for(decision.is_csv).to_string(),
            mimetype: decision.mimetype,
            detail,
        }
    }

    fn decide(&self, bytes: &[u8], filename: &str, mime: &str) -> CsvDecision {
        if is_csv_mime(mime) {
            return CsvDecision {
                is_csv: true,
                mimetype: mime.to_string(),
                stats: None,
            };
        }

        let not_csv = |stats: Option<CsvStats>| CsvDecision {
            is_csv: false,
            mimetype: mime.to_string(),
            stats,
        };

        if !is_text_mime(mime) {
            return not_csv(None);
        }

        let text = match std::str::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => {
                debug!(filename, mime, error = %e, "Content is not UTF-8, skipping CSV heuristic");
                return not_csv(None);
            }
        };

        let assessment = self.heuristic.evaluate(text, filename);
        debug!(
            filename,
            total_lines = assessment.stats.total_non_empty_lines,
            comma_lines = assessment.stats.comma_bearing_line_count,
            header_commas = assessment.stats.header_comma_count,
            consistent = assessment.stats.consistent_comma_line_count,
            structural = assessment.structural(),
            hint = ?assessment.hint,
            is_csv = assessment.is_csv,
            "CSV heuristic"
        );

        if assessment.is_csv {
            CsvDecision {
                is_csv: true,
                mimetype: TEXT_CSV.to_string(),
                stats: Some(assessment.stats),
            }
        } else {
            not_csv(Some(assessment.stats))
        }
    }

    fn signature_detail(
        &self,
        bytes: &[u8],
        top: Option<DetectionCandidate>,
        resolved: &DetectionCandidate,
        csv_stats: Option<CsvStats>,
    ) -> ClassificationDetail {
        let candidates = if self.include_all_candidates {
            self.backend.candidates(bytes).map(|c| c.label).collect()
        } else {
            Vec::new()
        };

        ClassificationDetail::Signature(SignatureDetail {
            label: top.map(|c| c.label),
            mime: resolved.mime.clone(),
            source: resolved.source,
            candidates,
            csv_stats,
        })
    }

    fn buffer_probe_detail(
        &self,
        bytes: &[u8],
        top: Option<DetectionCandidate>,
        csv_stats: Option<CsvStats>,
    ) -> ClassificationDetail {
        let sample = &bytes[..bytes.len().min(self.buffer_probe_bytes)];
        let truncated = sample.len() < bytes.len();
        let sample_top = self.backend.best(sample);
        let sample_resolved = self
            .mapper
            .resolve_sample(sample_top.as_ref(), sample, truncated);
        debug!(
            sample_len = sample.len(),
            truncated,
            buffer_mime = %sample_resolved.mime,
            "Buffer probe"
        );

        ClassificationDetail::BufferProbe(BufferProbeDetail {
            file_detection: top.map(|c| c.label),
            buffer_detection: sample_top.map(|c| c.label),
            buffer_mime: sample_resolved.mime,
            csv_stats,
        })
    }
}
