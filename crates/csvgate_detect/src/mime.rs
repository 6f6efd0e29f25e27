//! MIME mapping with a text/binary fallback chain.

use crate::types::{CandidateSource, DetectionCandidate};

pub const TEXT_CSV: &str = "text/csv";
pub const TEXT_PLAIN: &str = "text/plain";
pub const OCTET_STREAM: &str = "application/octet-stream";

/// MIME strings that already mean "this is CSV".
pub const CSV_MIMETYPES: &[&str] = &[TEXT_CSV, "application/csv", "text/comma-separated-values"];

/// Label keywords tried in order when a signature carries no MIME string.
const LABEL_KEYWORDS: &[(&[&str], &str)] = &[
    (&["pdf"], "application/pdf"),
    (&["jpeg", "jpg"], "image/jpeg"),
    (&["png"], "image/png"),
    (&["text"], TEXT_PLAIN),
    (&["html"], "text/html"),
    (&["xml"], "application/xml"),
    (&["json"], "application/json"),
];

const TEXT_PROBE_LABEL: &str = "UTF-8 text";
const BINARY_LABEL: &str = "data";
const EMPTY_LABEL: &str = "empty";

/// Whether `mime` is one of the CSV MIME aliases.
pub fn is_csv_mime(mime: &str) -> bool {
    CSV_MIMETYPES.contains(&mime)
}

/// Whether `mime` is a `text/*` type.
pub fn is_text_mime(mime: &str) -> bool {
    mime.starts_with("text/")
}

/// Turns a matcher candidate (or its absence) into a canonical MIME type.
#[derive(Debug, Clone, Copy, Default)]
pub struct MimeMapper;

impl MimeMapper {
    pub fn new() -> Self {
        Self
    }

    /// MIME type for `candidate`, falling back to a UTF-8 probe of `bytes`.
    /// Never empty.
    pub fn to_mime(&self, candidate: Option<&DetectionCandidate>, bytes: &[u8]) -> String {
        self.resolve(candidate, bytes).mime
    }

    /// Like [`to_mime`](Self::to_mime) but keeps the label and source of
    /// whatever decided the MIME type.
    pub fn resolve(&self, candidate: Option<&DetectionCandidate>, bytes: &[u8]) -> DetectionCandidate {
        self.resolve_sample(candidate, bytes, false)
    }

    /// [`resolve`](Self::resolve) for a leading sample cut from a longer
    /// buffer.
    pub fn resolve_sample(
        &self,
        candidate: Option<&DetectionCandidate>,
        sample: &[u8],
        truncated: bool,
    ) -> DetectionCandidate {
        if let Some(candidate) = candidate {
            if !candidate.mime.is_empty() {
                return candidate.clone();
            }
            if let Some(mime) = mime_from_label(&candidate.label) {
                return DetectionCandidate::new(&candidate.label, mime, candidate.source);
            }
        }
        self.probe(sample, truncated)
    }

    /// UTF-8 probe. With `truncated`, an incomplete multi-byte sequence at the
    /// very end is tolerated, since the buffer was cut from a longer one.
    pub fn probe(&self, bytes: &[u8], truncated: bool) -> DetectionCandidate {
        if bytes.is_empty() {
            return DetectionCandidate::new(EMPTY_LABEL, OCTET_STREAM, CandidateSource::None);
        }
        let decodes = match std::str::from_utf8(bytes) {
            Ok(_) => true,
            Err(e) => truncated && e.error_len().is_none(),
        };
        if decodes {
            DetectionCandidate::new(TEXT_PROBE_LABEL, TEXT_PLAIN, CandidateSource::TextProbe)
        } else {
            DetectionCandidate::new(BINARY_LABEL, OCTET_STREAM, CandidateSource::None)
        }
    }
}

/// Keyword heuristic over a free-form type label.
pub fn mime_from_label(label: &str) -> Option<&'static str> {
    let lower = label.to_lowercase();
    LABEL_KEYWORDS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(_, mime)| *mime)
}
