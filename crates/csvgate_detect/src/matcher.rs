//! Signature matching over a buffer's leading bytes.

use crate::signature::{ByteSignature, SignatureTable};
use crate::types::{CandidateSource, DetectionCandidate};
use std::iter::FusedIterator;
use std::sync::Arc;

/// Pluggable source of signature-based candidates.
///
/// The classifier only depends on this trait, so the table-driven matcher can
/// be replaced without touching the MIME mapping or the CSV heuristic.
pub trait SignatureBackend: Send + Sync {
    /// Short backend name used in logs.
    fn name(&self) -> &str;

    /// Matching candidates, most specific first. Empty when nothing matches.
    fn candidates<'a>(
        &'a self,
        bytes: &'a [u8],
    ) -> Box<dyn Iterator<Item = DetectionCandidate> + 'a>;

    /// The top candidate, if any.
    fn best(&self, bytes: &[u8]) -> Option<DetectionCandidate> {
        self.candidates(bytes).next()
    }
}

/// Table-driven matcher sharing an immutable [`SignatureTable`].
#[derive(Debug, Clone)]
pub struct SignatureMatcher {
    table: Arc<SignatureTable>,
}

impl SignatureMatcher {
    pub fn new(table: Arc<SignatureTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &SignatureTable {
        &self.table
    }

    /// Lazily yield every signature that matches `bytes`, in rank order.
    pub fn matches<'a>(&'a self, bytes: &'a [u8]) -> Matches<'a> {
        let window = &bytes[..bytes.len().min(self.table.max_span())];
        Matches {
            entries: self.table.iter(),
            window,
        }
    }
}

impl SignatureBackend for SignatureMatcher {
    fn name(&self) -> &str {
        "signature-table"
    }

    fn candidates<'a>(
        &'a self,
        bytes: &'a [u8],
    ) -> Box<dyn Iterator<Item = DetectionCandidate> + 'a> {
        Box::new(self.matches(bytes))
    }
}

/// Iterator returned by [`SignatureMatcher::matches`].
pub struct Matches<'a> {
    entries: std::slice::Iter<'a, ByteSignature>,
    window: &'a [u8],
}

impl Iterator for Matches<'_> {
    type Item = DetectionCandidate;

    fn next(&mut self) -> Option<Self::Item> {
        let window = self.window;
        self.entries
            .find(|sig| sig.matches(window))
            .map(|sig| DetectionCandidate::new(&sig.label, &sig.mime, CandidateSource::Signature))
    }
}

impl FusedIterator for Matches<'_> {}
