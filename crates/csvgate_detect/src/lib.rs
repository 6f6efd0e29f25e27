//! csvgate detection core
//!
//! Decides whether an uploaded buffer is a CSV file and reports its MIME type.
//!
//! # Pipeline
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌───────────────┐
//! │  Signature  │     │    MIME     │     │     CSV     │     │    Verdict    │
//! │   Matcher   │────▶│   Mapper    │────▶│  Heuristic  │────▶│ (is_csv, mime │
//! │ (magic no.) │     │ (+probe)    │     │ (text only) │     │   + detail)   │
//! └─────────────┘     └─────────────┘     └─────────────┘     └───────────────┘
//! ```
//!
//! # Core Concepts
//!
//! - **SignatureTable**: immutable, ranked byte patterns built once at startup
//! - **SignatureBackend**: the seam the classifier matches through
//! - **CsvHeuristic**: line/comma statistics plus extension or keyword hint
//! - **Classifier**: the single entry point, `classify(bytes, filename)`

pub mod classifier;
pub mod config;
pub mod csv_heuristic;
pub mod error;
pub mod matcher;
pub mod mime;
pub mod signature;
pub mod types;

// Re-exports for convenience
pub use classifier::{Classifier, UNKNOWN_FILENAME};
pub use config::{DetectorConfig, DetectorVariant, SignatureSpec};
pub use csv_heuristic::{CorroborationHint, CsvAssessment, CsvHeuristic, CsvHeuristicConfig};
pub use error::{DetectError, Result};
pub use matcher::{SignatureBackend, SignatureMatcher};
pub use mime::MimeMapper;
pub use signature::{ByteSignature, BytePattern, SignatureTable, MAX_SIGNATURE_SPAN};
pub use types::{
    BufferProbeDetail, CandidateSource, ClassificationDetail, ClassificationVerdict, CsvStats,
    DetectionCandidate, SignatureDetail,
};
