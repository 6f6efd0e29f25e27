//! Signature table: byte patterns ("magic numbers") mapped to type labels.
//!
//! The table is built once at startup and never mutated afterwards. Entries
//! are kept sorted by specificity (highest first) with ties broken by
//! registration order, so a matcher walking the table front to back yields
//! matches already ranked.

use crate::error::{DetectError, Result};
use std::cmp::Reverse;

/// Upper bound on `offset + lookahead + pattern length` for any signature.
pub const MAX_SIGNATURE_SPAN: usize = 512;

/// A byte pattern where `None` is a wildcard.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BytePattern(Vec<Option<u8>>);

impl BytePattern {
    /// Pattern matching `bytes` exactly.
    pub fn exact(bytes: &[u8]) -> Self {
        Self(bytes.iter().copied().map(Some).collect())
    }

    /// Append exact bytes.
    pub fn then(mut self, bytes: &[u8]) -> Self {
        self.0.extend(bytes.iter().copied().map(Some));
        self
    }

    /// Append `count` wildcard bytes.
    pub fn any(mut self, count: usize) -> Self {
        self.0.extend(std::iter::repeat(None).take(count));
        self
    }

    /// Parse a hex pattern such as `"25 50 44 46"` or `"FFD8FF ?? ?? 4A"`.
    ///
    /// Whitespace separates tokens; `??` marks a wildcard byte and may also
    /// appear inside a token.
    pub fn parse_hex(input: &str) -> std::result::Result<Self, String> {
        let mut bytes = Vec::new();
        for token in input.split_whitespace() {
            for (i, run) in token.split("??").enumerate() {
                if i > 0 {
                    bytes.push(None);
                }
                let decoded =
                    hex::decode(run).map_err(|e| format!("invalid hex in '{}': {}", token, e))?;
                bytes.extend(decoded.into_iter().map(Some));
            }
        }
        if bytes.is_empty() {
            return Err("pattern is empty".to_string());
        }
        Ok(Self(bytes))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of non-wildcard bytes.
    pub fn fixed_bytes(&self) -> usize {
        self.0.iter().filter(|b| b.is_some()).count()
    }

    /// Whether the pattern matches `buf` starting at `start`.
    pub fn matches_at(&self, buf: &[u8], start: usize, ignore_ascii_case: bool) -> bool {
        let Some(window) = start
            .checked_add(self.0.len())
            .and_then(|end| buf.get(start..end))
        else {
            return false;
        };

        self.0.iter().zip(window).all(|(expected, actual)| match expected {
            None => true,
            Some(b) if ignore_ascii_case => b.eq_ignore_ascii_case(actual),
            Some(b) => b == actual,
        })
    }

    /// Render as space-separated hex with `??` wildcards.
    pub fn to_hex(&self) -> String {
        self.0
            .iter()
            .map(|b| match b {
                Some(v) => hex::encode_upper([*v]),
                None => "??".to_string(),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// One registered magic-number rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteSignature {
    pub pattern: BytePattern,
    /// First position at which the pattern may start.
    pub offset: usize,
    /// Extra start positions after `offset` that are also tried.
    pub lookahead: usize,
    pub ignore_ascii_case: bool,
    pub label: String,
    /// Registered MIME string. Empty means "let the MIME mapper decide".
    pub mime: String,
    pub specificity: i32,
}

impl ByteSignature {
    /// Signature at offset 0, specificity derived from the pattern.
    pub fn new(label: impl Into<String>, mime: impl Into<String>, pattern: BytePattern) -> Self {
        let specificity = pattern.fixed_bytes() as i32;
        Self {
            pattern,
            offset: 0,
            lookahead: 0,
            ignore_ascii_case: false,
            label: label.into(),
            mime: mime.into(),
            specificity,
        }
    }

    pub fn at_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_lookahead(mut self, lookahead: usize) -> Self {
        self.lookahead = lookahead;
        self
    }

    pub fn ignore_case(mut self) -> Self {
        self.ignore_ascii_case = true;
        self
    }

    pub fn with_specificity(mut self, specificity: i32) -> Self {
        self.specificity = specificity;
        self
    }

    /// Bytes of input this signature may need to look at.
    pub fn span(&self) -> usize {
        self.offset
            .saturating_add(self.lookahead)
            .saturating_add(self.pattern.len())
    }

    /// Whether this signature matches `buf`. Buffers shorter than the
    /// pattern's required span never match.
    pub fn matches(&self, buf: &[u8]) -> bool {
        if buf.len() < self.offset.saturating_add(self.pattern.len()) {
            return false;
        }
        (self.offset..=self.offset + self.lookahead)
            .any(|start| self.pattern.matches_at(buf, start, self.ignore_ascii_case))
    }

    fn validate(&self) -> Result<()> {
        if self.label.trim().is_empty() {
            return Err(DetectError::invalid_signature(&self.label, "label is empty"));
        }
        if self.pattern.fixed_bytes() == 0 {
            return Err(DetectError::invalid_signature(
                &self.label,
                "pattern needs at least one non-wildcard byte",
            ));
        }
        if self.span() > MAX_SIGNATURE_SPAN {
            return Err(DetectError::invalid_signature(
                &self.label,
                format!(
                    "span of {} bytes exceeds the {} byte limit",
                    self.span(),
                    MAX_SIGNATURE_SPAN
                ),
            ));
        }
        Ok(())
    }
}

/// Immutable, ranked collection of signatures.
#[derive(Debug, Clone, Default)]
pub struct SignatureTable {
    entries: Vec<ByteSignature>,
    max_span: usize,
}

impl SignatureTable {
    /// The built-in format table.
    pub fn builtin() -> Self {
        Self::assemble(builtin_signatures())
    }

    /// A table with no signatures; everything falls through to the text probe.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builder() -> SignatureTableBuilder {
        SignatureTableBuilder::default()
    }

    fn assemble(mut entries: Vec<ByteSignature>) -> Self {
        // Stable sort keeps registration order among equal specificities.
        entries.sort_by_key(|sig| Reverse(sig.specificity));
        let max_span = entries.iter().map(ByteSignature::span).max().unwrap_or(0);
        Self { entries, max_span }
    }

    /// Signatures in match order.
    pub fn iter(&self) -> std::slice::Iter<'_, ByteSignature> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Longest span of any registered signature. Matchers never need to look
    /// past this many leading bytes.
    pub fn max_span(&self) -> usize {
        self.max_span
    }
}

/// Collects signatures and validates them into a [`SignatureTable`].
#[derive(Debug, Default)]
pub struct SignatureTableBuilder {
    entries: Vec<ByteSignature>,
}

impl SignatureTableBuilder {
    /// Register the built-in formats.
    pub fn with_builtins(mut self) -> Self {
        self.entries.extend(builtin_signatures());
        self
    }

    /// Register one signature after the ones already added.
    pub fn register(mut self, signature: ByteSignature) -> Self {
        self.entries.push(signature);
        self
    }

    pub fn build(self) -> Result<SignatureTable> {
        for signature in &self.entries {
            signature.validate()?;
        }
        Ok(SignatureTable::assemble(self.entries))
    }
}

/// Lookahead window for markup signatures (leading whitespace, BOM).
const TEXT_LOOKAHEAD: usize = 16;

fn builtin_signatures() -> Vec<ByteSignature> {
    let sig = ByteSignature::new;
    let exact = BytePattern::exact;

    vec![
        // Documents
        sig("PDF document", "application/pdf", exact(b"%PDF")),
        sig("PostScript document", "application/postscript", exact(b"%!PS")),
        sig("Rich Text Format data", "text/rtf", exact(b"{\\rtf")),
        sig(
            "Composite Document File V2 (OLE2)",
            "application/x-ole-storage",
            exact(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1]),
        ),
        // Images
        sig(
            "JPEG image data, JFIF standard",
            "image/jpeg",
            exact(&[0xFF, 0xD8, 0xFF, 0xE0]).any(2).then(b"JFIF\0"),
        ),
        sig(
            "JPEG image data, Exif standard",
            "image/jpeg",
            exact(&[0xFF, 0xD8, 0xFF, 0xE1]).any(2).then(b"Exif\0"),
        ),
        sig("JPEG image data", "image/jpeg", exact(&[0xFF, 0xD8, 0xFF])),
        sig(
            "PNG image data",
            "image/png",
            exact(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]),
        ),
        sig("GIF image data, version 87a", "image/gif", exact(b"GIF87a")),
        sig("GIF image data, version 89a", "image/gif", exact(b"GIF89a")),
        sig(
            "PC bitmap",
            "image/bmp",
            exact(b"BM").any(4).then(&[0x00, 0x00, 0x00, 0x00]),
        ),
        sig("TIFF image data, little-endian", "image/tiff", exact(b"II*\0")),
        sig("TIFF image data, big-endian", "image/tiff", exact(b"MM\0*")),
        sig("RIFF (little-endian) data, Web/P image", "image/webp", exact(b"RIFF").any(4).then(b"WEBP")),
        sig("MS Windows icon resource", "image/vnd.microsoft.icon", exact(&[0x00, 0x00, 0x01, 0x00])),
        sig("Adobe Photoshop Image", "image/vnd.adobe.photoshop", exact(b"8BPS\0\x01")),
        sig("SVG Scalable Vector Graphics image", "image/svg+xml", exact(b"<svg"))
            .with_lookahead(TEXT_LOOKAHEAD),
        // Audio / video
        sig("RIFF (little-endian) data, WAVE audio", "audio/wav", exact(b"RIFF").any(4).then(b"WAVE")),
        sig("RIFF (little-endian) data, AVI", "video/x-msvideo", exact(b"RIFF").any(4).then(b"AVI ")),
        sig("Audio file with ID3 tag", "audio/mpeg", exact(b"ID3").any(1).then(&[0x00])),
        sig("Ogg data", "audio/ogg", exact(b"OggS\0")),
        sig("FLAC audio bitstream data", "audio/flac", exact(b"fLaC")),
        sig("Standard MIDI data", "audio/midi", exact(b"MThd\0\0\0\x06")),
        sig("ISO Media (MP4)", "video/mp4", BytePattern::default().any(4).then(b"ftyp")),
        // Archives and compression
        sig("Zip archive data", "application/zip", exact(b"PK\x03\x04")),
        sig("Zip archive data (empty)", "application/zip", exact(b"PK\x05\x06")),
        sig("Zip archive data (spanned)", "application/zip", exact(b"PK\x07\x08")),
        sig("gzip compressed data", "application/gzip", exact(&[0x1F, 0x8B, 0x08])),
        sig(
            "bzip2 compressed data",
            "application/x-bzip2",
            exact(b"BZh").any(1).then(&[0x31, 0x41, 0x59, 0x26, 0x53, 0x59]),
        ),
        sig("XZ compressed data", "application/x-xz", exact(&[0xFD, b'7', b'z', b'X', b'Z', 0x00])),
        sig(
            "7-zip archive data",
            "application/x-7z-compressed",
            exact(&[b'7', b'z', 0xBC, 0xAF, 0x27, 0x1C]),
        ),
        sig("RAR archive data", "application/vnd.rar", exact(b"Rar!\x1A\x07")),
        sig("Zstandard compressed data", "application/zstd", exact(&[0x28, 0xB5, 0x2F, 0xFD])),
        sig("POSIX tar archive", "application/x-tar", exact(b"ustar")).at_offset(257),
        // Executables
        sig("ELF executable", "application/x-executable", exact(b"\x7FELF")),
        sig("PE32 executable (MS-DOS/Windows)", "application/x-dosexec", exact(&[b'M', b'Z', 0x90, 0x00])),
        sig("Mach-O 64-bit executable", "application/x-mach-binary", exact(&[0xCF, 0xFA, 0xED, 0xFE])),
        sig("Mach-O executable", "application/x-mach-binary", exact(&[0xCE, 0xFA, 0xED, 0xFE])),
        sig("compiled Java class data", "application/java-vm", exact(&[0xCA, 0xFE, 0xBA, 0xBE])),
        sig("WebAssembly (wasm) binary module", "application/wasm", exact(b"\0asm\x01\0\0\0")),
        // Data formats
        sig("SQLite 3.x database", "application/vnd.sqlite3", exact(b"SQLite format 3\0")),
        sig("Apache Parquet", "application/vnd.apache.parquet", exact(b"PAR1")),
        sig("Apache Avro", "application/avro", exact(b"Obj\x01")),
        sig("Apache Arrow IPC file", "application/vnd.apache.arrow.file", exact(b"ARROW1\0\0")),
        // Markup and text
        sig("XML document text", "text/xml", exact(b"<?xml")).with_lookahead(TEXT_LOOKAHEAD),
        sig("HTML document text", "text/html", exact(b"<!doctype html"))
            .with_lookahead(TEXT_LOOKAHEAD)
            .ignore_case(),
        sig("HTML document text", "text/html", exact(b"<html"))
            .with_lookahead(TEXT_LOOKAHEAD)
            .ignore_case(),
        sig("UTF-8 Unicode (with BOM) text", "text/plain", exact(&[0xEF, 0xBB, 0xBF])),
        sig("Little-endian UTF-16 Unicode text", "text/plain", exact(&[0xFF, 0xFE])),
        sig("Big-endian UTF-16 Unicode text", "text/plain", exact(&[0xFE, 0xFF])),
    ]
}
