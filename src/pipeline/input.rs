//! Input resolution: classify the uploaded document and validate the path.
//!
//! The file kind is decided by extension alone (case-insensitive), matching
//! the upload filter of the original tool: PDF, JPG/JPEG, PNG. Anything
//! else fails with `UnsupportedFormat` before any client is constructed —
//! a bad extension must never cost a network call.
//!
//! PDFs additionally get their `%PDF` magic bytes checked so callers see a
//! meaningful error instead of a pdfium parse failure deep in extraction.

use crate::error::RxParseError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The declared kind of an input document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    /// JPG and JPEG extensions both map here.
    Jpeg,
    Png,
}

impl DocumentKind {
    /// True for the raster-image kinds that go straight to OCR.
    pub fn is_image(&self) -> bool {
        matches!(self, DocumentKind::Jpeg | DocumentKind::Png)
    }

    /// Classify a path by its extension, case-insensitively.
    pub fn from_path(path: &Path) -> Result<Self, RxParseError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("pdf") => Ok(DocumentKind::Pdf),
            Some("jpg") | Some("jpeg") => Ok(DocumentKind::Jpeg),
            Some("png") => Ok(DocumentKind::Png),
            _ => Err(RxParseError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension: ext,
            }),
        }
    }
}

/// A validated input document: existing, readable, and of a supported kind.
#[derive(Debug, Clone)]
pub struct Document {
    pub path: PathBuf,
    pub kind: DocumentKind,
}

/// Resolve a user-supplied path into a [`Document`].
///
/// Order matters: kind classification runs first so an unrecognised
/// extension is reported as `UnsupportedFormat` even when the file also
/// does not exist.
pub fn resolve_document(path_str: &str) -> Result<Document, RxParseError> {
    let path = PathBuf::from(path_str);
    let kind = DocumentKind::from_path(&path)?;

    if !path.exists() {
        return Err(RxParseError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            if kind == DocumentKind::Pdf {
                use std::io::Read;
                let mut magic = [0u8; 4];
                if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                    return Err(RxParseError::NotAPdf { path, magic });
                }
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(RxParseError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(RxParseError::FileNotFound { path });
        }
    }

    debug!("Resolved input: {} ({:?})", path.display(), kind);
    Ok(Document { path, kind })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn kind_from_extension_is_case_insensitive() {
        assert_eq!(
            DocumentKind::from_path(Path::new("rx.PDF")).unwrap(),
            DocumentKind::Pdf
        );
        assert_eq!(
            DocumentKind::from_path(Path::new("scan.JPg")).unwrap(),
            DocumentKind::Jpeg
        );
        assert_eq!(
            DocumentKind::from_path(Path::new("scan.jpeg")).unwrap(),
            DocumentKind::Jpeg
        );
        assert_eq!(
            DocumentKind::from_path(Path::new("scan.png")).unwrap(),
            DocumentKind::Png
        );
    }

    #[test]
    fn unrecognised_extension_is_unsupported() {
        let err = DocumentKind::from_path(Path::new("scan.tiff")).unwrap_err();
        assert!(matches!(err, RxParseError::UnsupportedFormat { .. }));

        let err = DocumentKind::from_path(Path::new("no_extension")).unwrap_err();
        assert!(matches!(
            err,
            RxParseError::UnsupportedFormat {
                extension: None,
                ..
            }
        ));
    }

    #[test]
    fn unsupported_kind_beats_missing_file() {
        // Classification runs before the existence check.
        let err = resolve_document("/nowhere/scan.bmp").unwrap_err();
        assert!(matches!(err, RxParseError::UnsupportedFormat { .. }));
    }

    #[test]
    fn missing_supported_file_is_not_found() {
        let err = resolve_document("/nowhere/rx.pdf").unwrap_err();
        assert!(matches!(err, RxParseError::FileNotFound { .. }));
    }

    #[test]
    fn pdf_magic_bytes_are_validated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.pdf");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"not a pdf at all").unwrap();

        let err = resolve_document(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, RxParseError::NotAPdf { .. }));
    }

    #[test]
    fn valid_pdf_magic_resolves() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ok.pdf");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"%PDF-1.7\n").unwrap();

        let doc = resolve_document(path.to_str().unwrap()).unwrap();
        assert_eq!(doc.kind, DocumentKind::Pdf);
    }

    #[test]
    fn images_skip_the_magic_check() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.png");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"arbitrary bytes")
            .unwrap();

        let doc = resolve_document(path.to_str().unwrap()).unwrap();
        assert!(doc.kind.is_image());
    }
}
