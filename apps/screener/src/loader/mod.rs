//! Document Loader — extracts plain text from résumé/JD files.
//!
//! One bad file must never abort a batch: every failure mode is a typed
//! error the pipeline can report per candidate.

use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("corrupt file '{path}': {reason}")]
    CorruptFile { path: String, reason: String },

    #[error("file '{0}' contains no extractable text")]
    EmptyContent(String),

    #[error("PDF '{0}' is encrypted")]
    EncryptedFile(String),

    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Declared document type, derived from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Text,
}

/// Maps a path to its declared kind. Only `.pdf` and `.txt`/`.text` are
/// accepted; anything else is an UnsupportedFormat error rather than a
/// guess at the contents.
pub fn detect_kind(path: &Path) -> Result<DocumentKind, LoaderError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "pdf" => Ok(DocumentKind::Pdf),
        "txt" | "text" => Ok(DocumentKind::Text),
        _ => Err(LoaderError::UnsupportedFormat(display_path(path))),
    }
}

/// Extracts plain text from the file at `path`.
pub fn load_document(path: &Path) -> Result<String, LoaderError> {
    let kind = detect_kind(path)?;

    let data = fs::read(path).map_err(|source| LoaderError::Io {
        path: display_path(path),
        source,
    })?;

    let text = match kind {
        DocumentKind::Text => String::from_utf8_lossy(&data).into_owned(),
        DocumentKind::Pdf => extract_pdf(path, &data)?,
    };

    if text.trim().is_empty() {
        return Err(LoaderError::EmptyContent(display_path(path)));
    }

    debug!("Loaded {} ({} chars)", display_path(path), text.len());
    Ok(text.trim().to_string())
}

fn extract_pdf(path: &Path, data: &[u8]) -> Result<String, LoaderError> {
    // An /Encrypt entry in the trailer means the document needs a password;
    // pdf-extract would fail with an opaque error, so detect it up front.
    if contains_subslice(data, b"/Encrypt") {
        return Err(LoaderError::EncryptedFile(display_path(path)));
    }

    pdf_extract::extract_text_from_mem(data).map_err(|e| LoaderError::CorruptFile {
        path: display_path(path),
        reason: e.to_string(),
    })
}

/// Best-effort candidate name: the first non-empty line when it looks like
/// a personal-name heading, otherwise the file stem.
pub fn derive_candidate_name(text: &str, path: &Path) -> String {
    let first_line = text.lines().map(str::trim).find(|l| !l.is_empty());

    if let Some(line) = first_line {
        let words = line.split_whitespace().count();
        let looks_like_name = line.len() <= 64
            && (1..=5).contains(&words)
            && line.chars().any(|c| c.is_alphabetic())
            && !line.chars().any(|c| c.is_ascii_digit())
            && !line.contains('@');
        if looks_like_name {
            return line.to_string();
        }
    }

    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string()
}

fn display_path(path: &Path) -> String {
    path.display().to_string()
}

fn contains_subslice(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(bytes).unwrap();
        path
    }

    #[test]
    fn test_loads_plain_text() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "cv.txt", b"Jane Doe\n5 years of Python.\n");
        let text = load_document(&path).unwrap();
        assert!(text.contains("Jane Doe"));
        assert!(text.contains("Python"));
    }

    #[test]
    fn test_empty_file_is_typed_error() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "cv.txt", b"   \n\n  ");
        assert!(matches!(
            load_document(&path),
            Err(LoaderError::EmptyContent(_))
        ));
    }

    #[test]
    fn test_unknown_extension_is_unsupported() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "cv.docx", b"not really a docx");
        assert!(matches!(
            load_document(&path),
            Err(LoaderError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let path = Path::new("/nonexistent/cv.txt");
        assert!(matches!(load_document(path), Err(LoaderError::Io { .. })));
    }

    #[test]
    fn test_garbage_pdf_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "cv.pdf", b"%PDF-1.4 this is not a real pdf body");
        assert!(matches!(
            load_document(&path),
            Err(LoaderError::CorruptFile { .. })
        ));
    }

    #[test]
    fn test_encrypted_pdf_detected_before_extraction() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "cv.pdf",
            b"%PDF-1.7\n1 0 obj\n<< /Encrypt 2 0 R >>\nendobj\n",
        );
        assert!(matches!(
            load_document(&path),
            Err(LoaderError::EncryptedFile(_))
        ));
    }

    #[test]
    fn test_lossy_decode_never_fails_on_invalid_utf8() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "cv.txt", &[0x4a, 0x6f, 0xff, 0xfe, 0x65, 0x21]);
        let text = load_document(&path).unwrap();
        assert!(!text.is_empty());
    }

    #[test]
    fn test_candidate_name_from_heading_line() {
        let name = derive_candidate_name("  Jane A. Doe\nSenior Engineer", Path::new("cv1.txt"));
        assert_eq!(name, "Jane A. Doe");
    }

    #[test]
    fn test_candidate_name_falls_back_to_file_stem() {
        let text = "Results-driven professional with 10+ years of experience in \
                    distributed systems and cloud infrastructure management";
        let name = derive_candidate_name(text, Path::new("resumes/jane_doe.pdf"));
        assert_eq!(name, "jane_doe");
    }

    #[test]
    fn test_candidate_name_skips_email_lines() {
        let name = derive_candidate_name("jane@example.com\nJane Doe", Path::new("cv2.txt"));
        assert_eq!(name, "cv2");
    }
}
