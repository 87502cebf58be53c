use std::path::{Path, PathBuf};

use crate::error::ParseError;

/// How a source document is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Text,
    Html,
}

fn unreadable(path: &Path, message: impl ToString) -> ParseError {
    ParseError::Unreadable {
        path: path.display().to_string(),
        message: message.to_string(),
    }
}

fn is_html(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"))
}

impl DocumentKind {
    /// Classify by extension; a directory is treated as a folder of saved pages.
    pub fn detect(path: &Path) -> Result<Self, ParseError> {
        if !path.exists() {
            return Err(unreadable(path, "no such file or directory"));
        }
        if path.is_dir() {
            return Ok(Self::Html);
        }
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "pdf" => Ok(Self::Pdf),
            "txt" | "text" => Ok(Self::Text),
            "html" | "htm" => Ok(Self::Html),
            other => Err(ParseError::UnsupportedDocument(if other.is_empty() {
                path.display().to_string()
            } else {
                format!(".{other}")
            })),
        }
    }
}

/// Extract the plain text of a PDF or pre-extracted text file.
pub fn read_text(path: &Path) -> Result<String, ParseError> {
    match DocumentKind::detect(path)? {
        DocumentKind::Pdf => {
            pdf_extract::extract_text(path).map_err(|e| unreadable(path, e))
        }
        DocumentKind::Text => std::fs::read_to_string(path).map_err(|e| unreadable(path, e)),
        DocumentKind::Html => Err(ParseError::UnsupportedDocument(
            "saved HTML pages carry no text layout; use the scrape command".into(),
        )),
    }
}

/// Saved HTML pages at `path`: the file itself, or every page below a directory.
pub fn html_files(path: &Path) -> Result<Vec<PathBuf>, ParseError> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    let mut pending = vec![path.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let entries = std::fs::read_dir(&dir).map_err(|e| unreadable(&dir, e))?;
        for entry in entries {
            let entry_path = entry.map_err(|e| unreadable(&dir, e))?.path();
            if entry_path.is_dir() {
                pending.push(entry_path);
            } else if is_html(&entry_path) {
                files.push(entry_path);
            }
        }
    }
    files.sort();

    if files.is_empty() {
        return Err(ParseError::NoPosts {
            path: path.display().to_string(),
        });
    }
    Ok(files)
}

/// Read an HTML page, tolerating invalid UTF-8.
pub fn read_html(path: &Path) -> Result<String, ParseError> {
    let bytes = std::fs::read(path).map_err(|e| unreadable(path, e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("export.PDF");
        let txt = dir.path().join("export.txt");
        let doc = dir.path().join("export.docx");
        for p in [&pdf, &txt, &doc] {
            std::fs::write(p, "x").unwrap();
        }

        assert_eq!(DocumentKind::detect(&pdf).unwrap(), DocumentKind::Pdf);
        assert_eq!(DocumentKind::detect(&txt).unwrap(), DocumentKind::Text);
        assert_eq!(DocumentKind::detect(dir.path()).unwrap(), DocumentKind::Html);
        assert!(matches!(
            DocumentKind::detect(&doc),
            Err(ParseError::UnsupportedDocument(_))
        ));
    }

    #[test]
    fn missing_document_is_unreadable() {
        let err = read_text(Path::new("/nonexistent/export.pdf")).unwrap_err();
        assert!(matches!(err, ParseError::Unreadable { .. }));
    }

    #[test]
    fn html_files_walks_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("a.html"), "<p/>").unwrap();
        std::fs::write(dir.path().join("nested").join("b.htm"), "<p/>").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "skip").unwrap();

        let files = html_files(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn empty_directory_has_no_posts() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(html_files(dir.path()), Err(ParseError::NoPosts { .. })));
    }
}
