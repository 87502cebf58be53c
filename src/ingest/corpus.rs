use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::types::HistoricalPost;
use crate::utils::fs::write_atomic;

fn to_jsonl(posts: &[HistoricalPost]) -> Result<String> {
    let mut out = String::new();
    for post in posts {
        out.push_str(&serde_json::to_string(post).context("failed encoding corpus entry")?);
        out.push('\n');
    }
    Ok(out)
}

/// Write `posts` as JSON lines, replacing the file or appending to it.
pub fn write_corpus(path: &Path, posts: &[HistoricalPost], append: bool) -> Result<()> {
    let body = to_jsonl(posts)?;
    if !append {
        return write_atomic(path, &body);
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed creating corpus dir: {}", parent.display()))?;
    }
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed opening corpus: {}", path.display()))?;
    file.write_all(body.as_bytes())
        .with_context(|| format!("failed appending to corpus: {}", path.display()))
}

/// Read every parseable entry. Blank and malformed lines are skipped.
pub fn read_corpus(path: &Path) -> Result<Vec<HistoricalPost>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed reading corpus: {}", path.display()))?;

    let mut posts = Vec::new();
    for (lineno, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<HistoricalPost>(line) {
            Ok(post) => posts.push(post),
            Err(e) => {
                tracing::warn!(path = %path.display(), line = lineno + 1, error = %e, "skipping corpus line");
            }
        }
    }
    Ok(posts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Platform;

    fn post(text: &str) -> HistoricalPost {
        HistoricalPost::new(Platform::X, text, None, "test")
    }

    #[test]
    fn overwrite_then_append() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("corpus.jsonl");

        write_corpus(&path, &[post("one two three")], false).unwrap();
        write_corpus(&path, &[post("four five six")], true).unwrap();
        assert_eq!(read_corpus(&path).unwrap().len(), 2);

        write_corpus(&path, &[post("seven eight nine")], false).unwrap();
        let posts = read_corpus(&path).unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].text, "seven eight nine");
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.jsonl");
        let good = serde_json::to_string(&post("valid post here")).unwrap();
        std::fs::write(&path, format!("{good}\n\nnot json\n")).unwrap();

        let posts = read_corpus(&path).unwrap();
        assert_eq!(posts.len(), 1);
    }

    #[test]
    fn missing_corpus_reads_empty() {
        assert!(read_corpus(Path::new("/nonexistent/corpus.jsonl")).unwrap().is_empty());
    }
}
