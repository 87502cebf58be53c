use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Replace `path` with `content` via a sibling temp file and a rename, so
/// readers never observe a half-written file.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed creating parent dir: {}", parent.display()))?;
    }

    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, content)
        .with_context(|| format!("failed writing temp file: {}", temp_path.display()))?;

    if let Err(rename_error) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(rename_error)
            .with_context(|| format!("failed replacing file atomically: {}", path.display()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_atomic_creates_parents_and_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("guide.json");

        write_atomic(&target, "{}").unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "{}");
        assert!(!target.with_extension("tmp").exists());
    }

    #[test]
    fn write_atomic_overwrites_existing() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("guide.json");
        fs::write(&target, "old").unwrap();

        write_atomic(&target, "new").unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "new");
    }
}
