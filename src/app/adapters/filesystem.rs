//! Output writer for rendered artifacts
//!
//! Resolves every relative path under a single output root, creates parent
//! directories on demand and writes files with a trailing newline.

use crate::{Error, Result};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// A file written by [`OutputWriter::write`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub bytes: u64,
}

/// Writes rendered content beneath an output root
#[derive(Debug, Clone)]
pub struct OutputWriter {
    root: PathBuf,
}

impl OutputWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a path relative to the output root.
    ///
    /// Absolute paths and `..` segments are refused so nothing lands outside
    /// the root.
    pub fn resolve(&self, relative: impl AsRef<Path>) -> Result<PathBuf> {
        let relative = relative.as_ref();
        let confined = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_) | Component::CurDir));

        if !confined {
            return Err(Error::io(
                relative,
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "path must stay inside the output root",
                ),
            ));
        }
        Ok(self.root.join(relative))
    }

    /// Create a directory (and parents) if absent; an existing one is fine
    pub fn ensure_dir(&self, relative: impl AsRef<Path>) -> Result<PathBuf> {
        let dir = self.resolve(relative)?;
        fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;
        Ok(dir)
    }

    /// Write `content` to `relative`, truncating any previous file.
    ///
    /// A newline is appended unless the content already ends with one.
    pub fn write(&self, relative: impl AsRef<Path>, content: &str) -> Result<WrittenFile> {
        let path = self.resolve(relative)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        let mut body = String::with_capacity(content.len() + 1);
        body.push_str(content);
        if !body.ends_with('\n') {
            body.push('\n');
        }

        fs::write(&path, body.as_bytes()).map_err(|e| Error::io(&path, e))?;
        debug!("Wrote {} bytes to {}", body.len(), path.display());

        Ok(WrittenFile {
            path,
            bytes: body.len() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_directory_and_appends_newline() {
        let temp_dir = TempDir::new().unwrap();
        let writer = OutputWriter::new(temp_dir.path());

        let written = writer.write("output/thanks_1.html", "<p>hi</p>").unwrap();

        assert_eq!(written.path, temp_dir.path().join("output/thanks_1.html"));
        assert_eq!(written.bytes, 10);
        let content = fs::read_to_string(&written.path).unwrap();
        assert_eq!(content, "<p>hi</p>\n");
    }

    #[test]
    fn test_write_does_not_double_trailing_newline() {
        let temp_dir = TempDir::new().unwrap();
        let writer = OutputWriter::new(temp_dir.path());

        let written = writer.write("a.txt", "line\n").unwrap();
        assert_eq!(fs::read_to_string(written.path).unwrap(), "line\n");
    }

    #[test]
    fn test_write_truncates_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let writer = OutputWriter::new(temp_dir.path());

        writer.write("out.html", "a much longer first version").unwrap();
        let written = writer.write("out.html", "short").unwrap();

        assert_eq!(fs::read_to_string(written.path).unwrap(), "short\n");
    }

    #[test]
    fn test_ensure_dir_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let writer = OutputWriter::new(temp_dir.path());

        let first = writer.ensure_dir("phone_list").unwrap();
        let second = writer.ensure_dir("phone_list").unwrap();

        assert_eq!(first, second);
        assert!(first.is_dir());
    }

    #[test]
    fn test_paths_leaving_the_root_are_refused() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("root");
        let writer = OutputWriter::new(&root);

        let err = writer
            .write("output/../../escaped.html", "content")
            .unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(writer.write("/tmp/absolute.html", "content").is_err());
        assert!(writer.ensure_dir("../sibling").is_err());

        assert!(!temp_dir.path().join("escaped.html").exists());
        assert!(!temp_dir.path().join("sibling").exists());
        assert!(writer.write("./output/ok.html", "content").is_ok());
    }

    #[test]
    fn test_write_into_file_path_fails_with_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let writer = OutputWriter::new(temp_dir.path());
        writer.write("blocker", "not a directory").unwrap();

        let err = writer.write("blocker/inner.html", "content").unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
        assert_eq!(err.exit_code(), 3);
    }
}
