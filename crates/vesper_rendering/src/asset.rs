//! # Asset Sources
//!
//! Byte loading for shader files. The resource manager never touches the
//! filesystem directly; it asks an [`AssetSource`], so tests and packed
//! builds can serve files from memory.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

/// Loads raw file contents by path.
pub trait AssetSource: Send + Sync {
    /// Reads the whole file.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error (`NotFound` for unknown paths).
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Reads the whole file as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns `InvalidData` if the contents are not valid UTF-8.
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let bytes = self.read(path)?;
        String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

/// Reads files relative to a root directory.
#[derive(Clone, Debug, Default)]
pub struct FileSystemSource {
    root: PathBuf,
}

impl FileSystemSource {
    /// Creates a source rooted at `root`. Absolute paths bypass the root.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetSource for FileSystemSource {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(self.root.join(path))
    }
}

/// In-memory files.
#[derive(Debug, Default)]
pub struct MemorySource {
    files: RwLock<HashMap<PathBuf, Vec<u8>>>,
}

impl MemorySource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a file.
    pub fn insert(&self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
        self.files.write().insert(path.into(), contents.into());
    }

    /// Number of stored files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    /// True if no file is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.read().is_empty()
    }
}

impl AssetSource for MemorySource {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.files.read().get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no asset at {}", path.display()),
            )
        })
    }
}

/// Inserts `defines` on the line after `#version`.
///
/// GLSL requires `#version` to come first, so defines cannot simply be
/// prepended. Without a `#version` line the defines go at the top.
#[must_use]
pub fn inject_compute_defines(source: &str, defines: &str) -> String {
    let mut block = defines.to_string();
    if !block.ends_with('\n') {
        block.push('\n');
    }

    let mut out = String::with_capacity(source.len() + block.len());
    let mut inserted = false;
    for line in source.split_inclusive('\n') {
        out.push_str(line);
        if !inserted && line.trim_start().starts_with("#version") {
            if !line.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&block);
            inserted = true;
        }
    }

    if inserted {
        out
    } else {
        block + source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defines_follow_version() {
        let src = "#version 430\nlayout(local_size_x = 8) in;\n";
        assert_eq!(
            inject_compute_defines(src, "#define A 1"),
            "#version 430\n#define A 1\nlayout(local_size_x = 8) in;\n"
        );
    }

    #[test]
    fn test_defines_without_version_are_prepended() {
        assert_eq!(
            inject_compute_defines("void main() {}\n", "#define B\n"),
            "#define B\nvoid main() {}\n"
        );
    }

    #[test]
    fn test_version_as_last_line() {
        assert_eq!(
            inject_compute_defines("#version 450", "#define C"),
            "#version 450\n#define C\n"
        );
    }

    #[test]
    fn test_memory_source() {
        let source = MemorySource::new();
        source.insert("a.glsl", "abc");
        assert_eq!(source.read_to_string(Path::new("a.glsl")).unwrap(), "abc");
        assert_eq!(
            source.read(Path::new("b.glsl")).unwrap_err().kind(),
            io::ErrorKind::NotFound
        );

        source.insert("bin", vec![0xff, 0xfe]);
        assert_eq!(
            source.read_to_string(Path::new("bin")).unwrap_err().kind(),
            io::ErrorKind::InvalidData
        );
        assert_eq!(source.len(), 2);
    }

    #[test]
    fn test_file_system_source_missing_file() {
        let source = FileSystemSource::new("/definitely/not/here");
        assert!(source.read(Path::new("x.comp")).is_err());
    }
}
