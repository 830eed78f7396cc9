//! Access to the files behind a page table.

use crate::error::{FlatPagesError, Result};
use encoding_rs::Encoding;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tempfile::NamedTempFile;
use walkdir::WalkDir;

/// A file found under the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Full path to the file.
    pub path: PathBuf,
    /// Path components relative to the root, file name last.
    pub segments: Vec<String>,
}

/// Where page files come from.
pub trait Source {
    /// Read and decode the file at `path` with the encoding named `encoding`.
    fn read(&self, path: &Path, encoding: &str) -> Result<String>;

    fn mtime(&self, path: &Path) -> Result<SystemTime>;

    /// Every regular file below `root`. A missing root has no files.
    fn list_tree(&self, root: &Path) -> Result<Vec<SourceFile>>;

    /// Replace the file at `path`, creating parent directories.
    fn write(&self, path: &Path, content: &[u8]) -> Result<()>;

    fn remove(&self, path: &Path) -> Result<()>;
}

/// The local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSource;

impl Source for FsSource {
    fn read(&self, path: &Path, encoding: &str) -> Result<String> {
        let encoding = resolve_encoding(encoding)?;
        let bytes = std::fs::read(path)?;
        decode(encoding, &bytes, path)
    }

    fn mtime(&self, path: &Path) -> Result<SystemTime> {
        Ok(std::fs::metadata(path)?.modified()?)
    }

    fn list_tree(&self, root: &Path) -> Result<Vec<SourceFile>> {
        if !root.exists() {
            tracing::debug!(root = %root.display(), "Page root does not exist");
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() > 0 => {
                    tracing::warn!(error = %e, "Skipping unreadable entry");
                    continue;
                }
                Err(e) => return Err(FlatPagesError::Storage(e.to_string())),
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry.path().strip_prefix(root).map_err(|e| {
                FlatPagesError::Storage(format!("{}: {}", entry.path().display(), e))
            })?;
            let segments = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            files.push(SourceFile {
                path: entry.path().to_path_buf(),
                segments,
            });
        }
        Ok(files)
    }

    fn write(&self, path: &Path, content: &[u8]) -> Result<()> {
        let dir = path
            .parent()
            .ok_or_else(|| FlatPagesError::Storage("Target path has no parent directory".to_string()))?;
        std::fs::create_dir_all(dir)?;

        // The temp file must live next to the target for the rename to be atomic.
        let mut temp_file = NamedTempFile::new_in(dir)
            .map_err(|e| FlatPagesError::Storage(format!("Failed to create temp file: {}", e)))?;
        temp_file
            .write_all(content)
            .map_err(|e| FlatPagesError::Storage(format!("Failed to write temp file: {}", e)))?;
        temp_file
            .as_file()
            .sync_all()
            .map_err(|e| FlatPagesError::Storage(format!("Failed to sync temp file: {}", e)))?;
        temp_file
            .persist(path)
            .map_err(|e| FlatPagesError::Storage(format!("Failed to persist temp file: {}", e)))?;
        Ok(())
    }

    fn remove(&self, path: &Path) -> Result<()> {
        std::fs::remove_file(path)?;
        Ok(())
    }
}

/// Look up a WHATWG encoding label such as `utf-8` or `latin1`.
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| FlatPagesError::Config(format!("Unknown encoding: {}", label)))
}

/// Encode `text` for writing with the encoding named `label`.
pub fn encode(label: &str, text: &str) -> Result<Vec<u8>> {
    let encoding = resolve_encoding(label)?;
    let (bytes, _, had_errors) = encoding.encode(text);
    if had_errors {
        return Err(FlatPagesError::Storage(format!(
            "Text cannot be represented in {}",
            encoding.name()
        )));
    }
    Ok(bytes.into_owned())
}

fn decode(encoding: &'static Encoding, bytes: &[u8], path: &Path) -> Result<String> {
    let bytes = match encoding.name() {
        "UTF-8" => bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes),
        _ => bytes,
    };
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
        .ok_or_else(|| {
            FlatPagesError::Storage(format!(
                "{} is not valid {}",
                path.display(),
                encoding.name()
            ))
        })
}
