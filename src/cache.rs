use crate::error::Result;
use crate::page::Page;
use crate::source::Source;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::SystemTime;

/// Parsed pages keyed by file path, valid while the file's mtime is unchanged.
///
/// Entries are never evicted one by one. A newer mtime replaces the entry
/// with a freshly parsed page; pages handed out earlier are left untouched.
#[derive(Debug, Default)]
pub struct FileCache {
    entries: HashMap<PathBuf, (Rc<Page>, SystemTime)>,
}

impl FileCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached page for `file` if its mtime still matches,
    /// otherwise read it, build a page with `parse` and cache that.
    pub fn load<F>(
        &mut self,
        source: &dyn Source,
        file: &Path,
        encoding: &str,
        parse: F,
    ) -> Result<Rc<Page>>
    where
        F: FnOnce(String) -> Result<Page>,
    {
        let mtime = source.mtime(file)?;
        if let Some((page, cached)) = self.entries.get(file) {
            if *cached == mtime {
                tracing::debug!(file = %file.display(), "Page cache hit");
                return Ok(Rc::clone(page));
            }
        }

        tracing::debug!(file = %file.display(), "Page cache miss");
        let content = source.read(file, encoding)?;
        let page = Rc::new(parse(content)?);
        self.entries
            .insert(file.to_path_buf(), (Rc::clone(&page), mtime));
        Ok(page)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
