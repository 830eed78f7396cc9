use crate::cache::FileCache;
use crate::config::{FlatPagesConfig, MetaFormat};
use crate::error::{FlatPagesError, Result};
use crate::front_matter::{FrontMatter, Splitter, TOML_DELIMITER};
use crate::metadata::Metadata;
use crate::page::Page;
use crate::renderer::{Renderer, RendererRegistry};
use crate::source::{self, FsSource, Source, SourceFile};
use crate::validation::validate_page_path;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// A collection of pages read from one root directory.
///
/// The path-to-page table is built on first access and kept until
/// [`reload`](Self::reload). Building walks the whole tree; files whose
/// mtime has not changed are served from the file cache instead of being
/// parsed again.
///
/// Not thread-safe: share it within one thread only.
pub struct FlatPages {
    config: FlatPagesConfig,
    root: PathBuf,
    source: Box<dyn Source>,
    renderers: RendererRegistry,
    cache: RefCell<FileCache>,
    snapshot: RefCell<Option<Rc<Snapshot>>>,
}

impl FlatPages {
    /// Pages on the local filesystem. A relative `config.root` resolves
    /// against `project_root`.
    pub fn new(config: FlatPagesConfig, project_root: impl AsRef<Path>) -> Self {
        Self::with_source(config, project_root, FsSource)
    }

    pub fn with_source(
        config: FlatPagesConfig,
        project_root: impl AsRef<Path>,
        source: impl Source + 'static,
    ) -> Self {
        let root = config.root_path(project_root.as_ref());
        let renderers = RendererRegistry::with_builtins(&config.markdown);
        Self {
            config,
            root,
            source: Box::new(source),
            renderers,
            cache: RefCell::new(FileCache::new()),
            snapshot: RefCell::new(None),
        }
    }

    /// Find `.flatpages.yml` upward from `start_path` and open its pages.
    pub fn load(start_path: &Path) -> Result<Self> {
        let (config, project_root) = FlatPagesConfig::load(start_path)?;
        Ok(Self::new(config, project_root))
    }

    /// Make `renderer` available under its name. Cached pages are dropped
    /// so the next build resolves renderers again.
    pub fn register_renderer(&mut self, renderer: Renderer) {
        self.renderers.register(renderer);
        self.reload(true);
    }

    pub fn config(&self) -> &FlatPagesConfig {
        &self.config
    }

    /// Directory the pages are read from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The current table, building it if needed.
    pub fn snapshot(&self) -> Result<Rc<Snapshot>> {
        if let Some(snapshot) = self.snapshot.borrow().as_ref() {
            return Ok(Rc::clone(snapshot));
        }
        let snapshot = Rc::new(self.build()?);
        *self.snapshot.borrow_mut() = Some(Rc::clone(&snapshot));
        Ok(snapshot)
    }

    /// The page at `path`, or `None` if there is none.
    pub fn get(&self, path: &str) -> Result<Option<Rc<Page>>> {
        let key = self.fold(path);
        Ok(self.snapshot()?.get(&key).cloned())
    }

    /// The page at `path`, or `default` if there is none.
    pub fn get_or(&self, path: &str, default: Rc<Page>) -> Result<Rc<Page>> {
        Ok(self.get(path)?.unwrap_or(default))
    }

    /// The page at `path`; a missing page is a [`FlatPagesError::NotFound`].
    pub fn get_or_fail(&self, path: &str) -> Result<Rc<Page>> {
        self.get(path)?
            .ok_or_else(|| FlatPagesError::NotFound(path.to_string()))
    }

    /// Every page, ordered by path.
    pub fn pages(&self) -> Result<Vec<Rc<Page>>> {
        let snapshot = self.snapshot()?;
        let mut pages: Vec<Rc<Page>> = snapshot.iter().cloned().collect();
        pages.sort_by(|a, b| a.path().cmp(b.path()));
        Ok(pages)
    }

    /// Forget the table so the next access walks the tree again. `deep`
    /// also empties the file cache, forcing every file to be parsed anew.
    pub fn reload(&self, deep: bool) {
        self.snapshot.borrow_mut().take();
        if deep {
            self.cache.borrow_mut().clear();
        }
        tracing::info!(root = %self.root.display(), deep, "Pages reloaded");
    }

    /// Hook to call before each unit of work. Reloads according to the
    /// `auto_reload` policy and returns whether it did.
    pub fn before_request(&self, debug: bool) -> bool {
        let reload = self.config.auto_reload.should_reload(debug);
        if reload {
            self.reload(false);
        }
        reload
    }

    /// Write a page to `path` under the root, using the first configured
    /// extension and its metadata syntax. Returns the file written.
    pub fn store(&self, path: &str, meta: &Metadata, body: &str) -> Result<PathBuf> {
        validate_page_path(path)?;
        let extensions = self.config.extensions()?;
        let extension = extensions
            .first()
            .ok_or_else(|| FlatPagesError::Config("No page extension configured".to_string()))?;

        let text = serialize_page(self.config.meta_format_for(extension), meta, body)?;
        let bytes = source::encode(&self.config.encoding, &text)?;
        let target = self.root.join(format!("{}{}", path, extension));
        self.source.write(&target, &bytes)?;

        tracing::info!(path, file = %target.display(), "Stored page");
        self.reload(false);
        Ok(target)
    }

    /// Remove the file behind the page at `path`.
    pub fn delete(&self, path: &str) -> Result<()> {
        let page = self.get_or_fail(path)?;
        self.source.remove(page.location())?;

        tracing::info!(path, file = %page.location().display(), "Deleted page");
        self.reload(false);
        Ok(())
    }

    fn fold(&self, path: &str) -> String {
        if self.config.case_insensitive {
            path.to_lowercase()
        } else {
            path.to_string()
        }
    }

    fn build(&self) -> Result<Snapshot> {
        let extensions = self.config.extensions()?;
        source::resolve_encoding(&self.config.encoding)?;

        let files = self.source.list_tree(&self.root)?;
        let mut pages: HashMap<String, Rc<Page>> = HashMap::with_capacity(files.len());
        let mut cache = self.cache.borrow_mut();

        for file in &files {
            let Some((path, extension)) = self.logical_path(file, &extensions) else {
                continue;
            };
            if let Some(existing) = pages.get(&path) {
                return Err(FlatPagesError::Collision {
                    path,
                    first: existing.location().to_path_buf(),
                    second: file.path.clone(),
                });
            }

            let page = cache.load(
                self.source.as_ref(),
                &file.path,
                &self.config.encoding,
                |content| self.parse(&content, &path, &file.path, extension),
            )?;
            pages.insert(path, page);
        }

        tracing::debug!(root = %self.root.display(), pages = pages.len(), "Built page table");
        Ok(Snapshot { pages })
    }

    /// Logical path of `file` and the extension it matched, if any.
    fn logical_path<'e>(
        &self,
        file: &SourceFile,
        extensions: &'e [String],
    ) -> Option<(String, &'e str)> {
        let (name, dirs) = file.segments.split_last()?;
        let extension = extensions.iter().find(|ext| name.ends_with(ext.as_str()))?;
        let stem = &name[..name.len() - extension.len()];
        if stem.is_empty() {
            return None;
        }

        let mut path = dirs.join("/");
        if !path.is_empty() {
            path.push('/');
        }
        path.push_str(stem);
        Some((self.fold(&path), extension.as_str()))
    }

    fn parse(&self, content: &str, path: &str, location: &Path, extension: &str) -> Result<Page> {
        let format = self.config.meta_format_for(extension);
        let split =
            Splitter::for_format(format, self.config.legacy_meta_parser).split(content, path)?;
        Ok(Page::new(
            path,
            location,
            split.meta,
            format,
            split.body,
            self.renderers.resolve(&self.config.renderer),
        ))
    }
}

/// Render a page back into file text.
fn serialize_page(format: MetaFormat, meta: &Metadata, body: &str) -> Result<String> {
    match format {
        MetaFormat::Yaml if meta.is_empty() => Ok(format!("\n{}", body)),
        MetaFormat::Yaml => {
            let meta = serde_yaml::to_string(meta)?;
            Ok(format!("{}\n{}", meta, body))
        }
        MetaFormat::Toml => {
            let meta = toml::to_string(meta)
                .map_err(|e| FlatPagesError::Storage(format!("Failed to serialize TOML: {}", e)))?;
            Ok(format!("{TOML_DELIMITER}\n{meta}{TOML_DELIMITER}\n\n{body}"))
        }
    }
}

/// An immutable path-to-page table.
#[derive(Debug, Default)]
pub struct Snapshot {
    pages: HashMap<String, Rc<Page>>,
}

impl Snapshot {
    pub fn get(&self, path: &str) -> Option<&Rc<Page>> {
        self.pages.get(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rc<Page>> {
        self.pages.values()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// All logical paths, sorted.
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.pages.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }
}
