use crate::config::MetaFormat;
use crate::error::{FlatPagesError, Result};
use crate::metadata::{Metadata, Value, decode_toml, decode_yaml};
use crate::pages::FlatPages;
use crate::renderer::RendererSlot;
use serde::Serialize;
use std::cell::OnceCell;
use std::fmt;
use std::path::{Path, PathBuf};

/// One content file: its logical path, raw front matter and body.
///
/// Decoded metadata and rendered output are computed on first access and
/// kept for the life of this value. A changed file produces a new `Page`.
pub struct Page {
    path: String,
    location: PathBuf,
    meta_text: String,
    format: MetaFormat,
    body: String,
    renderer: RendererSlot,
    meta: OnceCell<Metadata>,
    html: OnceCell<String>,
}

impl Page {
    pub fn new(
        path: impl Into<String>,
        location: impl Into<PathBuf>,
        meta_text: impl Into<String>,
        format: MetaFormat,
        body: impl Into<String>,
        renderer: RendererSlot,
    ) -> Self {
        Self {
            path: path.into(),
            location: location.into(),
            meta_text: meta_text.into(),
            format,
            body: body.into(),
            renderer,
            meta: OnceCell::new(),
            html: OnceCell::new(),
        }
    }

    /// Logical path, `/`-separated and without extension.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// File the page was read from.
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Front matter exactly as it appeared in the file.
    pub fn meta_text(&self) -> &str {
        &self.meta_text
    }

    pub fn format(&self) -> MetaFormat {
        self.format
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Decoded metadata. A decode failure is not cached; the next call
    /// decodes again and fails the same way.
    pub fn meta(&self) -> Result<&Metadata> {
        if let Some(meta) = self.meta.get() {
            return Ok(meta);
        }
        let decoded = match self.format {
            MetaFormat::Yaml => decode_yaml(&self.meta_text, &self.path)?,
            MetaFormat::Toml => decode_toml(&self.meta_text, &self.path)?,
        };
        Ok(self.meta.get_or_init(|| decoded))
    }

    /// Look up one metadata key.
    pub fn get(&self, key: &str) -> Result<&Value> {
        self.meta()?
            .get(key)
            .ok_or_else(|| FlatPagesError::MissingKey {
                path: self.path.clone(),
                key: key.to_string(),
            })
    }

    /// `title` from the metadata when it is a string.
    pub fn title(&self) -> Option<&str> {
        self.meta().ok()?.get("title")?.as_str()
    }

    pub fn renderer_name(&self) -> &str {
        match &self.renderer {
            RendererSlot::Resolved(renderer) => renderer.name(),
            RendererSlot::Unknown(name) => name,
        }
    }

    /// Rendered body, produced once by the page's renderer.
    pub fn html(&self, pages: &FlatPages) -> Result<&str> {
        if let Some(html) = self.html.get() {
            return Ok(html);
        }
        let renderer = match &self.renderer {
            RendererSlot::Resolved(renderer) => renderer,
            RendererSlot::Unknown(name) => {
                return Err(FlatPagesError::Renderer(format!(
                    "renderer '{}' for page '{}' is not registered",
                    name, self.path
                )));
            }
        };
        let rendered = renderer.render(&self.body, pages, self);
        tracing::debug!(path = %self.path, renderer = renderer.name(), "Rendered page");
        Ok(self.html.get_or_init(|| rendered).as_str())
    }

    /// Serializable view for JSON output.
    pub fn summary(&self) -> Result<PageSummary<'_>> {
        Ok(PageSummary {
            path: &self.path,
            location: &self.location,
            meta: self.meta()?,
            body: &self.body,
        })
    }
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("path", &self.path)
            .field("location", &self.location)
            .field("format", &self.format)
            .field("renderer", &self.renderer_name())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
pub struct PageSummary<'a> {
    pub path: &'a str,
    pub location: &'a Path,
    pub meta: &'a Metadata,
    pub body: &'a str,
}
