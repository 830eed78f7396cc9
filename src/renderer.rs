//! Renderers turn a page body into output markup.
//!
//! A renderer declares up front which arguments it wants: the body alone, the
//! body plus the page table, or the body, the table and the page itself.

use crate::config::MarkdownSettings;
use crate::page::Page;
use crate::pages::FlatPages;
use pulldown_cmark::{Options, Parser, html};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

pub type BodyFn = dyn Fn(&str) -> String;
pub type BodyAndPagesFn = dyn Fn(&str, &FlatPages) -> String;
pub type BodyPagesAndPageFn = dyn Fn(&str, &FlatPages, &Page) -> String;

/// The call shape of a renderer.
#[derive(Clone)]
pub enum RendererKind {
    BodyOnly(Rc<BodyFn>),
    BodyAndPages(Rc<BodyAndPagesFn>),
    BodyPagesAndPage(Rc<BodyPagesAndPageFn>),
}

impl RendererKind {
    pub fn arity(&self) -> usize {
        match self {
            RendererKind::BodyOnly(_) => 1,
            RendererKind::BodyAndPages(_) => 2,
            RendererKind::BodyPagesAndPage(_) => 3,
        }
    }
}

/// A named render function.
#[derive(Clone)]
pub struct Renderer {
    name: String,
    kind: RendererKind,
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("name", &self.name)
            .field("arity", &self.kind.arity())
            .finish()
    }
}

impl Renderer {
    pub fn new(name: impl Into<String>, kind: RendererKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn body_only(name: impl Into<String>, f: impl Fn(&str) -> String + 'static) -> Self {
        Self::new(name, RendererKind::BodyOnly(Rc::new(f)))
    }

    pub fn with_pages(
        name: impl Into<String>,
        f: impl Fn(&str, &FlatPages) -> String + 'static,
    ) -> Self {
        Self::new(name, RendererKind::BodyAndPages(Rc::new(f)))
    }

    pub fn with_page(
        name: impl Into<String>,
        f: impl Fn(&str, &FlatPages, &Page) -> String + 'static,
    ) -> Self {
        Self::new(name, RendererKind::BodyPagesAndPage(Rc::new(f)))
    }

    /// Markdown to HTML with `pulldown-cmark`.
    pub fn markdown(settings: &MarkdownSettings) -> Self {
        let options = markdown_options(settings);
        Self::body_only("markdown", move |body| {
            let parser = Parser::new_ext(body, options);
            let mut out = String::with_capacity(body.len() * 3 / 2);
            html::push_html(&mut out, parser);
            out
        })
    }

    /// Passes the body through untouched.
    pub fn raw() -> Self {
        Self::body_only("raw", |body| body.to_string())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &RendererKind {
        &self.kind
    }

    pub fn render(&self, body: &str, pages: &FlatPages, page: &Page) -> String {
        match &self.kind {
            RendererKind::BodyOnly(f) => f(body),
            RendererKind::BodyAndPages(f) => f(body, pages),
            RendererKind::BodyPagesAndPage(f) => f(body, pages, page),
        }
    }
}

fn markdown_options(settings: &MarkdownSettings) -> Options {
    let mut options = Options::empty();
    options.set(Options::ENABLE_TABLES, settings.tables);
    options.set(Options::ENABLE_FOOTNOTES, settings.footnotes);
    options.set(Options::ENABLE_STRIKETHROUGH, settings.strikethrough);
    options.set(Options::ENABLE_TASKLISTS, settings.tasklists);
    options.set(Options::ENABLE_SMART_PUNCTUATION, settings.smart_punctuation);
    options
}

/// Outcome of resolving a configured renderer name.
///
/// An unknown name is kept so the failure surfaces at first render.
#[derive(Debug, Clone)]
pub enum RendererSlot {
    Resolved(Rc<Renderer>),
    Unknown(String),
}

/// Renderers available to a page table, by name.
#[derive(Debug, Clone)]
pub struct RendererRegistry {
    renderers: HashMap<String, Rc<Renderer>>,
}

impl RendererRegistry {
    /// A registry holding the built-in `markdown` and `raw` renderers.
    pub fn with_builtins(markdown: &MarkdownSettings) -> Self {
        let mut registry = Self {
            renderers: HashMap::new(),
        };
        registry.register(Renderer::markdown(markdown));
        registry.register(Renderer::raw());
        registry
    }

    /// Add or replace a renderer under its own name.
    pub fn register(&mut self, renderer: Renderer) {
        self.renderers
            .insert(renderer.name.clone(), Rc::new(renderer));
    }

    pub fn resolve(&self, name: &str) -> RendererSlot {
        match self.renderers.get(name) {
            Some(renderer) => RendererSlot::Resolved(Rc::clone(renderer)),
            None => RendererSlot::Unknown(name.to_string()),
        }
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.renderers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
