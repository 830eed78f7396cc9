//! Splitting page files into a front matter block and a body.
//!
//! ## Strategies
//!
//! - [`LegacySplitter`]: metadata is every line up to the first blank one.
//! - [`TokenizingSplitter`]: drives a YAML scanner so blank lines inside
//!   block values do not end the metadata early.
//! - [`DelimitedSplitter`]: metadata sits between two `+++` fence lines.
//!
//! [`Splitter::for_format`] picks one from configuration.

mod delimited;
mod legacy;
mod tokenizing;

pub use delimited::{DelimitedSplitter, TOML_DELIMITER};
pub use legacy::LegacySplitter;
pub use tokenizing::TokenizingSplitter;

use crate::config::MetaFormat;
use crate::error::Result;

/// Raw front matter text and the remaining body of a page file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Split {
    pub meta: String,
    pub body: String,
}

impl Split {
    pub fn new(meta: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            meta: meta.into(),
            body: body.into(),
        }
    }

    /// No metadata; the whole input is body.
    pub fn body_only(body: impl Into<String>) -> Self {
        Self::new(String::new(), body)
    }
}

/// A way of locating the boundary between front matter and body.
pub trait FrontMatter {
    /// Split `content`. `path` is the logical page path, used in errors.
    fn split(&self, content: &str, path: &str) -> Result<Split>;
}

/// The splitter selected for one metadata syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Splitter {
    Legacy(LegacySplitter),
    Tokenizing(TokenizingSplitter),
    Delimited(DelimitedSplitter),
}

impl Splitter {
    /// `legacy` only affects YAML front matter.
    pub fn for_format(format: MetaFormat, legacy: bool) -> Self {
        match format {
            MetaFormat::Yaml if legacy => Splitter::Legacy(LegacySplitter),
            MetaFormat::Yaml => Splitter::Tokenizing(TokenizingSplitter),
            MetaFormat::Toml => Splitter::Delimited(DelimitedSplitter::default()),
        }
    }
}

impl FrontMatter for Splitter {
    fn split(&self, content: &str, path: &str) -> Result<Split> {
        match self {
            Splitter::Legacy(s) => s.split(content, path),
            Splitter::Tokenizing(s) => s.split(content, path),
            Splitter::Delimited(s) => s.split(content, path),
        }
    }
}

pub(crate) fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Drop every leading line that holds nothing but whitespace.
pub(crate) fn strip_leading_blank_lines(text: &str) -> &str {
    let mut rest = text;
    loop {
        match rest.split_once('\n') {
            Some((first, tail)) if is_blank(first) => rest = tail,
            None if is_blank(rest) => return "",
            _ => return rest,
        }
    }
}

/// Drop at most one leading blank line.
pub(crate) fn strip_one_blank_line(text: &str) -> &str {
    match text.split_once('\n') {
        Some((first, tail)) if is_blank(first) => tail,
        None if is_blank(text) => "",
        _ => text,
    }
}
