//! # Flatpages - pages from flat files
//!
//! Flatpages turns a directory of text files into a table of pages. Each
//! file may start with a front matter block (YAML, or TOML between `+++`
//! fences) followed by a body that is rendered on demand.
//!
//! ## Features
//!
//! - **Lazy loading**: the directory is walked on first access and the
//!   resulting table is kept until [`FlatPages::reload`]
//! - **Mtime cache**: unchanged files are never parsed twice
//! - **Front matter aware of YAML structure**: blank lines inside block
//!   scalars do not end the metadata early
//! - **Pluggable renderers**: markdown and raw built in, custom ones by name
//!
//! ## Quick Start
//!
//! ```no_run
//! use flatpages::{FlatPages, FlatPagesConfig};
//!
//! let config = FlatPagesConfig {
//!     extension: ".md".into(),
//!     ..FlatPagesConfig::with_root("content")
//! };
//! let pages = FlatPages::new(config, ".");
//!
//! if let Some(page) = pages.get("blog/hello")? {
//!     println!("{}", page.get("title")?);
//!     println!("{}", page.html(&pages)?);
//! }
//! # Ok::<(), flatpages::error::FlatPagesError>(())
//! ```
//!
//! ## Modules
//!
//! - [`pages`]: the page table and directory walker
//! - [`page`]: a single page with lazily decoded metadata and output
//! - [`front_matter`]: locating the metadata block in a file
//! - [`metadata`]: decoding front matter into values
//! - [`cache`]: mtime-keyed cache of parsed files
//! - [`source`]: filesystem access
//! - [`renderer`]: body renderers
//! - [`config`]: configuration loading
//! - [`error`]: error types and result alias

/// Mtime-keyed cache of parsed page files.
pub mod cache;

/// Command-line interface definitions and handlers.
pub mod cli;

/// Configuration loading and management.
///
/// Handles `.flatpages.yml` files and project discovery.
pub mod config;

/// Error types and result aliases.
///
/// Defines `FlatPagesError` and `Result<T>`.
pub mod error;

pub mod front_matter;
pub mod logging;
pub mod metadata;
pub mod page;
pub mod pages;
pub mod renderer;
pub mod source;

/// Input validation utilities.
pub mod validation;

pub use config::FlatPagesConfig;
pub use page::Page;
pub use pages::FlatPages;
