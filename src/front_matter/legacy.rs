use super::{FrontMatter, Split, is_blank};
use crate::error::Result;

/// Metadata is the run of non-blank lines at the top of the file.
///
/// The first blank line ends it and is consumed. A blank line inside a
/// multi-line YAML value therefore cuts the value short.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LegacySplitter;

impl FrontMatter for LegacySplitter {
    fn split(&self, content: &str, _path: &str) -> Result<Split> {
        let mut lines = content.split('\n');
        let meta: Vec<&str> = lines.by_ref().take_while(|line| !is_blank(line)).collect();
        let body: Vec<&str> = lines.collect();
        Ok(Split::new(meta.join("\n"), body.join("\n")))
    }
}
