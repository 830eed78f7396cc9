use super::{FrontMatter, Split, is_blank, strip_one_blank_line};
use crate::error::Result;

/// Delimiter used for TOML front matter.
pub const TOML_DELIMITER: &str = "+++";

/// Metadata fenced by a pair of delimiter lines at the top of the file.
///
/// An opening fence that is never closed is not metadata: the lines after it
/// become the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelimitedSplitter {
    delimiter: &'static str,
}

impl DelimitedSplitter {
    pub fn new(delimiter: &'static str) -> Self {
        Self { delimiter }
    }

    pub fn delimiter(&self) -> &'static str {
        self.delimiter
    }

    fn is_fence(&self, line: &str) -> bool {
        line.trim_end() == self.delimiter
    }
}

impl Default for DelimitedSplitter {
    fn default() -> Self {
        Self::new(TOML_DELIMITER)
    }
}

impl FrontMatter for DelimitedSplitter {
    fn split(&self, content: &str, _path: &str) -> Result<Split> {
        let lines: Vec<&str> = content.split('\n').collect();

        let Some(open) = lines.iter().position(|line| !is_blank(line)) else {
            return Ok(Split::body_only(content));
        };
        if !self.is_fence(lines[open]) {
            return Ok(Split::body_only(content));
        }

        let after_open = &lines[open + 1..];
        let Some(close) = after_open.iter().position(|line| self.is_fence(line)) else {
            return Ok(Split::body_only(after_open.join("\n")));
        };

        let meta = after_open[..close].join("\n");
        let body = after_open[close + 1..].join("\n");
        Ok(Split::new(meta, strip_one_blank_line(&body)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(content: &str) -> Split {
        DelimitedSplitter::default().split(content, "test.md").unwrap()
    }

    #[test]
    fn test_fenced_metadata() {
        let content = "+++\ntitle = \"Test Page\"\nauthor = \"John Doe\"\n+++\n\n# This is a test page\n";
        assert_eq!(
            split(content),
            Split::new(
                "title = \"Test Page\"\nauthor = \"John Doe\"",
                "# This is a test page\n"
            )
        );
    }

    #[test]
    fn test_only_one_blank_line_is_stripped() {
        let content = "+++\na = 1\n+++\n\n\nbody";
        assert_eq!(split(content), Split::new("a = 1", "\nbody"));
    }

    #[test]
    fn test_no_metadata() {
        let content = "# This is a test page without metadata";
        assert_eq!(split(content), Split::body_only(content));
    }

    #[test]
    fn test_missing_closing_delimiter() {
        let content = "+++\ntitle = \"Test Page\"\nauthor = \"John Doe\"\n\n# This is a test page\n";
        assert_eq!(
            split(content),
            Split::body_only(content.replacen("+++\n", "", 1))
        );
    }

    #[test]
    fn test_empty_block() {
        assert_eq!(split("+++\n+++\n"), Split::default());
    }

    #[test]
    fn test_yaml_style_delimiters_are_ignored() {
        let content = "---\ntitle = \"YAML Title\"\n---\n# Body\n";
        assert_eq!(split(content), Split::body_only(content));

        let content = "---\ntitle = \"YAML Title\"\n...\n# Body\n";
        assert_eq!(split(content), Split::body_only(content));
    }

    #[test]
    fn test_fence_must_open_the_file() {
        let content = "intro\n+++\na = 1\n+++\nbody";
        assert_eq!(split(content), Split::body_only(content));
    }

    #[test]
    fn test_custom_delimiter() {
        let splitter = DelimitedSplitter::new("---");
        let split = splitter.split("---\na: 1\n---\nbody", "p").unwrap();
        assert_eq!(split, Split::new("a: 1", "body"));
    }
}
