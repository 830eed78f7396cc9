use super::{FrontMatter, Split, is_blank, strip_leading_blank_lines};
use crate::error::{FlatPagesError, Result};
use yaml_rust2::scanner::{Scanner, TScalarStyle, Token, TokenType};

/// Finds the end of a YAML front matter block with a YAML scanner.
///
/// The block ends at the first explicit document marker (`---` or `...`).
/// Without one, a plain scalar spanning lines ends it at the next blank line.
/// When the scanner fails part way, the block ends after the last token it
/// produced. Otherwise it ends at the first blank line that is not part of a
/// YAML value, and with no such line the whole file is metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenizingSplitter;

impl FrontMatter for TokenizingSplitter {
    fn split(&self, content: &str, path: &str) -> Result<Split> {
        let index = LineIndex::new(content);
        let mut tokens = Tokens::new(content, path);

        // The stream start token carries no position worth keeping.
        tokens.next()?;

        let first = match tokens.next()? {
            Some(token) if opens_metadata(&token.1) => token,
            _ => return Ok(Split::body_only(strip_leading_blank_lines(content))),
        };

        let mut last_line = index.line_of(first.0.index());
        let mut boundary = None;
        let mut multiline_scalar = None;
        let mut scan_failed = false;

        loop {
            let token = match tokens.next() {
                Ok(Some(token)) => token,
                Ok(None) => break,
                Err(err) => {
                    tracing::debug!(path = %path, error = %err, "Front matter scan stopped early");
                    scan_failed = true;
                    break;
                }
            };
            let line = index.line_of(token.0.index());

            match &token.1 {
                TokenType::DocumentStart | TokenType::DocumentEnd => {
                    boundary = Some(line);
                    break;
                }
                TokenType::StreamEnd => break,
                // Closing tokens sit wherever the scanner stopped, not on
                // the line of the value they close.
                TokenType::BlockEnd => continue,
                TokenType::Scalar(TScalarStyle::Plain, value)
                    if multiline_scalar.is_none() && value.contains('\n') =>
                {
                    multiline_scalar = Some(line);
                }
                _ => {}
            }
            last_line = line;
        }

        let lines: Vec<&str> = content.split('\n').collect();
        let meta_end = match (boundary, multiline_scalar) {
            (Some(line), _) => line + 1,
            (None, Some(line)) => find_blank_line(&lines, line).unwrap_or(lines.len()),
            (None, None) if scan_failed => token_end(&lines, last_line),
            (None, None) => find_body_break(&lines, last_line).unwrap_or(lines.len()),
        };

        let meta = lines[..meta_end].join("\n");
        check_printable(&meta, path)?;

        let body = lines[meta_end..].join("\n");
        Ok(Split::new(meta, strip_leading_blank_lines(&body)))
    }
}

/// Tokens that can only open a YAML document holding structure.
fn opens_metadata(kind: &TokenType) -> bool {
    matches!(
        kind,
        TokenType::BlockMappingStart
            | TokenType::BlockSequenceStart
            | TokenType::DocumentStart
            | TokenType::FlowMappingStart
            | TokenType::FlowSequenceStart
            | TokenType::Key
    )
}

/// Scanner wrapper turning scan errors into decode errors for `path`.
struct Tokens<'a> {
    scanner: Scanner<std::str::Chars<'a>>,
    path: &'a str,
}

impl<'a> Tokens<'a> {
    fn new(content: &'a str, path: &'a str) -> Self {
        Self {
            scanner: Scanner::new(content.chars()),
            path,
        }
    }

    fn next(&mut self) -> Result<Option<Token>> {
        match self.scanner.next() {
            Some(token) => Ok(Some(token)),
            None => match self.scanner.get_error() {
                Some(err) => Err(FlatPagesError::decode(self.path, err.to_string())),
                None => Ok(None),
            },
        }
    }
}

/// Maps character offsets to zero-based line numbers.
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(content: &str) -> Self {
        let mut starts = vec![0];
        for (offset, c) in content.chars().enumerate() {
            if c == '\n' {
                starts.push(offset + 1);
            }
        }
        Self { starts }
    }

    fn line_of(&self, char_offset: usize) -> usize {
        self.starts
            .partition_point(|&start| start <= char_offset)
            .saturating_sub(1)
    }
}

fn find_blank_line(lines: &[&str], from: usize) -> Option<usize> {
    lines
        .iter()
        .skip(from)
        .position(|line| is_blank(line))
        .map(|offset| from + offset)
}

/// First blank line after `anchor` whose next non-blank line starts at
/// column zero. Indented lines after a blank line still belong to a value.
fn find_body_break(lines: &[&str], anchor: usize) -> Option<usize> {
    let mut i = anchor + 1;
    while i < lines.len() {
        if !is_blank(lines[i]) {
            i += 1;
            continue;
        }
        let next = i + lines[i..].iter().position(|line| !is_blank(line))?;
        if !starts_indented(lines[next]) {
            return Some(i);
        }
        i = next + 1;
    }
    None
}

/// Line after the token starting on `line`. Markers only carry the start of
/// a token, so indented lines that follow count as its continuation.
fn token_end(lines: &[&str], line: usize) -> usize {
    let mut end = line + 1;
    for (i, text) in lines.iter().enumerate().skip(line + 1) {
        if is_blank(text) {
            continue;
        }
        if !starts_indented(text) {
            break;
        }
        end = i + 1;
    }
    end
}

fn starts_indented(line: &str) -> bool {
    line.starts_with([' ', '\t'])
}

/// YAML only admits printable characters in a stream.
fn check_printable(text: &str, path: &str) -> Result<()> {
    for (line_no, line) in text.split('\n').enumerate() {
        if let Some(c) = line.chars().find(|&c| !is_printable(c)) {
            return Err(FlatPagesError::decode(
                path,
                format!(
                    "special characters are not allowed: U+{:04X} on line {}",
                    c as u32,
                    line_no + 1
                ),
            ));
        }
    }
    Ok(())
}

fn is_printable(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r'
            | '\u{20}'..='\u{7E}'
            | '\u{85}'
            | '\u{A0}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}'
    )
}
