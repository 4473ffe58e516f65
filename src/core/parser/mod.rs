//! Message text parsing: the parser seam used by the normalizer, plus a
//! built-in markdown-like parser.
//!
//! The normalizer only depends on [`MessageParser`]; any implementation that
//! turns text into a [`Root`] can be plugged in. [`BasicParser`] covers the
//! common chat markup (fences, headings, quotes, lists, emphasis, links,
//! mentions, emoji) and emits a leading `LINE_BREAK` for leading blank lines,
//! like the upstream parser does.

mod inline;
mod segments;

use serde::{Deserialize, Serialize};

use crate::core::ast::{Block, CodeLine, ListItem, PlainText, Root};

use inline::{lone_emoji, parse_inline};
use segments::{Segment, split_segments};

/// Options handed to the parser on every call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParseOptions {
    /// Turn ASCII emoticons such as `:)` into emoji nodes.
    pub emoticons: bool,
    /// Domains whose schemeless links (`wiki.corp/page`) become link nodes.
    pub custom_domains: Vec<String>,
}

/// Failure reported by a parser. Normalization does not recover from it.
#[derive(Debug, thiserror::Error)]
#[error("message parser failed: {source}")]
pub struct ParseError {
    #[source]
    source: Box<dyn std::error::Error + Send + Sync + 'static>,
}

impl ParseError {
    pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

/// Turns message text into a parsed tree.
pub trait MessageParser {
    fn parse(&self, text: &str, options: &ParseOptions) -> Result<Root, ParseError>;
}

impl<F> MessageParser for F
where
    F: Fn(&str, &ParseOptions) -> Result<Root, ParseError>,
{
    fn parse(&self, text: &str, options: &ParseOptions) -> Result<Root, ParseError> {
        self(text, options)
    }
}

/// Deepest `>` quote nesting the built-in parser accepts.
pub const MAX_QUOTE_DEPTH: usize = 32;

/// Built-in parser for common chat markup. Fails only on quotes nested
/// deeper than [`MAX_QUOTE_DEPTH`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicParser;

impl MessageParser for BasicParser {
    fn parse(&self, text: &str, options: &ParseOptions) -> Result<Root, ParseError> {
        if let Some(big) = big_emoji(text, options) {
            return Ok(vec![big]);
        }
        let mut blocks = Vec::new();
        for segment in split_segments(text) {
            match segment {
                Segment::Text(prose) => parse_prose(prose, options, 0, &mut blocks)?,
                Segment::Code { lang, code } => blocks.push(code_block(lang, code)),
            }
        }
        Ok(blocks)
    }
}

/// One to three emoji separated by whitespace, and nothing else.
fn big_emoji(text: &str, options: &ParseOptions) -> Option<Block> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() || words.len() > 3 {
        return None;
    }
    let value = words
        .iter()
        .map(|w| lone_emoji(w, options))
        .collect::<Option<Vec<_>>>()?;
    Some(Block::BigEmoji { value })
}

fn code_block(lang: &str, code: &str) -> Block {
    Block::Code {
        language: (!lang.is_empty()).then(|| lang.to_string()),
        value: code
            .split('\n')
            .map(|line| CodeLine {
                value: PlainText::new(line),
            })
            .collect(),
    }
}

/// Parse prose line by line. Blank lines become `LINE_BREAK`; consecutive
/// quote and list lines are grouped into one block. `depth` counts the
/// quotes around `text`.
fn parse_prose(
    text: &str,
    options: &ParseOptions,
    depth: usize,
    out: &mut Vec<Block>,
) -> Result<(), ParseError> {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        let trimmed = line.trim_start();

        if trimmed.is_empty() {
            out.push(Block::LineBreak);
            i += 1;
        } else if let Some((level, content)) = heading(trimmed) {
            out.push(Block::Heading {
                level,
                value: parse_inline(content, options),
            });
            i += 1;
        } else if quote_line(trimmed).is_some() {
            if depth >= MAX_QUOTE_DEPTH {
                return Err(ParseError::new(format!(
                    "quotes nested deeper than {} levels",
                    MAX_QUOTE_DEPTH
                )));
            }
            let mut inner = Vec::new();
            while let Some(content) = lines.get(i).and_then(|l| quote_line(l.trim_start())) {
                inner.push(content);
                i += 1;
            }
            let mut value = Vec::new();
            parse_prose(&inner.join("\n"), options, depth + 1, &mut value)?;
            out.push(Block::Quote { value });
        } else if bullet(trimmed).is_some() {
            let mut items = Vec::new();
            while let Some(content) = lines.get(i).and_then(|l| bullet(l.trim_start())) {
                items.push(ListItem {
                    value: parse_inline(content, options),
                    number: None,
                });
                i += 1;
            }
            out.push(Block::UnorderedList { value: items });
        } else if numbered(trimmed).is_some() {
            let mut items = Vec::new();
            while let Some((number, content)) =
                lines.get(i).and_then(|l| numbered(l.trim_start()))
            {
                items.push(ListItem {
                    value: parse_inline(content, options),
                    number: Some(number),
                });
                i += 1;
            }
            out.push(Block::OrderedList { value: items });
        } else {
            out.push(Block::Paragraph {
                value: parse_inline(line, options),
            });
            i += 1;
        }
    }
    Ok(())
}

/// `# Title` through `#### Title`.
fn heading(s: &str) -> Option<(u8, &str)> {
    let level = s.chars().take_while(|&c| c == '#').count();
    if !(1..=4).contains(&level) {
        return None;
    }
    let content = s[level..].strip_prefix(' ')?.trim();
    if content.is_empty() {
        return None;
    }
    Some((level as u8, content))
}

fn quote_line(s: &str) -> Option<&str> {
    let rest = s.strip_prefix('>')?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

fn bullet(s: &str) -> Option<&str> {
    s.strip_prefix("- ").or_else(|| s.strip_prefix("* "))
}

/// Parse "N. " or "N) " at start. Returns (number, rest) or None.
fn numbered(s: &str) -> Option<(u32, &str)> {
    let digits = s.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let number = s[..digits].parse().ok()?;
    let rest = &s[digits..];
    rest.strip_prefix(". ")
        .or_else(|| rest.strip_prefix(") "))
        .map(|content| (number, content))
}

#[cfg(test)]
mod tests;
