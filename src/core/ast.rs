//! Parsed message tree: the `md` field carried by messages and attachments.
//!
//! Node JSON follows the upstream message parser shape, e.g.
//! `{"type": "PARAGRAPH", "value": [{"type": "PLAIN_TEXT", "value": "hi"}]}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A parsed message: ordered block nodes. Empty text parses to an empty root.
pub type Root = Vec<Block>;

/// Block-level node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Block {
    Paragraph {
        value: Vec<Inline>,
    },
    Heading {
        level: u8,
        value: Vec<Inline>,
    },
    Code {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
        value: Vec<CodeLine>,
    },
    Quote {
        value: Vec<Block>,
    },
    UnorderedList {
        value: Vec<ListItem>,
    },
    OrderedList {
        value: Vec<ListItem>,
    },
    /// One to three emoji and nothing else.
    BigEmoji {
        value: Vec<Inline>,
    },
    LineBreak,
    /// Any other block node (e.g. `KATEX`), kept as received.
    #[serde(untagged)]
    Unknown(Value),
}

/// Inline node inside paragraphs, headings, list items and links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Inline {
    PlainText {
        value: String,
    },
    Bold {
        value: Vec<Inline>,
    },
    Italic {
        value: Vec<Inline>,
    },
    Strike {
        value: Vec<Inline>,
    },
    InlineCode {
        value: PlainText,
    },
    Link {
        value: LinkValue,
    },
    MentionUser {
        value: PlainText,
    },
    MentionChannel {
        value: PlainText,
    },
    Emoji {
        value: PlainText,
        #[serde(rename = "shortCode")]
        short_code: String,
    },
    /// Any other inline node (unicode `EMOJI`, `SPOILER`, `TIMESTAMP`, ...),
    /// kept as received.
    #[serde(untagged)]
    Unknown(Value),
}

impl Inline {
    pub fn plain(text: impl Into<String>) -> Self {
        Inline::PlainText { value: text.into() }
    }
}

/// Bare text leaf used where the tree requires a `PLAIN_TEXT` node specifically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "PLAIN_TEXT")]
pub struct PlainText {
    pub value: String,
}

impl PlainText {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkValue {
    pub src: PlainText,
    pub label: Vec<Inline>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "CODE_LINE")]
pub struct CodeLine {
    pub value: PlainText,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "LIST_ITEM")]
pub struct ListItem {
    pub value: Vec<Inline>,
    /// Item number for ordered lists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u32>,
}

/// Input to `text_to_ast`: raw text to parse, or a tree that is already parsed.
///
/// The caller decides which one it holds, so a parsed value is never
/// mistaken for text (or the reverse).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextOrAst<'a> {
    Raw(&'a str),
    Parsed(Root),
}

impl<'a> From<&'a str> for TextOrAst<'a> {
    fn from(text: &'a str) -> Self {
        TextOrAst::Raw(text)
    }
}

impl From<Root> for TextOrAst<'_> {
    fn from(root: Root) -> Self {
        TextOrAst::Parsed(root)
    }
}

impl<'a> TextOrAst<'a> {
    /// Reuse `existing` when present, otherwise parse `text`.
    pub fn reuse_or(existing: Option<&Root>, text: &'a str) -> Self {
        match existing {
            Some(root) => TextOrAst::Parsed(root.clone()),
            None => TextOrAst::Raw(text),
        }
    }
}
