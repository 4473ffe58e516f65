//! Message normalization before render.
//!
//! - Drops stale `null` values from the legacy nullable fields.
//! - Guarantees a parsed `md` on the message and on every attachment with
//!   content, parsing lazily and reusing trees that are already there.
//! - Picks the translated text over the original when translation shows.
//!
//! The input is borrowed and never changed; every call returns a fresh copy,
//! and attachment lists are rebuilt rather than edited in place.

use std::ops::Deref;

use serde::Serialize;

use crate::core::ast::{Block, Root, TextOrAst};
use crate::core::message::{Attachment, Message, Nullable};
use crate::core::parser::{MessageParser, ParseError, ParseOptions};
use crate::core::translate::AutoTranslateOptions;

/// Translation state handed down to attachments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttachmentTranslation<'a> {
    /// Language to look up in attachment translations.
    pub language: Option<&'a str>,
    /// The owning message shows translated; forces a re-parse.
    pub translated: bool,
}

/// A message whose `md` is set and whose legacy fields hold no `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct NormalizedMessage(Message);

impl NormalizedMessage {
    pub fn md(&self) -> &[Block] {
        self.0.md.as_deref().unwrap_or_default()
    }
}

impl Deref for NormalizedMessage {
    type Target = Message;

    fn deref(&self) -> &Message {
        &self.0
    }
}

/// Normalizes messages with one parser and one set of parse options.
pub struct Normalizer<'a> {
    parser: &'a dyn MessageParser,
    options: &'a ParseOptions,
}

impl<'a> Normalizer<'a> {
    pub fn new(parser: &'a dyn MessageParser, options: &'a ParseOptions) -> Self {
        Self { parser, options }
    }

    /// Normalize one message. Parser failures propagate unchanged.
    ///
    /// Encrypted and off-the-record messages are always re-parsed, as are
    /// messages shown translated; otherwise an existing `md` is kept.
    pub fn normalize(
        &self,
        message: &Message,
        translate: &AutoTranslateOptions,
    ) -> Result<NormalizedMessage, ParseError> {
        let mut legacy = message.legacy.clone().without_nulls();
        let language = translate.language();
        let translated = translate.show_auto_translate(message);

        let text = language
            .filter(|_| translated)
            .and_then(|l| message.translation(l))
            .unwrap_or(message.msg.as_str());

        let md = if message.is_e2ee() || message.is_otr() || translated {
            self.text_to_ast(TextOrAst::Raw(text))?
        } else {
            self.text_to_ast(TextOrAst::reuse_or(message.md.as_option(), text))?
        };

        if let Nullable::Value(attachments) = &legacy.attachments {
            let rebuilt = self.normalize_attachments(
                attachments,
                AttachmentTranslation {
                    language,
                    translated,
                },
            )?;
            legacy.attachments = Nullable::Value(rebuilt);
        }

        Ok(NormalizedMessage(Message {
            md: Nullable::Value(md),
            legacy,
            ..message.clone()
        }))
    }

    /// Normalize a list of attachments into a new list.
    ///
    /// Attachments with neither text nor description are returned as they are,
    /// nested quotes included.
    pub fn normalize_attachments(
        &self,
        attachments: &[Attachment],
        translation: AttachmentTranslation<'_>,
    ) -> Result<Vec<Attachment>, ParseError> {
        attachments
            .iter()
            .map(|attachment| self.normalize_attachment(attachment, translation))
            .collect()
    }

    fn normalize_attachment(
        &self,
        attachment: &Attachment,
        translation: AttachmentTranslation<'_>,
    ) -> Result<Attachment, ParseError> {
        if !attachment.has_text() && !attachment.has_description() {
            return Ok(attachment.clone());
        }

        let mut out = attachment.clone();
        if attachment.is_quote()
            && let Nullable::Value(nested) = &attachment.attachments
        {
            out.attachments = Nullable::Value(self.normalize_quotes(nested, translation)?);
        }

        if attachment.is_file()
            && let Some(description) = attachment.description.as_deref()
            && !description.is_empty()
        {
            out.description_md = Nullable::Value(self.text_to_ast(TextOrAst::reuse_or(
                attachment.description_md.as_option(),
                description,
            ))?);
        }

        let text = attachment.display_text(translation.language);
        out.md = Nullable::Value(self.attachment_md(attachment, text, translation.translated)?);
        Ok(out)
    }

    /// Normalize a quoted message and, first, the quotes nested inside it.
    pub fn normalize_quote_attachment(
        &self,
        quote: &Attachment,
        translation: AttachmentTranslation<'_>,
    ) -> Result<Attachment, ParseError> {
        let mut out = quote.clone();
        if let Some(nested) = quote.attachments.as_deref().filter(|n| !n.is_empty()) {
            out.attachments = Nullable::Value(self.normalize_quotes(nested, translation)?);
        }
        let text = quote.quote_text(translation.language);
        out.md = Nullable::Value(self.attachment_md(quote, text, translation.translated)?);
        Ok(out)
    }

    fn normalize_quotes(
        &self,
        quotes: &[Attachment],
        translation: AttachmentTranslation<'_>,
    ) -> Result<Vec<Attachment>, ParseError> {
        quotes
            .iter()
            .map(|quote| self.normalize_quote_attachment(quote, translation))
            .collect()
    }

    fn attachment_md(
        &self,
        attachment: &Attachment,
        text: &str,
        translated: bool,
    ) -> Result<Root, ParseError> {
        if translated {
            self.text_to_ast(TextOrAst::Raw(text))
        } else {
            self.text_to_ast(TextOrAst::reuse_or(attachment.md.as_option(), text))
        }
    }

    /// Parse text into a tree. Empty text gives an empty tree, a parsed tree
    /// is returned as is, and one leading `LINE_BREAK` from the parser is
    /// dropped.
    pub fn text_to_ast(&self, input: TextOrAst<'_>) -> Result<Root, ParseError> {
        let text = match input {
            TextOrAst::Parsed(root) => return Ok(root),
            TextOrAst::Raw("") => return Ok(Vec::new()),
            TextOrAst::Raw(text) => text,
        };
        let mut root = self.parser.parse(text, self.options)?;
        if matches!(root.first(), Some(Block::LineBreak)) {
            root.remove(0);
        }
        Ok(root)
    }
}
