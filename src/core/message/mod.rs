//! Chat message and attachment records as they arrive from the server.
//!
//! Only the fields the normalizer reads are typed; everything else is kept
//! verbatim in `extra` so a normalized message round-trips unknown data.

mod legacy;
mod nullable;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::ast::Root;

pub use legacy::LegacyFields;
pub use nullable::Nullable;

/// Language code -> translated text.
pub type Translations = BTreeMap<String, String>;

/// Message type marking an end-to-end encrypted message.
pub const TYPE_E2E: &str = "e2e";
/// Message types used by off-the-record conversations.
pub const TYPES_OTR: [&str; 2] = ["otr", "otr-ack"];

/// Author or editor reference (`u`, `editedBy`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageAuthor {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "_id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub msg: String,
    /// Message type (`t`), e.g. `e2e` or `otr`.
    #[serde(rename = "t", default, skip_serializing_if = "Nullable::is_absent")]
    pub kind: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub u: Nullable<MessageAuthor>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub translations: Nullable<Translations>,
    #[serde(
        rename = "autoTranslateShowInverse",
        default,
        skip_serializing_if = "Nullable::is_absent"
    )]
    pub auto_translate_show_inverse: Nullable<bool>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub md: Nullable<Root>,
    #[serde(flatten)]
    pub legacy: LegacyFields,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Message {
    #[cfg(test)]
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            ..Default::default()
        }
    }

    pub fn is_e2ee(&self) -> bool {
        self.kind.as_deref() == Some(TYPE_E2E)
    }

    pub fn is_otr(&self) -> bool {
        self.kind.as_deref().is_some_and(|t| TYPES_OTR.contains(&t))
    }

    /// Non-empty translation for `language`, if any.
    pub fn translation(&self, language: &str) -> Option<&str> {
        translation_in(self.translations.as_option(), language)
    }

    pub fn attachments(&self) -> &[Attachment] {
        self.legacy.attachments.as_deref().unwrap_or_default()
    }
}

/// Attachment record. Its capabilities (file, quote, translatable) are read
/// from the fields it carries rather than from a declared variant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(rename = "type", default, skip_serializing_if = "Nullable::is_absent")]
    pub kind: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub text: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub description: Nullable<String>,
    /// Link to the quoted message; `null` does not make a quote.
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub message_link: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub attachments: Nullable<Vec<Attachment>>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub translations: Nullable<Translations>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub md: Nullable<Root>,
    #[serde(
        rename = "descriptionMd",
        default,
        skip_serializing_if = "Nullable::is_absent"
    )]
    pub description_md: Nullable<Root>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Attachment {
    pub fn has_text(&self) -> bool {
        self.text.as_deref().is_some_and(|t| !t.is_empty())
    }

    pub fn has_description(&self) -> bool {
        self.description.as_deref().is_some_and(|d| !d.is_empty())
    }

    pub fn is_file(&self) -> bool {
        self.kind.as_deref() == Some("file")
    }

    pub fn is_quote(&self) -> bool {
        self.message_link.as_option().is_some()
    }

    pub fn is_translated(&self) -> bool {
        !self.translations.is_absent()
    }

    pub fn translation(&self, language: &str) -> Option<&str> {
        translation_in(self.translations.as_option(), language)
    }

    /// Quote text shown to the user: translation, then text, then nothing.
    pub fn quote_text(&self, language: Option<&str>) -> &str {
        language
            .and_then(|l| self.translation(l))
            .or_else(|| self.text.as_deref().filter(|t| !t.is_empty()))
            .unwrap_or("")
    }

    /// Attachment text shown to the user: translation, text, description.
    pub fn display_text(&self, language: Option<&str>) -> &str {
        match self.quote_text(language) {
            "" => self.description.as_deref().unwrap_or(""),
            text => text,
        }
    }
}

fn translation_in<'a>(translations: Option<&'a Translations>, language: &str) -> Option<&'a str> {
    translations?
        .get(language)
        .map(String::as_str)
        .filter(|t| !t.is_empty())
}
