//! Fields that older clients stored as `null` instead of leaving them out.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Attachment, MessageAuthor, Nullable};

/// The nine message fields that may hold a stale `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyFields {
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub edited_by: Nullable<MessageAuthor>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub edited_at: Nullable<Value>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub emoji: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub avatar: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub alias: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub custom_fields: Nullable<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub groupable: Nullable<bool>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub attachments: Nullable<Vec<Attachment>>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub reactions: Nullable<Map<String, Value>>,
}

impl LegacyFields {
    /// Drop every `null`, keeping set values and leaving absent fields absent.
    pub fn without_nulls(self) -> Self {
        Self {
            edited_by: self.edited_by.without_null(),
            edited_at: self.edited_at.without_null(),
            emoji: self.emoji.without_null(),
            avatar: self.avatar.without_null(),
            alias: self.alias.without_null(),
            custom_fields: self.custom_fields.without_null(),
            groupable: self.groupable.without_null(),
            attachments: self.attachments.without_null(),
            reactions: self.reactions.without_null(),
        }
    }

    /// True when no field is `null`.
    pub fn is_clean(&self) -> bool {
        !(self.edited_by.is_null()
            || self.edited_at.is_null()
            || self.emoji.is_null()
            || self.avatar.is_null()
            || self.alias.is_null()
            || self.custom_fields.is_null()
            || self.groupable.is_null()
            || self.attachments.is_null()
            || self.reactions.is_null())
    }
}
