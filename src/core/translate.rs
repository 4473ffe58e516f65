//! Auto-translate display preferences: which language to show and whether a
//! given message should be shown translated.

use serde::{Deserialize, Serialize};

use crate::core::message::Message;

type ShowPredicate = Box<dyn Fn(&Message) -> bool + Send + Sync>;

/// Caller-supplied translation preferences for one normalization pass.
pub struct AutoTranslateOptions {
    language: Option<String>,
    show: ShowPredicate,
}

impl std::fmt::Debug for AutoTranslateOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoTranslateOptions")
            .field("language", &self.language)
            .finish_non_exhaustive()
    }
}

impl Default for AutoTranslateOptions {
    fn default() -> Self {
        Self::disabled()
    }
}

impl AutoTranslateOptions {
    /// Never show translations.
    pub fn disabled() -> Self {
        Self {
            language: None,
            show: Box::new(|_| false),
        }
    }

    pub fn new<F>(language: Option<String>, show: F) -> Self
    where
        F: Fn(&Message) -> bool + Send + Sync + 'static,
    {
        Self {
            language: language.filter(|l| !l.is_empty()),
            show: Box::new(show),
        }
    }

    /// Show translations in `language` for every message.
    pub fn always(language: impl Into<String>) -> Self {
        Self::new(Some(language.into()), |_| true)
    }

    /// Options following the room subscription and server settings.
    pub fn from_settings(settings: &AutoTranslateSettings) -> Self {
        let language = settings.effective_language().map(str::to_string);
        let policy = settings.clone();
        Self::new(language, move |message| policy.shows_translation(message))
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn show_auto_translate(&self, message: &Message) -> bool {
        (self.show)(message)
    }
}

/// Server and subscription state that decides whether translations show.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AutoTranslateSettings {
    /// Server-wide switch (`AutoTranslate_Enabled`).
    pub enabled: bool,
    /// The viewer turned auto-translate on for this room.
    pub subscription_auto_translate: bool,
    /// Target language picked on the subscription.
    pub language: Option<String>,
    /// The viewing user; their own messages are never translated.
    pub viewer_id: Option<String>,
}

impl AutoTranslateSettings {
    /// Language to translate into, only when auto-translate is fully on.
    pub fn effective_language(&self) -> Option<&str> {
        let language = self.language.as_deref().filter(|l| !l.is_empty())?;
        (self.enabled && self.subscription_auto_translate).then_some(language)
    }

    /// A message shows translated when auto-translate is on, it was written by
    /// someone else, a translation exists for the language (on the message or
    /// one of its attachments), and the reader has not flipped it back.
    pub fn shows_translation(&self, message: &Message) -> bool {
        let Some(language) = self.effective_language() else {
            return false;
        };
        let own = match (&self.viewer_id, message.u.as_option()) {
            (Some(viewer), Some(author)) => viewer == &author.id,
            _ => false,
        };
        if own || message.auto_translate_show_inverse.as_option() == Some(&true) {
            return false;
        }
        message.translation(language).is_some()
            || message
                .attachments()
                .iter()
                .any(|a| a.translation(language).is_some())
    }
}
