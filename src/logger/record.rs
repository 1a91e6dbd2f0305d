//! Notification records.
//!
//! A [`Notification`] is the structured payload delivered to the logging
//! channel. It is built per event and discarded after delivery.

use chrono::{DateTime, Utc};

/// Maximum characters kept from a field value. Discord caps field values at
/// 1024, so this leaves room for the marker.
pub const FIELD_VALUE_LIMIT: usize = 1000;

/// Embed descriptions may hold 4096 characters.
pub const DESCRIPTION_LIMIT: usize = 4000;

/// Appended to any value cut by [`truncate`].
pub const TRUNCATION_MARKER: &str = "… (truncated)";

/// Substituted for values that would otherwise be blank.
pub const EMPTY_PLACEHOLDER: &str = "*empty*";

/// Severity/color tag of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tone {
    /// Something was created or someone arrived.
    Affirmative,
    /// Something was deleted or removed.
    Alerting,
    /// An edit or update.
    Neutral,
    /// Bans and departures.
    Severe,
    /// Audit entries and everything else.
    Informational,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub title: String,
    pub tone: Tone,
    pub fields: Vec<Field>,
    pub description: Option<String>,
    pub footer: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl Notification {
    pub fn new(title: impl Into<String>, tone: Tone) -> Self {
        Self {
            title: title.into(),
            tone,
            fields: Vec::new(),
            description: None,
            footer: None,
            timestamp: None,
        }
    }

    /// Append a field. Blank values get a placeholder, long ones are truncated.
    pub fn field(mut self, label: impl Into<String>, value: impl AsRef<str>) -> Self {
        let value = value.as_ref();
        let value = if value.trim().is_empty() {
            EMPTY_PLACEHOLDER.to_string()
        } else {
            truncate(value, FIELD_VALUE_LIMIT)
        };
        self.fields.push(Field {
            label: label.into(),
            value,
        });
        self
    }

    pub fn description(mut self, text: impl AsRef<str>) -> Self {
        self.description = Some(truncate(text.as_ref(), DESCRIPTION_LIMIT));
        self
    }

    pub fn footer(mut self, text: impl Into<String>) -> Self {
        self.footer = Some(text.into());
        self
    }

    pub fn timestamp(mut self, at: Option<DateTime<Utc>>) -> Self {
        self.timestamp = at;
        self
    }

    /// Value of the first field with the given label.
    #[cfg(test)]
    pub fn value_of(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.label == label)
            .map(|f| f.value.as_str())
    }
}

/// Cut `text` to `limit` characters, appending [`TRUNCATION_MARKER`] if
/// anything was removed. Counts chars, never splits a code point.
pub fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_index, _)) => {
            let mut cut = text[..byte_index].to_string();
            cut.push_str(TRUNCATION_MARKER);
            cut
        }
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_long_text() {
        let text = "a".repeat(2000);
        let cut = truncate(&text, 1024);

        assert!(cut.ends_with(TRUNCATION_MARKER));
        let kept = cut.strip_suffix(TRUNCATION_MARKER).unwrap();
        assert_eq!(kept.chars().count(), 1024);
        assert_eq!(kept, &text[..1024]);
    }

    #[test]
    fn test_truncate_exact_limit_is_untouched() {
        let text = "b".repeat(1024);
        assert_eq!(truncate(&text, 1024), text);
    }

    #[test]
    fn test_truncate_multibyte() {
        let cut = truncate("héllo wörld", 4);
        assert_eq!(cut, format!("héll{}", TRUNCATION_MARKER));
    }

    #[test]
    fn test_field_placeholder_and_limit() {
        let n = Notification::new("Test", Tone::Neutral)
            .field("Blank", "   ")
            .field("Long", "x".repeat(FIELD_VALUE_LIMIT + 1));

        assert_eq!(n.value_of("Blank"), Some(EMPTY_PLACEHOLDER));
        let long = n.value_of("Long").unwrap();
        assert_eq!(
            long.chars().count(),
            FIELD_VALUE_LIMIT + TRUNCATION_MARKER.chars().count()
        );
    }

    #[test]
    fn test_fields_keep_order() {
        let n = Notification::new("Test", Tone::Neutral)
            .field("First", "1")
            .field("Second", "2");
        let labels: Vec<_> = n.fields.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(labels, vec!["First", "Second"]);
    }

    #[test]
    fn test_description_keeps_more_than_a_field() {
        let text = "d".repeat(3000);
        let n = Notification::new("Report", Tone::Neutral)
            .description(&text)
            .field("Body", &text);

        assert_eq!(n.description.as_deref(), Some(text.as_str()));
        assert!(n.fields[0].value.ends_with(TRUNCATION_MARKER));

        let long = Notification::new("Report", Tone::Neutral).description("d".repeat(5000));
        let kept = long.description.unwrap();
        assert_eq!(
            kept.strip_suffix(TRUNCATION_MARKER).map(|k| k.chars().count()),
            Some(DESCRIPTION_LIMIT)
        );
    }
}
