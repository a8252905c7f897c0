//! Text and multimodal message content.

use serde::{Deserialize, Serialize};

/// Message content: a plain string or a list of typed parts.
///
/// Serializes to the shape chat-completion vendors accept directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Plain text content.
    Text(String),
    /// Multi-part content (text segments and image references).
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    /// Create text content.
    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Check if this is text content.
    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    /// Get as text if this is plain text content.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Parts(_) => None,
        }
    }

    /// The text a text-only model sees: the string itself, or the first text part.
    #[must_use]
    pub fn text_content(&self) -> &str {
        match self {
            Self::Text(s) => s,
            Self::Parts(parts) => parts
                .iter()
                .find_map(|p| match p {
                    ContentPart::Text { text } => Some(text.as_str()),
                    ContentPart::ImageUrl { .. } => None,
                })
                .unwrap_or(""),
        }
    }

    /// Whether any part references an image.
    #[must_use]
    pub fn has_images(&self) -> bool {
        match self {
            Self::Text(_) => false,
            Self::Parts(parts) => parts
                .iter()
                .any(|p| matches!(p, ContentPart::ImageUrl { .. })),
        }
    }

    /// Whether there is nothing to show.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::Parts(parts) => parts.is_empty(),
        }
    }
}

impl Default for MessageContent {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl From<String> for MessageContent {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for MessageContent {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<Vec<ContentPart>> for MessageContent {
    fn from(parts: Vec<ContentPart>) -> Self {
        Self::Parts(parts)
    }
}

/// One part of a multimodal message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Text segment.
    Text {
        /// The text.
        text: String,
    },
    /// Image reference.
    ImageUrl {
        /// Image location.
        image_url: ImageUrl,
    },
}

impl ContentPart {
    /// Create a text part.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Create an image part from a URL (http(s) or `data:` URL).
    #[must_use]
    pub fn image_url(url: impl Into<String>) -> Self {
        Self::ImageUrl {
            image_url: ImageUrl::new(url),
        }
    }
}

/// Image location, optionally with a detail hint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageUrl {
    /// The image URL.
    pub url: String,
    /// Detail level (`low`, `high`, `auto`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ImageUrl {
    /// Create an image URL without a detail hint.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            detail: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_text_serializes_as_string() {
        let content = MessageContent::text("hi");
        assert_eq!(serde_json::to_value(&content).unwrap(), serde_json::json!("hi"));
    }

    #[test]
    fn test_parts_serialize_in_vendor_shape() {
        let content = MessageContent::Parts(vec![
            ContentPart::text("look"),
            ContentPart::image_url("https://example.com/a.png"),
        ]);
        assert_eq!(
            serde_json::to_value(&content).unwrap(),
            serde_json::json!([
                {"type": "text", "text": "look"},
                {"type": "image_url", "image_url": {"url": "https://example.com/a.png"}}
            ])
        );
    }

    #[test]
    fn test_text_content_picks_first_text_part() {
        let content = MessageContent::Parts(vec![
            ContentPart::image_url("https://example.com/a.png"),
            ContentPart::text("first"),
            ContentPart::text("second"),
        ]);
        assert_eq!(content.text_content(), "first");
        assert!(content.has_images());
    }

    #[test]
    fn test_images_only_has_empty_text() {
        let content = MessageContent::Parts(vec![ContentPart::image_url("x")]);
        assert_eq!(content.text_content(), "");
        assert!(!content.is_empty());
    }
}
