//! Playable item contract.
//!
//! Items are created and owned by the host's playlist source; the core treats
//! them as read-only and moves them around as `Arc<dyn PlaylistItem>` handles.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of media an item carries.
///
/// This enum is intentionally extensible; use [`MediaKind::Other`] for kinds
/// not explicitly listed here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Video,
    /// Host-specific media kind.
    Other(String),
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Audio => write!(f, "audio"),
            MediaKind::Video => write!(f, "video"),
            MediaKind::Other(kind) => write!(f, "{kind}"),
        }
    }
}

/// A single playable entry in a playlist.
///
/// Identity (`id`) must be unique and stable for the lifetime of the item so
/// the core can locate it again after the backing collection changes. All
/// other accessors are display metadata or source locators consumed when a
/// backend is asked to play the item.
pub trait PlaylistItem: Send + Sync {
    /// Unique, stable identity for this item.
    fn id(&self) -> u64;

    /// The kind of media this item represents.
    fn media_kind(&self) -> MediaKind;

    /// Whether the media is available without network access.
    fn is_locally_available(&self) -> bool;

    /// Locator for remote retrieval, when one exists.
    fn media_url(&self) -> Option<String>;

    /// Locator for the locally stored copy, when one exists.
    fn local_media_uri(&self) -> Option<String>;

    fn title(&self) -> Option<String>;

    fn album(&self) -> Option<String>;

    fn artist(&self) -> Option<String>;

    /// Locator for full-size artwork.
    fn artwork_url(&self) -> Option<String>;

    /// Locator for a small thumbnail rendition of the artwork.
    fn thumbnail_url(&self) -> Option<String>;
}

impl fmt::Debug for dyn PlaylistItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaylistItem")
            .field("id", &self.id())
            .field("media_kind", &self.media_kind())
            .field("title", &self.title())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_kind_display() {
        assert_eq!(MediaKind::Audio.to_string(), "audio");
        assert_eq!(MediaKind::Video.to_string(), "video");
        assert_eq!(MediaKind::Other("podcast".into()).to_string(), "podcast");
    }

    #[test]
    fn media_kind_equality() {
        assert_eq!(MediaKind::Audio, MediaKind::Audio);
        assert_ne!(MediaKind::Audio, MediaKind::Video);
        assert_ne!(
            MediaKind::Other("podcast".into()),
            MediaKind::Other("audiobook".into())
        );
    }
}
