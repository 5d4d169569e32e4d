//! Content unit model for memo documents.
//!
//! A memo is an ordered sequence of typed blocks. This module defines the
//! block value types and their per-kind invariants; ordering and structural
//! edits live in [`crate::doc`].

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;
use uuid::Uuid;

/// Transient client-session identity for a block. Assigned at creation,
/// regenerated on every decode, never persisted.
pub type BlockId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FileCategory {
    Image,
    Video,
    File,
}

/// Server-issued reference to an uploaded file resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRef {
    pub file_key: String,
    pub file_name: String,
    pub file_type: String,
    pub file_category: FileCategory,
    pub file_size: u64,
}

/// Where a media block's bytes live. Current rows carry a full [`FileRef`];
/// rows written before the file API migration only carried a numeric index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    Resolved(FileRef),
    Legacy { file_idx: u64 },
}

impl MediaSource {
    pub fn category(&self) -> FileCategory {
        match self {
            MediaSource::Resolved(file) => file.file_category,
            // Legacy rows have no category on record; the renderer treats
            // them as generic files.
            MediaSource::Legacy { .. } => FileCategory::File,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Text {
        content: String,
    },
    Checklist {
        content: String,
        checked: bool,
    },
    Media {
        source: MediaSource,
        display_width: Option<u32>,
        display_height: Option<u32>,
        video_duration_ms: Option<u64>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BlockError {
    #[error("display dimensions must be given together")]
    HalfDimensions,
    #[error("video duration on non-video media")]
    DurationOnNonVideo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub id: BlockId,
    pub order_index: usize,
    pub kind: BlockKind,
}

impl Block {
    /// `order_index` starts at 0; the owning document renumbers on insert.
    pub fn new(kind: BlockKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_index: 0,
            kind,
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::new(BlockKind::Text {
            content: content.into(),
        })
    }

    pub fn checklist(content: impl Into<String>, checked: bool) -> Self {
        Self::new(BlockKind::Checklist {
            content: content.into(),
            checked,
        })
    }

    pub fn media(
        source: MediaSource,
        display_width: Option<u32>,
        display_height: Option<u32>,
        video_duration_ms: Option<u64>,
    ) -> Result<Self, BlockError> {
        if display_width.is_some() != display_height.is_some() {
            return Err(BlockError::HalfDimensions);
        }
        if video_duration_ms.is_some() && source.category() != FileCategory::Video {
            return Err(BlockError::DurationOnNonVideo);
        }
        Ok(Self::new(BlockKind::Media {
            source,
            display_width,
            display_height,
            video_duration_ms,
        }))
    }

    /// Text and checklist blocks support caret operations; media blocks are
    /// atomic.
    pub fn is_textual(&self) -> bool {
        matches!(
            self.kind,
            BlockKind::Text { .. } | BlockKind::Checklist { .. }
        )
    }

    pub fn content(&self) -> Option<&str> {
        match &self.kind {
            BlockKind::Text { content } | BlockKind::Checklist { content, .. } => Some(content),
            BlockKind::Media { .. } => None,
        }
    }

    pub(crate) fn content_mut(&mut self) -> Option<&mut String> {
        match &mut self.kind {
            BlockKind::Text { content } | BlockKind::Checklist { content, .. } => Some(content),
            BlockKind::Media { .. } => None,
        }
    }

    pub fn checked(&self) -> Option<bool> {
        match self.kind {
            BlockKind::Checklist { checked, .. } => Some(checked),
            _ => None,
        }
    }

    /// Content length in grapheme clusters. Zero for media blocks.
    pub fn grapheme_len(&self) -> usize {
        self.content()
            .map(|content| content.graphemes(true).count())
            .unwrap_or(0)
    }
}

/// Convert a grapheme offset to a byte offset. None if the offset lies past
/// the end of the text.
pub(crate) fn grapheme_offset_to_byte(text: &str, grapheme_offset: usize) -> Option<usize> {
    if grapheme_offset == 0 {
        return Some(0);
    }

    let mut count = 0;
    for (byte_index, _) in text.grapheme_indices(true) {
        if count == grapheme_offset {
            return Some(byte_index);
        }
        count += 1;
    }
    if count == grapheme_offset {
        Some(text.len())
    } else {
        None
    }
}

pub(crate) fn clamp_grapheme_offset(text: &str, grapheme_offset: usize) -> usize {
    grapheme_offset.min(text.graphemes(true).count())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_ref() -> FileRef {
        FileRef {
            file_key: "2024/01/abc.png".into(),
            file_name: "abc.png".into(),
            file_type: "image/png".into(),
            file_category: FileCategory::Image,
            file_size: 1024,
        }
    }

    #[test]
    fn test_text_and_checklist_constructors() {
        let text = Block::text("hello");
        assert!(text.is_textual());
        assert_eq!(text.content(), Some("hello"));
        assert_eq!(text.checked(), None);

        let item = Block::checklist("buy milk", false);
        assert_eq!(item.checked(), Some(false));
        assert_eq!(item.content(), Some("buy milk"));
    }

    #[test]
    fn test_media_rejects_half_dimensions() {
        let result = Block::media(MediaSource::Resolved(image_ref()), Some(600), None, None);
        assert_eq!(result.unwrap_err(), BlockError::HalfDimensions);
    }

    #[test]
    fn test_media_rejects_duration_on_image() {
        let result = Block::media(MediaSource::Resolved(image_ref()), None, None, Some(1500));
        assert_eq!(result.unwrap_err(), BlockError::DurationOnNonVideo);
    }

    #[test]
    fn test_media_accepts_duration_on_video() {
        let mut file = image_ref();
        file.file_category = FileCategory::Video;
        file.file_type = "video/mp4".into();
        let block = Block::media(MediaSource::Resolved(file), None, None, Some(1500)).unwrap();
        assert!(!block.is_textual());
        assert_eq!(block.content(), None);
        assert_eq!(block.grapheme_len(), 0);
    }

    #[test]
    fn test_legacy_media_category_is_file() {
        let source = MediaSource::Legacy { file_idx: 42 };
        assert_eq!(source.category(), FileCategory::File);
    }

    #[test]
    fn test_fresh_ids_are_unique() {
        assert_ne!(Block::text("a").id, Block::text("a").id);
    }

    #[test]
    fn test_grapheme_offsets_with_multibyte_content() {
        let text = "a🇺🇸b";
        assert_eq!(grapheme_offset_to_byte(text, 0), Some(0));
        assert_eq!(grapheme_offset_to_byte(text, 1), Some(1));
        // The flag is a single grapheme spanning 8 bytes.
        assert_eq!(grapheme_offset_to_byte(text, 2), Some(9));
        assert_eq!(grapheme_offset_to_byte(text, 3), Some(text.len()));
        assert_eq!(grapheme_offset_to_byte(text, 4), None);
    }

    #[test]
    fn test_clamp_grapheme_offset() {
        assert_eq!(clamp_grapheme_offset("abc", 1), 1);
        assert_eq!(clamp_grapheme_offset("abc", 99), 3);
        assert_eq!(clamp_grapheme_offset("", 5), 0);
    }

    #[test]
    fn test_grapheme_len_counts_clusters() {
        assert_eq!(Block::text("a🇺🇸b").grapheme_len(), 3);
        assert_eq!(Block::text("").grapheme_len(), 0);
    }
}
