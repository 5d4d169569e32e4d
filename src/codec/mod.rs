//! Persisted JSON codec and preview extraction.
//!
//! The wire form is the flat block array the memo API stores: blocks sorted
//! by `orderIndex`, camelCase fields, media rows carrying a file reference.
//! Encoding is pure and total; decoding is tolerant, preferring re-sort and
//! dense renumbering over rejecting persisted data. Client-session ids are
//! never written and are regenerated on every decode.

use serde::{Deserialize, Serialize};

use crate::block::{Block, BlockKind, FileCategory, FileRef, MediaSource};
use crate::doc::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PersistedType {
    #[serde(rename = "TEXT")]
    Text,
    #[serde(rename = "CHECKLIST")]
    Checklist,
    #[serde(rename = "FILE")]
    File,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedBlock {
    pub order_index: i64,
    #[serde(rename = "type")]
    pub block_type: PersistedType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<FileRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_idx: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_duration_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedMemo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub archived: bool,
    #[serde(default, skip_serializing)]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing)]
    pub updated_at: Option<String>,
    pub blocks: Vec<PersistedBlock>,
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed memo payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Encode a document to its persisted form. Ids and timestamps are
/// client/server-session data and are never emitted.
pub fn encode(doc: &Document) -> PersistedMemo {
    let blocks = doc.blocks().iter().map(encode_block).collect();
    PersistedMemo {
        title: doc.title.clone(),
        pinned: doc.pinned,
        archived: doc.archived,
        created_at: None,
        updated_at: None,
        blocks,
    }
}

fn encode_block(block: &Block) -> PersistedBlock {
    let order_index = block.order_index as i64;
    match &block.kind {
        BlockKind::Text { content } => PersistedBlock {
            order_index,
            block_type: PersistedType::Text,
            content: Some(content.clone()),
            checked: None,
            file: None,
            file_idx: None,
            display_width: None,
            display_height: None,
            video_duration_ms: None,
        },
        BlockKind::Checklist { content, checked } => PersistedBlock {
            order_index,
            block_type: PersistedType::Checklist,
            content: Some(content.clone()),
            checked: Some(*checked),
            file: None,
            file_idx: None,
            display_width: None,
            display_height: None,
            video_duration_ms: None,
        },
        BlockKind::Media {
            source,
            display_width,
            display_height,
            video_duration_ms,
        } => {
            let (file, file_idx) = match source {
                MediaSource::Resolved(file) => (Some(file.clone()), None),
                MediaSource::Legacy { file_idx } => (None, Some(*file_idx)),
            };
            PersistedBlock {
                order_index,
                block_type: PersistedType::File,
                content: None,
                checked: None,
                file,
                file_idx,
                display_width: *display_width,
                display_height: *display_height,
                video_duration_ms: *video_duration_ms,
            }
        }
    }
}

/// Decode a persisted memo into a document, assigning fresh transient ids.
///
/// Recovery rather than rejection: blocks are re-sorted by `orderIndex`
/// (stable, so duplicates keep their stored relative order) and densely
/// renumbered, half display dimensions are dropped, a duration on non-video
/// media is dropped, and media rows with neither `file` nor `fileIdx` are
/// skipped. An empty block array yields the seeded single empty text block.
pub fn decode(memo: PersistedMemo) -> Document {
    let PersistedMemo {
        title,
        pinned,
        archived,
        created_at,
        updated_at,
        mut blocks,
    } = memo;

    let dense = blocks
        .iter()
        .enumerate()
        .all(|(index, block)| block.order_index == index as i64);
    if !dense {
        tracing::warn!("non-dense block indexes in persisted memo, re-sorting");
        blocks.sort_by_key(|block| block.order_index);
    }

    let decoded = blocks.into_iter().filter_map(decode_block).collect();

    let mut doc = Document::with_blocks(decoded);
    doc.title = title;
    doc.pinned = pinned;
    doc.archived = archived;
    doc.created_at = created_at;
    doc.updated_at = updated_at;
    doc
}

fn decode_block(block: PersistedBlock) -> Option<Block> {
    match block.block_type {
        PersistedType::Text => Some(Block::text(block.content.unwrap_or_default())),
        PersistedType::Checklist => Some(Block::checklist(
            block.content.unwrap_or_default(),
            block.checked.unwrap_or(false),
        )),
        PersistedType::File => {
            let source = match (block.file, block.file_idx) {
                (Some(file), _) => MediaSource::Resolved(file),
                (None, Some(file_idx)) => MediaSource::Legacy { file_idx },
                (None, None) => {
                    tracing::warn!(
                        order_index = block.order_index,
                        "dropping media block without a file reference"
                    );
                    return None;
                }
            };
            let (display_width, display_height) =
                match (block.display_width, block.display_height) {
                    (Some(width), Some(height)) => (Some(width), Some(height)),
                    (None, None) => (None, None),
                    _ => {
                        tracing::warn!(
                            order_index = block.order_index,
                            "dropping half display dimensions"
                        );
                        (None, None)
                    }
                };
            let video_duration_ms = block
                .video_duration_ms
                .filter(|_| source.category() == FileCategory::Video);
            Some(Block::new(BlockKind::Media {
                source,
                display_width,
                display_height,
                video_duration_ms,
            }))
        }
    }
}

/// Decode a raw JSON payload. Fails only when the payload itself is
/// unusable: invalid JSON or a missing/malformed `blocks` array.
pub fn decode_json(json: &str) -> Result<Document, DecodeError> {
    let memo: PersistedMemo = serde_json::from_str(json)?;
    Ok(decode(memo))
}

/// Marker standing in for media content in list previews.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaMarker {
    Image,
    Video,
    File,
}

impl std::fmt::Display for MediaMarker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MediaMarker::Image => "image",
            MediaMarker::Video => "video",
            MediaMarker::File => "file",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewEntry {
    Text { text: String },
    Checklist { text: String, checked: bool },
    Media { marker: MediaMarker },
}

impl PreviewEntry {
    /// Render the entry as a single display line, prefixing checklists with
    /// their check glyph.
    pub fn line(&self) -> String {
        match self {
            PreviewEntry::Text { text } => text.clone(),
            PreviewEntry::Checklist { text, checked } => {
                let glyph = if *checked { '☑' } else { '☐' };
                format!("{glyph} {text}")
            }
            PreviewEntry::Media { marker } => format!("[{marker}]"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub entries: Vec<PreviewEntry>,
    /// True when the document has more blocks than were extracted.
    pub has_more: bool,
}

/// Extract a lossy display summary of the first `max_units` blocks. Pure:
/// the document is untouched and repeated calls yield the same result.
pub fn extract_preview(doc: &Document, max_units: usize) -> Preview {
    let entries = doc
        .blocks()
        .iter()
        .take(max_units)
        .map(|block| match &block.kind {
            BlockKind::Text { content } => PreviewEntry::Text {
                text: first_line(content),
            },
            BlockKind::Checklist { content, checked } => PreviewEntry::Checklist {
                text: first_line(content),
                checked: *checked,
            },
            BlockKind::Media { source, .. } => PreviewEntry::Media {
                marker: match source.category() {
                    FileCategory::Image => MediaMarker::Image,
                    FileCategory::Video => MediaMarker::Video,
                    FileCategory::File => MediaMarker::File,
                },
            },
        })
        .collect();
    Preview {
        entries,
        has_more: doc.len() > max_units,
    }
}

fn first_line(content: &str) -> String {
    content.lines().next().unwrap_or("").to_string()
}
