//! Edit operation engine.
//!
//! Keyboard-driven structural edits are dispatched from
//! `(key, modifiers, block kind, caret)` into one container operation plus a
//! focus request. Character-level editing stays native in the host UI: the
//! engine answers [`KeyOutcome::PassThrough`] for events it does not own.
//!
//! External effects go through injected collaborators: [`MemoStore`] for
//! persistence, [`Uploader`] and [`MediaProber`] for file attachment, and
//! [`NotificationSink`] for non-fatal reports (no-op by default).

use crate::block::{Block, BlockId, BlockKind, FileCategory, FileRef, MediaSource};
use crate::codec::{self, PersistedMemo};
use crate::doc::{Direction, Document, EditError};
use crate::focus::{CaretPosition, FocusCoordinator, FocusTarget, ResolvedFocus};

/// Probed image dimensions wider than this are scaled down preserving the
/// aspect ratio.
pub const MAX_DISPLAY_WIDTH: u32 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    ArrowUp,
    ArrowDown,
    Delete,
    Backspace,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::default(),
        }
    }

    pub fn with_alt(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers {
                alt: true,
                ..Modifiers::default()
            },
        }
    }

    pub fn with_ctrl(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers {
                ctrl: true,
                ..Modifiers::default()
            },
        }
    }

    fn move_modifier(&self) -> bool {
        self.modifiers.alt || self.modifiers.meta
    }

    fn save_modifier(&self) -> bool {
        self.modifiers.ctrl || self.modifiers.meta
    }
}

/// Whether the engine consumed a key event. `PassThrough` hands the event
/// back to the host for native character-level editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Handled,
    PassThrough,
}

/// A file submitted for upload. The engine never touches file bytes; the
/// upload collaborator owns transport and storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub mime: String,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("no upload collaborator configured")]
    Unavailable,
    #[error("upload failed: {0}")]
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("save failed: {0}")]
    Failed(String),
}

pub trait Uploader {
    /// Upload files and return one reference per stored file, in submission
    /// order. Returning fewer references than files means the tail entries
    /// were not matched; the engine inserts only the returned ones.
    fn upload(&mut self, files: &[UploadFile]) -> Result<Vec<FileRef>, UploadError>;
}

/// Result of probing one uploaded file for display metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProbeInfo {
    pub dimensions: Option<(u32, u32)>,
    pub video_duration_ms: Option<u64>,
}

pub trait MediaProber {
    fn probe(&mut self, file: &UploadFile, reference: &FileRef) -> ProbeInfo;
}

pub trait MemoStore {
    fn save(&mut self, memo: &PersistedMemo) -> Result<(), StoreError>;
}

/// Non-fatal events the host may surface to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    FilesDropped { submitted: usize, uploaded: usize },
}

pub trait NotificationSink {
    fn notify(&mut self, notice: Notice);
}

/// Default sink that ignores every notice.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl NotificationSink for NoopSink {
    fn notify(&mut self, _notice: Notice) {}
}

pub struct EditorSession {
    doc: Document,
    focus: FocusCoordinator,
    focused: Option<BlockId>,
    store: Option<Box<dyn MemoStore>>,
    uploader: Option<Box<dyn Uploader>>,
    prober: Option<Box<dyn MediaProber>>,
    notifier: Box<dyn NotificationSink>,
}

impl EditorSession {
    pub fn new(doc: Document) -> Self {
        Self {
            doc,
            focus: FocusCoordinator::new(),
            focused: None,
            store: None,
            uploader: None,
            prober: None,
            notifier: Box::new(NoopSink),
        }
    }

    pub fn with_store(mut self, store: impl MemoStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    pub fn with_uploader(mut self, uploader: impl Uploader + 'static) -> Self {
        self.uploader = Some(Box::new(uploader));
        self
    }

    pub fn with_prober(mut self, prober: impl MediaProber + 'static) -> Self {
        self.prober = Some(Box::new(prober));
        self
    }

    pub fn with_notifier(mut self, notifier: impl NotificationSink + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// The block the host last reported as holding input focus.
    pub fn focused(&self) -> Option<BlockId> {
        self.focused
    }

    pub fn set_focused(&mut self, id: Option<BlockId>) {
        self.focused = id;
    }

    pub fn pending_focus(&self) -> Option<FocusTarget> {
        self.focus.pending()
    }

    /// Consume the pending focus request, clamped against current content.
    /// The host calls this after it has rendered the mutated structure.
    pub fn resolve_focus(&mut self) -> Option<ResolvedFocus> {
        let resolved = self.focus.resolve(&self.doc);
        if let Some(resolved) = resolved {
            self.focused = Some(resolved.block_id);
        }
        resolved
    }

    pub fn set_title(&mut self, title: Option<String>) {
        self.doc.title = title.filter(|title| !title.is_empty());
    }

    /// Native typing lands here: replace one block's content wholesale.
    pub fn update_content(&mut self, id: BlockId, content: String) -> Result<(), EditError> {
        self.doc.update(id, |block| {
            if let Some(current) = block.content_mut() {
                *current = content;
            }
        })
    }

    pub fn set_checked(&mut self, id: BlockId, checked: bool) -> Result<(), EditError> {
        self.doc.update(id, |block| {
            if let BlockKind::Checklist { checked: current, .. } = &mut block.kind {
                *current = checked;
            }
        })
    }

    /// Convert the block between text and checklist in place, preserving
    /// content and caret. `checked` starts false going to checklist and is
    /// dropped going back. Media blocks are untouched.
    pub fn toggle_kind(&mut self, id: BlockId, caret: usize) -> Result<(), EditError> {
        self.doc.update(id, |block| match &mut block.kind {
            BlockKind::Text { content } => {
                let content = std::mem::take(content);
                block.kind = BlockKind::Checklist {
                    content,
                    checked: false,
                };
            }
            BlockKind::Checklist { content, .. } => {
                let content = std::mem::take(content);
                block.kind = BlockKind::Text { content };
            }
            BlockKind::Media { .. } => {}
        })?;
        self.focus
            .request(FocusTarget::new(id, CaretPosition::Offset(caret)));
        Ok(())
    }

    /// Drag-and-drop reorder. Focus is left where it is.
    pub fn reorder(&mut self, id: BlockId, target: BlockId) -> Result<bool, EditError> {
        self.doc.reorder(id, target)
    }

    pub fn preview(&self, max_units: usize) -> codec::Preview {
        codec::extract_preview(&self.doc, max_units)
    }

    /// Encode the document as it stands and hand it to the store. The
    /// document itself is never mutated by saving, so a failed save can
    /// simply be retried.
    pub fn save(&mut self) -> Result<PersistedMemo, StoreError> {
        let payload = codec::encode(&self.doc);
        if let Some(store) = self.store.as_mut() {
            store.save(&payload)?;
        }
        Ok(payload)
    }

    /// Dispatch one key event against the block that currently holds the
    /// caret. `caret` is a grapheme offset as reported by the host.
    pub fn handle_key(
        &mut self,
        id: BlockId,
        caret: usize,
        event: KeyEvent,
    ) -> Result<KeyOutcome, EditError> {
        let index = self.doc.index_of(id).ok_or(EditError::BlockNotFound)?;
        let block = &self.doc.blocks()[index];
        let textual = block.is_textual();
        let is_checklist = matches!(block.kind, BlockKind::Checklist { .. });
        let is_text = matches!(block.kind, BlockKind::Text { .. });
        let len = block.grapheme_len();
        let caret = caret.min(len);

        match event.key {
            Key::Char('c') | Key::Char('C') if event.move_modifier() && textual => {
                self.toggle_kind(id, caret)?;
                Ok(KeyOutcome::Handled)
            }
            Key::Enter if event.save_modifier() => {
                if let Err(err) = self.save() {
                    tracing::warn!(%err, "save shortcut failed");
                }
                Ok(KeyOutcome::Handled)
            }
            Key::Enter if !event.modifiers.shift => {
                if !textual {
                    // Media blocks are atomic; Enter neither splits nor
                    // inserts.
                    return Ok(KeyOutcome::Handled);
                }
                let new_id = if caret < len {
                    self.doc.split_at(id, caret)?
                } else {
                    let successor = if is_checklist {
                        Block::checklist("", false)
                    } else {
                        Block::text("")
                    };
                    self.doc.insert_after(Some(index), successor)
                };
                self.focus.request(FocusTarget::start(new_id));
                Ok(KeyOutcome::Handled)
            }
            Key::ArrowUp | Key::ArrowDown if event.move_modifier() => {
                let direction = if event.key == Key::ArrowUp {
                    Direction::Up
                } else {
                    Direction::Down
                };
                if self.doc.move_block(id, direction)? {
                    // The moved block keeps focus and its caret.
                    self.focus
                        .request(FocusTarget::new(id, CaretPosition::Offset(caret)));
                    Ok(KeyOutcome::Handled)
                } else {
                    Ok(KeyOutcome::PassThrough)
                }
            }
            Key::ArrowUp => {
                if index > 0 {
                    let neighbor = self.doc.blocks()[index - 1].id;
                    self.focus
                        .request(FocusTarget::new(neighbor, CaretPosition::Offset(caret)));
                    Ok(KeyOutcome::Handled)
                } else {
                    Ok(KeyOutcome::PassThrough)
                }
            }
            Key::ArrowDown => {
                if index + 1 < self.doc.len() {
                    let neighbor = self.doc.blocks()[index + 1].id;
                    self.focus
                        .request(FocusTarget::new(neighbor, CaretPosition::Offset(caret)));
                    Ok(KeyOutcome::Handled)
                } else {
                    Ok(KeyOutcome::PassThrough)
                }
            }
            Key::Delete => {
                if caret == len
                    && textual
                    && let Some(target) = self.doc.merge_forward(id)
                {
                    self.focus.request(target);
                    Ok(KeyOutcome::Handled)
                } else {
                    Ok(KeyOutcome::PassThrough)
                }
            }
            Key::Backspace => {
                if caret != 0 {
                    return Ok(KeyOutcome::PassThrough);
                }
                if is_checklist {
                    // Backspace at the head demotes the checklist to text
                    // instead of deleting anything.
                    self.doc.update(id, |block| {
                        if let BlockKind::Checklist { content, .. } = &mut block.kind {
                            let content = std::mem::take(content);
                            block.kind = BlockKind::Text { content };
                        }
                    })?;
                    self.focus.request(FocusTarget::start(id));
                    return Ok(KeyOutcome::Handled);
                }
                if is_text && len == 0 && self.doc.len() > 1 {
                    match self.doc.remove(id) {
                        Ok(target) => self.focus.request(target),
                        Err(_) => return Ok(KeyOutcome::PassThrough),
                    }
                    return Ok(KeyOutcome::Handled);
                }
                Ok(KeyOutcome::PassThrough)
            }
            _ => Ok(KeyOutcome::PassThrough),
        }
    }

    /// Attach uploaded files after the focused block (or at the end of the
    /// document when nothing is focused).
    ///
    /// The upload collaborator resolves every file first, then each returned
    /// reference is probed for display metadata, and only then does a single
    /// batched splice run, so blocks land in submission order no matter how
    /// probing interleaves. Files the collaborator did not map are dropped
    /// from insertion and reported through the notification sink. A trailing
    /// empty text block is appended after the media and focused so typing
    /// can continue.
    ///
    /// Returns the number of media blocks inserted. On upload failure the
    /// document is untouched.
    pub fn attach_files(&mut self, files: &[UploadFile]) -> Result<usize, UploadError> {
        let uploader = self.uploader.as_mut().ok_or(UploadError::Unavailable)?;
        let refs = uploader.upload(files)?;
        if refs.is_empty() {
            return Ok(0);
        }
        if refs.len() < files.len() {
            tracing::warn!(
                submitted = files.len(),
                uploaded = refs.len(),
                "upload returned fewer references than files"
            );
            self.notifier.notify(Notice::FilesDropped {
                submitted: files.len(),
                uploaded: refs.len(),
            });
        }

        let mut inserted = Vec::with_capacity(refs.len() + 1);
        for (file, reference) in files.iter().zip(refs) {
            let info = match self.prober.as_mut() {
                Some(prober) => prober.probe(file, &reference),
                None => ProbeInfo::default(),
            };
            let dimensions = match reference.file_category {
                FileCategory::Image => info.dimensions.map(cap_display_size),
                _ => None,
            };
            let video_duration_ms = match reference.file_category {
                FileCategory::Video => info.video_duration_ms,
                _ => None,
            };
            let (display_width, display_height) = match dimensions {
                Some((width, height)) => (Some(width), Some(height)),
                None => (None, None),
            };
            inserted.push(Block::new(BlockKind::Media {
                source: MediaSource::Resolved(reference),
                display_width,
                display_height,
                video_duration_ms,
            }));
        }

        let media_count = inserted.len();
        inserted.push(Block::text(""));

        let after = self
            .focused
            .and_then(|id| self.doc.index_of(id))
            .unwrap_or(self.doc.len() - 1);
        let ids = self.doc.splice_after(Some(after), inserted);
        if let Some(trailing) = ids.last() {
            self.focus.request(FocusTarget::start(*trailing));
        }
        tracing::debug!(count = media_count, "attached media blocks");
        Ok(media_count)
    }
}

/// Scale probed image dimensions down to [`MAX_DISPLAY_WIDTH`], preserving
/// the aspect ratio.
fn cap_display_size((width, height): (u32, u32)) -> (u32, u32) {
    if width <= MAX_DISPLAY_WIDTH {
        return (width, height);
    }
    let ratio = MAX_DISPLAY_WIDTH as f64 / width as f64;
    (
        MAX_DISPLAY_WIDTH,
        (height as f64 * ratio).round() as u32,
    )
}
