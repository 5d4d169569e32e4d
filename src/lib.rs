//! memo-doc: block document model and editing engine for memo content.
//!
//! A memo is an ordered sequence of typed blocks (text, checklist, media).
//! This crate provides the headless editing core behind a memo application:
//!
//! - **Content unit model** - typed blocks with dense ordering and per-kind
//!   invariants
//! - **Document container** - insert/remove/move/split/merge with mandatory
//!   renumbering
//! - **Edit engine** - keyboard dispatch producing structural edits plus
//!   focus requests
//! - **Serialization codec** - lossless round-trip to the persisted JSON
//!   form, with tolerant decoding and list-view preview extraction
//! - **Focus coordination** - single pending caret target, clamped when the
//!   host applies it after rendering
//!
//! # Quick Start
//!
//! ```rust
//! use memo_doc::{Document, EditorSession, Key, KeyEvent};
//!
//! let mut session = EditorSession::new(Document::new());
//! let id = session.document().blocks()[0].id;
//!
//! session.update_content(id, "hello world".into()).unwrap();
//! session.handle_key(id, 5, KeyEvent::plain(Key::Enter)).unwrap();
//!
//! assert_eq!(session.document().blocks()[0].content(), Some("hello"));
//! assert_eq!(session.document().blocks()[1].content(), Some(" world"));
//!
//! // The new block receives focus at its start once the host has rendered.
//! let focus = session.resolve_focus().unwrap();
//! assert_eq!(focus.caret, 0);
//! ```
//!
//! # Features
//!
//! - `inspect` (default) - enables the `memo-doc` CLI for inspecting
//!   persisted memo JSON files

// Content unit model
pub mod block;

// Persisted JSON codec and preview extraction
pub mod codec;

// Document container
pub mod doc;

// Edit operation engine
pub mod engine;

// Focus and caret coordination
pub mod focus;

// Re-export block types
pub use block::{Block, BlockError, BlockId, BlockKind, FileCategory, FileRef, MediaSource};

// Re-export codec types
pub use codec::{
    DecodeError, MediaMarker, PersistedBlock, PersistedMemo, PersistedType, Preview, PreviewEntry,
    decode, decode_json, encode, extract_preview,
};

// Re-export document types
pub use doc::{Direction, Document, EditError};

// Re-export engine types
pub use engine::{
    EditorSession, Key, KeyEvent, KeyOutcome, MAX_DISPLAY_WIDTH, MediaProber, MemoStore,
    Modifiers, NoopSink, Notice, NotificationSink, ProbeInfo, StoreError, UploadError, UploadFile,
    Uploader,
};

// Re-export focus types
pub use focus::{CaretPosition, FocusCoordinator, FocusTarget, ResolvedFocus};
