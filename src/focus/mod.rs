//! Focus and caret coordination.
//!
//! Structural mutations record where input focus must land next; the host UI
//! consumes the request only after it has committed a render of the mutated
//! structure, so the caret is clamped against live content at application
//! time rather than at request time. Only one request is pending at a time
//! and a newer request overwrites an unconsumed one, which keeps focus
//! application strictly ordered after the mutation that asked for it.

use crate::block::{BlockId, clamp_grapheme_offset};
use crate::doc::Document;

/// Requested caret placement, in grapheme clusters for `Offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaretPosition {
    Start,
    End,
    Offset(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusTarget {
    pub block_id: BlockId,
    pub caret: CaretPosition,
}

impl FocusTarget {
    pub fn new(block_id: BlockId, caret: CaretPosition) -> Self {
        Self { block_id, caret }
    }

    pub fn start(block_id: BlockId) -> Self {
        Self::new(block_id, CaretPosition::Start)
    }

    pub fn end(block_id: BlockId) -> Self {
        Self::new(block_id, CaretPosition::End)
    }
}

/// A consumed focus request with the caret clamped to the target's current
/// content length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedFocus {
    pub block_id: BlockId,
    pub caret: usize,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FocusCoordinator {
    pending: Option<FocusTarget>,
}

impl FocusCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record where focus should land after the current mutation. Overwrites
    /// any unconsumed request.
    pub fn request(&mut self, target: FocusTarget) {
        self.pending = Some(target);
    }

    pub fn pending(&self) -> Option<FocusTarget> {
        self.pending
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }

    /// Consume the pending request and clamp its caret against the target
    /// block's current content. Returns None when nothing is pending or the
    /// target no longer exists; the request is consumed either way.
    pub fn resolve(&mut self, doc: &Document) -> Option<ResolvedFocus> {
        let target = self.pending.take()?;
        let block = doc.get(target.block_id)?;
        let content = block.content().unwrap_or("");
        let caret = match target.caret {
            CaretPosition::Start => 0,
            CaretPosition::End => clamp_grapheme_offset(content, usize::MAX),
            CaretPosition::Offset(offset) => clamp_grapheme_offset(content, offset),
        };
        Some(ResolvedFocus {
            block_id: target.block_id,
            caret,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Block;
    use crate::doc::Document;

    #[test]
    fn test_new_request_overwrites_unconsumed_one() {
        let mut doc = Document::new();
        let first = doc.blocks()[0].id;
        let second = doc.insert_after(Some(0), Block::text("abc"));

        let mut focus = FocusCoordinator::new();
        focus.request(FocusTarget::end(first));
        focus.request(FocusTarget::start(second));

        let resolved = focus.resolve(&doc).unwrap();
        assert_eq!(resolved.block_id, second);
        assert_eq!(resolved.caret, 0);
        assert_eq!(focus.pending(), None);
    }

    #[test]
    fn test_offset_clamped_at_resolution_time() {
        let mut doc = Document::new();
        let id = doc.blocks()[0].id;
        doc.update(id, |block| {
            if let Some(content) = block.content_mut() {
                content.push_str("abc");
            }
        })
        .unwrap();

        let mut focus = FocusCoordinator::new();
        focus.request(FocusTarget::new(id, CaretPosition::Offset(99)));
        assert_eq!(focus.resolve(&doc).unwrap().caret, 3);
    }

    #[test]
    fn test_end_resolves_to_grapheme_length() {
        let mut doc = Document::new();
        let id = doc.insert_after(Some(0), Block::text("a🇺🇸b"));

        let mut focus = FocusCoordinator::new();
        focus.request(FocusTarget::end(id));
        assert_eq!(focus.resolve(&doc).unwrap().caret, 3);
    }

    #[test]
    fn test_request_for_missing_block_is_consumed() {
        let doc = Document::new();
        let mut focus = FocusCoordinator::new();
        focus.request(FocusTarget::start(uuid::Uuid::new_v4()));

        assert_eq!(focus.resolve(&doc), None);
        assert_eq!(focus.pending(), None);
    }

    #[test]
    fn test_resolve_without_request_is_none() {
        let doc = Document::new();
        let mut focus = FocusCoordinator::new();
        assert_eq!(focus.resolve(&doc), None);
    }
}
