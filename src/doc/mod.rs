//! Document container: an ordered, exclusively-owned sequence of blocks plus
//! memo-level metadata.
//!
//! `order_index` is the sole determinant of block order and persistence
//! trusts it as authoritative, so every structural mutation ends with a full
//! renumber pass keeping the indexes dense. A document always holds at least
//! one block; a brand-new one is seeded with a single empty text block.

use crate::block::{Block, BlockId, grapheme_offset_to_byte};
use crate::focus::{CaretPosition, FocusTarget};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("block not found")]
    BlockNotFound,
    #[error("document must keep at least one block")]
    LastBlock,
    #[error("operation requires a text or checklist block")]
    NotTextual,
    #[error("invalid caret offset")]
    InvalidOffset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub title: Option<String>,
    pub pinned: bool,
    pub archived: bool,
    /// Server-assigned timestamps captured on load; never re-emitted on save.
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    blocks: Vec<Block>,
}

impl Document {
    pub fn new() -> Self {
        Self::with_blocks(Vec::new())
    }

    /// Build a document around existing blocks, seeding the mandatory single
    /// empty text block when the input is empty. Indexes are renumbered.
    pub fn with_blocks(blocks: Vec<Block>) -> Self {
        let mut doc = Self {
            title: None,
            pinned: false,
            archived: false,
            created_at: None,
            updated_at: None,
            blocks,
        };
        if doc.blocks.is_empty() {
            doc.blocks.push(Block::text(""));
        }
        doc.renumber();
        doc
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, id: BlockId) -> Option<&Block> {
        self.blocks.iter().find(|block| block.id == id)
    }

    pub fn index_of(&self, id: BlockId) -> Option<usize> {
        self.blocks.iter().position(|block| block.id == id)
    }

    /// True when `order_index` values equal `0..len` in sequence order.
    pub fn is_dense(&self) -> bool {
        self.blocks
            .iter()
            .enumerate()
            .all(|(index, block)| block.order_index == index)
    }

    fn renumber(&mut self) {
        for (index, block) in self.blocks.iter_mut().enumerate() {
            block.order_index = index;
        }
    }

    /// Insert `block` immediately after position `after` (`None` inserts at
    /// the head) and renumber. Returns the new block's id.
    pub fn insert_after(&mut self, after: Option<usize>, block: Block) -> BlockId {
        let position = after.map(|index| index + 1).unwrap_or(0).min(self.len());
        let id = block.id;
        self.blocks.insert(position, block);
        self.renumber();
        tracing::debug!(block = %id, position, "inserted block");
        id
    }

    /// Insert several blocks as one splice after position `after`, keeping
    /// their submission order. Returns the new ids in order.
    pub fn splice_after(&mut self, after: Option<usize>, blocks: Vec<Block>) -> Vec<BlockId> {
        let position = after.map(|index| index + 1).unwrap_or(0).min(self.len());
        let ids: Vec<BlockId> = blocks.iter().map(|block| block.id).collect();
        self.blocks.splice(position..position, blocks);
        self.renumber();
        ids
    }

    /// Remove a block and renumber. Refuses to empty the document. The
    /// returned target is where focus should land: the predecessor at its
    /// end, or the new first block at its start when the removed block was
    /// first.
    pub fn remove(&mut self, id: BlockId) -> Result<FocusTarget, EditError> {
        if self.len() <= 1 {
            return Err(EditError::LastBlock);
        }
        let index = self.index_of(id).ok_or(EditError::BlockNotFound)?;
        self.blocks.remove(index);
        self.renumber();
        tracing::debug!(block = %id, index, "removed block");

        let target = if index > 0 {
            FocusTarget::end(self.blocks[index - 1].id)
        } else {
            FocusTarget::start(self.blocks[0].id)
        };
        Ok(target)
    }

    /// Swap a block with its neighbor. Returns false without mutating at
    /// either boundary.
    pub fn move_block(&mut self, id: BlockId, direction: Direction) -> Result<bool, EditError> {
        let index = self.index_of(id).ok_or(EditError::BlockNotFound)?;
        let target = match direction {
            Direction::Up if index > 0 => index - 1,
            Direction::Down if index + 1 < self.len() => index + 1,
            _ => return Ok(false),
        };
        self.blocks.swap(index, target);
        self.renumber();
        Ok(true)
    }

    /// Move a block to the position currently held by `target`, shifting the
    /// blocks in between. Drag-and-drop reordering. Returns false when
    /// source and target are the same block.
    pub fn reorder(&mut self, id: BlockId, target: BlockId) -> Result<bool, EditError> {
        if id == target {
            return Ok(false);
        }
        let from = self.index_of(id).ok_or(EditError::BlockNotFound)?;
        let to = self.index_of(target).ok_or(EditError::BlockNotFound)?;
        let block = self.blocks.remove(from);
        self.blocks.insert(to, block);
        self.renumber();
        Ok(true)
    }

    /// Apply a payload update to one block. Ordering is untouched; the
    /// renumber pass afterwards undoes any stray `order_index` write.
    pub fn update(
        &mut self,
        id: BlockId,
        updater: impl FnOnce(&mut Block),
    ) -> Result<(), EditError> {
        let index = self.index_of(id).ok_or(EditError::BlockNotFound)?;
        updater(&mut self.blocks[index]);
        self.renumber();
        Ok(())
    }

    /// Concatenate the successor's content onto `id` and remove the
    /// successor. Valid only when both blocks are textual; otherwise a
    /// silent no-op returning None. The returned target keeps focus on `id`
    /// at its pre-merge grapheme length.
    pub fn merge_forward(&mut self, id: BlockId) -> Option<FocusTarget> {
        let index = self.index_of(id)?;
        if !self.blocks[index].is_textual() {
            return None;
        }
        let successor = self.blocks.get(index + 1)?;
        if !successor.is_textual() {
            return None;
        }

        let tail = successor.content().unwrap_or("").to_string();
        let caret = self.blocks[index].grapheme_len();
        if let Some(content) = self.blocks[index].content_mut() {
            content.push_str(&tail);
        }
        self.blocks.remove(index + 1);
        self.renumber();
        tracing::debug!(block = %id, "merged successor");

        Some(FocusTarget::new(id, CaretPosition::Offset(caret)))
    }

    /// Split a textual block at a grapheme offset. The block keeps
    /// `[0, caret)`; a new block of the same kind carrying `[caret, end)` is
    /// inserted immediately after, inheriting `checked` for checklists.
    /// Returns the new block's id.
    pub fn split_at(&mut self, id: BlockId, caret: usize) -> Result<BlockId, EditError> {
        let index = self.index_of(id).ok_or(EditError::BlockNotFound)?;
        let block = &mut self.blocks[index];
        let checked = block.checked();
        let Some(content) = block.content_mut() else {
            return Err(EditError::NotTextual);
        };

        let byte_offset =
            grapheme_offset_to_byte(content, caret).ok_or(EditError::InvalidOffset)?;
        let tail = content.split_off(byte_offset);

        let successor = match checked {
            Some(checked) => Block::checklist(tail, checked),
            None => Block::text(tail),
        };
        let new_id = self.insert_after(Some(index), successor);
        tracing::debug!(block = %id, caret, "split block");
        Ok(new_id)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
