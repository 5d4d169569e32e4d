use memo_doc::{Block, Direction, Document, EditError, MediaSource};

fn assert_dense(doc: &Document) {
    let indexes: Vec<usize> = doc.blocks().iter().map(|block| block.order_index).collect();
    let expected: Vec<usize> = (0..doc.len()).collect();
    assert_eq!(indexes, expected, "order indexes must stay dense");
}

fn media_block() -> Block {
    Block::media(MediaSource::Legacy { file_idx: 7 }, None, None, None).unwrap()
}

#[test]
fn inv_dense_after_every_structural_operation() {
    let mut doc = Document::new();
    assert_dense(&doc);

    let a = doc.insert_after(None, Block::text("a"));
    assert_dense(&doc);

    let b = doc.insert_after(Some(doc.len() - 1), Block::text("b"));
    assert_dense(&doc);

    doc.splice_after(Some(0), vec![media_block(), Block::checklist("c", false)]);
    assert_dense(&doc);

    doc.move_block(a, Direction::Down).unwrap();
    assert_dense(&doc);

    doc.split_at(b, 1).unwrap();
    assert_dense(&doc);

    doc.merge_forward(b);
    assert_dense(&doc);

    doc.remove(a).unwrap();
    assert_dense(&doc);

    doc.reorder(b, doc.blocks()[0].id).unwrap();
    assert_dense(&doc);
}

#[test]
fn inv_remove_on_single_block_document_is_a_noop() {
    let mut doc = Document::with_blocks(vec![Block::text("only")]);
    let id = doc.blocks()[0].id;

    assert_eq!(doc.remove(id), Err(EditError::LastBlock));
    assert_eq!(doc.len(), 1);
    assert_eq!(doc.blocks()[0].content(), Some("only"));
    assert_eq!(doc.blocks()[0].id, id);
}

#[test]
fn inv_blocks_are_never_shared_across_documents() {
    // Cloning a document clones the blocks; edits to one never show in the
    // other.
    let mut doc = Document::with_blocks(vec![Block::text("a")]);
    let copy = doc.clone();
    let id = doc.blocks()[0].id;

    doc.update(id, |block| {
        if let memo_doc::BlockKind::Text { content } = &mut block.kind {
            content.push('!');
        }
    })
    .unwrap();

    assert_eq!(doc.blocks()[0].content(), Some("a!"));
    assert_eq!(copy.blocks()[0].content(), Some("a"));
}

#[test]
fn inv_move_up_then_down_restores_order() {
    let mut doc =
        Document::with_blocks(vec![Block::text("a"), Block::text("b"), Block::text("c")]);
    let before = doc.clone();
    let middle = doc.blocks()[1].id;

    assert!(doc.move_block(middle, Direction::Up).unwrap());
    assert!(doc.move_block(middle, Direction::Down).unwrap());
    assert_eq!(doc, before);
}

#[test]
fn inv_unknown_block_id_is_reported() {
    let mut doc = Document::new();
    let ghost = uuid::Uuid::new_v4();

    assert_eq!(doc.remove(ghost), Err(EditError::BlockNotFound));
    assert_eq!(
        doc.move_block(ghost, Direction::Up),
        Err(EditError::BlockNotFound)
    );
    assert_eq!(doc.split_at(ghost, 0), Err(EditError::BlockNotFound));
    assert_eq!(doc.merge_forward(ghost), None);
}
