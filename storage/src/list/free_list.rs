use crate::disk::slot_store::SlotStore;
use crate::list::ListError;
use crate::slot::cursor::Cursor;
use crate::slot::file_header::FileHeader;
use crate::slot::node::Node;

/// Pop the free-chain head.
///
/// Advances `hdr.free` past the popped slot and returns its cursor. The
/// slot's bytes still hold the free marker: the caller must overwrite them
/// before the header is committed.
pub fn allocate<S: SlotStore>(store: &S, hdr: &mut FileHeader) -> anyhow::Result<Cursor> {
    if hdr.free.is_nil() {
        return Err(ListError::OutOfSpace.into());
    }

    let cursor = hdr.free;
    let node = store.read_node(cursor)?;
    hdr.free = node.next;
    Ok(cursor)
}

/// Push `cursor` onto the free-chain head.
///
/// Stamps the slot with the free sentinel and marker payload. LIFO: the
/// last released cursor is the next one allocated.
pub fn release<S: SlotStore>(
    store: &mut S,
    hdr: &mut FileHeader,
    cursor: Cursor,
) -> anyhow::Result<()> {
    store.write_node(cursor, &Node::free(hdr.free))?;
    hdr.free = cursor;
    Ok(())
}
