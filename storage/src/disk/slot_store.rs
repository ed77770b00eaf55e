use crate::slot::cursor::Cursor;
use crate::slot::file_header::FileHeader;
use crate::slot::node::Node;

/// Random access to the slots of one record file.
///
/// The file is the authoritative state: callers re-read whatever they need
/// per operation and never hold a node across operations.
pub trait SlotStore {
    fn read_header(&self) -> anyhow::Result<FileHeader>;
    fn write_header(&mut self, hdr: &FileHeader) -> anyhow::Result<()>;
    fn read_node(&self, cursor: Cursor) -> anyhow::Result<Node>;
    fn write_node(&mut self, cursor: Cursor, node: &Node) -> anyhow::Result<()>;
    fn sync(&mut self) -> anyhow::Result<()>;
}
