use crate::disk::slot_store::SlotStore;
use crate::slot::constants::SLOT_SIZE;
use crate::slot::cursor::Cursor;
use crate::slot::file_header::FileHeader;
use crate::slot::node::Node;
use anyhow::Context;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("cursor {0:?} outside 1..={1}")]
    CursorRange(Cursor, i64),
    #[error("{0:?} is not a formatted record file")]
    BadFormat(PathBuf),
}

/// File-backed slot store.
///
/// Owns the handle for its whole lifetime; dropping the store releases it.
/// `capacity` is fixed at format time, so it is the one piece of metadata
/// kept in memory for cursor range checks.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    file: File,
    capacity: i64,
}

impl FileStore {
    /// Create (or truncate) a record file sized for `capacity` slots.
    ///
    /// The file starts zeroed; the caller formats it before use.
    pub fn create<P: AsRef<Path>>(path: P, capacity: i64) -> anyhow::Result<Self> {
        let path = path.as_ref();
        anyhow::ensure!(capacity >= 0, "capacity must be non-negative");

        let file = OpenOptions::new()
            .create(true)
            .truncate(true)
            .read(true)
            .write(true)
            .open(path)
            .with_context(|| format!("creating record file {:?}", path))?;
        file.set_len(((capacity + 1) as u64) * (SLOT_SIZE as u64))?;

        tracing::debug!(?path, capacity, "created record file");
        Ok(Self {
            path: path.to_path_buf(),
            file,
            capacity,
        })
    }

    /// Open an existing record file and validate its shape against the
    /// header.
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .with_context(|| format!("opening record file {:?}", path))?;

        let len = file.metadata()?.len();
        if len < SLOT_SIZE as u64 {
            return Err(StoreError::BadFormat(path.to_path_buf()).into());
        }

        let mut store = Self {
            path: path.to_path_buf(),
            file,
            capacity: 0,
        };
        let hdr = store.read_header()?;
        if hdr.capacity < 0 || len != ((hdr.capacity + 1) as u64) * (SLOT_SIZE as u64) {
            return Err(StoreError::BadFormat(path.to_path_buf()).into());
        }
        store.capacity = hdr.capacity;

        tracing::debug!(?path, capacity = store.capacity, "opened record file");
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn capacity(&self) -> i64 {
        self.capacity
    }

    fn check(&self, cursor: Cursor) -> anyhow::Result<()> {
        if cursor.0 < 1 || cursor.0 > self.capacity {
            return Err(StoreError::CursorRange(cursor, self.capacity).into());
        }
        Ok(())
    }

    fn read_slot(&self, offset: u64) -> anyhow::Result<[u8; SLOT_SIZE]> {
        let mut buf = [0u8; SLOT_SIZE];
        let mut file = &self.file;
        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(&mut buf)
            .with_context(|| format!("reading slot at offset {} in {:?}", offset, self.path))?;
        Ok(buf)
    }

    fn write_slot(&mut self, offset: u64, buf: &[u8; SLOT_SIZE]) -> anyhow::Result<()> {
        self.file.seek(SeekFrom::Start(offset))?;
        self.file
            .write_all(buf)
            .with_context(|| format!("writing slot at offset {} in {:?}", offset, self.path))?;
        Ok(())
    }
}

impl SlotStore for FileStore {
    fn read_header(&self) -> anyhow::Result<FileHeader> {
        Ok(FileHeader::decode(&self.read_slot(0)?))
    }

    fn write_header(&mut self, hdr: &FileHeader) -> anyhow::Result<()> {
        self.write_slot(0, &hdr.encode())
    }

    fn read_node(&self, cursor: Cursor) -> anyhow::Result<Node> {
        self.check(cursor)?;
        Node::decode(&self.read_slot((cursor.0 as u64) * (SLOT_SIZE as u64))?)
            .with_context(|| format!("while decoding {:?}", cursor))
    }

    fn write_node(&mut self, cursor: Cursor, node: &Node) -> anyhow::Result<()> {
        self.check(cursor)?;
        let buf = node.encode()?;
        self.write_slot((cursor.0 as u64) * (SLOT_SIZE as u64), &buf)
    }

    fn sync(&mut self) -> anyhow::Result<()> {
        self.file.sync_all()?;
        Ok(())
    }
}
