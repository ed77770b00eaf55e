use crate::disk::file_store::FileStore;
use crate::disk::slot_store::SlotStore;
use crate::list::{ListError, free_list};
use crate::slot::constants::{FREE_KEY, PAYLOAD_LEN};
use crate::slot::cursor::Cursor;
use crate::slot::file_header::FileHeader;
use crate::slot::node::{Node, Record};
use std::path::Path;

/// Doubly-linked record list resident in a slot store.
///
/// Every mutating operation reads the header once at entry and commits it
/// exactly once at the end, after all slot writes. Checks that can fail
/// (duplicate key, exhausted free chain, malformed record) run before the
/// first write, so a failed operation leaves the file untouched.
pub struct RecordList<S: SlotStore> {
    store: S,
}

impl<S: SlotStore> RecordList<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Format a fresh file: empty active chain, every slot linked into one
    /// free chain 1 -> 2 -> ... -> capacity -> nil.
    pub fn format(&mut self, capacity: i64) -> anyhow::Result<()> {
        anyhow::ensure!(capacity >= 0, "capacity must be non-negative");

        self.store.write_header(&FileHeader::new(capacity))?;
        for i in 1..=capacity {
            let next = if i == capacity {
                Cursor::NIL
            } else {
                Cursor::new(i + 1)
            };
            self.store.write_node(Cursor::new(i), &Node::free(next))?;
        }

        tracing::debug!(capacity, "formatted record list");
        Ok(())
    }

    pub fn header(&self) -> anyhow::Result<FileHeader> {
        self.store.read_header()
    }

    /// Linear scan of the active chain.
    pub fn search(&self, key: i64) -> anyhow::Result<Option<(Cursor, Node)>> {
        let hdr = self.store.read_header()?;
        let mut current = hdr.first;
        let mut steps = 0;

        while !current.is_nil() {
            steps += 1;
            anyhow::ensure!(
                steps <= hdr.capacity,
                "active chain is longer than capacity {}; file is corrupt",
                hdr.capacity
            );
            let node = self.store.read_node(current)?;
            if node.rec.key == key {
                return Ok(Some((current, node)));
            }
            current = node.next;
        }
        Ok(None)
    }

    /// Insert at the tail regardless of key order.
    pub fn insert_append(&mut self, rec: Record) -> anyhow::Result<Cursor> {
        check_record(&rec)?;
        if self.search(rec.key)?.is_some() {
            return Err(ListError::DuplicateKey(rec.key).into());
        }

        let mut hdr = self.store.read_header()?;
        let cursor = free_list::allocate(&self.store, &mut hdr)?;

        let node = Node {
            next: Cursor::NIL,
            prev: hdr.last,
            rec,
        };
        if hdr.last.is_nil() {
            hdr.first = cursor;
        } else {
            let mut tail = self.store.read_node(hdr.last)?;
            tail.next = cursor;
            self.store.write_node(hdr.last, &tail)?;
        }
        self.store.write_node(cursor, &node)?;

        hdr.last = cursor;
        hdr.count += 1;
        self.store.write_header(&hdr)?;

        tracing::debug!(key = node.rec.key, %cursor, "appended record");
        Ok(cursor)
    }

    /// Insert before the first strictly-greater key.
    ///
    /// Keys come out ascending front-to-back provided every insertion on
    /// this file used this operation; on a file populated by appends the
    /// splice point is wherever the linear scan lands.
    pub fn insert_sorted(&mut self, rec: Record) -> anyhow::Result<Cursor> {
        check_record(&rec)?;
        if self.search(rec.key)?.is_some() {
            return Err(ListError::DuplicateKey(rec.key).into());
        }

        let mut hdr = self.store.read_header()?;
        let cursor = free_list::allocate(&self.store, &mut hdr)?;

        let mut node = Node {
            next: Cursor::NIL,
            prev: Cursor::NIL,
            rec,
        };

        if hdr.first.is_nil() {
            hdr.first = cursor;
            hdr.last = cursor;
        } else {
            let mut current = hdr.first;
            let mut before = Cursor::NIL;
            while !current.is_nil() {
                let probe = self.store.read_node(current)?;
                if probe.rec.key > node.rec.key {
                    break;
                }
                before = current;
                current = probe.next;
            }

            if current == hdr.first {
                // New head: old head gains a predecessor.
                node.next = hdr.first;
                let mut head = self.store.read_node(hdr.first)?;
                head.prev = cursor;
                self.store.write_node(hdr.first, &head)?;
                hdr.first = cursor;
            } else if current.is_nil() {
                // Ran off the end: new tail.
                node.prev = hdr.last;
                let mut tail = self.store.read_node(hdr.last)?;
                tail.next = cursor;
                self.store.write_node(hdr.last, &tail)?;
                hdr.last = cursor;
            } else {
                // Between two nodes; `before` is only consulted here.
                node.prev = before;
                node.next = current;
                let mut left = self.store.read_node(before)?;
                left.next = cursor;
                self.store.write_node(before, &left)?;
                let mut right = self.store.read_node(current)?;
                right.prev = cursor;
                self.store.write_node(current, &right)?;
            }
        }
        self.store.write_node(cursor, &node)?;

        hdr.count += 1;
        self.store.write_header(&hdr)?;

        tracing::debug!(key = node.rec.key, %cursor, "inserted record in key order");
        Ok(cursor)
    }

    /// Unsplice the node holding `key` and push its slot onto the free
    /// chain. Returns false (file untouched) when the key is absent.
    pub fn delete(&mut self, key: i64) -> anyhow::Result<bool> {
        let mut hdr = self.store.read_header()?;
        let mut current = hdr.first;
        let mut steps = 0;

        while !current.is_nil() {
            steps += 1;
            anyhow::ensure!(
                steps <= hdr.capacity,
                "active chain is longer than capacity {}; file is corrupt",
                hdr.capacity
            );
            let node = self.store.read_node(current)?;
            if node.rec.key != key {
                current = node.next;
                continue;
            }

            if node.prev.is_nil() {
                hdr.first = node.next;
            } else {
                let mut left = self.store.read_node(node.prev)?;
                left.next = node.next;
                self.store.write_node(node.prev, &left)?;
            }
            if node.next.is_nil() {
                hdr.last = node.prev;
            } else {
                let mut right = self.store.read_node(node.next)?;
                right.prev = node.prev;
                self.store.write_node(node.next, &right)?;
            }

            free_list::release(&mut self.store, &mut hdr, current)?;
            hdr.count -= 1;
            if hdr.count == 0 {
                hdr.first = Cursor::NIL;
                hdr.last = Cursor::NIL;
            }
            self.store.write_header(&hdr)?;

            tracing::debug!(key, %current, "deleted record");
            return Ok(true);
        }
        Ok(false)
    }

    /// Every slot in physical order, free ones included.
    pub fn slots(&self) -> anyhow::Result<Vec<(Cursor, Node)>> {
        let hdr = self.store.read_header()?;
        let mut out = Vec::with_capacity(hdr.capacity.max(0) as usize);
        for i in 1..=hdr.capacity {
            let cursor = Cursor::new(i);
            out.push((cursor, self.store.read_node(cursor)?));
        }
        Ok(out)
    }

    /// The active chain in link order.
    pub fn active(&self) -> anyhow::Result<Vec<(Cursor, Node)>> {
        let hdr = self.store.read_header()?;
        let mut out = Vec::new();
        let mut current = hdr.first;

        while !current.is_nil() {
            anyhow::ensure!(
                (out.len() as i64) < hdr.capacity,
                "active chain is longer than capacity {}; file is corrupt",
                hdr.capacity
            );
            let node = self.store.read_node(current)?;
            let next = node.next;
            out.push((current, node));
            current = next;
        }
        Ok(out)
    }

    /// The free chain in link order.
    pub fn free_chain(&self) -> anyhow::Result<Vec<Cursor>> {
        let hdr = self.store.read_header()?;
        let mut out = Vec::new();
        let mut current = hdr.free;

        while !current.is_nil() {
            anyhow::ensure!(
                (out.len() as i64) < hdr.capacity,
                "free chain is longer than capacity {}; file is corrupt",
                hdr.capacity
            );
            out.push(current);
            current = self.store.read_node(current)?.next;
        }
        Ok(out)
    }

    pub fn sync(&mut self) -> anyhow::Result<()> {
        self.store.sync()
    }
}

impl RecordList<FileStore> {
    /// Create and format a fresh record file.
    pub fn create<P: AsRef<Path>>(path: P, capacity: i64) -> anyhow::Result<Self> {
        let mut list = Self::new(FileStore::create(path, capacity)?);
        list.format(capacity)?;
        Ok(list)
    }

    /// Open a previously formatted record file.
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Ok(Self::new(FileStore::open(path)?))
    }
}

fn check_record(rec: &Record) -> Result<(), ListError> {
    if rec.key == FREE_KEY {
        return Err(ListError::ReservedKey(rec.key));
    }
    let len = rec.payload.len();
    if len > PAYLOAD_LEN {
        return Err(ListError::PayloadTooLong {
            len,
            max: PAYLOAD_LEN,
        });
    }
    Ok(())
}
