use crate::slot::constants::SLOT_SIZE;
use crate::slot::cursor::Cursor;

/// Metadata slot at offset 0.
///
/// `first`/`last` bound the active chain, `free` roots the free chain and
/// `capacity` is fixed when the file is formatted. Two invariants tie the
/// fields together: `count == 0` exactly when `first` and `last` are nil,
/// and `free` is nil exactly when `count == capacity`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FileHeader {
    pub count: i64,
    pub first: Cursor,
    pub last: Cursor,
    pub free: Cursor,
    pub capacity: i64,
}

impl FileHeader {
    /// Meaningful bytes; the rest of the slot is zero padding.
    pub const LEN: usize = 40;

    pub fn new(capacity: i64) -> Self {
        Self {
            count: 0,
            first: Cursor::NIL,
            last: Cursor::NIL,
            free: if capacity > 0 { Cursor::new(1) } else { Cursor::NIL },
            capacity,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_full(&self) -> bool {
        self.free.is_nil()
    }

    pub fn encode(&self) -> [u8; SLOT_SIZE] {
        let mut buf = [0u8; SLOT_SIZE];
        buf[0..8].copy_from_slice(&self.count.to_le_bytes());
        buf[8..16].copy_from_slice(&self.first.0.to_le_bytes());
        buf[16..24].copy_from_slice(&self.last.0.to_le_bytes());
        buf[24..32].copy_from_slice(&self.free.0.to_le_bytes());
        buf[32..40].copy_from_slice(&self.capacity.to_le_bytes());
        buf
    }

    pub fn decode(buf: &[u8; SLOT_SIZE]) -> Self {
        Self {
            count: i64::from_le_bytes(buf[0..8].try_into().unwrap()),
            first: Cursor(i64::from_le_bytes(buf[8..16].try_into().unwrap())),
            last: Cursor(i64::from_le_bytes(buf[16..24].try_into().unwrap())),
            free: Cursor(i64::from_le_bytes(buf[24..32].try_into().unwrap())),
            capacity: i64::from_le_bytes(buf[32..40].try_into().unwrap()),
        }
    }
}
