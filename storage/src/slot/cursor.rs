use std::fmt;

/// 1-based slot index identifying a node's position in the file.
///
/// Cursors stand in for pointers: node-to-node links are stored as plain
/// integers and resolved through the store. `-1` is the nil cursor.
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct Cursor(pub i64);

impl Cursor {
    pub const NIL: Cursor = Cursor(-1);

    pub fn new(index: i64) -> Self {
        Self(index)
    }

    pub fn index(self) -> i64 {
        self.0
    }

    pub fn is_nil(self) -> bool {
        self.0 == -1
    }
}

impl fmt::Debug for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cursor({})", self.0)
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
