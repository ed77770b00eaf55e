/// Uniform stride of the file: the header and every node occupy one slot.
pub const SLOT_SIZE: usize = 64;

/// Width of the fixed text field inside a node.
pub const PAYLOAD_LEN: usize = 40;

/// Key value marking a slot as free.
pub const FREE_KEY: i64 = -1;

/// Payload stamped into released slots.
pub const FREE_PAYLOAD: &str = "<free>";
