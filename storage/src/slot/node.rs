use crate::slot::constants::{FREE_KEY, FREE_PAYLOAD, PAYLOAD_LEN, SLOT_SIZE};
use crate::slot::cursor::Cursor;

/// User-visible content of an active node.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Record {
    pub key: i64,
    pub payload: String,
}

impl Record {
    pub fn new(key: i64, payload: impl Into<String>) -> Self {
        Self {
            key,
            payload: payload.into(),
        }
    }
}

/// One node slot: chain links plus the record.
///
/// A free node reuses `next` as the free-chain link; `prev` is nil, the key
/// holds the free sentinel and the payload holds the free marker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub next: Cursor,
    pub prev: Cursor,
    pub rec: Record,
}

impl Node {
    pub fn free(next: Cursor) -> Self {
        Self {
            next,
            prev: Cursor::NIL,
            rec: Record::new(FREE_KEY, FREE_PAYLOAD),
        }
    }

    pub fn is_free(&self) -> bool {
        self.rec.key == FREE_KEY
    }

    pub fn encode(&self) -> anyhow::Result<[u8; SLOT_SIZE]> {
        let text = self.rec.payload.as_bytes();
        if text.len() > PAYLOAD_LEN {
            anyhow::bail!(
                "payload is {} bytes, slot text field holds {}",
                text.len(),
                PAYLOAD_LEN
            );
        }

        let mut buf = [0u8; SLOT_SIZE];
        buf[0..8].copy_from_slice(&self.next.0.to_le_bytes());
        buf[8..16].copy_from_slice(&self.prev.0.to_le_bytes());
        buf[16..24].copy_from_slice(&self.rec.key.to_le_bytes());
        buf[24..24 + text.len()].copy_from_slice(text);
        Ok(buf)
    }

    pub fn decode(buf: &[u8; SLOT_SIZE]) -> anyhow::Result<Self> {
        let text = &buf[24..24 + PAYLOAD_LEN];
        let end = text.iter().position(|&b| b == 0).unwrap_or(PAYLOAD_LEN);
        let payload = String::from_utf8(text[..end].to_vec())?;

        Ok(Self {
            next: Cursor(i64::from_le_bytes(buf[0..8].try_into().unwrap())),
            prev: Cursor(i64::from_le_bytes(buf[8..16].try_into().unwrap())),
            rec: Record {
                key: i64::from_le_bytes(buf[16..24].try_into().unwrap()),
                payload,
            },
        })
    }
}
