pub mod engine;
pub mod free_list;

#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error("key {0} is already present")]
    DuplicateKey(i64),
    #[error("no free slot left")]
    OutOfSpace,
    #[error("key {0} not found")]
    KeyNotFound(i64),
    #[error("key {0} is reserved for free slots")]
    ReservedKey(i64),
    #[error("payload is {len} bytes, slot text field holds {max}")]
    PayloadTooLong { len: usize, max: usize },
}
