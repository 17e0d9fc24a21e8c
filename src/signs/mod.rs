//! Custom signs
//!
//! Records created by users, their storage, and their resolution into
//! gesture definitions.

pub mod record;
pub mod resolve;
pub mod store;

pub use record::{normalize_name, SignRecord};
pub use resolve::{resolve, resolve_all, GestureSource};
pub use store::{
    JsonFileSignStore, MemorySignStore, SignEvent, SignStore, SignStoreError, SignStoreResult,
};
