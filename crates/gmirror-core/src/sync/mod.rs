//! Message synchronization engine.
//!
//! A cycle walks the remote history with [`walk`], combines the walked ranges
//! with the persisted set via [`merge`], and is orchestrated per conversation
//! by [`MessageSync`].

mod engine;
mod merge;
mod walker;

#[cfg(test)]
pub(crate) mod testing;

pub use engine::{MessageSync, SyncOptions, SyncReport};
pub use merge::merge;
pub use walker::{validate_page_size, walk, SyncCursor};
