//! Target validation and batch-file loading.

pub mod batch;
pub mod resolve;

pub use batch::{BatchEntry, BatchError, EntryError, load_batch};
pub use resolve::{ResolveError, resolve};
