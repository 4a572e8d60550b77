//! Wire-level document model: immutable snapshots and their leaf values.

mod failure;
mod snapshot;
mod value;


pub use failure::Failure;
pub use snapshot::{Snapshot, SnapshotBuilder};
pub use value::{Encoding, FieldValue, FieldValueError};

pub(crate) use failure::render_error_chain;
