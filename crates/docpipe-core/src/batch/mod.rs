//! Module: batch
//! Responsibility: deadline- and size-bounded assembly of documents pulled
//! from the input queue into one batch.
//! Does not own: task decoding, response content, or bulk worker logic.
//! Boundary: a [`Batch`] only borrows the source, sink, decoder and hooks
//! for the duration of one bulk call.

mod admission;
mod assembly;


pub use admission::{BatchSizeController, DEFAULT_MAX_BATCH_SIZE, DEFAULT_MAX_BATCH_TIME};
pub use assembly::{Batch, BatchId, CloseReason};

pub(crate) use assembly::{BatchParts, BatchTask};
