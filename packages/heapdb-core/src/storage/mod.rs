//! Persistent storage for table records.
//!
//! Only the heap file organization exists: one file per table, holding
//! fixed-size slots back to back with no header. Slot and key sizes are not
//! stored in the file and must come from the live schema on every open.

mod heap_file;
mod io_utils;

pub use heap_file::{HeapFile, HeapScan};
pub use io_utils::classify_io_error;
