//! Integration test suite.
//!
//! 1. Heap file layout and lifecycle
//! 2. Catalog and table workflow
//! 3. Statement execution

pub mod end_to_end_tests;
pub mod heap_file_tests;
pub mod interpreter_tests;
