//! Synchronization primitives for cooperative, single-threaded callers.

pub mod barrier;

pub use barrier::Barrier;
