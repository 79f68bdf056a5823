//! Real-world scenario benchmarks.
//!
//! Whole FM patches rendered through the graph, and through the engine
//! callback with stereo interleaving and note draining.

mod patches;

pub use patches::{bench_callback, bench_patches};
