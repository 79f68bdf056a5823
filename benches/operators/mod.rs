//! Benchmarks for single operators.

mod carrier;
mod echo;
mod filter;

pub use carrier::bench_carrier;
pub use echo::bench_echo;
pub use filter::bench_filter;
