pub mod kernel;
pub mod stats;

pub use kernel::{DemonInfo, Kernel, ProcessResult};
pub use stats::{DemonStats, KernelStats, MemoryStats};
