pub mod hypervisor;
pub mod trace;

pub use hypervisor::Hypervisor;
pub use trace::{TickResult, TurnResult};
