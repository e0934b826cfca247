pub mod journal;
pub mod pattern;
pub mod store;

pub use pattern::{GraphStats, NounPattern, QueryPattern, Triple, TraverseNode, TraverseResult};
pub use store::GraphStore;
