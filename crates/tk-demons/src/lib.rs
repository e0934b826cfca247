pub mod analogize;
pub mod decompose;
pub mod infer;
pub mod learn;
pub mod nlp;
pub mod parse;
pub mod question;
pub mod relate;
pub mod registry;
pub mod traits;

pub use registry::{all, by_id};
pub use traits::{Action, Demon, DemonOutput, Trigger};
