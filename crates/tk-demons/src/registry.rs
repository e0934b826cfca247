//! Static registry of the seven demons, keyed by id. The orchestrator
//! drives everything through this lookup — it never constructs a demon
//! itself.

use crate::analogize::Analogize;
use crate::decompose::Decompose;
use crate::infer::Infer;
use crate::learn::Learn;
use crate::parse::Parse;
use crate::question::Question;
use crate::relate::Relate;
use crate::traits::Demon;

static PARSE: Parse = Parse;
static RELATE: Relate = Relate;
static INFER: Infer = Infer;
static DECOMPOSE: Decompose = Decompose;
static ANALOGIZE: Analogize = Analogize;
static QUESTION: Question = Question;
static LEARN: Learn = Learn;

/// All seven demons, in the fixed order they're introduced in the reasoning
/// pipeline. Used both for dispatch-by-id and for `list_demons()`.
pub fn all() -> Vec<&'static dyn Demon> {
    vec![&PARSE, &RELATE, &INFER, &DECOMPOSE, &ANALOGIZE, &QUESTION, &LEARN]
}

pub fn by_id(id: &str) -> Option<&'static dyn Demon> {
    all().into_iter().find(|d| d.id() == id)
}
