//! `parse` — the turn's entry point. Classifies the raw input and breaks it
//! into the slots every other demon reads from.

use tk_domain::slot::{Slot, SlotContent, SlotTag};
use tk_graph::GraphStore;
use tk_memory::MemoryView;

use crate::nlp::{classify_intent, classify_subject, extract_noun_phrases, extract_question_focus};
use crate::traits::{Demon, DemonOutput, Trigger};

pub struct Parse;

const ID: &str = "parse";

impl Demon for Parse {
    fn id(&self) -> &'static str {
        ID
    }

    fn name(&self) -> &'static str {
        "Parse"
    }

    fn description(&self) -> &'static str {
        "Classifies raw input into intent, subject, noun phrases, and question focus."
    }

    fn triggers(&self) -> &'static [Trigger] {
        &[Trigger::NewInput]
    }

    fn run(&self, view: &MemoryView, _graph: &GraphStore) -> DemonOutput {
        let Some(raw) = view.latest_by_tag(SlotTag::RawInput) else {
            return DemonOutput::empty();
        };
        let text = match &raw.content {
            SlotContent::RawInput { text } => text.clone(),
            _ => return DemonOutput::empty(),
        };

        let intent = classify_intent(&text);
        let subject = classify_subject(&text);
        let noun_phrases = extract_noun_phrases(&text);

        let mut write = Vec::new();
        write.push(Slot::new(ID, SlotTag::Intent, SlotContent::Intent { intent }, 1.0, 0));
        write.push(Slot::new(ID, SlotTag::Subject, SlotContent::Subject { subject }, 1.0, 0));
        for phrase in &noun_phrases {
            write.push(Slot::new(ID, SlotTag::NounPhrase, SlotContent::NounPhrase { phrase: phrase.clone() }, 0.8, 10));
        }

        use tk_domain::Intent as I;
        if matches!(intent, I::Question | I::Request) {
            let focus = extract_question_focus(&text);
            write.push(Slot::new(ID, SlotTag::QuestionFocus, SlotContent::QuestionFocus { focus }, 0.8, 0));
        }

        let chain = match intent {
            I::Question | I::Request => vec!["relate", "infer", "question"],
            I::Claim => vec!["relate", "infer", "decompose"],
            I::Confusion => vec!["decompose", "analogize", "question"],
            I::Correction => vec!["relate", "infer"],
            I::Greeting => vec!["question"],
            I::Unknown => vec!["relate", "question"],
        };

        DemonOutput {
            write,
            evict: Vec::new(),
            focus: None,
            actions: Vec::new(),
            chain: chain.into_iter().map(String::from).collect(),
        }
    }
}
