//! `question` — the terminal demon. Every chain ends here: it reads
//! whatever upstream demons left in working memory and picks exactly one
//! response template, in a fixed first-match order.

use tk_domain::relation::RelationType;
use tk_domain::slot::{AnalogyFact, ClaimAssessmentFact, ContradictionFact, RelationFact, Slot, SlotContent, SlotTag};
use tk_domain::{Intent, Subject};
use tk_graph::GraphStore;
use tk_memory::MemoryView;

use crate::traits::{Action, Demon, DemonOutput, Trigger};

pub struct Question;

const ID: &str = "question";

const GENERAL_GREETINGS: &[&str] = &[
    "Hi! What would you like to learn today?",
    "Hello! What's on your mind?",
    "Hey there — ask me anything you're curious about.",
    "Hi! What are you studying today?",
];

fn greeting_response(subject: Subject, tick: u64) -> String {
    if subject == Subject::General {
        GENERAL_GREETINGS[(tick as usize) % GENERAL_GREETINGS.len()].to_string()
    } else {
        format!("Hey there! Ready to dig into some {subject}?")
    }
}

fn intent_of(view: &MemoryView) -> Option<Intent> {
    view.latest_by_tag(SlotTag::Intent).and_then(|s| match &s.content {
        SlotContent::Intent { intent } => Some(*intent),
        _ => None,
    })
}

fn subject_of(view: &MemoryView) -> Subject {
    view.latest_by_tag(SlotTag::Subject)
        .and_then(|s| match &s.content {
            SlotContent::Subject { subject } => Some(*subject),
            _ => None,
        })
        .unwrap_or_default()
}

fn focus_of(view: &MemoryView) -> Option<String> {
    view.latest_by_tag(SlotTag::QuestionFocus).and_then(|s| match &s.content {
        SlotContent::QuestionFocus { focus } => Some(focus.clone()),
        _ => None,
    })
}

fn first_analogy(view: &MemoryView) -> Option<AnalogyFact> {
    view.find_by_tag(SlotTag::Analogy).into_iter().find_map(|s| match &s.content {
        SlotContent::Analogy(fact) => Some(fact.clone()),
        _ => None,
    })
}

fn first_contradiction(view: &MemoryView) -> Option<ContradictionFact> {
    view.find_by_tag(SlotTag::Contradiction).into_iter().find_map(|s| match &s.content {
        SlotContent::Contradiction(fact) => Some(fact.clone()),
        _ => None,
    })
}

fn first_relation(view: &MemoryView) -> Option<RelationFact> {
    view.find_by_tag(SlotTag::Relation).into_iter().find_map(|s| match &s.content {
        SlotContent::Relation(fact) => Some(fact.clone()),
        _ => None,
    })
}

fn decomposition_parts(view: &MemoryView) -> Vec<String> {
    view.find_by_tag(SlotTag::Decomposition)
        .into_iter()
        .find_map(|s| match &s.content {
            SlotContent::Decomposition(fact) => Some(fact.parts.clone()),
            _ => None,
        })
        .unwrap_or_default()
}

fn knowledge_gaps(view: &MemoryView) -> Vec<String> {
    view.latest_by_tag(SlotTag::KnowledgeGaps)
        .and_then(|s| match &s.content {
            SlotContent::KnowledgeGaps { gaps } => Some(gaps.clone()),
            _ => None,
        })
        .unwrap_or_default()
}

fn unknown_concepts(view: &MemoryView) -> Vec<String> {
    view.latest_by_tag(SlotTag::UnknownConcepts)
        .and_then(|s| match &s.content {
            SlotContent::UnknownConcepts { labels } => Some(labels.clone()),
            _ => None,
        })
        .unwrap_or_default()
}

fn examples(view: &MemoryView) -> Vec<String> {
    view.latest_by_tag(SlotTag::Examples)
        .and_then(|s| match &s.content {
            SlotContent::Examples { items } => Some(items.clone()),
            _ => None,
        })
        .unwrap_or_default()
}

fn claim_assessment(view: &MemoryView) -> Option<ClaimAssessmentFact> {
    view.latest_by_tag(SlotTag::ClaimAssessment).and_then(|s| match &s.content {
        SlotContent::ClaimAssessment(fact) => Some(fact.clone()),
        _ => None,
    })
}

fn relation_question(fact: &RelationFact) -> String {
    match fact.kind {
        RelationType::Causes => format!("You mentioned {} causes {}. What other effects might that have?", fact.from, fact.to),
        RelationType::IsA => format!("What else do you know about {} as a category, beyond {} belonging to it?", fact.to, fact.from),
        RelationType::Has | RelationType::Contains => format!("What other parts or components might {} have, besides {}?", fact.from, fact.to),
        RelationType::Requires => format!("What do you think you need to know before tackling {}, beyond {}?", fact.from, fact.to),
        RelationType::Opposes => format!("What do you think is the opposite of {}, beyond {}?", fact.from, fact.to),
        _ => format!("How do you think {} relates to {}?", fact.from, fact.to),
    }
}

fn hint(parts: &[String]) -> String {
    if parts.is_empty() {
        String::new()
    } else {
        format!(" (hint: {})", parts.iter().take(3).cloned().collect::<Vec<_>>().join(", "))
    }
}

impl Demon for Question {
    fn id(&self) -> &'static str {
        ID
    }

    fn name(&self) -> &'static str {
        "Question"
    }

    fn description(&self) -> &'static str {
        "Terminal demon: picks a response template from the first matching condition and replies."
    }

    fn triggers(&self) -> &'static [Trigger] {
        &[
            Trigger::ChainFrom("parse"),
            Trigger::ChainFrom("relate"),
            Trigger::ChainFrom("infer"),
            Trigger::ChainFrom("decompose"),
            Trigger::ChainFrom("analogize"),
        ]
    }

    fn run(&self, view: &MemoryView, _graph: &GraphStore) -> DemonOutput {
        let intent = intent_of(view);
        let subject = subject_of(view);
        let focus = focus_of(view).unwrap_or_else(|| "this".to_string());

        let text = if intent == Some(Intent::Greeting) {
            greeting_response(subject, view.tick)
        } else if let Some(contradiction) = first_contradiction(view) {
            format!("{}. Which one is correct?", contradiction.reason)
        } else if intent == Some(Intent::Confusion) || view.has_tag(SlotTag::SimplificationNeeded) {
            let mut response = "Let's break this down.".to_string();
            if let Some(analogy) = first_analogy(view) {
                let explanation = analogy.explanation.unwrap_or_else(|| format!("Think of it like {}.", analogy.analog));
                response.push(' ');
                response.push_str(&explanation);
            }
            let parts = decomposition_parts(view);
            if let Some(first_part) = parts.first() {
                response.push_str(&format!(" Let's start with {first_part} — what do you already know about it?"));
            }
            response
        } else if intent == Some(Intent::Claim) && claim_assessment(view).is_some() {
            let assessment = claim_assessment(view).unwrap();
            if assessment.confidence > 0.7 {
                let mut response = "That's right!".to_string();
                if let Some(inferred) = view.latest_by_tag(SlotTag::InferredRelation).and_then(|s| match &s.content {
                    SlotContent::InferredRelation(fact) => Some(fact.clone()),
                    _ => None,
                }) {
                    response.push_str(&format!(" Did you know that also means {} {} {}?", inferred.from, inferred.kind, inferred.to));
                }
                response
            } else if assessment.confidence < 0.3 {
                match assessment.unsupported.first() {
                    Some(concept) => format!("I'm not sure that's quite right — can you tell me more about {concept}?"),
                    None => "I'm not sure that's quite right — can you tell me more?".to_string(),
                }
            } else {
                "You're on the right track. Can you give me a specific example?".to_string()
            }
        } else if matches!(intent, Some(Intent::Question) | Some(Intent::Request)) {
            let gaps = knowledge_gaps(view);
            if let Some(gap) = gaps.first() {
                format!("Before we get to {focus}, let's make sure you know {gap}. What do you know about it?")
            } else if unknown_concepts(view).contains(&focus) {
                let mut response = format!("I don't have {focus} in my notes yet, so let's build it up together.");
                if let Some(analogy) = first_analogy(view) {
                    if let Some(explanation) = analogy.explanation {
                        response.push(' ');
                        response.push_str(&explanation);
                    }
                }
                if let Some(step) = heuristic_first_step(subject) {
                    response.push_str(&format!(" One way to start: {step}."));
                }
                response.push_str(" What do you already know about it?");
                response
            } else if let Some(fact) = first_relation(view) {
                format!("{}{}", relation_question(&fact), hint(&decomposition_parts(view)))
            } else if let Some(analogy) = first_analogy(view) {
                let explanation = analogy.explanation.unwrap_or_else(|| format!("it's a bit like {}", analogy.analog));
                format!("{explanation} Does that help explain {focus}?")
            } else if let Some(example) = examples(view).first() {
                format!("For example, {example}. Can you think of another case like {focus}?")
            } else {
                format!("What's your best guess about {focus}?")
            }
        } else if intent == Some(Intent::Correction) {
            "Thanks for the correction! What was wrong, and why do you think so?".to_string()
        } else {
            format!("Let's explore {focus}...")
        };

        let response_slot = Slot::new(ID, SlotTag::Response, SlotContent::Response { text: text.clone() }, 0.9, 20);

        DemonOutput { write: vec![response_slot], evict: Vec::new(), focus: None, actions: vec![Action::Respond(text)], chain: Vec::new() }
    }
}

fn heuristic_first_step(subject: Subject) -> Option<&'static str> {
    crate::decompose::heuristic_steps(subject).first().copied()
}
