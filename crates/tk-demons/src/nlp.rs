//! Shallow, regex-driven natural-language heuristics shared by `parse` and
//! the demons downstream of it.
//!
//! Every extractor here is intentionally an ordered table of
//! `(pattern, effect)` rather than anything resembling real NLP, so new
//! patterns can be slotted in without touching demon control flow. None of
//! it needs to be — or should be — smarter than the tutoring scenarios it's
//! built for.

use std::sync::OnceLock;

use regex::Regex;
use tk_domain::{Intent, Subject};

fn regex(slot: &OnceLock<Regex>, pattern: &str) -> &Regex {
    slot.get_or_init(|| Regex::new(pattern).expect("static pattern is valid"))
}

/// Lower-case, drop apostrophes (so `don't` folds to `dont` instead of
/// splitting in two), and replace every other non-alphanumeric character
/// with a space.
fn fold(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != '\'')
        .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c.to_ascii_lowercase() } else { ' ' })
        .collect()
}

fn tokens(raw: &str) -> Vec<String> {
    fold(raw).split_whitespace().map(|s| s.to_string()).collect()
}

/// Words dropped by [`extract_noun_phrases`]. Deliberately broad: function
/// words, pronouns, the question words `parse` already classifies
/// separately, and the relation-indicating verbs `learn` re-scans for
/// directly (so "photosynthesis produces oxygen" breaks into two noun
/// phrases instead of one three-word phrase).
const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "this", "that", "these", "those", "is", "are", "was", "were", "be", "been",
    "being", "am", "to", "of", "in", "on", "at", "for", "with", "about", "as", "by", "from", "into",
    "and", "or", "but", "so", "because", "if", "then", "than",
    "i", "you", "he", "she", "it", "we", "they", "me", "him", "her", "us", "them", "my", "your",
    "his", "its", "our", "their", "myself", "yourself",
    "what", "how", "why", "when", "where", "who", "which", "whom",
    "do", "does", "did", "dont", "doesnt", "didnt", "can", "cant", "could", "would", "will", "shall",
    "should", "may", "might", "must", "not", "no", "yes",
    "understand", "explain", "describe", "tell", "show", "give", "help", "teach", "learn", "know",
    "get", "mean", "means", "think", "want", "need", "please",
    "causes", "cause", "caused", "produces", "produce", "produced", "has", "have", "had", "contains",
    "contain", "contained", "requires", "require", "required", "needs", "equals", "equal", "leads",
    "lead", "results", "result", "part", "used", "use", "uses",
];

fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(&token.as_ref())
}

/// Lower-case, strip punctuation, drop stop-words and single characters,
/// then glue whatever survives into maximal contiguous runs. A run of
/// length one is exactly what the spec calls "a remaining atom" — this one
/// pass produces both.
pub fn extract_noun_phrases(raw: &str) -> Vec<String> {
    let mut phrases = Vec::new();
    let mut run: Vec<String> = Vec::new();

    let flush = |run: &mut Vec<String>, out: &mut Vec<String>| {
        if !run.is_empty() {
            let phrase = run.join(" ");
            if !out.contains(&phrase) {
                out.push(phrase);
            }
            run.clear();
        }
    };

    for token in tokens(raw) {
        let keep = !token.is_empty() && token.len() > 1 && !is_stop_word(&token);
        if keep {
            run.push(token);
        } else {
            flush(&mut run, &mut phrases);
        }
    }
    flush(&mut run, &mut phrases);
    phrases
}

fn starts_with_any(text: &str, words: &[&str]) -> bool {
    let first = text.split_whitespace().next().unwrap_or("");
    words.contains(&first)
}

/// Ordered regex heuristics: greeting -> question -> confusion ->
/// correction -> request -> claim (>2 tokens) -> unknown.
pub fn classify_intent(raw: &str) -> Intent {
    let folded = fold(raw);
    let trimmed = folded.trim();

    static GREETING: OnceLock<Regex> = OnceLock::new();
    if regex(&GREETING, r"^\s*(hi|hello|hey|howdy|greetings|yo|sup|good morning|good afternoon|good evening)\b").is_match(trimmed) {
        return Intent::Greeting;
    }

    let question_words = ["what", "how", "why", "when", "where", "who", "which", "is", "are", "does", "do", "can", "could", "would", "will"];
    if raw.trim_end().ends_with('?') || starts_with_any(trimmed, &question_words) {
        return Intent::Question;
    }

    static CONFUSION: OnceLock<Regex> = OnceLock::new();
    if regex(&CONFUSION, r"\b(confus\w*|lost|doesn'?t make sense|not clear|don'?t (get|understand)|dont (get|understand))\b").is_match(trimmed) {
        return Intent::Confusion;
    }

    static CORRECTION: OnceLock<Regex> = OnceLock::new();
    if regex(&CORRECTION, r"^\s*(actually|no,|no\s|wait,|that'?s (wrong|incorrect|not right)|you'?re wrong|incorrect)\b").is_match(trimmed) {
        return Intent::Correction;
    }

    let request_words = ["explain", "describe", "tell", "show", "give", "help", "teach", "define"];
    if starts_with_any(trimmed, &request_words) {
        return Intent::Request;
    }

    if trimmed.split_whitespace().count() > 2 {
        return Intent::Claim;
    }

    Intent::Unknown
}

/// First-matching-bucket-wins subject classification.
const SUBJECT_BUCKETS: &[(Subject, &[&str])] = &[
    (Subject::Mathematics, &["math", "mathematics", "algebra", "geometry", "calculus", "equation", "fraction", "theorem", "derivative", "integral"]),
    (Subject::Physics, &["physics", "force", "energy", "gravity", "velocity", "momentum", "quantum", "electricity", "circuit", "voltage", "current", "friction"]),
    (Subject::Chemistry, &["chemistry", "atom", "molecule", "reaction", "element", "compound", "acid", "base", "bond", "periodic"]),
    (Subject::Biology, &["biology", "cell", "dna", "gene", "organism", "evolution", "photosynthesis", "mitochondria", "species", "enzyme"]),
    (Subject::History, &["history", "war", "century", "revolution", "empire", "ancient", "dynasty", "treaty"]),
    (Subject::Language, &["grammar", "verb", "noun", "sentence", "vocabulary", "tense", "syntax", "pronoun", "adjective"]),
    (Subject::ComputerScience, &["algorithm", "code", "program", "computer", "software", "function", "variable", "loop", "array", "compiler"]),
    (Subject::Geography, &["geography", "continent", "country", "climate", "river", "mountain", "ocean", "terrain"]),
    (Subject::Economics, &["economy", "economics", "market", "supply", "demand", "inflation", "price", "trade", "gdp"]),
];

pub fn classify_subject(raw: &str) -> Subject {
    let token_set: Vec<String> = tokens(raw);
    for (subject, keywords) in SUBJECT_BUCKETS {
        if keywords.iter().any(|kw| token_set.iter().any(|t| t == kw)) {
            return *subject;
        }
    }
    Subject::General
}

/// Small pattern family for `question_focus`, tried in order; falls back to
/// the whole input when nothing matches.
pub fn extract_question_focus(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('?').trim();
    let folded = fold(trimmed);
    let folded = folded.trim();

    static WHAT_IS: OnceLock<Regex> = OnceLock::new();
    if let Some(caps) = regex(&WHAT_IS, r"^what\s+(?:is|are)\s+(?:an?\s+)?(.+)$").captures(folded) {
        return caps[1].trim().to_string();
    }

    static HOW_DOES: OnceLock<Regex> = OnceLock::new();
    if let Some(caps) = regex(&HOW_DOES, r"^how\s+does\s+(.+?)(?:\s+work)?$").captures(folded) {
        return caps[1].trim().to_string();
    }

    static WHY_IS: OnceLock<Regex> = OnceLock::new();
    if let Some(caps) = regex(&WHY_IS, r"^why\s+(?:is|are)\s+(.+)$").captures(folded) {
        return caps[1].trim().to_string();
    }

    static REQUEST: OnceLock<Regex> = OnceLock::new();
    if let Some(caps) = regex(&REQUEST, r"^(?:explain|describe|define|tell me about)\s+(.+)$").captures(folded) {
        return caps[1].trim().to_string();
    }

    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noun_phrases_drop_stop_words_and_single_chars() {
        let phrases = extract_noun_phrases("what is x?");
        assert!(phrases.is_empty());
    }

    #[test]
    fn noun_phrases_split_on_relation_verbs() {
        let phrases = extract_noun_phrases("photosynthesis produces oxygen");
        assert_eq!(phrases, vec!["photosynthesis".to_string(), "oxygen".to_string()]);
    }

    #[test]
    fn noun_phrases_drop_confusion_filler() {
        let phrases = extract_noun_phrases("I don't understand electricity");
        assert_eq!(phrases, vec!["electricity".to_string()]);
    }

    #[test]
    fn intent_greeting_beats_everything() {
        assert_eq!(classify_intent("hi"), Intent::Greeting);
    }

    #[test]
    fn intent_question_on_mark_or_leading_word() {
        assert_eq!(classify_intent("what is gravity?"), Intent::Question);
        assert_eq!(classify_intent("is a dog an animal?"), Intent::Question);
    }

    #[test]
    fn intent_confusion_detected() {
        assert_eq!(classify_intent("I don't understand electricity"), Intent::Confusion);
    }

    #[test]
    fn intent_claim_for_long_declarative() {
        assert_eq!(classify_intent("photosynthesis produces oxygen"), Intent::Claim);
    }

    #[test]
    fn subject_keyword_buckets() {
        assert_eq!(classify_subject("I don't understand electricity"), Subject::Physics);
        assert_eq!(classify_subject("photosynthesis produces oxygen"), Subject::Biology);
    }

    #[test]
    fn question_focus_what_is_pattern() {
        assert_eq!(extract_question_focus("what is gravity?"), "gravity");
        assert_eq!(extract_question_focus("what is x?"), "x");
    }
}
