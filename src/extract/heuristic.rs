//! Deterministic keyword scanner used when no model is available.
//!
//! Splits a transcript into sentences and keeps the ones that look like
//! something the speaker intends to do. Every list below is scanned in
//! order and the first hit wins, so the ordering is part of the behaviour.

use async_trait::async_trait;

use crate::domain::{CandidateTask, Priority};

use super::{ExtractionError, ExtractionStrategy};

/// Phrases signalling intent; the title is the text after the phrase
pub const INTENT_PHRASES: &[&str] = &[
    "need to",
    "have to",
    "must",
    "should",
    "going to",
    "gonna",
    "want to",
    "wanna",
    "don't forget",
    "remember to",
    "remind me to",
    "make sure to",
    "got to",
    "gotta",
];

/// Verbs that make a sentence actionable on their own
pub const ACTION_VERBS: &[&str] = &[
    "call", "email", "text", "message", "contact",
    "buy", "get", "pick up", "purchase",
    "finish", "complete", "do",
    "schedule", "book", "arrange",
    "send", "submit", "deliver",
    "fix", "repair", "update",
    "clean", "organize", "prepare",
    "review", "check", "verify",
    "meet", "visit", "attend",
    "pay", "transfer", "deposit",
    "write", "draft", "create",
];

pub const HIGH_PRIORITY_KEYWORDS: &[&str] = &[
    "urgent",
    "asap",
    "immediately",
    "critical",
    "important",
    "today",
    "now",
    "right away",
];

pub const LOW_PRIORITY_KEYWORDS: &[&str] = &[
    "eventually",
    "sometime",
    "when possible",
    "no rush",
    "later",
    "someday",
];

pub const DUE_DATE_KEYWORDS: &[&str] = &[
    "today",
    "tonight",
    "tomorrow",
    "tomorrow morning",
    "tomorrow afternoon",
    "tomorrow evening",
    "next week",
    "next month",
    "this week",
    "this weekend",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
    "by end of day",
    "by eod",
    "end of week",
    "end of month",
];

/// Leading filler stripped once from a title (case-sensitive)
const TITLE_PREFIXES: &[&str] = &["to ", "the ", "a ", "an "];

/// Titles this short or shorter are dropped
const MIN_TITLE_CHARS: usize = 3;

/// Keyword heuristic strategy
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicStrategy;

impl HeuristicStrategy {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ExtractionStrategy for HeuristicStrategy {
    fn name(&self) -> &str {
        "heuristic"
    }

    async fn extract(&self, transcript: &str) -> Result<Vec<CandidateTask>, ExtractionError> {
        Ok(extract_with_fallback(transcript))
    }
}

/// Scan a transcript for candidate tasks. Never fails; may return nothing.
pub fn extract_with_fallback(transcript: &str) -> Vec<CandidateTask> {
    split_sentences(transcript)
        .filter_map(candidate_from_sentence)
        .collect()
}

/// Sentences split on `.`, `!` and `?`, trimmed, empties dropped
pub fn split_sentences(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| matches!(c, '.' | '!' | '?'))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn candidate_from_sentence(sentence: &str) -> Option<CandidateTask> {
    let lowered = sentence.to_lowercase();

    let title = match intent_title(sentence) {
        Some(title) => title,
        None if has_action_verb(&lowered) => sentence.to_string(),
        None => return None,
    };

    let title = clean_title(&title)?;

    Some(CandidateTask::new(
        title,
        detect_priority(&lowered),
        detect_due_date_phrase(&lowered),
    ))
}

/// Title from the first matching intent phrase, or `None` when no phrase matches.
///
/// The remainder after the phrase becomes the title; an empty remainder
/// keeps the whole sentence.
fn intent_title(sentence: &str) -> Option<String> {
    INTENT_PHRASES.iter().find_map(|phrase| {
        let start = find_ignore_ascii_case(sentence, phrase)?;
        let rest = sentence[start + phrase.len()..].trim();
        Some(if rest.is_empty() {
            sentence.to_string()
        } else {
            capitalize_first(rest)
        })
    })
}

fn has_action_verb(lowered: &str) -> bool {
    ACTION_VERBS.iter().any(|verb| {
        lowered.starts_with(verb) || lowered.contains(&format!(" {} ", verb))
    })
}

/// High keywords are checked first and short-circuit the low list
pub fn detect_priority(lowered: &str) -> Priority {
    if HIGH_PRIORITY_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        Priority::High
    } else if LOW_PRIORITY_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        Priority::Low
    } else {
        Priority::Medium
    }
}

/// First due-date keyword present, title-cased ("Next Week")
pub fn detect_due_date_phrase(lowered: &str) -> Option<String> {
    DUE_DATE_KEYWORDS
        .iter()
        .find(|k| lowered.contains(*k))
        .map(|k| capitalize_words(k))
}

fn clean_title(title: &str) -> Option<String> {
    let trimmed = title.trim();
    let stripped = TITLE_PREFIXES
        .iter()
        .find_map(|prefix| trimmed.strip_prefix(prefix))
        .unwrap_or(trimmed)
        .trim();

    if stripped.chars().count() <= MIN_TITLE_CHARS {
        return None;
    }

    Some(capitalize_first(stripped))
}

/// Byte offset of an ASCII needle in `haystack`, ignoring ASCII case.
///
/// Matching on ASCII bytes keeps the offset on a char boundary of the
/// original text, so the text after the match can be sliced directly.
fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    let needle = needle.as_bytes();
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
}

/// Uppercase the first character, leave the rest alone
pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Uppercase the first letter of each word, lowercase the rest
pub fn capitalize_words(text: &str) -> String {
    text.split(' ')
        .map(|word| capitalize_first(&word.to_lowercase()))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(text: &str) -> Vec<String> {
        extract_with_fallback(text).into_iter().map(|t| t.title).collect()
    }

    #[test]
    fn test_intent_phrase_title_is_remainder() {
        let tasks = extract_with_fallback("I need to call the dentist tomorrow.");
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Call the dentist tomorrow");
        assert_eq!(tasks[0].due_date_phrase.as_deref(), Some("Tomorrow"));
        assert_eq!(tasks[0].priority, Priority::Medium);
        assert!(tasks[0].selected);
    }

    #[test]
    fn test_intent_phrase_order_first_match_wins() {
        // "need to" is listed before "remember to"
        assert_eq!(
            titles("Remember to tell Sam we need to renew the lease"),
            vec!["Renew the lease"]
        );
    }

    #[test]
    fn test_intent_phrase_with_empty_remainder_keeps_sentence() {
        assert_eq!(titles("Honestly we really must"), vec!["Honestly we really must"]);
    }

    #[test]
    fn test_action_verb_prefix_and_word() {
        assert_eq!(titles("call the bank about the card"), vec!["Call the bank about the card"]);
        // the verb must be followed by a space to count mid-sentence
        assert_eq!(titles("Tomorrow I will email"), Vec::<String>::new());
        assert_eq!(titles("Tomorrow I will email Priya the draft"), vec!["Tomorrow I will email Priya the draft"]);
    }

    #[test]
    fn test_no_intent_no_verb_yields_nothing() {
        assert!(extract_with_fallback("The weather was lovely. What a day!").is_empty());
        assert!(extract_with_fallback("").is_empty());
        assert!(extract_with_fallback(" . ! ? ").is_empty());
    }

    #[test]
    fn test_short_titles_are_discarded() {
        assert!(extract_with_fallback("Do.").is_empty());
        assert_eq!(titles("Call."), vec!["Call"]);
    }

    #[test]
    fn test_leading_article_stripped_once() {
        assert_eq!(titles("the plumber will fix the sink"), vec!["Plumber will fix the sink"]);
        assert_eq!(titles("a friend will call me back"), vec!["Friend will call me back"]);
        assert_eq!(titles("to the shop to buy bread"), vec!["The shop to buy bread"]);
    }

    #[test]
    fn test_capitalized_article_is_not_stripped() {
        // The remainder is capitalised before cleaning, so "the " no longer matches
        assert_eq!(titles("I'm going to the gym"), vec!["The gym"]);
    }

    #[test]
    fn test_priority_high_beats_low() {
        assert_eq!(detect_priority("urgent but eventually"), Priority::High);
        assert_eq!(detect_priority("no rush on this"), Priority::Low);
        assert_eq!(detect_priority("plain sentence"), Priority::Medium);
    }

    #[test]
    fn test_due_date_phrase_first_in_list_order() {
        // "tomorrow" precedes "tomorrow morning" in the keyword list
        assert_eq!(detect_due_date_phrase("see you tomorrow morning"), Some("Tomorrow".to_string()));
        assert_eq!(detect_due_date_phrase("finish it by eod"), Some("By Eod".to_string()));
        assert_eq!(detect_due_date_phrase("by end of month"), Some("End Of Month".to_string()));
        assert_eq!(detect_due_date_phrase("no date here"), None);
    }

    #[test]
    fn test_sentences_keep_order() {
        let tasks = extract_with_fallback(
            "Need to buy milk! The cat is asleep. Remind me to pay rent today? Gotta book flights next month.",
        );
        let titles: Vec<_> = tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Buy milk", "Pay rent today", "Book flights next month"]);
        assert_eq!(tasks[1].priority, Priority::High);
        assert_eq!(tasks[1].due_date_phrase.as_deref(), Some("Today"));
        assert_eq!(tasks[2].due_date_phrase.as_deref(), Some("Next Month"));
    }

    #[test]
    fn test_non_ascii_text_is_sliced_safely() {
        assert_eq!(titles("Ça va, I need to réserver la salle"), vec!["Réserver la salle"]);
    }

    #[test]
    fn test_capitalize_helpers() {
        assert_eq!(capitalize_first("élan"), "Élan");
        assert_eq!(capitalize_first(""), "");
        assert_eq!(capitalize_words("tomorrow afternoon"), "Tomorrow Afternoon");
    }
}
