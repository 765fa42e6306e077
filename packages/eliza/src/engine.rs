//! The pattern-transformation engine.
//!
//! Pure, synchronous, and infallible once constructed: `respond` always
//! returns a non-empty string, because this engine *is* the error-recovery
//! path for the remote bot.

use std::collections::HashMap;
use tracing::debug;

use crate::script::{Script, ScriptResult};

/// One parsed decomposition pattern token.
#[derive(Debug, Clone, PartialEq)]
enum PatToken {
    /// `*` — matches any run of words, including none. Each wildcard is a
    /// capture group, numbered left to right from 1.
    Wildcard,
    Literal(String),
}

/// A conversational fallback responder.
///
/// Holds the immutable [`Script`] plus per-conversation state: the input
/// history (for repetition detection) and round-robin cursors so repeated
/// triggers of the same rule cycle through reassembly variants instead of
/// repeating verbatim.
pub struct Eliza {
    script: Script,
    history: Vec<String>,
    /// keyword index, rule index -> next reassembly template to use
    rule_cursors: HashMap<(usize, usize), usize>,
    quit_cursor: usize,
    empty_cursor: usize,
    repeat_cursor: usize,
    fallback_cursor: usize,
    /// lowercase trigger token or phrase -> keyword index
    triggers: HashMap<String, usize>,
}

impl Eliza {
    /// Engine over the embedded default grammar.
    pub fn new() -> ScriptResult<Self> {
        Ok(Self::with_script(Script::builtin()?))
    }

    /// Engine over an explicit grammar.
    pub fn with_script(script: Script) -> Self {
        let mut triggers = HashMap::new();
        for (idx, keyword) in script.keywords.iter().enumerate() {
            triggers.insert(keyword.word.trim().to_lowercase(), idx);
            if let Some(words) = script.synonyms.get(&keyword.word) {
                for synonym in words {
                    triggers.insert(synonym.trim().to_lowercase(), idx);
                }
            }
        }
        Self {
            script,
            history: Vec::new(),
            rule_cursors: HashMap::new(),
            quit_cursor: 0,
            empty_cursor: 0,
            repeat_cursor: 0,
            fallback_cursor: 0,
            triggers,
        }
    }

    /// Opening line for a freshly mounted chat widget.
    pub fn greeting(&self) -> &str {
        &self.script.initial
    }

    /// Grammar version in use.
    pub fn script_version(&self) -> &str {
        &self.script.version
    }

    /// Produce a response to one user utterance. Never empty.
    pub fn respond(&mut self, input: &str) -> String {
        let normalized = normalize(input);
        let response = self.produce(&normalized);
        self.history.push(input.to_string());
        response
    }

    fn produce(&mut self, normalized: &str) -> String {
        if normalized.is_empty() {
            return cycle(&self.script.empty_prompts, &mut self.empty_cursor);
        }

        if self.script.quit_phrases.iter().any(|q| q == normalized) {
            return cycle(&self.script.quit_responses, &mut self.quit_cursor);
        }

        if let Some(previous) = self.history.last() {
            if normalize(previous) == normalized {
                return cycle(&self.script.repeat_responses, &mut self.repeat_cursor);
            }
        }

        // Keyword scan runs over the raw tokens; decomposition runs over
        // the reflected input so the grammar reads from one point of view.
        let key_stack = self.matched_keywords(normalized);
        let reflected = self.reflect(normalized);
        let reflected_words: Vec<&str> = reflected.split_whitespace().collect();

        for keyword_idx in key_stack {
            let keyword = &self.script.keywords[keyword_idx];
            for (rule_idx, rule) in keyword.rules.iter().enumerate() {
                let pattern = parse_pattern(&rule.pattern);
                if let Some(captures) = match_words(&pattern, &reflected_words) {
                    debug!(
                        keyword = %keyword.word,
                        pattern = %rule.pattern,
                        "decomposition rule fired"
                    );
                    let cursor = self
                        .rule_cursors
                        .entry((keyword_idx, rule_idx))
                        .or_insert(0);
                    let template = cycle(&rule.reassembly, cursor);
                    return substitute(&template, &captures);
                }
            }
        }

        cycle(&self.script.fallbacks, &mut self.fallback_cursor)
    }

    /// All matched keyword indices, highest rank first. Rank ties keep the
    /// grammar's declaration order.
    fn matched_keywords(&self, normalized: &str) -> Vec<usize> {
        let mut matched: Vec<usize> = Vec::new();
        for token in normalized.split_whitespace() {
            if let Some(&idx) = self.triggers.get(token) {
                if !matched.contains(&idx) {
                    matched.push(idx);
                }
            }
        }
        // Phrase triggers match as whole-word substrings.
        let padded = format!(" {normalized} ");
        for (trigger, &idx) in &self.triggers {
            if trigger.contains(' ')
                && padded.contains(&format!(" {trigger} "))
                && !matched.contains(&idx)
            {
                matched.push(idx);
            }
        }
        matched.sort_by_key(|&idx| (-self.script.keywords[idx].rank, idx));
        matched
    }

    /// Swap first/second-person forms word by word.
    fn reflect(&self, normalized: &str) -> String {
        normalized
            .split_whitespace()
            .map(|word| {
                self.script
                    .reflections
                    .get(word)
                    .map(String::as_str)
                    .unwrap_or(word)
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Lowercase, drop punctuation (apostrophes survive so contractions keep
/// their reflected forms), collapse whitespace.
fn normalize(input: &str) -> String {
    input
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '\'' {
                c
            } else {
                ' '
            }
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_pattern(pattern: &str) -> Vec<PatToken> {
    pattern
        .split_whitespace()
        .map(|token| {
            if token == "*" {
                PatToken::Wildcard
            } else {
                PatToken::Literal(token.to_lowercase())
            }
        })
        .collect()
}

/// Structural match of a pattern against a word sequence. Wildcards prefer
/// the shortest capture; an empty capture is a valid match.
fn match_words(pattern: &[PatToken], words: &[&str]) -> Option<Vec<String>> {
    let Some((first, rest)) = pattern.split_first() else {
        return words.is_empty().then(Vec::new);
    };
    match first {
        PatToken::Literal(lit) => {
            let (word, tail) = words.split_first()?;
            if word == lit {
                match_words(rest, tail)
            } else {
                None
            }
        }
        PatToken::Wildcard => {
            for take in 0..=words.len() {
                if let Some(mut captures) = match_words(rest, &words[take..]) {
                    captures.insert(0, words[..take].join(" "));
                    return Some(captures);
                }
            }
            None
        }
    }
}

/// Fill `$n` slots in a template. Out-of-range or empty groups substitute
/// the empty string.
fn substitute(template: &str, captures: &[String]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }
        let mut digits = String::new();
        while let Some(d) = chars.peek().filter(|d| d.is_ascii_digit()) {
            digits.push(*d);
            chars.next();
        }
        if digits.is_empty() {
            result.push('$');
        } else if let Ok(n) = digits.parse::<usize>() {
            if let Some(capture) = n.checked_sub(1).and_then(|i| captures.get(i)) {
                result.push_str(capture);
            }
        }
    }
    result
}

/// Pick the next entry round-robin, wrapping when the cycle is exhausted.
fn cycle(entries: &[String], cursor: &mut usize) -> String {
    // Script validation guarantees every cycled list is non-empty.
    let entry = entries[*cursor % entries.len()].clone();
    *cursor = (*cursor + 1) % entries.len();
    entry
}
