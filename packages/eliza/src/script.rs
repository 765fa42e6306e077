//! The declarative rule grammar the engine runs over.
//!
//! A [`Script`] is plain data: keyword table, decomposition patterns,
//! reassembly templates, reflections and synonyms. It is deserialized once
//! at startup and never mutated while a conversation is running. The
//! default grammar ships embedded in the crate.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// The embedded default grammar.
const BUILTIN_SCRIPT: &str = include_str!("script.json");

/// Result type for script loading
pub type ScriptResult<T> = Result<T, ScriptError>;

/// Script loading and validation errors
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Script parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid script: {0}")]
    Invalid(String),
}

/// A decomposition pattern with its reassembly templates.
///
/// Patterns are word sequences where `*` matches any run of words
/// (including none). Each `*` is a capture group; templates reference
/// them as `$1`, `$2`, ... in left-to-right order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecompRule {
    pub pattern: String,
    pub reassembly: Vec<String>,
}

/// A trigger word with its priority rank and ordered decomposition rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Keyword {
    pub word: String,
    pub rank: i32,
    pub rules: Vec<DecompRule>,
}

/// The complete, versioned rule grammar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Script {
    pub version: String,
    /// Opening line shown when the chat widget mounts.
    pub initial: String,
    pub quit_phrases: Vec<String>,
    pub quit_responses: Vec<String>,
    pub empty_prompts: Vec<String>,
    pub repeat_responses: Vec<String>,
    pub fallbacks: Vec<String>,
    pub reflections: HashMap<String, String>,
    pub synonyms: HashMap<String, Vec<String>>,
    pub keywords: Vec<Keyword>,
}

impl Script {
    /// Load the embedded default grammar.
    pub fn builtin() -> ScriptResult<Self> {
        Self::from_json(BUILTIN_SCRIPT)
    }

    /// Load a grammar from a JSON document.
    pub fn from_json(json: &str) -> ScriptResult<Self> {
        let script: Script = serde_json::from_str(json)?;
        script.validate()?;
        Ok(script)
    }

    /// Reject grammars that could leave the engine without a response.
    fn validate(&self) -> ScriptResult<()> {
        if self.fallbacks.is_empty() {
            return Err(ScriptError::Invalid("fallbacks must not be empty".into()));
        }
        if self.empty_prompts.is_empty() {
            return Err(ScriptError::Invalid(
                "empty_prompts must not be empty".into(),
            ));
        }
        if self.quit_responses.is_empty() {
            return Err(ScriptError::Invalid(
                "quit_responses must not be empty".into(),
            ));
        }
        if self.repeat_responses.is_empty() {
            return Err(ScriptError::Invalid(
                "repeat_responses must not be empty".into(),
            ));
        }
        for keyword in &self.keywords {
            if keyword.rules.is_empty() {
                return Err(ScriptError::Invalid(format!(
                    "keyword '{}' has no decomposition rules",
                    keyword.word
                )));
            }
            for rule in &keyword.rules {
                if rule.reassembly.is_empty() {
                    return Err(ScriptError::Invalid(format!(
                        "rule '{}' under keyword '{}' has no reassembly templates",
                        rule.pattern, keyword.word
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_script_loads() {
        let script = Script::builtin().unwrap();
        assert!(!script.version.is_empty());
        assert!(!script.keywords.is_empty());
        assert!(script.reflections.contains_key("i"));
    }

    #[test]
    fn test_empty_fallbacks_rejected() {
        let mut script = Script::builtin().unwrap();
        script.fallbacks.clear();
        let json = serde_json::to_string(&script).unwrap();
        assert!(Script::from_json(&json).is_err());
    }

    #[test]
    fn test_rule_without_reassembly_rejected() {
        let mut script = Script::builtin().unwrap();
        script.keywords[0].rules[0].reassembly.clear();
        let json = serde_json::to_string(&script).unwrap();
        assert!(Script::from_json(&json).is_err());
    }
}
