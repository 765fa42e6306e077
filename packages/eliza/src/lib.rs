//! Conversational fallback engine for the Telcome chat widget.
//!
//! When the remote bot endpoint is unreachable the chat widget answers
//! locally with this engine: a classic pattern-transformation responder
//! driven by a declarative, versioned rule grammar (keywords with ranked
//! decomposition patterns, reassembly templates, pronoun reflections and
//! synonym tables). The grammar is data, the engine is pure functions over
//! it, and `respond` can never fail — it is itself the error path.

pub mod engine;
pub mod script;

pub use engine::Eliza;
pub use script::{DecompRule, Keyword, Script, ScriptError, ScriptResult};
