//! Errors raised while reading a grammar or building parse tables.
//!
//! A grammar that is not LL(1) or not SLR(1) is an ordinary answer, reported
//! through `is_ll1` / `is_slr1`. [`TableError`] only shows up when a table
//! builder is asked for a table that cannot exist.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("Line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("the grammar has no rules")]
    Empty,

    #[error("expected {expected} rules, found {found}")]
    MissingRules { expected: usize, found: usize },

    #[error("the grammar must define the start symbol \"{0}\"")]
    MissingStartSymbol(String),
}

impl GrammarError {
    pub(crate) fn syntax(line: usize, message: impl Into<String>) -> Self {
        GrammarError::Syntax {
            line,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("not LL(1): {non_terminal} on \"{terminal}\" predicts both {first} and {second}")]
    LL1Collision {
        non_terminal: String,
        terminal: String,
        first: String,
        second: String,
    },

    #[error("not SLR(1): state {state} on \"{terminal}\" has both {first} and {second}")]
    SLR1Collision {
        state: usize,
        terminal: String,
        first: String,
        second: String,
    },
}
