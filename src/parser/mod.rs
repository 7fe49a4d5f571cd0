//! Table-driven parsers over the tables built in [`crate::grammar`].
//!
//! Both parsers only read their grammar and tables; all mutable state (stack
//! and cursor) lives inside one call, so a parser can be shared freely.

pub mod ll1;
pub mod slr1;

pub use ll1::LL1Parser;
pub use slr1::SLR1Parser;

use serde::Serialize;

use crate::grammar::{END_MARK, END_MARK_IDX};
use crate::Grammar;

/// Splits an input string into tokens: on whitespace when it contains any,
/// otherwise one token per character.
pub fn tokenize(input: &str) -> Vec<&str> {
    if input.chars().any(char::is_whitespace) {
        input.split_whitespace().collect()
    } else {
        input
            .char_indices()
            .map(|(i, c)| &input[i..i + c.len_utf8()])
            .collect()
    }
}

/// Resolves tokens to terminal indices and appends the end marker. Tokens
/// that are not terminals of the grammar (the end marker included) become
/// `None`, which no table entry matches.
fn resolve(g: &Grammar, tokens: &[&str]) -> Vec<Option<usize>> {
    tokens
        .iter()
        .map(|t| {
            g.get_symbol_index(t)
                .filter(|&i| g.is_terminal(i) && i != END_MARK_IDX)
        })
        .chain(std::iter::once(Some(END_MARK_IDX)))
        .collect()
}

fn remaining(tokens: &[&str], position: usize) -> String {
    tokens
        .iter()
        .skip(position)
        .cloned()
        .chain(std::iter::once(END_MARK))
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StepAction {
    Match(String),
    Produce { left: String, right: Vec<String> },
    Shift(usize),
    Reduce { left: String, right: Vec<String> },
    Accept,
    Error,
}

/// One row of a parse trace: the stack (bottom first), the unread input and
/// what the parser did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceStep {
    pub stack: String,
    pub input: String,
    pub action: StepAction,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseTrace {
    pub accepted: bool,
    pub steps: Vec<TraceStep>,
}

impl ParseTrace {
    fn record(&mut self, stack: String, input: String, action: StepAction) {
        log::trace!("{:<30} {:<20} {:?}", stack, input, action);
        self.steps.push(TraceStep {
            stack,
            input,
            action,
        });
    }

    fn finish(mut self, accepted: bool) -> Self {
        self.accepted = accepted;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_by_character_or_whitespace() {
        assert_eq!(tokenize("i+i"), vec!["i", "+", "i"]);
        assert_eq!(tokenize("id + id"), vec!["id", "+", "id"]);
        assert_eq!(tokenize("aϵb"), vec!["a", "ϵ", "b"]);
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn unknown_tokens_and_end_mark_do_not_resolve() {
        let g = Grammar::parse("S -> a S | b").unwrap();
        let resolved = resolve(&g, &["a", "x", "$", "S", "b"]);
        let a = g.get_symbol_index("a");
        let b = g.get_symbol_index("b");
        assert_eq!(resolved, vec![a, None, None, None, b, Some(END_MARK_IDX)]);
    }
}
