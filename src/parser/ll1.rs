use crate::grammar::ll1_parsing_table::LL1Table;
use crate::grammar::{END_MARK_IDX, EPSILON_IDX};
use crate::Grammar;

use super::{remaining, resolve, ParseTrace, StepAction};

/// Predictive parser. The stack starts as `$ S`, or just `$` when the start
/// symbol is epsilon. Each step matches a terminal, expands the nonterminal
/// on top with its table entry, accepts on `$` against `$`, or rejects.
#[derive(Debug, Clone, Copy)]
pub struct LL1Parser<'a> {
    grammar: &'a Grammar,
    table: &'a LL1Table,
}

impl<'a> LL1Parser<'a> {
    pub fn new(grammar: &'a Grammar, table: &'a LL1Table) -> Self {
        Self { grammar, table }
    }

    pub fn parse(&self, tokens: &[&str]) -> bool {
        self.parse_with_trace(tokens).accepted
    }

    pub fn parse_with_trace(&self, tokens: &[&str]) -> ParseTrace {
        let g = self.grammar;
        let input = resolve(g, tokens);
        let mut trace = ParseTrace::default();

        let mut stack: Vec<usize> = vec![END_MARK_IDX];
        if g.start_symbol != EPSILON_IDX {
            stack.push(g.start_symbol);
        }
        let mut position = 0;

        while let Some(&top) = stack.last() {
            let current = input.get(position).cloned().flatten();
            let stack_str = g.production_to_vec_str(&stack).join(" ");
            let input_str = remaining(tokens, position);

            if current == Some(top) {
                if top == END_MARK_IDX {
                    trace.record(stack_str, input_str, StepAction::Accept);
                    return trace.finish(true);
                }
                stack.pop();
                position += 1;
                trace.record(
                    stack_str,
                    input_str,
                    StepAction::Match(g.get_symbol_name(top).to_string()),
                );
                continue;
            }

            let production = current
                .filter(|_| g.is_non_terminal(top))
                .and_then(|a| self.table.get(top, a));
            match production {
                Some(p) => {
                    stack.pop();
                    let body = g.production(top, p);
                    stack.extend(body.iter().rev().filter(|&&s| s != EPSILON_IDX));
                    trace.record(
                        stack_str,
                        input_str,
                        StepAction::Produce {
                            left: g.get_symbol_name(top).to_string(),
                            right: g
                                .production_to_vec_str(body)
                                .iter()
                                .map(|s| s.to_string())
                                .collect(),
                        },
                    );
                }
                None => {
                    trace.record(stack_str, input_str, StepAction::Error);
                    return trace.finish(false);
                }
            }
        }

        trace.finish(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::nullable_first_follow::{FirstSets, FollowSets};
    use crate::parser::tokenize;

    fn table(g: &Grammar) -> LL1Table {
        let first = FirstSets::compute(g);
        let follow = FollowSets::compute(g, &first);
        g.build_ll1_table(&first, &follow).unwrap()
    }

    #[test]
    fn accepts_and_rejects() {
        let g = Grammar::from_text("3\nS -> AB\nA -> aA | e\nB -> b").unwrap();
        let table = table(&g);
        let parser = LL1Parser::new(&g, &table);
        assert!(parser.parse(&tokenize("ab")));
        assert!(parser.parse(&tokenize("b")));
        assert!(parser.parse(&tokenize("aaab")));
        assert!(!parser.parse(&tokenize("ba")));
        assert!(!parser.parse(&tokenize("")));
        assert!(!parser.parse(&tokenize("abb")));
    }

    #[test]
    fn trace_shows_each_step() {
        let g = Grammar::from_text("3\nS -> AB\nA -> aA | e\nB -> b").unwrap();
        let table = table(&g);
        let trace = LL1Parser::new(&g, &table).parse_with_trace(&["b"]);
        assert!(trace.accepted);
        let actions: Vec<_> = trace.steps.iter().map(|s| s.action.clone()).collect();
        assert_eq!(
            actions,
            vec![
                StepAction::Produce {
                    left: "S".to_string(),
                    right: vec!["A".to_string(), "B".to_string()]
                },
                StepAction::Produce {
                    left: "A".to_string(),
                    right: vec!["ϵ".to_string()]
                },
                StepAction::Produce {
                    left: "B".to_string(),
                    right: vec!["b".to_string()]
                },
                StepAction::Match("b".to_string()),
                StepAction::Accept,
            ]
        );
        assert_eq!(trace.steps[0].stack, "$ S");
        assert_eq!(trace.steps[0].input, "b $");
    }

    #[test]
    fn grammar_without_rules_accepts_only_empty_input() {
        let g = Grammar::new();
        let table = table(&g);
        let parser = LL1Parser::new(&g, &table);
        assert!(parser.parse(&[]));
        assert!(!parser.parse(&["a"]));
    }

    #[test]
    fn unknown_token_is_rejected() {
        let g = Grammar::parse("S -> a").unwrap();
        let table = table(&g);
        let trace = LL1Parser::new(&g, &table).parse_with_trace(&["z"]);
        assert!(!trace.accepted);
        assert_eq!(trace.steps.last().map(|s| &s.action), Some(&StepAction::Error));
    }
}
