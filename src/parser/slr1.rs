use crate::grammar::slr1_parsing_table::{LRParsingTable, LRParsingTableAction};
use crate::Grammar;

use super::{remaining, resolve, ParseTrace, StepAction};

/// Shift-reduce parser driven by SLR(1) action and goto tables.
///
/// The stack of the textbook machine alternates states and symbols; here the
/// two halves live in `states` and `symbols`, with `states` one longer.
#[derive(Debug, Clone, Copy)]
pub struct SLR1Parser<'a> {
    grammar: &'a Grammar,
    table: &'a LRParsingTable,
}

impl<'a> SLR1Parser<'a> {
    pub fn new(grammar: &'a Grammar, table: &'a LRParsingTable) -> Self {
        Self { grammar, table }
    }

    pub fn parse(&self, tokens: &[&str]) -> bool {
        self.parse_with_trace(tokens).accepted
    }

    pub fn parse_with_trace(&self, tokens: &[&str]) -> ParseTrace {
        let g = self.grammar;
        let input = resolve(g, tokens);
        let mut trace = ParseTrace::default();

        let mut states: Vec<usize> = vec![0];
        let mut symbols: Vec<usize> = Vec::new();
        let mut position = 0;

        loop {
            let Some(&state) = states.last() else {
                return trace.finish(false);
            };
            let current = input.get(position).cloned().flatten();
            let stack_str = self.stack_to_string(&states, &symbols);
            let input_str = remaining(tokens, position);

            match current.and_then(|a| self.table.action(state, a)) {
                Some(LRParsingTableAction::Shift(next)) => {
                    trace.record(stack_str, input_str, StepAction::Shift(next));
                    // a shift always has a lookahead
                    symbols.extend(current);
                    states.push(next);
                    position += 1;
                }
                Some(LRParsingTableAction::Reduce { left, production }) => {
                    let body = g.production(left, production);
                    trace.record(
                        stack_str,
                        input_str,
                        StepAction::Reduce {
                            left: g.get_symbol_name(left).to_string(),
                            right: g
                                .production_to_vec_str(body)
                                .iter()
                                .map(|s| s.to_string())
                                .collect(),
                        },
                    );

                    let n = Grammar::production_len(body);
                    if n > symbols.len() {
                        return trace.finish(false);
                    }
                    symbols.truncate(symbols.len() - n);
                    states.truncate(states.len() - n);

                    let exposed = states.last().cloned();
                    match exposed.and_then(|s| self.table.goto(s, left)) {
                        Some(next) => {
                            symbols.push(left);
                            states.push(next);
                        }
                        None => return trace.finish(false),
                    }
                }
                Some(LRParsingTableAction::Accept) => {
                    trace.record(stack_str, input_str, StepAction::Accept);
                    return trace.finish(true);
                }
                None => {
                    trace.record(stack_str, input_str, StepAction::Error);
                    return trace.finish(false);
                }
            }
        }
    }

    fn stack_to_string(&self, states: &[usize], symbols: &[usize]) -> String {
        let mut cells = vec![states[0].to_string()];
        for (symbol, state) in symbols.iter().zip(states.iter().skip(1)) {
            cells.push(self.grammar.get_symbol_name(*symbol).to_string());
            cells.push(state.to_string());
        }
        cells.join(" ")
    }
}
