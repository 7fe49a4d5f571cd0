use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use crate::Grammar;

use super::{
    lr_dfa::{DotProduction, LR0Automaton},
    nullable_first_follow::FollowSets,
    TableError, END_MARK_IDX,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LRParsingTableAction {
    Shift(usize),
    Reduce { left: usize, production: usize },
    Accept,
}

/// Why a state of the LR(0) automaton cannot be driven by one token of
/// FOLLOW lookahead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SLR1Conflict {
    ShiftReduce {
        state: usize,
        reduce: DotProduction,
        terminals: Vec<usize>,
    },
    ReduceReduce {
        state: usize,
        reduces: (DotProduction, DotProduction),
        terminals: Vec<usize>,
    },
    /// The accepting state also reduces `reduce` on the end marker.
    AcceptReduce { state: usize, reduce: DotProduction },
}

fn sorted<'a>(set: impl IntoIterator<Item = &'a usize>) -> Vec<usize> {
    let mut v: Vec<usize> = set.into_iter().cloned().collect();
    v.sort_unstable();
    v
}

impl LR0Automaton {
    /// Items ready to be reduced in `state`: every complete item except the
    /// accepting one.
    fn reduce_items(&self, state: usize) -> Vec<DotProduction> {
        self.states[state]
            .items
            .iter()
            .filter(|i| i.left != self.accept_symbol && i.is_complete(&self.grammar))
            .cloned()
            .collect()
    }

    fn accepts(&self, state: usize) -> bool {
        self.states[state]
            .items
            .iter()
            .any(|i| i.left == self.accept_symbol && i.is_complete(&self.grammar))
    }

    /// Terminals right after a dot in `state`.
    fn shift_symbols(&self, state: usize) -> HashSet<usize> {
        self.states[state]
            .items
            .iter()
            .filter_map(|i| i.next_symbol(&self.grammar))
            .filter(|&s| self.grammar.is_terminal(s))
            .collect()
    }

    pub fn conflicts(&self, follow: &FollowSets) -> Vec<SLR1Conflict> {
        let mut conflicts = Vec::new();
        for state in 0..self.states.len() {
            let reduces = self.reduce_items(state);
            let shifts = self.shift_symbols(state);

            if self.accepts(state) {
                for r in &reduces {
                    if follow.get(r.left).contains(&END_MARK_IDX) {
                        conflicts.push(SLR1Conflict::AcceptReduce { state, reduce: *r });
                    }
                }
            }

            for r in &reduces {
                let shared = sorted(follow.get(r.left).intersection(&shifts));
                if !shared.is_empty() {
                    conflicts.push(SLR1Conflict::ShiftReduce {
                        state,
                        reduce: *r,
                        terminals: shared,
                    });
                }
            }

            for i in 0..reduces.len() {
                for j in i + 1..reduces.len() {
                    let (a, b) = (reduces[i], reduces[j]);
                    let shared = sorted(follow.get(a.left).intersection(follow.get(b.left)));
                    if !shared.is_empty() {
                        conflicts.push(SLR1Conflict::ReduceReduce {
                            state,
                            reduces: (a, b),
                            terminals: shared,
                        });
                    }
                }
            }
        }
        if !conflicts.is_empty() {
            log::debug!("{} SLR(1) conflicts", conflicts.len());
        }
        conflicts
    }

    /// Fills the action and goto tables. Fails on the first action cell that
    /// would hold two different actions, which cannot happen once
    /// [`LR0Automaton::conflicts`] is empty.
    pub fn to_parsing_table(&self, follow: &FollowSets) -> Result<LRParsingTable, TableError> {
        let g = &self.grammar;
        let mut table = LRParsingTable {
            action: vec![BTreeMap::new(); self.states.len()],
            goto: vec![BTreeMap::new(); self.states.len()],
        };

        for (i, state) in self.states.iter().enumerate() {
            for item in &state.items {
                match item.next_symbol(g) {
                    Some(symbol) if g.is_terminal(symbol) => {
                        if let Some(j) = self.transition(i, symbol) {
                            let shift = LRParsingTableAction::Shift(j);
                            self.set_action(&mut table, i, symbol, shift)?;
                        }
                    }
                    Some(_) => {}
                    None if item.left == self.accept_symbol => {
                        let accept = LRParsingTableAction::Accept;
                        self.set_action(&mut table, i, END_MARK_IDX, accept)?;
                    }
                    None => {
                        let reduce = LRParsingTableAction::Reduce {
                            left: item.left,
                            production: item.production,
                        };
                        for &t in sorted(follow.get(item.left)).iter() {
                            self.set_action(&mut table, i, t, reduce)?;
                        }
                    }
                }
            }

            for (&symbol, &j) in &state.edges {
                if g.is_non_terminal(symbol) {
                    table.goto[i].insert(symbol, j);
                }
            }
        }

        Ok(table)
    }

    fn set_action(
        &self,
        table: &mut LRParsingTable,
        state: usize,
        terminal: usize,
        action: LRParsingTableAction,
    ) -> Result<(), TableError> {
        match table.action[state].insert(terminal, action) {
            Some(other) if other != action => Err(TableError::SLR1Collision {
                state,
                terminal: self.grammar.get_symbol_name(terminal).to_string(),
                first: other.to_plaintext(&self.grammar),
                second: action.to_plaintext(&self.grammar),
            }),
            _ => Ok(()),
        }
    }
}

impl Grammar {
    pub fn slr1_conflicts(&self, follow: &FollowSets) -> Vec<SLR1Conflict> {
        LR0Automaton::build(self).conflicts(follow)
    }

    pub fn is_slr1(&self, follow: &FollowSets) -> bool {
        self.slr1_conflicts(follow).is_empty()
    }

    pub fn build_slr1_tables(&self, follow: &FollowSets) -> Result<LRParsingTable, TableError> {
        LR0Automaton::build(self).to_parsing_table(follow)
    }
}

/// SLR(1) action and goto tables, one map per automaton state. A missing
/// action is a syntax error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LRParsingTable {
    pub action: Vec<BTreeMap<usize, LRParsingTableAction>>,
    pub goto: Vec<BTreeMap<usize, usize>>,
}

impl LRParsingTable {
    pub fn action(&self, state: usize, terminal: usize) -> Option<LRParsingTableAction> {
        self.action.get(state).and_then(|row| row.get(&terminal)).cloned()
    }

    pub fn goto(&self, state: usize, non_terminal: usize) -> Option<usize> {
        self.goto.get(state).and_then(|row| row.get(&non_terminal)).cloned()
    }

    pub fn state_count(&self) -> usize {
        self.action.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::nullable_first_follow::FirstSets;

    fn analyze(text: &str) -> (Grammar, FollowSets) {
        let g = Grammar::from_text(text).unwrap();
        let first = FirstSets::compute(&g);
        let follow = FollowSets::compute(&g, &first);
        (g, follow)
    }

    #[test]
    fn expression_grammar_is_slr1() {
        let (g, follow) = analyze("E -> E + T | T\nT -> T * F | F\nF -> ( E ) | i");
        assert!(g.is_slr1(&follow));
        let table = g.build_slr1_tables(&follow).unwrap();
        assert_eq!(table.state_count(), 12);
        let i = g.get_symbol_index("i").unwrap();
        assert!(matches!(table.action(0, i), Some(LRParsingTableAction::Shift(_))));
        let e = g.get_symbol_index("E").unwrap();
        let after_e = table.goto(0, e).unwrap();
        assert_eq!(table.action(after_e, END_MARK_IDX), Some(LRParsingTableAction::Accept));
    }

    #[test]
    fn same_follow_reduces_conflict() {
        let (g, follow) = analyze("3\nS -> A | B\nA -> a\nB -> a");
        let conflicts = g.slr1_conflicts(&follow);
        assert!(matches!(
            conflicts.as_slice(),
            [SLR1Conflict::ReduceReduce { terminals, .. }] if terminals == &vec![END_MARK_IDX]
        ));
        assert!(matches!(
            g.build_slr1_tables(&follow),
            Err(TableError::SLR1Collision { .. })
        ));
    }

    #[test]
    fn dangling_else_is_shift_reduce() {
        let (g, follow) = analyze("S -> i S | i S e S | a");
        assert!(matches!(
            g.slr1_conflicts(&follow).as_slice(),
            [SLR1Conflict::ShiftReduce { .. }]
        ));
    }

    #[test]
    fn start_self_loop_conflicts_with_accept() {
        let (g, follow) = analyze("S -> S | a");
        let conflicts = g.slr1_conflicts(&follow);
        assert!(matches!(
            conflicts.as_slice(),
            [SLR1Conflict::AcceptReduce { reduce, .. }] if reduce.left == g.start_symbol
        ));
        assert!(!g.is_slr1(&follow));
        assert!(matches!(
            g.build_slr1_tables(&follow),
            Err(TableError::SLR1Collision { .. })
        ));
    }

    #[test]
    fn vanishing_suffix_in_accepting_state_conflicts() {
        let (g, follow) = analyze("S -> S A | a\nA -> ϵ");
        let a = g.get_symbol_index("A").unwrap();
        assert!(matches!(
            g.slr1_conflicts(&follow).as_slice(),
            [SLR1Conflict::AcceptReduce { reduce, .. }] if reduce.left == a
        ));
        assert!(g.build_slr1_tables(&follow).is_err());
    }

    #[test]
    fn epsilon_reduce_on_follow() {
        let (g, follow) = analyze("3\nS -> AB\nA -> aA | e\nB -> b");
        assert!(g.is_slr1(&follow));
        let table = g.build_slr1_tables(&follow).unwrap();
        let a = g.get_symbol_index("A").unwrap();
        let b = g.get_symbol_index("b").unwrap();
        assert_eq!(
            table.action(0, b),
            Some(LRParsingTableAction::Reduce {
                left: a,
                production: 1
            })
        );
        assert_eq!(table.action(0, END_MARK_IDX), None);
    }
}
