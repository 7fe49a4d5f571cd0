//! FIRST and FOLLOW sets.
//!
//! Both are least fixed points over finite sets of terminals, computed by
//! sweeping every production until a full sweep adds nothing.

use std::collections::HashSet;

use super::{Grammar, END_MARK_IDX, EPSILON_IDX};

/// The first set of one symbol or symbol string. `nullable` is the epsilon
/// member.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FirstSet {
    pub terminals: HashSet<usize>,
    pub nullable: bool,
}

impl FirstSet {
    fn len(&self) -> usize {
        self.terminals.len() + self.nullable as usize
    }
}

/// First sets of every symbol of a grammar, indexed by symbol.
///
/// A terminal's first set is the terminal itself, epsilon's is `{ϵ}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstSets(Vec<FirstSet>);

impl FirstSets {
    pub fn compute(grammar: &Grammar) -> Self {
        let mut sets: Vec<FirstSet> = (0..grammar.symbols.len())
            .map(|i| {
                if grammar.is_terminal(i) {
                    FirstSet {
                        terminals: HashSet::from([i]),
                        nullable: false,
                    }
                } else {
                    FirstSet {
                        terminals: HashSet::new(),
                        nullable: i == EPSILON_IDX,
                    }
                }
            })
            .collect();

        let mut sweeps = 0;
        let mut changed = true;
        while changed {
            changed = false;
            sweeps += 1;
            for nt in grammar.non_terminal_iter() {
                let first = nt
                    .productions
                    .iter()
                    .fold(FirstSet::default(), |mut first, production| {
                        let p = sequence_first(&sets, production);
                        first.terminals.extend(p.terminals);
                        first.nullable |= p.nullable;
                        first
                    });

                if first.len() != sets[nt.index].len() {
                    changed = true;
                    sets[nt.index] = first;
                }
            }
        }
        log::debug!("first sets converged after {} sweeps", sweeps);

        FirstSets(sets)
    }

    /// First set of a single symbol. Symbols outside the grammar are
    /// treated as terminals.
    pub fn get(&self, symbol: usize) -> FirstSet {
        match self.0.get(symbol) {
            Some(first) => first.clone(),
            None => FirstSet {
                terminals: HashSet::from([symbol]),
                nullable: false,
            },
        }
    }

    /// First set of a symbol string. The empty string is nullable.
    pub fn of_sequence(&self, symbols: &[usize]) -> FirstSet {
        sequence_first(&self.0, symbols)
    }
}

fn sequence_first(sets: &[FirstSet], symbols: &[usize]) -> FirstSet {
    let mut first = FirstSet::default();
    for &symbol in symbols {
        match sets.get(symbol) {
            Some(s) => {
                first.terminals.extend(s.terminals.iter().cloned());
                if !s.nullable {
                    return first;
                }
            }
            None => {
                first.terminals.insert(symbol);
                return first;
            }
        }
    }
    first.nullable = true;
    first
}

/// Follow sets of every nonterminal, indexed by symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowSets {
    sets: Vec<HashSet<usize>>,
    empty: HashSet<usize>,
}

impl FollowSets {
    pub fn compute(grammar: &Grammar, first: &FirstSets) -> Self {
        let mut follow: Vec<HashSet<usize>> = vec![HashSet::new(); grammar.symbols.len()];
        follow[grammar.start_symbol].insert(END_MARK_IDX);

        let mut sweeps = 0;
        let mut changed = true;
        while changed {
            changed = false;
            sweeps += 1;
            for left in grammar.non_terminal_iter() {
                for production in &left.productions {
                    // what may come right after the symbol being visited
                    let mut trailer = follow[left.index].clone();

                    for &symbol in production.iter().rev() {
                        if symbol == EPSILON_IDX {
                            continue;
                        }
                        if grammar.is_non_terminal(symbol) {
                            let before = follow[symbol].len();
                            follow[symbol].extend(trailer.iter().cloned());
                            changed |= follow[symbol].len() != before;

                            let s = first.get(symbol);
                            if s.nullable {
                                trailer.extend(s.terminals);
                            } else {
                                trailer = s.terminals;
                            }
                        } else {
                            trailer = HashSet::from([symbol]);
                        }
                    }
                }
            }
        }
        log::debug!("follow sets converged after {} sweeps", sweeps);

        FollowSets {
            sets: follow,
            empty: HashSet::new(),
        }
    }

    /// Follow set of `symbol`; empty for symbols the grammar does not know.
    pub fn get(&self, symbol: usize) -> &HashSet<usize> {
        self.sets.get(symbol).unwrap_or(&self.empty)
    }
}
