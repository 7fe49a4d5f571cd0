use crowbook_text_processing::escape::tex as escape_tex;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use crate::Grammar;

use super::{
    nullable_first_follow::{FirstSets, FollowSets},
    pretty_print::{align_columns, ProductionOutput},
    TableError, EPSILON,
};

/// Why a grammar is not LL(1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LL1Conflict {
    /// Two alternatives of `non_terminal` start with the same terminals.
    FirstFirst {
        non_terminal: usize,
        productions: (usize, usize),
        terminals: Vec<usize>,
    },
    /// `non_terminal` can vanish and its first and follow sets overlap.
    FirstFollow {
        non_terminal: usize,
        terminals: Vec<usize>,
    },
    /// Two alternatives of `non_terminal` both derive the empty string, so
    /// both are predicted on every terminal of its follow set.
    EpsilonEpsilon {
        non_terminal: usize,
        productions: (usize, usize),
        terminals: Vec<usize>,
    },
}

fn sorted(set: impl IntoIterator<Item = usize>) -> Vec<usize> {
    let mut v: Vec<usize> = set.into_iter().collect();
    v.sort_unstable();
    v
}

impl Grammar {
    pub fn ll1_conflicts(&self, first: &FirstSets, follow: &FollowSets) -> Vec<LL1Conflict> {
        let mut conflicts = Vec::new();
        for nt in self.non_terminal_iter() {
            let firsts: Vec<_> = nt.productions.iter().map(|p| first.of_sequence(p)).collect();
            for i in 0..firsts.len() {
                for j in i + 1..firsts.len() {
                    let (a, b) = (&firsts[i], &firsts[j]);
                    if a.nullable && b.nullable {
                        let clash: HashSet<usize> = a
                            .terminals
                            .intersection(&b.terminals)
                            .chain(follow.get(nt.index).iter())
                            .cloned()
                            .collect();
                        if !clash.is_empty() {
                            conflicts.push(LL1Conflict::EpsilonEpsilon {
                                non_terminal: nt.index,
                                productions: (i, j),
                                terminals: sorted(clash),
                            });
                        }
                        continue;
                    }
                    let shared = sorted(a.terminals.intersection(&b.terminals).cloned());
                    if !shared.is_empty() {
                        conflicts.push(LL1Conflict::FirstFirst {
                            non_terminal: nt.index,
                            productions: (i, j),
                            terminals: shared,
                        });
                    }
                }
            }

            let own = first.get(nt.index);
            if own.nullable {
                let shared = sorted(own.terminals.intersection(follow.get(nt.index)).cloned());
                if !shared.is_empty() {
                    conflicts.push(LL1Conflict::FirstFollow {
                        non_terminal: nt.index,
                        terminals: shared,
                    });
                }
            }
        }
        if !conflicts.is_empty() {
            log::debug!("{} LL(1) conflicts", conflicts.len());
        }
        conflicts
    }

    pub fn is_ll1(&self, first: &FirstSets, follow: &FollowSets) -> bool {
        self.ll1_conflicts(first, follow).is_empty()
    }

    /// Builds the predictive table. Fails on the first cell that would hold
    /// two different productions, which cannot happen once [`Grammar::is_ll1`]
    /// holds.
    pub fn build_ll1_table(
        &self,
        first: &FirstSets,
        follow: &FollowSets,
    ) -> Result<LL1Table, TableError> {
        let mut table = LL1Table::default();
        for nt in self.non_terminal_iter() {
            for (i, production) in nt.productions.iter().enumerate() {
                let f = first.of_sequence(production);
                let mut lookaheads: Vec<usize> = f.terminals.iter().cloned().collect();
                if f.nullable {
                    lookaheads.extend(follow.get(nt.index).iter().cloned());
                }
                for t in sorted(lookaheads) {
                    match table.cells.insert((nt.index, t), i) {
                        Some(other) if other != i => {
                            return Err(TableError::LL1Collision {
                                non_terminal: nt.name.clone(),
                                terminal: self.get_symbol_name(t).to_string(),
                                first: self.production_to_string(nt.index, other),
                                second: self.production_to_string(nt.index, i),
                            })
                        }
                        _ => {}
                    }
                }
            }
        }
        log::debug!("LL(1) table with {} entries", table.cells.len());
        Ok(table)
    }

    pub(crate) fn production_to_string(&self, left: usize, production: usize) -> String {
        format!(
            "{} -> {}",
            self.get_symbol_name(left),
            self.production_to_vec_str(self.production(left, production))
                .join(" ")
        )
    }
}

/// Predictive table: (nonterminal, terminal) to the index of the production
/// to expand with. A missing cell is a syntax error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LL1Table {
    cells: BTreeMap<(usize, usize), usize>,
}

impl LL1Table {
    pub fn get(&self, non_terminal: usize, terminal: usize) -> Option<usize> {
        self.cells.get(&(non_terminal, terminal)).cloned()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn to_output<'a>(&self, g: &'a Grammar) -> LL1ParsingTable<'a> {
        let terminals: Vec<usize> = g.terminal_indices().collect();

        let mut rows: Vec<(&str, Vec<ProductionOutput>)> = Vec::new();
        for nt in g.non_terminal_iter() {
            let left = nt.name.as_str();
            let row = terminals
                .iter()
                .map(|&t| ProductionOutput {
                    left,
                    rights: self
                        .get(nt.index, t)
                        .map(|p| vec![g.production_to_vec_str(&nt.productions[p])])
                        .unwrap_or_default(),
                })
                .collect();
            rows.push((left, row));
        }

        LL1ParsingTable {
            terminals: terminals.iter().map(|&t| g.get_symbol_name(t)).collect(),
            rows,
        }
    }
}

#[derive(Serialize)]
pub struct LL1ParsingTable<'a> {
    terminals: Vec<&'a str>,
    rows: Vec<(&'a str, Vec<ProductionOutput<'a>>)>,
}

impl LL1ParsingTable<'_> {
    pub fn to_plaintext(&self) -> String {
        let mut header: Vec<String> = vec![String::new()];
        header.extend(self.terminals.iter().map(|&t| t.to_string()));
        let mut output: Vec<Vec<String>> = vec![header];
        for (left, row) in &self.rows {
            let mut line: Vec<String> = vec![left.to_string()];
            line.extend(
                row.iter()
                    .map(|productions| productions.to_plaintext(left.len(), false)),
            );
            output.push(line);
        }
        align_columns(&output)
    }

    pub fn to_latex(&self) -> String {
        let mut header: Vec<String> = vec![format!(
            "\\[\\begin{{array}}{{c{}}}\n",
            "|l".repeat(self.terminals.len()),
        )];
        header.extend(
            self.terminals
                .iter()
                .map(|&t| format!("\\text{{{}}}", escape_tex(t))),
        );
        let header = header.join(" & ");

        let mut output: Vec<String> = Vec::new();
        for (left, row) in &self.rows {
            let mut line: Vec<String> = vec![escape_tex(*left).to_string()];
            line.extend(row.iter().map(|productions| productions.to_latex(false)));
            output.push(line.join(" & "));
        }

        let output = output.join("\\\\\n");

        (header + "\\\\\\hline\n" + &output + "\n\\end{array}\\]").replace(EPSILON, "\\epsilon")
    }
}
