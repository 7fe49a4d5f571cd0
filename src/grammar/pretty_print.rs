use std::collections::HashSet;

use crowbook_text_processing::escape;
use serde::Serialize;

use crate::parser::{ParseTrace, StepAction};

use super::{
    analysis::Analysis,
    ll1_parsing_table::LL1Conflict,
    lr_dfa::{DotProduction, LR0Automaton},
    slr1_parsing_table::{LRParsingTable, LRParsingTableAction, SLR1Conflict},
    Grammar, END_MARK, EPSILON,
};

pub(crate) fn align_columns(output: &[Vec<String>]) -> String {
    let width: Vec<usize> = (0..output.first().map_or(0, |row| row.len()))
        .map(|j| {
            output
                .iter()
                .map(|row| row[j].chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    output
        .iter()
        .map(|line| {
            line.iter()
                .enumerate()
                .map(|(i, s)| format!("{:>width$}", s, width = width[i]))
                .collect::<Vec<_>>()
                .join(" | ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn names<'a>(g: &'a Grammar, symbols: &[usize]) -> String {
    symbols
        .iter()
        .map(|&s| g.get_symbol_name(s))
        .collect::<Vec<&'a str>>()
        .join(", ")
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductionOutput<'a> {
    pub left: &'a str,
    pub rights: Vec<Vec<&'a str>>,
}

impl ProductionOutput<'_> {
    pub fn to_plaintext(&self, left_width: usize, multiline: bool) -> String {
        self.rights
            .iter()
            .map(|right| right.join(" "))
            .enumerate()
            .map(|(i, right)| {
                if i == 0 {
                    format!("{:>width$} -> {}", self.left, right, width = left_width)
                } else if multiline {
                    format!("{:>width$}  | {}", "", right, width = left_width)
                } else {
                    format!(" | {}", right)
                }
            })
            .collect::<Vec<_>>()
            .join(if multiline { "\n" } else { "" })
    }

    pub fn to_latex(&self, and_sign: bool) -> String {
        if self.rights.is_empty() {
            return String::new();
        }

        let left = if and_sign {
            format!("{} & \\rightarrow &", escape::tex(self.left))
        } else {
            format!("{} \\rightarrow ", escape::tex(self.left))
        };
        let right = self
            .rights
            .iter()
            .map(|right| {
                right
                    .iter()
                    .map(|s| escape::tex(*s))
                    .collect::<Vec<_>>()
                    .join(" \\ ")
            })
            .collect::<Vec<_>>()
            .join(" \\mid ");

        let output = left + &right;
        output.replace(EPSILON, "\\epsilon")
    }
}

#[derive(Serialize)]
pub struct ProductionOutputVec<'a> {
    productions: Vec<ProductionOutput<'a>>,
}

impl ProductionOutputVec<'_> {
    pub fn to_plaintext(&self) -> String {
        let left_max_len = self
            .productions
            .iter()
            .map(|p| p.left.len())
            .max()
            .unwrap_or(0);
        self.productions
            .iter()
            .map(|s| s.to_plaintext(left_max_len, true))
            .collect::<Vec<String>>()
            .join("\n")
    }

    pub fn to_latex(&self) -> String {
        std::iter::once("\\[\\begin{array}{cll}".to_string())
            .chain(self.productions.iter().map(|s| s.to_latex(true)))
            .chain(std::iter::once("\\end{array}\\]".to_string()))
            .collect::<Vec<String>>()
            .join("\\\\\n")
    }
}

impl Grammar {
    pub fn to_production_output_vec(&self) -> ProductionOutputVec {
        let productions = self
            .non_terminal_iter()
            .map(|non_terminal| ProductionOutput {
                left: non_terminal.name.as_str(),
                rights: non_terminal
                    .productions
                    .iter()
                    .map(|production| self.production_to_vec_str(production))
                    .collect(),
            })
            .collect();
        ProductionOutputVec { productions }
    }
}

#[derive(Serialize)]
struct NonTerminalOutput<'a> {
    name: &'a str,
    nullable: bool,
    first: Vec<&'a str>,
    follow: Vec<&'a str>,
}

impl NonTerminalOutput<'_> {
    fn to_plaintext(&self) -> String {
        format!(
            "{} | {} | {} | {}",
            self.name,
            self.nullable,
            self.first.join(", "),
            self.follow.join(", ")
        )
    }

    fn to_latex(&self) -> String {
        fn f(a: &[&str]) -> String {
            a.iter()
                .map(|s| escape::tex(*s))
                .collect::<Vec<_>>()
                .join(r"\ ")
                .replace(EPSILON, r"$\epsilon$")
        }

        format!(
            "{} & {} & {} & {}",
            escape::tex(self.name),
            self.nullable,
            f(&self.first),
            f(&self.follow)
        )
    }
}

#[derive(Serialize)]
pub struct NonTerminalOutputVec<'a> {
    data: Vec<NonTerminalOutput<'a>>,
}

impl NonTerminalOutputVec<'_> {
    pub fn to_plaintext(&self) -> String {
        self.data
            .iter()
            .map(|s| s.to_plaintext())
            .collect::<Vec<String>>()
            .join("\n")
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn to_latex(&self) -> String {
        let content = self
            .data
            .iter()
            .map(|e| e.to_latex())
            .collect::<Vec<_>>()
            .join("\\\\\n ");

        "\\begin{tabular}{c|c|c|c}\n".to_string()
            + "Symbol & Nullable & First & Follow\\\\\\hline\n"
            + &content
            + "\\\\\n\\end{tabular}"
    }
}

impl Analysis {
    /// Nullable, first and follow per nonterminal in declaration order. Each
    /// set is sorted, with epsilon last in a nullable first set.
    pub fn to_non_terminal_output_vec<'a>(&self, g: &'a Grammar) -> NonTerminalOutputVec<'a> {
        let mut data = Vec::new();
        for non_terminal in g.non_terminal_iter() {
            let first = self.first.get(non_terminal.index);
            let mut t = NonTerminalOutput {
                name: non_terminal.name.as_str(),
                nullable: first.nullable,
                first: first.terminals.iter().map(|idx| g.get_symbol_name(*idx)).collect(),
                follow: self
                    .follow
                    .get(non_terminal.index)
                    .iter()
                    .map(|idx| g.get_symbol_name(*idx))
                    .collect(),
            };
            t.first.sort();
            t.follow.sort();

            if first.nullable {
                t.first.push(EPSILON);
            }
            data.push(t);
        }
        NonTerminalOutputVec { data }
    }

    pub fn to_classification(&self, g: &Grammar) -> Classification {
        Classification {
            ll1: self.is_ll1(),
            slr1: self.is_slr1(),
            ll1_conflicts: self
                .ll1_conflicts
                .iter()
                .map(|c| c.to_plaintext(g))
                .collect(),
            slr1_conflicts: self
                .slr1_conflicts
                .iter()
                .map(|c| c.to_plaintext(&self.automaton))
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Classification {
    pub ll1: bool,
    pub slr1: bool,
    pub ll1_conflicts: Vec<String>,
    pub slr1_conflicts: Vec<String>,
}

impl Classification {
    pub fn verdict(&self) -> &'static str {
        match (self.ll1, self.slr1) {
            (true, true) => "Grammar is both LL(1) and SLR(1).",
            (true, false) => "Grammar is LL(1).",
            (false, true) => "Grammar is SLR(1).",
            (false, false) => "Grammar is neither LL(1) nor SLR(1).",
        }
    }

    pub fn to_plaintext(&self) -> String {
        std::iter::once(self.verdict().to_string())
            .chain(self.ll1_conflicts.iter().map(|c| format!("LL(1): {}", c)))
            .chain(self.slr1_conflicts.iter().map(|c| format!("SLR(1): {}", c)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_latex(&self) -> String {
        let verdict = format!("\\textbf{{{}}}", self.verdict());
        if self.ll1_conflicts.is_empty() && self.slr1_conflicts.is_empty() {
            return verdict;
        }
        let items = self
            .ll1_conflicts
            .iter()
            .map(|c| format!("\\item LL(1): {}", escape::tex(c.as_str())))
            .chain(
                self.slr1_conflicts
                    .iter()
                    .map(|c| format!("\\item SLR(1): {}", escape::tex(c.as_str()))),
            )
            .collect::<Vec<_>>()
            .join("\n");
        format!("{}\n\\begin{{itemize}}\n{}\n\\end{{itemize}}", verdict, items)
    }
}

impl LL1Conflict {
    pub fn to_plaintext(&self, g: &Grammar) -> String {
        match self {
            LL1Conflict::FirstFirst {
                non_terminal,
                productions: (i, j),
                terminals,
            } => format!(
                "FIRST/FIRST conflict between {} and {} on {}",
                g.production_to_string(*non_terminal, *i),
                g.production_to_string(*non_terminal, *j),
                names(g, terminals)
            ),
            LL1Conflict::FirstFollow {
                non_terminal,
                terminals,
            } => format!(
                "FIRST/FOLLOW conflict for {} on {}",
                g.get_symbol_name(*non_terminal),
                names(g, terminals)
            ),
            LL1Conflict::EpsilonEpsilon {
                non_terminal,
                productions: (i, j),
                terminals,
            } => format!(
                "{} and {} both derive {} on {}",
                g.production_to_string(*non_terminal, *i),
                g.production_to_string(*non_terminal, *j),
                EPSILON,
                names(g, terminals)
            ),
        }
    }
}

impl SLR1Conflict {
    pub fn to_plaintext(&self, fsm: &LR0Automaton) -> String {
        match self {
            SLR1Conflict::ShiftReduce {
                state,
                reduce,
                terminals,
            } => format!(
                "shift/reduce conflict in I{} between shift and reduce {} on {}",
                state,
                reduce.to_plaintext(&fsm.grammar),
                names(&fsm.grammar, terminals)
            ),
            SLR1Conflict::ReduceReduce {
                state,
                reduces: (a, b),
                terminals,
            } => format!(
                "reduce/reduce conflict in I{} between {} and {} on {}",
                state,
                a.to_plaintext(&fsm.grammar),
                b.to_plaintext(&fsm.grammar),
                names(&fsm.grammar, terminals)
            ),
            SLR1Conflict::AcceptReduce { state, reduce } => format!(
                "accept/reduce conflict in I{} between accept and reduce {} on {}",
                state,
                reduce.to_plaintext(&fsm.grammar),
                END_MARK
            ),
        }
    }
}

impl DotProduction {
    pub fn to_plaintext(&self, g: &Grammar) -> String {
        let production = g.production(self.left, self.production);
        let mut output = String::new();
        output.push_str(g.get_symbol_name(self.left));
        output.push_str(" -> ");
        for (i, s) in production.iter().enumerate() {
            if i != 0 {
                output.push(' ');
            }

            if i == self.position {
                output.push('.');
            }
            output.push_str(g.get_symbol_name(*s));
        }
        if self.position == production.len() {
            output.push('.');
        }

        output
    }

    pub fn to_latex(&self, g: &Grammar) -> String {
        let production = g.production(self.left, self.production);
        let mut right: Vec<String> = Vec::new();
        for (i, s) in production.iter().enumerate() {
            if i == self.position {
                right.push(".".to_string());
            }
            right.push(escape::tex(g.get_symbol_name(*s)).to_string());
        }
        if self.position == production.len() {
            right.push(".".to_string());
        }
        let right = right.join(" ").replace(EPSILON, "\\epsilon");

        format!(
            "${} \\rightarrow {}$",
            escape::tex(g.get_symbol_name(self.left)),
            right
        )
    }
}

#[derive(Serialize)]
struct StateOutput {
    kernel: Vec<String>,
    extend: Vec<String>,
    edges: Vec<(String, usize)>,
}

#[derive(Serialize)]
pub struct LRFSMOutput {
    states: Vec<StateOutput>,
    start: usize,
}

impl LR0Automaton {
    pub fn to_output(&self) -> LRFSMOutput {
        let g = &self.grammar;
        let states = self
            .states
            .iter()
            .map(|state| {
                let (kernel, extend): (Vec<&DotProduction>, Vec<&DotProduction>) =
                    state.items.iter().partition(|item| self.is_kernel(item));
                StateOutput {
                    kernel: kernel.iter().map(|i| i.to_plaintext(g)).collect(),
                    extend: extend.iter().map(|i| i.to_plaintext(g)).collect(),
                    edges: state
                        .edges
                        .iter()
                        .map(|(&e, &v)| (g.get_symbol_name(e).to_string(), v))
                        .collect(),
                }
            })
            .collect();
        LRFSMOutput {
            states,
            start: self.start,
        }
    }

    pub fn to_latex(&self) -> String {
        let g = &self.grammar;
        let nodes = self.states.iter().enumerate().map(|(id, state)| {
            let content = state
                .items
                .iter()
                .map(|e| e.to_latex(g))
                .collect::<Vec<_>>()
                .join(" \\\\ \n");
            format!(
                "\\node [block] (I_{}){}\n{{\n$I_{}$\\\\\n{}\n}};",
                id,
                if id > 0 {
                    if id % 2 == 0 {
                        format!(" [below of = I_{}] ", id - 2)
                    } else {
                        format!(" [right of = I_{}] ", id - 1)
                    }
                } else {
                    String::new()
                },
                id,
                content
            )
        });
        let edges = self.states.iter().enumerate().flat_map(|(id, state)| {
            state.edges.iter().map(move |(&e, &v)| {
                format!(
                    "\\path [->] (I_{}) edge {} node [above]{{{}}} (I_{});",
                    id,
                    if id == v { "[loop left]" } else { "[right]" },
                    escape::tex(g.get_symbol_name(e)),
                    v
                )
            })
        });
        format!(
            "\\begin{{tikzpicture}}[node distance=5cm,block/.style={{state, rectangle, text width=6em}}]\n{}\n\\end{{tikzpicture}}",
            nodes.chain(edges).collect::<Vec<_>>().join("\n")
        )
    }
}

impl LRFSMOutput {
    pub fn to_plaintext(&self) -> String {
        let states = self
            .states
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let mut block = format!("I{}\n{}", i, s.kernel.join("\n"));
                if !s.extend.is_empty() {
                    block.push_str(&format!("\n---\n{}", s.extend.join("\n")));
                }
                if !s.edges.is_empty() {
                    block.push_str(&format!(
                        "\n===\n{}",
                        s.edges
                            .iter()
                            .map(|(k, v)| format!("- {} -> {}", k, v))
                            .collect::<Vec<_>>()
                            .join("\n")
                    ));
                }
                block
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        format!("{}\n\nstart: {}", states, self.start)
    }
}

impl LRParsingTableAction {
    pub fn to_plaintext(&self, g: &Grammar) -> String {
        match self {
            LRParsingTableAction::Reduce { left, production } => {
                format!("r({})", g.production_to_string(*left, *production))
            }
            LRParsingTableAction::Shift(s) => {
                format!("s{}", s)
            }
            LRParsingTableAction::Accept => "acc".to_string(),
        }
    }

    pub fn to_latex(&self, g: &Grammar, terminal_set: &HashSet<usize>) -> String {
        match self {
            LRParsingTableAction::Reduce { left, production } => {
                format!(
                    "reduce ${} \\rightarrow {}$",
                    escape::tex(g.get_symbol_name(*left)),
                    g.production(*left, *production)
                        .iter()
                        .map(|s| if terminal_set.contains(s) {
                            format!("\\text{{{}}}", escape::tex(g.get_symbol_name(*s)))
                        } else {
                            escape::tex(g.get_symbol_name(*s)).to_string()
                        })
                        .collect::<Vec<_>>()
                        .join(" \\  ")
                        .replace(EPSILON, "\\epsilon")
                )
            }
            LRParsingTableAction::Shift(s) => {
                format!("shift {}", s)
            }
            LRParsingTableAction::Accept => "accept".to_string(),
        }
    }
}

#[derive(Serialize)]
pub struct LRParsingTableOutput {
    terminals: Vec<String>,
    non_terminals: Vec<String>,
    action: Vec<Vec<String>>,
    goto: Vec<Vec<Option<usize>>>,
    #[serde(skip)]
    latex_action: Vec<Vec<String>>,
}

impl LRParsingTable {
    pub fn to_output(&self, g: &Grammar) -> LRParsingTableOutput {
        let terminals: Vec<usize> = g.terminal_indices().collect();
        let non_terminals: Vec<usize> = g.non_terminal_iter().map(|nt| nt.index).collect();
        let terminal_set: HashSet<usize> = terminals.iter().cloned().collect();

        let cell = |state: usize, t: usize, latex: bool| {
            self.action(state, t)
                .map(|a| {
                    if latex {
                        a.to_latex(g, &terminal_set)
                    } else {
                        a.to_plaintext(g)
                    }
                })
                .unwrap_or_default()
        };

        let states = 0..self.state_count();
        LRParsingTableOutput {
            terminals: terminals.iter().map(|&t| g.get_symbol_name(t).to_string()).collect(),
            non_terminals: non_terminals
                .iter()
                .map(|&nt| g.get_symbol_name(nt).to_string())
                .collect(),
            action: states
                .clone()
                .map(|s| terminals.iter().map(|&t| cell(s, t, false)).collect())
                .collect(),
            goto: states
                .clone()
                .map(|s| non_terminals.iter().map(|&nt| self.goto(s, nt)).collect())
                .collect(),
            latex_action: states
                .map(|s| terminals.iter().map(|&t| cell(s, t, true)).collect())
                .collect(),
        }
    }
}

impl LRParsingTableOutput {
    fn rows<'a>(&'a self, action: &'a [Vec<String>]) -> impl Iterator<Item = Vec<String>> + 'a {
        action.iter().zip(self.goto.iter()).enumerate().map(|(i, (r1, r2))| {
            std::iter::once(i.to_string())
                .chain(r1.iter().cloned())
                .chain(r2.iter().map(|goto| goto.map(|g| g.to_string()).unwrap_or_default()))
                .collect()
        })
    }

    pub fn to_plaintext(&self) -> String {
        let mut output: Vec<Vec<String>> = vec![std::iter::once(String::new())
            .chain(self.terminals.iter().cloned())
            .chain(self.non_terminals.iter().cloned())
            .collect()];
        output.extend(self.rows(&self.action));
        align_columns(&output)
    }

    pub fn to_latex(&self) -> String {
        let header: String = format!(
            "\\begin{{tabular}}{{c{}}}\n & \\multicolumn{{{}}}{{c}}{{action}} & \\multicolumn{{{}}}{{|c}}{{goto}}\\\\",
            "|l".repeat(self.terminals.len() + self.non_terminals.len()),
            self.terminals.len(),
            self.non_terminals.len(),
        );

        let first_row = std::iter::once(String::new())
            .chain(
                self.terminals
                    .iter()
                    .chain(self.non_terminals.iter())
                    .map(|s| escape::tex(s.as_str()).to_string()),
            )
            .collect::<Vec<_>>()
            .join(" & ");

        let content = self
            .rows(&self.latex_action)
            .map(|row| row.join(" & "))
            .collect::<Vec<_>>()
            .join(" \\\\\n");

        format!(
            "{}\n{} \\\\\\hline\n{}\n\\end{{tabular}}",
            header, first_row, content
        )
    }
}

impl std::fmt::Display for StepAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepAction::Match(t) => write!(f, "Match '{}'", t),
            StepAction::Produce { left, right } => {
                write!(f, "Produce with {} -> {}", left, right.join(" "))
            }
            StepAction::Shift(state) => write!(f, "Shift to state {}", state),
            StepAction::Reduce { left, right } => {
                write!(f, "Reduce by {} -> {}", left, right.join(" "))
            }
            StepAction::Accept => write!(f, "Accept"),
            StepAction::Error => write!(f, "Error"),
        }
    }
}

impl ParseTrace {
    pub fn to_plaintext(&self) -> String {
        let mut output = vec![vec![
            "STACK".to_string(),
            "INPUT".to_string(),
            "ACTION".to_string(),
        ]];
        output.extend(
            self.steps
                .iter()
                .map(|s| vec![s.stack.clone(), s.input.clone(), s.action.to_string()]),
        );
        align_columns(&output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_follow_plaintext_puts_epsilon_last() {
        let g = Grammar::from_text("3\nS -> AB\nA -> aA | e\nB -> b").unwrap();
        let text = g.analyze().to_non_terminal_output_vec(&g).to_plaintext();
        assert_eq!(
            text,
            ["S | false | a, b | $", "A | true | a, ϵ | b", "B | false | b | $"].join("\n")
        );
    }

    #[test]
    fn first_follow_json() {
        let g = Grammar::from_text("S -> a").unwrap();
        let json = g.analyze().to_non_terminal_output_vec(&g).to_json();
        assert_eq!(
            json,
            r#"{"data":[{"name":"S","nullable":false,"first":["a"],"follow":["$"]}]}"#
        );
    }

    #[test]
    fn item_plaintext_marks_the_dot() {
        let g = Grammar::parse("S -> a S b | ϵ").unwrap();
        let s = g.start_symbol;
        let item = DotProduction {
            left: s,
            production: 0,
            position: 1,
        };
        assert_eq!(item.to_plaintext(&g), "S -> a .S b");
        assert_eq!(DotProduction::new(&g, s, 1).to_plaintext(&g), "S -> ϵ.");
    }

    #[test]
    fn slr1_table_plaintext_has_header_and_one_row_per_state() {
        let g = Grammar::parse("E -> E + T | T\nT -> T * F | F\nF -> ( E ) | i").unwrap();
        let analysis = g.analyze();
        let table = analysis.slr1_table.as_ref().unwrap();
        let text = table.to_output(&g).to_plaintext();
        assert_eq!(text.lines().count(), 13);
        assert!(text.contains("acc"));
        assert!(text.contains("r(F -> i)"));
    }

    #[test]
    fn accept_reduce_conflict_plaintext() {
        let g = Grammar::parse("S -> S | a").unwrap();
        let c = g.analyze().to_classification(&g);
        assert!(!c.slr1);
        assert_eq!(
            c.slr1_conflicts,
            vec!["accept/reduce conflict in I2 between accept and reduce S -> S. on $".to_string()]
        );
    }

    #[test]
    fn classification_lists_conflicts() {
        let g = Grammar::from_text("3\nS -> A | B\nA -> a\nB -> a").unwrap();
        let c = g.analyze().to_classification(&g);
        assert_eq!(c.verdict(), "Grammar is neither LL(1) nor SLR(1).");
        assert_eq!(c.ll1_conflicts.len(), 1);
        assert!(c.slr1_conflicts[0].starts_with("reduce/reduce conflict"));
    }

    #[test]
    fn trace_plaintext_names_each_action() {
        let g = Grammar::from_text("3\nS -> AB\nA -> aA | e\nB -> b").unwrap();
        let analysis = g.analyze();
        let table = analysis.ll1_table.as_ref().unwrap();
        let text = crate::parser::LL1Parser::new(&g, table)
            .parse_with_trace(&["b"])
            .to_plaintext();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[0].ends_with("ACTION"));
        assert!(lines[1].ends_with("Produce with S -> A B"));
        assert!(lines[2].ends_with("Produce with A -> ϵ"));
        assert!(lines[4].ends_with("Match 'b'"));
        assert!(lines[5].ends_with("Accept"));
    }
}
