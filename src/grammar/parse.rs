use crate::Grammar;

use super::{GrammarError, END_MARK, EPSILON_IDX};

/// Start symbol required by the compact format.
pub const COMPACT_START: &str = "S";

/// Token standing for epsilon when it is a whole alternative of the compact
/// format.
pub const COMPACT_EPSILON: &str = "e";

impl Grammar {
    /// Reads either input format. A first non-blank line holding an integer
    /// selects [`Grammar::parse_compact`], anything else [`Grammar::parse`].
    pub fn from_text(grammar: &str) -> Result<Self, GrammarError> {
        let first_line = grammar.lines().find(|l| !l.trim().is_empty());
        match first_line {
            Some(line) if line.trim().parse::<usize>().is_ok() => Self::parse_compact(grammar),
            _ => Self::parse(grammar),
        }
    }

    /// Parses rules of the form `A -> x y | z`, one symbol per whitespace
    /// separated token. A line starting with `|` continues the previous rule.
    /// The first left side is the start symbol.
    pub fn parse(grammar: &str) -> Result<Self, GrammarError> {
        let mut g = Self::new();

        let mut raw_productions: Vec<(usize, usize, &str)> = Vec::new();

        let mut previous_left: Option<usize> = None;
        for (i, line) in grammar.lines().enumerate() {
            if line.chars().all(|c| c.is_whitespace()) {
                continue;
            }
            let parts: Vec<&str> = line.split("->").collect();
            if parts.len() > 2 {
                return Err(GrammarError::syntax(i + 1, "too many \"->\""));
            }
            let (left, rights): (usize, &str) = if parts.len() == 2 {
                (g.declare_left(parts[0], i + 1)?, parts[1].trim())
            } else {
                match (previous_left, parts[0].trim().strip_prefix('|')) {
                    (Some(idx), Some(rights)) => (idx, rights.trim()),
                    (None, _) => {
                        return Err(GrammarError::syntax(i + 1, "cannot find left side"))
                    }
                    (Some(_), None) => {
                        return Err(GrammarError::syntax(i + 1, "expected \"->\" or \"|\""))
                    }
                }
            };

            previous_left = Some(left);

            raw_productions.push((i + 1, left, rights));
        }

        if raw_productions.is_empty() {
            return Err(GrammarError::Empty);
        }

        for (line, left, rights) in raw_productions {
            for right in rights.split('|') {
                let symbols = right
                    .split_whitespace()
                    .map(|s| g.resolve_right(s, line))
                    .collect::<Result<Vec<_>, _>>()?;
                g.add_production(left, symbols);
            }
        }

        Ok(g)
    }

    /// Parses the compact format: a rule count `N`, then `N` lines
    /// `A -> alt1 | alt2`. Every alternative is either `e` (epsilon) or a
    /// run of single-character symbols; whitespace inside it is ignored, so
    /// an `e` inside a longer alternative is the terminal `e`. The rule for
    /// `S` is mandatory and `S` is the start symbol.
    pub fn parse_compact(grammar: &str) -> Result<Self, GrammarError> {
        let mut lines = grammar
            .lines()
            .enumerate()
            .filter(|(_, l)| !l.trim().is_empty());

        let (count_line, count) = lines.next().ok_or(GrammarError::Empty)?;
        let count: usize = count.trim().parse().map_err(|_| {
            GrammarError::syntax(count_line + 1, "expected the number of rules")
        })?;
        if count == 0 {
            return Err(GrammarError::Empty);
        }
        let rules: Vec<(usize, &str)> = lines.take(count).collect();
        if rules.len() < count {
            return Err(GrammarError::MissingRules {
                expected: count,
                found: rules.len(),
            });
        }

        let mut g = Self::new();
        let mut raw_productions: Vec<(usize, usize, &str)> = Vec::new();
        for (i, line) in rules {
            let (left, rights) = line
                .split_once("->")
                .ok_or_else(|| GrammarError::syntax(i + 1, "missing \"->\""))?;
            if rights.contains("->") {
                return Err(GrammarError::syntax(i + 1, "too many \"->\""));
            }
            raw_productions.push((i + 1, g.declare_left(left, i + 1)?, rights));
        }

        for (line, left, rights) in raw_productions {
            for right in rights.split('|') {
                let right: String = right.split_whitespace().collect();
                let symbols = if right == COMPACT_EPSILON {
                    vec![EPSILON_IDX]
                } else {
                    let mut buf = [0u8; 4];
                    right
                        .chars()
                        .map(|c| g.resolve_right(c.encode_utf8(&mut buf), line))
                        .collect::<Result<Vec<_>, _>>()?
                };
                g.add_production(left, symbols);
            }
        }

        g.start_symbol = g
            .get_symbol_index(COMPACT_START)
            .filter(|&idx| g.is_non_terminal(idx))
            .ok_or_else(|| GrammarError::MissingStartSymbol(COMPACT_START.to_string()))?;

        Ok(g)
    }

    fn declare_left(&mut self, left: &str, line: usize) -> Result<usize, GrammarError> {
        let left = left.trim();
        if left.is_empty() {
            return Err(GrammarError::syntax(line, "empty left side"));
        }
        if left.split_whitespace().count() != 1 {
            return Err(GrammarError::syntax(line, "left side contains whitespace"));
        }
        match self.get_symbol_index(left) {
            Some(idx) if self.is_non_terminal(idx) => Ok(idx),
            Some(_) => Err(GrammarError::syntax(
                line,
                format!("\"{}\" is reserved and cannot have productions", left),
            )),
            None => Ok(self.add_non_terminal(left)),
        }
    }

    fn resolve_right(&mut self, symbol: &str, line: usize) -> Result<usize, GrammarError> {
        if symbol == END_MARK {
            return Err(GrammarError::syntax(
                line,
                format!("\"{}\" is reserved for the end of input", END_MARK),
            ));
        }
        Ok(match self.get_symbol_index(symbol) {
            Some(idx) => idx,
            None => self.add_terminal(symbol.to_string()),
        })
    }
}
