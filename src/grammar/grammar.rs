use std::collections::HashMap;

use super::{END_MARK, END_MARK_IDX, EPSILON, EPSILON_IDX};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonTerminal {
    pub index: usize,
    pub name: String,
    pub productions: Vec<Vec<usize>>,
}

impl NonTerminal {
    pub fn new(index: usize, name: String) -> Self {
        Self {
            index,
            name,
            productions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Symbol {
    NonTerminal(NonTerminal),
    Terminal(String),
}

impl Symbol {
    pub fn non_terminal(&self) -> Option<&NonTerminal> {
        match self {
            Symbol::NonTerminal(e) => Some(e),
            Symbol::Terminal(_) => None,
        }
    }

    pub fn mut_non_terminal(&mut self) -> Option<&mut NonTerminal> {
        match self {
            Symbol::NonTerminal(e) => Some(e),
            Symbol::Terminal(_) => None,
        }
    }
}

/// A context-free grammar over interned symbols.
///
/// Index [`EPSILON_IDX`] is the epsilon sentinel (stored as a nonterminal
/// without productions) and index [`END_MARK_IDX`] is the end-of-input
/// terminal. A production is either the single-element epsilon production
/// `[EPSILON_IDX]` or a sequence containing no epsilon at all.
#[derive(Debug, Clone)]
pub struct Grammar {
    pub symbols: Vec<Symbol>,
    pub symbol_table: HashMap<String, usize>,
    pub start_symbol: usize,
}

impl Default for Grammar {
    fn default() -> Self {
        Self::new()
    }
}

impl Grammar {
    /// An empty grammar. Its start symbol is epsilon until the first
    /// nonterminal is added, so a grammar without rules derives only the
    /// empty string and both parsers accept exactly `""`.
    pub fn new() -> Self {
        let mut g = Self {
            symbols: Vec::new(),
            symbol_table: HashMap::new(),
            start_symbol: EPSILON_IDX,
        };

        g.symbols
            .push(Symbol::NonTerminal(NonTerminal::new(EPSILON_IDX, EPSILON.to_string())));
        g.symbol_table.insert(EPSILON.to_string(), EPSILON_IDX);
        g.symbol_table.insert("ε".to_string(), EPSILON_IDX);

        g.add_terminal(END_MARK.to_string());

        g
    }

    /// Indices of all terminals, the end marker included.
    pub fn terminal_indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.symbols.len()).filter(move |&i| self.is_terminal(i))
    }

    pub fn non_terminal_iter(&self) -> impl Iterator<Item = &NonTerminal> {
        // skip(1): skip epsilon
        self.symbols.iter().filter_map(|s| s.non_terminal()).skip(1)
    }

    pub fn non_terminal_mut(&mut self, index: usize) -> Option<&mut NonTerminal> {
        if index == EPSILON_IDX {
            return None;
        }
        self.symbols.get_mut(index).and_then(|s| s.mut_non_terminal())
    }

    pub fn is_terminal(&self, index: usize) -> bool {
        matches!(self.symbols.get(index), Some(Symbol::Terminal(_)))
    }

    /// Whether `index` names a nonterminal. Epsilon is neither terminal nor
    /// nonterminal.
    pub fn is_non_terminal(&self, index: usize) -> bool {
        index != EPSILON_IDX && matches!(self.symbols.get(index), Some(Symbol::NonTerminal(_)))
    }

    pub fn productions(&self, index: usize) -> &[Vec<usize>] {
        match self.symbols.get(index).and_then(|s| s.non_terminal()) {
            Some(nt) => &nt.productions,
            None => &[],
        }
    }

    pub fn production(&self, left: usize, production: usize) -> &[usize] {
        self.productions(left)
            .get(production)
            .map(|p| p.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_epsilon_production(production: &[usize]) -> bool {
        production.iter().all(|&s| s == EPSILON_IDX)
    }

    /// Number of grammar symbols a production puts on a parser stack.
    pub fn production_len(production: &[usize]) -> usize {
        production.iter().filter(|&&s| s != EPSILON_IDX).count()
    }

    pub fn get_symbol_index(&self, name: &str) -> Option<usize> {
        self.symbol_table.get(name).cloned()
    }

    pub fn add_non_terminal(&mut self, name: &str) -> usize {
        let idx = self.symbols.len();
        self.symbols
            .push(Symbol::NonTerminal(NonTerminal::new(idx, name.to_string())));
        self.symbol_table.insert(name.to_string(), idx);
        if self.start_symbol == EPSILON_IDX {
            self.start_symbol = idx;
        }
        idx
    }

    pub fn add_terminal(&mut self, name: String) -> usize {
        let idx = self.symbols.len();
        self.symbols.push(Symbol::Terminal(name.clone()));
        self.symbol_table.insert(name, idx);
        idx
    }

    /// Appends a production to `left`. Epsilon is dropped from longer bodies
    /// and an empty body becomes the epsilon production.
    pub fn add_production(&mut self, left: usize, right: Vec<usize>) {
        let mut right: Vec<usize> = right.into_iter().filter(|&s| s != EPSILON_IDX).collect();
        if right.is_empty() {
            right.push(EPSILON_IDX);
        }
        if let Some(nt) = self.non_terminal_mut(left) {
            nt.productions.push(right);
        }
    }

    pub fn get_symbol_name(&self, index: usize) -> &str {
        match &self.symbols[index] {
            Symbol::NonTerminal(e) => e.name.as_str(),
            Symbol::Terminal(e) => e.as_str(),
        }
    }

    pub fn production_to_vec_str(&self, production: &[usize]) -> Vec<&str> {
        production
            .iter()
            .map(|idx| self.get_symbol_name(*idx))
            .collect()
    }

    pub fn get_symbol_prime_name(&self, mut name: String) -> String {
        while self.symbol_table.contains_key(&name) {
            name.push('\'');
        }
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epsilon_and_end_mark_are_reserved() {
        let g = Grammar::new();
        assert_eq!(g.get_symbol_index("ϵ"), Some(EPSILON_IDX));
        assert_eq!(g.get_symbol_index("ε"), Some(EPSILON_IDX));
        assert_eq!(g.get_symbol_index("$"), Some(END_MARK_IDX));
        assert!(!g.is_non_terminal(EPSILON_IDX));
        assert!(!g.is_terminal(EPSILON_IDX));
        assert!(g.is_terminal(END_MARK_IDX));
        assert_eq!(g.non_terminal_iter().count(), 0);
    }

    #[test]
    fn first_non_terminal_becomes_start() {
        let mut g = Grammar::new();
        let s = g.add_non_terminal("S");
        let _a = g.add_non_terminal("A");
        assert_eq!(g.start_symbol, s);
    }

    #[test]
    fn productions_are_normalized() {
        let mut g = Grammar::new();
        let s = g.add_non_terminal("S");
        let a = g.add_terminal("a".to_string());
        g.add_production(s, vec![]);
        g.add_production(s, vec![EPSILON_IDX, a, EPSILON_IDX]);
        assert_eq!(g.productions(s), &[vec![EPSILON_IDX], vec![a]]);
        assert!(Grammar::is_epsilon_production(g.production(s, 0)));
        assert_eq!(Grammar::production_len(g.production(s, 0)), 0);
        assert_eq!(Grammar::production_len(g.production(s, 1)), 1);
    }

    #[test]
    fn prime_names_avoid_collisions() {
        let mut g = Grammar::new();
        g.add_non_terminal("S");
        g.add_non_terminal("S'");
        assert_eq!(g.get_symbol_prime_name("S'".to_string()), "S''");
    }
}
