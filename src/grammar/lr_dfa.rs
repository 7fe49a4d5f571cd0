use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use crate::Grammar;

use super::{END_MARK_IDX, EPSILON_IDX};

/// An LR(0) item: production `production` of `left` with the dot before
/// symbol `position`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DotProduction {
    pub left: usize,
    pub production: usize,
    pub position: usize,
}

impl DotProduction {
    /// The item with the dot at the start. The dot of an epsilon production
    /// is placed after the epsilon, so that item is already complete.
    pub fn new(g: &Grammar, left: usize, production: usize) -> Self {
        let body = g.production(left, production);
        let mut i = 0;
        while i < body.len() && body[i] == EPSILON_IDX {
            i += 1;
        }
        Self {
            left,
            production,
            position: i,
        }
    }

    pub fn generate_next(&self) -> Self {
        Self {
            position: self.position + 1,
            ..*self
        }
    }

    /// Symbol right after the dot, `None` once the item is complete.
    pub fn next_symbol(&self, g: &Grammar) -> Option<usize> {
        g.production(self.left, self.production)
            .get(self.position)
            .cloned()
    }

    pub fn is_complete(&self, g: &Grammar) -> bool {
        self.next_symbol(g).is_none()
    }
}

/// Items kept sorted, so equal states compare and hash equal.
pub type ItemSet = BTreeSet<DotProduction>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LRItem {
    pub items: ItemSet,
    pub edges: BTreeMap<usize, usize>,
}

impl LRItem {
    fn new(items: ItemSet) -> Self {
        Self {
            items,
            edges: BTreeMap::new(),
        }
    }
}

/// The canonical collection of LR(0) item sets of the augmented grammar.
///
/// `grammar` is a copy of the analyzed grammar with one more nonterminal,
/// `accept_symbol`, whose only production is `accept_symbol -> start`.
/// Every other symbol keeps its index.
#[derive(Debug, Clone)]
pub struct LR0Automaton {
    pub grammar: Grammar,
    pub accept_symbol: usize,
    pub states: Vec<LRItem>,
    pub start: usize,
}

impl LR0Automaton {
    pub fn build(g: &Grammar) -> Self {
        let mut grammar = g.clone();
        let real_start = g.start_symbol;
        let dummy_start =
            grammar.get_symbol_prime_name(g.get_symbol_name(real_start).to_string());
        let accept_symbol = grammar.add_non_terminal(&dummy_start);
        grammar.add_production(accept_symbol, vec![real_start]);
        grammar.start_symbol = real_start;

        // terminals but the end marker, then nonterminals but the augmented start
        let alphabet: Vec<usize> = g
            .terminal_indices()
            .filter(|&s| s != END_MARK_IDX)
            .chain(g.non_terminal_iter().map(|nt| nt.index))
            .collect();

        let mut automaton = Self {
            grammar,
            accept_symbol,
            states: Vec::new(),
            start: 0,
        };

        let start_item = DotProduction::new(&automaton.grammar, accept_symbol, 0);
        let start_state = automaton.closure(ItemSet::from([start_item]));
        let mut index: HashMap<ItemSet, usize> = HashMap::from([(start_state.clone(), 0)]);
        automaton.states.push(LRItem::new(start_state));
        let mut q: VecDeque<usize> = VecDeque::from([0]);

        while let Some(u) = q.pop_front() {
            for &symbol in &alphabet {
                let target = automaton.goto(&automaton.states[u].items, symbol);
                if target.is_empty() {
                    continue;
                }
                let v = match index.get(&target) {
                    Some(&v) => v,
                    None => {
                        let v = automaton.states.len();
                        index.insert(target.clone(), v);
                        automaton.states.push(LRItem::new(target));
                        q.push_back(v);
                        v
                    }
                };
                automaton.states[u].edges.insert(symbol, v);
            }
        }
        log::debug!("LR(0) automaton with {} states", automaton.states.len());

        automaton
    }

    /// Adds `B -> .γ` for every item with the dot before a nonterminal `B`,
    /// until nothing new appears.
    pub fn closure(&self, items: ItemSet) -> ItemSet {
        let g = &self.grammar;
        let mut closed = items;
        let mut q: VecDeque<DotProduction> = closed.iter().cloned().collect();
        while let Some(item) = q.pop_front() {
            if let Some(symbol) = item.next_symbol(g).filter(|&s| g.is_non_terminal(s)) {
                for production in 0..g.productions(symbol).len() {
                    let new_item = DotProduction::new(g, symbol, production);
                    if closed.insert(new_item) {
                        q.push_back(new_item);
                    }
                }
            }
        }
        closed
    }

    /// Closure of the items of `items` with the dot moved past `symbol`.
    /// Empty when no item expects `symbol`.
    pub fn goto(&self, items: &ItemSet, symbol: usize) -> ItemSet {
        let kernel: ItemSet = items
            .iter()
            .filter(|i| i.next_symbol(&self.grammar) == Some(symbol))
            .map(|i| i.generate_next())
            .collect();
        if kernel.is_empty() {
            return kernel;
        }
        self.closure(kernel)
    }

    /// Whether `item` did not come from a closure: the initial item, or an
    /// item whose dot has moved past a real symbol.
    pub fn is_kernel(&self, item: &DotProduction) -> bool {
        item.left == self.accept_symbol
            || (item.position > 0
                && !Grammar::is_epsilon_production(
                    self.grammar.production(item.left, item.production),
                ))
    }

    pub fn transition(&self, state: usize, symbol: usize) -> Option<usize> {
        self.states
            .get(state)
            .and_then(|s| s.edges.get(&symbol))
            .cloned()
    }
}

impl Grammar {
    pub fn to_lr0_fsm(&self) -> LR0Automaton {
        LR0Automaton::build(self)
    }
}
