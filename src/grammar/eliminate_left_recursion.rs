use std::collections::HashMap;

use super::{Grammar, EPSILON_IDX};

fn splice(prefix: &[usize], rest: &[usize]) -> Vec<usize> {
    prefix
        .iter()
        .chain(rest.iter())
        .cloned()
        .filter(|&s| s != EPSILON_IDX)
        .collect()
}

impl Grammar {
    /// Returns an equivalent grammar without left recursion.
    ///
    /// Nonterminals are processed in declaration order. Productions of `A`
    /// starting with an earlier nonterminal get that nonterminal's
    /// productions substituted in; the remaining `A -> A α | β` becomes
    /// `A -> β A'`, `A' -> α A' | ϵ`. Cycles `A -> A` are dropped.
    pub fn without_left_recursion(&self) -> Grammar {
        let mut g = self.clone();

        let order: Vec<usize> = g.non_terminal_iter().map(|nt| nt.index).collect();
        let rank: HashMap<usize, usize> =
            order.iter().enumerate().map(|(i, &nt)| (nt, i)).collect();

        for (i, &nt) in order.iter().enumerate() {
            let old_productions = match g.non_terminal_mut(nt) {
                Some(nt) => std::mem::take(&mut nt.productions),
                None => continue,
            };

            let mut expanded: Vec<Vec<usize>> = Vec::new();
            for production in old_productions {
                match production.first().and_then(|s| rank.get(s)) {
                    Some(&j) if j < i => {
                        for prefix in g.productions(production[0]) {
                            expanded.push(splice(prefix, &production[1..]));
                        }
                    }
                    _ => expanded.push(production),
                }
            }

            let (recursive, mut productions): (Vec<_>, Vec<_>) =
                expanded.into_iter().partition(|p| p.first() == Some(&nt));
            let mut recursive: Vec<Vec<usize>> = recursive
                .into_iter()
                .map(|p| p[1..].to_vec())
                .filter(|tail| !tail.is_empty())
                .collect();

            if recursive.is_empty() {
                for production in productions {
                    g.add_production(nt, production);
                }
                continue;
            }

            let name = g.get_symbol_prime_name(g.get_symbol_name(nt).to_string());
            let nt_prime = g.add_non_terminal(&name);
            for production in &mut productions {
                production.retain(|&s| s != EPSILON_IDX);
                production.push(nt_prime);
            }
            for production in &mut recursive {
                production.push(nt_prime);
            }
            recursive.push(vec![EPSILON_IDX]);

            log::debug!(
                "removed left recursion of {} with {}",
                g.get_symbol_name(nt),
                name
            );
            for production in productions {
                g.add_production(nt, production);
            }
            for production in recursive {
                g.add_production(nt_prime, production);
            }
        }

        g
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn productions(g: &Grammar) -> String {
        g.to_production_output_vec().to_plaintext()
    }

    #[test]
    fn immediate_left_recursion() {
        let g = Grammar::parse("E -> E + T | T\nT -> T * F | F\nF -> ( E ) | i").unwrap();
        let g = g.without_left_recursion();
        assert_eq!(
            productions(&g),
            [
                " E -> T E'",
                " T -> F T'",
                " F -> ( E )",
                "    | i",
                "E' -> + T E'",
                "    | ϵ",
                "T' -> * F T'",
                "    | ϵ",
            ]
            .join("\n")
        );
    }

    #[test]
    fn indirect_left_recursion() {
        let g = Grammar::parse("S -> A a | b\nA -> S c | d").unwrap();
        let g = g.without_left_recursion();
        // A -> A a c | b c | d  becomes  A -> b c A' | d A', A' -> a c A' | ϵ
        let a = g.get_symbol_index("A").unwrap();
        let a_prime = g.get_symbol_index("A'").unwrap();
        assert_eq!(g.productions(a).len(), 2);
        assert_eq!(g.productions(a_prime).len(), 2);
        for nt in g.non_terminal_iter() {
            for p in &nt.productions {
                assert_ne!(p.first(), Some(&nt.index));
            }
        }
    }

    #[test]
    fn grammar_without_left_recursion_is_unchanged() {
        let g = Grammar::parse("S -> a S | b").unwrap();
        assert_eq!(productions(&g.without_left_recursion()), productions(&g));
    }
}
