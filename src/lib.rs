extern crate wasm_bindgen;

use serde_json::json;
use wasm_bindgen::prelude::*;

pub mod grammar;
pub mod parser;
pub use grammar::{Analysis, Grammar, GrammarError, TableError};

fn error_json(e: GrammarError) -> String {
    json!({ "error": e.to_string() }).to_string()
}

#[wasm_bindgen]
pub fn first_follow_to_json(grammar: &str) -> String {
    match crate::Grammar::from_text(grammar) {
        Ok(g) => g.analyze().to_non_terminal_output_vec(&g).to_json(),
        Err(e) => error_json(e),
    }
}

/// First/follow sets, classification and conflicts of a grammar as one JSON
/// object.
#[wasm_bindgen]
pub fn analyze_to_json(grammar: &str) -> String {
    match crate::Grammar::from_text(grammar) {
        Ok(g) => {
            let analysis = g.analyze();
            json!({
                "sets": analysis.to_non_terminal_output_vec(&g),
                "classification": analysis.to_classification(&g),
            })
            .to_string()
        }
        Err(e) => error_json(e),
    }
}


#[cfg(test)]
mod nullable_first_follow_test {
    use std::collections::HashSet;

    use crate::grammar::nullable_first_follow::{FirstSets, FollowSets};
    use crate::parser::{tokenize, LL1Parser, SLR1Parser};
    use crate::Grammar;

    fn names(g: &Grammar, set: &HashSet<usize>) -> Vec<String> {
        let mut v: Vec<String> = set
            .iter()
            .map(|&i| g.get_symbol_name(i).to_string())
            .collect();
        v.sort();
        v
    }

    #[test]
    fn optional_prefix_grammar() {
        let g = Grammar::from_text("3\nS -> AB\nA -> aA | e\nB -> b").unwrap();
        let first = FirstSets::compute(&g);
        let follow = FollowSets::compute(&g, &first);
        let (s, a, b) = (
            g.get_symbol_index("S").unwrap(),
            g.get_symbol_index("A").unwrap(),
            g.get_symbol_index("B").unwrap(),
        );

        assert_eq!(names(&g, &first.get(a).terminals), vec!["a"]);
        assert!(first.get(a).nullable);
        assert_eq!(names(&g, &first.get(b).terminals), vec!["b"]);
        assert!(!first.get(b).nullable);
        assert_eq!(names(&g, &first.get(s).terminals), vec!["a", "b"]);
        assert!(!first.get(s).nullable);

        assert_eq!(names(&g, follow.get(a)), vec!["b"]);
        assert_eq!(names(&g, follow.get(b)), vec!["$"]);
        assert_eq!(names(&g, follow.get(s)), vec!["$"]);

        assert!(g.is_ll1(&first, &follow));
        assert!(g.is_slr1(&follow));

        let ll1 = g.build_ll1_table(&first, &follow).unwrap();
        let slr1 = g.build_slr1_tables(&follow).unwrap();
        let ll1 = LL1Parser::new(&g, &ll1);
        let slr1 = SLR1Parser::new(&g, &slr1);
        for (input, expected) in [("ab", true), ("b", true), ("ba", false)] {
            assert_eq!(ll1.parse(&tokenize(input)), expected, "LL(1) {}", input);
            assert_eq!(slr1.parse(&tokenize(input)), expected, "SLR(1) {}", input);
        }
    }

    #[test]
    fn expression_grammar() {
        let g = Grammar::from_text("E -> E + T | T\nT -> T * F | F\nF -> ( E ) | i").unwrap();
        let analysis = g.analyze();
        assert!(!analysis.is_ll1());
        assert!(analysis.is_slr1());
        assert!(analysis.ll1_table.is_none());

        let table = analysis.slr1_table.as_ref().unwrap();
        let parser = SLR1Parser::new(&g, table);
        assert!(parser.parse(&tokenize("i+i*i")));
        assert!(!parser.parse(&tokenize("i+")));

        let g = g.without_left_recursion();
        let analysis = g.analyze();
        assert!(analysis.is_ll1());
        let table = analysis.ll1_table.as_ref().unwrap();
        let parser = LL1Parser::new(&g, table);
        assert!(parser.parse(&tokenize("i+i*i")));
        assert!(parser.parse(&tokenize("(i+i)*i")));
        assert!(!parser.parse(&tokenize("i+")));
    }

    #[test]
    fn ambiguous_grammar() {
        let g = Grammar::from_text("3\nS -> A | B\nA -> a\nB -> a").unwrap();
        let first = FirstSets::compute(&g);
        let follow = FollowSets::compute(&g, &first);
        assert!(!g.is_ll1(&first, &follow));
        assert!(!g.is_slr1(&follow));
        let analysis = g.analyze();
        assert!(analysis.ll1_table.is_none());
        assert!(analysis.slr1_table.is_none());
    }

    #[test]
    fn classification_matches_table_construction() {
        let grammars = [
            "S -> S | a",
            "S -> S A | a\nA -> ϵ",
            "S -> a S | ϵ",
            "S -> A | B\nA -> a\nB -> a",
            "S -> i S | i S e S | a",
            "E -> E + T | T\nT -> T * F | F\nF -> ( E ) | i",
            "3\nS -> AB\nA -> aA | e\nB -> b",
        ];
        for text in grammars {
            let g = Grammar::from_text(text).unwrap();
            let analysis = g.analyze();
            assert_eq!(analysis.is_ll1(), analysis.ll1_table.is_some(), "{}", text);
            assert_eq!(analysis.is_slr1(), analysis.slr1_table.is_some(), "{}", text);
        }
    }

    #[test]
    fn json_facade() {
        let json = crate::first_follow_to_json("S -> a");
        assert_eq!(
            json,
            r#"{"data":[{"name":"S","nullable":false,"first":["a"],"follow":["$"]}]}"#
        );

        let json: serde_json::Value =
            serde_json::from_str(&crate::analyze_to_json("3\nS -> A | B\nA -> a\nB -> a")).unwrap();
        assert_eq!(json["classification"]["ll1"], false);
        assert_eq!(json["classification"]["slr1"], false);

        let json: serde_json::Value =
            serde_json::from_str(&crate::analyze_to_json("1\nA -> a")).unwrap();
        assert!(json["error"].as_str().unwrap().contains("start symbol"));
    }
}

#[cfg(test)]
mod property_tests {
    use proptest::prelude::*;

    use crate::grammar::nullable_first_follow::{FirstSets, FollowSets};
    use crate::grammar::END_MARK_IDX;
    use crate::parser::{LL1Parser, SLR1Parser};
    use crate::Grammar;

    const NON_TERMINALS: [&str; 3] = ["S", "A", "B"];
    const TERMINALS: [&str; 3] = ["a", "b", "c"];

    /// Random grammars over `S`, `A`, `B` and `a`, `b`, `c`, written in the
    /// spaced format. Empty alternatives are epsilon.
    fn grammar_text() -> impl Strategy<Value = String> {
        let symbol = prop_oneof![
            (0..NON_TERMINALS.len()).prop_map(|i| NON_TERMINALS[i]),
            (0..TERMINALS.len()).prop_map(|i| TERMINALS[i]),
        ];
        let alternative = prop::collection::vec(symbol, 0..4).prop_map(|s| s.join(" "));
        let rule = prop::collection::vec(alternative, 1..4).prop_map(|a| a.join(" | "));
        prop::collection::vec(rule, 3).prop_map(|rules| {
            rules
                .iter()
                .zip(NON_TERMINALS.iter())
                .map(|(rule, left)| format!("{} -> {}", left, rule))
                .collect::<Vec<_>>()
                .join("\n")
        })
    }

    fn input() -> impl Strategy<Value = Vec<&'static str>> {
        prop::collection::vec((0..TERMINALS.len()).prop_map(|i| TERMINALS[i]), 0..6)
    }

    proptest! {
        #[test]
        fn follow_of_start_has_end_mark(text in grammar_text()) {
            let g = Grammar::parse(&text).unwrap();
            let first = FirstSets::compute(&g);
            let follow = FollowSets::compute(&g, &first);
            prop_assert!(follow.get(g.start_symbol).contains(&END_MARK_IDX));
        }

        #[test]
        fn nullable_iff_some_production_vanishes(text in grammar_text()) {
            let g = Grammar::parse(&text).unwrap();
            let first = FirstSets::compute(&g);
            for nt in g.non_terminal_iter() {
                let vanishes = nt.productions.iter().any(|p| {
                    p.iter().all(|&s| first.get(s).nullable)
                });
                prop_assert_eq!(first.get(nt.index).nullable, vanishes);
            }
        }

        #[test]
        fn ll1_grammars_build_tables(text in grammar_text()) {
            let g = Grammar::parse(&text).unwrap();
            let first = FirstSets::compute(&g);
            let follow = FollowSets::compute(&g, &first);
            if g.is_ll1(&first, &follow) {
                prop_assert!(g.build_ll1_table(&first, &follow).is_ok());
            }
        }

        #[test]
        fn slr1_grammars_build_tables(text in grammar_text()) {
            let g = Grammar::parse(&text).unwrap();
            let first = FirstSets::compute(&g);
            let follow = FollowSets::compute(&g, &first);
            if g.is_slr1(&follow) {
                prop_assert!(g.build_slr1_tables(&follow).is_ok());
            }
        }

        #[test]
        fn parsing_is_repeatable(text in grammar_text(), tokens in input()) {
            let g = Grammar::parse(&text).unwrap();
            let analysis = g.analyze();
            if let Some(table) = &analysis.ll1_table {
                let parser = LL1Parser::new(&g, table);
                prop_assert_eq!(parser.parse(&tokens), parser.parse(&tokens));
            }
            if let Some(table) = &analysis.slr1_table {
                let parser = SLR1Parser::new(&g, table);
                prop_assert_eq!(parser.parse(&tokens), parser.parse(&tokens));
            }
        }

        #[test]
        fn ll1_and_slr1_agree(text in grammar_text(), tokens in input()) {
            let g = Grammar::parse(&text).unwrap();
            let analysis = g.analyze();
            if let (Some(ll1), Some(slr1)) = (&analysis.ll1_table, &analysis.slr1_table) {
                prop_assert_eq!(
                    LL1Parser::new(&g, ll1).parse(&tokens),
                    SLR1Parser::new(&g, slr1).parse(&tokens)
                );
            }
        }
    }
}
