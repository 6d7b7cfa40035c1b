// Copyright (c) 2018 Fabian Schuiki

//! Rewriting of grammars into a form suitable for top-down parsing.
//!
//! This module removes left recursion and extracts common left factors. Both
//! transformations rewrite the rules wholesale and synthesize new nonterminals
//! named after the one they were split off from, with primes appended.

use indexmap::IndexMap;

use grammar::{concat, Grammar, NonterminalId, Production, Symbol};

impl Grammar {
    /// Remove direct and indirect left recursion.
    ///
    /// The nonterminals are processed in rule order. For every pair `j < i`,
    /// productions of `i` that start with `j` are replaced by `j`'s current
    /// productions followed by the remainder. Afterwards the immediate left
    /// recursion of each nonterminal is removed by introducing a tail
    /// nonterminal. Indirect recursion through nonterminals that appear later
    /// in the order than the one they recurse into is not caught.
    pub fn eliminate_left_recursion(&mut self) {
        let order: Vec<NonterminalId> = self.nonterminals().collect();
        for i in 0..order.len() {
            for j in 0..i {
                self.substitute_leading(order[i], order[j]);
            }
        }
        for &nt in &order {
            self.eliminate_immediate_left_recursion(nt);
        }
    }

    /// Replace productions of `id` that start with `target` by the cross
    /// product with `target`'s productions.
    fn substitute_leading(&mut self, id: NonterminalId, target: NonterminalId) {
        let replacements = self.productions(target).to_vec();
        let leading = Symbol::Nonterminal(target);
        if !self.productions(id).iter().any(|p| p[0] == leading) {
            return;
        }
        debug!(
            "substituting {} into {}",
            target.pretty(self),
            id.pretty(self)
        );
        let rules = self.rules_mut();
        if let Some(productions) = rules.get_mut(&id) {
            let old = ::std::mem::replace(productions, Vec::new());
            for production in old {
                if production[0] == leading {
                    for r in &replacements {
                        productions.push(concat(r, &production[1..]));
                    }
                } else {
                    productions.push(production);
                }
            }
        }
    }

    /// Split `A -> A α | β` into `A -> β A'` and `A' -> α A' | ε`.
    fn eliminate_immediate_left_recursion(&mut self, id: NonterminalId) {
        let leading = Symbol::Nonterminal(id);
        let (recursive, base): (Vec<Production>, Vec<Production>) = self.productions(id)
            .iter()
            .cloned()
            .partition(|p| p[0] == leading);
        if recursive.is_empty() {
            return;
        }
        if base.is_empty() {
            warn!(
                "{} is left recursive without a base production",
                id.pretty(self)
            );
        }

        let tail = self.fresh_nonterminal(id);
        let tail_symbol = [Symbol::Nonterminal(tail)];
        debug!(
            "eliminating left recursion of {} via {}",
            id.pretty(self),
            tail.pretty(self)
        );

        let base: Vec<Production> = base.iter().map(|p| concat(p, &tail_symbol)).collect();
        let mut tail_productions: Vec<Production> = recursive
            .iter()
            .filter(|p| p.len() > 1)
            .map(|p| concat(&p[1..], &tail_symbol))
            .collect();
        tail_productions.push(vec![Symbol::Epsilon]);

        let rules = self.rules_mut();
        rules.insert(id, base);
        rules.insert(tail, tail_productions);
    }

    /// Extract common left factors.
    ///
    /// The productions of each nonterminal are grouped by their first symbol.
    /// Every group with more than one production is replaced by its longest
    /// common prefix followed by a new nonterminal that derives the remaining
    /// suffixes. The new nonterminals are factored in turn and placed right
    /// after the nonterminal they were split off from.
    pub fn extract_left_common_factor(&mut self) {
        let order: Vec<NonterminalId> = self.nonterminals().collect();
        let mut rules = IndexMap::new();
        for id in order {
            let productions = self.productions(id).to_vec();
            self.factor_into(id, productions, &mut rules);
        }
        self.replace_rules(rules);
    }

    fn factor_into(
        &mut self,
        id: NonterminalId,
        productions: Vec<Production>,
        into: &mut IndexMap<NonterminalId, Vec<Production>>,
    ) {
        let mut groups: IndexMap<Symbol, Vec<Production>> = IndexMap::new();
        for production in productions {
            let group = groups.entry(production[0]).or_insert_with(Vec::new);
            if !group.contains(&production) {
                group.push(production);
            }
        }

        let mut factored = Vec::new();
        let mut helpers = Vec::new();
        for (_, group) in groups {
            if group.len() < 2 {
                factored.extend(group);
                continue;
            }
            let len = common_prefix_len(&group);
            let helper = self.fresh_nonterminal(id);
            debug!(
                "factoring {} symbols of {} into {}",
                len,
                id.pretty(self),
                helper.pretty(self)
            );
            let mut prefix = group[0][..len].to_vec();
            prefix.push(Symbol::Nonterminal(helper));
            factored.push(prefix);
            let suffixes: Vec<Production> = group.iter().map(|p| concat(&p[len..], &[])).collect();
            helpers.push((helper, suffixes));
        }

        into.insert(id, factored);
        for (helper, suffixes) in helpers {
            self.factor_into(helper, suffixes, into);
        }
    }
}

/// The length of the longest prefix shared by all productions.
fn common_prefix_len(productions: &[Production]) -> usize {
    let first = &productions[0];
    let mut len = first.len();
    for p in &productions[1..] {
        len = len.min(first.iter().zip(p.iter()).take_while(|&(a, b)| a == b).count());
    }
    len
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grammar(rules: Vec<(&str, Vec<Vec<&str>>)>) -> Grammar {
        Grammar::from_rules(None, rules).unwrap()
    }

    fn assert_no_left_recursion(g: &Grammar) {
        for nt in g.nonterminals() {
            for p in g.productions(nt) {
                assert!(p[0] != Symbol::Nonterminal(nt), "{} is left recursive", nt.pretty(g));
            }
        }
    }

    fn assert_no_common_prefix(g: &Grammar) {
        for nt in g.nonterminals() {
            let ps = g.productions(nt);
            for i in 0..ps.len() {
                for j in i + 1..ps.len() {
                    assert!(ps[i][0] != ps[j][0], "{} shares a prefix", nt.pretty(g));
                }
            }
        }
    }

    #[test]
    fn non_recursive_unchanged() {
        let mut g = grammar(vec![
            ("S", vec![vec!["A", "B"]]),
            ("A", vec![vec!["a", "A"], vec!["ε"]]),
            ("B", vec![vec!["b"]]),
        ]);
        let before = format!("{}", g);
        g.eliminate_left_recursion();
        assert_eq!(format!("{}", g), before);
    }

    #[test]
    fn direct_recursion() {
        let mut g = grammar(vec![
            ("S", vec![vec!["S", "+", "T"], vec!["T"]]),
            ("T", vec![vec!["T", "*", "F"], vec!["F"]]),
            ("F", vec![vec!["(", "E", ")"], vec!["id"]]),
        ]);
        g.eliminate_left_recursion();
        assert_no_left_recursion(&g);
        assert_eq!(
            format!("{}", g),
            "S -> T S'\n\
             T -> F T'\n\
             F -> ( E ) | id\n\
             S' -> + T S' | ε\n\
             T' -> * F T' | ε"
        );
    }

    #[test]
    fn indirect_recursion() {
        let mut g = grammar(vec![
            ("S", vec![vec!["A", "a"], vec!["b"]]),
            ("A", vec![vec!["S", "c"], vec!["d"]]),
        ]);
        g.eliminate_left_recursion();
        assert_no_left_recursion(&g);
        assert_eq!(
            format!("{}", g),
            "S -> A a | b\n\
             A -> b c A' | d A'\n\
             A' -> a c A' | ε"
        );
    }

    #[test]
    fn epsilon_base_production() {
        let mut g = grammar(vec![("L", vec![vec!["L", "x"], vec!["ε"]])]);
        g.eliminate_left_recursion();
        assert_eq!(format!("{}", g), "L -> L'\nL' -> x L' | ε");
    }

    #[test]
    fn simple_factor() {
        let mut g = grammar(vec![(
            "S",
            vec![vec!["i", "E", "t", "S"], vec!["i", "E", "t", "S", "e", "S"], vec!["a"]],
        )]);
        g.extract_left_common_factor();
        assert_no_common_prefix(&g);
        assert_eq!(format!("{}", g), "S -> i E t S S' | a\nS' -> ε | e S");
    }

    #[test]
    fn nested_factors() {
        let mut g = grammar(vec![(
            "A",
            vec![vec!["a", "b", "c"], vec!["a", "b", "d"], vec!["a", "e"], vec!["f"]],
        )]);
        g.extract_left_common_factor();
        assert_no_common_prefix(&g);
        assert_eq!(
            format!("{}", g),
            "A -> a A' | f\n\
             A' -> b A'' | e\n\
             A'' -> c | d"
        );
    }

    #[test]
    fn factor_keeps_rule_order() {
        let mut g = grammar(vec![
            ("S", vec![vec!["x", "y"], vec!["x", "z"]]),
            ("T", vec![vec!["u"]]),
        ]);
        g.extract_left_common_factor();
        assert_eq!(format!("{}", g), "S -> x S'\nS' -> y | z\nT -> u");
    }

    #[test]
    fn duplicates_collapse() {
        let mut g = grammar(vec![("S", vec![vec!["a"], vec!["a"], vec!["b"]])]);
        g.extract_left_common_factor();
        assert_eq!(format!("{}", g), "S -> a | b");
    }

    #[test]
    fn transformations_clear_sets() {
        let mut g = grammar(vec![("S", vec![vec!["S", "a"], vec!["b"]])]);
        g.compute_follow();
        assert!(g.first_sets().is_some());
        g.eliminate_left_recursion();
        assert!(g.first_sets().is_none());
        assert!(g.follow_sets().is_none());
    }
}
