// Copyright (c) 2018 Fabian Schuiki

//! First set computation.
//!
//! This module implements computation of the first sets for a grammar. The
//! first set of a nonterminal states all terminals that can appear as the first
//! symbol of a string it derives. Since rules may contain other rules and
//! epsilon productions, computation is somewhat tricky: the sets are grown in
//! rounds until none of them changes anymore.

use std::fmt;
use std::mem::swap;
use std::iter::repeat;
use bit_set::BitSet;

use Pretty;
use grammar::{Grammar, NonterminalId, Symbol, TerminalId, EPSILON_NAME};

/// All first sets of a grammar.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FirstSets(Vec<FirstSet>);

/// The first set of a nonterminal or symbol string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FirstSet {
    /// The first symbols.
    pub(crate) symbols: BitSet,
    /// Whether the empty string can be derived.
    pub(crate) has_epsilon: bool,
}

impl FirstSets {
    /// Compute the first sets of a grammar.
    pub fn compute(grammar: &Grammar) -> FirstSets {
        compute(grammar)
    }

    /// The first set of a nonterminal.
    pub fn get(&self, id: NonterminalId) -> &FirstSet {
        &self.0[id.as_usize()]
    }

    /// The first set of a single symbol.
    pub fn of_symbol(&self, symbol: Symbol) -> FirstSet {
        match symbol {
            Symbol::Terminal(id) => {
                let mut set = FirstSet::new();
                set.symbols.insert(id.as_usize());
                set
            }
            Symbol::Nonterminal(id) => self.get(id).clone(),
            Symbol::Epsilon => FirstSet {
                symbols: BitSet::new(),
                has_epsilon: true,
            },
        }
    }

    /// The first set of a string of symbols.
    ///
    /// Contains epsilon if every symbol in the string can derive the empty
    /// string, which includes the empty string itself.
    pub fn of_sequence(&self, symbols: &[Symbol]) -> FirstSet {
        let mut set = FirstSet::new();
        let tight = collect_symbols(symbols, &mut |symbol: &Symbol| match *symbol {
            Symbol::Terminal(id) => {
                set.symbols.insert(id.as_usize());
                true
            }
            Symbol::Nonterminal(id) => {
                let other = self.get(id);
                set.symbols.union_with(&other.symbols);
                !other.has_epsilon
            }
            Symbol::Epsilon => false,
        });
        set.has_epsilon = !tight;
        set
    }

    /// Get a pretty printer for these first sets.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

impl FirstSet {
    /// Create an empty first set.
    pub fn new() -> FirstSet {
        FirstSet {
            symbols: BitSet::new(),
            has_epsilon: false,
        }
    }

    /// The terminals in the set, in id order.
    pub fn terminals<'a>(&'a self) -> impl Iterator<Item = TerminalId> + 'a {
        self.symbols.iter().map(TerminalId::from_usize)
    }

    /// Check whether a terminal is in the set.
    pub fn contains(&self, id: TerminalId) -> bool {
        self.symbols.contains(id.as_usize())
    }

    /// Check whether the empty string is in the set.
    pub fn has_epsilon(&self) -> bool {
        self.has_epsilon
    }

    /// Check whether the set holds neither terminals nor epsilon.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty() && !self.has_epsilon
    }

    /// Get a pretty printer for this first set.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

/// The meat of this module. Computes the first set for each nonterminal in a
/// grammar.
fn compute(grammar: &Grammar) -> FirstSets {
    let num_term = grammar.terminal_id_bound();
    let num_nonterm = grammar.nonterminal_id_bound();

    // Determine the sets of nonterminals to be updated.
    let mut update = BitSet::with_capacity(num_nonterm);
    let mut next_update = BitSet::with_capacity(num_nonterm);
    for id in grammar.nonterminals() {
        update.insert(id.as_usize());
    }

    // Create the initial empty first sets. These will be populated in the main
    // loop.
    let mut fs = FirstSets(
        repeat(FirstSet {
            symbols: BitSet::with_capacity(num_term),
            has_epsilon: false,
        }).take(num_nonterm)
            .collect(),
    );

    // Create a list to keep track of dependencies between the rules.
    let mut deps: Vec<BitSet> = repeat(BitSet::with_capacity(num_nonterm))
        .take(num_nonterm)
        .collect();

    // This is the main update loop which processes nonterminals in sets.
    let mut round = 0;
    while !update.is_empty() {
        round += 1;
        trace!("first set round {}: {} nonterminals", round, update.len());
        for current in update.iter() {
            if next_update.contains(current) {
                continue;
            }
            let mut new_fs = fs.0[current].clone();

            // Update the first set and dependencies.
            for production in grammar.productions(NonterminalId::from_usize(current)) {
                let tight = collect_symbols(production, &mut |symbol: &Symbol| match *symbol {
                    Symbol::Terminal(id) => {
                        new_fs.symbols.insert(id.as_usize());
                        true
                    }
                    Symbol::Nonterminal(id) => {
                        let other = &fs.0[id.as_usize()];
                        deps[id.as_usize()].insert(current);
                        new_fs.symbols.union_with(&other.symbols);
                        !other.has_epsilon
                    }
                    Symbol::Epsilon => false,
                });
                new_fs.has_epsilon |= !tight;
            }

            // If the first set has changed, trigger an update of everything
            // that depends on us.
            if new_fs != fs.0[current] {
                fs.0[current] = new_fs;
                next_update.union_with(&deps[current]);
            }
        }

        // If we've cleared the update set, swap in the next update set.
        swap(&mut update, &mut next_update);
        next_update.clear();
    }
    debug!("first sets settled after {} rounds", round);

    fs
}

/// Call a closure on each possible first symbol.
///
/// Given a sequence of symbols, determine which ones should belong into the
/// first set. Returns `true` if the sequence is *tight*, that is, it cannot
/// derive epsilon. A sequence with a terminal is tight. Nonterminals may or
/// may not be tight, depending on their first set. The callback function `f`
/// must return `true` if the symbol causes the sequence to be tight.
fn collect_symbols<'a, I, F>(symbols: I, f: &mut F) -> bool
where
    I: IntoIterator<Item = &'a Symbol>,
    F: FnMut(&Symbol) -> bool,
{
    for symbol in symbols {
        if f(symbol) {
            return true;
        }
    }
    false
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a FirstSet> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{")?;
        let mut sep = "";
        for id in self.item.terminals() {
            write!(f, "{}{}", sep, id.pretty(self.ctx))?;
            sep = ", ";
        }
        if self.item.has_epsilon {
            write!(f, "{}{}", sep, EPSILON_NAME)?;
        }
        write!(f, "}}")
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a FirstSets> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (index, id) in self.ctx.nonterminals().enumerate() {
            if index > 0 {
                write!(f, "\n")?;
            }
            write!(
                f,
                "{}: {}",
                id.pretty(self.ctx),
                self.item.get(id).pretty(self.ctx)
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Grammar {
        Grammar::from_rules(
            Some("S"),
            vec![
                ("S", vec![vec!["A", "B"]]),
                ("A", vec![vec!["a", "A"], vec!["ε"]]),
                ("B", vec![vec!["b"]]),
            ],
        ).unwrap()
    }

    fn show(g: &Grammar, set: &FirstSet) -> String {
        format!("{}", set.pretty(g))
    }

    #[test]
    fn nullable_prefix() {
        let g = sample();
        let fs = FirstSets::compute(&g);
        let nt = |n| g.get_nonterminal(n).unwrap();
        assert_eq!(show(&g, fs.get(nt("A"))), "{a, ε}");
        assert_eq!(show(&g, fs.get(nt("B"))), "{b}");
        assert_eq!(show(&g, fs.get(nt("S"))), "{a, b}");
    }

    #[test]
    fn epsilon_production() {
        let g = sample();
        let fs = FirstSets::compute(&g);
        let set = fs.of_sequence(&[Symbol::Epsilon]);
        assert!(set.has_epsilon());
        assert!(set.terminals().next().is_none());
        assert!(fs.of_sequence(&[]).has_epsilon());
        assert_eq!(fs.of_symbol(Symbol::Epsilon), set);
    }

    #[test]
    fn terminal_is_its_own_first() {
        let g = sample();
        let fs = FirstSets::compute(&g);
        let b = g.get_terminal("b").unwrap();
        let set = fs.of_symbol(Symbol::Terminal(b));
        assert!(set.contains(b));
        assert!(!set.has_epsilon());
    }

    #[test]
    fn sequences_stop_at_tight_symbols() {
        let g = sample();
        let fs = FirstSets::compute(&g);
        let a = Symbol::Nonterminal(g.get_nonterminal("A").unwrap());
        let b = Symbol::Nonterminal(g.get_nonterminal("B").unwrap());
        assert_eq!(show(&g, &fs.of_sequence(&[a, a])), "{a, ε}");
        assert_eq!(show(&g, &fs.of_sequence(&[a, b, a])), "{a, b}");
    }

    #[test]
    fn late_dependencies_propagate() {
        // X is processed before Y and Z, yet must see their symbols.
        let g = Grammar::from_rules(
            None,
            vec![
                ("X", vec![vec!["Y", "x"]]),
                ("Y", vec![vec!["Z"], vec!["ε"]]),
                ("Z", vec![vec!["z"]]),
            ],
        ).unwrap();
        let fs = FirstSets::compute(&g);
        let x = g.get_nonterminal("X").unwrap();
        assert_eq!(show(&g, fs.get(x)), "{x, z}");
    }

    #[test]
    fn unproductive_nonterminal_is_empty() {
        let g = Grammar::from_rules(
            None,
            vec![("S", vec![vec!["L"], vec!["s"]]), ("L", vec![vec!["L", "x"]])],
        ).unwrap();
        let fs = FirstSets::compute(&g);
        assert!(fs.get(g.get_nonterminal("L").unwrap()).is_empty());
        assert_eq!(show(&g, fs.get(g.get_nonterminal("S").unwrap())), "{s}");
    }

    #[test]
    fn display_all() {
        let g = sample();
        let fs = FirstSets::compute(&g);
        assert_eq!(format!("{}", fs.pretty(&g)), "S: {a, b}\nA: {a, ε}\nB: {b}");
    }
}
