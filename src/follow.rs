// Copyright (c) 2018 Fabian Schuiki

//! Follow set computation.
//!
//! The follow set of a nonterminal holds every terminal that can appear
//! directly after it in a sentential form derived from the start symbol,
//! including the end marker `$` where the input may end.

use std::fmt;
use std::iter::repeat;
use bit_set::BitSet;

use Pretty;
use first::FirstSets;
use grammar::{Grammar, NonterminalId, Symbol, TerminalId, END};

/// All follow sets of a grammar.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FollowSets(Vec<BitSet>);

impl FollowSets {
    /// Compute the follow sets of a grammar.
    ///
    /// The sets are iterated to a fixed point, so mutually dependent follow
    /// sets are computed exactly.
    pub fn compute(grammar: &Grammar, first: &FirstSets) -> FollowSets {
        compute(grammar, first)
    }

    /// Iterate over the terminals in the follow set of a nonterminal, in id
    /// order.
    pub fn get<'a>(&'a self, id: NonterminalId) -> impl Iterator<Item = TerminalId> + 'a {
        self.0[id.as_usize()].iter().map(TerminalId::from_usize)
    }

    /// Check whether a terminal is in the follow set of a nonterminal.
    pub fn contains(&self, id: NonterminalId, terminal: TerminalId) -> bool {
        self.0[id.as_usize()].contains(terminal.as_usize())
    }

    pub(crate) fn bits(&self, id: NonterminalId) -> &BitSet {
        &self.0[id.as_usize()]
    }

    /// Get a pretty printer for these follow sets.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

fn compute(grammar: &Grammar, first: &FirstSets) -> FollowSets {
    let num_term = grammar.terminal_id_bound();
    let num_nonterm = grammar.nonterminal_id_bound();
    let mut sets: Vec<BitSet> = repeat(BitSet::with_capacity(num_term))
        .take(num_nonterm)
        .collect();
    if let Some(start) = grammar.start_symbol() {
        sets[start.as_usize()].insert(END.as_usize());
    }

    let mut round = 0;
    let mut changed = true;
    while changed {
        changed = false;
        round += 1;
        for lhs in grammar.nonterminals() {
            for production in grammar.productions(lhs) {
                for (index, symbol) in production.iter().enumerate() {
                    let target = match *symbol {
                        Symbol::Nonterminal(id) => id.as_usize(),
                        _ => continue,
                    };
                    let rest = first.of_sequence(&production[index + 1..]);
                    let mut new = sets[target].clone();
                    new.union_with(&rest.symbols);
                    if rest.has_epsilon {
                        new.union_with(&sets[lhs.as_usize()]);
                    }
                    if new != sets[target] {
                        sets[target] = new;
                        changed = true;
                    }
                }
            }
        }
        trace!("follow set round {}: changed = {}", round, changed);
    }
    debug!("follow sets settled after {} rounds", round);

    FollowSets(sets)
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a FollowSets> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (index, id) in self.ctx.nonterminals().enumerate() {
            if index > 0 {
                write!(f, "\n")?;
            }
            write!(f, "{}: {{", id.pretty(self.ctx))?;
            for (i, t) in self.item.get(id).enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", t.pretty(self.ctx))?;
            }
            write!(f, "}}")?;
        }
        Ok(())
    }
}
