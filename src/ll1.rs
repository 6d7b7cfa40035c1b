// Copyright (c) 2018 Fabian Schuiki

//! LL(1) conformance checking.

use std::fmt;

use Pretty;
use first::FirstSet;
use grammar::{Grammar, NonterminalId, TerminalId};

/// Two productions of a nonterminal that one token of lookahead cannot tell
/// apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// The nonterminal the productions belong to.
    pub nonterminal: NonterminalId,
    /// The indices of the two productions, lower first.
    pub productions: (usize, usize),
    /// How the productions overlap.
    pub kind: ViolationKind,
}

/// The way two productions overlap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    /// The first sets share these terminals.
    FirstFirst(Vec<TerminalId>),
    /// Both productions derive the empty string.
    BothNullable,
    /// One production derives the empty string and the follow set of the
    /// nonterminal shares these terminals with the first set of the other.
    FirstFollow(Vec<TerminalId>),
}

/// Check whether a grammar is LL(1).
pub fn is_ll1(grammar: &Grammar) -> bool {
    check(grammar).is_ok()
}

/// Check whether a grammar is LL(1), reporting the first violation.
///
/// Uses the memoized FIRST and FOLLOW sets of the grammar if present, and
/// computes them on the side otherwise.
pub fn check(grammar: &Grammar) -> Result<(), Violation> {
    let (first, follow) = grammar.sets();
    for nt in grammar.nonterminals() {
        let sets: Vec<FirstSet> = grammar
            .productions(nt)
            .iter()
            .map(|p| first.of_sequence(p))
            .collect();
        for i in 0..sets.len() {
            for j in i + 1..sets.len() {
                let violation = |kind| Violation {
                    nonterminal: nt,
                    productions: (i, j),
                    kind: kind,
                };
                let shared: Vec<TerminalId> = sets[i]
                    .symbols
                    .intersection(&sets[j].symbols)
                    .map(TerminalId::from_usize)
                    .collect();
                if !shared.is_empty() {
                    return Err(violation(ViolationKind::FirstFirst(shared)));
                }
                if sets[i].has_epsilon && sets[j].has_epsilon {
                    return Err(violation(ViolationKind::BothNullable));
                }
                let (nullable, other) = if sets[i].has_epsilon {
                    (i, j)
                } else if sets[j].has_epsilon {
                    (j, i)
                } else {
                    continue;
                };
                let shared: Vec<TerminalId> = follow
                    .bits(nt)
                    .intersection(&sets[other].symbols)
                    .map(TerminalId::from_usize)
                    .collect();
                if !shared.is_empty() {
                    trace!("production {} of {:?} is nullable", nullable, nt);
                    return Err(violation(ViolationKind::FirstFollow(shared)));
                }
            }
        }
    }
    Ok(())
}

impl Violation {
    /// Get a pretty printer for this violation.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a Violation> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let g = self.ctx;
        let v = self.item;
        let productions = g.productions(v.nonterminal);
        let name = v.nonterminal.pretty(g);
        write!(
            f,
            "`{} -> {}` and `{} -> {}` ",
            name,
            g.pretty_production(&productions[v.productions.0]),
            name,
            g.pretty_production(&productions[v.productions.1])
        )?;
        let terminals = match v.kind {
            ViolationKind::FirstFirst(ref ts) => {
                write!(f, "share first terminals")?;
                ts
            }
            ViolationKind::BothNullable => return write!(f, "both derive ε"),
            ViolationKind::FirstFollow(ref ts) => {
                write!(f, "overlap with the follow set of {} on", name)?;
                ts
            }
        };
        for t in terminals {
            write!(f, " {}", t.pretty(g))?;
        }
        Ok(())
    }
}
