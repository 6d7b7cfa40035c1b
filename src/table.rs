// Copyright (c) 2018 Fabian Schuiki

//! Predictive parse tables.
//!
//! A parse table maps a nonterminal on top of the stack and a lookahead
//! terminal to the production to expand it with.

use std::fmt;
use indexmap::IndexMap;

use Pretty;
use grammar::{Grammar, NonterminalId, Production, TerminalId, END};

/// A predictive parse table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTable {
    entries: IndexMap<(NonterminalId, TerminalId), usize>,
}

/// Two productions competing for the same table cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Conflict {
    /// The nonterminal of the cell.
    pub nonterminal: NonterminalId,
    /// The lookahead of the cell.
    pub terminal: TerminalId,
    /// The production that was in the cell first.
    pub existing: usize,
    /// The production that claimed the cell afterwards.
    pub replacement: usize,
}

impl ParseTable {
    /// Build the parse table for a grammar.
    ///
    /// Fails with the list of conflicting cells if the grammar is not LL(1).
    pub fn compute(grammar: &Grammar) -> Result<ParseTable, Vec<Conflict>> {
        let mut conflicts = Vec::new();
        let table = build(grammar, &mut conflicts);
        if conflicts.is_empty() {
            Ok(table)
        } else {
            Err(conflicts)
        }
    }

    /// Build the parse table for a grammar, letting later productions
    /// overwrite earlier ones on conflict.
    pub fn compute_overwriting(grammar: &Grammar) -> ParseTable {
        let mut conflicts = Vec::new();
        let table = build(grammar, &mut conflicts);
        if !conflicts.is_empty() {
            warn!("{} table cells were overwritten", conflicts.len());
        }
        table
    }

    /// Look up the production index for a nonterminal and lookahead.
    pub fn get(&self, nonterminal: NonterminalId, terminal: TerminalId) -> Option<usize> {
        self.entries.get(&(nonterminal, terminal)).cloned()
    }

    /// All cells of the table, in the order they were first filled.
    pub fn entries<'a>(&'a self) -> impl Iterator<Item = (NonterminalId, TerminalId, usize)> + 'a {
        self.entries.iter().map(|(&(nt, t), &p)| (nt, t, p))
    }

    /// The number of filled cells.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the table has no cells.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get a pretty printer for this table.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

fn build(grammar: &Grammar, conflicts: &mut Vec<Conflict>) -> ParseTable {
    let (first, follow) = grammar.sets();
    let mut table = ParseTable {
        entries: IndexMap::new(),
    };
    for nt in grammar.nonterminals() {
        for (index, production) in grammar.productions(nt).iter().enumerate() {
            let set = first.of_sequence(production);
            let mut insert = |terminal: TerminalId| {
                if let Some(existing) = table.entries.insert((nt, terminal), index) {
                    if existing != index {
                        conflicts.push(Conflict {
                            nonterminal: nt,
                            terminal: terminal,
                            existing: existing,
                            replacement: index,
                        });
                    }
                }
            };
            for terminal in set.terminals() {
                insert(terminal);
            }
            if set.has_epsilon() {
                for terminal in follow.get(nt) {
                    insert(terminal);
                }
                insert(END);
            }
        }
    }
    debug!(
        "parse table with {} cells, {} conflicts",
        table.len(),
        conflicts.len()
    );
    table
}

impl Conflict {
    /// Get a pretty printer for this conflict.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

fn pretty_rule(grammar: &Grammar, nt: NonterminalId, production: &Production) -> String {
    format!(
        "{} -> {}",
        nt.pretty(grammar),
        grammar.pretty_production(production)
    )
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a Conflict> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let c = self.item;
        let productions = self.ctx.productions(c.nonterminal);
        write!(
            f,
            "M[{}, {}]: `{}` vs `{}`",
            c.nonterminal.pretty(self.ctx),
            c.terminal.pretty(self.ctx),
            pretty_rule(self.ctx, c.nonterminal, &productions[c.existing]),
            pretty_rule(self.ctx, c.nonterminal, &productions[c.replacement])
        )
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a ParseTable> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (index, (nt, t, p)) in self.item.entries().enumerate() {
            if index > 0 {
                write!(f, "\n")?;
            }
            write!(
                f,
                "M[{}, {}] = {}",
                nt.pretty(self.ctx),
                t.pretty(self.ctx),
                pretty_rule(self.ctx, nt, &self.ctx.productions(nt)[p])
            )?;
        }
        Ok(())
    }
}
