// Copyright (c) 2018 Fabian Schuiki

//! Data structures representing a grammar.

use std::borrow::Cow;
use std::fmt;
use std::collections::HashMap;
use indexmap::IndexMap;

use Pretty;
use error::{Error, Result};
use first::FirstSets;
use follow::FollowSets;

/// A grammar.
///
/// Symbols are resolved to terminal and nonterminal ids when they are added,
/// so every production refers to a closed universe of symbols. The rules are
/// kept in insertion order, which is the order in which the transformations
/// enumerate the nonterminals.
#[derive(Debug, Clone)]
pub struct Grammar {
    nonterms: HashMap<String, NonterminalId>,
    terms: HashMap<String, TerminalId>,
    nonterm_names: Vec<String>,
    term_names: Vec<String>,
    rules: IndexMap<NonterminalId, Vec<Production>>,
    start: Option<NonterminalId>,
    pub(crate) first: Option<FirstSets>,
    pub(crate) follow: Option<FollowSets>,
}

/// A single production, i.e. one right-hand side alternative.
///
/// Never empty. The empty derivation is written as `[Symbol::Epsilon]`.
pub type Production = Vec<Symbol>;

/// A symbol of a production.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    /// A terminal.
    Terminal(TerminalId),
    /// A nonterminal.
    Nonterminal(NonterminalId),
    /// The empty string.
    Epsilon,
}

/// A unique nonterminal identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NonterminalId(usize);

/// A unique terminal identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TerminalId(usize);

/// The special end of input terminal `$`.
pub const END: TerminalId = TerminalId(0);

/// The name under which the empty string is written.
pub const EPSILON_NAME: &str = "ε";

/// The name under which the end of input is written.
pub const END_NAME: &str = "$";

impl Grammar {
    /// Create a new empty grammar.
    pub fn new() -> Grammar {
        Grammar {
            nonterms: HashMap::new(),
            terms: HashMap::new(),
            nonterm_names: Vec::new(),
            term_names: Vec::new(),
            rules: IndexMap::new(),
            start: None,
            first: None,
            follow: None,
        }
    }

    /// Build a grammar from a name-based rule mapping.
    ///
    /// Every key of the mapping becomes a nonterminal; every other name used in
    /// a production is a terminal, except for `ε` and `epsilon` which denote the
    /// empty string. Keys that appear multiple times accumulate their
    /// productions. If no start symbol is given, the first key is used.
    pub fn from_rules<N, S, I>(start: Option<&str>, rules: I) -> Result<Grammar>
    where
        I: IntoIterator<Item = (N, Vec<Vec<S>>)>,
        N: Into<String>,
        S: AsRef<str>,
    {
        let mut merged: IndexMap<String, Vec<Vec<S>>> = IndexMap::new();
        for (name, productions) in rules {
            merged
                .entry(name.into())
                .or_insert_with(Vec::new)
                .extend(productions);
        }

        let mut grammar = Grammar::new();
        for name in merged.keys() {
            if name == EPSILON_NAME || name == "epsilon" || name == END_NAME {
                return Err(Error::ReservedName(name.clone()));
            }
            grammar.add_nonterminal(name.as_str());
        }

        for (name, productions) in &merged {
            if productions.is_empty() {
                return Err(Error::NoProductions(name.clone()));
            }
            let id = grammar.nonterms[name];
            for production in productions {
                let mut symbols = Vec::with_capacity(production.len());
                for symbol in production {
                    let symbol = symbol.as_ref();
                    symbols.push(match grammar.get_nonterminal(symbol) {
                        Some(nt) => Symbol::Nonterminal(nt),
                        None if symbol == EPSILON_NAME || symbol == "epsilon" => Symbol::Epsilon,
                        None if symbol == END_NAME => {
                            return Err(Error::ReservedName(symbol.to_owned()))
                        }
                        None => Symbol::Terminal(grammar.add_terminal(symbol)),
                    });
                }
                grammar.add_rule(id, symbols);
            }
        }

        if let Some(start) = start {
            match grammar.get_nonterminal(start) {
                Some(id) => grammar.set_start(id),
                None => return Err(Error::UnknownStart(start.to_owned())),
            }
        }
        Ok(grammar)
    }

    /// Add a nonterminal.
    ///
    /// The first nonterminal added becomes the start symbol unless another one
    /// is chosen with `set_start`.
    pub fn add_nonterminal<S: Into<String>>(&mut self, name: S) -> NonterminalId {
        let name = name.into();
        let next_id = NonterminalId(self.nonterm_names.len());
        if let Some(&id) = self.nonterms.get(&name) {
            id
        } else {
            self.nonterms.insert(name.clone(), next_id);
            self.nonterm_names.push(name);
            if self.start.is_none() {
                self.start = Some(next_id);
            }
            next_id
        }
    }

    /// Add a terminal.
    pub fn add_terminal<S: Into<String>>(&mut self, name: S) -> TerminalId {
        let name = name.into();
        let next_id = TerminalId(self.term_names.len() + 1);
        if let Some(&id) = self.terms.get(&name) {
            id
        } else {
            self.terms.insert(name.clone(), next_id);
            self.term_names.push(name);
            next_id
        }
    }

    /// Add a nonterminal that does not clash with any existing symbol.
    ///
    /// The name is derived from `base` by appending primes.
    pub fn fresh_nonterminal(&mut self, base: NonterminalId) -> NonterminalId {
        let mut name = String::from(self.nonterminal_name(base));
        loop {
            name.push('\'');
            if !self.nonterms.contains_key(&name) && !self.terms.contains_key(&name) {
                break;
            }
        }
        trace!("fresh nonterminal {}", name);
        self.add_nonterminal(name)
    }

    /// Look up a nonterminal by name.
    pub fn get_nonterminal(&self, name: &str) -> Option<NonterminalId> {
        self.nonterms.get(name).cloned()
    }

    /// Look up a terminal by name.
    ///
    /// Resolves `$` to the builtin `END` terminal.
    pub fn get_terminal(&self, name: &str) -> Option<TerminalId> {
        if name == END_NAME {
            Some(END)
        } else {
            self.terms.get(name).cloned()
        }
    }

    /// Get the name of a nonterminal.
    pub fn nonterminal_name(&self, id: NonterminalId) -> &str {
        &self.nonterm_names[id.as_usize()]
    }

    /// Get the name of a terminal.
    pub fn terminal_name(&self, id: TerminalId) -> &str {
        if id == END {
            END_NAME
        } else {
            &self.term_names[id.as_usize() - 1]
        }
    }

    /// The upper bound on nonterminal IDs.
    ///
    /// Basically returns the largest nonterminal ID + 1. Can be used as
    /// capacity for containers that will hold nonterminals.
    pub fn nonterminal_id_bound(&self) -> usize {
        self.nonterm_names.len()
    }

    /// The upper bound on terminal IDs.
    ///
    /// Basically returns the largest terminal ID + 1. Can be used as capacity
    /// for containers that will hold terminals.
    pub fn terminal_id_bound(&self) -> usize {
        self.term_names.len() + 1
    }

    /// The start symbol, if any nonterminal has been declared.
    pub fn start_symbol(&self) -> Option<NonterminalId> {
        self.start
    }

    /// Change the start symbol.
    pub fn set_start(&mut self, id: NonterminalId) {
        self.start = Some(id);
        self.invalidate_sets();
    }

    /// Add a production for a nonterminal.
    ///
    /// Epsilons mixed with other symbols are dropped, and an empty production
    /// is stored as the empty derivation.
    pub fn add_rule(&mut self, name: NonterminalId, symbols: Vec<Symbol>) {
        let production = concat(&symbols, &[]);
        self.rules
            .entry(name)
            .or_insert_with(Vec::new)
            .push(production);
        self.invalidate_sets();
    }

    /// The nonterminals that have rules, in rule order.
    pub fn nonterminals<'a>(&'a self) -> impl Iterator<Item = NonterminalId> + 'a {
        self.rules.keys().cloned()
    }

    /// The productions of a nonterminal.
    ///
    /// Returns an empty slice for nonterminals without rules.
    pub fn productions(&self, id: NonterminalId) -> &[Production] {
        match self.rules.get(&id) {
            Some(productions) => productions,
            None => &[],
        }
    }

    pub(crate) fn rules_mut(&mut self) -> &mut IndexMap<NonterminalId, Vec<Production>> {
        self.invalidate_sets();
        &mut self.rules
    }

    pub(crate) fn replace_rules(&mut self, rules: IndexMap<NonterminalId, Vec<Production>>) {
        self.rules = rules;
        self.invalidate_sets();
    }

    /// Compute and memoize the FIRST sets.
    pub fn compute_first(&mut self) {
        let first = FirstSets::compute(self);
        self.first = Some(first);
    }

    /// Compute and memoize the FOLLOW sets.
    ///
    /// Computes the FIRST sets as well if they are missing.
    pub fn compute_follow(&mut self) {
        let first = match self.first.take() {
            Some(first) => first,
            None => FirstSets::compute(self),
        };
        let follow = FollowSets::compute(self, &first);
        self.first = Some(first);
        self.follow = Some(follow);
    }

    /// The memoized FIRST sets, if computed since the last rule change.
    pub fn first_sets(&self) -> Option<&FirstSets> {
        self.first.as_ref()
    }

    /// The memoized FOLLOW sets, if computed since the last rule change.
    pub fn follow_sets(&self) -> Option<&FollowSets> {
        self.follow.as_ref()
    }

    /// The FIRST and FOLLOW sets, borrowed if memoized and computed otherwise.
    pub fn sets(&self) -> (Cow<FirstSets>, Cow<FollowSets>) {
        let first = match self.first {
            Some(ref first) => Cow::Borrowed(first),
            None => Cow::Owned(FirstSets::compute(self)),
        };
        let follow = match self.follow {
            Some(ref follow) => Cow::Borrowed(follow),
            None => Cow::Owned(FollowSets::compute(self, &first)),
        };
        (first, follow)
    }

    fn invalidate_sets(&mut self) {
        self.first = None;
        self.follow = None;
    }

    /// Get a pretty printer for a production.
    pub fn pretty_production<'a>(
        &'a self,
        production: &'a [Symbol],
    ) -> Pretty<&'a Grammar, &'a [Symbol]> {
        Pretty::new(self, production)
    }
}

impl Default for Grammar {
    fn default() -> Grammar {
        Grammar::new()
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (index, (&name, productions)) in self.rules.iter().enumerate() {
            if index > 0 {
                write!(f, "\n")?;
            }
            write!(f, "{} ->", name.pretty(self))?;
            for (i, production) in productions.iter().enumerate() {
                if i > 0 {
                    write!(f, " |")?;
                }
                write!(f, " {}", self.pretty_production(production))?;
            }
        }
        Ok(())
    }
}

/// Concatenate two symbol strings.
///
/// Epsilons are dropped from the result, and an empty result becomes the
/// empty derivation `[ε]`.
pub fn concat(a: &[Symbol], b: &[Symbol]) -> Production {
    let mut out: Production = a.iter()
        .chain(b.iter())
        .cloned()
        .filter(|&s| s != Symbol::Epsilon)
        .collect();
    if out.is_empty() {
        out.push(Symbol::Epsilon);
    }
    out
}

impl Symbol {
    /// Get a pretty printer for this symbol.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

impl From<TerminalId> for Symbol {
    fn from(id: TerminalId) -> Symbol {
        Symbol::Terminal(id)
    }
}

impl From<NonterminalId> for Symbol {
    fn from(id: NonterminalId) -> Symbol {
        Symbol::Nonterminal(id)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a Symbol> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self.item {
            Symbol::Terminal(id) => write!(f, "{}", id.pretty(self.ctx)),
            Symbol::Nonterminal(id) => write!(f, "{}", id.pretty(self.ctx)),
            Symbol::Epsilon => write!(f, "{}", EPSILON_NAME),
        }
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a [Symbol]> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (index, symbol) in self.item.iter().enumerate() {
            if index > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", symbol.pretty(self.ctx))?;
        }
        Ok(())
    }
}

impl NonterminalId {
    /// Create a nonterminal id from a usize.
    pub fn from_usize(id: usize) -> NonterminalId {
        NonterminalId(id)
    }

    /// Obtain the id as a usize.
    pub fn as_usize(self) -> usize {
        self.0
    }

    /// Get a pretty printer for this nonterminal.
    pub fn pretty(self, grammar: &Grammar) -> Pretty<&Grammar, Self> {
        Pretty::new(grammar, self)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, NonterminalId> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.ctx.nonterminal_name(self.item))
    }
}

impl TerminalId {
    /// Create a terminal id from a usize.
    pub fn from_usize(id: usize) -> TerminalId {
        TerminalId(id)
    }

    /// Obtain the id as a usize.
    pub fn as_usize(self) -> usize {
        self.0
    }

    /// Get a pretty printer for this terminal.
    pub fn pretty(self, grammar: &Grammar) -> Pretty<&Grammar, Self> {
        Pretty::new(grammar, self)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, TerminalId> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.ctx.terminal_name(self.item))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_symbol_universe() {
        let g = Grammar::from_rules(
            Some("S"),
            vec![
                ("S", vec![vec!["A", "B"]]),
                ("A", vec![vec!["a", "A"], vec!["ε"]]),
                ("B", vec![vec!["b"]]),
            ],
        ).unwrap();
        let s = g.get_nonterminal("S").unwrap();
        let a = g.get_nonterminal("A").unwrap();
        let ta = g.get_terminal("a").unwrap();
        assert_eq!(g.start_symbol(), Some(s));
        assert_eq!(g.productions(s), &[vec![Symbol::Nonterminal(a), g.get_nonterminal("B").unwrap().into()]]);
        assert_eq!(g.productions(a)[0], vec![Symbol::Terminal(ta), Symbol::Nonterminal(a)]);
        assert_eq!(g.productions(a)[1], vec![Symbol::Epsilon]);
        assert_eq!(g.get_terminal("S"), None);
        assert_eq!(g.get_terminal("$"), Some(END));
    }

    #[test]
    fn duplicate_keys_accumulate() {
        let g = Grammar::from_rules(
            None,
            vec![("S", vec![vec!["a"]]), ("S", vec![vec!["b"]])],
        ).unwrap();
        assert_eq!(format!("{}", g), "S -> a | b");
    }

    #[test]
    fn reserved_names_rejected() {
        match Grammar::from_rules(None, vec![("$", vec![vec!["a"]])]) {
            Err(Error::ReservedName(ref n)) if n == "$" => (),
            other => panic!("unexpected {:?}", other),
        }
        match Grammar::from_rules(None, vec![("S", vec![vec!["a", "$"]])]) {
            Err(Error::ReservedName(_)) => (),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn missing_productions_and_start() {
        let empty: Vec<Vec<&str>> = vec![];
        match Grammar::from_rules(None, vec![("S", empty)]) {
            Err(Error::NoProductions(ref n)) if n == "S" => (),
            other => panic!("unexpected {:?}", other),
        }
        match Grammar::from_rules(Some("X"), vec![("S", vec![vec!["a"]])]) {
            Err(Error::UnknownStart(ref n)) if n == "X" => (),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn concat_drops_epsilon() {
        let t = Symbol::Terminal(TerminalId::from_usize(1));
        assert_eq!(concat(&[Symbol::Epsilon], &[t]), vec![t]);
        assert_eq!(concat(&[Symbol::Epsilon], &[]), vec![Symbol::Epsilon]);
        assert_eq!(concat(&[t], &[t]), vec![t, t]);
    }

    #[test]
    fn fresh_names_avoid_clashes() {
        let mut g = Grammar::new();
        let e = g.add_nonterminal("E");
        g.add_nonterminal("E'");
        let fresh = g.fresh_nonterminal(e);
        assert_eq!(g.nonterminal_name(fresh), "E''");
    }
}
