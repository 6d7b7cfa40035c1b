// Copyright (c) 2018 Fabian Schuiki

//! A table-driven predictive parser.
//!
//! The parser keeps a stack of grammar symbols, seeded with the end marker and
//! the start symbol. Nonterminals on top of the stack are expanded according
//! to the parse table and the current lookahead, terminals are matched against
//! the input. Every step is recorded in a trace that is handed back together
//! with the verdict.

use std::fmt;

use error::{Error, Result};
use grammar::{Grammar, NonterminalId, Symbol, TerminalId, END, END_NAME, EPSILON_NAME};
use table::ParseTable;

/// The default limit on the number of steps of a single parse.
pub const DEFAULT_STEP_LIMIT: usize = 10_000;

/// An LL(1) predictive parser for a grammar.
#[derive(Debug, Clone)]
pub struct PredictiveParser<'a> {
    grammar: &'a Grammar,
    table: ParseTable,
    start: NonterminalId,
    step_limit: usize,
}

/// The outcome of a parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parse {
    /// Whether the input was accepted.
    pub accepted: bool,
    /// The steps taken, in order.
    pub trace: Vec<Step>,
}

/// A single step of a parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// The 1-based index of the step.
    pub index: usize,
    /// The stack after the step, bottom to top, separated by spaces.
    pub stack: String,
    /// The remaining input after the step, followed by `$`.
    pub input: String,
    /// The symbol popped off the stack in this step. Empty for the first step.
    pub symbol: String,
    /// What the parser did.
    pub action: Action,
}

/// The action taken in a parse step.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Start,
    SkipEpsilon,
    Expand { nonterminal: String, production: String },
    Match(String),
    Accept,
    UnexpectedEnd,
    NoRule { nonterminal: String, lookahead: String },
    Mismatch { expected: String, found: String },
    Exhausted,
}

impl<'a> PredictiveParser<'a> {
    /// Create a parser for an LL(1) grammar.
    ///
    /// Fails if the parse table has conflicts or the grammar has no start
    /// symbol.
    pub fn new(grammar: &'a Grammar) -> Result<PredictiveParser<'a>> {
        let table = ParseTable::compute(grammar).map_err(Error::Conflicts)?;
        PredictiveParser::with_table(grammar, table)
    }

    /// Create a parser with a prebuilt parse table.
    pub fn with_table(grammar: &'a Grammar, table: ParseTable) -> Result<PredictiveParser<'a>> {
        let start = grammar.start_symbol().ok_or(Error::NoStartSymbol)?;
        Ok(PredictiveParser {
            grammar: grammar,
            table: table,
            start: start,
            step_limit: DEFAULT_STEP_LIMIT,
        })
    }

    /// Limit the number of steps a single parse may take.
    pub fn with_step_limit(mut self, limit: usize) -> PredictiveParser<'a> {
        self.step_limit = limit;
        self
    }

    /// The parse table used by this parser.
    pub fn table(&self) -> &ParseTable {
        &self.table
    }

    /// Parse a sequence of tokens.
    ///
    /// Tokens are matched against terminals by name. Tokens the grammar does
    /// not know never match.
    pub fn parse<S: AsRef<str>>(&self, tokens: &[S]) -> Parse {
        let grammar = self.grammar;
        let names: Vec<&str> = tokens.iter().map(|t| t.as_ref()).collect();
        let ids: Vec<Option<TerminalId>> = names
            .iter()
            .map(|&name| match grammar.get_terminal(name) {
                Some(END) => None,
                other => other,
            })
            .collect();

        let mut run = Run {
            grammar: grammar,
            names: &names,
            stack: vec![Symbol::Terminal(END), Symbol::Nonterminal(self.start)],
            cursor: 0,
            trace: Vec::new(),
        };
        run.record(String::new(), Action::Start);

        while let Some(current) = run.stack.pop() {
            if run.trace.len() > self.step_limit {
                run.record(run.show(current), Action::Exhausted);
                return run.finish(false);
            }
            let lookahead = if run.cursor < ids.len() {
                ids[run.cursor]
            } else {
                Some(END)
            };
            let symbol = run.show(current);
            match current {
                Symbol::Epsilon => run.record(symbol, Action::SkipEpsilon),
                Symbol::Terminal(END) => {
                    if run.cursor == names.len() {
                        run.record(symbol, Action::Accept);
                        return run.finish(true);
                    } else {
                        run.record(symbol, Action::UnexpectedEnd);
                        return run.finish(false);
                    }
                }
                Symbol::Nonterminal(id) => {
                    let index = lookahead.and_then(|t| self.table.get(id, t));
                    match index {
                        Some(index) => {
                            let production = &grammar.productions(id)[index];
                            run.stack.extend(production.iter().rev().cloned());
                            let action = Action::Expand {
                                nonterminal: symbol.clone(),
                                production: format!("{}", grammar.pretty_production(production)),
                            };
                            run.record(symbol, action);
                        }
                        None => {
                            let action = Action::NoRule {
                                nonterminal: symbol.clone(),
                                lookahead: run.lookahead_name().to_owned(),
                            };
                            run.record(symbol, action);
                            return run.finish(false);
                        }
                    }
                }
                Symbol::Terminal(id) => {
                    if lookahead == Some(id) {
                        run.cursor += 1;
                        run.record(symbol.clone(), Action::Match(symbol));
                    } else {
                        let action = Action::Mismatch {
                            expected: symbol.clone(),
                            found: run.lookahead_name().to_owned(),
                        };
                        run.record(symbol, action);
                        return run.finish(false);
                    }
                }
            }
        }
        run.finish(false)
    }
}

/// The state of a single parse run.
struct Run<'a> {
    grammar: &'a Grammar,
    names: &'a [&'a str],
    stack: Vec<Symbol>,
    cursor: usize,
    trace: Vec<Step>,
}

impl<'a> Run<'a> {
    fn show(&self, symbol: Symbol) -> String {
        match symbol {
            Symbol::Terminal(id) => self.grammar.terminal_name(id).to_owned(),
            Symbol::Nonterminal(id) => self.grammar.nonterminal_name(id).to_owned(),
            Symbol::Epsilon => EPSILON_NAME.to_owned(),
        }
    }

    fn lookahead_name(&self) -> &'a str {
        if self.cursor < self.names.len() {
            self.names[self.cursor]
        } else {
            END_NAME
        }
    }

    fn record(&mut self, symbol: String, action: Action) {
        let mut stack = String::new();
        for (i, &s) in self.stack.iter().enumerate() {
            if i > 0 {
                stack.push(' ');
            }
            stack.push_str(&self.show(s));
        }
        let mut input = String::new();
        for name in &self.names[self.cursor..] {
            input.push_str(name);
            input.push(' ');
        }
        input.push_str(END_NAME);
        let step = Step {
            index: self.trace.len() + 1,
            stack: stack,
            input: input,
            symbol: symbol,
            action: action,
        };
        trace!("{}", step);
        self.trace.push(step);
    }

    fn finish(self, accepted: bool) -> Parse {
        debug!(
            "parse {} after {} steps",
            if accepted { "accepted" } else { "rejected" },
            self.trace.len()
        );
        Parse {
            accepted: accepted,
            trace: self.trace,
        }
    }
}

impl Action {
    /// Check whether this action rejects the input.
    pub fn is_error(&self) -> bool {
        match *self {
            Action::UnexpectedEnd
            | Action::NoRule { .. }
            | Action::Mismatch { .. }
            | Action::Exhausted => true,
            _ => false,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Action::Start => write!(f, "Start"),
            Action::SkipEpsilon => write!(f, "Skip {}", EPSILON_NAME),
            Action::Expand {
                ref nonterminal,
                ref production,
            } => write!(f, "Expand {} -> {}", nonterminal, production),
            Action::Match(ref t) => write!(f, "Match {}", t),
            Action::Accept => write!(f, "Accept"),
            Action::UnexpectedEnd => write!(f, "Error: Unexpected end"),
            Action::NoRule {
                ref nonterminal,
                ref lookahead,
            } => write!(f, "Error: No rule for {} with {}", nonterminal, lookahead),
            Action::Mismatch {
                ref expected,
                ref found,
            } => write!(f, "Error: Expected {}, found {}", expected, found),
            Action::Exhausted => write!(f, "Error: Step limit exceeded"),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:>3}  {:<24} {:<24} {:<6} {}",
            self.index, self.stack, self.input, self.symbol, self.action
        )
    }
}

impl fmt::Display for Parse {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for step in &self.trace {
            write!(f, "{}\n", step)?;
        }
        write!(f, "{}", if self.accepted { "accepted" } else { "rejected" })
    }
}
