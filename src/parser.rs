// Copyright (c) 2018 Fabian Schuiki

//! A parser for grammar descriptions.
//!
//! A description is a sequence of rule declarations and an optional start
//! declaration:
//!
//! ```text
//! start E;
//! E : E '+' T | T ;
//! T -> T '*' F | F ;
//! F : '(' E ')' | id ;
//! ```

use std::iter::Peekable;

use error::{Error, Result};
use grammar::{Grammar, Symbol, END_NAME, EPSILON_NAME};
use lexer::{Keyword, Lexer, Token};

/// The abstract syntax tree of a grammar description.
pub mod ast {
    /// The root node of a grammar description.
    #[derive(Debug, Default, PartialEq, Eq, Hash)]
    pub struct Desc {
        /// The declared start symbol.
        pub start: Option<String>,
        /// The rule declarations.
        pub rules: Vec<RuleDecl>,
    }

    /// A rule declaration.
    #[derive(Debug, PartialEq, Eq, Hash)]
    pub struct RuleDecl {
        /// The name of the rule.
        pub name: String,
        /// The different variants of the rule. Empty variants derive epsilon.
        pub variants: Vec<Vec<Symbol>>,
    }

    /// A symbol in a rule variant.
    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    pub enum Symbol {
        /// A terminal or nonterminal, bare or quoted.
        Name(String),
        /// The `epsilon` keyword.
        Epsilon,
    }
}

struct Parser<I: Iterator<Item = (usize, usize, Token)>> {
    input: Peekable<I>,
    end: usize,
}

impl<I: Iterator<Item = (usize, usize, Token)>> Parser<I> {
    fn offset(&mut self) -> usize {
        match self.input.peek() {
            Some(&(sp, _, _)) => sp,
            None => self.end,
        }
    }

    fn error<T, S: Into<String>>(&mut self, message: S) -> Result<T> {
        Err(Error::Syntax {
            offset: self.offset(),
            message: message.into(),
        })
    }

    fn expect(&mut self, expected: Token, what: &str) -> Result<()> {
        match self.input.peek() {
            Some(&(_, _, ref t)) if *t == expected => (),
            _ => return self.error(format!("expected {}", what)),
        }
        self.input.next();
        Ok(())
    }

    fn ident(&mut self, what: &str) -> Result<String> {
        match self.input.peek() {
            Some(&(_, _, Token::Ident(_))) => (),
            _ => return self.error(format!("expected {}", what)),
        }
        match self.input.next() {
            Some((_, _, Token::Ident(name))) => Ok(name),
            _ => unreachable!(),
        }
    }

    fn desc(&mut self) -> Result<ast::Desc> {
        let mut desc = ast::Desc::default();
        loop {
            let keyword = match self.input.peek() {
                None => break,
                Some(&(_, _, Token::Semicolon)) => {
                    self.input.next();
                    continue;
                }
                Some(&(_, _, Token::Keyword(Keyword::Start))) => true,
                Some(&(_, _, Token::Ident(_))) => false,
                Some(&(_, _, ref t)) => {
                    let message = format!("expected rule or start declaration, found {:?}", t);
                    return self.error(message);
                }
            };
            if keyword {
                self.input.next();
                let name = self.ident("start symbol name")?;
                self.expect(Token::Semicolon, "`;`")?;
                if desc.start.is_some() {
                    return self.error("start symbol declared twice");
                }
                desc.start = Some(name);
            } else {
                let rule = self.rule_decl()?;
                desc.rules.push(rule);
            }
        }
        Ok(desc)
    }

    fn rule_decl(&mut self) -> Result<ast::RuleDecl> {
        let name = self.ident("rule name")?;
        match self.input.peek() {
            Some(&(_, _, Token::Colon)) | Some(&(_, _, Token::Arrow)) => (),
            _ => return self.error("expected `:` or `->`"),
        }
        self.input.next();
        let mut variants = vec![self.sequence()?];
        loop {
            match self.input.next() {
                Some((_, _, Token::Pipe)) => variants.push(self.sequence()?),
                Some((_, _, Token::Semicolon)) => break,
                Some((sp, _, t)) => {
                    return Err(Error::Syntax {
                        offset: sp,
                        message: format!("expected `|` or `;`, found {:?}", t),
                    })
                }
                None => return self.error("expected `;`"),
            }
        }
        Ok(ast::RuleDecl {
            name: name,
            variants: variants,
        })
    }

    fn sequence(&mut self) -> Result<Vec<ast::Symbol>> {
        let mut seq = Vec::new();
        loop {
            match self.input.peek() {
                Some(&(_, _, Token::Ident(_))) | Some(&(_, _, Token::Keyword(Keyword::Epsilon))) => {}
                _ => break,
            }
            match self.input.next() {
                Some((_, _, Token::Ident(name))) => seq.push(ast::Symbol::Name(name)),
                _ => seq.push(ast::Symbol::Epsilon),
            }
        }
        Ok(seq)
    }
}

/// Parse a sequence of tokens given by an iterator.
///
/// `end` is the offset reported for errors at the end of the input.
pub fn parse_iter<I>(input: I, end: usize) -> Result<ast::Desc>
where
    I: Iterator<Item = (usize, usize, Token)>,
{
    let mut parser = Parser {
        input: input.peekable(),
        end: end,
    };
    parser.desc()
}

/// Convert the grammar description into an actual grammar.
///
/// Every declared rule name is a nonterminal and every other name a terminal,
/// quoted or not. Only the `epsilon` keyword denotes the empty string.
pub fn make_grammar(desc: &ast::Desc) -> Result<Grammar> {
    let mut grammar = Grammar::new();
    for d in &desc.rules {
        if d.name == EPSILON_NAME || d.name == "epsilon" || d.name == END_NAME {
            return Err(Error::ReservedName(d.name.clone()));
        }
        grammar.add_nonterminal(d.name.as_str());
    }

    for d in &desc.rules {
        let id = grammar.add_nonterminal(d.name.as_str());
        for variant in &d.variants {
            let mut symbols = Vec::with_capacity(variant.len());
            for symbol in variant {
                symbols.push(match *symbol {
                    ast::Symbol::Epsilon => Symbol::Epsilon,
                    ast::Symbol::Name(ref name) => match grammar.get_nonterminal(name) {
                        Some(nt) => Symbol::Nonterminal(nt),
                        None if name == END_NAME => {
                            return Err(Error::ReservedName(name.clone()))
                        }
                        None => Symbol::Terminal(grammar.add_terminal(name.as_str())),
                    },
                });
            }
            grammar.add_rule(id, symbols);
        }
    }

    if let Some(ref start) = desc.start {
        match grammar.get_nonterminal(start) {
            Some(id) => grammar.set_start(id),
            None => return Err(Error::UnknownStart(start.clone())),
        }
    }
    debug!(
        "loaded grammar with {} nonterminals and {} terminals",
        grammar.nonterminal_id_bound(),
        grammar.terminal_id_bound() - 1
    );
    Ok(grammar)
}

/// Parse a grammar description into a grammar.
pub fn parse_grammar(input: &str) -> Result<Grammar> {
    let desc = parse_iter(Lexer::new(input.char_indices()), input.len())?;
    make_grammar(&desc)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<ast::Desc> {
        parse_iter(Lexer::new(input.char_indices()), input.len())
    }

    #[test]
    fn simple1() {
        let res = parse("start S; S : a S | ;").unwrap();
        assert_eq!(
            res,
            ast::Desc {
                start: Some("S".into()),
                rules: vec![
                    ast::RuleDecl {
                        name: "S".into(),
                        variants: vec![
                            vec![
                                ast::Symbol::Name("a".into()),
                                ast::Symbol::Name("S".into()),
                            ],
                            vec![],
                        ],
                    },
                ],
            }
        );
    }

    #[test]
    fn epsilon_keyword() {
        let res = parse("A -> a | epsilon;").unwrap();
        assert_eq!(res.rules[0].variants[1], vec![ast::Symbol::Epsilon]);
    }

    #[test]
    fn quoted_names_are_terminals() {
        let g = parse_grammar("S : 'epsilon' x | 'ε' | ε ;").unwrap();
        assert_eq!(format!("{}", g), "S -> epsilon x | ε | ε");
        let s = g.get_nonterminal("S").unwrap();
        assert!(g.get_terminal("epsilon").is_some());
        assert!(g.get_terminal("ε").is_some());
        assert_eq!(g.productions(s)[0].len(), 2);
        assert_eq!(g.productions(s)[2], vec![Symbol::Epsilon]);
        assert!(g.productions(s)[1] != vec![Symbol::Epsilon]);
    }

    #[test]
    fn arrows_without_spaces() {
        let g = parse_grammar("S->a B; B->b;").unwrap();
        assert_eq!(format!("{}", g), "S -> a B\nB -> b");
    }

    #[test]
    fn reserved_rule_names() {
        match parse_grammar("'$' : a ;") {
            Err(Error::ReservedName(ref s)) if s == "$" => (),
            other => panic!("unexpected {:?}", other),
        }
        match parse_grammar("S : a '$' ;") {
            Err(Error::ReservedName(ref s)) if s == "$" => (),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn syntax_errors_carry_offsets() {
        match parse("S : a b") {
            Err(Error::Syntax { offset, .. }) => assert_eq!(offset, 7),
            other => panic!("unexpected {:?}", other),
        }
        match parse("S a ;") {
            Err(Error::Syntax { offset, .. }) => assert_eq!(offset, 2),
            other => panic!("unexpected {:?}", other),
        }
        match parse("start S; start T;") {
            Err(Error::Syntax { .. }) => (),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn grammar_from_description() {
        let g = parse_grammar(
            "// expressions
             start E;
             T : F;
             E -> E '+' T | T;
             F : '(' E ')' | id;",
        ).unwrap();
        assert_eq!(g.nonterminal_name(g.start_symbol().unwrap()), "E");
        assert_eq!(
            format!("{}", g),
            "T -> F\nE -> E + T | T\nF -> ( E ) | id"
        );
        assert!(g.get_terminal("+").is_some());
        assert!(g.get_terminal("T").is_none());
    }

    #[test]
    fn first_rule_is_default_start() {
        let g = parse_grammar("A : b; B : c;").unwrap();
        assert_eq!(g.nonterminal_name(g.start_symbol().unwrap()), "A");
    }

    #[test]
    fn unknown_start_symbol() {
        match parse_grammar("start X; A : b;") {
            Err(Error::UnknownStart(ref s)) if s == "X" => (),
            other => panic!("unexpected {:?}", other),
        }
    }
}
