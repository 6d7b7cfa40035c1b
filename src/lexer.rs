// Copyright (c) 2018 Fabian Schuiki

//! A lexer for grammar descriptions.

use std::iter::Peekable;

/// The tokens that may appear in a grammar description.
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Token {
    Keyword(Keyword),
    Ident(String),
    Arrow,
    Colon,
    Semicolon,
    Pipe,
    /// A character that cannot start any token.
    Unknown(char),
}

/// The keywords that may appear in a grammar description.
#[allow(missing_docs)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Keyword {
    Start,
    Epsilon,
}

/// A lexer for grammar descriptions.
///
/// Yields tokens together with their start and end byte offsets.
pub struct Lexer<T: Iterator<Item = (usize, char)>> {
    input: Peekable<T>,
    /// An arrow split off the end of a bare word.
    pending: Option<(usize, usize, Token)>,
}

impl<T: Iterator<Item = (usize, char)>> Lexer<T> {
    /// Create a new lexer.
    pub fn new(input: T) -> Lexer<T> {
        Lexer {
            input: input.peekable(),
            pending: None,
        }
    }
}

/// Return the next non-whitespace input character, skipping comments.
fn next_relevant<I: Iterator<Item = (usize, char)>>(
    input: &mut Peekable<I>,
) -> Option<(usize, char)> {
    'outer: while let Some((p, c)) = input.next() {
        if c == '/' {
            match input.peek() {
                Some(&(_, '/')) => {
                    input.next();
                    while let Some((_, c)) = input.next() {
                        if c == '\n' {
                            continue 'outer;
                        }
                    }
                    return None; // end of input reached
                }
                Some(&(_, '*')) => {
                    input.next();
                    while let Some((_, c)) = input.next() {
                        if c != '*' {
                            continue;
                        }
                        if let Some(&(_, '/')) = input.peek() {
                            input.next();
                            continue 'outer;
                        }
                    }
                    return None; // end of input reached
                }
                _ => (),
            }
        }
        if !c.is_whitespace() {
            return Some((p, c));
        }
    }
    None
}

/// Checks whether a character terminates a bare word.
fn is_symbol(c: char) -> bool {
    match c {
        ':' | ';' | '|' => true,
        _ => false,
    }
}

impl<T: Iterator<Item = (usize, char)>> Iterator for Lexer<T> {
    type Item = (usize, usize, Token);

    fn next(&mut self) -> Option<(usize, usize, Token)> {
        if let Some(pending) = self.pending.take() {
            return Some(pending);
        }

        // Fetch the first character and see what we can do with it.
        let (sp, sc) = match next_relevant(&mut self.input) {
            Some(x) => x,
            None => return None,
        };
        let mut sl = sp + sc.len_utf8();
        let tkn = match sc {
            ':' => Token::Colon,
            ';' => Token::Semicolon,
            '|' => Token::Pipe,
            '-' if self.input.peek().map(|&(_, c)| c) == Some('>') => {
                self.input.next();
                sl += 1;
                Token::Arrow
            }
            '\'' | '"' => {
                let mut buffer = String::new();
                let mut escaped = false;
                while let Some((ep, ec)) = self.input.next() {
                    sl = ep + ec.len_utf8();
                    if escaped {
                        buffer.push(ec);
                        escaped = false;
                    } else if ec == '\\' {
                        escaped = true;
                    } else if ec == sc {
                        break;
                    } else {
                        buffer.push(ec);
                    }
                }
                Token::Ident(buffer)
            }
            c if c.is_control() => Token::Unknown(c),
            _ => {
                let mut buffer = String::new();
                buffer.push(sc);
                while let Some(&(ep, ec)) = self.input.peek() {
                    if ec.is_whitespace() || is_symbol(ec) {
                        break;
                    }
                    self.input.next();
                    if ec == '-' && self.input.peek().map(|&(_, c)| c) == Some('>') {
                        self.input.next();
                        self.pending = Some((ep, ep + 2, Token::Arrow));
                        break;
                    }
                    buffer.push(ec);
                    sl = ep + ec.len_utf8();
                }
                match buffer.as_str() {
                    "start" => Token::Keyword(Keyword::Start),
                    "epsilon" | "ε" => Token::Keyword(Keyword::Epsilon),
                    _ => Token::Ident(buffer),
                }
            }
        };
        Some((sp, sl, tkn))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::Token::*;
    use super::Keyword as Kw;

    fn lex<S: AsRef<str>>(input: S) -> Vec<Token> {
        let lex = Lexer::new(input.as_ref().char_indices());
        lex.map(|(_, _, tkn)| tkn).collect()
    }

    #[test]
    fn start_declaration() {
        assert_eq!(
            lex("start expr;"),
            vec![Keyword(Kw::Start), Ident("expr".into()), Semicolon]
        );
    }

    #[test]
    fn rule_with_alternatives() {
        assert_eq!(
            lex("list : list ',' IDENT | IDENT ;"),
            vec![
                Ident("list".into()),
                Colon,
                Ident("list".into()),
                Ident(",".into()),
                Ident("IDENT".into()),
                Pipe,
                Ident("IDENT".into()),
                Semicolon,
            ]
        );
    }

    #[test]
    fn arrow_and_epsilon() {
        assert_eq!(
            lex("A -> a A | ε | epsilon;"),
            vec![
                Ident("A".into()),
                Arrow,
                Ident("a".into()),
                Ident("A".into()),
                Pipe,
                Keyword(Kw::Epsilon),
                Pipe,
                Keyword(Kw::Epsilon),
                Semicolon,
            ]
        );
    }

    #[test]
    fn primes_and_operators_are_words() {
        assert_eq!(
            lex("E' -> + T E'"),
            vec![
                Ident("E'".into()),
                Arrow,
                Ident("+".into()),
                Ident("T".into()),
                Ident("E'".into()),
            ]
        );
    }

    #[test]
    fn arrow_ends_bare_word() {
        assert_eq!(
            lex("A->a|b;"),
            vec![
                Ident("A".into()),
                Arrow,
                Ident("a".into()),
                Pipe,
                Ident("b".into()),
                Semicolon,
            ]
        );
        assert_eq!(
            lex("E'->x-y"),
            vec![Ident("E'".into()), Arrow, Ident("x-y".into())]
        );
        let spans: Vec<(usize, usize)> = Lexer::new("S->a".char_indices())
            .map(|(s, e, _)| (s, e))
            .collect();
        assert_eq!(spans, vec![(0, 1), (1, 3), (3, 4)]);
    }

    #[test]
    fn comment_single_line() {
        assert_eq!(lex("| // comment\n ; // comment"), vec![Pipe, Semicolon]);
    }

    #[test]
    fn comment_inline() {
        assert_eq!(lex("| /* comment */ ;"), vec![Pipe, Semicolon]);
    }

    #[test]
    fn comment_multiple_lines() {
        assert_eq!(lex("| /* comment \n comment */ ;"), vec![Pipe, Semicolon]);
    }

    #[test]
    fn quoted_escapes() {
        assert_eq!(
            lex("'some \\'stuff\\'' \"|\""),
            vec![Ident("some 'stuff'".into()), Ident("|".into())]
        );
    }

    #[test]
    fn offsets() {
        let spans: Vec<(usize, usize)> = Lexer::new("S -> 'a';".char_indices())
            .map(|(s, e, _)| (s, e))
            .collect();
        assert_eq!(spans, vec![(0, 1), (2, 4), (5, 8), (8, 9)]);
    }
}
