// Copyright (c) 2018 Fabian Schuiki

//! Errors reported while loading grammars and building parsers.

use std::io;
use std::result;

use thiserror::Error;

use table::Conflict;

/// A result with the crate's error type.
pub type Result<T> = result::Result<T, Error>;

/// Everything that can go wrong outside of a parse run.
#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum Error {
    #[error("syntax error at offset {offset}: {message}")]
    Syntax { offset: usize, message: String },
    #[error("`{0}` is reserved and cannot be used here")]
    ReservedName(String),
    #[error("nonterminal `{0}` has no productions")]
    NoProductions(String),
    #[error("unknown start symbol `{0}`")]
    UnknownStart(String),
    #[error("grammar has no start symbol")]
    NoStartSymbol,
    #[error("parse table has {} conflicting entries", .0.len())]
    Conflicts(Vec<Conflict>),
    #[error(transparent)]
    Io(#[from] io::Error),
}
