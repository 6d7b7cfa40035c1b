// Copyright (c) 2018 Fabian Schuiki

//! Grammar transformations and LL(1) predictive parsing.
//!
//! A [`Grammar`](grammar/struct.Grammar.html) is loaded from a rule mapping or
//! a textual description, rewritten to remove left recursion and common
//! prefixes, analyzed for its FIRST and FOLLOW sets, checked for LL(1)
//! conformance, and finally driven by a table-based predictive parser.

#![deny(missing_docs)]

extern crate bit_set;
extern crate indexmap;
#[macro_use]
extern crate log;
extern crate thiserror;

pub mod error;
pub mod grammar;
pub mod transform;
pub mod first;
pub mod follow;
pub mod ll1;
pub mod table;
pub mod predictive;
pub mod lexer;
pub mod parser;

pub use error::{Error, Result};
pub use grammar::Grammar;
pub use ll1::is_ll1;
pub use predictive::{Parse, PredictiveParser};

/// A pretty printer.
pub struct Pretty<C, T> {
    ctx: C,
    item: T,
}

impl<C, T> Pretty<C, T> {
    pub(crate) fn new(ctx: C, item: T) -> Pretty<C, T> {
        Pretty { ctx, item }
    }
}
