// Copyright (c) 2018 Fabian Schuiki
#[macro_use]
extern crate clap;
extern crate llgram;
#[macro_use]
extern crate log;
extern crate memmap;
extern crate stderrlog;

use std::fs::File;
use std::process;
use std::str;

use clap::{App, Arg, ArgMatches};
use memmap::Mmap;

use llgram::grammar::Grammar;
use llgram::ll1;
use llgram::parser::parse_grammar;
use llgram::predictive::PredictiveParser;
use llgram::table::ParseTable;

fn main() {
    let matches = app().get_matches();

    stderrlog::new()
        .module(module_path!())
        .module("llgram")
        .quiet(matches.is_present("quiet"))
        .verbosity(matches.occurrences_of("verbosity") as usize + 1)
        .init()
        .unwrap();

    match run(&matches) {
        Ok(true) => (),
        Ok(false) => process::exit(2),
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}

fn app() -> App<'static, 'static> {
    App::new(crate_name!())
        .version(crate_version!())
        .author(crate_authors!())
        .about("Transforms a grammar for LL(1) parsing and traces predictive parses")
        .arg(
            Arg::with_name("GRAMMAR")
                .help("The grammar description file")
                .required(true),
        )
        .arg(
            Arg::with_name("input")
                .short("i")
                .long("input")
                .value_name("TOKENS")
                .help("Whitespace-separated tokens to parse")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1),
        )
        .arg(
            Arg::with_name("start")
                .short("s")
                .long("start")
                .value_name("SYMBOL")
                .help("Overrides the start symbol")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("keep-left-recursion")
                .long("keep-left-recursion")
                .help("Does not eliminate left recursion"),
        )
        .arg(
            Arg::with_name("no-factor")
                .long("no-factor")
                .help("Does not extract common left factors"),
        )
        .arg(
            Arg::with_name("lenient")
                .long("lenient")
                .help("Builds a parse table even if the grammar is not LL(1)"),
        )
        .arg(
            Arg::with_name("max-steps")
                .long("max-steps")
                .value_name("N")
                .help("Limits the number of steps of each parse")
                .takes_value(true)
                .validator(|v| v.parse::<usize>().map(|_| ()).map_err(|e| e.to_string())),
        )
        .arg(
            Arg::with_name("verbosity")
                .short("v")
                .multiple(true)
                .help("Increases message verbosity"),
        )
        .arg(
            Arg::with_name("quiet")
                .short("q")
                .help("Silences all log messages"),
        )
}

/// Run the pipeline. Returns whether every input was accepted.
fn run(matches: &ArgMatches) -> Result<bool, llgram::Error> {
    let path = matches.value_of("GRAMMAR").unwrap();
    let mut grammar = load(path)?;
    if let Some(start) = matches.value_of("start") {
        match grammar.get_nonterminal(start) {
            Some(id) => grammar.set_start(id),
            None => return Err(llgram::Error::UnknownStart(start.to_owned())),
        }
    }
    println!("Grammar:\n{}", grammar);

    if !matches.is_present("keep-left-recursion") {
        grammar.eliminate_left_recursion();
        println!("\nAfter left recursion elimination:\n{}", grammar);
    }
    if !matches.is_present("no-factor") {
        grammar.extract_left_common_factor();
        println!("\nAfter left factoring:\n{}", grammar);
    }

    grammar.compute_first();
    grammar.compute_follow();
    if let Some(first) = grammar.first_sets() {
        println!("\nFIRST:\n{}", first.pretty(&grammar));
    }
    if let Some(follow) = grammar.follow_sets() {
        println!("\nFOLLOW:\n{}", follow.pretty(&grammar));
    }

    let table = match ll1::check(&grammar) {
        Ok(()) => {
            println!("\nThe grammar is LL(1).");
            match ParseTable::compute(&grammar) {
                Ok(table) => table,
                Err(conflicts) => {
                    for conflict in &conflicts {
                        eprintln!("conflict {}", conflict.pretty(&grammar));
                    }
                    return Err(llgram::Error::Conflicts(conflicts));
                }
            }
        }
        Err(violation) => {
            println!("\nThe grammar is not LL(1): {}", violation.pretty(&grammar));
            if !matches.is_present("lenient") {
                return Ok(false);
            }
            warn!("building a parse table anyway; later productions win conflicts");
            ParseTable::compute_overwriting(&grammar)
        }
    };
    println!("\nParse table:\n{}", table.pretty(&grammar));

    let mut parser = PredictiveParser::with_table(&grammar, table)?;
    if matches.is_present("max-steps") {
        let limit = value_t!(matches, "max-steps", usize).unwrap_or_else(|e| e.exit());
        parser = parser.with_step_limit(limit);
    }

    let mut all_accepted = true;
    for input in matches.values_of("input").into_iter().flat_map(|v| v) {
        let tokens: Vec<&str> = input.split_whitespace().collect();
        let parse = parser.parse(&tokens[..]);
        println!("\nParsing `{}`:\n{}", input, parse);
        all_accepted &= parse.accepted;
    }
    Ok(all_accepted)
}

/// Load a grammar description from a file.
fn load(path: &str) -> Result<Grammar, llgram::Error> {
    debug!("loading grammar from {}", path);
    let file = File::open(path)?;
    if file.metadata()?.len() == 0 {
        return parse_grammar("");
    }
    // Safety: the mapping is read-only and dropped before this function
    // returns. The file must not be truncated by another process meanwhile.
    let mmap = unsafe { Mmap::map(&file)? };
    let text = match str::from_utf8(&mmap) {
        Ok(text) => text,
        Err(e) => {
            return Err(llgram::Error::Syntax {
                offset: e.valid_up_to(),
                message: "invalid UTF-8".to_owned(),
            })
        }
    };
    parse_grammar(text)
}
