mod cli;

use std::process::ExitCode;

use clap::Parser;
use rand::prelude::*;

use lsys::engine::Expansion;
use lsys::grammar::render;
use lsys::parser::parse_grammar;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    let source = match std::fs::read_to_string(&cli.file) {
        Ok(source) => source,
        Err(error) => {
            eprintln!("Could not read {}: {}", cli.file.display(), error);
            return ExitCode::FAILURE;
        }
    };

    let grammar = match parse_grammar(&source) {
        Ok(grammar) => grammar,
        Err(errors) => {
            for error in errors {
                eprintln!("{}", error);
            }
            return ExitCode::FAILURE;
        }
    };

    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut last = render(&grammar.axiom);
    for generation in Expansion::new(&grammar, rng).take(cli.steps) {
        last = render(&generation);
        if cli.all {
            println!("{}", last);
        }
    }
    if !cli.all {
        println!("{}", last);
    }

    ExitCode::SUCCESS
}
