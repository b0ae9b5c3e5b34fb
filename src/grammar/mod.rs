/*
    This module is for storing and rendering L-system grammars
*/

use std::collections::HashMap;

// The base unit in a generation or replacement
#[derive(Debug, PartialEq, Clone)]
pub enum Symbol {
    // A member of the alphabet, subject to rewriting
    Letter(String),
    // An opaque terminal string, never rewritten
    Literal(String),
}

// The declared letter names, in declaration order
pub type Alphabet = Vec<String>;

// One string of the derivation; generation 0 is the axiom
pub type Generation = Vec<Symbol>;

// One alternative of a rule, with an optional relative weight
#[derive(Debug, PartialEq, Clone)]
pub struct ReplacementCase {
    pub symbols: Vec<Symbol>,
    pub weight: Option<f64>,
}

// The replacement cases of a single letter, in declaration order.
// Either every case carries a weight or none does.
pub type Rule = Vec<ReplacementCase>;

pub type RuleTable = HashMap<String, Rule>;

// The validated, frozen result of parsing an .lsys file
#[derive(Debug, PartialEq)]
pub struct Grammar {
    pub alphabet: Alphabet,
    pub axiom: Generation,
    pub rules: RuleTable,
}

// Flattens a generation into text: literals contribute their contents,
// letters their names
pub fn render(generation: &[Symbol]) -> String {
    generation.iter().map(|symbol| match symbol {
        Symbol::Letter(name) => name.as_str(),
        Symbol::Literal(text) => text.as_str(),
    }).collect()
}
