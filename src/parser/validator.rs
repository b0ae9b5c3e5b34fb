use std::collections::HashMap;
use std::fmt::Display;

use itertools::Itertools;

use crate::error_handling::{Error, ErrorType, Errors, Location};
use crate::grammar::{Alphabet, Generation, Rule, Symbol};

#[derive(Debug, PartialEq, Clone)]
pub enum ValidationErrorType {
    // A rule has some weighted and some unweighted cases
    InconsistentWeighting(String),
    // A weighted rule whose weights sum to zero
    ZeroTotalWeight(String),
    // A letter reference survived parsing without being declared
    // This is a problem with lsys, not the grammar
    UnresolvedLetter(String),
}

impl ErrorType for ValidationErrorType {}

impl Display for ValidationErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationErrorType::InconsistentWeighting(name) =>
                write!(f, "Rule for `{}` mixes weighted and unweighted cases", name),
            ValidationErrorType::ZeroTotalWeight(name) =>
                write!(f, "Rule for `{}` has zero total weight", name),
            ValidationErrorType::UnresolvedLetter(name) =>
                write!(f, "Letter `{}` escaped alphabet checking (this is a problem with lsys, not the grammar)", name),
        }
    }
}

pub type ValidationError = Error<ValidationErrorType>;
pub type ValidationErrors = Errors<ValidationErrorType>;

// Rules as the parser hands them over, each with the line of its `$`
pub type IntermediateRuleTable = HashMap<String, (Rule, Location)>;

// All-or-nothing weighting, and a strictly positive total when weighted
fn weighting_errors(letter: &str, rule: &Rule, location: &Location) -> ValidationErrors {
    let weighted = rule.iter().filter(|case| case.weight.is_some()).count();
    let mut errors = Vec::new();

    if weighted != 0 && weighted != rule.len() {
        errors.push(Error {
            location: location.clone(),
            error: ValidationErrorType::InconsistentWeighting(letter.to_owned())
        });
    }

    if weighted == rule.len() {
        let total: f64 = rule.iter().filter_map(|case| case.weight).sum();
        if total <= 0.0 {
            errors.push(Error {
                location: location.clone(),
                error: ValidationErrorType::ZeroTotalWeight(letter.to_owned())
            });
        }
    }

    errors
}

// The parser already rejects undeclared letters; re-assert it here so a
// future parser defect cannot hand the engine a dangling reference
fn unresolved_letters<'a>(
    symbols: &'a [Symbol],
    alphabet: &'a Alphabet,
    location: &'a Location
) -> impl Iterator<Item = ValidationError> + 'a {
    symbols.iter()
        .filter_map(|symbol| match symbol {
            Symbol::Letter(name) => Some(name),
            _ => None
        })
        .filter(|name| !alphabet.contains(name))
        .map(|name| Error {
            location: location.clone(),
            error: ValidationErrorType::UnresolvedLetter(name.clone())
        })
}

pub fn validate(
    alphabet: &Alphabet,
    axiom: &Generation,
    rules: &IntermediateRuleTable
) -> Result<(), ValidationErrors> {
    let axiom_location = Location { line: 0 };
    let mut errors = unresolved_letters(axiom, alphabet, &axiom_location).collect_vec();

    for (letter, (rule, location)) in rules {
        errors.extend(weighting_errors(letter, rule, location));
        for case in rule {
            errors.extend(unresolved_letters(&case.symbols, alphabet, location));
        }
    }

    // HashMap order is arbitrary; report in source order
    errors.sort_by_key(|error| error.location.line);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
