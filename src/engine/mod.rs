/*
    This module expands generations by weighted random rewriting
*/

use rand::prelude::*;

use crate::grammar::{Generation, Grammar, ReplacementCase, Rule, Symbol};

// Picks one case from a rule. Unweighted rules draw uniformly; weighted
// rules draw from the distribution the weights define after normalizing
// by their total. Declaration order fixes each case's cumulative
// interval, so a given draw always lands on the same case.
fn choose_case<'a, R: Rng>(rule: &'a Rule, rng: &mut R) -> &'a ReplacementCase {
    // Validation guarantees all-or-nothing weighting, so the first case
    // speaks for the whole rule
    if rule[0].weight.is_none() {
        return &rule[rng.gen_range(0..rule.len())];
    }

    let total: f64 = rule.iter().filter_map(|case| case.weight).sum();
    let mut draw = rng.gen::<f64>() * total;
    for case in rule {
        draw -= case.weight.unwrap_or(0.0);
        if draw < 0.0 {
            return case;
        }
    }
    // Floating-point slop: the last interval absorbs the remainder
    &rule[rule.len() - 1]
}

// One rewriting step. Literals and letters without a rule pass through
// unchanged; every other letter is replaced by one randomly chosen case
// of its rule. The input generation is left untouched.
pub fn expand<R: Rng>(generation: &Generation, grammar: &Grammar, rng: &mut R) -> Generation {
    let mut next = Generation::with_capacity(generation.len());
    for symbol in generation {
        match symbol {
            Symbol::Literal(_) => next.push(symbol.clone()),
            Symbol::Letter(name) => match grammar.rules.get(name) {
                None => next.push(symbol.clone()),
                Some(rule) => next.extend(choose_case(rule, rng).symbols.iter().cloned()),
            }
        }
    }
    next
}

// Successive generations of a grammar, starting after the axiom and
// ending when a step changes nothing more
pub struct Expansion<'a, R: Rng> {
    grammar: &'a Grammar,
    current: Generation,
    rng: R,
}

impl<'a, R: Rng> Expansion<'a, R> {
    pub fn new(grammar: &'a Grammar, rng: R) -> Self {
        Expansion {
            grammar,
            current: grammar.axiom.clone(),
            rng,
        }
    }
}

impl<R: Rng> Iterator for Expansion<'_, R> {
    type Item = Generation;

    fn next(&mut self) -> Option<Generation> {
        let next = expand(&self.current, self.grammar, &mut self.rng);
        if next == self.current {
            return None;
        }
        self.current = next;
        Some(self.current.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_grammar;

    fn letter(name: &str) -> Symbol {
        Symbol::Letter(name.to_string())
    }

    fn literal(text: &str) -> Symbol {
        Symbol::Literal(text.to_string())
    }

    #[test]
    fn expand_identity_without_rules() {
        let grammar = parse_grammar("%A,B\n@A,B@").unwrap();
        let mut rng = StdRng::seed_from_u64(0);

        let mut generation = grammar.axiom.clone();
        for _ in 0..5 {
            generation = expand(&generation, &grammar, &mut rng);
            assert_eq!(generation, grammar.axiom);
        }
    }

    #[test]
    fn expand_splices_case_symbols() {
        let grammar = parse_grammar("%A, B @A@ $A = \"x\" B ~").unwrap();
        let mut rng = StdRng::seed_from_u64(0);

        let generation = expand(&grammar.axiom, &grammar, &mut rng);
        assert_eq!(generation, vec![literal("x"), letter("B")]);
    }

    #[test]
    fn expand_leaves_input_untouched() {
        let grammar = parse_grammar("%A @A@ $A = A A ~").unwrap();
        let mut rng = StdRng::seed_from_u64(0);

        let start = grammar.axiom.clone();
        let _ = expand(&start, &grammar, &mut rng);
        assert_eq!(start, grammar.axiom);
    }

    #[test]
    fn expand_passes_literals_through() {
        let source = "%NOUN\n@\"pre \", NOUN, \" post\"@\n$NOUN = \"dog\" | NOUN ~";
        let grammar = parse_grammar(source).unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        let mut generation = grammar.axiom.clone();
        for _ in 0..10 {
            generation = expand(&generation, &grammar, &mut rng);
            assert_eq!(generation[0], literal("pre "));
            assert_eq!(generation[generation.len() - 1], literal(" post"));
        }
    }

    #[test]
    fn expand_uniform_choice_reaches_every_case() {
        let source = "%NOUN, VERB\n@NOUN, \" runs\"@\n$NOUN = \"dog \" | \"cat \" ~\n";
        let grammar = parse_grammar(source).unwrap();
        let mut rng = StdRng::seed_from_u64(21);

        let dog = vec![literal("dog "), literal(" runs")];
        let cat = vec![literal("cat "), literal(" runs")];

        let mut seen_dog = false;
        let mut seen_cat = false;
        for _ in 0..100 {
            let generation = expand(&grammar.axiom, &grammar, &mut rng);
            assert!(generation == dog || generation == cat);
            seen_dog |= generation == dog;
            seen_cat |= generation == cat;
        }
        assert!(seen_dog && seen_cat);
    }

    #[test]
    fn expand_follows_weight_ratio() {
        let grammar = parse_grammar("%A @A@ $A = \"x\":1 | \"y\":3 ~").unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        let mut y_count = 0;
        for _ in 0..4000 {
            let generation = expand(&grammar.axiom, &grammar, &mut rng);
            if generation == vec![literal("y")] {
                y_count += 1;
            } else {
                assert_eq!(generation, vec![literal("x")]);
            }
        }

        // Binomial(4000, 0.75): the 3:1 weighting puts `y` near 3000
        assert!((2800..=3200).contains(&y_count), "y drawn {} times", y_count);
    }

    #[test]
    fn expand_is_deterministic_per_seed() {
        let grammar = parse_grammar("%A @A@ $A = \"x\" A | A A ~").unwrap();

        let first: Vec<Generation> = Expansion::new(&grammar, StdRng::seed_from_u64(99))
            .take(6)
            .collect();
        let second: Vec<Generation> = Expansion::new(&grammar, StdRng::seed_from_u64(99))
            .take(6)
            .collect();

        assert_eq!(first.len(), 6);
        assert_eq!(first, second);
    }

    #[test]
    fn expansion_stops_at_fixed_point() {
        let grammar = parse_grammar("%A @A@ $A = \"x\" ~").unwrap();
        let mut expansion = Expansion::new(&grammar, StdRng::seed_from_u64(0));

        assert_eq!(expansion.next(), Some(vec![literal("x")]));
        assert_eq!(expansion.next(), None);
    }

    #[test]
    fn expansion_yields_successive_generations() {
        // Lindenmayer's algae system: A -> AB, B -> A
        let grammar = parse_grammar("%A, B\n@A@\n$A = A B ~\n$B = A ~\n").unwrap();
        let generations: Vec<Generation> = Expansion::new(&grammar, StdRng::seed_from_u64(0))
            .take(3)
            .collect();

        assert_eq!(generations, vec![
            vec![letter("A"), letter("B")],
            vec![letter("A"), letter("B"), letter("A")],
            vec![letter("A"), letter("B"), letter("A"), letter("A"), letter("B")]
        ]);
    }
}
