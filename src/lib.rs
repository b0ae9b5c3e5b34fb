/*
    lsys parses stochastic L-system grammars and expands them
    generation by generation
*/

pub mod engine;
pub mod error_handling;
pub mod grammar;
pub mod parser;
