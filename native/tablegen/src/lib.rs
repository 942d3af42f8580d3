//! Automaton engine for compiler-compilers.
//!
//! Lexer and parser generators build an [`automaton::NFA`] from their
//! specifications, then determinize, merge, renumber and persist it through
//! the operations in [`automaton`].

pub mod automaton;
