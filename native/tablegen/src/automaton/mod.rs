//! Finite automata for table-driven lexer and parser generation.
//!
//! This module provides epsilon-NFA and DFA implementations with:
//! - Named states carrying caller-defined payloads
//! - Epsilon closure and move-set computation
//! - Subset construction (NFA to DFA conversion) with payload reduction
//! - Payload-driven state merging, as used for LALR(1) construction
//! - Canonical renumbering and a binary persisted form for DFAs

mod arena;
mod codec;
mod conversion;
mod dfa;
mod error;
mod merge;
mod nfa;
mod render;
mod state;
mod subset_construction;
mod symbol;
mod transition;

pub use codec::{FnCodec, PayloadCodec, StringCodec};
pub use conversion::deterministic_nfa_to_dfa;
pub use dfa::DFA;
pub use error::{AutomatonError, InvariantViolation, Result};
pub use nfa::{Edge, JOIN_LEFT_PREFIX, JOIN_RIGHT_PREFIX, NFA};
pub use render::RenderOptions;
pub use state::{DfaState, NfaState};
pub use subset_construction::{
    SubsetConstructionConfig, canonical_set_name, nfa_to_dfa, nfa_to_dfa_with_config,
};
pub use symbol::{EPSILON, EPSILON_GLYPH, display_symbol, is_epsilon};
pub use transition::Transition;
