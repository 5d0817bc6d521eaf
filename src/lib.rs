//! # scangen — scanner generator
//!
//! Compiles a specification of named character classes and token regexes
//! into a single deterministic finite automaton, then tokenizes text lines
//! against it.
//!
//! ## Pipeline
//!
//! ```text
//! specification text
//!        │
//!        ▼
//!  ┌───────────────────────────────────────────────┐
//!  │ 1. Regex parser (automata::regex)             │
//!  │    class lines -> registry, rule lines ->     │
//!  │    NFA fragments built while parsing          │
//!  │                                               │
//!  │ 2. Thompson composition (automata::nfa)       │
//!  │    concat / union / star over one arena       │
//!  │                                               │
//!  │ 3. Subset construction (automata::subset)     │
//!  │    NFA -> DFA with per-state token labels     │
//!  │                                               │
//!  │ 4. Table flattening (automata::table)         │
//!  │    dense stateCount x 256 array, text         │
//!  │    serializable and bit-exact on round trip   │
//!  └───────────────────────────────────────────────┘
//!        │
//!        ▼
//!   Scanner (scanner): longest-match tokenization
//!   with backtracking over the read-only table
//! ```
//!
//! The table is immutable once built; scanning different lines shares it
//! read-only with no other cross-line state.

pub mod automata;
pub mod pipeline;
pub mod scanner;

#[cfg(test)]
mod tests;

pub use automata::table::{DfaTable, TableParseError};
pub use pipeline::{compile, CompileError, CompileStats, CompiledLexer};
pub use scanner::{LineScan, ScanError, Scanner, Token};
