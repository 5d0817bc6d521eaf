//! Table walker: longest-match tokenization with backtracking.
//!
//! The scanner sees only the flattened transition table and a start state id
//! — never the NFA, the DFA graph, or the parser. It realizes maximal-munch
//! lexing: prefer the longest prefix that lands on an accepting state, and
//! when the walk dead-ends, roll back to that longest accepting prefix
//! instead of failing the line.
//!
//! Scanning one line keeps no state shared with other lines beyond the
//! read-only table, so lines are independent of each other.

use crate::automata::table::DfaTable;
use crate::automata::{StateId, DEAD_STATE};

/// One emitted token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token type with the leading marker character already stripped.
    pub token_type: String,
    /// The literal matched substring.
    pub lexeme: String,
}

/// A non-fatal scan error: some stretch of the line matched no token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanError {
    /// Byte offset of the unmatched text within the line.
    pub column: usize,
    /// The unmatched text.
    pub text: String,
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ERROR: unmatched {:?} at column {}", self.text, self.column)
    }
}

/// Tokens and errors produced from one line.
#[derive(Debug, Clone, Default)]
pub struct LineScan {
    pub tokens: Vec<Token>,
    pub errors: Vec<ScanError>,
}

/// Longest accepting prefix seen so far for the token in progress.
struct Pending<'t> {
    /// Index of the last byte of the accepted lexeme.
    end: usize,
    /// The stored (unresolved) DFA label at that position.
    label: &'t str,
}

/// Walks a [`DfaTable`] over input lines.
pub struct Scanner<'t> {
    table: &'t DfaTable,
    start: StateId,
}

impl<'t> Scanner<'t> {
    pub fn new(table: &'t DfaTable, start: StateId) -> Self {
        Scanner { table, start }
    }

    /// Tokenize one line.
    ///
    /// A space on which the current state has no transition is a hard token
    /// boundary: the pending token (if any) is emitted and the space itself
    /// joins no token. A dead end rolls back to the last accepting position
    /// when one exists; otherwise the buffered text is reported as an
    /// unmatched error and scanning resumes one byte past where that token
    /// attempt began. A line that ends in a non-accepting state reports its
    /// trailing buffer the same way.
    pub fn scan_line(&self, line: &str) -> LineScan {
        let bytes = line.as_bytes();
        let mut out = LineScan::default();

        let mut state = self.start;
        let mut token_start = 0usize;
        let mut pending: Option<Pending<'_>> = None;
        let mut i = 0usize;

        while i < bytes.len() {
            let byte = bytes[i];

            if byte == b' ' && self.table.transition(state, byte) == DEAD_STATE {
                if let Some(p) = pending.take() {
                    emit(&mut out, bytes, token_start, &p);
                }
                state = self.start;
                i += 1;
                token_start = i;
                continue;
            }

            let next = self.table.transition(state, byte);
            if next == DEAD_STATE {
                match pending.take() {
                    Some(p) => {
                        // Backtrack: re-scan everything after the accepted
                        // lexeme with a fresh start state.
                        emit(&mut out, bytes, token_start, &p);
                        i = p.end + 1;
                    }
                    None => {
                        out.errors.push(ScanError {
                            column: token_start,
                            text: lossy(&bytes[token_start..=i]),
                        });
                        i = token_start + 1;
                    }
                }
                state = self.start;
                token_start = i;
                continue;
            }

            if self.table.is_accepting(next) {
                pending = Some(Pending {
                    end: i,
                    label: self.table.label(next).unwrap_or(""),
                });
            }
            state = next;
            i += 1;
        }

        if self.table.is_accepting(state) {
            if let Some(p) = pending.take() {
                emit(&mut out, bytes, token_start, &p);
            }
        } else if token_start < bytes.len() {
            out.errors.push(ScanError {
                column: token_start,
                text: lossy(&bytes[token_start..]),
            });
        }

        out
    }
}

fn emit(out: &mut LineScan, bytes: &[u8], token_start: usize, p: &Pending<'_>) {
    out.tokens.push(Token {
        token_type: resolve_type(p.label).to_string(),
        lexeme: lossy(&bytes[token_start..=p.end]),
    });
}

/// Lexemes are byte slices of the input line; the alphabet is bytes, not
/// characters, so a slice may split a multi-byte sequence.
fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Resolve a stored DFA label to the emitted token type.
///
/// A label may carry several space-joined rule names when determinization
/// merged several accepting exits; they are ordered by rule declaration, and
/// the first rule wins. The single leading marker character of the winning
/// name is stripped.
fn resolve_type(label: &str) -> &str {
    let winner = label.split(' ').next().unwrap_or("");
    winner.get(1..).unwrap_or("")
}
