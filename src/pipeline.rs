//! Specification compilation: spec text → NFA → DFA → transition table.
//!
//! A specification is two groups of lines. The first group defines named
//! character classes (`$DIGIT [0-9]`), each immediately registered so later
//! lines can reference it; the group ends at the first blank line or the
//! first line whose body is not a character class. The second group defines
//! token rules (`$INT $DIGIT+`), each compiled through the full regex
//! grammar and unioned into one NFA whose per-rule exits stay accepting.
//!
//! Compilation is deliberately single-threaded and in source order: later
//! rules may use classes defined above them, and state ids are allocated
//! from one per-build arena.

use crate::automata::cursor::Cursor;
use crate::automata::nfa::union;
use crate::automata::regex::{parse_char_class, parse_regex, ClassRegistry, ParseCtx, ParseResult};
use crate::automata::subset::subset_construction;
use crate::automata::table::DfaTable;
use crate::automata::{Dfa, Nfa, NfaFragment, StateId};

/// Fatal specification error. Any grammar failure in a token rule aborts the
/// whole compilation; no partial automaton is usable.
#[derive(Debug, Clone)]
pub struct CompileError {
    /// 1-based line number in the specification.
    pub line: usize,
    pub message: String,
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "spec error at line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for CompileError {}

/// Pipeline statistics, for diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct CompileStats {
    pub num_classes: usize,
    pub num_rules: usize,
    pub num_nfa_states: usize,
    pub num_dfa_states: usize,
}

impl std::fmt::Display for CompileStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "compiled {} classes, {} rules: {} NFA states -> {} DFA states",
            self.num_classes, self.num_rules, self.num_nfa_states, self.num_dfa_states
        )
    }
}

/// Everything the compilation pipeline produces. The table (plus the DFA
/// start id, always 0) is all the scanner needs; the automata are kept for
/// inspection.
#[derive(Debug, Clone)]
pub struct CompiledLexer {
    pub nfa: Nfa,
    /// Entry state of the combined NFA.
    pub nfa_start: StateId,
    pub dfa: Dfa,
    pub table: DfaTable,
    pub stats: CompileStats,
}

/// Compile a specification into a scannable transition table.
pub fn compile(spec: &str) -> Result<CompiledLexer, CompileError> {
    let mut registry = ClassRegistry::new();
    let mut nfa = Nfa::new();
    let mut lines = spec.lines().enumerate().peekable();

    // Group 1: class definitions, until a blank line (consumed) or a line
    // that does not parse as a class (left for the rule group).
    while let Some(&(_, line)) = lines.peek() {
        if line.trim().is_empty() {
            lines.next();
            break;
        }
        let Some((name, body)) = split_line(line) else { break };
        let parsed = {
            let mut ctx = ParseCtx::new(&registry, &mut nfa);
            match parse_char_class(Cursor::new(body), &mut ctx) {
                ParseResult::Match(_, set) => Some(set),
                _ => None,
            }
        };
        match parsed {
            Some(set) => {
                registry.define(name, set);
                lines.next();
            }
            None => break,
        }
    }

    // Group 2: token rules, until a blank line or end of input.
    let mut num_rules = 0usize;
    let mut combined: Option<NfaFragment> = None;
    for (idx, line) in lines {
        if line.trim().is_empty() {
            break;
        }
        let Some((name, body)) = split_line(line) else {
            return Err(CompileError {
                line: idx + 1,
                message: format!("token rule {:?} has no regex", line.trim()),
            });
        };
        let frag = {
            let mut ctx = ParseCtx::new(&registry, &mut nfa);
            match parse_regex(Cursor::new(body), &mut ctx) {
                ParseResult::Match(_, frag) => frag,
                _ => {
                    return Err(CompileError {
                        line: idx + 1,
                        message: format!(
                            "cannot compile regex {:?} for token {}",
                            body.trim(),
                            name
                        ),
                    });
                }
            }
        };
        nfa.states[frag.exit as usize].accept = true;
        nfa.states[frag.exit as usize].token = name.to_string();
        combined = Some(match combined {
            None => frag,
            Some(all) => union(&mut nfa, all, frag, false, false),
        });
        num_rules += 1;
    }

    let combined = combined.ok_or(CompileError {
        line: 0,
        message: "specification defines no token rules".to_string(),
    })?;

    let dfa = subset_construction(&nfa, combined.entry);
    let table = DfaTable::from_dfa(&dfa);
    let stats = CompileStats {
        num_classes: registry.len(),
        num_rules,
        num_nfa_states: nfa.states.len(),
        num_dfa_states: dfa.states.len(),
    };

    Ok(CompiledLexer { nfa, nfa_start: combined.entry, dfa, table, stats })
}

/// Split a spec line into its leading name and the rest (the regex body).
/// `None` when there is no body.
fn split_line(line: &str) -> Option<(&str, &str)> {
    let trimmed = line.trim_start();
    let name_end = trimmed.find(char::is_whitespace)?;
    let (name, body) = trimmed.split_at(name_end);
    if body.trim().is_empty() {
        return None;
    }
    Some((name, body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classes_then_rules() {
        let lexer = compile("$DIGIT [0-9]\n\n$INT $DIGIT+\n").unwrap();
        assert_eq!(lexer.stats.num_classes, 1);
        assert_eq!(lexer.stats.num_rules, 1);
        assert!(lexer.stats.num_dfa_states > 0);
    }

    #[test]
    fn test_unparsable_class_line_starts_rule_group() {
        // A line whose body is not a character class ends the class group
        // and becomes the first token rule.
        let lexer = compile("$DIGIT [0-9]\n$SUM ($DIGIT|x)+\n").unwrap();
        assert_eq!(lexer.stats.num_classes, 1);
        assert_eq!(lexer.stats.num_rules, 1);
    }

    #[test]
    fn test_class_like_rule_needs_blank_separator() {
        // "$DIGIT+" happens to parse as a character class (the trailing `+`
        // is ignored by the class grammar), so without a blank separator the
        // line registers a class and no rules remain.
        let err = compile("$DIGIT [0-9]\n$INT $DIGIT+\n").unwrap_err();
        assert!(err.message.contains("no token rules"));
    }

    #[test]
    fn test_class_chaining() {
        let spec = "$LOW [a-f]\n$HIGH [g-k]\n\n$ID ($LOW|$HIGH)+\n";
        let lexer = compile(spec).unwrap();
        assert_eq!(lexer.stats.num_classes, 2);
    }

    #[test]
    fn test_undefined_class_is_fatal() {
        let err = compile("$A [a]\n\n$INT $DIGIT+\n").unwrap_err();
        assert_eq!(err.line, 3);
        assert!(err.message.contains("$INT"));
    }

    #[test]
    fn test_epsilon_rule_is_fatal() {
        // `[x` never reduces to a fragment, so the rule is an epsilon match.
        let err = compile("$BAD [x\n").unwrap_err();
        assert!(err.message.contains("cannot compile"));
    }

    #[test]
    fn test_malformed_rule_is_fatal() {
        let err = compile("$P (ab\n").unwrap_err();
        assert!(err.message.contains("$P"));
    }

    #[test]
    fn test_rule_without_regex_is_fatal() {
        let err = compile("$A [a]\n\n$LONELY\n").unwrap_err();
        assert!(err.message.contains("no regex"));
    }

    #[test]
    fn test_empty_spec_is_fatal() {
        let err = compile("").unwrap_err();
        assert!(err.message.contains("no token rules"));
    }

    #[test]
    fn test_lines_after_second_blank_are_ignored() {
        let lexer = compile("$D [0-9]\n\n$N $D+\n\nthis is not parsed\n").unwrap();
        assert_eq!(lexer.stats.num_rules, 1);
    }

    #[test]
    fn test_rule_exits_keep_their_labels() {
        let lexer = compile("$A a\n$B b\n").unwrap();
        let labeled: Vec<&str> = lexer
            .nfa
            .states
            .iter()
            .filter(|s| s.accept && !s.token.is_empty())
            .map(|s| s.token.as_str())
            .collect();
        assert_eq!(labeled, vec!["$A", "$B"]);
    }
}
