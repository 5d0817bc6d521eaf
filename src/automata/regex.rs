//! Recursive-descent regex parser that builds NFA fragments while parsing.
//!
//! No intermediate AST is allocated — every production that recognizes a set
//! of matching characters immediately emits a two-state NFA fragment, and the
//! enclosing productions combine fragments with the Thompson operators as
//! they reduce.
//!
//! ## Grammar
//!
//! Precedence low to high:
//!
//! | Production  | Syntax                                    |
//! |-------------|-------------------------------------------|
//! | alternation | `a\|b`                                    |
//! | sequence    | juxtaposition `ab`                        |
//! | postfix     | `a*` `a+` (`a+` is `a a*`)                |
//! | atom        | `(alternation)`, literal char, char-class |
//!
//! Character classes:
//!
//! | Form             | Meaning                                           |
//! |------------------|---------------------------------------------------|
//! | `.`              | all printable ASCII, codes 32-126                 |
//! | `[items]`        | union of literals and ranges `c1-c2` (auto-swap)  |
//! | `NAME`           | a previously defined class, longest-name match    |
//! | `^item] IN tail` | `tail` minus the negated item                     |
//!
//! Inside brackets the metacharacters `^ - [ ]` must be escaped; outside
//! brackets `\ * + ? | [ ( ) . ' " $` and space must be escaped. An
//! unescaped `$` means "defined class follows" and fails the literal
//! production so the caller falls through to class parsing.
//!
//! Productions are speculative: each clones its cursor, and a failed attempt
//! leaves the caller's cursor untouched. Failure (`Fail`) and matching
//! nothing (`Epsilon`) are distinct outcomes — an absent alternation tail is
//! epsilon, a missing `)` is failure.

use std::collections::HashMap;

use super::cursor::Cursor;
use super::nfa;
use super::{printable_ascii, CharSet, Nfa, NfaFragment};

/// Outcome of one grammar production.
#[derive(Debug, Clone)]
pub enum ParseResult<'a, T> {
    /// The production does not apply at this position. Enclosing productions
    /// may try an alternative; at the top of a token rule this is fatal.
    Fail,
    /// The production matched nothing. The caller's own cursor is unchanged.
    Epsilon,
    /// The production matched `T`, consuming input up to the carried cursor.
    Match(Cursor<'a>, T),
}

impl<'a, T> ParseResult<'a, T> {
    /// True for the `Match` variant.
    pub fn is_match(&self) -> bool {
        matches!(self, ParseResult::Match(..))
    }
}

/// Registry of named character classes, built incrementally as
/// class-definition lines are parsed and consulted by later regexes.
///
/// Tracks the longest registered name, which bounds how many characters a
/// greedy defined-class lookup may consume.
#[derive(Debug, Clone, Default)]
pub struct ClassRegistry {
    classes: HashMap<String, CharSet>,
    max_name_len: usize,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` as matching exactly the bytes of `set`. Redefinition
    /// replaces the previous set.
    pub fn define(&mut self, name: &str, set: CharSet) {
        self.max_name_len = self.max_name_len.max(name.len());
        self.classes.insert(name.to_string(), set);
    }

    pub fn lookup(&self, name: &str) -> Option<&CharSet> {
        self.classes.get(name)
    }

    pub fn max_name_len(&self) -> usize {
        self.max_name_len
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// State threaded through every production: the class registry, the NFA
/// arena fragments are emitted into, and the bracket-nesting flag that makes
/// a space significant inside `[...]`. One context serves one regex parse;
/// the parser is re-entrant across contexts.
pub struct ParseCtx<'c> {
    registry: &'c ClassRegistry,
    pub nfa: &'c mut Nfa,
    in_brackets: bool,
}

impl<'c> ParseCtx<'c> {
    pub fn new(registry: &'c ClassRegistry, nfa: &'c mut Nfa) -> Self {
        ParseCtx { registry, nfa, in_brackets: false }
    }
}

/// Parse a complete token-rule regex into an NFA fragment.
pub fn parse_regex<'a>(cur: Cursor<'a>, ctx: &mut ParseCtx<'_>) -> ParseResult<'a, NfaFragment> {
    alternation(cur, ctx)
}

/// Parse a character-class regex (the body of a class-definition line).
pub fn parse_char_class<'a>(cur: Cursor<'a>, ctx: &mut ParseCtx<'_>) -> ParseResult<'a, CharSet> {
    char_class(cur, ctx)
}

// ── Whitespace and single-byte helpers ────────────────────────────────────

/// Advance past whitespace between grammar elements. Inside brackets a space
/// is a literal set member and stops the skip; other whitespace is always
/// skipped.
fn skip_space(cur: &mut Cursor<'_>, in_brackets: bool) {
    while let Some(c) = cur.next() {
        if !c.is_ascii_whitespace() {
            cur.rewind();
            break;
        }
        if c == b' ' && in_brackets {
            cur.rewind();
            break;
        }
    }
}

/// Consume `expected` (after skipping whitespace). On mismatch the cursor is
/// rewound to the pre-byte position and `false` is returned.
fn match_literal(cur: &mut Cursor<'_>, expected: u8, in_brackets: bool) -> bool {
    skip_space(cur, in_brackets);
    match cur.next() {
        Some(c) if c == expected => true,
        Some(_) => {
            cur.rewind();
            false
        }
        None => false,
    }
}

// ── Alternation and sequencing ────────────────────────────────────────────

/// `alternation ::= sequence alternation-tail`
fn alternation<'a>(cur: Cursor<'a>, ctx: &mut ParseCtx<'_>) -> ParseResult<'a, NfaFragment> {
    match sequence(cur, ctx) {
        ParseResult::Fail => ParseResult::Fail,
        ParseResult::Epsilon => {
            // Empty left alternative: the empty language contributes nothing
            // to the union, so the tail alone decides the result.
            match alternation_tail(cur, ctx) {
                ParseResult::Match(c, frag) => ParseResult::Match(c, frag),
                ParseResult::Epsilon => ParseResult::Epsilon,
                ParseResult::Fail => ParseResult::Fail,
            }
        }
        ParseResult::Match(c1, left) => match alternation_tail(c1, ctx) {
            ParseResult::Epsilon => ParseResult::Match(c1, left),
            ParseResult::Fail => ParseResult::Fail,
            ParseResult::Match(c2, right) => {
                let frag = nfa::union(ctx.nfa, left, right, true, true);
                ParseResult::Match(c2, frag)
            }
        },
    }
}

/// `alternation-tail ::= '|' sequence alternation-tail | epsilon`
fn alternation_tail<'a>(cur: Cursor<'a>, ctx: &mut ParseCtx<'_>) -> ParseResult<'a, NfaFragment> {
    let mut c = cur;
    if !match_literal(&mut c, b'|', ctx.in_brackets) {
        return ParseResult::Epsilon;
    }
    match sequence(c, ctx) {
        ParseResult::Fail => ParseResult::Fail,
        ParseResult::Epsilon => {
            // `|` followed by an empty alternative: whatever the rest of the
            // tail yields stands alone.
            match alternation_tail(c, ctx) {
                ParseResult::Match(c2, frag) => ParseResult::Match(c2, frag),
                ParseResult::Epsilon => ParseResult::Epsilon,
                ParseResult::Fail => ParseResult::Fail,
            }
        }
        ParseResult::Match(c1, left) => match alternation_tail(c1, ctx) {
            ParseResult::Fail => ParseResult::Fail,
            ParseResult::Epsilon => ParseResult::Match(c1, left),
            ParseResult::Match(c2, right) => {
                let frag = nfa::union(ctx.nfa, left, right, true, true);
                ParseResult::Match(c2, frag)
            }
        },
    }
}

/// `sequence ::= atom sequence-tail`
fn sequence<'a>(cur: Cursor<'a>, ctx: &mut ParseCtx<'_>) -> ParseResult<'a, NfaFragment> {
    match atom(cur, ctx) {
        ParseResult::Fail => ParseResult::Fail,
        ParseResult::Epsilon => sequence_tail(cur, ctx),
        ParseResult::Match(c1, first) => match sequence_tail(c1, ctx) {
            ParseResult::Fail => ParseResult::Fail,
            ParseResult::Epsilon => ParseResult::Match(c1, first),
            ParseResult::Match(c2, rest) => {
                let frag = nfa::concatenate(ctx.nfa, first, rest);
                ParseResult::Match(c2, frag)
            }
        },
    }
}

/// `sequence-tail ::= atom sequence-tail | epsilon`
///
/// An atom that fails here is not an error — it just ends the sequence.
fn sequence_tail<'a>(cur: Cursor<'a>, ctx: &mut ParseCtx<'_>) -> ParseResult<'a, NfaFragment> {
    match atom(cur, ctx) {
        ParseResult::Fail | ParseResult::Epsilon => ParseResult::Epsilon,
        ParseResult::Match(c1, first) => match sequence_tail(c1, ctx) {
            ParseResult::Fail | ParseResult::Epsilon => ParseResult::Match(c1, first),
            ParseResult::Match(c2, rest) => {
                let frag = nfa::concatenate(ctx.nfa, first, rest);
                ParseResult::Match(c2, frag)
            }
        },
    }
}

// ── Atoms and postfix repetition ──────────────────────────────────────────

/// `atom ::= '(' alternation ')' postfix | RE_CHAR postfix | char-class postfix`
fn atom<'a>(cur: Cursor<'a>, ctx: &mut ParseCtx<'_>) -> ParseResult<'a, NfaFragment> {
    let mut c = cur;
    if match_literal(&mut c, b'(', ctx.in_brackets) {
        return match alternation(c, ctx) {
            ParseResult::Fail => ParseResult::Fail,
            ParseResult::Epsilon => ParseResult::Epsilon,
            ParseResult::Match(after_inner, inner) => {
                let mut c2 = after_inner;
                if !match_literal(&mut c2, b')', ctx.in_brackets) {
                    return ParseResult::Fail;
                }
                let (c3, frag) = postfix(c2, inner, ctx);
                ParseResult::Match(c3, frag)
            }
        };
    }

    match literal_char(cur, ctx) {
        ParseResult::Match(c1, byte) => {
            let frag = nfa::from_byte(ctx.nfa, byte);
            let (c2, frag) = postfix(c1, frag, ctx);
            ParseResult::Match(c2, frag)
        }
        _ => class_atom(cur, ctx),
    }
}

/// A character class used as an atom; the matched set becomes a two-state
/// fragment with one transition per member byte.
fn class_atom<'a>(cur: Cursor<'a>, ctx: &mut ParseCtx<'_>) -> ParseResult<'a, NfaFragment> {
    match char_class(cur, ctx) {
        ParseResult::Match(c1, set) => {
            let frag = nfa::from_set(ctx.nfa, &set);
            let (c2, frag) = postfix(c1, frag, ctx);
            ParseResult::Match(c2, frag)
        }
        _ => ParseResult::Epsilon,
    }
}

/// `postfix ::= '*' | '+' | epsilon`, applied to an already-built fragment.
///
/// Never fails: absence of a quantifier returns the fragment unchanged with
/// the cursor rewound to before the non-quantifier byte.
fn postfix<'a>(
    cur: Cursor<'a>,
    frag: NfaFragment,
    ctx: &mut ParseCtx<'_>,
) -> (Cursor<'a>, NfaFragment) {
    let mut c = cur;
    skip_space(&mut c, ctx.in_brackets);
    match c.next() {
        Some(b'*') => (c, nfa::kleene_star(ctx.nfa, frag)),
        Some(b'+') => {
            // x+ = x x*, sharing the operand's states.
            let star = nfa::kleene_star(ctx.nfa, frag);
            (c, nfa::concatenate(ctx.nfa, frag, star))
        }
        Some(_) => {
            c.rewind();
            (c, frag)
        }
        None => (c, frag),
    }
}

// ── Character classes ─────────────────────────────────────────────────────

/// `char-class ::= '.' | '[' bracket-body | defined-class`
fn char_class<'a>(cur: Cursor<'a>, ctx: &mut ParseCtx<'_>) -> ParseResult<'a, CharSet> {
    let mut c = cur;
    skip_space(&mut c, ctx.in_brackets);
    match c.next() {
        None => ParseResult::Fail,
        Some(b'.') => ParseResult::Match(c, printable_ascii()),
        Some(b'[') => {
            ctx.in_brackets = true;
            bracket_body(c, ctx)
        }
        Some(_) => {
            c.rewind();
            defined_class(c, ctx)
        }
    }
}

/// `bracket-body ::= set-items | exclude-set` (cursor is just past `[`).
fn bracket_body<'a>(cur: Cursor<'a>, ctx: &mut ParseCtx<'_>) -> ParseResult<'a, CharSet> {
    match set_items(cur, ctx) {
        ParseResult::Match(c, set) => ParseResult::Match(c, set),
        _ => exclude_set(cur, ctx),
    }
}

/// `set-items ::= set-item set-items | ']'`
///
/// Zero or more items, unioned, terminated by the closing bracket.
fn set_items<'a>(cur: Cursor<'a>, ctx: &mut ParseCtx<'_>) -> ParseResult<'a, CharSet> {
    match set_item(cur, ctx) {
        ParseResult::Fail | ParseResult::Epsilon => {
            let mut c = cur;
            skip_space(&mut c, ctx.in_brackets);
            match c.next() {
                Some(b']') => {
                    ctx.in_brackets = false;
                    ParseResult::Match(c, CharSet::new())
                }
                _ => ParseResult::Fail,
            }
        }
        ParseResult::Match(c1, mut set) => match set_items(c1, ctx) {
            ParseResult::Match(c2, rest) => {
                set.extend(rest);
                ParseResult::Match(c2, set)
            }
            _ => ParseResult::Fail,
        },
    }
}

/// `set-item ::= CLS_CHAR range-tail`
///
/// A single literal, or an inclusive range whose endpoints are swapped when
/// given in descending order.
fn set_item<'a>(cur: Cursor<'a>, ctx: &mut ParseCtx<'_>) -> ParseResult<'a, CharSet> {
    let (c1, start) = match class_char(cur, ctx) {
        ParseResult::Match(c, b) => (c, b),
        _ => return ParseResult::Fail,
    };
    match range_tail(c1, ctx) {
        ParseResult::Epsilon => {
            let mut set = CharSet::new();
            set.insert(start);
            ParseResult::Match(c1, set)
        }
        ParseResult::Fail => ParseResult::Fail,
        ParseResult::Match(c2, end) => {
            let (lo, hi) = if start <= end { (start, end) } else { (end, start) };
            ParseResult::Match(c2, (lo..=hi).collect())
        }
    }
}

/// `range-tail ::= '-' CLS_CHAR | epsilon`
fn range_tail<'a>(cur: Cursor<'a>, ctx: &mut ParseCtx<'_>) -> ParseResult<'a, u8> {
    let mut c = cur;
    skip_space(&mut c, ctx.in_brackets);
    match c.next() {
        Some(b'-') => {}
        _ => return ParseResult::Epsilon,
    }
    match class_char(c, ctx) {
        ParseResult::Match(c2, b) => ParseResult::Match(c2, b),
        _ => ParseResult::Fail,
    }
}

/// `exclude-set ::= '^' set-item ']' "IN" exclude-source`
///
/// The result is the source set minus the negated item. `IN` must be
/// contiguous; whitespace is allowed around it.
fn exclude_set<'a>(cur: Cursor<'a>, ctx: &mut ParseCtx<'_>) -> ParseResult<'a, CharSet> {
    let mut c = cur;
    skip_space(&mut c, ctx.in_brackets);
    if c.next() != Some(b'^') {
        return ParseResult::Fail;
    }
    let (c1, negated) = match set_item(c, ctx) {
        ParseResult::Match(a, s) => (a, s),
        _ => return ParseResult::Fail,
    };
    let mut c2 = c1;
    skip_space(&mut c2, ctx.in_brackets);
    if c2.next() != Some(b']') {
        return ParseResult::Fail;
    }
    ctx.in_brackets = false;
    skip_space(&mut c2, ctx.in_brackets);
    if c2.next() != Some(b'I') {
        return ParseResult::Fail;
    }
    if c2.next() != Some(b'N') {
        return ParseResult::Fail;
    }
    match exclude_source(c2, ctx) {
        ParseResult::Match(c3, source) => {
            let set: CharSet = source.difference(&negated).copied().collect();
            ParseResult::Match(c3, set)
        }
        _ => ParseResult::Fail,
    }
}

/// `exclude-source ::= '[' set-item ']' | defined-class`
fn exclude_source<'a>(cur: Cursor<'a>, ctx: &mut ParseCtx<'_>) -> ParseResult<'a, CharSet> {
    let mut c = cur;
    skip_space(&mut c, ctx.in_brackets);
    match c.next() {
        Some(b'[') => {
            let (c1, set) = match set_item(c, ctx) {
                ParseResult::Match(a, s) => (a, s),
                _ => return ParseResult::Fail,
            };
            let mut c2 = c1;
            skip_space(&mut c2, ctx.in_brackets);
            match c2.next() {
                Some(b']') => ParseResult::Match(c2, set),
                _ => ParseResult::Fail,
            }
        }
        Some(_) => {
            c.rewind();
            match defined_class(c, ctx) {
                ParseResult::Match(a, s) => ParseResult::Match(a, s),
                _ => ParseResult::Fail,
            }
        }
        None => ParseResult::Fail,
    }
}

/// Greedy lookup of a registered class name starting at the cursor: the
/// longest registered name wins, and the scan is bounded by the longest
/// registered name's length.
///
/// Epsilon when zero characters could be consumed and nothing matched;
/// failure when characters were consumed without reaching any registered
/// name.
fn defined_class<'a>(cur: Cursor<'a>, ctx: &mut ParseCtx<'_>) -> ParseResult<'a, CharSet> {
    let mut c = cur;
    skip_space(&mut c, ctx.in_brackets);
    let mut name = String::new();
    let mut longest: Option<(Cursor<'a>, CharSet)> = None;
    let mut consumed = 0usize;
    for _ in 0..ctx.registry.max_name_len() {
        match c.next() {
            None => break,
            Some(ch) => {
                consumed += 1;
                name.push(ch as char);
            }
        }
        if let Some(set) = ctx.registry.lookup(&name) {
            longest = Some((c, set.clone()));
        }
    }
    match longest {
        Some((after, set)) => ParseResult::Match(after, set),
        None if consumed == 0 => ParseResult::Epsilon,
        None => ParseResult::Fail,
    }
}

// ── Single characters ─────────────────────────────────────────────────────

/// CLS_CHAR: one literal character inside brackets. Printable ASCII except
/// the metacharacters `^ - [ ]`, which require a backslash escape; any other
/// escape fails.
fn class_char<'a>(cur: Cursor<'a>, ctx: &mut ParseCtx<'_>) -> ParseResult<'a, u8> {
    let mut c = cur;
    skip_space(&mut c, ctx.in_brackets);
    let ch = match c.next() {
        Some(ch) => ch,
        None => return ParseResult::Fail,
    };
    match ch {
        b'\\' => match c.next() {
            Some(esc @ (b'\\' | b'^' | b'-' | b'[' | b']')) => ParseResult::Match(c, esc),
            _ => ParseResult::Fail,
        },
        b'^' | b'-' | b'[' | b']' => ParseResult::Fail,
        ch if (32..=126).contains(&ch) => ParseResult::Match(c, ch),
        _ => ParseResult::Fail,
    }
}

/// RE_CHAR: one literal character outside brackets. Printable ASCII except
/// the metacharacters, which require a backslash escape. An unescaped `$`
/// fails so the caller falls through to defined-class parsing; an unescaped
/// `]` is never a literal.
fn literal_char<'a>(cur: Cursor<'a>, ctx: &mut ParseCtx<'_>) -> ParseResult<'a, u8> {
    let mut c = cur;
    skip_space(&mut c, ctx.in_brackets);
    let ch = match c.next() {
        Some(ch) => ch,
        None => return ParseResult::Fail,
    };
    match ch {
        b'\\' => match c.next() {
            Some(
                esc @ (b'\\' | b'*' | b'+' | b'?' | b'|' | b'[' | b'(' | b')' | b'.' | b'\''
                | b'"' | b'$' | b' '),
            ) => ParseResult::Match(c, esc),
            _ => ParseResult::Fail,
        },
        b'$' => ParseResult::Fail,
        b'*' | b'+' | b'?' | b'|' | b'[' | b']' | b'(' | b')' | b'.' | b'\'' | b'"' | b' ' => {
            ParseResult::Fail
        }
        ch if (32..=126).contains(&ch) => ParseResult::Match(c, ch),
        _ => ParseResult::Fail,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
