//! Property tests for the algebraic guarantees of the pipeline: range
//! parsing, epsilon closure, and table round-tripping.

use proptest::prelude::*;

use crate::automata::cursor::Cursor;
use crate::automata::nfa::epsilon_closure;
use crate::automata::regex::{parse_char_class, ClassRegistry, ParseCtx, ParseResult};
use crate::automata::table::DfaTable;
use crate::automata::{CharSet, Nfa, NfaState, StateId};
use crate::pipeline::compile;

const NUM_STATES: u32 = 8;

fn class_set(regex: &str) -> Option<CharSet> {
    let registry = ClassRegistry::new();
    let mut nfa = Nfa::new();
    let mut ctx = ParseCtx::new(&registry, &mut nfa);
    match parse_char_class(Cursor::new(regex), &mut ctx) {
        ParseResult::Match(_, set) => Some(set),
        _ => None,
    }
}

/// An arena of `NUM_STATES` states wired with the given epsilon edges.
fn nfa_with_epsilon(edges: &[(StateId, StateId)]) -> Nfa {
    let mut nfa = Nfa::new();
    for _ in 0..NUM_STATES {
        nfa.add_state(NfaState::new());
    }
    for &(from, to) in edges {
        nfa.add_epsilon(from, to);
    }
    nfa
}

fn arb_epsilon_edges() -> impl Strategy<Value = Vec<(StateId, StateId)>> {
    prop::collection::vec((0..NUM_STATES, 0..NUM_STATES), 0..24)
}

fn arb_seed() -> impl Strategy<Value = Vec<StateId>> {
    prop::collection::btree_set(0..NUM_STATES, 0..5)
        .prop_map(|set| set.into_iter().collect())
}

fn arb_rule_body() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "[a-f]+",
        "x|y|z",
        "(ab)*c",
        "[0-9][0-9]*",
        "q",
        "\\+",
        "$DIGIT+",
        "[^a-c] IN [a-z]",
        "p(q|r)+",
    ])
}

fn arb_spec() -> impl Strategy<Value = String> {
    prop::collection::vec(arb_rule_body(), 1..5).prop_map(|bodies| {
        let mut spec = String::from("$DIGIT [0-9]\n\n");
        for (i, body) in bodies.iter().enumerate() {
            spec.push_str(&format!("$T{i} {body}\n"));
        }
        spec
    })
}

proptest! {
    /// `[b-a]` always denotes the same ascending range as `[a-b]`.
    #[test]
    fn prop_range_endpoints_swap(a in b'a'..=b'z', b in b'a'..=b'z') {
        let forward = class_set(&format!("[{}-{}]", a as char, b as char)).unwrap();
        let backward = class_set(&format!("[{}-{}]", b as char, a as char)).unwrap();
        prop_assert_eq!(&forward, &backward);

        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let expected: CharSet = (lo..=hi).collect();
        prop_assert_eq!(forward, expected);
    }

    /// Closing an already-closed set changes nothing.
    #[test]
    fn prop_epsilon_closure_idempotent(
        edges in arb_epsilon_edges(),
        seed in arb_seed(),
    ) {
        let nfa = nfa_with_epsilon(&edges);
        let once = epsilon_closure(&nfa, &seed);
        let twice = epsilon_closure(&nfa, &once);
        prop_assert_eq!(once, twice);
    }

    /// The closure of a superset contains the closure of the subset.
    #[test]
    fn prop_epsilon_closure_monotone(
        edges in arb_epsilon_edges(),
        seed in arb_seed(),
        extra in arb_seed(),
    ) {
        let nfa = nfa_with_epsilon(&edges);

        let mut superset = seed.clone();
        superset.extend(&extra);
        superset.sort_unstable();
        superset.dedup();

        let small = epsilon_closure(&nfa, &seed);
        let large = epsilon_closure(&nfa, &superset);
        for s in &small {
            prop_assert!(large.contains(s));
        }
    }

    /// The closure always contains its seed.
    #[test]
    fn prop_epsilon_closure_contains_seed(
        edges in arb_epsilon_edges(),
        seed in arb_seed(),
    ) {
        let nfa = nfa_with_epsilon(&edges);
        let closure = epsilon_closure(&nfa, &seed);
        for s in &seed {
            prop_assert!(closure.contains(s));
        }
    }

    /// Writing a compiled table and reparsing it reproduces the identical
    /// transition function and accept/label assignment.
    #[test]
    fn prop_table_round_trip(spec in arb_spec()) {
        let lexer = compile(&spec).unwrap();

        let mut buf = Vec::new();
        lexer.table.write_to(&mut buf).unwrap();
        let reparsed = DfaTable::parse(std::str::from_utf8(&buf).unwrap()).unwrap();

        prop_assert_eq!(reparsed, lexer.table);
    }
}
