use keystone_core::{
    is_identifier_part, is_identifier_start, validate_class_name, InvalidNameReason, ModelError,
};
use proptest::prelude::*;

const PROPTEST_CASES: u32 = 512;

fn arb_segment() -> impl Strategy<Value = String> {
    (
        prop::sample::select(vec!['a', 'Z', '_', '$', 'é', '中']),
        prop::collection::vec(
            prop::sample::select(vec!['a', 'b', 'Q', '0', '9', '_', '$', 'ß']),
            0..6,
        ),
    )
        .prop_map(|(first, rest)| std::iter::once(first).chain(rest).collect())
}

fn arb_valid_name() -> impl Strategy<Value = String> {
    prop::collection::vec(arb_segment(), 1..5).prop_map(|segments| segments.join("."))
}

fn arb_any_name() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select(vec!['a', 'B', '1', '_', '$', '.', '-', ' ', 'é', '\u{0301}']),
        0..12,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

/// Grammar check written independently of the validator's single-pass loop.
fn matches_grammar(name: &str) -> bool {
    let Some(first) = name.chars().next() else {
        return false;
    };
    is_identifier_start(first)
        && !name.contains("..")
        && !name.ends_with('.')
        && name.chars().all(|ch| ch == '.' || is_identifier_part(ch))
}

#[test]
fn rejects_documented_edge_cases() {
    for (name, expected) in [
        ("a..b", InvalidNameReason::ConsecutiveDots),
        ("a.", InvalidNameReason::TrailingDot),
        (".a", InvalidNameReason::InvalidStart('.')),
        ("1a", InvalidNameReason::InvalidStart('1')),
        ("", InvalidNameReason::Empty),
    ] {
        assert_eq!(
            validate_class_name(name),
            Err(ModelError::InvalidName {
                name: name.to_string(),
                reason: expected,
            }),
            "{name:?}"
        );
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: PROPTEST_CASES, .. ProptestConfig::default() })]

    #[test]
    fn generated_valid_names_are_accepted(name in arb_valid_name()) {
        prop_assert!(validate_class_name(&name).is_ok(), "{name:?}");
    }

    #[test]
    fn trailing_dot_is_always_rejected(name in arb_valid_name()) {
        let broken = format!("{name}.");
        prop_assert!(validate_class_name(&broken).is_err());
    }

    #[test]
    fn doubled_separator_is_always_rejected(left in arb_valid_name(), right in arb_valid_name()) {
        let broken = format!("{left}..{right}");
        prop_assert_eq!(
            validate_class_name(&broken),
            Err(ModelError::InvalidName {
                name: broken.clone(),
                reason: InvalidNameReason::ConsecutiveDots,
            })
        );
    }

    #[test]
    fn validator_agrees_with_grammar(name in arb_any_name()) {
        prop_assert_eq!(validate_class_name(&name).is_ok(), matches_grammar(&name));
    }
}
