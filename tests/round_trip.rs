//! Property-based tests for the encode/decode contract.

use std::collections::BTreeMap;

use nestedtext::{
    encode_to_string, from_str, parse_str, to_string, DecodeOptions, EncodeOptions, Map, Value,
};
use proptest::prelude::*;

/// Text drawn from characters that are significant somewhere in the grammar.
fn text() -> impl Strategy<Value = String> {
    "[a-z0-9 :#>\\-\\[\\]{},\t\n]{0,10}"
}

fn value_strategy() -> impl Strategy<Value = Value> {
    let leaf = text().prop_map(Value::String);
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::List),
            prop::collection::vec((text(), inner), 0..6)
                .prop_map(|entries| Value::Dict(entries.into_iter().collect::<Map>())),
        ]
    })
}

fn encode_options() -> impl Strategy<Value = EncodeOptions> {
    (1usize..=8, 0usize..=64).prop_map(|(indent, limit)| {
        EncodeOptions::new()
            .with_indent_by(indent)
            .with_inline_limit(limit)
    })
}

proptest! {
    #[test]
    fn prop_decode_inverts_encode(value in value_strategy(), options in encode_options()) {
        let encoded = encode_to_string(&value, &options).expect("encode");
        let decoded = parse_str(&encoded, &DecodeOptions::default());
        prop_assert!(decoded.is_ok(), "failed to decode:\n{}\n{:?}", encoded, decoded);
        prop_assert_eq!(decoded.ok().flatten(), Some(value));
    }

    #[test]
    fn prop_reencode_is_idempotent(value in value_strategy()) {
        let options = EncodeOptions::default();
        let first = encode_to_string(&value, &options).expect("encode");
        let decoded = parse_str(&first, &DecodeOptions::default())
            .expect("decode")
            .expect("non-empty");
        let second = encode_to_string(&decoded, &options).expect("encode");
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_output_always_ends_with_newline(value in value_strategy()) {
        let encoded = encode_to_string(&value, &EncodeOptions::default()).expect("encode");
        prop_assert!(encoded.ends_with('\n'));
    }

    #[test]
    fn prop_string_collections_roundtrip_through_serde(
        items in prop::collection::vec(text(), 0..8),
        table in prop::collection::btree_map(text(), text(), 0..8),
    ) {
        let encoded = to_string(&items).expect("encode");
        prop_assert_eq!(from_str::<Vec<String>>(&encoded).expect("decode"), items);

        let encoded = to_string(&table).expect("encode");
        prop_assert_eq!(from_str::<BTreeMap<String, String>>(&encoded).expect("decode"), table);
    }

    #[test]
    fn prop_arbitrary_input_never_panics(input in "\\PC{0,64}|[ \t\n\r:>\\-\\[\\]{},#a]{0,64}") {
        let _ = parse_str(&input, &DecodeOptions::default());
    }
}
