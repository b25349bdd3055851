use nestedtext::{from_str_with_options, parse_str, DecodeOptions, ErrorKind, TopLevel, Value};
use rstest::rstest;
use serde_json::json;

fn decode_with(input: &str, mode: &str) -> Option<Value> {
    let options = DecodeOptions::new()
        .with_top_level_mode(mode)
        .expect("valid mode");
    parse_str(input, &options).expect("decode")
}

fn value(json: serde_json::Value) -> Option<Value> {
    Some(Value::try_from(json).expect("representable"))
}

#[rstest]
#[case("> bare\n", "list", json!(["bare"]))]
#[case("> bare\n", "dict.config", json!({"config": "bare"}))]
#[case("> bare\n", "dict", json!({"nestedtext": "bare"}))]
#[case("- a\n- b\n", "list", json!(["a", "b"]))]
#[case("- a\n- b\n", "dict.items", json!({"items": ["a", "b"]}))]
#[case("k: v\n", "list", json!([{"k": "v"}]))]
#[case("k: v\n", "dict.ignored", json!({"k": "v"}))]
#[case("", "list", json!([]))]
#[case("", "dict", json!({}))]
#[case("[]\n", "dict.x", json!({"x": []}))]
fn wrapping_rules(#[case] input: &str, #[case] mode: &str, #[case] expected: serde_json::Value) {
    assert_eq!(decode_with(input, mode), value(expected));
}

#[rstest]
fn default_mode_leaves_the_root_alone() {
    let options = DecodeOptions::default();
    assert_eq!(options.top_level, TopLevel::Any);
    assert_eq!(parse_str("", &options).expect("decode"), None);
    assert_eq!(parse_str("> x\n", &options).expect("decode"), value(json!("x")));
}

#[rstest]
#[case("lists")]
#[case("dict:key")]
#[case("dict.")]
fn invalid_modes_are_usage_errors(#[case] mode: &str) {
    let err = DecodeOptions::new()
        .with_top_level_mode(mode)
        .expect_err("invalid mode");
    assert_eq!(err.kind, ErrorKind::Usage);
    assert!(!err.is_format());
    assert!(err.location.is_none());
}

#[rstest]
fn wrapped_documents_deserialize_into_containers() {
    let options = DecodeOptions::new().with_top_level(TopLevel::List);
    let items: Vec<String> = from_str_with_options("> only one\n", &options).expect("decode");
    assert_eq!(items, vec!["only one".to_string()]);

    let empty: Vec<String> = from_str_with_options("", &options).expect("decode");
    assert!(empty.is_empty());
}
