use std::collections::BTreeMap;

use nestedtext::{
    encode, encode_to_string, to_string, to_string_with_options, to_vec, to_writer, EncodeOptions,
    ErrorKind, Indent, Value,
};
use rstest::rstest;
use serde::Serialize;
use serde_json::json;

fn render(json: serde_json::Value) -> String {
    let value = Value::try_from(json).expect("representable");
    encode_to_string(&value, &EncodeOptions::default()).expect("encode")
}

#[derive(Serialize)]
struct Service {
    name: String,
    replicas: u32,
    enabled: bool,
    hosts: Vec<String>,
    labels: BTreeMap<String, String>,
    notes: String,
}

fn sample_service() -> Service {
    Service {
        name: "api".to_string(),
        replicas: 3,
        enabled: true,
        hosts: vec!["a.example".to_string(), "b.example".to_string()],
        labels: BTreeMap::from([
            ("tier".to_string(), "backend".to_string()),
            ("team".to_string(), String::new()),
        ]),
        notes: "line one\nline two".to_string(),
    }
}

#[rstest]
fn serializable_struct_renders_as_block_document() {
    let expected = "\
enabled: true
hosts:
  [a.example, b.example]
labels:
  team:
  tier: backend
name: api
notes:
  > line one
  > line two
replicas: 3
";
    assert_eq!(to_string(&sample_service()).expect("encode"), expected);
}

#[rstest]
fn writer_and_vec_outputs_match_string_output() {
    let service = sample_service();
    let text = to_string(&service).expect("encode");
    assert_eq!(to_vec(&service).expect("encode"), text.as_bytes());

    let mut out = Vec::new();
    to_writer(&mut out, &service).expect("encode");
    assert_eq!(out, text.as_bytes());
}

#[rstest]
fn encode_returns_byte_count_including_multibyte_text() {
    let value = Value::from_iter([("clé", "värde")]);
    let mut out = Vec::new();
    let written = encode(&value, &mut out, &EncodeOptions::default()).expect("encode");
    assert_eq!(out, "clé: värde\n".as_bytes());
    assert_eq!(written, "clé: värde\n".len());
}

#[rstest]
#[case(1, "a:\n b:\n  - x\n  -\n")]
#[case(4, "a:\n    b:\n        - x\n        -\n")]
fn indentation_is_configurable(#[case] spaces: usize, #[case] expected: &str) {
    let value = Value::try_from(json!({"a": {"b": ["x", ""]}})).expect("representable");
    let options = EncodeOptions::new().with_indent(Indent::Spaces(spaces));
    assert_eq!(encode_to_string(&value, &options).expect("encode"), expected);
}

#[rstest]
fn inline_limit_switches_to_block_lists() {
    let value = vec!["alpha", "beta", "gamma"];
    let wide = EncodeOptions::new().with_inline_limit(64);
    let narrow = EncodeOptions::new().with_inline_limit(8);
    assert_eq!(
        to_string_with_options(&value, &wide).expect("encode"),
        "[alpha, beta, gamma]\n"
    );
    assert_eq!(
        to_string_with_options(&value, &narrow).expect("encode"),
        "- alpha\n- beta\n- gamma\n"
    );
}

#[rstest]
#[case(json!(["has,comma"]), "- has,comma\n")]
#[case(json!(["[bracket"]), "- [bracket\n")]
#[case(json!(["trailing "]), "- trailing \n")]
#[case(json!(["", "x"]), "-\n- x\n")]
#[case(json!([["a"], "b"]), "-\n  [a]\n- b\n")]
fn lists_that_cannot_be_inlined(#[case] json: serde_json::Value, #[case] expected: &str) {
    assert_eq!(render(json), expected);
}

#[rstest]
#[case(json!({"> looks like tag": "v"}), ": > looks like tag\n  > v\n")]
#[case(json!({"[x": "v"}), ": [x\n  > v\n")]
#[case(json!({"key ": "v"}), ": key \n  > v\n")]
#[case(json!({"a:b": {}}), ": a:b\n  {}\n")]
#[case(json!({"": ""}), ":\n  >\n")]
#[case(json!({"-a": "", "-b": "x"}), ": -a\n  >\n: -b\n  > x\n")]
fn keys_that_need_multiline_form(#[case] json: serde_json::Value, #[case] expected: &str) {
    assert_eq!(render(json), expected);
}

#[rstest]
fn keys_are_sorted_on_output() {
    assert_eq!(
        render(json!({"b": "2", "c": "3", "a": "1"})),
        "a: 1\nb: 2\nc: 3\n"
    );
}

#[rstest]
fn unrepresentable_values_are_schema_errors() {
    let err = to_string(&json!({"a": [1, null]})).expect_err("null");
    assert_eq!(err.kind, ErrorKind::Schema);

    let err = to_string(&()).expect_err("unit");
    assert_eq!(err.kind, ErrorKind::Schema);
}

#[rstest]
fn display_uses_default_options() {
    let value = Value::try_from(json!({"k": ["v"]})).expect("representable");
    assert_eq!(value.to_string(), "k:\n  [v]\n");
}
