//! Inline lists (`[a, b]`) and dicts (`{k: v}`) are recognised by a table-driven
//! automaton over character classes. Each open container is a frame on an
//! explicit stack; a frame remembers the state to resume once it closes.

use tracing::trace;

use crate::value::Map;
use crate::{Error, ErrorKind, Location, Result, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    Ordinary,
    Space,
    End,
    Comma,
    Colon,
    OpenList,
    CloseList,
    OpenDict,
    CloseDict,
}

impl Class {
    fn of(ch: Option<char>) -> Self {
        match ch {
            None => Class::End,
            Some(' ' | '\t') => Class::Space,
            Some(',') => Class::Comma,
            Some(':') => Class::Colon,
            Some('[') => Class::OpenList,
            Some(']') => Class::CloseList,
            Some('{') => Class::OpenDict,
            Some('}') => Class::CloseDict,
            Some(_) => Class::Ordinary,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    DictOpen,
    DictKey,
    DictValueStart,
    DictValue,
    DictAfterNested,
    DictAfterComma,
    ListOpen,
    ListValue,
    ListAfterNested,
    ListAfterComma,
    EnterDict,
    EnterList,
    AcceptDict,
    AcceptList,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    /// Keep accumulating the current fragment.
    Stay,
    /// Drop the current fragment.
    Skip,
    /// Store the trimmed fragment as a value of the innermost frame.
    Flush,
    /// Like `Flush`, but only when the raw fragment is non-empty (`[]` vs `[ ]`).
    FlushIfAny,
    /// Store the trimmed fragment as the pending key of the innermost frame.
    Key,
}

fn transition(state: State, class: Class) -> Option<(State, Action)> {
    use Action::*;
    use Class::*;
    use State::*;

    let next = match (state, class) {
        (Start, Space) => (Start, Stay),
        (Start, OpenList) => (EnterList, Skip),
        (Start, OpenDict) => (EnterDict, Skip),
        (Done, Space) => (Done, Stay),

        (ListOpen, Space) => (ListOpen, Stay),
        (ListOpen, Ordinary | Colon) => (ListValue, Stay),
        (ListOpen, Comma) => (ListAfterComma, Flush),
        (ListOpen, CloseList) => (AcceptList, FlushIfAny),
        (ListOpen | ListAfterComma, OpenList) => (EnterList, Skip),
        (ListOpen | ListAfterComma, OpenDict) => (EnterDict, Skip),
        (ListValue, Ordinary | Space | Colon) => (ListValue, Stay),
        (ListValue | ListAfterComma, Comma) => (ListAfterComma, Flush),
        (ListValue | ListAfterComma, CloseList) => (AcceptList, Flush),
        (ListAfterComma, Space) => (ListAfterComma, Stay),
        (ListAfterComma, Ordinary | Colon) => (ListValue, Stay),
        (ListAfterNested, Space) => (ListAfterNested, Stay),
        (ListAfterNested, Comma) => (ListAfterComma, Skip),
        (ListAfterNested, CloseList) => (AcceptList, Skip),

        (DictOpen, Space | Ordinary) => (DictKey, Stay),
        (DictOpen, CloseDict) => (AcceptDict, Skip),
        (DictOpen | DictKey | DictAfterComma, Colon) => (DictValueStart, Key),
        (DictKey, Space | Ordinary) => (DictKey, Stay),
        (DictAfterComma, Space) => (DictAfterComma, Stay),
        (DictAfterComma, Ordinary) => (DictKey, Stay),
        (DictValueStart, Space) => (DictValueStart, Stay),
        (DictValueStart, Ordinary) => (DictValue, Stay),
        (DictValueStart, OpenList) => (EnterList, Skip),
        (DictValueStart, OpenDict) => (EnterDict, Skip),
        (DictValue, Space | Ordinary) => (DictValue, Stay),
        (DictValueStart | DictValue, Comma) => (DictAfterComma, Flush),
        (DictValueStart | DictValue, CloseDict) => (AcceptDict, Flush),
        (DictAfterNested, Space) => (DictAfterNested, Stay),
        (DictAfterNested, Comma) => (DictAfterComma, Skip),
        (DictAfterNested, CloseDict) => (AcceptDict, Skip),

        _ => return None,
    };
    Some(next)
}

/// Where the enclosing frame continues once a container opened by `trigger`
/// in state `from` has been closed.
fn resume_state(from: State, trigger: Class) -> Option<State> {
    match (from, trigger) {
        (State::Start, Class::OpenList | Class::OpenDict) => Some(State::Done),
        (State::ListOpen | State::ListAfterComma, Class::OpenList | Class::OpenDict) => {
            Some(State::ListAfterNested)
        }
        (State::DictValueStart, Class::OpenList | Class::OpenDict) => Some(State::DictAfterNested),
        _ => None,
    }
}

struct Frame {
    values: Vec<Value>,
    /// `Some` for dict frames.
    keys: Option<Vec<String>>,
    pending_key: Option<String>,
    resume: State,
}

impl Frame {
    fn new(is_dict: bool, resume: State) -> Self {
        Self {
            values: Vec::new(),
            keys: is_dict.then(Vec::new),
            pending_key: None,
            resume,
        }
    }

    fn is_dict(&self) -> bool {
        self.keys.is_some()
    }

    fn set_key(&mut self, key: String) -> std::result::Result<(), String> {
        if !self.is_dict() || self.pending_key.is_some() {
            return Err("mixed content in inline container".to_string());
        }
        self.pending_key = Some(key);
        Ok(())
    }

    fn push(&mut self, value: Value) -> std::result::Result<(), String> {
        match (&mut self.keys, self.pending_key.take()) {
            (Some(keys), Some(key)) => keys.push(key),
            (None, None) => {}
            _ => return Err("mixed content in inline container".to_string()),
        }
        self.values.push(value);
        Ok(())
    }

    fn reduce(self) -> std::result::Result<Value, String> {
        let Some(keys) = self.keys else {
            return Ok(Value::List(self.values));
        };
        if keys.len() != self.values.len() || self.pending_key.is_some() {
            return Err("mixed content in inline container".to_string());
        }
        let mut map = Map::with_capacity(keys.len());
        for (key, value) in keys.into_iter().zip(self.values) {
            if map.contains_key(&key) {
                return Err(format!("duplicate key: {key}"));
            }
            map.insert(key, value);
        }
        Ok(Value::Dict(map))
    }
}

/// Parse the text of an inline list or dict line. `location` is where the
/// text starts; `max_depth` bounds the number of nested containers.
pub(crate) fn parse_inline(text: &str, location: Location, max_depth: usize) -> Result<Value> {
    InlineParser {
        text,
        location,
        max_depth,
        frames: Vec::new(),
        state: State::Start,
        marker: 0,
        result: None,
    }
    .run()
}

struct InlineParser<'a> {
    text: &'a str,
    location: Location,
    max_depth: usize,
    frames: Vec<Frame>,
    state: State,
    /// Byte offset where the current fragment starts.
    marker: usize,
    result: Option<Value>,
}

impl InlineParser<'_> {
    fn run(mut self) -> Result<Value> {
        let text = self.text;
        let end = std::iter::once((text.len(), None));
        let mut column = self.location.column;

        for (pos, ch) in text.char_indices().map(|(pos, ch)| (pos, Some(ch))).chain(end) {
            let class = Class::of(ch);
            if class == Class::End {
                return match (self.state, self.result.take()) {
                    (State::Done, Some(value)) => Ok(value),
                    _ => Err(self.unterminated(column)),
                };
            }
            let (next, action) =
                transition(self.state, class).ok_or_else(|| self.unexpected(ch, column))?;
            self.apply(action, pos)
                .map_err(|message| self.error(message, column))?;
            if action != Action::Stay {
                self.marker = pos + ch.map_or(0, char::len_utf8);
            }
            self.state = match next {
                State::EnterList | State::EnterDict => self.enter(next, class, column)?,
                State::AcceptList | State::AcceptDict => self.accept(column)?,
                other => other,
            };
            column += 1;
        }
        Err(self.unterminated(column))
    }

    fn apply(&mut self, action: Action, pos: usize) -> std::result::Result<(), String> {
        match action {
            Action::Stay | Action::Skip => Ok(()),
            Action::Flush => self.flush(pos),
            Action::FlushIfAny if pos > self.marker => self.flush(pos),
            Action::FlushIfAny => Ok(()),
            Action::Key => {
                let key = self.fragment(pos);
                self.innermost()?.set_key(key)
            }
        }
    }

    fn flush(&mut self, pos: usize) -> std::result::Result<(), String> {
        let value = Value::String(self.fragment(pos));
        self.innermost()?.push(value)
    }

    fn fragment(&self, pos: usize) -> String {
        self.text[self.marker..pos].trim().to_string()
    }

    fn innermost(&mut self) -> std::result::Result<&mut Frame, String> {
        self.frames
            .last_mut()
            .ok_or_else(|| "value outside of inline container".to_string())
    }

    fn enter(&mut self, next: State, trigger: Class, column: usize) -> Result<State> {
        if self.frames.len() >= self.max_depth {
            return Err(self.error("nesting exceeds maximum depth", column));
        }
        let resume = resume_state(self.state, trigger)
            .ok_or_else(|| self.error("no resume state for nested container", column))?;
        let is_dict = next == State::EnterDict;
        trace!(depth = self.frames.len() + 1, is_dict, "open inline container");
        self.frames.push(Frame::new(is_dict, resume));
        Ok(if is_dict { State::DictOpen } else { State::ListOpen })
    }

    fn accept(&mut self, column: usize) -> Result<State> {
        let frame = self
            .frames
            .pop()
            .ok_or_else(|| self.error("closing delimiter without open container", column))?;
        let resume = frame.resume;
        let value = frame.reduce().map_err(|message| self.error(message, column))?;
        trace!(depth = self.frames.len(), kind = value.kind_name(), "close inline container");
        let pushed = match self.frames.last_mut() {
            Some(parent) => parent.push(value),
            None => {
                self.result = Some(value);
                Ok(())
            }
        };
        pushed.map_err(|message| self.error(message, column))?;
        Ok(resume)
    }

    fn context(&self) -> &'static str {
        match self.frames.last() {
            Some(frame) if frame.is_dict() => "inline dict",
            Some(_) => "inline list",
            None => "inline value",
        }
    }

    fn unexpected(&self, ch: Option<char>, column: usize) -> Error {
        let message = match (self.state, ch) {
            (State::Done, _) => "extra characters after closing delimiter".to_string(),
            (_, Some(ch)) => format!("unexpected character '{ch}' in {}", self.context()),
            (_, None) => format!("unterminated {}", self.context()),
        };
        self.error(message, column)
    }

    fn unterminated(&self, column: usize) -> Error {
        self.error(format!("unterminated {}", self.context()), column)
    }

    fn error(&self, message: impl Into<String>, column: usize) -> Error {
        Error::format(
            ErrorKind::Format,
            message,
            Location::new(self.location.line, column),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(text: &str) -> Result<Value> {
        parse_inline(text, Location::new(1, 0), crate::constants::MAX_DEPTH)
    }

    fn expected(json: serde_json::Value) -> Value {
        Value::try_from(json).unwrap()
    }

    #[rstest::rstest]
    #[case("[]", json!([]))]
    #[case("[ ]", json!([""]))]
    #[case("[,]", json!(["", ""]))]
    #[case("[a, b]", json!(["a", "b"]))]
    #[case("[a, ]", json!(["a", ""]))]
    #[case("[  a ,   b c  ]", json!(["a", "b c"]))]
    #[case("[a: b, http://x]", json!(["a: b", "http://x"]))]
    #[case("[[], [a], {}]", json!([[], ["a"], {}]))]
    #[case("[[a], ]", json!([["a"], ""]))]
    #[case("[a]   ", json!(["a"]))]
    #[case("{}", json!({}))]
    #[case("{a: x}", json!({"a": "x"}))]
    #[case("{a:}", json!({"a": ""}))]
    #[case("{: x}", json!({"": "x"}))]
    #[case("{ a : x , b: [1, 2], c: {d: e}}", json!({"a": "x", "b": ["1", "2"], "c": {"d": "e"}}))]
    #[case("{a: {b: {c: []}}}", json!({"a": {"b": {"c": []}}}))]
    #[case("[ä, ö]", json!(["ä", "ö"]))]
    fn test_valid_inline(#[case] text: &str, #[case] json: serde_json::Value) {
        assert_eq!(parse(text).unwrap(), expected(json));
    }

    #[rstest::rstest]
    fn test_dict_keeps_source_order() {
        let value = parse("{b: 1, a: 2}").unwrap();
        let keys: Vec<&str> = value.as_dict().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[rstest::rstest]
    #[case("[a", "unterminated inline list")]
    #[case("{a: [b, c}", "unexpected character '}' in inline list")]
    #[case("{a: x, }", "unexpected character '}' in inline dict")]
    #[case("{ }", "unexpected character '}' in inline dict")]
    #[case("{a}", "unexpected character '}' in inline dict")]
    #[case("{a: b: c}", "unexpected character ':' in inline dict")]
    #[case("{a: [b] c}", "unexpected character 'c' in inline dict")]
    #[case("[x [y]]", "unexpected character '[' in inline list")]
    #[case("[a]]", "extra characters after closing delimiter")]
    #[case("[a] b", "extra characters after closing delimiter")]
    #[case("{a: x, a: y}", "duplicate key: a")]
    fn test_invalid_inline(#[case] text: &str, #[case] message: &str) {
        let err = parse(text).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Format);
        assert_eq!(err.message, message);
    }

    #[rstest::rstest]
    fn test_error_column_is_offset_from_location() {
        let err = parse_inline("[a] b", Location::new(7, 2), 8).unwrap_err();
        assert_eq!(err.location, Some(Location::new(7, 6)));
    }

    #[rstest::rstest]
    fn test_depth_budget() {
        assert!(parse_inline("[[[]]]", Location::new(1, 0), 3).is_ok());
        let err = parse_inline("[[[]]]", Location::new(1, 0), 2).unwrap_err();
        assert_eq!(err.message, "nesting exceeds maximum depth");
    }

    #[rstest::rstest]
    fn test_frame_rejects_value_without_key() {
        let mut frame = Frame::new(true, State::Done);
        assert!(frame.push(Value::from("x")).is_err());
        let mut frame = Frame::new(false, State::Done);
        assert!(frame.set_key("k".to_string()).is_err());
    }
}
