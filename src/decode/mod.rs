mod inline;
mod parser;
mod scanner;
mod source;

use std::io::{BufRead, BufReader, Read};

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::value::Map;
use crate::{DecodeOptions, Error, Result, TopLevel, Value};

use self::parser::Parser;

/// Decode a document from any reader.
///
/// Returns `Ok(None)` for a document without content lines, unless
/// `options.top_level` asks for a list or dict root.
pub fn parse<R: Read>(reader: R, options: &DecodeOptions) -> Result<Option<Value>> {
    parse_buffered(BufReader::new(reader), options)
}

/// Decode a document from an already-buffered reader.
pub fn parse_buffered<R: BufRead>(reader: R, options: &DecodeOptions) -> Result<Option<Value>> {
    let value = Parser::new(reader, options).parse_document()?;
    Ok(shape_top_level(value, &options.top_level))
}

pub fn parse_str(input: &str, options: &DecodeOptions) -> Result<Option<Value>> {
    parse_buffered(input.as_bytes(), options)
}

pub fn parse_slice(input: &[u8], options: &DecodeOptions) -> Result<Option<Value>> {
    parse_buffered(input, options)
}

/// Check that `input` is a well-formed document without keeping the result.
pub fn validate_str(input: &str, options: &DecodeOptions) -> Result<()> {
    parse_str(input, options).map(|_| ())
}

pub fn from_str<T: DeserializeOwned>(input: &str, options: &DecodeOptions) -> Result<T> {
    deserialize_value(parse_str(input, options)?)
}

pub fn from_slice<T: DeserializeOwned>(input: &[u8], options: &DecodeOptions) -> Result<T> {
    deserialize_value(parse_slice(input, options)?)
}

pub fn from_reader<R: Read, T: DeserializeOwned>(reader: R, options: &DecodeOptions) -> Result<T> {
    deserialize_value(parse(reader, options)?)
}

fn deserialize_value<T: DeserializeOwned>(value: Option<Value>) -> Result<T> {
    let json = value.map_or(serde_json::Value::Null, serde_json::Value::from);
    serde_json::from_value(json)
        .map_err(|err| Error::schema(format!("cannot deserialize document: {err}")))
}

fn shape_top_level(value: Option<Value>, top_level: &TopLevel) -> Option<Value> {
    match top_level {
        TopLevel::Any => value,
        TopLevel::List => Some(match value {
            Some(Value::List(items)) => Value::List(items),
            Some(other) => {
                debug!(kind = other.kind_name(), "wrapping top-level value in a list");
                Value::List(vec![other])
            }
            None => Value::List(Vec::new()),
        }),
        TopLevel::Dict(key) => Some(match value {
            Some(Value::Dict(map)) => Value::Dict(map),
            Some(other) => {
                debug!(kind = other.kind_name(), %key, "wrapping top-level value in a dict");
                let mut map = Map::with_capacity(1);
                map.insert(key.to_string(), other);
                Value::Dict(map)
            }
            None => Value::Dict(Map::new()),
        }),
    }
}
