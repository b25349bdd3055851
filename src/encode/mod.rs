mod writer;

use std::io::Write;

use memchr::memchr2;
use serde::Serialize;
use tracing::{debug, trace};

use crate::constants::{is_inline_structural_char, is_key_lead_char, MAX_DEPTH};
use crate::value::Map;
use crate::{EncodeOptions, Error, Result, Value};

use self::writer::Writer;

/// Render the whole document before anything reaches `writer`.
pub fn encode<W: Write>(value: &Value, mut writer: W, options: &EncodeOptions) -> Result<usize> {
    let text = encode_to_string(value, options)?;
    writer
        .write_all(text.as_bytes())
        .and_then(|()| writer.flush())
        .map_err(|err| Error::io("failed to write encoded output", err))?;
    Ok(text.len())
}

pub fn encode_to_string(value: &Value, options: &EncodeOptions) -> Result<String> {
    let mut writer = Writer::new(options.clone());
    write_value(&mut writer, value, 0)?;
    let text = writer.finish();
    debug!(bytes = text.len(), kind = value.kind_name(), "encoded document");
    Ok(text)
}

/// Encode any serializable value. Numbers and booleans are written as their
/// textual form; `None`/`null` cannot be represented and is a schema error.
pub fn to_string<T: Serialize>(value: &T, options: &EncodeOptions) -> Result<String> {
    encode_to_string(&to_value(value)?, options)
}

pub fn to_vec<T: Serialize>(value: &T, options: &EncodeOptions) -> Result<Vec<u8>> {
    to_string(value, options).map(String::into_bytes)
}

pub fn to_writer<W: Write, T: Serialize>(
    writer: W,
    value: &T,
    options: &EncodeOptions,
) -> Result<()> {
    encode(&to_value(value)?, writer, options).map(|_| ())
}

fn to_value<T: Serialize>(value: &T) -> Result<Value> {
    let json = serde_json::to_value(value)
        .map_err(|err| Error::schema(format!("cannot serialize value: {err}")))?;
    Value::try_from(json)
}

fn write_value(writer: &mut Writer, value: &Value, depth: usize) -> Result<()> {
    match value {
        Value::String(text) => {
            write_string_block(writer, text, depth);
            Ok(())
        }
        Value::List(items) => write_list(writer, items, depth),
        Value::Dict(map) => write_dict(writer, map, depth),
    }
}

fn check_depth(depth: usize) -> Result<()> {
    if depth >= MAX_DEPTH {
        return Err(Error::schema(format!("nesting exceeds maximum depth of {MAX_DEPTH}")));
    }
    Ok(())
}

fn write_string_block(writer: &mut Writer, text: &str, depth: usize) {
    for line in logical_lines(text) {
        writer.write_tagged_line(depth, ">", line);
    }
}

fn write_list(writer: &mut Writer, items: &[Value], depth: usize) -> Result<()> {
    check_depth(depth)?;
    if items.is_empty() {
        writer.write_line(depth, "[]");
        return Ok(());
    }
    if let Some(inline) = render_inline_list(items, writer.options.inline_limit) {
        trace!(depth, len = items.len(), "writing inline list");
        writer.write_line(depth, &inline);
        return Ok(());
    }
    for item in items {
        match item {
            Value::String(text) if !is_multiline(text) => {
                writer.write_tagged_line(depth, "-", text)
            }
            Value::String(text) => {
                writer.write_tagged_line(depth, "-", "");
                write_string_block(writer, text, depth + 1);
            }
            nested => {
                writer.write_tagged_line(depth, "-", "");
                write_value(writer, nested, depth + 1)?;
            }
        }
    }
    Ok(())
}

fn write_dict(writer: &mut Writer, map: &Map, depth: usize) -> Result<()> {
    check_depth(depth)?;
    if map.is_empty() {
        writer.write_line(depth, "{}");
        return Ok(());
    }
    let mut entries: Vec<(&String, &Value)> = map.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    for (key, value) in entries {
        if is_inline_key(key) {
            match value {
                Value::String(text) if !is_multiline(text) => {
                    writer.write_key_line(depth, key, text)
                }
                Value::String(text) => {
                    writer.write_key_line(depth, key, "");
                    write_string_block(writer, text, depth + 1);
                }
                nested => {
                    writer.write_key_line(depth, key, "");
                    write_value(writer, nested, depth + 1)?;
                }
            }
        } else {
            trace!(depth, "writing multiline key");
            for line in logical_lines(key) {
                writer.write_tagged_line(depth, ":", line);
            }
            // The value block is required even when empty: a following `:`
            // line at this depth would otherwise extend the key.
            write_value(writer, value, depth + 1)?;
        }
    }
    Ok(())
}

/// `[a, b]` when every item is a short string that reads back unchanged.
fn render_inline_list(items: &[Value], limit: usize) -> Option<String> {
    if limit == 0 {
        return None;
    }
    let mut out = String::from("[");
    for (idx, item) in items.iter().enumerate() {
        let Value::String(text) = item else {
            return None;
        };
        if !is_inline_item(text) {
            return None;
        }
        if idx > 0 {
            out.push_str(", ");
        }
        out.push_str(text);
        if out.len() + 1 > limit {
            return None;
        }
    }
    out.push(']');
    Some(out)
}

fn is_inline_item(text: &str) -> bool {
    !text.is_empty()
        && text.trim() == text
        && !text
            .chars()
            .any(|ch| is_inline_structural_char(ch) || ch == '\n' || ch == '\r')
}

/// Keys that can be written as `key: value` and read back unchanged.
fn is_inline_key(key: &str) -> bool {
    match key.chars().next() {
        None => false,
        Some(first) => {
            !is_key_lead_char(first)
                && key.trim() == key
                && !key.contains([':', '\n', '\r'])
        }
    }
}

fn is_multiline(text: &str) -> bool {
    memchr2(b'\n', b'\r', text.as_bytes()).is_some()
}

/// Split on LF, CR or CRLF. An empty string is a single empty line.
fn logical_lines(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = Some(text);
    std::iter::from_fn(move || {
        let current = rest?;
        match memchr2(b'\n', b'\r', current.as_bytes()) {
            Some(idx) => {
                let width = if current[idx..].starts_with("\r\n") { 2 } else { 1 };
                rest = Some(&current[idx + width..]);
                Some(&current[..idx])
            }
            None => {
                rest = None;
                Some(current)
            }
        }
    })
}
