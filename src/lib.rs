//! Reader and writer for [NestedText](https://nestedtext.org), a data format
//! for nested lists, dicts and strings in which every leaf is a string and
//! nothing ever needs quoting or escaping.
//!
//! ```
//! use nestedtext::{parse_str, DecodeOptions, Value};
//!
//! let doc = "\
//! name: Ada
//! langs:
//!   - rust
//!   - ocaml
//! ";
//! let value = parse_str(doc, &DecodeOptions::default())?.unwrap();
//! assert_eq!(value.get("name"), Some(&Value::from("Ada")));
//! # Ok::<(), nestedtext::Error>(())
//! ```

pub mod constants;
pub mod decode;
pub mod encode;
pub mod error;
pub mod options;
pub mod value;

use std::io::{BufRead, Read, Write};

use serde::de::DeserializeOwned;
use serde::Serialize;

pub use crate::error::{Error, ErrorKind, Location};
pub use crate::options::{DecodeOptions, EncodeOptions, Indent, TopLevel};
pub use crate::value::{Map, Value};

pub type Result<T> = std::result::Result<T, Error>;

/// Decode a document from a reader. `Ok(None)` means the document had no
/// content lines and `options.top_level` did not ask for a container.
pub fn parse<R: Read>(reader: R, options: &DecodeOptions) -> Result<Option<Value>> {
    decode::parse(reader, options)
}

pub fn parse_buffered<R: BufRead>(reader: R, options: &DecodeOptions) -> Result<Option<Value>> {
    decode::parse_buffered(reader, options)
}

pub fn parse_str(input: &str, options: &DecodeOptions) -> Result<Option<Value>> {
    decode::parse_str(input, options)
}

pub fn parse_slice(input: &[u8], options: &DecodeOptions) -> Result<Option<Value>> {
    decode::parse_slice(input, options)
}

pub fn validate_str(input: &str) -> Result<()> {
    validate_str_with_options(input, &DecodeOptions::default())
}

pub fn validate_str_with_options(input: &str, options: &DecodeOptions) -> Result<()> {
    decode::validate_str(input, options)
}

pub fn from_str<T: DeserializeOwned>(input: &str) -> Result<T> {
    from_str_with_options(input, &DecodeOptions::default())
}

pub fn from_str_with_options<T: DeserializeOwned>(
    input: &str,
    options: &DecodeOptions,
) -> Result<T> {
    decode::from_str(input, options)
}

pub fn from_slice<T: DeserializeOwned>(input: &[u8]) -> Result<T> {
    from_slice_with_options(input, &DecodeOptions::default())
}

pub fn from_slice_with_options<T: DeserializeOwned>(
    input: &[u8],
    options: &DecodeOptions,
) -> Result<T> {
    decode::from_slice(input, options)
}

pub fn from_reader<T: DeserializeOwned, R: Read>(reader: R) -> Result<T> {
    from_reader_with_options(reader, &DecodeOptions::default())
}

pub fn from_reader_with_options<T: DeserializeOwned, R: Read>(
    reader: R,
    options: &DecodeOptions,
) -> Result<T> {
    decode::from_reader(reader, options)
}

/// Write `value` as a document and return the number of bytes written.
///
/// ```
/// use nestedtext::{encode, EncodeOptions, Value};
///
/// let value = Value::from_iter([("name", "Ada")]);
/// let mut out = Vec::new();
/// let written = encode(&value, &mut out, &EncodeOptions::default())?;
/// assert_eq!(out, b"name: Ada\n");
/// assert_eq!(written, out.len());
/// # Ok::<(), nestedtext::Error>(())
/// ```
pub fn encode<W: Write>(value: &Value, writer: W, options: &EncodeOptions) -> Result<usize> {
    encode::encode(value, writer, options)
}

pub fn encode_to_string(value: &Value, options: &EncodeOptions) -> Result<String> {
    encode::encode_to_string(value, options)
}

pub fn to_string<T: Serialize>(value: &T) -> Result<String> {
    to_string_with_options(value, &EncodeOptions::default())
}

pub fn to_string_with_options<T: Serialize>(value: &T, options: &EncodeOptions) -> Result<String> {
    encode::to_string(value, options)
}

pub fn to_vec<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    to_vec_with_options(value, &EncodeOptions::default())
}

pub fn to_vec_with_options<T: Serialize>(value: &T, options: &EncodeOptions) -> Result<Vec<u8>> {
    encode::to_vec(value, options)
}

pub fn to_writer<T: Serialize, W: Write>(writer: W, value: &T) -> Result<()> {
    to_writer_with_options(writer, value, &EncodeOptions::default())
}

pub fn to_writer_with_options<T: Serialize, W: Write>(
    writer: W,
    value: &T,
    options: &EncodeOptions,
) -> Result<()> {
    encode::to_writer(writer, value, options)
}
