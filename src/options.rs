use std::str::FromStr;

use smol_str::SmolStr;

use crate::constants::{
    DEFAULT_INDENT, DEFAULT_INLINE_LIMIT, DEFAULT_TOP_LEVEL_KEY, MAX_DEPTH, MAX_INDENT,
    MAX_INLINE_LIMIT,
};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indent {
    Spaces(usize),
}

impl Indent {
    /// Indentation clamped to the accepted range of 1..=16 spaces.
    pub fn spaces(count: usize) -> Self {
        Indent::Spaces(count.clamp(1, MAX_INDENT))
    }

    pub fn get_spaces(self) -> usize {
        match self {
            Indent::Spaces(count) => count,
        }
    }
}

impl Default for Indent {
    fn default() -> Self {
        Indent::Spaces(DEFAULT_INDENT)
    }
}

/// Shape imposed on the decoded root value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TopLevel {
    /// Return the value as decoded.
    #[default]
    Any,
    /// Wrap a non-list root into a one-element list.
    List,
    /// Wrap a non-dict root under the given key.
    Dict(SmolStr),
}

impl FromStr for TopLevel {
    type Err = Error;

    fn from_str(mode: &str) -> Result<Self> {
        match mode {
            "list" => Ok(TopLevel::List),
            "dict" => Ok(TopLevel::Dict(SmolStr::new_static(DEFAULT_TOP_LEVEL_KEY))),
            _ => match mode.strip_prefix("dict.") {
                Some(suffix) if !suffix.is_empty() => Ok(TopLevel::Dict(SmolStr::new(suffix))),
                _ => Err(Error::usage(format!(
                    "invalid top-level mode \"{mode}\"; expected \"list\", \"dict\" or \"dict.<key>\""
                ))),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeOptions {
    pub indent: Indent,
    pub inline_limit: usize,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            indent: Indent::default(),
            inline_limit: DEFAULT_INLINE_LIMIT,
        }
    }
}

impl EncodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_indent(mut self, indent: Indent) -> Self {
        let Indent::Spaces(count) = indent;
        self.indent = Indent::spaces(count);
        self
    }

    /// Number of spaces per nesting level, clamped to 1..=16.
    pub fn with_indent_by(self, count: usize) -> Self {
        self.with_indent(Indent::Spaces(count))
    }

    /// Byte budget under which lists of short strings are written as `[a, b]`.
    /// Values above 2048 are clamped; 0 disables inline lists.
    pub fn with_inline_limit(mut self, limit: usize) -> Self {
        self.inline_limit = limit.min(MAX_INLINE_LIMIT);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOptions {
    pub top_level: TopLevel,
    pub max_depth: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            top_level: TopLevel::Any,
            max_depth: MAX_DEPTH,
        }
    }
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_top_level(mut self, top_level: TopLevel) -> Self {
        self.top_level = top_level;
        self
    }

    /// Parse a top-level mode string (`"list"`, `"dict"`, `"dict.<key>"`).
    pub fn with_top_level_mode(self, mode: &str) -> Result<Self> {
        Ok(self.with_top_level(mode.parse()?))
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }
}
