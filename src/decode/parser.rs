use std::io::BufRead;

use smallvec::SmallVec;
use tracing::debug;

use crate::decode::inline::parse_inline;
use crate::decode::scanner::{Scanner, Token, TokenKind};
use crate::value::Map;
use crate::{DecodeOptions, Error, ErrorKind, Result, Value};

/// Recursive-descent parser over the scanner's token stream. Every container
/// at a given indent ends at the first token with a smaller indent.
pub(crate) struct Parser<R> {
    scanner: Scanner<R>,
    token: Token,
    depth: usize,
    max_depth: usize,
}

impl<R: BufRead> Parser<R> {
    pub fn new(reader: R, options: &DecodeOptions) -> Self {
        Self {
            scanner: Scanner::new(reader),
            token: Token {
                line: 0,
                column: 0,
                kind: TokenKind::EmptyDocument,
                indent: 0,
                content: SmallVec::new(),
            },
            depth: 0,
            max_depth: options.max_depth,
        }
    }

    /// Parse a whole document. `None` means the input held no content lines.
    pub fn parse_document(&mut self) -> Result<Option<Value>> {
        self.advance()?;
        match self.token.kind {
            TokenKind::DocRoot => {}
            TokenKind::EmptyDocument => {
                debug!("empty document");
                return Ok(None);
            }
            _ => {
                return Err(Error::format(
                    ErrorKind::NoInput,
                    "no valid input document",
                    self.token.location(),
                ))
            }
        }
        self.advance()?;
        let value = self.parse_any(0)?;
        if self.token.kind != TokenKind::Eof {
            return Err(Error::format(
                ErrorKind::Format,
                "unused content following valid input",
                self.token.location(),
            ));
        }
        debug!(kind = value.as_ref().map(|value| value.kind_name()), "parsed document");
        Ok(value)
    }

    fn advance(&mut self) -> Result<()> {
        self.token = self.scanner.next_token()?;
        Ok(())
    }

    fn take_content(&mut self) -> SmallVec<[String; 2]> {
        std::mem::take(&mut self.token.content)
    }

    fn take_text(&mut self) -> String {
        self.take_content().into_iter().next().unwrap_or_default()
    }

    fn at(&self, indent: usize, kinds: &[TokenKind]) -> bool {
        !self.token.is_end() && self.token.indent == indent && kinds.contains(&self.token.kind)
    }

    fn parse_any(&mut self, indent: usize) -> Result<Option<Value>> {
        if self.token.is_end() || self.token.indent < indent {
            return Ok(None);
        }
        if self.token.indent > indent {
            return Err(self.invalid_indent());
        }
        let value = match self.token.kind {
            TokenKind::ListItem | TokenKind::ListItemMultiline => self.parse_list(indent)?,
            TokenKind::StringMultiline => self.parse_multi_string(indent)?,
            TokenKind::DictKeyMultiline
            | TokenKind::InlineDictKey
            | TokenKind::InlineDictKeyValue => self.parse_dict(indent)?,
            TokenKind::InlineList | TokenKind::InlineDict => self.parse_inline()?,
            TokenKind::DocRoot | TokenKind::Eof | TokenKind::EmptyDocument => return Ok(None),
        };
        Ok(Some(value))
    }

    /// Value introduced by a tag with nothing after it: whatever is indented
    /// deeper than `indent`, or an empty string.
    fn parse_nested(&mut self, indent: usize) -> Result<Value> {
        if self.token.is_end() || self.token.indent <= indent {
            return Ok(Value::default());
        }
        let nested = self.token.indent;
        Ok(self.parse_any(nested)?.unwrap_or_default())
    }

    fn parse_multi_string(&mut self, indent: usize) -> Result<Value> {
        let mut lines = Vec::new();
        while self.at(indent, &[TokenKind::StringMultiline]) {
            lines.push(self.take_text());
            self.advance()?;
        }
        Ok(Value::String(lines.join("\n")))
    }

    fn parse_list(&mut self, indent: usize) -> Result<Value> {
        self.enter()?;
        let mut items = Vec::new();
        while self.at(indent, &[TokenKind::ListItem, TokenKind::ListItemMultiline]) {
            if self.token.kind == TokenKind::ListItem {
                items.push(Value::String(self.take_text()));
                self.advance()?;
            } else {
                self.advance()?;
                items.push(self.parse_nested(indent)?);
            }
            if !self.token.is_end() && self.token.indent > indent {
                return Err(self.invalid_indent());
            }
        }
        self.depth -= 1;
        Ok(Value::List(items))
    }

    fn parse_dict(&mut self, indent: usize) -> Result<Value> {
        self.enter()?;
        let mut map = Map::new();
        loop {
            if self.token.is_end() || self.token.indent != indent {
                break;
            }
            let location = self.token.location();
            let (key, value) = match self.token.kind {
                TokenKind::InlineDictKeyValue => {
                    let mut content = self.take_content().into_iter();
                    let key = content.next().unwrap_or_default();
                    let value = content.next().unwrap_or_default();
                    self.advance()?;
                    (key, Value::String(value))
                }
                TokenKind::InlineDictKey => {
                    let key = self.take_text();
                    self.advance()?;
                    (key, self.parse_nested(indent)?)
                }
                TokenKind::DictKeyMultiline => {
                    let mut lines = Vec::new();
                    while self.at(indent, &[TokenKind::DictKeyMultiline]) {
                        lines.push(self.take_text());
                        self.advance()?;
                    }
                    (lines.join("\n"), self.parse_nested(indent)?)
                }
                _ => break,
            };
            if map.contains_key(&key) {
                return Err(Error::format(
                    ErrorKind::Format,
                    format!("duplicate key: {key}"),
                    location,
                ));
            }
            map.insert(key, value);
        }
        if !self.token.is_end() && self.token.indent > indent {
            return Err(Error::format(
                ErrorKind::Format,
                "invalid indentation, partial dedent",
                self.token.location(),
            ));
        }
        self.depth -= 1;
        Ok(Value::Dict(map))
    }

    fn parse_inline(&mut self) -> Result<Value> {
        let location = self.token.location();
        let text = self.take_text();
        let budget = self.max_depth.saturating_sub(self.depth);
        let value = parse_inline(&text, location, budget)?;
        self.advance()?;
        Ok(value)
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(Error::format(
                ErrorKind::Format,
                "nesting exceeds maximum depth",
                self.token.location(),
            ));
        }
        Ok(())
    }

    fn invalid_indent(&self) -> Error {
        Error::format(ErrorKind::Format, "invalid indentation", self.token.location())
    }
}
