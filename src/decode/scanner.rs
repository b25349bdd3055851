use std::io::BufRead;

use memchr::memchr_iter;
use smallvec::{smallvec, SmallVec};
use tracing::trace;

use crate::constants::EOL_MARKER;
use crate::decode::source::LineSource;
use crate::{Error, ErrorKind, Location, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Emitted once before the first content line of a non-empty document.
    DocRoot,
    Eof,
    /// Emitted instead of `DocRoot` when the input holds no content lines.
    EmptyDocument,
    /// `- text`
    ListItem,
    /// `-` with nothing after it; the value follows on deeper lines.
    ListItemMultiline,
    /// `> text` or `>`
    StringMultiline,
    /// `: text` or `:`
    DictKeyMultiline,
    InlineList,
    InlineDict,
    /// `key: value`
    InlineDictKeyValue,
    /// `key:` with the value on deeper lines.
    InlineDictKey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub line: usize,
    pub column: usize,
    pub kind: TokenKind,
    pub indent: usize,
    /// One entry for most kinds; `[key, value]` for `InlineDictKeyValue`.
    pub content: SmallVec<[String; 2]>,
}

impl Token {
    fn new(line: usize, column: usize) -> Self {
        Self {
            line,
            column,
            kind: TokenKind::Eof,
            indent: 0,
            content: SmallVec::new(),
        }
    }

    pub fn location(&self) -> Location {
        Location::new(self.line, self.column)
    }

    /// Whether the token ends the document rather than carrying content.
    pub fn is_end(&self) -> bool {
        matches!(self.kind, TokenKind::Eof | TokenKind::EmptyDocument)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    FileStart,
    LineStart,
    Indentation,
    ItemBody,
    Tag(char),
    PlainKey,
    Finished,
}

/// Turns content lines into tokens, one line per token.
pub(crate) struct Scanner<R> {
    source: LineSource<R>,
    entry: Step,
    line_consumed: bool,
}

impl<R: BufRead> Scanner<R> {
    pub fn new(reader: R) -> Self {
        Self {
            source: LineSource::new(reader),
            entry: Step::FileStart,
            line_consumed: false,
        }
    }

    pub fn next_token(&mut self) -> Result<Token> {
        if self.line_consumed {
            self.source.advance_line()?;
            self.line_consumed = false;
        }
        let mut token = Token::new(self.source.line_no(), self.source.column());
        let mut step = Some(self.entry);
        while let Some(current) = step {
            step = self.run(current, &mut token)?;
        }
        trace!(
            line = token.line,
            indent = token.indent,
            kind = ?token.kind,
            "scanned token"
        );
        Ok(token)
    }

    fn run(&mut self, step: Step, token: &mut Token) -> Result<Option<Step>> {
        match step {
            Step::FileStart => self.scan_file_start(token),
            Step::LineStart => self.scan_line_start(token),
            Step::Indentation => self.scan_indentation(token),
            Step::ItemBody => self.scan_item_body(token),
            Step::Tag(tag) => self.scan_tag(tag, token),
            Step::PlainKey => self.scan_plain_key(token),
            Step::Finished => {
                token.kind = TokenKind::Eof;
                token.indent = 0;
                Ok(None)
            }
        }
    }

    fn scan_file_start(&mut self, token: &mut Token) -> Result<Option<Step>> {
        if !self.source.advance_line()? {
            token.kind = TokenKind::EmptyDocument;
            self.entry = Step::Finished;
            return Ok(None);
        }
        if self.source.lookahead() == Some(' ') {
            return Err(Error::format(
                ErrorKind::TopLevelIndent,
                "top-level item must not be indented",
                self.source.location(),
            ));
        }
        token.line = self.source.line_no();
        token.kind = TokenKind::DocRoot;
        self.entry = Step::LineStart;
        Ok(None)
    }

    fn scan_line_start(&mut self, token: &mut Token) -> Result<Option<Step>> {
        if self.source.is_eof() {
            self.entry = Step::Finished;
            return Ok(Some(Step::Finished));
        }
        token.line = self.source.line_no();
        token.column = 0;
        Ok(Some(Step::Indentation))
    }

    fn scan_indentation(&mut self, token: &mut Token) -> Result<Option<Step>> {
        while self.source.lookahead() == Some(' ') {
            token.indent += 1;
            self.source.advance_cursor();
        }
        if self.source.lookahead() == Some('\t') {
            return Err(Error::format(
                ErrorKind::Format,
                "invalid character in indentation: tab",
                self.source.location(),
            ));
        }
        token.column = token.indent;
        Ok(Some(Step::ItemBody))
    }

    fn scan_item_body(&mut self, token: &mut Token) -> Result<Option<Step>> {
        match self.source.lookahead() {
            Some(tag @ ('-' | '>' | ':')) => Ok(Some(Step::Tag(tag))),
            Some('[') => Ok(self.take_line(token, TokenKind::InlineList)),
            Some('{') => Ok(self.take_line(token, TokenKind::InlineDict)),
            _ => Ok(Some(Step::PlainKey)),
        }
    }

    /// A tag is only a tag when followed by a space or the end of the line;
    /// otherwise the line is read as a `key: value` item.
    fn scan_tag(&mut self, tag: char, token: &mut Token) -> Result<Option<Step>> {
        self.source.advance_cursor();
        let kind_with_text = match tag {
            '-' => TokenKind::ListItem,
            '>' => TokenKind::StringMultiline,
            _ => TokenKind::DictKeyMultiline,
        };
        match self.source.lookahead() {
            Some(' ') => {
                self.source.advance_cursor();
                Ok(self.take_line(token, kind_with_text))
            }
            Some(EOL_MARKER) => {
                let kind = if tag == '-' {
                    TokenKind::ListItemMultiline
                } else {
                    kind_with_text
                };
                Ok(self.take_line(token, kind))
            }
            _ => Ok(Some(Step::PlainKey)),
        }
    }

    fn scan_plain_key(&mut self, token: &mut Token) -> Result<Option<Step>> {
        let text = self.source.line_text();
        // Indentation is ASCII spaces, so the indent is also a byte offset.
        let item = &text[token.indent..];
        let bytes = item.as_bytes();
        let split = memchr_iter(b':', bytes)
            .find(|&idx| matches!(bytes.get(idx + 1), None | Some(b' ')));

        let Some(idx) = split else {
            return Err(self.unterminated_key(item, token.location()));
        };
        let key = item[..idx].trim_end().to_string();
        if idx + 1 == item.len() {
            token.kind = TokenKind::InlineDictKey;
            token.content = smallvec![key];
        } else {
            token.kind = TokenKind::InlineDictKeyValue;
            token.content = smallvec![key, item[idx + 2..].to_string()];
        }
        self.line_consumed = true;
        Ok(None)
    }

    fn unterminated_key(&self, item: &str, location: Location) -> Error {
        let described = match item.chars().next() {
            Some('-') => Some("list-item tag ('-')"),
            Some('>') => Some("string tag ('>')"),
            Some(':') => Some("dict-key tag (':')"),
            _ => None,
        };
        match described {
            Some(tag) => Error::format(
                ErrorKind::IllegalTag,
                format!("{tag} followed by illegal character"),
                location,
            ),
            None => Error::format(
                ErrorKind::Format,
                "dict key item not properly terminated by ':'",
                location,
            ),
        }
    }

    fn take_line(&mut self, token: &mut Token, kind: TokenKind) -> Option<Step> {
        token.kind = kind;
        token.content = smallvec![self.source.remainder().to_string()];
        self.line_consumed = true;
        None
    }
}
