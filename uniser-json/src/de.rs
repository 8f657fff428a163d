//! JSON parser producing trees.
use alloc::string::String;
use core::str::{self, FromStr};

use uniser::{Number, TreeArray, TreeElement, TreeObject};

/// Default nesting depth of arrays and objects beyond which parsing is abandoned.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Parse a single JSON value from `text`.
///
/// Only whitespace may follow the value.
pub fn from_str(text: &str) -> Result<TreeElement> {
    from_slice(text.as_bytes())
}

/// Parse a single JSON value from UTF-8 encoded `bytes`.
///
/// Only whitespace may follow the value.
pub fn from_slice(bytes: &[u8]) -> Result<TreeElement> {
    from_slice_with_max_depth(bytes, DEFAULT_MAX_DEPTH)
}

/// Parse a single JSON value from `text`, nesting no deeper than `max_depth`.
pub fn from_str_with_max_depth(text: &str, max_depth: usize) -> Result<TreeElement> {
    from_slice_with_max_depth(text.as_bytes(), max_depth)
}

/// Parse a single JSON value from UTF-8 encoded `bytes`, nesting no deeper than `max_depth`.
pub fn from_slice_with_max_depth(bytes: &[u8], max_depth: usize) -> Result<TreeElement> {
    let mut parser = Parser::with_max_depth(bytes, max_depth);
    let element = parser.parse_element()?;
    parser.end()?;
    Ok(element)
}

/// Parsing result
pub type Result<T> = core::result::Result<T, Error>;

/// A parse error with the byte offset into the input where it was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at position {position}")]
pub struct Error {
    kind: ErrorKind,
    position: usize,
}

impl Error {
    pub fn new(kind: ErrorKind, position: usize) -> Self {
        Error { kind, position }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Byte offset into the input.
    pub fn position(&self) -> usize {
        self.position
    }
}

impl From<Error> for uniser::Error {
    fn from(err: Error) -> Self {
        uniser::Error::parse(err.position, err.kind)
    }
}

/// Parse error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// EOF while parsing
    #[error("unexpected end of JSON input")]
    UnexpectedEof,
    /// Invalid JSON string escape sequence
    #[error("invalid JSON string escape sequence")]
    InvalidEscapeSequence,
    /// Expected this character to be a `':'`.
    #[error("expected `':'`")]
    ExpectedColon,
    /// Expected this character to be either a `','` or a `']'`.
    #[error("expected `','` or `']'`")]
    ExpectedArrayCommaOrEnd,
    /// Expected this character to be either a `','` or a `'}'`.
    #[error("expected `','` or `'}}'`")]
    ExpectedObjectCommaOrEnd,
    /// Expected to parse either `true`, `false`, or `null`.
    #[error("expected either `true`, `false`, or `null`")]
    ExpectedToken,
    /// Expected a `"` character
    #[error("expected `'\"'`")]
    ExpectedString,
    /// Invalid number
    #[error("invalid number")]
    InvalidNumber,
    /// Invalid unicode code point
    #[error("invalid unicode code point")]
    InvalidUnicodeCodePoint,
    /// JSON has non-whitespace trailing characters after the value
    #[error("JSON has non-whitespace trailing characters after the value")]
    TrailingCharacters,
    /// Unexpected character
    #[error("unexpected character while parsing a JSON value")]
    UnexpectedChar,
    /// Arrays and objects are nested deeper than the parser allows
    #[error("JSON nesting is too deep")]
    RecursionLimitExceeded,
}

/* special JSON characters */
const SP: u8 = b' ';
const QU: u8 = b'"';
const RS: u8 = b'\\';
const SO: u8 = b'/';
/* special JSON string escape characters */
const B_: u8 = 0x08; // \b -> \x08
const T_: u8 = 0x09; // \t -> \x09
const N_: u8 = 0x0A; // \n -> \x0A
const F_: u8 = 0x0C; // \f => \x0C
const R_: u8 = 0x0D; // \r => \x0D
/* \uUUUU */
const UU: u8 = b'u';
const __: u8 = 0;
/* only selected (un)escape codes are permitted */
static UNESCAPE: [u8;19] = [
/* \b,  c,  d,  e, \f,  g,  h,  i,  j,  k,  l,  m, \n,  o,  p,  q, \r,  s, \t */
    B_, __, __, __, F_, __, __, __, __, __, __, __, N_, __, __, __, R_, __, T_
];

#[inline(always)]
fn parse_hex_nib(ch: u8) -> Option<u8> {
    match ch {
        n@b'0'..=b'9' => Some(n - b'0'),
        _ => match ch|0x20 {
            n@b'a'..=b'f' => Some(n - b'a' + 10),
            _ => None
        }
    }
}

#[inline(always)]
fn parse_uuuu([a,b,c,d]: [u8;4]) -> Option<u32> {
    Some(u16::from_le_bytes([
        (parse_hex_nib(c)? << 4) + parse_hex_nib(d)?,
        (parse_hex_nib(a)? << 4) + parse_hex_nib(b)?]).into())
}

/// Recursive descent JSON parser.
///
/// * numbers without a fraction or an exponent become integers, when they fit
///   in `u64` (non-negative) or `i64` (negative), and floats otherwise,
/// * a leading `+` is accepted on numbers,
/// * `\uXXXX` escapes may encode surrogate pairs, a lone surrogate is an error,
/// * raw control characters inside strings are taken verbatim,
/// * object members keep their textual order, a repeated key keeps
///   the first position and the last value.
pub struct Parser<'a> {
    input: &'a [u8],
    index: usize,
    depth: usize,
    max_depth: usize,
}

impl<'a> Parser<'a> {
    /// A parser limited to [`DEFAULT_MAX_DEPTH`] nested containers.
    pub fn new(input: &'a [u8]) -> Self {
        Parser::with_max_depth(input, DEFAULT_MAX_DEPTH)
    }

    pub fn with_max_depth(input: &'a [u8], max_depth: usize) -> Self {
        Parser { input, index: 0, depth: 0, max_depth }
    }

    /// Current byte offset into the input.
    pub fn position(&self) -> usize {
        self.index
    }

    /// Consume the parser and check if trailing characters only consist of whitespace.
    pub fn end(mut self) -> Result<()> {
        match self.eat_whitespace() {
            Ok(_) => Err(self.error(ErrorKind::TrailingCharacters)),
            Err(_) => Ok(())
        }
    }

    /// Parse a single JSON value with everything nested in it.
    pub fn parse_element(&mut self) -> Result<TreeElement> {
        match self.eat_whitespace()? {
            b'n' => self.parse_token(b"null").map(|_| TreeElement::Null),
            b't' => self.parse_token(b"true").map(|_| true.into()),
            b'f' => self.parse_token(b"false").map(|_| false.into()),
            QU => {
                self.eat_some(1);
                self.parse_string().map(TreeElement::from)
            }
            b'0'..=b'9'|b'-'|b'+' => self.parse_number().map(TreeElement::from),
            b'[' => self.nested(Self::parse_array).map(TreeElement::from),
            b'{' => self.nested(Self::parse_object).map(TreeElement::from),
            _ => Err(self.error(ErrorKind::UnexpectedChar))
        }
    }

    fn error(&self, kind: ErrorKind) -> Error {
        Error::new(kind, self.index)
    }

    fn peek(&self) -> Result<u8> {
        self.input.get(self.index).copied()
        .ok_or_else(|| self.error(ErrorKind::UnexpectedEof))
    }

    fn eat_some(&mut self, len: usize) {
        self.index += len;
    }

    /// Advance the cursor past any JSON whitespace and peek at the next character.
    fn eat_whitespace(&mut self) -> Result<u8> {
        let index = self.index;
        match self.input[index..].iter().position(|&b| !matches!(b, SP|T_|N_|R_)) {
            Some(pos) => {
                self.index = index + pos;
                Ok(self.input[index + pos])
            }
            None => {
                self.index = self.input.len();
                Err(self.error(ErrorKind::UnexpectedEof))
            }
        }
    }

    fn parse_token(&mut self, token: &[u8]) -> Result<()> {
        let size = token.len();
        match self.input.get(self.index..self.index + size) {
            Some(slice) if slice == token => {
                self.eat_some(size);
                Ok(())
            }
            Some(_) => Err(self.error(ErrorKind::ExpectedToken)),
            None => Err(Error::new(ErrorKind::UnexpectedEof, self.input.len()))
        }
    }

    fn nested<T>(&mut self, parse: fn(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= self.max_depth {
            return Err(self.error(ErrorKind::RecursionLimitExceeded))
        }
        self.depth += 1;
        let res = parse(self);
        self.depth -= 1;
        res
    }

    fn parse_array(&mut self) -> Result<TreeArray> {
        self.eat_some(1);
        let mut array = TreeArray::new();
        if self.eat_whitespace()? == b']' {
            self.eat_some(1);
            return Ok(array)
        }
        loop {
            array.push(self.parse_element()?);
            match self.eat_whitespace()? {
                b',' => self.eat_some(1),
                b']' => {
                    self.eat_some(1);
                    return Ok(array)
                }
                _ => return Err(self.error(ErrorKind::ExpectedArrayCommaOrEnd))
            }
        }
    }

    fn parse_object(&mut self) -> Result<TreeObject> {
        self.eat_some(1);
        let mut object = TreeObject::new();
        if self.eat_whitespace()? == b'}' {
            self.eat_some(1);
            return Ok(object)
        }
        loop {
            if self.eat_whitespace()? != QU {
                return Err(self.error(ErrorKind::ExpectedString))
            }
            self.eat_some(1);
            let key = self.parse_string()?;
            if self.eat_whitespace()? != b':' {
                return Err(self.error(ErrorKind::ExpectedColon))
            }
            self.eat_some(1);
            let value = self.parse_element()?;
            object.insert(key, value);
            match self.eat_whitespace()? {
                b',' => self.eat_some(1),
                b'}' => {
                    self.eat_some(1);
                    return Ok(object)
                }
                _ => return Err(self.error(ErrorKind::ExpectedObjectCommaOrEnd))
            }
        }
    }

    /// Parse string contents after the opening `'"'`, consuming the closing one.
    fn parse_string(&mut self) -> Result<String> {
        let mut string = String::new();
        loop {
            let start = self.index;
            let len = self.input[start..].iter()
                .position(|&b| matches!(b, QU|RS))
                .ok_or_else(|| Error::new(ErrorKind::UnexpectedEof, self.input.len()))?;
            let chunk = str::from_utf8(&self.input[start..start + len])
                .map_err(|err| Error::new(ErrorKind::InvalidUnicodeCodePoint,
                                          start + err.valid_up_to()))?;
            string.push_str(chunk);
            self.eat_some(len);
            if self.peek()? == QU {
                self.eat_some(1);
                return Ok(string)
            }
            self.eat_some(1);
            string.push(self.parse_escape()?);
        }
    }

    /// Parse an escape sequence after the `'\\'`.
    fn parse_escape(&mut self) -> Result<char> {
        let ch = match self.peek()? {
            c@(QU|RS|SO) => c,
            UU => {
                self.eat_some(1);
                return self.parse_unicode_escape()
            }
            c@b'b'..=b't' => match UNESCAPE[(c - b'b') as usize] {
                __ => return Err(self.error(ErrorKind::InvalidEscapeSequence)),
                ch => ch
            }
            _ => return Err(self.error(ErrorKind::InvalidEscapeSequence))
        };
        self.eat_some(1);
        Ok(ch as char)
    }

    /// Parse the code point of a `\uXXXX` escape, with the low half of a surrogate pair.
    fn parse_unicode_escape(&mut self) -> Result<char> {
        let start = self.index - 2;
        let code = self.parse_hex4()?;
        let code = match code {
            0xD800..=0xDBFF => {
                if self.input.get(self.index..self.index + 2) != Some(b"\\u".as_slice()) {
                    return Err(Error::new(ErrorKind::InvalidUnicodeCodePoint, start))
                }
                self.eat_some(2);
                match self.parse_hex4()? {
                    low@0xDC00..=0xDFFF => 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00),
                    _ => return Err(Error::new(ErrorKind::InvalidUnicodeCodePoint, start))
                }
            }
            0xDC00..=0xDFFF => return Err(Error::new(ErrorKind::InvalidUnicodeCodePoint, start)),
            code => code
        };
        char::from_u32(code).ok_or(Error::new(ErrorKind::InvalidUnicodeCodePoint, start))
    }

    fn parse_hex4(&mut self) -> Result<u32> {
        let digits: [u8; 4] = self.input.get(self.index..self.index + 4)
            .and_then(|slice| slice.try_into().ok())
            .ok_or_else(|| Error::new(ErrorKind::UnexpectedEof, self.input.len()))?;
        let code = parse_uuuu(digits).ok_or_else(|| self.error(ErrorKind::InvalidEscapeSequence))?;
        self.eat_some(4);
        Ok(code)
    }

    fn eat_digits(&mut self) -> Result<()> {
        let len = self.input[self.index..].iter()
            .position(|b| !b.is_ascii_digit())
            .unwrap_or(self.input.len() - self.index);
        if len == 0 {
            return Err(self.error(ErrorKind::InvalidNumber))
        }
        self.eat_some(len);
        Ok(())
    }

    /// Parse `[+-]digits[.digits][(e|E)[+-]digits]`.
    fn parse_number(&mut self) -> Result<Number> {
        let start = self.index;
        let is_negative = self.peek()? == b'-';
        if matches!(self.peek()?, b'-'|b'+') {
            self.eat_some(1);
        }
        self.eat_digits()?;
        let mut is_float = false;
        if self.input.get(self.index) == Some(&b'.') {
            self.eat_some(1);
            self.eat_digits()?;
            is_float = true;
        }
        if matches!(self.input.get(self.index), Some(b'e'|b'E')) {
            self.eat_some(1);
            if matches!(self.input.get(self.index), Some(b'-'|b'+')) {
                self.eat_some(1);
            }
            self.eat_digits()?;
            is_float = true;
        }
        let invalid = || Error::new(ErrorKind::InvalidNumber, start);
        // only ASCII was consumed
        let text = str::from_utf8(&self.input[start..self.index]).map_err(|_| invalid())?;
        if !is_float {
            let int = if is_negative {
                i64::from_str(text).ok().map(Number::from)
            }
            else {
                u64::from_str(text).ok().map(Number::from)
            };
            if let Some(number) = int {
                return Ok(number)
            }
            log::trace!("integer {text} out of range, parsed as a float");
        }
        f64::from_str(text).map(Number::Float).map_err(|_| invalid())
    }
}
