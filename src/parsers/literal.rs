//! Parser for the literal subset some log producers use when they print an event as text:
//! mappings, sequences, tuples, quoted strings, numbers, and the `True`/`False`/`None`
//! constants (their JSON spellings are accepted as well).
//!
//! Anything else (names, calls, operators, comprehensions) is rejected. There is no
//! evaluation step.

use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Nesting limit for mappings and sequences
pub const MAX_LITERAL_DEPTH: usize = 64;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LiteralError {
    #[error("unexpected end of input")]
    UnexpectedEnd,
    #[error("unexpected character {found:?} at offset {offset}")]
    UnexpectedChar { found: char, offset: usize },
    #[error("invalid escape sequence at offset {offset}")]
    InvalidEscape { offset: usize },
    #[error("invalid number {text:?} at offset {offset}")]
    InvalidNumber { text: String, offset: usize },
    #[error("unsupported mapping key at offset {offset}")]
    UnsupportedKey { offset: usize },
    #[error("unknown name {name:?} at offset {offset}")]
    UnknownName { name: String, offset: usize },
    #[error("literal nested deeper than {max} levels")]
    TooDeep { max: usize },
    #[error("trailing characters at offset {offset}")]
    TrailingCharacters { offset: usize },
}

/// Parse `input` as a single literal. Surrounding whitespace is allowed, anything else is not.
pub fn parse_literal(input: &str) -> Result<Value, LiteralError> {
    let mut parser = LiteralParser::new(input);
    let value = parser.parse_value(0)?;
    parser.skip_whitespace();
    if parser.pos < input.len() {
        return Err(LiteralError::TrailingCharacters { offset: parser.pos });
    }
    Ok(value)
}

/// Parse one literal at the start of `input`, returning it and the number of bytes consumed
pub fn parse_literal_prefix(input: &str) -> Result<(Value, usize), LiteralError> {
    let mut parser = LiteralParser::new(input);
    let value = parser.parse_value(0)?;
    Ok((value, parser.pos))
}

/// Every bracket-delimited literal embedded in `text`, left to right.
///
/// Each `{` or `[` is tried as the start of a literal; on success scanning resumes after
/// the consumed literal, on failure at the next character.
pub fn embedded_literals(text: &str) -> impl Iterator<Item = Value> + '_ {
    let mut cursor = 0;
    std::iter::from_fn(move || {
        while cursor < text.len() {
            let rest = &text[cursor..];
            let offset = rest.find(['{', '['])?;
            let start = cursor + offset;
            match parse_literal_prefix(&text[start..]) {
                Ok((value, consumed)) => {
                    cursor = start + consumed;
                    return Some(value);
                }
                Err(_) => cursor = start + 1,
            }
        }
        None
    })
}

/// First bracket-delimited literal embedded in `text`
pub fn find_embedded_literal(text: &str) -> Option<Value> {
    embedded_literals(text).next()
}

struct LiteralParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> LiteralParser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn unexpected(&self) -> LiteralError {
        match self.peek() {
            Some(found) => LiteralError::UnexpectedChar { found, offset: self.pos },
            None => LiteralError::UnexpectedEnd,
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), LiteralError> {
        self.skip_whitespace();
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn parse_value(&mut self, depth: usize) -> Result<Value, LiteralError> {
        self.skip_whitespace();
        match self.peek() {
            Some('{') => self.parse_mapping(depth + 1),
            Some('[') => self.parse_sequence(']', depth + 1).map(Value::Array),
            Some('(') => self.parse_tuple(depth + 1),
            Some('\'' | '"') => self.parse_string().map(Value::String),
            Some(c) if c == '-' || c == '+' || c == '.' || c.is_ascii_digit() => {
                self.parse_number()
            }
            Some(c) if c.is_alphabetic() || c == '_' => self.parse_name(),
            _ => Err(self.unexpected()),
        }
    }

    fn check_depth(depth: usize) -> Result<(), LiteralError> {
        if depth > MAX_LITERAL_DEPTH {
            return Err(LiteralError::TooDeep { max: MAX_LITERAL_DEPTH });
        }
        Ok(())
    }

    fn parse_mapping(&mut self, depth: usize) -> Result<Value, LiteralError> {
        Self::check_depth(depth)?;
        self.expect('{')?;
        let mut map = Map::new();

        loop {
            self.skip_whitespace();
            if self.peek() == Some('}') {
                self.pos += 1;
                return Ok(Value::Object(map));
            }

            let key_offset = self.pos;
            let key = match self.parse_value(depth)? {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                _ => return Err(LiteralError::UnsupportedKey { offset: key_offset }),
            };
            self.expect(':')?;
            let value = self.parse_value(depth)?;
            map.insert(key, value);

            self.skip_whitespace();
            match self.bump() {
                Some(',') => continue,
                Some('}') => return Ok(Value::Object(map)),
                Some(found) => {
                    return Err(LiteralError::UnexpectedChar {
                        found,
                        offset: self.pos - found.len_utf8(),
                    });
                }
                None => return Err(LiteralError::UnexpectedEnd),
            }
        }
    }

    /// Items up to and including `close`; the opening bracket is consumed here
    fn parse_sequence(&mut self, close: char, depth: usize) -> Result<Vec<Value>, LiteralError> {
        Self::check_depth(depth)?;
        self.bump();
        let mut items = Vec::new();

        loop {
            self.skip_whitespace();
            if self.peek() == Some(close) {
                self.pos += 1;
                return Ok(items);
            }

            items.push(self.parse_value(depth)?);

            self.skip_whitespace();
            match self.bump() {
                Some(',') => continue,
                Some(c) if c == close => return Ok(items),
                Some(found) => {
                    return Err(LiteralError::UnexpectedChar {
                        found,
                        offset: self.pos - found.len_utf8(),
                    });
                }
                None => return Err(LiteralError::UnexpectedEnd),
            }
        }
    }

    /// `(x)` is just `x`; `(x,)` and `(x, y)` are sequences
    fn parse_tuple(&mut self, depth: usize) -> Result<Value, LiteralError> {
        let start = self.pos;
        let mut items = self.parse_sequence(')', depth)?;
        let body = self.input[start + 1..self.pos - 1].trim_end();
        if items.len() == 1 && !body.ends_with(',') {
            return Ok(items.remove(0));
        }
        Ok(Value::Array(items))
    }

    fn parse_string(&mut self) -> Result<String, LiteralError> {
        let quote = self.bump().ok_or(LiteralError::UnexpectedEnd)?;
        let mut out = String::new();

        loop {
            let c = self.bump().ok_or(LiteralError::UnexpectedEnd)?;
            match c {
                c if c == quote => return Ok(out),
                '\\' => {
                    let escape_offset = self.pos - 1;
                    let escaped = self.bump().ok_or(LiteralError::UnexpectedEnd)?;
                    match escaped {
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        'r' => out.push('\r'),
                        '0' => out.push('\0'),
                        '\\' => out.push('\\'),
                        '\'' => out.push('\''),
                        '"' => out.push('"'),
                        '\n' => {}
                        'x' => out.push(self.parse_hex_escape(2, escape_offset)?),
                        'u' => out.push(self.parse_hex_escape(4, escape_offset)?),
                        'U' => out.push(self.parse_hex_escape(8, escape_offset)?),
                        _ => return Err(LiteralError::InvalidEscape { offset: escape_offset }),
                    }
                }
                '\n' => return Err(LiteralError::UnexpectedChar { found: c, offset: self.pos - 1 }),
                c => out.push(c),
            }
        }
    }

    fn parse_hex_escape(&mut self, digits: usize, offset: usize) -> Result<char, LiteralError> {
        let end = self.pos + digits;
        let hex = self.input.get(self.pos..end).ok_or(LiteralError::InvalidEscape { offset })?;
        // from_str_radix alone would accept a sign
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(LiteralError::InvalidEscape { offset });
        }
        let code =
            u32::from_str_radix(hex, 16).map_err(|_| LiteralError::InvalidEscape { offset })?;
        self.pos = end;
        char::from_u32(code).ok_or(LiteralError::InvalidEscape { offset })
    }

    fn parse_number(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        if matches!(self.peek(), Some('-' | '+')) {
            self.pos += 1;
        }
        while let Some(c) = self.peek() {
            let after_exponent = matches!(self.input[..self.pos].chars().last(), Some('e' | 'E'));
            let numeric = c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '_');
            if numeric || (matches!(c, '-' | '+') && after_exponent) {
                self.pos += 1;
            } else {
                break;
            }
        }

        let text = &self.input[start..self.pos];
        let invalid = || LiteralError::InvalidNumber { text: text.to_string(), offset: start };
        let cleaned = text.trim_start_matches('+').replace('_', "");

        let is_float = cleaned.contains(['.', 'e', 'E']);
        if !is_float {
            if let Ok(n) = cleaned.parse::<i64>() {
                return Ok(Value::Number(n.into()));
            }
            if let Ok(n) = cleaned.parse::<u64>() {
                return Ok(Value::Number(n.into()));
            }
        }
        let float: f64 = cleaned.parse().map_err(|_| invalid())?;
        Number::from_f64(float).map(Value::Number).ok_or_else(invalid)
    }

    fn parse_name(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }

        match &self.input[start..self.pos] {
            "True" | "true" => Ok(Value::Bool(true)),
            "False" | "false" => Ok(Value::Bool(false)),
            "None" | "null" => Ok(Value::Null),
            name => Err(LiteralError::UnknownName { name: name.to_string(), offset: start }),
        }
    }
}
