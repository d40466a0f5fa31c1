//! Best-effort parser for JavaScript object literals
//!
//! The grammar is deliberately narrow: keys are identifiers, numbers or quoted
//! strings; values are quoted strings, numbers, booleans, nested objects, or
//! arrays made only of those. Anything else (identifiers, calls, spreads,
//! template interpolation, arithmetic) makes the enclosing entry unparseable,
//! and that entry is skipped up to the next top-level comma.

use serde_json::{Map, Number, Value};

/// Parses a literal at the start of a piece of source text.
///
/// Implementations never panic on malformed input; they return `None` when
/// nothing could be parsed with confidence.
pub trait LiteralParser: Send + Sync {
    /// Parses the literal starting at `text` (leading whitespace and comments
    /// allowed) and returns it together with the number of bytes consumed.
    fn parse_literal(&self, text: &str) -> Option<(Value, usize)>;

    /// Parses an object literal starting at `text`, discarding non-objects
    fn parse_object(&self, text: &str) -> Option<Map<String, Value>> {
        match self.parse_literal(text) {
            Some((Value::Object(map), _)) => Some(map),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ObjectLiteralParser;

impl ObjectLiteralParser {
    pub fn new() -> Self {
        Self
    }
}

impl LiteralParser for ObjectLiteralParser {
    fn parse_literal(&self, text: &str) -> Option<(Value, usize)> {
        let mut cursor = Cursor::new(text);
        cursor.skip_trivia();
        let value = cursor.parse_value(0)?;
        Some((value, cursor.pos))
    }
}

const MAX_NESTING: usize = 64;

struct Cursor<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(b) if b.is_ascii_whitespace() => self.pos += 1,
                Some(b'/') if self.peek_at(1) == Some(b'/') => {
                    while let Some(b) = self.peek() {
                        if b == b'\n' {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                Some(b'/') if self.peek_at(1) == Some(b'*') => {
                    self.pos += 2;
                    while !self.at_end() {
                        if self.peek() == Some(b'*') && self.peek_at(1) == Some(b'/') {
                            self.pos += 2;
                            break;
                        }
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }
    }

    fn parse_value(&mut self, depth: usize) -> Option<Value> {
        if depth > MAX_NESTING {
            return None;
        }
        match self.peek()? {
            b'{' => self.parse_object(depth),
            b'[' => self.parse_array(depth),
            q @ (b'"' | b'\'' | b'`') => self.parse_string(q).map(Value::String),
            b if b.is_ascii_digit() || b == b'-' || b == b'+' || b == b'.' => self.parse_number(),
            _ => self.parse_keyword(),
        }
    }

    fn parse_keyword(&mut self) -> Option<Value> {
        let rest = &self.src[self.pos..];
        for (word, value) in [("true", Value::Bool(true)), ("false", Value::Bool(false))] {
            if rest.starts_with(word) {
                let next = rest.as_bytes().get(word.len()).copied();
                if next.map(|b| !is_ident_byte(b)).unwrap_or(true) {
                    self.pos += word.len();
                    return Some(value);
                }
            }
        }
        None
    }

    fn parse_string(&mut self, quote: u8) -> Option<String> {
        self.pos += 1;
        let mut out = String::new();
        let mut run_start = self.pos;

        while let Some(b) = self.peek() {
            if b == quote {
                out.push_str(&self.src[run_start..self.pos]);
                self.pos += 1;
                return Some(out);
            }
            if quote == b'`' && b == b'$' && self.peek_at(1) == Some(b'{') {
                return None;
            }
            if b == b'\n' && quote != b'`' {
                return None;
            }
            if b == b'\\' {
                out.push_str(&self.src[run_start..self.pos]);
                self.pos += 1;
                let escaped = self.peek()?;
                match escaped {
                    b'n' => out.push('\n'),
                    b't' => out.push('\t'),
                    b'r' => out.push('\r'),
                    b'\n' => {}
                    _ => {
                        // Copy the full (possibly multi-byte) escaped character
                        let ch = self.src[self.pos..].chars().next()?;
                        out.push(ch);
                        self.pos += ch.len_utf8() - 1;
                    }
                }
                self.pos += 1;
                run_start = self.pos;
                continue;
            }
            self.pos += 1;
        }
        None
    }

    fn parse_number(&mut self) -> Option<Value> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b.is_ascii_alphanumeric() || matches!(b, b'.' | b'-' | b'+' | b'_') {
                self.pos += 1;
            } else {
                break;
            }
        }
        let raw: String = self.src[start..self.pos].chars().filter(|c| *c != '_').collect();

        if let Ok(int) = raw.parse::<i64>() {
            return Some(Value::Number(Number::from(int)));
        }
        if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
            return i64::from_str_radix(hex, 16)
                .ok()
                .map(|n| Value::Number(Number::from(n)));
        }
        raw.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .and_then(Number::from_f64)
            .map(Value::Number)
    }

    fn parse_key(&mut self) -> Option<String> {
        match self.peek()? {
            q @ (b'"' | b'\'') => self.parse_string(q),
            b if is_ident_byte(b) => {
                let start = self.pos;
                while self.peek().map(is_ident_byte).unwrap_or(false) {
                    self.pos += 1;
                }
                // numeric keys such as 1.5 in spacing scales
                if self.peek() == Some(b'.')
                    && self.peek_at(1).map(|b| b.is_ascii_digit()).unwrap_or(false)
                    && self.src[start..self.pos].bytes().all(|b| b.is_ascii_digit())
                {
                    self.pos += 1;
                    while self.peek().map(|b| b.is_ascii_digit()).unwrap_or(false) {
                        self.pos += 1;
                    }
                }
                Some(self.src[start..self.pos].to_string())
            }
            _ => None,
        }
    }

    /// Value must be followed by a separator or the closing delimiter
    fn at_value_end(&mut self, close: u8) -> bool {
        self.skip_trivia();
        match self.peek() {
            Some(b',') => true,
            Some(b) => b == close,
            None => true,
        }
    }

    fn parse_object(&mut self, depth: usize) -> Option<Value> {
        self.pos += 1;
        let mut map = Map::new();

        loop {
            self.skip_trivia();
            match self.peek() {
                None => return Some(Value::Object(map)),
                Some(b'}') => {
                    self.pos += 1;
                    return Some(Value::Object(map));
                }
                Some(b',') => {
                    self.pos += 1;
                    continue;
                }
                _ => {}
            }

            let entry_start = self.pos;
            match self.parse_entry(depth) {
                Some((key, value)) => {
                    map.insert(key, value);
                }
                None => {
                    self.pos = entry_start;
                    if !self.skip_entry() && self.peek() != Some(b'}') {
                        // Stray `]` or `)`: give up on this scope
                        return Some(Value::Object(map));
                    }
                }
            }
        }
    }

    fn parse_entry(&mut self, depth: usize) -> Option<(String, Value)> {
        let key = self.parse_key()?;
        self.skip_trivia();
        if self.peek()? != b':' {
            return None;
        }
        self.pos += 1;
        self.skip_trivia();
        let value = self.parse_value(depth + 1)?;
        if !self.at_value_end(b'}') {
            return None;
        }
        Some((key, value))
    }

    fn parse_array(&mut self, depth: usize) -> Option<Value> {
        self.pos += 1;
        let mut items = Vec::new();

        loop {
            self.skip_trivia();
            match self.peek()? {
                b']' => {
                    self.pos += 1;
                    return Some(Value::Array(items));
                }
                b',' => {
                    self.pos += 1;
                    continue;
                }
                _ => {}
            }
            let item = self.parse_value(depth + 1)?;
            if !self.at_value_end(b']') {
                return None;
            }
            items.push(item);
        }
    }

    /// Advances past the current entry: up to and including the next comma at
    /// nesting depth zero. Returns false when a closing `}` or `]` for the
    /// enclosing scope is reached first (not consumed).
    fn skip_entry(&mut self) -> bool {
        let mut depth: usize = 0;
        while let Some(b) = self.peek() {
            match b {
                b'"' | b'\'' | b'`' => self.skip_string(b),
                b'/' if matches!(self.peek_at(1), Some(b'/') | Some(b'*')) => self.skip_trivia(),
                b'{' | b'[' | b'(' => {
                    depth += 1;
                    self.pos += 1;
                }
                b'}' | b']' | b')' => {
                    if depth == 0 {
                        return false;
                    }
                    depth -= 1;
                    self.pos += 1;
                }
                b',' if depth == 0 => {
                    self.pos += 1;
                    return true;
                }
                _ => self.pos += 1,
            }
        }
        true
    }

    fn skip_string(&mut self, quote: u8) {
        self.pos += 1;
        while let Some(b) = self.peek() {
            self.pos += 1;
            if b == b'\\' {
                self.pos += 1;
            } else if b == quote {
                return;
            }
        }
    }
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}
