//! Recursive-descent parser
//!
//! ```text
//! object := INTEGER | STRING | SYMBOL | '(' list
//! list   := object list | ')'
//! ```
//!
//! The parser never fails. A `)` where an object is expected, or running out
//! of tokens inside a list, terminates the current list; callers that care
//! about bracket balance check it before parsing.

use crate::language::Value;

pub struct Parser<'a> {
    tokens: &'a [String],
    position: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [String]) -> Self {
        Parser {
            tokens,
            position: 0,
        }
    }

    /// Index of the first token not consumed yet
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_exhausted(&self) -> bool {
        self.position >= self.tokens.len()
    }

    fn next_token(&mut self) -> Option<&'a str> {
        let tokens = self.tokens;
        let token = tokens.get(self.position)?;
        self.position += 1;
        Some(token.as_str())
    }

    /// Parse one object starting at the cursor.
    pub fn parse_object(&mut self) -> Value {
        match self.next_token() {
            None | Some(")") => Value::nil(),
            Some("(") => self.parse_list(),
            Some(token) => classify(token),
        }
    }

    fn parse_list(&mut self) -> Value {
        let tokens = self.tokens;
        let mut values = Vec::new();

        while let Some(token) = tokens.get(self.position) {
            if token == ")" {
                self.position += 1;
                break;
            }
            values.push(self.parse_object());
        }

        Value::list(values)
    }
}

/// Turn a single non-bracket token into an atom.
fn classify(token: &str) -> Value {
    if starts_integer(token) {
        Value::int(parse_integer(token))
    } else if let Some(body) = token.strip_prefix('"') {
        Value::string(body.strip_suffix('"').unwrap_or(body))
    } else {
        Value::symbol(&token.to_lowercase())
    }
}

fn starts_integer(token: &str) -> bool {
    let unsigned = token.strip_prefix(['+', '-']).unwrap_or(token);
    unsigned.starts_with(|c: char| c.is_ascii_digit())
}

/// Decimal or `0x` hexadecimal, saturating at the `i64` bounds.
fn parse_integer(token: &str) -> i64 {
    let (negative, unsigned) = match token.as_bytes().first() {
        Some(b'-') => (true, &token[1..]),
        Some(b'+') => (false, &token[1..]),
        _ => (false, token),
    };

    let magnitude = match unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        Some(hex) => i128::from_str_radix(hex, 16),
        None => unsigned.parse::<i128>(),
    }
    .unwrap_or(i128::MAX);

    let value = if negative { -magnitude } else { magnitude };
    value.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

/// Parse one object from `tokens`, returning it with the final cursor.
pub fn parse(tokens: &[String]) -> (Value, usize) {
    let mut parser = Parser::new(tokens);
    let value = parser.parse_object();
    (value, parser.position())
}
