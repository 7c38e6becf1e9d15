use crate::session::{Diagnostic, Session};

// ============================================================================
// Lexer
// ============================================================================

/// Characters that always form a token on their own.
const SINGLE_CHAR_TOKENS: &str = "()[]{}:*/";

pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
        }
    }

    fn current_char(&self) -> char {
        self.peek_ahead(0)
    }

    fn peek_ahead(&self, n: usize) -> char {
        if self.position + n < self.input.len() {
            self.input[self.position + n]
        } else {
            '\0'
        }
    }

    fn advance(&mut self) {
        if self.position < self.input.len() {
            self.position += 1;
        }
    }

    fn is_eof(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Whitespace, control characters and anything outside printable ASCII
    fn skip_whitespace(&mut self) {
        while !self.is_eof() && !self.current_char().is_ascii_graphic() {
            self.advance();
        }
    }

    fn take_while(&mut self, token: &mut String, pred: impl Fn(char) -> bool) {
        while !self.is_eof() && pred(self.current_char()) {
            token.push(self.current_char());
            self.advance();
        }
    }

    /// Split the input into raw text tokens. Unknown characters are reported
    /// to `session` and skipped.
    pub fn tokenize(mut self, session: &mut Session) -> Vec<String> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();
            if self.is_eof() {
                break;
            }
            match self.next_token() {
                Some(token) => tokens.push(token),
                None => {
                    session.report(Diagnostic::UnknownCharacter(self.current_char()));
                    self.advance();
                }
            }
        }

        tokens
    }

    fn next_token(&mut self) -> Option<String> {
        let ch = self.current_char();
        let next = self.peek_ahead(1);
        let mut token = String::new();

        if SINGLE_CHAR_TOKENS.contains(ch) {
            token.push(ch);
            self.advance();
        } else if ch.is_ascii_alphabetic() || ch == '_' {
            self.take_while(&mut token, is_identifier_char);
        } else if ch == '#' && next.is_ascii_alphabetic() {
            token.push(ch);
            self.advance();
            self.take_while(&mut token, is_identifier_char);
        } else if ch.is_ascii_digit() || ((ch == '+' || ch == '-') && next.is_ascii_digit()) {
            self.read_integer(&mut token);
        } else if ch == '+' || ch == '-' {
            token.push(ch);
            self.advance();
        } else if ch == '<' || ch == '>' {
            token.push(ch);
            self.advance();
            if self.current_char() == '=' {
                token.push('=');
                self.advance();
            }
        } else if ch == '"' {
            self.read_string(&mut token);
        } else {
            return None;
        }

        Some(token)
    }

    fn read_integer(&mut self, token: &mut String) {
        if matches!(self.current_char(), '+' | '-') {
            token.push(self.current_char());
            self.advance();
        }

        let hex = self.current_char() == '0'
            && matches!(self.peek_ahead(1), 'x' | 'X')
            && self.peek_ahead(2).is_ascii_hexdigit();
        if hex {
            token.push_str("0x");
            self.advance();
            self.advance();
            self.take_while(token, |c| c.is_ascii_hexdigit());
        } else {
            self.take_while(token, |c| c.is_ascii_digit());
        }
    }

    /// A string literal is copied verbatim, quotes included. A `'` copies
    /// itself and the character after it, so `'"` does not end the literal.
    fn read_string(&mut self, token: &mut String) {
        token.push('"');
        self.advance();

        while !self.is_eof() && self.current_char() != '"' {
            token.push(self.current_char());
            if self.current_char() == '\'' && self.position + 1 < self.input.len() {
                self.advance();
                token.push(self.current_char());
            }
            self.advance();
        }

        if self.current_char() == '"' {
            token.push('"');
            self.advance();
        }
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Tokenize `input`, reporting unknown characters to `session`.
pub fn tokenize(input: &str, session: &mut Session) -> Vec<String> {
    Lexer::new(input).tokenize(session)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(input: &str) -> Vec<String> {
        let mut session = Session::new();
        tokenize(input, &mut session)
    }

    #[test]
    fn test_brackets_are_single_tokens() {
        assert_eq!(lex("([{}])"), vec!["(", "[", "{", "}", "]", ")"]);
    }

    #[test]
    fn test_identifiers_and_hash_symbols() {
        assert_eq!(lex("(define my_var #t)"), vec!["(", "define", "my_var", "#t", ")"]);
        assert_eq!(lex("Foo42 _x"), vec!["Foo42", "_x"]);
    }

    #[test]
    fn test_signed_integers_and_standalone_signs() {
        assert_eq!(lex("(+ -5 +7 - 3)"), vec!["(", "+", "-5", "+7", "-", "3", ")"]);
    }

    #[test]
    fn test_hex_literal() {
        assert_eq!(lex("0x1F 0xg"), vec!["0x1F", "0", "xg"]);
        assert_eq!(lex("-0xff"), vec!["-0xff"]);
    }

    #[test]
    fn test_relational_and_arithmetic_operators() {
        assert_eq!(lex("< > <= >= * /"), vec!["<", ">", "<=", ">=", "*", "/"]);
    }

    #[test]
    fn test_string_literal_kept_verbatim() {
        assert_eq!(lex("\"hello world\" x"), vec!["\"hello world\"", "x"]);
    }

    #[test]
    fn test_string_quote_escape_copies_next_char() {
        assert_eq!(lex("\"a'\"b\" c"), vec!["\"a'\"b\"", "c"]);
    }

    #[test]
    fn test_unterminated_string_runs_to_end() {
        assert_eq!(lex("\"open"), vec!["\"open"]);
    }

    #[test]
    fn test_unknown_character_is_reported_and_skipped() {
        let mut session = Session::new();
        let tokens = tokenize("(a @ b)", &mut session);
        assert_eq!(tokens, vec!["(", "a", "b", ")"]);
        assert_eq!(session.diagnostics(), &[Diagnostic::UnknownCharacter('@')]);
    }

    #[test]
    fn test_non_printable_characters_are_skipped() {
        assert_eq!(lex("\t(a\u{7}\u{e9}b)\n"), vec!["(", "a", "b", ")"]);
    }
}
