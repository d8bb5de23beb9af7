//! Hand-written scanner producing a token stream with spans (spec §4.1).
//!
//! Grounded on the source project's `Lexer<'a>` (`Peekable<Chars>`,
//! `eat_whitespace`, `lex_alphanumeric`/`lex_numeric`/`lex_special`
//! dispatch-by-leading-character), generalized to VirtoLang's richer token
//! set and to emit a [`VlError`] instead of panicking on failure.

mod token;

pub use token::{Token, TokenKind};

use std::iter::Peekable;
use std::str::Chars;

use crate::diagnostics::VlError;
use crate::span::{FileId, Span};

pub struct Lexer<'a> {
    file: FileId,
    iter: Peekable<Chars<'a>>,
    line: u32,
    col: u32,
    byte: u32,
}

type LexResult<T> = Result<T, VlError>;

impl<'a> Lexer<'a> {
    pub fn new(file: FileId, source: &'a str) -> Self {
        Self {
            file,
            iter: source.chars().peekable(),
            line: 1,
            col: 1,
            byte: 0,
        }
    }

    /// Scan the whole source into a token stream ending in `Eof`.
    pub fn lex(mut self) -> LexResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = matches!(token.kind, TokenKind::Eof);
            tokens.push(token);
            if done {
                break;
            }
        }
        Ok(tokens)
    }

    fn peek(&mut self) -> Option<char> {
        self.iter.peek().copied()
    }

    fn peek2(&self) -> Option<char> {
        let mut clone = self.iter.clone();
        clone.next();
        clone.next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.iter.next()?;
        self.byte += c.len_utf8() as u32;
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn here(&self) -> Span {
        Span::new(self.file, self.line, self.col, self.byte, self.byte)
    }

    fn eat_non_newline_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace() && c != '\n') {
            self.advance();
        }
    }

    fn eat_comments_and_space(&mut self) -> LexResult<()> {
        loop {
            self.eat_non_newline_whitespace();
            match (self.peek(), self.peek2()) {
                (Some('#'), _) => {
                    while matches!(self.peek(), Some(c) if c != '\n') {
                        self.advance();
                    }
                }
                (Some('/'), Some('*')) => {
                    let start = self.here();
                    self.advance();
                    self.advance();
                    loop {
                        match (self.peek(), self.peek2()) {
                            (Some('*'), Some('/')) => {
                                self.advance();
                                self.advance();
                                break;
                            }
                            (None, _) => {
                                return Err(VlError::syntax("unterminated block comment", start));
                            }
                            _ => {
                                self.advance();
                            }
                        }
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn next_token(&mut self) -> LexResult<Token> {
        self.eat_comments_and_space()?;

        let Some(c) = self.peek() else {
            return Ok(Token::new(TokenKind::Eof, self.here()));
        };

        if c == '\n' {
            let start = self.here();
            self.advance();
            return Ok(Token::new(TokenKind::Newline, start));
        }

        if c.is_ascii_digit() {
            return self.lex_number();
        }

        if c == '_' || c.is_alphabetic() {
            return self.lex_ident_or_keyword();
        }

        if c == '\'' || c == '"' {
            return self.lex_string();
        }

        self.lex_operator()
    }

    fn lex_number(&mut self) -> LexResult<Token> {
        let start = self.here();
        let mut text = String::new();
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            text.push(self.advance().unwrap());
        }

        let mut is_float = false;
        if self.peek() == Some('.') && matches!(self.peek2(), Some(c) if c.is_ascii_digit()) {
            is_float = true;
            text.push(self.advance().unwrap());
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                text.push(self.advance().unwrap());
            }
        }

        let span = start.to(self.here());
        if is_float {
            let value: f64 = text
                .parse()
                .map_err(|_| VlError::syntax(format!("invalid float literal '{text}'"), span))?;
            Ok(Token::new(TokenKind::Float(value), span))
        } else {
            let value: i64 = text
                .parse()
                .map_err(|_| VlError::syntax(format!("invalid integer literal '{text}'"), span))?;
            Ok(Token::new(TokenKind::Int(value), span))
        }
    }

    fn lex_ident_or_keyword(&mut self) -> LexResult<Token> {
        let start = self.here();
        let mut text = String::new();
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            text.push(self.advance().unwrap());
        }
        let span = start.to(self.here());
        let kind = match &text[..] {
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "null" => TokenKind::Null,
            other => Token::keyword(other).unwrap_or(TokenKind::Ident(text.clone())),
        };
        Ok(Token::new(kind, span))
    }

    fn lex_string(&mut self) -> LexResult<Token> {
        let start = self.here();
        let quote = self.advance().unwrap();

        // Triple-quoted multi-line string (VirtoLang original-sources
        // addition, spec-full §3): """...""" / '''...'''.
        if self.peek() == Some(quote) && self.peek2() == Some(quote) {
            self.advance();
            self.advance();
            let mut raw = String::new();
            loop {
                match self.peek() {
                    None => return Err(VlError::syntax("unterminated triple-quoted string", start)),
                    Some(c) if c == quote => {
                        let mut clone = self.iter.clone();
                        clone.next();
                        if clone.next() == Some(quote) && clone.next() == Some(quote) {
                            self.advance();
                            self.advance();
                            self.advance();
                            break;
                        }
                        raw.push(self.advance().unwrap());
                    }
                    Some('\\') => {
                        self.advance();
                        match self.advance() {
                            Some('\\') => raw.push('\\'),
                            Some(other) if other == quote => raw.push(quote),
                            Some(other) => {
                                raw.push('\\');
                                raw.push(other);
                            }
                            None => return Err(VlError::syntax("unterminated triple-quoted string", start)),
                        }
                    }
                    Some(_) => raw.push(self.advance().unwrap()),
                }
            }
            let span = start.to(self.here());
            return Ok(Token::new(TokenKind::Str(raw), span));
        }

        let mut raw = String::new();
        loop {
            match self.advance() {
                None => return Err(VlError::syntax("unterminated string literal", start)),
                Some(c) if c == quote => break,
                Some('\\') => {
                    let escape = self
                        .advance()
                        .ok_or_else(|| VlError::syntax("unterminated string literal", start))?;
                    raw.push('\\');
                    raw.push(escape);
                }
                Some(c) => raw.push(c),
            }
        }
        let span = start.to(self.here());
        let value = unescape::unescape(&raw).unwrap_or(raw);
        Ok(Token::new(TokenKind::Str(value), span))
    }

    fn lex_operator(&mut self) -> LexResult<Token> {
        use TokenKind::*;
        let start = self.here();
        let c = self.advance().unwrap();

        // Longest-match-first for two-character operators (spec §4.1).
        let two_char = |lexer: &mut Self, expect: char, two: TokenKind, one: TokenKind| -> TokenKind {
            if lexer.peek() == Some(expect) {
                lexer.advance();
                two
            } else {
                one
            }
        };

        let kind = match c {
            '{' => LBrace,
            '}' => RBrace,
            '(' => LParen,
            ')' => RParen,
            '[' => LBracket,
            ']' => RBracket,
            ',' => Comma,
            '.' => Dot,
            ';' => Semicolon,
            '+' => Plus,
            '-' => Minus,
            '*' => Star,
            '/' => Slash,
            '%' => Percent,
            '=' => two_char(self, '=', EqEq, Eq),
            '!' => {
                if self.peek() == Some('=') {
                    self.advance();
                    NotEq
                } else {
                    return Err(VlError::syntax("unexpected character '!'", start));
                }
            }
            '<' => two_char(self, '=', Le, Lt),
            '>' => two_char(self, '=', Ge, Gt),
            other => return Err(VlError::syntax(format!("unexpected character '{other}'"), start)),
        };

        let span = start.to(self.here());
        Ok(Token::new(kind, span))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(0, src)
            .lex()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lexes_integer_and_float() {
        assert_eq!(
            kinds("6 3.5"),
            vec![TokenKind::Int(6), TokenKind::Float(3.5), TokenKind::Eof]
        );
    }

    #[test]
    fn lexes_keywords_and_identifiers() {
        assert_eq!(
            kinds("not in foo"),
            vec![TokenKind::Not, TokenKind::In, TokenKind::Ident("foo".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn lexes_two_char_operators_longest_first() {
        assert_eq!(
            kinds("a <= b == c"),
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::Le,
                TokenKind::Ident("b".into()),
                TokenKind::EqEq,
                TokenKind::Ident("c".into()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn lexes_string_escapes() {
        assert_eq!(kinds(r#""a\nb""#), vec![TokenKind::Str("a\nb".into()), TokenKind::Eof]);
    }

    #[test]
    fn line_comment_runs_to_end_of_line() {
        assert_eq!(
            kinds("1 # comment\n2"),
            vec![TokenKind::Int(1), TokenKind::Newline, TokenKind::Int(2), TokenKind::Eof]
        );
    }

    #[test]
    fn unterminated_string_is_a_syntax_error() {
        assert!(Lexer::new(0, "\"abc").lex().is_err());
    }
}
