use crate::diagnostic::Diagnostic;
use crate::lexeme::Lexeme;
use crate::span::{Span, Spanned};

pub struct Lexer<'src> {
    source: &'src [u8],
    pos: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source: source.as_bytes(),
            pos: 0,
            diagnostics: Vec::new(),
        }
    }

    pub fn tokenize(mut self) -> (Vec<Spanned<Lexeme>>, Vec<Diagnostic>) {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token();
            let is_eof = tok.node == Lexeme::Eof;
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        (tokens, self.diagnostics)
    }

    fn next_token(&mut self) -> Spanned<Lexeme> {
        loop {
            self.skip_whitespace_and_comments();

            if self.pos >= self.source.len() {
                return self.make_token(Lexeme::Eof, self.pos, self.pos);
            }

            let start = self.pos;
            let ch = self.source[self.pos];

            if is_ident_start(ch) {
                return self.scan_ident_or_keyword();
            }

            if ch.is_ascii_digit() {
                return self.scan_number();
            }

            if ch == b'"' {
                return self.scan_string();
            }

            if let Some(tok) = self.scan_symbol(start) {
                return tok;
            }
            // scan_symbol returned None — error was recorded, try again
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while self.pos < self.source.len() && self.source[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }

            if self.pos + 1 < self.source.len()
                && self.source[self.pos] == b'/'
                && self.source[self.pos + 1] == b'/'
            {
                while self.pos < self.source.len() && self.source[self.pos] != b'\n' {
                    self.pos += 1;
                }
                continue;
            }
            break;
        }
    }

    fn scan_ident_or_keyword(&mut self) -> Spanned<Lexeme> {
        let start = self.pos;
        while self.pos < self.source.len() && is_ident_continue(self.source[self.pos]) {
            self.pos += 1;
        }
        let text = std::str::from_utf8(&self.source[start..self.pos])
            .expect("identifier bytes are ASCII")
            .to_string();
        let lexeme = Lexeme::from_keyword(&text).unwrap_or(Lexeme::Ident(text));
        self.make_token(lexeme, start, self.pos)
    }

    fn scan_number(&mut self) -> Spanned<Lexeme> {
        let start = self.pos;
        while self.pos < self.source.len() && self.source[self.pos].is_ascii_digit() {
            self.pos += 1;
        }
        let text = std::str::from_utf8(&self.source[start..self.pos]).expect("digits are ASCII");
        match text.parse::<i64>() {
            Ok(value) => self.make_token(Lexeme::Integer(value), start, self.pos),
            Err(_) => {
                self.error(
                    format!("integer literal '{}' is out of range", text),
                    start,
                    self.pos,
                );
                self.make_token(Lexeme::Integer(0), start, self.pos)
            }
        }
    }

    fn scan_string(&mut self) -> Spanned<Lexeme> {
        let start = self.pos;
        self.pos += 1; // opening quote
        let mut value: Vec<u8> = Vec::new();
        while self.pos < self.source.len() {
            match self.source[self.pos] {
                b'"' => {
                    self.pos += 1;
                    let text = String::from_utf8_lossy(&value).into_owned();
                    return self.make_token(Lexeme::Str(text), start, self.pos);
                }
                b'\n' => break,
                b'\\' if self.pos + 1 < self.source.len() => {
                    let escaped = self.source[self.pos + 1];
                    match escaped {
                        b'"' => value.push(b'"'),
                        b'\\' => value.push(b'\\'),
                        b'n' => value.push(b'\n'),
                        b't' => value.push(b'\t'),
                        other => {
                            self.error(
                                format!("unknown escape '\\{}'", other as char),
                                self.pos,
                                self.pos + 2,
                            );
                        }
                    }
                    self.pos += 2;
                }
                other => {
                    value.push(other);
                    self.pos += 1;
                }
            }
        }
        self.error("unterminated string literal".to_string(), start, self.pos);
        let text = String::from_utf8_lossy(&value).into_owned();
        self.make_token(Lexeme::Str(text), start, self.pos)
    }

    fn scan_symbol(&mut self, start: usize) -> Option<Spanned<Lexeme>> {
        let ch = self.source[self.pos];
        let next = if self.pos + 1 < self.source.len() {
            Some(self.source[self.pos + 1])
        } else {
            None
        };

        let (lexeme, len) = match (ch, next) {
            (b'=', Some(b'=')) => (Lexeme::EqEq, 2),
            (b'!', Some(b'=')) => (Lexeme::BangEq, 2),
            (b'<', Some(b'=')) => (Lexeme::Le, 2),
            (b'>', Some(b'=')) => (Lexeme::Ge, 2),
            (b'&', Some(b'&')) => (Lexeme::AmpAmp, 2),
            (b'|', Some(b'|')) => (Lexeme::PipePipe, 2),
            (b'(', _) => (Lexeme::LParen, 1),
            (b')', _) => (Lexeme::RParen, 1),
            (b'{', _) => (Lexeme::LBrace, 1),
            (b'}', _) => (Lexeme::RBrace, 1),
            (b',', _) => (Lexeme::Comma, 1),
            (b':', _) => (Lexeme::Colon, 1),
            (b';', _) => (Lexeme::Semicolon, 1),
            (b'.', _) => (Lexeme::Dot, 1),
            (b'\'', _) => (Lexeme::Prime, 1),
            (b'!', _) => (Lexeme::Bang, 1),
            (b'<', _) => (Lexeme::Lt, 1),
            (b'>', _) => (Lexeme::Gt, 1),
            (b'+', _) => (Lexeme::Plus, 1),
            (b'-', _) => (Lexeme::Minus, 1),
            (b'*', _) => (Lexeme::Star, 1),
            (b'/', _) => (Lexeme::Slash, 1),
            _ => {
                self.error(
                    format!("unexpected character '{}'", ch as char),
                    start,
                    start + 1,
                );
                self.pos += 1;
                return None;
            }
        };

        self.pos += len;
        Some(self.make_token(lexeme, start, self.pos))
    }

    fn make_token(&self, lexeme: Lexeme, start: usize, end: usize) -> Spanned<Lexeme> {
        Spanned::new(lexeme, Span::new(start as u32, end as u32))
    }

    fn error(&mut self, message: String, start: usize, end: usize) {
        self.diagnostics
            .push(Diagnostic::error(message, Span::new(start as u32, end as u32)));
    }
}

fn is_ident_start(ch: u8) -> bool {
    ch.is_ascii_alphabetic() || ch == b'_'
}

fn is_ident_continue(ch: u8) -> bool {
    ch.is_ascii_alphanumeric() || ch == b'_'
}
