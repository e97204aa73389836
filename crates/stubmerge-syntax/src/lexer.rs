//! Tokenizer for Java-like source text.
//!
//! The lexer only distinguishes the token classes the chain parser cares
//! about: identifiers, the punctuation that shapes call chains, and literal
//! forms that must be skipped opaquely (strings, characters, numbers).
//! Everything else becomes an [`TokenKind::Other`] token. Lexing never
//! fails; unrecognized input degrades to `Other` so that a malformed file
//! simply yields fewer chains.

use crate::model::TextRange;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Dot,
    LParen,
    RParen,
    Comma,
    Semicolon,
    Str,
    Char,
    Number,
    Other,
}

/// Tokenizes `source`, skipping whitespace and line/block comments.
pub fn lex(source: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(source);
    lexer.lex_all();
    lexer.tokens
}

struct Lexer<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            tokens: Vec::new(),
        }
    }

    fn lex_all(&mut self) {
        while let Some(&(start, c)) = self.chars.peek() {
            match c {
                c if c.is_whitespace() => {
                    self.chars.next();
                }
                '/' if self.peek_second() == Some('/') => {
                    self.skip_while(|c| c != '\n');
                }
                '/' if self.peek_second() == Some('*') => {
                    self.skip_block_comment();
                }
                c if is_ident_start(c) => self.lex_ident(start),
                c if c.is_ascii_digit() => self.lex_number(start),
                '"' => self.lex_quoted(start, '"', TokenKind::Str),
                '\'' => self.lex_quoted(start, '\'', TokenKind::Char),
                '.' => self.single(start, TokenKind::Dot),
                '(' => self.single(start, TokenKind::LParen),
                ')' => self.single(start, TokenKind::RParen),
                ',' => self.single(start, TokenKind::Comma),
                ';' => self.single(start, TokenKind::Semicolon),
                _ => self.single(start, TokenKind::Other),
            }
        }
    }

    fn peek_second(&self) -> Option<char> {
        let mut ahead = self.chars.clone();
        ahead.next();
        ahead.next().map(|(_, c)| c)
    }

    fn single(&mut self, start: usize, kind: TokenKind) {
        let (_, c) = self.chars.next().unwrap_or((start, ' '));
        self.push(kind, start, start + c.len_utf8());
    }

    fn lex_ident(&mut self, start: usize) {
        let end = self.consume_while(|c| is_ident_continue(c));
        self.push(TokenKind::Ident, start, end);
    }

    fn lex_number(&mut self, start: usize) {
        // Digits plus the separators and suffixes Java allows (1_000L, 2.5d,
        // 0x1F). Precision does not matter here; numbers are opaque.
        let end = self.consume_while(|c| {
            c.is_ascii_alphanumeric() || c == '_' || c == '.'
        });
        self.push(TokenKind::Number, start, end);
    }

    fn lex_quoted(&mut self, start: usize, quote: char, kind: TokenKind) {
        self.chars.next(); // opening quote
        let mut end = start + quote.len_utf8();
        while let Some((i, c)) = self.chars.next() {
            end = i + c.len_utf8();
            match c {
                '\\' => {
                    // Escape: consume the next char unconditionally.
                    if let Some((j, e)) = self.chars.next() {
                        end = j + e.len_utf8();
                    }
                }
                c if c == quote => break,
                _ => {}
            }
        }
        self.push(kind, start, end);
    }

    fn skip_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(&(_, c)) = self.chars.peek() {
            if !pred(c) {
                break;
            }
            self.chars.next();
        }
    }

    fn skip_block_comment(&mut self) {
        self.chars.next(); // '/'
        self.chars.next(); // '*'
        let mut prev = ' ';
        for (_, c) in self.chars.by_ref() {
            if prev == '*' && c == '/' {
                break;
            }
            prev = c;
        }
    }

    fn consume_while(&mut self, pred: impl Fn(char) -> bool) -> usize {
        let mut end = self.source.len();
        while let Some(&(i, c)) = self.chars.peek() {
            if !pred(c) {
                end = i;
                break;
            }
            self.chars.next();
        }
        end
    }

    fn push(&mut self, kind: TokenKind, start: usize, end: usize) {
        self.tokens.push(Token {
            kind,
            range: TextRange::new(start, end),
        });
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_call_chain_punctuation() {
        assert_eq!(
            kinds("when(x).thenReturn(1);"),
            vec![
                TokenKind::Ident,
                TokenKind::LParen,
                TokenKind::Ident,
                TokenKind::RParen,
                TokenKind::Dot,
                TokenKind::Ident,
                TokenKind::LParen,
                TokenKind::Number,
                TokenKind::RParen,
                TokenKind::Semicolon,
            ]
        );
    }

    #[test]
    fn string_swallows_embedded_punctuation() {
        let tokens = lex(r#"thenReturn("a).b(c", 'x')"#);
        let strings: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Str || t.kind == TokenKind::Char)
            .collect();
        assert_eq!(strings.len(), 2);
        assert_eq!(strings[0].range, TextRange::new(11, 19));
    }

    #[test]
    fn escaped_quote_does_not_close_string() {
        let tokens = lex(r#""a\"b""#);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].range, TextRange::new(0, 6));
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            kinds("when /* a.b() */ (x) // tail.call()\n.then()"),
            vec![
                TokenKind::Ident,
                TokenKind::LParen,
                TokenKind::Ident,
                TokenKind::RParen,
                TokenKind::Dot,
                TokenKind::Ident,
                TokenKind::LParen,
                TokenKind::RParen,
            ]
        );
    }

    #[test]
    fn unterminated_string_reaches_end_of_input() {
        let tokens = lex(r#""abc"#);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].range, TextRange::new(0, 4));
    }
}
