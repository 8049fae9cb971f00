//! Cursor over the tokens of one declaration.

use super::lexer::{Token, TokenKind, lex, token_text};

pub struct TokenStream<'s> {
    text: &'s str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'s> TokenStream<'s> {
    pub fn new(text: &'s str) -> Self {
        Self {
            text,
            tokens: lex(text),
            pos: 0,
        }
    }

    pub fn text(&self) -> &'s str {
        self.text
    }

    /// First unrecognized character run, if any.
    pub fn garbage(&self) -> Option<&'s str> {
        self.tokens
            .iter()
            .find(|t| t.kind == TokenKind::Garbage)
            .map(|t| token_text(self.text, t))
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub fn peek(&self) -> Option<TokenKind> {
        self.nth(0)
    }

    pub fn nth(&self, n: usize) -> Option<TokenKind> {
        self.tokens.get(self.pos + n).map(|t| t.kind)
    }

    pub fn at(&self, kind: TokenKind) -> bool {
        self.peek() == Some(kind)
    }

    /// Whether the next token is the identifier `word`.
    pub fn at_word(&self, word: &str) -> bool {
        self.peek_text(0) == Some(word) && self.at(TokenKind::Ident)
    }

    pub fn peek_text(&self, n: usize) -> Option<&'s str> {
        self.tokens
            .get(self.pos + n)
            .map(|t| token_text(self.text, t))
    }

    pub fn bump(&mut self) -> Option<&'s str> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token_text(self.text, token))
    }

    /// Consumes the next token if it has the given kind, returning its text.
    pub fn eat(&mut self, kind: TokenKind) -> Option<&'s str> {
        if self.at(kind) { self.bump() } else { None }
    }

    /// Consumes tokens up to (not including) the next `kind`, returning the covered text.
    pub fn until(&mut self, kind: TokenKind) -> Option<&'s str> {
        let start = self.tokens.get(self.pos)?.span.start;
        let end_pos = self.tokens[self.pos..]
            .iter()
            .position(|t| t.kind == kind)
            .map(|i| self.pos + i)?;
        let end = self.tokens[end_pos].span.start;
        self.pos = end_pos;
        Some(self.text[start..end].trim())
    }

    /// Source text from the current token to the end.
    pub fn rest(&self) -> &'s str {
        match self.tokens.get(self.pos) {
            Some(token) => &self.text[token.span.start..],
            None => "",
        }
    }
}
