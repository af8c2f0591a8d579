//! Cursor-based access to a lexed token stream.
//!
//! Every parse rule that fails must leave the cursor exactly where it
//! found it; [`TokenReader::cursor`] and [`TokenReader::set_cursor`]
//! are the save/restore points the parser backtracks with.

use std::collections::HashMap;

use crate::error::SyntaxError;
use crate::token::{Token, TokenKind};

pub struct TokenReader<'a> {
    tokens: &'a [Token],
    /// Source reconstructed from the lexemes, used for diagnostics.
    token_string: String,
    cursor: usize,
    /// Candidate errors recorded by failed alternatives, keyed by the
    /// cursor they failed at.
    errors: Vec<(usize, String)>,
    /// Marker comments: lowercase name to token index.
    markers: HashMap<String, usize>,
}

impl<'a> TokenReader<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self::with_markers(tokens, HashMap::new())
    }

    pub fn with_markers(tokens: &'a [Token], markers: HashMap<String, usize>) -> Self {
        let token_string = tokens.iter().map(|t| t.lexeme.as_str()).collect();
        Self {
            tokens,
            token_string,
            cursor: 0,
            errors: Vec::new(),
            markers,
        }
    }

    pub fn can_read(&self) -> bool {
        self.can_read_n(1)
    }

    pub fn can_read_n(&self, count: usize) -> bool {
        self.cursor + count <= self.tokens.len()
    }

    pub fn peek(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.cursor + offset)
    }

    pub fn peek_kind(&self, offset: usize) -> Option<TokenKind> {
        self.peek(offset).map(|t| t.kind)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_cursor(&mut self, cursor: usize) {
        self.cursor = cursor;
    }

    pub fn skip(&mut self) {
        self.cursor += 1;
    }

    pub fn skip_n(&mut self, count: usize) {
        self.cursor += count;
    }

    pub fn can_consume(&self, kind: TokenKind) -> bool {
        self.peek_kind(0) == Some(kind)
    }

    /// Consumes one token of exactly `kind` or fails without advancing.
    pub fn consume(&mut self, kind: TokenKind) -> Result<&Token, SyntaxError> {
        match self.peek(0) {
            Some(token) if token.kind == kind => {
                self.cursor += 1;
                Ok(&self.tokens[self.cursor - 1])
            }
            _ => Err(self.error(format!("Expected {kind:?}"))),
        }
    }

    /// Consumes an identifier token and returns its text.
    pub fn consume_identifier(&mut self) -> Result<String, SyntaxError> {
        Ok(self.consume(TokenKind::Identifier)?.lexeme.clone())
    }

    /// Atomically consumes the exact sequence `kinds`; consumes nothing
    /// if any token differs.
    pub fn try_consume(&mut self, kinds: &[TokenKind]) -> bool {
        if !self.can_read_n(kinds.len()) {
            return false;
        }
        for (offset, kind) in kinds.iter().enumerate() {
            if self.peek_kind(offset) != Some(*kind) {
                return false;
            }
        }
        self.cursor += kinds.len();
        true
    }

    /// Builds a syntax error at the current cursor. The offset is the
    /// summed lexeme length up to and including the current token.
    pub fn error(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError::new(message, self.token_string.clone(), self.cursor_offset(self.cursor))
    }

    /// Records a candidate error for the current cursor, deduplicated.
    pub fn mark_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        if !self
            .errors
            .iter()
            .any(|(cursor, existing)| *cursor == self.cursor && *existing == message)
        {
            self.errors.push((self.cursor, message));
        }
    }

    /// The recorded candidate error that got furthest into the stream,
    /// or `fallback` at the current cursor if none were recorded.
    pub fn best_error(&self, fallback: &str) -> SyntaxError {
        match self.errors.iter().max_by_key(|(cursor, _)| *cursor) {
            Some((cursor, message)) => {
                SyntaxError::new(message.clone(), self.token_string.clone(), self.cursor_offset(*cursor))
            }
            None => self.error(fallback),
        }
    }

    /// Character offset into the reconstructed source for a cursor.
    pub fn cursor_offset(&self, cursor: usize) -> usize {
        self.tokens
            .iter()
            .take(cursor.saturating_add(1).min(self.tokens.len()))
            .map(|t| t.lexeme.chars().count())
            .sum()
    }

    /// Marker names whose token index falls in `[start, end)`.
    pub fn markers_in(&self, start: usize, end: usize) -> Vec<String> {
        self.markers
            .iter()
            .filter(|(_, index)| (start..end).contains(index))
            .map(|(name, _)| name.clone())
            .collect()
    }
}
