//! Regex table lexer.
//!
//! Every token class carries a matcher. At each position the longest
//! match across all classes wins; on equal lengths the class declared
//! first in the table wins, which is what keeps keywords ahead of
//! [`TokenKind::Identifier`]. Numeric constants are scanned separately
//! before the table is consulted (see [`crate::number`]).

use std::sync::LazyLock;

use regex::Regex;

use crate::ast::{BuiltinType, InterpolationQualifier, PrecisionQualifier, StorageQualifier};
use crate::error::LexError;
use crate::number;
use crate::token::{Token, TokenKind};

enum Matcher {
    Exact(&'static str),
    Pattern(Regex),
}

impl Matcher {
    /// Length of the match at the start of `input`, if any.
    fn match_len(&self, input: &str) -> Option<usize> {
        match self {
            Matcher::Exact(text) => input.starts_with(text).then(|| text.len()),
            Matcher::Pattern(pattern) => pattern.find(input).map(|m| m.end()),
        }
    }
}

fn pattern(regex: &str) -> Matcher {
    // Table patterns are fixed strings; a failure here is a programming
    // error caught by the lexer tests.
    Matcher::Pattern(Regex::new(regex).unwrap_or_else(|e| panic!("invalid token pattern: {e}")))
}

static TOKEN_TABLE: LazyLock<Vec<(Matcher, TokenKind)>> = LazyLock::new(|| {
    let mut table = vec![
        (pattern(r"\A#[^\n]*"), TokenKind::Directive),
        (Matcher::Exact("__LINE__"), TokenKind::GlslMacro),
        (Matcher::Exact("__FILE__"), TokenKind::GlslMacro),
        (Matcher::Exact("__VERSION__"), TokenKind::GlslMacro),
        (pattern(r"\A//[^\n]*"), TokenKind::Comment),
        (pattern(r"\A/\*[^*]*\*+(?:[^/*][^*]*\*+)*/"), TokenKind::MultiComment),
    ];

    for storage in StorageQualifier::ALL {
        table.push((Matcher::Exact(storage.keyword()), TokenKind::Storage(*storage)));
    }
    for builtin in BuiltinType::ALL {
        table.push((Matcher::Exact(builtin.glsl_name()), TokenKind::Type(*builtin)));
    }
    for interpolation in [
        InterpolationQualifier::Smooth,
        InterpolationQualifier::Flat,
        InterpolationQualifier::NoPerspective,
    ] {
        table.push((
            Matcher::Exact(interpolation.keyword()),
            TokenKind::Interpolation(interpolation),
        ));
    }
    for precision in [
        PrecisionQualifier::High,
        PrecisionQualifier::Medium,
        PrecisionQualifier::Low,
    ] {
        table.push((
            Matcher::Exact(precision.keyword()),
            TokenKind::PrecisionQualifier(precision),
        ));
    }

    let keywords: &[(&str, TokenKind)] = &[
        ("layout", TokenKind::Layout),
        ("invariant", TokenKind::Invariant),
        ("precise", TokenKind::Precise),
        ("precision", TokenKind::Precision),
        ("struct", TokenKind::Struct),
        ("subroutine", TokenKind::Subroutine),
        ("while", TokenKind::While),
        ("break", TokenKind::Break),
        ("continue", TokenKind::Continue),
        ("do", TokenKind::Do),
        ("else", TokenKind::Else),
        ("for", TokenKind::For),
        ("if", TokenKind::If),
        ("discard", TokenKind::Discard),
        ("return", TokenKind::Return),
        ("switch", TokenKind::Switch),
        ("case", TokenKind::Case),
        ("default", TokenKind::Default),
        ("true", TokenKind::BoolConstant),
        ("false", TokenKind::BoolConstant),
        ("<<=", TokenKind::LeftAssign),
        (">>=", TokenKind::RightAssign),
        ("<<", TokenKind::LeftOp),
        (">>", TokenKind::RightOp),
        ("++", TokenKind::IncOp),
        ("--", TokenKind::DecOp),
        ("<=", TokenKind::LeOp),
        (">=", TokenKind::GeOp),
        ("==", TokenKind::EqOp),
        ("!=", TokenKind::NeOp),
        ("&&", TokenKind::AndOp),
        ("||", TokenKind::OrOp),
        ("^^", TokenKind::XorOp),
        ("*=", TokenKind::MulAssign),
        ("/=", TokenKind::DivAssign),
        ("+=", TokenKind::AddAssign),
        ("%=", TokenKind::ModAssign),
        ("&=", TokenKind::AndAssign),
        ("^=", TokenKind::XorAssign),
        ("|=", TokenKind::OrAssign),
        ("-=", TokenKind::SubAssign),
        ("(", TokenKind::LeftParen),
        (")", TokenKind::RightParen),
        ("[", TokenKind::LeftBracket),
        ("]", TokenKind::RightBracket),
        ("{", TokenKind::LeftBrace),
        ("}", TokenKind::RightBrace),
        (".", TokenKind::Dot),
        (",", TokenKind::Comma),
        (":", TokenKind::Colon),
        ("=", TokenKind::Equal),
        (";", TokenKind::Semicolon),
        ("!", TokenKind::Bang),
        ("-", TokenKind::Dash),
        ("~", TokenKind::Tilde),
        ("+", TokenKind::Plus),
        ("*", TokenKind::Star),
        ("/", TokenKind::Slash),
        ("%", TokenKind::Percent),
        ("<", TokenKind::LeftAngle),
        (">", TokenKind::RightAngle),
        ("|", TokenKind::VerticalBar),
        ("^", TokenKind::Caret),
        ("&", TokenKind::Ampersand),
        ("?", TokenKind::Question),
    ];
    for (text, kind) in keywords {
        table.push((Matcher::Exact(text), *kind));
    }

    table.push((pattern(r"\A[_a-zA-Z][0-9_a-zA-Z]*"), TokenKind::Identifier));
    table
});

/// Splits `source` into tokens, eliding comments.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    tokenize_with_comments(source, |_, _| {})
}

/// Splits `source` into tokens. Comments are not included in the
/// result; instead `comment_consumer` is called with the index the
/// next non-comment token will have and the comment token itself.
pub fn tokenize_with_comments(
    source: &str,
    mut comment_consumer: impl FnMut(usize, &Token),
) -> Result<Vec<Token>, LexError> {
    let mut tokens = Vec::new();
    let mut cursor = skip_whitespace(source, 0);

    while cursor < source.len() {
        let (kind, end) = next_token(source, cursor)
            .ok_or_else(|| LexError::new("Unknown token", source, char_offset(source, cursor)))?;
        let token = Token::new(kind, &source[cursor..end]);
        if token.kind.is_comment() {
            comment_consumer(tokens.len(), &token);
        } else {
            tokens.push(token);
        }
        cursor = skip_whitespace(source, end);
    }

    Ok(tokens)
}

fn next_token(source: &str, cursor: usize) -> Option<(TokenKind, usize)> {
    if let Some((kind, end)) = number::scan(source, cursor) {
        return Some((kind, end));
    }

    let rest = &source[cursor..];
    let mut longest: Option<(TokenKind, usize)> = None;
    for (matcher, kind) in TOKEN_TABLE.iter() {
        if let Some(length) = matcher.match_len(rest) {
            if longest.is_none_or(|(_, best)| length > best) {
                longest = Some((*kind, length));
            }
        }
    }
    longest.map(|(kind, length)| (kind, cursor + length))
}

fn skip_whitespace(source: &str, mut cursor: usize) -> usize {
    let bytes = source.as_bytes();
    while cursor < bytes.len() && bytes[cursor].is_ascii_whitespace() {
        cursor += 1;
    }
    cursor
}

fn char_offset(source: &str, byte_offset: usize) -> usize {
    source[..byte_offset].chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::IntFormat;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .expect("tokenize")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn longest_match_keeps_matrix_types_whole() {
        let tokens = tokenize("mat2x2").expect("tokenize");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Type(BuiltinType::Mat2x2));
        assert_eq!(tokens[0].lexeme, "mat2x2");
    }

    #[test]
    fn keywords_beat_identifiers_on_ties() {
        assert_eq!(kinds("uniform"), vec![TokenKind::Storage(StorageQualifier::Uniform)]);
        assert_eq!(kinds("uniforms"), vec![TokenKind::Identifier]);
        assert_eq!(kinds("true"), vec![TokenKind::BoolConstant]);
        assert_eq!(kinds("trueish"), vec![TokenKind::Identifier]);
    }

    #[test]
    fn keyword_prefixes_lose_to_longer_identifiers() {
        assert_eq!(kinds("inout"), vec![TokenKind::Storage(StorageQualifier::Inout)]);
        assert_eq!(kinds("int"), vec![TokenKind::Type(BuiltinType::Int)]);
        assert_eq!(kinds("interp"), vec![TokenKind::Identifier]);
    }

    #[test]
    fn numeric_constants_scan_before_the_table() {
        assert_eq!(
            kinds("0 07 0x1F 10u 0x1Fu .5 5. 5.0e-3 5.0E+3f 5.0lf"),
            vec![
                TokenKind::IntConstant(IntFormat::Octal),
                TokenKind::IntConstant(IntFormat::Octal),
                TokenKind::IntConstant(IntFormat::Hexadecimal),
                TokenKind::UintConstant(IntFormat::Decimal),
                TokenKind::UintConstant(IntFormat::Hexadecimal),
                TokenKind::FloatConstant,
                TokenKind::FloatConstant,
                TokenKind::FloatConstant,
                TokenKind::FloatConstant,
                TokenKind::DoubleConstant,
            ]
        );
    }

    #[test]
    fn operators() {
        assert_eq!(
            kinds("a <<= b << c <= d"),
            vec![
                TokenKind::Identifier,
                TokenKind::LeftAssign,
                TokenKind::Identifier,
                TokenKind::LeftOp,
                TokenKind::Identifier,
                TokenKind::LeOp,
                TokenKind::Identifier,
            ]
        );
    }

    #[test]
    fn directives_are_single_tokens() {
        let tokens = tokenize("#version 450 core\nvoid").expect("tokenize");
        assert_eq!(tokens[0].kind, TokenKind::Directive);
        assert_eq!(tokens[0].lexeme, "#version 450 core");
        assert_eq!(tokens[1].kind, TokenKind::Type(BuiltinType::Void));
    }

    #[test]
    fn comments_are_elided_and_reported() {
        let mut comments = Vec::new();
        let tokens = tokenize_with_comments(
            "float a; // #marker\nfloat b; /* block */",
            |index, token| comments.push((index, token.lexeme.clone())),
        )
        .expect("tokenize");
        assert_eq!(tokens.len(), 6);
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0], (3, "// #marker".to_string()));
        assert_eq!(comments[1], (6, "/* block */".to_string()));
    }

    #[test]
    fn unknown_token_is_fatal() {
        let error = tokenize("float a = @;").expect_err("lex should fail");
        assert_eq!(error.position, 10);
        assert!(error.to_string().contains("Unknown token"));
    }
}
